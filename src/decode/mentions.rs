/*
 * Mention building. Tokens of a sentence are turned into entity mentions, trigger mentions and
 * one partial event per trigger. Contiguous tokens of the same trigger are merged into a single
 * trigger mention, and a token typed with several trigger types (`A////B`) anchors one trigger
 * and one event per type.
*/
use super::context::DecodingContext;
use crate::config::DecoderConfig;
use crate::document::{Sentence, Span, Token};
use crate::graph::{ArgTarget, EntityMention, Event, TriggerMention};
use crate::label::{LabelUnit, Pointer};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Lookup key of an event anchored in a sentence. Every event after the first one anchored on
/// the same token is an alias of that position.
pub(crate) struct AnchorKey {
    pub(crate) position: usize,
    pub(crate) alias: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Anchor {
    pub(crate) key: AnchorKey,
    pub(crate) event: Event,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SentenceMentions {
    pub(crate) entities: Vec<EntityMention>,
    pub(crate) triggers: Vec<TriggerMention>,
    /// Anchored events, ordered by key.
    pub(crate) anchors: Vec<Anchor>,
    /// What an argument read on each token points to. Trigger tokens point to their last event.
    pub(crate) targets: Vec<Option<ArgTarget>>,
}

/// The trigger run the next token may extend.
struct Run {
    end: usize,
    kind: String,
    signature: Option<Pointer>,
    /// Indices in `triggers` of the mentions created by the first token of the run.
    triggers: Vec<usize>,
}

impl Run {
    fn is_continued_by(&self, span: Span, kind: &str, signature: Option<Pointer>) -> bool {
        span.start == self.end + 1 && self.kind == kind && self.signature == signature
    }
}

pub(crate) fn build_mentions(
    sentence: &Sentence,
    config: &DecoderConfig,
    ctx: &mut DecodingContext,
) -> SentenceMentions {
    let mut mentions = SentenceMentions {
        targets: sentence
            .tokens
            .iter()
            .map(|t| t.mention_id.clone().map(ArgTarget::Mention))
            .collect(),
        ..Default::default()
    };
    let mut run: Option<Run> = None;
    for token in &sentence.tokens {
        let head = token.label.head();
        let Some(kind) = head.kind() else {
            continue;
        };
        check_heads(token, config);
        if config.is_entity_type(kind) {
            push_entity(token, kind, &mut mentions, ctx);
            continue;
        }
        let signature = head.pointer();
        let continued = run
            .as_ref()
            .is_some_and(|r| r.is_continued_by(token.span, kind, signature));
        if continued {
            if let Some(r) = run.as_mut() {
                for &i in &r.triggers {
                    mentions.triggers[i].absorb(token.span, &token.text);
                }
                r.end = token.span.end;
            }
            continue;
        }
        let triggers = push_triggers(token, head, &mut mentions, ctx);
        run = Some(Run {
            end: token.span.end,
            kind: kind.to_string(),
            signature,
            triggers,
        });
    }
    mentions
}

/// Heads of one token are either all entities or all triggers. The first head wins otherwise.
fn check_heads(token: &Token, config: &DecoderConfig) {
    let mut classes = token
        .label
        .units()
        .iter()
        .filter_map(LabelUnit::kind)
        .map(|kind| config.is_entity_type(kind));
    if let Some(first) = classes.next() {
        if classes.any(|is_entity| is_entity != first) {
            warn!(
                token = token.position,
                text = token.text.as_str(),
                "Token labeled both as an entity and as a trigger, keeping the first head"
            );
        }
    }
}

fn push_entity(
    token: &Token,
    kind: &str,
    mentions: &mut SentenceMentions,
    ctx: &mut DecodingContext,
) {
    let Some(id) = token.mention_id.as_deref() else {
        debug!(
            token = token.position,
            text = token.text.as_str(),
            "Entity token without identifier"
        );
        return;
    };
    if ctx.first_sighting(id) {
        mentions.entities.push(EntityMention {
            id: id.to_string(),
            kind: kind.to_string(),
            span: token.span,
            text: token.text.clone(),
        });
    }
}

/// Creates one trigger and one event per type of the head. Returns the indices of the new
/// triggers.
fn push_triggers(
    token: &Token,
    head: &LabelUnit,
    mentions: &mut SentenceMentions,
    ctx: &mut DecodingContext,
) -> Vec<usize> {
    let mut created = Vec::new();
    for kind in head.kinds() {
        let trigger = TriggerMention {
            id: ctx.next_trigger(),
            kind: kind.to_string(),
            span: token.span,
            text: token.text.clone(),
        };
        let event = Event::new(ctx.next_event(), kind, trigger.id);
        let alias = mentions
            .anchors
            .last()
            .is_some_and(|a| a.key.position == token.position);
        if let Some(slot) = mentions.targets.get_mut(token.position) {
            *slot = Some(ArgTarget::Event(event.id));
        }
        mentions.anchors.push(Anchor {
            key: AnchorKey {
                position: token.position,
                alias,
            },
            event,
        });
        created.push(mentions.triggers.len());
        mentions.triggers.push(trigger);
    }
    created
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Encoding;
    use crate::document::parse_documents;
    use crate::graph::{EventId, TriggerId};

    fn sentence(lines: &str) -> Sentence {
        let input = format!("# doc_id = D\n{}", lines);
        let mut documents = parse_documents(&input, Encoding::Single);
        documents.remove(0).sentences.remove(0)
    }

    #[test]
    fn test_entities_and_triggers() {
        let sentence = sentence(
            "IL-2\t0-4\tT1\tB-Protein|Theme|Gene_expression|+1\n\
             expression\t5-15\tO\tB-Gene_expression|O\n\
             in\t16-18\tO\tO\n\
             IL-2\t19-23\tT1\tB-Protein|O\n",
        );
        let mut ctx = DecodingContext::new();
        let mentions = build_mentions(&sentence, &DecoderConfig::default(), &mut ctx);
        assert_eq!(mentions.entities.len(), 1);
        assert_eq!(mentions.triggers.len(), 1);
        assert_eq!(mentions.triggers[0].id, TriggerId(1001));
        assert_eq!(mentions.anchors.len(), 1);
        assert_eq!(mentions.anchors[0].key.position, 1);
        assert_eq!(mentions.targets[1], Some(ArgTarget::Event(EventId(1))));
        assert_eq!(
            mentions.targets[0],
            Some(ArgTarget::Mention(String::from("T1")))
        );
        assert_eq!(mentions.targets[2], None);
    }

    #[test]
    fn test_contiguous_trigger_tokens_are_merged() {
        let sentence = sentence(
            "up\t0-2\tO\tB-Positive_regulation|O\n\
             regulation\t3-13\tO\tB-Positive_regulation|O\n\
             of\t14-16\tO\tO\n",
        );
        let mut ctx = DecodingContext::new();
        let mentions = build_mentions(&sentence, &DecoderConfig::default(), &mut ctx);
        assert_eq!(mentions.triggers.len(), 1);
        assert_eq!(mentions.triggers[0].text, "up regulation");
        assert_eq!(mentions.triggers[0].span, Span::new(0, 13));
        assert_eq!(mentions.anchors.len(), 1);
    }

    #[test]
    fn test_adjacent_triggers_with_other_position_are_not_merged() {
        let sentence = sentence(
            "a\t0-1\tO\tB-Binding|Theme|Binding|+1\n\
             b\t2-3\tO\tB-Binding|Theme|Binding|+2\n",
        );
        let mut ctx = DecodingContext::new();
        let mentions = build_mentions(&sentence, &DecoderConfig::default(), &mut ctx);
        assert_eq!(mentions.triggers.len(), 2);
    }

    #[test]
    fn test_multi_type_trigger_creates_aliases() {
        let sentence = sentence("expression\t0-10\tO\tB-Gene_expression////Transcription|O\n");
        let mut ctx = DecodingContext::new();
        let mentions = build_mentions(&sentence, &DecoderConfig::default(), &mut ctx);
        assert_eq!(mentions.triggers.len(), 2);
        assert_eq!(mentions.triggers[0].span, mentions.triggers[1].span);
        let keys: Vec<_> = mentions.anchors.iter().map(|a| a.key).collect();
        assert_eq!(
            keys,
            vec![
                AnchorKey {
                    position: 0,
                    alias: false
                },
                AnchorKey {
                    position: 0,
                    alias: true
                }
            ]
        );
        assert_eq!(mentions.targets[0], Some(ArgTarget::Event(EventId(2))));
    }

    #[test]
    fn test_first_head_decides_between_entity_and_trigger() {
        let sentence = sentence(
            "IL-2\t0-4\tT1\tB-Protein|O$B-Gene_expression|O\n\
             expression\t5-15\tO\tB-Gene_expression|O$B-Protein|O\n",
        );
        let mut ctx = DecodingContext::new();
        let mentions = build_mentions(&sentence, &DecoderConfig::default(), &mut ctx);
        assert_eq!(mentions.entities.len(), 1);
        assert_eq!(mentions.entities[0].kind, "Protein");
        assert_eq!(mentions.triggers.len(), 1);
        assert_eq!(mentions.triggers[0].kind, "Gene_expression");
        assert_eq!(mentions.triggers[0].span, Span::new(5, 15));
        assert_eq!(mentions.anchors.len(), 1);
        assert_eq!(mentions.anchors[0].key.position, 1);
    }

    #[test]
    fn test_entities_are_deduplicated_per_document() {
        let first = sentence("p53\t0-3\tT1\tB-Protein|O\n");
        let second = sentence("p53\t10-13\tT1\tB-Protein|O\n");
        let mut ctx = DecodingContext::new();
        let config = DecoderConfig::default();
        assert_eq!(build_mentions(&first, &config, &mut ctx).entities.len(), 1);
        assert_eq!(build_mentions(&second, &config, &mut ctx).entities.len(), 0);
    }
}
