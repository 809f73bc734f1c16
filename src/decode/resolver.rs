/*
 * Argument resolution. Every argument head of a token names the type of its source event and
 * how many matching triggers to skip on one side of the token. The anchors of the sentence are
 * split by a cursor into those already passed (searched nearest first, going left) and those
 * still ahead (searched nearest first, going right).
*/
use super::mentions::{AnchorKey, SentenceMentions};
use crate::config::DecoderConfig;
use crate::document::Sentence;
use crate::graph::{matching_kind, ArgumentEdge, Event};
use crate::label::{Direction, LabelUnit};
use either::Either;
use itertools::Itertools;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ResolverCounts {
    pub(crate) resolved: usize,
    pub(crate) unresolved: usize,
}

/// Attaches an edge to the source event of every argument head of the sentence.
pub(crate) fn resolve_arguments(
    sentence: &Sentence,
    mentions: &mut SentenceMentions,
    config: &DecoderConfig,
) -> ResolverCounts {
    let keys: Vec<AnchorKey> = mentions.anchors.iter().map(|a| a.key).dedup().collect();
    let mut counts = ResolverCounts::default();
    let mut cursor = 0;
    for token in &sentence.tokens {
        while cursor < keys.len() && keys[cursor].position <= token.position {
            cursor += 1;
        }
        for unit in token.label.arguments() {
            let LabelUnit::Argument {
                kind,
                role,
                source,
                pointer,
            } = unit
            else {
                continue;
            };
            let candidates = match pointer.direction {
                Direction::Left => Either::Left(keys[..cursor].iter().rev()),
                Direction::Right => Either::Right(keys[cursor..].iter()),
            };
            let chosen = candidates
                .filter(|k| k.position != token.position)
                .filter(|k| {
                    source
                        .as_deref()
                        .map_or(true, |s| has_source(mentions, **k, s, config))
                })
                .nth(pointer.hops - 1)
                .copied();
            let Some(key) = chosen else {
                debug!(
                    token = token.position,
                    text = token.text.as_str(),
                    pointer = %pointer,
                    "Not enough candidate sources, argument left unresolved"
                );
                counts.unresolved += 1;
                continue;
            };
            let Some(target) = mentions.targets.get(token.position).cloned().flatten() else {
                debug!(
                    token = token.position,
                    text = token.text.as_str(),
                    "Argument on a token without identifier"
                );
                counts.unresolved += 1;
                continue;
            };
            let expected = source.as_deref();
            for anchor in mentions
                .anchors
                .iter_mut()
                .filter(|a| a.key == key && is_source(&a.event, expected, config))
            {
                anchor
                    .event
                    .edges
                    .push(ArgumentEdge::new(role.as_str(), target.clone(), kind.as_str()));
            }
            counts.resolved += 1;
        }
    }
    counts
}

/// Is one of the events anchored at `key` of the expected source type?
fn has_source(
    mentions: &SentenceMentions,
    key: AnchorKey,
    source: &str,
    config: &DecoderConfig,
) -> bool {
    mentions
        .anchors
        .iter()
        .filter(|a| a.key == key)
        .any(|a| is_source(&a.event, Some(source), config))
}

/// An unknown source type accepts any event.
fn is_source(event: &Event, source: Option<&str>, config: &DecoderConfig) -> bool {
    source.map_or(true, |s| {
        matching_kind(&event.kind, config.normalize_binding())
            == matching_kind(s, config.normalize_binding())
    })
}
