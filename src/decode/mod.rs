/*
 * The decoding pipeline. Documents are decoded independently and sentence by sentence: mentions
 * are built, arguments are attached to their source events, events with several Themes or Causes
 * are split, references to split events are substituted, orphan events are pruned and
 * overlapping triggers are bridged.
*/
mod binding;
mod bridge;
mod context;
mod mentions;
mod prune;
mod references;
mod resolver;
mod unmerge;

use crate::config::DecoderConfig;
use crate::document::{Document, Sentence};
use crate::graph::{EntityMention, Event, EventId, TriggerId, TriggerMention};
use binding::SentenceView;
use context::DecodingContext;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::Write;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Counters gathered while decoding one document.
pub struct DecodeStats {
    pub sentences: usize,
    pub tokens: usize,
    pub resolved_arguments: usize,
    pub unresolved_arguments: usize,
    /// Events created by un-merging.
    pub split_events: usize,
    /// Events still referencing a split event when the round cap was hit.
    pub discarded_events: usize,
    /// Events dropped for lack of a Theme.
    pub dropped_events: usize,
    pub pruned_events: usize,
    pub bridged_events: usize,
}

impl DecodeStats {
    fn merge(&mut self, other: &DecodeStats) {
        self.sentences += other.sentences;
        self.tokens += other.tokens;
        self.resolved_arguments += other.resolved_arguments;
        self.unresolved_arguments += other.unresolved_arguments;
        self.split_events += other.split_events;
        self.discarded_events += other.discarded_events;
        self.dropped_events += other.dropped_events;
        self.pruned_events += other.pruned_events;
        self.bridged_events += other.bridged_events;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// The event graph of one document.
pub struct DecodedDocument {
    pub id: String,
    pub entities: Vec<EntityMention>,
    pub triggers: Vec<TriggerMention>,
    pub events: Vec<Event>,
    pub stats: DecodeStats,
}

impl DecodedDocument {
    fn new<S: Into<String>>(id: S) -> Self {
        DecodedDocument {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn trigger(&self, id: TriggerId) -> Option<&TriggerMention> {
        self.triggers.iter().find(|t| t.id == id)
    }

    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Writes the `.a2` annotation of the document: triggers first, then events.
    pub fn write_a2<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        write!(writer, "{}", self)?;
        writer.flush()
    }

    pub fn to_a2(&self) -> String {
        self.to_string()
    }
}

impl Display for DecodedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for trigger in &self.triggers {
            writeln!(f, "{}", trigger)?;
        }
        for event in &self.events {
            writeln!(f, "{}", event)?;
        }
        Ok(())
    }
}

/// Decodes every document, in parallel if the config asks for it. The output keeps the order
/// of the input.
pub fn decode_documents(documents: &[Document], config: &DecoderConfig) -> Vec<DecodedDocument> {
    if config.parallel() {
        documents
            .par_iter()
            .map(|d| decode_document(d, config))
            .collect()
    } else {
        documents
            .iter()
            .map(|d| decode_document(d, config))
            .collect()
    }
}

pub fn decode_document(document: &Document, config: &DecoderConfig) -> DecodedDocument {
    let mut ctx = DecodingContext::new();
    let mut decoded = DecodedDocument::new(document.id.as_str());
    for sentence in &document.sentences {
        let stats = decode_sentence(sentence, config, &mut ctx, &mut decoded);
        decoded.stats.merge(&stats);
    }
    debug!(
        document = decoded.id.as_str(),
        triggers = decoded.triggers.len(),
        events = decoded.events.len(),
        stats = ?decoded.stats,
        "Document decoded"
    );
    decoded
}

fn decode_sentence(
    sentence: &Sentence,
    config: &DecoderConfig,
    ctx: &mut DecodingContext,
    decoded: &mut DecodedDocument,
) -> DecodeStats {
    let mut stats = DecodeStats {
        sentences: 1,
        tokens: sentence.len(),
        ..Default::default()
    };
    let mut mentions = mentions::build_mentions(sentence, config, ctx);
    let counts = resolver::resolve_arguments(sentence, &mut mentions, config);
    stats.resolved_arguments = counts.resolved;
    stats.unresolved_arguments = counts.unresolved;

    let events: Vec<Event> = mentions.anchors.into_iter().map(|a| a.event).collect();
    let view = SentenceView {
        tokens: &sentence.tokens,
        targets: &mentions.targets,
    };
    let unmerged = unmerge::unmerge_events(events, &view, config, ctx);
    stats.split_events = unmerged.split;

    let resolution = references::resolve_references(unmerged.events, unmerged.remap, config, ctx);
    stats.discarded_events = resolution.discarded;
    stats.dropped_events = resolution.dropped;
    decoded.events.extend(resolution.finalized);
    stats.pruned_events = prune::prune_orphans(&mut decoded.events).len();

    if config.bridge_triggers() {
        stats.bridged_events = bridge::bridge_triggers(&mentions.triggers, &mut decoded.events, ctx);
    }
    decoded.entities.extend(mentions.entities);
    decoded.triggers.extend(mentions.triggers);
    stats
}
