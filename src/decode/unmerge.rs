/*
 * Un-merging of events holding several Themes or several Causes. Every replaced event is
 * recorded in a `Remap` so that the events pointing at it can be expanded later on.
*/
use super::binding::{choose_pairing, SentenceView};
use super::context::DecodingContext;
use crate::config::{BindingStrategy, DecoderConfig};
use crate::graph::{ArgumentEdge, Event, EventId};
use ahash::AHashMap;
use itertools::iproduct;
use tracing::warn;

const BINDING: &str = "Binding";

/// Replaced event -> the events replacing it. An empty list means the event was dropped.
pub(crate) type Remap = AHashMap<EventId, Vec<EventId>>;

#[derive(Debug, Clone, Default)]
pub(crate) struct Unmerged {
    pub(crate) events: Vec<Event>,
    pub(crate) remap: Remap,
    /// Number of events created by splitting.
    pub(crate) split: usize,
}

pub(crate) fn unmerge_events(
    events: Vec<Event>,
    view: &SentenceView,
    config: &DecoderConfig,
    ctx: &mut DecodingContext,
) -> Unmerged {
    let mut unmerged = Unmerged::default();
    for event in events {
        let themes: Vec<&ArgumentEdge> = event.themes().collect();
        let causes: Vec<&ArgumentEdge> = event.causes().collect();
        if themes.len() <= 1 && causes.len() <= 1 {
            unmerged.events.push(event);
            continue;
        }
        let edge_sets = split_edges(&event, &themes, &causes, view, config);
        let kind = if event.is_binding() && config.binding_strategy() == BindingStrategy::Encoded
        {
            BINDING
        } else {
            event.kind.as_str()
        };
        let mut replacements = Vec::with_capacity(edge_sets.len());
        for edges in edge_sets {
            let mut split = event.derive(ctx.next_split(), edges);
            split.kind = kind.to_string();
            replacements.push(split.id);
            unmerged.events.push(split);
        }
        unmerged.split += replacements.len();
        unmerged.remap.insert(event.id, replacements);
    }
    unmerged
}

/// Edge lists of the events replacing `event`. Only Themes and Causes survive a split.
fn split_edges(
    event: &Event,
    themes: &[&ArgumentEdge],
    causes: &[&ArgumentEdge],
    view: &SentenceView,
    config: &DecoderConfig,
) -> Vec<Vec<ArgumentEdge>> {
    let pair = |theme: Option<&&ArgumentEdge>, cause: Option<&&ArgumentEdge>| {
        theme
            .into_iter()
            .chain(cause)
            .map(|e| (*e).clone())
            .collect::<Vec<_>>()
    };
    match (themes.len() > 1, causes.len() > 1) {
        (false, _) => causes
            .iter()
            .map(|cause| pair(themes.first(), Some(cause)))
            .collect(),
        (true, false) if event.is_binding() => {
            choose_pairing(config.binding_strategy(), event, themes, view).emit(themes)
        }
        (true, false) => themes
            .iter()
            .map(|theme| pair(Some(theme), causes.first()))
            .collect(),
        (true, true) if event.is_binding() => {
            warn!(
                event = %event.id,
                themes = themes.len(),
                causes = causes.len(),
                "Binding event with several Causes dropped"
            );
            Vec::new()
        }
        (true, true) => iproduct!(themes, causes)
            .map(|(theme, cause)| pair(Some(theme), Some(cause)))
            .collect(),
    }
}
