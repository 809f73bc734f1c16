/*
 * Substitution of references to split events. An event pointing at a replaced event is itself
 * replaced by one clone per combination of replacements, which can in turn be referenced by
 * another event. The work list shrinks every round an event is finalized, and a round cap stops
 * reference cycles.
*/
use super::context::DecodingContext;
use super::unmerge::Remap;
use crate::config::DecoderConfig;
use crate::graph::{placeholder_theme, ArgumentEdge, Event};
use itertools::Itertools;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Resolution {
    pub(crate) finalized: Vec<Event>,
    /// Events still open when the round cap was hit.
    pub(crate) discarded: usize,
    /// Finalized events dropped because they had no Theme.
    pub(crate) dropped: usize,
    pub(crate) rounds: usize,
}

pub(crate) fn resolve_references(
    events: Vec<Event>,
    mut remap: Remap,
    config: &DecoderConfig,
    ctx: &mut DecodingContext,
) -> Resolution {
    let mut resolution = Resolution::default();
    let mut open = events;
    while !open.is_empty() && resolution.rounds < config.max_rounds() {
        resolution.rounds += 1;
        let stale: Vec<_> = remap.keys().copied().collect();
        let mut candidates = Vec::with_capacity(open.len());
        for event in open.drain(..) {
            if !event.referenced_events().any(|id| remap.contains_key(&id)) {
                candidates.push(event);
                continue;
            }
            let slots: Vec<Vec<ArgumentEdge>> = event
                .edges
                .iter()
                .map(|edge| match edge.target.as_event().and_then(|id| remap.get(&id)) {
                    Some(ids) => ids.iter().map(|id| edge.retarget(*id)).collect(),
                    None => vec![edge.clone()],
                })
                .collect();
            let clones: Vec<Event> = slots
                .into_iter()
                .multi_cartesian_product()
                .map(|edges| event.derive(ctx.next_expanded(), edges))
                .collect();
            debug!(event = %event.id, clones = clones.len(), "References substituted");
            remap.insert(event.id, clones.iter().map(|e| e.id).collect());
            candidates.extend(clones);
        }
        for id in stale {
            remap.remove(&id);
        }
        for event in candidates {
            if event.referenced_events().any(|id| remap.contains_key(&id)) {
                open.push(event);
            } else {
                finalize(event, config, &mut resolution);
            }
        }
    }
    if !open.is_empty() {
        warn!(
            open = open.len(),
            rounds = resolution.rounds,
            "Probable reference loop, open events discarded"
        );
        resolution.discarded = open.len();
    }
    resolution
}

fn finalize(mut event: Event, config: &DecoderConfig, resolution: &mut Resolution) {
    if event.has_theme() {
        resolution.finalized.push(event);
    } else if config.keep_empty_events() {
        event.edges.insert(0, placeholder_theme());
        resolution.finalized.push(event);
    } else {
        debug!(event = %event.id, kind = event.kind.as_str(), "Event without Theme dropped");
        resolution.dropped += 1;
    }
}
