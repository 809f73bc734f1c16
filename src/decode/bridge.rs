/*
 * Bridging of overlapping triggers. When the same words are typed as two triggers (for instance
 * `Positive_regulation` and `Gene_expression` on "overexpression"), the regulation never gets the
 * expression as argument because both sit on the same token. A new event is created for the
 * regulation with the expression event as Theme.
*/
use super::context::DecodingContext;
use crate::graph::{ArgTarget, ArgumentEdge, Event, EventId, TriggerMention};
use crate::label::THEME;
use itertools::Itertools;
use tracing::debug;

/// (target type, source type) pairs that are bridged.
const BRIDGED_PAIRS: [(&str, &str); 3] = [
    ("Gene_expression", "Positive_regulation"),
    ("Phosphorylation", "Positive_regulation"),
    ("Phosphorylation", "Negative_regulation"),
];

/// Orders an overlapping pair as (source, target), if its types are bridged.
fn orient<'a>(
    previous: &'a TriggerMention,
    current: &'a TriggerMention,
) -> Option<(&'a TriggerMention, &'a TriggerMention)> {
    BRIDGED_PAIRS
        .iter()
        .find_map(|&(target, source)| match (previous.kind.as_str(), current.kind.as_str()) {
            (p, c) if p == source && c == target => Some((previous, current)),
            (p, c) if p == target && c == source => Some((current, previous)),
            _ => None,
        })
}

/// Links the consecutive overlapping triggers of `triggers`. `events` holds every event of the
/// document decoded so far. Returns the number of new events.
pub(crate) fn bridge_triggers(
    triggers: &[TriggerMention],
    events: &mut Vec<Event>,
    ctx: &mut DecodingContext,
) -> usize {
    let mut created = 0;
    for (previous, current) in triggers.iter().tuple_windows() {
        if !previous.overlaps(current) {
            continue;
        }
        let Some((source, target)) = orient(previous, current) else {
            continue;
        };
        if events.iter().any(|e| e.trigger == source.id) {
            continue;
        }
        let targets: Vec<EventId> = events
            .iter()
            .filter(|e| e.trigger == target.id)
            .map(|e| e.id)
            .collect();
        for target_event in targets {
            let mut event = Event::new(ctx.next_bridged(), source.kind.as_str(), source.id);
            event.edges.push(ArgumentEdge::new(
                THEME,
                ArgTarget::Event(target_event),
                target.kind.as_str(),
            ));
            debug!(event = %event, "Overlapping triggers bridged");
            events.push(event);
            created += 1;
        }
    }
    created
}
