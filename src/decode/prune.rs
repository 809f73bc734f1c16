use crate::graph::{Event, EventId};
use ahash::AHashSet;

/// Removes the events with a dangling argument until none is left. Removing an event can leave
/// the events pointing at it dangling, hence the loop. Returns the removed identifiers in
/// removal order.
pub(crate) fn prune_orphans(events: &mut Vec<Event>) -> Vec<EventId> {
    let mut removed = Vec::new();
    loop {
        let alive: AHashSet<EventId> = events.iter().map(|e| e.id).collect();
        let before = removed.len();
        events.retain(|event| {
            let orphan = event.edges.iter().any(|edge| edge.target.is_dangling(&alive));
            if orphan {
                removed.push(event.id);
            }
            !orphan
        });
        if removed.len() == before {
            return removed;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::{ArgTarget, ArgumentEdge, TriggerId};
    use crate::label::THEME;
    use quickcheck::{Arbitrary, Gen, QuickCheck};

    fn event(id: u32, target: ArgTarget) -> Event {
        let mut event = Event::new(EventId(id), "Regulation", TriggerId(1000 + id));
        event
            .edges
            .push(ArgumentEdge::new(THEME, target, "Protein"));
        event
    }

    #[test]
    fn test_cascading_removal() {
        let mut events = vec![
            event(1, ArgTarget::Mention(String::from("T1"))),
            event(2, ArgTarget::Event(EventId(3))),
            event(3, ArgTarget::Event(EventId(4))),
            event(5, ArgTarget::Event(EventId(1))),
        ];
        let removed = prune_orphans(&mut events);
        assert_eq!(removed, vec![EventId(3), EventId(2)]);
        let kept: Vec<EventId> = events.iter().map(|e| e.id).collect();
        assert_eq!(kept, vec![EventId(1), EventId(5)]);
    }

    #[test]
    fn test_non_entity_mention_is_dangling() {
        let mut events = vec![event(1, ArgTarget::Mention(String::from("O")))];
        assert_eq!(prune_orphans(&mut events), vec![EventId(1)]);
        assert!(events.is_empty());
    }

    #[derive(Debug, Clone)]
    struct Graph(Vec<Event>);

    impl Arbitrary for Graph {
        fn arbitrary(g: &mut Gen) -> Self {
            let size = usize::arbitrary(g) % 12;
            let events = (0..size as u32)
                .map(|id| {
                    let target = if bool::arbitrary(g) {
                        ArgTarget::Event(EventId(u32::arbitrary(g) % 16))
                    } else {
                        ArgTarget::Mention(String::from("T1"))
                    };
                    event(id, target)
                })
                .collect();
            Graph(events)
        }
    }

    #[test]
    fn test_pruned_graph_is_closed() {
        fn closed(graph: Graph) -> bool {
            let mut events = graph.0;
            prune_orphans(&mut events);
            let alive: AHashSet<EventId> = events.iter().map(|e| e.id).collect();
            events
                .iter()
                .flat_map(|e| e.edges.iter())
                .all(|edge| !edge.target.is_dangling(&alive))
        }
        let mut qc = QuickCheck::new().tests(2000);
        qc.quickcheck(closed as fn(Graph) -> bool)
    }
}
