//! Per document state of the decoder.
use crate::graph::{EventId, TriggerId};
use ahash::AHashSet;

const FIRST_TRIGGER: u32 = 1001;
const FIRST_EVENT: u32 = 1;
const FIRST_SPLIT_EVENT: u32 = 1001;
const FIRST_EXPANDED_EVENT: u32 = 2001;
const FIRST_BRIDGE_EVENT: u32 = 9001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Monotonic counter handing out identifiers from `start`.
pub(crate) struct IdRange {
    next: u32,
}

impl IdRange {
    pub(crate) fn starting_at(start: u32) -> Self {
        IdRange { next: start }
    }

    pub(crate) fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Every counter used while decoding one document. A new context is created for each document,
/// nothing in it outlives the document. The event ranges may run into each other on long
/// documents, an identifier already handed out by another range is skipped.
#[derive(Debug, Clone)]
pub(crate) struct DecodingContext {
    triggers: IdRange,
    events: IdRange,
    split: IdRange,
    expanded: IdRange,
    bridged: IdRange,
    issued_events: AHashSet<EventId>,
    /// Entity identifiers already turned into a mention.
    seen_entities: AHashSet<String>,
}

impl Default for DecodingContext {
    fn default() -> Self {
        DecodingContext {
            triggers: IdRange::starting_at(FIRST_TRIGGER),
            events: IdRange::starting_at(FIRST_EVENT),
            split: IdRange::starting_at(FIRST_SPLIT_EVENT),
            expanded: IdRange::starting_at(FIRST_EXPANDED_EVENT),
            bridged: IdRange::starting_at(FIRST_BRIDGE_EVENT),
            issued_events: AHashSet::new(),
            seen_entities: AHashSet::new(),
        }
    }
}

impl DecodingContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_trigger(&mut self) -> TriggerId {
        TriggerId(self.triggers.next_id())
    }

    /// Events created by the mention builder.
    pub(crate) fn next_event(&mut self) -> EventId {
        claim(&mut self.events, &mut self.issued_events)
    }

    /// Events created by un-merging.
    pub(crate) fn next_split(&mut self) -> EventId {
        claim(&mut self.split, &mut self.issued_events)
    }

    /// Clones created while substituting references to split events.
    pub(crate) fn next_expanded(&mut self) -> EventId {
        claim(&mut self.expanded, &mut self.issued_events)
    }

    pub(crate) fn next_bridged(&mut self) -> EventId {
        claim(&mut self.bridged, &mut self.issued_events)
    }

    /// Returns true the first time an entity identifier is seen in the document.
    pub(crate) fn first_sighting(&mut self, entity_id: &str) -> bool {
        if self.seen_entities.contains(entity_id) {
            false
        } else {
            self.seen_entities.insert(entity_id.to_string())
        }
    }
}

fn claim(range: &mut IdRange, issued: &mut AHashSet<EventId>) -> EventId {
    loop {
        let id = EventId(range.next_id());
        if issued.insert(id) {
            return id;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ranges_are_independent() {
        let mut ctx = DecodingContext::new();
        assert_eq!(ctx.next_trigger(), TriggerId(1001));
        assert_eq!(ctx.next_trigger(), TriggerId(1002));
        assert_eq!(ctx.next_event(), EventId(1));
        assert_eq!(ctx.next_split(), EventId(1001));
        assert_eq!(ctx.next_expanded(), EventId(2001));
        assert_eq!(ctx.next_bridged(), EventId(9001));
        assert_eq!(ctx.next_event(), EventId(2));
    }

    #[test]
    fn test_overlapping_ranges_skip_issued_events() {
        let mut ctx = DecodingContext::new();
        assert_eq!(ctx.next_split(), EventId(1001));
        assert_eq!(ctx.next_split(), EventId(1002));
        for _ in 0..1000 {
            ctx.next_event();
        }
        assert_eq!(ctx.next_event(), EventId(1003));
        assert_eq!(ctx.next_split(), EventId(1004));
    }

    #[test]
    fn test_first_sighting() {
        let mut ctx = DecodingContext::new();
        assert!(ctx.first_sighting("T3"));
        assert!(!ctx.first_sighting("T3"));
        assert!(ctx.first_sighting("T4"));
    }
}
