//! Mentions, events and argument edges of a decoded document.
use crate::document::Span;
use crate::label::{CAUSE, THEME};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Entity (and trigger) identifiers start with this prefix. Anything else that is not a known
/// event is a dangling reference.
pub const ENTITY_ID_PREFIX: &str = "T";

/// Target used for events kept without any argument.
pub const PLACEHOLDER_TARGET: &str = "T1";
const PLACEHOLDER_TYPE: &str = "Protein";

const BINDING: &str = "Binding";
const BINDING_SUBTYPES: [&str; 4] = ["Binding1", "BindingK", "BindingN", "BindingS"];

/// Is this event type one of the Binding variants (`Binding`, `Binding1`, `BindingN`, ...)?
pub fn is_binding(kind: &str) -> bool {
    kind.starts_with(BINDING)
}

/// Maps the Binding sub-types introduced by the encoder back to `Binding`.
pub fn canonical_kind(kind: &str) -> &str {
    if BINDING_SUBTYPES.contains(&kind) {
        BINDING
    } else {
        kind
    }
}

/// Type used when matching a source event. `normalize` collapses every Binding variant.
pub(crate) fn matching_kind(kind: &str, normalize: bool) -> &str {
    if normalize && is_binding(kind) {
        BINDING
    } else {
        kind
    }
}

/// Theme given to an event kept without any argument.
pub(crate) fn placeholder_theme() -> ArgumentEdge {
    ArgumentEdge::new(
        THEME,
        ArgTarget::Mention(String::from(PLACEHOLDER_TARGET)),
        PLACEHOLDER_TYPE,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriggerId(pub u32);

impl Display for TriggerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u32);

impl Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// What an argument edge points to.
pub enum ArgTarget {
    /// A mention identifier read from the input (usually an entity, such as `T3`).
    Mention(String),
    /// An event decoded from the same document.
    Event(EventId),
}

impl ArgTarget {
    pub fn as_event(&self) -> Option<EventId> {
        match self {
            Self::Event(id) => Some(*id),
            Self::Mention(_) => None,
        }
    }

    /// A target is dangling when it is neither an entity identifier nor a surviving event.
    pub fn is_dangling(&self, events: &AHashSet<EventId>) -> bool {
        match self {
            Self::Event(id) => !events.contains(id),
            Self::Mention(id) => !id.starts_with(ENTITY_ID_PREFIX),
        }
    }
}

impl Display for ArgTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mention(id) => write!(f, "{}", id),
            Self::Event(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArgumentEdge {
    pub role: String,
    pub target: ArgTarget,
    /// Mention type of the token the edge was read from.
    pub target_type: String,
}

impl ArgumentEdge {
    pub fn new<R: Into<String>, K: Into<String>>(role: R, target: ArgTarget, target_type: K) -> Self {
        ArgumentEdge {
            role: role.into(),
            target,
            target_type: target_type.into(),
        }
    }

    pub fn is_theme(&self) -> bool {
        self.role == THEME
    }

    pub fn is_cause(&self) -> bool {
        self.role == CAUSE
    }

    /// Same edge under another role, used for the numbered Themes of Binding events.
    pub(crate) fn with_role<R: Into<String>>(&self, role: R) -> Self {
        ArgumentEdge {
            role: role.into(),
            ..self.clone()
        }
    }

    pub(crate) fn retarget(&self, id: EventId) -> Self {
        ArgumentEdge {
            target: ArgTarget::Event(id),
            ..self.clone()
        }
    }
}

impl Display for ArgumentEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.role, self.target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityMention {
    pub id: String,
    pub kind: String,
    pub span: Span,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerMention {
    pub id: TriggerId,
    pub kind: String,
    pub span: Span,
    pub text: String,
}

impl TriggerMention {
    /// Grows the trigger over the next token of a multi-token trigger.
    pub(crate) fn absorb(&mut self, span: Span, text: &str) {
        self.span.end = span.end;
        self.text.push(' ');
        self.text.push_str(text);
    }

    /// Same extracted text at the same offsets.
    pub fn overlaps(&self, other: &TriggerMention) -> bool {
        self.span == other.span && self.text == other.text
    }
}

/// One trigger line of an `.a2` file.
impl Display for TriggerMention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{} {} {}\t{}",
            self.id,
            canonical_kind(&self.kind),
            self.span.start,
            self.span.end,
            self.text
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub kind: String,
    pub trigger: TriggerId,
    pub edges: Vec<ArgumentEdge>,
}

impl Event {
    /// An event without any edge yet.
    pub fn new<K: Into<String>>(id: EventId, kind: K, trigger: TriggerId) -> Self {
        Event {
            id,
            kind: kind.into(),
            trigger,
            edges: Vec::new(),
        }
    }

    /// Another event anchored on the same trigger.
    pub(crate) fn derive(&self, id: EventId, edges: Vec<ArgumentEdge>) -> Self {
        Event {
            id,
            kind: self.kind.clone(),
            trigger: self.trigger,
            edges,
        }
    }

    pub fn themes(&self) -> impl Iterator<Item = &ArgumentEdge> {
        self.edges.iter().filter(|e| e.is_theme())
    }

    pub fn causes(&self) -> impl Iterator<Item = &ArgumentEdge> {
        self.edges.iter().filter(|e| e.is_cause())
    }

    /// Numbered Themes (`Theme2`, ...) count as Themes.
    pub fn has_theme(&self) -> bool {
        self.edges.iter().any(|e| e.role.starts_with(THEME))
    }

    pub fn is_binding(&self) -> bool {
        is_binding(&self.kind)
    }

    /// Events referenced by the edges of this event.
    pub fn referenced_events(&self) -> impl Iterator<Item = EventId> + '_ {
        self.edges.iter().filter_map(|e| e.target.as_event())
    }
}

/// One event line of an `.a2` file.
impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}:{}", self.id, canonical_kind(&self.kind), self.trigger)?;
        for edge in &self.edges {
            write!(f, " {}", edge)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Binding1", "Binding")]
    #[case("BindingN", "Binding")]
    #[case("BindingK", "Binding")]
    #[case("BindingS", "Binding")]
    #[case("Binding", "Binding")]
    #[case("Positive_regulation", "Positive_regulation")]
    fn test_canonical_kind(#[case] kind: &str, #[case] expected: &str) {
        assert_eq!(canonical_kind(kind), expected)
    }

    #[test]
    fn test_matching_kind() {
        assert_eq!(matching_kind("BindingN", true), "Binding");
        assert_eq!(matching_kind("BindingN", false), "BindingN");
        assert_eq!(matching_kind("Transcription", true), "Transcription");
    }

    #[test]
    fn test_event_display() {
        let mut event = Event::new(EventId(3), "Binding1", TriggerId(1002));
        event.edges.push(ArgumentEdge::new(
            THEME,
            ArgTarget::Mention(String::from("T4")),
            "Protein",
        ));
        event.edges.push(ArgumentEdge::new(
            "Theme2",
            ArgTarget::Mention(String::from("T5")),
            "Protein",
        ));
        assert_eq!(event.to_string(), "E3\tBinding:T1002 Theme:T4 Theme2:T5");
        assert!(event.has_theme());
        assert_eq!(event.themes().count(), 1);
    }

    #[test]
    fn test_trigger_display_and_absorb() {
        let mut trigger = TriggerMention {
            id: TriggerId(1001),
            kind: String::from("Gene_expression"),
            span: Span::new(10, 20),
            text: String::from("expression"),
        };
        trigger.absorb(Span::new(21, 26), "level");
        assert_eq!(trigger.to_string(), "T1001\tGene_expression 10 26\texpression level");
    }

    #[test]
    fn test_dangling_targets() {
        let events: AHashSet<EventId> = AHashSet::from_iter([EventId(1)]);
        assert!(!ArgTarget::Event(EventId(1)).is_dangling(&events));
        assert!(ArgTarget::Event(EventId(2)).is_dangling(&events));
        assert!(!ArgTarget::Mention(String::from("T7")).is_dangling(&events));
        assert!(ArgTarget::Mention(String::from("E7")).is_dangling(&events));
    }
}
