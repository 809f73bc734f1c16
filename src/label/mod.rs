/**
This modules parses the label column of a token into a `TokenLabel`. A label is made of one or
more heads (separated by `$`) and each head is a `LabelUnit`: the token is outside of any
mention, is a mention, or is a mention that is also the argument of an event found a few triggers
away.
*/
use crate::config::Encoding;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

mod structured;

/// Marker of a token (or of a field) that carries no information.
pub const OUTSIDE: &str = "O";
/// Role name of the main argument of an event.
pub const THEME: &str = "Theme";
/// Role name of the agent of a regulation.
pub const CAUSE: &str = "Cause";

pub(crate) const SEP_PART: char = '|';
pub(crate) const SEP_HEADS: char = '$';
pub(crate) const SEP_TYPES: &str = "////";
pub(crate) const TAG_PREFIX: &str = "B-";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("The label `{label}` has {arity} fields. Only 1, 2 or 4 fields are allowed")]
    Arity { label: String, arity: usize },
    #[error("The label `{label}` has an unreadable relative position `{position}`")]
    Position { label: String, position: String },
    #[error("The structured label `{label}` is inconsistent")]
    Inconsistent { label: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Side of the token on which the source event has to be looked for.
pub enum Direction {
    /// `-`: the source is before the token.
    Left,
    /// `+`: the source is after the token.
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Relative position of the source event: the `hops`-th trigger of the right type on the given
/// side of the token. `hops` starts at 1.
pub struct Pointer {
    pub direction: Direction,
    pub hops: usize,
}

impl Pointer {
    pub fn new(direction: Direction, hops: usize) -> Self {
        Pointer { direction, hops }
    }
}

impl FromStr for Pointer {
    type Err = LabelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || LabelError::Position {
            label: String::from(s),
            position: String::from(s),
        };
        let mut chars = s.chars();
        let direction = match chars.next() {
            Some('+') => Direction::Right,
            Some('-') => Direction::Left,
            _ => return Err(error()),
        };
        match chars.as_str().parse::<usize>() {
            Ok(hops) if hops > 0 => Ok(Pointer { direction, hops }),
            _ => Err(error()),
        }
    }
}

impl Display for Pointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = match self.direction {
            Direction::Left => '-',
            Direction::Right => '+',
        };
        write!(f, "{}{}", sign, self.hops)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
/// One head of a token label.
pub enum LabelUnit {
    #[default]
    Outside,
    /// The token is a mention without outgoing argument.
    Mention { kind: String },
    /// The token is a mention and the `role` argument of an event of type `source` located with
    /// `pointer`. `source` is `None` when the encoding does not carry the type of the source.
    Argument {
        kind: String,
        role: String,
        source: Option<String>,
        pointer: Pointer,
    },
}

impl LabelUnit {
    /// Parses a single head in the `single` encoding (no `$` separator).
    pub fn parse(raw: &str) -> Result<Self, LabelError> {
        let parts: Vec<&str> = raw.split(SEP_PART).collect();
        match parts.as_slice() {
            [kind] => Ok(Self::mention_or_outside(kind)),
            [kind, _] => Ok(Self::mention_or_outside(kind)),
            [kind, role, source, position] => {
                if *kind == OUTSIDE {
                    return Ok(Self::Outside);
                }
                if *role == OUTSIDE {
                    return Ok(Self::mention_or_outside(kind));
                }
                let pointer = position.parse::<Pointer>().map_err(|_| LabelError::Position {
                    label: String::from(raw),
                    position: position.to_string(),
                })?;
                Ok(Self::Argument {
                    kind: strip_tag(kind).to_string(),
                    role: role.to_string(),
                    source: Some(source.to_string()),
                    pointer,
                })
            }
            _ => Err(LabelError::Arity {
                label: String::from(raw),
                arity: parts.len(),
            }),
        }
    }

    pub(crate) fn mention_or_outside(kind: &str) -> Self {
        if kind == OUTSIDE || kind.is_empty() {
            Self::Outside
        } else {
            Self::Mention {
                kind: strip_tag(kind).to_string(),
            }
        }
    }

    /// The raw mention type, which can hold several trigger types joined by `////`.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Outside => None,
            Self::Mention { kind } | Self::Argument { kind, .. } => Some(kind),
        }
    }

    /// The individual mention types of this head.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kind()
            .into_iter()
            .flat_map(|k| k.split(SEP_TYPES))
            .map(strip_tag)
            .filter(|k| !k.is_empty())
    }

    pub fn role(&self) -> Option<&str> {
        match self {
            Self::Argument { role, .. } => Some(role),
            _ => None,
        }
    }

    pub fn pointer(&self) -> Option<Pointer> {
        match self {
            Self::Argument { pointer, .. } => Some(*pointer),
            _ => None,
        }
    }

    /// Two heads pointing at the same source through the same type and position.
    fn same_head(&self, other: &LabelUnit) -> bool {
        match (self, other) {
            (
                Self::Argument {
                    kind,
                    source,
                    pointer,
                    ..
                },
                Self::Argument {
                    kind: other_kind,
                    source: other_source,
                    pointer: other_pointer,
                    ..
                },
            ) => kind == other_kind && source == other_source && pointer == other_pointer,
            _ => false,
        }
    }
}

fn strip_tag(kind: &str) -> &str {
    kind.strip_prefix(TAG_PREFIX).unwrap_or(kind)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// The parsed label of a token. It always holds at least one head.
pub struct TokenLabel {
    units: Vec<LabelUnit>,
}

impl Default for TokenLabel {
    fn default() -> Self {
        Self::outside()
    }
}

impl TokenLabel {
    pub fn outside() -> Self {
        TokenLabel {
            units: vec![LabelUnit::Outside],
        }
    }

    pub fn from_units(units: Vec<LabelUnit>) -> Self {
        if units.is_empty() {
            Self::outside()
        } else {
            TokenLabel { units }
        }
    }

    /// Parses a raw label. This never fails: an inconsistent head is logged and replaced by
    /// `LabelUnit::Outside`.
    pub fn parse(raw: &str, encoding: Encoding) -> Self {
        let units = Self::try_parse(raw, encoding)
            .into_iter()
            .map(|res| {
                res.unwrap_or_else(|e| {
                    warn!(error = %e, "Inconsistent label, decoded as outside");
                    LabelUnit::Outside
                })
            })
            .collect();
        Self::from_units(units)
    }

    /// Parses every head of a raw label, keeping the errors.
    pub fn try_parse(raw: &str, encoding: Encoding) -> Vec<Result<LabelUnit, LabelError>> {
        raw.trim()
            .split(SEP_HEADS)
            .map(|head| match encoding {
                Encoding::Single => LabelUnit::parse(head),
                Encoding::Struct => structured::parse(head),
            })
            .collect()
    }

    /// The first head. It decides whether the token is an entity or a trigger.
    pub fn head(&self) -> &LabelUnit {
        &self.units[0]
    }

    pub fn units(&self) -> &[LabelUnit] {
        &self.units
    }

    pub fn is_multi_head(&self) -> bool {
        self.units.len() > 1
    }

    /// The heads that carry an argument. Heads pointing at the same source with the same type
    /// and position are collapsed, the `Cause` one being kept over any other role.
    pub fn arguments(&self) -> Vec<&LabelUnit> {
        let mut kept: Vec<&LabelUnit> = Vec::with_capacity(self.units.len());
        for unit in self.units.iter().filter(|u| u.role().is_some()) {
            match kept.iter().position(|k| k.same_head(unit)) {
                None => kept.push(unit),
                Some(i) => {
                    if unit.role() == Some(CAUSE) && kept[i].role() != Some(CAUSE) {
                        kept[i] = unit;
                    }
                }
            }
        }
        kept
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck::{self, TestResult};
    use rstest::rstest;

    fn argument(kind: &str, role: &str, source: &str, pointer: &str) -> LabelUnit {
        LabelUnit::Argument {
            kind: String::from(kind),
            role: String::from(role),
            source: Some(String::from(source)),
            pointer: pointer.parse().unwrap(),
        }
    }

    #[rstest]
    #[case("O", LabelUnit::Outside)]
    #[case("B-Protein", LabelUnit::Mention { kind: String::from("Protein") })]
    #[case("B-Protein|O", LabelUnit::Mention { kind: String::from("Protein") })]
    #[case("O|O", LabelUnit::Outside)]
    #[case("B-Protein|O|O|+1", LabelUnit::Mention { kind: String::from("Protein") })]
    fn test_parse_mentions(#[case] raw: &str, #[case] expected: LabelUnit) {
        assert_eq!(LabelUnit::parse(raw).unwrap(), expected)
    }

    #[test]
    fn test_parse_argument() {
        let actual = LabelUnit::parse("B-Protein|Theme|Gene_expression|+1").unwrap();
        assert_eq!(actual, argument("Protein", "Theme", "Gene_expression", "+1"));
        assert_eq!(
            actual.pointer(),
            Some(Pointer::new(Direction::Right, 1))
        );
        let actual = LabelUnit::parse("B-Positive_regulation|Cause|Binding|-12").unwrap();
        assert_eq!(actual.pointer(), Some(Pointer::new(Direction::Left, 12)));
    }

    #[rstest]
    #[case("B-Protein|Theme|Gene_expression", 3)]
    #[case("B-Protein|Theme|Gene_expression|+1|x", 5)]
    fn test_parse_bad_arity(#[case] raw: &str, #[case] arity: usize) {
        assert_eq!(
            LabelUnit::parse(raw),
            Err(LabelError::Arity {
                label: String::from(raw),
                arity
            })
        );
        assert_eq!(
            TokenLabel::parse(raw, Encoding::Single).head(),
            &LabelUnit::Outside
        );
    }

    #[rstest]
    #[case("?")]
    #[case("+0")]
    #[case("1")]
    #[case("-x")]
    fn test_parse_bad_position(#[case] position: &str) {
        let raw = format!("B-Protein|Theme|Binding|{}", position);
        assert!(matches!(
            LabelUnit::parse(&raw),
            Err(LabelError::Position { .. })
        ));
    }

    #[test]
    fn test_multi_type_trigger() {
        let unit = LabelUnit::parse("B-Gene_expression////Positive_regulation|O").unwrap();
        let kinds: Vec<_> = unit.kinds().collect();
        assert_eq!(kinds, vec!["Gene_expression", "Positive_regulation"]);
    }

    #[test]
    fn test_multi_head_label() {
        let label = TokenLabel::parse(
            "B-Protein|Theme|Gene_expression|+1$B-Protein|Theme|Transcription|+1",
            Encoding::Single,
        );
        assert!(label.is_multi_head());
        assert_eq!(label.arguments().len(), 2);
        assert_eq!(label.head().kind(), Some("Protein"));
    }

    #[test]
    fn test_multi_head_keeps_cause() {
        let label = TokenLabel::parse(
            "B-Protein|Theme|Positive_regulation|+1$B-Protein|Cause|Positive_regulation|+1",
            Encoding::Single,
        );
        let arguments = label.arguments();
        assert_eq!(arguments.len(), 1);
        assert_eq!(arguments[0].role(), Some(CAUSE));

        let label = TokenLabel::parse(
            "B-Protein|Cause|Regulation|-1$B-Protein|Theme|Regulation|-1",
            Encoding::Single,
        );
        let arguments = label.arguments();
        assert_eq!(arguments.len(), 1);
        assert_eq!(arguments[0].role(), Some(CAUSE));
    }

    #[test]
    fn test_mention_heads_are_not_arguments() {
        let label = TokenLabel::parse("B-Protein|O$B-Protein|Theme|Binding|-1", Encoding::Single);
        assert_eq!(label.arguments().len(), 1);
    }

    #[test]
    fn test_pointer_display_roundtrip() {
        for raw in ["+1", "-3", "+12"] {
            assert_eq!(raw.parse::<Pointer>().unwrap().to_string(), raw);
        }
    }

    #[test]
    fn test_parse_never_panics() {
        fn parse_any(raw: String) -> TestResult {
            let label = TokenLabel::parse(&raw, Encoding::Single);
            if label.units().is_empty() {
                return TestResult::failed();
            }
            let label = TokenLabel::parse(&raw, Encoding::Struct);
            TestResult::from_bool(!label.units().is_empty())
        }
        let mut qc = quickcheck::QuickCheck::new().tests(2000);
        qc.quickcheck(parse_any as fn(String) -> TestResult)
    }
}
