//! Reading of the `struct` encoding, where the structure of a token (`B-T|+1`) and its types
//! (`B-Protein|Theme`) are predicted as two separate tasks joined by `{}`.
use super::{LabelError, LabelUnit, Pointer, OUTSIDE, SEP_PART};
use tracing::warn;

const SEP_TASK: &str = "{}";
const ENTITY_STRUCTURE: &str = "B-E";
const TRIGGER_STRUCTURE: &str = "B-T";

/// Parses a single `struct` head. A structure without head but with an argument type is an
/// error. A structure with a head but without argument type is kept as a bare mention and
/// logged.
pub(super) fn parse(raw: &str) -> Result<LabelUnit, LabelError> {
    let inconsistent = || LabelError::Inconsistent {
        label: String::from(raw),
    };
    if raw == OUTSIDE {
        return Ok(LabelUnit::Outside);
    }
    let Some((structure, types)) = raw.split_once(SEP_TASK) else {
        return Err(inconsistent());
    };
    if types.contains(SEP_TASK) {
        return Err(inconsistent());
    }
    match (structure.split_once(SEP_PART), types.split_once(SEP_PART)) {
        // O{}O, B-E{}B-Protein
        (None, None) => Ok(LabelUnit::mention_or_outside(types)),
        // B-E{}B-Protein|Theme: the argument has nowhere to point to.
        (None, Some(_)) => Err(inconsistent()),
        // B-T|+1{}B-Binding: the head has no role.
        (Some(_), None) => {
            let unit = LabelUnit::mention_or_outside(types);
            if unit == LabelUnit::Outside {
                return Err(inconsistent());
            }
            warn!(label = raw, "Structured label with a head but no role");
            Ok(unit)
        }
        (Some((tag, position)), Some((kind, role))) => {
            if tag != ENTITY_STRUCTURE && tag != TRIGGER_STRUCTURE {
                warn!(label = raw, tag, "Unrecognized structure tag");
            }
            let pointer = position
                .parse::<Pointer>()
                .map_err(|_| LabelError::Position {
                    label: String::from(raw),
                    position: position.to_string(),
                })?;
            match LabelUnit::mention_or_outside(kind) {
                LabelUnit::Mention { kind } if role != OUTSIDE => Ok(LabelUnit::Argument {
                    kind,
                    role: role.to_string(),
                    source: None,
                    pointer,
                }),
                LabelUnit::Mention { kind } => Ok(LabelUnit::Mention { kind }),
                _ => Err(inconsistent()),
            }
        }
    }
}
