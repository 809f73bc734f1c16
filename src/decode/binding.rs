/*
 * Splitting of Binding events that collected several Themes. The encoding can only point a
 * token at one source, so a Binding with N participants reaches the decoder as one event with N
 * Themes. How they are paired again depends on the `BindingStrategy`. The `strategy` one looks
 * at the side of the trigger the Themes are on and at the case markers `of`, `to` and `with`.
*/
use crate::config::BindingStrategy;
use crate::document::Token;
use crate::graph::{ArgTarget, ArgumentEdge, Event};
use crate::label::THEME;
use itertools::Itertools;
use tracing::debug;

const ONE_TO_ONE_TAG: &str = "BindingN";
/// Highest numbered Theme a single event can hold (`Theme5`).
const MAX_THEMES: usize = 5;
/// Number of tokens after the trigger searched for a case marker.
const MARKER_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// How the Themes of one Binding event are distributed over new events.
pub(crate) enum Pairing {
    /// One event per Theme.
    OneToOne,
    /// One event holding every Theme, numbered `Theme`, `Theme2`, ...
    FanOut,
    /// The first Theme paired with each of the others.
    LeftToMany,
    /// The last Theme paired with each of the others.
    RightToMany,
    /// One event per unordered pair of Themes.
    Pairs,
}

impl Pairing {
    /// The edge lists of the events replacing the original one.
    pub(crate) fn emit(self, themes: &[&ArgumentEdge]) -> Vec<Vec<ArgumentEdge>> {
        let second = |edge: &ArgumentEdge| edge.with_role(numbered_theme(2));
        match self {
            Self::OneToOne => themes.iter().map(|t| vec![(*t).clone()]).collect(),
            Self::FanOut => vec![themes
                .iter()
                .take(MAX_THEMES)
                .enumerate()
                .map(|(i, t)| t.with_role(numbered_theme(i + 1)))
                .collect()],
            Self::LeftToMany => match themes.split_first() {
                Some((first, rest)) => rest
                    .iter()
                    .map(|t| vec![(*first).clone(), second(*t)])
                    .collect(),
                None => Vec::new(),
            },
            Self::RightToMany => match themes.split_last() {
                Some((last, rest)) => rest
                    .iter()
                    .map(|t| vec![(*last).clone(), second(*t)])
                    .collect(),
                None => Vec::new(),
            },
            Self::Pairs => themes
                .iter()
                .tuple_combinations()
                .map(|(a, b)| vec![(*a).clone(), second(*b)])
                .collect(),
        }
    }
}

fn numbered_theme(n: usize) -> String {
    if n <= 1 {
        String::from(THEME)
    } else {
        format!("{}{}", THEME, n)
    }
}

/// Tokens of a sentence together with what an argument read on each of them points to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SentenceView<'a> {
    pub(crate) tokens: &'a [Token],
    pub(crate) targets: &'a [Option<ArgTarget>],
}

/// Chooses how to pair the Themes of a Binding event.
pub(crate) fn choose_pairing(
    strategy: BindingStrategy,
    event: &Event,
    themes: &[&ArgumentEdge],
    view: &SentenceView,
) -> Pairing {
    match strategy {
        BindingStrategy::Two => Pairing::Pairs,
        BindingStrategy::Positional => Pairing::LeftToMany,
        BindingStrategy::Encoded if event.kind == ONE_TO_ONE_TAG => Pairing::OneToOne,
        BindingStrategy::Encoded => Pairing::FanOut,
        BindingStrategy::Strategy => read_case_markers(event, themes, view),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Marker {
    Of,
    To,
    With,
}

impl Marker {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "of" => Some(Self::Of),
            "to" => Some(Self::To),
            "with" => Some(Self::With),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mask {
    Blank,
    Theme,
    Trigger,
    Marker(Marker),
}

fn read_case_markers(event: &Event, themes: &[&ArgumentEdge], view: &SentenceView) -> Pairing {
    let own_target = ArgTarget::Event(event.id);
    let mut mask = vec![Mask::Blank; view.tokens.len()];
    let mut theme_positions = Vec::new();
    let mut markers = Vec::new();
    let mut markers_after_trigger: Vec<Marker> = Vec::new();
    let mut trigger = None;
    for (i, token) in view.tokens.iter().enumerate() {
        match view.targets.get(i).and_then(Option::as_ref) {
            Some(target) if themes.iter().any(|t| &t.target == target) => {
                theme_positions.push(i);
                mask[i] = Mask::Theme;
            }
            Some(target) if *target == own_target => {
                trigger = Some(i);
                mask[i] = Mask::Trigger;
            }
            _ => {}
        }
        if let Some(marker) = Marker::from_word(&token.text) {
            if !markers_after_trigger.contains(&marker) {
                markers.push(i);
                mask[i] = Mask::Marker(marker);
            }
            if trigger.is_some() {
                markers_after_trigger.push(marker);
            }
        }
    }
    let Some(trigger) = trigger else {
        debug!(event = %event.id, "Binding trigger not found in its sentence");
        return Pairing::FanOut;
    };

    let (left, right): (Vec<usize>, Vec<usize>) = theme_positions
        .iter()
        .copied()
        .filter(|&p| p != trigger)
        .partition(|&p| p < trigger);
    if !left.is_empty() && !right.is_empty() {
        return match (left.len(), right.len()) {
            (1, _) => Pairing::LeftToMany,
            (_, 1) => Pairing::RightToMany,
            _ => Pairing::FanOut,
        };
    }

    let window_end = (trigger + 1 + MARKER_WINDOW).min(mask.len());
    let followed_by_marker = mask[(trigger + 1).min(window_end)..window_end]
        .iter()
        .any(|m| matches!(m, Mask::Marker(Marker::With) | Mask::Marker(Marker::To)));
    if right.is_empty() && followed_by_marker {
        return Pairing::OneToOne;
    }
    match right.last() {
        Some(&last) if left.is_empty() => {
            let between: Vec<usize> = markers
                .iter()
                .copied()
                .filter(|&m| trigger < m && m <= last)
                .collect();
            if between.len() < 2 {
                return Pairing::FanOut;
            }
            let count = |from: usize, to: usize| {
                mask[from + 1..=to]
                    .iter()
                    .filter(|m| **m == Mask::Theme)
                    .count()
            };
            let first_segment = count(between[0], between[1]);
            let second_segment = if last > between[1] {
                count(between[1], last)
            } else {
                0
            };
            match (first_segment, second_segment) {
                (0, _) | (_, 0) => Pairing::OneToOne,
                (1, _) => Pairing::LeftToMany,
                (_, 1) => Pairing::RightToMany,
                _ => Pairing::FanOut,
            }
        }
        _ => Pairing::FanOut,
    }
}
