/*
 * This modules contains the `DecoderConfig` struct and its builder. The config is passed to every
 * stage of the decoder and holds the few knobs the decoding pipeline exposes: how labels are
 * encoded, how Binding events are un-merged and which optional passes are run.
*/
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Round cap of the reference resolver when nothing else is specified.
pub const DEFAULT_MAX_ROUNDS: usize = 5;

/// Entity types recognized when nothing else is specified.
pub const DEFAULT_ENTITY_TYPES: [&str; 2] = ["Protein", "Entity"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Could not parse `{0}` into an `Encoding`. Expected `single` or `struct`")]
    Encoding(String),
    #[error(
        "Could not parse `{0}` into a `BindingStrategy`. Expected `encoded`, `two`, `positional` or `strategy`"
    )]
    BindingStrategy(String),
    #[error("Could not parse `{0}` into a toggle. Expected `yes` or `no`")]
    Toggle(String),
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
/// How the last column of a token line has to be read.
pub enum Encoding {
    /// `B-TYPE|ROLE|SOURCE_TYPE|+N`
    #[default]
    Single,
    /// `B-T|+N{}B-TYPE|ROLE`. The type of the source event is not encoded.
    Struct,
}

impl FromStr for Encoding {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "single" => Ok(Self::Single),
            "struct" => Ok(Self::Struct),
            _ => Err(ConfigError::Encoding(String::from(s))),
        }
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Single => "single",
            Self::Struct => "struct",
        };
        write!(f, "{}", name)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
/// Strategy used to split a Binding trigger that collected several Themes.
pub enum BindingStrategy {
    /// Trust the Binding sub-type written by the encoder (`BindingN` fans out, anything else is
    /// a single event with numbered Themes).
    Encoded,
    /// One event per unordered pair of Themes.
    Two,
    /// The first Theme is paired with each following Theme.
    Positional,
    /// Look at the side of the trigger the Themes are on and at the case markers around it.
    #[default]
    Strategy,
}

impl FromStr for BindingStrategy {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "encoded" => Ok(Self::Encoded),
            "two" => Ok(Self::Two),
            "positional" => Ok(Self::Positional),
            "strategy" => Ok(Self::Strategy),
            _ => Err(ConfigError::BindingStrategy(String::from(s))),
        }
    }
}

impl Display for BindingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Encoded => "encoded",
            Self::Two => "two",
            Self::Positional => "positional",
            Self::Strategy => "strategy",
        };
        write!(f, "{}", name)
    }
}

/// Parses the `yes`/`no` spelling used for the boolean options of the decoder.
pub fn parse_toggle(s: &str) -> Result<bool, ConfigError> {
    match s.to_lowercase().as_ref() {
        "yes" | "y" | "true" => Ok(true),
        "no" | "n" | "false" => Ok(false),
        _ => Err(ConfigError::Toggle(String::from(s))),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Config struct used to drive the decoder. It implements the default trait, which mirrors the
/// defaults of the tagging experiments.
pub struct DecoderConfig {
    /// How the label column is encoded.
    encoding: Encoding,
    /// How Binding triggers with several Themes are split.
    binding_strategy: BindingStrategy,
    /// Should `Binding1`, `BindingN`, ... all be matched as a plain `Binding` when looking for
    /// the source of an argument?
    normalize_binding: bool,
    /// Keep the events without a Theme by attaching a placeholder Theme to them.
    keep_empty_events: bool,
    /// Run the trigger bridging pass on overlapping triggers.
    bridge_triggers: bool,
    /// Decode documents on multiple cores. Documents share nothing, so the output is the same.
    parallel: bool,
    /// Mention types that are entities. Every other mention type is a trigger.
    entity_types: Vec<String>,
    /// Safety cap on the rounds of the reference resolver.
    max_rounds: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::Single,
            binding_strategy: BindingStrategy::Strategy,
            normalize_binding: true,
            keep_empty_events: false,
            bridge_triggers: true,
            parallel: false,
            entity_types: DEFAULT_ENTITY_TYPES.iter().map(|s| s.to_string()).collect(),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl DecoderConfig {
    pub fn builder() -> DecoderConfigBuilder {
        DecoderConfigBuilder::new()
    }
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
    pub fn binding_strategy(&self) -> BindingStrategy {
        self.binding_strategy
    }
    pub fn normalize_binding(&self) -> bool {
        self.normalize_binding
    }
    pub fn keep_empty_events(&self) -> bool {
        self.keep_empty_events
    }
    pub fn bridge_triggers(&self) -> bool {
        self.bridge_triggers
    }
    pub fn parallel(&self) -> bool {
        self.parallel
    }
    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }
    pub fn entity_types(&self) -> &[String] {
        &self.entity_types
    }
    pub fn is_entity_type(&self, kind: &str) -> bool {
        self.entity_types.iter().any(|t| t == kind)
    }
}

impl Display for DecoderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let string = format!("Label encoding: {}\n Binding strategy: {}\n Binding sub-types matched as Binding: {}\n Keeping events without arguments: {}\n Bridging overlapping triggers: {}\n Using parallel computations: {}\n Entity types: {:?}\n Maximum number of substitution rounds: {}", self.encoding, self.binding_strategy, self.normalize_binding, self.keep_empty_events, self.bridge_triggers, self.parallel, self.entity_types, self.max_rounds);
        write!(f, "{}", string)
    }
}

impl From<DecoderConfigBuilder> for DecoderConfig {
    fn from(value: DecoderConfigBuilder) -> Self {
        value.config
    }
}

/// This builder can be used to build and customize a `DecoderConfig` stucture.
#[derive(Debug, Clone, Default)]
pub struct DecoderConfigBuilder {
    config: DecoderConfig,
}

impl DecoderConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: DecoderConfig::default(),
        }
    }
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.config.encoding = encoding;
        self
    }
    pub fn binding_strategy(mut self, strategy: BindingStrategy) -> Self {
        self.config.binding_strategy = strategy;
        self
    }
    pub fn normalize_binding(mut self, normalize: bool) -> Self {
        self.config.normalize_binding = normalize;
        self
    }
    pub fn keep_empty_events(mut self, keep: bool) -> Self {
        self.config.keep_empty_events = keep;
        self
    }
    pub fn bridge_triggers(mut self, bridge: bool) -> Self {
        self.config.bridge_triggers = bridge;
        self
    }
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }
    pub fn entity_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.entity_types = types.into_iter().map(Into::into).collect();
        self
    }
    /// A cap of zero is bumped to one round, otherwise nothing could ever be finalized.
    pub fn max_rounds(mut self, rounds: usize) -> Self {
        self.config.max_rounds = rounds.max(1);
        self
    }
    pub fn build(self) -> DecoderConfig {
        DecoderConfig::from(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use enum_iterator::all;
    use rstest::rstest;

    #[rstest]
    #[case("encoded", BindingStrategy::Encoded)]
    #[case("two", BindingStrategy::Two)]
    #[case("Positional", BindingStrategy::Positional)]
    #[case("strategy", BindingStrategy::Strategy)]
    fn test_binding_strategy_from_str(#[case] input: &str, #[case] expected: BindingStrategy) {
        assert_eq!(input.parse::<BindingStrategy>().unwrap(), expected)
    }

    #[test]
    fn test_display_parses_back() {
        for strategy in all::<BindingStrategy>() {
            assert_eq!(strategy.to_string().parse::<BindingStrategy>(), Ok(strategy));
        }
        for encoding in all::<Encoding>() {
            assert_eq!(encoding.to_string().parse::<Encoding>(), Ok(encoding));
        }
    }

    #[test]
    fn test_unknown_values_are_errors() {
        assert_eq!(
            "pairs".parse::<BindingStrategy>(),
            Err(ConfigError::BindingStrategy(String::from("pairs")))
        );
        assert_eq!(
            "flat".parse::<Encoding>(),
            Err(ConfigError::Encoding(String::from("flat")))
        );
        assert_eq!(parse_toggle("maybe"), Err(ConfigError::Toggle(String::from("maybe"))));
    }

    #[rstest]
    #[case("yes", true)]
    #[case("no", false)]
    #[case("YES", true)]
    fn test_parse_toggle(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(parse_toggle(input), Ok(expected))
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_builder_setters_toggles(#[case] value: bool) {
        let config = DecoderConfigBuilder::default()
            .normalize_binding(value)
            .keep_empty_events(value)
            .bridge_triggers(value)
            .parallel(value)
            .build();
        assert_eq!(config.normalize_binding, value);
        assert_eq!(config.keep_empty_events, value);
        assert_eq!(config.bridge_triggers, value);
        assert_eq!(config.parallel, value);
    }

    #[test]
    fn test_builder_entity_types() {
        let config = DecoderConfig::builder()
            .entity_types(["Gene_or_gene_product"])
            .build();
        assert!(config.is_entity_type("Gene_or_gene_product"));
        assert!(!config.is_entity_type("Protein"));
    }

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.encoding(), Encoding::Single);
        assert_eq!(config.binding_strategy(), BindingStrategy::Strategy);
        assert!(config.normalize_binding());
        assert!(!config.keep_empty_events());
        assert!(config.bridge_triggers());
        assert_eq!(config.max_rounds(), DEFAULT_MAX_ROUNDS);
        assert!(config.is_entity_type("Protein"));
        assert_eq!(DecoderConfig::builder().max_rounds(0).build().max_rounds(), 1);
    }
}
