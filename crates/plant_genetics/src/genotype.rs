//! Genotype model and the gene sequence codec.
//!
//! Wire format: `KEY:VALUE` segments joined by `-`, one per trait, e.g.
//! `FC:RB-SZ:33-LS:11-BP:11-GR:10-YD:33-RS:22-WN:22`. In memory every value
//! is an [`AllelePair`]; anything that is not exactly two characters is kept
//! verbatim as [`GeneValue::Raw`] so the resolver can apply its fallbacks.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::registry::{TraitKey, TraitRegistry};

const SEGMENT_SEPARATOR: char = '-';
const KEY_SEPARATOR: char = ':';

/// Two allele symbols, one from each parent.
///
/// Qualitative traits use letters or digits naming an allele; quantitative
/// traits use decimal digits (`"33"` is level 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllelePair {
    pub first: char,
    pub second: char,
}

impl AllelePair {
    pub fn new(first: char, second: char) -> Self {
        Self { first, second }
    }

    pub fn homozygous(symbol: char) -> Self {
        Self::new(symbol, symbol)
    }

    /// Doubled-digit encoding of a quantitative level (`3` → `"33"`).
    pub fn from_level(level: u8) -> Self {
        let digit = char::from_digit(u32::from(level.min(9)), 10).unwrap_or('0');
        Self::homozygous(digit)
    }

    pub fn is_homozygous(&self) -> bool {
        self.first == self.second
    }

    pub fn symbols(&self) -> [char; 2] {
        [self.first, self.second]
    }

    /// Arithmetic mean of both digits; a non-numeric digit counts as `fallback`.
    pub fn digit_mean(&self, fallback: u8) -> f64 {
        let digit = |symbol: char| {
            symbol
                .to_digit(10)
                .map(f64::from)
                .unwrap_or(f64::from(fallback))
        };
        (digit(self.first) + digit(self.second)) / 2.0
    }

    /// Mean of both digits, or `None` if either one is not a digit.
    pub fn numeric_mean(&self) -> Option<f64> {
        let first = self.first.to_digit(10)?;
        let second = self.second.to_digit(10)?;
        Some(f64::from(first + second) / 2.0)
    }
}

impl Display for AllelePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.first, self.second)
    }
}

impl FromStr for AllelePair {
    type Err = GenotypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(first), Some(second), None) => Ok(Self::new(first, second)),
            _ => Err(GenotypeError::InvalidAllelePair(s.to_string())),
        }
    }
}

/// Value of a single gene as carried in a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GeneValue {
    Pair(AllelePair),
    /// Anything that is not exactly two characters.
    Raw(String),
}

impl GeneValue {
    /// Tolerant conversion from the textual value of a segment.
    pub fn parse(value: &str) -> Self {
        value
            .parse::<AllelePair>()
            .map(GeneValue::Pair)
            .unwrap_or_else(|_| GeneValue::Raw(value.to_string()))
    }

    pub fn as_pair(&self) -> Option<AllelePair> {
        match self {
            GeneValue::Pair(pair) => Some(*pair),
            GeneValue::Raw(_) => None,
        }
    }

    pub fn is_homozygous(&self) -> bool {
        self.as_pair().is_some_and(|pair| pair.is_homozygous())
    }

    /// All characters of the value, used when a parent passes on one allele.
    pub fn symbols(&self) -> Vec<char> {
        match self {
            GeneValue::Pair(pair) => pair.symbols().to_vec(),
            GeneValue::Raw(raw) => raw.chars().collect(),
        }
    }
}

impl Display for GeneValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneValue::Pair(pair) => Display::fmt(pair, f),
            GeneValue::Raw(raw) => f.write_str(raw),
        }
    }
}

impl From<AllelePair> for GeneValue {
    fn from(pair: AllelePair) -> Self {
        GeneValue::Pair(pair)
    }
}

/// A plant's full set of genes, one entry per registered trait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genotype {
    genes: BTreeMap<TraitKey, GeneValue>,
}

impl Default for Genotype {
    fn default() -> Self {
        let registry = TraitRegistry::global();
        Self {
            genes: registry
                .iter()
                .map(|definition| (definition.key, definition.default_value()))
                .collect(),
        }
    }
}

impl Genotype {
    /// Parses a gene sequence, tolerating bad input.
    ///
    /// Unknown keys and segments without a `:` are logged and dropped. Keys
    /// missing from the sequence get their registry default. For repeated keys
    /// the last segment wins.
    pub fn parse(sequence: &str) -> Self {
        let registry = TraitRegistry::global();
        let mut genotype = Self::default();

        for segment in sequence
            .split(SEGMENT_SEPARATOR)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
        {
            let Some((code, value)) = segment.split_once(KEY_SEPARATOR) else {
                warn!(segment, "Ignoring gene segment without a key separator");
                continue;
            };

            match registry.lookup(code.trim()) {
                Some(definition) => {
                    genotype
                        .genes
                        .insert(definition.key, GeneValue::parse(value.trim()));
                }
                None => warn!(code, "Unknown trait key in gene sequence, using defaults"),
            }
        }

        genotype
    }

    /// Strict variant of [`Genotype::parse`] for user-supplied sequences.
    ///
    /// Rejects unknown keys, malformed segments and values that are not allele
    /// pairs. Missing keys still fall back to their defaults.
    pub fn parse_strict(sequence: &str) -> Result<Self, GenotypeError> {
        let registry = TraitRegistry::global();
        let mut genotype = Self::default();

        for segment in sequence
            .split(SEGMENT_SEPARATOR)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
        {
            let (code, value) = segment
                .split_once(KEY_SEPARATOR)
                .ok_or_else(|| GenotypeError::MalformedSegment(segment.to_string()))?;
            let definition = registry
                .lookup(code.trim())
                .ok_or_else(|| GenotypeError::UnknownTrait(code.trim().to_string()))?;
            let pair = value.trim().parse::<AllelePair>()?;
            genotype.genes.insert(definition.key, GeneValue::Pair(pair));
        }

        Ok(genotype)
    }

    /// Serializes to the sequence format in registry order.
    pub fn to_sequence(&self) -> String {
        self.genes
            .iter()
            .map(|(key, value)| format!("{}{}{}", key, KEY_SEPARATOR, value))
            .collect::<Vec<_>>()
            .join(&SEGMENT_SEPARATOR.to_string())
    }

    pub fn get(&self, key: TraitKey) -> Option<&GeneValue> {
        self.genes.get(&key)
    }

    pub fn set(&mut self, key: TraitKey, value: impl Into<GeneValue>) {
        self.genes.insert(key, value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (TraitKey, &GeneValue)> {
        self.genes.iter().map(|(key, value)| (*key, value))
    }

    /// Number of genes whose two characters are equal, over all traits.
    pub fn homozygous_count(&self) -> usize {
        self.genes
            .values()
            .filter(|value| value.is_homozygous())
            .count()
    }
}

impl Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sequence())
    }
}

/// Sequence made of every trait's registry default.
pub fn generate_default_sequence() -> String {
    Genotype::default().to_sequence()
}

/// Errors from the strict parsing helpers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenotypeError {
    #[error("allele pair must be exactly two characters, got {0:?}")]
    InvalidAllelePair(String),
    #[error("unknown trait key: {0}")]
    UnknownTrait(String),
    #[error("gene segment is not of the form KEY:VALUE: {0:?}")]
    MalformedSegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "FC:RB-SZ:33-LS:11-BP:11-GR:10-YD:33-RS:22-WN:22";

    #[test]
    fn test_default_sequence() {
        assert_eq!(
            generate_default_sequence(),
            "FC:RR-SZ:33-LS:11-BP:11-GR:22-YD:33-RS:33-WN:33"
        );
    }

    #[test]
    fn test_default_round_trip() {
        let parsed = Genotype::parse(&generate_default_sequence());
        assert_eq!(parsed, Genotype::default());
        for definition in TraitRegistry::global().iter() {
            assert_eq!(parsed.get(definition.key), Some(&definition.default_value()));
        }
    }

    #[test]
    fn test_parse_and_serialize_sample() {
        let genotype = Genotype::parse(SAMPLE);
        assert_eq!(
            genotype.get(TraitKey::FlowerColor),
            Some(&GeneValue::Pair(AllelePair::new('R', 'B')))
        );
        assert_eq!(genotype.to_sequence(), SAMPLE);
    }

    #[test]
    fn test_segment_order_does_not_matter() {
        let shuffled = "WN:22-RS:22-YD:33-GR:10-BP:11-LS:11-SZ:33-FC:RB";
        assert_eq!(Genotype::parse(shuffled), Genotype::parse(SAMPLE));
    }

    #[test]
    fn test_unknown_keys_are_dropped_and_missing_keys_defaulted() {
        let genotype = Genotype::parse("XX:99-FC:BB-garbage");
        assert_eq!(genotype.iter().count(), TraitRegistry::global().iter().count());
        assert_eq!(
            genotype.get(TraitKey::FlowerColor),
            Some(&GeneValue::Pair(AllelePair::homozygous('B')))
        );
        assert_eq!(
            genotype.get(TraitKey::Size),
            Some(&TraitRegistry::global().default_value(TraitKey::Size))
        );
    }

    #[test]
    fn test_empty_sequence_is_default() {
        assert_eq!(Genotype::parse(""), Genotype::default());
    }

    #[test]
    fn test_malformed_values_are_preserved() {
        let genotype = Genotype::parse("SZ:7-YD:abc");
        assert_eq!(genotype.get(TraitKey::Size), Some(&GeneValue::Raw("7".into())));
        assert_eq!(genotype.get(TraitKey::Yield), Some(&GeneValue::Raw("abc".into())));
        assert!(genotype.to_sequence().contains("SZ:7-"));
    }

    #[test]
    fn test_homozygous_count() {
        // SZ, LS, BP, YD, RS, WN
        assert_eq!(Genotype::parse(SAMPLE).homozygous_count(), 6);
        assert_eq!(Genotype::default().homozygous_count(), 8);
    }

    #[test]
    fn test_parse_strict_rejects_bad_input() {
        assert_eq!(
            Genotype::parse_strict("QQ:11"),
            Err(GenotypeError::UnknownTrait("QQ".into()))
        );
        assert_eq!(
            Genotype::parse_strict("FC:RRR"),
            Err(GenotypeError::InvalidAllelePair("RRR".into()))
        );
        assert_eq!(
            Genotype::parse_strict("FC"),
            Err(GenotypeError::MalformedSegment("FC".into()))
        );
        assert_eq!(Genotype::parse_strict(SAMPLE), Ok(Genotype::parse(SAMPLE)));
    }

    #[test]
    fn test_digit_means() {
        let pair: AllelePair = "12".parse().unwrap();
        assert_eq!(pair.digit_mean(1), 1.5);
        assert_eq!(pair.numeric_mean(), Some(1.5));

        let pair: AllelePair = "x4".parse().unwrap();
        assert_eq!(pair.digit_mean(1), 2.5);
        assert_eq!(pair.numeric_mean(), None);
    }
}
