//! Static trait registry.
//!
//! One [`TraitDefinition`] per [`TraitKey`]. The table is built on first access
//! and never mutated afterwards; every other module only reads from it.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::genotype::{AllelePair, GeneValue};

lazy_static! {
    static ref REGISTRY: TraitRegistry = TraitRegistry::build();
}

/// Short gene codes as they appear in a gene sequence (`FC:RB-SZ:33-...`).
///
/// Declaration order is the registry iteration order and therefore the
/// serialization order of a genotype.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
)]
pub enum TraitKey {
    #[strum(serialize = "FC")]
    FlowerColor,
    #[strum(serialize = "SZ")]
    Size,
    #[strum(serialize = "LS")]
    LeafShape,
    #[strum(serialize = "BP")]
    BloomPattern,
    #[strum(serialize = "GR")]
    GrowthRate,
    #[strum(serialize = "YD")]
    Yield,
    #[strum(serialize = "RS")]
    Resistance,
    #[strum(serialize = "WN")]
    WaterNeed,
}

impl TraitKey {
    /// The two-letter code used in gene sequences.
    pub fn code(self) -> &'static str {
        self.into()
    }
}

/// A single allele of a qualitative trait.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlleleDef {
    pub symbol: char,
    pub name: &'static str,
    /// Display value (hex color for flowers, a short description otherwise).
    pub display: &'static str,
    pub dominance: i32,
}

/// Override phenotype for one unordered heterozygous pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlendDef {
    /// Sorted allele symbols.
    pub pair: [char; 2],
    pub name: &'static str,
    pub display: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualitativeTrait {
    pub alleles: Vec<AlleleDef>,
    pub blends: Vec<BlendDef>,
    pub default: AllelePair,
}

impl QualitativeTrait {
    pub fn allele(&self, symbol: char) -> Option<&AlleleDef> {
        self.alleles.iter().find(|allele| allele.symbol == symbol)
    }

    /// Fallback allele for unrecognized input.
    ///
    /// Registry tables always define at least one allele per trait.
    pub fn first_allele(&self) -> &AlleleDef {
        &self.alleles[0]
    }

    /// Looks up the blend for a pair, independent of the order of `a` and `b`.
    pub fn blend(&self, a: char, b: char) -> Option<&BlendDef> {
        let key = if a <= b { [a, b] } else { [b, a] };
        self.blends.iter().find(|blend| blend.pair == key)
    }

    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.alleles.iter().map(|allele| allele.symbol)
    }
}

/// Gameplay effects attached to one level of a quantitative trait.
///
/// Each trait only fills the fields it is responsible for; the phenotype
/// resolver skips interactions whose inputs are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TraitEffects {
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_modifier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_modifier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_days_to_mature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coin_multiplier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_chance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pest_damage_chance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_damage_chance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drought_resistance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_per_day: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantitativeTrait {
    pub min: u8,
    pub max: u8,
    pub default: u8,
    pub levels: BTreeMap<u8, TraitEffects>,
}

impl QuantitativeTrait {
    /// Clamps an arbitrary level into `[min, max]`. NaN maps to the minimum.
    pub fn clamp(&self, level: f64) -> u8 {
        if level.is_nan() {
            return self.min;
        }
        level.clamp(f64::from(self.min), f64::from(self.max)) as u8
    }

    pub fn effects(&self, level: u8) -> Option<&TraitEffects> {
        self.levels.get(&level)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraitKind {
    Qualitative(QualitativeTrait),
    Quantitative(QuantitativeTrait),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraitDefinition {
    pub key: TraitKey,
    pub name: &'static str,
    pub kind: TraitKind,
}

impl TraitDefinition {
    /// Genotype value used when parsing fails or a parent lacks the gene.
    pub fn default_value(&self) -> GeneValue {
        match &self.kind {
            TraitKind::Qualitative(qualitative) => GeneValue::Pair(qualitative.default),
            TraitKind::Quantitative(quantitative) => {
                GeneValue::Pair(AllelePair::from_level(quantitative.default))
            }
        }
    }

    pub fn as_qualitative(&self) -> Option<&QualitativeTrait> {
        match &self.kind {
            TraitKind::Qualitative(qualitative) => Some(qualitative),
            TraitKind::Quantitative(_) => None,
        }
    }

    pub fn as_quantitative(&self) -> Option<&QuantitativeTrait> {
        match &self.kind {
            TraitKind::Quantitative(quantitative) => Some(quantitative),
            TraitKind::Qualitative(_) => None,
        }
    }
}

/// Immutable table of all known traits.
#[derive(Debug)]
pub struct TraitRegistry {
    // Indexed by `TraitKey as usize`.
    definitions: Vec<TraitDefinition>,
}

impl TraitRegistry {
    /// The process-wide registry.
    pub fn global() -> &'static TraitRegistry {
        &REGISTRY
    }

    fn build() -> Self {
        Self {
            definitions: TraitKey::iter().map(define).collect(),
        }
    }

    pub fn get(&self, key: TraitKey) -> &TraitDefinition {
        &self.definitions[key as usize]
    }

    /// Looks up a trait by its sequence code. `None` means "unknown trait".
    pub fn lookup(&self, code: &str) -> Option<&TraitDefinition> {
        code.parse::<TraitKey>().ok().map(|key| self.get(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraitDefinition> {
        self.definitions.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = TraitKey> + '_ {
        self.definitions.iter().map(|definition| definition.key)
    }

    pub fn default_value(&self, key: TraitKey) -> GeneValue {
        self.get(key).default_value()
    }
}

fn define(key: TraitKey) -> TraitDefinition {
    let (name, kind) = match key {
        TraitKey::FlowerColor => ("Flower Color", flower_color()),
        TraitKey::Size => ("Size", size()),
        TraitKey::LeafShape => ("Leaf Shape", leaf_shape()),
        TraitKey::BloomPattern => ("Bloom Pattern", bloom_pattern()),
        TraitKey::GrowthRate => ("Growth Rate", growth_rate()),
        TraitKey::Yield => ("Yield", yield_trait()),
        TraitKey::Resistance => ("Resistance", resistance()),
        TraitKey::WaterNeed => ("Water Need", water_need()),
    };
    TraitDefinition { key, name, kind }
}

fn allele(symbol: char, name: &'static str, display: &'static str, dominance: i32) -> AlleleDef {
    AlleleDef {
        symbol,
        name,
        display,
        dominance,
    }
}

fn blend(a: char, b: char, name: &'static str, display: &'static str) -> BlendDef {
    let pair = if a <= b { [a, b] } else { [b, a] };
    BlendDef {
        pair,
        name,
        display,
    }
}

/// Levels 1..=5 for the quantitative traits.
fn levels(effects: [TraitEffects; 5]) -> BTreeMap<u8, TraitEffects> {
    (1u8..).zip(effects).collect()
}

fn quantitative(default: u8, effects: [TraitEffects; 5]) -> TraitKind {
    TraitKind::Quantitative(QuantitativeTrait {
        min: 1,
        max: 5,
        default,
        levels: levels(effects),
    })
}

fn flower_color() -> TraitKind {
    TraitKind::Qualitative(QualitativeTrait {
        alleles: vec![
            allele('R', "Red", "#FF3333", 3),
            allele('B', "Blue", "#3355FF", 2),
            allele('Y', "Yellow", "#FFDD33", 1),
            allele('W', "White", "#FFFFFF", 1),
        ],
        blends: vec![
            blend('R', 'B', "Purple", "#9955FF"),
            blend('R', 'Y', "Orange", "#FF8833"),
            blend('R', 'W', "Pink", "#FF99BB"),
            blend('B', 'Y', "Green", "#55BB55"),
        ],
        default: AllelePair::homozygous('R'),
    })
}

fn leaf_shape() -> TraitKind {
    TraitKind::Qualitative(QualitativeTrait {
        alleles: vec![
            allele('1', "Round", "smooth rounded leaves", 1),
            allele('2', "Serrated", "toothed leaf edges", 2),
            allele('3', "Feathery", "finely divided fronds", 1),
        ],
        blends: Vec::new(),
        default: AllelePair::homozygous('1'),
    })
}

fn bloom_pattern() -> TraitKind {
    TraitKind::Qualitative(QualitativeTrait {
        alleles: vec![
            allele('1', "Single", "one ring of petals", 2),
            allele('2', "Double", "layered petals", 1),
            allele('3', "Cluster", "many small florets", 0),
        ],
        blends: vec![blend('1', '2', "Semi-double", "two loose rings of petals")],
        default: AllelePair::homozygous('1'),
    })
}

fn size() -> TraitKind {
    let level = |label, growth_modifier, water_modifier| TraitEffects {
        label,
        growth_modifier: Some(growth_modifier),
        water_modifier: Some(water_modifier),
        ..TraitEffects::default()
    };
    quantitative(
        3,
        [
            level("Tiny", 1.3, 0.7),
            level("Small", 1.15, 0.85),
            level("Medium", 1.0, 1.0),
            level("Large", 0.85, 1.2),
            level("Giant", 0.7, 1.4),
        ],
    )
}

fn growth_rate() -> TraitKind {
    let level = |label, growth_rate, base_days_to_mature| TraitEffects {
        label,
        growth_rate: Some(growth_rate),
        base_days_to_mature: Some(base_days_to_mature),
        ..TraitEffects::default()
    };
    quantitative(
        2,
        [
            level("Sluggish", 0.7, 14.0),
            level("Steady", 1.0, 10.0),
            level("Brisk", 1.3, 8.0),
            level("Fast", 1.6, 6.0),
            level("Rampant", 2.0, 5.0),
        ],
    )
}

fn yield_trait() -> TraitKind {
    let level = |label, coin_multiplier, seed_chance| TraitEffects {
        label,
        coin_multiplier: Some(coin_multiplier),
        seed_chance: Some(seed_chance),
        ..TraitEffects::default()
    };
    quantitative(
        3,
        [
            level("Meager", 0.6, 0.5),
            level("Modest", 0.8, 0.4),
            level("Fair", 1.0, 0.3),
            level("Bountiful", 1.2, 0.2),
            level("Abundant", 1.5, 0.1),
        ],
    )
}

fn resistance() -> TraitKind {
    let level = |label, pest, weather, drought| TraitEffects {
        label,
        pest_damage_chance: Some(pest),
        weather_damage_chance: Some(weather),
        drought_resistance: Some(drought),
        ..TraitEffects::default()
    };
    quantitative(
        3,
        [
            level("Fragile", 0.5, 0.5, 0.1),
            level("Delicate", 0.35, 0.4, 0.25),
            level("Average", 0.25, 0.3, 0.4),
            level("Hardy", 0.15, 0.2, 0.55),
            level("Robust", 0.08, 0.1, 0.7),
        ],
    )
}

fn water_need() -> TraitKind {
    let level = |label, water_per_day| TraitEffects {
        label,
        water_per_day: Some(water_per_day),
        ..TraitEffects::default()
    };
    quantitative(
        3,
        [
            level("Arid", 20.0),
            level("Dry", 30.0),
            level("Moderate", 40.0),
            level("Thirsty", 55.0),
            level("Aquatic", 70.0),
        ],
    )
}
