//! Genotype → phenotype resolution.
//!
//! Qualitative traits resolve through homozygosity, the blend table and
//! dominance. Quantitative traits average their two digits. Afterwards the
//! cross-trait interactions derive the `effective_*` fields.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::genotype::{GeneValue, Genotype};
use crate::registry::{
    AlleleDef, QualitativeTrait, QuantitativeTrait, TraitEffects, TraitKey, TraitKind,
    TraitRegistry,
};

/// Growth values above this make the plant more vulnerable to pests.
pub const GROWTH_TRADE_OFF_THRESHOLD: f64 = 1.2;
const GROWTH_TRADE_OFF_FACTOR: f64 = 0.5;

/// Homozygous genes tolerated before the yield suffers.
pub const INBREEDING_THRESHOLD: usize = 5;
const INBREEDING_PENALTY_PER_GENE: f64 = 0.1;

/// Rounds halves towards positive infinity (`2.5 → 3`, `-0.5 → 0`).
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Resolved allele or blend of a qualitative trait.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualitativeExpression {
    pub name: &'static str,
    pub display: &'static str,
    /// `None` for blends.
    pub dominance: Option<i32>,
}

impl QualitativeExpression {
    pub fn is_blend(&self) -> bool {
        self.dominance.is_none()
    }
}

impl From<&AlleleDef> for QualitativeExpression {
    fn from(allele: &AlleleDef) -> Self {
        Self {
            name: allele.name,
            display: allele.display,
            dominance: Some(allele.dominance),
        }
    }
}

/// Fields produced by the trait interactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DerivedEffects {
    /// Growth level scaled by the size modifier. Informational only; plant
    /// ticks use `effective_growth_rate`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_to_mature: Option<f64>,
    /// Growth rate scaled by the size modifier; drives progress per tick.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_growth_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_water_per_day: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_pest_damage_chance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_coin_multiplier: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantitativeExpression {
    pub value: u8,
    #[serde(flatten)]
    pub effects: TraitEffects,
    #[serde(flatten)]
    pub derived: DerivedEffects,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TraitExpression {
    Qualitative(QualitativeExpression),
    Quantitative(QuantitativeExpression),
}

/// Observable traits of a plant. Only ever built from a [`Genotype`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Phenotype {
    traits: BTreeMap<TraitKey, TraitExpression>,
}

impl Phenotype {
    pub fn resolve(genotype: &Genotype) -> Self {
        let registry = TraitRegistry::global();
        let traits = genotype
            .iter()
            .map(|(key, value)| {
                let expression = match &registry.get(key).kind {
                    TraitKind::Qualitative(definition) => {
                        TraitExpression::Qualitative(resolve_qualitative(definition, value))
                    }
                    TraitKind::Quantitative(definition) => {
                        TraitExpression::Quantitative(resolve_quantitative(definition, value))
                    }
                };
                (key, expression)
            })
            .collect();

        let mut phenotype = Self { traits };
        phenotype.apply_interactions(genotype);
        phenotype
    }

    pub fn get(&self, key: TraitKey) -> Option<&TraitExpression> {
        self.traits.get(&key)
    }

    pub fn qualitative(&self, key: TraitKey) -> Option<&QualitativeExpression> {
        match self.traits.get(&key)? {
            TraitExpression::Qualitative(expression) => Some(expression),
            TraitExpression::Quantitative(_) => None,
        }
    }

    pub fn quantitative(&self, key: TraitKey) -> Option<&QuantitativeExpression> {
        match self.traits.get(&key)? {
            TraitExpression::Quantitative(expression) => Some(expression),
            TraitExpression::Qualitative(_) => None,
        }
    }

    fn quantitative_mut(&mut self, key: TraitKey) -> Option<&mut QuantitativeExpression> {
        match self.traits.get_mut(&key)? {
            TraitExpression::Quantitative(expression) => Some(expression),
            TraitExpression::Qualitative(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TraitKey, &TraitExpression)> {
        self.traits.iter().map(|(key, expression)| (*key, expression))
    }

    // Order matters: each rule reads base fields only, never another rule's output.
    fn apply_interactions(&mut self, genotype: &Genotype) {
        let size = self.quantitative(TraitKey::Size).map(|size| size.effects);
        let growth_modifier = size.and_then(|e| e.growth_modifier).unwrap_or(1.0);
        let water_modifier = size.and_then(|e| e.water_modifier).unwrap_or(1.0);

        // Growth × Size
        if let Some(growth) = self.quantitative_mut(TraitKey::GrowthRate) {
            growth.derived.effective_value = Some(f64::from(growth.value) * growth_modifier);
            growth.derived.days_to_mature = growth
                .effects
                .base_days_to_mature
                .map(|days| round_half_up(days / growth_modifier));
            growth.derived.effective_growth_rate =
                growth.effects.growth_rate.map(|rate| rate * growth_modifier);
        }

        // Water × Size
        if let Some(water) = self.quantitative_mut(TraitKey::WaterNeed) {
            water.derived.effective_water_per_day = water
                .effects
                .water_per_day
                .map(|per_day| round_half_up(per_day * water_modifier));
        }

        // Growth → Resistance trade-off
        let growth_value = self
            .quantitative(TraitKey::GrowthRate)
            .map(|growth| f64::from(growth.value));
        if let (Some(growth_value), Some(resistance)) =
            (growth_value, self.quantitative_mut(TraitKey::Resistance))
        {
            if let Some(chance) = resistance.effects.pest_damage_chance {
                let effective = if growth_value > GROWTH_TRADE_OFF_THRESHOLD {
                    (chance * (1.0 + (growth_value - 1.0) * GROWTH_TRADE_OFF_FACTOR)).min(1.0)
                } else {
                    chance
                };
                resistance.derived.effective_pest_damage_chance = Some(effective);
            }
        }

        // Inbreeding depression, counted over every trait
        let homozygous = genotype.homozygous_count();
        if let Some(yield_expression) = self.quantitative_mut(TraitKey::Yield) {
            if let Some(multiplier) = yield_expression.effects.coin_multiplier {
                let effective = if homozygous > INBREEDING_THRESHOLD {
                    let excess = (homozygous - INBREEDING_THRESHOLD) as f64;
                    multiplier * (1.0 - excess * INBREEDING_PENALTY_PER_GENE)
                } else {
                    multiplier
                };
                yield_expression.derived.effective_coin_multiplier = Some(effective);
            }
        }
    }

    // --- Convenience accessors with neutral fallbacks ---

    pub fn name_of(&self, key: TraitKey) -> Option<&'static str> {
        self.qualitative(key).map(|expression| expression.name)
    }

    pub fn effective_growth_rate(&self) -> f64 {
        self.quantitative(TraitKey::GrowthRate)
            .and_then(|growth| growth.derived.effective_growth_rate)
            .unwrap_or(1.0)
    }

    pub fn days_to_mature(&self) -> Option<f64> {
        self.quantitative(TraitKey::GrowthRate)
            .and_then(|growth| growth.derived.days_to_mature)
    }

    /// Water per tick the plant needs; `0.0` when unknown.
    pub fn water_per_day(&self) -> f64 {
        self.quantitative(TraitKey::WaterNeed)
            .and_then(|water| {
                water
                    .derived
                    .effective_water_per_day
                    .or(water.effects.water_per_day)
            })
            .unwrap_or(0.0)
    }

    pub fn base_pest_damage_chance(&self) -> f64 {
        self.quantitative(TraitKey::Resistance)
            .and_then(|resistance| resistance.effects.pest_damage_chance)
            .unwrap_or(0.0)
    }

    pub fn pest_damage_chance(&self) -> f64 {
        self.quantitative(TraitKey::Resistance)
            .and_then(|resistance| resistance.derived.effective_pest_damage_chance)
            .unwrap_or_else(|| self.base_pest_damage_chance())
    }

    pub fn drought_resistance(&self) -> f64 {
        self.quantitative(TraitKey::Resistance)
            .and_then(|resistance| resistance.effects.drought_resistance)
            .unwrap_or(0.0)
    }

    pub fn weather_damage_chance(&self) -> f64 {
        self.quantitative(TraitKey::Resistance)
            .and_then(|resistance| resistance.effects.weather_damage_chance)
            .unwrap_or(0.0)
    }

    /// Size level; the largest size when unknown so storms are not scaled down.
    pub fn size(&self) -> f64 {
        self.quantitative(TraitKey::Size)
            .map(|size| f64::from(size.value))
            .unwrap_or(5.0)
    }

    pub fn coin_multiplier(&self) -> f64 {
        self.quantitative(TraitKey::Yield)
            .and_then(|yield_expression| {
                yield_expression
                    .derived
                    .effective_coin_multiplier
                    .or(yield_expression.effects.coin_multiplier)
            })
            .unwrap_or(1.0)
    }

    pub fn seed_chance(&self) -> f64 {
        self.quantitative(TraitKey::Yield)
            .and_then(|yield_expression| yield_expression.effects.seed_chance)
            .unwrap_or(0.0)
    }
}

/// Resolves one qualitative gene.
///
/// Homozygous pairs express the allele itself. Heterozygous pairs use the
/// blend table first and dominance second, ties going to the first character.
/// Unknown symbols fall back to the first allele of the trait.
pub fn resolve_qualitative(definition: &QualitativeTrait, value: &GeneValue) -> QualitativeExpression {
    let fallback = || QualitativeExpression::from(definition.first_allele());

    let Some(pair) = value.as_pair() else {
        return fallback();
    };
    let (Some(first), Some(second)) = (definition.allele(pair.first), definition.allele(pair.second))
    else {
        return fallback();
    };

    if pair.is_homozygous() {
        return first.into();
    }

    if let Some(blend) = definition.blend(pair.first, pair.second) {
        return QualitativeExpression {
            name: blend.name,
            display: blend.display,
            dominance: None,
        };
    }

    if second.dominance > first.dominance {
        second.into()
    } else {
        first.into()
    }
}

/// Level of a quantitative gene, always within `[min, max]`.
pub fn resolve_level(definition: &QuantitativeTrait, value: &GeneValue) -> u8 {
    let level = match value {
        GeneValue::Pair(pair) => round_half_up(pair.digit_mean(definition.min)),
        GeneValue::Raw(raw) => parse_raw_level(raw).unwrap_or(f64::from(definition.default)),
    };
    definition.clamp(level)
}

/// Integer level of a raw (non-pair) value. Fractions are truncated, so
/// `"3.6"` is level 3; non-numeric input yields `None`.
pub(crate) fn parse_raw_level(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().map(|level| level as f64).or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|level| level.is_finite())
            .map(f64::trunc)
    })
}

pub fn resolve_quantitative(
    definition: &QuantitativeTrait,
    value: &GeneValue,
) -> QuantitativeExpression {
    let level = resolve_level(definition, value);
    QuantitativeExpression {
        value: level,
        effects: definition.effects(level).copied().unwrap_or_default(),
        derived: DerivedEffects::default(),
    }
}
