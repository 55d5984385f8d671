//! Crossing two plants into an offspring, with mutation and history.

use std::time::{SystemTime, UNIX_EPOCH};

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::BreedingConfig;
use crate::genotype::{AllelePair, GeneValue, Genotype};
use crate::phenotype::{parse_raw_level, round_half_up};
use crate::plant::Plant;
use crate::registry::{QualitativeTrait, QuantitativeTrait, TraitKind, TraitRegistry};

/// One entry of the breeding log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossingRecord {
    pub parent_a: String,
    pub parent_b: String,
    pub offspring: String,
    /// Milliseconds since the UNIX epoch.
    pub timestamp: u64,
}

/// Breeds plants and keeps an append-only log of every crossing.
#[derive(Resource, Debug, Default)]
pub struct Breeder {
    config: BreedingConfig,
    history: Vec<CrossingRecord>,
}

impl Breeder {
    /// Out-of-range or non-finite config values are clamped, see
    /// [`BreedingConfig::sanitized`].
    pub fn new(config: BreedingConfig) -> Self {
        Self {
            config: config.sanitized(),
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &BreedingConfig {
        &self.config
    }

    pub fn history(&self) -> &[CrossingRecord] {
        &self.history
    }

    /// Crosses two plants. `None` if either parent is missing.
    pub fn cross<R: Rng + ?Sized>(
        &mut self,
        parent_a: Option<&Plant>,
        parent_b: Option<&Plant>,
        rng: &mut R,
    ) -> Option<Plant> {
        let (parent_a, parent_b) = (parent_a?, parent_b?);

        let offspring = self.cross_genotypes(parent_a.genotype(), parent_b.genotype(), rng);
        let record = CrossingRecord {
            parent_a: parent_a.genotype().to_sequence(),
            parent_b: parent_b.genotype().to_sequence(),
            offspring: offspring.to_sequence(),
            timestamp: now_millis(),
        };
        info!(
            parent_a = %record.parent_a,
            parent_b = %record.parent_b,
            offspring = %record.offspring,
            "Crossed plants"
        );
        self.history.push(record);

        Some(Plant::new(offspring))
    }

    /// Builds the offspring genotype gene by gene.
    pub fn cross_genotypes<R: Rng + ?Sized>(
        &self,
        parent_a: &Genotype,
        parent_b: &Genotype,
        rng: &mut R,
    ) -> Genotype {
        let registry = TraitRegistry::global();
        let mut offspring = Genotype::default();

        for definition in registry.iter() {
            let (Some(a), Some(b)) = (parent_a.get(definition.key), parent_b.get(definition.key))
            else {
                offspring.set(definition.key, definition.default_value());
                continue;
            };

            let mut value = match &definition.kind {
                TraitKind::Qualitative(qualitative) => inherit_alleles(qualitative, a, b, rng),
                TraitKind::Quantitative(quantitative) => {
                    inherit_level(quantitative, a, b, self.config.variation, rng)
                }
            };

            if rng.gen_bool(self.config.mutation_rate) {
                let mutated = mutate(&definition.kind, &value, rng);
                debug!(trait_key = %definition.key, from = %value, to = %mutated, "Gene mutated");
                value = mutated;
            }

            offspring.set(definition.key, value);
        }

        offspring
    }
}

/// Each parent passes on one of its own allele characters.
fn inherit_alleles<R: Rng + ?Sized>(
    definition: &QualitativeTrait,
    a: &GeneValue,
    b: &GeneValue,
    rng: &mut R,
) -> GeneValue {
    let from_a = a.symbols().choose(rng).copied();
    let from_b = b.symbols().choose(rng).copied();
    match (from_a, from_b) {
        (Some(first), Some(second)) => AllelePair::new(first, second).into(),
        _ => definition.default.into(),
    }
}

/// Averages both parents' levels, adds noise and re-encodes as a doubled digit.
fn inherit_level<R: Rng + ?Sized>(
    definition: &QuantitativeTrait,
    a: &GeneValue,
    b: &GeneValue,
    variation: f64,
    rng: &mut R,
) -> GeneValue {
    let average = (parental_mean(definition, a) + parental_mean(definition, b)) / 2.0;
    let noise = if variation.is_finite() && variation > 0.0 {
        rng.gen_range(-variation..=variation)
    } else {
        0.0
    };
    let level = definition.clamp(round_half_up(average + noise));
    AllelePair::from_level(level).into()
}

fn parental_mean(definition: &QuantitativeTrait, value: &GeneValue) -> f64 {
    let mean = match value {
        GeneValue::Pair(pair) => pair.numeric_mean(),
        GeneValue::Raw(raw) => parse_raw_level(raw),
    };
    mean.unwrap_or(f64::from(definition.default))
}

fn mutate<R: Rng + ?Sized>(kind: &TraitKind, value: &GeneValue, rng: &mut R) -> GeneValue {
    match kind {
        TraitKind::Qualitative(definition) => {
            let mut pair = value.as_pair().unwrap_or(definition.default);
            let alleles: Vec<char> = definition.symbols().collect();
            if let Some(&allele) = alleles.choose(rng) {
                if rng.gen_bool(0.5) {
                    pair.first = allele;
                } else {
                    pair.second = allele;
                }
            }
            pair.into()
        }
        TraitKind::Quantitative(definition) => {
            let step = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let level = definition.clamp(round_half_up(parental_mean(definition, value) + step));
            AllelePair::from_level(level).into()
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
