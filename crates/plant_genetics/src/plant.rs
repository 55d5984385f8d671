//! Plant entity: genotype, resolved phenotype and growth state.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::genotype::Genotype;
use crate::phenotype::{round_half_up, Phenotype};
use crate::registry::TraitKey;

/// Progress points gained per tick before any modifier.
pub const BASE_GROWTH_PER_TICK: f64 = 10.0;
/// Coins for a harvest with a coin multiplier of 1.0.
pub const BASE_HARVEST_COINS: f64 = 10.0;

const MAX_PROGRESS: f64 = 100.0;
const MAX_HEALTH: f64 = 100.0;

/// Below this water ratio the plant also loses health.
const THIRST_THRESHOLD: f64 = 0.5;
const THIRST_DAMAGE: f64 = 5.0;

const PEST_GROWTH_FACTOR: f64 = 0.5;
const PEST_DAMAGE: f64 = 10.0;
const DROUGHT_GROWTH_FACTOR: f64 = 0.3;
const DROUGHT_DAMAGE: f64 = 15.0;
const STORM_DAMAGE: f64 = 20.0;
const STORM_SIZE_SCALE: f64 = 5.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Weather {
    #[default]
    #[strum(to_string = "none", serialize = "clear")]
    Clear,
    Drought,
    Storm,
}

/// Environment signals for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickConditions {
    /// Water available this tick (0–100, may exceed 100).
    pub water_level: f64,
    pub pest_present: bool,
    pub weather: Weather,
}

/// Outcome of [`Plant::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GrowthEvent {
    Growing,
    Matured,
    Died,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlantState {
    Growing,
    Ready,
    Dead,
}

/// A successful harvest. The plant itself is left untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarvestYield {
    pub coins: u32,
    /// Either 0 or 1.
    pub seeds: u32,
    /// Sequence of the harvested plant, for breeding.
    pub genotype: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HarvestError {
    #[error("{name} is not ready to harvest yet ({progress:.0}% grown)")]
    NotReady { name: String, progress: f64 },
}

/// Display summary of a plant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantInfo {
    pub name: String,
    pub growth_days: u32,
    pub water_needs: u32,
    pub resistance: u32,
    pub sell_price: u32,
    pub emoji: &'static str,
    pub progress: f64,
    pub ready: bool,
}

#[derive(Component, Debug, Clone)]
pub struct Plant {
    genotype: Genotype,
    phenotype: Phenotype,
    /// Growth percentage, 0–100.
    pub progress: f64,
    /// 0–100; the plant is dead at 0.
    pub health: f64,
    pub ready: bool,
    /// Whether the last tick fully covered the plant's water need.
    pub watered: bool,
}

impl Default for Plant {
    fn default() -> Self {
        Self::new(Genotype::default())
    }
}

impl Plant {
    pub fn new(genotype: Genotype) -> Self {
        let phenotype = Phenotype::resolve(&genotype);
        Self {
            genotype,
            phenotype,
            progress: 0.0,
            health: MAX_HEALTH,
            ready: false,
            watered: false,
        }
    }

    pub fn from_sequence(sequence: &str) -> Self {
        Self::new(Genotype::parse(sequence))
    }

    pub fn genotype(&self) -> &Genotype {
        &self.genotype
    }

    pub fn phenotype(&self) -> &Phenotype {
        &self.phenotype
    }

    pub fn state(&self) -> PlantState {
        if self.ready {
            PlantState::Ready
        } else if self.health <= 0.0 {
            PlantState::Dead
        } else {
            PlantState::Growing
        }
    }

    /// Advances the plant by one tick.
    ///
    /// Returns `None` for ready and already dead plants, which are left
    /// untouched. [`GrowthEvent::Died`] is reported once, on the fatal tick.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        conditions: &TickConditions,
        rng: &mut R,
    ) -> Option<GrowthEvent> {
        match self.state() {
            PlantState::Ready | PlantState::Dead => return None,
            PlantState::Growing => {}
        }

        let phenotype = &self.phenotype;
        let mut increment = BASE_GROWTH_PER_TICK * phenotype.effective_growth_rate();
        let mut damage = 0.0;

        let water_need = phenotype.water_per_day();
        let ratio = if water_need > 0.0 {
            conditions.water_level.max(0.0) / water_need
        } else {
            1.0
        };
        self.watered = ratio >= 1.0;
        if ratio < 1.0 {
            increment *= ratio;
        }
        if ratio < THIRST_THRESHOLD {
            damage += (1.0 - ratio) * THIRST_DAMAGE;
        }

        if conditions.pest_present && rng.gen::<f64>() < phenotype.pest_damage_chance() {
            increment *= PEST_GROWTH_FACTOR;
            damage += PEST_DAMAGE;
        }

        match conditions.weather {
            Weather::Clear => {}
            Weather::Drought => {
                if rng.gen::<f64>() < 1.0 - phenotype.drought_resistance() {
                    increment *= DROUGHT_GROWTH_FACTOR;
                    damage += DROUGHT_DAMAGE;
                }
            }
            Weather::Storm => {
                let chance =
                    phenotype.weather_damage_chance() * (phenotype.size() / STORM_SIZE_SCALE);
                if rng.gen::<f64>() < chance {
                    increment = 0.0;
                    damage += STORM_DAMAGE;
                }
            }
        }

        self.health = (self.health - damage).clamp(0.0, MAX_HEALTH);
        if self.health <= 0.0 {
            self.health = 0.0;
            debug!(genotype = %self.genotype, "Plant died");
            return Some(GrowthEvent::Died);
        }

        self.progress = (self.progress + increment).clamp(0.0, MAX_PROGRESS);
        if self.progress >= MAX_PROGRESS {
            self.progress = MAX_PROGRESS;
            self.ready = true;
            debug!(genotype = %self.genotype, "Plant matured");
            return Some(GrowthEvent::Matured);
        }

        Some(GrowthEvent::Growing)
    }

    /// Collects coins and possibly a seed from a ready plant.
    ///
    /// Resetting the plant afterwards is up to the caller.
    pub fn harvest<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<HarvestYield, HarvestError> {
        let name = self.display_name();
        if !self.ready {
            return Err(HarvestError::NotReady {
                name,
                progress: self.progress,
            });
        }

        let coins = self.sell_price();
        let seeds = u32::from(rng.gen_bool(self.phenotype.seed_chance().clamp(0.0, 1.0)));
        let message = match seeds {
            0 => format!("Harvested {name} for {coins} coins."),
            _ => format!("Harvested {name} for {coins} coins and found a seed!"),
        };

        Ok(HarvestYield {
            coins,
            seeds,
            genotype: self.genotype.to_sequence(),
            message,
        })
    }

    pub fn info(&self) -> PlantInfo {
        let phenotype = &self.phenotype;
        let color = phenotype.name_of(TraitKey::FlowerColor).unwrap_or_default();
        PlantInfo {
            name: self.display_name(),
            growth_days: phenotype.days_to_mature().unwrap_or(0.0) as u32,
            water_needs: phenotype.water_per_day() as u32,
            resistance: round_half_up((1.0 - phenotype.base_pest_damage_chance()) * 100.0) as u32,
            sell_price: self.sell_price(),
            emoji: flower_emoji(color),
            progress: self.progress,
            ready: self.ready,
        }
    }

    /// Flower color and leaf shape, e.g. "Orange Feathery".
    pub fn display_name(&self) -> String {
        let color = self.phenotype.name_of(TraitKey::FlowerColor);
        let leaf = self.phenotype.name_of(TraitKey::LeafShape);
        match (color, leaf) {
            (Some(color), Some(leaf)) => format!("{color} {leaf}"),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => "Plant".to_string(),
        }
    }

    fn sell_price(&self) -> u32 {
        round_half_up(BASE_HARVEST_COINS * self.phenotype.coin_multiplier()).max(0.0) as u32
    }
}

fn flower_emoji(color: &str) -> &'static str {
    match color {
        "Red" => "🌹",
        "Blue" => "🪻",
        "Yellow" => "🌻",
        "White" => "🌼",
        "Purple" => "💜",
        "Orange" => "🥕",
        "Pink" => "🌸",
        "Green" => "🌿",
        _ => "🌱",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::CARROT;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Every probability check succeeds.
    fn always() -> StepRng {
        StepRng::new(0, 0)
    }

    fn watered() -> TickConditions {
        TickConditions {
            water_level: 100.0,
            ..TickConditions::default()
        }
    }

    #[test]
    fn test_new_plant_state() {
        let plant = Plant::from_sequence(CARROT);
        assert_eq!(plant.progress, 0.0);
        assert_eq!(plant.health, 100.0);
        assert!(!plant.ready);
        assert_eq!(plant.state(), PlantState::Growing);
        assert_eq!(plant.genotype().to_sequence(), CARROT);
    }

    #[test]
    fn test_growth_with_enough_water() {
        let mut plant = Plant::from_sequence(CARROT);
        let event = plant.update(&watered(), &mut always());
        assert_eq!(event, Some(GrowthEvent::Growing));
        // 10 * growth rate 1.0 * size modifier 1.15
        assert!((plant.progress - 11.5).abs() < 1e-9);
        assert_eq!(plant.health, 100.0);
        assert!(plant.watered);
    }

    #[test]
    fn test_tick_growth_follows_effective_growth_rate() {
        let mut plant = Plant::from_sequence(CARROT);
        let growth = plant
            .phenotype()
            .quantitative(TraitKey::GrowthRate)
            .unwrap()
            .derived;
        let rate = growth.effective_growth_rate.unwrap();
        let level_score = growth.effective_value.unwrap();

        plant.update(&watered(), &mut always());
        assert!((plant.progress - BASE_GROWTH_PER_TICK * rate).abs() < 1e-9);
        assert!((plant.progress - BASE_GROWTH_PER_TICK * level_score).abs() > 1.0);
    }

    #[test]
    fn test_insufficient_water_slows_and_hurts() {
        let mut plant = Plant::from_sequence(CARROT);
        // Carrot needs 26 water per tick
        let dry = TickConditions {
            water_level: 6.5,
            ..TickConditions::default()
        };
        plant.update(&dry, &mut always());
        assert!((plant.progress - 11.5 * 0.25).abs() < 1e-9);
        assert!((plant.health - (100.0 - 0.75 * 5.0)).abs() < 1e-9);
        assert!(!plant.watered);
    }

    #[test]
    fn test_pests_and_storms() {
        let mut plant = Plant::from_sequence(CARROT);
        let pests = TickConditions {
            pest_present: true,
            ..watered()
        };
        plant.update(&pests, &mut always());
        assert!((plant.progress - 5.75).abs() < 1e-9);
        assert_eq!(plant.health, 90.0);

        let storm = TickConditions {
            weather: Weather::Storm,
            ..watered()
        };
        plant.update(&storm, &mut always());
        assert!((plant.progress - 5.75).abs() < 1e-9);
        assert_eq!(plant.health, 70.0);
    }

    #[test]
    fn test_drought() {
        let mut plant = Plant::from_sequence(CARROT);
        let drought = TickConditions {
            weather: Weather::Drought,
            ..watered()
        };
        plant.update(&drought, &mut always());
        assert!((plant.progress - 11.5 * 0.3).abs() < 1e-9);
        assert_eq!(plant.health, 85.0);
    }

    #[test]
    fn test_matures_at_exactly_100() {
        let mut plant = Plant::from_sequence(CARROT);
        let mut rng = always();
        let mut events = Vec::new();
        while let Some(event) = plant.update(&watered(), &mut rng) {
            events.push(event);
            assert!(events.len() < 20, "plant never matured");
        }
        assert_eq!(events.last(), Some(&GrowthEvent::Matured));
        assert_eq!(plant.progress, 100.0);
        assert!(plant.ready);
        assert_eq!(plant.state(), PlantState::Ready);
    }

    #[test]
    fn test_update_on_ready_plant_is_noop() {
        let mut plant = Plant::from_sequence(CARROT);
        plant.progress = 100.0;
        plant.ready = true;
        plant.health = 42.0;

        let harsh = TickConditions {
            water_level: 0.0,
            pest_present: true,
            weather: Weather::Storm,
        };
        for _ in 0..3 {
            assert_eq!(plant.update(&harsh, &mut always()), None);
        }
        assert_eq!(plant.progress, 100.0);
        assert_eq!(plant.health, 42.0);
        assert!(plant.ready);
    }

    #[test]
    fn test_death_clamps_health_to_zero() {
        let mut plant = Plant::from_sequence(CARROT);
        plant.health = 3.0;
        let dry = TickConditions::default();
        assert_eq!(plant.update(&dry, &mut always()), Some(GrowthEvent::Died));
        assert_eq!(plant.health, 0.0);
        assert_eq!(plant.state(), PlantState::Dead);

        let progress = plant.progress;
        for _ in 0..3 {
            assert_eq!(plant.update(&watered(), &mut always()), None);
        }
        assert_eq!(plant.progress, progress);
        assert_eq!(plant.health, 0.0);
        assert_eq!(plant.state(), PlantState::Dead);
    }

    #[test]
    fn test_harvest_not_ready() {
        let plant = Plant::from_sequence(CARROT);
        let before = plant.clone();
        let result = plant.harvest(&mut always());
        assert!(matches!(result, Err(HarvestError::NotReady { .. })));
        assert_eq!(plant.progress, before.progress);
        assert_eq!(plant.health, before.health);
        assert_eq!(plant.ready, before.ready);
    }

    #[test]
    fn test_harvest_ready_plant() {
        let mut plant = Plant::from_sequence(CARROT);
        plant.progress = 100.0;
        plant.ready = true;

        let expected = round_half_up(10.0 * plant.phenotype().coin_multiplier()) as u32;
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let harvest = plant.harvest(&mut rng).unwrap();
            assert_eq!(harvest.coins, expected);
            assert!(harvest.seeds <= 1);
            assert_eq!(harvest.genotype, CARROT);
            assert!(harvest.message.contains("Orange Feathery"));
        }
        // Harvesting never resets the plant
        assert!(plant.ready);
        assert_eq!(plant.progress, 100.0);
    }

    #[test]
    fn test_carrot_coins_include_inbreeding() {
        // Six homozygous genes: 1.2 * 0.9
        let mut plant = Plant::from_sequence(CARROT);
        plant.ready = true;
        assert_eq!(plant.harvest(&mut always()).unwrap().coins, 11);
    }

    #[test]
    fn test_info() {
        let info = Plant::from_sequence(CARROT).info();
        assert_eq!(info.name, "Orange Feathery");
        assert_eq!(info.emoji, "🥕");
        assert_eq!(info.growth_days, 9);
        assert_eq!(info.water_needs, 26);
        // GR 2 raises the pest chance, but the score uses the base chance
        assert_eq!(info.resistance, 65);
        assert_eq!(info.sell_price, 11);
        assert_eq!(info.progress, 0.0);
        assert!(!info.ready);
    }

    #[test]
    fn test_weather_parsing() {
        assert_eq!("none".parse::<Weather>().unwrap(), Weather::Clear);
        assert_eq!("clear".parse::<Weather>().unwrap(), Weather::Clear);
        assert_eq!("Drought".parse::<Weather>().unwrap(), Weather::Drought);
        assert_eq!("storm".parse::<Weather>().unwrap(), Weather::Storm);
        assert!("hail".parse::<Weather>().is_err());
        assert_eq!(Weather::Clear.to_string(), "none");
    }
}
