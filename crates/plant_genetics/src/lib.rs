//! Plant genetics for the garden game.
//!
//! Plants carry a [`Genotype`](genotype::Genotype) encoded as a compact sequence
//! such as `FC:RY-SZ:22-LS:33-BP:11-GR:12-YD:44-RS:22-WN:22`. The
//! [`Phenotype`](phenotype::Phenotype) resolver turns it into expressed traits,
//! [`Plant`](plant::Plant) grows under per-tick conditions, and the
//! [`Breeder`](breeding::Breeder) crosses two plants into an offspring.
//!
//! Everything works as plain Rust; [`GardenGeneticsPlugin`] additionally wires
//! it into a Bevy `App` through events.
//!
//! # Example
//! ```no_run
//! use bevy::prelude::*;
//! use plant_genetics::GardenGeneticsPlugin;
//!
//! App::new()
//!     .add_plugins(GardenGeneticsPlugin::default())
//!     .run();
//! ```

use bevy::prelude::*;

pub mod breeding;
pub mod config;
pub mod events;
pub mod genotype;
pub mod phenotype;
pub mod plant;
pub mod presets;
pub mod registry;
pub mod rng;
pub mod systems;

pub use breeding::{Breeder, CrossingRecord};
pub use config::{BreedingConfig, ConfigError, GeneticsConfig};
pub use genotype::{generate_default_sequence, AllelePair, GeneValue, Genotype, GenotypeError};
pub use phenotype::{Phenotype, TraitExpression};
pub use plant::{
    GrowthEvent, HarvestError, HarvestYield, Plant, PlantInfo, PlantState, TickConditions,
    Weather,
};
pub use registry::{TraitKey, TraitRegistry};
pub use rng::GardenRng;

/// Registers the garden resources, events and systems.
#[derive(Default)]
pub struct GardenGeneticsPlugin {
    pub config: GeneticsConfig,
}

impl Plugin for GardenGeneticsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .insert_resource(GardenRng::from_config(&self.config))
            .insert_resource(Breeder::new(self.config.breeding))
            .init_resource::<events::GardenConditions>()
            .add_event::<events::GrowthTick>()
            .add_event::<events::PlantGrowthEvent>()
            .add_event::<events::HarvestRequest>()
            .add_event::<events::PlantHarvested>()
            .add_event::<events::HarvestFailed>()
            .add_event::<events::CrossRequest>()
            .add_event::<events::OffspringSpawned>()
            .configure_sets(
                Update,
                (GardenSet::Growth, GardenSet::Harvest, GardenSet::Breeding).chain(),
            )
            .add_systems(Update, systems::advance_plants.in_set(GardenSet::Growth))
            .add_systems(Update, systems::process_harvests.in_set(GardenSet::Harvest))
            .add_systems(
                Update,
                systems::process_crossings.in_set(GardenSet::Breeding),
            );
    }

    fn name(&self) -> &str {
        "GardenGeneticsPlugin"
    }
}

/// Order of the garden systems within `Update`.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum GardenSet {
    /// Tick every plant.
    Growth,
    /// Resolve harvest requests.
    Harvest,
    /// Resolve crossings and spawn offspring.
    Breeding,
}
