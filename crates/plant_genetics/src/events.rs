use bevy::prelude::*;

use crate::plant::{GrowthEvent, HarvestYield, TickConditions};

/// Advances every plant by one tick. Send one per simulated step.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct GrowthTick;

/// Outcome of a single plant's tick.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PlantGrowthEvent {
    pub entity: Entity,
    pub event: GrowthEvent,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct HarvestRequest {
    pub entity: Entity,
}

/// The plant has been harvested. Its entity keeps the ready [`Plant`] and
/// gains a [`Harvested`] marker; replanting is up to the caller.
///
/// [`Plant`]: crate::plant::Plant
#[derive(Event, Debug, Clone)]
pub struct PlantHarvested {
    pub entity: Entity,
    pub harvest: HarvestYield,
}

#[derive(Event, Debug, Clone)]
pub struct HarvestFailed {
    pub entity: Entity,
    pub reason: String,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct CrossRequest {
    pub parent_a: Entity,
    pub parent_b: Entity,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct OffspringSpawned {
    pub child: Entity,
    pub parent_a: Entity,
    pub parent_b: Entity,
}

/// Marks a plant entity that has already been harvested.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Harvested;

/// Environment applied to every plant on the next [`GrowthTick`].
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct GardenConditions(pub TickConditions);

impl std::ops::Deref for GardenConditions {
    type Target = TickConditions;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for GardenConditions {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
