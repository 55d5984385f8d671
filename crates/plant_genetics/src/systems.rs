//! Systems wiring plants and the breeder into the schedule.

use bevy::prelude::*;
use tracing::{debug, info, warn};

use crate::breeding::Breeder;
use crate::events::{
    CrossRequest, GardenConditions, GrowthTick, HarvestFailed, HarvestRequest, Harvested,
    OffspringSpawned, PlantGrowthEvent, PlantHarvested,
};
use crate::plant::Plant;
use crate::rng::GardenRng;

/// Runs one `Plant::update` per plant for every pending [`GrowthTick`].
pub fn advance_plants(
    mut ticks: EventReader<GrowthTick>,
    conditions: Res<GardenConditions>,
    mut rng: ResMut<GardenRng>,
    mut plants: Query<(Entity, &mut Plant)>,
    mut growth_writer: EventWriter<PlantGrowthEvent>,
) {
    let pending = ticks.read().count();
    if pending == 0 {
        return;
    }

    for _ in 0..pending {
        for (entity, mut plant) in plants.iter_mut() {
            if let Some(event) = plant.update(&conditions.0, &mut *rng) {
                growth_writer.write(PlantGrowthEvent { entity, event });
            }
        }
    }
    debug!(ticks = pending, "Plants advanced");
}

/// Harvests ready plants and marks them [`Harvested`]. The plant itself is
/// left as it is; a second request for the same plant fails.
pub fn process_harvests(
    mut commands: Commands,
    mut requests: EventReader<HarvestRequest>,
    mut rng: ResMut<GardenRng>,
    plants: Query<(&Plant, Has<Harvested>)>,
    mut harvested_writer: EventWriter<PlantHarvested>,
    mut failed_writer: EventWriter<HarvestFailed>,
) {
    // Marker inserts are deferred; repeats within this frame are caught here.
    let mut harvested_now = Vec::new();
    for request in requests.read() {
        let Ok((plant, already_harvested)) = plants.get(request.entity) else {
            warn!("Harvest requested for unknown entity {:?}", request.entity);
            failed_writer.write(HarvestFailed {
                entity: request.entity,
                reason: format!("no plant on entity {:?}", request.entity),
            });
            continue;
        };

        if already_harvested || harvested_now.contains(&request.entity) {
            failed_writer.write(HarvestFailed {
                entity: request.entity,
                reason: format!("{} has already been harvested", plant.display_name()),
            });
            continue;
        }

        match plant.harvest(&mut *rng) {
            Ok(harvest) => {
                info!("{}", harvest.message);
                commands.entity(request.entity).insert(Harvested);
                harvested_now.push(request.entity);
                harvested_writer.write(PlantHarvested {
                    entity: request.entity,
                    harvest,
                });
            }
            Err(error) => {
                debug!("Harvest refused: {error}");
                failed_writer.write(HarvestFailed {
                    entity: request.entity,
                    reason: error.to_string(),
                });
            }
        }
    }
}

/// Crosses the requested parents and spawns the offspring as a new entity.
pub fn process_crossings(
    mut commands: Commands,
    mut requests: EventReader<CrossRequest>,
    mut breeder: ResMut<Breeder>,
    mut rng: ResMut<GardenRng>,
    plants: Query<&Plant>,
    mut spawned_writer: EventWriter<OffspringSpawned>,
) {
    for request in requests.read() {
        let parent_a = plants.get(request.parent_a).ok();
        let parent_b = plants.get(request.parent_b).ok();

        let Some(child) = breeder.cross(parent_a, parent_b, &mut *rng) else {
            warn!(
                "Crossing skipped, missing parent: {:?} x {:?}",
                request.parent_a, request.parent_b
            );
            continue;
        };

        let name = child.info().name;
        let entity = commands.spawn((child, Name::new(name))).id();
        spawned_writer.write(OffspringSpawned {
            child: entity,
            parent_a: request.parent_a,
            parent_b: request.parent_b,
        });
    }
}
