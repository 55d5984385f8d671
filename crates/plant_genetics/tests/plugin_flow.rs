use bevy::ecs::event::Events;
use bevy::prelude::*;
use plant_genetics::events::{
    CrossRequest, GardenConditions, GrowthTick, HarvestFailed, HarvestRequest, Harvested,
    OffspringSpawned, PlantGrowthEvent, PlantHarvested,
};
use plant_genetics::presets::{CARROT, SUNFLOWER};
use plant_genetics::{
    Breeder, GardenGeneticsPlugin, GeneticsConfig, GrowthEvent, Plant, TickConditions,
};

fn garden_app() -> App {
    let mut app = App::new();
    app.add_plugins(GardenGeneticsPlugin {
        config: GeneticsConfig {
            rng_seed: Some(42),
            ..Default::default()
        },
    });
    app.insert_resource(GardenConditions(TickConditions {
        water_level: 100.0,
        ..Default::default()
    }));
    app
}

fn tick(app: &mut App) {
    app.world_mut().send_event(GrowthTick);
    app.update();
}

fn plant_count(app: &mut App) -> usize {
    app.world_mut().query::<&Plant>().iter(app.world()).count()
}

#[test]
fn test_tick_grows_plants() {
    let mut app = garden_app();
    let carrot = app.world_mut().spawn(Plant::from_sequence(CARROT)).id();

    tick(&mut app);

    let plant = app.world().get::<Plant>(carrot).unwrap();
    assert!((plant.progress - 11.5).abs() < 1e-9);
    assert!(plant.watered);

    let events = app.world().resource::<Events<PlantGrowthEvent>>();
    let reported: Vec<_> = events.iter_current_update_events().collect();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].entity, carrot);
    assert_eq!(reported[0].event, GrowthEvent::Growing);
}

#[test]
fn test_update_without_tick_changes_nothing() {
    let mut app = garden_app();
    let carrot = app.world_mut().spawn(Plant::from_sequence(CARROT)).id();

    app.update();

    assert_eq!(app.world().get::<Plant>(carrot).unwrap().progress, 0.0);
}

#[test]
fn test_mature_then_harvest() {
    let mut app = garden_app();
    let carrot = app.world_mut().spawn(Plant::from_sequence(CARROT)).id();

    // Harvesting too early is refused
    app.world_mut().send_event(HarvestRequest { entity: carrot });
    app.update();
    {
        let failed = app.world().resource::<Events<HarvestFailed>>();
        assert_eq!(failed.iter_current_update_events().count(), 1);
    }

    let mut matured = false;
    for _ in 0..20 {
        tick(&mut app);
        if app.world().get::<Plant>(carrot).unwrap().ready {
            matured = true;
            break;
        }
    }
    assert!(matured, "carrot should mature with full water in clear weather");

    app.world_mut().send_event(HarvestRequest { entity: carrot });
    app.update();

    let harvested: Vec<_> = app
        .world()
        .resource::<Events<PlantHarvested>>()
        .iter_current_update_events()
        .cloned()
        .collect();
    assert_eq!(harvested.len(), 1);
    assert_eq!(harvested[0].entity, carrot);
    assert_eq!(harvested[0].harvest.coins, 11);
    assert_eq!(harvested[0].harvest.genotype, CARROT);

    // The plant stays as it was; only the marker is added
    let plant = app.world().get::<Plant>(carrot).unwrap();
    assert!(plant.ready);
    assert_eq!(plant.progress, 100.0);
    assert_eq!(plant.genotype().to_sequence(), CARROT);
    assert!(app.world().get::<Harvested>(carrot).is_some());

    // A harvested plant cannot be harvested again
    app.world_mut().send_event(HarvestRequest { entity: carrot });
    app.update();
    assert_eq!(
        app.world()
            .resource::<Events<PlantHarvested>>()
            .iter_current_update_events()
            .count(),
        0
    );
    assert_eq!(
        app.world()
            .resource::<Events<HarvestFailed>>()
            .iter_current_update_events()
            .count(),
        1
    );
}

#[test]
fn test_duplicate_requests_in_one_frame_harvest_once() {
    let mut app = garden_app();
    let mut plant = Plant::from_sequence(CARROT);
    plant.progress = 100.0;
    plant.ready = true;
    let carrot = app.world_mut().spawn(plant).id();

    app.world_mut().send_event(HarvestRequest { entity: carrot });
    app.world_mut().send_event(HarvestRequest { entity: carrot });
    app.update();

    let world = app.world();
    let harvested = world.resource::<Events<PlantHarvested>>();
    assert_eq!(harvested.iter_current_update_events().count(), 1);
    let failed = world.resource::<Events<HarvestFailed>>();
    assert_eq!(failed.iter_current_update_events().count(), 1);
    assert!(world.get::<Plant>(carrot).unwrap().ready);
}

#[test]
fn test_death_is_reported_once() {
    let mut app = garden_app();
    app.insert_resource(GardenConditions(TickConditions::default()));
    let mut plant = Plant::from_sequence(CARROT);
    plant.health = 1.0;
    let carrot = app.world_mut().spawn(plant).id();

    let mut deaths = 0;
    for _ in 0..5 {
        tick(&mut app);
        deaths += app
            .world()
            .resource::<Events<PlantGrowthEvent>>()
            .iter_current_update_events()
            .filter(|event| event.entity == carrot && event.event == GrowthEvent::Died)
            .count();
    }

    assert_eq!(deaths, 1);
    assert_eq!(app.world().get::<Plant>(carrot).unwrap().health, 0.0);
}

#[test]
fn test_cross_spawns_offspring() {
    let mut app = garden_app();
    let carrot = app.world_mut().spawn(Plant::from_sequence(CARROT)).id();
    let sunflower = app.world_mut().spawn(Plant::from_sequence(SUNFLOWER)).id();

    app.world_mut().send_event(CrossRequest {
        parent_a: carrot,
        parent_b: sunflower,
    });
    app.update();

    assert_eq!(app.world().resource::<Breeder>().history().len(), 1);
    let spawned: Vec<_> = app
        .world()
        .resource::<Events<OffspringSpawned>>()
        .iter_current_update_events()
        .copied()
        .collect();
    assert_eq!(spawned.len(), 1);
    assert_eq!(spawned[0].parent_a, carrot);
    assert_eq!(spawned[0].parent_b, sunflower);

    assert_eq!(plant_count(&mut app), 3);
    let child = spawned[0].child;
    let name = app.world().get::<Name>(child).unwrap();
    let plant = app.world().get::<Plant>(child).unwrap();
    assert_eq!(name.as_str(), plant.info().name);
    assert_eq!(
        app.world().resource::<Breeder>().history()[0].offspring,
        plant.genotype().to_sequence()
    );
}

#[test]
fn test_cross_with_missing_parent_is_ignored() {
    let mut app = garden_app();
    let carrot = app.world_mut().spawn(Plant::from_sequence(CARROT)).id();
    let gone = app.world_mut().spawn_empty().id();
    app.world_mut().despawn(gone);

    app.world_mut().send_event(CrossRequest {
        parent_a: carrot,
        parent_b: gone,
    });
    app.update();

    assert!(app.world().resource::<Breeder>().history().is_empty());
    assert_eq!(plant_count(&mut app), 1);
}
