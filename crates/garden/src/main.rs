mod cli;

use bevy::ecs::event::Events;
use bevy::prelude::*;
use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use plant_genetics::events::{
    CrossRequest, GardenConditions, GrowthTick, HarvestRequest, Harvested, PlantHarvested,
};
use plant_genetics::{
    presets, Breeder, GardenGeneticsPlugin, GeneticsConfig, Genotype, Plant, TickConditions,
};

use crate::cli::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let args = Cli::parse();
    run(args)
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn run(args: Cli) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GeneticsConfig::load(path)
            .wrap_err_with(|| format!("failed to load config {}", path.display()))?,
        None => GeneticsConfig::default(),
    };
    if args.seed.is_some() {
        config.rng_seed = args.seed;
    }

    let genotypes = resolve_plants(&args.plants)?;

    let mut app = App::new();
    app.add_plugins(GardenGeneticsPlugin { config })
        .insert_resource(GardenConditions(TickConditions {
            water_level: args.water,
            pest_present: args.pests,
            weather: args.weather,
        }));

    let mut garden = Vec::with_capacity(genotypes.len());
    for genotype in genotypes {
        let plant = Plant::new(genotype);
        let name = Name::new(plant.display_name());
        garden.push(app.world_mut().spawn((plant, name)).id());
    }
    info!(
        plants = garden.len(),
        ticks = args.ticks,
        weather = %args.weather,
        "Garden planted"
    );

    for _ in 0..args.ticks {
        app.world_mut().send_event(GrowthTick);
        app.update();
    }

    for &entity in &garden {
        if let Some(plant) = app.world().get::<Plant>(entity) {
            let plant_info = plant.info();
            info!(
                "{} {} | {:.0}% grown, health {:.0} | {} days, {} water/day, {}% resistance, sells for {}",
                plant_info.emoji,
                plant_info.name,
                plant_info.progress,
                plant.health,
                plant_info.growth_days,
                plant_info.water_needs,
                plant_info.resistance,
                plant_info.sell_price,
            );
        }
    }

    let ready: Vec<Entity> = garden
        .iter()
        .copied()
        .filter(|&entity| {
            app.world()
                .get::<Plant>(entity)
                .is_some_and(|plant| plant.ready)
        })
        .collect();
    for &entity in &ready {
        app.world_mut().send_event(HarvestRequest { entity });
    }
    app.update();

    let harvested: Vec<Entity> = app
        .world()
        .resource::<Events<PlantHarvested>>()
        .iter_current_update_events()
        .map(|harvested| harvested.entity)
        .collect();
    info!("Harvested {} of {} plants", harvested.len(), garden.len());

    replant(app.world_mut(), &harvested);

    if let [parent_a, parent_b, ..] = harvested[..] {
        app.world_mut().send_event(CrossRequest { parent_a, parent_b });
        app.update();
    } else {
        info!("Not enough harvested plants to cross");
    }

    for record in app.world().resource::<Breeder>().history() {
        info!(
            "{} x {} -> {} (at {})",
            record.parent_a, record.parent_b, record.offspring, record.timestamp
        );
    }

    Ok(())
}

/// Puts harvested plants back into the ground as seedlings of the same genotype.
fn replant(world: &mut World, entities: &[Entity]) {
    for &entity in entities {
        let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
            continue;
        };
        let Some(seedling) = entity_mut
            .get::<Plant>()
            .map(|plant| Plant::new(plant.genotype().clone()))
        else {
            continue;
        };
        entity_mut.insert(seedling).remove::<Harvested>();
    }
}

/// Each entry is a preset name or a full genotype sequence.
fn resolve_plants(entries: &[String]) -> Result<Vec<Genotype>> {
    if entries.is_empty() {
        return Ok(presets::PRESETS
            .iter()
            .map(|(_, sequence)| Genotype::parse(sequence))
            .collect());
    }

    entries
        .iter()
        .map(|entry| match presets::preset(entry) {
            Some(sequence) => Ok(Genotype::parse(sequence)),
            None => Genotype::parse_strict(entry).wrap_err_with(|| {
                format!(
                    "'{entry}' is neither a preset ({}) nor a valid genotype",
                    presets::preset_names().collect::<Vec<_>>().join(", ")
                )
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_presets_by_default() {
        let genotypes = resolve_plants(&[]).unwrap();
        assert_eq!(genotypes.len(), presets::PRESETS.len());
    }

    #[test]
    fn test_resolve_mixed_entries() {
        let entries = vec![
            "carrot".to_string(),
            "FC:BB-SZ:11-LS:22-BP:33-GR:55-YD:11-RS:22-WN:33".to_string(),
        ];
        let genotypes = resolve_plants(&entries).unwrap();
        assert_eq!(genotypes[0].to_sequence(), presets::CARROT);
        assert_eq!(genotypes[1].to_sequence(), entries[1]);
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        assert!(resolve_plants(&["cactus".to_string()]).is_err());
    }

    #[test]
    fn test_replant_resets_harvested_plants() {
        let mut world = World::new();
        let mut plant = Plant::from_sequence(presets::CARROT);
        plant.progress = 100.0;
        plant.ready = true;
        let carrot = world.spawn((plant, Harvested)).id();

        replant(&mut world, &[carrot]);

        let seedling = world.get::<Plant>(carrot).unwrap();
        assert!(!seedling.ready);
        assert_eq!(seedling.progress, 0.0);
        assert_eq!(seedling.genotype().to_sequence(), presets::CARROT);
        assert!(world.get::<Harvested>(carrot).is_none());
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from([
            "garden", "--ticks", "5", "--seed", "9", "--weather", "storm", "--pests", "--plant",
            "tomato",
        ]);
        assert_eq!(cli.ticks, 5);
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.weather, plant_genetics::Weather::Storm);
        assert!(cli.pests);
        assert_eq!(cli.plants, vec!["tomato".to_string()]);
        assert_eq!(cli.water, 100.0);
    }
}
