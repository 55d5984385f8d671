use std::path::PathBuf;

use clap::Parser;
use plant_genetics::Weather;

#[derive(Parser, Debug)]
#[command(
    name = "garden",
    version,
    about = "Grow, harvest and cross plants in a headless garden"
)]
pub struct Cli {
    /// Number of growth ticks to simulate
    #[arg(long, default_value_t = 20)]
    pub ticks: u32,

    /// Seed for reproducible runs (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// RON file with breeding settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Water available per tick
    #[arg(long, default_value_t = 100.0)]
    pub water: f64,

    /// Pests are present every tick
    #[arg(long)]
    pub pests: bool,

    /// none, drought or storm
    #[arg(long, default_value = "none")]
    pub weather: Weather,

    /// Preset name or genotype sequence; repeatable. All presets if omitted
    #[arg(long = "plant")]
    pub plants: Vec<String>,
}
