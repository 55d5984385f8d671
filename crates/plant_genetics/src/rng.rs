//! Injectable random source for the ECS side.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::config::GeneticsConfig;

/// Seedable random source shared by the garden systems.
#[derive(Resource, Debug)]
pub struct GardenRng(StdRng);

impl GardenRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn from_config(config: &GeneticsConfig) -> Self {
        match config.rng_seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RngCore for GardenRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}
