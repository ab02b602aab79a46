//! Decorative placement for ice cubes and lemon slices.
//!
//! Placement is a pure function of the cube index and a [`RandomSource`], so a
//! seeded source always yields the same batch.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

pub const ICE_CUBE_COUNT: usize = 5;
pub const ICE_STAGGER_MS: u64 = 120;
pub const LEMON_SLICE_COUNT: usize = 2;
pub const LEMON_STAGGER_MS: u64 = 150;

/// Uniform samples in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

/// Draws from the thread-local generator on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// One ice cube as the glass renders it: position in percent of the glass,
/// rotation in degrees, edge length in px.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IceCube {
    pub index: usize,
    pub delay_ms: u64,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub size: f64,
}

pub fn ice_cube_placement<R: RandomSource + ?Sized>(index: usize, random: &mut R) -> IceCube {
    IceCube {
        index,
        delay_ms: index as u64 * ICE_STAGGER_MS,
        x: 10.0 + random.next_unit() * 60.0,
        y: 10.0 + random.next_unit() * 70.0,
        rotation: random.next_unit() * 360.0,
        size: 24.0 + random.next_unit() * 8.0,
    }
}

pub fn ice_batch<R: RandomSource + ?Sized>(random: &mut R) -> Vec<IceCube> {
    (0..ICE_CUBE_COUNT)
        .map(|index| ice_cube_placement(index, random))
        .collect()
}

/// Reveal delays of the lemon slices; the count is fixed by the flag alone.
pub fn lemon_slice_delays_ms() -> [u64; LEMON_SLICE_COUNT] {
    let mut delays = [0; LEMON_SLICE_COUNT];
    for (index, delay) in delays.iter_mut().enumerate() {
        *delay = index as u64 * LEMON_STAGGER_MS;
    }
    delays
}
