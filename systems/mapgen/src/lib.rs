#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic generator for random invasion maps.
//!
//! Maps are built from small star-shaped clusters: a hub city with one to
//! four neighbors, each neighbor declaring the reverse road back to its hub.
//! The requested city count is approximate and may be exceeded by one.

use std::collections::HashSet;

use alien_invasion_core::{Declaration, Direction, Road, DIRECTION_COUNT};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

const NAME_ATTEMPTS: u32 = 1_000;
const MIN_NAME_LENGTH: usize = 3;
const MAX_NAME_LENGTH: usize = 6;

/// Configuration parameters required to construct a map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    cities: u32,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration asking for roughly `cities` cities.
    #[must_use]
    pub const fn new(cities: u32, rng_seed: u64) -> Self {
        Self { cities, rng_seed }
    }

    /// Requested number of cities.
    #[must_use]
    pub const fn cities(&self) -> u32 {
        self.cities
    }

    /// Seed for the random source driving names and layout.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

/// Errors raised while generating a map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MapgenError {
    /// No unused city name could be found; the requested map is too large.
    #[error("could not find an unused city name after {attempts} attempts")]
    NamesExhausted {
        /// Number of names tried before giving up.
        attempts: u32,
    },
}

/// Generates the declarations of a random map.
pub fn generate(config: Config) -> Result<Vec<Declaration>, MapgenError> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
    let mut names = NamePool::default();
    let mut remaining = config.cities;
    let mut declarations = Vec::new();

    while remaining > 0 {
        let hub = names.fresh(&mut rng)?;
        remaining -= 1;

        let neighbor_count = if remaining >= DIRECTION_COUNT as u32 {
            rng.gen_range(1..=DIRECTION_COUNT as u32)
        } else {
            1
        };
        remaining = remaining.saturating_sub(neighbor_count);

        let mut free: Vec<Direction> = Direction::ALL.to_vec();
        let mut cluster = Declaration::new(hub.clone());
        let mut returns = Vec::with_capacity(neighbor_count as usize);
        for _ in 0..neighbor_count {
            let neighbor = names.fresh(&mut rng)?;
            let direction = free.swap_remove(rng.gen_range(0..free.len()));
            cluster.roads.push(Road::new(direction, neighbor.clone()));
            returns.push(Declaration::new(neighbor).with_road(direction.opposite(), hub.clone()));
        }

        declarations.push(cluster);
        declarations.extend(returns);
    }

    Ok(declarations)
}

/// Renders declarations in the map file format, one city per line.
#[must_use]
pub fn to_map_text(declarations: &[Declaration]) -> String {
    let mut text = String::new();
    for declaration in declarations {
        text.push_str(&declaration.to_string());
        text.push('\n');
    }
    text
}

#[derive(Debug, Default)]
struct NamePool {
    used: HashSet<String>,
}

impl NamePool {
    fn fresh<R: Rng>(&mut self, rng: &mut R) -> Result<String, MapgenError> {
        for _ in 0..NAME_ATTEMPTS {
            let candidate = random_name(rng);
            if self.used.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }
        Err(MapgenError::NamesExhausted {
            attempts: NAME_ATTEMPTS,
        })
    }
}

fn random_name<R: Rng>(rng: &mut R) -> String {
    let length = rng.gen_range(MIN_NAME_LENGTH..=MAX_NAME_LENGTH);
    (0..length)
        .map(|index| {
            let letter = char::from(b'a' + rng.gen_range(0..26_u8));
            if index == 0 {
                letter.to_ascii_uppercase()
            } else {
                letter
            }
        })
        .collect()
}
