#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic invasion system that drops agents into the world and steps
//! them round by round until no further progress is possible.
//!
//! Every round runs in two passes. The first pass decides each agent's move
//! against the world as it stood when the round began. The second pass
//! resolves collisions and submits destruction commands to the world. Moves
//! within a round therefore never observe each other.

use std::collections::BTreeMap;

use alien_invasion_core::{AgentId, CityId, Command, Event, HaltReason};
use alien_invasion_world::{self as world, query, World};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, error};

/// Number of successful moves after which an agent no longer keeps the
/// invasion alive.
pub const MOVE_LIMIT: u32 = 10_000;

/// Configuration parameters required to construct the invasion system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    population: u32,
    rng_seed: u64,
    move_limit: u32,
}

impl Config {
    /// Creates a configuration dropping `population` agents, seeded with `rng_seed`.
    #[must_use]
    pub const fn new(population: u32, rng_seed: u64) -> Self {
        Self {
            population,
            rng_seed,
            move_limit: MOVE_LIMIT,
        }
    }

    /// Overrides the number of moves an agent may make while still counting
    /// as progress.
    #[must_use]
    pub const fn with_move_limit(mut self, move_limit: u32) -> Self {
        self.move_limit = move_limit;
        self
    }

    /// Number of agents to drop into the world.
    #[must_use]
    pub const fn population(&self) -> u32 {
        self.population
    }

    /// Seed for the random source driving placement and movement.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Move budget per agent.
    #[must_use]
    pub const fn move_limit(&self) -> u32 {
        self.move_limit
    }
}

/// Errors raised while constructing an invasion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InvasionError {
    /// No agents were requested, or there is no city to place them in.
    #[error("cannot drop {population} aliens into a world of {cities} cities")]
    InvalidPopulation {
        /// Requested number of agents.
        population: u32,
        /// Number of cities known to the world.
        cities: usize,
    },
}

/// Immutable representation of a single agent's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// City the agent currently occupies.
    pub city: CityId,
    /// Successful moves performed so far.
    pub moves: u32,
}

#[derive(Clone, Copy, Debug)]
struct Agent {
    city: CityId,
    moves: u32,
}

/// Pure system that owns the agent population and advances the invasion.
#[derive(Debug)]
pub struct Invasion {
    agents: BTreeMap<AgentId, Agent>,
    rng: ChaCha8Rng,
    move_limit: u32,
    round: u64,
    landings: Vec<Event>,
}

impl Invasion {
    /// Distributes the configured population across the world's cities.
    ///
    /// Cities are visited in a uniformly shuffled order, each receiving
    /// `max(1, population / cities)` agents until either side runs out. Any
    /// surplus is then dropped one agent at a time into cities chosen
    /// uniformly with replacement.
    pub fn new(world: &World, config: Config) -> Result<Self, InvasionError> {
        let population = config.population as usize;
        let mut cities: Vec<CityId> = query::city_ids(world).collect();
        if population == 0 || cities.is_empty() {
            return Err(InvasionError::InvalidPopulation {
                population: config.population,
                cities: cities.len(),
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        cities.shuffle(&mut rng);

        let per_city = (population / cities.len()).max(1);
        let mut placements: BTreeMap<CityId, Vec<AgentId>> = BTreeMap::new();
        let mut next_id = 1;
        let mut place = |city: CityId| {
            placements.entry(city).or_default().push(AgentId::new(next_id));
            next_id += 1;
        };

        let mut remaining = population;
        for &city in &cities {
            if remaining == 0 {
                break;
            }
            let count = per_city.min(remaining);
            for _ in 0..count {
                place(city);
            }
            remaining -= count;
        }

        while remaining > 0 {
            place(cities[rng.gen_range(0..cities.len())]);
            remaining -= 1;
        }

        let mut agents = BTreeMap::new();
        let mut landings = Vec::with_capacity(placements.len());
        for (city, ids) in placements {
            for &id in &ids {
                let _ = agents.insert(id, Agent { city, moves: 0 });
            }
            landings.push(Event::AgentsLanded { city, agents: ids });
        }

        debug!(
            population,
            cities = cities.len(),
            per_city,
            "aliens dropped into the world"
        );

        Ok(Self {
            agents,
            rng,
            move_limit: config.move_limit,
            round: 0,
            landings,
        })
    }

    /// Landing events describing the initial distribution, one per city.
    #[must_use]
    pub fn landings(&self) -> &[Event] {
        &self.landings
    }

    /// Number of agents still alive.
    #[must_use]
    pub fn population(&self) -> usize {
        self.agents.len()
    }

    /// Number of rounds executed so far.
    #[must_use]
    pub const fn round(&self) -> u64 {
        self.round
    }

    /// Move budget applied to every agent.
    #[must_use]
    pub const fn move_limit(&self) -> u32 {
        self.move_limit
    }

    /// Snapshot of a single agent, if it is still alive.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<AgentSnapshot> {
        self.agents.get(&id).map(|agent| AgentSnapshot {
            id,
            city: agent.city,
            moves: agent.moves,
        })
    }

    /// Snapshots of every live agent in id order.
    pub fn agents(&self) -> impl Iterator<Item = AgentSnapshot> + '_ {
        self.agents.iter().map(|(&id, agent)| AgentSnapshot {
            id,
            city: agent.city,
            moves: agent.moves,
        })
    }

    /// Advances the invasion by one synchronous round.
    ///
    /// Returns `false` once no further progress is possible: either the
    /// population was empty when the round began, or no agent that moved
    /// during the round is still below the move limit. In both cases an
    /// [`Event::InvasionHalted`] is emitted.
    ///
    /// An agent standing in a city `world` has never registered means the
    /// invasion is being stepped against the wrong world. The round is then
    /// abandoned untouched and the invasion halts with
    /// [`HaltReason::Inconsistent`].
    pub fn step(&mut self, world: &mut World, out: &mut Vec<Event>) -> bool {
        if self.agents.is_empty() {
            out.push(Event::InvasionHalted {
                reason: HaltReason::Extinct,
            });
            return false;
        }

        let unknown = self
            .agents
            .iter()
            .find(|(_, agent)| query::name(world, agent.city).is_none());
        if let Some((&agent, &Agent { city, .. })) = unknown {
            error!(
                %agent,
                city = city.get(),
                round = self.round,
                "agent occupies a city unknown to the world, abandoning the invasion"
            );
            out.push(Event::InvasionHalted {
                reason: HaltReason::Inconsistent { agent, city },
            });
            return false;
        }
        self.round += 1;

        let mut stalled = true;
        let mut fallen: Vec<AgentId> = Vec::new();
        let mut arrivals: BTreeMap<CityId, Vec<AgentId>> = BTreeMap::new();

        for (&id, agent) in self.agents.iter_mut() {
            if !query::is_standing(world, agent.city) {
                out.push(Event::AgentPerished {
                    agent: id,
                    city: agent.city,
                });
                fallen.push(id);
                continue;
            }

            let Some(destination) =
                query::random_reachable_neighbor(world, agent.city, &mut self.rng)
            else {
                continue;
            };

            out.push(Event::AgentAdvanced {
                agent: id,
                from: agent.city,
                to: destination,
            });
            agent.city = destination;
            agent.moves = agent.moves.saturating_add(1);
            if agent.moves < self.move_limit {
                stalled = false;
            }
            arrivals.entry(destination).or_default().push(id);
        }

        for id in &fallen {
            let _ = self.agents.remove(id);
        }

        let mut collisions = 0;
        for (city, arrived) in arrivals {
            if arrived.len() < 2 {
                continue;
            }
            for id in &arrived {
                let _ = self.agents.remove(id);
            }
            out.push(Event::AgentsCollided {
                city,
                agents: arrived,
            });
            world::apply(world, Command::DestroyCity { city }, out);
            collisions += 1;
        }

        debug!(
            round = self.round,
            fallen = fallen.len(),
            collisions,
            population = self.agents.len(),
            stalled,
            "round complete"
        );

        if !stalled {
            return true;
        }

        let reason = if self.agents.is_empty() {
            HaltReason::Extinct
        } else {
            HaltReason::Trapped {
                survivors: self.agents.len(),
            }
        };
        out.push(Event::InvasionHalted { reason });
        false
    }
}
