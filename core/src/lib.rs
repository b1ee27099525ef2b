#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the alien invasion simulator.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and every participant reports what
//! happened through [`Event`] values. Cities and agents are referenced by the
//! opaque [`CityId`] and [`AgentId`] handles rather than by pointer.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of directional road slots carried by every city.
pub const DIRECTION_COUNT: usize = 4;

/// Compass-like labels for the roads leaving a city.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Road leading north.
    North,
    /// Road leading south.
    South,
    /// Road leading west.
    West,
    /// Road leading east.
    East,
}

impl Direction {
    /// Every direction in road slot order.
    pub const ALL: [Direction; DIRECTION_COUNT] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Index of the road slot reserved for this direction.
    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            Self::North => 0,
            Self::South => 1,
            Self::West => 2,
            Self::East => 3,
        }
    }

    /// Direction pointing back the way this one came.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::East => Self::West,
        }
    }

    /// Token used for the direction in map files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::West => "west",
            Self::East => "east",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a token does not name one of the four directions.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown direction `{0}`")]
pub struct ParseDirectionError(String);

impl ParseDirectionError {
    /// Token that failed to parse.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "north" => Ok(Self::North),
            "south" => Ok(Self::South),
            "west" => Ok(Self::West),
            "east" => Ok(Self::East),
            other => Err(ParseDirectionError(other.to_owned())),
        }
    }
}

/// Handle of a city registered with the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CityId(u32);

impl CityId {
    /// Creates a new city identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an invading agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Alien#{}", self.0)
    }
}

/// Directional road from a declared city to a named neighbor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Road {
    /// Slot the road occupies on its source city.
    pub direction: Direction,
    /// Name of the city the road leads to.
    pub destination: String,
}

impl Road {
    /// Creates a road heading `direction` towards `destination`.
    #[must_use]
    pub fn new(direction: Direction, destination: impl Into<String>) -> Self {
        Self {
            direction,
            destination: destination.into(),
        }
    }
}

impl fmt::Display for Road {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.direction, self.destination)
    }
}

/// Primary declaration of a city and its outgoing roads.
///
/// Renders as a single map line, `Name dir=Neighbor dir=Neighbor`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Declaration {
    /// Unique name of the declared city.
    pub name: String,
    /// Roads leaving the city, in declaration order.
    pub roads: Vec<Road>,
}

impl Declaration {
    /// Creates a declaration for a city without roads.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roads: Vec::new(),
        }
    }

    /// Appends a road to the declaration.
    #[must_use]
    pub fn with_road(mut self, direction: Direction, destination: impl Into<String>) -> Self {
        self.roads.push(Road::new(direction, destination));
        self
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for road in &self.roads {
            write!(f, " {road}")?;
        }
        Ok(())
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Registers a city together with its outgoing roads.
    DeclareCity(Declaration),
    /// Marks a city as destroyed. Destruction is permanent.
    DestroyCity {
        /// City that should fall.
        city: CityId,
    },
}

/// Events broadcast by the world and the invasion after processing work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a declaration was accepted.
    CityDeclared {
        /// City that received the declared roads.
        city: CityId,
    },
    /// Reports that a declaration was ignored.
    DeclarationRejected {
        /// Name carried by the rejected declaration.
        name: String,
        /// Specific reason the declaration failed.
        reason: DeclarationError,
    },
    /// Confirms that a city transitioned from intact to destroyed.
    CityDestroyed {
        /// City that fell.
        city: CityId,
    },
    /// Agents dropped into a city during the initial distribution.
    AgentsLanded {
        /// City receiving the agents.
        city: CityId,
        /// Agents placed into the city, in id order.
        agents: Vec<AgentId>,
    },
    /// An agent travelled along a road.
    AgentAdvanced {
        /// Agent that moved.
        agent: AgentId,
        /// City the agent left.
        from: CityId,
        /// City the agent arrived at.
        to: CityId,
    },
    /// An agent found its city destroyed and was removed.
    AgentPerished {
        /// Agent that was removed.
        agent: AgentId,
        /// City that no longer stands.
        city: CityId,
    },
    /// Two or more agents arrived at the same city in one round.
    AgentsCollided {
        /// City the agents fought over.
        city: CityId,
        /// Every agent that arrived, in id order.
        agents: Vec<AgentId>,
    },
    /// The invasion can make no further progress.
    InvasionHalted {
        /// Why the invasion stopped.
        reason: HaltReason,
    },
}

/// Terminal conditions of an invasion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HaltReason {
    /// Every agent has been eliminated.
    Extinct,
    /// Surviving agents are immobile or have exhausted their move budget.
    Trapped {
        /// Number of agents still alive.
        survivors: usize,
    },
    /// An agent occupies a city the world has never registered.
    ///
    /// The round is abandoned before any agent moves.
    Inconsistent {
        /// First agent found in the unknown city.
        agent: AgentId,
        /// City id the world does not know.
        city: CityId,
    },
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extinct => f.write_str("all aliens were mutually destroyed"),
            Self::Trapped { survivors } => write!(f, "all {survivors} remaining aliens are trapped"),
            Self::Inconsistent { agent, city } => {
                write!(f, "{agent} occupies unknown city #{}", city.get())
            }
        }
    }
}

/// Reasons a city declaration may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum DeclarationError {
    /// A primary declaration with the same name was already accepted.
    #[error("city was already declared")]
    DuplicateCity,
}
