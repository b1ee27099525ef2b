//! Optional TOML configuration for invasion runs.
//!
//! ```toml
//! seed = 42
//! move_limit = 10000
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use alien_invasion_system_invasion::MOVE_LIMIT;
use serde::Deserialize;
use thiserror::Error;

/// Settings read from a configuration file. Every key is optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) seed: Option<u64>,
    pub(crate) move_limit: Option<u32>,
}

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Fully resolved parameters of a single run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RunSettings {
    pub(crate) seed: u64,
    pub(crate) move_limit: u32,
}

impl FileConfig {
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Layers command-line overrides on top of the file values.
    ///
    /// `fallback_seed` is only consulted when neither source names a seed.
    pub(crate) fn resolve(
        self,
        seed: Option<u64>,
        move_limit: Option<u32>,
        fallback_seed: impl FnOnce() -> u64,
    ) -> RunSettings {
        RunSettings {
            seed: seed.or(self.seed).unwrap_or_else(fallback_seed),
            move_limit: move_limit.or(self.move_limit).unwrap_or(MOVE_LIMIT),
        }
    }
}
