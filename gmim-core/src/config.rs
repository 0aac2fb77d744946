use std::fs::read_to_string;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MEDIAN_MULTIPLIER, DEFAULT_MIN_READ_COUNT, DEFAULT_WINDOW_SIZE};
use crate::errors::{GmimError, Result};

///
/// Parameters of the windowed normalization. Shared read-only by every
/// chromosome task of every sample.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Window size in base pairs; must be a multiple of each chromosome's bin width.
    pub window_size: u32,
    pub median_multiplier: f64,
    /// Substituted for any raw count of exactly zero.
    pub min_read_count: f64,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        NormalizationConfig {
            window_size: DEFAULT_WINDOW_SIZE,
            median_multiplier: DEFAULT_MEDIAN_MULTIPLIER,
            min_read_count: DEFAULT_MIN_READ_COUNT,
        }
    }
}

impl NormalizationConfig {
    pub fn new(window_size: u32, median_multiplier: f64, min_read_count: f64) -> Result<Self> {
        let config = NormalizationConfig {
            window_size,
            median_multiplier,
            min_read_count,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(GmimError::InvalidConfig(
                "Window size must be positive.".to_string(),
            ));
        }
        if self.median_multiplier == 0.0 || !self.median_multiplier.is_finite() {
            return Err(GmimError::InvalidConfig(format!(
                "Median multiple must be a non-zero number, got {}.",
                self.median_multiplier
            )));
        }
        if !(self.min_read_count.is_finite() && self.min_read_count > 0.0) {
            return Err(GmimError::InvalidConfig(format!(
                "Default zero must be a positive number, got {}.",
                self.min_read_count
            )));
        }
        Ok(())
    }

    ///
    /// Number of bins a window spans for the given bin width.
    ///
    /// Returns `None` when the window size is not an exact multiple of the width.
    ///
    pub fn window_capacity(&self, interval_width: u32) -> Option<usize> {
        if interval_width == 0 || self.window_size % interval_width != 0 {
            return None;
        }
        Some((self.window_size / interval_width) as usize)
    }
}

/// Worker pool sizing and the wait bound applied to each processing phase.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PoolConfig {
    pub threads: Option<usize>,
    pub integration_threads: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub show_progress: bool,
}

impl PoolConfig {
    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) || self.integration_threads == Some(0) {
            return Err(GmimError::InvalidConfig(
                "Must select > 0 threads".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resolved_threads(&self) -> usize {
        self.threads.unwrap_or_else(available_threads)
    }

    pub fn resolved_integration_threads(&self) -> usize {
        self.integration_threads.unwrap_or_else(available_threads)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn available_threads() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

///
/// Top-level configuration, as read from a TOML file:
///
/// ```toml
/// [normalization]
/// window_size = 10000
/// median_multiplier = 1.0
/// min_read_count = 0.5
///
/// [pool]
/// threads = 8
/// timeout_secs = 43200
/// ```
///
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct GmimConfig {
    pub normalization: NormalizationConfig,
    pub pool: PoolConfig,
}

impl GmimConfig {
    pub fn from_toml(path: &Path) -> Result<Self> {
        let raw = read_to_string(path).map_err(|e| GmimError::resource(path, e))?;
        let config: GmimConfig = toml::from_str(&raw).map_err(|e| {
            GmimError::InvalidConfig(format!("Could not parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.normalization.validate()?;
        self.pool.validate()
    }
}
