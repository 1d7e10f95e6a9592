use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Longest a single note may be held.
pub const MAX_NOTE_SECONDS: f64 = 3600.0;

/// Inclusive range for a 7-bit note attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: u8,
    pub max: u8,
}

impl ValueRange {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: i32) -> u8 {
        value.clamp(self.min as i32, self.max as i32) as u8
    }

    pub fn contains(&self, value: u8) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u8 {
        rng.random_range(self.min..=self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub population_size: usize,
    pub min_notes_per_bar: usize,
    pub max_notes_per_bar: usize,
    /// Bound of the signed error added to inherited pitch and velocity.
    pub mutation_error: u8,
    pub pitch: ValueRange,
    pub velocity: ValueRange,
    /// Wall-clock length of a note whose `end` is 0. A note plays for
    /// `(1 - end) * note_seconds`.
    pub note_seconds: f64,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            population_size: 10,
            min_notes_per_bar: 10,
            max_notes_per_bar: 10,
            mutation_error: 4,
            pitch: ValueRange::new(22, 127),
            velocity: ValueRange::new(70, 127),
            note_seconds: 1.0,
            seed: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: PathBuf::from(path),
            source,
        })?;
        Self::from_ron(&text)
    }

    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Config = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::Invalid(
                "population_size must be at least 1".into(),
            ));
        }
        if self.min_notes_per_bar == 0 {
            return Err(ConfigError::Invalid(
                "min_notes_per_bar must be at least 1".into(),
            ));
        }
        if self.min_notes_per_bar > self.max_notes_per_bar {
            return Err(ConfigError::Invalid(format!(
                "min_notes_per_bar ({}) exceeds max_notes_per_bar ({})",
                self.min_notes_per_bar, self.max_notes_per_bar
            )));
        }
        for (name, range) in [("pitch", self.pitch), ("velocity", self.velocity)] {
            if range.min > range.max {
                return Err(ConfigError::Invalid(format!(
                    "{} range is empty ({}..={})",
                    name, range.min, range.max
                )));
            }
            if range.max > 127 {
                return Err(ConfigError::Invalid(format!(
                    "{} range exceeds 127",
                    name
                )));
            }
        }
        if !(0.0..=MAX_NOTE_SECONDS).contains(&self.note_seconds) {
            return Err(ConfigError::Invalid(format!(
                "note_seconds must be between 0 and {}",
                MAX_NOTE_SECONDS
            )));
        }
        Ok(())
    }

    pub fn note_count<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.random_range(self.min_notes_per_bar..=self.max_notes_per_bar)
    }

    pub fn note_duration(&self, end: f32) -> Duration {
        let secs = (1.0 - end as f64) * self.note_seconds;
        Duration::try_from_secs_f64(secs.max(0.0))
            .unwrap_or(Duration::from_secs_f64(MAX_NOTE_SECONDS))
    }
}
