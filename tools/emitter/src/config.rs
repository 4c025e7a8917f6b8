//! Emitter configuration
//!
//! Where the source series live, which stream they are published under, and
//! how fast. Read from the environment with defaults for every key.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

pub const ENV_TOPIC: &str = "AVG_TOPIC";
pub const ENV_INTERVAL_SECONDS: &str = "AVG_INTERVAL_SECONDS";
pub const ENV_DATA_DIR: &str = "DATA_DIR";
pub const ENV_CHANNEL_CAPACITY: &str = "CHANNEL_CAPACITY";

/// Configuration for the record emitter.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterConfig {
    /// Logical stream name, used for logging only.
    pub topic: String,
    /// Delay between consecutive messages.
    pub interval: Duration,
    /// Directory holding the three series files.
    pub data_dir: PathBuf,
    pub total_file: String,
    pub female_file: String,
    pub male_file: String,
    /// Capacity of the bounded message channel.
    pub channel_capacity: usize,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            topic: "unknown_topic".to_string(),
            interval: Duration::from_secs(1),
            data_dir: PathBuf::from("data"),
            total_file: "avg_le.csv".to_string(),
            female_file: "female_le.csv".to_string(),
            male_file: "male_le.csv".to_string(),
            channel_capacity: 64,
        }
    }
}

impl EmitterConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let topic = lookup(ENV_TOPIC).unwrap_or(defaults.topic);
        let interval = lookup(ENV_INTERVAL_SECONDS)
            .map(|raw| parse_interval(&raw).unwrap_or_else(|| {
                warn!(key = ENV_INTERVAL_SECONDS, value = %raw, "Invalid interval, using default");
                defaults.interval
            }))
            .unwrap_or(defaults.interval);
        let data_dir = lookup(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let channel_capacity = lookup(ENV_CHANNEL_CAPACITY)
            .map(|raw| match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    warn!(key = ENV_CHANNEL_CAPACITY, value = %raw, "Invalid capacity, using default");
                    defaults.channel_capacity
                }
            })
            .unwrap_or(defaults.channel_capacity);

        info!(
            topic = %topic,
            interval_ms = interval.as_millis() as u64,
            data_dir = %data_dir.display(),
            channel_capacity,
            "Emitter configuration loaded"
        );

        Self {
            topic,
            interval,
            data_dir,
            channel_capacity,
            ..defaults
        }
    }

    pub fn total_path(&self) -> PathBuf {
        self.data_dir.join(&self.total_file)
    }

    pub fn female_path(&self) -> PathBuf {
        self.data_dir.join(&self.female_file)
    }

    pub fn male_path(&self) -> PathBuf {
        self.data_dir.join(&self.male_file)
    }
}

/// Seconds as an integer or decimal, e.g. `1` or `0.25`.
fn parse_interval(raw: &str) -> Option<Duration> {
    let secs: f64 = raw.trim().parse().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}
