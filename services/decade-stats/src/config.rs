//! Configuration for the decade statistics service
//!
//! Aggregator tuning (drop threshold, display precision) plus the labels the
//! consumption loop logs under. Values come from `Default` or from the
//! process environment; unparseable values fall back to the default.

use tracing::{info, warn};

/// Environment variable names.
pub const ENV_TOPIC: &str = "AVG_TOPIC";
pub const ENV_GROUP_ID: &str = "AVG_CONSUMER_GROUP_ID";
pub const ENV_DROP_THRESHOLD: &str = "DROP_THRESHOLD";
pub const ENV_DISPLAY_PRECISION: &str = "DISPLAY_PRECISION";

/// Errors from configuration validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("drop threshold must be a finite, non-negative number of years: {0}")]
    InvalidThreshold(f64),
}

/// Tuning for the streaming aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorConfig {
    /// A year-over-year drop in total life expectancy strictly greater than
    /// this many years is flagged as significant.
    pub drop_threshold: f64,
    /// Decimal places used when rendering reports. Internal values keep full
    /// precision.
    pub display_precision: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            drop_threshold: 1.0,
            display_precision: 1,
        }
    }
}

impl AggregatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.drop_threshold.is_finite() || self.drop_threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.drop_threshold));
        }
        Ok(())
    }
}

/// Configuration for the channel consumption loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerConfig {
    /// Logical stream name, used for logging only.
    pub topic: String,
    /// Subscriber group name, used for logging only.
    pub group_id: String,
    pub aggregator: AggregatorConfig,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            topic: "unknown_topic".to_string(),
            group_id: "default_group".to_string(),
            aggregator: AggregatorConfig::default(),
        }
    }
}

impl ConsumerConfig {
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
        let group_id = lookup(ENV_GROUP_ID).unwrap_or(defaults.group_id);

        let drop_threshold = parse_or_default(
            &lookup,
            ENV_DROP_THRESHOLD,
            defaults.aggregator.drop_threshold,
        );
        let display_precision = parse_or_default(
            &lookup,
            ENV_DISPLAY_PRECISION,
            defaults.aggregator.display_precision,
        );

        info!(
            topic = %topic,
            group_id = %group_id,
            drop_threshold,
            display_precision,
            "Consumer configuration loaded"
        );

        Self {
            topic,
            group_id,
            aggregator: AggregatorConfig {
                drop_threshold,
                display_precision,
            },
        }
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy + std::fmt::Debug,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, ?default, "Unparseable value, using default");
                default
            }
        },
        None => default,
    }
}
