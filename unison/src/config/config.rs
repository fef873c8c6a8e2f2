//! Unison runtime configuration.

use std::time::Duration;

use anyerror::AnyError;
use clap::Parser;
use rand::Rng;

use crate::config::errors::ConfigError;
use crate::membership::NodeId;

/// The runtime configuration for a node's singleton coordinator.
///
/// Every node of one cluster must run with an identical `preferred` setting:
/// the election result has to be a function of the view alone, and a cluster
/// whose nodes disagree on the preference rule can elect two members at once.
///
/// Timing-related values only affect how a failed service start is retried
/// locally; they play no part in the election itself.
#[derive(Clone, Debug, Parser)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct Config {
    /// The member to favor whenever it is present in the view.
    ///
    /// When absent, elections always fall back to the oldest surviving
    /// member.
    #[clap(long)]
    pub preferred: Option<NodeId>,

    /// How many attempts to start the payload service are made for one view
    /// before the coordinator gives up with a fatal error.
    #[clap(long, default_value = "3")]
    pub start_retries: u64,

    /// The minimum delay in milliseconds before retrying a failed service
    /// start.
    #[clap(long, default_value = "50")]
    pub retry_interval_min: u64,

    /// The maximum delay in milliseconds before retrying a failed service
    /// start.
    #[clap(long, default_value = "200")]
    pub retry_interval_max: u64,
}

impl Default for Config {
    fn default() -> Self {
        <Self as Parser>::parse_from(Vec::<&'static str>::new())
    }
}

impl Config {
    /// Generate a new random retry delay within the configured min & max.
    ///
    /// The jitter keeps several nodes that share a flapping service backend
    /// from retrying in lockstep.
    pub fn new_rand_retry_interval(&self) -> Duration {
        let ms = rand::thread_rng()
            .gen_range(self.retry_interval_min..self.retry_interval_max);

        Duration::from_millis(ms)
    }

    /// Build a `Config` instance from a series of command line arguments.
    ///
    /// The first element in `args` must be the application name.
    pub fn build(args: &[&str]) -> Result<Config, ConfigError> {
        let config = <Self as Parser>::try_parse_from(args).map_err(|e| {
            ConfigError::ParseError {
                source: AnyError::from(&e),
                args: args.iter().map(|x| x.to_string()).collect(),
            }
        })?;
        config.validate()
    }

    /// Validate the state of this config.
    pub fn validate(self) -> Result<Config, ConfigError> {
        if self.retry_interval_min >= self.retry_interval_max {
            return Err(ConfigError::RetryInterval {
                min: self.retry_interval_min,
                max: self.retry_interval_max,
            });
        }

        if self.start_retries == 0 {
            return Err(ConfigError::ZeroStartRetries);
        }

        Ok(self)
    }
}
