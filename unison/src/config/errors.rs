use anyerror::AnyError;

/// Error variants related to configuration.
#[derive(Debug, thiserror::Error)]
#[derive(PartialEq, Eq)]
pub enum ConfigError {
    #[error("ParseError: {source} while parsing ({args:?})")]
    ParseError { source: AnyError, args: Vec<String> },

    /// The min retry interval is not smaller than the max retry interval.
    #[error("retry interval: min({min}) must be < max({max})")]
    RetryInterval { min: u64, max: u64 },

    #[error("start_retries must be at least 1")]
    ZeroStartRetries,
}
