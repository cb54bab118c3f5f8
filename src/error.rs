use std::path::PathBuf;

/// Reasons a breakpoint table is rejected at construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BreakpointError {
    #[error("at least two breakpoints are required, got {0}")]
    TooFew(usize),
    #[error("first breakpoint must sit at position 0, found {0}")]
    FirstNotZero(f64),
    #[error("last breakpoint must sit at position 1, found {0}")]
    LastNotOne(f64),
    #[error("breakpoint {index} at {position} does not follow {previous}")]
    NotIncreasing {
        index: usize,
        position: f64,
        previous: f64,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid breakpoint table: {0}")]
    Breakpoints(#[from] BreakpointError),

    #[error("invalid value {value} for `{name}`: {reason}")]
    InvalidConstant {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("could not read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("event loop failure: {0}")]
    EventLoop(#[from] calloop::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
