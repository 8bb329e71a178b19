//! Error taxonomy for the acquisition pipeline.
//!
//! None of these abort a run: network errors are fatal only to the page or
//! item being processed, parse errors degrade to an absent/zero value, and
//! storage errors fall back to the next data tier.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("request for {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not parse {context}: {message}")]
    Parse { context: String, message: String },
    #[error("storage error: {source}")]
    Storage {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ScoutError {
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        ScoutError::Network {
            url: url.into(),
            source,
        }
    }

    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        ScoutError::Parse {
            context: context.into(),
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for ScoutError {
    fn from(e: rusqlite::Error) -> Self {
        ScoutError::Storage { source: Box::new(e) }
    }
}

impl From<std::io::Error> for ScoutError {
    fn from(e: std::io::Error) -> Self {
        ScoutError::Storage { source: Box::new(e) }
    }
}

impl From<csv::Error> for ScoutError {
    fn from(e: csv::Error) -> Self {
        // I/O problems are storage failures; malformed rows are parse failures.
        if e.is_io_error() {
            ScoutError::Storage { source: Box::new(e) }
        } else {
            ScoutError::parse("snapshot row", e.to_string())
        }
    }
}
