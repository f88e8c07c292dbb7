use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Rule validation failures. Matching itself is infallible; these only
/// surface when a host validates rules at load time.
#[derive(Debug, Error)]
pub enum Error {
    #[error("trigger command must not be empty")]
    EmptyCommand,

    #[error("invalid trigger pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
