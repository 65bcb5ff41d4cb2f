use crate::status::parser::StatusParseError;

/// Convenience result type used across the crate.
pub type DisplayResult<T> = Result<T, DisplayError>;

/// Top-level error type.
#[derive(thiserror::Error, Debug)]
pub enum DisplayError {
    /// Geometry or buffer contract violation. Fatal at construction time.
    #[error("validation error: {0}")]
    Validation(String),

    /// The bus transport refused or failed a transmission.
    #[error("transport error: {0}")]
    Transport(String),

    /// The external status process could not be run, timed out or exited non-zero.
    #[error("status fetch error: {0}")]
    StatusFetch(String),

    /// The status text did not match the expected grammar.
    #[error("status parse error: {0}")]
    StatusParse(#[from] StatusParseError),

    /// Any other error, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DisplayError {
    /// Build a [`DisplayError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DisplayError::Transport`] value.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Build a [`DisplayError::StatusFetch`] value.
    pub fn status_fetch(msg: impl Into<String>) -> Self {
        Self::StatusFetch(msg.into())
    }

    /// `true` for errors the status cycle recovers from by keeping the previous snapshot.
    pub fn is_status_error(&self) -> bool {
        matches!(self, Self::StatusFetch(_) | Self::StatusParse(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
