//! Error taxonomy for content, configuration and persistence failures.
//!
//! Expected gameplay conditions (out-of-order test requests, a missing save,
//! input while moving) never surface here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    /// A test id was requested that has no definition
    #[error("No test definition for test {0}")]
    UnknownTest(u32),

    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Content decoded fine but breaks an invariant of the game data
    #[error("Malformed content in {context}: {reason}")]
    MalformedContent { context: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl GameError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GameError::Io { path: path.into(), source }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        GameError::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        GameError::MalformedContent {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_problem() {
        let err = GameError::UnknownTest(7);
        assert_eq!(err.to_string(), "No test definition for test 7");

        let err = GameError::malformed("questions/t1.toml", "question 2 has no options");
        assert!(err.to_string().contains("questions/t1.toml"));
        assert!(err.to_string().contains("question 2 has no options"));
    }
}
