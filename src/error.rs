use thiserror::Error;

use crate::validation::Field;

/// A configuration field failed its format or sum check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: String,
}

/// The snapshot carried data the controller does not understand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    #[error("unknown hit direction code {0:?}")]
    UnknownDirection(String),
}

/// Transport or server failure on any of the workout endpoints.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request timed out")]
    Timeout,
    #[error("server responded with {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response body: {0}")]
    Decode(String),
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            RemoteError::Status(status)
        } else {
            RemoteError::Transport(err)
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Classification(#[from] ClassificationError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = ClassificationError::UnknownDirection("x".into());
        assert_eq!(err.to_string(), "unknown hit direction code \"x\"");

        let err = ValidationError {
            field: Field::Duration,
            reason: "expected SS or MM:SS".into(),
        };
        assert_eq!(err.to_string(), "invalid duration: expected SS or MM:SS");
    }

    #[test]
    fn wrapped_errors_keep_their_message() {
        let err: WorkoutError = RemoteError::Status(reqwest::StatusCode::BAD_GATEWAY).into();
        assert_eq!(err.to_string(), "server responded with 502 Bad Gateway");
    }
}
