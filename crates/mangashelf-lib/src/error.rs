use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("request to {path} failed: {reason}")]
    Transport { path: String, reason: String },
    #[error("unexpected response from {path}: {reason}")]
    UnexpectedShape { path: String, reason: String },
    #[error("store error: {0}")]
    Store(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn transport(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transport {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn unexpected_shape(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::UnexpectedShape {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
