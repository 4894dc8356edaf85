use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid parameter set: {0}")]
    InvalidParameterSet(String),
    #[error("All one-time keys consumed: index reached {0}")]
    KeyExhausted(u32),
    #[error("Failed to durably commit signature index {0}: {1}")]
    IndexCommit(u32, String),
    #[error("Invalid length: expected {0} bytes, found {1} bytes")]
    BadLength(usize, usize),
}
