//! Error taxonomy for the crate's parsing/factory/sqrt/frobenius boundaries.
//!
//! Leaf arithmetic (add, mul, ...) never returns `Result`: callers establish
//! preconditions by construction (operands share a field). Only entry points
//! that parse external input can fail.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("not a square")]
    NotSquare,

    /// Reserved for a higher-level key-management layer; never produced by
    /// this crate.
    #[error("key not set")]
    KeyNotSet,
}

pub type Result<T> = std::result::Result<T, Error>;
