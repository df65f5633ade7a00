//! Error types for configuring and running a chain search.

use thiserror::Error;

use crate::function::{Function, MAX_INPUTS};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("number of inputs must be in 1..={}, got {inputs}", MAX_INPUTS)]
    InvalidInputs { inputs: u32 },

    #[error("cannot parse '{text}' as a truth table of {inputs} inputs")]
    InvalidFunction { text: String, inputs: u32 },

    #[error("function {function} has {found} inputs, expected {expected}")]
    ArityMismatch {
        function: Function,
        expected: u32,
        found: u32,
    },

    #[error("at least one seed function is required")]
    NoSeeds,

    #[error("seed function {0} is given more than once")]
    DuplicateSeed(Function),

    #[error("at least one target function is required")]
    NoTargets,

    #[error("target {0} is the constant false function, which is never produced")]
    ConstantTarget(Function),

    #[error("max length {max_length} is shorter than the {seeds} seed functions")]
    MaxLengthTooSmall { max_length: usize, seeds: usize },

    #[error("resume vector has {len} entries, but at most {max} steps fit below the max length")]
    ResumeTooLong { len: usize, max: usize },

    #[error("resume index {index} at depth {depth} is out of range ({available} candidates)")]
    ResumeOutOfRange {
        depth: usize,
        index: usize,
        available: usize,
    },
}

pub type Result<T> = std::result::Result<T, ChainError>;
