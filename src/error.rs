//! Error type shared by every module of the crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlignError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown scorer '{0}' (expected one of: dna, protein, blosum62)")]
    UnknownScorer(String),

    #[error("At least two input sequences are required, got {0}")]
    TooFewSequences(usize),

    #[error("Input sequence #{0} is empty")]
    EmptySequence(usize),

    #[error("Input sequence #{0} contains non-ASCII symbols")]
    NonAsciiSequence(usize),

    #[error("Operator {operator} takes {expected} parent(s), got {got}")]
    OperatorArity {
        operator: String,
        expected: usize,
        got: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AlignError>;
