use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Fractional bit mismatch: {lhs} vs {rhs}")]
    FormatMismatch { lhs: usize, rhs: usize },

    #[error("Operand width mismatch: {lhs} vs {rhs} bits")]
    WidthMismatch { lhs: usize, rhs: usize },

    #[error("Number too big for {bits} bits: {value}")]
    Capacity { value: i128, bits: usize },

    #[error("Cannot have unsigned negative number ({0})")]
    UnsignedNegative(i128),

    #[error("Cannot encode non-finite value {0}")]
    NonFinite(f64),

    #[error("Invalid bit value {value} at index {index}")]
    InvalidBit { index: usize, value: u8 },

    #[error("Invalid fixed-point format: {0}")]
    InvalidFormat(String),

    #[error("Slice of {requested} bits out of range for {width}-bit value")]
    SliceOutOfRange { requested: usize, width: usize },

    #[error("{bits}-bit value does not fit a 128-bit integer")]
    TooWide { bits: usize },

    #[error("Invalid shape {actual} / {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Coefficients must be loaded before evaluation")]
    CoefficientsNotLoaded,

    #[error("Filter design failed: {0}")]
    FilterDesign(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
