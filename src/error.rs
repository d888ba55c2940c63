use thiserror::Error;

/// Errors surfaced by model construction and the batch/decoding contracts.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unsupported attention score mode `{0}`, only `general` is implemented")]
    UnsupportedScoreMode(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    #[error("sequence length {len} out of range, must be in [1, {max}]")]
    LengthOutOfRange { len: usize, max: usize },

    #[error("padding mask violation at row {row}, position {pos}: a position is PAD exactly when it lies beyond the true length")]
    PaddingMaskViolation { row: usize, pos: usize },

    #[error("extended-vocabulary id {id} out of range, must be below {limit}")]
    OovIdOutOfRange { id: usize, limit: usize },

    #[error("oov count {count} exceeds configured maximum {max}")]
    OovCountOutOfRange { count: usize, max: usize },
}
