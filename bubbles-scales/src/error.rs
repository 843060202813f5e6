#[derive(Debug, PartialEq, thiserror::Error)]
pub enum BubblesScaleError {
    #[error("Domain bounds must be finite, got ({0}, {1})")]
    NonFiniteDomain(f64, f64),

    #[error("Range bounds must be finite, got ({0}, {1})")]
    NonFiniteRange(f64, f64),

    #[error("Invalid timestamp for date formatting: {0}")]
    InvalidTimestamp(f64),
}
