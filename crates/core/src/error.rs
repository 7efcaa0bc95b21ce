/// Errors raised by the pure domain layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A request or filter value failed validation before any I/O.
    #[error("Validation failed: {0}")]
    Validation(String),
}
