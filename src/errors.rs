use thiserror::Error;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents a request for a toilet that was never created.
    #[error("Toilet not found")]
    NonExistentId(String),

    /// Represents a store whose lock was poisoned by a panicking writer.
    #[error("Store unavailable")]
    StorePoisoned,
}
