pub mod admin;
pub mod agent;
pub mod booking;
pub mod credentials;
pub mod location;
pub mod notify;
pub mod package;
pub mod pagination;
pub mod repository;
pub mod request;
pub mod traveler;

/// Failure raised by a store implementation. Handlers map this to a
/// generic 500; the underlying cause is logged, never surfaced.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("unexpected value in column {column}: {value}")]
    Corrupt { column: &'static str, value: String },
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid mail address: {0}")]
    Address(String),
    #[error("failed to build message: {0}")]
    Message(String),
    #[error("smtp delivery failed: {0}")]
    Transport(String),
}
