use teamhub_core::error::CoreError;

/// Failure reported by a storage gateway.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A uniqueness guarantee of the store was violated (e.g. a second
    /// application for the same project and user).
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Error returned by every engine operation.
///
/// Business-rule violations surface as [`CoreError`]; anything the storage
/// layer could not do surfaces as [`StorageError`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type EngineResult<T> = Result<T, EngineError>;
