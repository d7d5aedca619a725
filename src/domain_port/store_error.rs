#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,
    /// A unique index rejected the write. Carries the operation attempted.
    #[error("duplicate key: {0}")]
    Duplicate(String),
    /// A foreign key still points at the row being deleted.
    #[error("row still referenced: {0}")]
    Referenced(String),
    /// Any other backend failure, annotated with the operation attempted.
    #[error("{0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(op: &str, e: impl std::fmt::Display) -> Self {
        StoreError::Backend(format!("{op}: {e}"))
    }
}
