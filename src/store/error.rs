use thiserror::Error;

use crate::declarations::DeclarationError;

/// Errors from building or driving a store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid store declarations: {0}")]
    Declaration(#[from] DeclarationError),

    #[error("Store is already initialized")]
    AlreadyInitialized,

    #[error("Store is not initialized")]
    NotInitialized,

    /// `init` spawns its tasks on the ambient tokio runtime.
    #[error("Store init requires a running tokio runtime")]
    NoRuntime,

    #[error("State stream closed")]
    StateClosed,
}
