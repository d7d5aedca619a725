//! In-process storage backend.
//!
//! Transactions work on a private copy of the tables while holding the store
//! mutex, so they are fully serialised; commit swaps the copy in. Selected with
//! `storage.backend = "memory"` and used by the test-suite.

mod product_repo_memory;
mod purchase_repo_memory;
mod repo_tx_memory;
mod user_repo_memory;

pub use product_repo_memory::*;
pub use purchase_repo_memory::*;
pub use repo_tx_memory::*;
pub use user_repo_memory::*;
