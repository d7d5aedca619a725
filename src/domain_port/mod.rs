mod product_repo;
mod purchase_repo;
mod repo_tx;
mod store_error;
mod user_repo;

pub use product_repo::*;
pub use purchase_repo::*;
pub use repo_tx::*;
pub use store_error::*;
pub use user_repo::*;
