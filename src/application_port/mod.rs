mod auth_service;
mod product_service;
mod purchase_service;
mod user_service;

pub use auth_service::*;
pub use product_service::*;
pub use purchase_service::*;
pub use user_service::*;
