mod auth_service_impl;
mod credential_hasher_impl;
mod product_service_impl;
mod purchase_service_impl;
mod token_codec_impl;
mod user_service_impl;
pub mod validation;

pub use auth_service_impl::*;
pub use credential_hasher_impl::*;
pub use product_service_impl::*;
pub use purchase_service_impl::*;
pub use token_codec_impl::*;
pub use user_service_impl::*;
