mod key;
mod page;
mod product;
mod purchase;
mod user;

pub use key::*;
pub use page::*;
pub use product::*;
pub use purchase::*;
pub use user::*;
