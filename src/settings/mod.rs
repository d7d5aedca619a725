//! Layered settings: a TOML file picked by `--settings` (or the build
//! profile's default), overridden by `STOREFRONT__*` environment variables.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
