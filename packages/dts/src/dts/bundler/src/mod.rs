pub mod api;
pub mod command_bundler;

pub use api::*;
pub use command_bundler::*;
