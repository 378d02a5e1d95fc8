pub mod api;
pub mod json_resolver;
pub mod registry;
pub mod vue_resolver;

pub use api::*;
pub use json_resolver::*;
pub use registry::*;
pub use vue_resolver::*;
