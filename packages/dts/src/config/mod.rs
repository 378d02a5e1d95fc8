//! Configuration
//!
//! Engine options, lifecycle hooks and project `tsconfig.json` reading.

pub mod hooks;
pub mod options;
pub mod tsconfig;


pub use hooks::*;
pub use options::*;
pub use tsconfig::*;
