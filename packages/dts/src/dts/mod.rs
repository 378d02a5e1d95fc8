//! Declaration Emitter
//!
//! Core engine: the runtime tracking which modules still need declarations,
//! the resolvers producing them, the text transforms applied to them and the
//! orchestration that writes, bundles and mirrors the results.

pub mod bundler;
pub mod diagnostics;
pub mod emit;
pub mod entry_point;
pub mod file_system;
pub mod logging;
pub mod program_driver;
pub mod resolvers;
pub mod runtime;
pub mod sourcemaps;
pub mod transform;
