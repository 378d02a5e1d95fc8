//! TypeScript declaration emitter
//!
//! Emits, rewrites, bundles and mirrors `.d.ts` files for a library build.

pub mod config;
pub mod dts;
pub mod perform_watch;
pub mod plugin;

pub use plugin::DtsPlugin;

/// Crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
