//! Logging
//!
//! The logger seam the engine reports through. Hosts plug in their own
//! implementation; the default forwards to `tracing`.

pub mod src;

#[cfg(test)]
mod test;

pub use src::*;
