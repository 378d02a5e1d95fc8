//! Emission
//!
//! Turns the runtime's collected outputs into files: content rewriting,
//! containment-checked writes, entry synthesis, rollup and mirroring to
//! extra output directories.

pub mod src;


pub use src::*;
