//! Source Maps
//!
//! Declaration map parsing and the edits the emitter applies when a
//! declaration moves: rebasing `sources`, shifting generated lines and
//! offsetting original lines.

pub mod src;

#[cfg(test)]
mod test;

pub use src::*;
