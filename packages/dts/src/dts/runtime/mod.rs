//! Runtime
//!
//! Owns the declaration program, the root file set and the per-module
//! bookkeeping that keeps re-emission incremental.

pub mod src;

#[cfg(test)]
mod test;

pub use src::*;
