//! Declaration Bundler
//!
//! Adapter over an external engine that merges an entry's declaration
//! graph into a single file.

pub mod src;


pub use src::*;
