//! File System Abstraction
//!
//! Every write the emitter performs goes through `FileSystem`, so passes can
//! run against the real disk or an in-memory tree.

pub mod src;


pub use src::*;
