//! Resolvers
//!
//! Pluggable strategies that produce declarations for module kinds the
//! program cannot emit directly.

pub mod src;


pub use src::*;
