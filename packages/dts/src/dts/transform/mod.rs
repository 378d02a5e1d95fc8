//! Declaration Transform
//!
//! Text-level rewriting of emitted declaration content. Everything here
//! works on masked text: comments and string literal contents are blanked
//! out before matching, so patterns never fire inside them.

pub mod src;

#[cfg(test)]
mod test;

pub use src::*;
