pub mod error;
pub mod format;

pub use error::*;
pub use format::*;
