pub mod raw_source_map;
pub mod rebase;
pub mod vlq;

pub use raw_source_map::*;
pub use rebase::*;
pub use vlq::*;
