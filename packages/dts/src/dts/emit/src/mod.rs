pub mod orchestrator;
pub mod parallel;
pub mod writer;

pub use orchestrator::*;
pub use parallel::*;
pub use writer::*;
