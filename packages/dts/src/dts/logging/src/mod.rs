pub mod capturing_logger;
pub mod logger;
pub mod tracing_logger;

pub use capturing_logger::*;
pub use logger::*;
pub use tracing_logger::*;
