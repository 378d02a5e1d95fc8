pub mod default_export;
pub mod entry;
pub mod types_path;

pub use default_export::*;
pub use entry::*;
pub use types_path::*;
