pub mod compiler_host;
pub mod memory_file_system;
pub mod os_file_system;
pub mod types;
pub mod util;

pub use compiler_host::*;
pub use memory_file_system::*;
pub use os_file_system::*;
pub use types::*;
pub use util::*;
