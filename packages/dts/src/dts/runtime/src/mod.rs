pub mod alias_table;
pub mod capabilities;
pub mod filter;
pub mod runtime;
pub mod state;

pub use alias_table::*;
pub use capabilities::*;
pub use filter::*;
pub use runtime::*;
pub use state::*;
