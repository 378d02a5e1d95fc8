pub mod isolated_program;
pub mod vue_script;

pub use isolated_program::*;
pub use vue_script::*;
