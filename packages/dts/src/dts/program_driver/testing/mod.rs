pub mod echo_program;

pub use echo_program::*;
