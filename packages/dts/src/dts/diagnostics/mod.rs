pub mod src;


pub use src::*;
pub use ts::{Diagnostic, DiagnosticCategory, DiagnosticMessageChain};
