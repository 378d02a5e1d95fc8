pub mod alias;
pub mod ambient;
pub mod imports;
pub mod pure_import;
pub mod scanner;
pub mod static_import;
pub mod transformer;

pub use alias::*;
pub use ambient::*;
pub use imports::*;
pub use pure_import::*;
pub use scanner::*;
pub use static_import::*;
pub use transformer::*;
