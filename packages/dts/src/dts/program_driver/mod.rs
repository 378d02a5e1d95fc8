//! Program Driver
//!
//! The default `ts::ProgramFactory`: declarations are produced per file with
//! oxc's isolated-declarations transform, so no cross-file type inference is
//! needed. Single-file components contribute their `<script>` blocks as
//! virtual `X.vue.ts` files.

pub mod src;
pub mod testing;

#[cfg(test)]
mod test;

pub use src::*;
