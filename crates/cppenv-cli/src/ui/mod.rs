//! Console output.

mod output;
pub mod theme;

pub use output::Output;
