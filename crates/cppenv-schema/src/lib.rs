//! Shared value types for cppenv.
//!
//! Everything here is plain data: no I/O, no processes. The engine in
//! `cppenv-core` consumes these to decide what to download and where files go.

pub mod platform;
pub mod types;

// Re-exports
pub use platform::*;
pub use types::*;
