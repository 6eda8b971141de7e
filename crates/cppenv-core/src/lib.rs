//! cppenv core: the environment provisioning engine.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.cppenv/                  # machine-wide, shared by every project
//! ├── python/python/...       # extracted CPython runtime
//! └── tmp/                    # download staging
//!
//! <project>/
//! ├── cppenv.toml             # declared tools and scripts
//! └── .cppenv/
//!     ├── venv/               # isolated environment (bin/ or Scripts/)
//!     ├── zig-cc, zig-c++     # compiler wrappers
//!     ├── zig_toolchain.cmake
//!     ├── conan_provider.cmake
//!     └── CMakeUserPresets.json
//! ```

pub mod env;
pub mod exec;
pub mod index;
pub mod io;
pub mod manifest;
pub mod paths;
pub mod reporter;
pub mod runtime;
pub mod toolchain;

pub use paths::*;
pub use reporter::{NullReporter, Reporter};

/// User Agent string for core operations
pub const USER_AGENT: &str = concat!("cppenv/", env!("CARGO_PKG_VERSION"));
