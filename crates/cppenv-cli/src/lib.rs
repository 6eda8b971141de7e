//! cppenv - reproducible C/C++ build environments
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Provisions a pinned CPython runtime, a per-project virtualenv with the
//! build tools declared in `cppenv.toml` (Zig, CMake, Ninja, Conan...), and
//! the CMake glue files that point a build at them.

pub mod cmd;
pub mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cppenv_core::index::DEFAULT_INDEX_URL;
use cppenv_core::runtime::DEFAULT_MIRROR;

#[derive(Debug, Parser)]
#[command(name = "cppenv")]
#[command(author, version = env!("CPPENV_VERSION"), about = "Reproducible C/C++ build environments")]
pub struct Cli {
    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create cppenv.toml with the latest versions of the default tools
    Init {
        /// Project name (default: current directory name)
        #[arg(short, long)]
        name: Option<String>,
        /// Package index to query for tool versions
        #[arg(long, env = "CPPENV_INDEX_URL", default_value = DEFAULT_INDEX_URL)]
        index_url: String,
    },
    /// Set up the runtime, the project environment and the CMake files
    Install {
        /// Base URL for Python runtime downloads
        #[arg(long, env = "CPPENV_PYTHON_MIRROR", default_value = DEFAULT_MIRROR)]
        mirror: String,
    },
    /// Run a script from cppenv.toml or a command with the environment on PATH
    Run {
        /// Script name or command, followed by its arguments
        #[arg(
            required = true,
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "COMMAND"
        )]
        command: Vec<String>,
    },
    /// Show project, runtime and environment status
    Status,
    /// Regenerate the CMake toolchain file
    Toolchain {
        /// Project directory to write `.cppenv/zig_toolchain.cmake` into
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
