//! Command implementations, one module per verb.

pub mod completions;
pub mod init;
pub mod install;
pub mod run;
pub mod status;
pub mod toolchain;

use std::path::PathBuf;

use anyhow::{Context, Result};
use cppenv_core::{ProjectLayout, cppenv_home};
use cppenv_schema::PlatformProfile;

/// Layout of the project in the current directory.
pub fn project_layout() -> Result<ProjectLayout> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    Ok(ProjectLayout::new(cwd, PlatformProfile::current()))
}

/// Machine-wide cppenv directory.
pub fn runtime_home() -> Result<PathBuf> {
    cppenv_home().context("Could not determine home directory. Set CPPENV_HOME to override.")
}
