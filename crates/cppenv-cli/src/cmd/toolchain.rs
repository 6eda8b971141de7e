//! Toolchain command

use std::path::Path;

use anyhow::{Result, bail};
use cppenv_core::Reporter;
use cppenv_core::env::ProjectEnv;
use cppenv_core::toolchain::ToolchainFiles;

use super::project_layout;
use crate::ui::Output;

/// Regenerate the CMake toolchain file and show how to use it.
pub fn toolchain(dir: Option<&Path>, output: &Output) -> Result<()> {
    let layout = project_layout()?;
    if !ProjectEnv::new(layout.clone()).exists() {
        bail!("environment not found, run 'cppenv install' first");
    }

    let path = ToolchainFiles::new(layout).toolchain_file(dir)?;
    output.success(&format!("Toolchain file created: {}", path.display()));
    println!();
    println!("Use with CMake:");
    println!("  cmake -B build -DCMAKE_TOOLCHAIN_FILE={}", path.display());
    Ok(())
}
