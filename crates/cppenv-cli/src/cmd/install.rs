//! Install command

use anyhow::{Context, Result};
use cppenv_core::Reporter;
use cppenv_core::env::ProjectEnv;
use cppenv_core::manifest::Manifest;
use cppenv_core::runtime::RuntimeAcquirer;
use cppenv_core::toolchain::ToolchainFiles;
use cppenv_schema::PlatformTarget;

use super::{project_layout, runtime_home};
use crate::ui::Output;

/// Provision the runtime, the environment and the CMake files for the
/// project in the current directory.
pub async fn install(mirror: &str, output: &Output) -> Result<()> {
    let layout = project_layout()?;
    let manifest_path = Manifest::find(layout.root())
        .context("no cppenv.toml found, run 'cppenv init' first")?;
    let manifest = Manifest::load(&manifest_path)
        .await
        .context("Failed to load cppenv.toml")?;

    output.section("Python runtime");
    let acquirer =
        RuntimeAcquirer::new(runtime_home()?, PlatformTarget::current()).with_mirror(mirror);
    let python = acquirer
        .ensure(output)
        .await
        .context("Failed to set up Python")?;
    output.info(&format!("Using Python at {}", python.display()));

    output.section("Environment");
    let env = ProjectEnv::new(layout.clone());
    if env.exists() {
        output.info("Environment already exists");
    } else {
        env.create(&python)?;
        output.success(&format!("Created {}", layout.venv_dir().display()));
    }

    output.section("Installing tools");
    let requirements = manifest.requirements();
    for requirement in &requirements {
        output.item(&requirement.token());
    }
    env.install_tools(&requirements)?;

    output.section("CMake integration");
    let files = ToolchainFiles::new(layout);
    let toolchain = files.toolchain_file(None)?;
    output.success(&format!("Toolchain file: {}", toolchain.display()));
    if files.dependency_provider_file()? {
        output.success("Created dependency provider");
    }
    if files.build_presets_file()? {
        output.success("Created CMake user presets");
    }
    match files.gitignore_entry() {
        Ok(true) => output.success("Added .cppenv/ to .gitignore"),
        Ok(false) => {}
        Err(e) => output.warning(&format!("could not update .gitignore: {e}")),
    }

    output.section("Done");
    output.info("Use 'cppenv run <command>' to run tools");
    Ok(())
}
