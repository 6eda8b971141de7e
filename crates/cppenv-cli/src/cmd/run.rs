//! Run command

use anyhow::{Context, Result, bail};
use cppenv_core::env::ProjectEnv;
use cppenv_core::exec::CommandRunner;
use cppenv_core::manifest::Manifest;

use super::project_layout;
use crate::ui::Output;

/// Run a manifest script or a command inside the environment and return its
/// exit code.
///
/// Arguments after a script name are passed to the script as literal
/// arguments.
pub async fn run(command: &[String], output: &Output) -> Result<i32> {
    let layout = project_layout()?;
    if !ProjectEnv::new(layout.clone()).exists() {
        bail!("environment not found, run 'cppenv install' first");
    }

    let manifest = match Manifest::find(layout.root()) {
        Some(path) => Some(
            Manifest::load(&path)
                .await
                .context("Failed to load cppenv.toml")?,
        ),
        None => None,
    };

    let runner = CommandRunner::new(layout.bin_dir(), layout.profile());
    let Some((first, rest)) = command.split_first() else {
        return Ok(runner.run(command));
    };

    if let Some(script) = manifest.as_ref().and_then(|m| m.script(first)) {
        output.item(script);
        return Ok(runner.run_script(script, rest));
    }

    Ok(runner.run(command))
}
