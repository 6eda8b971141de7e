//! Status command

use anyhow::{Context, Result};
use cppenv_core::env::ProjectEnv;
use cppenv_core::manifest::Manifest;
use cppenv_core::runtime::{PYTHON_VERSION, RuntimeAcquirer};
use cppenv_schema::PlatformTarget;
use crossterm::style::Stylize;

use super::{project_layout, runtime_home};
use crate::ui::theme::label;

/// Print project, runtime and environment status.
pub async fn status() -> Result<()> {
    let layout = project_layout()?;
    let Some(path) = Manifest::find(layout.root()) else {
        println!("No cppenv.toml found in current directory.");
        println!("Run 'cppenv init' to create one.");
        return Ok(());
    };
    let manifest = Manifest::load(&path)
        .await
        .context("Failed to load cppenv.toml")?;

    println!();
    println!("{} {}", label("Project:"), manifest.project.name.as_str().cyan());

    let acquirer = RuntimeAcquirer::new(runtime_home()?, PlatformTarget::current());
    if acquirer.is_installed() {
        println!(
            "{} {} {}",
            label("Python:"),
            PYTHON_VERSION.green(),
            acquirer.executable().display().to_string().dark_grey()
        );
    } else {
        println!(
            "{} {}",
            label("Python:"),
            "not installed (downloaded by 'cppenv install')".yellow()
        );
    }

    if ProjectEnv::new(layout.clone()).exists() {
        println!(
            "{} {} {}",
            label("Environment:"),
            "installed".green(),
            layout.venv_dir().display().to_string().dark_grey()
        );
    } else {
        println!(
            "{} {}",
            label("Environment:"),
            "not installed, run 'cppenv install' to set up".yellow()
        );
    }

    println!();
    println!("{}", "Tools".cyan().bold());
    if manifest.tools.is_empty() {
        println!("  {}", "(none)".dark_grey());
    }
    for (name, version) in &manifest.tools {
        println!("  {name:<16} {}", version.as_str().dark_grey());
    }

    if !manifest.scripts.is_empty() {
        println!();
        println!("{}", "Scripts".cyan().bold());
        for (name, script) in &manifest.scripts {
            println!("  {name:<16} {}", script.as_str().dark_grey());
        }
    }

    Ok(())
}
