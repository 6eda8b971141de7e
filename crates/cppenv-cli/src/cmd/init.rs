//! Init command

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use cppenv_core::index;
use cppenv_core::manifest::{DEFAULT_TOOLS, Manifest};
use cppenv_core::{MANIFEST_FILE, Reporter};

use super::project_layout;
use crate::ui::Output;

/// Write a manifest pinning the default tools to their latest releases.
pub async fn init(name: Option<&str>, index_url: &str, output: &Output) -> Result<()> {
    let layout = project_layout()?;
    if Manifest::find(layout.root()).is_some() {
        bail!("{MANIFEST_FILE} already exists");
    }

    let name = match name {
        Some(name) => name.to_string(),
        None => layout
            .root()
            .file_name()
            .map_or_else(|| "project".to_string(), |n| n.to_string_lossy().into_owned()),
    };

    output.section("Fetching latest tool versions");
    let client = index::client()?;
    let mut tools = BTreeMap::new();
    for package in DEFAULT_TOOLS {
        let version = index::latest_version(&client, index_url, package)
            .await
            .with_context(|| format!("Failed to get version for {package}"))?;
        output.item(&format!("{package} {version}"));
        tools.insert((*package).to_string(), version);
    }

    Manifest::new(name, tools)
        .save(&layout.manifest_path())
        .await
        .with_context(|| format!("Failed to write {MANIFEST_FILE}"))?;

    output.success(&format!("Created {MANIFEST_FILE}"));
    output.info("Run 'cppenv install' to set up the environment");
    Ok(())
}
