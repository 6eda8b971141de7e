//! Project manifest (`cppenv.toml`).
//!
//! Declares the project name, the tools to install (pinned to exact
//! versions) and named shell scripts for `cppenv run`.
//!
//! ```toml
//! [project]
//! name = "demo"
//!
//! [tools]
//! cmake = "3.28.1"
//! ziglang = "0.11.0"
//!
//! [scripts]
//! build = "cmake --preset cppenv && cmake --build build"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cppenv_schema::PackageRequirement;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use crate::paths::MANIFEST_FILE;

/// Tools written into a fresh manifest by `cppenv init`.
pub const DEFAULT_TOOLS: &[&str] = &["ziglang", "cmake", "ninja", "conan", "clang-tools"];

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level project manifest parsed from a `cppenv.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub project: ProjectInfo,
    /// Tool name to exact version.
    #[serde(default)]
    pub tools: BTreeMap<String, String>,
    /// Script name to shell command line.
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
}

/// The `[project]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
}

impl Manifest {
    pub fn new(name: impl Into<String>, tools: BTreeMap<String, String>) -> Self {
        Self {
            project: ProjectInfo { name: name.into() },
            tools,
            scripts: BTreeMap::new(),
        }
    }

    /// The manifest path in `dir`, if one exists.
    pub fn find(dir: &Path) -> Option<PathBuf> {
        let path = dir.join(MANIFEST_FILE);
        path.is_file().then_some(path)
    }

    pub async fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|source| ManifestError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        toml::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Persist to `path` via a temporary file and rename, so readers never
    /// see a partial manifest.
    pub async fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let content = toml::to_string_pretty(self)?;
        let io_err = |source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        };

        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, &content).await.map_err(io_err)?;
        fs::rename(&temp_path, path).await.map_err(io_err)?;

        Ok(())
    }

    /// One requirement per declared tool, ordered by name.
    pub fn requirements(&self) -> Vec<PackageRequirement> {
        self.tools
            .iter()
            .map(|(name, version)| PackageRequirement::new(name, version))
            .collect()
    }

    pub fn script(&self, name: &str) -> Option<&str> {
        self.scripts.get(name).map(String::as_str)
    }
}
