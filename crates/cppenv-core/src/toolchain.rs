//! Files that connect the environment to CMake.
//!
//! Everything lives under `.cppenv/` except the `.gitignore` entry. The
//! toolchain file is rewritten on every call; the other artifacts are only
//! created when absent so local edits survive reinstalls.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use cppenv_schema::ScriptFormat;
use serde::Serialize;
use thiserror::Error;

use crate::paths::{ENV_DIR_NAME, ProjectLayout};

/// CMake dependency provider that routes `find_package` through Conan.
pub const DEPENDENCY_PROVIDER: &str = include_str!("../assets/conan_provider.cmake");

const GENERATED_HEADER: &str = "# Generated by cppenv - do not edit manually";

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize presets: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// `CMakeUserPresets.json`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserPresets {
    version: u32,
    configure_presets: Vec<ConfigurePreset>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigurePreset {
    name: &'static str,
    generator: &'static str,
    binary_dir: &'static str,
    cache_variables: BTreeMap<&'static str, String>,
}

/// Generator for the CMake integration files of one project.
#[derive(Debug, Clone)]
pub struct ToolchainFiles {
    layout: ProjectLayout,
}

impl ToolchainFiles {
    pub fn new(layout: ProjectLayout) -> Self {
        Self { layout }
    }

    /// Write the CMake toolchain file, replacing any previous one.
    ///
    /// The file goes into `<target_dir>/.cppenv/`, defaulting to the project
    /// root, and points at the compiler wrappers in that same directory.
    pub fn toolchain_file(&self, target_dir: Option<&Path>) -> Result<PathBuf, ArtifactError> {
        let layout = match target_dir {
            Some(dir) => ProjectLayout::new(dir, self.layout.profile()),
            None => self.layout.clone(),
        };

        let content = format!(
            "{GENERATED_HEADER}\n\
             set(CMAKE_C_COMPILER \"{cc}\")\n\
             set(CMAKE_CXX_COMPILER \"{cxx}\")\n\
             \n\
             # Zig-specific settings\n\
             set(CMAKE_C_COMPILER_ID \"Clang\")\n\
             set(CMAKE_CXX_COMPILER_ID \"Clang\")\n",
            cc = forward_slashes(&layout.cc_wrapper()),
            cxx = forward_slashes(&layout.cxx_wrapper()),
        );

        let path = layout.toolchain_path();
        create_parent(&path)?;
        fs::write(&path, content).map_err(|source| ArtifactError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "wrote toolchain file");
        Ok(path)
    }

    /// Make sure `.gitignore` excludes the environment directory.
    ///
    /// Returns `true` if the entry was appended.
    pub fn gitignore_entry(&self) -> Result<bool, ArtifactError> {
        let path = self.layout.gitignore_path();
        let existing = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(source) => return Err(ArtifactError::Read { path, source }),
        };

        let bare = ENV_DIR_NAME;
        let dir = format!("{ENV_DIR_NAME}/");
        if existing
            .lines()
            .map(str::trim)
            .any(|line| line == bare || line == dir)
        {
            return Ok(false);
        }

        let mut addition = String::new();
        if !existing.is_empty() && !existing.ends_with('\n') {
            addition.push('\n');
        }
        addition.push_str(&dir);
        addition.push('\n');

        let write = || -> io::Result<()> {
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            file.write_all(addition.as_bytes())
        };
        write().map_err(|source| ArtifactError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(true)
    }

    /// Write the Conan dependency provider if absent.
    pub fn dependency_provider_file(&self) -> Result<bool, ArtifactError> {
        write_if_absent(&self.layout.provider_path(), DEPENDENCY_PROVIDER, false)
    }

    /// Write `CMakeUserPresets.json` if absent.
    pub fn build_presets_file(&self) -> Result<bool, ArtifactError> {
        let profile = self.layout.profile();
        let in_env = |file: &str| format!("${{sourceDir}}/{ENV_DIR_NAME}/{file}");

        let cache_variables = BTreeMap::from([
            (
                "CMAKE_PROJECT_TOP_LEVEL_INCLUDES",
                in_env("conan_provider.cmake"),
            ),
            ("CMAKE_C_COMPILER", in_env(&profile.script_name("zig-cc"))),
            ("CMAKE_CXX_COMPILER", in_env(&profile.script_name("zig-c++"))),
        ]);
        let presets = UserPresets {
            version: 6,
            configure_presets: vec![ConfigurePreset {
                name: "cppenv",
                generator: "Ninja",
                binary_dir: "${sourceDir}/build",
                cache_variables,
            }],
        };

        let mut json = serde_json::to_string_pretty(&presets)?;
        json.push('\n');
        write_if_absent(&self.layout.presets_path(), &json, false)
    }

    /// Write the `zig-cc` / `zig-c++` wrappers around `driver` if absent.
    ///
    /// Returns `true` if either wrapper was created.
    pub fn compiler_wrappers(&self, driver: &Path) -> Result<bool, ArtifactError> {
        let driver = forward_slashes(driver);
        let script = |mode: &str| match self.layout.profile().script_format {
            ScriptFormat::Shell => format!("#!/bin/sh\nexec \"{driver}\" {mode} \"$@\"\n"),
            ScriptFormat::Batch => format!("@echo off\r\n\"{driver}\" {mode} %*\r\n"),
        };

        let cc = write_if_absent(&self.layout.cc_wrapper(), &script("cc"), true)?;
        let cxx = write_if_absent(&self.layout.cxx_wrapper(), &script("c++"), true)?;
        Ok(cc || cxx)
    }
}

fn forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn create_parent(path: &Path) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ArtifactError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Create `path` with `content` unless something already exists there.
fn write_if_absent(path: &Path, content: &str, executable: bool) -> Result<bool, ArtifactError> {
    create_parent(path)?;

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    if executable {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o755);
    }
    #[cfg(not(unix))]
    let _ = executable;

    let file = match options.open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(source) => {
            return Err(ArtifactError::Write {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    fill_or_remove(file, path, content.as_bytes()).map_err(|source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "created");
    Ok(true)
}

/// Write `content` into a freshly created file. A partial file is removed so
/// the next run creates it again instead of keeping the truncated copy.
fn fill_or_remove(mut out: impl Write, path: &Path, content: &[u8]) -> io::Result<()> {
    let result = out.write_all(content).and_then(|()| out.flush());
    if result.is_err() {
        drop(out);
        let _ = fs::remove_file(path);
    }
    result
}
