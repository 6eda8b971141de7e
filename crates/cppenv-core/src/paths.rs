use dirs::home_dir;
use std::path::{Path, PathBuf};

use cppenv_schema::PlatformProfile;

/// Per-project environment directory name.
pub const ENV_DIR_NAME: &str = ".cppenv";

/// Project manifest file name.
pub const MANIFEST_FILE: &str = "cppenv.toml";

/// Returns the machine-wide cppenv directory, or None if the user's home cannot be resolved.
///
/// `CPPENV_HOME` overrides the default of `~/.cppenv`.
pub fn cppenv_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("CPPENV_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(ENV_DIR_NAME))
}

/// Runtime root: <home>/python
pub fn runtime_root(home: &Path) -> PathBuf {
    home.join("python")
}

/// Download staging: <home>/tmp (same volume as the runtime root)
pub fn tmp_path(home: &Path) -> PathBuf {
    home.join("tmp")
}

/// Extract the filename from a URL.
pub fn filename_from_url(url: &str) -> &str {
    url.split('/').next_back().unwrap_or("")
}

/// Every path cppenv reads or writes inside a project.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
    profile: PlatformProfile,
}

impl ProjectLayout {
    /// Layout of the project rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, profile: PlatformProfile) -> Self {
        Self {
            root: root.into(),
            profile,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn profile(&self) -> PlatformProfile {
        self.profile
    }

    /// <project>/.cppenv
    pub fn env_dir(&self) -> PathBuf {
        self.root.join(ENV_DIR_NAME)
    }

    /// <project>/.cppenv/venv
    pub fn venv_dir(&self) -> PathBuf {
        self.env_dir().join("venv")
    }

    /// The venv's executable directory (`bin` or `Scripts`).
    pub fn bin_dir(&self) -> PathBuf {
        self.venv_dir().join(self.profile.bin_dir)
    }

    /// The venv's package installer.
    pub fn pip(&self) -> PathBuf {
        self.bin_dir().join(self.profile.executable_name("pip"))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn gitignore_path(&self) -> PathBuf {
        self.root.join(".gitignore")
    }

    /// C compiler wrapper script.
    pub fn cc_wrapper(&self) -> PathBuf {
        self.env_dir().join(self.profile.script_name("zig-cc"))
    }

    /// C++ compiler wrapper script.
    pub fn cxx_wrapper(&self) -> PathBuf {
        self.env_dir().join(self.profile.script_name("zig-c++"))
    }

    pub fn toolchain_path(&self) -> PathBuf {
        self.env_dir().join("zig_toolchain.cmake")
    }

    pub fn provider_path(&self) -> PathBuf {
        self.env_dir().join("conan_provider.cmake")
    }

    pub fn presets_path(&self) -> PathBuf {
        self.env_dir().join("CMakeUserPresets.json")
    }
}
