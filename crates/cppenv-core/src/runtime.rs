//! Machine-wide interpreter runtime.
//!
//! A prebuilt CPython from python-build-standalone is unpacked once into
//! `<home>/python` and shared by every project on the machine. The presence
//! of the interpreter executable is the only "installed" signal, so an
//! interrupted extraction is repaired by the next [`RuntimeAcquirer::ensure`].

use std::path::PathBuf;

use cppenv_schema::{
    Arch, ArchiveDescriptor, ArchiveFormat, Os, PlatformProfile, PlatformTarget,
};
use reqwest::Client;
use thiserror::Error;

use crate::Reporter;
use crate::io::download::{DownloadError, download_to_file};
use crate::io::extract::{ExtractError, extract};
use crate::paths::{filename_from_url, runtime_root, tmp_path};

/// Interpreter version shipped to every project.
pub const PYTHON_VERSION: &str = "3.11.7";

/// python-build-standalone release the archives come from.
pub const RELEASE_TAG: &str = "20240107";

/// Default download base; override with `CPPENV_PYTHON_MIRROR`.
pub const DEFAULT_MIRROR: &str =
    "https://github.com/indygreg/python-build-standalone/releases/download";

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("no prebuilt Python runtime for {0}")]
    UnsupportedPlatform(PlatformTarget),

    #[error("failed to download Python runtime: {0}")]
    Download(#[from] DownloadError),

    #[error("failed to extract Python runtime: {0}")]
    Extract(#[from] ExtractError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("runtime archive did not contain {}", .0.display())]
    MissingExecutable(PathBuf),
}

/// Map a platform to the archive that serves it.
///
/// Every supported pair is listed; anything else is
/// [`RuntimeError::UnsupportedPlatform`].
pub fn resolve_target(
    target: &PlatformTarget,
    mirror: &str,
) -> Result<ArchiveDescriptor, RuntimeError> {
    let triple = match (&target.os, &target.arch) {
        (Os::Linux, Arch::X86_64) => "x86_64-unknown-linux-gnu",
        (Os::Linux, Arch::Aarch64) => "aarch64-unknown-linux-gnu",
        (Os::Macos, Arch::X86_64) => "x86_64-apple-darwin",
        (Os::Macos, Arch::Aarch64) => "aarch64-apple-darwin",
        (Os::Windows, Arch::X86_64) => "x86_64-pc-windows-msvc-shared",
        _ => return Err(RuntimeError::UnsupportedPlatform(target.clone())),
    };

    let url = format!(
        "{}/{RELEASE_TAG}/cpython-{PYTHON_VERSION}+{RELEASE_TAG}-{triple}-install_only.tar.gz",
        mirror.trim_end_matches('/')
    );
    Ok(ArchiveDescriptor {
        url,
        format: ArchiveFormat::TarGz,
    })
}

/// Locates, downloads and unpacks the interpreter runtime.
pub struct RuntimeAcquirer {
    home: PathBuf,
    target: PlatformTarget,
    profile: PlatformProfile,
    mirror: String,
    client: Client,
}

impl RuntimeAcquirer {
    /// Acquirer rooted at `home` (normally [`crate::cppenv_home`]) for `target`.
    pub fn new(home: impl Into<PathBuf>, target: PlatformTarget) -> Self {
        let profile = PlatformProfile::for_os(&target.os);
        Self {
            home: home.into(),
            target,
            profile,
            mirror: DEFAULT_MIRROR.to_string(),
            client: Client::new(),
        }
    }

    /// Download archives from `mirror` instead of the upstream release page.
    pub fn with_mirror(mut self, mirror: impl Into<String>) -> Self {
        self.mirror = mirror.into();
        self
    }

    pub fn runtime_root(&self) -> PathBuf {
        runtime_root(&self.home)
    }

    /// Path of the interpreter once installed.
    pub fn executable(&self) -> PathBuf {
        self.profile.runtime_executable(&self.runtime_root())
    }

    pub fn is_installed(&self) -> bool {
        self.executable().is_file()
    }

    pub fn descriptor(&self) -> Result<ArchiveDescriptor, RuntimeError> {
        resolve_target(&self.target, &self.mirror)
    }

    /// Download and extract the runtime, replacing whatever is on disk.
    pub async fn install(&self, reporter: &dyn Reporter) -> Result<(), RuntimeError> {
        let descriptor = self.descriptor()?;
        let root = self.runtime_root();
        let staging = tmp_path(&self.home);
        std::fs::create_dir_all(&root)?;
        std::fs::create_dir_all(&staging)?;

        let label = format!("Python {PYTHON_VERSION}");
        tracing::info!(url = %descriptor.url, target = %self.target, "installing runtime");

        // Dropped (and deleted) on every exit path.
        let scratch = tempfile::tempdir_in(&staging)?;
        let archive = scratch.path().join(filename_from_url(&descriptor.url));
        download_to_file(&self.client, &descriptor.url, &archive, &label, reporter).await?;

        reporter.extracting(&label);
        let summary = extract(&archive, descriptor.format, &root)?;
        tracing::debug!(
            format = %descriptor.format,
            directories = summary.directories,
            files = summary.files,
            symlinks = summary.symlinks,
            root = %root.display(),
            "runtime extracted"
        );

        let executable = self.executable();
        if !executable.is_file() {
            return Err(RuntimeError::MissingExecutable(executable));
        }
        reporter.success(&format!("{label} installed"));
        Ok(())
    }

    /// Return the interpreter path, installing the runtime first if needed.
    pub async fn ensure(&self, reporter: &dyn Reporter) -> Result<PathBuf, RuntimeError> {
        if !self.is_installed() {
            self.install(reporter).await?;
        }
        Ok(self.executable())
    }
}
