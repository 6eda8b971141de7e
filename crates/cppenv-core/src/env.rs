//! Per-project isolated environment (a virtualenv under `.cppenv/venv`).

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use cppenv_schema::PackageRequirement;
use thiserror::Error;

use crate::paths::ProjectLayout;
use crate::toolchain::{ArtifactError, ToolchainFiles};

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to launch {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{action} failed: {} exited with {status}", program.display())]
    Subprocess {
        action: &'static str,
        program: PathBuf,
        status: ExitStatus,
    },

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Outcome of a step whose failure is logged and then ignored.
#[must_use]
#[derive(Debug)]
pub enum BestEffort<E> {
    Done,
    Failed(E),
}

impl<E: fmt::Display> BestEffort<E> {
    pub fn from_result(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::Done,
            Err(e) => Self::Failed(e),
        }
    }

    /// Log a failure as a warning. Returns whether the step succeeded.
    pub fn report(self, step: &str) -> bool {
        match self {
            Self::Done => true,
            Self::Failed(e) => {
                tracing::warn!(step, error = %e, "best-effort step failed, continuing");
                false
            }
        }
    }
}

/// A package whose executable is installed into `site-packages` instead of
/// the environment's binary directory.
#[derive(Debug, Clone, Copy)]
pub struct RelocatedPayload {
    /// Distribution name on the package index.
    pub package: &'static str,
    /// Directory of the payload, relative to `site-packages`.
    pub directory: &'static str,
    /// Executable stem, both inside `directory` and as linked into the binary directory.
    pub executable: &'static str,
}

/// Packages that need a link into the binary directory after installation.
pub const RELOCATED_PAYLOADS: &[RelocatedPayload] = &[RelocatedPayload {
    package: "ziglang",
    directory: "ziglang",
    executable: "zig",
}];

/// Lowest-named direct subdirectory of `root` accepted by `predicate`.
///
/// Entries are visited in sorted order so the answer does not depend on
/// directory iteration order. A missing or unreadable `root` yields `None`.
pub fn find_first_matching_subdirectory(
    root: &Path,
    predicate: impl Fn(&Path) -> bool,
) -> Option<PathBuf> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(root)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs.into_iter().find(|dir| predicate(dir))
}

/// `python3.11`, `python3`, `python3.12.1`...
fn is_versioned_python_dir(dir: &Path) -> bool {
    dir.file_name()
        .and_then(OsStr::to_str)
        .and_then(|name| name.strip_prefix("python"))
        .is_some_and(|rest| {
            !rest.is_empty()
                && rest.starts_with(|c: char| c.is_ascii_digit())
                && rest.chars().all(|c| c.is_ascii_digit() || c == '.')
        })
}

/// The isolated environment of one project.
#[derive(Debug, Clone)]
pub struct ProjectEnv {
    layout: ProjectLayout,
}

impl ProjectEnv {
    pub fn new(layout: ProjectLayout) -> Self {
        Self { layout }
    }

    pub fn exists(&self) -> bool {
        self.layout.venv_dir().is_dir()
    }

    /// Create the environment with the given interpreter.
    pub fn create(&self, python: &Path) -> Result<(), EnvError> {
        std::fs::create_dir_all(self.layout.env_dir())?;
        let venv = self.layout.venv_dir();
        tracing::info!(python = %python.display(), venv = %venv.display(), "creating environment");
        run_step(
            "environment creation",
            python,
            [OsStr::new("-m"), OsStr::new("venv"), venv.as_os_str()],
        )
    }

    /// Install `requirements` with a single installer invocation, then link
    /// relocated payloads into place.
    pub fn install_tools(&self, requirements: &[PackageRequirement]) -> Result<(), EnvError> {
        let pip = self.layout.pip();

        BestEffort::from_result(run_step(
            "installer upgrade",
            &pip,
            ["install", "--upgrade", "pip"],
        ))
        .report("pip self-upgrade");

        if requirements.is_empty() {
            tracing::debug!("no tools declared, skipping package installation");
        } else {
            let mut args = vec!["install".to_string()];
            args.extend(requirements.iter().map(PackageRequirement::token));
            tracing::info!(count = requirements.len(), "installing tools");
            run_step("tool installation", &pip, &args)?;
        }

        self.repair()
    }

    /// Link every relocated payload that is present into the binary
    /// directory and write the compiler wrappers next to it.
    ///
    /// Payloads that are not installed are skipped without error.
    pub fn repair(&self) -> Result<(), EnvError> {
        let profile = self.layout.profile();
        for payload in RELOCATED_PAYLOADS {
            let Some(source) = self.locate_payload(payload) else {
                tracing::debug!(package = payload.package, "payload not installed, skipping");
                continue;
            };

            let link = self
                .layout
                .bin_dir()
                .join(profile.executable_name(payload.executable));
            let driver = if link.symlink_metadata().is_ok() {
                link
            } else {
                match crate::io::symlink(&source, &link) {
                    Ok(()) => link,
                    Err(e) => {
                        tracing::warn!(
                            link = %link.display(),
                            error = %e,
                            "could not link payload, wrappers will call it in place"
                        );
                        source
                    }
                }
            };

            ToolchainFiles::new(self.layout.clone()).compiler_wrappers(&driver)?;
        }
        Ok(())
    }

    /// Where `payload`'s executable sits inside the environment, if installed.
    pub fn locate_payload(&self, payload: &RelocatedPayload) -> Option<PathBuf> {
        let profile = self.layout.profile();
        let relative = Path::new(payload.directory).join(profile.executable_name(payload.executable));
        let venv = self.layout.venv_dir();

        let site_packages = if profile.is_windows() {
            venv.join("Lib").join("site-packages")
        } else {
            find_first_matching_subdirectory(&venv.join("lib"), |dir| {
                is_versioned_python_dir(dir) && dir.join("site-packages").join(&relative).is_file()
            })?
            .join("site-packages")
        };

        let candidate = site_packages.join(relative);
        candidate.is_file().then_some(candidate)
    }
}

/// Run `program` to completion with inherited stdio.
fn run_step<I, S>(action: &'static str, program: &Path, args: I) -> Result<(), EnvError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| EnvError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(EnvError::Subprocess {
            action,
            program: program.to_path_buf(),
            status,
        })
    }
}
