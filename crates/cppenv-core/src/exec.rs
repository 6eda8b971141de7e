//! Running commands inside the project environment.
//!
//! The environment's binary directory shadows the ambient `PATH`: a command
//! is looked up there first, and the child sees that directory prepended to
//! its `PATH` so anything it spawns resolves the same way.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use cppenv_schema::PlatformProfile;

/// Resolves and runs commands against an environment's binary directory.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    bin_dir: PathBuf,
    profile: PlatformProfile,
}

impl CommandRunner {
    pub fn new(bin_dir: impl Into<PathBuf>, profile: PlatformProfile) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            profile,
        }
    }

    /// Full path of `name` inside the binary directory, or `name` unchanged
    /// so the OS searches `PATH`.
    pub fn resolve(&self, name: &str) -> PathBuf {
        if self.profile.is_windows() && !name.to_lowercase().ends_with(".exe") {
            let exe = self.bin_dir.join(self.profile.executable_name(name));
            if exe.is_file() {
                return exe;
            }
        }
        let candidate = self.bin_dir.join(name);
        if candidate.is_file() {
            return candidate;
        }
        PathBuf::from(name)
    }

    /// Copy of `ambient` with the binary directory prepended to `PATH`.
    ///
    /// The variable name is matched case-insensitively (`Path` on Windows)
    /// and keeps its original spelling. A missing `PATH` is added.
    pub fn activated_environment<I>(&self, ambient: I) -> Vec<(OsString, OsString)>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut found = false;
        let mut vars: Vec<(OsString, OsString)> = ambient
            .into_iter()
            .map(|(key, value)| {
                if !found && key.to_string_lossy().eq_ignore_ascii_case("PATH") {
                    found = true;
                    let mut joined = self.bin_dir.clone().into_os_string();
                    joined.push(self.profile.path_separator.to_string());
                    joined.push(&value);
                    (key, joined)
                } else {
                    (key, value)
                }
            })
            .collect();

        if !found {
            vars.push((OsString::from("PATH"), self.bin_dir.clone().into_os_string()));
        }
        vars
    }

    /// Run `args[0]` with the remaining arguments and return its exit code.
    ///
    /// Stdio is inherited and the call blocks until the child exits. An empty
    /// argument list or a launch failure yields 1, as does a child killed by
    /// a signal.
    pub fn run(&self, args: &[String]) -> i32 {
        let Some((name, rest)) = args.split_first() else {
            return 1;
        };

        let program = self.resolve(name);
        tracing::debug!(program = %program.display(), "running");

        let status = Command::new(&program)
            .args(rest)
            .env_clear()
            .envs(self.activated_environment(std::env::vars_os()))
            .status();

        match status {
            Ok(status) => status.code().unwrap_or(1),
            Err(e) => {
                eprintln!("Error: failed to run {}: {e}", program.display());
                1
            }
        }
    }

    /// Run `script` through the platform shell, passing `args` to it
    /// unchanged.
    pub fn run_script(&self, script: &str, args: &[String]) -> i32 {
        self.run(&self.profile.shell_command(script, args))
    }
}
