//! Host identification and per-platform layout.
//!
//! cppenv picks a prebuilt interpreter for the host and lays out the project
//! environment the way that interpreter's `venv` module does. Both decisions
//! depend only on the (OS, architecture) pair, so they are computed once into
//! a [`PlatformProfile`] and passed around instead of re-checking `cfg!` at
//! every call site.
//!
//! # Example
//!
//! ```
//! use cppenv_schema::{Os, PlatformProfile};
//!
//! let profile = PlatformProfile::for_os(&Os::Windows);
//! assert_eq!(profile.bin_dir, "Scripts");
//! assert_eq!(profile.script_name("zig-cc"), "zig-cc.bat");
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

/// Operating system family of a host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Os {
    /// Linux with a glibc userland.
    Linux,
    /// macOS.
    Macos,
    /// Windows.
    Windows,
    /// Anything else, kept by its `std::env::consts::OS` name.
    Other(String),
}

impl Os {
    /// The OS this binary was compiled for.
    pub fn current() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    /// Parse an OS name as reported by `std::env::consts::OS` (or common aliases).
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "linux" => Self::Linux,
            "macos" | "darwin" => Self::Macos,
            "windows" => Self::Windows,
            other => Self::Other(other.to_string()),
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::Windows => "windows",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture of a host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 64-bit x86 (`x86_64` / `amd64`).
    X86_64,
    /// 64-bit ARM (`aarch64` / `arm64`).
    Aarch64,
    /// 32-bit x86.
    X86,
    /// 32-bit ARM.
    Arm,
    /// Anything else, kept by its `std::env::consts::ARCH` name.
    Other(String),
}

impl Arch {
    /// The architecture this binary was compiled for.
    pub fn current() -> Self {
        Self::from_name(std::env::consts::ARCH)
    }

    /// Parse an architecture name, accepting both Rust and vendor spellings.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "x86_64" | "amd64" => Self::X86_64,
            "aarch64" | "arm64" => Self::Aarch64,
            "x86" | "i386" | "i686" => Self::X86,
            "arm" | "armv7l" => Self::Arm,
            other => Self::Other(other.to_string()),
        }
    }

    /// Rust-convention architecture name (matches `std::env::consts::ARCH`).
    pub fn as_str(&self) -> &str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
            Self::X86 => "x86",
            Self::Arm => "arm",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An (OS, architecture) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformTarget {
    /// Operating system family.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
}

impl PlatformTarget {
    /// Build a target from its parts.
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// The target this binary was compiled for.
    pub fn current() -> Self {
        Self::new(Os::current(), Arch::current())
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// How generated launcher scripts are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFormat {
    /// POSIX `sh` script, marked executable.
    Shell,
    /// Windows batch file (`.bat`).
    Batch,
}

/// Every platform-dependent naming and layout decision, in one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProfile {
    /// Separator between entries of the `PATH` variable.
    pub path_separator: char,
    /// Suffix of native executables (`""` or `".exe"`).
    pub exe_suffix: &'static str,
    /// Format of generated launcher scripts.
    pub script_format: ScriptFormat,
    /// Name of the virtualenv's executable directory (`bin` or `Scripts`).
    pub bin_dir: &'static str,
}

impl PlatformProfile {
    /// Linux and macOS.
    pub const UNIX: Self = Self {
        path_separator: ':',
        exe_suffix: "",
        script_format: ScriptFormat::Shell,
        bin_dir: "bin",
    };

    /// Windows.
    pub const WINDOWS: Self = Self {
        path_separator: ';',
        exe_suffix: ".exe",
        script_format: ScriptFormat::Batch,
        bin_dir: "Scripts",
    };

    /// Profile for the given OS. Everything that is not Windows is treated as Unix.
    pub fn for_os(os: &Os) -> Self {
        match os {
            Os::Windows => Self::WINDOWS,
            _ => Self::UNIX,
        }
    }

    /// Profile for the host.
    pub fn current() -> Self {
        Self::for_os(&Os::current())
    }

    /// True for the Windows profile.
    pub fn is_windows(&self) -> bool {
        self.script_format == ScriptFormat::Batch
    }

    /// File name of a native executable called `stem`.
    pub fn executable_name(&self, stem: &str) -> String {
        format!("{stem}{}", self.exe_suffix)
    }

    /// File name of a generated launcher script called `stem`.
    pub fn script_name(&self, stem: &str) -> String {
        match self.script_format {
            ScriptFormat::Shell => stem.to_string(),
            ScriptFormat::Batch => format!("{stem}.bat"),
        }
    }

    /// Location of the interpreter inside an extracted `install_only` runtime.
    ///
    /// The archives unpack into a top-level `python/` directory; the
    /// executable sits under `bin/` on Unix and at the root on Windows.
    pub fn runtime_executable(&self, runtime_root: &Path) -> PathBuf {
        let python = runtime_root.join("python");
        if self.is_windows() {
            python.join("python.exe")
        } else {
            python.join("bin").join("python3")
        }
    }

    /// Argument vector that runs `script` through the platform shell with
    /// `args` appended as literal arguments.
    ///
    /// `sh` receives the arguments as positional parameters, so they are
    /// never re-parsed. `cmd` has no such mechanism; each argument is quoted.
    pub fn shell_command(&self, script: &str, args: &[String]) -> Vec<String> {
        match self.script_format {
            ScriptFormat::Shell if args.is_empty() => {
                vec!["sh".into(), "-c".into(), script.into()]
            }
            ScriptFormat::Shell => {
                let mut argv = vec![
                    "sh".into(),
                    "-c".into(),
                    format!("{script} \"$@\""),
                    "cppenv".into(),
                ];
                argv.extend(args.iter().cloned());
                argv
            }
            ScriptFormat::Batch => {
                let mut line = script.to_string();
                for arg in args {
                    line.push_str(" \"");
                    line.push_str(&arg.replace('"', "\"\""));
                    line.push('"');
                }
                vec!["cmd".into(), "/c".into(), line]
            }
        }
    }
}

impl Default for PlatformProfile {
    fn default() -> Self {
        Self::current()
    }
}
