//! Archive and requirement value types.

use std::fmt;

/// Container format of a downloadable archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Gzip-compressed tar archive (`.tar.gz` / `.tgz`).
    TarGz,
    /// Zip archive (`.zip`).
    Zip,
}

impl ArchiveFormat {
    /// Canonical file extension, without a leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where to fetch a runtime archive from, and how to unpack it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDescriptor {
    /// Download URL.
    pub url: String,
    /// Container format of the file behind `url`.
    pub format: ArchiveFormat,
}

/// A package pinned to an exact version, e.g. `cmake==3.28.1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageRequirement {
    /// Distribution name on the package index.
    pub name: String,
    /// Exact version string.
    pub version: String,
}

impl PackageRequirement {
    /// Pin `name` to `version`.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// The single installer argument for this requirement (`name==version`).
    pub fn token(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PackageRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.name, self.version)
    }
}
