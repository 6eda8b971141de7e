//! IO modules: network and filesystem side effects

pub mod download;
pub mod extract;

use std::io;
use std::path::Path;

/// Create a symbolic link at `link` pointing to the file `target`.
pub fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }
    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_file(target, link)
    }
}
