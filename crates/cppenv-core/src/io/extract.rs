//! Archive extraction module
//!
//! Handles tar.gz and zip archives. Entry paths are confined to the
//! destination; file modes and symbolic links are reproduced as stored.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};

use cppenv_schema::ArchiveFormat;
use flate2::read::GzDecoder;
use thiserror::Error;
use zip::ZipArchive;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Refusing to extract entry outside destination: {}", .0.display())]
    UnsafePath(PathBuf),
}

/// What an extracted entry turned into on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directory,
    File,
    Symlink,
}

/// Counts of what an extraction produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub directories: usize,
    pub files: usize,
    pub symlinks: usize,
}

impl ExtractSummary {
    fn record(&mut self, kind: EntryKind) {
        match kind {
            EntryKind::Directory => self.directories += 1,
            EntryKind::File => self.files += 1,
            EntryKind::Symlink => self.symlinks += 1,
        }
    }
}

/// Extract an archive of the given format.
pub fn extract(
    archive_path: &Path,
    format: ArchiveFormat,
    dest_dir: &Path,
) -> Result<ExtractSummary, ExtractError> {
    match format {
        ArchiveFormat::TarGz => extract_tar_gz(archive_path, dest_dir),
        ArchiveFormat::Zip => extract_zip(archive_path, dest_dir),
    }
}

/// Extract a tar.gz archive to a destination directory
pub fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<ExtractSummary, ExtractError> {
    let file = File::open(archive_path)?;
    extract_tar_gz_reader(BufReader::new(file), dest_dir)
}

/// Extract a gzip-compressed tar stream to a destination directory
///
/// Unpacking goes through [`tar::Entry::unpack_in`], which refuses to write
/// through a symlink that leads outside `dest_dir`.
pub fn extract_tar_gz_reader<R: Read>(
    reader: R,
    dest_dir: &Path,
) -> Result<ExtractSummary, ExtractError> {
    fs::create_dir_all(dest_dir)?;

    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    archive.set_overwrite(true);
    let mut summary = ExtractSummary::default();

    for entry in archive.entries()? {
        let mut entry = entry?;
        let relative_path = sanitize_path(&entry.path()?)?;
        if relative_path.as_os_str().is_empty() {
            continue;
        }

        let entry_type = entry.header().entry_type();
        let kind = if entry_type.is_dir() {
            EntryKind::Directory
        } else if entry_type.is_symlink() {
            EntryKind::Symlink
        } else if entry_type.is_file()
            || entry_type.is_hard_link()
            || entry_type == tar::EntryType::Continuous
        {
            EntryKind::File
        } else {
            tracing::debug!(path = %relative_path.display(), ?entry_type, "skipping tar entry");
            continue;
        };

        if !entry.unpack_in(dest_dir)? {
            return Err(ExtractError::UnsafePath(relative_path));
        }
        summary.record(kind);
    }

    Ok(summary)
}

/// Extract a zip archive
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<ExtractSummary, ExtractError> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| ExtractError::Archive(e.to_string()))?;

    fs::create_dir_all(dest_dir)?;
    let root = dest_dir.canonicalize()?;
    let mut summary = ExtractSummary::default();

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| ExtractError::Archive(e.to_string()))?;
        let relative_path = sanitize_path(Path::new(file.name()))?;
        if relative_path.as_os_str().is_empty() {
            continue;
        }
        let absolute_path = root.join(&relative_path);
        let mode = file.unix_mode();

        let kind = if file.is_dir() {
            ensure_inside(&root, &absolute_path, &relative_path)?;
            fs::create_dir_all(&absolute_path)?;
            EntryKind::Directory
        } else {
            if let Some(parent) = absolute_path.parent() {
                ensure_inside(&root, parent, &relative_path)?;
                fs::create_dir_all(parent)?;
            }
            if mode.is_some_and(|m| m & 0o170_000 == 0o120_000) {
                let mut target = String::new();
                file.read_to_string(&mut target)?;
                remove_existing(&absolute_path)?;
                super::symlink(Path::new(&target), &absolute_path)?;
                EntryKind::Symlink
            } else {
                write_file(&mut file, &absolute_path, mode)?;
                EntryKind::File
            }
        };
        summary.record(kind);
    }

    Ok(summary)
}

/// Normalise an entry path, rejecting anything that could land outside the
/// extraction root.
fn sanitize_path(path: &Path) -> Result<PathBuf, ExtractError> {
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ExtractError::UnsafePath(path.to_path_buf()));
            }
        }
    }
    Ok(clean)
}

/// Fail unless the deepest existing ancestor of `path` resolves inside `root`.
///
/// Components that do not exist yet are created as plain directories, so
/// only links already on disk can redirect a write.
fn ensure_inside(root: &Path, path: &Path, entry: &Path) -> Result<(), ExtractError> {
    let mut existing = path;
    while fs::symlink_metadata(existing).is_err() {
        match existing.parent() {
            Some(parent) => existing = parent,
            None => break,
        }
    }
    if existing.canonicalize()?.starts_with(root) {
        Ok(())
    } else {
        Err(ExtractError::UnsafePath(entry.to_path_buf()))
    }
}

/// Clear whatever sits at `path` so an entry can replace it.
fn remove_existing(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

fn write_file(reader: &mut impl Read, path: &Path, mode: Option<u32>) -> io::Result<()> {
    // An earlier extraction may have left a symlink here; never write through it.
    if fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink()) {
        fs::remove_file(path)?;
    }

    let mut out = File::create(path)?;
    io::copy(reader, &mut out)?;

    #[cfg(unix)]
    if let Some(mode) = mode {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::tempdir;

    fn tar_gz_fixture() -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

        let mut dir = tar::Header::new_gnu();
        dir.set_entry_type(tar::EntryType::Directory);
        dir.set_mode(0o755);
        dir.set_size(0);
        builder
            .append_data(&mut dir, "python/bin/", io::empty())
            .unwrap();

        let body = b"#!/bin/sh\necho hi\n";
        let mut file = tar::Header::new_gnu();
        file.set_entry_type(tar::EntryType::Regular);
        file.set_mode(0o755);
        file.set_size(body.len() as u64);
        builder
            .append_data(&mut file, "python/bin/python3.11", &body[..])
            .unwrap();

        let mut link = tar::Header::new_gnu();
        link.set_entry_type(tar::EntryType::Symlink);
        link.set_size(0);
        builder
            .append_link(&mut link, "python/bin/python3", "python3.11")
            .unwrap();

        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_tar_gz_round_trip() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out");

        let summary = extract_tar_gz_reader(&tar_gz_fixture()[..], &dest).unwrap();

        assert_eq!(
            summary,
            ExtractSummary {
                directories: 1,
                files: 1,
                symlinks: 1,
            }
        );
        assert!(dest.join("python/bin").is_dir());
        assert_eq!(
            fs::read_to_string(dest.join("python/bin/python3.11")).unwrap(),
            "#!/bin/sh\necho hi\n"
        );
        let link = dest.join("python/bin/python3");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("python3.11"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dest.join("python/bin/python3.11"))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_tar_gz_reextract_overwrites() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("python.tar.gz");
        fs::write(&archive, tar_gz_fixture()).unwrap();
        let dest = dir.path().join("out");

        extract_tar_gz(&archive, &dest).unwrap();
        fs::write(dest.join("python/bin/python3.11"), "stale").unwrap();
        extract(&archive, ArchiveFormat::TarGz, &dest).unwrap();

        assert_eq!(
            fs::read_to_string(dest.join("python/bin/python3.11")).unwrap(),
            "#!/bin/sh\necho hi\n"
        );
        assert!(
            fs::symlink_metadata(dest.join("python/bin/python3"))
                .unwrap()
                .file_type()
                .is_symlink()
        );
    }

    #[test]
    fn test_tar_rejects_parent_traversal() {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        let body = b"owned";
        let mut header = tar::Header::new_old();
        // set_path refuses "..", so write the name field directly.
        header.as_old_mut().name[..9].copy_from_slice(b"../escape");
        header.set_entry_type(tar::EntryType::Regular);
        header.set_mode(0o644);
        header.set_size(body.len() as u64);
        header.set_cksum();
        builder.append(&header, &body[..]).unwrap();
        let bytes = builder.into_inner().unwrap().finish().unwrap();

        let dir = tempdir().unwrap();
        let dest = dir.path().join("out");
        let err = extract_tar_gz_reader(&bytes[..], &dest).unwrap_err();

        assert!(matches!(err, ExtractError::UnsafePath(_)));
        assert!(!dir.path().join("escape").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_tar_refuses_write_through_symlink() {
        let outside = tempdir().unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

        let mut link = tar::Header::new_gnu();
        link.set_entry_type(tar::EntryType::Symlink);
        link.set_size(0);
        builder
            .append_link(&mut link, "python/lib", outside.path())
            .unwrap();

        let body = b"owned";
        let mut file = tar::Header::new_gnu();
        file.set_entry_type(tar::EntryType::Regular);
        file.set_mode(0o644);
        file.set_size(body.len() as u64);
        builder
            .append_data(&mut file, "python/lib/evil", &body[..])
            .unwrap();
        let bytes = builder.into_inner().unwrap().finish().unwrap();

        let dir = tempdir().unwrap();
        let result = extract_tar_gz_reader(&bytes[..], &dir.path().join("out"));

        assert!(result.is_err());
        assert!(!outside.path().join("evil").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_zip_refuses_write_through_symlink() {
        use zip::write::SimpleFileOptions;

        let outside = tempdir().unwrap();
        let dir = tempdir().unwrap();
        let archive = dir.path().join("python.zip");
        {
            let mut writer = zip::ZipWriter::new(File::create(&archive).unwrap());
            let options = SimpleFileOptions::default();
            writer
                .add_symlink("python/lib", outside.path().to_str().unwrap(), options)
                .unwrap();
            writer.start_file("python/lib/evil", options).unwrap();
            writer.write_all(b"owned").unwrap();
            writer.finish().unwrap();
        }

        let err = extract_zip(&archive, &dir.path().join("out")).unwrap_err();

        assert!(matches!(err, ExtractError::UnsafePath(_)));
        assert!(!outside.path().join("evil").exists());
    }

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path(Path::new("./python/bin")).unwrap(),
            Path::new("python/bin")
        );
        assert!(sanitize_path(Path::new("/etc/passwd")).is_err());
        assert!(sanitize_path(Path::new("a/../../b")).is_err());
    }

    #[test]
    fn test_zip_round_trip() {
        use zip::write::SimpleFileOptions;

        let dir = tempdir().unwrap();
        let archive = dir.path().join("python.zip");
        {
            let mut writer = zip::ZipWriter::new(File::create(&archive).unwrap());
            let options = SimpleFileOptions::default().unix_permissions(0o755);
            writer.add_directory("python/", options).unwrap();
            writer.start_file("python/python.exe", options).unwrap();
            writer.write_all(b"MZ").unwrap();
            writer
                .add_symlink("python/python3.exe", "python.exe", options)
                .unwrap();
            writer.finish().unwrap();
        }

        let dest = dir.path().join("out");
        let summary = extract(&archive, ArchiveFormat::Zip, &dest).unwrap();

        assert_eq!(
            summary,
            ExtractSummary {
                directories: 1,
                files: 1,
                symlinks: 1,
            }
        );
        assert!(dest.join("python").is_dir());
        assert_eq!(fs::read(dest.join("python/python.exe")).unwrap(), b"MZ");
        let link = dest.join("python/python3.exe");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("python.exe"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dest.join("python/python.exe"))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }
}
