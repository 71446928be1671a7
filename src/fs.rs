//! Filesystem access used by the scanner, executor and manifest writer.
//!
//! Everything that touches the disk goes through the [`FileSystem`] trait so
//! tests can count or refuse mutations. [`StdFileSystem`] is the only
//! production implementation and is a thin wrapper over `std::fs`.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

/// Size and type information returned by [`FileSystem::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Size in bytes.
    pub size: u64,
    /// True for regular files (after following symlinks).
    pub is_file: bool,
    /// True for directories (after following symlinks).
    pub is_dir: bool,
}

/// The subset of filesystem behavior the organizer relies on.
pub trait FileSystem {
    /// Returns true if any entry exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Reads a whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Creates or truncates `path` and writes `contents`.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Appends `contents` to `path`, creating the file if needed.
    fn append(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Creates `path` and any missing ancestors. Succeeds if it already exists.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Renames `from` to `to` in a single filesystem call.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Returns size and entry type for `path`.
    fn stat(&self, path: &Path) -> io::Result<FileStat>;
}

/// [`FileSystem`] backed by the real disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn exists(&self, path: &Path) -> bool {
        // symlink_metadata so a dangling link still counts as occupying the path
        fs::symlink_metadata(path).is_ok()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn append(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(contents.as_bytes())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if path.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let metadata = fs::metadata(path)?;
        Ok(FileStat {
            size: metadata.len(),
            is_file: metadata.is_file(),
            is_dir: metadata.is_dir(),
        })
    }
}

/// Lexically normalizes a path: drops `.` components, resolves `..` against
/// preceding normal components and rebuilds the path with the platform
/// separator. The filesystem is never consulted, so symlinks are not resolved.
///
/// ```
/// use neatdir::fs::normalize_path;
/// use std::path::Path;
///
/// assert_eq!(
///     normalize_path(Path::new("/data/./inbox/../docs/a.txt")),
///     Path::new("/data/docs/a.txt")
/// );
/// ```
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) && normalized.pop();
                if !popped && !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Compares two paths after [`normalize_path`].
pub fn same_path(a: &Path, b: &Path) -> bool {
    normalize_path(a) == normalize_path(b)
}
