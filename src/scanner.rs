//! Recursive directory scanning.
//!
//! Walks the tree with `walkdir`, applies the hidden-path rule and exclude
//! globs from the configuration, stats every remaining regular file and
//! attaches its category.

use crate::config::{Config, ConfigError, LOCAL_CONFIG_FILE};
use crate::file_category::{categorize, extension_of};
use crate::fs::FileSystem;
use crate::logging::Logger;
use crate::manifest::MANIFEST_DIR_NAME;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Directory not found: {}", .path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to stat {}: {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Filter(#[from] ConfigError),
}

/// A regular file found during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredFile {
    /// Absolute path at scan time.
    pub original_path: PathBuf,
    /// Basename.
    pub filename: String,
    /// Lowercase with leading dot; empty when the file has none.
    pub extension: String,
    pub size: u64,
    /// Name of the matched category rule.
    pub category: Option<String>,
    /// Target folder of the matched category rule.
    pub target_folder: Option<String>,
}

/// Entries the organizer owns and must never move.
fn is_reserved(relative_path: &Path) -> bool {
    relative_path == Path::new(MANIFEST_DIR_NAME) || relative_path == Path::new(LOCAL_CONFIG_FILE)
}

/// Scans `directory` recursively and returns every regular file that passes
/// the configured filters, in file-name order.
///
/// Directories, symlinks to directories and dangling symlinks are skipped
/// silently.
///
/// # Errors
///
/// Fails if `directory` is not a directory, if any entry cannot be read,
/// or if a regular file cannot be stat'ed.
pub fn scan(
    directory: &Path,
    config: &Config,
    fs: &dyn FileSystem,
    logger: &dyn Logger,
) -> Result<Vec<DiscoveredFile>, ScanError> {
    if !fs.stat(directory).is_ok_and(|stat| stat.is_dir) {
        return Err(ScanError::DirectoryNotFound {
            path: directory.to_path_buf(),
        });
    }

    let root = std::path::absolute(directory).map_err(|source| ScanError::Stat {
        path: directory.to_path_buf(),
        source,
    })?;
    let filter = config.scan_filter()?;

    logger.debug(
        "Scanning directory",
        Some(&json!({
            "directory": root.display().to_string(),
            "includeHidden": config.include_hidden,
            "excludePatterns": config.exclude_patterns,
        })),
    );

    let walker = WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
            !is_reserved(relative) && filter.should_descend(relative)
        });

    let mut files = Vec::new();

    for entry_result in walker {
        let entry = entry_result.map_err(|source| ScanError::Walk {
            path: source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.clone()),
            source,
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(&root).unwrap_or(path);
        if is_reserved(relative) || !filter.should_include(relative) {
            continue;
        }

        let stat = match fs.stat(path) {
            Ok(stat) => stat,
            Err(e) if entry.path_is_symlink() => {
                logger.debug(
                    "Skipping dangling symlink",
                    Some(&json!({ "path": path.display().to_string(), "error": e.to_string() })),
                );
                continue;
            }
            Err(source) => {
                return Err(ScanError::Stat {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        if !stat.is_file {
            continue;
        }

        let filename = entry.file_name().to_string_lossy().to_string();
        let extension = extension_of(&filename);
        let rule = categorize(&extension, &filename, &config.categories);

        files.push(DiscoveredFile {
            original_path: path.to_path_buf(),
            filename,
            extension,
            size: stat.size,
            category: rule.map(|r| r.name.clone()),
            target_folder: rule.and_then(|r| r.target_folder.clone()),
        });
    }

    logger.info(
        &format!("Scan found {} file(s)", files.len()),
        Some(&json!({ "directory": root.display().to_string() })),
    );

    Ok(files)
}
