//! Turns scanned files into move/rename operations.
//!
//! Planning is pure: it only looks at the discovered files and the
//! configuration and never touches the disk. Files that are already in
//! the right folder under the right name produce no operation.

use crate::config::Config;
use crate::fs::normalize_path;
use crate::naming::{apply_convention, needs_rename};
use crate::scanner::DiscoveredFile;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// What an operation changes about a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    /// New folder, same name.
    Move,
    /// Same folder, new name.
    Rename,
    /// New folder and new name.
    MoveAndRename,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Move => "move",
            OperationKind::Rename => "rename",
            OperationKind::MoveAndRename => "move-and-rename",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One planned filesystem change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOperation {
    pub kind: OperationKind,
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    /// Human-readable explanation recorded in the manifest.
    pub reason: String,
}

/// Plans operations for every discovered file, preserving input order.
///
/// `base_directory` anchors category target folders when the configuration
/// has no `targetDirectory`.
///
/// Two files may be planned onto the same destination; the collision is
/// left for the executor, where the second one fails.
pub fn plan(
    files: &[DiscoveredFile],
    config: &Config,
    base_directory: &Path,
) -> Vec<FileOperation> {
    files
        .iter()
        .filter_map(|file| plan_file(file, config, base_directory))
        .collect()
}

/// Plans a single file, or `None` when it is already where it belongs.
pub fn plan_file(
    file: &DiscoveredFile,
    config: &Config,
    base_directory: &Path,
) -> Option<FileOperation> {
    let source = normalize_path(&file.original_path);
    let current_dir = source.parent().map(Path::to_path_buf).unwrap_or_default();

    let target_dir = match &file.target_folder {
        Some(folder) => {
            let anchor = config
                .target_directory
                .as_deref()
                .unwrap_or(base_directory);
            normalize_path(&anchor.join(folder))
        }
        None => current_dir.clone(),
    };

    let target_filename = if needs_rename(&file.filename, &config.naming_convention) {
        apply_convention(&file.filename, &config.naming_convention)
    } else {
        file.filename.clone()
    };

    let destination = normalize_path(&target_dir.join(&target_filename));
    if destination == source {
        return None;
    }

    let moved = target_dir != current_dir;
    let renamed = target_filename != file.filename;

    let (kind, reason) = match (moved, renamed) {
        (true, true) => (
            OperationKind::MoveAndRename,
            format!(
                "Move to {} and rename to {}",
                folder_label(file, &target_dir),
                target_filename
            ),
        ),
        (true, false) => (
            OperationKind::Move,
            format!("Move to {}", folder_label(file, &target_dir)),
        ),
        (false, true) => (
            OperationKind::Rename,
            format!(
                "Rename to {} ({})",
                target_filename, config.naming_convention.style
            ),
        ),
        // Paths differ only in normalization; nothing to do.
        (false, false) => return None,
    };

    Some(FileOperation {
        kind,
        source_path: source,
        destination_path: destination,
        reason,
    })
}

fn folder_label(file: &DiscoveredFile, target_dir: &Path) -> String {
    match (&file.category, &file.target_folder) {
        (Some(category), Some(folder)) => format!("{}/ ({})", folder, category),
        _ => target_dir.display().to_string(),
    }
}
