//! Applies planned operations to the filesystem.
//!
//! Operations run one at a time, in plan order. Each one is isolated: a
//! failure is recorded and logged, and the executor moves on to the next
//! operation. In dry-run mode nothing on disk is touched and every
//! operation is reported as successful.

use crate::fs::{FileSystem, same_path};
use crate::logging::Logger;
use crate::planner::FileOperation;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can fail a single operation.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Something already occupies the destination path.
    #[error("Destination already exists: {}", .path.display())]
    DestinationExists { path: PathBuf },

    /// Failed to create the destination directory.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rename itself failed.
    #[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for a single operation.
pub type OperationResult<T> = Result<T, OperationError>;

/// A failed operation, keyed by its source path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationFailure {
    pub source_path: PathBuf,
    pub error_message: String,
}

/// Outcome of executing a batch of operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Every operation that was attempted, in order.
    pub operations: Vec<FileOperation>,
    pub success_count: usize,
    pub failure_count: usize,
    pub failures: Vec<OperationFailure>,
    /// True when the batch was simulated.
    pub dry_run: bool,
}

impl ExecutionResult {
    /// True if at least one operation failed.
    pub fn has_failures(&self) -> bool {
        self.failure_count > 0
    }

    /// Error message recorded for `source_path`, if that operation failed.
    pub fn failure_for(&self, source_path: &Path) -> Option<&str> {
        self.failures
            .iter()
            .find(|failure| failure.source_path == source_path)
            .map(|failure| failure.error_message.as_str())
    }
}

/// Executes `operations` in order. See [`execute_with_progress`].
pub fn execute(
    operations: &[FileOperation],
    dry_run: bool,
    fs: &dyn FileSystem,
    logger: &dyn Logger,
) -> ExecutionResult {
    execute_with_progress(operations, dry_run, fs, logger, |_, _| {})
}

/// Executes `operations` in order, calling `on_progress(done, total)` after
/// each one.
///
/// Every operation is attempted exactly once regardless of earlier
/// failures. The function never returns early.
pub fn execute_with_progress<F>(
    operations: &[FileOperation],
    dry_run: bool,
    fs: &dyn FileSystem,
    logger: &dyn Logger,
    mut on_progress: F,
) -> ExecutionResult
where
    F: FnMut(usize, usize),
{
    let total = operations.len();
    let mut result = ExecutionResult {
        operations: operations.to_vec(),
        dry_run,
        ..ExecutionResult::default()
    };

    for (index, operation) in operations.iter().enumerate() {
        let details = json!({
            "kind": operation.kind.as_str(),
            "source": operation.source_path.display().to_string(),
            "destination": operation.destination_path.display().to_string(),
        });

        if dry_run {
            logger.info(
                &format!(
                    "[DRY RUN] Would {} {} -> {}",
                    operation.kind,
                    operation.source_path.display(),
                    operation.destination_path.display()
                ),
                Some(&details),
            );
            result.success_count += 1;
            on_progress(index + 1, total);
            continue;
        }

        match apply_operation(operation, fs) {
            Ok(()) => {
                result.success_count += 1;
                logger.info(
                    &format!(
                        "{} {} -> {}",
                        operation.kind,
                        operation.source_path.display(),
                        operation.destination_path.display()
                    ),
                    Some(&details),
                );
            }
            Err(e) => {
                let message = e.to_string();
                result.failure_count += 1;
                result.failures.push(OperationFailure {
                    source_path: operation.source_path.clone(),
                    error_message: message.clone(),
                });
                logger.error(
                    &format!(
                        "Failed to {} {}: {}",
                        operation.kind,
                        operation.source_path.display(),
                        message
                    ),
                    Some(&details),
                );
            }
        }

        on_progress(index + 1, total);
    }

    result
}

/// Performs one operation against the filesystem.
///
/// Creates the destination's parent directory if needed, refuses to
/// overwrite an existing entry, then renames the source into place.
pub fn apply_operation(operation: &FileOperation, fs: &dyn FileSystem) -> OperationResult<()> {
    let source = &operation.source_path;
    let destination = &operation.destination_path;

    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
        && !fs.exists(parent)
    {
        fs.create_dir_all(parent)
            .map_err(|e| OperationError::DirectoryCreationFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    if fs.exists(destination) && !same_path(destination, source) {
        return Err(OperationError::DestinationExists {
            path: destination.clone(),
        });
    }

    fs.rename(source, destination)
        .map_err(|e| OperationError::MoveFailed {
            from: source.clone(),
            to: destination.clone(),
            source: e,
        })
}
