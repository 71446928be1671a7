//! Run manifests.
//!
//! A manifest records every operation attempted in one run together with
//! its outcome. It is rendered twice: as pretty JSON for machines and as a
//! markdown report for people. Both land under `<base>/.neatdir/`.

use crate::executor::ExecutionResult;
use crate::fs::FileSystem;
use crate::planner::FileOperation;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory (relative to the organized base) that holds manifests.
/// The scanner never descends into it.
pub const MANIFEST_DIR_NAME: &str = ".neatdir";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write manifest {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub timestamp: String,
    pub operation: FileOperation,
    pub status: ManifestStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub generated_at: String,
    pub total_operations: usize,
    pub successful: usize,
    pub failed: usize,
    pub entries: Vec<ManifestEntry>,
}

/// Where [`save`] wrote the two renderings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPaths {
    pub json: PathBuf,
    pub text: PathBuf,
}

/// Builds a manifest from an execution result.
///
/// All entries share the manifest's `generatedAt` timestamp. An entry is
/// `failed` when its source path appears in `result.failures`, and then
/// carries the recorded error message.
pub fn build(result: &ExecutionResult) -> Manifest {
    let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    let entries: Vec<ManifestEntry> = result
        .operations
        .iter()
        .map(|operation| {
            let error = result
                .failure_for(&operation.source_path)
                .map(str::to_string);
            ManifestEntry {
                timestamp: generated_at.clone(),
                operation: operation.clone(),
                status: if error.is_some() {
                    ManifestStatus::Failed
                } else {
                    ManifestStatus::Success
                },
                error,
            }
        })
        .collect();

    let failed = entries
        .iter()
        .filter(|entry| entry.status == ManifestStatus::Failed)
        .count();

    Manifest {
        generated_at,
        total_operations: entries.len(),
        successful: entries.len() - failed,
        failed,
        entries,
    }
}

/// Renders the manifest as a markdown report.
///
/// A manifest without entries renders as the header alone.
pub fn format(manifest: &Manifest) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "# File Organization Manifest");
    let _ = writeln!(out);
    let _ = writeln!(out, "Generated: {}", manifest.generated_at);
    let _ = writeln!(out, "Total operations: {}", manifest.total_operations);
    let _ = writeln!(out, "Successful: {}", manifest.successful);
    let _ = writeln!(out, "Failed: {}", manifest.failed);

    if manifest.entries.is_empty() {
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## Operations");

    for (index, entry) in manifest.entries.iter().enumerate() {
        let marker = match entry.status {
            ManifestStatus::Success => "✓",
            ManifestStatus::Failed => "✗",
        };
        let op = &entry.operation;

        let _ = writeln!(out);
        let _ = writeln!(out, "### {}. {} {}", index + 1, marker, op.kind);
        let _ = writeln!(out);
        let _ = writeln!(out, "- Source: {}", op.source_path.display());
        let _ = writeln!(out, "- Destination: {}", op.destination_path.display());
        let _ = writeln!(out, "- Reason: {}", op.reason);
        if let Some(error) = &entry.error {
            let _ = writeln!(out, "- Error: {}", error);
        }
    }

    out
}

/// Pretty-printed JSON rendering.
pub fn to_json(manifest: &Manifest) -> Result<String, ManifestError> {
    Ok(serde_json::to_string_pretty(manifest)?)
}

/// Filesystem-safe stamp derived from `generatedAt`.
fn file_stamp(generated_at: &str) -> String {
    generated_at
        .chars()
        .map(|c| if c == ':' || c == '.' { '-' } else { c })
        .collect()
}

/// Writes `manifest-<stamp>.json` and `manifest-<stamp>.md` into
/// `<base_directory>/.neatdir/`, creating the directory if needed.
pub fn save(
    manifest: &Manifest,
    base_directory: &Path,
    fs: &dyn FileSystem,
) -> Result<ManifestPaths, ManifestError> {
    let dir = base_directory.join(MANIFEST_DIR_NAME);
    fs.create_dir_all(&dir).map_err(|source| ManifestError::Write {
        path: dir.clone(),
        source,
    })?;

    let stamp = file_stamp(&manifest.generated_at);
    let paths = ManifestPaths {
        json: dir.join(format!("manifest-{}.json", stamp)),
        text: dir.join(format!("manifest-{}.md", stamp)),
    };

    let json = to_json(manifest)?;
    fs.write(&paths.json, &json)
        .map_err(|source| ManifestError::Write {
            path: paths.json.clone(),
            source,
        })?;
    fs.write(&paths.text, &format(manifest))
        .map_err(|source| ManifestError::Write {
            path: paths.text.clone(),
            source,
        })?;

    Ok(paths)
}
