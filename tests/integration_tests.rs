//! End-to-end tests for the organize pipeline.
//!
//! Each test builds a small tree in a temporary directory, runs
//! `neatdir::cli::organize` against it with the real filesystem and checks
//! the resulting layout, execution counts and manifests.
//!
//! Test categories:
//! 1. Basic organization workflows
//! 2. Dry-run mode verification
//! 3. Naming conventions
//! 4. Collisions and failures
//! 5. Configuration and filtering
use neatdir::cli::{OrganizeReport, organize};
use neatdir::config::{CategoryRule, Config, NamingConvention, NamingStyle};
use neatdir::fs::StdFileSystem;
use neatdir::logging::{LogLevel, MemoryLogger, NullLogger};
use neatdir::manifest::{MANIFEST_DIR_NAME, Manifest, ManifestStatus};
use neatdir::planner::OperationKind;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file (and any parent directories) at a relative path.
    fn create_file(&self, rel_path: &str, content: &[u8]) {
        let file_path = self.path().join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        let mut file = File::create(&file_path).expect("Failed to create file");
        file.write_all(content)
            .expect("Failed to write file content");
    }

    fn create_text_file(&self, rel_path: &str, content: &str) {
        self.create_file(rel_path, content.as_bytes());
    }

    fn read(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path)).expect("Failed to read file")
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.exists() && path.is_file(),
            "File should exist: {}",
            path.display()
        );
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    /// All regular files below the fixture, relative and sorted, skipping
    /// the manifest directory.
    fn list_files_recursive(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        Self::walk_dir(self.path(), &mut files);
        let mut relative: Vec<PathBuf> = files
            .into_iter()
            .filter_map(|p| p.strip_prefix(self.path()).ok().map(Path::to_path_buf))
            .filter(|p| !p.starts_with(MANIFEST_DIR_NAME))
            .collect();
        relative.sort();
        relative
    }

    fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) {
        if let Ok(entries) = fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() {
                    files.push(path);
                } else if path.is_dir() {
                    Self::walk_dir(&path, files);
                }
            }
        }
    }

    /// Manifest JSON files written so far.
    fn manifest_files(&self) -> Vec<PathBuf> {
        let dir = self.path().join(MANIFEST_DIR_NAME);
        let mut files: Vec<PathBuf> = fs::read_dir(&dir)
            .map(|entries| entries.flatten().map(|e| e.path()).collect())
            .unwrap_or_default();
        files.retain(|p| p.extension().is_some_and(|ext| ext == "json"));
        files.sort();
        files
    }

    fn run(&self, config: &Config) -> OrganizeReport {
        organize(self.path(), config, &StdFileSystem, &NullLogger, |_, _| {})
            .expect("organize should succeed")
    }
}

fn rel(path: &str) -> PathBuf {
    PathBuf::from(path)
}

fn default_config() -> Config {
    Config::default()
}

fn dry_run_config() -> Config {
    Config {
        dry_run: true,
        ..Config::default()
    }
}

// ============================================================================
// Test Suite 1: Basic Organization
// ============================================================================

#[test]
fn test_organize_empty_directory() {
    let fixture = TestFixture::new();

    let report = fixture.run(&default_config());

    assert!(report.operations.is_empty());
    assert_eq!(report.result.success_count, 0);
    assert_eq!(report.manifest.total_operations, 0);
    // An empty run still leaves a manifest behind.
    assert_eq!(fixture.manifest_files().len(), 1);
}

#[test]
fn test_organize_mixed_files_into_category_folders() {
    let fixture = TestFixture::new();
    fixture.create_text_file("photo.jpg", "jpg");
    fixture.create_text_file("diagram.PNG", "png");
    fixture.create_text_file("report.pdf", "pdf");
    fixture.create_text_file("song.mp3", "mp3");
    fixture.create_text_file("backup.zip", "zip");
    fixture.create_text_file("notes.xyz", "???");

    let report = fixture.run(&default_config());

    assert_eq!(report.result.failure_count, 0);
    assert_eq!(report.result.success_count, 5);
    assert_eq!(
        fixture.list_files_recursive(),
        vec![
            rel("archives/backup.zip"),
            rel("audio/song.mp3"),
            rel("documents/report.pdf"),
            rel("images/diagram.png"),
            rel("images/photo.jpg"),
            rel("notes.xyz"),
        ]
    );
    assert_eq!(fixture.read("images/photo.jpg"), "jpg");
}

#[test]
fn test_organize_recurses_into_subdirectories() {
    let fixture = TestFixture::new();
    fixture.create_text_file("inbox/2024/Scan 01.JPG", "scan");
    fixture.create_text_file("inbox/readme.md", "hi");

    let report = fixture.run(&default_config());

    assert_eq!(report.result.failure_count, 0);
    fixture.assert_file_exists("images/scan-01.jpg");
    fixture.assert_file_exists("documents/readme.md");
    fixture.assert_file_not_exists("inbox/2024/Scan 01.JPG");
}

#[test]
fn test_organize_twice_is_a_no_op() {
    let fixture = TestFixture::new();
    fixture.create_text_file("My Photo.jpg", "x");
    fixture.create_text_file("Draft Notes.txt", "y");

    let first = fixture.run(&default_config());
    assert_eq!(first.result.success_count, 2);

    let layout = fixture.list_files_recursive();
    let second = fixture.run(&default_config());

    assert!(second.operations.is_empty());
    assert_eq!(fixture.list_files_recursive(), layout);
}

#[test]
fn test_organize_writes_consistent_manifest() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.jpg", "a");
    fixture.create_text_file("b.pdf", "b");

    let report = fixture.run(&default_config());
    let paths = report.manifest_paths.expect("manifest should be saved");

    let manifest: Manifest =
        serde_json::from_str(&fs::read_to_string(&paths.json).unwrap()).unwrap();
    assert_eq!(manifest.total_operations, 2);
    assert_eq!(manifest.successful + manifest.failed, manifest.total_operations);
    assert_eq!(manifest.entries.len(), manifest.total_operations);
    assert!(
        manifest
            .entries
            .iter()
            .all(|e| e.status == ManifestStatus::Success)
    );

    let text = fs::read_to_string(&paths.text).unwrap();
    assert!(text.contains("# File Organization Manifest"));
    assert_eq!(text.matches('✓').count(), 2);
}

#[test]
fn test_manifest_can_be_disabled() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.jpg", "a");

    let config = Config {
        generate_manifest: false,
        ..Config::default()
    };
    let report = fixture.run(&config);

    assert!(report.manifest_paths.is_none());
    assert!(!fixture.path().join(MANIFEST_DIR_NAME).exists());
    fixture.assert_file_exists("images/a.jpg");
}

// ============================================================================
// Test Suite 2: Dry Run
// ============================================================================

#[test]
fn test_dry_run_leaves_tree_untouched() {
    let fixture = TestFixture::new();
    fixture.create_text_file("Holiday Photo.JPG", "x");
    fixture.create_text_file("docs/Quarterly Report.PDF", "y");

    let before = fixture.list_files_recursive();
    let report = fixture.run(&dry_run_config());

    assert_eq!(report.operations.len(), 2);
    assert_eq!(report.result.success_count, 2);
    assert_eq!(report.result.failure_count, 0);
    assert!(report.manifest_paths.is_none());
    assert_eq!(fixture.list_files_recursive(), before);
    assert!(!fixture.path().join(MANIFEST_DIR_NAME).exists());
}

#[test]
fn test_dry_run_logs_every_operation() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.jpg", "x");
    fixture.create_text_file("b.jpg", "x");

    let logger = MemoryLogger::new();
    organize(
        fixture.path(),
        &dry_run_config(),
        &StdFileSystem,
        &logger,
        |_, _| {},
    )
    .unwrap();

    let dry_lines = logger
        .records_at(LogLevel::Info)
        .into_iter()
        .filter(|r| r.message.starts_with("[DRY RUN]"))
        .count();
    assert_eq!(dry_lines, 2);
}

// ============================================================================
// Test Suite 3: Naming Conventions
// ============================================================================

#[test]
fn test_rename_in_place_for_uncategorized_files() {
    let fixture = TestFixture::new();
    fixture.create_text_file("misc/Some Odd File.XYZ", "x");

    let config = Config {
        naming_convention: NamingConvention::new(NamingStyle::SnakeCase),
        ..Config::default()
    };
    let report = fixture.run(&config);

    assert_eq!(report.operations[0].kind, OperationKind::Rename);
    fixture.assert_file_exists("misc/some_odd_file.xyz");
}

#[test]
fn test_pascal_case_naming() {
    let fixture = TestFixture::new();
    fixture.create_text_file("my_file_name.txt", "x");

    let config = Config {
        naming_convention: NamingConvention::new(NamingStyle::PascalCase),
        ..Config::default()
    };
    fixture.run(&config);

    fixture.assert_file_exists("documents/MyFileName.txt");
}

// ============================================================================
// Test Suite 4: Collisions and Failures
// ============================================================================

#[test]
fn test_collision_first_writer_wins() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a/Report.pdf", "first");
    fixture.create_text_file("b/report.pdf", "second");

    let report = fixture.run(&default_config());

    assert_eq!(report.result.success_count, 1);
    assert_eq!(report.result.failure_count, 1);
    assert!(
        report.result.failures[0]
            .error_message
            .contains("already exists")
    );
    assert_eq!(fixture.read("documents/report.pdf"), "first");
    fixture.assert_file_exists("b/report.pdf");

    assert_eq!(report.manifest.failed, 1);
    let text = fs::read_to_string(report.manifest_paths.unwrap().text).unwrap();
    assert!(text.contains('✗'));
}

#[test]
fn test_existing_destination_is_never_overwritten() {
    let fixture = TestFixture::new();
    fixture.create_text_file("images/photo.jpg", "original");
    fixture.create_text_file("Photo.JPG", "incoming");

    let report = fixture.run(&default_config());

    assert_eq!(report.result.failure_count, 1);
    assert_eq!(fixture.read("images/photo.jpg"), "original");
    assert_eq!(fixture.read("Photo.JPG"), "incoming");
}

#[test]
fn test_missing_directory_is_fatal() {
    let fixture = TestFixture::new();
    let missing = fixture.path().join("does-not-exist");

    let result = organize(&missing, &default_config(), &StdFileSystem, &NullLogger, |_, _| {});
    assert!(result.is_err());
}

// ============================================================================
// Test Suite 5: Configuration and Filtering
// ============================================================================

#[test]
fn test_hidden_files_are_skipped_by_default() {
    let fixture = TestFixture::new();
    fixture.create_text_file(".secret.txt", "x");
    fixture.create_text_file(".cache/thumb.png", "x");
    fixture.create_text_file("visible.txt", "x");

    fixture.run(&default_config());

    fixture.assert_file_exists(".secret.txt");
    fixture.assert_file_exists(".cache/thumb.png");
    fixture.assert_file_exists("documents/visible.txt");
}

#[test]
fn test_hidden_files_included_when_enabled() {
    let fixture = TestFixture::new();
    fixture.create_text_file(".cache/thumb.png", "x");

    let config = Config {
        include_hidden: true,
        ..Config::default()
    };
    fixture.run(&config);

    fixture.assert_file_exists("images/thumb.png");
}

#[test]
fn test_exclude_patterns() {
    let fixture = TestFixture::new();
    fixture.create_text_file("keep.jpg", "x");
    fixture.create_text_file("skip.tmp.jpg", "x");
    fixture.create_text_file("vendor/lib.js", "x");

    let config = Config {
        exclude_patterns: vec!["*.tmp.*".to_string(), "vendor/**".to_string()],
        ..Config::default()
    };
    fixture.run(&config);

    fixture.assert_file_exists("images/keep.jpg");
    fixture.assert_file_exists("skip.tmp.jpg");
    fixture.assert_file_exists("vendor/lib.js");
}

#[test]
fn test_target_directory() {
    let fixture = TestFixture::new();
    let target = TempDir::new().expect("Failed to create temp directory");
    fixture.create_text_file("song.mp3", "x");

    let config = Config {
        target_directory: Some(target.path().to_path_buf()),
        ..Config::default()
    };
    fixture.run(&config);

    fixture.assert_file_not_exists("song.mp3");
    assert!(target.path().join("audio").join("song.mp3").is_file());
}

#[test]
fn test_custom_categories_with_patterns() {
    let fixture = TestFixture::new();
    fixture.create_text_file("report-q1.pdf", "x");
    fixture.create_text_file("invoice.pdf", "x");

    let config = Config {
        categories: vec![
            CategoryRule::new("reports", &["pdf"], Some("Reports")).with_patterns(&["report-*"]),
        ],
        ..Config::default()
    };
    let report = fixture.run(&config);

    assert_eq!(report.operations.len(), 1);
    fixture.assert_file_exists("Reports/report-q1.pdf");
    fixture.assert_file_exists("invoice.pdf");
}

#[test]
fn test_config_file_is_never_moved() {
    let fixture = TestFixture::new();
    fixture.create_text_file(".neatdir.toml", "dryRun = false\n");
    fixture.create_text_file("a.txt", "x");

    let config = Config {
        include_hidden: true,
        ..Config::default()
    };
    fixture.run(&config);

    fixture.assert_file_exists(".neatdir.toml");
    fixture.assert_file_exists("documents/a.txt");
}
