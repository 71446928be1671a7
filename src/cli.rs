//! Command-line interface.
//!
//! `neatdir organize <DIR>` runs the whole pipeline: configuration, scan,
//! plan, execute, manifest. `neatdir init` writes a starter configuration.
//!
//! The pipeline itself lives in [`organize`], which prints nothing and can
//! be driven from tests. [`run`] wraps it with terminal output.

use crate::config::{Config, ConfigError, LOCAL_CONFIG_FILE, NamingConvention, NamingStyle};
use crate::executor::{ExecutionResult, execute_with_progress};
use crate::fs::{FileSystem, StdFileSystem, normalize_path};
use crate::logging::{Logger, MemoryLogger, TeeLogger, TracingLogger};
use crate::manifest::{self, Manifest, ManifestError, ManifestPaths};
use crate::output::{OutputFormatter, UNCATEGORIZED};
use crate::planner::{FileOperation, plan};
use crate::scanner::{DiscoveredFile, ScanError, scan};
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "neatdir",
    author,
    version,
    about = "Sort files into category folders and normalize their names"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Organize a directory tree.
    Organize(OrganizeArgs),

    /// Write the default configuration to a file.
    Init {
        /// Destination file (defaults to ./.neatdir.toml).
        #[arg(value_hint = ValueHint::FilePath)]
        path: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct OrganizeArgs {
    /// Directory to organize.
    #[arg(value_hint = ValueHint::DirPath)]
    pub directory: PathBuf,

    /// Configuration file (.toml or .json).
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Show what would happen without touching any file.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Root for category folders instead of DIRECTORY.
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub target: Option<PathBuf>,

    /// Naming convention: kebab-case, snake_case, camelCase or PascalCase.
    #[arg(long, value_name = "STYLE")]
    pub naming: Option<NamingStyle>,

    /// Also organize hidden files and directories.
    #[arg(long)]
    pub include_hidden: bool,

    /// Do not write a manifest after the run.
    #[arg(long)]
    pub no_manifest: bool,

    /// Append the run log to this file.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,
}

/// Errors that abort a CLI command.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Could not resolve path {}: {source}", .path.display())]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to overwrite existing file: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything one organize run produced.
#[derive(Debug, Clone)]
pub struct OrganizeReport {
    /// Absolute, normalized directory that was organized.
    pub base_directory: PathBuf,
    pub files: Vec<DiscoveredFile>,
    pub operations: Vec<FileOperation>,
    pub result: ExecutionResult,
    pub manifest: Manifest,
    /// Set when the manifest was persisted.
    pub manifest_paths: Option<ManifestPaths>,
}

impl OrganizeReport {
    /// Number of planned operations per category, keyed by category name.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let categories: HashMap<PathBuf, &str> = self
            .files
            .iter()
            .map(|file| {
                (
                    normalize_path(&file.original_path),
                    file.category.as_deref().unwrap_or(UNCATEGORIZED),
                )
            })
            .collect();

        let mut counts = BTreeMap::new();
        for operation in &self.operations {
            let category = categories
                .get(&operation.source_path)
                .copied()
                .unwrap_or(UNCATEGORIZED);
            *counts.entry(category.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

fn absolute(path: &Path) -> Result<PathBuf, AppError> {
    std::path::absolute(path)
        .map(|p| normalize_path(&p))
        .map_err(|source| AppError::InvalidPath {
            path: path.to_path_buf(),
            source,
        })
}

/// Loads the configuration for `args` and applies command-line overrides.
///
/// Flags only ever switch features on (`--dry-run`, `--include-hidden`) or
/// replace a value, so a file setting is never silently weakened.
pub fn resolve_config(args: &OrganizeArgs) -> Result<Config, AppError> {
    let mut config = Config::load(args.config.as_deref())?;

    if args.dry_run {
        config.dry_run = true;
    }
    if args.include_hidden {
        config.include_hidden = true;
    }
    if args.no_manifest {
        config.generate_manifest = false;
    }
    if let Some(target) = &args.target {
        config.target_directory = Some(absolute(target)?);
    }
    if let Some(style) = args.naming {
        config.naming_convention = NamingConvention {
            style,
            ..config.naming_convention
        };
    }

    config.validate()?;
    Ok(config)
}

/// Runs scan, plan, execute and manifest for `directory`.
///
/// The manifest is always built. It is persisted only for real runs with
/// `generateManifest` enabled.
pub fn organize<F>(
    directory: &Path,
    config: &Config,
    fs: &dyn FileSystem,
    logger: &dyn Logger,
    on_progress: F,
) -> Result<OrganizeReport, AppError>
where
    F: FnMut(usize, usize),
{
    config.validate()?;
    let base_directory = absolute(directory)?;

    let files = scan(&base_directory, config, fs, logger)?;
    let operations = plan(&files, config, &base_directory);
    logger.info(
        &format!(
            "Planned {} operation(s) for {} file(s)",
            operations.len(),
            files.len()
        ),
        Some(&json!({ "dryRun": config.dry_run })),
    );

    let result = execute_with_progress(&operations, config.dry_run, fs, logger, on_progress);
    let manifest = manifest::build(&result);

    let manifest_paths = if config.generate_manifest && !config.dry_run {
        let paths = manifest::save(&manifest, &base_directory, fs)?;
        logger.info(
            "Manifest saved",
            Some(&json!({
                "json": paths.json.display().to_string(),
                "text": paths.text.display().to_string(),
            })),
        );
        Some(paths)
    } else {
        None
    };

    Ok(OrganizeReport {
        base_directory,
        files,
        operations,
        result,
        manifest,
        manifest_paths,
    })
}

/// Runs a parsed command. Returns `Ok(false)` when the command completed but
/// some operations failed.
pub fn run(cli: Cli) -> Result<bool, AppError> {
    match cli.command {
        Command::Organize(args) => run_organize(&args),
        Command::Init { path } => {
            let written = init(path.as_deref(), &StdFileSystem)?;
            OutputFormatter::success(&format!(
                "Wrote default configuration to {}",
                written.display()
            ));
            Ok(true)
        }
    }
}

fn run_organize(args: &OrganizeArgs) -> Result<bool, AppError> {
    run_organize_with(args, &StdFileSystem)
}

/// Runs one organize command against `fs`.
///
/// The run's own outcome is always returned. Failing to write `--log-file`
/// is only reported as a warning.
fn run_organize_with(args: &OrganizeArgs, fs: &dyn FileSystem) -> Result<bool, AppError> {
    let memory = MemoryLogger::new();
    let logger = TeeLogger::new(&TracingLogger, &memory);

    let outcome =
        resolve_config(args).and_then(|config| organize_interactive(args, &config, fs, &logger));
    if let Err(e) = &outcome {
        logger.error(&format!("Run aborted: {}", e), None);
    }

    // Written even when the run aborted, so the log explains why.
    if let Some(log_file) = &args.log_file
        && !memory.is_empty()
        && let Err(e) = fs.append(log_file, &memory.render())
    {
        OutputFormatter::warning(&format!(
            "Could not write log file {}: {}",
            log_file.display(),
            e
        ));
    }

    outcome
}

fn organize_interactive(
    args: &OrganizeArgs,
    config: &Config,
    fs: &dyn FileSystem,
    logger: &dyn Logger,
) -> Result<bool, AppError> {
    if config.dry_run {
        OutputFormatter::dry_run_notice(&format!(
            "Analyzing contents of: {}",
            args.directory.display()
        ));
    } else {
        OutputFormatter::info(&format!(
            "Organizing contents of: {}",
            args.directory.display()
        ));
    }

    let progress = (!config.dry_run).then(|| OutputFormatter::create_progress_bar(0));
    let report = organize(&args.directory, config, fs, logger, |done, total| {
        if let Some(pb) = &progress {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        }
    })?;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if report.operations.is_empty() {
        OutputFormatter::success(&format!(
            "Nothing to do: {} file(s) already organized",
            report.files.len()
        ));
        return Ok(true);
    }

    OutputFormatter::header(if config.dry_run {
        "PLANNED OPERATIONS"
    } else {
        "OPERATIONS"
    });
    for operation in &report.operations {
        OutputFormatter::operation(operation);
    }

    OutputFormatter::summary_table(&report.category_counts(), report.operations.len());

    if config.dry_run {
        OutputFormatter::header("MANIFEST PREVIEW");
        OutputFormatter::plain(&manifest::format(&report.manifest));
        OutputFormatter::dry_run_notice("No files were modified.");
        return Ok(true);
    }

    OutputFormatter::execution_report(&report.result);
    if let Some(paths) = &report.manifest_paths {
        OutputFormatter::manifest_paths(paths);
    }
    if report.result.has_failures() {
        OutputFormatter::warning("Some files could not be organized. Please review errors above.");
    }

    Ok(!report.result.has_failures())
}

/// Writes the default configuration as TOML to `path`, or to
/// `.neatdir.toml` in the current directory.
///
/// # Errors
///
/// Refuses to overwrite an existing file.
pub fn init(path: Option<&Path>, fs: &dyn FileSystem) -> Result<PathBuf, AppError> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE));

    if fs.exists(&path) {
        return Err(AppError::AlreadyExists(path));
    }

    let contents = Config::default().to_toml_string()?;
    fs.write(&path, &contents).map_err(|source| AppError::Write {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}
