//! neatdir - sort files into category folders and normalize their names
//!
//! The pipeline is scan → plan → execute → manifest. Each stage is a plain
//! function over data produced by the previous one, with filesystem access
//! and logging injected through the [`fs::FileSystem`] and
//! [`logging::Logger`] traits.

pub mod cli;
pub mod config;
pub mod executor;
pub mod file_category;
pub mod fs;
pub mod logging;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod planner;
pub mod scanner;

pub use config::{CategoryRule, Config, ConfigError, NamingConvention, NamingStyle};
pub use executor::{ExecutionResult, OperationError, OperationFailure, execute};
pub use file_category::categorize;
pub use fs::{FileSystem, StdFileSystem};
pub use logging::{Logger, MemoryLogger, NullLogger};
pub use manifest::{Manifest, ManifestEntry, ManifestStatus};
pub use naming::apply_convention;
pub use planner::{FileOperation, OperationKind, plan};
pub use scanner::{DiscoveredFile, ScanError, scan};

pub use cli::{AppError, Cli, run};
