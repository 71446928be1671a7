//! Run configuration: categories, naming convention and scan filters.
//!
//! Configuration files may be TOML or JSON and use camelCase keys. Every key
//! is optional; anything left out falls back to [`Config::default`].
//!
//! # Configuration File Format
//!
//! ```toml
//! excludePatterns = ["*.tmp", "node_modules/**"]
//! includeHidden = false
//! dryRun = false
//! generateManifest = true
//! targetDirectory = "/home/me/Sorted"
//!
//! [namingConvention]
//! type = "kebab-case"
//! lowercase = true
//!
//! [[categories]]
//! name = "documents"
//! extensions = [".pdf", ".docx"]
//! patterns = ["report-*"]
//! targetFolder = "Documents"
//! ```

use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Name of the per-directory configuration file looked up by [`Config::load`].
pub const LOCAL_CONFIG_FILE: &str = ".neatdir.toml";

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration in {}: {reason}", .path.display())]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Unsupported configuration format '{extension}' for {}: expected .toml or .json", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },

    #[error("Category at position {index} has an empty name")]
    EmptyCategoryName { index: usize },

    #[error("Category '{category}' has an invalid target folder '{folder}': expected a relative path without '..'")]
    InvalidTargetFolder { category: String, folder: String },

    #[error("Target directory must be an absolute path: {}", .0.display())]
    RelativeTargetDirectory(PathBuf),

    #[error("Unknown naming convention '{0}': expected kebab-case, snake_case, camelCase or PascalCase")]
    UnknownNamingConvention(String),

    #[error("IO error reading configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render configuration: {0}")]
    Render(String),
}

/// A named bucket of extensions with an optional destination folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRule {
    pub name: String,

    /// Lowercase dotted suffixes such as `.jpg`.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Filename globs; when present, at least one must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_folder: Option<String>,
}

impl CategoryRule {
    /// Convenience constructor used by the defaults and tests.
    pub fn new(name: &str, extensions: &[&str], target_folder: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            extensions: extensions.iter().map(|e| normalize_extension(e)).collect(),
            patterns: None,
            target_folder: target_folder.map(str::to_string),
        }
    }

    /// Returns a copy restricted to filenames matching `patterns`.
    pub fn with_patterns(mut self, patterns: &[&str]) -> Self {
        self.patterns = Some(patterns.iter().map(|p| p.to_string()).collect());
        self
    }
}

/// Case style applied to file stems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NamingStyle {
    #[default]
    #[serde(rename = "kebab-case")]
    KebabCase,
    #[serde(rename = "snake_case")]
    SnakeCase,
    #[serde(rename = "camelCase")]
    CamelCase,
    #[serde(rename = "PascalCase")]
    PascalCase,
}

impl NamingStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamingStyle::KebabCase => "kebab-case",
            NamingStyle::SnakeCase => "snake_case",
            NamingStyle::CamelCase => "camelCase",
            NamingStyle::PascalCase => "PascalCase",
        }
    }
}

impl fmt::Display for NamingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamingStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kebab-case" | "kebab" => Ok(NamingStyle::KebabCase),
            "snake_case" | "snake" => Ok(NamingStyle::SnakeCase),
            "camelCase" | "camel" => Ok(NamingStyle::CamelCase),
            "PascalCase" | "pascal" => Ok(NamingStyle::PascalCase),
            other => Err(ConfigError::UnknownNamingConvention(other.to_string())),
        }
    }
}

/// Naming convention plus the optional lowercase flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NamingConvention {
    #[serde(rename = "type")]
    pub style: NamingStyle,

    /// Only consulted by kebab-case and snake_case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowercase: Option<bool>,
}

impl NamingConvention {
    pub fn new(style: NamingStyle) -> Self {
        Self {
            style,
            lowercase: None,
        }
    }

    pub fn lowercase(style: NamingStyle) -> Self {
        Self {
            style,
            lowercase: Some(true),
        }
    }
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub exclude_patterns: Vec<String>,
    pub include_hidden: bool,
    pub dry_run: bool,
    pub generate_manifest: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_directory: Option<PathBuf>,
    pub naming_convention: NamingConvention,
    /// Checked in order; the first matching rule wins.
    pub categories: Vec<CategoryRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude_patterns: Vec::new(),
            include_hidden: false,
            dry_run: false,
            generate_manifest: true,
            target_directory: None,
            naming_convention: NamingConvention::lowercase(NamingStyle::KebabCase),
            categories: default_categories(),
        }
    }
}

/// Built-in categories used when a configuration does not declare any.
pub fn default_categories() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "images",
            &[
                ".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".bmp", ".tiff", ".ico",
                ".heic",
            ],
            Some("images"),
        ),
        CategoryRule::new(
            "documents",
            &[
                ".pdf", ".txt", ".doc", ".docx", ".md", ".rtf", ".odt", ".html", ".htm",
            ],
            Some("documents"),
        ),
        CategoryRule::new(
            "spreadsheets",
            &[".csv", ".xls", ".xlsx", ".ods"],
            Some("spreadsheets"),
        ),
        CategoryRule::new(
            "presentations",
            &[".ppt", ".pptx", ".odp", ".key"],
            Some("presentations"),
        ),
        CategoryRule::new(
            "audio",
            &[".mp3", ".wav", ".ogg", ".flac", ".aac", ".m4a", ".wma"],
            Some("audio"),
        ),
        CategoryRule::new(
            "videos",
            &[".mp4", ".mkv", ".avi", ".mov", ".flv", ".wmv", ".webm", ".3gp"],
            Some("videos"),
        ),
        CategoryRule::new(
            "archives",
            &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz"],
            Some("archives"),
        ),
        CategoryRule::new(
            "code",
            &[
                ".py", ".java", ".c", ".cpp", ".h", ".hpp", ".js", ".ts", ".rs", ".go", ".sh",
                ".json", ".xml", ".yaml", ".yml", ".toml",
            ],
            Some("code"),
        ),
        CategoryRule::new(
            "fonts",
            &[".ttf", ".otf", ".woff", ".woff2"],
            Some("fonts"),
        ),
    ]
}

/// Lowercases an extension and ensures it starts with a dot.
/// An empty input stays empty.
pub fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

impl Config {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.neatdir.toml` in the current directory
    /// 3. Look for `~/.config/neatdir/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists (or was explicitly
    /// requested) but cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(home_config) = Self::home_config_path()
            && home_config.exists()
        {
            return Self::load_from_file(&home_config);
        }

        Ok(Self::default())
    }

    /// `$HOME/.config/neatdir/config.toml`, if `HOME` is set.
    pub fn home_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("neatdir")
                .join("config.toml")
        })
    }

    /// Load configuration from a specific TOML or JSON file.
    ///
    /// Extensions in category rules are normalized after parsing.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = match extension.as_str() {
            "toml" => Self::from_toml_str(&content),
            "json" => Self::from_json_str(&content),
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    extension,
                });
            }
        }
        .map_err(|reason| ConfigError::ConfigInvalid {
            path: path.to_path_buf(),
            reason,
        })?;

        config.normalize();
        Ok(config)
    }

    fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    fn from_json_str(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    /// Normalizes category extensions in place.
    pub fn normalize(&mut self) {
        for category in &mut self.categories {
            category.extensions = category
                .extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .filter(|ext| !ext.is_empty())
                .collect();
        }
    }

    /// Checks the configuration before any file is touched.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: an unnamed category, an invalid glob
    /// in a category or in `excludePatterns`, a target folder that could
    /// leave the target root, or a relative target directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, category) in self.categories.iter().enumerate() {
            if category.name.trim().is_empty() {
                return Err(ConfigError::EmptyCategoryName { index });
            }
            for pattern in category.patterns.iter().flatten() {
                compile_glob(pattern)?;
            }
            if let Some(folder) = &category.target_folder
                && !is_contained_folder(folder)
            {
                return Err(ConfigError::InvalidTargetFolder {
                    category: category.name.clone(),
                    folder: folder.clone(),
                });
            }
        }

        for pattern in &self.exclude_patterns {
            compile_glob(pattern)?;
        }

        if let Some(target) = &self.target_directory
            && !target.is_absolute()
        {
            return Err(ConfigError::RelativeTargetDirectory(target.clone()));
        }

        Ok(())
    }

    /// Compile the hidden-file rule and exclude globs for the scanner.
    pub fn scan_filter(&self) -> Result<ScanFilter, ConfigError> {
        ScanFilter::new(self.include_hidden, &self.exclude_patterns)
    }

    /// Renders this configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Render(e.to_string()))
    }
}

/// A target folder must stay below the directory it is joined onto: not
/// empty, not absolute, and free of `..` components.
fn is_contained_folder(folder: &str) -> bool {
    let path = Path::new(folder);
    !folder.trim().is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
        && path.components().any(|component| matches!(component, Component::Normal(_)))
}

fn compile_glob(pattern: &str) -> Result<Pattern, ConfigError> {
    Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
        pattern: pattern.to_string(),
        reason: e.msg.to_string(),
    })
}

/// Compiled filter deciding which scanned paths are considered at all.
///
/// Paths handed to [`ScanFilter::should_include`] are relative to the scan
/// root, so a hidden root directory never hides its own contents.
#[derive(Debug, Clone)]
pub struct ScanFilter {
    include_hidden: bool,
    exclude_patterns: Vec<Pattern>,
}

impl ScanFilter {
    /// # Errors
    ///
    /// Returns an error if any glob pattern is invalid.
    pub fn new(include_hidden: bool, exclude_patterns: &[String]) -> Result<Self, ConfigError> {
        let exclude_patterns = exclude_patterns
            .iter()
            .map(|pattern| compile_glob(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            include_hidden,
            exclude_patterns,
        })
    }

    /// True if any component of the relative path starts with a dot.
    pub fn is_hidden(relative_path: &Path) -> bool {
        relative_path.components().any(|component| match component {
            Component::Normal(name) => name.to_string_lossy().starts_with('.'),
            _ => false,
        })
    }

    /// Whether a directory should be descended into. Hidden directories are
    /// skipped unless enabled, and so is any directory an exclude glob
    /// matches by relative path or by name.
    pub fn should_descend(&self, relative_dir: &Path) -> bool {
        if !self.include_hidden && Self::is_hidden(relative_dir) {
            return false;
        }
        !self.is_excluded(relative_dir)
    }

    /// Check if a file (relative to the scan root) should be scanned.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Hidden path segment - excluded unless hidden files are enabled
    /// 2. Exclude globs against the relative path and the bare filename
    /// 3. Exclude globs against every ancestor directory, so a pattern
    ///    naming a directory covers everything below it
    pub fn should_include(&self, relative_path: &Path) -> bool {
        if !self.include_hidden && Self::is_hidden(relative_path) {
            return false;
        }

        if self.is_excluded(relative_path) {
            return false;
        }

        !relative_path
            .ancestors()
            .skip(1)
            .filter(|ancestor| !ancestor.as_os_str().is_empty())
            .any(|ancestor| self.is_excluded(ancestor))
    }

    /// True if an exclude glob matches the relative path or its last component.
    fn is_excluded(&self, relative_path: &Path) -> bool {
        let name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path) || pattern.matches(&name))
    }
}
