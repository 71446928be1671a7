//! Filename normalization under a naming convention.
//!
//! Only the stem is rewritten. The extension (text after the last dot) is
//! lowercased and reattached, and leading dots of hidden files are kept as
//! they are. Every transform is idempotent: applying it to its own output
//! returns that output unchanged.
//!
//! ```
//! use neatdir::config::{NamingConvention, NamingStyle};
//! use neatdir::naming::apply_convention;
//!
//! let kebab = NamingConvention::lowercase(NamingStyle::KebabCase);
//! assert_eq!(apply_convention("Test File.TXT", &kebab), "test-file.txt");
//!
//! let pascal = NamingConvention::new(NamingStyle::PascalCase);
//! assert_eq!(apply_convention("my_file_name", &pascal), "MyFileName");
//! ```

use crate::config::{NamingConvention, NamingStyle};
use regex::Regex;
use std::sync::LazyLock;

static CASE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid case boundary regex"));
static KEBAB_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_]+").expect("valid kebab separator regex"));
static KEBAB_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9-]").expect("valid kebab strip regex"));
static SNAKE_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s-]+").expect("valid snake separator regex"));
static SNAKE_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid snake strip regex"));

/// A filename split into hidden-file prefix, stem and extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FilenameParts<'a> {
    /// Leading dots, e.g. `"."` for `.env`.
    prefix: &'a str,
    stem: &'a str,
    /// Includes the dot; empty when there is no extension.
    extension: &'a str,
}

fn split_filename(filename: &str) -> FilenameParts<'_> {
    let body = filename.trim_start_matches('.');
    let prefix = &filename[..filename.len() - body.len()];

    match body.rfind('.') {
        Some(idx) if idx + 1 < body.len() => FilenameParts {
            prefix,
            stem: &body[..idx],
            extension: &body[idx..],
        },
        _ => FilenameParts {
            prefix,
            stem: body,
            extension: "",
        },
    }
}

/// Returns `filename` rewritten under `convention`.
pub fn apply_convention(filename: &str, convention: &NamingConvention) -> String {
    let parts = split_filename(filename);

    let mut stem = match convention.style {
        NamingStyle::KebabCase => to_kebab(parts.stem),
        NamingStyle::SnakeCase => to_snake(parts.stem),
        NamingStyle::CamelCase => to_camel(parts.stem),
        NamingStyle::PascalCase => to_pascal(parts.stem),
    };

    if convention.lowercase == Some(true)
        && matches!(
            convention.style,
            NamingStyle::KebabCase | NamingStyle::SnakeCase
        )
    {
        stem = stem.to_lowercase();
    }

    // Nothing survived the transform (e.g. only symbols): keep the old stem.
    if stem.is_empty() {
        stem = parts.stem.to_string();
    }

    format!("{}{}{}", parts.prefix, stem, parts.extension.to_lowercase())
}

/// True when [`apply_convention`] would change `filename`.
pub fn needs_rename(filename: &str, convention: &NamingConvention) -> bool {
    apply_convention(filename, convention) != filename
}

fn to_kebab(stem: &str) -> String {
    let spaced = CASE_BOUNDARY.replace_all(stem, "${1}-${2}");
    let joined = KEBAB_SEPARATORS.replace_all(&spaced, "-");
    KEBAB_DISALLOWED.replace_all(&joined, "").to_lowercase()
}

fn to_snake(stem: &str) -> String {
    let spaced = CASE_BOUNDARY.replace_all(stem, "${1}_${2}");
    let joined = SNAKE_SEPARATORS.replace_all(&spaced, "_");
    SNAKE_DISALLOWED.replace_all(&joined, "").to_lowercase()
}

fn is_separator(ch: char) -> bool {
    ch == '-' || ch == '_' || ch.is_whitespace()
}

/// All-caps word such as `README` or `TAX RETURN`.
fn is_shouting(stem: &str) -> bool {
    stem.chars().next().is_some_and(char::is_uppercase) && !stem.chars().any(char::is_lowercase)
}

/// Deletes each separator run and uppercases the character after it.
/// Trailing separators are dropped.
fn collapse_separators(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_upper = false;
    for ch in s.chars() {
        if is_separator(ch) {
            pending_upper = true;
        } else if pending_upper {
            out.extend(ch.to_uppercase());
            pending_upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Collapses separators and drops any dots the collapse exposed at the
/// front. A leading dot would read as a hidden-file prefix on the next pass.
fn collapse_words(s: &str) -> String {
    collapse_separators(s).trim_start_matches('.').to_string()
}

fn map_first(s: &str, upper: bool) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if upper => first.to_uppercase().chain(chars).collect(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn to_camel(stem: &str) -> String {
    // Stems with word separators (or all-caps stems) are lowercased before
    // collapsing. Separator-free mixed-case stems keep their interior
    // capitals so existing camelCase names are fixed points.
    let base = if stem.chars().any(is_separator) || is_shouting(stem) {
        stem.to_lowercase()
    } else {
        stem.to_string()
    };
    map_first(&collapse_words(&base), false)
}

fn to_pascal(stem: &str) -> String {
    map_first(&collapse_words(stem), true)
}
