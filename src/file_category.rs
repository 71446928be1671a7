//! File categorization by extension and optional filename pattern.
//!
//! Categories come from configuration as an ordered list of
//! [`CategoryRule`]s. The first rule that accepts a file wins, so rules
//! declared earlier take priority when extensions overlap.
//!
//! # Examples
//!
//! ```
//! use neatdir::config::CategoryRule;
//! use neatdir::file_category::categorize;
//!
//! let rules = vec![
//!     CategoryRule::new("reports", &[".pdf"], Some("Reports")).with_patterns(&["report-*"]),
//!     CategoryRule::new("documents", &[".pdf", ".txt"], Some("Documents")),
//! ];
//!
//! assert_eq!(categorize(".pdf", "report-q3.pdf", &rules).map(|r| r.name.as_str()), Some("reports"));
//! assert_eq!(categorize(".PDF", "invoice.PDF", &rules).map(|r| r.name.as_str()), Some("documents"));
//! assert!(categorize(".exe", "setup.exe", &rules).is_none());
//! ```

use crate::config::CategoryRule;
use glob::Pattern;

/// Returns the first rule whose extension set contains `extension` and,
/// when the rule declares patterns, whose patterns match `filename`.
///
/// A rule whose extension matches but whose patterns all fail is skipped;
/// later rules are still considered. No match is a normal outcome.
pub fn categorize<'a>(
    extension: &str,
    filename: &str,
    rules: &'a [CategoryRule],
) -> Option<&'a CategoryRule> {
    rules
        .iter()
        .find(|rule| has_extension(rule, extension) && matches_patterns(rule, filename))
}

/// Case-insensitive extension membership. An empty extension never matches.
fn has_extension(rule: &CategoryRule, extension: &str) -> bool {
    if extension.is_empty() {
        return false;
    }
    rule.extensions
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(extension))
}

/// True if the rule has no patterns or `filename` matches one of them.
/// Patterns that fail to compile never match.
fn matches_patterns(rule: &CategoryRule, filename: &str) -> bool {
    match &rule.patterns {
        None => true,
        Some(patterns) => patterns.iter().any(|pattern| {
            Pattern::new(pattern)
                .map(|compiled| compiled.matches(filename))
                .unwrap_or(false)
        }),
    }
}

/// Extracts the lowercase, dot-prefixed extension from a filename.
///
/// Hidden files with no further dot (".bashrc") and names ending in a dot
/// have no extension.
///
/// ```
/// use neatdir::file_category::extension_of;
///
/// assert_eq!(extension_of("Photo.JPG"), ".jpg");
/// assert_eq!(extension_of("archive.tar.gz"), ".gz");
/// assert_eq!(extension_of("Makefile"), "");
/// assert_eq!(extension_of(".bashrc"), "");
/// ```
pub fn extension_of(filename: &str) -> String {
    let body = filename.trim_start_matches('.');
    match body.rfind('.') {
        Some(idx) if idx + 1 < body.len() => body[idx..].to_lowercase(),
        _ => String::new(),
    }
}
