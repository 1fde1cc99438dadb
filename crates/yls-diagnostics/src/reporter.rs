use core::time::Duration;

use crate::diagnostics::YamlLsError;

/// Whether a schema was served from the on-disk byte cache or fetched fresh.
///
/// Mirrors `yls_fetch::CacheStatus` but is kept free of that crate's HTTP
/// dependency so callers that only want to report results don't need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    Disabled,
}

/// A document that was checked and the schema it resolved to.
pub struct CheckedFile {
    pub path: String,
    pub schema: String,
    /// `None` for builtin/local schemas; `Some` for remotely fetched ones.
    pub cache_status: Option<CacheStatus>,
}

/// Result of a `validate` run over one or more files.
pub struct CheckResult {
    pub errors: Vec<YamlLsError>,
    pub checked: Vec<CheckedFile>,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn files_checked(&self) -> usize {
        self.checked.len()
    }
}

/// Format a verbose line for a checked file, including its cache status tag.
pub fn format_checked_verbose(file: &CheckedFile) -> String {
    let schema_tag = match file.cache_status {
        Some(CacheStatus::Hit) => " [cached]",
        Some(CacheStatus::Miss | CacheStatus::Disabled) => " [fetched]",
        None => "",
    };
    format!("  {} ({}){schema_tag}", file.path, file.schema)
}

/// Trait for formatting and outputting check results.
pub trait Reporter {
    /// Called after all checks complete with the full result and elapsed time.
    fn report(&mut self, result: CheckResult, elapsed: Duration);

    /// Called each time a file is checked (for streaming progress).
    fn on_file_checked(&mut self, file: &CheckedFile);
}
