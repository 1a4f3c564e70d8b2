use crate::plugin::{Plugin, CATEGORY_LOGS};
use std::path::Path;

const DEFAULT_ROOTS: &[&str] = &["~/Library/Logs", "/Library/Logs"];

pub struct Logs {
    roots: Vec<String>,
}

impl Logs {
    pub fn new() -> Self {
        Self::with_roots(DEFAULT_ROOTS.iter().map(|r| r.to_string()))
    }

    pub fn with_roots(roots: impl IntoIterator<Item = String>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }
}

impl Default for Logs {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for Logs {
    fn name(&self) -> &str {
        "logs"
    }

    fn label(&self) -> &str {
        "Application Logs"
    }

    fn category(&self) -> &str {
        CATEGORY_LOGS
    }

    fn priority(&self) -> i32 {
        70
    }

    fn candidate_roots(&self) -> Vec<String> {
        self.roots.clone()
    }

    // Log directories also hold per-app settings; only log-like files count.
    fn accepts(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        !matches!(ext.as_deref(), Some("plist" | "json" | "db"))
    }
}
