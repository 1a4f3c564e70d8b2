use crate::plugin::{Plugin, CATEGORY_CACHE};
use std::path::Path;

const DEFAULT_ROOTS: &[&str] = &[
    "~/Library/Caches/Google/Chrome",
    "~/Library/Caches/Firefox",
    "~/Library/Caches/com.apple.Safari",
    "~/Library/Caches/com.microsoft.edgemac",
    "~/Library/Caches/com.operasoftware.Opera",
    "~/Library/Caches/BraveSoftware",
];

/// Lock files a running browser holds open.
const LOCK_FILES: &[&str] = &["LOCK", "lockfile", "parent.lock", "SingletonLock"];

pub struct BrowserCache {
    roots: Vec<String>,
}

impl BrowserCache {
    pub fn new() -> Self {
        Self::with_roots(DEFAULT_ROOTS.iter().map(|r| r.to_string()))
    }

    pub fn with_roots(roots: impl IntoIterator<Item = String>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }
}

impl Default for BrowserCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for BrowserCache {
    fn name(&self) -> &str {
        "browser-cache"
    }

    fn label(&self) -> &str {
        "Browser Caches"
    }

    fn category(&self) -> &str {
        CATEGORY_CACHE
    }

    fn priority(&self) -> i32 {
        100
    }

    fn candidate_roots(&self) -> Vec<String> {
        self.roots.clone()
    }

    fn accepts(&self, path: &Path) -> bool {
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => !LOCK_FILES.contains(&name),
            None => false,
        }
    }
}
