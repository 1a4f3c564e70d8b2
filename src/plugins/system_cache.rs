use crate::plugin::{has_component, relative_to_roots, Plugin, CATEGORY_CACHE};
use std::path::Path;

const DEFAULT_ROOTS: &[&str] = &["~/Library/Caches", "/Library/Caches", "~/.cache"];

/// Subdirectories owned by more specific plugins.
const EXCLUDED_SUBDIRS: &[&str] = &[
    "Homebrew",
    "Google",
    "Firefox",
    "com.apple.Safari",
    "com.microsoft.edgemac",
    "com.operasoftware.Opera",
    "BraveSoftware",
    "Yarn",
    "pip",
    "yarn",
];

pub struct SystemCache {
    roots: Vec<String>,
}

impl SystemCache {
    pub fn new() -> Self {
        Self::with_roots(DEFAULT_ROOTS.iter().map(|r| r.to_string()))
    }

    pub fn with_roots(roots: impl IntoIterator<Item = String>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }
}

impl Default for SystemCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for SystemCache {
    fn name(&self) -> &str {
        "system-cache"
    }

    fn label(&self) -> &str {
        "System Caches"
    }

    fn category(&self) -> &str {
        CATEGORY_CACHE
    }

    fn priority(&self) -> i32 {
        90
    }

    fn candidate_roots(&self) -> Vec<String> {
        self.roots.clone()
    }

    fn accepts(&self, path: &Path) -> bool {
        !has_component(relative_to_roots(path, &self.roots), EXCLUDED_SUBDIRS)
    }

    fn descend_into(&self, dir: &Path) -> bool {
        !has_component(relative_to_roots(dir, &self.roots), EXCLUDED_SUBDIRS)
    }
}
