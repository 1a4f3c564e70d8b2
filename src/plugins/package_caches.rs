use crate::plugin::{Plugin, CATEGORY_CACHE};

const DEFAULT_ROOTS: &[&str] = &[
    "~/.npm/_cacache",
    "~/Library/Caches/Yarn",
    "~/Library/Caches/pip",
    "~/Library/Caches/Homebrew",
    "~/.cache/pip",
    "~/.cache/yarn",
    "~/.cargo/registry/cache",
];

pub struct PackageCaches {
    roots: Vec<String>,
}

impl PackageCaches {
    pub fn new() -> Self {
        Self::with_roots(DEFAULT_ROOTS.iter().map(|r| r.to_string()))
    }

    pub fn with_roots(roots: impl IntoIterator<Item = String>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }
}

impl Default for PackageCaches {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PackageCaches {
    fn name(&self) -> &str {
        "package-caches"
    }

    fn label(&self) -> &str {
        "Package Manager Caches"
    }

    fn category(&self) -> &str {
        CATEGORY_CACHE
    }

    fn priority(&self) -> i32 {
        85
    }

    fn candidate_roots(&self) -> Vec<String> {
        self.roots.clone()
    }
}
