use crate::plugin::{has_component, Plugin, CATEGORY_USER};
use std::path::Path;

const SKIP_DIRS: &[&str] = &[".git", "node_modules"];

/// The user's Downloads folder. Lowest priority: everything here needs review.
pub struct Downloads {
    roots: Vec<String>,
}

impl Downloads {
    pub fn new() -> Self {
        Self::with_roots(["~/Downloads".to_string()])
    }

    pub fn with_roots(roots: impl IntoIterator<Item = String>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }
}

impl Default for Downloads {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for Downloads {
    fn name(&self) -> &str {
        "user-downloads"
    }

    fn label(&self) -> &str {
        "Downloads"
    }

    fn category(&self) -> &str {
        CATEGORY_USER
    }

    fn priority(&self) -> i32 {
        10
    }

    fn candidate_roots(&self) -> Vec<String> {
        self.roots.clone()
    }

    fn accepts(&self, path: &Path) -> bool {
        !has_component(path, SKIP_DIRS)
    }

    fn descend_into(&self, dir: &Path) -> bool {
        !has_component(dir, SKIP_DIRS)
    }
}
