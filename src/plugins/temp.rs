use crate::plugin::{Plugin, CATEGORY_TEMP};
use std::path::{Component, Path};

/// Entries owned by running system services.
const IN_USE_PREFIXES: &[&str] = &["com.apple.launchd", ".X11-unix", "systemd-private-", "tmux-"];

pub struct Temp {
    roots: Vec<String>,
}

impl Temp {
    pub fn new() -> Self {
        let system_temp = std::env::temp_dir().to_string_lossy().into_owned();
        Self::with_roots([system_temp, "/var/tmp".to_string(), "~/.Trash".to_string()])
    }

    pub fn with_roots(roots: impl IntoIterator<Item = String>) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for root in roots {
            if !unique.contains(&root) {
                unique.push(root);
            }
        }
        Self { roots: unique }
    }
}

impl Default for Temp {
    fn default() -> Self {
        Self::new()
    }
}

fn is_in_use(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => name
            .to_str()
            .is_some_and(|n| IN_USE_PREFIXES.iter().any(|p| n.starts_with(p))),
        _ => false,
    })
}

impl Plugin for Temp {
    fn name(&self) -> &str {
        "temp"
    }

    fn label(&self) -> &str {
        "Temporary Files & Trash"
    }

    fn category(&self) -> &str {
        CATEGORY_TEMP
    }

    fn priority(&self) -> i32 {
        80
    }

    fn candidate_roots(&self) -> Vec<String> {
        self.roots.clone()
    }

    fn accepts(&self, path: &Path) -> bool {
        !is_in_use(path)
    }

    fn descend_into(&self, dir: &Path) -> bool {
        !is_in_use(dir)
    }
}
