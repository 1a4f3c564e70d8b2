use crate::plugin::{has_component, Plugin, CATEGORY_DEVELOPMENT};
use std::path::Path;

const DEFAULT_ROOTS: &[&str] = &[
    "~/Library/Developer/Xcode/DerivedData",
    "~/Library/Developer/Xcode/Archives",
    "~/Library/Developer/Xcode/iOS DeviceSupport",
    "~/Library/Developer/CoreSimulator/Devices",
    "~/Library/Containers/com.docker.docker/Data/vms",
];

/// Version-control state is never build output.
const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// Tooling artifacts: Xcode derived data, archives, device support, simulators
/// and container VM images.
pub struct Development {
    roots: Vec<String>,
}

impl Development {
    pub fn new() -> Self {
        Self::with_roots(DEFAULT_ROOTS.iter().map(|r| r.to_string()))
    }

    pub fn with_roots(roots: impl IntoIterator<Item = String>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }
}

impl Default for Development {
    fn default() -> Self {
        Self::new()
    }
}

fn in_archives(path: &Path) -> bool {
    has_component(path, &["Archives"])
}

fn in_xcarchive(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|n| n.ends_with(".xcarchive"))
    })
}

impl Plugin for Development {
    fn name(&self) -> &str {
        "development-tooling"
    }

    fn label(&self) -> &str {
        "Developer Tooling"
    }

    fn category(&self) -> &str {
        CATEGORY_DEVELOPMENT
    }

    fn priority(&self) -> i32 {
        60
    }

    fn candidate_roots(&self) -> Vec<String> {
        self.roots.clone()
    }

    // Under Archives only whole .xcarchive bundles count.
    fn accepts(&self, path: &Path) -> bool {
        if has_component(path, VCS_DIRS) {
            return false;
        }
        !in_archives(path) || in_xcarchive(path)
    }

    fn descend_into(&self, dir: &Path) -> bool {
        !has_component(dir, VCS_DIRS)
    }
}
