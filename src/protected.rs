use crate::utils;
use std::path::{Path, PathBuf};

/// System locations that must never be classified below important.
const SYSTEM_PATHS: &[&str] = &[
    "/System",
    "/usr",
    "/bin",
    "/sbin",
    "/etc",
    "/dev",
    "/cores",
    "/boot",
    "/proc",
    "/sys",
    "/Library/Keychains",
    "/Library/Preferences",
    "/Library/Frameworks",
    "/Library/Extensions",
    "/Library/LaunchAgents",
    "/Library/LaunchDaemons",
    "/Library/Application Support",
    "/private/etc",
    "/private/var/db",
    "/private/var/root",
    "/var/db",
    "/var/root",
    "/var/log",
    "/.Spotlight-V100",
    "/.fseventsd",
];

/// Per-user locations holding credentials or app state.
const USER_PATHS: &[&str] = &[
    "~/.ssh",
    "~/.gnupg",
    "~/.aws",
    "~/.kube",
    "~/Library/Keychains",
    "~/Library/Preferences",
    "~/Library/Application Support",
    "~/Library/Group Containers",
    "~/Library/Mobile Documents",
    "~/Library/Mail",
    "~/Library/Messages",
    "~/Library/Safari",
];

/// Read-only set of protected path prefixes.
///
/// Built once when an engine is constructed. Every prefix is stored in both its
/// literal absolute form and its canonical form, so `/etc` also covers
/// `/private/etc` where that is what the filesystem resolves it to.
#[derive(Debug, Clone)]
pub struct ProtectedPathSet {
    prefixes: Vec<PathBuf>,
}

impl ProtectedPathSet {
    /// The static defaults plus caller-supplied additions (`~` is expanded).
    pub fn with_defaults<I, P>(additions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let defaults = SYSTEM_PATHS
            .iter()
            .chain(USER_PATHS)
            .filter_map(|template| utils::expand_tilde(template));
        let extra = additions.into_iter().filter_map(|p| {
            let p = p.as_ref();
            match p.to_str() {
                Some(s) => utils::expand_tilde(s),
                None => Some(p.to_path_buf()),
            }
        });
        Self::from_prefixes(defaults.chain(extra))
    }

    /// Only the given prefixes, no defaults.
    pub fn from_prefixes<I>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut all = Vec::new();
        for prefix in prefixes {
            if !prefix.is_absolute() {
                continue;
            }
            if let Ok(canonical) = prefix.canonicalize() {
                if canonical != prefix {
                    all.push(canonical);
                }
            }
            all.push(prefix);
        }
        all.sort();
        all.dedup();
        Self { prefixes: all }
    }

    /// Returns the protected prefix covering `path`, if any.
    /// Matching is per path component, so `/usr` does not cover `/usrdata`.
    pub fn matching_prefix(&self, path: &Path) -> Option<&Path> {
        self.prefixes
            .iter()
            .find(|prefix| path.starts_with(prefix))
            .map(PathBuf::as_path)
    }

    pub fn is_protected(&self, path: &Path) -> bool {
        self.matching_prefix(path).is_some()
    }

    pub fn prefixes(&self) -> &[PathBuf] {
        &self.prefixes
    }
}

impl Default for ProtectedPathSet {
    fn default() -> Self {
        Self::with_defaults(std::iter::empty::<PathBuf>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_whole_components_only() {
        let set = ProtectedPathSet::from_prefixes([PathBuf::from("/opt/secure")]);
        assert!(set.is_protected(Path::new("/opt/secure")));
        assert!(set.is_protected(Path::new("/opt/secure/keys/id")));
        assert!(!set.is_protected(Path::new("/opt/securely")));
        assert!(!set.is_protected(Path::new("/opt")));
    }

    #[test]
    fn defaults_cover_system_locations() {
        let set = ProtectedPathSet::default();
        assert!(set.is_protected(Path::new("/System/Library/CoreServices")));
        assert!(set.is_protected(Path::new("/usr/bin/env")));
        assert!(!set.is_protected(Path::new("/usrdata/file")));
    }

    #[test]
    fn additions_are_kept_and_relative_prefixes_ignored() {
        let set = ProtectedPathSet::with_defaults(["/srv/vault", "relative/path"]);
        assert!(set.is_protected(Path::new("/srv/vault/a")));
        assert!(!set.prefixes().iter().any(|p| p.is_relative()));
    }
}
