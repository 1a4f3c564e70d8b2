use serde::Serialize;
use std::path::Path;

pub const CATEGORY_CACHE: &str = "cache";
pub const CATEGORY_LOGS: &str = "logs";
pub const CATEGORY_TEMP: &str = "temp";
pub const CATEGORY_DEVELOPMENT: &str = "development";
pub const CATEGORY_USER: &str = "user";

/// The capability every analysis plugin implements.
///
/// A plugin never touches the filesystem itself: it names where to look and
/// which of the walked paths it is responsible for. Scoring is left to the engine.
pub trait Plugin: Send + Sync {
    /// Machine-readable unique key (e.g. "browser-cache").
    fn name(&self) -> &str;

    /// Human-readable label for display (e.g. "Browser Caches").
    fn label(&self) -> &str;

    fn category(&self) -> &str;

    /// Higher runs first.
    fn priority(&self) -> i32;

    /// Path templates worth scanning, in order. May start with `~`.
    fn candidate_roots(&self) -> Vec<String>;

    /// Narrow responsibility beyond the root list. Called for every walked file.
    fn accepts(&self, _path: &Path) -> bool {
        true
    }

    /// Whether the walk should enter `dir` at all. Returning false prunes the
    /// whole subtree, so nothing below it is counted.
    fn descend_into(&self, _dir: &Path) -> bool {
        true
    }
}

/// Snapshot of a registered plugin, as exposed to UI layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginDescriptor {
    pub name: String,
    pub label: String,
    pub category: String,
    pub priority: i32,
    pub enabled: bool,
    #[serde(rename = "candidateRoots")]
    pub candidate_roots: Vec<String>,
}

impl PluginDescriptor {
    pub(crate) fn of(plugin: &dyn Plugin, enabled: bool) -> Self {
        Self {
            name: plugin.name().to_string(),
            label: plugin.label().to_string(),
            category: plugin.category().to_string(),
            priority: plugin.priority(),
            enabled,
            candidate_roots: plugin.candidate_roots(),
        }
    }
}

/// True when any directory component of `path` equals one of `names`.
pub(crate) fn has_component(path: &Path, names: &[&str]) -> bool {
    path.components()
        .any(|c| names.iter().any(|n| c.as_os_str() == *n))
}

/// `path` relative to whichever of `roots` contains it, or `path` itself.
/// Walked paths sit under canonical roots, so the canonical form of each root
/// is tried before the form as written.
pub(crate) fn relative_to_roots<'a>(path: &'a Path, roots: &[String]) -> &'a Path {
    roots
        .iter()
        .filter_map(|template| crate::utils::expand_tilde(template))
        .find_map(|root| {
            std::fs::canonicalize(&root)
                .ok()
                .and_then(|canonical| path.strip_prefix(canonical).ok())
                .or_else(|| path.strip_prefix(&root).ok())
        })
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_match_whole_names() {
        assert!(has_component(Path::new("a/Google/x"), &["Google"]));
        assert!(!has_component(Path::new("a/Googler/x"), &["Google"]));
    }

    #[test]
    fn roots_written_as_given_still_match() {
        let roots = vec!["/opt/caches".to_string()];
        assert_eq!(
            relative_to_roots(Path::new("/opt/caches/app/x"), &roots),
            Path::new("app/x")
        );
        assert_eq!(
            relative_to_roots(Path::new("/elsewhere/x"), &roots),
            Path::new("/elsewhere/x")
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_roots_match_canonical_paths() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        std::fs::create_dir_all(real.join("Google")).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let walked = std::fs::canonicalize(&real).unwrap().join("Google/x");
        let roots = vec![link.to_string_lossy().into_owned()];
        assert_eq!(relative_to_roots(&walked, &roots), Path::new("Google/x"));
    }
}
