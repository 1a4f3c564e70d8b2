mod browser_cache;
mod custom;
mod development;
mod downloads;
mod logs;
mod package_caches;
mod system_cache;
mod temp;

pub use browser_cache::BrowserCache;
pub use custom::DirectoryPlugin;
pub use development::Development;
pub use downloads::Downloads;
pub use logs::Logs;
pub use package_caches::PackageCaches;
pub use system_cache::SystemCache;
pub use temp::Temp;

use crate::plugin::Plugin;
use std::sync::Arc;

/// Every built-in plugin, each with its own default priority.
pub fn builtin_plugins() -> Vec<Arc<dyn Plugin>> {
    vec![
        Arc::new(BrowserCache::new()),
        Arc::new(SystemCache::new()),
        Arc::new(PackageCaches::new()),
        Arc::new(Temp::new()),
        Arc::new(Logs::new()),
        Arc::new(Development::new()),
        Arc::new(Downloads::new()),
    ]
}

pub fn builtin_plugin_names() -> Vec<&'static str> {
    vec![
        "browser-cache",
        "system-cache",
        "package-caches",
        "temp",
        "logs",
        "development-tooling",
        "user-downloads",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::Path;

    #[test]
    fn builtins_have_unique_names_and_priorities() {
        let plugins = builtin_plugins();
        let names: Vec<&str> = plugins.iter().map(|p| p.name()).collect();
        assert_eq!(names, builtin_plugin_names());

        let priorities: HashSet<i32> = plugins.iter().map(|p| p.priority()).collect();
        assert_eq!(priorities.len(), plugins.len());
        assert!(plugins.iter().all(|p| !p.candidate_roots().is_empty()));
    }

    #[test]
    fn cache_and_temp_outrank_user_data() {
        let plugins = builtin_plugins();
        let priority = |name: &str| {
            plugins
                .iter()
                .find(|p| p.name() == name)
                .map(|p| p.priority())
                .unwrap()
        };
        assert!(priority("browser-cache") > priority("user-downloads"));
        assert!(priority("temp") > priority("user-downloads"));
        assert!(priority("system-cache") > priority("development-tooling"));
    }

    #[test]
    fn development_only_takes_xcarchives_under_archives() {
        let dev = Development::with_roots(["/dev-root".to_string()]);
        assert!(dev.accepts(Path::new("/x/Archives/2024-01-01/App.xcarchive/Info.plist")));
        assert!(!dev.accepts(Path::new("/x/Archives/2024-01-01/notes.txt")));
        assert!(dev.accepts(Path::new("/x/DerivedData/App-abc/Build/out.o")));
        assert!(!dev.accepts(Path::new("/x/DerivedData/App-abc/.git/HEAD")));
        assert!(!dev.descend_into(Path::new("/x/DerivedData/App-abc/.git")));
    }

    #[test]
    fn system_cache_leaves_browser_dirs_to_the_browser_plugin() {
        let cache = SystemCache::with_roots(["/c".to_string()]);
        assert!(!cache.descend_into(Path::new("/c/Google")));
        assert!(!cache.accepts(Path::new("/c/Firefox/Profiles/x/cache2/entry")));
        assert!(cache.accepts(Path::new("/c/com.example.app/blob")));
    }

    #[test]
    fn temp_skips_service_owned_entries() {
        let temp = Temp::with_roots(["/t".to_string(), "/t".to_string()]);
        assert_eq!(temp.candidate_roots(), vec!["/t".to_string()]);
        assert!(!temp.descend_into(Path::new("/t/com.apple.launchd.abc")));
        assert!(temp.accepts(Path::new("/t/scratch.tmp")));
    }
}
