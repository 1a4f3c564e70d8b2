use crate::plugin::Plugin;
use std::path::Path;

/// A plugin assembled from plain data, for callers that inject their own
/// locations at construction time instead of using the built-in set.
#[derive(Debug, Clone)]
pub struct DirectoryPlugin {
    name: String,
    label: String,
    category: String,
    priority: i32,
    roots: Vec<String>,
    excluded_dirs: Vec<String>,
    extensions: Option<Vec<String>>,
}

impl DirectoryPlugin {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        priority: i32,
        roots: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            category: category.into(),
            priority,
            roots: roots.into_iter().map(Into::into).collect(),
            excluded_dirs: Vec::new(),
            extensions: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Directory names never entered (e.g. ".git").
    pub fn exclude_dirs(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded_dirs.extend(names.into_iter().map(Into::into));
        self
    }

    /// Only files with one of these extensions are accepted (case-insensitive, no dot).
    pub fn only_extensions(mut self, exts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extensions = Some(
            exts.into_iter()
                .map(|e| e.into().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        );
        self
    }

    fn is_excluded(&self, path: &Path) -> bool {
        path.components()
            .any(|c| self.excluded_dirs.iter().any(|d| c.as_os_str() == d.as_str()))
    }
}

impl Plugin for DirectoryPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn candidate_roots(&self) -> Vec<String> {
        self.roots.clone()
    }

    fn accepts(&self, path: &Path) -> bool {
        if self.is_excluded(path) {
            return false;
        }
        match &self.extensions {
            None => true,
            Some(allowed) => path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| allowed.iter().any(|a| a.eq_ignore_ascii_case(e))),
        }
    }

    fn descend_into(&self, dir: &Path) -> bool {
        !self.is_excluded(dir)
    }
}
