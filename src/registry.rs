use crate::error::{EngineError, Result};
use crate::plugin::{Plugin, PluginDescriptor};
use crate::plugins;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

struct Registered {
    plugin: Arc<dyn Plugin>,
    enabled: bool,
}

/// Single source of truth for which plugins exist and which are enabled.
pub struct PluginRegistry {
    plugins: HashMap<String, Registered>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    /// A registry holding every built-in plugin, all enabled.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for plugin in plugins::builtin_plugins() {
            // built-in names are unique and every built-in declares roots
            let _ = registry.register(plugin);
        }
        registry
    }

    /// Register an enabled plugin. Never overwrites an existing name.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Result<()> {
        let name = plugin.name().to_string();
        if self.plugins.contains_key(&name) {
            return Err(EngineError::DuplicatePlugin(name));
        }
        if plugin.candidate_roots().is_empty() {
            return Err(EngineError::EmptyRoots(name));
        }
        self.plugins.insert(
            name,
            Registered {
                plugin,
                enabled: true,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(name).map(|r| r.plugin.clone())
    }

    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.plugins.get(name).map(|r| r.enabled)
    }

    /// Idempotent. Returns false for an unknown name.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.plugins.get_mut(name) {
            Some(registered) => {
                registered.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn enable(&mut self, name: &str) -> bool {
        self.set_enabled(name, true)
    }

    pub fn disable(&mut self, name: &str) -> bool {
        self.set_enabled(name, false)
    }

    /// Every category some registered plugin declares.
    pub fn categories(&self) -> BTreeSet<String> {
        self.plugins
            .values()
            .map(|r| r.plugin.category().to_string())
            .collect()
    }

    /// Enabled plugins matching the filters, by descending priority then name.
    ///
    /// A category no registered plugin declares, or an unknown plugin name, is an
    /// error. A known category whose plugins are all disabled just resolves empty.
    pub fn resolve(
        &self,
        categories: Option<&BTreeSet<String>>,
        names: Option<&BTreeSet<String>>,
    ) -> Result<Vec<Arc<dyn Plugin>>> {
        if let Some(categories) = categories {
            let known = self.categories();
            if let Some(unknown) = categories.iter().find(|c| !known.contains(*c)) {
                return Err(EngineError::UnknownCategory(unknown.clone()));
            }
        }
        if let Some(names) = names {
            if let Some(unknown) = names.iter().find(|n| !self.plugins.contains_key(*n)) {
                return Err(EngineError::UnknownPlugin(unknown.clone()));
            }
        }

        let mut resolved: Vec<Arc<dyn Plugin>> = self
            .plugins
            .values()
            .filter(|r| r.enabled)
            .filter(|r| categories.map_or(true, |c| c.contains(r.plugin.category())))
            .filter(|r| names.map_or(true, |n| n.contains(r.plugin.name())))
            .map(|r| r.plugin.clone())
            .collect();
        sort_by_priority(&mut resolved);
        Ok(resolved)
    }

    /// Descriptors for every registered plugin, in resolution order.
    pub fn descriptors(&self) -> Vec<PluginDescriptor> {
        let mut all: Vec<Arc<dyn Plugin>> = self.plugins.values().map(|r| r.plugin.clone()).collect();
        sort_by_priority(&mut all);
        all.iter()
            .map(|p| PluginDescriptor::of(p.as_ref(), self.plugins[p.name()].enabled))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_by_priority(plugins: &mut [Arc<dyn Plugin>]) {
    plugins.sort_by(|a, b| {
        b.priority()
            .cmp(&a.priority())
            .then_with(|| a.name().cmp(b.name()))
    });
}
