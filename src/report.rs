use crate::disk_info::DiskInfo;
use crate::record::{AnalysisResult, SafetyLevel};
use crate::topn::{ByReclaim, BySize, TopN};
use serde::Serialize;
use std::collections::BTreeMap;

/// A plugin-level failure, reported as data rather than raised.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PluginError {
    pub plugin: String,
    pub message: String,
}

/// Totals for one analysis category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub name: String,
    pub total_bytes: u64,
    pub file_count: u64,
    pub reclaimable_bytes: u64,
    pub files_by_level: BTreeMap<SafetyLevel, u64>,
    /// Per-entry access errors hit while walking this category's roots.
    pub access_errors: u64,
    pub plugins: Vec<String>,
    pub top_files: Vec<AnalysisResult>,
}

/// The engine's only output artifact.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub categories: Vec<CategorySummary>,
    /// Global top-N by size, independent of category.
    pub large_files: Vec<AnalysisResult>,
    /// Top-N by size among files past the configured age.
    pub old_files: Vec<AnalysisResult>,
    /// Clean, delete and review items ranked by reclaimable bytes.
    pub recommendations: Vec<AnalysisResult>,
    pub plugin_errors: Vec<PluginError>,
    /// True if the analysis was cancelled before every root was walked.
    pub incomplete: bool,
    pub total_bytes: u64,
    pub file_count: u64,
    pub reclaimable_bytes: u64,
    pub access_errors: u64,
    pub disk: Option<DiskInfo>,
    pub duration_ms: u64,
}

impl Report {
    pub fn category(&self, name: &str) -> Option<&CategorySummary> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Totals can be taken at face value: nothing was cancelled or unreachable.
    pub fn is_trustworthy(&self) -> bool {
        !self.incomplete && self.plugin_errors.is_empty()
    }
}

/// Running totals for one category. Accumulation is commutative, so partials
/// from different workers can merge in any order.
#[derive(Debug, Clone)]
pub(crate) struct CategoryAccumulator {
    name: String,
    priority: i32,
    total_bytes: u64,
    file_count: u64,
    reclaimable_bytes: u64,
    files_by_level: BTreeMap<SafetyLevel, u64>,
    access_errors: u64,
    plugins: Vec<String>,
    top_files: TopN<BySize>,
}

impl CategoryAccumulator {
    pub(crate) fn new(name: &str, plugin: &str, priority: i32, top_n: usize) -> Self {
        Self {
            name: name.to_string(),
            priority,
            total_bytes: 0,
            file_count: 0,
            reclaimable_bytes: 0,
            files_by_level: BTreeMap::new(),
            access_errors: 0,
            plugins: vec![plugin.to_string()],
            top_files: TopN::new(top_n),
        }
    }

    fn merge(&mut self, other: CategoryAccumulator) {
        self.priority = self.priority.max(other.priority);
        self.total_bytes += other.total_bytes;
        self.file_count += other.file_count;
        self.reclaimable_bytes += other.reclaimable_bytes;
        for (level, count) in other.files_by_level {
            *self.files_by_level.entry(level).or_default() += count;
        }
        self.access_errors += other.access_errors;
        for plugin in other.plugins {
            if !self.plugins.contains(&plugin) {
                self.plugins.push(plugin);
            }
        }
        self.top_files.merge(other.top_files);
    }

    fn into_summary(mut self) -> CategorySummary {
        self.plugins.sort();
        CategorySummary {
            name: self.name,
            total_bytes: self.total_bytes,
            file_count: self.file_count,
            reclaimable_bytes: self.reclaimable_bytes,
            files_by_level: self.files_by_level,
            access_errors: self.access_errors,
            plugins: self.plugins,
            top_files: self.top_files.into_sorted_vec().into_iter().map(|r| r.0).collect(),
        }
    }
}

/// Everything one worker gathered from one plugin/root pairing.
#[derive(Debug)]
pub(crate) struct Partial {
    category: CategoryAccumulator,
    large_files: TopN<BySize>,
    old_files: TopN<BySize>,
    recommendations: TopN<ByReclaim>,
}

impl Partial {
    pub(crate) fn new(category: CategoryAccumulator, top_n: usize) -> Self {
        Self {
            category,
            large_files: TopN::new(top_n),
            old_files: TopN::new(top_n),
            recommendations: TopN::new(top_n),
        }
    }

    pub(crate) fn add(&mut self, result: AnalysisResult, is_old: bool) {
        let cat = &mut self.category;
        cat.total_bytes += result.size();
        cat.file_count += 1;
        *cat.files_by_level.entry(result.level()).or_default() += 1;
        if result.recommendation().is_reclaimable() {
            cat.reclaimable_bytes += result.size();
        }

        if result.recommendation().is_actionable() {
            self.recommendations.push(ByReclaim(result.clone()));
        }
        if is_old {
            self.old_files.push(BySize(result.clone()));
        }
        self.large_files.push(BySize(result.clone()));
        cat.top_files.push(BySize(result));
    }

    pub(crate) fn add_access_errors(&mut self, count: u64) {
        self.category.access_errors += count;
    }

    pub(crate) fn file_count(&self) -> u64 {
        self.category.file_count
    }
}

/// The single serialization point where worker partials become a report.
#[derive(Debug)]
pub(crate) struct Aggregator {
    top_n: usize,
    categories: BTreeMap<String, CategoryAccumulator>,
    large_files: TopN<BySize>,
    old_files: TopN<BySize>,
    recommendations: TopN<ByReclaim>,
    plugin_errors: BTreeMap<String, Vec<String>>,
    incomplete: bool,
}

impl Aggregator {
    pub(crate) fn new(top_n: usize) -> Self {
        Self {
            top_n,
            categories: BTreeMap::new(),
            large_files: TopN::new(top_n),
            old_files: TopN::new(top_n),
            recommendations: TopN::new(top_n),
            plugin_errors: BTreeMap::new(),
            incomplete: false,
        }
    }

    /// Make sure a category shows up even if its roots held no files.
    pub(crate) fn touch_category(&mut self, name: &str, plugin: &str, priority: i32) {
        let fresh = CategoryAccumulator::new(name, plugin, priority, self.top_n);
        match self.categories.get_mut(name) {
            Some(existing) => existing.merge(fresh),
            None => {
                self.categories.insert(name.to_string(), fresh);
            }
        }
    }

    pub(crate) fn merge(&mut self, partial: Partial) {
        let name = partial.category.name.clone();
        match self.categories.get_mut(&name) {
            Some(existing) => existing.merge(partial.category),
            None => {
                self.categories.insert(name, partial.category);
            }
        }
        self.large_files.merge(partial.large_files);
        self.old_files.merge(partial.old_files);
        self.recommendations.merge(partial.recommendations);
    }

    pub(crate) fn plugin_error(&mut self, plugin: &str, message: impl Into<String>) {
        self.plugin_errors
            .entry(plugin.to_string())
            .or_default()
            .push(message.into());
    }

    pub(crate) fn mark_incomplete(&mut self) {
        self.incomplete = true;
    }

    pub(crate) fn category_snapshot(&self, name: &str) -> Option<CategorySummary> {
        self.categories.get(name).cloned().map(CategoryAccumulator::into_summary)
    }

    pub(crate) fn finish(self, disk: Option<DiskInfo>, duration_ms: u64) -> Report {
        let mut accumulators: Vec<CategoryAccumulator> = self.categories.into_values().collect();
        accumulators.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.name.cmp(&b.name)));
        let categories: Vec<CategorySummary> = accumulators
            .into_iter()
            .map(CategoryAccumulator::into_summary)
            .collect();

        // One entry per plugin, however many of its roots failed.
        let plugin_errors: Vec<PluginError> = self
            .plugin_errors
            .into_iter()
            .map(|(plugin, mut messages)| {
                messages.sort();
                messages.dedup();
                PluginError {
                    plugin,
                    message: messages.join("; "),
                }
            })
            .collect();

        Report {
            total_bytes: categories.iter().map(|c| c.total_bytes).sum(),
            file_count: categories.iter().map(|c| c.file_count).sum(),
            reclaimable_bytes: categories.iter().map(|c| c.reclaimable_bytes).sum(),
            access_errors: categories.iter().map(|c| c.access_errors).sum(),
            categories,
            large_files: self.large_files.into_sorted_vec().into_iter().map(|r| r.0).collect(),
            old_files: self.old_files.into_sorted_vec().into_iter().map(|r| r.0).collect(),
            recommendations: self
                .recommendations
                .into_sorted_vec()
                .into_iter()
                .map(|r| r.0)
                .collect(),
            plugin_errors,
            incomplete: self.incomplete,
            disk,
            duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{PathRecord, Recommendation};
    use std::path::PathBuf;
    use std::time::UNIX_EPOCH;

    fn result(path: &str, size: u64, level: SafetyLevel, rec: Recommendation) -> AnalysisResult {
        let record = PathRecord {
            path: PathBuf::from(path),
            size,
            modified: UNIX_EPOCH,
            is_hidden: false,
            is_directory: false,
        };
        AnalysisResult::new(record, 10, level, rec)
    }

    fn partial(category: &str, plugin: &str, priority: i32, items: &[(&str, u64)]) -> Partial {
        let mut p = Partial::new(CategoryAccumulator::new(category, plugin, priority, 2), 2);
        for (path, size) in items {
            p.add(result(path, *size, SafetyLevel::VerySafe, Recommendation::Delete), false);
        }
        p
    }

    #[test]
    fn merge_order_does_not_change_the_report() {
        let build = |order: [usize; 3]| {
            let parts = [
                ("cache", "a", 90, vec![("/c/1", 10u64), ("/c/2", 30)]),
                ("cache", "b", 80, vec![("/c/3", 20)]),
                ("logs", "l", 70, vec![("/l/1", 5)]),
            ];
            let mut agg = Aggregator::new(2);
            for i in order {
                let (cat, plugin, prio, items) = &parts[i];
                agg.merge(partial(cat, plugin, *prio, items));
            }
            agg.finish(None, 0)
        };

        let a = build([0, 1, 2]);
        let b = build([2, 1, 0]);
        assert_eq!(a.categories, b.categories);
        assert_eq!(a.large_files, b.large_files);
        assert_eq!(a.total_bytes, 65);
        assert_eq!(a.reclaimable_bytes, 65);

        let cache = a.category("cache").unwrap();
        assert_eq!(cache.file_count, 3);
        assert_eq!(cache.plugins, ["a", "b"]);
        let top: Vec<u64> = cache.top_files.iter().map(|r| r.size()).collect();
        assert_eq!(top, [30, 20]);
        assert_eq!(a.categories[0].name, "cache");
    }

    #[test]
    fn review_items_are_ranked_but_not_reclaimable() {
        let mut p = Partial::new(CategoryAccumulator::new("user", "d", 1, 5), 5);
        p.add(result("/d/a", 100, SafetyLevel::Moderate, Recommendation::Review), false);
        p.add(result("/d/b", 50, SafetyLevel::Important, Recommendation::Keep), true);
        let mut agg = Aggregator::new(5);
        agg.merge(p);
        let report = agg.finish(None, 0);
        assert_eq!(report.reclaimable_bytes, 0);
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.old_files.len(), 1);
        assert_eq!(report.large_files.len(), 2);
    }

    #[test]
    fn empty_categories_are_still_listed() {
        let mut agg = Aggregator::new(3);
        agg.touch_category("temp", "temp", 80);
        agg.plugin_error("logs", "root missing");
        let report = agg.finish(None, 0);
        assert_eq!(report.category("temp").unwrap().file_count, 0);
        assert!(!report.is_trustworthy());
    }

    #[test]
    fn errors_fold_into_one_entry_per_plugin() {
        let mut agg = Aggregator::new(3);
        agg.plugin_error("logs", "~/b: path does not exist");
        agg.plugin_error("temp", "/tmp/x: permission denied");
        agg.plugin_error("logs", "~/a: path does not exist");
        let report = agg.finish(None, 0);
        assert_eq!(report.plugin_errors.len(), 2);
        assert_eq!(report.plugin_errors[0].plugin, "logs");
        assert_eq!(
            report.plugin_errors[0].message,
            "~/a: path does not exist; ~/b: path does not exist"
        );
        assert_eq!(report.plugin_errors[1].plugin, "temp");
    }
}
