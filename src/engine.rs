use crate::config::EngineConfig;
use crate::disk_info;
use crate::error::{EngineError, Rejection, Result};
use crate::plugin::{Plugin, PluginDescriptor};
use crate::protected::ProtectedPathSet;
use crate::record::{AnalysisResult, PathRecord};
use crate::registry::PluginRegistry;
use crate::report::{Aggregator, CategoryAccumulator, CategorySummary, Partial, Report};
use crate::scorer::SafetyScorer;
use crate::utils;
use crate::validator::PathValidator;
use crate::walker::{self, DirectoryWalker, WalkSummary};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Instant, SystemTime};
use tracing::{debug, info, warn};

pub use crate::walker::CancelToken;

/// What to analyze. `None` filters mean "everything enabled".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub categories: Option<BTreeSet<String>>,
    pub plugins: Option<BTreeSet<String>>,
    /// Narrow every plugin to these locations. An empty list behaves like `None`.
    pub paths: Option<Vec<String>>,
}

impl AnalysisRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn plugins<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plugins = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }
}

/// Optional progress hooks. Called from worker threads; the engine's results
/// never depend on what an observer does.
pub trait AnalysisObserver: Send + Sync {
    fn root_started(&self, _plugin: &str, _root: &Path) {}

    fn root_finished(&self, _plugin: &str, _root: &Path, _files: u64) {}

    /// Every root of the category has been walked (or skipped).
    fn category_complete(&self, _summary: &CategorySummary) {}
}

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    RootStarted { plugin: String, root: PathBuf },
    RootFinished { plugin: String, root: PathBuf, files: u64 },
    CategoryComplete(CategorySummary),
}

/// Forwards progress over a channel, for UI layers polling from another thread.
pub struct ChannelObserver {
    tx: Mutex<mpsc::Sender<ProgressEvent>>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self::from_sender(tx), rx)
    }

    pub fn from_sender(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx: Mutex::new(tx) }
    }

    fn send(&self, event: ProgressEvent) {
        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        // a dropped receiver just means nobody is listening any more
        let _ = tx.send(event);
    }
}

impl AnalysisObserver for ChannelObserver {
    fn root_started(&self, plugin: &str, root: &Path) {
        self.send(ProgressEvent::RootStarted {
            plugin: plugin.to_string(),
            root: root.to_path_buf(),
        });
    }

    fn root_finished(&self, plugin: &str, root: &Path, files: u64) {
        self.send(ProgressEvent::RootFinished {
            plugin: plugin.to_string(),
            root: root.to_path_buf(),
            files,
        });
    }

    fn category_complete(&self, summary: &CategorySummary) {
        self.send(ProgressEvent::CategoryComplete(summary.clone()));
    }
}

/// One plugin/root pairing, the unit of work handed to the pool.
struct Job {
    plugin: Arc<dyn Plugin>,
    root: PathBuf,
}

struct Shared {
    aggregator: Aggregator,
    pending: HashMap<String, usize>,
}

/// Read-only analysis over the plugin set. Nothing here writes to the filesystem.
pub struct AnalysisEngine {
    registry: RwLock<PluginRegistry>,
    protected: Arc<ProtectedPathSet>,
    validator: PathValidator,
    allowed_roots: Vec<PathBuf>,
    config: EngineConfig,
    observer: Option<Arc<dyn AnalysisObserver>>,
}

impl AnalysisEngine {
    /// An engine over every built-in plugin.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_registry(config, PluginRegistry::with_builtins())
    }

    pub fn with_registry(config: EngineConfig, registry: PluginRegistry) -> Result<Self> {
        config.validate()?;
        let protected = Arc::new(ProtectedPathSet::with_defaults(&config.protected_paths));
        let allowed_roots = config
            .allowed_roots
            .iter()
            .filter_map(|root| match root.to_str() {
                Some(s) => utils::expand_tilde(s),
                None => Some(root.clone()),
            })
            .collect();
        Ok(Self {
            registry: RwLock::new(registry),
            validator: PathValidator::new(protected.clone()),
            protected,
            allowed_roots,
            config,
            observer: None,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn AnalysisObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn protected(&self) -> &ProtectedPathSet {
        &self.protected
    }

    pub fn list_plugins(&self) -> Vec<PluginDescriptor> {
        self.registry().descriptors()
    }

    /// Applies to the next analysis; a running one keeps its snapshot.
    pub fn set_plugin_enabled(&self, name: &str, enabled: bool) -> bool {
        let changed = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_enabled(name, enabled);
        if changed {
            debug!(plugin = name, enabled, "plugin toggled");
        }
        changed
    }

    pub fn register_plugin(&self, plugin: Arc<dyn Plugin>) -> Result<()> {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(plugin)
    }

    /// Pre-check a user-chosen path against the protected set and allowed roots.
    pub fn validate_path(&self, path: &str) -> std::result::Result<PathBuf, Rejection> {
        self.validator.validate(path, &self.allowed_roots)
    }

    pub fn analyze(&self, request: &AnalysisRequest) -> Result<Report> {
        self.analyze_with_cancel(request, &CancelToken::new())
    }

    /// Run one analysis. Only invalid filters or paths fail the call; per-entry
    /// and per-plugin problems end up in the report.
    pub fn analyze_with_cancel(&self, request: &AnalysisRequest, cancel: &CancelToken) -> Result<Report> {
        let started = Instant::now();
        let plugins = self
            .registry()
            .resolve(request.categories.as_ref(), request.plugins.as_ref())?;
        let scopes = self.validate_scopes(request)?;
        let scorer = SafetyScorer::new(self.protected.clone(), self.config.scoring.clone())
            .at(SystemTime::now());

        let mut aggregator = Aggregator::new(self.config.top_n);
        let mut pending: HashMap<String, usize> = HashMap::new();
        let mut jobs = Vec::new();
        for plugin in &plugins {
            let (roots, problem) = self.plugin_roots(plugin.as_ref(), scopes.as_deref());
            if roots.is_empty() && problem.is_none() {
                continue;
            }
            aggregator.touch_category(plugin.category(), plugin.name(), plugin.priority());
            if let Some(message) = problem {
                warn!(plugin = plugin.name(), %message, "skipping candidate roots");
                aggregator.plugin_error(plugin.name(), message);
            }
            *pending.entry(plugin.category().to_string()).or_default() += roots.len();
            jobs.extend(roots.into_iter().map(|root| Job {
                plugin: plugin.clone(),
                root,
            }));
        }

        let workers = self.config.effective_workers();
        info!(
            plugins = plugins.len(),
            roots = jobs.len(),
            workers,
            "analysis started"
        );

        if let Some(observer) = &self.observer {
            for (category, _) in pending.iter().filter(|(_, n)| **n == 0) {
                if let Some(summary) = aggregator.category_snapshot(category) {
                    observer.category_complete(&summary);
                }
            }
        }

        let disk = jobs
            .first()
            .and_then(|job| disk_info::disk_usage(&job.root))
            .or_else(|| disk_info::disk_usage(Path::new("/")));

        let shared = Mutex::new(Shared {
            aggregator,
            pending,
        });
        let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
        pool.install(|| {
            jobs.par_iter().for_each(|job| {
                let (partial, summary) = self.run_job(job, &scorer, cancel);
                self.finish_job(job, partial, summary, &shared);
            })
        });

        let mut aggregator = shared.into_inner().unwrap_or_else(PoisonError::into_inner).aggregator;
        if cancel.is_cancelled() {
            warn!("analysis cancelled, report is incomplete");
            aggregator.mark_incomplete();
        }
        let report = aggregator.finish(disk, started.elapsed().as_millis() as u64);
        info!(
            files = report.file_count,
            bytes = report.total_bytes,
            reclaimable = report.reclaimable_bytes,
            plugin_errors = report.plugin_errors.len(),
            incomplete = report.incomplete,
            "analysis finished"
        );
        Ok(report)
    }

    /// Classify a single path. The recommendation is `Skip` unless some enabled
    /// plugin is responsible for the path.
    pub fn analyze_file(&self, path: &str) -> Result<AnalysisResult> {
        let resolved = self
            .validate_path(path)
            .map_err(|reason| EngineError::InvalidPath {
                path: path.to_string(),
                reason,
            })?;
        let record = walker::stat_record(&resolved).map_err(|e| EngineError::InvalidPath {
            path: path.to_string(),
            reason: Rejection::Malformed(e.to_string()),
        })?;
        let plugins = self.registry().resolve(None, None)?;
        let covered = plugins.iter().any(|p| self.covers(p.as_ref(), &record.path));
        let scorer = SafetyScorer::new(self.protected.clone(), self.config.scoring.clone());
        Ok(scorer.classify(record, covered))
    }

    fn registry(&self) -> std::sync::RwLockReadGuard<'_, PluginRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn validate_scopes(&self, request: &AnalysisRequest) -> Result<Option<Vec<PathBuf>>> {
        let Some(paths) = request.paths.as_ref().filter(|p| !p.is_empty()) else {
            return Ok(None);
        };
        paths
            .iter()
            .map(|path| {
                self.validate_path(path)
                    .map_err(|reason| EngineError::InvalidPath {
                        path: path.clone(),
                        reason,
                    })
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// Expanded, narrowed and validated roots for one plugin, plus one message
    /// describing the candidates that cannot be walked. Missing roots are only
    /// a problem when nothing else is usable.
    fn plugin_roots(
        &self,
        plugin: &dyn Plugin,
        scopes: Option<&[PathBuf]>,
    ) -> (Vec<PathBuf>, Option<String>) {
        let mut candidates = Vec::new();
        let mut failures = Vec::new();
        let mut missing = Vec::new();
        for template in plugin.candidate_roots() {
            let Some(root) = utils::expand_tilde(&template) else {
                failures.push(format!("{template}: home directory is unknown"));
                continue;
            };
            match scopes {
                None => candidates.push(root),
                Some(scopes) => candidates.extend(intersect(&root, scopes)),
            }
        }

        let mut valid = Vec::new();
        for root in candidates {
            match self.validator.validate_path(&root, &self.allowed_roots) {
                Ok(resolved) => valid.push(resolved),
                Err(Rejection::NotFound) => {
                    debug!(plugin = plugin.name(), root = %root.display(), "candidate root missing");
                    missing.push(format!("{}: {}", utils::display_path(&root), Rejection::NotFound));
                }
                Err(reason) => {
                    failures.push(format!("{}: {}", utils::display_path(&root), reason))
                }
            }
        }

        if valid.is_empty() {
            failures.extend(missing);
        }
        let problem = (!failures.is_empty()).then(|| failures.join("; "));
        (outermost(valid), problem)
    }

    fn run_job(&self, job: &Job, scorer: &SafetyScorer, cancel: &CancelToken) -> (Partial, WalkSummary) {
        let plugin = job.plugin.as_ref();
        if let Some(observer) = &self.observer {
            observer.root_started(plugin.name(), &job.root);
        }

        let top_n = self.config.top_n;
        let mut partial = Partial::new(
            CategoryAccumulator::new(plugin.category(), plugin.name(), plugin.priority(), top_n),
            top_n,
        );
        let mut walk = DirectoryWalker::new()
            .max_depth(self.config.max_depth)
            .walk(&job.root, cancel);

        while let Some(record) = walk.next() {
            if record.is_directory {
                if record.path != job.root && !plugin.descend_into(&record.path) {
                    walk.skip_current_dir();
                }
                continue;
            }
            if !plugin.accepts(&record.path) {
                continue;
            }
            let is_old = self.is_old(&record, scorer.now());
            partial.add(scorer.classify(record, true), is_old);
        }

        let summary = walk.summary();
        partial.add_access_errors(summary.error_count as u64);
        debug!(
            plugin = plugin.name(),
            root = %job.root.display(),
            files = partial.file_count(),
            errors = summary.error_count,
            links = summary.links_skipped,
            "root walked"
        );
        (partial, summary)
    }

    fn finish_job(&self, job: &Job, partial: Partial, summary: WalkSummary, shared: &Mutex<Shared>) {
        let plugin = job.plugin.as_ref();
        let files = partial.file_count();
        let completed = {
            let mut shared = shared.lock().unwrap_or_else(PoisonError::into_inner);
            if summary.root_failed {
                let message = summary
                    .errors
                    .first()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "root could not be read".to_string());
                warn!(plugin = plugin.name(), root = %job.root.display(), %message, "root unreadable");
                shared.aggregator.plugin_error(
                    plugin.name(),
                    format!("{}: {}", utils::display_path(&job.root), message),
                );
            }
            if summary.cancelled {
                shared.aggregator.mark_incomplete();
            }
            shared.aggregator.merge(partial);

            let remaining = shared.pending.entry(plugin.category().to_string()).or_insert(1);
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                shared.aggregator.category_snapshot(plugin.category())
            } else {
                None
            }
        };

        if let Some(summary) = &completed {
            info!(
                category = %summary.name,
                files = summary.file_count,
                bytes = summary.total_bytes,
                "category complete"
            );
        }
        if let Some(observer) = &self.observer {
            observer.root_finished(plugin.name(), &job.root, files);
            if let Some(summary) = &completed {
                observer.category_complete(summary);
            }
        }
    }

    fn is_old(&self, record: &PathRecord, now: SystemTime) -> bool {
        record.size >= self.config.old_file_min_bytes
            && utils::age_days(record.modified, now) >= self.config.old_file_days
    }

    /// Whether `plugin` would have yielded `path` from one of its roots.
    fn covers(&self, plugin: &dyn Plugin, path: &Path) -> bool {
        plugin
            .candidate_roots()
            .iter()
            .filter_map(|template| utils::expand_tilde(template))
            .map(|root| root.canonicalize().unwrap_or(root))
            .any(|root| {
                path.starts_with(&root)
                    && plugin.accepts(path)
                    && path
                        .ancestors()
                        .skip(1)
                        .take_while(|dir| *dir != root.as_path())
                        .all(|dir| plugin.descend_into(dir))
            })
    }
}

/// The part of `root` that lies inside any of `scopes`: a scope inside the root
/// replaces it, a root inside a scope stays whole, disjoint pairs drop out.
fn intersect(root: &Path, scopes: &[PathBuf]) -> Vec<PathBuf> {
    let resolved = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    scopes
        .iter()
        .filter_map(|scope| {
            if scope.starts_with(&resolved) {
                Some(scope.clone())
            } else if resolved.starts_with(scope) {
                Some(root.to_path_buf())
            } else {
                None
            }
        })
        .collect()
}

/// Drop duplicates and any root already covered by another one.
fn outermost(mut roots: Vec<PathBuf>) -> Vec<PathBuf> {
    roots.sort();
    roots.dedup();
    let mut kept: Vec<PathBuf> = Vec::with_capacity(roots.len());
    for root in roots {
        // sorted order puts an ancestor before its descendants
        if !kept.iter().any(|k| root.starts_with(k)) {
            kept.push(root);
        }
    }
    kept
}
