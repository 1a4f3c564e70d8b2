use crate::error::WalkError;
use crate::record::PathRecord;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use walkdir::{DirEntry, FilterEntry, WalkDir};

/// Per-entry error messages kept in a summary; the count is always exact.
const MAX_KEPT_ERRORS: usize = 64;

/// Shared cancellation flag. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Produces a bounded, cancellable recursive scan of one root.
///
/// Symbolic links below the root are never followed, file or directory, so
/// every yielded path is the real location of what it names and a link cycle
/// cannot re-enter a directory. Skipped links are counted in the summary.
#[derive(Debug, Clone, Default)]
pub struct DirectoryWalker {
    max_depth: Option<usize>,
}

impl DirectoryWalker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Start a fresh walk. The returned iterator is lazy and single-use.
    pub fn walk(&self, root: &Path, cancel: &CancelToken) -> Walk {
        let mut builder = WalkDir::new(root).follow_links(false).sort_by_file_name();
        if let Some(depth) = self.max_depth {
            builder = builder.max_depth(depth);
        }

        let links_skipped = Arc::new(AtomicUsize::new(0));
        let counter = links_skipped.clone();
        let predicate: EntryFilter = Box::new(move |entry| {
            // the root itself may be a link; everything below it may not
            if entry.depth() > 0 && entry.path_is_symlink() {
                counter.fetch_add(1, Ordering::Relaxed);
                return false;
            }
            true
        });

        Walk {
            inner: builder.into_iter().filter_entry(predicate),
            cancel: cancel.clone(),
            links_skipped,
            files: 0,
            directories: 0,
            errors: Vec::new(),
            error_count: 0,
            root_failed: false,
            cancelled: false,
            done: false,
        }
    }
}

type EntryFilter = Box<dyn FnMut(&DirEntry) -> bool + Send>;

/// Totals for one finished (or cancelled) walk.
#[derive(Debug, Clone, Default)]
pub struct WalkSummary {
    pub files: usize,
    pub directories: usize,
    /// First few per-entry errors; `error_count` is the full total.
    pub errors: Vec<WalkError>,
    pub error_count: usize,
    /// Symbolic links below the root, never followed.
    pub links_skipped: usize,
    /// The root itself could not be read.
    pub root_failed: bool,
    pub cancelled: bool,
}

/// A lazy walk over one root. Yields files and directories.
pub struct Walk {
    inner: FilterEntry<walkdir::IntoIter, EntryFilter>,
    cancel: CancelToken,
    links_skipped: Arc<AtomicUsize>,
    files: usize,
    directories: usize,
    errors: Vec<WalkError>,
    error_count: usize,
    root_failed: bool,
    cancelled: bool,
    done: bool,
}

impl Walk {
    /// Do not descend into the directory that was just yielded.
    pub fn skip_current_dir(&mut self) {
        self.inner.skip_current_dir();
    }

    pub fn summary(&self) -> WalkSummary {
        WalkSummary {
            files: self.files,
            directories: self.directories,
            errors: self.errors.clone(),
            error_count: self.error_count,
            links_skipped: self.links_skipped.load(Ordering::Relaxed),
            root_failed: self.root_failed,
            cancelled: self.cancelled,
        }
    }

    fn record_error(&mut self, err: &walkdir::Error) {
        if err.depth() == 0 {
            self.root_failed = true;
        }
        self.error_count += 1;
        let walk_error = WalkError::from_walkdir(err);
        tracing::debug!(error = %walk_error, "skipping unreadable entry");
        if self.errors.len() < MAX_KEPT_ERRORS {
            self.errors.push(walk_error);
        }
    }
}

impl Iterator for Walk {
    type Item = PathRecord;

    fn next(&mut self) -> Option<PathRecord> {
        if self.done {
            return None;
        }
        if self.cancel.is_cancelled() {
            self.cancelled = true;
            self.done = true;
            return None;
        }

        loop {
            let entry = match self.inner.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(err)) => {
                    self.record_error(&err);
                    continue;
                }
                Some(Ok(entry)) => entry,
            };

            let is_dir = entry.file_type().is_dir();
            if is_dir && self.cancel.is_cancelled() {
                self.cancelled = true;
                self.done = true;
                return None;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(err) => {
                    self.record_error(&err);
                    if is_dir {
                        self.inner.skip_current_dir();
                    }
                    continue;
                }
            };

            if is_dir {
                self.directories += 1;
            } else {
                self.files += 1;
            }
            return Some(to_record(&entry, &metadata, is_dir));
        }
    }
}

fn to_record(entry: &DirEntry, metadata: &Metadata, is_dir: bool) -> PathRecord {
    build_record(entry.path().to_path_buf(), metadata, is_dir)
}

/// Stat a single path into the same record shape a walk produces.
pub(crate) fn stat_record(path: &Path) -> std::io::Result<PathRecord> {
    let metadata = std::fs::metadata(path)?;
    let is_dir = metadata.is_dir();
    Ok(build_record(path.to_path_buf(), &metadata, is_dir))
}

fn build_record(path: PathBuf, metadata: &Metadata, is_dir: bool) -> PathRecord {
    let is_hidden = is_hidden(&path, metadata);
    PathRecord {
        path,
        size: if is_dir { 0 } else { metadata.len() },
        modified: metadata.modified().unwrap_or(UNIX_EPOCH),
        is_hidden,
        is_directory: is_dir,
    }
}

fn is_hidden(path: &Path, _metadata: &Metadata) -> bool {
    let dotted = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'));
    #[cfg(target_os = "macos")]
    {
        use std::os::macos::fs::MetadataExt;
        dotted || (u64::from(_metadata.st_flags()) & libc::UF_HIDDEN as u64) != 0
    }
    #[cfg(not(target_os = "macos"))]
    {
        dotted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir_all(root.join("c")).unwrap();
        fs::write(root.join("top.txt"), b"top").unwrap();
        fs::write(root.join("a/one.log"), vec![0u8; 100]).unwrap();
        fs::write(root.join("a/b/two.tmp"), vec![0u8; 200]).unwrap();
        fs::write(root.join("c/.hidden"), b"h").unwrap();
        dir
    }

    fn files(walk: Walk) -> Vec<PathRecord> {
        walk.filter(|r| !r.is_directory).collect()
    }

    #[test]
    fn yields_every_file_with_metadata() {
        let dir = tree();
        let walk = DirectoryWalker::new().walk(dir.path(), &CancelToken::new());
        let records = files(walk);
        assert_eq!(records.len(), 4);

        let two = records.iter().find(|r| r.path.ends_with("a/b/two.tmp")).unwrap();
        assert_eq!(two.size, 200);
        assert!(!two.is_hidden);

        let hidden = records.iter().find(|r| r.path.ends_with("c/.hidden")).unwrap();
        assert!(hidden.is_hidden);
    }

    #[test]
    fn summary_counts_files_and_directories() {
        let dir = tree();
        let mut walk = DirectoryWalker::new().walk(dir.path(), &CancelToken::new());
        for _ in walk.by_ref() {}
        let summary = walk.summary();
        assert_eq!(summary.files, 4);
        // root, a, a/b, c
        assert_eq!(summary.directories, 4);
        assert_eq!(summary.error_count, 0);
        assert!(!summary.cancelled);
    }

    #[test]
    fn respects_max_depth() {
        let dir = tree();
        let walk = DirectoryWalker::new()
            .max_depth(Some(1))
            .walk(dir.path(), &CancelToken::new());
        let names: HashSet<PathBuf> = files(walk).into_iter().map(|r| r.path).collect();
        assert!(names.contains(&dir.path().join("top.txt")));
        assert!(!names.contains(&dir.path().join("a/one.log")));
    }

    #[test]
    fn skip_current_dir_prunes_subtree() {
        let dir = tree();
        let mut walk = DirectoryWalker::new().walk(dir.path(), &CancelToken::new());
        let mut seen = Vec::new();
        while let Some(record) = walk.next() {
            if record.is_directory && record.path.ends_with("a") {
                walk.skip_current_dir();
                continue;
            }
            seen.push(record.path);
        }
        assert!(!seen.iter().any(|p| p.starts_with(dir.path().join("a"))));
        assert!(seen.contains(&dir.path().join("top.txt")));
    }

    #[test]
    fn cancelled_before_start_yields_nothing() {
        let dir = tree();
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut walk = DirectoryWalker::new().walk(dir.path(), &cancel);
        assert!(walk.next().is_none());
        assert!(walk.summary().cancelled);
    }

    #[test]
    fn cancellation_stops_at_next_directory() {
        let dir = tree();
        let cancel = CancelToken::new();
        let mut walk = DirectoryWalker::new().walk(dir.path(), &cancel);
        // root directory
        assert!(walk.next().unwrap().is_directory);
        cancel.cancel();
        let rest: Vec<PathRecord> = walk.by_ref().collect();
        assert!(rest.iter().all(|r| !r.is_directory));
        assert!(walk.summary().cancelled);
        assert!(walk.summary().files < 4);
    }

    #[test]
    fn missing_root_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let mut walk = DirectoryWalker::new().walk(&dir.path().join("gone"), &CancelToken::new());
        assert!(walk.next().is_none());
        let summary = walk.summary();
        assert!(summary.root_failed);
        assert_eq!(summary.error_count, 1);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_never_followed() {
        use std::os::unix::fs::symlink;
        let dir = tree();
        let root = dir.path().canonicalize().unwrap();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("thesis.docx"), b"doc").unwrap();
        // a loop back to an ancestor, an alias of a sibling, a file link and an escape
        symlink(&root, root.join("a/b/up")).unwrap();
        symlink(root.join("a"), root.join("c/alias")).unwrap();
        symlink(root.join("top.txt"), root.join("c/top-link")).unwrap();
        symlink(outside.path(), root.join("c/docs")).unwrap();

        let mut walk = DirectoryWalker::new().walk(&root, &CancelToken::new());
        let mut canonical = HashSet::new();
        for record in walk.by_ref().filter(|r| !r.is_directory) {
            let real = record.path.canonicalize().unwrap();
            assert_eq!(real, record.path, "yielded through a link");
            assert!(canonical.insert(real), "duplicate {}", record.path.display());
        }
        assert_eq!(canonical.len(), 4);
        assert!(!canonical.iter().any(|p| p.ends_with("thesis.docx")));
        let summary = walk.summary();
        assert_eq!(summary.links_skipped, 4);
        assert_eq!(summary.error_count, 0);
    }

    #[cfg(unix)]
    #[test]
    fn depth_limit_applies_to_real_directories_only() {
        use std::os::unix::fs::symlink;
        let dir = tree();
        let root = dir.path().canonicalize().unwrap();
        // a shallow alias of a directory that lies beyond the depth limit
        symlink(root.join("a/b"), root.join("shallow")).unwrap();

        let mut walk = DirectoryWalker::new()
            .max_depth(Some(2))
            .walk(&root, &CancelToken::new());
        let names: HashSet<PathBuf> = walk.by_ref().map(|r| r.path).collect();
        assert!(names.contains(&root.join("a/b")));
        assert!(names.contains(&root.join("a/one.log")));
        assert!(!names.contains(&root.join("a/b/two.tmp")));
        assert!(!names.iter().any(|p| p.starts_with(root.join("shallow"))));
        assert_eq!(walk.summary().links_skipped, 1);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_root_is_walked() {
        use std::os::unix::fs::symlink;
        let dir = tree();
        let holder = tempfile::tempdir().unwrap();
        let link = holder.path().join("root-link");
        symlink(dir.path(), &link).unwrap();

        let walk = DirectoryWalker::new().walk(&link, &CancelToken::new());
        assert_eq!(files(walk).len(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_recorded_and_skipped() {
        use std::os::unix::fs::PermissionsExt;
        // permission bits do not stop root
        if unsafe { libc::geteuid() } == 0 {
            return;
        }
        let dir = tree();
        let locked = dir.path().join("a/locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.bin"), b"x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let mut walk = DirectoryWalker::new().walk(dir.path(), &CancelToken::new());
        let names: HashSet<PathBuf> = walk
            .by_ref()
            .filter(|r| !r.is_directory)
            .map(|r| r.path)
            .collect();
        let summary = walk.summary();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(summary.error_count, 1);
        assert!(!summary.root_failed);
        assert_eq!(summary.errors[0].kind, crate::error::AccessKind::PermissionDenied);
        assert_eq!(names.len(), 4);
        assert!(names.contains(&dir.path().join("a/b/two.tmp")));
        assert!(names.contains(&dir.path().join("top.txt")));
    }
}
