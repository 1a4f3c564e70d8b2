use crate::config::ScoringConfig;
use crate::protected::ProtectedPathSet;
use crate::record::{AnalysisResult, PathRecord, Recommendation, SafetyLevel};
use crate::utils;
use std::path::{Component, Path};
use std::sync::Arc;
use std::time::SystemTime;

const UNKNOWN_WEIGHT: i32 = 50;
const NO_EXTENSION_WEIGHT: i32 = 45;

/// Base weights by extension. Lower means more deletable.
const EXTENSION_WEIGHTS: &[(&[&str], i32)] = &[
    // scratch, caches and logs
    (
        &[
            "tmp", "temp", "cache", "log", "old", "bak", "swp", "swo", "dmp", "crash", "ips",
            "part", "partial", "download", "crdownload", "sync", "pyc", "o",
        ],
        15,
    ),
    // installers and archives
    (&["dmg", "pkg", "iso", "zip", "tar", "gz", "tgz", "xip", "torrent"], 35),
    // media
    (
        &[
            "jpg", "jpeg", "png", "heic", "gif", "raw", "mov", "mp4", "m4v", "mp3", "m4a",
            "wav", "aac", "flac",
        ],
        60,
    ),
    // documents
    (
        &[
            "doc", "docx", "pdf", "pages", "numbers", "keynote", "xls", "xlsx", "ppt", "pptx",
            "rtf", "txt", "md", "odt", "csv",
        ],
        70,
    ),
    // configuration and credentials
    (
        &[
            "plist", "json", "xml", "yaml", "yml", "conf", "ini", "cfg", "key", "p12", "pem",
            "crt", "keychain", "sqlite", "db",
        ],
        75,
    ),
    // bundles and system extensions
    (&["app", "kext", "driver", "plugin", "bundle", "framework", "dylib"], 90),
];

/// Names that carry no useful extension but are well known.
const NAME_WEIGHTS: &[(&str, i32)] = &[
    (".DS_Store", 5),
    ("Thumbs.db", 5),
    (".localized", 10),
    (".bashrc", 90),
    (".bash_profile", 90),
    (".zshrc", 90),
    (".zprofile", 90),
    (".profile", 90),
    (".gitconfig", 85),
];

/// Directory names that mark regenerable content.
const CACHE_SEGMENTS: &[&str] = &[
    "caches", "cache", ".cache", "cache2", "code cache", "logs", "log", "tmp", "temp",
    "deriveddata", ".trash",
];

/// Directory names that hold the user's own files.
const USER_DOCUMENT_SEGMENTS: &[&str] = &["Documents", "Desktop", "Pictures", "Movies", "Music"];

/// Scores a single path for deletion safety.
///
/// Deterministic for a given `now`: the engine pins `now` once per analysis, so
/// two scans of an unchanged tree score identically.
#[derive(Debug, Clone)]
pub struct SafetyScorer {
    protected: Arc<ProtectedPathSet>,
    config: ScoringConfig,
    now: SystemTime,
}

impl SafetyScorer {
    pub fn new(protected: Arc<ProtectedPathSet>, config: ScoringConfig) -> Self {
        Self {
            protected,
            config,
            now: SystemTime::now(),
        }
    }

    /// Pin the reference time used for age calculations.
    pub fn at(mut self, now: SystemTime) -> Self {
        self.now = now;
        self
    }

    pub fn now(&self) -> SystemTime {
        self.now
    }

    /// Importance score (0-100, higher = more important) and its safety level.
    pub fn score(&self, record: &PathRecord) -> (u8, SafetyLevel) {
        if self.protected.is_protected(&record.path) {
            return (100, SafetyLevel::Critical);
        }

        let cfg = &self.config;
        let mut score = base_weight(&record.path);

        score -= self.age_penalty(record.modified);

        if !record.is_directory && record.size < cfg.small_file_bytes {
            score -= i32::from(cfg.small_file_penalty);
        }
        if record.is_hidden {
            score -= i32::from(cfg.hidden_penalty);
        }
        if in_cache_location(&record.path) {
            score -= i32::from(cfg.cache_location_penalty);
        }
        if in_user_documents(&record.path) {
            score += i32::from(cfg.user_document_bonus);
        }

        let score = score.clamp(0, 100) as u8;
        (score, SafetyLevel::from_score(score))
    }

    /// Linear ramp from zero up to `max_age_penalty`, saturating at `age_floor_days`.
    fn age_penalty(&self, modified: SystemTime) -> i32 {
        let cfg = &self.config;
        let floor = cfg.age_floor_days.max(1);
        let days = utils::age_days(modified, self.now).min(floor);
        (u64::from(cfg.max_age_penalty) * days / floor) as i32
    }

    /// `covered` is false when no enabled plugin claims the path.
    pub fn recommend(&self, record: &PathRecord, level: SafetyLevel, covered: bool) -> Recommendation {
        match level {
            SafetyLevel::Critical | SafetyLevel::Important => Recommendation::Keep,
            _ if !covered => Recommendation::Skip,
            SafetyLevel::Moderate => Recommendation::Review,
            SafetyLevel::Safe | SafetyLevel::VerySafe => {
                if utils::age_days(record.modified, self.now) >= self.config.delete_after_days {
                    Recommendation::Delete
                } else {
                    Recommendation::Clean
                }
            }
        }
    }

    pub fn classify(&self, record: PathRecord, covered: bool) -> AnalysisResult {
        let (score, level) = self.score(&record);
        let recommendation = self.recommend(&record, level, covered);
        AnalysisResult::new(record, score, level, recommendation)
    }
}

fn base_weight(path: &Path) -> i32 {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return UNKNOWN_WEIGHT;
    };
    if let Some((_, weight)) = NAME_WEIGHTS.iter().find(|(n, _)| *n == name) {
        return *weight;
    }
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return NO_EXTENSION_WEIGHT;
    };
    let ext = ext.to_ascii_lowercase();
    EXTENSION_WEIGHTS
        .iter()
        .find(|(exts, _)| exts.contains(&ext.as_str()))
        .map(|(_, weight)| *weight)
        .unwrap_or(UNKNOWN_WEIGHT)
}

fn parent_segments(path: &Path) -> impl Iterator<Item = &str> {
    path.parent()
        .into_iter()
        .flat_map(|p| p.components())
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
}

fn in_cache_location(path: &Path) -> bool {
    parent_segments(path).any(|seg| {
        let lower = seg.to_ascii_lowercase();
        CACHE_SEGMENTS.contains(&lower.as_str())
    })
}

fn in_user_documents(path: &Path) -> bool {
    parent_segments(path).any(|seg| USER_DOCUMENT_SEGMENTS.contains(&seg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    const DAY: u64 = 86_400;

    fn scorer() -> SafetyScorer {
        let protected = ProtectedPathSet::from_prefixes([PathBuf::from("/vault")]);
        SafetyScorer::new(Arc::new(protected), ScoringConfig::default())
    }

    fn record(path: &str, size: u64, age_days: u64, now: SystemTime) -> PathRecord {
        let name = Path::new(path).file_name().unwrap().to_string_lossy().into_owned();
        PathRecord {
            path: PathBuf::from(path),
            size,
            modified: now - Duration::from_secs(age_days * DAY),
            is_hidden: name.starts_with('.'),
            is_directory: false,
        }
    }

    #[test]
    fn protected_paths_are_critical_regardless_of_signals() {
        let s = scorer();
        let now = s.now();
        let r = record("/vault/junk/cache.tmp", 10, 400, now);
        assert_eq!(s.score(&r), (100, SafetyLevel::Critical));
        assert_eq!(s.classify(r, true).recommendation(), Recommendation::Keep);
    }

    #[test]
    fn stale_temp_file_is_deletable_and_fresh_document_is_kept() {
        let s = scorer();
        let now = s.now();

        let tmp = s.classify(record("/Users/me/Documents/cache.tmp", 2_048, 200, now), true);
        assert!(tmp.level().is_deletable(), "got {:?}", tmp.level());
        assert_eq!(tmp.recommendation(), Recommendation::Delete);

        let doc = s.classify(record("/Users/me/Documents/report.docx", 2 << 20, 1, now), true);
        assert!(doc.level() <= SafetyLevel::Important, "got {:?}", doc.level());
        assert_eq!(doc.recommendation(), Recommendation::Keep);
    }

    #[test]
    fn band_invariant_holds_across_signals() {
        let s = scorer();
        let now = s.now();
        let paths = [
            "/data/a.tmp",
            "/data/.hidden",
            "/data/Caches/blob",
            "/data/Documents/a.pdf",
            "/data/b.app",
            "/data/noext",
            "/data/clip.mov",
            "/vault/a",
        ];
        for path in paths {
            for size in [0, 512, 4_096, 1 << 30] {
                for age in [0, 10, 90, 180, 1_000] {
                    let (score, level) = s.score(&record(path, size, age, now));
                    assert!(score <= 100);
                    assert_eq!(score >= 80, level == SafetyLevel::Critical);
                    if score >= 80 {
                        assert!(level <= SafetyLevel::Important);
                    }
                    assert_eq!(score < 20, level == SafetyLevel::VerySafe);
                }
            }
        }
    }

    #[test]
    fn age_never_raises_the_score() {
        let s = scorer();
        let now = s.now();
        let mut previous = u8::MAX;
        for age in [0, 1, 30, 90, 179, 180, 365, 5_000] {
            let (score, _) = s.score(&record("/data/notes.txt", 50_000, age, now));
            assert!(score <= previous);
            previous = score;
        }
        let (floor_a, _) = s.score(&record("/data/notes.txt", 50_000, 180, now));
        let (floor_b, _) = s.score(&record("/data/notes.txt", 50_000, 5_000, now));
        assert_eq!(floor_a, floor_b);
    }

    #[test]
    fn large_files_do_not_gain_importance() {
        let s = scorer();
        let now = s.now();
        let (small, _) = s.score(&record("/data/movie.mov", 50_000, 10, now));
        let (huge, _) = s.score(&record("/data/movie.mov", 50 << 30, 10, now));
        assert_eq!(small, huge);
    }

    #[test]
    fn cache_locations_and_hidden_files_score_lower() {
        let s = scorer();
        let now = s.now();
        let (plain, _) = s.score(&record("/data/blob", 50_000, 10, now));
        let (cached, _) = s.score(&record("/data/Caches/blob", 50_000, 10, now));
        let (hidden, _) = s.score(&record("/data/.blob", 50_000, 10, now));
        assert!(cached < plain);
        assert!(hidden < plain);
    }

    #[test]
    fn recent_deletable_files_are_cleaned_and_uncovered_files_skipped() {
        let s = scorer();
        let now = s.now();
        let fresh = s.classify(record("/data/Caches/x.tmp", 4_096, 2, now), true);
        assert!(fresh.level().is_deletable());
        assert_eq!(fresh.recommendation(), Recommendation::Clean);

        let stray = s.classify(record("/data/Caches/x.tmp", 4_096, 2, now), false);
        assert_eq!(stray.recommendation(), Recommendation::Skip);

        let unknown = s.classify(record("/data/thing.bin", 50_000, 2, now), true);
        assert_eq!(unknown.level(), SafetyLevel::Moderate);
        assert_eq!(unknown.recommendation(), Recommendation::Review);
    }
}
