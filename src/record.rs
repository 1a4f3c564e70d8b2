use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Metadata for one filesystem entry, as produced by the walker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathRecord {
    #[serde(serialize_with = "serialize_lossy_path")]
    pub path: PathBuf,
    pub size: u64,
    #[serde(rename = "lastModified", serialize_with = "serialize_epoch_secs")]
    pub modified: SystemTime,
    #[serde(rename = "isHidden")]
    pub is_hidden: bool,
    #[serde(rename = "isDirectory")]
    pub is_directory: bool,
}

/// Non-UTF-8 names are rendered with replacement characters instead of
/// failing the whole report.
fn serialize_lossy_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

fn serialize_epoch_secs<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
    let secs = match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    };
    serializer.serialize_i64(secs)
}

/// How risky deleting a path is, ordered from least to most deletable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyLevel {
    Critical,
    Important,
    Moderate,
    Safe,
    VerySafe,
}

impl SafetyLevel {
    pub const ALL: [SafetyLevel; 5] = [
        SafetyLevel::Critical,
        SafetyLevel::Important,
        SafetyLevel::Moderate,
        SafetyLevel::Safe,
        SafetyLevel::VerySafe,
    ];

    /// Fixed score bands: >=80 critical, 60-79 important, 40-59 moderate,
    /// 20-39 safe, below 20 very safe.
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => SafetyLevel::Critical,
            60..=79 => SafetyLevel::Important,
            40..=59 => SafetyLevel::Moderate,
            20..=39 => SafetyLevel::Safe,
            _ => SafetyLevel::VerySafe,
        }
    }

    pub fn is_deletable(self) -> bool {
        matches!(self, SafetyLevel::Safe | SafetyLevel::VerySafe)
    }

    pub fn label(self) -> &'static str {
        match self {
            SafetyLevel::Critical => "critical",
            SafetyLevel::Important => "important",
            SafetyLevel::Moderate => "moderate",
            SafetyLevel::Safe => "safe",
            SafetyLevel::VerySafe => "very safe",
        }
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a caller should do with a path. Always derived, never set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Clean,
    Delete,
    Review,
    Keep,
    Skip,
}

impl Recommendation {
    /// Counts toward reclaimable bytes.
    pub fn is_reclaimable(self) -> bool {
        matches!(self, Recommendation::Clean | Recommendation::Delete)
    }

    /// Shows up in the ranked recommendation list.
    pub fn is_actionable(self) -> bool {
        matches!(
            self,
            Recommendation::Clean | Recommendation::Delete | Recommendation::Review
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Recommendation::Clean => "clean",
            Recommendation::Delete => "delete",
            Recommendation::Review => "review",
            Recommendation::Keep => "keep",
            Recommendation::Skip => "skip",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A scored path. Built once by the scorer; a re-scan produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    #[serde(flatten)]
    record: PathRecord,
    #[serde(rename = "safetyLevel")]
    level: SafetyLevel,
    score: u8,
    recommendation: Recommendation,
}

impl AnalysisResult {
    pub(crate) fn new(
        record: PathRecord,
        score: u8,
        level: SafetyLevel,
        recommendation: Recommendation,
    ) -> Self {
        debug_assert!(score <= 100);
        Self {
            record,
            level,
            score,
            recommendation,
        }
    }

    pub fn record(&self) -> &PathRecord {
        &self.record
    }

    pub fn path(&self) -> &Path {
        &self.record.path
    }

    pub fn size(&self) -> u64 {
        self.record.size
    }

    pub fn modified(&self) -> SystemTime {
        self.record.modified
    }

    pub fn level(&self) -> SafetyLevel {
        self.level
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn recommendation(&self) -> Recommendation {
        self.recommendation
    }
}
