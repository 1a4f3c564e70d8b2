use std::path::PathBuf;
use thiserror::Error;

/// Errors that fail a call outright, before any filesystem walk begins.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: Rejection },

    #[error("plugin already registered: {0}")]
    DuplicatePlugin(String),

    #[error("plugin '{0}' declares no candidate roots")]
    EmptyRoots(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Why the path validator refused a path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("malformed path: {0}")]
    Malformed(String),

    #[error("path does not exist")]
    NotFound,

    #[error("permission denied")]
    PermissionDenied,

    #[error("path is inside protected location {}", .prefix.display())]
    Protected { prefix: PathBuf },

    #[error("path is outside every allowed root")]
    OutsideAllowedRoots,
}

impl Rejection {
    /// Stable short code for UI layers.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::Malformed(_) => "malformed",
            Rejection::NotFound => "not-found",
            Rejection::PermissionDenied => "permission-denied",
            Rejection::Protected { .. } => "protected",
            Rejection::OutsideAllowedRoots => "outside-allowed-roots",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    PermissionDenied,
    NotFound,
    Io,
}

/// A non-fatal failure on a single entry during a walk.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct WalkError {
    pub path: Option<PathBuf>,
    pub kind: AccessKind,
    pub message: String,
}

impl WalkError {
    pub(crate) fn from_walkdir(err: &walkdir::Error) -> Self {
        let kind = match err.io_error().map(|e| e.kind()) {
            Some(std::io::ErrorKind::PermissionDenied) => AccessKind::PermissionDenied,
            Some(std::io::ErrorKind::NotFound) => AccessKind::NotFound,
            _ => AccessKind::Io,
        };
        Self {
            path: err.path().map(|p| p.to_path_buf()),
            kind,
            message: err.to_string(),
        }
    }
}
