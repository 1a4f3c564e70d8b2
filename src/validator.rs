use crate::error::Rejection;
use crate::protected::ProtectedPathSet;
use crate::utils;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Decides whether a path may be analyzed at all.
///
/// The path is canonicalized (symlinks followed, `..` removed) before any prefix
/// comparison, so neither traversal segments nor symlink indirection can reach a
/// protected location. Validation never panics and never touches the filesystem
/// beyond `stat`/`access`.
#[derive(Debug, Clone)]
pub struct PathValidator {
    protected: Arc<ProtectedPathSet>,
}

impl PathValidator {
    pub fn new(protected: Arc<ProtectedPathSet>) -> Self {
        Self { protected }
    }

    pub fn protected(&self) -> &ProtectedPathSet {
        &self.protected
    }

    /// Validate a user-supplied path string. An empty `allowed_roots` allows
    /// the whole filesystem. Returns the canonical path on success.
    pub fn validate(&self, path: &str, allowed_roots: &[PathBuf]) -> Result<PathBuf, Rejection> {
        if path.trim().is_empty() {
            return Err(Rejection::Malformed("empty path".into()));
        }
        let expanded = utils::expand_tilde(path)
            .ok_or_else(|| Rejection::Malformed("home directory is unknown".into()))?;
        self.validate_path(&expanded, allowed_roots)
    }

    pub fn validate_path(&self, path: &Path, allowed_roots: &[PathBuf]) -> Result<PathBuf, Rejection> {
        if path.as_os_str().is_empty() {
            return Err(Rejection::Malformed("empty path".into()));
        }
        if path.as_os_str().to_string_lossy().contains('\0') {
            return Err(Rejection::Malformed("path contains a NUL byte".into()));
        }

        let resolved = path.canonicalize().map_err(|e| match e.kind() {
            ErrorKind::NotFound => Rejection::NotFound,
            ErrorKind::PermissionDenied => Rejection::PermissionDenied,
            _ => Rejection::Malformed(e.to_string()),
        })?;

        if let Some(prefix) = self.protected.matching_prefix(&resolved) {
            return Err(Rejection::Protected {
                prefix: prefix.to_path_buf(),
            });
        }

        if !allowed_roots.is_empty() && !is_within_any(&resolved, allowed_roots) {
            return Err(Rejection::OutsideAllowedRoots);
        }

        if !is_readable(&resolved) {
            return Err(Rejection::PermissionDenied);
        }

        Ok(resolved)
    }
}

fn is_within_any(resolved: &Path, roots: &[PathBuf]) -> bool {
    roots.iter().any(|root| {
        let root = root.canonicalize().unwrap_or_else(|_| root.clone());
        resolved.starts_with(&root)
    })
}

#[cfg(unix)]
fn is_readable(path: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    unsafe { libc::access(c_path.as_ptr(), libc::R_OK) == 0 }
}

#[cfg(not(unix))]
fn is_readable(path: &Path) -> bool {
    std::fs::metadata(path).is_ok()
}
