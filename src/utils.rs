use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Home directory, if the platform can tell us.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Expand a leading `~` or `~/` in a path template.
/// Returns `None` when the template needs a home directory and none is known.
pub fn expand_tilde(template: &str) -> Option<PathBuf> {
    if template == "~" {
        return home_dir();
    }
    if let Some(rest) = template.strip_prefix("~/") {
        return home_dir().map(|home| home.join(rest));
    }
    Some(PathBuf::from(template))
}

/// Whole days elapsed between `modified` and `now`. Future timestamps count as zero.
pub fn age_days(modified: SystemTime, now: SystemTime) -> u64 {
    now.duration_since(modified)
        .unwrap_or(Duration::ZERO)
        .as_secs()
        / 86_400
}

/// Parse human-readable size string ("100MB") into bytes.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let upper = s.to_ascii_uppercase();
    let (num_str, multiplier) = if let Some(n) = upper.strip_suffix("GB") {
        (n, 1_073_741_824u64)
    } else if let Some(n) = upper.strip_suffix("MB") {
        (n, 1_048_576)
    } else if let Some(n) = upper.strip_suffix("KB") {
        (n, 1_024)
    } else if let Some(n) = upper.strip_suffix('B') {
        (n, 1)
    } else {
        // assume bytes if no suffix
        (upper.as_str(), 1)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: '{}'", num_str.trim()))?;

    if num < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    Ok((num * multiplier as f64) as u64)
}

/// Format byte count as human-readable string.
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.2} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.2} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1_024 {
        format!("{:.2} KB", bytes as f64 / 1_024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Shorten a path for display by replacing home dir with ~.
pub fn display_path(path: &Path) -> String {
    if let Some(home) = home_dir() {
        if let Ok(relative) = path.strip_prefix(&home) {
            return format!("~/{}", relative.display());
        }
    }
    path.display().to_string()
}
