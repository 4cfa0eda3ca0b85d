//! Path canonicalization and visit classification
//!
//! Every watcher funnels raw paths through [`normalize`] before anything is
//! recorded, so the store only ever sees one spelling per location:
//! - `~` expanded to the home directory
//! - relative paths made absolute against the current directory
//! - symlinks, `.` and `..` resolved, even when the target no longer exists
//! - `file://` URLs converted to native paths

use crate::footprint::FootprintKind;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Reasons a raw path cannot be turned into a canonical key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    #[error("path is empty")]
    Empty,

    #[error("not a usable file URL: {0}")]
    InvalidUrl(String),

    #[error("home directory could not be determined")]
    NoHomeDir,

    #[error("current directory unavailable: {0}")]
    NoCurrentDir(String),

    #[error("path is not valid unicode: {0}")]
    NotUnicode(String),
}

/// Normalized path plus the display data derived from it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPath {
    /// Absolute, symlink-free path used as the store key
    pub path: String,
    /// Basename, or the whole path when there is none (roots, drives)
    pub name: String,
    /// Classification at normalization time
    pub kind: FootprintKind,
}

impl CanonicalPath {
    pub fn as_path(&self) -> &Path {
        Path::new(&self.path)
    }
}

/// Canonicalize a raw path string and classify it
///
/// The target does not need to exist: components that are on disk are
/// resolved there and missing ones are applied lexically.
pub fn normalize(raw: &str) -> Result<CanonicalPath, NormalizationError> {
    if raw.trim().is_empty() {
        return Err(NormalizationError::Empty);
    }

    let native = if has_file_scheme(raw) {
        let converted = file_url_to_path(raw)
            .ok_or_else(|| NormalizationError::InvalidUrl(raw.to_string()))?;
        if converted.trim().is_empty() {
            return Err(NormalizationError::Empty);
        }
        PathBuf::from(converted)
    } else {
        expand_home(raw)?
    };

    let absolute = if native.is_absolute() {
        native
    } else {
        std::env::current_dir()
            .map_err(|e| NormalizationError::NoCurrentDir(e.to_string()))?
            .join(native)
    };

    let resolved = strip_verbatim_prefix(resolve_lenient(&absolute));
    let path = resolved
        .into_os_string()
        .into_string()
        .map_err(|os| NormalizationError::NotUnicode(os.to_string_lossy().into_owned()))?;

    let name = display_name(&path);
    let kind = classify(Path::new(&path));

    Ok(CanonicalPath { path, name, kind })
}

/// Classify a path; first match wins
pub fn classify(path: &Path) -> FootprintKind {
    if path.is_dir() {
        return FootprintKind::Folder;
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("lnk") => FootprintKind::Shortcut,
        Some("url") => FootprintKind::WebShortcut,
        _ => FootprintKind::File,
    }
}

/// Convert a `file://` URL into a native path string
///
/// Returns `None` for other schemes or when the percent-decoded bytes are
/// not UTF-8.
pub fn file_url_to_path(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    if url.scheme() != "file" {
        return None;
    }
    native_path(&url)
}

fn has_file_scheme(raw: &str) -> bool {
    raw.get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("file:"))
}

/// Drive letters and UNC hosts are handled by the url crate
#[cfg(windows)]
fn native_path(url: &Url) -> Option<String> {
    url.to_file_path().ok()?.into_os_string().into_string().ok()
}

/// A non-local host becomes a `//host/...` path
#[cfg(not(windows))]
fn native_path(url: &Url) -> Option<String> {
    use percent_encoding::percent_decode_str;

    let path = percent_decode_str(url.path()).decode_utf8().ok()?;
    match url.host_str().filter(|h| !h.is_empty()) {
        Some(host) => Some(format!("//{host}{path}")),
        None => Some(path.into_owned()),
    }
}

fn expand_home(raw: &str) -> Result<PathBuf, NormalizationError> {
    let rest = if raw == "~" {
        Some("")
    } else if let Some(rest) = raw.strip_prefix("~/") {
        Some(rest)
    } else if cfg!(windows) {
        raw.strip_prefix("~\\")
    } else {
        None
    };

    match rest {
        Some(rest) => {
            let home = dirs::home_dir().ok_or(NormalizationError::NoHomeDir)?;
            if rest.is_empty() {
                Ok(home)
            } else {
                Ok(home.join(rest))
            }
        }
        None => Ok(PathBuf::from(raw)),
    }
}

/// Resolve one component at a time, like `realpath`, tolerating missing ones
///
/// Every named component is re-canonicalized once pushed, so a `..` that
/// climbs out of a missing directory lands back on resolved ground and any
/// symlink after it is still followed.
fn resolve_lenient(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                if let Ok(real) = std::fs::canonicalize(&resolved) {
                    resolved = real;
                }
            }
            // Prefix and root: canonicalizing a bare `C:` would yield the
            // drive's working directory
            other => resolved.push(other.as_os_str()),
        }
    }

    resolved
}

/// `\\?\C:\x` -> `C:\x`, `\\?\UNC\host\share` -> `\\host\share`
#[cfg(windows)]
fn strip_verbatim_prefix(path: PathBuf) -> PathBuf {
    if let Some(s) = path.to_str() {
        if let Some(rest) = s.strip_prefix(r"\\?\UNC\") {
            return PathBuf::from(format!(r"\\{rest}"));
        }
        if let Some(rest) = s.strip_prefix(r"\\?\") {
            if rest.as_bytes().get(1) == Some(&b':') {
                return PathBuf::from(rest);
            }
        }
    }
    path
}

#[cfg(not(windows))]
fn strip_verbatim_prefix(path: PathBuf) -> PathBuf {
    path
}

fn display_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| path.to_string())
}
