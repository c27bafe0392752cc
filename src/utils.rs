//! Utility functions for output naming and path handling

use crate::config::FileCollisionAction;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Maximum number of rename attempts when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Strip the last extension from a file name
///
/// A trailing dot with nothing after it is not an extension, and a leading
/// dot is (so `.hidden` becomes an empty stem).
///
/// # Examples
///
/// ```
/// use unwatermark::utils::strip_extension;
///
/// assert_eq!(strip_extension("photo.jpeg"), "photo");
/// assert_eq!(strip_extension("archive.tar.gz"), "archive.tar");
/// assert_eq!(strip_extension("README"), "README");
/// ```
#[must_use]
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => &name[..idx],
        _ => name,
    }
}

/// Output name for an artifact: `<prefix><stem>.png`
///
/// The artifact is always PNG, whatever the source format was. Path
/// separators in the display name are replaced so the result is a bare file
/// name.
///
/// # Examples
///
/// ```
/// use unwatermark::utils::artifact_file_name;
///
/// assert_eq!(
///     artifact_file_name("unwatermarked_", "beach.jpg"),
///     "unwatermarked_beach.png"
/// );
/// ```
#[must_use]
pub fn artifact_file_name(prefix: &str, display_name: &str) -> String {
    let stem: String = strip_extension(display_name)
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{prefix}{stem}.png")
}

/// Name for a bundle archive produced at `timestamp_ms`
#[must_use]
pub fn bundle_file_name(prefix: &str, timestamp_ms: i64) -> String {
    format!("{prefix}{timestamp_ms}.zip")
}

/// Make `name` unique among `taken` by appending ` (n)` before the extension
///
/// Used to keep archive entry names distinct when two sources share a stem
/// (e.g. `cat.jpg` and `cat.png`).
pub(crate) fn dedupe_name(name: &str, taken: &std::collections::HashSet<String>) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }

    let stem = strip_extension(name);
    let ext = &name[stem.len()..];
    (1..)
        .map(|i| format!("{stem} ({i}){ext}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

/// Resolve where a download should land when `path` may already be taken
///
/// - `Overwrite` always answers `path`.
/// - `Skip` answers `path` only if nothing is there yet, otherwise
///   [`Error::FileCollision`].
/// - `Rename` tries `stem (1).ext`, `stem (2).ext`, ... next to `path` and
///   answers the first free one.
///
/// Touches the filesystem; call it from a blocking context.
///
/// # Examples
///
/// ```
/// use unwatermark::config::FileCollisionAction;
/// use unwatermark::utils::get_unique_path;
/// use std::path::Path;
///
/// let target = Path::new("/nonexistent-dir/unwatermarked_cat.png");
/// let resolved = get_unique_path(target, FileCollisionAction::Rename).unwrap();
/// assert_eq!(resolved, target);
/// ```
pub fn get_unique_path(path: &Path, action: FileCollisionAction) -> Result<PathBuf> {
    let collision = |reason: String| Error::FileCollision {
        path: path.to_path_buf(),
        reason,
    };

    match action {
        FileCollisionAction::Overwrite => Ok(path.to_path_buf()),
        FileCollisionAction::Skip if path.exists() => {
            Err(collision("target exists and collisions are skipped".to_string()))
        }
        FileCollisionAction::Skip => Ok(path.to_path_buf()),
        FileCollisionAction::Rename if !path.exists() => Ok(path.to_path_buf()),
        FileCollisionAction::Rename => {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| collision("target has no usable file stem".to_string()))?;
            let suffix = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|ext| format!(".{ext}"))
                .unwrap_or_default();
            let parent = path.parent().unwrap_or_else(|| Path::new(""));

            (1..=MAX_RENAME_ATTEMPTS)
                .map(|n| parent.join(format!("{stem} ({n}){suffix}")))
                .find(|candidate| !candidate.exists())
                .ok_or_else(|| {
                    collision(format!(
                        "no free name after {MAX_RENAME_ATTEMPTS} numbered attempts"
                    ))
                })
        }
    }
}
