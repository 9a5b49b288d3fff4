//! Temp artifact cache.
//!
//! Captures are handed to the editor as a PNG in `temp_dir`; clipboard and
//! share targets get their own copy in `cache_dir`. File names are derived
//! from the millisecond timestamp, and every allocation prunes entries older
//! than [`MAX_ARTIFACT_AGE`].

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::config::StorageConfig;
use crate::error::SnapResult;

/// Artifacts older than this are removed on the next allocation.
pub const MAX_ARTIFACT_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Owner of the temp and cache directories.
#[derive(Debug, Clone)]
pub struct TempCache {
    temp_dir: PathBuf,
    cache_dir: PathBuf,
}

impl TempCache {
    pub fn new(temp_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(&storage.temp_dir, &storage.cache_dir)
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Reserve a path for a new capture artifact.
    pub fn allocate(&self) -> SnapResult<PathBuf> {
        std::fs::create_dir_all(&self.temp_dir)?;
        let pruned = prune_older_than(&self.temp_dir, MAX_ARTIFACT_AGE)?;
        if pruned > 0 {
            tracing::debug!(pruned, "Pruned stale temp artifacts");
        }
        Ok(unique_path(&self.temp_dir, "temp"))
    }

    /// Reserve a path for a clipboard or share hand-off copy.
    pub fn cache_file(&self) -> SnapResult<PathBuf> {
        std::fs::create_dir_all(&self.cache_dir)?;
        Ok(unique_path(&self.cache_dir, "cache"))
    }

    /// Remove every temp artifact. Returns the number removed.
    pub fn clean_temp(&self) -> SnapResult<usize> {
        clear_dir(&self.temp_dir)
    }

    /// Remove every cached hand-off copy. Returns the number removed.
    pub fn clean_cache(&self) -> SnapResult<usize> {
        clear_dir(&self.cache_dir)
    }
}

/// Delete a temp artifact. A missing file counts as success.
pub fn delete_artifact(path: &Path) -> SnapResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Delete regular files in `dir` whose mtime is older than `max_age`.
pub fn prune_older_than(dir: &Path, max_age: Duration) -> SnapResult<usize> {
    if !dir.exists() {
        return Ok(0);
    }
    let now = SystemTime::now();
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = match entry.metadata() {
            Ok(m) if m.is_file() => m,
            _ => continue,
        };
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        let age = now.duration_since(modified).unwrap_or_default();
        if age > max_age && std::fs::remove_file(entry.path()).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}

fn clear_dir(dir: &Path) -> SnapResult<usize> {
    if !dir.exists() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let is_file = entry.metadata().map(|m| m.is_file()).unwrap_or(false);
        if is_file && std::fs::remove_file(entry.path()).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}

fn unique_path(dir: &Path, prefix: &str) -> PathBuf {
    let millis = chrono::Utc::now().timestamp_millis();
    let candidate = dir.join(format!("{prefix}_{millis}.png"));
    if !candidate.exists() {
        return candidate;
    }
    (1u32..)
        .map(|n| dir.join(format!("{prefix}_{millis}_{n}.png")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> TempCache {
        let root = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&root);
        TempCache::new(root.join("temp"), root.join("cache"))
    }

    #[test]
    fn allocate_uses_timestamp_names() {
        let cache = scratch("snapcrop_test_temp_names");
        let path = cache.allocate().unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("temp_"));
        assert!(name.ends_with(".png"));
        assert!(cache.temp_dir().exists());
    }

    #[test]
    fn allocations_do_not_collide() {
        let cache = scratch("snapcrop_test_temp_unique");
        let first = cache.allocate().unwrap();
        std::fs::write(&first, b"x").unwrap();
        let second = cache.allocate().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn delete_is_idempotent() {
        let cache = scratch("snapcrop_test_temp_delete");
        let path = cache.allocate().unwrap();
        std::fs::write(&path, b"png").unwrap();

        delete_artifact(&path).unwrap();
        delete_artifact(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn prune_keeps_fresh_files() {
        let cache = scratch("snapcrop_test_temp_prune");
        let path = cache.allocate().unwrap();
        std::fs::write(&path, b"png").unwrap();

        let removed = prune_older_than(cache.temp_dir(), MAX_ARTIFACT_AGE).unwrap();
        assert_eq!(removed, 0);
        assert!(path.exists());
    }

    #[test]
    fn clean_removes_everything() {
        let cache = scratch("snapcrop_test_temp_clean");
        for _ in 0..3 {
            let path = cache.cache_file().unwrap();
            std::fs::write(path, b"png").unwrap();
        }
        assert_eq!(cache.clean_cache().unwrap(), 3);
        assert_eq!(cache.clean_temp().unwrap(), 0);
    }
}
