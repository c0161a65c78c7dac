use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::Error;

/// Persisted link between a launch command and the window it produced.
///
/// This is a cache, not a source of truth: callers must revalidate both
/// ids against the live tree before acting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityRecord {
    /// Platform (X11) window id.
    pub window_id: u32,
    /// Window-manager container id, guards against window-id reuse.
    pub container_id: i64,
}

/// Deterministic storage key for a command string, stable across runs
/// and platforms.
pub fn storage_key(command: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(command.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// One identity file per distinct command under the runtime directory.
#[derive(Debug, Clone)]
pub struct IdentityStore {
    dir: PathBuf,
}

impl IdentityStore {
    pub fn new() -> Self {
        let dir = dirs::runtime_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
        Self { dir }
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("slidepad-{key}"))
    }

    /// Read the record for `key`. A missing file means "untracked"; a
    /// malformed file is logged and also treated as untracked, so a
    /// damaged cache never blocks a relaunch.
    pub fn load(&self, key: &str) -> Result<Option<IdentityRecord>> {
        let path = self.path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read identity file {path:?}"))
            }
        };

        match parse_record(&content, &path) {
            Ok(record) => {
                debug!("📄 Loaded identity {:?} from {:?}", record, path);
                Ok(Some(record))
            }
            Err(e) => {
                warn!("⚠️  {e}, treating command as untracked");
                Ok(None)
            }
        }
    }

    pub fn save(&self, key: &str, record: IdentityRecord) -> Result<()> {
        let path = self.path(key);
        debug!(
            "💾 Saving window id {} and container id {} to {:?}",
            record.window_id, record.container_id, path
        );
        fs::write(&path, format!("{} {}", record.window_id, record.container_id))
            .with_context(|| format!("failed to write identity file {path:?}"))
    }

    /// Remove the record for `key`, if any. Invalidation path for
    /// vanished or reused windows.
    pub fn delete(&self, key: &str) -> Result<()> {
        let path = self.path(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("🗑️  Removed identity file {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to remove identity file {path:?}")),
        }
    }
}

impl Default for IdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_record(content: &str, path: &Path) -> Result<IdentityRecord, Error> {
    let corrupt = |reason: String| Error::CorruptState {
        path: path.display().to_string(),
        reason,
    };

    let mut tokens = content.split_whitespace();
    let (Some(window_id), Some(container_id), None) =
        (tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(corrupt("expected exactly two tokens".to_string()));
    };

    Ok(IdentityRecord {
        window_id: window_id
            .parse()
            .map_err(|_| corrupt(format!("bad window id '{window_id}'")))?,
        container_id: container_id
            .parse()
            .map_err(|_| corrupt(format!("bad container id '{container_id}'")))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, IdentityStore) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = IdentityStore::at(dir.path());
        (dir, store)
    }

    #[test]
    fn round_trip() {
        let (_dir, store) = store();
        let record = IdentityRecord {
            window_id: 1001,
            container_id: 55,
        };
        store.save("abc", record).unwrap();
        assert_eq!(store.load("abc").unwrap(), Some(record));
    }

    #[test]
    fn missing_file_is_untracked() {
        let (_dir, store) = store();
        assert_eq!(store.load("nope").unwrap(), None);
    }

    #[test]
    fn malformed_file_fails_open() {
        let (_dir, store) = store();
        fs::write(store.path("bad"), "only-one-token").unwrap();
        assert_eq!(store.load("bad").unwrap(), None);

        fs::write(store.path("bad"), "12 notanumber").unwrap();
        assert_eq!(store.load("bad").unwrap(), None);
    }

    #[test]
    fn delete_is_idempotent() {
        let (_dir, store) = store();
        store
            .save(
                "gone",
                IdentityRecord {
                    window_id: 7,
                    container_id: 9,
                },
            )
            .unwrap();
        store.delete("gone").unwrap();
        store.delete("gone").unwrap();
        assert_eq!(store.load("gone").unwrap(), None);
    }

    #[test]
    fn storage_key_is_deterministic() {
        assert_eq!(storage_key("cal"), storage_key("cal"));
        assert_ne!(storage_key("cal"), storage_key("cal "));
        assert_ne!(storage_key("htop"), storage_key("btop"));
        // 256-bit hex digest
        assert_eq!(storage_key("cal").len(), 64);
    }
}
