use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, info};

use crate::constants::persistence::DEFAULT_ORDER_FILENAME;
use crate::errors::OrderError;
use crate::persistence::{PersistedState, decode, encode_pretty};
use crate::transport::fs::{coerce_file_path, read_bytes_if_exists, write_atomic};

/// Storage backend for the persisted order snapshot.
pub trait OrderStore: Send + Sync {
    /// Stable identifier used in errors and logs.
    fn id(&self) -> &str;
    /// Load the snapshot; `Ok(None)` when none has been written yet.
    fn load(&self) -> Result<Option<PersistedState>, OrderError>;
    /// Replace the stored snapshot.
    fn save(&self, state: &PersistedState) -> Result<(), OrderError>;
}

/// Process-local snapshot store.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    state: RwLock<Option<PersistedState>>,
}

impl InMemoryOrderStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `state`.
    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: RwLock::new(Some(state)),
        }
    }
}

impl OrderStore for InMemoryOrderStore {
    fn id(&self) -> &str {
        "memory"
    }

    fn load(&self) -> Result<Option<PersistedState>, OrderError> {
        self.state
            .read()
            .map_err(|_| OrderError::SourceUnavailable {
                source_id: self.id().to_string(),
                reason: "order state lock poisoned".into(),
            })
            .map(|guard| guard.clone())
    }

    fn save(&self, state: &PersistedState) -> Result<(), OrderError> {
        *self
            .state
            .write()
            .map_err(|_| OrderError::SourceUnavailable {
                source_id: self.id().to_string(),
                reason: "order state lock poisoned".into(),
            })? = Some(state.clone());
        Ok(())
    }
}

/// JSON sidecar file (`order.json` by default).
pub struct FileOrderStore {
    id: String,
    path: PathBuf,
}

impl fmt::Debug for FileOrderStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileOrderStore")
            .field("path", &self.path)
            .finish()
    }
}

impl FileOrderStore {
    /// Use `path` as the sidecar; a directory resolves to `<dir>/order.json`.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let path = coerce_file_path(path.into(), DEFAULT_ORDER_FILENAME);
        Self {
            id: path.display().to_string(),
            path,
        }
    }

    /// Default sidecar path in the working directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_ORDER_FILENAME)
    }

    /// Default sidecar path inside `dir`.
    pub fn default_path_in_dir<P: AsRef<Path>>(dir: P) -> PathBuf {
        dir.as_ref().join(DEFAULT_ORDER_FILENAME)
    }

    /// Resolved sidecar file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OrderStore for FileOrderStore {
    fn id(&self) -> &str {
        &self.id
    }

    fn load(&self) -> Result<Option<PersistedState>, OrderError> {
        let Some(raw) = read_bytes_if_exists(&self.id, &self.path)? else {
            debug!(
                "[running_order:sidecar] {} not found; no persisted order",
                self.path.display()
            );
            return Ok(None);
        };
        let text = String::from_utf8(raw).map_err(|err| {
            OrderError::MalformedPersistedState(format!(
                "{} is not valid UTF-8: {err}",
                self.path.display()
            ))
        })?;
        decode(&text).map(Some)
    }

    fn save(&self, state: &PersistedState) -> Result<(), OrderError> {
        let encoded = encode_pretty(state)?;
        write_atomic(&self.id, &self.path, encoded.as_bytes())?;
        info!(
            "[running_order:sidecar] wrote order state to {}",
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn snapshot() -> PersistedState {
        PersistedState {
            is_confirmed: true,
            order: vec![2, 0, 1],
            timestamp: "2025-12-10T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn in_memory_store_round_trips() {
        let store = InMemoryOrderStore::new();
        assert!(store.load().unwrap().is_none());
        store.save(&snapshot()).unwrap();
        assert_eq!(store.load().unwrap(), Some(snapshot()));
        assert_eq!(
            InMemoryOrderStore::with_state(snapshot()).load().unwrap(),
            Some(snapshot())
        );
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("order.json");
        let store = FileOrderStore::open(&path);
        assert!(store.load().unwrap().is_none());
        store.save(&snapshot()).unwrap();
        drop(store);

        let again = FileOrderStore::open(&path);
        assert_eq!(again.load().unwrap(), Some(snapshot()));
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"isConfirmed\": true"));
    }

    #[test]
    fn file_store_accepts_directory_path() {
        let dir = tempdir().unwrap();
        let store = FileOrderStore::open(dir.path());
        assert_eq!(store.path(), dir.path().join(DEFAULT_ORDER_FILENAME));
        store.save(&snapshot()).unwrap();
        assert!(dir.path().join(DEFAULT_ORDER_FILENAME).is_file());
        assert!(format!("{store:?}").contains("FileOrderStore"));
    }

    #[test]
    fn broken_file_is_malformed_not_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("order.json");
        fs::write(&path, "{ not json").unwrap();
        let err = FileOrderStore::open(&path).load().unwrap_err();
        assert!(matches!(err, OrderError::MalformedPersistedState(_)));
    }

    #[test]
    fn non_utf8_file_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("order.json");
        fs::write(&path, [0xff, 0xfe, b'{', b'}']).unwrap();
        let err = FileOrderStore::open(&path).load().unwrap_err();
        assert!(matches!(
            err,
            OrderError::MalformedPersistedState(ref msg) if msg.contains("UTF-8")
        ));
    }

    #[test]
    fn default_paths_use_order_json() {
        assert_eq!(FileOrderStore::default_path(), PathBuf::from("order.json"));
        assert_eq!(
            FileOrderStore::default_path_in_dir("state"),
            PathBuf::from("state").join("order.json")
        );
    }
}
