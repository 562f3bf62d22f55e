use crate::error::{DisResult, DisorderError};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, TryLockError};
use tracing::{debug, warn};

/// Read-only access to a hierarchical simulation input.
///
/// Paths look like `/Hamiltonian/Disorder/OrbitalNum`. Groups hold other
/// groups or datasets; datasets are scalars or flat arrays.
pub trait ConfigStore: Send {
    fn contains(&self, path: &str) -> bool;

    fn read_f64(&self, path: &str) -> DisResult<f64>;

    fn read_i64(&self, path: &str) -> DisResult<i64>;

    fn read_i64_array(&self, path: &str) -> DisResult<Vec<i64>>;

    fn read_f64_array(&self, path: &str) -> DisResult<Vec<f64>>;

    /// Names of the groups directly beneath `path`.
    /// `None` means the group itself does not exist.
    fn child_groups(&self, path: &str) -> DisResult<Option<Vec<String>>>;

    fn read_usize(&self, path: &str) -> DisResult<usize> {
        let v = self.read_i64(path)?;
        usize::try_from(v)
            .map_err(|_| DisorderError::config_read(path, format!("expected non-negative, got {}", v)))
    }

    fn read_usize_array(&self, path: &str) -> DisResult<Vec<usize>> {
        self.read_i64_array(path)?
            .into_iter()
            .map(|v| {
                usize::try_from(v).map_err(|_| {
                    DisorderError::config_read(path, format!("expected non-negative, got {}", v))
                })
            })
            .collect()
    }
}

/// `ConfigStore` backed by a JSON document. Objects are groups, numbers and
/// arrays of numbers are datasets.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    root: Value,
}

impl JsonConfigStore {
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn parse(content: &str) -> DisResult<Self> {
        Ok(Self::from_value(serde_json::from_str(content)?))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> DisResult<Self> {
        debug!("Loading config store from {:?}", path.as_ref());
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    fn node(&self, path: &str) -> Option<&Value> {
        path.split('/')
            .filter(|p| !p.is_empty())
            .try_fold(&self.root, |node, part| node.as_object()?.get(part))
    }

    fn dataset(&self, path: &str) -> DisResult<&Value> {
        self.node(path)
            .ok_or_else(|| DisorderError::config_read(path, "path not found"))
    }

    fn array(&self, path: &str) -> DisResult<&Vec<Value>> {
        self.dataset(path)?
            .as_array()
            .ok_or_else(|| DisorderError::config_read(path, "expected an array"))
    }
}

impl ConfigStore for JsonConfigStore {
    fn contains(&self, path: &str) -> bool {
        self.node(path).is_some()
    }

    fn read_f64(&self, path: &str) -> DisResult<f64> {
        self.dataset(path)?
            .as_f64()
            .ok_or_else(|| DisorderError::config_read(path, "expected a number"))
    }

    fn read_i64(&self, path: &str) -> DisResult<i64> {
        self.dataset(path)?
            .as_i64()
            .ok_or_else(|| DisorderError::config_read(path, "expected an integer"))
    }

    fn read_i64_array(&self, path: &str) -> DisResult<Vec<i64>> {
        self.array(path)?
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_i64().ok_or_else(|| {
                    DisorderError::config_read(path, format!("element {} is not an integer", i))
                })
            })
            .collect()
    }

    fn read_f64_array(&self, path: &str) -> DisResult<Vec<f64>> {
        self.array(path)?
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_f64().ok_or_else(|| {
                    DisorderError::config_read(path, format!("element {} is not a number", i))
                })
            })
            .collect()
    }

    fn child_groups(&self, path: &str) -> DisResult<Option<Vec<String>>> {
        let Some(node) = self.node(path) else {
            return Ok(None);
        };
        let group = node
            .as_object()
            .ok_or_else(|| DisorderError::config_read(path, "expected a group"))?;

        Ok(Some(
            group
                .iter()
                .filter(|(_, v)| v.is_object())
                .map(|(k, _)| k.clone())
                .collect(),
        ))
    }
}

/// The single process-wide lock around the configuration store.
///
/// The underlying reader is not safe for concurrent access, so every read
/// goes through [`StoreLock::with`]. The guard lives exactly as long as the
/// closure and is dropped on success, error and unwind alike.
pub struct StoreLock {
    store: Mutex<Box<dyn ConfigStore>>,
}

impl StoreLock {
    pub fn new<S: ConfigStore + 'static>(store: S) -> Self {
        Self {
            store: Mutex::new(Box::new(store)),
        }
    }

    pub fn with<R, F>(&self, f: F) -> DisResult<R>
    where
        F: FnOnce(&dyn ConfigStore) -> DisResult<R>,
    {
        let guard = match self.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                // Readers never leave the store half-written.
                warn!("Config store lock was poisoned by a panicking reader; recovering");
                self.store.clear_poison();
                poisoned.into_inner()
            }
        };
        f(&**guard)
    }

    /// True while some thread is inside [`StoreLock::with`].
    pub fn is_locked(&self) -> bool {
        matches!(self.store.try_lock(), Err(TryLockError::WouldBlock))
    }
}

impl std::fmt::Debug for StoreLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreLock")
            .field("locked", &self.is_locked())
            .finish()
    }
}
