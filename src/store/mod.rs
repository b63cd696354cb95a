//! Config Store
//!
//! Holds the current value of every schema key, repairs invalid values to
//! their defaults, and mirrors the whole table to a text file after every
//! change.

pub mod persistence;

pub use persistence::{FileOpener, FsOpener};

use crate::error::StoreError;
use crate::schema::{SchemaProvider, ValidationRule};
use crate::validation::unquote_path;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Self-healing key-value configuration store
///
/// The key set is fixed by the schema at construction. All reads, writes and
/// file I/O run under one lock, so a store can be shared between threads
/// behind an `Arc`.
pub struct ConfigStore {
    schema: Box<dyn SchemaProvider>,
    opener: Box<dyn FileOpener>,
    path: PathBuf,
    defaults: HashMap<String, String>,
    values: Mutex<BTreeMap<String, String>>,
}

impl ConfigStore {
    /// Open the store backed by the real filesystem.
    ///
    /// Loads defaults from `schema`, merges the existing file if there is one
    /// and rewrites it in canonical form. I/O problems are logged, never
    /// returned: the store always comes up with valid values.
    pub fn open(schema: impl SchemaProvider + 'static) -> Self {
        Self::with_opener(schema, FsOpener)
    }

    /// Open the store, writing through `opener`.
    pub fn with_opener(
        schema: impl SchemaProvider + 'static,
        opener: impl FileOpener + 'static,
    ) -> Self {
        let defaults: HashMap<String, String> = schema.default_values().into_iter().collect();
        let values: BTreeMap<String, String> = defaults.clone().into_iter().collect();
        let path = schema.file_path();

        let store = Self {
            schema: Box::new(schema),
            opener: Box::new(opener),
            path,
            defaults,
            values: Mutex::new(values),
        };

        {
            let mut values = store.values.lock();
            store.load_locked(&mut values);
            store.persist_locked(&values);
        }
        info!(path = %store.path.display(), keys = store.defaults.len(), "Config store opened");
        store
    }

    /// Merge the file into `values`. Cannot fail for a store built from a
    /// single default table, so a schema error here is only logged.
    fn load_locked(&self, values: &mut BTreeMap<String, String>) {
        if let Err(e) = persistence::read_and_merge(
            &self.path,
            values,
            &self.defaults,
            self.schema.as_ref(),
        ) {
            warn!(error = %e, "Config file merge aborted");
        }
    }

    fn persist_locked(&self, values: &BTreeMap<String, String>) -> bool {
        persistence::write_to_file(&self.path, values, self.schema.as_ref(), self.opener.as_ref())
    }

    fn default_for(&self, key: &str) -> Result<&String, StoreError> {
        self.defaults
            .get(key)
            .ok_or_else(|| StoreError::MissingDefault(key.to_string()))
    }

    /// Return the value of `key` if valid, otherwise repair it to the default,
    /// persist, and return the default. Caller holds the lock.
    fn get_locked(
        &self,
        values: &mut BTreeMap<String, String>,
        key: &str,
    ) -> Result<String, StoreError> {
        let current = values
            .get(key)
            .ok_or_else(|| StoreError::UnknownKey(key.to_string()))?;

        if self.is_valid(key, current) {
            return Ok(current.clone());
        }

        let default = self.default_for(key)?.clone();
        info!(key, value = %current, default = %default, "Repairing invalid config value");
        values.insert(key.to_string(), default.clone());
        self.persist_locked(values);
        Ok(default)
    }

    /// Current value of `key`, repaired to its default first if invalid.
    pub fn get(&self, key: &str) -> Result<String, StoreError> {
        let mut values = self.values.lock();
        self.get_locked(&mut values, key)
    }

    /// Store `value` verbatim and rewrite the file.
    ///
    /// No validation happens here; an invalid value is repaired by the next
    /// [`get`](Self::get) or the next time the file is read. A failed write
    /// is logged and the in-memory value is kept.
    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<(), StoreError> {
        let value = value.into();
        let mut values = self.values.lock();
        let slot = values
            .get_mut(key)
            .ok_or_else(|| StoreError::UnknownKey(key.to_string()))?;

        if value.contains(['\r', '\n']) {
            warn!(key, "Config value contains a line break and will not survive a reload");
        }
        *slot = value;
        self.persist_locked(&values);
        Ok(())
    }

    fn expect_rule(&self, key: &str, expected: ValidationRule) -> Result<(), StoreError> {
        if !self.defaults.contains_key(key) {
            return Err(StoreError::UnknownKey(key.to_string()));
        }
        if self.schema.valid_values(key) != expected {
            return Err(StoreError::RuleMismatch {
                key: key.to_string(),
                expected: expected.kind(),
            });
        }
        Ok(())
    }

    /// Value of an `:int:` key.
    pub fn get_int(&self, key: &str) -> Result<i32, StoreError> {
        self.expect_rule(key, ValidationRule::Int)?;
        let value = self.get(key)?;
        value.parse().map_err(|_| StoreError::RuleMismatch {
            key: key.to_string(),
            expected: ValidationRule::Int.kind(),
        })
    }

    /// Value of a `:bool:` key.
    pub fn get_bool(&self, key: &str) -> Result<bool, StoreError> {
        self.expect_rule(key, ValidationRule::Bool)?;
        Ok(self.get(key)? == "true")
    }

    /// Value of a `:path:` key with the surrounding quotes removed.
    pub fn get_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        self.expect_rule(key, ValidationRule::Path)?;
        let value = self.get(key)?;
        Ok(PathBuf::from(unquote_path(&value)))
    }

    /// Whether `value` satisfies the rule declared for `key`.
    pub fn is_valid(&self, key: &str, value: &str) -> bool {
        self.schema.valid_values(key).accepts(value)
    }

    /// Every value, with invalid ones repaired (and persisted) first.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        let mut values = self.values.lock();
        let mut repaired = false;
        for (key, value) in values.iter_mut() {
            if self.schema.valid_values(key).accepts(value) {
                continue;
            }
            if let Some(default) = self.defaults.get(key) {
                info!(key = %key, value = %value, default = %default, "Repairing invalid config value");
                *value = default.clone();
                repaired = true;
            }
        }
        if repaired {
            self.persist_locked(&values);
        }
        values.clone()
    }

    /// Re-read the file, merging it over the current values, and rewrite it.
    ///
    /// Keys absent from the file keep their current in-memory value.
    pub fn reload(&self) {
        let mut values = self.values.lock();
        self.load_locked(&mut values);
        self.persist_locked(&values);
    }

    /// Schema keys in lexicographic order.
    pub fn keys(&self) -> Vec<String> {
        self.values.lock().keys().cloned().collect()
    }

    pub fn default_value(&self, key: &str) -> Result<&str, StoreError> {
        self.defaults
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| StoreError::UnknownKey(key.to_string()))
    }

    pub fn rule(&self, key: &str) -> Result<ValidationRule, StoreError> {
        if !self.defaults.contains_key(key) {
            return Err(StoreError::UnknownKey(key.to_string()));
        }
        Ok(self.schema.valid_values(key))
    }

    pub fn description(&self, key: &str) -> Result<Option<String>, StoreError> {
        if !self.defaults.contains_key(key) {
            return Err(StoreError::UnknownKey(key.to_string()));
        }
        Ok(self.schema.description(key))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("path", &self.path)
            .field("values", &*self.values.lock())
            .finish()
    }
}
