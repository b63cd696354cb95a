//! Schema
//!
//! The fixed key set of a store and, per key, its default value, validation
//! rule and optional description. Stores receive their schema through the
//! [`SchemaProvider`] trait; [`StaticSchema`] is the in-code implementation.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Sentinel marking a key whose values must be base-10 integers.
pub const INT_SENTINEL: &str = ":int:";
/// Sentinel marking a key whose values must be `true` or `false`.
pub const BOOL_SENTINEL: &str = ":bool:";
/// Sentinel marking a key whose values must be double-quoted paths.
pub const PATH_SENTINEL: &str = ":path:";

/// Validation rule attached to a configuration key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRule {
    /// No valid-value set declared; every value is accepted.
    Any,
    /// `:int:` sentinel.
    Int,
    /// `:bool:` sentinel.
    Bool,
    /// `:path:` sentinel.
    Path,
    /// Literal enumeration of accepted values.
    OneOf(Vec<String>),
}

impl ValidationRule {
    /// Build a rule from a raw valid-value list.
    ///
    /// A single-element list holding a sentinel becomes that sentinel.
    /// Anything else is a literal enumeration.
    pub fn from_values<S: AsRef<str>>(values: &[S]) -> Self {
        if let [only] = values {
            match only.as_ref() {
                INT_SENTINEL => return ValidationRule::Int,
                BOOL_SENTINEL => return ValidationRule::Bool,
                PATH_SENTINEL => return ValidationRule::Path,
                _ => {}
            }
        }
        ValidationRule::OneOf(values.iter().map(|v| v.as_ref().to_string()).collect())
    }

    /// Literal values to show as a "Valid values" hint in the file, if any.
    ///
    /// Sentinels are never rendered. A lone `:name:` marker the evaluator does
    /// not recognize is not rendered either.
    pub fn hint(&self) -> Option<&[String]> {
        match self {
            ValidationRule::OneOf(values) => match values.as_slice() {
                [only] if only.starts_with(':') && only.ends_with(':') => None,
                all => Some(all),
            },
            _ => None,
        }
    }

    /// Short human name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationRule::Any => "any",
            ValidationRule::Int => INT_SENTINEL,
            ValidationRule::Bool => BOOL_SENTINEL,
            ValidationRule::Path => PATH_SENTINEL,
            ValidationRule::OneOf(_) => "enumeration",
        }
    }
}

/// Source of a store's schema
///
/// Implementations must return the same key set and answers for the whole
/// lifetime of a store. Defaults are expected to satisfy their own rule; the
/// store does not check this.
pub trait SchemaProvider: Send + Sync {
    /// Every key with its default value.
    fn default_values(&self) -> Vec<(String, String)>;

    /// Path of the backing text file.
    fn file_path(&self) -> PathBuf;

    /// Human-readable description, possibly spanning several lines.
    fn description(&self, key: &str) -> Option<String>;

    /// Validation rule for `key`.
    fn valid_values(&self, key: &str) -> ValidationRule;
}

/// One key of a [`StaticSchema`]
#[derive(Debug, Clone)]
pub struct KeySpec {
    pub key: String,
    pub default: String,
    pub description: Option<String>,
    pub rule: ValidationRule,
}

impl KeySpec {
    pub fn new(key: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default: default.into(),
            description: None,
            rule: ValidationRule::Any,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.rule = rule;
        self
    }

    /// Restrict the key to a literal enumeration (or a sentinel, if the list
    /// is a single sentinel marker).
    pub fn valid<S: AsRef<str>>(self, values: &[S]) -> Self {
        self.rule(ValidationRule::from_values(values))
    }
}

/// In-code schema: a list of [`KeySpec`]s plus a file path
#[derive(Debug, Clone)]
pub struct StaticSchema {
    path: PathBuf,
    keys: Vec<KeySpec>,
}

impl StaticSchema {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            keys: Vec::new(),
        }
    }

    /// Place the file in the platform config directory of `app_name`,
    /// e.g. `~/.config/<app_name>/<file_name>` on Linux.
    ///
    /// Returns `None` when no home directory can be determined.
    pub fn in_config_dir(app_name: &str, file_name: &str) -> Option<Self> {
        ProjectDirs::from("", "", app_name)
            .map(|dirs| Self::new(dirs.config_dir().join(file_name)))
    }

    /// Add a key. A later spec for the same key replaces the earlier one.
    pub fn with_key(mut self, spec: KeySpec) -> Self {
        self.keys.retain(|existing| existing.key != spec.key);
        self.keys.push(spec);
        self
    }

    fn find(&self, key: &str) -> Option<&KeySpec> {
        self.keys.iter().find(|spec| spec.key == key)
    }
}

impl SchemaProvider for StaticSchema {
    fn default_values(&self) -> Vec<(String, String)> {
        self.keys
            .iter()
            .map(|spec| (spec.key.clone(), spec.default.clone()))
            .collect()
    }

    fn file_path(&self) -> PathBuf {
        self.path.clone()
    }

    fn description(&self, key: &str) -> Option<String> {
        self.find(key).and_then(|spec| spec.description.clone())
    }

    fn valid_values(&self, key: &str) -> ValidationRule {
        self.find(key)
            .map(|spec| spec.rule.clone())
            .unwrap_or(ValidationRule::Any)
    }
}
