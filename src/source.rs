//! The value source the resolver programs and reads back.
//!
//! [`ValueSource`] is the contract; [`LayeredSource`] implements it over an
//! [`Environment`] and an optional config file. Lookup precedence, highest
//! first:
//!
//! ```text
//! Override            set_override()
//! Explicit binding    env var named by the field's `env` tag
//! Config file         top-level key equal to the field name
//! Automatic lookup    PREFIX_FIELD (upper-cased), once automatic_env() ran
//! Default             set_default()
//! (absent)            empty string
//! ```
//!
//! Empty environment values count as unset unless empty values are allowed,
//! so `B_VAR=` falls through to the layers below.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::env::{Environment, ProcessEnv, automatic_env_name};
use crate::error::{LoadError, UnknownKey};
use crate::file;
use crate::types::{ConfigFormat, Origin};

/// A key/value provider with defaults, bindings, automatic environment
/// lookup and an optional file layer.
pub trait ValueSource {
    /// Fallback used only when no other layer has `key`.
    fn set_default(&mut self, key: &str, value: &str);

    /// Look `key` up under an explicit external name.
    fn bind_env(&mut self, key: &str, env_name: &str);

    /// Look every key up in the environment by its own name from now on.
    fn automatic_env(&mut self);

    /// Highest-priority value for `key`.
    fn set_override(&mut self, key: &str, value: &str);

    /// File read by the next [`load`](Self::load).
    fn set_config_file(&mut self, path: &Path);

    /// Load the configured file. Does nothing when none is set.
    fn load(&mut self) -> Result<(), LoadError>;

    /// The winning value for `key` and the layer it came from.
    fn lookup(&self, key: &str) -> Option<(String, Origin)>;

    /// Keys present in the loaded file layer.
    fn file_keys(&self) -> Vec<&str>;

    fn get_string(&self, key: &str) -> String {
        self.lookup(key).map(|(value, _)| value).unwrap_or_default()
    }

    /// Whether any layer above the defaults supplies `key`.
    ///
    /// A key that only a registered default supplies is **not** set, unlike
    /// adapters that count defaults. [`lookup`](Self::lookup) reports
    /// defaults with [`Origin::Default`].
    fn is_set(&self, key: &str) -> bool {
        matches!(self.lookup(key), Some((_, origin)) if origin != Origin::Default)
    }

    /// File keys outside `known`. Implementations that keep the file text
    /// can report line numbers; this default reports line 0.
    fn unknown_file_keys(&self, known: &[&str]) -> Vec<UnknownKey> {
        self.file_keys()
            .into_iter()
            .filter(|key| !known.contains(key))
            .map(|key| UnknownKey {
                key: key.to_string(),
                line: 0,
            })
            .collect()
    }
}

/// [`ValueSource`] over an [`Environment`] and an optional config file.
#[derive(Debug, Clone)]
pub struct LayeredSource<E: Environment = ProcessEnv> {
    env: E,
    env_prefix: Option<String>,
    allow_empty_env: bool,
    automatic: bool,
    defaults: HashMap<String, String>,
    bindings: HashMap<String, String>,
    overrides: HashMap<String, String>,
    config_file: Option<PathBuf>,
    config_format: Option<ConfigFormat>,
    file_content: String,
    file_values: BTreeMap<String, String>,
}

impl Default for LayeredSource<ProcessEnv> {
    fn default() -> Self {
        Self::new(ProcessEnv)
    }
}

impl<E: Environment> LayeredSource<E> {
    pub fn new(env: E) -> Self {
        Self {
            env,
            env_prefix: None,
            allow_empty_env: false,
            automatic: false,
            defaults: HashMap::new(),
            bindings: HashMap::new(),
            overrides: HashMap::new(),
            config_file: None,
            config_format: None,
            file_content: String::new(),
            file_values: BTreeMap::new(),
        }
    }

    /// Prefix for automatic lookup: field `port` with prefix `MYAPP` reads
    /// `MYAPP_PORT`.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Treat empty environment values as set (default: `false`).
    pub fn with_allow_empty_env(mut self, allow: bool) -> Self {
        self.allow_empty_env = allow;
        self
    }

    /// Skip extension-based format detection for the config file.
    pub fn with_config_format(mut self, format: ConfigFormat) -> Self {
        self.config_format = Some(format);
        self
    }

    fn env_value(&self, name: &str) -> Option<String> {
        self.env
            .var(name)
            .filter(|value| self.allow_empty_env || !value.is_empty())
    }
}

impl<E: Environment> ValueSource for LayeredSource<E> {
    fn set_default(&mut self, key: &str, value: &str) {
        self.defaults.insert(key.to_string(), value.to_string());
    }

    fn bind_env(&mut self, key: &str, env_name: &str) {
        self.bindings.insert(key.to_string(), env_name.to_string());
    }

    fn automatic_env(&mut self) {
        self.automatic = true;
    }

    fn set_override(&mut self, key: &str, value: &str) {
        self.overrides.insert(key.to_string(), value.to_string());
    }

    fn set_config_file(&mut self, path: &Path) {
        self.config_file = Some(path.to_path_buf());
    }

    fn load(&mut self) -> Result<(), LoadError> {
        let Some(path) = &self.config_file else {
            return Ok(());
        };
        let format = match self.config_format {
            Some(format) => format,
            None => file::detect_format(path)?,
        };
        let content = file::read_config_file(path)?;
        let values = file::parse_config(&content, format)?;

        tracing::debug!(
            path = %path.display(),
            ?format,
            keys = values.len(),
            "loaded config file"
        );

        self.file_content = content;
        self.file_values = values;
        Ok(())
    }

    fn lookup(&self, key: &str) -> Option<(String, Origin)> {
        if let Some(value) = self.overrides.get(key) {
            return Some((value.clone(), Origin::Override));
        }
        if let Some(value) = self.bindings.get(key).and_then(|name| self.env_value(name)) {
            return Some((value, Origin::Binding));
        }
        if let Some(value) = self.file_values.get(key) {
            return Some((value.clone(), Origin::File));
        }
        if self.automatic {
            let name = automatic_env_name(key, self.env_prefix.as_deref());
            if let Some(value) = self.env_value(&name) {
                return Some((value, Origin::Environment));
            }
        }
        self.defaults
            .get(key)
            .map(|value| (value.clone(), Origin::Default))
    }

    fn file_keys(&self) -> Vec<&str> {
        self.file_values.keys().map(String::as_str).collect()
    }

    fn unknown_file_keys(&self, known: &[&str]) -> Vec<UnknownKey> {
        file::unknown_keys(&self.file_content, &self.file_values, known.iter().copied())
    }
}
