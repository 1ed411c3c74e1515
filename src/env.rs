//! External key/value namespace consulted for env bindings and automatic lookup.
//!
//! The process environment is process-wide shared state. [`ProcessEnv`] only
//! reads it; seeding it from a file is the `unsafe`
//! [`set_env_from_file`](crate::set_env_from_file), to be called before any
//! concurrent resolution begins. [`MapEnv`] is an owned store for tests and
//! for callers that would rather not touch the process at all.

use std::collections::BTreeMap;
use std::path::Path;

use crate::dotenv;
use crate::error::TagfigError;

/// A read-only view of an environment-like namespace.
pub trait Environment {
    fn var(&self, name: &str) -> Option<String>;
}

impl<E: Environment + ?Sized> Environment for &E {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// The current process environment. Non-unicode values read as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// An in-memory environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.vars.remove(name)
    }

    /// Seed from a bootstrap env file. Returns the number of pairs applied.
    pub fn extend_from_file(&mut self, path: impl AsRef<Path>) -> Result<usize, TagfigError> {
        let pairs = dotenv::load_env_file(path)?;
        let count = pairs.len();
        self.vars.extend(pairs);
        Ok(count)
    }
}

impl Environment for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

impl FromIterator<(String, String)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, String)> for MapEnv {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.vars.extend(iter);
    }
}

/// Name used for automatic lookup of `key`: upper-cased, joined to the prefix
/// with `_` when one is set.
///
/// `("port", None)` → `PORT`, `("port", Some("MYAPP"))` → `MYAPP_PORT`.
pub fn automatic_env_name(key: &str, prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => {
            let prefix = prefix.trim_end_matches('_');
            format!("{prefix}_{key}").to_uppercase()
        }
        _ => key.to_uppercase(),
    }
}
