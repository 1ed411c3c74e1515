//! Resolution pipeline: program a [`ValueSource`] from a struct's tags, read
//! every field back and write the result into the struct.
//!
//! 1. Shape guard and introspection
//! 2. Register defaults and explicit env bindings
//! 3. Load the config file, if any (strict mode rejects unknown keys)
//! 4. Enable automatic env lookup
//! 5. Look up every field, in name order
//! 6. Rebuild the struct from the resolved strings and assign it
//!
//! Nothing is written until step 6 succeeds, so a failure anywhere leaves the
//! target exactly as it was.

use std::fmt;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::builder::Tagfig;
use crate::error::{LoadError, ShapeError, TagfigError};
use crate::introspect;
use crate::source::ValueSource;
use crate::types::{Origin, Settings};

/// Populate `target` from its tags, the process environment and an optional
/// config file, using default options.
///
/// See [`TagfigBuilder`](crate::TagfigBuilder) for prefixes, strict mode,
/// overrides and custom environments.
pub fn resolve<T: Settings>(
    target: &mut T,
    config_file: Option<&Path>,
) -> Result<Resolution, TagfigError> {
    let mut builder = Tagfig::builder();
    if let Some(path) = config_file {
        builder = builder.config_file(path);
    }
    builder.resolve(target)
}

/// Write each declared default into its field; other fields keep their
/// current values.
pub fn apply_defaults<T: Settings>(target: &mut T) -> Result<(), TagfigError> {
    let snapshot = introspect::snapshot(target)?;

    let mut table = Table::new();
    for (name, value) in snapshot.values {
        let value = match snapshot.schema.get(&name).and_then(|f| f.default.clone()) {
            Some(default) => default,
            None => value,
        };
        table.insert(name, Value::String(value));
    }

    *target = rebuild(table)?;
    Ok(())
}

/// Pipeline switches that are not part of the value source itself.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResolveOptions {
    pub config_file: Option<PathBuf>,
    pub automatic_env: bool,
    pub strict: bool,
}

pub(crate) fn resolve_with<T: Settings, S: ValueSource>(
    target: &mut T,
    source: &mut S,
    options: &ResolveOptions,
) -> Result<Resolution, TagfigError> {
    // 1
    let snapshot = introspect::snapshot(target)?;
    let schema = snapshot.schema;

    // 2
    for field in &schema.fields {
        if let Some(default) = &field.default {
            source.set_default(&field.name, default);
        }
        if let Some(env) = &field.env {
            source.bind_env(&field.name, env);
        }
    }

    // 3
    if let Some(path) = &options.config_file {
        let load_error = |cause: LoadError| TagfigError::ConfigLoad {
            path: path.clone(),
            source: cause,
        };
        source.set_config_file(path);
        source.load().map_err(&load_error)?;
        if options.strict {
            let unknown = source.unknown_file_keys(&schema.field_names());
            if !unknown.is_empty() {
                return Err(load_error(LoadError::UnknownKeys(unknown)));
            }
        }
    }

    // 4
    if options.automatic_env {
        source.automatic_env();
    }

    // 5
    let mut fields = Vec::with_capacity(schema.fields.len());
    let mut table = Table::new();
    for field in &schema.fields {
        let (value, origin) = match source.lookup(&field.name) {
            Some((value, origin)) => (value, Some(origin)),
            None => (String::new(), None),
        };
        tracing::trace!(field = %field.name, ?origin, "resolved field");
        table.insert(field.name.clone(), Value::String(value.clone()));
        fields.push(ResolvedField {
            name: field.name.clone(),
            value,
            origin,
        });
    }

    // 6
    *target = rebuild(table)?;

    let resolution = Resolution { fields };
    tracing::debug!(
        fields = resolution.fields.len(),
        unset = resolution.unset().count(),
        "resolved settings"
    );
    Ok(resolution)
}

fn rebuild<T: Settings>(table: Table) -> Result<T, TagfigError> {
    T::deserialize(Value::Table(table))
        .map_err(|e| TagfigError::Shape(ShapeError::Custom(e.to_string())))
}

/// What a resolution pass wrote, one entry per field in name order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub fields: Vec<ResolvedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub name: String,
    pub value: String,
    /// `None` when no layer had the field and it fell back to `""`.
    pub origin: Option<Origin>,
}

impl Resolution {
    pub fn get(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn origin(&self, name: &str) -> Option<Origin> {
        self.get(name).and_then(|f| f.origin)
    }

    /// Fields no layer supplied.
    pub fn unset(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.origin.is_none())
            .map(|f| f.name.as_str())
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} = {}", field.name, field.value)?;
        }
        Ok(())
    }
}
