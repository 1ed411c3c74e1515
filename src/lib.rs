//! Declarative binding of flat string settings structs to environment
//! variables, an optional config file and compiled defaults.
//!
//! Tag the fields, hand tagfig a `&mut` to the struct, and every field comes
//! back holding the value its highest-priority source supplied.
//!
//! ```ignore
//! use serde::{Deserialize, Serialize};
//! use tagfig::Settings;
//!
//! #[derive(Debug, Default, Serialize, Deserialize, Settings)]
//! struct AppConfig {
//!     #[setting(default = "x")]
//!     a: String,
//!     #[setting(env = "B_VAR", config = "required")]
//!     b: String,
//! }
//!
//! let mut config = AppConfig::default();
//! tagfig::resolve(&mut config, None)?;
//! tagfig::validate(&config)?;
//! ```
//!
//! With `B_VAR=hello` in the environment, `config.a == "x"` and
//! `config.b == "hello"`. Without it, `b` resolves to `""` and
//! [`validate`] fails naming `b`.
//!
//! # Tags
//!
//! | Attribute | Meaning |
//! |-----------|---------|
//! | `default = "v"` | value used when no other source has the field |
//! | `env = "NAME"` | read the field from env var `NAME` |
//! | `config = "opts"` | comma-separated options; `required` makes the field mandatory |
//! | `required` | shorthand for `config = "required"` |
//!
//! A field is required when one option of its `config` list, trimmed, is
//! exactly `required`. `config = "required,secret"` is required;
//! `config = "notrequired"` is not.
//!
//! The derive only writes the static [`Settings::FIELDS`] table. Types that
//! cannot use the derive list the same tags by hand with [`FieldTag`]:
//!
//! ```ignore
//! impl tagfig::Settings for AppConfig {
//!     const FIELDS: &'static [FieldTag] = &[
//!         FieldTag::new("a").default("x"),
//!         FieldTag::new("b").env("B_VAR").config("required"),
//!     ];
//! }
//! ```
//!
//! # Supported shapes
//!
//! The target must be a braced struct whose fields all serialize as strings
//! (`String`, or a newtype around one). Anything
//! else is rejected with a [`ShapeError`] before a single value is read:
//!
//! - `None`, scalars, sequences, maps, tuple and unit structs fail the
//!   shape guard ([`check_shape`]).
//! - Numeric, boolean, `Option`, collection or nested-struct fields fail
//!   introspection ([`describe`]) with the offending field and its kind.
//!
//! Parse numbers and flags from the resolved strings in your own code.
//!
//! # Layer precedence
//!
//! ```text
//! (absent)              ""
//!        ↑ overridden by
//! Defaults              #[setting(default = ...)]
//!        ↑ overridden by
//! Automatic env lookup  FIELD or PREFIX_FIELD (upper-cased field name)
//!        ↑ overridden by
//! Config file           top-level key equal to the field name
//!        ↑ overridden by
//! Explicit binding      #[setting(env = "NAME")]
//!        ↑ overridden by
//! Overrides             .set_override()
//! ```
//!
//! An empty environment value counts as unset, so `B_VAR=` falls through to
//! the layers below. [`allow_empty_env(true)`](TagfigBuilder::allow_empty_env)
//! turns that off.
//!
//! [`Resolution`], returned by every resolve call, records which layer won
//! for each field.
//!
//! # No partial writes
//!
//! Resolution computes every field first and assigns the whole struct at the
//! end. A shape error, a missing or malformed config file, or a strict-mode
//! failure leaves the target exactly as it was.
//!
//! # Config files
//!
//! The format follows the extension: `.toml`, `.json` (with the default
//! `json` feature), `.env` or a file named `.env*`.
//! [`config_format()`](TagfigBuilder::config_format) overrides detection.
//! Top-level scalars map to fields by name; tables and arrays are rejected.
//!
//! Strict mode is **off by default**. With
//! [`.strict(true)`](TagfigBuilder::strict), file keys that match no field
//! fail the load with their line numbers:
//!
//! ```text
//! Failed to load config file /etc/myapp/app.toml: unknown key 'typo' (line 5)
//! ```
//!
//! # Validation
//!
//! [`validate`] is independent of resolution: it checks whatever the struct
//! holds right now and reports **every** empty required field in one
//! [`ValidationError`], in field-name order. Its
//! [`violations`](ValidationError::violations) are structured records;
//! `Display` joins them one per line.
//!
//! # Bootstrap env files
//!
//! [`load_env_file`] reads `KEY=value` lines (lines that are not exactly one
//! `=` are skipped). Seed an in-memory [`MapEnv`] with
//! [`MapEnv::extend_from_file`] and pass it to
//! [`TagfigBuilder::env`], or, during single-threaded startup, write the
//! pairs into the process environment with the `unsafe`
//! [`set_env_from_file`].
//!
//! # Logging
//!
//! tagfig emits `tracing` events (file loads and resolution summaries at
//! debug, per-field origins at trace) and never logs values. Install a
//! subscriber to see them.
//!
//! # Error handling
//!
//! All fallible operations return [`TagfigError`]. The crate never retries,
//! logs or swallows an error. See the [`error`] module for the full set.

extern crate self as tagfig;

pub mod error;
pub mod types;

mod builder;
mod dotenv;
mod env;
mod file;
mod introspect;
mod resolve;
mod shape;
mod source;
mod validate;

#[cfg(test)]
mod fixtures;

pub use builder::{Tagfig, TagfigBuilder};
pub use dotenv::{load_env_file, parse_env_lines, set_env_from_file};
pub use env::{Environment, MapEnv, ProcessEnv, automatic_env_name};
pub use error::{
    LoadError, ShapeError, TagfigError, UnknownKey, ValidationError, Violation, ViolationReason,
};
pub use introspect::{describe, field_values};
pub use resolve::{Resolution, ResolvedField, apply_defaults, resolve};
pub use shape::check_shape;
pub use source::{LayeredSource, ValueSource};
pub use tagfig_derive::Settings;
pub use types::{ConfigFormat, FieldDescriptor, FieldTag, Origin, Schema, Settings};
pub use validate::validate;
