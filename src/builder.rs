use std::path::{Path, PathBuf};

use crate::env::{Environment, ProcessEnv};
use crate::error::TagfigError;
use crate::resolve::{self, Resolution, ResolveOptions};
use crate::source::{LayeredSource, ValueSource};
use crate::types::{ConfigFormat, Settings};
use crate::validate;

/// Entry point for configurable resolution.
pub struct Tagfig;

impl Tagfig {
    pub fn builder() -> TagfigBuilder<ProcessEnv> {
        TagfigBuilder::new(ProcessEnv)
    }
}

/// Builder for resolving settings structs.
///
/// The builder holds options only; every [`resolve()`](Self::resolve) builds
/// a fresh [`LayeredSource`], so one builder can populate any number of
/// structs.
///
/// ```ignore
/// let config: AppConfig = Tagfig::builder()
///     .config_file("/etc/myapp/app.toml")
///     .env_prefix("MYAPP")
///     .load()?;
/// ```
#[derive(Debug, Clone)]
pub struct TagfigBuilder<E: Environment = ProcessEnv> {
    env: E,
    config_file: Option<PathBuf>,
    config_format: Option<ConfigFormat>,
    env_prefix: Option<String>,
    automatic_env: bool,
    allow_empty_env: bool,
    strict: bool,
    overrides: Vec<(String, String)>,
}

impl<E: Environment> TagfigBuilder<E> {
    fn new(env: E) -> Self {
        Self {
            env,
            config_file: None,
            config_format: None,
            env_prefix: None,
            automatic_env: true,
            allow_empty_env: false,
            strict: false,
            overrides: Vec::new(),
        }
    }

    /// Read this file as the config file layer. A missing file is an error.
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the config file format instead of detecting it from the extension.
    pub fn config_format(mut self, format: ConfigFormat) -> Self {
        self.config_format = Some(format);
        self
    }

    /// Prefix for automatic env lookup: `MYAPP` makes field `port` read
    /// `MYAPP_PORT`. Explicit `env` bindings are used as written.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Read environment variables from `env` instead of the process.
    pub fn env<E2: Environment>(self, env: E2) -> TagfigBuilder<E2> {
        TagfigBuilder {
            env,
            config_file: self.config_file,
            config_format: self.config_format,
            env_prefix: self.env_prefix,
            automatic_env: self.automatic_env,
            allow_empty_env: self.allow_empty_env,
            strict: self.strict,
            overrides: self.overrides,
        }
    }

    /// Disable automatic lookup by field name. Explicit bindings still apply.
    pub fn no_automatic_env(mut self) -> Self {
        self.automatic_env = false;
        self
    }

    /// Treat empty environment values as set (default: `false`).
    pub fn allow_empty_env(mut self, allow: bool) -> Self {
        self.allow_empty_env = allow;
        self
    }

    /// Enable or disable strict mode (default: `false`).
    /// In strict mode, config file keys that match no field produce errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Add an override, the highest-priority layer. `None` values are ignored
    /// (useful for optional CLI args).
    pub fn set_override<V: Into<String>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.overrides.push((key.to_string(), v.into()));
        }
        self
    }

    /// A value source programmed with this builder's options.
    pub fn source(&self) -> LayeredSource<&E> {
        let mut source = LayeredSource::new(&self.env).with_allow_empty_env(self.allow_empty_env);
        if let Some(prefix) = &self.env_prefix {
            source = source.with_env_prefix(prefix.as_str());
        }
        if let Some(format) = self.config_format {
            source = source.with_config_format(format);
        }
        for (key, value) in &self.overrides {
            source.set_override(key, value);
        }
        source
    }

    fn options(&self) -> ResolveOptions {
        ResolveOptions {
            config_file: self.config_file.clone(),
            automatic_env: self.automatic_env,
            strict: self.strict,
        }
    }

    /// Populate `target`. On error `target` is left unchanged.
    pub fn resolve<T: Settings>(&self, target: &mut T) -> Result<Resolution, TagfigError> {
        let mut source = self.source();
        resolve::resolve_with(target, &mut source, &self.options())
    }

    /// Resolve into a fresh `T::default()` and validate required fields.
    pub fn load<T: Settings + Default>(&self) -> Result<T, TagfigError> {
        let mut target = T::default();
        self.resolve(&mut target)?;
        validate::validate(&target)?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::fixtures::test::{Credentials, Params, Scenario, env};
    use crate::types::Origin;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let builder = Tagfig::builder();
        assert!(builder.config_file.is_none());
        assert!(builder.automatic_env);
        assert!(!builder.allow_empty_env);
        assert!(!builder.strict);
        assert!(builder.overrides.is_empty());
    }

    #[test]
    fn set_override_some_added() {
        let builder = Tagfig::builder().set_override("b", Some("forced"));
        assert_eq!(builder.overrides, vec![("b".to_string(), "forced".to_string())]);
    }

    #[test]
    fn set_override_none_skipped() {
        let builder = Tagfig::builder().set_override::<String>("b", None);
        assert!(builder.overrides.is_empty());
    }

    #[test]
    fn env_swap_keeps_options() {
        let builder = Tagfig::builder()
            .env_prefix("MYAPP")
            .strict(true)
            .env(env(&[]));
        assert_eq!(builder.env_prefix.as_deref(), Some("MYAPP"));
        assert!(builder.strict);
    }

    #[test]
    fn resolve_with_custom_env() {
        let mut scenario = Scenario::default();
        let resolution = Tagfig::builder()
            .env(env(&[("B_VAR", "hello")]))
            .resolve(&mut scenario)
            .unwrap();
        assert_eq!(scenario.a, "x");
        assert_eq!(scenario.b, "hello");
        assert_eq!(resolution.origin("a"), Some(Origin::Default));
    }

    #[test]
    fn env_prefix_applies_to_automatic_lookup_only() {
        let mut params = Params::default();
        Tagfig::builder()
            .env(env(&[
                ("PARAMETER_1", "bound"),
                ("APP_PARAMETER2", "prefixed"),
                ("PARAMETER2", "bare"),
            ]))
            .env_prefix("APP")
            .resolve(&mut params)
            .unwrap();
        assert_eq!(params.parameter1, "bound");
        assert_eq!(params.parameter2, "prefixed");
    }

    #[test]
    fn no_automatic_env_keeps_default() {
        let mut params = Params::default();
        Tagfig::builder()
            .env(env(&[("PARAMETER2", "bare")]))
            .no_automatic_env()
            .resolve(&mut params)
            .unwrap();
        assert_eq!(params.parameter2, "two");
    }

    #[test]
    fn allow_empty_env_keeps_empty_binding() {
        let mut params = Params::default();
        Tagfig::builder()
            .env(env(&[("PARAMETER_1", "")]))
            .allow_empty_env(true)
            .resolve(&mut params)
            .unwrap();
        assert_eq!(params.parameter1, "");

        Tagfig::builder()
            .env(env(&[("PARAMETER_1", "")]))
            .resolve(&mut params)
            .unwrap();
        assert_eq!(params.parameter1, "one");
    }

    #[test]
    fn override_beats_env_and_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(&path, "b = \"file\"\n").unwrap();

        let mut scenario = Scenario::default();
        Tagfig::builder()
            .env(env(&[("B_VAR", "env")]))
            .config_file(&path)
            .set_override("b", Some("cli"))
            .resolve(&mut scenario)
            .unwrap();
        assert_eq!(scenario.b, "cli");
    }

    #[test]
    fn load_returns_validated_struct() {
        let scenario: Scenario = Tagfig::builder()
            .env(env(&[("B_VAR", "hello")]))
            .load()
            .unwrap();
        assert_eq!(
            scenario,
            Scenario {
                b: "hello".into(),
                a: "x".into(),
            }
        );
    }

    #[test]
    fn load_reports_all_missing_fields() {
        let err = Tagfig::builder()
            .env(env(&[("PASSWORD", "secret")]))
            .load::<Credentials>()
            .unwrap_err();
        let fields: Vec<&str> = err
            .violations()
            .unwrap()
            .iter()
            .map(|v| v.field.as_str())
            .collect();
        assert_eq!(fields, vec!["token", "user"]);
    }

    #[test]
    fn env_config_file_layer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "b=from-dotenv\n").unwrap();

        let scenario: Scenario = Tagfig::builder()
            .env(env(&[]))
            .config_file(&path)
            .load()
            .unwrap();
        assert_eq!(scenario.b, "from-dotenv");
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_config_file_layer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.json");
        fs::write(&path, r#"{"a": "from-json", "b": "set"}"#).unwrap();

        let scenario: Scenario = Tagfig::builder()
            .env(env(&[]))
            .config_file(&path)
            .strict(true)
            .load()
            .unwrap();
        assert_eq!(scenario.a, "from-json");
        assert_eq!(scenario.b, "set");
    }

    #[test]
    fn config_format_overrides_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.cfg");
        fs::write(&path, "b = \"toml-body\"\n").unwrap();

        let builder = Tagfig::builder().env(env(&[])).config_file(&path);
        let mut scenario = Scenario::default();
        assert!(matches!(
            builder.resolve(&mut scenario),
            Err(TagfigError::ConfigLoad {
                source: LoadError::UnsupportedFormat(_),
                ..
            })
        ));

        builder
            .config_format(ConfigFormat::Toml)
            .resolve(&mut scenario)
            .unwrap();
        assert_eq!(scenario.b, "toml-body");
    }

    #[test]
    fn builder_is_reusable() {
        let builder = Tagfig::builder().env(env(&[("B_VAR", "hello")]));
        let first: Scenario = builder.load().unwrap();
        let second: Scenario = builder.load().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn source_reflects_builder_options() {
        let builder = Tagfig::builder()
            .env(env(&[("APP_A", "auto")]))
            .env_prefix("APP")
            .set_override("b", Some("forced"));
        let mut source = builder.source();
        source.automatic_env();
        assert_eq!(source.get_string("a"), "auto");
        assert_eq!(source.get_string("b"), "forced");
    }
}
