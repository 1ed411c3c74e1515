//! Field metadata: the static tag table a settings type declares, and the
//! per-call descriptors the introspector derives from it.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// The option inside a `config` tag that marks a field as required.
pub const REQUIRED_MARKER: &str = "required";

/// A flat settings struct whose fields are all strings.
///
/// Usually implemented with `#[derive(Settings)]`:
///
/// ```ignore
/// #[derive(Debug, Default, Serialize, Deserialize, Settings)]
/// struct AppConfig {
///     #[setting(default = "x")]
///     a: String,
///     #[setting(env = "B_VAR", config = "required")]
///     b: String,
/// }
/// ```
///
/// Hand-written impls list the same metadata with [`FieldTag`]'s const
/// builders. Field names are the names serde serializes the fields under.
pub trait Settings: Serialize + DeserializeOwned {
    /// One entry per field. Fields without tags may be omitted.
    const FIELDS: &'static [FieldTag];
}

/// Compile-time tags attached to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTag {
    pub name: &'static str,
    pub default: Option<&'static str>,
    pub env: Option<&'static str>,
    pub config: Option<&'static str>,
}

impl FieldTag {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            default: None,
            env: None,
            config: None,
        }
    }

    pub const fn default(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    pub const fn env(mut self, name: &'static str) -> Self {
        self.env = Some(name);
        self
    }

    /// Free-form option list, e.g. `"required"` or `"required,secret"`.
    pub const fn config(mut self, options: &'static str) -> Self {
        self.config = Some(options);
        self
    }

    /// Whether one of the comma-separated `config` options is `required`.
    pub fn is_required(&self) -> bool {
        self.config.is_some_and(|options| {
            options
                .split(',')
                .any(|option| option.trim() == REQUIRED_MARKER)
        })
    }
}

/// Resolution rule for one field, derived once per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub default: Option<String>,
    pub env: Option<String>,
    pub required: bool,
}

impl FieldDescriptor {
    pub(crate) fn untagged(name: &str) -> Self {
        Self {
            name: name.to_string(),
            default: None,
            env: None,
            required: false,
        }
    }

    pub(crate) fn from_tag(tag: &FieldTag) -> Self {
        Self {
            name: tag.name.to_string(),
            default: tag.default.map(str::to_string),
            env: tag.env.map(str::to_string),
            required: tag.is_required(),
        }
    }
}

/// Descriptors for every field of a settings struct, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn defaults(&self) -> BTreeMap<&str, &str> {
        self.fields
            .iter()
            .filter_map(|f| Some((f.name.as_str(), f.default.as_deref()?)))
            .collect()
    }

    pub fn env_bindings(&self) -> BTreeMap<&str, &str> {
        self.fields
            .iter()
            .filter_map(|f| Some((f.name.as_str(), f.env.as_deref()?)))
            .collect()
    }

    pub fn required_fields(&self) -> BTreeMap<&str, bool> {
        self.fields
            .iter()
            .map(|f| (f.name.as_str(), f.required))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Format of the optional config file layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    #[cfg(feature = "json")]
    Json,
    /// `KEY=value` lines, same grammar as the bootstrap env file.
    Env,
}

/// Which layer supplied a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Override,
    Binding,
    File,
    Environment,
    Default,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_every_tag() {
        const TAG: FieldTag = FieldTag::new("b")
            .default("x")
            .env("B_VAR")
            .config("required");
        assert_eq!(TAG.name, "b");
        assert_eq!(TAG.default, Some("x"));
        assert_eq!(TAG.env, Some("B_VAR"));
        assert!(TAG.is_required());
    }

    #[test]
    fn required_matches_whole_option() {
        assert!(FieldTag::new("a").config("secret, required").is_required());
        assert!(!FieldTag::new("a").config("notrequired").is_required());
        assert!(!FieldTag::new("a").config("").is_required());
        assert!(!FieldTag::new("a").is_required());
    }

    #[test]
    fn schema_maps_skip_missing_tags() {
        let schema = Schema {
            fields: vec![
                FieldDescriptor::from_tag(&FieldTag::new("a").default("x")),
                FieldDescriptor::from_tag(&FieldTag::new("b").env("B_VAR").config("required")),
                FieldDescriptor::untagged("c"),
            ],
        };
        assert_eq!(schema.field_names(), vec!["a", "b", "c"]);
        assert_eq!(schema.defaults(), BTreeMap::from([("a", "x")]));
        assert_eq!(schema.env_bindings(), BTreeMap::from([("b", "B_VAR")]));
        assert_eq!(
            schema.required_fields(),
            BTreeMap::from([("a", false), ("b", true), ("c", false)])
        );
        assert!(schema.get("c").is_some());
        assert!(schema.get("d").is_none());
    }
}
