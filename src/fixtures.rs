#[cfg(test)]
pub mod test {
    use serde::{Deserialize, Serialize};

    use crate::{FieldTag, MapEnv, Settings};

    /// `a` has a default, `b` is bound to `B_VAR` and required. Declared out
    /// of order so sorting is observable.
    #[derive(Settings, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct Scenario {
        #[setting(env = "B_VAR", config = "required")]
        pub b: String,

        #[setting(default = "x")]
        pub a: String,
    }

    #[derive(Settings, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct Params {
        #[setting(env = "PARAMETER_1", default = "one")]
        pub parameter1: String,

        #[setting(default = "two", required)]
        pub parameter2: String,

        #[setting(env = "PARAMETER_3", config = "required")]
        pub parameter3: String,
    }

    /// Every field is required and none has a source besides the environment.
    #[derive(Settings, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct Credentials {
        #[setting(required)]
        pub user: String,

        #[setting(required)]
        pub password: String,

        #[setting(config = "required,secret")]
        pub token: String,

        pub comment: String,
    }

    /// Serialized names differ from the Rust idents.
    #[derive(Settings, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(rename_all = "UPPERCASE")]
    pub struct Renamed {
        #[setting(default = "x")]
        pub host: String,

        #[serde(rename = "listen_addr")]
        #[setting(default = ":80", required)]
        pub addr: String,

        #[setting(env = "APP_TOKEN", required)]
        pub token: String,
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct Mixed {
        pub name: String,
        pub port: u16,
        pub debug: bool,
        pub tags: Vec<String>,
        pub proxy: Option<String>,
    }

    impl Settings for Mixed {
        const FIELDS: &'static [FieldTag] = &[FieldTag::new("name").default("svc")];
    }

    /// Tags a field the struct does not have.
    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct Mistagged {
        pub host: String,
    }

    impl Settings for Mistagged {
        const FIELDS: &'static [FieldTag] = &[
            FieldTag::new("host").default("localhost"),
            FieldTag::new("hots").env("HOST"),
        ];
    }

    #[derive(Serialize, Debug, Clone, PartialEq)]
    pub struct Host(pub String);

    #[derive(Serialize, Debug, Clone, PartialEq)]
    pub struct Wrapped {
        pub host: Host,
    }

    pub fn env(pairs: &[(&str, &str)]) -> MapEnv {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn derive_emits_tags_in_declaration_order() {
        assert_eq!(
            Scenario::FIELDS,
            &[
                FieldTag::new("b").env("B_VAR").config("required"),
                FieldTag::new("a").default("x"),
            ]
        );
    }

    #[test]
    fn derive_folds_required_flag_into_config() {
        assert_eq!(Credentials::FIELDS[0].config, Some("required"));
        assert_eq!(Credentials::FIELDS[2].config, Some("required,secret"));
        assert_eq!(Credentials::FIELDS[3], FieldTag::new("comment"));
        assert!(Params::FIELDS[1].is_required());
    }

    #[test]
    fn derive_uses_serialized_names() {
        let names: Vec<&str> = Renamed::FIELDS.iter().map(|tag| tag.name).collect();
        assert_eq!(names, vec!["HOST", "listen_addr", "TOKEN"]);
    }
}
