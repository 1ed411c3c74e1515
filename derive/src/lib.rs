//! `#[derive(Settings)]` for tagfig.
//!
//! Generates the static field-tag table of `tagfig::Settings` from
//! `#[setting(...)]` field attributes. Field kinds are not checked here: the
//! runtime introspector rejects non-string fields before any value is read.
//!
//! Tag names follow serde's `rename` and `rename_all` attributes so they match
//! the names the struct serializes under.

use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Attribute, DeriveInput, Generics, Ident, LitStr, parse_macro_input};

/// Derive macro implementing `tagfig::Settings`.
///
/// # Field Attributes
/// - `#[setting(default = "value")]` - Value used when no other source has the field
/// - `#[setting(env = "EXTERNAL_NAME")]` - Bind the field to an explicitly named env var
/// - `#[setting(config = "required")]` - Free-form options; `required` marks the field mandatory
/// - `#[setting(required)]` - Shorthand for `config = "required"`
///
/// Keys combine freely:
/// ```ignore
/// #[derive(Serialize, Deserialize, Settings)]
/// pub struct AppConfig {
///     #[setting(default = "x")]
///     pub a: String,
///     #[setting(env = "B_VAR", config = "required")]
///     pub b: String,
/// }
/// ```
#[proc_macro_derive(Settings, attributes(setting))]
pub fn derive_settings(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    generate_impl(&input).into()
}

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(setting), forward_attrs(serde), supports(struct_named))]
struct SettingsOpts {
    ident: Ident,
    generics: Generics,
    attrs: Vec<Attribute>,
    data: darling::ast::Data<(), FieldOpts>,
}

#[derive(Debug, FromField)]
#[darling(attributes(setting), forward_attrs(serde))]
struct FieldOpts {
    ident: Option<Ident>,
    attrs: Vec<Attribute>,

    #[darling(default)]
    default: Option<String>,

    #[darling(default)]
    env: Option<String>,

    #[darling(default)]
    config: Option<String>,

    #[darling(default)]
    required: bool,
}

impl FieldOpts {
    /// The `config` options with the `required` shorthand folded in.
    fn config_options(&self) -> Option<String> {
        let already_required = self
            .config
            .as_deref()
            .is_some_and(|c| c.split(',').any(|o| o.trim() == "required"));
        match (&self.config, self.required && !already_required) {
            (Some(config), true) if config.trim().is_empty() => Some("required".to_string()),
            (Some(config), true) => Some(format!("{config},required")),
            (None, true) => Some("required".to_string()),
            (config, false) => config.clone(),
        }
    }
}

fn generate_impl(input: &DeriveInput) -> TokenStream2 {
    match SettingsOpts::from_derive_input(input) {
        Ok(opts) => generate_from_opts(opts),
        Err(e) => e.write_errors(),
    }
}

fn generate_from_opts(opts: SettingsOpts) -> TokenStream2 {
    let type_name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let darling::ast::Data::Struct(fields) = opts.data else {
        return syn::Error::new(
            type_name.span(),
            "Settings can only be derived for structs with named fields",
        )
        .to_compile_error();
    };

    let rename_all = match serde_rename(&opts.attrs, "rename_all") {
        Ok(Some(rule)) => match RenameRule::parse(&rule.value()) {
            Some(rule) => Some(rule),
            None => {
                return syn::Error::new(rule.span(), "unknown serde rename_all rule")
                    .to_compile_error();
            }
        },
        Ok(None) => None,
        Err(e) => return e.to_compile_error(),
    };

    let mut tags = Vec::with_capacity(fields.fields.len());
    for field in &fields.fields {
        match field_tag(field, rename_all) {
            Ok(Some(tag)) => tags.push(tag),
            Ok(None) => {}
            Err(e) => return e.to_compile_error(),
        }
    }

    quote! {
        impl #impl_generics ::tagfig::Settings for #type_name #ty_generics #where_clause {
            const FIELDS: &'static [::tagfig::FieldTag] = &[
                #(#tags),*
            ];
        }
    }
}

fn field_tag(
    field: &FieldOpts,
    rename_all: Option<RenameRule>,
) -> syn::Result<Option<TokenStream2>> {
    let Some(ident) = field.ident.as_ref() else {
        return Ok(None);
    };
    let name = match serde_rename(&field.attrs, "rename")? {
        Some(renamed) => renamed.value(),
        None => {
            let name = ident.unraw().to_string();
            match rename_all {
                Some(rule) => rule.apply(&name),
                None => name,
            }
        }
    };

    let default = field.default.as_ref().map(|v| quote! { .default(#v) });
    let env = field.env.as_ref().map(|v| quote! { .env(#v) });
    let config = field.config_options().map(|v| quote! { .config(#v) });

    Ok(Some(quote! {
        ::tagfig::FieldTag::new(#name) #default #env #config
    }))
}

/// The serialize-side value of `#[serde(<key> = "..")]` or
/// `#[serde(<key>(serialize = ".."))]`. Other serde keys are skipped.
fn serde_rename(attrs: &[Attribute], key: &str) -> syn::Result<Option<LitStr>> {
    let mut found = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(key) {
                if meta.input.peek(syn::Token![=]) {
                    found = Some(meta.value()?.parse::<LitStr>()?);
                } else {
                    meta.parse_nested_meta(|inner| {
                        let value = inner.value()?.parse::<LitStr>()?;
                        if inner.path.is_ident("serialize") {
                            found = Some(value);
                        }
                        Ok(())
                    })?;
                }
                return Ok(());
            }
            skip_meta(&meta)
        })?;
    }
    Ok(found)
}

fn skip_meta(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        meta.value()?.parse::<syn::Lit>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        content.parse::<TokenStream2>()?;
    }
    Ok(())
}

/// serde's `rename_all` conventions, applied to snake_case field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn parse(rule: &str) -> Option<Self> {
        Some(match rule {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            _ => return None,
        })
    }

    fn apply(self, field: &str) -> String {
        match self {
            Self::Lower | Self::Snake => field.to_string(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Pascal => {
                let mut out = String::with_capacity(field.len());
                let mut capitalize = true;
                for ch in field.chars() {
                    if ch == '_' {
                        capitalize = true;
                    } else if capitalize {
                        out.push(ch.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
            Self::Camel => {
                let pascal = Self::Pascal.apply(field);
                match pascal.chars().next() {
                    Some(first) => first.to_lowercase().chain(pascal.chars().skip(1)).collect(),
                    None => pascal,
                }
            }
            Self::Kebab => field.replace('_', "-"),
            Self::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
        }
    }
}
