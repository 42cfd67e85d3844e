use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Error, Expr, Fields, Ident, LitStr, Result, Token, Type, meta::ParseNestedMeta,
    parse_macro_input,
};

/// Binds a struct to a document collection.
///
/// ```text
/// #[derive(Record, Serialize, Deserialize)]
/// #[record(collection = "posts")]
/// pub struct Post {
///     #[record(id)]
///     pub id: String,
///     pub title: String,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedRecord::from_input(&input) {
        Ok(parsed) => parsed.emit().into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct ParsedRecord<'a> {
    input: &'a DeriveInput,
    collection: LitStr,
    id_field: Ident,
    /// Name the id field serializes under, after serde renames.
    id_name: LitStr,
}

impl<'a> ParsedRecord<'a> {
    fn from_input(input: &'a DeriveInput) -> Result<Self> {
        let mut collection: Option<LitStr> = None;
        let mut rename_all: Option<LitStr> = None;
        for attr in &input.attrs {
            if attr.path().is_ident("record") {
                Self::parse_container_attr(attr, &mut collection)?;
            } else if attr.path().is_ident("serde") {
                parse_serde_attr(attr, "rename_all", &mut rename_all)?;
            }
        }

        let collection = collection.ok_or_else(|| {
            Error::new(
                input.ident.span(),
                "Record requires #[record(collection = \"...\")] on the struct",
            )
        })?;
        if collection.value().trim().is_empty() {
            return Err(Error::new(collection.span(), "collection name must not be empty"));
        }

        let named = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => named,
                _ => return Err(Error::new(input.ident.span(), "Record requires named fields")),
            },
            _ => return Err(Error::new(input.ident.span(), "Record can only be derived for structs")),
        };

        let mut id_field: Option<(Ident, Option<LitStr>)> = None;
        for field in &named.named {
            if !has_id_marker(&field.attrs)? {
                continue;
            }
            let Some(ident) = field.ident.clone() else {
                continue;
            };
            if id_field.is_some() {
                return Err(Error::new(ident.span(), "Record allows exactly one #[record(id)] field"));
            }
            if !is_string_type(&field.ty) {
                return Err(Error::new(ident.span(), "#[record(id)] field must be a String"));
            }
            let mut rename: Option<LitStr> = None;
            for attr in &field.attrs {
                if attr.path().is_ident("serde") {
                    parse_serde_attr(attr, "rename", &mut rename)?;
                }
            }
            id_field = Some((ident, rename));
        }

        let (id_field, rename) = id_field.ok_or_else(|| {
            Error::new(input.ident.span(), "Record requires a field annotated with #[record(id)]")
        })?;

        let id_name = match (rename, rename_all) {
            (Some(rename), _) => rename,
            (None, Some(rule)) => {
                let field_name = id_field.to_string();
                let renamed = apply_rename_rule(&rule.value(), field_name.trim_start_matches("r#"))
                    .ok_or_else(|| Error::new(rule.span(), "unsupported serde rename_all rule"))?;
                LitStr::new(&renamed, id_field.span())
            }
            (None, None) => {
                let field_name = id_field.to_string();
                LitStr::new(field_name.trim_start_matches("r#"), id_field.span())
            }
        };

        Ok(Self {
            input,
            collection,
            id_field,
            id_name,
        })
    }

    fn parse_container_attr(attr: &Attribute, collection: &mut Option<LitStr>) -> Result<()> {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                *collection = Some(value);
                Ok(())
            } else if meta.path.is_ident("id") {
                Err(meta.error("#[record(id)] belongs on a field, not on the struct"))
            } else {
                Err(meta.error("unknown record attribute"))
            }
        })
    }

    fn emit(&self) -> TokenStream2 {
        let name = &self.input.ident;
        let (impl_generics, ty_generics, where_clause) = self.input.generics.split_for_impl();
        let collection = &self.collection;
        let id_field = &self.id_field;
        let id_name = &self.id_name;

        quote! {
            impl #impl_generics ::walkmate::records::Record for #name #ty_generics #where_clause {
                const COLLECTION: &'static str = #collection;
                const ID_FIELD: &'static str = #id_name;

                fn record_id(&self) -> &str {
                    &self.#id_field
                }

                fn set_record_id(&mut self, id: ::std::string::String) {
                    self.#id_field = id;
                }
            }
        }
    }
}

fn has_id_marker(attrs: &[Attribute]) -> Result<bool> {
    let mut is_id = false;
    for attr in attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                is_id = true;
                Ok(())
            } else {
                Err(meta.error("unknown record field attribute; expected `id`"))
            }
        })?;
    }
    Ok(is_id)
}

/// Reads `key = "..."` out of a `#[serde(...)]` attribute, skipping every other serde option.
fn parse_serde_attr(attr: &Attribute, key: &str, slot: &mut Option<LitStr>) -> Result<()> {
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident(key) {
            if meta.input.peek(Token![=]) {
                *slot = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error(format!(
                    "Record needs a single serde `{key} = \"...\"`; split serialize/deserialize names are not supported"
                )))
            }
        } else {
            skip_meta(&meta)
        }
    })
}

fn skip_meta(meta: &ParseNestedMeta) -> Result<()> {
    if meta.input.peek(Token![=]) {
        let _: Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_meta(&inner))?;
    }
    Ok(())
}

/// serde's `rename_all` rules applied to a snake_case field name.
fn apply_rename_rule(rule: &str, field: &str) -> Option<String> {
    let pascal = || {
        field
            .split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<String>()
    };
    let renamed = match rule {
        "lowercase" => field.to_lowercase(),
        "UPPERCASE" => field.to_uppercase(),
        "snake_case" => field.to_string(),
        "SCREAMING_SNAKE_CASE" => field.to_uppercase(),
        "kebab-case" => field.replace('_', "-"),
        "SCREAMING-KEBAB-CASE" => field.to_uppercase().replace('_', "-"),
        "PascalCase" => pascal(),
        "camelCase" => {
            let pascal = pascal();
            let mut chars = pascal.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        _ => return None,
    };
    Some(renamed)
}

fn is_string_type(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map(|segment| segment.ident == "String" && segment.arguments.is_empty())
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_rules_match_serde() {
        assert_eq!(apply_rename_rule("camelCase", "user_id").as_deref(), Some("userId"));
        assert_eq!(apply_rename_rule("camelCase", "id").as_deref(), Some("id"));
        assert_eq!(apply_rename_rule("PascalCase", "user_id").as_deref(), Some("UserId"));
        assert_eq!(apply_rename_rule("kebab-case", "user_id").as_deref(), Some("user-id"));
        assert_eq!(apply_rename_rule("SCREAMING_SNAKE_CASE", "user_id").as_deref(), Some("USER_ID"));
        assert_eq!(apply_rename_rule("Title Case", "user_id"), None);
    }

    #[test]
    fn id_name_follows_serde_renames() {
        let input: DeriveInput = syn::parse_quote! {
            #[record(collection = "notes")]
            #[serde(rename_all = "camelCase", deny_unknown_fields)]
            struct Note {
                #[record(id)]
                #[serde(default)]
                note_id: String,
            }
        };
        assert_eq!(ParsedRecord::from_input(&input).unwrap().id_name.value(), "noteId");

        let input: DeriveInput = syn::parse_quote! {
            #[record(collection = "notes")]
            #[serde(rename_all = "camelCase")]
            struct Note {
                #[record(id)]
                #[serde(rename = "key", skip_serializing_if = "String::is_empty")]
                note_id: String,
            }
        };
        assert_eq!(ParsedRecord::from_input(&input).unwrap().id_name.value(), "key");
    }

    #[test]
    fn rejects_split_id_renames() {
        let input: DeriveInput = syn::parse_quote! {
            #[record(collection = "notes")]
            struct Note {
                #[record(id)]
                #[serde(rename(serialize = "a", deserialize = "b"))]
                id: String,
            }
        };
        assert!(ParsedRecord::from_input(&input).is_err());
    }
}
