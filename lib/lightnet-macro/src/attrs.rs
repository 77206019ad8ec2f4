//! Attribute parsing for lightnet proc-macros.

use syn::Ident;

/// Method attribute names consumed by `#[network_api]`.
pub(crate) const METHOD_ATTRS: &[&str] = &["get", "post", "track_header"];

/// Parameter attribute names consumed by `#[network_api]`.
pub(crate) const PARAM_ATTRS: &[&str] = &["path", "query", "query_map", "body"];

/// HTTP verb of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Name of the matching `VerbMarker` constructor.
    #[must_use]
    pub(crate) const fn constructor(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
        }
    }

    fn from_attr(attr: &syn::Attribute) -> Option<Self> {
        let path = attr.path();
        if path.is_ident("get") {
            Some(Self::Get)
        } else if path.is_ident("post") {
            Some(Self::Post)
        } else {
            None
        }
    }
}

/// One `#[get("/path")]` / `#[post("/path")]` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Verb {
    pub(crate) method: HttpMethod,
    pub(crate) path: String,
}

/// Role of a method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParamKind {
    /// `#[path]` or `#[path("name")]`.
    Path(String),
    /// `#[query]` or `#[query("key")]`.
    Query(String),
    /// `#[query_map]`.
    QueryMap,
    /// `#[body]`.
    Body,
    /// No role attribute and no matching placeholder.
    Unrecognized(String),
}

/// A parsed method parameter.
#[derive(Debug)]
pub(crate) struct MethodParam {
    /// Parameter name from the function signature.
    pub(crate) name: Ident,
    /// Declared role.
    pub(crate) kind: ParamKind,
}

/// A `#[track_header(...)]` directive; absent fields take the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TrackHeaderAttr {
    pub(crate) group: Option<String>,
    pub(crate) read_key: Option<String>,
}

/// Collect every verb declaration of a method.
///
/// Zero or several verbs are not rejected here: the generated operation
/// carries them all and resolution reports the misconfiguration.
pub(crate) fn parse_verbs(attrs: &[syn::Attribute]) -> syn::Result<Vec<Verb>> {
    attrs
        .iter()
        .filter_map(|attr| HttpMethod::from_attr(attr).map(|method| (attr, method)))
        .map(|(attr, method)| {
            Ok(Verb {
                method,
                path: parse_attr_path(attr)?,
            })
        })
        .collect()
}

/// Parse the path string from an attribute.
fn parse_attr_path(attr: &syn::Attribute) -> syn::Result<String> {
    match &attr.meta {
        syn::Meta::List(meta_list) => {
            let str_lit: syn::LitStr = syn::parse2(meta_list.tokens.clone())?;
            Ok(str_lit.value())
        }
        _ => Err(syn::Error::new_spanned(
            attr,
            "expected a path template, e.g. #[get(\"/users/{id}\")]",
        )),
    }
}

/// Parse `#[track_header]` or `#[track_header(group = "...", read_key = "...")]`.
pub(crate) fn parse_track_header(
    attrs: &[syn::Attribute],
) -> syn::Result<Option<TrackHeaderAttr>> {
    let Some(attr) = attrs.iter().find(|a| a.path().is_ident("track_header")) else {
        return Ok(None);
    };

    let mut track = TrackHeaderAttr::default();
    if let syn::Meta::List(_) = &attr.meta {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("group") {
                let value: syn::LitStr = meta.value()?.parse()?;
                track.group = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("read_key") {
                let value: syn::LitStr = meta.value()?.parse()?;
                track.read_key = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `group` or `read_key`"))
            }
        })?;
    }

    Ok(Some(track))
}

/// Parse a parameter role attribute.
///
/// `name` is the parameter name, used when `#[path]` or `#[query]` has no
/// explicit argument. Returns `None` for attributes that are not roles.
pub(crate) fn parse_param_attr(
    attr: &syn::Attribute,
    name: &Ident,
) -> Option<syn::Result<ParamKind>> {
    let path = attr.path();
    let or_name = |value: Option<String>| value.unwrap_or_else(|| name.to_string());

    if path.is_ident("path") {
        return Some(parse_optional_string_arg(attr).map(|n| ParamKind::Path(or_name(n))));
    }

    if path.is_ident("query") {
        return Some(parse_optional_string_arg(attr).map(|k| ParamKind::Query(or_name(k))));
    }

    if path.is_ident("query_map") {
        return Some(Ok(ParamKind::QueryMap));
    }

    if path.is_ident("body") {
        return Some(Ok(ParamKind::Body));
    }

    None
}

/// Parse an optional string argument from an attribute.
fn parse_optional_string_arg(attr: &syn::Attribute) -> syn::Result<Option<String>> {
    match &attr.meta {
        syn::Meta::List(meta_list) => {
            let str_lit: syn::LitStr = syn::parse2(meta_list.tokens.clone())?;
            Ok(Some(str_lit.value()))
        }
        syn::Meta::Path(_) => Ok(None),
        syn::Meta::NameValue(_) => Err(syn::Error::new_spanned(
            attr,
            "expected #[path], #[path(\"name\")], #[query] or #[query(\"key\")]",
        )),
    }
}

/// Extract placeholder names from a URL path template.
///
/// E.g., `/users/{id}/posts/{post_id}` returns `["id", "post_id"]`
#[must_use]
pub(crate) fn extract_path_placeholders(path: &str) -> Vec<String> {
    let mut placeholders = Vec::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        if c == '{' {
            let mut name = String::new();
            for next in chars.by_ref() {
                if next == '}' {
                    break;
                }
                name.push(next);
            }
            if !name.is_empty() {
                placeholders.push(name);
            }
        }
    }
    placeholders
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use quote::format_ident;
    use syn::parse_quote;

    use super::*;

    #[test]
    fn verbs_are_all_collected() {
        let attrs: Vec<syn::Attribute> = vec![
            parse_quote!(#[doc = "two verbs"]),
            parse_quote!(#[get("/a")]),
            parse_quote!(#[post("/b")]),
        ];

        let verbs = parse_verbs(&attrs).expect("parse");
        check!(
            verbs
                == vec![
                    Verb {
                        method: HttpMethod::Get,
                        path: "/a".to_string()
                    },
                    Verb {
                        method: HttpMethod::Post,
                        path: "/b".to_string()
                    },
                ]
        );
    }

    #[test]
    fn verb_without_path_is_an_error() {
        let attrs: Vec<syn::Attribute> = vec![parse_quote!(#[get])];
        check!(parse_verbs(&attrs).is_err());
    }

    #[test]
    fn track_header_defaults_and_overrides() {
        let bare: Vec<syn::Attribute> = vec![parse_quote!(#[track_header])];
        check!(parse_track_header(&bare).expect("parse") == Some(TrackHeaderAttr::default()));

        let custom: Vec<syn::Attribute> =
            vec![parse_quote!(#[track_header(group = "session")])];
        let_assert!(Some(track) = parse_track_header(&custom).expect("parse"));
        check!(track.group.as_deref() == Some("session"));
        check!(track.read_key.is_none());

        let none: Vec<syn::Attribute> = vec![parse_quote!(#[get("/x")])];
        check!(parse_track_header(&none).expect("parse").is_none());

        let bad: Vec<syn::Attribute> = vec![parse_quote!(#[track_header(name = "x")])];
        check!(parse_track_header(&bad).is_err());
    }

    #[test]
    fn param_roles() {
        let name = format_ident!("user_id");
        let parse = |attr: syn::Attribute| parse_param_attr(&attr, &name).map(|r| r.expect("role"));

        check!(parse(parse_quote!(#[path])) == Some(ParamKind::Path("user_id".to_string())));
        check!(parse(parse_quote!(#[path("id")])) == Some(ParamKind::Path("id".to_string())));
        check!(parse(parse_quote!(#[query("q")])) == Some(ParamKind::Query("q".to_string())));
        check!(parse(parse_quote!(#[query_map])) == Some(ParamKind::QueryMap));
        check!(parse(parse_quote!(#[body])) == Some(ParamKind::Body));
        check!(parse(parse_quote!(#[allow(unused)])) == None);
    }

    #[test]
    fn extract_placeholders() {
        check!(extract_path_placeholders("/repos/{owner}/{repo}") == vec!["owner", "repo"]);
        check!(extract_path_placeholders("/health").is_empty());
    }
}
