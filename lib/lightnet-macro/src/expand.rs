//! Macro expansion logic for `#[network_api]`.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{FnArg, Ident, ItemTrait, Pat, TraitItem, TraitItemFn, parse2};

use crate::attrs::{
    METHOD_ATTRS, MethodParam, PARAM_ATTRS, ParamKind, TrackHeaderAttr, Verb,
    extract_path_placeholders, parse_param_attr, parse_track_header, parse_verbs,
};
use crate::codegen::{generate_args_code, generate_client_struct, generate_operation_static};

/// Arguments for the `#[network_api]` attribute.
#[derive(Default)]
pub struct NetworkApiArgs {
    pub url: Option<String>,
}

/// Parse the `#[network_api]` attribute arguments.
fn parse_network_api_args(attr: TokenStream) -> syn::Result<NetworkApiArgs> {
    let mut args = NetworkApiArgs::default();

    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("url") {
            let value: syn::LitStr = meta.value()?.parse()?;
            args.url = Some(value.value());
            Ok(())
        } else {
            Err(meta.error("unsupported network_api attribute, expected `url`"))
        }
    });

    syn::parse::Parser::parse2(parser, attr)?;
    Ok(args)
}

/// Information about a parsed trait method.
pub struct TraitMethodInfo {
    /// The method signature.
    pub sig: syn::Signature,
    /// Every verb declaration found.
    pub verbs: Vec<Verb>,
    /// Parsed parameters.
    pub params: Vec<MethodParam>,
    /// Header tracking directive.
    pub track_header: Option<TrackHeaderAttr>,
    /// Non-lightnet attributes (docs, lints) kept on the clean trait.
    pub attrs: Vec<syn::Attribute>,
}

/// Expand the `#[network_api]` attribute on a trait.
pub fn expand_network_api(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    let trait_def: ItemTrait = parse2(item)?;
    let args = parse_network_api_args(attr)?;

    let trait_name = &trait_def.ident;
    let vis = &trait_def.vis;
    let client_name = format_ident!("{}Client", trait_name);
    let builder_name = format_ident!("{}ClientBuilder", trait_name);

    let methods = extract_trait_methods(&trait_def)?;
    let clean_trait = generate_clean_trait(vis, trait_name, &methods, &trait_def);
    let client_and_builder = generate_client_struct(
        vis,
        &client_name,
        &builder_name,
        args.url.as_deref().unwrap_or_default(),
    );
    let trait_impl = generate_trait_impl(trait_name, &client_name, &methods);

    Ok(quote! {
        #clean_trait
        #client_and_builder
        #trait_impl
    })
}

/// Extract methods from a trait definition.
fn extract_trait_methods(trait_def: &ItemTrait) -> syn::Result<Vec<TraitMethodInfo>> {
    let mut methods = Vec::new();

    for item in &trait_def.items {
        match item {
            TraitItem::Fn(method) => {
                if method.default.is_some() {
                    return Err(syn::Error::new_spanned(
                        &method.sig,
                        "network_api methods are generated and cannot have a default body",
                    ));
                }
                if let Some(asyncness) = &method.sig.asyncness {
                    return Err(syn::Error::new_spanned(
                        asyncness,
                        "network_api methods return a `Call`, remove `async`",
                    ));
                }

                methods.push(TraitMethodInfo {
                    sig: method.sig.clone(),
                    verbs: parse_verbs(&method.attrs)?,
                    params: parse_trait_method_params(method)?,
                    track_header: parse_track_header(&method.attrs)?,
                    attrs: method
                        .attrs
                        .iter()
                        .filter(|a| !is_lightnet_attr(a, METHOD_ATTRS))
                        .cloned()
                        .collect(),
                });
            }
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "network_api traits may only contain methods",
                ));
            }
        }
    }

    Ok(methods)
}

/// Parse method parameters from a trait method.
///
/// Parameters are classified as follows:
/// 1. Explicit attributes (`#[path]`, `#[query]`, `#[query_map]`, `#[body]`)
/// 2. Parameters matching a placeholder of any declared path are `Path`
/// 3. Anything else is passed along as an unrecognized role
fn parse_trait_method_params(method: &TraitItemFn) -> syn::Result<Vec<MethodParam>> {
    let placeholders: Vec<String> = parse_verbs(&method.attrs)?
        .iter()
        .flat_map(|verb| extract_path_placeholders(&verb.path))
        .collect();

    let mut receiver = false;
    let mut params = Vec::new();

    for input in &method.sig.inputs {
        let pat_type = match input {
            FnArg::Receiver(r) => {
                if r.reference.is_none() || r.mutability.is_some() {
                    return Err(syn::Error::new_spanned(r, "expected `&self`"));
                }
                receiver = true;
                continue;
            }
            FnArg::Typed(pat_type) => pat_type,
        };

        let Pat::Ident(pat_ident) = pat_type.pat.as_ref() else {
            return Err(syn::Error::new_spanned(
                &pat_type.pat,
                "network_api parameters must be plain identifiers",
            ));
        };
        let name = pat_ident.ident.clone();

        let mut roles = pat_type
            .attrs
            .iter()
            .filter_map(|attr| parse_param_attr(attr, &name));
        let kind = match (roles.next(), roles.next()) {
            (Some(_), Some(_)) => {
                return Err(syn::Error::new_spanned(
                    pat_type,
                    format!("parameter '{name}' declares more than one role"),
                ));
            }
            (Some(kind), None) => kind?,
            (None, _) if placeholders.contains(&name.to_string()) => {
                ParamKind::Path(name.to_string())
            }
            (None, _) => ParamKind::Unrecognized(name.to_string()),
        };

        params.push(MethodParam { name, kind });
    }

    if !receiver {
        return Err(syn::Error::new_spanned(
            &method.sig,
            "network_api methods take `&self`",
        ));
    }

    Ok(params)
}

/// Generate a clean trait without lightnet-specific attributes.
fn generate_clean_trait(
    vis: &syn::Visibility,
    name: &Ident,
    methods: &[TraitMethodInfo],
    original: &ItemTrait,
) -> TokenStream {
    let trait_attrs = &original.attrs;
    let supertraits = &original.supertraits;
    let colon = original.colon_token;

    let method_signatures = methods.iter().map(|m| {
        let attrs = &m.attrs;
        let sig = strip_lightnet_attrs_from_sig(&m.sig);
        quote! {
            #(#attrs)*
            #sig;
        }
    });

    quote! {
        #(#trait_attrs)*
        #vis trait #name #colon #supertraits {
            #(#method_signatures)*
        }
    }
}

/// Check if an attribute is one of the given lightnet attributes.
fn is_lightnet_attr(attr: &syn::Attribute, names: &[&str]) -> bool {
    let path = attr.path();
    names.iter().any(|name| path.is_ident(name))
}

/// Strip lightnet parameter attributes from a method signature.
fn strip_lightnet_attrs_from_sig(sig: &syn::Signature) -> syn::Signature {
    let mut clean_sig = sig.clone();
    for input in &mut clean_sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            pat_type.attrs.retain(|attr| !is_lightnet_attr(attr, PARAM_ATTRS));
        }
    }
    clean_sig
}

/// Generate the trait implementation for the client struct.
fn generate_trait_impl(
    trait_name: &Ident,
    client_name: &Ident,
    methods: &[TraitMethodInfo],
) -> TokenStream {
    let method_impls = methods.iter().map(|m| {
        let sig = strip_lightnet_attrs_from_sig(&m.sig);
        let method_name = m.sig.ident.to_string();
        let operation = generate_operation_static(
            &method_name,
            &m.verbs,
            &m.params,
            m.track_header.as_ref(),
        );
        let args = generate_args_code(&m.params);

        quote! {
            #sig {
                #operation
                self.executable.request(&OPERATION, #args)
            }
        }
    });

    quote! {
        impl #trait_name for #client_name {
            #(#method_impls)*
        }
    }
}
