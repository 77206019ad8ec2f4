//! Code generation helpers for `#[network_api]`.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Ident, Visibility};

use crate::attrs::{MethodParam, ParamKind, TrackHeaderAttr, Verb};

/// Generate the client struct and its builder.
pub fn generate_client_struct(
    vis: &Visibility,
    client_name: &Ident,
    builder_name: &Ident,
    base_url: &str,
) -> TokenStream {
    quote! {
        /// Generated client implementing the API trait.
        #[derive(Debug, Clone)]
        #vis struct #client_name {
            executable: ::lightnet::NetworkExecutable,
        }

        impl #client_name {
            /// Base URL declared on the API.
            pub const BASE_URL: &'static str = #base_url;

            /// Create a client using the declared base URL.
            #[must_use]
            pub fn new(manager: ::lightnet::HttpManager) -> Self {
                Self::builder(manager).build()
            }

            /// Start building a client.
            #[must_use]
            pub fn builder(manager: ::lightnet::HttpManager) -> #builder_name {
                #builder_name {
                    manager,
                    base_url: None,
                }
            }

            /// The executable resolving this client's operations.
            #[must_use]
            pub fn executable(&self) -> &::lightnet::NetworkExecutable {
                &self.executable
            }
        }

        /// Builder for the generated client.
        #[derive(Debug)]
        #vis struct #builder_name {
            manager: ::lightnet::HttpManager,
            base_url: Option<String>,
        }

        impl #builder_name {
            /// Override the declared base URL.
            #[must_use]
            pub fn base_url(mut self, url: impl Into<String>) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Build the client.
            #[must_use]
            pub fn build(self) -> #client_name {
                let base_url = self
                    .base_url
                    .unwrap_or_else(|| #client_name::BASE_URL.to_string());
                #client_name {
                    executable: ::lightnet::NetworkExecutable::with_base_url(self.manager, base_url),
                }
            }
        }
    }
}

/// Generate the `static` operation describing one method.
pub fn generate_operation_static(
    method_name: &str,
    verbs: &[Verb],
    params: &[MethodParam],
    track_header: Option<&TrackHeaderAttr>,
) -> TokenStream {
    let verb_exprs = verbs.iter().map(|verb| {
        let constructor = format_ident!("{}", verb.method.constructor());
        let path = &verb.path;
        quote! { ::lightnet::VerbMarker::#constructor(#path) }
    });

    let role_exprs = params.iter().map(|param| match &param.kind {
        ParamKind::Path(name) => quote! { ::lightnet::ParamRole::Path(#name) },
        ParamKind::Query(key) => quote! { ::lightnet::ParamRole::Query(#key) },
        ParamKind::QueryMap => quote! { ::lightnet::ParamRole::QueryMap },
        ParamKind::Body => quote! { ::lightnet::ParamRole::Body },
        ParamKind::Unrecognized(label) => quote! { ::lightnet::ParamRole::Unrecognized(#label) },
    });

    let constructor = match track_header {
        None => quote! {
            ::lightnet::Operation::new(#method_name, &[#(#verb_exprs),*], &[#(#role_exprs),*])
        },
        Some(track) => {
            let group = str_or_default(track.group.as_deref(), quote!(DEFAULT_TRACK_GROUP));
            let read_key =
                str_or_default(track.read_key.as_deref(), quote!(DEFAULT_TRACK_READ_KEY));
            quote! {
                ::lightnet::Operation::tracked(
                    #method_name,
                    &[#(#verb_exprs),*],
                    &[#(#role_exprs),*],
                    ::lightnet::TrackHeader::from_static(#group, #read_key),
                )
            }
        }
    };

    quote! {
        static OPERATION: ::lightnet::Operation = #constructor;
    }
}

fn str_or_default(value: Option<&str>, default: TokenStream) -> TokenStream {
    match value {
        Some(value) => quote!(#value),
        None => quote!(::lightnet::#default),
    }
}

/// Generate the argument list handed to the resolver.
pub fn generate_args_code(params: &[MethodParam]) -> TokenStream {
    let args = params.iter().map(|param| {
        let name = &param.name;
        quote! { ::lightnet::ToArg::to_arg(&#name) }
    });

    quote! {
        ::std::vec![#(#args),*]
    }
}
