//! Procedural macros for lightnet.
//!
//! This crate provides `#[network_api]`, which turns a trait declaration
//! into typed request bindings. Inside the trait, methods and parameters use
//! helper attributes consumed by the macro:
//! - `#[get("/path")]`, `#[post("/path")]` - Verb and relative path template
//! - `#[track_header]`, `#[track_header(group = "...", read_key = "...")]` - Header replay group
//! - `#[path]`, `#[path("name")]` - Path placeholder substitution
//! - `#[query]`, `#[query("key")]` - Single query parameter
//! - `#[query_map]` - Mapping expanded into query parameters
//! - `#[body]` - JSON object sent as POST body
//!
//! # Example
//!
//! ```ignore
//! use lightnet::prelude::*;
//!
//! #[network_api(url = "https://api.example.com")]
//! pub trait ItemsApi {
//!     #[get("/items/{id}")]
//!     fn item(&self, #[path] id: u64, #[query("lang")] lang: &str) -> lightnet::Result<Call>;
//! }
//!
//! // Usage:
//! let api = ItemsApiClient::new(manager);
//! let response = api.item(42, "fr")?.send().await?;
//! ```

mod attrs;
mod codegen;
mod expand;

use proc_macro::TokenStream;

/// Declare a remote API as a trait.
///
/// This macro generates:
/// - A clean trait (without lightnet attributes)
/// - A client struct implementing the trait (e.g., `ItemsApiClient`)
/// - A builder struct for constructing the client (e.g., `ItemsApiClientBuilder`)
///
/// Each method gets a `static` [`Operation`] holding its verbs, parameter
/// roles and tracking directive. Calling the method resolves that operation
/// with the call arguments and returns a `Call` ready to be dispatched;
/// resolution errors are returned synchronously.
///
/// # Attributes
///
/// - `url`: the global base URL, prepended to every path template
///
/// [`Operation`]: https://docs.rs/lightnet/latest/lightnet/struct.Operation.html
#[proc_macro_attribute]
pub fn network_api(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::expand_network_api(attr.into(), item.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
