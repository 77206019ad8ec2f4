//! Request descriptor resolution.
//!
//! [`resolve`] pairs the declared parameter roles of an [`Operation`] with
//! the arguments of one call and produces a [`RequestDescriptor`]. It never
//! performs I/O: the descriptor is only executed once explicitly dispatched.

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    Arg, Error, Operation, ParamRole, PathParam, QueryParam, RequestDescriptor, Result,
    UrlTemplate, VerbMarker,
};

/// Resolve an operation against call-time arguments.
///
/// `base_url` is the global prefix of the declaring API (`None` or empty for
/// operations whose path template is already absolute). Arguments are paired
/// with [`Operation::params`] in declaration order.
///
/// # Errors
///
/// - [`Error::Configuration`] if the operation declares zero or several
///   verbs, or the concatenated URL is empty.
/// - [`Error::Resolution`] if the argument count differs from the declared
///   roles, a `QueryMap` role receives something other than a mapping, or a
///   `Body` role receives something other than a JSON object.
///
/// # Example
///
/// ```
/// use lightnet_core::{Arg, Operation, ParamRole, VerbMarker, resolve};
///
/// static GET_ITEM: Operation = Operation::new(
///     "get_item",
///     &[VerbMarker::get("/v1/{id}")],
///     &[ParamRole::Path("id"), ParamRole::Query("q")],
/// );
///
/// let descriptor = resolve(
///     Some("https://api.example.com"),
///     &GET_ITEM,
///     vec![Arg::text(42), Arg::text("a b")],
/// )
/// .unwrap();
///
/// assert_eq!(descriptor.url(), "https://api.example.com/v1/42?q=a%20b");
/// ```
pub fn resolve(
    base_url: Option<&str>,
    operation: &Operation,
    args: Vec<Arg>,
) -> Result<RequestDescriptor> {
    let verb = single_verb(operation)?;

    if args.len() != operation.params.len() {
        return Err(Error::resolution(format!(
            "{}: expected {} argument(s), got {}",
            operation.name,
            operation.params.len(),
            args.len()
        )));
    }

    let mut template = UrlTemplate::new(format!("{}{}", base_url.unwrap_or_default(), verb.path))?;
    let mut body = None;

    for (role, arg) in operation.params.iter().zip(args) {
        match *role {
            ParamRole::Path(name) => {
                template.add_path_param(PathParam::new(name, arg.to_string()));
            }
            ParamRole::Query(key) => {
                template.add_query_param(QueryParam::new(key, arg.to_string()));
            }
            ParamRole::QueryMap => match arg {
                Arg::Map(entries) => {
                    for (key, value) in entries {
                        template.add_query_param(QueryParam::new(key, value));
                    }
                }
                other => {
                    return Err(Error::resolution(format!(
                        "{}: query_map parameter must be a map, got {}",
                        operation.name,
                        other.shape()
                    )));
                }
            },
            ParamRole::Body => match arg {
                Arg::Json(value @ Value::Object(_)) => body = Some(value),
                other => {
                    return Err(Error::resolution(format!(
                        "{}: body parameter must be a JSON object, got {}",
                        operation.name,
                        other.shape()
                    )));
                }
            },
            ParamRole::Unrecognized(label) => {
                warn!(operation = operation.name, role = label, "parameter role not recognized");
            }
        }
    }

    let url = template.build();
    debug!(operation = operation.name, method = %verb.method, %url, "resolved request");

    let builder = match verb.method {
        crate::Method::Get => RequestDescriptor::get(url),
        crate::Method::Post => RequestDescriptor::post(url, None),
    };
    let builder = match body {
        Some(body) => builder.body(body),
        None => builder,
    };

    Ok(builder.tracking(operation.track_header.clone()).build())
}

fn single_verb(operation: &Operation) -> Result<&VerbMarker> {
    match operation.verbs {
        [verb] => Ok(verb),
        [] => Err(Error::configuration(format!(
            "{}: operation must declare a GET or POST verb",
            operation.name
        ))),
        _ => Err(Error::configuration(format!(
            "{}: operation declares {} verbs, expected exactly one",
            operation.name,
            operation.verbs.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;
    use crate::{ErrorKind, Method, ToArg, TrackHeader};

    const BASE: Option<&str> = Some("https://api.example.com");

    static GET_ITEM: Operation = Operation::new(
        "get_item",
        &[VerbMarker::get("/v1/{id}")],
        &[ParamRole::Path("id"), ParamRole::Query("q")],
    );

    #[test]
    fn path_and_query_are_resolved() {
        let descriptor =
            resolve(BASE, &GET_ITEM, vec![42_u32.to_arg(), "a b".to_arg()]).expect("resolve");

        check!(descriptor.method() == Method::Get);
        check!(descriptor.url() == "https://api.example.com/v1/42?q=a%20b");
        check!(descriptor.body().is_none());
        check!(descriptor.tracking().is_none());
    }

    #[test]
    fn missing_verb_fails_before_any_io() {
        static NO_VERB: Operation = Operation::new("no_verb", &[], &[]);

        let_assert!(Err(err) = resolve(BASE, &NO_VERB, vec![]));
        check!(err.kind() == ErrorKind::Configuration);
    }

    #[test]
    fn two_verbs_are_rejected() {
        static TWO_VERBS: Operation = Operation::new(
            "two_verbs",
            &[VerbMarker::get("/a"), VerbMarker::post("/a")],
            &[],
        );

        let_assert!(Err(err) = resolve(BASE, &TWO_VERBS, vec![]));
        check!(err.kind() == ErrorKind::Configuration);
    }

    #[test]
    fn empty_url_is_a_configuration_error() {
        static EMPTY: Operation = Operation::new("empty", &[VerbMarker::get("")], &[]);

        let_assert!(Err(err) = resolve(None, &EMPTY, vec![]));
        check!(err.kind() == ErrorKind::Configuration);
    }

    #[test]
    fn argument_count_must_match() {
        let_assert!(Err(err) = resolve(BASE, &GET_ITEM, vec![42_u32.to_arg()]));
        check!(err.kind() == ErrorKind::Resolution);
    }

    #[test]
    fn query_map_expands_entries() {
        static SEARCH: Operation = Operation::new(
            "search",
            &[VerbMarker::get("/search")],
            &[ParamRole::Query("a"), ParamRole::QueryMap],
        );

        let filters = BTreeMap::from([("a", "2"), ("b", "x y")]);
        let descriptor =
            resolve(BASE, &SEARCH, vec!["1".to_arg(), filters.to_arg()]).expect("resolve");

        check!(descriptor.url() == "https://api.example.com/search?a=2&b=x%20y");
    }

    #[test]
    fn query_map_requires_a_map() {
        static SEARCH: Operation =
            Operation::new("search", &[VerbMarker::get("/search")], &[ParamRole::QueryMap]);

        let_assert!(Err(err) = resolve(BASE, &SEARCH, vec!["k=v".to_arg()]));
        check!(err.kind() == ErrorKind::Resolution);
        check!(err.to_string().contains("query_map"));
    }

    #[test]
    fn body_becomes_the_post_payload() {
        static LOGIN: Operation = Operation::tracked(
            "login",
            &[VerbMarker::post("/login")],
            &[ParamRole::Body],
            TrackHeader::from_static("session", "x-session"),
        );

        let descriptor =
            resolve(BASE, &LOGIN, vec![json!({"user": "bob"}).to_arg()]).expect("resolve");

        check!(descriptor.method() == Method::Post);
        check!(descriptor.url() == "https://api.example.com/login");
        check!(descriptor.body() == Some(&json!({"user": "bob"})));
        let_assert!(Some(track) = descriptor.tracking());
        check!(track.group() == "session");
        check!(track.read_key() == "x-session");
    }

    #[test]
    fn body_requires_a_json_object() {
        static LOGIN: Operation =
            Operation::new("login", &[VerbMarker::post("/login")], &[ParamRole::Body]);

        for arg in [json!([1, 2]).to_arg(), "raw".to_arg()] {
            let_assert!(Err(err) = resolve(BASE, &LOGIN, vec![arg]));
            check!(err.kind() == ErrorKind::Resolution);
        }
    }

    #[test]
    fn unrecognized_roles_are_skipped() {
        static ODD: Operation = Operation::new(
            "odd",
            &[VerbMarker::get("/odd/{id}")],
            &[ParamRole::Unrecognized("header"), ParamRole::Path("id")],
        );

        let descriptor =
            resolve(BASE, &ODD, vec!["ignored".to_arg(), 3_u32.to_arg()]).expect("resolve");
        check!(descriptor.url() == "https://api.example.com/odd/3");
    }

    #[test]
    fn trailing_slash_on_the_full_url_is_dropped() {
        static ROOT: Operation = Operation::new("root", &[VerbMarker::get("/users/")], &[]);

        let descriptor = resolve(BASE, &ROOT, vec![]).expect("resolve");
        check!(descriptor.url() == "https://api.example.com/users");
    }

    #[test]
    fn absolute_template_without_base() {
        static ABS: Operation =
            Operation::new("abs", &[VerbMarker::get("http://other.org/ping")], &[]);

        let descriptor = resolve(None, &ABS, vec![]).expect("resolve");
        check!(descriptor.url() == "http://other.org/ping");
    }
}
