//! Tests of `#[network_api]` generated clients.

use std::collections::BTreeMap;

use assert2::{check, let_assert};
use lightnet::prelude::*;
use lightnet::{ParamRole, VerbMarker};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

#[network_api(url = "https://api.example.com/v1")]
pub trait ItemsApi {
    /// Fetch one item.
    #[get("/items/{id}")]
    fn item(&self, id: u64, #[query("lang")] lang: &str) -> lightnet::Result<Call>;

    #[get("/search")]
    fn search(&self, #[query_map] filters: &BTreeMap<String, String>) -> lightnet::Result<Call>;

    #[post("/login")]
    #[track_header(group = "session", read_key = "x-session")]
    fn login(&self, #[body] credentials: &serde_json::Value) -> lightnet::Result<Call>;

    #[get("/me")]
    #[track_header(group = "session", read_key = "x-session")]
    fn me(&self) -> lightnet::Result<Call>;

    #[get("/legacy")]
    #[track_header]
    fn legacy(&self, #[path("unused")] token: String) -> lightnet::Result<Call>;

    #[get("/a")]
    #[post("/b")]
    fn ambiguous(&self) -> lightnet::Result<Call>;

    #[post("/echo")]
    fn echo(&self, #[body] body: &str) -> lightnet::Result<Call>;
}

fn manager() -> HttpManager {
    HttpManager::new().expect("manager")
}

#[tokio::test]
async fn generated_client_uses_the_declared_base_url() {
    let api = ItemsApiClient::new(manager());

    check!(ItemsApiClient::BASE_URL == "https://api.example.com/v1");
    check!(api.executable().base_url() == Some("https://api.example.com/v1"));

    let call = api.item(42, "a b").expect("call");
    check!(call.descriptor().method() == Method::Get);
    check!(call.descriptor().url() == "https://api.example.com/v1/items/42?lang=a%20b");
    check!(call.descriptor().tracking().is_none());
}

#[tokio::test]
async fn query_map_and_tracking_directives() {
    let api = ItemsApiClient::new(manager());

    let filters = BTreeMap::from([
        ("color".to_string(), "dark red".to_string()),
        ("size".to_string(), "xl".to_string()),
    ]);
    let call = api.search(&filters).expect("call");
    check!(call.descriptor().url() == "https://api.example.com/v1/search?color=dark%20red&size=xl");

    let call = api.me().expect("call");
    let_assert!(Some(track) = call.descriptor().tracking());
    check!(track.group() == "session");
    check!(track.read_key() == "x-session");

    let call = api.legacy("t".to_string()).expect("call");
    check!(call.descriptor().tracking() == Some(&TrackHeader::default()));
    check!(call.descriptor().url() == "https://api.example.com/v1/legacy");
}

#[tokio::test]
async fn declaration_errors_surface_synchronously() {
    let api = ItemsApiClient::new(manager());

    let_assert!(Err(error) = api.ambiguous());
    check!(error.kind() == ErrorKind::Configuration);

    let_assert!(Err(error) = api.echo("not an object"));
    check!(error.kind() == ErrorKind::Resolution);
}

#[tokio::test]
async fn session_headers_flow_between_declared_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({"user": "ada"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Session-Token", "s3cr3t")
                .set_body_string("welcome"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("x-session-token", "s3cr3t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "ada"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/items/7"))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_string("item 7"))
        .expect(1)
        .mount(&server)
        .await;

    let api = ItemsApiClient::builder(manager())
        .base_url(server.uri())
        .build();

    let welcome = api
        .login(&json!({"user": "ada"}))
        .expect("call")
        .send()
        .await
        .expect("login");
    check!(welcome.body() == "welcome\n");

    let me = api.me().expect("call").spawn().await.expect("me");
    let profile: serde_json::Value = me.json().expect("json");
    check!(profile == json!({"name": "ada"}));

    let item = api.item(7, "en").expect("call").send().await.expect("item");
    check!(item.body() == "item 7\n");
}

static GET_ITEM: Operation = Operation::new(
    "item",
    &[VerbMarker::get("/items/{id}")],
    &[ParamRole::Path("id")],
);

#[tokio::test]
async fn hand_built_operations_resolve_through_an_executable() {
    let executable = NetworkExecutable::with_base_url(manager(), "https://api.example.com");

    let call = executable
        .request(&GET_ITEM, vec![99_u64.to_arg()])
        .expect("call");
    check!(call.descriptor().url() == "https://api.example.com/items/99");

    let_assert!(Err(error) = executable.request(&GET_ITEM, vec![]));
    check!(error.kind() == ErrorKind::Resolution);
}
