//! End-to-end tests of `HttpManager` over the default transport, using wiremock.

use std::time::Duration;

use assert2::{check, let_assert};
use lightnet::{ErrorKind, HttpManager, RequestDescriptor, TrackHeader};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

fn manager() -> HttpManager {
    HttpManager::builder()
        .timeout(Duration::from_secs(5))
        .user_agent("lightnet-tests/1.0 (ünïcode)")
        .build()
        .expect("manager")
}

#[tokio::test]
async fn get_delivers_body_as_terminated_lines() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items/42"))
        .and(query_param("lang", "fr"))
        .and(header("accept", "application/json"))
        .and(header("user-agent", "lightnet-tests/1.0 (unicode)"))
        .respond_with(ResponseTemplate::new(200).set_body_string("first\r\nsecond"))
        .expect(1)
        .mount(&server)
        .await;

    let response = manager()
        .get(format!("{}/items/42?lang=fr", server.uri()))
        .send()
        .await
        .expect("response");

    check!(response.status() == 200);
    check!(response.body() == "first\nsecond\n");
}

#[tokio::test]
async fn empty_body_is_empty_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let response = manager().get(server.uri()).send().await.expect("response");
    check!(response.status() == 204);
    check!(response.body().is_empty());
}

#[tokio::test]
async fn post_sends_json_object_body() {
    let server = MockServer::start().await;
    let payload = json!({"name": "ada", "tags": ["x"]});
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("content-type", "application/json"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let response = manager()
        .post(format!("{}/users", server.uri()), Some(payload))
        .send()
        .await
        .expect("response");

    check!(response.status() == 201);
    let body: serde_json::Value = response.json().expect("json");
    check!(body == json!({"id": 7}));
}

#[tokio::test]
async fn error_status_is_reported_with_its_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .mount(&server)
        .await;

    let_assert!(Err(error) = manager().get(server.uri()).send().await);
    check!(error.status() == Some(404));
    check!(error.kind() == ErrorKind::Protocol);
    check!(error.to_string().contains("Invalid response code: 404"));
}

#[tokio::test]
async fn redirect_chain_keeps_verb_body_and_headers() {
    let server = MockServer::start().await;
    let payload = json!({"step": 1});
    Mock::given(method("POST"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/middle"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/middle"))
        .respond_with(
            ResponseTemplate::new(303).insert_header("Location", format!("{}/end", server.uri())),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/end"))
        .and(header("x-client", "demo"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(200).set_body_string("done"))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager();
    let descriptor = RequestDescriptor::post(format!("{}/start", server.uri()), Some(payload))
        .header("X-Client", "demo")
        .build();
    let response = manager.call(descriptor).send().await.expect("response");

    check!(response.body() == "done\n");
    check!(manager.spawned_tasks() == 0);
}

#[tokio::test]
async fn redirect_without_location_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(302))
        .mount(&server)
        .await;

    let_assert!(Err(error) = manager().get(server.uri()).send().await);
    check!(matches!(error, lightnet::Error::InvalidRedirect(_)));
}

#[tokio::test]
async fn redirect_loop_hits_the_hop_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
        .expect(4)
        .mount(&server)
        .await;

    let manager = HttpManager::builder().max_redirects(3).build().expect("manager");
    let_assert!(Err(error) = manager.get(format!("{}/loop", server.uri())).send().await);
    let_assert!(lightnet::Error::TooManyRedirects { count, max } = error);
    check!(count == 4);
    check!(max == 3);
}

#[tokio::test]
async fn other_redirect_codes_are_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(307).insert_header("Location", "/elsewhere"))
        .mount(&server)
        .await;

    let_assert!(Err(error) = manager().get(server.uri()).send().await);
    check!(error.status() == Some(307));
}

#[tokio::test]
async fn tracked_headers_are_captured_then_replayed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Session-Id", "abc")
                .insert_header("X-Other", "ignored"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("x-session-id", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("me"))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager();
    let track = TrackHeader::new("session", "X-SESSION");

    let login = RequestDescriptor::post(format!("{}/login", server.uri()), Some(json!({"u": 1})))
        .track_header(track.clone())
        .build();
    manager.call(login).send().await.expect("login");

    let stored = manager.tracker().load("session").expect("load");
    check!(stored.len() == 1);
    check!(stored.get("x-session-id").map(String::as_str) == Some("abc"));

    let me = RequestDescriptor::get(format!("{}/me", server.uri()))
        .header("X-Session-Id", "stale")
        .track_header(track)
        .build();
    let response = manager.call(me).send().await.expect("me");
    check!(response.body() == "me\n");
}

#[tokio::test]
async fn failed_calls_do_not_touch_tracked_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).insert_header("x-trackheader-a", "new"))
        .mount(&server)
        .await;

    let manager = manager();
    let existing = lightnet::TrackedHeaders::from([("x-trackheader-a".to_string(), "old".to_string())]);
    manager.tracker().save("Global", &existing).expect("save");

    let descriptor = RequestDescriptor::get(server.uri())
        .track_header(TrackHeader::default())
        .build();
    let_assert!(Err(_) = manager.call(descriptor).send().await);

    check!(manager.tracker().load("Global").expect("load") == existing);
}

#[tokio::test]
async fn connection_failure_is_a_transport_error() {
    let_assert!(Err(error) = manager().get("http://127.0.0.1:1/").send().await);
    check!(error.kind() == ErrorKind::Transport);
}
