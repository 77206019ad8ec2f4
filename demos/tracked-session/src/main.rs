//! Tracked Session Demo
//!
//! Logs in against an httpbin-compatible server, captures the session header
//! it answers with, and replays it on the following calls.
//!
//! The server defaults to `https://httpbin.org`; set `LIGHTNET_DEMO_URL` to
//! point somewhere else.

// Demo-specific lint allowances
#![allow(missing_docs)]
#![allow(clippy::print_stdout)]

use std::collections::BTreeMap;
use std::sync::Arc;

use lightnet::prelude::*;
use lightnet::{FixedConnectivity, JsonFileStore, NetworkTransport};

const DEFAULT_BASE_URL: &str = "https://httpbin.org";

// ============================================================================
// Data Types
// ============================================================================

/// Echo of the request headers, as returned by `/headers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoedHeaders {
    pub headers: BTreeMap<String, String>,
}

// ============================================================================
// API Definition
// ============================================================================

#[network_api(url = "https://httpbin.org")]
pub trait SessionApi {
    /// Ask the server to answer with a `X-Session-Id` header.
    #[get("/response-headers")]
    #[track_header(group = "session", read_key = "x-session")]
    fn login(&self, #[query("X-Session-Id")] session: &str) -> lightnet::Result<Call>;

    /// Echo the request headers, session included.
    #[get("/headers")]
    #[track_header(group = "session", read_key = "x-session")]
    fn whoami(&self) -> lightnet::Result<Call>;

    /// Echo the request headers without any session.
    #[get("/headers")]
    fn anonymous(&self) -> lightnet::Result<Call>;

    #[post("/anything/{section}")]
    #[track_header(group = "session", read_key = "x-session")]
    fn publish(
        &self,
        #[path] section: &str,
        #[body] payload: &serde_json::Value,
    ) -> lightnet::Result<Call>;
}

fn session_client(manager: HttpManager, base_url: impl Into<String>) -> SessionApiClient {
    SessionApiClient::builder(manager).base_url(base_url).build()
}

// ============================================================================
// Main: Demonstrate usage
// ============================================================================

#[tokio::main]
async fn main() -> lightnet::Result<()> {
    let base_url =
        std::env::var("LIGHTNET_DEMO_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let store_path = std::env::temp_dir().join("lightnet-demo-session.json");

    let manager = HttpManager::builder()
        .with_logging()
        .store(Arc::new(JsonFileStore::new(&store_path)))
        .build()?;
    let network = LightNetwork::new(
        manager.clone(),
        Arc::new(FixedConnectivity::online(NetworkTransport::Wifi)),
    );

    if !network.state().is_connected() {
        println!("No network available");
        return Ok(());
    }
    println!(
        "Connected (wifi: {})",
        network.state().is_connected_through_wifi()
    );

    let api = session_client(manager.clone(), &base_url);

    let login = api.login("demo-session-42")?.send().await?;
    println!("Login answered {}", login.status());
    println!("Tracked headers stored in {}", store_path.display());

    let echoed: EchoedHeaders = api.whoami()?.spawn().await?.json()?;
    println!("Headers seen by the server with a session:");
    for (name, value) in &echoed.headers {
        println!("  {name}: {value}");
    }

    let anonymous: EchoedHeaders = api.anonymous()?.send().await?.json()?;
    println!(
        "Anonymous call carries a session: {}",
        anonymous.headers.contains_key("X-Session-Id")
    );

    // Deliver the outcome on a dedicated looper.
    let (looper, mut runner) = Looper::new("demo");
    api.publish("notes", &serde_json::json!({"title": "hello"}))?
        .enqueue(&looper, |outcome: lightnet::Result<Response<String>>| {
            match outcome {
                Ok(response) => println!("Publish answered {}", response.status()),
                Err(error) => println!("Publish failed: {error}"),
            }
        });
    runner.run_one().await;

    Ok(())
}

// ============================================================================
// Tests using wiremock
// ============================================================================
