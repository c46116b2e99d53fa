//! Throwaway upstream servers for tests.

use axum::Router;

use crate::config::Config;

/// Serve `router` on an ephemeral local port and return its `/api/` base url.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/api/", addr)
}

pub fn test_config(api_url: &str) -> Config {
    test_config_with_timeout(api_url, 5)
}

pub fn test_config_with_timeout(api_url: &str, timeout_secs: u64) -> Config {
    let api_url = api_url.to_string();
    Config::from_lookup(move |key| match key {
        "FITNESS_API_URL" => Some(api_url.clone()),
        "REQUEST_TIMEOUT_SECS" => Some(timeout_secs.to_string()),
        _ => None,
    })
    .unwrap()
}
