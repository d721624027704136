//! Token cache behavior against a mock credential endpoint

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use cinelog_common::Error;
use cinelog_proxy::igdb::IgdbClient;
use cinelog_proxy::token::TokenCache;
use helpers::MockUpstream;
use serde_json::json;

fn cache_for(upstream: &MockUpstream) -> TokenCache {
    TokenCache::new(
        reqwest::Client::new(),
        upstream.token_url(),
        Some("client-abc".to_string()),
        Some("secret-xyz".to_string()),
    )
}

#[tokio::test]
async fn test_token_reused_within_lifetime() {
    let upstream = MockUpstream::start().await;
    let cache = cache_for(&upstream);

    let first = cache.get_token().await.unwrap();
    let second = cache.get_token().await.unwrap();

    assert_eq!(first, "token-1");
    assert_eq!(first, second);
    assert_eq!(upstream.token_hits(), 1, "second call must be served from cache");
}

#[tokio::test]
async fn test_token_refreshed_after_expiry() {
    let upstream = MockUpstream::start().await;
    // Lifetime equal to the margin leaves nothing usable
    upstream.set_token_ttl(60);
    let cache = cache_for(&upstream).with_margin(Duration::from_secs(60));

    let first = cache.get_token().await.unwrap();
    let second = cache.get_token().await.unwrap();

    assert_eq!(first, "token-1");
    assert_eq!(second, "token-2");
    assert_eq!(upstream.token_hits(), 2);
}

#[tokio::test]
async fn test_short_lived_token_expires() {
    let upstream = MockUpstream::start().await;
    upstream.set_token_ttl(1);
    let cache = cache_for(&upstream).with_margin(Duration::ZERO);

    cache.get_token().await.unwrap();
    tokio::time::sleep(Duration::from_millis(1100)).await;
    let refreshed = cache.get_token().await.unwrap();

    assert_eq!(refreshed, "token-2");
}

#[tokio::test]
async fn test_failed_exchange_not_cached() {
    let upstream = MockUpstream::start().await;
    upstream.set_token_status(400);
    let cache = cache_for(&upstream);

    let err = cache.get_token().await.unwrap_err();
    assert!(matches!(err, Error::UpstreamAuth(_)), "got {:?}", err);

    upstream.set_token_status(200);
    let token = cache.get_token().await.unwrap();
    assert_eq!(token, "token-2");
    assert_eq!(upstream.token_hits(), 2);
}

#[tokio::test]
async fn test_static_token_skips_exchange() {
    let upstream = MockUpstream::start().await;
    let cache = cache_for(&upstream).with_static_token(Some("preset".to_string()));

    assert_eq!(cache.get_token().await.unwrap(), "preset");
    assert_eq!(upstream.token_hits(), 0);
}

#[tokio::test]
async fn test_unauthorized_search_drops_cached_token() {
    let upstream = MockUpstream::start().await;
    let tokens = Arc::new(cache_for(&upstream));
    let client = IgdbClient::new(reqwest::Client::new(), upstream.games_url(), Arc::clone(&tokens));

    upstream.set_games(401, json!("token expired"));
    let err = client.search("zelda").await.unwrap_err();
    assert!(matches!(err, Error::Upstream { status: 401, .. }), "got {:?}", err);

    upstream.set_games(200, json!([]));
    client.search("zelda").await.unwrap();

    assert_eq!(upstream.token_hits(), 2, "401 must force a fresh token");
    assert_eq!(upstream.last_authorization().as_deref(), Some("Bearer token-2"));
}
