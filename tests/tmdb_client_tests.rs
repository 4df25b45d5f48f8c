//! Integration tests for the TMDB client.
//!
//! Tests cover:
//! - Session cache hits and forced direct fetches
//! - Host rotation, retry budget and fail-fast statuses
//! - Cache service probing and its cooldown
//! - Hero enrichment fallbacks

use async_trait::async_trait;
use serde_json::{json, Value};
use seriee::models::config::Config;
use seriee::services::tmdb::{FetchOptions, TmdbClient, TrendingWindow};
use seriee::services::transport::{Transport, TransportError};
use seriee::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = Box<dyn Fn(&str) -> Result<Value, TransportError> + Send + Sync>;

/// Transport answering from a closure and recording every URL.
struct FakeTransport {
    respond: Responder,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    fn new(respond: impl Fn(&str) -> Result<Value, TransportError> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, needle: &str) -> usize {
        self.calls().iter().filter(|url| url.contains(needle)).count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get_json(&self, url: &str, _timeout: Duration) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());
        (self.respond)(url)
    }
}

const CACHE: &str = "http://cache.test/api";

fn config(cache_enabled: bool) -> Config {
    let mut config = Config::default();
    config.tmdb.api_key = Some("test-key".to_string());
    config.tmdb.hosts = vec!["https://a.test/3".to_string(), "https://b.test/3".to_string()];
    config.cache_service.enabled = cache_enabled;
    config.cache_service.base_url = CACHE.to_string();
    config
}

fn client(cache_enabled: bool, transport: Arc<FakeTransport>) -> TmdbClient {
    TmdbClient::new(&config(cache_enabled), transport).unwrap()
}

fn series_json(id: u64) -> Value {
    json!({"id": id, "name": format!("Series {}", id), "poster_path": format!("/{}.jpg", id)})
}

// ========== SESSION CACHE ==========

#[tokio::test]
async fn test_series_details_cached_for_session() {
    let transport = FakeTransport::new(|_| Ok(series_json(42)));
    let client = client(false, transport.clone());

    let first = client.get_series_details(42, FetchOptions::default()).await.unwrap();
    let second = client.get_series_details(42, FetchOptions::default()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(transport.calls().len(), 1);
    assert!(transport.calls()[0].starts_with("https://a.test/3/tv/42?api_key=test-key&append_to_response="));
}

#[tokio::test]
async fn test_force_direct_bypasses_cache() {
    let transport = FakeTransport::new(|_| Ok(series_json(42)));
    let client = client(true, transport.clone());

    client.get_series_details(42, FetchOptions::direct()).await.unwrap();
    client.get_series_details(42, FetchOptions::direct()).await.unwrap();

    assert_eq!(transport.count(CACHE), 0);
    assert_eq!(transport.count("/tv/42"), 2);

    // The forced fetch still fills the session cache
    client.get_series_details(42, FetchOptions::default()).await.unwrap();
    assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn test_season_cache_keyed_by_series_and_season() {
    let transport = FakeTransport::new(|url| {
        let season = if url.contains("/season/1") { 1 } else { 2 };
        Ok(json!({"id": 10 + season, "season_number": season, "episodes": []}))
    });
    let client = client(false, transport.clone());

    let s1 = client.get_season_details(7, 1, FetchOptions::default()).await.unwrap();
    let s2 = client.get_season_details(7, 2, FetchOptions::default()).await.unwrap();
    client.get_season_details(7, 1, FetchOptions::default()).await.unwrap();

    assert_eq!(s1.season_number, 1);
    assert_eq!(s2.season_number, 2);
    assert_eq!(transport.calls().len(), 2);
    assert!(transport.calls()[0].contains("/tv/7/season/1?api_key=test-key&append_to_response=images,videos"));
}

#[tokio::test]
async fn test_reset_clears_session_cache() {
    let transport = FakeTransport::new(|_| Ok(series_json(1)));
    let client = client(false, transport.clone());

    client.get_series_details(1, FetchOptions::default()).await.unwrap();
    assert_eq!(client.session_cache().len().await, 1);

    client.reset().await;
    assert_eq!(client.session_cache().len().await, 0);
    client.get_series_details(1, FetchOptions::default()).await.unwrap();
    assert_eq!(transport.calls().len(), 2);
}

// ========== RETRY AND ROTATION ==========

#[tokio::test(start_paused = true)]
async fn test_retry_exhaustion_makes_exactly_three_attempts() {
    let transport = FakeTransport::new(|_| Err(TransportError::Timeout));
    let client = client(false, transport.clone());

    let result = client.fetch_direct("/tv/1", "").await;

    assert!(matches!(result, Err(Error::FetchFailed { .. })));
    let calls = transport.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].starts_with("https://a.test/3/tv/1"));
    assert!(calls[1].starts_with("https://b.test/3/tv/1"));
    assert!(calls[2].starts_with("https://a.test/3/tv/1"));
}

#[tokio::test(start_paused = true)]
async fn test_rotation_recovers_on_second_host() {
    let transport = FakeTransport::new(|url| {
        if url.starts_with("https://a.test") {
            Err(TransportError::Network("connection reset".into()))
        } else {
            Ok(series_json(5))
        }
    });
    let client = client(false, transport.clone());

    let details = client.get_series_details(5, FetchOptions::default()).await.unwrap();
    assert_eq!(details.id, 5);
    assert_eq!(transport.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_schedule() {
    let transport = FakeTransport::new(|_| Err(TransportError::Status(503)));
    let client = client(false, transport);

    let start = tokio::time::Instant::now();
    let _ = client.fetch_direct("/tv/1", "").await;
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(2_500));
    assert!(elapsed < Duration::from_millis(2_600));
}

#[tokio::test(start_paused = true)]
async fn test_client_error_fails_fast() {
    let transport = FakeTransport::new(|_| Err(TransportError::Status(404)));
    let client = client(false, transport.clone());

    let result = client.get_series_details(999_999, FetchOptions::default()).await;

    assert!(matches!(result, Err(Error::FetchRejected { status: 404, .. })));
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_custom_retry_budget() {
    let transport = FakeTransport::new(|_| Err(TransportError::Timeout));
    let mut config = config(false);
    config.tmdb.retries = 4;
    let client = TmdbClient::new(&config, transport.clone()).unwrap();

    assert!(client.fetch_direct("/tv/1", "").await.is_err());
    assert_eq!(transport.calls().len(), 5);
}

// ========== CACHE SERVICE ==========

#[tokio::test]
async fn test_cache_service_hit_skips_tmdb() {
    let transport = FakeTransport::new(|url| {
        assert!(url.starts_with(CACHE), "unexpected direct call: {}", url);
        Ok(series_json(3))
    });
    let client = client(true, transport.clone());

    let details = client.get_series_details(3, FetchOptions::default()).await.unwrap();
    assert_eq!(details.id, 3);
    assert_eq!(transport.calls(), vec![format!("{}/series/3", CACHE)]);
}

#[tokio::test(start_paused = true)]
async fn test_cache_service_cooldown() {
    let transport = FakeTransport::new(|url| {
        if url.starts_with(CACHE) {
            Err(TransportError::Timeout)
        } else {
            Ok(json!({"results": [{"id": 1, "name": "One"}]}))
        }
    });
    let client = client(true, transport.clone());

    client.get_top_rated(FetchOptions::default()).await.unwrap();
    assert_eq!(transport.count(CACHE), 1);
    assert!(client.cache_service_offline());

    // Within the cooldown the probe is skipped
    tokio::time::advance(Duration::from_secs(10)).await;
    client.get_top_rated(FetchOptions::default()).await.unwrap();
    assert_eq!(transport.count(CACHE), 1);

    // After it, the service is probed again
    tokio::time::advance(Duration::from_secs(25)).await;
    client.get_top_rated(FetchOptions::default()).await.unwrap();
    assert_eq!(transport.count(CACHE), 2);
}

#[tokio::test]
async fn test_cache_service_miss_does_not_trip() {
    let transport = FakeTransport::new(|url| {
        if url.starts_with(CACHE) {
            Err(TransportError::Status(404))
        } else {
            Ok(json!({"results": []}))
        }
    });
    let client = client(true, transport.clone());

    client.get_new_releases(FetchOptions::default()).await.unwrap();
    client.get_new_releases(FetchOptions::default()).await.unwrap();

    assert!(!client.cache_service_offline());
    assert_eq!(transport.count(CACHE), 2);
    assert_eq!(transport.count("/tv/airing_today"), 2);
}

#[tokio::test]
async fn test_cache_service_listing_is_bare_array() {
    let transport = FakeTransport::new(|_| Ok(json!([{"id": 1, "name": "One"}, {"id": 2, "name": "Two"}])));
    let client = client(true, transport.clone());

    let items = client.get_trending(TrendingWindow::Day, FetchOptions::default()).await;
    assert_eq!(items.len(), 2);
    assert_eq!(transport.calls(), vec![format!("{}/trending?type=daily", CACHE)]);
}

// ========== LISTINGS ==========

#[tokio::test(start_paused = true)]
async fn test_trending_degrades_to_empty() {
    let transport = FakeTransport::new(|_| Err(TransportError::Network("refused".into())));
    let client = client(false, transport);

    let items = client.get_trending(TrendingWindow::Week, FetchOptions::default()).await;
    assert!(items.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_top_rated_propagates_failure() {
    let transport = FakeTransport::new(|_| Err(TransportError::Network("refused".into())));
    let client = client(false, transport);

    assert!(client.get_top_rated(FetchOptions::default()).await.is_err());
}

#[tokio::test]
async fn test_endpoints() {
    let transport = FakeTransport::new(|url| {
        if url.contains("/person/") && !url.contains("credits") {
            Ok(json!({"id": 17419, "name": "Bryan Cranston"}))
        } else if url.contains("combined_credits") {
            Ok(json!({"id": 17419, "cast": [{"id": 1396, "media_type": "tv"}], "crew": []}))
        } else {
            Ok(json!({"page": 1, "results": [{"id": 1}]}))
        }
    });
    let client = client(false, transport.clone());

    client.search_series("breaking bad").await.unwrap();
    client.get_recommendations(1396).await.unwrap();
    client.discover_series("with_genres=18").await.unwrap();
    let person = client.get_person_details(17419, FetchOptions::default()).await.unwrap();
    let credits = client.get_person_credits(17419, FetchOptions::default()).await.unwrap();

    assert_eq!(person.name.as_deref(), Some("Bryan Cranston"));
    assert_eq!(credits.cast.len(), 1);

    let calls = transport.calls();
    assert_eq!(calls[0], "https://a.test/3/search/tv?api_key=test-key&query=breaking%20bad");
    assert_eq!(calls[1], "https://a.test/3/tv/1396/recommendations?api_key=test-key");
    assert_eq!(calls[2], "https://a.test/3/discover/tv?api_key=test-key&with_genres=18");
    assert_eq!(calls[3], "https://a.test/3/person/17419?api_key=test-key");
    assert_eq!(calls[4], "https://a.test/3/person/17419/combined_credits?api_key=test-key");
}

// ========== HERO ==========

#[tokio::test(start_paused = true)]
async fn test_hero_enrichment_is_capped_and_tolerant() {
    let transport = FakeTransport::new(|url| {
        if url.contains("/tv/on_the_air") {
            let results: Vec<Value> = (1..=20)
                .map(|id| json!({"id": id, "name": format!("Listed {}", id)}))
                .collect();
            Ok(json!({ "results": results }))
        } else if url.contains("/tv/3?") {
            Err(TransportError::Status(404))
        } else {
            let id: u64 = url
                .split("/tv/")
                .nth(1)
                .and_then(|rest| rest.split('?').next())
                .and_then(|id| id.parse().ok())
                .unwrap();
            Ok(json!({
                "id": id,
                "name": format!("Detailed {}", id),
                "next_episode_to_air": {"id": id * 100, "season_number": 1, "episode_number": 2, "air_date": "2026-11-01"}
            }))
        }
    });
    let client = client(false, transport.clone());

    let shows = client.get_hero_episodes(FetchOptions::default()).await;

    assert_eq!(shows.len(), 15);
    assert_eq!(transport.count("/tv/on_the_air"), 1);
    assert_eq!(transport.calls().len(), 16);
    assert_eq!(shows[0].name.as_deref(), Some("Detailed 1"));
    assert!(shows[0].next_episode_to_air.is_some());
    assert_eq!(shows[2].id, 3);
    assert_eq!(shows[2].name.as_deref(), Some("Listed 3"));
    assert!(shows[2].next_episode_to_air.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_hero_listing_failure_is_empty() {
    let transport = FakeTransport::new(|_| Err(TransportError::Timeout));
    let client = client(false, transport);

    assert!(client.get_hero_episodes(FetchOptions::default()).await.is_empty());
}
