//! TMDB API client.
//!
//! Lookups go through three tiers:
//! 1. In-memory session cache (series and seasons only)
//! 2. Local cache service, probed with a short timeout and skipped for a
//!    cooldown after it fails
//! 3. Direct TMDB calls, rotating hosts with retry and backoff

use crate::core::breaker::CooldownBreaker;
use crate::core::retry::{RetryFailure, RetryPolicy};
use crate::models::config::{CacheServiceConfig, Config, TmdbConfig};
use crate::models::series::{
    Paged, PersonCredits, PersonDetails, SeasonDetails, SeriesDetails, SeriesSummary,
};
use crate::services::transport::{HttpTransport, Transport, TransportError};
use crate::{Error, Result};
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const SERIES_APPEND: &str =
    "&append_to_response=images,credits,videos,external_ids,translations,watch/providers";
const SEASON_APPEND: &str = "&append_to_response=images,videos";

/// Per-call fetch options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Skip the session cache and the cache service, go straight to TMDB.
    pub force_direct: bool,
}

impl FetchOptions {
    /// Options forcing a direct TMDB fetch.
    pub fn direct() -> Self {
        Self { force_direct: true }
    }
}

/// Trending time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrendingWindow {
    Day,
    #[default]
    Week,
}

impl TrendingWindow {
    /// Path segment used by TMDB.
    fn tmdb_segment(&self) -> &'static str {
        match self {
            TrendingWindow::Day => "day",
            TrendingWindow::Week => "week",
        }
    }

    /// `type` parameter used by the cache service.
    fn cache_type(&self) -> &'static str {
        match self {
            TrendingWindow::Day => "daily",
            TrendingWindow::Week => "weekly",
        }
    }
}

impl FromStr for TrendingWindow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(TrendingWindow::Day),
            "week" | "weekly" => Ok(TrendingWindow::Week),
            other => Err(Error::other(format!("unknown trending window: {}", other))),
        }
    }
}

/// Series and season lookups kept for the lifetime of the client.
///
/// Concurrent writers race with last-writer-wins; values are idempotent.
#[derive(Debug, Default)]
pub struct SessionCache {
    series: RwLock<HashMap<u64, SeriesDetails>>,
    seasons: RwLock<HashMap<(u64, u32), SeasonDetails>>,
}

impl SessionCache {
    pub async fn series(&self, id: u64) -> Option<SeriesDetails> {
        self.series.read().await.get(&id).cloned()
    }

    pub async fn put_series(&self, details: SeriesDetails) {
        self.series.write().await.insert(details.id, details);
    }

    pub async fn season(&self, id: u64, season_number: u32) -> Option<SeasonDetails> {
        self.seasons.read().await.get(&(id, season_number)).cloned()
    }

    pub async fn put_season(&self, id: u64, season_number: u32, details: SeasonDetails) {
        self.seasons
            .write()
            .await
            .insert((id, season_number), details);
    }

    /// Number of cached series and seasons.
    pub async fn len(&self) -> usize {
        self.series.read().await.len() + self.seasons.read().await.len()
    }

    pub async fn clear(&self) {
        self.series.write().await.clear();
        self.seasons.write().await.clear();
    }
}

/// TMDB API client.
pub struct TmdbClient {
    api_key: String,
    hosts: Vec<String>,
    request_timeout: Duration,
    hero_limit: usize,
    retry: RetryPolicy,
    cache_service: CacheServiceConfig,
    breaker: CooldownBreaker,
    cache: SessionCache,
    transport: Arc<dyn Transport>,
}

impl TmdbClient {
    /// Create a new TMDB client on top of a transport.
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> Result<Self> {
        let TmdbConfig {
            api_key,
            hosts,
            timeout_ms,
            retries,
            first_backoff_ms,
            backoff_ms,
            hero_limit,
        } = config.tmdb.clone();

        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(Error::TmdbApiKeyMissing)?;
        if hosts.is_empty() {
            return Err(Error::NoUpstreamHosts);
        }

        Ok(Self {
            api_key,
            hosts: hosts
                .into_iter()
                .map(|h| h.trim_end_matches('/').to_string())
                .collect(),
            request_timeout: Duration::from_millis(timeout_ms),
            hero_limit,
            retry: RetryPolicy {
                retries,
                first_backoff: Duration::from_millis(first_backoff_ms),
                backoff: Duration::from_millis(backoff_ms),
            },
            breaker: CooldownBreaker::new(Duration::from_secs(
                config.cache_service.cooldown_secs,
            )),
            cache_service: config.cache_service.clone(),
            cache: SessionCache::default(),
            transport,
        })
    }

    /// Create a client using the HTTP transport.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config, Arc::new(HttpTransport::new()))
    }

    /// Create a client from the config file and environment.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&crate::models::config::load_config())
    }

    /// Upstream hosts in rotation order.
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn session_cache(&self) -> &SessionCache {
        &self.cache
    }

    /// Whether the cache service is currently being skipped.
    pub fn cache_service_offline(&self) -> bool {
        self.breaker.is_tripped()
    }

    /// Drop cached lookups and clear the cache-service flag.
    pub async fn reset(&self) {
        self.cache.clear().await;
        self.breaker.reset();
    }

    /// Fetch a TMDB endpoint directly, rotating hosts on failure.
    ///
    /// `params` is appended verbatim after the `api_key` parameter and should
    /// start with `&`.
    pub async fn fetch_direct(&self, endpoint: &str, params: &str) -> Result<Value> {
        let result = self
            .retry
            .run(
                |attempt| {
                    let host = &self.hosts[attempt as usize % self.hosts.len()];
                    let url = format!("{}{}?api_key={}{}", host, endpoint, self.api_key, params);
                    tracing::debug!("TMDB attempt {} to {}{}", attempt + 1, host, endpoint);
                    async move {
                        let result = self.transport.get_json(&url, self.request_timeout).await;
                        if let Err(ref e) = result {
                            tracing::warn!("TMDB attempt {} failed: {}", attempt + 1, e);
                        }
                        result
                    }
                },
                TransportError::is_retryable,
            )
            .await;

        result.map_err(|RetryFailure { error, attempts }| {
            tracing::error!(
                "TMDB request {} failed after {} attempt(s): {}",
                endpoint,
                attempts,
                error
            );
            let retryable = error.is_retryable();
            match error {
                TransportError::Status(status) if !retryable => Error::FetchRejected {
                    url: endpoint.to_string(),
                    status,
                },
                TransportError::Decode(reason) => Error::Decode(reason),
                other => Error::FetchFailed {
                    url: endpoint.to_string(),
                    reason: format!("{} after {} attempt(s)", other, attempts),
                },
            }
        })
    }

    /// Fetch a TMDB endpoint directly and decode it.
    async fn fetch_direct_as<T: DeserializeOwned>(&self, endpoint: &str, params: &str) -> Result<T> {
        let value = self.fetch_direct(endpoint, params).await?;
        serde_json::from_value(value).map_err(|e| Error::Decode(format!("{}: {}", endpoint, e)))
    }

    /// Ask the cache service for `path`. Any failure is a miss.
    async fn from_cache_service<T: DeserializeOwned>(
        &self,
        path: &str,
        options: FetchOptions,
    ) -> Option<T> {
        if options.force_direct || !self.cache_service.enabled || !self.breaker.allows_probe() {
            return None;
        }

        let url = format!("{}{}", self.cache_service.base_url.trim_end_matches('/'), path);
        let timeout = Duration::from_millis(self.cache_service.probe_timeout_ms);

        match self.transport.get_json(&url, timeout).await {
            Ok(Value::Null) => {
                self.breaker.record_success();
                None
            }
            Ok(value) => {
                self.breaker.record_success();
                match serde_json::from_value(value) {
                    Ok(data) => {
                        tracing::debug!("Cache service hit: {}", path);
                        Some(data)
                    }
                    Err(e) => {
                        tracing::debug!("Cache service returned unexpected shape for {}: {}", path, e);
                        None
                    }
                }
            }
            Err(TransportError::Status(status)) => {
                tracing::debug!("Cache service miss ({}): {}", status, path);
                None
            }
            Err(e) => {
                tracing::debug!("Cache service probe failed: {}", e);
                self.breaker.record_failure();
                None
            }
        }
    }

    /// Get series details with images, credits, videos and providers.
    pub async fn get_series_details(&self, id: u64, options: FetchOptions) -> Result<SeriesDetails> {
        if !options.force_direct {
            if let Some(details) = self.cache.series(id).await {
                return Ok(details);
            }
        }

        let details: SeriesDetails = match self.from_cache_service(&format!("/series/{}", id), options).await {
            Some(details) => details,
            None => {
                self.fetch_direct_as(&format!("/tv/{}", id), SERIES_APPEND)
                    .await?
            }
        };

        self.cache.put_series(details.clone()).await;
        Ok(details)
    }

    /// Get season details with images and videos.
    pub async fn get_season_details(
        &self,
        id: u64,
        season_number: u32,
        options: FetchOptions,
    ) -> Result<SeasonDetails> {
        if !options.force_direct {
            if let Some(details) = self.cache.season(id, season_number).await {
                return Ok(details);
            }
        }

        let cache_path = format!("/series/{}/season/{}", id, season_number);
        let details: SeasonDetails = match self.from_cache_service(&cache_path, options).await {
            Some(details) => details,
            None => {
                self.fetch_direct_as(&format!("/tv/{}/season/{}", id, season_number), SEASON_APPEND)
                    .await?
            }
        };

        self.cache
            .put_season(id, season_number, details.clone())
            .await;
        Ok(details)
    }

    /// Get trending series. Upstream failures yield an empty list.
    pub async fn get_trending(&self, window: TrendingWindow, options: FetchOptions) -> Vec<SeriesSummary> {
        let cache_path = format!("/trending?type={}", window.cache_type());
        if let Some(cached) = self.from_cache_service(&cache_path, options).await {
            return cached;
        }

        let endpoint = format!("/trending/tv/{}", window.tmdb_segment());
        match self.fetch_direct_as::<Paged<SeriesSummary>>(&endpoint, "").await {
            Ok(paged) => paged.results,
            Err(e) => {
                tracing::error!("Trending fetch failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Get top rated series.
    pub async fn get_top_rated(&self, options: FetchOptions) -> Result<Vec<SeriesSummary>> {
        self.listing("/trending?type=top_rated", "/tv/top_rated", options)
            .await
    }

    /// Get series airing today.
    pub async fn get_new_releases(&self, options: FetchOptions) -> Result<Vec<SeriesSummary>> {
        self.listing("/trending?type=new_releases", "/tv/airing_today", options)
            .await
    }

    async fn listing(
        &self,
        cache_path: &str,
        endpoint: &str,
        options: FetchOptions,
    ) -> Result<Vec<SeriesSummary>> {
        if let Some(cached) = self.from_cache_service(cache_path, options).await {
            return Ok(cached);
        }
        let paged: Paged<SeriesSummary> = self.fetch_direct_as(endpoint, "").await?;
        Ok(paged.results)
    }

    /// Get on-the-air series enriched with full details.
    ///
    /// Only the first `hero_limit` shows are enriched, concurrently; a show
    /// whose detail fetch fails keeps its listing entry. Failure of the
    /// listing itself yields an empty list.
    pub async fn get_hero_episodes(&self, options: FetchOptions) -> Vec<SeriesDetails> {
        if let Some(cached) = self.from_cache_service("/hero/new-episodes", options).await {
            return cached;
        }

        let listing = match self
            .fetch_direct_as::<Paged<SeriesSummary>>("/tv/on_the_air", "")
            .await
        {
            Ok(paged) => paged.results,
            Err(e) => {
                tracing::error!("Hero listing fetch failed: {}", e);
                return Vec::new();
            }
        };

        let enriched = listing.into_iter().take(self.hero_limit).map(|show| async move {
            match self
                .fetch_direct_as::<SeriesDetails>(&format!("/tv/{}", show.id), "")
                .await
            {
                Ok(details) => details,
                Err(e) => {
                    tracing::warn!("Keeping listing entry for {}: {}", show.id, e);
                    SeriesDetails::from(show)
                }
            }
        });

        join_all(enriched).await
    }

    /// Search series by name.
    pub async fn search_series(&self, query: &str) -> Result<Paged<SeriesSummary>> {
        let params = format!("&query={}", urlencoding::encode(query));
        self.fetch_direct_as("/search/tv", &params).await
    }

    /// Get recommendations for a series.
    pub async fn get_recommendations(&self, id: u64) -> Result<Vec<SeriesSummary>> {
        let paged: Paged<SeriesSummary> = self
            .fetch_direct_as(&format!("/tv/{}/recommendations", id), "")
            .await?;
        Ok(paged.results)
    }

    /// Get person biography and info.
    pub async fn get_person_details(&self, id: u64, options: FetchOptions) -> Result<PersonDetails> {
        if let Some(cached) = self.from_cache_service(&format!("/person/{}", id), options).await {
            return Ok(cached);
        }
        self.fetch_direct_as(&format!("/person/{}", id), "").await
    }

    /// Get a person's combined movie and TV credits.
    pub async fn get_person_credits(&self, id: u64, options: FetchOptions) -> Result<PersonCredits> {
        let cache_path = format!("/person/{}/credits", id);
        if let Some(cached) = self.from_cache_service(&cache_path, options).await {
            return Ok(cached);
        }
        self.fetch_direct_as(&format!("/person/{}/combined_credits", id), "")
            .await
    }

    /// Discover series with a raw query fragment such as
    /// `with_genres=18&sort_by=popularity.desc`.
    pub async fn discover_series(&self, params: &str) -> Result<Paged<SeriesSummary>> {
        let params = match params.trim() {
            "" => String::new(),
            p if p.starts_with('&') => p.to_string(),
            p => format!("&{}", p),
        };
        self.fetch_direct_as("/discover/tv", &params).await
    }

    /// Check that a host answers with this API key. No retries.
    pub async fn ping_host(&self, host: &str) -> std::result::Result<(), TransportError> {
        let url = format!(
            "{}/configuration?api_key={}",
            host.trim_end_matches('/'),
            self.api_key
        );
        self.transport
            .get_json(&url, self.request_timeout)
            .await
            .map(|_| ())
    }

    /// Check whether the cache service answers at all.
    pub async fn ping_cache_service(&self) -> bool {
        let url = format!("{}/health", self.cache_service.base_url.trim_end_matches('/'));
        let timeout = Duration::from_millis(self.cache_service.probe_timeout_ms);
        match self.transport.get_json(&url, timeout).await {
            Ok(_) | Err(TransportError::Status(_)) | Err(TransportError::Decode(_)) => true,
            Err(_) => false,
        }
    }
}
