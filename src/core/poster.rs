//! Poster resolution.
//!
//! Picks the image path to display for a series or season and turns it into
//! a CDN URL. Priority, first match wins:
//! 1. User override for `{series}_{season}`
//! 2. User override for `{series}_0` (seasons only, when series fallback is allowed)
//! 3. Legacy override keyed by bare `{series}`
//! 4. The TMDB default path

use crate::models::config::ImageConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Image sizes served by the CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    W92,
    W154,
    W185,
    W200,
    W300,
    W342,
    W500,
    W780,
    Original,
}

impl ImageSize {
    /// Size token as it appears in CDN URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::W92 => "w92",
            ImageSize::W154 => "w154",
            ImageSize::W185 => "w185",
            ImageSize::W200 => "w200",
            ImageSize::W300 => "w300",
            ImageSize::W342 => "w342",
            ImageSize::W500 => "w500",
            ImageSize::W780 => "w780",
            ImageSize::Original => "original",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "w92" => Ok(ImageSize::W92),
            "w154" => Ok(ImageSize::W154),
            "w185" => Ok(ImageSize::W185),
            "w200" => Ok(ImageSize::W200),
            "w300" => Ok(ImageSize::W300),
            "w342" => Ok(ImageSize::W342),
            "w500" => Ok(ImageSize::W500),
            "w780" => Ok(ImageSize::W780),
            "original" => Ok(ImageSize::Original),
            other => Err(crate::Error::Config(format!("unknown image size: {}", other))),
        }
    }
}

/// User poster overrides, keyed by `"{series}_{season}"` or a legacy bare `"{series}"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PosterOverrides(HashMap<String, String>);

impl PosterOverrides {
    /// Create an empty override map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Composite key for a series/season pair.
    pub fn key(series_id: u64, season_number: u32) -> String {
        format!("{}_{}", series_id, season_number)
    }

    /// Set an override for a series/season pair.
    pub fn insert(&mut self, series_id: u64, season_number: u32, path: impl Into<String>) {
        self.0.insert(Self::key(series_id, season_number), path.into());
    }

    /// Set a legacy series-wide override.
    pub fn insert_legacy(&mut self, series_id: u64, path: impl Into<String>) {
        self.0.insert(series_id.to_string(), path.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Non-empty value for a raw key.
    fn lookup(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str()).filter(|s| !s.is_empty())
    }
}

impl From<HashMap<String, String>> for PosterOverrides {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

/// Resolve the poster path for a series or season.
///
/// `season_number` of `None` or `Some(0)` means the series itself.
/// Returns `None` when neither an override nor a default exists.
pub fn resolve_poster(
    series_id: u64,
    default_path: Option<&str>,
    overrides: &PosterOverrides,
    season_number: Option<u32>,
    allow_series_fallback: bool,
) -> Option<String> {
    let default_path = default_path.filter(|p| !p.is_empty()).map(str::to_string);
    if overrides.is_empty() {
        return default_path;
    }

    let season = season_number.unwrap_or(0);

    if let Some(path) = overrides.lookup(&PosterOverrides::key(series_id, season)) {
        return Some(path.to_string());
    }

    if season > 0 && allow_series_fallback {
        if let Some(path) = overrides.lookup(&PosterOverrides::key(series_id, 0)) {
            return Some(path.to_string());
        }
    }

    if season == 0 || allow_series_fallback {
        if let Some(path) = overrides.lookup(&series_id.to_string()) {
            return Some(path.to_string());
        }
    }

    default_path
}

/// Whether a path already carries a URI scheme (`https:`, `data:`, ...).
fn has_scheme(path: &str) -> bool {
    match path.split_once(':') {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Build a CDN URL of the form `{base}/t/p/{size}/{path}`.
///
/// Absolute URLs pass through unchanged; empty paths yield `None`.
pub fn image_url(base_url: &str, path: Option<&str>, size: ImageSize) -> Option<String> {
    let path = path.filter(|p| !p.is_empty())?;
    if has_scheme(path) {
        return Some(path.to_string());
    }

    Some(format!(
        "{}/t/p/{}/{}",
        base_url.trim_end_matches('/'),
        size,
        path.trim_start_matches('/')
    ))
}

/// Poster resolver bound to an image CDN.
#[derive(Debug, Clone)]
pub struct PosterResolver {
    base_url: String,
    default_size: ImageSize,
}

impl PosterResolver {
    /// Create a resolver for the given CDN origin.
    pub fn new(base_url: impl Into<String>, default_size: ImageSize) -> Self {
        Self {
            base_url: base_url.into(),
            default_size,
        }
    }

    /// Create a resolver from image configuration.
    pub fn from_config(config: &ImageConfig) -> Self {
        Self::new(config.base_url.clone(), config.default_size)
    }

    pub fn default_size(&self) -> ImageSize {
        self.default_size
    }

    /// Full URL for a path, using `size` or the configured default.
    pub fn url(&self, path: Option<&str>, size: Option<ImageSize>) -> Option<String> {
        image_url(&self.base_url, path, size.unwrap_or(self.default_size))
    }

    /// Resolve the poster path and build its URL in one step.
    pub fn resolve_url(
        &self,
        series_id: u64,
        default_path: Option<&str>,
        overrides: &PosterOverrides,
        season_number: Option<u32>,
        allow_series_fallback: bool,
        size: Option<ImageSize>,
    ) -> Option<String> {
        let path = resolve_poster(
            series_id,
            default_path,
            overrides,
            season_number,
            allow_series_fallback,
        );
        self.url(path.as_deref(), size)
    }
}

impl Default for PosterResolver {
    fn default() -> Self {
        Self::from_config(&ImageConfig::default())
    }
}
