//! TMDB response shapes for series, seasons and people.
//!
//! Fields are optional wherever TMDB omits them for some entries. Appended
//! sub-resources (images, credits, videos, ...) land in `extra` untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Paged listing envelope (`results` plus paging counters).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paged<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

/// Series entry as it appears in listings (trending, search, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub vote_count: Option<u32>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
}

/// Episode reference inside series details (`last_episode_to_air`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub episode_number: u32,
    #[serde(default)]
    pub season_number: u32,
    #[serde(default)]
    pub still_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f32>,
}

/// Season entry inside series details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub season_number: u32,
    #[serde(default)]
    pub episode_count: Option<u32>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Series details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesDetails {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub number_of_seasons: Option<u32>,
    #[serde(default)]
    pub number_of_episodes: Option<u32>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub vote_count: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub seasons: Vec<SeasonSummary>,
    #[serde(default)]
    pub last_episode_to_air: Option<EpisodeRef>,
    #[serde(default)]
    pub next_episode_to_air: Option<EpisodeRef>,
    /// Appended responses and any field not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<SeriesSummary> for SeriesDetails {
    fn from(summary: SeriesSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            original_name: summary.original_name,
            overview: summary.overview,
            poster_path: summary.poster_path,
            backdrop_path: summary.backdrop_path,
            first_air_date: summary.first_air_date,
            vote_average: summary.vote_average,
            vote_count: summary.vote_count,
            ..Default::default()
        }
    }
}

/// Season details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonDetails {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub season_number: u32,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub episodes: Vec<EpisodeRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Person details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonDetails {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub place_of_birth: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub known_for_department: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One credit in a person's combined credits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonCredit {
    pub id: u64,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f32>,
}

/// Combined credits (cast and crew).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonCredits {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub cast: Vec<PersonCredit>,
    #[serde(default)]
    pub crew: Vec<PersonCredit>,
}
