//! Watchlist records and display items.
//!
//! Raw rows come from several generations of storage (Supabase rows, the old
//! Firebase array) and disagree on field names and id formats. Everything is
//! normalized into [`WatchlistRecord`] before grouping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What a watchlist record points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Series,
    Season,
    Episode,
}

/// Canonical watchlist record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistRecord {
    /// TMDB id of the record itself.
    pub tmdb_id: u64,
    /// Parent series; equals `tmdb_id` for series records.
    pub series_id: u64,
    pub season_number: Option<u32>,
    pub episode_number: Option<u32>,
    pub name: String,
    pub poster_path: Option<String>,
    /// Explicit season poster, preferred over `poster_path` for baskets.
    pub season_poster: Option<String>,
    pub added_at: Option<DateTime<Utc>>,
}

impl WatchlistRecord {
    /// Classify by which numbers are present.
    pub fn kind(&self) -> RecordKind {
        match (self.season_number, self.episode_number) {
            (Some(_), Some(_)) => RecordKind::Episode,
            (Some(_), None) => RecordKind::Season,
            _ => RecordKind::Series,
        }
    }

    /// Normalize one raw row. Returns `None` if it has neither a usable own id
    /// nor a parent series id.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;

        // Supabase rows carry a UUID `id` next to the numeric `tmdb_id`
        let own_id = id_field(map, &["tmdb_id", "tmdbId", "id"]);
        let parent_id = id_field(map, &["seriesId", "series_id"]);
        let tmdb_id = own_id.or(parent_id)?;
        let series_id = parent_id.unwrap_or(tmdb_id);

        Some(Self {
            tmdb_id,
            series_id,
            season_number: first_field(map, &["seasonNumber", "season_number"])
                .and_then(parse_number),
            episode_number: first_field(map, &["episodeNumber", "episode_number"])
                .and_then(parse_number),
            name: first_field(map, &["name", "title"])
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            poster_path: string_field(map, &["poster_path", "posterPath"]),
            season_poster: string_field(map, &["seasonPoster", "season_poster"]),
            added_at: first_field(map, &["added_at", "addedAt", "date"])
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
        })
    }
}

/// Normalize raw rows, dropping rows without a usable id.
pub fn normalize_records(values: &[Value]) -> Vec<WatchlistRecord> {
    values
        .iter()
        .filter_map(|value| {
            let record = WatchlistRecord::from_value(value);
            if record.is_none() {
                tracing::debug!("Dropping watchlist row without a valid id: {}", value);
            }
            record
        })
        .collect()
}

/// First non-null value among `keys`.
fn first_field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

/// First value among `keys` that parses as a TMDB id.
fn id_field(map: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(parse_tmdb_id)
}

/// First non-empty string among `keys`.
fn string_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Leading decimal digits of `s`, like JavaScript's `parseInt`.
fn leading_number(s: &str) -> Option<u64> {
    let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Parse a TMDB id from a number or string.
///
/// Accepts plain numbers, numeric strings and legacy composite ids such as
/// `"123-S1"` or `"123-S1E4"`. Strings with letters outside the legacy form
/// (UUIDs and the like) are rejected, as is `0`.
pub fn parse_tmdb_id(value: &Value) -> Option<u64> {
    let id = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
        Value::String(s) => match s.split_once("-S") {
            Some((prefix, _)) => leading_number(prefix),
            None if s.chars().any(|c| c.is_ascii_alphabetic()) => None,
            None => leading_number(s),
        },
        _ => None,
    };
    id.filter(|id| *id > 0)
}

/// Parse a season or episode number. `0` counts as absent.
fn parse_number(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    u32::try_from(n).ok().filter(|n| *n > 0)
}

/// Episodes of one season grouped for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistBasket {
    pub series_id: u64,
    pub season_number: u32,
    /// Series name plus season label, e.g. `"Show (Season 2)"`.
    pub name: String,
    pub poster_path: String,
    pub episode_count: usize,
    /// Sorted by episode number.
    pub episodes: Vec<WatchlistRecord>,
}

/// A series or season shown on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub tmdb_id: u64,
    pub series_id: u64,
    pub season_number: Option<u32>,
    pub name: String,
    pub poster_path: String,
    pub is_season: bool,
    pub added_at: Option<DateTime<Utc>>,
}

/// Display-ready watchlist entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WatchlistEntry {
    Basket(WatchlistBasket),
    Series(WatchlistItem),
}

impl WatchlistEntry {
    pub fn poster_path(&self) -> &str {
        match self {
            WatchlistEntry::Basket(basket) => &basket.poster_path,
            WatchlistEntry::Series(item) => &item.poster_path,
        }
    }

    pub fn series_id(&self) -> u64 {
        match self {
            WatchlistEntry::Basket(basket) => basket.series_id,
            WatchlistEntry::Series(item) => item.series_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_tmdb_id() {
        assert_eq!(parse_tmdb_id(&json!(1399)), Some(1399));
        assert_eq!(parse_tmdb_id(&json!("1399")), Some(1399));
        assert_eq!(parse_tmdb_id(&json!("1399-S2")), Some(1399));
        assert_eq!(parse_tmdb_id(&json!("1399-S2E5")), Some(1399));
        assert_eq!(parse_tmdb_id(&json!(1399.0)), Some(1399));
        assert_eq!(parse_tmdb_id(&json!("79bf1a78-1c2d-4e5f")), None);
        assert_eq!(parse_tmdb_id(&json!("abc")), None);
        assert_eq!(parse_tmdb_id(&json!("")), None);
        assert_eq!(parse_tmdb_id(&json!(0)), None);
        assert_eq!(parse_tmdb_id(&json!(null)), None);
    }

    #[test]
    fn test_from_value_aliases() {
        let supabase = json!({
            "tmdb_id": "1396",
            "series_id": 1396,
            "season_number": 2,
            "episode_number": 3,
            "name": "Breaking Bad - Bit by a Dead Bee",
            "posterPath": "/bb.jpg",
            "season_poster": "/bb-s2.jpg",
            "added_at": "2024-05-01T10:00:00Z"
        });
        let record = WatchlistRecord::from_value(&supabase).unwrap();
        assert_eq!(record.tmdb_id, 1396);
        assert_eq!(record.series_id, 1396);
        assert_eq!(record.kind(), RecordKind::Episode);
        assert_eq!(record.poster_path.as_deref(), Some("/bb.jpg"));
        assert_eq!(record.season_poster.as_deref(), Some("/bb-s2.jpg"));
        assert!(record.added_at.is_some());
    }

    #[test]
    fn test_from_value_defaults() {
        let legacy = json!({"id": 60574, "name": "Peaky Blinders", "seasonNumber": 0});
        let record = WatchlistRecord::from_value(&legacy).unwrap();
        assert_eq!(record.series_id, 60574);
        assert_eq!(record.season_number, None);
        assert_eq!(record.kind(), RecordKind::Series);
        assert_eq!(record.poster_path, None);

        let season = json!({"id": "60574-S3", "seriesId": null, "seasonNumber": "3"});
        let record = WatchlistRecord::from_value(&season).unwrap();
        assert_eq!(record.tmdb_id, 60574);
        assert_eq!(record.kind(), RecordKind::Season);
    }

    #[test]
    fn test_from_value_skips_row_uuid() {
        let series = json!({
            "id": "79bf1a78-1c2d-4e5f-9a0b-3c4d5e6f7a8b",
            "tmdb_id": 1399,
            "series_id": null,
            "name": "Game of Thrones",
            "poster_path": "/got.jpg"
        });
        let record = WatchlistRecord::from_value(&series).unwrap();
        assert_eq!(record.tmdb_id, 1399);
        assert_eq!(record.series_id, 1399);
        assert_eq!(record.kind(), RecordKind::Series);

        let episode = json!({
            "id": "0c1d2e3f-4a5b-6c7d-8e9f-a0b1c2d3e4f5",
            "tmdb_id": 63056,
            "series_id": 1399,
            "season_number": 2,
            "episode_number": 1
        });
        let record = WatchlistRecord::from_value(&episode).unwrap();
        assert_eq!(record.tmdb_id, 63056);
        assert_eq!(record.series_id, 1399);
    }

    #[test]
    fn test_normalize_drops_invalid_ids() {
        let rows = vec![
            json!({"id": "not-an-id"}),
            json!({"id": 5, "name": "Five"}),
            json!({"seriesId": 6, "seasonNumber": 1, "episodeNumber": 1}),
            json!("garbage"),
        ];
        let records = normalize_records(&rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tmdb_id, 5);
        assert_eq!(records[1].tmdb_id, 6);
        assert_eq!(records[1].series_id, 6);
    }

    #[test]
    fn test_entry_serializes_with_type_tag() {
        let entry = WatchlistEntry::Series(WatchlistItem {
            tmdb_id: 1,
            series_id: 1,
            season_number: Some(2),
            name: "One".to_string(),
            poster_path: "/1.jpg".to_string(),
            is_season: true,
            added_at: None,
        });
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "series");
        assert_eq!(value["isSeason"], true);
        assert_eq!(value["seriesId"], 1);
    }
}
