//! Watchlist grouping.
//!
//! Episode records of the same season are folded into one basket. A season
//! or series record for a season that already has a basket is dropped, and
//! every entry must end up with a poster.

use crate::core::poster::{resolve_poster, PosterOverrides};
use crate::models::watchlist::{
    normalize_records, RecordKind, WatchlistBasket, WatchlistEntry, WatchlistItem, WatchlistRecord,
};
use serde_json::Value;
use std::collections::HashMap;

/// Basket under construction.
struct BasketBuilder {
    series_id: u64,
    season_number: u32,
    poster_path: Option<String>,
    season_poster: Option<String>,
    episodes: Vec<WatchlistRecord>,
}

impl BasketBuilder {
    fn new(record: &WatchlistRecord, season_number: u32) -> Self {
        Self {
            series_id: record.series_id,
            season_number,
            poster_path: None,
            season_poster: None,
            episodes: Vec::new(),
        }
    }

    fn push(&mut self, record: &WatchlistRecord) {
        if self.poster_path.is_none() {
            self.poster_path = record.poster_path.clone();
        }
        if self.season_poster.is_none() {
            self.season_poster = record.season_poster.clone();
        }
        self.episodes.push(record.clone());
    }

    fn finish(mut self, overrides: &PosterOverrides) -> Option<WatchlistBasket> {
        // Stable: equal episode numbers keep input order
        self.episodes.sort_by_key(|e| e.episode_number);

        let series_name = self
            .episodes
            .first()
            .map(|e| e.name.split(" - ").next().unwrap_or_default().to_string())
            .unwrap_or_default();

        let default_poster = self.season_poster.as_deref().or(self.poster_path.as_deref());
        let poster_path = resolve_poster(
            self.series_id,
            default_poster,
            overrides,
            Some(self.season_number),
            true,
        )?;

        Some(WatchlistBasket {
            series_id: self.series_id,
            season_number: self.season_number,
            name: format!("{} (Season {})", series_name, self.season_number),
            poster_path,
            episode_count: self.episodes.len(),
            episodes: self.episodes,
        })
    }
}

/// Group watchlist records into display entries.
///
/// Standalone series and seasons come first in input order, followed by
/// baskets in order of first appearance. Entries without a poster are
/// dropped.
pub fn aggregate(records: &[WatchlistRecord], overrides: &PosterOverrides) -> Vec<WatchlistEntry> {
    let mut baskets: Vec<BasketBuilder> = Vec::new();
    let mut index: HashMap<(u64, u32), usize> = HashMap::new();

    for record in records {
        if record.kind() != RecordKind::Episode {
            continue;
        }
        let Some(season) = record.season_number else {
            continue;
        };
        let slot = *index.entry((record.series_id, season)).or_insert_with(|| {
            baskets.push(BasketBuilder::new(record, season));
            baskets.len() - 1
        });
        baskets[slot].push(record);
    }

    let mut entries = Vec::with_capacity(records.len());

    for record in records {
        if record.kind() == RecordKind::Episode {
            continue;
        }
        if let Some(season) = record.season_number {
            if index.contains_key(&(record.series_id, season)) {
                continue;
            }
        }

        let poster_path = resolve_poster(
            record.series_id,
            record.poster_path.as_deref(),
            overrides,
            record.season_number,
            true,
        );
        match poster_path {
            Some(poster_path) => entries.push(WatchlistEntry::Series(WatchlistItem {
                tmdb_id: record.tmdb_id,
                series_id: record.series_id,
                season_number: record.season_number,
                name: record.name.clone(),
                poster_path,
                is_season: record.season_number.is_some(),
                added_at: record.added_at,
            })),
            None => tracing::debug!("Dropping watchlist item {} without poster", record.tmdb_id),
        }
    }

    let basket_count = baskets.len();
    entries.extend(
        baskets
            .into_iter()
            .filter_map(|builder| builder.finish(overrides))
            .map(WatchlistEntry::Basket),
    );

    tracing::debug!(
        "Aggregated {} records into {} entries ({} baskets)",
        records.len(),
        entries.len(),
        basket_count
    );
    entries
}

/// Normalize raw rows and group them.
pub fn aggregate_values(values: &[Value], overrides: &PosterOverrides) -> Vec<WatchlistEntry> {
    aggregate(&normalize_records(values), overrides)
}
