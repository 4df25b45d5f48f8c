//! Watchlist command implementation.

use super::{print_json, read_overrides};
use crate::core::poster::PosterResolver;
use crate::core::watchlist::aggregate_values;
use crate::models::watchlist::WatchlistEntry;
use crate::{Error, Result};
use colored::Colorize;
use serde_json::Value;
use std::path::Path;

/// Group a watchlist export and print the display entries.
pub fn group(
    resolver: &PosterResolver,
    file: &Path,
    overrides_file: Option<&Path>,
    urls: bool,
) -> Result<()> {
    let content = std::fs::read_to_string(file)?;
    let rows: Vec<Value> = match serde_json::from_str(&content)? {
        Value::Array(rows) => rows,
        _ => {
            return Err(Error::other(format!(
                "{}: expected a JSON array of watchlist rows",
                file.display()
            )))
        }
    };
    let overrides = read_overrides(overrides_file)?;

    let mut entries = aggregate_values(&rows, &overrides);
    if urls {
        for entry in &mut entries {
            let url = resolver.url(Some(entry.poster_path()), None);
            if let Some(url) = url {
                match entry {
                    WatchlistEntry::Basket(basket) => basket.poster_path = url,
                    WatchlistEntry::Series(item) => item.poster_path = url,
                }
            }
        }
    }

    eprintln!(
        "{} {} rows -> {} entries",
        "Watchlist:".bold().cyan(),
        rows.len(),
        entries.len()
    );
    print_json(&entries)
}
