//! Browse commands: details, listings, search and people.

use super::print_json;
use crate::models::series::SeriesSummary;
use crate::services::tmdb::{FetchOptions, TmdbClient, TrendingWindow};
use crate::Result;
use colored::Colorize;

/// Print a listing as one line per series.
fn print_listing(title: &str, items: &[SeriesSummary]) {
    println!("{} ({})", title.bold().cyan(), items.len());
    if items.is_empty() {
        println!("  {}", "nothing found".dimmed());
        return;
    }
    for item in items {
        let year = item
            .first_air_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .unwrap_or("----");
        let rating = item
            .vote_average
            .map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>8}  {}  {}  {}",
            item.id.to_string().yellow(),
            year,
            rating.green(),
            item.name.as_deref().unwrap_or("(untitled)")
        );
    }
}

/// Show series details.
pub async fn series(client: &TmdbClient, id: u64, options: FetchOptions) -> Result<()> {
    let details = client.get_series_details(id, options).await?;
    print_json(&details)
}

/// Show season details.
pub async fn season(client: &TmdbClient, id: u64, season: u32, options: FetchOptions) -> Result<()> {
    let details = client.get_season_details(id, season, options).await?;
    print_json(&details)
}

/// List trending series.
pub async fn trending(client: &TmdbClient, window: &str, options: FetchOptions) -> Result<()> {
    let window: TrendingWindow = window.parse()?;
    let items = client.get_trending(window, options).await;
    print_listing("Trending", &items);
    Ok(())
}

/// List top rated series.
pub async fn top_rated(client: &TmdbClient, options: FetchOptions) -> Result<()> {
    let items = client.get_top_rated(options).await?;
    print_listing("Top rated", &items);
    Ok(())
}

/// List series airing today.
pub async fn new_releases(client: &TmdbClient, options: FetchOptions) -> Result<()> {
    let items = client.get_new_releases(options).await?;
    print_listing("Airing today", &items);
    Ok(())
}

/// List on-the-air series with their next episode.
pub async fn hero(client: &TmdbClient, options: FetchOptions) -> Result<()> {
    let shows = client.get_hero_episodes(options).await;
    println!("{} ({})", "On the air".bold().cyan(), shows.len());
    for show in &shows {
        let next = show
            .next_episode_to_air
            .as_ref()
            .map(|ep| {
                format!(
                    "S{:02}E{:02} {}",
                    ep.season_number,
                    ep.episode_number,
                    ep.air_date.as_deref().unwrap_or("TBA")
                )
            })
            .unwrap_or_else(|| "no upcoming episode".to_string());
        println!(
            "  {:>8}  {}  {}",
            show.id.to_string().yellow(),
            show.name.as_deref().unwrap_or("(untitled)"),
            next.dimmed()
        );
    }
    Ok(())
}

/// Search series by name.
pub async fn search(client: &TmdbClient, query: &str) -> Result<()> {
    let page = client.search_series(query).await?;
    print_listing(&format!("Results for \"{}\"", query), &page.results);
    Ok(())
}

/// List recommendations for a series.
pub async fn recommendations(client: &TmdbClient, id: u64) -> Result<()> {
    let items = client.get_recommendations(id).await?;
    print_listing("Recommendations", &items);
    Ok(())
}

/// Show person details.
pub async fn person(client: &TmdbClient, id: u64, options: FetchOptions) -> Result<()> {
    let details = client.get_person_details(id, options).await?;
    print_json(&details)
}

/// Show a person's combined credits.
pub async fn person_credits(client: &TmdbClient, id: u64, options: FetchOptions) -> Result<()> {
    let credits = client.get_person_credits(id, options).await?;
    print_json(&credits)
}

/// Discover series with raw filters.
pub async fn discover(client: &TmdbClient, params: &str) -> Result<()> {
    let page = client.discover_series(params).await?;
    print_listing("Discover", &page.results);
    Ok(())
}
