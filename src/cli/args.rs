//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SERIEE - Browse and track TV series
#[derive(Parser, Debug)]
#[command(name = "seriee")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip the session cache and the cache service
    #[arg(long, global = true)]
    pub direct: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show series details
    Series {
        /// TMDB series id
        #[arg(value_name = "ID")]
        id: u64,
    },

    /// Show season details
    Season {
        /// TMDB series id
        #[arg(value_name = "ID")]
        id: u64,

        /// Season number
        #[arg(value_name = "SEASON")]
        season: u32,
    },

    /// List trending series
    Trending {
        /// Time window: day or week
        #[arg(long, default_value = "week")]
        window: String,
    },

    /// List top rated series
    TopRated,

    /// List series airing today
    NewReleases,

    /// List on-the-air series with their next episodes
    Hero,

    /// Search series by name
    Search {
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// List recommendations for a series
    Recommendations {
        /// TMDB series id
        #[arg(value_name = "ID")]
        id: u64,
    },

    /// Show person details
    Person {
        /// TMDB person id
        #[arg(value_name = "ID")]
        id: u64,
    },

    /// Show a person's combined credits
    PersonCredits {
        /// TMDB person id
        #[arg(value_name = "ID")]
        id: u64,
    },

    /// Discover series with raw TMDB filters
    Discover {
        /// Query fragment, e.g. "with_genres=18&sort_by=popularity.desc"
        #[arg(value_name = "PARAMS", default_value = "")]
        params: String,
    },

    /// Resolve a poster URL
    Poster {
        /// TMDB series id
        #[arg(value_name = "ID")]
        series_id: u64,

        /// Default poster path from TMDB
        #[arg(short, long)]
        path: Option<String>,

        /// Season number (0 or omitted for the series)
        #[arg(short, long)]
        season: Option<u32>,

        /// Do not fall back to series-level overrides for a season
        #[arg(long)]
        no_series_fallback: bool,

        /// Image size (w92, w154, w185, w200, w300, w342, w500, w780, original)
        #[arg(long)]
        size: Option<String>,

        /// JSON file with poster overrides
        #[arg(short, long, value_name = "FILE")]
        overrides: Option<PathBuf>,
    },

    /// Group a watchlist export into display entries
    Watchlist {
        /// JSON file with an array of watchlist rows
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// JSON file with poster overrides
        #[arg(short, long, value_name = "FILE")]
        overrides: Option<PathBuf>,

        /// Print full image URLs instead of paths
        #[arg(long)]
        urls: bool,
    },

    /// Check connectivity to TMDB and the cache service
    Check,
}
