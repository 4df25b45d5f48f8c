//! SERIEE CLI
//!
//! Command-line front end for the SERIEE client core: browse TMDB through the
//! cache tiers, resolve posters and group watchlist exports.

use clap::Parser;
use seriee::cli::{
    args::{Cli, Commands},
    commands::{browse, check, poster, watchlist},
};
use seriee::core::poster::PosterResolver;
use seriee::models::config::load_config;
use seriee::services::tmdb::{FetchOptions, TmdbClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let config = load_config();
    let resolver = PosterResolver::from_config(&config.images);
    let options = FetchOptions {
        force_direct: cli.direct,
    };

    // Built on demand so offline commands work without an API key
    let client = || TmdbClient::from_config(&config);

    match cli.command {
        Commands::Series { id } => browse::series(&client()?, id, options).await?,
        Commands::Season { id, season } => browse::season(&client()?, id, season, options).await?,
        Commands::Trending { window } => browse::trending(&client()?, &window, options).await?,
        Commands::TopRated => browse::top_rated(&client()?, options).await?,
        Commands::NewReleases => browse::new_releases(&client()?, options).await?,
        Commands::Hero => browse::hero(&client()?, options).await?,
        Commands::Search { query } => browse::search(&client()?, &query).await?,
        Commands::Recommendations { id } => browse::recommendations(&client()?, id).await?,
        Commands::Person { id } => browse::person(&client()?, id, options).await?,
        Commands::PersonCredits { id } => browse::person_credits(&client()?, id, options).await?,
        Commands::Discover { params } => browse::discover(&client()?, &params).await?,
        Commands::Poster {
            series_id,
            path,
            season,
            no_series_fallback,
            size,
            overrides,
        } => poster::resolve(
            &resolver,
            poster::PosterRequest {
                series_id,
                default_path: path.as_deref(),
                season,
                allow_series_fallback: !no_series_fallback,
                size: size.as_deref(),
                overrides_file: overrides.as_deref(),
            },
        )?,
        Commands::Watchlist {
            file,
            overrides,
            urls,
        } => watchlist::group(&resolver, &file, overrides.as_deref(), urls)?,
        Commands::Check => check::check(&config).await?,
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("seriee=debug")
        } else {
            EnvFilter::new("seriee=info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
