//! Check command implementation.

use crate::models::config::Config;
use crate::preflight;
use crate::services::tmdb::TmdbClient;
use crate::{Error, Result};
use colored::Colorize;

/// Run preflight checks and report the results.
pub async fn check(config: &Config) -> Result<()> {
    println!("{}", "Running preflight checks...".bold());
    println!();

    let results = match TmdbClient::from_config(config) {
        Ok(client) => preflight::run_preflight_checks(Some(&client), None).await,
        Err(e) => preflight::run_preflight_checks(None, Some(&e.to_string())).await,
    };
    preflight::print_results(&results);
    println!();

    if !preflight::all_passed(&results) {
        return Err(Error::other("Preflight checks failed. Fix the issues above and try again."));
    }
    Ok(())
}
