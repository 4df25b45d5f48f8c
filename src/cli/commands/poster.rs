//! Poster command implementation.

use super::read_overrides;
use crate::core::poster::{ImageSize, PosterResolver};
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Arguments for resolving one poster.
#[derive(Debug)]
pub struct PosterRequest<'a> {
    pub series_id: u64,
    pub default_path: Option<&'a str>,
    pub season: Option<u32>,
    pub allow_series_fallback: bool,
    pub size: Option<&'a str>,
    pub overrides_file: Option<&'a Path>,
}

/// Resolve and print a poster URL.
pub fn resolve(resolver: &PosterResolver, request: PosterRequest<'_>) -> Result<()> {
    let overrides = read_overrides(request.overrides_file)?;
    let size = request.size.map(str::parse::<ImageSize>).transpose()?;

    let url = resolver.resolve_url(
        request.series_id,
        request.default_path,
        &overrides,
        request.season,
        request.allow_series_fallback,
        size,
    );

    match url {
        Some(url) => println!("{}", url),
        None => println!("{}", "No poster available".yellow()),
    }
    Ok(())
}
