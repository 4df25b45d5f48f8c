//! SERIEE client core
//!
//! Data resolution layer for the SERIEE series tracker: TMDB fetching with
//! cache-service fallback, poster resolution, watchlist grouping and account
//! deletion.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod preflight;
pub mod services;

pub use error::{Error, Result};
