//! Data models.

pub mod account;
pub mod config;
pub mod series;
pub mod watchlist;
