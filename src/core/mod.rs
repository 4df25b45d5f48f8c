//! Core decision logic.

pub mod account;
pub mod breaker;
pub mod poster;
pub mod retry;
pub mod watchlist;
