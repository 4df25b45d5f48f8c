//! External service clients and collaborator traits.

pub mod backend;
pub mod tmdb;
pub mod transport;
