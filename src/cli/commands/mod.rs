//! CLI command implementations.

pub mod browse;
pub mod check;
pub mod poster;
pub mod watchlist;

use crate::core::poster::PosterOverrides;
use crate::Result;
use serde::Serialize;
use std::path::Path;

/// Print a value as pretty JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Read poster overrides from a JSON object file; no file means no overrides.
pub(crate) fn read_overrides(path: Option<&Path>) -> Result<PosterOverrides> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        None => Ok(PosterOverrides::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"100_1": "/a.jpg", "100": "/legacy.jpg"}}"#).unwrap();

        let overrides = read_overrides(Some(file.path())).unwrap();
        assert_eq!(overrides.len(), 2);
        assert!(read_overrides(None).unwrap().is_empty());
    }
}
