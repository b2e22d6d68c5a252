use serde::Serialize;
use std::fmt;

use crate::error::DashboardError;

/// Normalized city name used as the cache and hashing key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CityKey(String);

impl CityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalize free-text city input: periods removed, whitespace runs
/// collapsed to one space, trimmed, lowercased.
///
/// Blank input (after normalization) is a `MissingParameter`.
pub fn normalize(raw: &str) -> Result<CityKey, DashboardError> {
    let without_periods = raw.replace('.', "");
    let collapsed = without_periods
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if collapsed.is_empty() {
        return Err(DashboardError::MissingParameter);
    }
    Ok(CityKey(collapsed))
}

/// Same as [`normalize`] for an optional query parameter.
pub fn normalize_param(raw: Option<&str>) -> Result<CityKey, DashboardError> {
    normalize(raw.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_and_whitespace() {
        let a = normalize("  New   York ").unwrap();
        let b = normalize("new york").unwrap();
        let c = normalize("NEW\tYORK").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.as_str(), "new york");
    }

    #[test]
    fn strips_periods() {
        assert_eq!(normalize("St. Louis").unwrap().as_str(), "st louis");
        assert_eq!(normalize("St Louis").unwrap(), normalize("st. louis.").unwrap());
    }

    #[test]
    fn blank_input_is_missing_parameter() {
        assert_eq!(normalize(""), Err(DashboardError::MissingParameter));
        assert_eq!(normalize("   \t "), Err(DashboardError::MissingParameter));
        assert_eq!(normalize(" . . "), Err(DashboardError::MissingParameter));
        assert_eq!(normalize_param(None), Err(DashboardError::MissingParameter));
    }

    #[test]
    fn non_ascii_is_kept() {
        assert_eq!(normalize("São  Paulo").unwrap().as_str(), "são paulo");
    }
}
