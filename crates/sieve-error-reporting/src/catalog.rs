//! Error code catalog and lookup.
//!
//! Maps error codes (like "S-1-1") to their metadata: subsystem, title and
//! a longer explanation. `sieve explain <CODE>` prints these entries.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata for an error code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorCodeInfo {
    /// Subsystem name (e.g., "config", "scan", "plugins")
    pub subsystem: String,

    /// Short title for the error
    pub title: String,

    /// Default message template
    pub message_template: String,

    /// When this error was introduced (version)
    pub since_version: String,
}

/// Global error catalog, embedded at compile time from `error_catalog.json`.
///
/// # Panics
///
/// Panics on first access if the embedded JSON is invalid, which can only
/// happen when the catalog file itself is edited incorrectly.
pub static ERROR_CATALOG: Lazy<HashMap<String, ErrorCodeInfo>> = Lazy::new(|| {
    let json_data = include_str!("../error_catalog.json");
    serde_json::from_str(json_data).expect("Invalid error catalog JSON - this is a bug in sieve")
});

/// Look up error code information.
///
/// ```
/// use sieve_error_reporting::catalog::get_error_info;
///
/// let info = get_error_info("S-2-2").unwrap();
/// assert_eq!(info.subsystem, "scan");
/// ```
pub fn get_error_info(code: &str) -> Option<&ErrorCodeInfo> {
    ERROR_CATALOG.get(code)
}

/// Every catalogued code, sorted by subsystem and then number.
pub fn codes() -> Vec<&'static str> {
    let mut codes: Vec<_> = ERROR_CATALOG.keys().map(String::as_str).collect();
    codes.sort_by_key(|code| {
        let mut parts = code.split('-').skip(1).map(|n| n.parse::<u32>().unwrap_or(u32::MAX));
        (parts.next(), parts.next())
    });
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        assert!(!ERROR_CATALOG.is_empty());
    }

    #[test]
    fn test_internal_error_exists() {
        let info = get_error_info("S-0-1").unwrap();
        assert_eq!(info.subsystem, "internal");
        assert_eq!(info.title, "Internal Error");
    }

    #[test]
    fn test_codes_match_their_subsystem() {
        for (code, info) in ERROR_CATALOG.iter() {
            let expected = match code.split('-').nth(1) {
                Some("0") => "internal",
                Some("1") => "config",
                Some("2") => "scan",
                Some("3") => "plugins",
                other => panic!("unexpected subsystem number {:?} in {}", other, code),
            };
            assert_eq!(info.subsystem, expected, "code {}", code);
        }
    }

    #[test]
    fn test_unknown_code() {
        assert!(get_error_info("S-999-999").is_none());
    }

    #[test]
    fn test_codes_sorted_numerically() {
        let codes = codes();
        assert_eq!(codes.len(), ERROR_CATALOG.len());
        assert_eq!(codes[0], "S-0-1");
        let config: Vec<_> = codes.iter().filter(|c| c.starts_with("S-1-")).copied().collect();
        assert_eq!(config, vec!["S-1-1", "S-1-2", "S-1-3", "S-1-20", "S-1-21", "S-1-22", "S-1-30", "S-1-31"]);
        assert_eq!(codes.last(), Some(&"S-3-1"));
    }
}
