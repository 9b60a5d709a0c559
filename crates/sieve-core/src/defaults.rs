//! Built-in base theme.

use once_cell::sync::Lazy;
use sieve_config::{ConfigValue, parse_file};

static DEFAULT_THEME: Lazy<ConfigValue> = Lazy::new(|| {
    parse_file(
        include_str!("../resources/default-theme.yml"),
        "default-theme.yml",
        &mut Vec::new(),
    )
    .unwrap_or_else(|err| panic!("built-in default theme is invalid: {}", err))
});

/// The base theme every configuration is merged onto.
pub fn default_theme() -> &'static ConfigValue {
    &DEFAULT_THEME
}
