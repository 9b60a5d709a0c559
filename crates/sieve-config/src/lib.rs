//! Layered configuration values and theme merging for sieve.
//!
//! This crate provides the value model shared by the rest of the workspace and
//! the machinery for combining several configuration trees into one:
//!
//! - [`ConfigValue`]: a YAML/JSON value with a source location and an explicit
//!   merge operation
//! - [`parse`] / [`parse_file`]: load a document, honouring `!prefer` and
//!   `!concat` tags
//! - [`MergedConfig`]: a zero-copy view over ordered layers (first = lowest
//!   priority), resolved lazily through cursors
//! - [`merge_theme`]: the theme merger, which layers override fragments onto
//!   a base theme and materializes the result into a [`MergedTheme`]
//!
//! # Merge semantics
//!
//! - Maps merge field-wise, recursively. A map tagged `!prefer` replaces what
//!   lower layers hold at that path.
//! - Arrays replace. An array tagged `!concat` appends to the one below it.
//! - Scalars (including the empty string) always replace.
//! - A value of a different kind than the one below it replaces it.
//!
//! # Example
//!
//! ```
//! use sieve_config::{MaterializeOptions, merge_theme, parse};
//!
//! let mut diagnostics = Vec::new();
//! let base = parse("maxWidth: { '1/2': '50%' }", &mut diagnostics).unwrap();
//! let extend = parse("maxWidth: { '1/3': '33%' }", &mut diagnostics).unwrap();
//!
//! let theme = merge_theme(&base, &[extend], &MaterializeOptions::default()).unwrap();
//! assert_eq!(theme.token_str("maxWidth", "1/2"), Some("50%"));
//! assert_eq!(theme.token_str("maxWidth", "1/3"), Some("33%"));
//! ```

mod materialize;
mod merged;
mod parse;
mod tag;
mod theme;
mod types;

pub use types::{ConfigError, ConfigValue, ConfigValueKind, MergeOp, SourceLocation};

pub use tag::{ParsedTag, parse_tag};

pub use parse::{parse, parse_file};

pub use merged::{
    MergedArray, MergedArrayItem, MergedConfig, MergedCursor, MergedMap, MergedScalar,
    MergedValue,
};

pub use materialize::{DEFAULT_MAX_DEPTH, MaterializeOptions};

pub use theme::{MergedTheme, merge_theme};

// Re-export for convenience
pub use yaml_rust2::Yaml;
