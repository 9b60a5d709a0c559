//! Configuration resolution for sieve.
//!
//! Ties the theme merger in `sieve-config` and the purge engine in
//! `sieve-purge` together behind [`ConfigResolver`].
//!
//! ```
//! use sieve_core::ConfigResolver;
//!
//! let resolved = ConfigResolver::default()
//!     .resolve_str("theme: { extend: { maxWidth: { '1/2': '50%' } } }", "sieve.yml")
//!     .unwrap();
//!
//! assert_eq!(resolved.theme.token_str("maxWidth", "1/2"), Some("50%"));
//! assert!(resolved.should_keep("anything"));
//! ```

pub mod defaults;
pub mod error;
pub mod plugins;
pub mod record;
pub mod resolver;

pub use defaults::default_theme;
pub use error::{Result, SieveError};
pub use plugins::{PluginDescriptor, PluginRef, PluginRegistry};
pub use record::{ConfigEntry, ConfigRecord, ExtractorSpec, KEY_ALIASES, KnownKey, PurgeOptions, canonical_key};
pub use resolver::{ConfigResolver, LoadedConfig, ResolvedConfig};
