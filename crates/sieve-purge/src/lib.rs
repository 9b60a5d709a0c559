//! Content scanning and purge decisions for sieve.
//!
//! The pipeline is a single batch pass:
//!
//! 1. [`ContentScanner`] expands content globs into documents
//! 2. an [`ExtractorSet`] pulls candidate class names out of each document
//! 3. a [`UsageCollector`] unions them into a frozen [`UsageSet`]
//! 4. [`PurgeEngine::run`] combines usage with the [`Safelist`] into a
//!    [`PurgeDecision`]
//!
//! ```
//! use sieve_purge::{PurgeDecision, Safelist, UsageSet};
//!
//! let decision = PurgeDecision::Filter {
//!     usage: ["active"].into_iter().collect::<UsageSet>(),
//!     safelist: Safelist::from_names(["pagination"]),
//! };
//!
//! let (kept, dropped) = decision.partition(["pagination", "active", "unused"]);
//! assert_eq!(kept, vec!["pagination", "active"]);
//! assert_eq!(dropped, vec!["unused"]);
//! ```

pub mod engine;
pub mod error;
pub mod extractor;
pub mod safelist;
pub mod scanner;
pub mod usage;

pub use engine::{PurgeDecision, PurgeEngine, PurgeMode, PurgeReport, should_keep};
pub use error::ScanError;
pub use extractor::{
    ClassExtractor, DEFAULT_SEPARATOR, DefaultExtractor, ExtractorSet, RegexExtractor,
};
pub use safelist::Safelist;
pub use scanner::{ContentScanner, Document, Documents, ScanEvent};
pub use usage::{UsageCollector, UsageSet};
