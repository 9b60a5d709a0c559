//! Diagnostic messages for sieve.
//!
//! Problems that a user has to act on (a malformed configuration, an
//! unregistered plugin, a document that could not be decoded) are reported as
//! structured [`DiagnosticMessage`]s rather than bare strings. Messages follow
//! the tidyverse layout:
//!
//! 1. a short **title**
//! 2. a **problem** statement
//! 3. bulleted **details**
//! 4. optional **hints**
//!
//! Every message may carry an error code (`S-<subsystem>-<n>`) with an entry
//! in the embedded [`catalog`](crate::catalog).
//!
//! # Example
//!
//! ```
//! use sieve_error_reporting::DiagnosticMessageBuilder;
//!
//! let warning = DiagnosticMessageBuilder::warning("Undecodable document")
//!     .with_code("S-2-2")
//!     .problem("`assets/logo.png` is not valid UTF-8 text")
//!     .add_hint("Exclude binary files from the content globs?")
//!     .with_location("assets/logo.png")
//!     .build();
//!
//! assert!(warning.to_text().starts_with("Warning [S-2-2]: Undecodable document"));
//! ```

pub mod builder;
pub mod catalog;
pub mod diagnostic;

pub use builder::DiagnosticMessageBuilder;
pub use catalog::{ERROR_CATALOG, ErrorCodeInfo, get_error_info};
pub use diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage};
