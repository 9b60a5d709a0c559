//! Class-name extraction.
//!
//! Extraction is over-inclusive: every token that could be a class name is
//! reported, and the purge decision only asks whether a known candidate is
//! present.

use crate::error::ScanError;
use crate::scanner::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Turns document text into the set of candidate class names it mentions.
pub trait ClassExtractor: Send + Sync + fmt::Debug {
    fn extract(&self, text: &str) -> BTreeSet<String>;
}

/// Characters that end a token anywhere in markup.
const BROAD_EXCLUDED: &str = r#"<>"'`\s"#;

/// Characters that additionally split a token into inner pieces, so that
/// `class="{{ .Active }}"`-style template noise still yields `Active`.
const INNER_EXCLUDED: &str = r#"<>"'`\s.(){}\[\]#=%"#;

pub const DEFAULT_SEPARATOR: &str = ":";

static DEFAULT_EXTRACTOR: Lazy<DefaultExtractor> = Lazy::new(|| {
    DefaultExtractor::with_separator(DEFAULT_SEPARATOR)
        .expect("default extractor patterns are valid")
});

/// The default grammar: two passes over the text.
///
/// The broad pass keeps tokens whole (`hover:underline`, `max-w-1/3`,
/// `w-[72ch]`). The inner pass splits on punctuation that never appears in
/// a utility name, catching names embedded in scripts and templates. Neither
/// pass lets a token end in the variant separator.
#[derive(Debug, Clone)]
pub struct DefaultExtractor {
    broad: Regex,
    inner: Regex,
}

impl DefaultExtractor {
    pub fn new() -> Self {
        DEFAULT_EXTRACTOR.clone()
    }

    /// Build the grammar for a custom variant separator (e.g. `_`).
    pub fn with_separator(separator: &str) -> Result<Self, ScanError> {
        let escaped: String = separator
            .chars()
            .map(|c| regex::escape(c.encode_utf8(&mut [0; 4])))
            .collect();

        Ok(Self {
            broad: compile(&token_pattern(BROAD_EXCLUDED, &escaped))?,
            inner: compile(&token_pattern(INNER_EXCLUDED, &escaped))?,
        })
    }
}

impl Default for DefaultExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassExtractor for DefaultExtractor {
    fn extract(&self, text: &str) -> BTreeSet<String> {
        self.broad
            .find_iter(text)
            .chain(self.inner.find_iter(text))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

fn token_pattern(excluded: &str, separator: &str) -> String {
    format!("[^{}]*[^{}{}]", excluded, excluded, separator)
}

fn compile(pattern: &str) -> Result<Regex, ScanError> {
    Regex::new(pattern).map_err(|err| ScanError::InvalidExtractor {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })
}

/// A user-supplied pattern.
///
/// When the pattern has a capture group, group 1 holds the class names;
/// otherwise the whole match does. Either is split on whitespace, so
/// `class="([^"]+)"` yields every class in the attribute.
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    pattern: Regex,
}

impl RegexExtractor {
    pub fn new(pattern: &str) -> Result<Self, ScanError> {
        Ok(Self {
            pattern: compile(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl ClassExtractor for RegexExtractor {
    fn extract(&self, text: &str) -> BTreeSet<String> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
            .flat_map(|m| m.as_str().split_ascii_whitespace())
            .map(str::to_string)
            .collect()
    }
}

/// Default extractor plus per-extension overrides.
#[derive(Debug, Clone)]
pub struct ExtractorSet {
    default: Arc<dyn ClassExtractor>,
    by_extension: HashMap<String, Arc<dyn ClassExtractor>>,
}

impl ExtractorSet {
    pub fn new(default: Arc<dyn ClassExtractor>) -> Self {
        Self {
            default,
            by_extension: HashMap::new(),
        }
    }

    /// Use `extractor` for documents with any of `extensions` (with or
    /// without the leading dot).
    pub fn with_extractor<I, S>(mut self, extensions: I, extractor: Arc<dyn ClassExtractor>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in extensions {
            let ext = ext.as_ref().trim_start_matches('.');
            self.by_extension.insert(ext.to_string(), Arc::clone(&extractor));
        }
        self
    }

    pub fn for_path(&self, path: &Path) -> &dyn ClassExtractor {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.by_extension.get(ext))
            .map_or(self.default.as_ref(), |extractor| extractor.as_ref())
    }

    pub fn extract(&self, document: &Document) -> BTreeSet<String> {
        self.for_path(&document.path).extract(&document.text)
    }
}

impl Default for ExtractorSet {
    fn default() -> Self {
        Self::new(Arc::new(DefaultExtractor::new()))
    }
}
