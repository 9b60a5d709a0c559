//! Purge decisions.
//!
//! The engine scans all content, freezes the usage set, and only then hands
//! out a [`PurgeDecision`]. In disabled mode the scanner is never touched.

use crate::error::ScanError;
use crate::extractor::ExtractorSet;
use crate::safelist::Safelist;
use crate::scanner::{ContentScanner, ScanEvent};
use crate::usage::{UsageCollector, UsageSet};
use sieve_error_reporting::DiagnosticMessage;
use tracing::{debug, info, warn};

/// Keep a rule iff its name is safelisted or was seen in content.
pub fn should_keep(name: &str, usage: &UsageSet, safelist: &Safelist) -> bool {
    safelist.contains(name) || usage.contains(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PurgeMode {
    /// Scan every document, then drop what was not seen.
    All,
    /// Keep everything; nothing is scanned.
    #[default]
    Disabled,
}

/// The decision handed to the style generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeDecision {
    KeepAll,
    Filter { usage: UsageSet, safelist: Safelist },
}

impl PurgeDecision {
    pub fn keep(&self, name: &str) -> bool {
        match self {
            PurgeDecision::KeepAll => true,
            PurgeDecision::Filter { usage, safelist } => should_keep(name, usage, safelist),
        }
    }

    pub fn is_keep_all(&self) -> bool {
        matches!(self, PurgeDecision::KeepAll)
    }

    /// Split candidates into (kept, dropped), preserving input order.
    pub fn partition<I, S>(&self, candidates: I) -> (Vec<String>, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        candidates
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .partition(|name| self.keep(name))
    }
}

/// Result of a purge run.
#[derive(Debug, Clone)]
pub struct PurgeReport {
    pub decision: PurgeDecision,
    /// Documents that were skipped, one diagnostic each.
    pub warnings: Vec<DiagnosticMessage>,
    pub documents_scanned: usize,
}

/// Scanner, extractors and safelist, composed.
#[derive(Debug, Clone, Default)]
pub struct PurgeEngine {
    mode: PurgeMode,
    scanner: ContentScanner,
    extractors: ExtractorSet,
    safelist: Safelist,
}

impl PurgeEngine {
    pub fn new(scanner: ContentScanner) -> Self {
        Self {
            mode: PurgeMode::All,
            scanner,
            extractors: ExtractorSet::default(),
            safelist: Safelist::default(),
        }
    }

    /// An engine that keeps everything.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: PurgeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_extractors(mut self, extractors: ExtractorSet) -> Self {
        self.extractors = extractors;
        self
    }

    pub fn with_safelist(mut self, safelist: Safelist) -> Self {
        self.safelist = safelist;
        self
    }

    pub fn mode(&self) -> PurgeMode {
        self.mode
    }

    pub fn scanner(&self) -> &ContentScanner {
        &self.scanner
    }

    pub fn safelist(&self) -> &Safelist {
        &self.safelist
    }

    /// Scan all content and build the decision.
    ///
    /// Undecodable documents are skipped and reported in
    /// [`PurgeReport::warnings`]; any [`ScanError`] aborts the run.
    pub fn run(&self) -> Result<PurgeReport, ScanError> {
        if self.mode == PurgeMode::Disabled {
            info!("purging disabled; keeping every rule");
            return Ok(PurgeReport {
                decision: PurgeDecision::KeepAll,
                warnings: Vec::new(),
                documents_scanned: 0,
            });
        }

        let mut collector = UsageCollector::new();
        let mut warnings = Vec::new();
        let mut documents_scanned = 0;

        for event in self.scanner.scan() {
            match event? {
                ScanEvent::Document(document) => {
                    let names = self.extractors.extract(&document);
                    debug!(path = %document.path.display(), names = names.len(), "extracted class names");
                    collector.extend(names);
                    documents_scanned += 1;
                }
                ScanEvent::Skipped(warning) => {
                    warn!(location = warning.location.as_deref().unwrap_or("<unknown>"), "{}", warning.title);
                    warnings.push(warning);
                }
            }
        }

        let usage = collector.finish();
        info!(
            documents = documents_scanned,
            skipped = warnings.len(),
            used = usage.len(),
            safelisted = self.safelist.len(),
            "content scan complete"
        );

        Ok(PurgeReport {
            decision: PurgeDecision::Filter {
                usage,
                safelist: self.safelist.clone(),
            },
            warnings,
            documents_scanned,
        })
    }
}
