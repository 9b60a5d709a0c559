//! Configuration resolution.
//!
//! [`ConfigResolver`] turns a raw configuration document into a merged
//! theme and a purge decision:
//!
//! 1. normalize the record ([`ConfigRecord`])
//! 2. resolve plugin references against the injected [`PluginRegistry`]
//! 3. merge the theme: base, plugin defaults in plugin order, the
//!    `theme.<category>` replacements, then `theme.extend`
//! 4. build a [`PurgeEngine`] and, for [`ConfigResolver::resolve`], run it

use crate::defaults::default_theme;
use crate::error::{Result, SieveError};
use crate::plugins::{PluginDescriptor, PluginRef, PluginRegistry};
use crate::record::{ConfigRecord, PurgeOptions};
use indexmap::IndexMap;
use sieve_config::{ConfigValue, MaterializeOptions, MergeOp, MergedTheme, merge_theme, parse_file};
use sieve_error_reporting::DiagnosticMessage;
use sieve_purge::{
    ClassExtractor, ContentScanner, DefaultExtractor, ExtractorSet, PurgeDecision, PurgeEngine,
    PurgeMode, PurgeReport, RegexExtractor, Safelist, ScanError,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves configuration records.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    registry: PluginRegistry,
    base_theme: ConfigValue,
    root: Option<PathBuf>,
    materialize: MaterializeOptions,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new(PluginRegistry::with_builtins())
    }
}

/// A configuration merged and ready to purge, before any scanning.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub theme: MergedTheme,
    pub plugins: Vec<PluginRef>,
    pub engine: PurgeEngine,
    /// Keys kept verbatim for the style generator.
    pub passthrough: IndexMap<String, ConfigValue>,
    pub diagnostics: Vec<DiagnosticMessage>,
}

/// A fully resolved configuration.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub theme: MergedTheme,
    pub plugins: Vec<PluginRef>,
    pub decision: PurgeDecision,
    pub passthrough: IndexMap<String, ConfigValue>,
    /// Deprecations, unsupported settings and skipped documents.
    pub diagnostics: Vec<DiagnosticMessage>,
    pub documents_scanned: usize,
}

impl ConfigResolver {
    /// A resolver using `registry` and the built-in base theme.
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry,
            base_theme: default_theme().clone(),
            root: None,
            materialize: MaterializeOptions::default(),
        }
    }

    pub fn with_base_theme(mut self, base_theme: ConfigValue) -> Self {
        self.base_theme = base_theme;
        self
    }

    /// Resolve content globs against `root`. Takes precedence over the
    /// directory of a loaded file.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.materialize.max_depth = max_depth;
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Normalize, resolve plugins, merge the theme and build the purge
    /// engine. Nothing is read from disk.
    pub fn load(&self, raw: &ConfigValue) -> Result<LoadedConfig> {
        self.load_with(raw, self.root.clone(), Vec::new())
    }

    /// [`load`](Self::load) followed by a purge run.
    pub fn resolve(&self, raw: &ConfigValue) -> Result<ResolvedConfig> {
        self.load(raw)?.resolve()
    }

    /// Parse `content` and load it. `filename` appears in locations only.
    pub fn load_str(&self, content: &str, filename: &str) -> Result<LoadedConfig> {
        let mut diagnostics = Vec::new();
        let raw = parse_document(content, filename, &mut diagnostics)?;
        self.load_with(&raw, self.root.clone(), diagnostics)
    }

    pub fn resolve_str(&self, content: &str, filename: &str) -> Result<ResolvedConfig> {
        self.load_str(content, filename)?.resolve()
    }

    /// Read and load a configuration file. Content globs resolve against
    /// the file's directory unless a root was set.
    pub fn load_file(&self, path: &Path) -> Result<LoadedConfig> {
        let content = std::fs::read_to_string(path).map_err(|source| SieveError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;

        let mut diagnostics = Vec::new();
        let raw = parse_document(&content, &path.display().to_string(), &mut diagnostics)?;
        let root = self.root.clone().or_else(|| {
            path.parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf)
        });
        self.load_with(&raw, root, diagnostics)
    }

    pub fn resolve_file(&self, path: &Path) -> Result<ResolvedConfig> {
        self.load_file(path)?.resolve()
    }

    fn load_with(
        &self,
        raw: &ConfigValue,
        root: Option<PathBuf>,
        mut diagnostics: Vec<DiagnosticMessage>,
    ) -> Result<LoadedConfig> {
        let record = ConfigRecord::from_value(raw, &mut diagnostics)?;

        let descriptors = record
            .plugins
            .iter()
            .map(|plugin| self.registry.resolve(plugin))
            .collect::<Result<Vec<_>>>()?;

        let theme = self.merge(&record, &descriptors)?;
        let engine = build_engine(&record.purge, &record.separator, root)
            .map_err(|err| {
                diagnostics.push(err.to_diagnostic());
                SieveError::config_parse(diagnostics.clone())
            })?;

        info!(
            plugins = descriptors.len(),
            categories = theme.categories().count(),
            purge = record.purge.enabled,
            patterns = record.purge.content.len(),
            safelist = record.purge.safelist.len(),
            "configuration loaded"
        );

        let passthrough = record
            .passthrough()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();

        Ok(LoadedConfig {
            theme,
            plugins: record.plugins,
            engine,
            passthrough,
            diagnostics,
        })
    }

    fn merge(&self, record: &ConfigRecord, plugins: &[&PluginDescriptor]) -> Result<MergedTheme> {
        let mut layers: Vec<ConfigValue> = plugins
            .iter()
            .filter_map(|plugin| {
                debug!(plugin = %plugin.name, has_theme = plugin.theme.is_some(), "applying plugin");
                plugin.theme.clone()
            })
            .collect();

        // `theme.<category>` replaces the category outright.
        if let Some(categories) = record.theme.as_map().filter(|c| !c.is_empty()) {
            let replacements = categories
                .iter()
                .map(|(name, tokens)| (name.clone(), tokens.clone().with_merge_op(MergeOp::Prefer)))
                .collect();
            layers.push(ConfigValue::new_map(replacements));
        }

        if record.extend.as_map().is_some_and(|e| !e.is_empty()) {
            layers.push(record.extend.clone());
        }

        Ok(merge_theme(&self.base_theme, &layers, &self.materialize)?)
    }
}

impl LoadedConfig {
    /// Scan content and build the purge decision.
    pub fn run_purge(&self) -> Result<PurgeReport> {
        Ok(self.engine.run()?)
    }

    /// Run the purge and fold its report into a [`ResolvedConfig`].
    pub fn resolve(self) -> Result<ResolvedConfig> {
        let report = self.run_purge()?;

        let mut diagnostics = self.diagnostics;
        diagnostics.extend(report.warnings);

        Ok(ResolvedConfig {
            theme: self.theme,
            plugins: self.plugins,
            decision: report.decision,
            passthrough: self.passthrough,
            diagnostics,
            documents_scanned: report.documents_scanned,
        })
    }
}

impl ResolvedConfig {
    /// Whether rules for the class `name` survive the purge.
    pub fn should_keep(&self, name: &str) -> bool {
        self.decision.keep(name)
    }
}

fn parse_document(
    content: &str,
    filename: &str,
    diagnostics: &mut Vec<DiagnosticMessage>,
) -> Result<ConfigValue> {
    parse_file(content, filename, diagnostics).map_err(|err| {
        diagnostics.push(err.to_diagnostic());
        SieveError::config_parse(diagnostics.clone())
    })
}

fn build_engine(
    purge: &PurgeOptions,
    separator: &str,
    root: Option<PathBuf>,
) -> std::result::Result<PurgeEngine, ScanError> {
    if !purge.enabled {
        return Ok(PurgeEngine::disabled());
    }

    let default: Arc<dyn ClassExtractor> = match &purge.default_extractor {
        Some(pattern) => Arc::new(RegexExtractor::new(pattern)?),
        None => Arc::new(DefaultExtractor::with_separator(separator)?),
    };

    let mut extractors = ExtractorSet::new(default);
    for spec in &purge.extractors {
        extractors = extractors.with_extractor(&spec.extensions, Arc::new(RegexExtractor::new(&spec.pattern)?));
    }

    let mut scanner = ContentScanner::new(purge.content.iter().cloned());
    if let Some(root) = root {
        scanner = scanner.with_root(root);
    }

    Ok(PurgeEngine::new(scanner)
        .with_mode(PurgeMode::All)
        .with_extractors(extractors)
        .with_safelist(Safelist::from_names(&purge.safelist)))
}
