//! Configuration record normalization.
//!
//! A raw configuration document is permissive: several shapes are accepted
//! for the purge settings, legacy key spellings still work, and keys this
//! crate does not interpret are carried along untouched. [`ConfigRecord`]
//! is the normalized form the resolver works from.
//!
//! Accepted purge shapes:
//!
//! ```yaml
//! purge: false                      # disabled
//! purge: ['./layouts/**/*.html']    # enabled, these globs
//! purge:
//!   enabled: true
//!   content: ['./layouts/**/*.html']
//!   mode: all
//!   options:
//!     safelist: [pagination, active]
//!     extractors:
//!       - extensions: [md]
//!         pattern: 'class="([^"]+)"'
//! content: ['./src/**/*.{html,js}'] # modern spelling of `purge`
//! content: { files: ['./src/**/*.html'] }
//! safelist: [active]                # top-level safelist
//! ```

use crate::error::{Result, SieveError};
use crate::plugins::PluginRef;
use indexmap::{IndexMap, IndexSet};
use sieve_config::{ConfigValue, ConfigValueKind, Yaml};
use sieve_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};
use sieve_purge::DEFAULT_SEPARATOR;
use tracing::debug;

/// Legacy key spellings and the key each one stands for.
///
/// Both spellings may appear in one record; their values are combined.
pub static KEY_ALIASES: &[(&str, &str)] = &[("whitelist", "safelist"), ("purge", "content")];

/// The modern spelling of `key`.
pub fn canonical_key(key: &str) -> &str {
    KEY_ALIASES
        .iter()
        .find(|(legacy, _)| *legacy == key)
        .map_or(key, |(_, modern)| modern)
}

/// Top-level keys the resolver interprets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownKey {
    Theme,
    Content,
    Safelist,
    Plugins,
    Separator,
}

impl KnownKey {
    /// Classify a top-level key, honouring legacy spellings.
    pub fn from_key(key: &str) -> Option<Self> {
        match canonical_key(key) {
            "theme" => Some(KnownKey::Theme),
            "content" => Some(KnownKey::Content),
            "safelist" => Some(KnownKey::Safelist),
            "plugins" => Some(KnownKey::Plugins),
            "separator" => Some(KnownKey::Separator),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KnownKey::Theme => "theme",
            KnownKey::Content => "content",
            KnownKey::Safelist => "safelist",
            KnownKey::Plugins => "plugins",
            KnownKey::Separator => "separator",
        }
    }
}

/// One top-level entry of a record.
#[derive(Debug, Clone)]
pub enum ConfigEntry {
    Known(KnownKey, ConfigValue),
    /// A key kept verbatim for the style generator (`variants`, `darkMode`, ...).
    Passthrough(String, ConfigValue),
}

/// A per-extension extraction pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorSpec {
    pub extensions: Vec<String>,
    pub pattern: String,
}

/// Normalized purge settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeOptions {
    pub enabled: bool,
    pub content: Vec<String>,
    pub safelist: Vec<String>,
    pub extractors: Vec<ExtractorSpec>,
    /// Replaces the built-in grammar for every extension without its own pattern.
    pub default_extractor: Option<String>,
}

/// A normalized configuration record.
#[derive(Debug, Clone)]
pub struct ConfigRecord {
    pub entries: Vec<ConfigEntry>,
    /// `theme.<category>` entries, each replacing a base category.
    pub theme: ConfigValue,
    /// `theme.extend.<category>` entries, each merged into a category.
    pub extend: ConfigValue,
    pub purge: PurgeOptions,
    pub plugins: Vec<PluginRef>,
    pub separator: String,
}

impl ConfigRecord {
    /// Normalize a parsed document.
    ///
    /// Informational and warning diagnostics are appended to `diagnostics`.
    /// Shape errors are all collected before failing with
    /// [`SieveError::ConfigParse`].
    pub fn from_value(raw: &ConfigValue, diagnostics: &mut Vec<DiagnosticMessage>) -> Result<Self> {
        let mut normalizer = Normalizer::new(diagnostics);
        let record = normalizer.record(raw);

        if normalizer.failed {
            return Err(SieveError::config_parse(normalizer.diagnostics.clone()));
        }
        Ok(record)
    }

    /// Entries not interpreted by the resolver, in document order.
    pub fn passthrough(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().filter_map(|entry| match entry {
            ConfigEntry::Passthrough(key, value) => Some((key.as_str(), value)),
            ConfigEntry::Known(..) => None,
        })
    }
}

struct Normalizer<'d> {
    diagnostics: &'d mut Vec<DiagnosticMessage>,
    failed: bool,
    enabled: Option<bool>,
    content_present: bool,
    content: IndexSet<String>,
    safelist: IndexSet<String>,
    extractors: Vec<ExtractorSpec>,
    default_extractor: Option<String>,
}

impl<'d> Normalizer<'d> {
    fn new(diagnostics: &'d mut Vec<DiagnosticMessage>) -> Self {
        Self {
            diagnostics,
            failed: false,
            enabled: None,
            content_present: false,
            content: IndexSet::new(),
            safelist: IndexSet::new(),
            extractors: Vec::new(),
            default_extractor: None,
        }
    }

    fn record(&mut self, raw: &ConfigValue) -> ConfigRecord {
        let mut record = ConfigRecord {
            entries: Vec::new(),
            theme: ConfigValue::empty_map(),
            extend: ConfigValue::empty_map(),
            purge: PurgeOptions::default(),
            plugins: Vec::new(),
            separator: DEFAULT_SEPARATOR.to_string(),
        };

        let Some(entries) = raw.as_map() else {
            self.shape_error("configuration", "a map of settings", raw);
            return record;
        };

        for (key, value) in entries {
            let Some(known) = KnownKey::from_key(key) else {
                debug!(key = %key, "passing through unrecognized configuration key");
                record.entries.push(ConfigEntry::Passthrough(key.clone(), value.clone()));
                continue;
            };

            if known.as_str() != key {
                self.deprecated(key, known.as_str(), value);
            }
            record.entries.push(ConfigEntry::Known(known, value.clone()));

            if value.is_null() {
                continue;
            }

            match known {
                KnownKey::Theme => {
                    let (theme, extend) = self.theme(value);
                    record.theme = theme;
                    record.extend = extend;
                }
                KnownKey::Content => self.content_section(key, value),
                KnownKey::Safelist => self.add_safelist(key, value),
                KnownKey::Plugins => record.plugins = self.plugins(value),
                KnownKey::Separator => match value.as_str() {
                    Some(separator) if !separator.is_empty() => record.separator = separator.to_string(),
                    _ => self.shape_error("separator", "a non-empty string", value),
                },
            }
        }

        record.purge = PurgeOptions {
            enabled: self.enabled.unwrap_or(self.content_present),
            content: self.content.iter().cloned().collect(),
            safelist: self.safelist.iter().cloned().collect(),
            extractors: std::mem::take(&mut self.extractors),
            default_extractor: self.default_extractor.take(),
        };
        record
    }

    /// Split `theme` into replacement categories and `extend`.
    fn theme(&mut self, value: &ConfigValue) -> (ConfigValue, ConfigValue) {
        let Some(entries) = value.as_map() else {
            self.shape_error("theme", "a map of theme categories", value);
            return (ConfigValue::empty_map(), ConfigValue::empty_map());
        };

        let mut replacements = IndexMap::new();
        let mut extend = ConfigValue::empty_map();

        for (category, tokens) in entries {
            if category == "extend" {
                if tokens.is_map() {
                    extend = tokens.clone();
                } else if !tokens.is_null() {
                    self.shape_error("theme.extend", "a map of theme categories", tokens);
                }
            } else {
                replacements.insert(category.clone(), tokens.clone());
            }
        }

        let theme = ConfigValue::new_map(replacements).with_location(value.location.clone());
        (theme, extend)
    }

    /// `purge` or `content`, in any of their accepted shapes.
    fn content_section(&mut self, key: &str, value: &ConfigValue) {
        self.content_present = true;

        match &value.value {
            ConfigValueKind::Scalar(Yaml::Boolean(enabled)) => self.set_enabled(*enabled),
            ConfigValueKind::Array(_) => {
                let globs = self.string_list(key, value);
                self.content.extend(globs);
            }
            ConfigValueKind::Map(entries) => {
                for (field, item) in entries {
                    let path = format!("{}.{}", key, field);
                    match field.as_str() {
                        "enabled" => match item.as_bool() {
                            Some(enabled) => self.set_enabled(enabled),
                            None => self.shape_error(&path, "true or false", item),
                        },
                        "content" | "files" => {
                            let globs = self.string_list(&path, item);
                            self.content.extend(globs);
                        }
                        "mode" => self.mode(&path, item),
                        "safelist" | "whitelist" => self.add_safelist(&path, item),
                        "options" => self.purge_options(&path, item),
                        _ => debug!(key = %path, "ignoring unsupported purge setting"),
                    }
                }
            }
            _ => self.shape_error(key, "a boolean, a list of globs, or a map", value),
        }
    }

    fn purge_options(&mut self, path: &str, value: &ConfigValue) {
        let Some(entries) = value.as_map() else {
            self.shape_error(path, "a map", value);
            return;
        };

        for (field, item) in entries {
            let item_path = format!("{}.{}", path, field);
            match field.as_str() {
                "safelist" | "whitelist" => self.add_safelist(&item_path, item),
                "extractors" => self.extractors(&item_path, item),
                "defaultExtractor" => match item.as_str() {
                    Some(pattern) => self.default_extractor = Some(pattern.to_string()),
                    None => self.shape_error(&item_path, "a regular expression string", item),
                },
                _ => debug!(key = %item_path, "ignoring unsupported purge option"),
            }
        }
    }

    fn extractors(&mut self, path: &str, value: &ConfigValue) {
        let Some(items) = value.as_array() else {
            self.shape_error(path, "a list of `{ extensions, pattern }` maps", value);
            return;
        };

        for (index, item) in items.iter().enumerate() {
            let item_path = format!("{}[{}]", path, index);
            let pattern = item
                .get("pattern")
                .or_else(|| item.get("extractor"))
                .and_then(ConfigValue::as_str);
            let extensions = item.get("extensions");

            match (pattern, extensions) {
                (Some(pattern), Some(extensions)) => {
                    let extensions = self.string_list(&format!("{}.extensions", item_path), extensions);
                    self.extractors.push(ExtractorSpec {
                        extensions,
                        pattern: pattern.to_string(),
                    });
                }
                _ => self.shape_error(&item_path, "a map with `extensions` and `pattern`", item),
            }
        }
    }

    fn mode(&mut self, path: &str, value: &ConfigValue) {
        match value.as_str() {
            Some("all") => {}
            Some(mode) => {
                let mut builder = DiagnosticMessageBuilder::warning("Unsupported purge mode")
                    .with_code("S-1-31")
                    .problem(format!("`{}: {}` is not supported; every document is scanned", path, mode))
                    .add_hint(format!("Remove `{}` or set it to `all`?", path));
                if value.location.is_known() {
                    builder = builder.with_location(value.location.to_string());
                }
                self.diagnostics.push(builder.build());
            }
            None => self.shape_error(path, "a string", value),
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        // An explicit `false` anywhere wins.
        self.enabled = Some(self.enabled.unwrap_or(true) && enabled);
    }

    fn add_safelist(&mut self, path: &str, value: &ConfigValue) {
        let leaf = path.rsplit('.').next().unwrap_or(path);
        if leaf == "whitelist" && path != "whitelist" {
            self.deprecated(path, &format!("{}safelist", &path[..path.len() - leaf.len()]), value);
        }
        let names = self.string_list(path, value);
        self.safelist.extend(names);
    }

    fn plugins(&mut self, value: &ConfigValue) -> Vec<PluginRef> {
        let Some(items) = value.as_array() else {
            self.shape_error("plugins", "a list of plugin names", value);
            return Vec::new();
        };

        let mut plugins = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let path = format!("plugins[{}]", index);
            if let Some(text) = item.as_str() {
                match plugin_name(text) {
                    Some(name) => plugins.push(PluginRef::new(name)),
                    None => self.shape_error(&path, "a plugin name", item),
                }
                continue;
            }

            match item.get("name").and_then(ConfigValue::as_str).and_then(plugin_name) {
                Some(name) => {
                    let mut plugin = PluginRef::new(name);
                    if let Some(options) = item.get("options").filter(|o| !o.is_null()) {
                        plugin = plugin.with_options(options.clone());
                    }
                    plugins.push(plugin);
                }
                None => self.shape_error(&path, "a plugin name or a `{ name, options }` map", item),
            }
        }
        plugins
    }

    fn string_list(&mut self, path: &str, value: &ConfigValue) -> Vec<String> {
        let strings = value
            .as_array()
            .and_then(|items| items.iter().map(ConfigValue::scalar_to_string).collect::<Option<Vec<_>>>());

        match strings {
            Some(strings) => strings,
            None => {
                self.shape_error(path, "a list of strings", value);
                Vec::new()
            }
        }
    }

    fn deprecated(&mut self, legacy: &str, modern: &str, value: &ConfigValue) {
        let mut builder = DiagnosticMessageBuilder::info("Deprecated configuration key")
            .with_code("S-1-30")
            .problem(format!("`{}` is a legacy spelling of `{}`", legacy, modern))
            .add_hint(format!("Rename `{}` to `{}`?", legacy, modern));
        if value.location.is_known() {
            builder = builder.with_location(value.location.to_string());
        }
        self.diagnostics.push(builder.build());
    }

    fn shape_error(&mut self, path: &str, expected: &str, value: &ConfigValue) {
        let mut builder = DiagnosticMessageBuilder::error(format!("Invalid `{}`", path))
            .with_code("S-1-2")
            .problem(format!("`{}` must be {}", path, expected))
            .add_detail(format!("found {}", describe(value)));
        if value.location.is_known() {
            builder = builder.with_location(value.location.to_string());
        }
        self.diagnostics.push(builder.build());
        self.failed = true;
    }
}

/// Plugin name from `name` or `require('name')`.
fn plugin_name(text: &str) -> Option<String> {
    let text = text.trim();
    let name = text
        .strip_prefix("require(")
        .and_then(|rest| rest.strip_suffix(')'))
        .map_or(text, |quoted| quoted.trim().trim_matches(|c| c == '\'' || c == '"'));

    (!name.is_empty()).then(|| name.to_string())
}

fn describe(value: &ConfigValue) -> String {
    match &value.value {
        ConfigValueKind::Scalar(Yaml::String(s)) => format!("the string `{}`", s),
        ConfigValueKind::Scalar(Yaml::Integer(_) | Yaml::Real(_)) => "a number".to_string(),
        ConfigValueKind::Scalar(Yaml::Boolean(_)) => "a boolean".to_string(),
        ConfigValueKind::Scalar(_) => "null".to_string(),
        ConfigValueKind::Array(_) => "a list".to_string(),
        ConfigValueKind::Map(_) => "a map".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_config::parse;

    fn normalize(content: &str) -> (ConfigRecord, Vec<DiagnosticMessage>) {
        let mut diagnostics = Vec::new();
        let raw = parse(content, &mut diagnostics).unwrap();
        let record = ConfigRecord::from_value(&raw, &mut diagnostics).unwrap();
        (record, diagnostics)
    }

    fn normalize_err(content: &str) -> Vec<DiagnosticMessage> {
        let mut diagnostics = Vec::new();
        let raw = parse(content, &mut diagnostics).unwrap();
        match ConfigRecord::from_value(&raw, &mut diagnostics) {
            Err(SieveError::ConfigParse { diagnostics, .. }) => diagnostics,
            other => panic!("expected ConfigParse, got {:?}", other),
        }
    }

    #[test]
    fn test_alias_table() {
        assert_eq!(canonical_key("whitelist"), "safelist");
        assert_eq!(canonical_key("purge"), "content");
        assert_eq!(canonical_key("theme"), "theme");
        assert_eq!(KnownKey::from_key("whitelist"), Some(KnownKey::Safelist));
        assert_eq!(KnownKey::from_key("variants"), None);
    }

    #[test]
    fn test_absent_purge_is_disabled() {
        let (record, diagnostics) = normalize("theme: { extend: {} }");
        assert!(!record.purge.enabled);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_purge_list() {
        let (record, _) = normalize("purge: ['./layouts/**/*.html']");
        assert!(record.purge.enabled);
        assert_eq!(record.purge.content, vec!["./layouts/**/*.html"]);
    }

    #[test]
    fn test_purge_false() {
        let (record, _) = normalize("purge: false\ncontent: ['./a/*.html']");
        assert!(!record.purge.enabled);
        assert_eq!(record.purge.content, vec!["./a/*.html"]);
    }

    #[test]
    fn test_purge_block_with_options() {
        let (record, diagnostics) = normalize(
            r#"
purge:
  content: ['./layouts/**/*.html']
  options:
    safelist: [pagination, page-item, page-link, disabled, active]
    extractors:
      - extensions: [md]
        pattern: 'class="([^"]+)"'
"#,
        );

        assert!(record.purge.enabled);
        assert_eq!(record.purge.safelist.len(), 5);
        assert_eq!(
            record.purge.extractors,
            vec![ExtractorSpec {
                extensions: vec!["md".into()],
                pattern: r#"class="([^"]+)""#.into()
            }]
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code.as_deref(), Some("S-1-30"));
    }

    #[test]
    fn test_content_files_and_enabled_false() {
        let (record, _) = normalize("content: { files: ['src/*.html'], enabled: false }");
        assert!(!record.purge.enabled);
        assert_eq!(record.purge.content, vec!["src/*.html"]);
    }

    #[test]
    fn test_both_spellings_union() {
        let (record, diagnostics) = normalize(
            "safelist: [active, pagination]\nwhitelist: [pagination, disabled]\ncontent: [a.html]\npurge: [b.html, a.html]",
        );

        assert_eq!(record.purge.safelist, vec!["active", "pagination", "disabled"]);
        assert_eq!(record.purge.content, vec!["a.html", "b.html"]);
        let deprecations: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.code.as_deref() == Some("S-1-30"))
            .collect();
        assert_eq!(deprecations.len(), 2);
        assert!(deprecations.iter().all(|d| !d.is_error()));
    }

    #[test]
    fn test_nested_whitelist_deprecated() {
        let (record, diagnostics) = normalize("content: { files: [], options: { whitelist: [active] } }");
        assert_eq!(record.purge.safelist, vec!["active"]);
        assert!(diagnostics[0].to_text().contains("`content.options.safelist`"));
    }

    #[test]
    fn test_unsupported_mode_warns() {
        let (record, diagnostics) = normalize("purge: { mode: layers, content: [a.html] }");
        assert!(record.purge.enabled);
        let mode = diagnostics
            .iter()
            .find(|d| d.code.as_deref() == Some("S-1-31"))
            .unwrap();
        assert!(!mode.is_error());
    }

    #[test]
    fn test_theme_split() {
        let (record, _) = normalize("theme:\n  maxWidth: { prose: 72ch }\n  extend:\n    maxWidth: { '1/2': '50%' }");

        assert!(record.theme.get("maxWidth").is_some());
        assert!(record.theme.get("extend").is_none());
        assert_eq!(
            record.extend.get_path(&["maxWidth", "1/2"]).and_then(ConfigValue::as_str),
            Some("50%")
        );
    }

    #[test]
    fn test_plugin_reference_forms() {
        let (record, _) = normalize(
            r#"
plugins:
  - "require('@tailwindcss/typography')"
  - '@tailwindcss/forms'
  - { name: '@tailwindcss/line-clamp', options: { lines: 3 } }
"#,
        );

        let names: Vec<_> = record.plugins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["@tailwindcss/typography", "@tailwindcss/forms", "@tailwindcss/line-clamp"]
        );
        assert!(record.plugins[2].options.is_some());
    }

    #[test]
    fn test_passthrough_preserved() {
        let (record, _) = normalize("darkMode: media\nvariants: { extend: { opacity: [disabled] } }\nimportant: true");

        let keys: Vec<_> = record.passthrough().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["darkMode", "variants", "important"]);
    }

    #[test]
    fn test_separator() {
        let (record, _) = normalize("separator: '_'");
        assert_eq!(record.separator, "_");

        let (record, _) = normalize("{}");
        assert_eq!(record.separator, ":");
    }

    #[test]
    fn test_shape_errors_collected() {
        let diagnostics = normalize_err("content: 42\nplugins: typography\nseparator: ''");

        let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|d| d.code.as_deref() == Some("S-1-2")));
    }

    #[test]
    fn test_shape_error_rendering() {
        let diagnostics = normalize_err("purge:\n  content: './layouts/**/*.html'");
        let shape = diagnostics.iter().find(|d| d.is_error()).unwrap();

        insta::assert_snapshot!(shape.to_text(), @r"
        Error [S-1-2]: Invalid `purge.content`
          --> 2:12
        `purge.content` must be a list of strings
        ✖ found the string `./layouts/**/*.html`
        ");
    }

    #[test]
    fn test_root_must_be_map() {
        let diagnostics = normalize_err("- a\n- b");
        assert_eq!(diagnostics.len(), 1);
    }
}
