//! Plugin registry.
//!
//! Plugins are looked up in an explicit [`PluginRegistry`] handed to the
//! resolver; there is no process-wide registration.

use crate::error::{Result, SieveError};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use sieve_config::{ConfigValue, parse_file};
use tracing::debug;

/// A plugin as referenced from a configuration record.
#[derive(Debug, Clone)]
pub struct PluginRef {
    pub name: String,
    /// Options passed alongside the name (`{ name, options }` form).
    pub options: Option<ConfigValue>,
}

impl PluginRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: ConfigValue) -> Self {
        self.options = Some(options);
        self
    }
}

/// What a registered plugin contributes.
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    pub name: String,
    /// Theme categories merged in before the user's theme.
    pub theme: Option<ConfigValue>,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            theme: None,
        }
    }

    pub fn with_theme(mut self, theme: ConfigValue) -> Self {
        self.theme = Some(theme);
        self
    }
}

static BUILTIN_PLUGINS: Lazy<Vec<PluginDescriptor>> = Lazy::new(|| {
    let with_theme = |name: &str, file: &str, source: &str| {
        let theme = parse_file(source, file, &mut Vec::new())
            .unwrap_or_else(|err| panic!("built-in theme {} is invalid: {}", file, err));
        PluginDescriptor::new(name).with_theme(theme)
    };

    vec![
        with_theme(
            "@tailwindcss/typography",
            "plugins/typography.yml",
            include_str!("../resources/plugins/typography.yml"),
        ),
        PluginDescriptor::new("@tailwindcss/forms"),
        with_theme(
            "@tailwindcss/aspect-ratio",
            "plugins/aspect-ratio.yml",
            include_str!("../resources/plugins/aspect-ratio.yml"),
        ),
        with_theme(
            "@tailwindcss/line-clamp",
            "plugins/line-clamp.yml",
            include_str!("../resources/plugins/line-clamp.yml"),
        ),
    ]
});

/// Name-indexed plugin lookup table.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: IndexMap<String, PluginDescriptor>,
}

impl PluginRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the official plugins.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for plugin in BUILTIN_PLUGINS.iter() {
            registry.register(plugin.clone());
        }
        registry
    }

    /// Register a plugin, returning any descriptor it replaced.
    pub fn register(&mut self, plugin: PluginDescriptor) -> Option<PluginDescriptor> {
        debug!(plugin = %plugin.name, "registering plugin");
        self.plugins.insert(plugin.name.clone(), plugin)
    }

    pub fn get(&self, name: &str) -> Option<&PluginDescriptor> {
        self.plugins.get(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Look up a reference, failing with the list of known names.
    pub fn resolve(&self, plugin: &PluginRef) -> Result<&PluginDescriptor> {
        self.get(&plugin.name).ok_or_else(|| SieveError::PluginResolution {
            name: plugin.name.clone(),
            available: self.names().map(str::to_string).collect(),
        })
    }
}
