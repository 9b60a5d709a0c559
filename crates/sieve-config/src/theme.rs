//! Theme merging.
//!
//! A theme is a map from category (`maxWidth`, `typography`, `colors`, ...)
//! to a token map. `merge_theme` layers override fragments onto a base theme
//! in declaration order and materializes the result once.

use crate::materialize::MaterializeOptions;
use crate::merged::MergedConfig;
use crate::types::{ConfigError, ConfigValue};
use tracing::{debug, warn};

/// The fully merged theme. Read-only after construction.
#[derive(Debug, Clone)]
pub struct MergedTheme {
    root: ConfigValue,
}

/// Merge `overrides` onto `base`, later overrides winning.
///
/// Maps merge field-wise while scalars and arrays replace. An array tagged
/// `!concat` appends to the one below it, and a value tagged `!prefer`
/// replaces what lies below it. A layer whose root is not
/// a map contributes nothing.
///
/// The only failure is a merged tree deeper than `options.max_depth`.
pub fn merge_theme(
    base: &ConfigValue,
    overrides: &[ConfigValue],
    options: &MaterializeOptions,
) -> Result<MergedTheme, ConfigError> {
    let mut layers = Vec::with_capacity(overrides.len() + 1);

    for (index, layer) in std::iter::once(base).chain(overrides).enumerate() {
        match layer.as_map() {
            Some(categories) => {
                debug!(layer = index, categories = categories.len(), "merging theme layer");
                layers.push(layer);
            }
            None => {
                warn!(layer = index, location = %layer.location, "ignoring theme layer that is not a map");
            }
        }
    }

    let root = MergedConfig::new(layers).materialize_with_options(options)?;
    Ok(MergedTheme { root })
}

impl MergedTheme {
    /// Category names in first-declared order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.root
            .as_map()
            .into_iter()
            .flat_map(|map| map.keys().map(String::as_str))
    }

    pub fn category(&self, name: &str) -> Option<&ConfigValue> {
        self.root.get(name)
    }

    pub fn token(&self, category: &str, token: &str) -> Option<&ConfigValue> {
        self.category(category)?.get(token)
    }

    /// Token value rendered as a string, when it is a string scalar.
    pub fn token_str(&self, category: &str, token: &str) -> Option<&str> {
        self.token(category, token)?.as_str()
    }

    pub fn get_path(&self, path: &[&str]) -> Option<&ConfigValue> {
        self.root.get_path(path)
    }

    pub fn as_value(&self) -> &ConfigValue {
        &self.root
    }

    pub fn into_value(self) -> ConfigValue {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.as_map().is_none_or(|map| map.is_empty())
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.root.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::types::MergeOp;

    fn load(content: &str) -> ConfigValue {
        parse(content, &mut Vec::new()).unwrap()
    }

    fn merge(base: &ConfigValue, overrides: &[ConfigValue]) -> MergedTheme {
        merge_theme(base, overrides, &MaterializeOptions::default()).unwrap()
    }

    #[test]
    fn test_extend_adds_tokens() {
        let base = load("maxWidth: { xs: 20rem, prose: 65ch }");
        let extend = load("maxWidth: { '1/2': '50%', '1/3': '33%' }");

        let theme = merge(&base, &[extend]);
        let keys: Vec<_> = theme
            .category("maxWidth")
            .unwrap()
            .as_map()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["xs", "prose", "1/2", "1/3"]);
    }

    #[test]
    fn test_later_override_wins() {
        let base = load("maxWidth: { prose: 65ch }");
        let first = load("maxWidth: { prose: 70ch }");
        let second = load("maxWidth: { prose: 72ch }");

        let theme = merge(&base, &[first, second]);
        assert_eq!(theme.token_str("maxWidth", "prose"), Some("72ch"));
    }

    #[test]
    fn test_empty_string_replaces() {
        let base = load(r#"typography: { DEFAULT: { css: { 'code::before': '"`"' } } }"#);
        let extend = load("typography: { DEFAULT: { css: { 'code::before': '' } } }");

        let theme = merge(&base, &[extend]);
        assert_eq!(
            theme
                .get_path(&["typography", "DEFAULT", "css", "code::before"])
                .and_then(ConfigValue::as_str),
            Some("")
        );
    }

    #[test]
    fn test_unknown_category_added() {
        let base = load("maxWidth: { xs: 20rem }");
        let extend = load("typography: { DEFAULT: { css: { color: '#333' } } }");

        let theme = merge(&base, &[extend]);
        let categories: Vec<_> = theme.categories().collect();
        assert_eq!(categories, vec!["maxWidth", "typography"]);
    }

    #[test]
    fn test_non_map_layer_ignored() {
        let base = load("maxWidth: { xs: 20rem }");
        let theme = merge(&base, &[ConfigValue::new_string("oops")]);
        assert_eq!(theme.token_str("maxWidth", "xs"), Some("20rem"));
    }

    #[test]
    fn test_empty_inputs() {
        let theme = merge(&ConfigValue::empty_map(), &[]);
        assert!(theme.is_empty());
        assert_eq!(theme.to_json(), serde_json::json!({}));
    }

    #[test]
    fn test_array_token_replaced() {
        let base = load("fontFamily: { sans: [ui-sans-serif, system-ui], mono: [Menlo] }");
        let extend = load("fontFamily: { sans: [Inter] }");

        let theme = merge(&base, &[extend]);
        assert_eq!(
            theme.category("fontFamily").unwrap().to_json(),
            serde_json::json!({"sans": ["Inter"], "mono": ["Menlo"]})
        );
    }

    #[test]
    fn test_result_has_no_prefer_tags() {
        let base = load("maxWidth: { xs: 20rem }");
        let replace = load("maxWidth: !prefer { sm: 24rem }");

        let theme = merge(&base, &[replace]);
        assert_eq!(theme.category("maxWidth").unwrap().merge_op, MergeOp::Merge);
        assert!(theme.token("maxWidth", "xs").is_none());
    }
}
