//! Cursor-based merged configuration navigation.
//!
//! `MergedConfig` borrows an ordered list of layers and resolves values on
//! demand. Nothing is copied until a caller materializes the result.
//!
//! # Resolution rules
//!
//! Walking the layers from lowest to highest priority at a given path:
//!
//! - a map tagged `!prefer` discards everything lower layers held at that path
//! - a value of a different kind than the one below it also discards it
//! - maps merge key by key, scalars take the last value
//! - an array replaces the one below it unless it is tagged `!concat`
//!
//! Discarded layers stay invisible to every descendant path, so replacing
//! `typography` also hides `typography.DEFAULT.css` from the layers below.
//!
//! # Example
//!
//! ```
//! use sieve_config::{MergedConfig, parse};
//!
//! let mut diagnostics = Vec::new();
//! let base = parse("maxWidth: { xs: 20rem, sm: 24rem }", &mut diagnostics).unwrap();
//! let extend = parse("maxWidth: { '1/2': '50%' }", &mut diagnostics).unwrap();
//!
//! let merged = MergedConfig::new(vec![&base, &extend]);
//! let keys = merged.cursor().at("maxWidth").keys();
//! assert_eq!(keys, vec!["xs", "sm", "1/2"]);
//! ```

use crate::types::{ConfigValue, ConfigValueKind, MergeOp};
use indexmap::IndexSet;

/// A lazily-evaluated merged configuration.
///
/// Layers are borrowed; the first is the lowest priority.
#[derive(Debug, Clone)]
pub struct MergedConfig<'a> {
    layers: Vec<&'a ConfigValue>,
}

/// A cursor for navigating merged configuration.
///
/// The cursor stores a path plus the lowest layer still visible at that
/// path. Resolution happens when one of the `as_*()` methods is called.
#[derive(Debug, Clone)]
pub struct MergedCursor<'a> {
    config: &'a MergedConfig<'a>,
    path: Vec<String>,
    floor: usize,
}

/// A resolved scalar value with its source.
#[derive(Debug, Clone)]
pub struct MergedScalar<'a> {
    pub value: &'a ConfigValue,
    /// Which layer this value came from (index into layers)
    pub layer_index: usize,
}

/// An item in a resolved array.
#[derive(Debug, Clone)]
pub struct MergedArrayItem<'a> {
    pub value: &'a ConfigValue,
    pub layer_index: usize,
}

/// A resolved array with merge semantics applied.
#[derive(Debug, Clone)]
pub struct MergedArray<'a> {
    pub items: Vec<MergedArrayItem<'a>>,
}

/// A resolved map with merge semantics applied.
///
/// The map is virtual: it knows its merged key set and hands out cursors
/// for the values.
#[derive(Debug, Clone)]
pub struct MergedMap<'a> {
    config: &'a MergedConfig<'a>,
    path: Vec<String>,
    floor: usize,
    keys: Vec<String>,
}

/// A resolved value of any type.
#[derive(Debug, Clone)]
pub enum MergedValue<'a> {
    Scalar(MergedScalar<'a>),
    Array(MergedArray<'a>),
    Map(MergedMap<'a>),
}

impl<'a> MergedConfig<'a> {
    /// Create a merged config from multiple layers.
    ///
    /// Layers are ordered by priority: first = lowest priority, last = highest.
    pub fn new(layers: Vec<&'a ConfigValue>) -> Self {
        MergedConfig { layers }
    }

    pub fn empty() -> Self {
        MergedConfig { layers: Vec::new() }
    }

    /// Add a new highest-priority layer (returns a new MergedConfig).
    pub fn with_layer(&self, layer: &'a ConfigValue) -> MergedConfig<'a> {
        let mut layers = self.layers.clone();
        layers.push(layer);
        MergedConfig { layers }
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Get a cursor at the root.
    pub fn cursor(&'a self) -> MergedCursor<'a> {
        MergedCursor {
            config: self,
            path: Vec::new(),
            floor: 0,
        }
    }

    pub fn get_scalar(&'a self, path: &[&str]) -> Option<MergedScalar<'a>> {
        self.cursor().at_path(path).as_scalar()
    }

    pub fn get_array(&'a self, path: &[&str]) -> Option<MergedArray<'a>> {
        self.cursor().at_path(path).as_array()
    }

    pub fn get_map(&'a self, path: &[&str]) -> Option<MergedMap<'a>> {
        self.cursor().at_path(path).as_map()
    }

    /// Check if a path resolves to anything.
    pub fn contains(&'a self, path: &[&str]) -> bool {
        self.cursor().at_path(path).exists()
    }
}

impl<'a> MergedCursor<'a> {
    /// Navigate to a child key.
    ///
    /// The cursor is valid even if the path doesn't exist; resolving it
    /// yields `None`.
    pub fn at(&self, key: &str) -> MergedCursor<'a> {
        let mut path = self.path.clone();
        path.push(key.to_string());
        MergedCursor {
            config: self.config,
            path,
            floor: self.reset_layer(),
        }
    }

    /// Navigate to a path (multiple keys at once).
    pub fn at_path(&self, path: &[&str]) -> MergedCursor<'a> {
        path.iter()
            .fold(self.clone(), |cursor, key| cursor.at(key))
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Check if any visible layer has a value at this path.
    pub fn exists(&self) -> bool {
        self.values().next().is_some()
    }

    /// Child keys at this path, in first-seen order across the visible layers.
    pub fn keys(&self) -> Vec<String> {
        let start = self.reset_layer();
        let mut keys = IndexSet::new();

        for (_, value) in self.values().filter(|(idx, _)| *idx >= start) {
            if let ConfigValueKind::Map(map) = &value.value {
                keys.extend(map.keys().cloned());
            }
        }

        keys.into_iter().collect()
    }

    /// Resolve as any value type.
    ///
    /// The kind is decided by the highest-priority layer holding the path.
    pub fn as_value(&self) -> Option<MergedValue<'a>> {
        let (layer_index, value) = self.top()?;
        match &value.value {
            ConfigValueKind::Scalar(_) => Some(MergedValue::Scalar(MergedScalar { value, layer_index })),
            ConfigValueKind::Array(_) => self.as_array().map(MergedValue::Array),
            ConfigValueKind::Map(_) => self.as_map().map(MergedValue::Map),
        }
    }

    /// Resolve as scalar (last-wins semantics).
    pub fn as_scalar(&self) -> Option<MergedScalar<'a>> {
        match self.top()? {
            (layer_index, value) if value.is_scalar() => Some(MergedScalar { value, layer_index }),
            _ => None,
        }
    }

    /// Resolve as array.
    ///
    /// - `!concat`: appends to previous items
    /// - otherwise: replaces previous items
    pub fn as_array(&self) -> Option<MergedArray<'a>> {
        if !self.top()?.1.is_array() {
            return None;
        }

        let mut items = Vec::new();
        for (layer_index, value) in self.values() {
            match &value.value {
                ConfigValueKind::Array(arr) => {
                    if value.merge_op != MergeOp::Concat {
                        items.clear();
                    }
                    items.extend(arr.iter().map(|value| MergedArrayItem { value, layer_index }));
                }
                _ => items.clear(),
            }
        }

        Some(MergedArray { items })
    }

    /// Resolve as map.
    ///
    /// - `!prefer`: replaces the entire map (no field-wise merge)
    /// - otherwise: field-wise merge with previous maps
    pub fn as_map(&self) -> Option<MergedMap<'a>> {
        if !self.top()?.1.is_map() {
            return None;
        }

        Some(MergedMap {
            config: self.config,
            path: self.path.clone(),
            floor: self.reset_layer(),
            keys: self.keys(),
        })
    }

    /// Visible layers holding a value at this path, lowest priority first.
    fn values(&self) -> impl Iterator<Item = (usize, &'a ConfigValue)> + '_ {
        self.config
            .layers
            .iter()
            .enumerate()
            .skip(self.floor)
            .filter_map(|(idx, layer)| self.navigate_to(*layer).map(|value| (idx, value)))
    }

    fn top(&self) -> Option<(usize, &'a ConfigValue)> {
        self.values().last()
    }

    /// The lowest layer whose value at this path still contributes.
    fn reset_layer(&self) -> usize {
        self.values()
            .filter(|(_, value)| !value.is_map() || value.merge_op == MergeOp::Prefer)
            .map(|(idx, _)| idx)
            .last()
            .unwrap_or(self.floor)
    }

    /// Navigate to a path within a single layer.
    fn navigate_to(&self, root: &'a ConfigValue) -> Option<&'a ConfigValue> {
        self.path.iter().try_fold(root, |current, key| current.get(key))
    }
}

impl<'a> MergedMap<'a> {
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Get a cursor for a specific key.
    pub fn get(&self, key: &str) -> Option<MergedCursor<'a>> {
        self.contains_key(key).then(|| self.child(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Iterate over (key, cursor) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, MergedCursor<'a>)> {
        self.keys.iter().map(move |key| (key.as_str(), self.child(key)))
    }

    fn child(&self, key: &str) -> MergedCursor<'a> {
        let mut path = self.path.clone();
        path.push(key.to_string());
        MergedCursor {
            config: self.config,
            path,
            floor: self.floor,
        }
    }
}

impl<'a> MergedArray<'a> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MergedArrayItem<'a>> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MergedArrayItem<'a>> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use yaml_rust2::Yaml;

    fn scalar(s: &str) -> ConfigValue {
        ConfigValue::new_string(s)
    }

    fn array(items: Vec<ConfigValue>) -> ConfigValue {
        ConfigValue::new_array(items)
    }

    fn map(entries: Vec<(&str, ConfigValue)>) -> ConfigValue {
        let map: IndexMap<String, ConfigValue> = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        ConfigValue::new_map(map)
    }

    fn map_prefer(entries: Vec<(&str, ConfigValue)>) -> ConfigValue {
        map(entries).with_merge_op(MergeOp::Prefer)
    }

    fn array_prefer(items: Vec<ConfigValue>) -> ConfigValue {
        array(items).with_merge_op(MergeOp::Prefer)
    }

    fn scalar_at<'a>(merged: &'a MergedConfig<'a>, path: &[&str]) -> Option<&'a str> {
        merged.get_scalar(path).and_then(|s| s.value.as_str())
    }

    #[test]
    fn test_empty_config() {
        let merged = MergedConfig::empty();
        assert_eq!(merged.layer_count(), 0);
        assert!(!merged.contains(&["maxWidth"]));
    }

    #[test]
    fn test_scalar_override() {
        let layer1 = map(vec![("prose", scalar("65ch"))]);
        let layer2 = map(vec![("prose", scalar("72ch"))]);
        let merged = MergedConfig::new(vec![&layer1, &layer2]);

        let result = merged.get_scalar(&["prose"]).unwrap();
        assert_eq!(result.value.as_str(), Some("72ch"));
        assert_eq!(result.layer_index, 1);
    }

    #[test]
    fn test_cursor_chaining() {
        let config = map(vec![(
            "typography",
            map(vec![("DEFAULT", map(vec![("color", scalar("#333"))]))]),
        )]);
        let merged = MergedConfig::new(vec![&config]);

        let cursor = merged.cursor().at("typography").at("DEFAULT").at("color");
        assert_eq!(cursor.path(), &["typography", "DEFAULT", "color"]);
        assert_eq!(cursor.as_scalar().unwrap().value.as_str(), Some("#333"));
    }

    #[test]
    fn test_map_field_wise_merge() {
        let layer1 = map(vec![(
            "maxWidth",
            map(vec![("xs", scalar("20rem")), ("sm", scalar("24rem"))]),
        )]);
        let layer2 = map(vec![(
            "maxWidth",
            map(vec![("sm", scalar("25rem")), ("1/2", scalar("50%"))]),
        )]);
        let merged = MergedConfig::new(vec![&layer1, &layer2]);

        let map = merged.get_map(&["maxWidth"]).unwrap();
        assert_eq!(map.keys(), &["xs", "sm", "1/2"]);
        assert_eq!(scalar_at(&merged, &["maxWidth", "xs"]), Some("20rem"));
        assert_eq!(scalar_at(&merged, &["maxWidth", "sm"]), Some("25rem"));
        assert_eq!(scalar_at(&merged, &["maxWidth", "1/2"]), Some("50%"));
    }

    #[test]
    fn test_map_prefer_replaces() {
        let layer1 = map(vec![(
            "maxWidth",
            map(vec![("xs", scalar("20rem")), ("sm", scalar("24rem"))]),
        )]);
        let layer2 = map(vec![("maxWidth", map_prefer(vec![("prose", scalar("65ch"))]))]);
        let merged = MergedConfig::new(vec![&layer1, &layer2]);

        let map = merged.get_map(&["maxWidth"]).unwrap();
        assert_eq!(map.keys(), &["prose"]);
        assert!(merged.get_scalar(&["maxWidth", "xs"]).is_none());
    }

    #[test]
    fn test_prefer_hides_nested_values_below() {
        let base = map(vec![(
            "typography",
            map(vec![(
                "DEFAULT",
                map(vec![("css", map(vec![("color", scalar("#333"))]))]),
            )]),
        )]);
        let user = map(vec![(
            "typography",
            map_prefer(vec![("DEFAULT", map(vec![("css", map(vec![("maxWidth", scalar("72ch"))]))]))]),
        )]);
        let merged = MergedConfig::new(vec![&base, &user]);

        let css = merged.get_map(&["typography", "DEFAULT", "css"]).unwrap();
        assert_eq!(css.keys(), &["maxWidth"]);
        assert!(!merged.contains(&["typography", "DEFAULT", "css", "color"]));
    }

    #[test]
    fn test_merge_continues_above_prefer() {
        let base = map(vec![("spacing", map(vec![("1", scalar("0.25rem"))]))]);
        let theme = map(vec![("spacing", map_prefer(vec![("2", scalar("0.5rem"))]))]);
        let extend = map(vec![("spacing", map(vec![("72", scalar("18rem"))]))]);
        let merged = MergedConfig::new(vec![&base, &theme, &extend]);

        assert_eq!(merged.get_map(&["spacing"]).unwrap().keys(), &["2", "72"]);
    }

    #[test]
    fn test_kind_change_replaces() {
        let layer1 = map(vec![("fontFamily", map(vec![("sans", scalar("Inter"))]))]);
        let layer2 = map(vec![("fontFamily", scalar("system-ui"))]);
        let layer3 = map(vec![("fontFamily", map(vec![("mono", scalar("Menlo"))]))]);

        let two = MergedConfig::new(vec![&layer1, &layer2]);
        assert!(two.get_map(&["fontFamily"]).is_none());
        assert_eq!(scalar_at(&two, &["fontFamily"]), Some("system-ui"));

        let three = MergedConfig::new(vec![&layer1, &layer2, &layer3]);
        assert_eq!(three.get_map(&["fontFamily"]).unwrap().keys(), &["mono"]);
    }

    #[test]
    fn test_array_replaces_by_default() {
        let layer1 = map(vec![("sans", array(vec![scalar("ui-sans-serif"), scalar("system-ui")]))]);
        let layer2 = map(vec![("sans", array(vec![scalar("Inter")]))]);
        let merged = MergedConfig::new(vec![&layer1, &layer2]);

        let arr = merged.get_array(&["sans"]).unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr.get(0).unwrap().value.as_str(), Some("Inter"));
        assert_eq!(arr.get(0).unwrap().layer_index, 1);
    }

    #[test]
    fn test_array_concat() {
        let layer1 = map(vec![("safelist", array(vec![scalar("a"), scalar("b")]))]);
        let layer2 = map(vec![("safelist", array(vec![scalar("c")]).with_merge_op(MergeOp::Concat))]);
        let merged = MergedConfig::new(vec![&layer1, &layer2]);

        let arr = merged.get_array(&["safelist"]).unwrap();
        let values: Vec<_> = arr.iter().map(|i| i.value.as_str().unwrap()).collect();
        assert_eq!(values, vec!["a", "b", "c"]);
        assert_eq!(arr.get(2).unwrap().layer_index, 1);
    }

    #[test]
    fn test_array_prefer() {
        let layer1 = map(vec![("safelist", array(vec![scalar("a"), scalar("b")]))]);
        let layer2 = map(vec![("safelist", array_prefer(vec![scalar("c")]))]);
        let merged = MergedConfig::new(vec![&layer1, &layer2]);

        let arr = merged.get_array(&["safelist"]).unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr.get(0).unwrap().value.as_str(), Some("c"));
    }

    #[test]
    fn test_as_value_dispatches_on_top_layer() {
        let layer1 = map(vec![("fontSize", array(vec![scalar("1rem")]))]);
        let layer2 = map(vec![("fontSize", map(vec![("base", scalar("1rem"))]))]);
        let merged = MergedConfig::new(vec![&layer1, &layer2]);

        assert!(matches!(
            merged.cursor().at("fontSize").as_value(),
            Some(MergedValue::Map(_))
        ));
        assert!(merged.get_array(&["fontSize"]).is_none());
    }

    #[test]
    fn test_scalar_types_preserved() {
        let layer = map(vec![("fontWeight", ConfigValue::new_scalar(Yaml::Integer(600)))]);
        let merged = MergedConfig::new(vec![&layer]);

        let result = merged.get_scalar(&["fontWeight"]).unwrap();
        assert_eq!(result.value.as_yaml(), Some(&Yaml::Integer(600)));
    }

    #[test]
    fn test_with_layer() {
        let layer1 = map(vec![("a", scalar("1"))]);
        let layer2 = map(vec![("a", scalar("2"))]);
        let merged = MergedConfig::new(vec![&layer1]);
        let extended = merged.with_layer(&layer2);

        assert_eq!(merged.layer_count(), 1);
        assert_eq!(extended.layer_count(), 2);
        assert_eq!(scalar_at(&extended, &["a"]), Some("2"));
    }

    #[test]
    fn test_map_iter() {
        let layer = map(vec![("screens", map(vec![("sm", scalar("640px")), ("md", scalar("768px"))]))]);
        let merged = MergedConfig::new(vec![&layer]);

        let screens = merged.get_map(&["screens"]).unwrap();
        let entries: Vec<_> = screens
            .iter()
            .map(|(k, c)| (k.to_string(), c.as_scalar().unwrap().value.as_str().unwrap().to_string()))
            .collect();
        assert_eq!(
            entries,
            vec![("sm".to_string(), "640px".to_string()), ("md".to_string(), "768px".to_string())]
        );
        assert!(screens.get("lg").is_none());
    }
}
