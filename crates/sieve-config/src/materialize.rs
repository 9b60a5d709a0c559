//! Materialization of merged configuration into owned values.
//!
//! A `MergedConfig` borrows its layers. Materializing walks the merged view
//! and produces an owned `ConfigValue` tree that can outlive them, be merged
//! again as a layer of its own, or be serialized.
//!
//! # Depth Limiting
//!
//! Materialization enforces a maximum depth so that pathological documents
//! fail with `ConfigError::NestingTooDeep` instead of exhausting the stack.

use crate::merged::{MergedConfig, MergedCursor, MergedValue};
use crate::types::{ConfigError, ConfigValue, ConfigValueKind, MergeOp};
use indexmap::IndexMap;

/// Default maximum nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options for materialization.
#[derive(Debug, Clone)]
pub struct MaterializeOptions {
    /// Maximum nesting depth. The root is depth 0.
    pub max_depth: usize,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl<'a> MergedConfig<'a> {
    /// Materialize with default options.
    pub fn materialize(&self) -> Result<ConfigValue, ConfigError> {
        self.materialize_with_options(&MaterializeOptions::default())
    }

    /// Materialize with custom options.
    ///
    /// A config with no layers materializes to an empty map.
    pub fn materialize_with_options(
        &self,
        options: &MaterializeOptions,
    ) -> Result<ConfigValue, ConfigError> {
        if self.layer_count() == 0 {
            return Ok(ConfigValue::empty_map());
        }
        let mut path = Vec::new();
        materialize_cursor(&self.cursor(), 0, options, &mut path)
    }
}

fn too_deep(options: &MaterializeOptions, path: &[String]) -> ConfigError {
    ConfigError::NestingTooDeep {
        max_depth: options.max_depth,
        path: path.to_vec(),
    }
}

fn materialize_cursor(
    cursor: &MergedCursor<'_>,
    depth: usize,
    options: &MaterializeOptions,
    path: &mut Vec<String>,
) -> Result<ConfigValue, ConfigError> {
    if depth > options.max_depth {
        return Err(too_deep(options, path));
    }

    match cursor.as_value() {
        Some(MergedValue::Scalar(scalar)) => Ok(scalar.value.clone().with_merge_op(MergeOp::Merge)),
        Some(MergedValue::Array(array)) => {
            let mut items = Vec::with_capacity(array.len());
            for (index, item) in array.iter().enumerate() {
                path.push(index.to_string());
                items.push(clone_checked(item.value, depth + 1, options, path)?);
                path.pop();
            }

            let location = array
                .items
                .last()
                .map(|item| item.value.location.clone())
                .unwrap_or_default();

            Ok(ConfigValue::new_array(items).with_location(location))
        }
        Some(MergedValue::Map(map)) => {
            let mut entries = IndexMap::with_capacity(map.len());
            for (key, child) in map.iter() {
                path.push(key.to_string());
                let value = materialize_cursor(&child, depth + 1, options, path)?;
                path.pop();
                entries.insert(key.to_string(), value);
            }

            Ok(ConfigValue::new_map(entries).with_location(top_location(cursor)))
        }
        None => Ok(ConfigValue::null()),
    }
}

/// Location of the highest-priority value at the cursor.
fn top_location(cursor: &MergedCursor<'_>) -> crate::types::SourceLocation {
    cursor
        .as_map()
        .and_then(|map| {
            map.iter().find_map(|(_, child)| match child.as_value()? {
                MergedValue::Scalar(s) => Some(s.value.location.clone()),
                MergedValue::Array(a) => a.items.first().map(|i| i.value.location.clone()),
                MergedValue::Map(_) => None,
            })
        })
        .unwrap_or_default()
}

/// Deep-clone an array item, enforcing the depth limit on the way down.
///
/// Array items are not merged, but a map nested in an array still counts
/// toward the depth of the materialized tree.
fn clone_checked(
    value: &ConfigValue,
    depth: usize,
    options: &MaterializeOptions,
    path: &mut Vec<String>,
) -> Result<ConfigValue, ConfigError> {
    if depth > options.max_depth {
        return Err(too_deep(options, path));
    }

    let kind = match &value.value {
        ConfigValueKind::Scalar(yaml) => ConfigValueKind::Scalar(yaml.clone()),
        ConfigValueKind::Array(items) => {
            let mut cloned = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push(index.to_string());
                cloned.push(clone_checked(item, depth + 1, options, path)?);
                path.pop();
            }
            ConfigValueKind::Array(cloned)
        }
        ConfigValueKind::Map(entries) => {
            let mut cloned = IndexMap::with_capacity(entries.len());
            for (key, item) in entries {
                path.push(key.clone());
                cloned.insert(key.clone(), clone_checked(item, depth + 1, options, path)?);
                path.pop();
            }
            ConfigValueKind::Map(cloned)
        }
    };

    Ok(ConfigValue {
        value: kind,
        location: value.location.clone(),
        merge_op: MergeOp::Merge,
    })
}
