//! Core type definitions for configuration values.

use indexmap::IndexMap;
use sieve_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};
use thiserror::Error;
use yaml_rust2::Yaml;

/// Merge operation for a value.
///
/// Controls how a value combines with what lower-priority layers hold at the
/// same path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeOp {
    /// This value replaces previous values (from the `!prefer` tag).
    ///
    /// For arrays: clears all previous items
    /// For maps: replaces the entire map (no field-wise merge)
    /// For scalars: replaces the value (same as default)
    Prefer,

    /// This value extends previous values (from the `!concat` tag).
    ///
    /// For arrays: appends items to previous arrays
    /// For maps: field-wise merge with previous maps
    /// For scalars: replaces the value
    Concat,

    /// Untagged values.
    ///
    /// For arrays: replaces previous arrays
    /// For maps: field-wise merge with previous maps
    /// For scalars: replaces the value
    #[default]
    Merge,
}

/// Where a value was written.
///
/// Lines and columns are 1-based; a line of 0 means the value was built in
/// code rather than parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    /// Optional filename or source identifier
    pub file: Option<String>,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub col: usize,
}

impl SourceLocation {
    pub fn new(file: Option<String>, line: usize, col: usize) -> Self {
        Self { file, line, col }
    }

    /// Create a location from a yaml-rust2 marker (1-based line, 0-based column).
    pub fn from_marker(marker: &yaml_rust2::scanner::Marker, file: Option<&str>) -> Self {
        Self {
            file: file.map(str::to_string),
            line: marker.line(),
            col: marker.col() + 1,
        }
    }

    /// Whether this location points into a parsed document.
    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.file, self.is_known()) {
            (Some(file), true) => write!(f, "{}:{}:{}", file, self.line, self.col),
            (Some(file), false) => write!(f, "{}", file),
            (None, true) => write!(f, "{}:{}", self.line, self.col),
            (None, false) => write!(f, "<unknown>"),
        }
    }
}

/// A configuration value with explicit merge semantics.
#[derive(Debug, Clone)]
pub struct ConfigValue {
    /// The underlying value
    pub value: ConfigValueKind,

    /// Source location for this value
    pub location: SourceLocation,

    /// Merge operation (derived from tag or defaulted)
    pub merge_op: MergeOp,
}

/// The kind of configuration value.
#[derive(Debug, Clone)]
pub enum ConfigValueKind {
    /// Atomic values (String, Integer, Real, Boolean, Null).
    ///
    /// Always "last wins" regardless of MergeOp.
    Scalar(Yaml),

    /// Arrays: replaced unless tagged `!concat`.
    Array(Vec<ConfigValue>),

    /// Objects: merge_op controls field-wise merge vs replace.
    Map(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Create a new scalar ConfigValue with default merge semantics.
    pub fn new_scalar(yaml: Yaml) -> Self {
        Self {
            value: ConfigValueKind::Scalar(yaml),
            location: SourceLocation::default(),
            merge_op: MergeOp::Merge,
        }
    }

    /// Create a string scalar.
    pub fn new_string(s: impl Into<String>) -> Self {
        Self::new_scalar(Yaml::String(s.into()))
    }

    /// Create a new array ConfigValue with default merge semantics.
    pub fn new_array(items: Vec<ConfigValue>) -> Self {
        Self {
            value: ConfigValueKind::Array(items),
            location: SourceLocation::default(),
            merge_op: MergeOp::Merge,
        }
    }

    /// Create a new map ConfigValue with default merge semantics.
    pub fn new_map(entries: IndexMap<String, ConfigValue>) -> Self {
        Self {
            value: ConfigValueKind::Map(entries),
            location: SourceLocation::default(),
            merge_op: MergeOp::Merge,
        }
    }

    /// Create an empty map.
    pub fn empty_map() -> Self {
        Self::new_map(IndexMap::new())
    }

    /// Create a null ConfigValue.
    pub fn null() -> Self {
        Self::new_scalar(Yaml::Null)
    }

    /// Set the merge operation.
    pub fn with_merge_op(mut self, merge_op: MergeOp) -> Self {
        self.merge_op = merge_op;
        self
    }

    /// Set the source location.
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.value, ConfigValueKind::Scalar(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.value, ConfigValueKind::Array(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self.value, ConfigValueKind::Map(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, ConfigValueKind::Scalar(Yaml::Null))
    }

    /// Get as a Yaml scalar if this is a scalar.
    pub fn as_yaml(&self) -> Option<&Yaml> {
        match &self.value {
            ConfigValueKind::Scalar(yaml) => Some(yaml),
            _ => None,
        }
    }

    /// Get as a string slice if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        self.as_yaml().and_then(Yaml::as_str)
    }

    /// Get as a bool if this is a boolean scalar.
    pub fn as_bool(&self) -> Option<bool> {
        self.as_yaml().and_then(Yaml::as_bool)
    }

    /// Get as array items if this is an array.
    pub fn as_array(&self) -> Option<&[ConfigValue]> {
        match &self.value {
            ConfigValueKind::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get as map entries if this is a map.
    pub fn as_map(&self) -> Option<&IndexMap<String, ConfigValue>> {
        match &self.value {
            ConfigValueKind::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a direct child of a map.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Look up a nested child of a map by path.
    pub fn get_path(&self, path: &[&str]) -> Option<&ConfigValue> {
        path.iter().try_fold(self, |current, key| current.get(key))
    }

    /// Render a scalar the way it would appear in a stylesheet.
    ///
    /// Strings are returned verbatim; numbers and booleans are formatted.
    /// Null, arrays and maps have no display form.
    pub fn scalar_to_string(&self) -> Option<String> {
        match self.as_yaml()? {
            Yaml::String(s) => Some(s.clone()),
            Yaml::Integer(i) => Some(i.to_string()),
            Yaml::Real(r) => Some(r.clone()),
            Yaml::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Convert to a JSON value (locations and merge operations are dropped).
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match &self.value {
            ConfigValueKind::Scalar(yaml) => match yaml {
                Yaml::String(s) => Value::String(s.clone()),
                Yaml::Integer(i) => Value::from(*i),
                Yaml::Real(r) => r
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map_or_else(|| Value::String(r.clone()), Value::Number),
                Yaml::Boolean(b) => Value::Bool(*b),
                _ => Value::Null,
            },
            ConfigValueKind::Array(items) => {
                Value::Array(items.iter().map(ConfigValue::to_json).collect())
            }
            ConfigValueKind::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration nesting exceeds maximum depth.
    #[error("Config nesting too deep (max depth: {max_depth}) at path: {}", path.join("."))]
    NestingTooDeep {
        /// Maximum allowed depth
        max_depth: usize,
        /// Path where the limit was exceeded
        path: Vec<String>,
    },

    /// The document is not valid YAML/JSON, or uses unsupported constructs.
    #[error("Invalid configuration syntax at {location}: {message}")]
    Parse {
        message: String,
        location: SourceLocation,
    },

    /// A merge tag could not be interpreted.
    #[error("Invalid tag at {location}: {message}")]
    InvalidTag {
        message: String,
        location: SourceLocation,
    },
}

impl ConfigError {
    /// Convert into a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        match self {
            ConfigError::NestingTooDeep { max_depth, path } => {
                DiagnosticMessageBuilder::error("Configuration nesting too deep")
                    .with_code("S-1-3")
                    .problem(format!(
                        "Merged configuration can't be nested deeper than {} levels",
                        max_depth
                    ))
                    .add_detail(format!("limit exceeded at `{}`", path.join(".")))
                    .build()
            }
            ConfigError::Parse { message, location } => {
                DiagnosticMessageBuilder::error("Configuration syntax error")
                    .with_code("S-1-1")
                    .problem(message.clone())
                    .with_location(location.to_string())
                    .build()
            }
            ConfigError::InvalidTag { message, location } => {
                DiagnosticMessageBuilder::error("Invalid merge tag")
                    .with_code("S-1-20")
                    .problem(message.clone())
                    .with_location(location.to_string())
                    .build()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_op_default() {
        assert_eq!(MergeOp::default(), MergeOp::Merge);
    }

    #[test]
    fn test_config_value_scalar() {
        let value = ConfigValue::new_string("50%");

        assert!(value.is_scalar());
        assert!(!value.is_array());
        assert!(!value.is_map());
        assert_eq!(value.as_str(), Some("50%"));
        assert_eq!(value.merge_op, MergeOp::Merge);
    }

    #[test]
    fn test_config_value_map_get_path() {
        let mut css = IndexMap::new();
        css.insert("maxWidth".to_string(), ConfigValue::new_string("72ch"));
        let mut default = IndexMap::new();
        default.insert("css".to_string(), ConfigValue::new_map(css));
        let mut typography = IndexMap::new();
        typography.insert("DEFAULT".to_string(), ConfigValue::new_map(default));
        let root = ConfigValue::new_map(typography);

        assert_eq!(
            root.get_path(&["DEFAULT", "css", "maxWidth"]).and_then(ConfigValue::as_str),
            Some("72ch")
        );
        assert!(root.get_path(&["DEFAULT", "missing"]).is_none());
        assert!(root.get_path(&[]).is_some());
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(ConfigValue::new_scalar(Yaml::Integer(0)).scalar_to_string(), Some("0".into()));
        assert_eq!(ConfigValue::new_string("").scalar_to_string(), Some(String::new()));
        assert_eq!(ConfigValue::null().scalar_to_string(), None);
        assert_eq!(ConfigValue::new_array(vec![]).scalar_to_string(), None);
    }

    #[test]
    fn test_to_json() {
        let mut entries = IndexMap::new();
        entries.insert("width".to_string(), ConfigValue::new_string("50%"));
        entries.insert("weight".to_string(), ConfigValue::new_scalar(Yaml::Integer(600)));
        entries.insert("ratio".to_string(), ConfigValue::new_scalar(Yaml::Real("1.5".into())));
        entries.insert(
            "list".to_string(),
            ConfigValue::new_array(vec![ConfigValue::new_scalar(Yaml::Boolean(true))]),
        );
        let json = ConfigValue::new_map(entries).to_json();

        assert_eq!(
            json,
            serde_json::json!({"width": "50%", "weight": 600, "ratio": 1.5, "list": [true]})
        );
    }

    #[test]
    fn test_location_display() {
        assert_eq!(SourceLocation::new(Some("sieve.yml".into()), 3, 5).to_string(), "sieve.yml:3:5");
        assert_eq!(SourceLocation::new(None, 3, 5).to_string(), "3:5");
        assert_eq!(SourceLocation::default().to_string(), "<unknown>");
    }

    #[test]
    fn test_nesting_error_diagnostic() {
        let err = ConfigError::NestingTooDeep {
            max_depth: 4,
            path: vec!["typography".into(), "DEFAULT".into()],
        };
        assert!(err.to_string().contains("typography.DEFAULT"));

        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.code.as_deref(), Some("S-1-3"));
        assert!(diagnostic.to_text().contains("`typography.DEFAULT`"));
    }
}
