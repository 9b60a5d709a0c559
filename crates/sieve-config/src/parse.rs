//! Loading configuration documents into `ConfigValue` trees.
//!
//! Documents are YAML; JSON documents load too since JSON is a YAML subset.
//! The loader is driven by yaml-rust2's event parser rather than its DOM
//! loader so that merge tags and source positions survive.

use crate::tag::parse_tag;
use crate::types::{ConfigError, ConfigValue, ConfigValueKind, MergeOp, SourceLocation};
use indexmap::IndexMap;
use sieve_error_reporting::DiagnosticMessage;
use yaml_rust2::Yaml;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Parse a configuration document from a string.
///
/// Only the first document of a multi-document stream is read. An empty
/// document yields an empty map. Non-fatal problems (unknown tag components)
/// are pushed onto `diagnostics`.
///
/// # Example
///
/// ```
/// use sieve_config::parse;
///
/// let mut diagnostics = Vec::new();
/// let config = parse("plugins: ['@tailwindcss/typography']", &mut diagnostics).unwrap();
/// assert!(config.get("plugins").unwrap().is_array());
/// ```
pub fn parse(
    content: &str,
    diagnostics: &mut Vec<DiagnosticMessage>,
) -> Result<ConfigValue, ConfigError> {
    parse_impl(content, None, diagnostics)
}

/// Parse a configuration document, recording `filename` in source locations.
pub fn parse_file(
    content: &str,
    filename: &str,
    diagnostics: &mut Vec<DiagnosticMessage>,
) -> Result<ConfigValue, ConfigError> {
    parse_impl(content, Some(filename), diagnostics)
}

fn parse_impl(
    content: &str,
    filename: Option<&str>,
    diagnostics: &mut Vec<DiagnosticMessage>,
) -> Result<ConfigValue, ConfigError> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = ConfigBuilder::new(filename);

    parser
        .load(&mut builder, false)
        .map_err(|err| ConfigError::Parse {
            message: err.info().to_string(),
            location: SourceLocation::from_marker(err.marker(), filename),
        })?;

    builder.finish(diagnostics)
}

/// Builder that implements MarkedEventReceiver to construct ConfigValue trees.
struct ConfigBuilder<'a> {
    filename: Option<&'a str>,

    /// Stack of collections being constructed
    stack: Vec<BuildNode>,

    /// The completed root node
    root: Option<ConfigValue>,

    diagnostics: Vec<DiagnosticMessage>,

    /// First structural error; events after it are ignored
    error: Option<ConfigError>,
}

enum BuildNode {
    Sequence {
        location: SourceLocation,
        merge_op: MergeOp,
        items: Vec<ConfigValue>,
    },
    Mapping {
        location: SourceLocation,
        merge_op: MergeOp,
        entries: IndexMap<String, ConfigValue>,
        pending_key: Option<String>,
    },
}

impl<'a> ConfigBuilder<'a> {
    fn new(filename: Option<&'a str>) -> Self {
        Self {
            filename,
            stack: Vec::new(),
            root: None,
            diagnostics: Vec::new(),
            error: None,
        }
    }

    fn finish(self, diagnostics: &mut Vec<DiagnosticMessage>) -> Result<ConfigValue, ConfigError> {
        diagnostics.extend(self.diagnostics);

        if let Some(err) = self.error {
            return Err(err);
        }

        Ok(self.root.unwrap_or_else(ConfigValue::empty_map))
    }

    fn location(&self, marker: &Marker) -> SourceLocation {
        SourceLocation::from_marker(marker, self.filename)
    }

    fn merge_op(&mut self, tag: Option<&Tag>, location: &SourceLocation) -> MergeOp {
        let Some(name) = tag.and_then(local_tag_name) else {
            return MergeOp::Merge;
        };

        let parsed = parse_tag(name, location, &mut self.diagnostics);
        if parsed.had_errors && self.error.is_none() {
            self.error = Some(ConfigError::InvalidTag {
                message: format!("`!{}` is not a valid merge tag", name),
                location: location.clone(),
            });
        }
        parsed.merge_op_or(MergeOp::Merge)
    }

    fn fail(&mut self, message: impl Into<String>, location: SourceLocation) {
        if self.error.is_none() {
            self.error = Some(ConfigError::Parse {
                message: message.into(),
                location,
            });
        }
    }

    /// True when the next scalar closes a key position in the innermost mapping.
    fn expecting_key(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(BuildNode::Mapping {
                pending_key: None,
                ..
            })
        )
    }

    fn push_complete(&mut self, node: ConfigValue) {
        match self.stack.last_mut() {
            None => self.root = Some(node),
            Some(BuildNode::Sequence { items, .. }) => items.push(node),
            Some(BuildNode::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some(key) => {
                    entries.insert(key, node);
                }
                None => {
                    let location = node.location.clone();
                    self.fail("mapping keys must be scalars", location);
                }
            },
        }
    }
}

impl MarkedEventReceiver for ConfigBuilder<'_> {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }

        match ev {
            Event::Scalar(value, style, _anchor_id, tag) => {
                if self.expecting_key() {
                    if let Some(BuildNode::Mapping { pending_key, .. }) = self.stack.last_mut() {
                        *pending_key = Some(value);
                    }
                    return;
                }

                let location = self.location(&marker);
                let merge_op = self.merge_op(tag.as_ref(), &location);
                let yaml = if style == TScalarStyle::Plain && !is_str_tag(tag.as_ref()) {
                    parse_scalar_value(&value)
                } else {
                    Yaml::String(value)
                };

                self.push_complete(ConfigValue {
                    value: ConfigValueKind::Scalar(yaml),
                    location,
                    merge_op,
                });
            }

            Event::SequenceStart(_anchor_id, tag) => {
                let location = self.location(&marker);
                let merge_op = self.merge_op(tag.as_ref(), &location);
                self.stack.push(BuildNode::Sequence {
                    location,
                    merge_op,
                    items: Vec::new(),
                });
            }

            Event::MappingStart(_anchor_id, tag) => {
                let location = self.location(&marker);
                let merge_op = self.merge_op(tag.as_ref(), &location);
                self.stack.push(BuildNode::Mapping {
                    location,
                    merge_op,
                    entries: IndexMap::new(),
                    pending_key: None,
                });
            }

            Event::SequenceEnd | Event::MappingEnd => {
                let node = match self.stack.pop() {
                    Some(BuildNode::Sequence {
                        location,
                        merge_op,
                        items,
                    }) => ConfigValue {
                        value: ConfigValueKind::Array(items),
                        location,
                        merge_op,
                    },
                    Some(BuildNode::Mapping {
                        location,
                        merge_op,
                        entries,
                        ..
                    }) => ConfigValue {
                        value: ConfigValueKind::Map(entries),
                        location,
                        merge_op,
                    },
                    None => {
                        let location = self.location(&marker);
                        self.fail("unbalanced collection end", location);
                        return;
                    }
                };
                self.push_complete(node);
            }

            Event::Alias(_anchor_id) => {
                let location = self.location(&marker);
                self.fail("anchors and aliases are not supported", location);
            }

            _ => {}
        }
    }
}

/// Name of a local (`!name`) tag, or None for standard (`!!type`) tags.
fn local_tag_name(tag: &Tag) -> Option<&str> {
    match tag.handle.as_str() {
        "!" => Some(tag.suffix.as_str()),
        "" => tag.suffix.strip_prefix('!'),
        _ => None,
    }
}

/// `!!str` forces a plain scalar to stay a string.
fn is_str_tag(tag: Option<&Tag>) -> bool {
    tag.is_some_and(|tag| {
        tag.suffix == "str" && (tag.handle == "!!" || tag.handle == "tag:yaml.org,2002:")
    })
}

/// Parse a plain scalar string into the appropriate Yaml type.
fn parse_scalar_value(value: &str) -> Yaml {
    if let Ok(i) = value.parse::<i64>() {
        return Yaml::Integer(i);
    }

    if value.contains(|c: char| c.is_ascii_digit()) && value.parse::<f64>().is_ok() {
        return Yaml::Real(value.to_string());
    }

    match value {
        "true" | "True" | "TRUE" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" => {
            Yaml::Boolean(true)
        }
        "false" | "False" | "FALSE" | "no" | "No" | "NO" | "off" | "Off" | "OFF" => {
            Yaml::Boolean(false)
        }
        "null" | "Null" | "NULL" | "~" | "" => Yaml::Null,
        _ => Yaml::String(value.to_string()),
    }
}
