//! YAML tag parsing for configuration merging.
//!
//! Tags are underscore-separated component lists: `!prefer`, `!concat`.
//! Components that are not merge operations are ignored with a warning so
//! that documents written for richer tools still load.

use crate::types::{MergeOp, SourceLocation};
use sieve_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};

/// Result of parsing a YAML tag.
#[derive(Debug, Clone, Default)]
pub struct ParsedTag {
    /// Merge operation (None means use the default)
    pub merge_op: Option<MergeOp>,

    /// True if any errors occurred during parsing (not just warnings)
    pub had_errors: bool,
}

impl ParsedTag {
    /// Get the merge operation, using the provided default if not explicitly set.
    pub fn merge_op_or(&self, default: MergeOp) -> MergeOp {
        self.merge_op.unwrap_or(default)
    }
}

/// Parse a YAML tag suffix (without the leading `!`).
///
/// # Error Handling
///
/// - Invalid characters emit errors (S-1-20)
/// - Unknown components emit warnings (S-1-21)
/// - Conflicting merge operations emit errors (S-1-22)
pub fn parse_tag(
    tag_str: &str,
    location: &SourceLocation,
    diagnostics: &mut Vec<DiagnosticMessage>,
) -> ParsedTag {
    let mut result = ParsedTag::default();

    if tag_str.is_empty() || tag_str.contains(|c: char| !c.is_alphanumeric() && c != '_') {
        diagnostics.push(
            DiagnosticMessageBuilder::error("Invalid character in tag")
                .with_code("S-1-20")
                .problem(format!(
                    "Tag `!{}` must contain only letters, numbers and underscores",
                    tag_str
                ))
                .with_location(location.to_string())
                .build(),
        );
        result.had_errors = true;
        return result;
    }

    for component in tag_str.split('_') {
        let op = match component {
            "prefer" => MergeOp::Prefer,
            "concat" => MergeOp::Concat,
            "" => continue,
            other => {
                diagnostics.push(
                    DiagnosticMessageBuilder::warning("Unknown tag component")
                        .with_code("S-1-21")
                        .problem(format!("`{}` in tag `!{}` is not a merge operation", other, tag_str))
                        .add_info("Known components: `prefer`, `concat`")
                        .with_location(location.to_string())
                        .build(),
                );
                continue;
            }
        };

        match result.merge_op {
            Some(existing) if existing != op => {
                diagnostics.push(
                    DiagnosticMessageBuilder::error("Conflicting merge operations")
                        .with_code("S-1-22")
                        .problem(format!(
                            "Tag `!{}` can't specify both `prefer` and `concat`",
                            tag_str
                        ))
                        .with_location(location.to_string())
                        .build(),
                );
                result.had_errors = true;
                return result;
            }
            _ => result.merge_op = Some(op),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tag: &str) -> (ParsedTag, Vec<DiagnosticMessage>) {
        let mut diagnostics = Vec::new();
        let parsed = parse_tag(tag, &SourceLocation::default(), &mut diagnostics);
        (parsed, diagnostics)
    }

    #[test]
    fn test_prefer() {
        let (tag, diagnostics) = parse("prefer");
        assert_eq!(tag.merge_op, Some(MergeOp::Prefer));
        assert!(!tag.had_errors);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_concat() {
        let (tag, _) = parse("concat");
        assert_eq!(tag.merge_op_or(MergeOp::Prefer), MergeOp::Concat);
    }

    #[test]
    fn test_unknown_component_warns() {
        let (tag, diagnostics) = parse("prefer_md");
        assert_eq!(tag.merge_op, Some(MergeOp::Prefer));
        assert!(!tag.had_errors);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code.as_deref(), Some("S-1-21"));
        assert!(!diagnostics[0].is_error());
    }

    #[test]
    fn test_conflicting_ops() {
        let (tag, diagnostics) = parse("prefer_concat");
        assert!(tag.had_errors);
        assert_eq!(diagnostics[0].code.as_deref(), Some("S-1-22"));
    }

    #[test]
    fn test_repeated_op_is_fine() {
        let (tag, diagnostics) = parse("prefer_prefer");
        assert_eq!(tag.merge_op, Some(MergeOp::Prefer));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_invalid_characters() {
        let (tag, diagnostics) = parse("pre-fer");
        assert!(tag.had_errors);
        assert!(tag.merge_op.is_none());
        assert_eq!(diagnostics[0].code.as_deref(), Some("S-1-20"));
    }
}
