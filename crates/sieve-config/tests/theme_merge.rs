//! Theme merging through the public API.

use sieve_config::{ConfigError, ConfigValue, MaterializeOptions, MergedTheme, merge_theme, parse};

fn load(content: &str) -> ConfigValue {
    let mut diagnostics = Vec::new();
    let value = parse(content, &mut diagnostics).unwrap();
    assert!(diagnostics.is_empty());
    value
}

fn merge(base: &ConfigValue, overrides: &[ConfigValue]) -> MergedTheme {
    merge_theme(base, overrides, &MaterializeOptions::default()).unwrap()
}

#[test]
fn test_max_width_fractions() {
    let base = load(r#"{"maxWidth": {"1/2": "50%"}}"#);
    let extend = load(r#"{"maxWidth": {"1/3": "33%"}}"#);

    let theme = merge(&base, &[extend]);
    assert_eq!(
        theme.to_json(),
        serde_json::json!({"maxWidth": {"1/2": "50%", "1/3": "33%"}})
    );
}

#[test]
fn test_keys_preserved_and_collisions_go_to_override() {
    let base = load(
        r#"
screens: { sm: 640px, md: 768px }
maxWidth: { xs: 20rem, prose: 65ch }
"#,
    );
    let extend = load(
        r#"
maxWidth: { prose: 72ch, full-text: 80ch }
spacing: { '72': 18rem }
"#,
    );

    let theme = merge(&base, &[extend]);
    assert_eq!(
        theme.to_json(),
        serde_json::json!({
            "screens": {"sm": "640px", "md": "768px"},
            "maxWidth": {"xs": "20rem", "prose": "72ch", "full-text": "80ch"},
            "spacing": {"72": "18rem"}
        })
    );
}

#[test]
fn test_application_order_is_associative() {
    let base = load("maxWidth: { xs: 20rem, prose: 65ch }\ncolors: { gray: { '100': '#f7fafc' } }");
    let first = load("maxWidth: { prose: 70ch, '1/2': '50%' }\ncolors: { gray: { '200': '#edf2f7' } }");
    let second = load("maxWidth: { prose: 72ch }\ncolors: { gray: !prefer { '900': '#1a202c' } }");

    let all_at_once = merge(&base, &[first.clone(), second.clone()]);

    let intermediate = merge(&base, &[first]).into_value();
    let step_by_step = merge(&intermediate, &[second]);

    assert_eq!(all_at_once.to_json(), step_by_step.to_json());
    assert_eq!(
        all_at_once.get_path(&["colors", "gray"]).unwrap().to_json(),
        serde_json::json!({"900": "#1a202c"})
    );
}

#[test]
fn test_prefer_replaces_plugin_defaults() {
    let plugin = load(
        r#"
typography:
  DEFAULT:
    css:
      color: '#374151'
      maxWidth: 65ch
"#,
    );
    let user = load(
        r#"
typography: !prefer
  DEFAULT:
    css:
      maxWidth: 72ch
"#,
    );

    let theme = merge(&plugin, &[user]);
    assert_eq!(
        theme.category("typography").unwrap().to_json(),
        serde_json::json!({"DEFAULT": {"css": {"maxWidth": "72ch"}}})
    );
}

#[test]
fn test_extend_deep_merges_plugin_defaults() {
    let plugin = load(
        r#"
typography:
  DEFAULT:
    css:
      color: '#374151'
      'code::before': '"`"'
"#,
    );
    let extend = load(
        r#"
typography:
  DEFAULT:
    css:
      'code::before': ''
      a: { color: '#3182ce' }
"#,
    );

    let theme = merge(&plugin, &[extend]);
    assert_eq!(
        theme.category("typography").unwrap().to_json(),
        serde_json::json!({
            "DEFAULT": {"css": {"color": "#374151", "code::before": "", "a": {"color": "#3182ce"}}}
        })
    );
}

#[test]
fn test_depth_limit_reports_path() {
    let base = load("typography: { DEFAULT: { css: { a: { '&:hover': { color: red } } } } }");

    let err = merge_theme(&base, &[], &MaterializeOptions { max_depth: 4 }).unwrap_err();
    match err {
        ConfigError::NestingTooDeep { max_depth, path } => {
            assert_eq!(max_depth, 4);
            assert_eq!(path, vec!["typography", "DEFAULT", "css", "a", "&:hover"]);
        }
        other => panic!("expected NestingTooDeep, got {:?}", other),
    }
}

#[test]
fn test_scalar_replaces_category() {
    let base = load("fontFamily: { sans: [Inter, sans-serif] }");
    let extend = load("fontFamily: inherit");

    let theme = merge(&base, &[extend]);
    assert_eq!(theme.category("fontFamily").and_then(ConfigValue::as_str), Some("inherit"));
}
