//! `sieve purge`: partition candidate class names into kept and dropped.

use super::{Context, print_diagnostics, report};
use anyhow::{Context as _, Result};
use std::path::PathBuf;

/// Arguments for the purge command
#[derive(Debug)]
pub struct PurgeArgs {
    pub names: Vec<String>,
    /// File with one candidate per line
    pub candidates: Option<PathBuf>,
    pub json: bool,
}

pub fn execute(context: &Context, args: PurgeArgs) -> Result<()> {
    let mut candidates = args.names;
    if let Some(path) = &args.candidates {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read candidates from {}", path.display()))?;
        candidates.extend(parse_candidates(&text));
    }

    let config = context.config_path()?;
    let resolved = context.resolver().resolve_file(&config).map_err(report)?;
    print_diagnostics(&resolved.diagnostics);

    let (kept, dropped) = resolved.decision.partition(&candidates);

    if args.json {
        let json = serde_json::json!({ "kept": kept, "dropped": dropped });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("kept ({}):", kept.len());
        for name in &kept {
            println!("  {}", name);
        }
        println!("dropped ({}):", dropped.len());
        for name in &dropped {
            println!("  {}", name);
        }
    }
    Ok(())
}

/// Candidate names from a list file. Blank lines and `#` comments are skipped.
fn parse_candidates(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_candidates() {
        let names: Vec<_> = parse_candidates("# generated\npagination\n\n  active  \nmd:flex\n").collect();
        assert_eq!(names, vec!["pagination", "active", "md:flex"]);
    }
}
