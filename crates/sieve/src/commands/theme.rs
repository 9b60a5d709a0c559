//! `sieve theme`: print the merged theme.

use super::Context;
use anyhow::{Result, bail};

pub fn execute(context: &Context, category: Option<&str>) -> Result<()> {
    let loaded = context.load()?;

    let json = match category {
        Some(name) => match loaded.theme.category(name) {
            Some(tokens) => tokens.to_json(),
            None => bail!(
                "theme has no category `{}` (available: {})",
                name,
                loaded.theme.categories().collect::<Vec<_>>().join(", ")
            ),
        },
        None => loaded.theme.to_json(),
    };

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
