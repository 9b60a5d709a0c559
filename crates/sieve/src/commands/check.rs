//! `sieve check`: validate a configuration without scanning content.

use super::Context;
use anyhow::Result;
use sieve_purge::PurgeMode;

pub fn execute(context: &Context) -> Result<()> {
    let loaded = context.load()?;

    let plugins: Vec<_> = loaded.plugins.iter().map(|p| p.name.as_str()).collect();
    println!(
        "plugins: {}",
        if plugins.is_empty() { "none".to_string() } else { plugins.join(", ") }
    );
    println!("theme categories: {}", loaded.theme.categories().count());

    let engine = &loaded.engine;
    match engine.mode() {
        PurgeMode::Disabled => println!("purge: disabled"),
        PurgeMode::All => println!(
            "purge: {} pattern(s), {} safelisted name(s)",
            engine.scanner().patterns().len(),
            engine.safelist().len()
        ),
    }
    if !loaded.passthrough.is_empty() {
        let keys: Vec<_> = loaded.passthrough.keys().map(String::as_str).collect();
        println!("passed through: {}", keys.join(", "));
    }

    println!("configuration OK");
    Ok(())
}
