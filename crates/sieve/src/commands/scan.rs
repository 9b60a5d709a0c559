//! `sieve scan`: list the class names found in content.

use super::{Context, print_diagnostics, report};
use anyhow::{Result, bail};
use sieve_purge::PurgeDecision;
use tracing::info;

pub fn execute(context: &Context) -> Result<()> {
    let loaded = context.load()?;
    let purge_report = loaded.run_purge().map_err(report)?;
    print_diagnostics(&purge_report.warnings);

    let PurgeDecision::Filter { usage, .. } = &purge_report.decision else {
        bail!("purging is disabled in this configuration; nothing was scanned");
    };

    info!(
        documents = purge_report.documents_scanned,
        names = usage.len(),
        "scan complete"
    );
    for name in usage.iter() {
        println!("{}", name);
    }
    Ok(())
}
