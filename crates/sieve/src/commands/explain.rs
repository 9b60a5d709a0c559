//! `sieve explain`: describe a diagnostic code.

use anyhow::{Result, bail};
use sieve_error_reporting::{ErrorCodeInfo, catalog};

pub fn execute(code: Option<&str>) -> Result<()> {
    let Some(code) = code else {
        for code in catalog::codes() {
            if let Some(info) = catalog::get_error_info(code) {
                println!("{:<8} {}", code, info.title);
            }
        }
        return Ok(());
    };

    let code = code.to_ascii_uppercase();
    match catalog::get_error_info(&code) {
        Some(info) => {
            println!("{}", render(&code, info));
            Ok(())
        }
        None => bail!("unknown diagnostic code `{}` (run `sieve explain` to list them)", code),
    }
}

fn render(code: &str, info: &ErrorCodeInfo) -> String {
    format!(
        "{} {}\nsubsystem: {} (since {})\n\n{}",
        code, info.title, info.subsystem, info.since_version, info.message_template
    )
}
