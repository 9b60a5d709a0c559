//! Command implementations for the sieve CLI
//!
//! Each command module handles the CLI interface and delegates to
//! sieve-core for the actual work.

pub mod check;
pub mod explain;
pub mod purge;
pub mod scan;
pub mod theme;

use anyhow::{Result, bail};
use sieve_core::{ConfigResolver, LoadedConfig, SieveError};
use sieve_error_reporting::DiagnosticMessage;
use std::path::{Path, PathBuf};

/// Configuration file names tried, in order, when `--config` is absent.
pub const CONFIG_FILE_NAMES: &[&str] = &["sieve.yml", "sieve.yaml", "sieve.json"];

/// Options shared by every command.
#[derive(Debug, Default)]
pub struct Context {
    pub config: Option<PathBuf>,
    pub root: Option<PathBuf>,
}

impl Context {
    /// The configuration file to load.
    pub fn config_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config {
            return Ok(path.clone());
        }
        let cwd = std::env::current_dir()?;
        match find_config(&cwd) {
            Some(path) => Ok(path),
            None => bail!(
                "no configuration file found in {} (looked for {})",
                cwd.display(),
                CONFIG_FILE_NAMES.join(", ")
            ),
        }
    }

    pub fn resolver(&self) -> ConfigResolver {
        let resolver = ConfigResolver::default();
        match &self.root {
            Some(root) => resolver.with_root(root),
            None => resolver,
        }
    }

    /// Load the configuration, printing diagnostics along the way.
    pub fn load(&self) -> Result<LoadedConfig> {
        let path = self.config_path()?;
        let loaded = self.resolver().load_file(&path).map_err(report)?;
        print_diagnostics(&loaded.diagnostics);
        Ok(loaded)
    }
}

/// First configuration file present in `dir`.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Print an error's diagnostics and convert it for `main`.
pub fn report(err: SieveError) -> anyhow::Error {
    print_diagnostics(&err.diagnostics());
    anyhow::Error::new(err)
}

pub fn print_diagnostics(diagnostics: &[DiagnosticMessage]) {
    for diagnostic in diagnostics {
        eprintln!("{}\n", diagnostic.to_text());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_order() {
        let dir = TempDir::new().unwrap();
        assert!(find_config(dir.path()).is_none());

        fs::write(dir.path().join("sieve.json"), "{}").unwrap();
        fs::write(dir.path().join("sieve.yaml"), "{}").unwrap();
        assert_eq!(find_config(dir.path()), Some(dir.path().join("sieve.yaml")));
    }

    #[test]
    fn test_explicit_config_wins() {
        let context = Context {
            config: Some(PathBuf::from("custom.yml")),
            root: None,
        };
        assert_eq!(context.config_path().unwrap(), PathBuf::from("custom.yml"));
    }
}
