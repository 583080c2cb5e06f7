// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "CIDB_LOG";

/// Routes tracing output to `path`; the terminal belongs to the UI.
pub fn init(path: &Path, configured_filter: &str) -> Result<()> {
    let file = open_log_file(path)?;
    let filter = resolve_filter(env::var(LOG_FILTER_ENV).ok().as_deref(), configured_filter)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].path to a writable location",
                path.display()
            )
        })
}

fn resolve_filter(env_override: Option<&str>, configured: &str) -> Result<EnvFilter> {
    let (source, directive) = match env_override.map(str::trim) {
        Some(value) if !value.is_empty() => (LOG_FILTER_ENV, value),
        _ => ("log.filter", configured),
    };
    EnvFilter::try_new(directive)
        .with_context(|| format!("invalid {source} directive {directive:?}"))
}

#[cfg(test)]
mod tests {
    use super::{open_log_file, resolve_filter};
    use anyhow::Result;
    use std::io::Write;

    #[test]
    fn log_file_is_created_with_parents_and_appended() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("cidb.log");

        let mut file = open_log_file(&path)?;
        writeln!(file, "first")?;
        drop(file);
        let mut file = open_log_file(&path)?;
        writeln!(file, "second")?;
        drop(file);

        assert_eq!(std::fs::read_to_string(&path)?, "first\nsecond\n");
        Ok(())
    }

    #[test]
    fn env_override_wins_over_config() -> Result<()> {
        let filter = resolve_filter(Some("cidb_rest=trace"), "info")?;
        assert!(filter.to_string().contains("cidb_rest=trace"));

        let filter = resolve_filter(Some("  "), "warn")?;
        assert_eq!(filter.to_string(), "warn");

        let filter = resolve_filter(None, "debug")?;
        assert_eq!(filter.to_string(), "debug");
        Ok(())
    }

    #[test]
    fn bad_directive_names_its_source() {
        let error = resolve_filter(Some("cidb=loud"), "info").expect_err("bad directive");
        assert!(error.to_string().contains("CIDB_LOG"));

        let error = resolve_filter(None, "cidb=loud").expect_err("bad directive");
        assert!(error.to_string().contains("log.filter"));
    }
}
