//! Tracing setup for the terminal binary.
//!
//! The game owns the terminal in raw mode, so log lines never go to stdout or
//! stderr. They are appended to a file, or dropped when no file is set.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Returns false when logging stays disabled.
pub fn init(filter: &str, path: Option<&Path>) -> Result<bool> {
    let Some(path) = path else {
        return Ok(false);
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(filter)?)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_path_disables_logging() {
        assert!(!init("info", None).unwrap());
    }

    #[test]
    fn test_writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nexus.log");
        // Another test may have installed the global subscriber already.
        if init("info", Some(&path)).unwrap_or(false) {
            tracing::info!("hello");
        }
        assert!(path.exists());
    }
}
