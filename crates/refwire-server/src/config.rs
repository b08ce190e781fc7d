use std::path::{Path, PathBuf};

use clap::Args;
use tracing::warn;

/// Runtime options of the query server.
#[derive(Debug, Clone, Args)]
pub struct ServeConfig {
    /// Interface to listen on.
    #[arg(long, env = "REFWIRE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// TCP port to listen on.
    #[arg(long, env = "REFWIRE_PORT", default_value_t = 5555)]
    pub port: u16,

    /// File whose trimmed contents are served by `/version`.
    #[arg(long, env = "REFWIRE_VERSION_FILE")]
    pub version_file: Option<PathBuf>,

    /// Directory for the rolling log files (default: `<tmp>/refwire`).
    #[arg(long, env = "REFWIRE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log to the console only.
    #[arg(long)]
    pub no_file_log: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 5555,
            version_file: None,
            log_dir: None,
            no_file_log: false,
        }
    }
}

impl ServeConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Log directory, or `None` when file logging is off.
    pub fn file_log_dir(&self) -> Option<PathBuf> {
        if self.no_file_log {
            return None;
        }
        Some(
            self.log_dir
                .clone()
                .unwrap_or_else(|| std::env::temp_dir().join("refwire")),
        )
    }

    pub fn version(&self) -> String {
        read_version(self.version_file.as_deref())
    }
}

/// Reads the deployment marker, falling back to the crate version.
pub fn read_version(path: Option<&Path>) -> String {
    let fallback = || String::from(env!("CARGO_PKG_VERSION"));
    let Some(path) = path else {
        return fallback();
    };

    match std::fs::read_to_string(path) {
        Ok(contents) if !contents.trim().is_empty() => contents.trim().to_owned(),
        Ok(_) => {
            warn!(path = %path.display(), "version file is empty");
            fallback()
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "version file unreadable");
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn version_file_is_trimmed() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "  Fix historical index label  ").expect("write");

        assert_eq!(
            read_version(Some(file.path())),
            "Fix historical index label"
        );
    }

    #[test]
    fn missing_version_file_falls_back_to_crate_version() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("version");

        assert_eq!(read_version(Some(&missing)), env!("CARGO_PKG_VERSION"));
        assert_eq!(read_version(None), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn file_logging_can_be_disabled() {
        let config = ServeConfig {
            no_file_log: true,
            ..ServeConfig::default()
        };
        assert!(config.file_log_dir().is_none());
        assert_eq!(config.bind_addr(), "0.0.0.0:5555");
    }
}
