//! Application-level configuration loaded from the environment.

use std::{env, path::PathBuf};

use tracing::info;

/// Default port the server binds when none is configured.
const DEFAULT_PORT: u16 = 42424;
/// Default directory CSV result exports are written to and served from.
const DEFAULT_PUBLIC_DIR: &str = "public";

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Directory exported result files are written to.
    pub public_dir: PathBuf,
    /// External base URL download links are built from.
    pub base_url: String,
}

impl AppConfig {
    /// Load the configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// `PORT` (or `SERVER_PORT`) selects the listen port,
    /// `QUIZDECK_PUBLIC_DIR` the export directory, and `QUIZDECK_BASE_URL`
    /// the base of generated download links.
    pub fn load() -> Self {
        let port = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let public_dir = env::var_os("QUIZDECK_PUBLIC_DIR")
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR));

        let base_url = env::var("QUIZDECK_BASE_URL")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| format!("http://localhost:{port}"));

        let config = Self {
            port,
            public_dir,
            base_url,
        };
        info!(
            port = config.port,
            public_dir = %config.public_dir.display(),
            base_url = %config.base_url,
            "loaded configuration"
        );
        config
    }

    /// Configuration suitable for tests: an ephemeral export directory and
    /// a local base URL.
    pub fn for_tests(public_dir: PathBuf) -> Self {
        Self {
            port: 0,
            public_dir,
            base_url: "http://localhost:0".to_string(),
        }
    }
}
