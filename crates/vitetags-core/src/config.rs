use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable holding the dev server base URL.
pub const ENV_DEV_SERVER_URL: &str = "DEV_SERVER_URL";
/// Environment variable holding the address probed for reachability.
pub const ENV_DEV_SERVER_CHECK_URL: &str = "DEV_SERVER_CHECK_URL";
/// Older names still honoured when the primary variables are unset.
pub const ENV_LEGACY_DEV_SERVER_URL: &str = "VITE_SERVER_URL";
pub const ENV_LEGACY_DEV_SERVER_CHECK_URL: &str = "VITE_SERVER_CHECK_URL";
pub const ENV_MODE: &str = "VITETAGS_MODE";
pub const ENV_MANIFEST: &str = "VITETAGS_MANIFEST";
pub const ENV_OUTPUT_BASE: &str = "VITETAGS_OUTPUT_BASE";
pub const ENV_PROBE_TIMEOUT_MS: &str = "DEV_SERVER_PROBE_TIMEOUT_MS";

const DEFAULT_MANIFEST: &str = "dist/.vite/manifest.json";
const DEFAULT_OUTPUT_BASE: &str = "dist";
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 250;

/// Runtime configuration for asset resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Deployment mode. The dev server is never probed in `Live`.
    pub mode: Mode,

    /// Location of the build manifest.
    pub manifest_path: PathBuf,

    /// Prefix joined with every built path from the manifest.
    pub output_base: String,

    /// Base URL pages load dev assets from.
    pub dev_server_url: Option<String>,

    /// Address probed for reachability. Defaults to `dev_server_url`.
    pub dev_server_check_url: Option<String>,

    /// Connect timeout for the reachability probe, in milliseconds.
    pub probe_timeout_ms: u64,

    /// Resource paths that never receive a cache-busting suffix.
    pub disabled_nonce_paths: Vec<String>,
}

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Dev,
    Test,
    #[default]
    Live,
}

impl Mode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Test => "test",
            Self::Live => "live",
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Dev),
            "test" => Ok(Self::Test),
            "live" | "production" | "prod" => Ok(Self::Live),
            other => Err(Error::other(format!(
                "unknown mode `{other}` (expected dev, test or live)"
            ))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            manifest_path: PathBuf::from(DEFAULT_MANIFEST),
            output_base: DEFAULT_OUTPUT_BASE.to_string(),
            dev_server_url: None,
            dev_server_check_url: None,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            disabled_nonce_paths: Vec::new(),
        }
    }
}

impl Config {
    /// Build config from the process environment on top of the defaults.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup on top of the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().with_env_overrides(lookup)
    }

    /// Load config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment-style overrides. Empty values count as unset.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(mode) = get(ENV_MODE) {
            self.mode = mode.parse()?;
        }
        if let Some(manifest) = get(ENV_MANIFEST) {
            self.manifest_path = PathBuf::from(manifest);
        }
        if let Some(base) = get(ENV_OUTPUT_BASE) {
            self.output_base = base;
        }
        if let Some(url) = get(ENV_DEV_SERVER_URL).or_else(|| get(ENV_LEGACY_DEV_SERVER_URL)) {
            self.dev_server_url = Some(url);
        }
        if let Some(url) =
            get(ENV_DEV_SERVER_CHECK_URL).or_else(|| get(ENV_LEGACY_DEV_SERVER_CHECK_URL))
        {
            self.dev_server_check_url = Some(url);
        }
        if let Some(ms) = get(ENV_PROBE_TIMEOUT_MS) {
            self.probe_timeout_ms = ms
                .trim()
                .parse()
                .ok()
                .filter(|&ms: &u64| ms > 0)
                .ok_or_else(|| {
                    Error::other(format!(
                        "{ENV_PROBE_TIMEOUT_MS} must be a positive integer, got `{ms}`"
                    ))
                })?;
        }

        Ok(self)
    }

    /// Set mode.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set manifest location.
    #[must_use]
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    /// Set the output base joined with built paths.
    #[must_use]
    pub fn with_output_base(mut self, base: impl Into<String>) -> Self {
        self.output_base = base.into();
        self
    }

    /// Set the dev server base URL.
    #[must_use]
    pub fn with_dev_server_url(mut self, url: impl Into<String>) -> Self {
        self.dev_server_url = Some(url.into());
        self
    }

    /// Set the dev server check URL.
    #[must_use]
    pub fn with_dev_server_check_url(mut self, url: impl Into<String>) -> Self {
        self.dev_server_check_url = Some(url.into());
        self
    }

    /// Set probe timeout.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Add a path that never receives a cache-busting suffix.
    #[must_use]
    pub fn with_disabled_nonce_path(mut self, path: impl Into<String>) -> Self {
        self.disabled_nonce_paths.push(path.into());
        self
    }

    /// Probe timeout, at least one millisecond. A zero connect timeout is
    /// rejected by `TcpStream::connect_timeout`.
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.mode, Mode::Live);
        assert_eq!(config.output_base, "dist");
        assert_eq!(config.manifest_path, PathBuf::from("dist/.vite/manifest.json"));
        assert!(config.dev_server_url.is_none());
        assert_eq!(config.probe_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_lookup_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("VITETAGS_MODE", "development"),
            ("DEV_SERVER_URL", "http://localhost:5173"),
            ("DEV_SERVER_CHECK_URL", "http://host.docker.internal:5173"),
            ("VITETAGS_OUTPUT_BASE", "public/build"),
            ("DEV_SERVER_PROBE_TIMEOUT_MS", "50"),
        ]))
        .unwrap();

        assert_eq!(config.mode, Mode::Dev);
        assert_eq!(config.dev_server_url.as_deref(), Some("http://localhost:5173"));
        assert_eq!(
            config.dev_server_check_url.as_deref(),
            Some("http://host.docker.internal:5173")
        );
        assert_eq!(config.output_base, "public/build");
        assert_eq!(config.probe_timeout_ms, 50);
    }

    #[test]
    fn test_legacy_names_are_fallbacks() {
        let config = Config::from_lookup(lookup(&[
            ("VITE_SERVER_URL", "http://legacy:3000"),
            ("VITE_SERVER_CHECK_URL", "http://legacy-check:3000"),
        ]))
        .unwrap();
        assert_eq!(config.dev_server_url.as_deref(), Some("http://legacy:3000"));
        assert_eq!(
            config.dev_server_check_url.as_deref(),
            Some("http://legacy-check:3000")
        );

        let config = Config::from_lookup(lookup(&[
            ("VITE_SERVER_URL", "http://legacy:3000"),
            ("DEV_SERVER_URL", "http://primary:5173"),
        ]))
        .unwrap();
        assert_eq!(config.dev_server_url.as_deref(), Some("http://primary:5173"));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = Config::from_lookup(lookup(&[("DEV_SERVER_URL", "  ")])).unwrap();
        assert!(config.dev_server_url.is_none());
    }

    #[test]
    fn test_invalid_mode_and_timeout() {
        assert!(Config::from_lookup(lookup(&[("VITETAGS_MODE", "staging")])).is_err());
        assert!(Config::from_lookup(lookup(&[("DEV_SERVER_PROBE_TIMEOUT_MS", "soon")])).is_err());
    }

    #[test]
    fn test_zero_timeout() {
        assert!(Config::from_lookup(lookup(&[("DEV_SERVER_PROBE_TIMEOUT_MS", "0")])).is_err());

        let config = Config::default().with_probe_timeout(Duration::ZERO);
        assert_eq!(config.probe_timeout_ms, 0);
        assert_eq!(config.probe_timeout(), Duration::from_millis(1));
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vitetags.json");
        std::fs::write(
            &path,
            r#"{"mode": "test", "output_base": "app/dist", "disabled_nonce_paths": ["app/dist/vendor.js"]}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.mode, Mode::Test);
        assert_eq!(config.output_base, "app/dist");
        assert_eq!(config.disabled_nonce_paths, vec!["app/dist/vendor.js"]);
        assert_eq!(config.probe_timeout_ms, 250);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(Config::load(&missing), Err(Error::ConfigRead { .. })));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(Config::load(&bad), Err(Error::ConfigParse { .. })));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("DEV_SERVER_URL", "http://127.0.0.1:5173");
        std::env::set_var("VITETAGS_MODE", "dev");
        let config = Config::from_env().unwrap();
        std::env::remove_var("DEV_SERVER_URL");
        std::env::remove_var("VITETAGS_MODE");

        assert_eq!(config.mode, Mode::Dev);
        assert_eq!(config.dev_server_url.as_deref(), Some("http://127.0.0.1:5173"));
    }
}
