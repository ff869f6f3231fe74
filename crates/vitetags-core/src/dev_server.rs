//! Dev server detection.
//!
//! Outside live mode, a configured dev server (`vite` / `vite dev`) takes
//! precedence over the production manifest whenever it accepts TCP
//! connections. The check runs once per [`DevServerProbe`]; share one probe
//! across requests so pages do not pay for the connect on every render.

use crate::config::{Config, Mode};
use serde::Serialize;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

/// Result of dev server initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DevServerState {
    /// Base URL assets are loaded from, without a trailing slash.
    pub base_url: Option<String>,
    /// Address that was probed.
    pub check_url: Option<String>,
    pub running: bool,
}

impl DevServerState {
    #[must_use]
    pub fn configured(&self) -> bool {
        self.base_url.is_some()
    }
}

/// Memoized dev server reachability check.
#[derive(Debug)]
pub struct DevServerProbe {
    mode: Mode,
    base_url: Option<String>,
    check_url: Option<String>,
    timeout: Duration,
    state: OnceLock<DevServerState>,
}

impl DevServerProbe {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            mode: config.mode,
            base_url: config.dev_server_url.clone(),
            check_url: config.dev_server_check_url.clone(),
            timeout: config.probe_timeout(),
            state: OnceLock::new(),
        }
    }

    /// Probe that never reports a running server.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(&Config::default().with_mode(Mode::Live))
    }

    /// State after initialization, initializing on first call.
    pub fn state(&self) -> &DevServerState {
        self.state.get_or_init(|| self.initialize())
    }

    pub fn is_running(&self) -> bool {
        self.state().running
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.get().is_some()
    }

    /// `<base>/<file>` on the dev server. `None` when no server is configured.
    pub fn resource_url(&self, file: &str) -> Option<String> {
        let base = self.state().base_url.as_deref()?;
        Some(format!("{base}/{}", file.trim_start_matches('/')))
    }

    fn initialize(&self) -> DevServerState {
        if self.mode.is_live() {
            tracing::trace!("live mode, dev server disabled");
            return DevServerState::default();
        }

        let Some(base_url) = self
            .base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
        else {
            return DevServerState::default();
        };

        let check_url = self
            .check_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(base_url)
            .to_string();

        let running = probe_tcp(&check_url, self.timeout);
        tracing::debug!(%base_url, %check_url, running, "dev server probe");

        DevServerState {
            base_url: Some(base_url.to_string()),
            check_url: Some(check_url),
            running,
        }
    }
}

/// Whether a TCP connection to the URL's host and port succeeds within `timeout`.
///
/// A bare `host:port` is read as `http://host:port`. Unparseable URLs and DNS
/// failures count as unreachable.
#[must_use]
pub fn probe_tcp(check_url: &str, timeout: Duration) -> bool {
    let Some(url) = parse_check_url(check_url) else {
        return false;
    };

    let (Some(host), Some(port)) = (url.host_str(), url.port_or_known_default()) else {
        return false;
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');

    let addrs = match (host, port).to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            tracing::debug!(%host, port, error = %e, "dev server host did not resolve");
            return false;
        }
    };

    addrs
        .into_iter()
        .any(|addr| TcpStream::connect_timeout(&addr, timeout).is_ok())
}

/// Parse a check URL, retrying schemeless input with `http://`.
fn parse_check_url(check_url: &str) -> Option<Url> {
    if let Ok(url) = Url::parse(check_url) {
        if url.has_host() {
            return Some(url);
        }
    }
    if check_url.contains("://") {
        tracing::debug!(%check_url, "invalid dev server check URL");
        return None;
    }

    match Url::parse(&format!("http://{check_url}")) {
        Ok(url) if url.has_host() => Some(url),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(%check_url, error = %e, "invalid dev server check URL");
            None
        }
    }
}
