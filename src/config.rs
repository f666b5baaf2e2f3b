use std::fmt;
use std::time::Duration;

/// API root shared by every endpoint.
pub const API_PREFIX: &str = "api/v1";

/// Connection settings fixed at client construction.
#[derive(Clone)]
pub struct ClientConfig {
    pub scheme: String,      // "http" or "https"
    pub hostname: String,    // e.g. "127.0.0.1"
    pub port: u16,           // webserver-port, 8081 by default
    pub vhost: String,       // server id, usually "localhost"
    pub api_key: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("scheme", &self.scheme)
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("vhost", &self.vhost)
            .field("api_key", &"<redacted>")
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(
        scheme: impl Into<String>,
        hostname: impl Into<String>,
        port: u16,
        vhost: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            hostname: hostname.into(),
            port,
            vhost: vhost.into(),
            api_key: api_key.into(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    /// Send an extra static header with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `{scheme}://{host}:{port}/api/v1`
    pub fn api_root(&self) -> String {
        format!(
            "{}://{}:{}/{}",
            self.scheme, self.hostname, self.port, API_PREFIX
        )
    }

    /// `{scheme}://{host}:{port}/api/v1/servers/{vhost}`
    pub fn server_url(&self) -> String {
        format!("{}/servers/{}", self.api_root(), self.vhost)
    }

    /// URL of a resource below the virtual host.
    pub fn resource_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return self.server_url();
        }
        format!("{}/{}", self.server_url(), path)
    }
}
