use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result, truncate_body};
use crate::powerdns::{
    cryptokeys::Cryptokeys, records::Records, servers::Servers, statistics::Statistics,
    zones::Zones,
};

/// Header PowerDNS reads the API key from.
pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Clone, Debug)]
pub struct PowerDnsClient {
    http: Client,
    config: ClientConfig,
}

impl PowerDnsClient {
    /// Build a client with its own `reqwest::Client`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::transport(config.server_url(), e))?;
        Ok(Self::with_http(config, http))
    }

    /// Build a client around a caller-supplied `reqwest::Client`.
    pub fn with_http(config: ClientConfig, http: Client) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn zones(&self) -> Zones<'_> {
        Zones::new(self)
    }

    pub fn records(&self) -> Records<'_> {
        Records::new(self)
    }

    pub fn statistics(&self) -> Statistics<'_> {
        Statistics::new(self)
    }

    pub fn servers(&self) -> Servers<'_> {
        Servers::new(self)
    }

    pub fn cryptokeys(&self) -> Cryptokeys<'_> {
        Cryptokeys::new(self)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        self.config.resource_url(path)
    }

    fn auth_header(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req.header(API_KEY_HEADER, &self.config.api_key);
        self.config
            .headers
            .iter()
            .fold(req, |req, (name, value)| req.header(name, value))
    }

    /// Start a request carrying the API key and any configured headers.
    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!(%method, %url, "PowerDNS request");
        self.auth_header(self.http.request(method, url))
    }

    /// Send a request and return the body of a 2xx response.
    pub(crate) async fn execute(&self, req: RequestBuilder, url: &str) -> Result<String> {
        let res = req.send().await.map_err(|e| Error::transport(url, e))?;
        let status = res.status();
        let body = res.text().await.map_err(|e| Error::transport(url, e))?;

        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "PowerDNS request failed");
            return Err(Error::from_status(status, &body));
        }
        debug!(%url, status = status.as_u16(), bytes = body.len(), "PowerDNS response");
        Ok(body)
    }

    /// Send a request and decode the JSON body of a 2xx response.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        url: &str,
    ) -> Result<T> {
        let body = self.execute(req, url).await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(%url, body = %truncate_body(&body), "unexpected PowerDNS response shape");
            Error::decode(url, e)
        })
    }
}
