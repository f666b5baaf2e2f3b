//! Server metadata, cache flush and runtime configuration.
use reqwest::Method;

use crate::error::Result;
use crate::powerdns::client::PowerDnsClient;
use crate::powerdns::types::{CacheFlushResult, ConfigSetting, Server};
use crate::validation::canonicalize;

pub struct Servers<'a> {
    client: &'a PowerDnsClient,
}

impl<'a> Servers<'a> {
    pub(crate) fn new(client: &'a PowerDnsClient) -> Self {
        Self { client }
    }

    /// Every server behind the endpoint, not only the configured vhost.
    pub async fn list(&self) -> Result<Vec<Server>> {
        let url = format!("{}/servers", self.client.config().api_root());
        let req = self.client.request(Method::GET, &url);
        self.client.fetch(req, &url).await
    }

    /// Metadata of the configured vhost.
    pub async fn get(&self) -> Result<Server> {
        let url = self.client.config().server_url();
        let req = self.client.request(Method::GET, &url);
        self.client.fetch(req, &url).await
    }

    /// Drop cached entries for `domain` and everything below it.
    pub async fn cache_flush(&self, domain: &str) -> Result<CacheFlushResult> {
        let domain = canonicalize(domain);
        let url = self.client.url("cache/flush");
        let req = self
            .client
            .request(Method::PUT, &url)
            .query(&[("domain", domain.as_str())]);
        self.client.fetch(req, &url).await
    }

    pub async fn config(&self) -> Result<Vec<ConfigSetting>> {
        let url = self.client.url("config");
        let req = self.client.request(Method::GET, &url);
        self.client.fetch(req, &url).await
    }
}
