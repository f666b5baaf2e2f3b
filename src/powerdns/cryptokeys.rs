use reqwest::Method;

use crate::error::Result;
use crate::powerdns::client::PowerDnsClient;
use crate::powerdns::types::Cryptokey;
use crate::validation::zone_id;

/// DNSSEC keys of a zone.
pub struct Cryptokeys<'a> {
    client: &'a PowerDnsClient,
}

impl<'a> Cryptokeys<'a> {
    pub(crate) fn new(client: &'a PowerDnsClient) -> Self {
        Self { client }
    }

    fn url(&self, domain: &str, key_id: Option<u64>) -> String {
        match key_id {
            Some(id) => self
                .client
                .url(&format!("zones/{}/cryptokeys/{id}", zone_id(domain))),
            None => self
                .client
                .url(&format!("zones/{}/cryptokeys", zone_id(domain))),
        }
    }

    /// Keys without private material.
    pub async fn list(&self, domain: &str) -> Result<Vec<Cryptokey>> {
        let url = self.url(domain, None);
        let req = self.client.request(Method::GET, &url);
        self.client.fetch(req, &url).await
    }

    /// One key, including `privatekey`.
    pub async fn get(&self, domain: &str, key_id: u64) -> Result<Cryptokey> {
        let url = self.url(domain, Some(key_id));
        let req = self.client.request(Method::GET, &url);
        self.client.fetch(req, &url).await
    }

    pub async fn delete(&self, domain: &str, key_id: u64) -> Result<()> {
        let url = self.url(domain, Some(key_id));
        let req = self.client.request(Method::DELETE, &url);
        self.client.execute(req, &url).await?;
        Ok(())
    }
}
