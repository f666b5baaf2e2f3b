use reqwest::Method;

use crate::error::Result;
use crate::powerdns::client::PowerDnsClient;
use crate::powerdns::types::Statistic;

pub struct Statistics<'a> {
    client: &'a PowerDnsClient,
}

impl<'a> Statistics<'a> {
    pub(crate) fn new(client: &'a PowerDnsClient) -> Self {
        Self { client }
    }

    /// Every statistic the server exposes. Unknown item types fail decoding.
    pub async fn list(&self) -> Result<Vec<Statistic>> {
        let url = self.client.url("statistics");
        let req = self.client.request(Method::GET, &url);
        self.client.fetch(req, &url).await
    }

    /// A single named statistic; the server still answers with a list.
    pub async fn get(&self, name: &str) -> Result<Vec<Statistic>> {
        let url = self.client.url("statistics");
        let req = self
            .client
            .request(Method::GET, &url)
            .query(&[("statistic", name)]);
        self.client.fetch(req, &url).await
    }
}
