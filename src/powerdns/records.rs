//! Single-RRset shortcuts over `PATCH zones/{id}`.
use reqwest::Method;

use crate::error::Result;
use crate::powerdns::client::PowerDnsClient;
use crate::powerdns::types::{RRset, Zone};
use crate::validation::{canonicalize, zone_id};

pub struct Records<'a> {
    client: &'a PowerDnsClient,
}

impl<'a> Records<'a> {
    pub(crate) fn new(client: &'a PowerDnsClient) -> Self {
        Self { client }
    }

    /// RRsets of `domain` with the given owner name and type.
    pub async fn get(&self, domain: &str, name: &str, rrtype: &str) -> Result<Vec<RRset>> {
        let name = canonicalize(name);
        let rrtype = rrtype.to_ascii_uppercase();
        let url = self.client.url(&format!("zones/{}", zone_id(domain)));
        let req = self
            .client
            .request(Method::GET, &url)
            .query(&[("rrset_name", name.as_str()), ("rrset_type", rrtype.as_str())]);
        let zone: Zone = self.client.fetch(req, &url).await?;

        // older servers ignore the filter parameters
        Ok(zone
            .rrsets
            .unwrap_or_default()
            .into_iter()
            .filter(|rr| rr.name.eq_ignore_ascii_case(&name) && rr.rrtype == rrtype)
            .collect())
    }

    /// Create the RRset, replacing one that already exists.
    pub async fn add<I, S>(
        &self,
        domain: &str,
        name: &str,
        rrtype: &str,
        ttl: u32,
        contents: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patch(domain, RRset::replace(name, rrtype, ttl, contents))
            .await
    }

    /// Replace the RRset's TTL and records. Same request as [`Records::add`].
    pub async fn change<I, S>(
        &self,
        domain: &str,
        name: &str,
        rrtype: &str,
        ttl: u32,
        contents: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add(domain, name, rrtype, ttl, contents).await
    }

    pub async fn delete(&self, domain: &str, name: &str, rrtype: &str) -> Result<()> {
        self.patch(domain, RRset::delete(name, rrtype)).await
    }

    /// Send one caller-built RRset change.
    pub async fn patch(&self, domain: &str, rrset: RRset) -> Result<()> {
        self.client
            .zones()
            .patch_rrsets(domain, std::slice::from_ref(&rrset))
            .await
    }
}
