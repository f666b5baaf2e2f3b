//! Zone CRUD plus notify/export/rectify.
use reqwest::Method;
use tracing::info;

use crate::error::Result;
use crate::powerdns::client::PowerDnsClient;
use crate::powerdns::types::{
    NotifyResult, PatchBody, RRset, RectifyResult, Zone, ZoneKind, ZoneOptions,
};
use crate::validation::{canonicalize, zone_id};

/// Zone endpoints below `servers/{vhost}/zones`.
pub struct Zones<'a> {
    client: &'a PowerDnsClient,
}

impl<'a> Zones<'a> {
    pub(crate) fn new(client: &'a PowerDnsClient) -> Self {
        Self { client }
    }

    fn zone_url(&self, domain: &str, suffix: &str) -> String {
        let id = zone_id(domain);
        if suffix.is_empty() {
            self.client.url(&format!("zones/{id}"))
        } else {
            self.client.url(&format!("zones/{id}/{suffix}"))
        }
    }

    /// All zones in summary form (no rrsets).
    pub async fn list(&self) -> Result<Vec<Zone>> {
        let url = self.client.url("zones");
        let req = self.client.request(Method::GET, &url);
        self.client.fetch(req, &url).await
    }

    /// One zone including its rrsets.
    pub async fn get(&self, domain: &str) -> Result<Zone> {
        let url = self.zone_url(domain, "");
        let req = self.client.request(Method::GET, &url);
        self.client.fetch(req, &url).await
    }

    pub async fn add_native(&self, domain: &str, options: ZoneOptions) -> Result<Zone> {
        self.add(&options.into_zone(domain, ZoneKind::Native)).await
    }

    pub async fn add_master(&self, domain: &str, options: ZoneOptions) -> Result<Zone> {
        self.add(&options.into_zone(domain, ZoneKind::Master)).await
    }

    /// Create a slave zone replicating from `masters`.
    ///
    /// An empty list is passed through; the server answers with a validation
    /// error.
    pub async fn add_slave<I, S>(&self, domain: &str, masters: I) -> Result<Zone>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let zone = Zone {
            name: Some(canonicalize(domain)),
            kind: Some(ZoneKind::Slave),
            masters: Some(masters.into_iter().map(Into::into).collect()),
            ..Zone::default()
        };
        self.add(&zone).await
    }

    /// Create a zone from a fully caller-built payload.
    pub async fn add(&self, zone: &Zone) -> Result<Zone> {
        let mut zone = zone.clone();
        zone.name = zone.name.as_deref().map(canonicalize);

        let url = self.client.url("zones");
        let req = self.client.request(Method::POST, &url).json(&zone);
        let created: Zone = self.client.fetch(req, &url).await?;
        info!(
            zone = created.name.as_deref().unwrap_or_default(),
            kind = ?created.kind,
            "created zone"
        );
        Ok(created)
    }

    /// Apply a partial update. Metadata fields set in `zone` go out as a PUT
    /// (identity fields are dropped); rrsets go out as a PATCH, each one
    /// upserted or removed according to its change type. The PUT is skipped
    /// when `zone` carries rrsets and no metadata.
    pub async fn change(&self, domain: &str, zone: &Zone) -> Result<()> {
        let metadata = zone.metadata_only();
        let rrsets = zone.rrsets.as_deref().unwrap_or_default();

        if rrsets.is_empty() || metadata != Zone::default() {
            let url = self.zone_url(domain, "");
            let req = self.client.request(Method::PUT, &url).json(&metadata);
            self.client.execute(req, &url).await?;
        }
        if !rrsets.is_empty() {
            self.patch_rrsets(domain, rrsets).await?;
        }
        Ok(())
    }

    /// Apply REPLACE/DELETE rrset changes in one PATCH.
    pub async fn patch_rrsets(&self, domain: &str, rrsets: &[RRset]) -> Result<()> {
        let rrsets: Vec<RRset> = rrsets.iter().cloned().map(RRset::canonicalized).collect();
        let url = self.zone_url(domain, "");
        let req = self
            .client
            .request(Method::PATCH, &url)
            .json(&PatchBody { rrsets: &rrsets });
        self.client.execute(req, &url).await?;
        Ok(())
    }

    pub async fn delete(&self, domain: &str) -> Result<()> {
        let url = self.zone_url(domain, "");
        let req = self.client.request(Method::DELETE, &url);
        self.client.execute(req, &url).await?;
        info!(zone = %canonicalize(domain), "deleted zone");
        Ok(())
    }

    /// Queue a NOTIFY to the zone's slaves (master and slave zones only).
    pub async fn notify(&self, domain: &str) -> Result<NotifyResult> {
        let url = self.zone_url(domain, "notify");
        let req = self.client.request(Method::PUT, &url);
        self.client.fetch(req, &url).await
    }

    /// The zone in zone-file format.
    pub async fn export(&self, domain: &str) -> Result<String> {
        let url = self.zone_url(domain, "export");
        let req = self.client.request(Method::GET, &url);
        self.client.execute(req, &url).await
    }

    pub async fn rectify(&self, domain: &str) -> Result<RectifyResult> {
        let url = self.zone_url(domain, "rectify");
        let req = self.client.request(Method::PUT, &url);
        self.client.fetch(req, &url).await
    }
}
