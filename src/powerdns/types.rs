use serde::{Deserialize, Deserializer, Serialize};

use crate::validation::canonicalize;

/// Zone replication role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneKind {
    Native,
    Master,
    Slave,
    // catalog zones, PowerDNS 4.7+
    Producer,
    Consumer,
}

/// Whether a patched RRset is upserted or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Replace,
    Delete,
}

/// A zone as returned by the API, also used for create and change payloads.
///
/// Every field is optional: absent fields are left out of request bodies so a
/// change never resets a value the caller did not mention.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>, // "example.com."
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>, // "example.com."
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<String>, // "Zone"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>, // "/api/v1/servers/localhost/zones/example.com."
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ZoneKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rrsets: Option<Vec<RRset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notified_serial: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_serial: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masters: Option<Vec<String>>, // "192.0.2.53", "192.0.2.54:5300"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnssec: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsec3param: Option<String>, // "1 0 1 ab"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsec3narrow: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presigned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soa_edit: Option<String>, // "INCEPTION-INCREMENT", "EPOCH", ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soa_edit_api: Option<String>, // "DEFAULT", "INCREASE", ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_rectify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>, // zone-file text, create only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nameservers: Option<Vec<String>>, // create only, never returned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_tsig_key_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slave_tsig_key_ids: Option<Vec<String>>,
}

impl Zone {
    /// First RRset matching owner name and type.
    pub fn rrset(&self, name: &str, rrtype: &str) -> Option<&RRset> {
        let name = canonicalize(name);
        self.rrsets
            .as_deref()?
            .iter()
            .find(|rr| rr.name.eq_ignore_ascii_case(&name) && rr.rrtype.eq_ignore_ascii_case(rrtype))
    }

    /// Copy with the identity fields and rrsets removed, as PUT expects.
    pub(crate) fn metadata_only(&self) -> Zone {
        Zone {
            id: None,
            name: None,
            zone_type: None,
            url: None,
            rrsets: None,
            ..self.clone()
        }
    }
}

/// Settings for creating a native or master zone.
#[derive(Debug, Clone, Default)]
pub struct ZoneOptions {
    pub dnssec: bool,
    /// Only sent when `dnssec` is set.
    pub nsec3param: Option<String>,
    /// Only sent when `dnssec` is set.
    pub nsec3narrow: bool,
    pub soa_edit: Option<String>,
    pub soa_edit_api: Option<String>,
    pub api_rectify: bool,
    pub account: Option<String>,
    pub nameservers: Vec<String>, // ["ns1.example.net.", "ns2.example.net."]
}

impl ZoneOptions {
    pub(crate) fn into_zone(self, domain: &str, kind: ZoneKind) -> Zone {
        let name = canonicalize(domain);
        let (nsec3param, nsec3narrow) = if self.dnssec {
            (self.nsec3param.filter(|p| !p.is_empty()), Some(self.nsec3narrow))
        } else {
            (None, None)
        };
        Zone {
            name: Some(name),
            kind: Some(kind),
            dnssec: Some(self.dnssec),
            nsec3param,
            nsec3narrow,
            soa_edit: self.soa_edit.filter(|s| !s.is_empty()),
            soa_edit_api: self.soa_edit_api.filter(|s| !s.is_empty()),
            api_rectify: Some(self.api_rectify),
            account: self.account,
            nameservers: Some(self.nameservers.iter().map(String::as_str).map(canonicalize).collect()),
            ..Zone::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RRset {
    pub name: String, // "www.example.com."
    #[serde(rename = "type")]
    pub rrtype: String, // "A", "NS", ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changetype: Option<ChangeType>, // only when patching
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
}

impl RRset {
    /// An RRset that replaces whatever the zone holds for `(name, rrtype)`.
    pub fn replace<I, S>(name: &str, rrtype: &str, ttl: u32, contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: canonicalize(name),
            rrtype: rrtype.to_ascii_uppercase(),
            ttl: Some(ttl),
            changetype: Some(ChangeType::Replace),
            records: contents.into_iter().map(Record::new).collect(),
            comments: Vec::new(),
        }
    }

    /// An RRset that removes `(name, rrtype)` from the zone.
    pub fn delete(name: &str, rrtype: &str) -> Self {
        Self {
            name: canonicalize(name),
            rrtype: rrtype.to_ascii_uppercase(),
            ttl: None,
            changetype: Some(ChangeType::Delete),
            records: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Ask the server to maintain matching PTR records for every record.
    pub fn with_set_ptr(mut self, set_ptr: bool) -> Self {
        for record in &mut self.records {
            record.set_ptr = Some(set_ptr);
        }
        self
    }

    pub fn with_comment(mut self, comment: Comment) -> Self {
        self.comments.push(comment);
        self
    }

    pub(crate) fn canonicalized(mut self) -> Self {
        self.name = canonicalize(&self.name);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub content: String, // "192.0.2.1" or "ns1.example.net."
    #[serde(default)]
    pub disabled: bool,
    #[serde(rename = "set-ptr", default, skip_serializing_if = "Option::is_none")]
    pub set_ptr: Option<bool>,
}

impl Record {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            disabled: false,
            set_ptr: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub content: String,
    #[serde(default)]
    pub account: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<i64>,
}

/// Body of `PATCH zones/{id}`.
#[derive(Debug, Serialize)]
pub(crate) struct PatchBody<'a> {
    pub rrsets: &'a [RRset],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyResult {
    pub result: Option<String>, // "Notification queued"
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectifyResult {
    pub result: Option<String>, // "Rectified"
}

/// One entry of `GET statistics`, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Statistic {
    #[serde(rename = "StatisticItem")]
    Scalar { name: String, value: String },
    #[serde(rename = "MapStatisticItem")]
    Map {
        name: String,
        value: Vec<SimpleStatistic>,
    },
    #[serde(rename = "RingStatisticItem")]
    Ring {
        name: String,
        #[serde(deserialize_with = "u64_from_string_or_number")]
        size: u64,
        value: Vec<SimpleStatistic>,
    },
}

impl Statistic {
    pub fn name(&self) -> &str {
        match self {
            Statistic::Scalar { name, .. }
            | Statistic::Map { name, .. }
            | Statistic::Ring { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleStatistic {
    pub name: String,
    pub value: String,
}

/// The server sends ring sizes as strings ("10000").
fn u64_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    #[serde(rename = "type")]
    pub server_type: Option<String>, // "Server"
    pub id: Option<String>,          // "localhost"
    pub daemon_type: Option<String>, // "authoritative"
    pub version: Option<String>,
    pub url: Option<String>,
    pub config_url: Option<String>,
    pub zones_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheFlushResult {
    pub count: Option<u64>,
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSetting {
    pub name: String,
    #[serde(rename = "type")]
    pub setting_type: Option<String>, // "ConfigSetting"
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cryptokey {
    #[serde(rename = "type")]
    pub key_type: Option<String>, // "Cryptokey"
    pub id: Option<u64>,
    pub keytype: Option<String>, // "ksk", "zsk", "csk"
    pub active: Option<bool>,
    pub published: Option<bool>,
    pub dnskey: Option<String>,
    pub ds: Option<Vec<String>>,
    pub privatekey: Option<String>,
    pub algorithm: Option<String>,
    pub bits: Option<u32>,
}
