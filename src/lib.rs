//! Typed async client for the PowerDNS Authoritative HTTP API.
//!
//! ```no_run
//! use pdns_client::{ClientConfig, PowerDnsClient, ZoneOptions};
//!
//! # async fn run() -> pdns_client::Result<()> {
//! let config = ClientConfig::new("http", "127.0.0.1", 8081, "localhost", "secret");
//! let pdns = PowerDnsClient::new(config)?;
//!
//! let zone = pdns
//!     .zones()
//!     .add_native("example.com", ZoneOptions {
//!         nameservers: vec!["ns1.example.net.".into()],
//!         ..ZoneOptions::default()
//!     })
//!     .await?;
//! pdns.records()
//!     .add("example.com", "www.example.com", "A", 300, ["192.0.2.1"])
//!     .await?;
//! # let _ = zone;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod powerdns;
pub mod validation;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use powerdns::client::PowerDnsClient;
pub use powerdns::types::{
    CacheFlushResult, ChangeType, Comment, ConfigSetting, Cryptokey, NotifyResult, RRset, Record,
    RectifyResult, Server, SimpleStatistic, Statistic, Zone, ZoneKind, ZoneOptions,
};
pub use validation::canonicalize;
