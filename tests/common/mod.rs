//! In-process PowerDNS API stand-in, one per test.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use pdns_client::{ChangeType, ClientConfig, Cryptokey, PowerDnsClient, RRset, Record, Zone, ZoneKind};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::{net::TcpListener, task::JoinHandle};

pub const TEST_API_KEY: &str = "apipw";
pub const TEST_VHOST: &str = "localhost";

pub const STATISTICS_FIXTURE: &str = r#"[
    {"name": "corrupt-packets", "type": "StatisticItem", "value": "0"},
    {"name": "response-by-rcode", "type": "MapStatisticItem", "value": [
        {"name": "foo1", "value": "bar1"}, {"name": "foo2", "value": "bar2"}]},
    {"name": "logmessages", "size": "10000", "type": "RingStatisticItem", "value": [
        {"name": "gmysql Connection successful. Connected to database 'powerdns' on 'mariadb'.", "value": "235"}]}
]"#;

#[derive(Clone)]
struct MockState {
    zones: Arc<Mutex<BTreeMap<String, Zone>>>,
    cryptokeys: Arc<Mutex<BTreeMap<String, Vec<Cryptokey>>>>,
    last_body: Arc<Mutex<Option<Value>>>,
    last_put_body: Arc<Mutex<Option<Value>>>,
    statistics: Arc<String>,
    api_key: Arc<String>,
}

/// A mock server bound to an ephemeral port, shut down on drop.
pub struct MockServer {
    addr: SocketAddr,
    state: MockState,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start() -> Self {
        Self::start_with_statistics(STATISTICS_FIXTURE).await
    }

    pub async fn start_with_statistics(statistics: &str) -> Self {
        let state = MockState {
            zones: Arc::default(),
            cryptokeys: Arc::default(),
            last_body: Arc::default(),
            last_put_body: Arc::default(),
            statistics: Arc::new(statistics.to_string()),
            api_key: Arc::new(TEST_API_KEY.to_string()),
        };

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");
        let app = router(state.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server crashed");
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn config(&self) -> ClientConfig {
        self.config_with_key(TEST_API_KEY)
    }

    pub fn config_with_key(&self, api_key: &str) -> ClientConfig {
        ClientConfig::new(
            "http",
            self.addr.ip().to_string(),
            self.addr.port(),
            TEST_VHOST,
            api_key,
        )
    }

    pub fn client(&self) -> PowerDnsClient {
        PowerDnsClient::new(self.config()).expect("client")
    }

    pub fn client_with_key(&self, api_key: &str) -> PowerDnsClient {
        PowerDnsClient::new(self.config_with_key(api_key)).expect("client")
    }

    /// Seed a zone directly, bypassing the API.
    pub fn insert_zone(&self, name: &str, kind: ZoneKind) -> Zone {
        let zone = stored_zone(
            Zone {
                name: Some(name.to_string()),
                kind: Some(kind),
                nameservers: Some(vec!["ns1.example.net.".into()]),
                ..Zone::default()
            },
            name,
        );
        self.state
            .zones
            .lock()
            .unwrap()
            .insert(name.to_string(), zone.clone());
        zone
    }

    pub fn zone(&self, name: &str) -> Option<Zone> {
        self.state.zones.lock().unwrap().get(name).cloned()
    }

    /// JSON body of the last PUT/PATCH the server received.
    pub fn last_body(&self) -> Option<Value> {
        self.state.last_body.lock().unwrap().clone()
    }

    /// JSON body of the last zone PUT, `None` if none was received.
    pub fn last_put_body(&self) -> Option<Value> {
        self.state.last_put_body.lock().unwrap().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A client pointed at a port nothing listens on.
pub async fn unreachable_client() -> PowerDnsClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("address").port();
    drop(listener);
    PowerDnsClient::new(ClientConfig::new(
        "http",
        "127.0.0.1",
        port,
        TEST_VHOST,
        TEST_API_KEY,
    ))
    .expect("client")
}

/// A client whose hostname cannot form a valid URL.
pub fn malformed_host_client() -> PowerDnsClient {
    PowerDnsClient::new(ClientConfig::new(
        "http",
        "exa mple",
        8081,
        TEST_VHOST,
        TEST_API_KEY,
    ))
    .expect("client")
}

fn router(state: MockState) -> Router {
    Router::new()
        .route("/api/v1/servers", get(list_servers))
        .route("/api/v1/servers/{vhost}", get(get_server))
        .route("/api/v1/servers/slow", get(slow_server))
        .route("/api/v1/servers/{vhost}/config", get(list_config))
        .route("/api/v1/servers/{vhost}/cache/flush", put(cache_flush))
        .route("/api/v1/servers/{vhost}/statistics", get(statistics))
        .route(
            "/api/v1/servers/{vhost}/zones",
            get(list_zones).post(create_zone),
        )
        .route(
            "/api/v1/servers/{vhost}/zones/{zone_id}",
            get(get_zone)
                .put(change_zone)
                .patch(patch_zone)
                .delete(delete_zone),
        )
        .route("/api/v1/servers/{vhost}/zones/{zone_id}/notify", put(notify_zone))
        .route("/api/v1/servers/{vhost}/zones/{zone_id}/export", get(export_zone))
        .route("/api/v1/servers/{vhost}/zones/{zone_id}/rectify", put(rectify_zone))
        .route(
            "/api/v1/servers/{vhost}/zones/{zone_id}/cryptokeys",
            get(list_cryptokeys),
        )
        .route(
            "/api/v1/servers/{vhost}/zones/{zone_id}/cryptokeys/{key_id}",
            get(get_cryptokey).delete(delete_cryptokey),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

async fn require_api_key(State(state): State<MockState>, req: Request, next: Next) -> Response {
    let key = req
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());
    if key != Some(state.api_key.as_str()) {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    next.run(req).await
}

fn pdns_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn not_found(zone_id: &str) -> Response {
    pdns_error(
        StatusCode::NOT_FOUND,
        format!("Could not find domain '{zone_id}'"),
    )
}

fn server_json() -> Value {
    json!({
        "type": "Server",
        "id": TEST_VHOST,
        "daemon_type": "authoritative",
        "version": "4.9.0",
        "url": "/api/v1/servers/localhost",
        "config_url": "/api/v1/servers/localhost/config{/config_setting}",
        "zones_url": "/api/v1/servers/localhost/zones{/zone}"
    })
}

fn stored_zone(mut zone: Zone, name: &str) -> Zone {
    let kind = zone.kind.unwrap_or(ZoneKind::Native);
    let nameservers = zone.nameservers.take().unwrap_or_default();
    let primary = nameservers
        .first()
        .cloned()
        .unwrap_or_else(|| "a.misconfigured.dns.server.invalid.".into());

    let mut rrsets = Vec::new();
    if kind != ZoneKind::Slave {
        rrsets.push(RRset {
            name: name.to_string(),
            rrtype: "SOA".into(),
            ttl: Some(3600),
            changetype: None,
            records: vec![Record::new(format!(
                "{primary} hostmaster.{name} 1 10800 3600 604800 3600"
            ))],
            comments: Vec::new(),
        });
        if !nameservers.is_empty() {
            rrsets.push(RRset {
                name: name.to_string(),
                rrtype: "NS".into(),
                ttl: Some(3600),
                changetype: None,
                records: nameservers.iter().map(Record::new).collect(),
                comments: Vec::new(),
            });
        }
    }

    Zone {
        id: Some(name.to_string()),
        name: Some(name.to_string()),
        zone_type: Some("Zone".into()),
        url: Some(format!("/api/v1/servers/{TEST_VHOST}/zones/{name}")),
        kind: Some(kind),
        rrsets: Some(rrsets),
        serial: Some(1),
        notified_serial: Some(0),
        edited_serial: Some(1),
        dnssec: Some(zone.dnssec.unwrap_or(false)),
        nameservers: None,
        ..zone
    }
}

async fn slow_server() -> Json<Value> {
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;
    Json(server_json())
}

async fn list_servers() -> Json<Value> {
    Json(json!([server_json()]))
}

async fn get_server(Path(vhost): Path<String>) -> Response {
    if vhost != TEST_VHOST {
        return pdns_error(StatusCode::NOT_FOUND, "Not Found");
    }
    Json(server_json()).into_response()
}

async fn list_config() -> Json<Value> {
    Json(json!([
        {"name": "webserver-port", "type": "ConfigSetting", "value": "8081"},
        {"name": "api", "type": "ConfigSetting", "value": "yes"}
    ]))
}

#[derive(Deserialize)]
struct FlushQuery {
    domain: String,
}

async fn cache_flush(Query(query): Query<FlushQuery>) -> Response {
    if !query.domain.ends_with('.') {
        return pdns_error(StatusCode::UNPROCESSABLE_ENTITY, "domain is not canonical");
    }
    Json(json!({"count": 1, "result": "Flushed cache."})).into_response()
}

#[derive(Deserialize)]
struct StatisticQuery {
    statistic: Option<String>,
}

async fn statistics(State(state): State<MockState>, Query(query): Query<StatisticQuery>) -> Response {
    let Some(name) = query.statistic else {
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            state.statistics.to_string(),
        )
            .into_response();
    };

    let all: Vec<Value> = serde_json::from_str(&state.statistics).unwrap_or_default();
    let matching: Vec<Value> = all.into_iter().filter(|s| s["name"] == name.as_str()).collect();
    if matching.is_empty() {
        return pdns_error(StatusCode::UNPROCESSABLE_ENTITY, "Unknown statistic name");
    }
    Json(matching).into_response()
}

async fn list_zones(State(state): State<MockState>) -> Json<Vec<Zone>> {
    let zones = state.zones.lock().unwrap();
    Json(
        zones
            .values()
            .map(|z| Zone {
                rrsets: None,
                ..z.clone()
            })
            .collect(),
    )
}

async fn create_zone(State(state): State<MockState>, Json(zone): Json<Zone>) -> Response {
    let Some(name) = zone.name.clone() else {
        return pdns_error(StatusCode::UNPROCESSABLE_ENTITY, "Zone name is required");
    };
    if !name.ends_with('.') {
        return pdns_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("DNS Name '{name}' is not canonical"),
        );
    }
    if zone.kind == Some(ZoneKind::Slave) && zone.masters.as_ref().is_none_or(|m| m.is_empty()) {
        return pdns_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Slave zones need at least one master",
        );
    }

    let mut zones = state.zones.lock().unwrap();
    if zones.contains_key(&name) {
        return pdns_error(
            StatusCode::CONFLICT,
            format!("Domain '{name}' already exists"),
        );
    }

    let stored = stored_zone(zone, &name);
    if stored.dnssec == Some(true) {
        state.cryptokeys.lock().unwrap().insert(
            name.clone(),
            vec![Cryptokey {
                key_type: Some("Cryptokey".into()),
                id: Some(1),
                keytype: Some("csk".into()),
                active: Some(true),
                published: Some(true),
                dnskey: Some("257 3 13 mdsswUyr3DPW132mOi8V9xESWE8jTo0d".into()),
                ds: Some(vec![format!("{name} IN DS 1 13 2 abcdef")]),
                privatekey: None,
                algorithm: Some("ECDSAP256SHA256".into()),
                bits: Some(256),
            }],
        );
    }
    zones.insert(name, stored.clone());
    (StatusCode::CREATED, Json(stored)).into_response()
}

#[derive(Deserialize)]
struct RRsetFilter {
    rrset_name: Option<String>,
    rrset_type: Option<String>,
}

async fn get_zone(
    State(state): State<MockState>,
    Path((_vhost, zone_id)): Path<(String, String)>,
    Query(filter): Query<RRsetFilter>,
) -> Response {
    let zones = state.zones.lock().unwrap();
    let Some(zone) = zones.get(&zone_id) else {
        return not_found(&zone_id);
    };

    let mut zone = zone.clone();
    if let Some(rrsets) = zone.rrsets.as_mut() {
        rrsets.retain(|rr| {
            filter.rrset_name.as_ref().is_none_or(|n| rr.name.eq_ignore_ascii_case(n))
                && filter.rrset_type.as_ref().is_none_or(|t| &rr.rrtype == t)
        });
    }
    Json(zone).into_response()
}

async fn change_zone(
    State(state): State<MockState>,
    Path((_vhost, zone_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    *state.last_body.lock().unwrap() = Some(body.clone());
    *state.last_put_body.lock().unwrap() = Some(body.clone());
    let change: Zone = match serde_json::from_value(body) {
        Ok(change) => change,
        Err(e) => return pdns_error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let mut zones = state.zones.lock().unwrap();
    let Some(zone) = zones.get_mut(&zone_id) else {
        return not_found(&zone_id);
    };

    if let Some(kind) = change.kind {
        zone.kind = Some(kind);
    }
    if change.masters.is_some() {
        zone.masters = change.masters;
    }
    if change.account.is_some() {
        zone.account = change.account;
    }
    if change.soa_edit.is_some() {
        zone.soa_edit = change.soa_edit;
    }
    if change.soa_edit_api.is_some() {
        zone.soa_edit_api = change.soa_edit_api;
    }
    if change.api_rectify.is_some() {
        zone.api_rectify = change.api_rectify;
    }
    if change.dnssec.is_some() {
        zone.dnssec = change.dnssec;
    }
    if change.nsec3param.is_some() {
        zone.nsec3param = change.nsec3param;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn patch_zone(
    State(state): State<MockState>,
    Path((_vhost, zone_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    *state.last_body.lock().unwrap() = Some(body.clone());
    let rrsets: Vec<RRset> = match serde_json::from_value(body["rrsets"].clone()) {
        Ok(rrsets) => rrsets,
        Err(e) => return pdns_error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let mut zones = state.zones.lock().unwrap();
    let Some(zone) = zones.get_mut(&zone_id) else {
        return not_found(&zone_id);
    };

    let suffix = format!(".{zone_id}");
    for rrset in &rrsets {
        if rrset.name != zone_id && !rrset.name.ends_with(&suffix) {
            return pdns_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("RRset {} IN {}: Name is out of zone", rrset.name, rrset.rrtype),
            );
        }
        if rrset.changetype.is_none() {
            return pdns_error(StatusCode::UNPROCESSABLE_ENTITY, "Changetype not set");
        }
    }

    let existing = zone.rrsets.get_or_insert_with(Vec::new);
    for rrset in rrsets {
        existing.retain(|rr| !(rr.name == rrset.name && rr.rrtype == rrset.rrtype));
        if rrset.changetype == Some(ChangeType::Replace) && !rrset.records.is_empty() {
            existing.push(RRset {
                changetype: None,
                ..rrset
            });
        }
    }
    zone.serial = zone.serial.map(|s| s + 1);
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_zone(
    State(state): State<MockState>,
    Path((_vhost, zone_id)): Path<(String, String)>,
) -> Response {
    if state.zones.lock().unwrap().remove(&zone_id).is_none() {
        return not_found(&zone_id);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn notify_zone(
    State(state): State<MockState>,
    Path((_vhost, zone_id)): Path<(String, String)>,
) -> Response {
    let zones = state.zones.lock().unwrap();
    let Some(zone) = zones.get(&zone_id) else {
        return not_found(&zone_id);
    };
    if !matches!(zone.kind, Some(ZoneKind::Master | ZoneKind::Slave)) {
        return pdns_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Domain '{zone_id}' is not a master or slave"),
        );
    }
    Json(json!({"result": "Notification queued"})).into_response()
}

async fn export_zone(
    State(state): State<MockState>,
    Path((_vhost, zone_id)): Path<(String, String)>,
) -> Response {
    let zones = state.zones.lock().unwrap();
    let Some(zone) = zones.get(&zone_id) else {
        return not_found(&zone_id);
    };

    let mut text = String::new();
    for rrset in zone.rrsets.iter().flatten() {
        for record in &rrset.records {
            text.push_str(&format!(
                "{}\t{}\tIN\t{}\t{}\n",
                rrset.name,
                rrset.ttl.unwrap_or(3600),
                rrset.rrtype,
                record.content
            ));
        }
    }
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], text).into_response()
}

async fn rectify_zone(
    State(state): State<MockState>,
    Path((_vhost, zone_id)): Path<(String, String)>,
) -> Response {
    if !state.zones.lock().unwrap().contains_key(&zone_id) {
        return not_found(&zone_id);
    }
    Json(json!({"result": "Rectified"})).into_response()
}

async fn list_cryptokeys(
    State(state): State<MockState>,
    Path((_vhost, zone_id)): Path<(String, String)>,
) -> Response {
    if !state.zones.lock().unwrap().contains_key(&zone_id) {
        return not_found(&zone_id);
    }
    let keys = state.cryptokeys.lock().unwrap();
    Json(keys.get(&zone_id).cloned().unwrap_or_default()).into_response()
}

async fn get_cryptokey(
    State(state): State<MockState>,
    Path((_vhost, zone_id, key_id)): Path<(String, String, u64)>,
) -> Response {
    let keys = state.cryptokeys.lock().unwrap();
    let found = keys
        .get(&zone_id)
        .and_then(|keys| keys.iter().find(|k| k.id == Some(key_id)));
    match found {
        Some(key) => Json(Cryptokey {
            privatekey: Some("Private-key-format: v1.2\nAlgorithm: 13 (ECDSAP256SHA256)\n".into()),
            ..key.clone()
        })
        .into_response(),
        None => pdns_error(StatusCode::NOT_FOUND, "Could not find cryptokey"),
    }
}

async fn delete_cryptokey(
    State(state): State<MockState>,
    Path((_vhost, zone_id, key_id)): Path<(String, String, u64)>,
) -> Response {
    let mut keys = state.cryptokeys.lock().unwrap();
    let Some(zone_keys) = keys.get_mut(&zone_id) else {
        return not_found(&zone_id);
    };
    let before = zone_keys.len();
    zone_keys.retain(|k| k.id != Some(key_id));
    if zone_keys.len() == before {
        return pdns_error(StatusCode::NOT_FOUND, "Could not find cryptokey");
    }
    StatusCode::NO_CONTENT.into_response()
}
