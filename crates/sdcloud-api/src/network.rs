// Network resource proxy
//
// A `Network` mirrors the last-fetched state of a remote NetworkAPI
// subnet. It never manages the snapshot behind the caller's back:
// `refresh()` (and the methods built on it) is the only thing that
// rewrites local state, and it replaces the whole snapshot from a
// single response -- fields are never patched individually.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::datacenter::DataCenter;
use crate::datacenter::models::{NetworkData, NetworkRef};
use crate::error::Error;
use crate::rules::{InboundRule, NewInboundRule};

/// The descriptive fields captured from one fetch.
///
/// Replaced wholesale on every refresh; a snapshot is only as fresh as
/// the last round trip, and staleness is the caller's problem until
/// [`Network::refresh`] or [`Network::status`] is called.
#[derive(Debug, Clone, Default)]
pub struct NetworkSnapshot {
    pub name: Option<String>,
    pub subnet: Option<String>,
    pub resolver_ips: Vec<String>,
    pub private_gw_ip: Option<String>,
    pub public_gw_ip: Option<String>,
    pub state: Option<String>,
}

/// Local proxy for a remote network.
///
/// Holds the network's immutable id plus a [`NetworkSnapshot`], and
/// routes every operation through the borrowed [`DataCenter`]. Two
/// proxies are equal iff their ids are equal; a proxy may also be
/// compared against a raw [`NetworkData`]. Multiple proxies for the same
/// remote id carry no consistency guarantee between them -- the remote
/// service is the source of truth.
pub struct Network<'dc> {
    datacenter: &'dc DataCenter,
    id: String,
    snapshot: NetworkSnapshot,
}

impl<'dc> Network<'dc> {
    /// Fetch a network by id and wrap it in a proxy (eager fetch).
    ///
    /// `GET /:login/networks/:id`
    pub async fn get(datacenter: &'dc DataCenter, id: &str) -> Result<Self, Error> {
        let data = datacenter.raw_network_data(id).await?;
        Self::from_data(datacenter, data)
    }

    /// Wrap already-fetched data without touching the network.
    ///
    /// Identity comes from `data.id`; an empty id is rejected.
    pub fn from_data(datacenter: &'dc DataCenter, data: NetworkData) -> Result<Self, Error> {
        if data.id.is_empty() {
            return Err(Error::invalid_argument("network data carries no id"));
        }
        let mut network = Self {
            datacenter,
            id: data.id.clone(),
            snapshot: NetworkSnapshot::default(),
        };
        network.save(data);
        Ok(network)
    }

    /// Commit one response's fields as the new snapshot, atomically.
    fn save(&mut self, data: NetworkData) {
        self.snapshot = NetworkSnapshot {
            name: data.name,
            subnet: data.subnet,
            resolver_ips: data.resolver_ips,
            private_gw_ip: data.private_gw_ip,
            public_gw_ip: data.public_gw_ip,
            state: data.state,
        };
    }

    fn path(&self) -> String {
        format!("networks/{}", self.id)
    }

    // ── Snapshot accessors (read-only) ───────────────────────────────

    /// Unique identifier; never changes after construction.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable label, per the last fetch.
    pub fn name(&self) -> Option<&str> {
        self.snapshot.name.as_deref()
    }

    /// Private subnet (CIDR), per the last fetch.
    pub fn subnet(&self) -> Option<&str> {
        self.snapshot.subnet.as_deref()
    }

    /// DNS resolver IPs, per the last fetch.
    pub fn resolver_ips(&self) -> &[String] {
        &self.snapshot.resolver_ips
    }

    /// Private IP of the subnet gateway, per the last fetch.
    pub fn private_gw_ip(&self) -> Option<&str> {
        self.snapshot.private_gw_ip.as_deref()
    }

    /// Public IP of the subnet gateway, per the last fetch.
    pub fn public_gw_ip(&self) -> Option<&str> {
        self.snapshot.public_gw_ip.as_deref()
    }

    /// Last-known lifecycle state. A snapshot value, not a live one --
    /// may be stale until [`refresh`](Self::refresh) or
    /// [`status`](Self::status) is called.
    pub fn state(&self) -> Option<&str> {
        self.snapshot.state.as_deref()
    }

    /// The datacenter this proxy routes requests through.
    pub fn datacenter(&self) -> &'dc DataCenter {
        self.datacenter
    }

    // ── Remote operations ────────────────────────────────────────────

    /// Re-fetch the network and replace the local snapshot.
    ///
    /// `GET /:login/networks/:id`
    pub async fn refresh(&mut self) -> Result<(), Error> {
        let data = self.datacenter.raw_network_data(&self.id).await?;
        self.save(data);
        Ok(())
    }

    /// Refresh, then return the current status.
    ///
    /// `GET /:login/networks/:id`
    ///
    /// Always a network round trip -- never a cached value. A body with
    /// no `status` field is a malformed response.
    pub async fn status(&mut self) -> Result<String, Error> {
        self.refresh().await?;
        self.snapshot.state.clone().ok_or_else(|| Error::MalformedResponse {
            message: format!("network {} response carries no status field", self.id),
        })
    }

    /// Initiate deletion of an empty network.
    ///
    /// `DELETE /:login/networks/:id`
    ///
    /// Fails on any non-success status (e.g. the network still has
    /// machines). The proxy itself is left untouched; discard it after a
    /// successful delete.
    pub async fn delete(&self) -> Result<(), Error> {
        let url = self.datacenter.api_url(&self.path());
        self.datacenter.delete(url).await
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Poll [`status`](Self::status) every `interval` until it equals
    /// `target`, returning the final status.
    ///
    /// With `timeout: None` this loops forever if `target` is never
    /// reached; that unbounded default matches the remote API's
    /// documented client behavior and is intentional. Pass a timeout to
    /// get [`Error::PollTimeout`] instead; dropping the returned future
    /// cancels the loop at its next await point. Errors from the
    /// underlying status call propagate immediately.
    pub async fn poll_until(
        &mut self,
        target: &str,
        interval: Duration,
        timeout: Option<Duration>,
    ) -> Result<String, Error> {
        self.poll(target, true, interval, timeout).await
    }

    /// Poll [`status`](Self::status) every `interval` while it still
    /// equals `current`, returning the first status that differs.
    ///
    /// Same timeout and cancellation semantics as
    /// [`poll_until`](Self::poll_until).
    pub async fn poll_while(
        &mut self,
        current: &str,
        interval: Duration,
        timeout: Option<Duration>,
    ) -> Result<String, Error> {
        self.poll(current, false, interval, timeout).await
    }

    async fn poll(
        &mut self,
        status: &str,
        until: bool,
        interval: Duration,
        timeout: Option<Duration>,
    ) -> Result<String, Error> {
        let started = Instant::now();
        let deadline = timeout.map(|t| started + t);
        loop {
            let current = self.status().await?;
            if (current == status) == until {
                return Ok(current);
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(Error::PollTimeout {
                        status: status.to_owned(),
                        waited: started.elapsed(),
                    });
                }
            }
            debug!(network = %self.id, current, "polling");
            sleep(interval).await;
        }
    }

    // ── Outbound PAT ─────────────────────────────────────────────────

    /// Current outbound PAT (Port Address Translation) flag.
    ///
    /// `GET /:login/networks/:id/outbound`
    pub async fn get_outbound(&self) -> Result<bool, Error> {
        let url = self.datacenter.api_url(&format!("{}/outbound", self.path()));
        let body: serde_json::Value = self.datacenter.get(url).await?;
        outbound_flag(&body)
    }

    /// Enable or disable outbound PAT, returning the updated flag as
    /// reported by the server.
    ///
    /// `PUT /:login/networks/:id/outbound`
    pub async fn set_outbound(&self, enabled: bool) -> Result<bool, Error> {
        let url = self.datacenter.api_url(&format!("{}/outbound", self.path()));
        let body: serde_json::Value = self
            .datacenter
            .put(url, &serde_json::json!({ "enabled": enabled }))
            .await?;
        outbound_flag(&body)
    }

    // ── Inbound rules ────────────────────────────────────────────────

    /// List inbound rules as received; no local validation on the read
    /// path.
    ///
    /// `GET /:login/networks/:id/inbound`
    pub async fn get_inbound_rules(&self) -> Result<Vec<InboundRule>, Error> {
        let url = self.datacenter.api_url(&format!("{}/inbound", self.path()));
        self.datacenter.get(url).await
    }

    /// Validate, fill defaults, and submit a new inbound rule, returning
    /// the created rule as decoded from the response.
    ///
    /// `POST /:login/networks/:id/inbound`
    ///
    /// Every constraint is checked locally before any request is issued;
    /// see [`NewInboundRule`] for the defaults.
    pub async fn add_inbound_rule(&self, rule: NewInboundRule) -> Result<InboundRule, Error> {
        let body = rule.into_body()?;
        let url = self.datacenter.api_url(&format!("{}/inbound", self.path()));
        self.datacenter.post(url, &body).await
    }
}

/// Provision a network and wrap it in a proxy.
///
/// Plain-function convenience that delegates to
/// [`DataCenter::create_network`] -- the datacenter, not the proxy,
/// performs the validation and the POST.
pub async fn create_in_datacenter<'dc>(
    datacenter: &'dc DataCenter,
    name: &str,
    subnet: &str,
    resolver_ips: Option<&[&str]>,
) -> Result<Network<'dc>, Error> {
    datacenter.create_network(name, subnet, resolver_ips).await
}

fn outbound_flag(body: &serde_json::Value) -> Result<bool, Error> {
    body.get("enabled")
        .and_then(serde_json::Value::as_bool)
        .ok_or_else(|| Error::MalformedResponse {
            message: format!("outbound response lacks a boolean `enabled` field: {body}"),
        })
}

// ── Identity ─────────────────────────────────────────────────────────

impl fmt::Display for Network<'_> {
    /// A `Network` displays as its unique id.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for Network<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Network {{ id: {}, name: {:?}, datacenter: {} }}",
            self.id, self.snapshot.name, self.datacenter
        )
    }
}

impl PartialEq for Network<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Network<'_> {}

impl PartialEq<NetworkData> for Network<'_> {
    fn eq(&self, other: &NetworkData) -> bool {
        self.id == other.id
    }
}

/// Hashes the raw id string. Ids are opaque here: unlike some older
/// clients, no UUID parse is required, so non-UUID identifiers hash
/// fine.
impl Hash for Network<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl NetworkRef for Network<'_> {
    fn network_id(&self) -> &str {
        &self.id
    }
}
