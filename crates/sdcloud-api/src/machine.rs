// Machine resource proxy
//
// Same snapshot discipline as the network proxy: one fetch replaces the
// whole snapshot, staleness is explicit, and the remote service is the
// only authority on state transitions. Lifecycle actions are fire-and-
// forget from the client's perspective -- pair them with `poll_until` to
// wait for the transition.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::datacenter::DataCenter;
use crate::datacenter::models::{MachineData, MachineRef};
use crate::error::Error;

/// The descriptive fields captured from one fetch; replaced wholesale
/// on every refresh.
#[derive(Debug, Clone, Default)]
pub struct MachineSnapshot {
    pub name: Option<String>,
    pub state: Option<String>,
    pub ips: Vec<String>,
    pub memory: Option<u64>,
    pub disk: Option<u64>,
    pub created: Option<String>,
    pub image: Option<String>,
    pub package: Option<String>,
}

/// Local proxy for a remote machine.
///
/// Equality is by id only; see [`Network`](crate::network::Network) for
/// the shared identity rules.
pub struct Machine<'dc> {
    datacenter: &'dc DataCenter,
    id: String,
    snapshot: MachineSnapshot,
}

impl<'dc> Machine<'dc> {
    /// Fetch a machine by id and wrap it in a proxy (eager fetch).
    ///
    /// `GET /:login/machines/:id`
    pub async fn get(datacenter: &'dc DataCenter, id: &str) -> Result<Self, Error> {
        let data = datacenter.raw_machine_data(id).await?;
        Self::from_data(datacenter, data)
    }

    /// Wrap already-fetched data without touching the network.
    pub fn from_data(datacenter: &'dc DataCenter, data: MachineData) -> Result<Self, Error> {
        if data.id.is_empty() {
            return Err(Error::invalid_argument("machine data carries no id"));
        }
        let mut machine = Self {
            datacenter,
            id: data.id.clone(),
            snapshot: MachineSnapshot::default(),
        };
        machine.save(data);
        Ok(machine)
    }

    fn save(&mut self, data: MachineData) {
        self.snapshot = MachineSnapshot {
            name: data.name,
            state: data.state,
            ips: data.ips,
            memory: data.memory,
            disk: data.disk,
            created: data.created,
            image: data.image,
            package: data.package,
        };
    }

    fn path(&self) -> String {
        format!("machines/{}", self.id)
    }

    // ── Snapshot accessors (read-only) ───────────────────────────────

    /// Unique identifier; never changes after construction.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.snapshot.name.as_deref()
    }

    /// Last-known lifecycle state; a snapshot, not a live value.
    pub fn state(&self) -> Option<&str> {
        self.snapshot.state.as_deref()
    }

    pub fn ips(&self) -> &[String] {
        &self.snapshot.ips
    }

    /// Memory in MiB, per the last fetch.
    pub fn memory(&self) -> Option<u64> {
        self.snapshot.memory
    }

    /// Disk in MiB, per the last fetch.
    pub fn disk(&self) -> Option<u64> {
        self.snapshot.disk
    }

    pub fn created(&self) -> Option<&str> {
        self.snapshot.created.as_deref()
    }

    pub fn image(&self) -> Option<&str> {
        self.snapshot.image.as_deref()
    }

    pub fn package(&self) -> Option<&str> {
        self.snapshot.package.as_deref()
    }

    /// The datacenter this proxy routes requests through.
    pub fn datacenter(&self) -> &'dc DataCenter {
        self.datacenter
    }

    // ── Remote operations ────────────────────────────────────────────

    /// Re-fetch the machine and replace the local snapshot.
    ///
    /// `GET /:login/machines/:id`
    pub async fn refresh(&mut self) -> Result<(), Error> {
        let data = self.datacenter.raw_machine_data(&self.id).await?;
        self.save(data);
        Ok(())
    }

    /// Refresh, then return the current state. Always a round trip.
    ///
    /// `GET /:login/machines/:id`
    pub async fn status(&mut self) -> Result<String, Error> {
        self.refresh().await?;
        self.snapshot.state.clone().ok_or_else(|| Error::MalformedResponse {
            message: format!("machine {} response carries no state field", self.id),
        })
    }

    /// Stop a running machine.
    ///
    /// `POST /:login/machines/:id?action=stop`
    pub async fn stop(&self) -> Result<(), Error> {
        self.action("stop").await
    }

    /// Start a stopped machine.
    ///
    /// `POST /:login/machines/:id?action=start`
    pub async fn start(&self) -> Result<(), Error> {
        self.action("start").await
    }

    /// Reboot a running machine.
    ///
    /// `POST /:login/machines/:id?action=reboot`
    pub async fn reboot(&self) -> Result<(), Error> {
        self.action("reboot").await
    }

    async fn action(&self, action: &str) -> Result<(), Error> {
        let mut url = self.datacenter.api_url(&self.path());
        url.query_pairs_mut().append_pair("action", action);
        debug!(machine = %self.id, action, "machine action");
        self.datacenter.post_action(url).await
    }

    /// Initiate deletion of a stopped machine. No local state change;
    /// discard the proxy after a successful delete.
    ///
    /// `DELETE /:login/machines/:id`
    pub async fn delete(&self) -> Result<(), Error> {
        let url = self.datacenter.api_url(&self.path());
        self.datacenter.delete(url).await
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Poll [`status`](Self::status) every `interval` until it equals
    /// `target`. Timeout and cancellation semantics match
    /// [`Network::poll_until`](crate::network::Network::poll_until):
    /// `None` loops forever by design, `Some` yields
    /// [`Error::PollTimeout`].
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
            debug!(machine = %self.id, current, "polling");
            sleep(interval).await;
        }
    }
}

// ── Identity ─────────────────────────────────────────────────────────

impl fmt::Display for Machine<'_> {
    /// A `Machine` displays as its unique id.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for Machine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Machine {{ id: {}, name: {:?}, datacenter: {} }}",
            self.id, self.snapshot.name, self.datacenter
        )
    }
}

impl PartialEq for Machine<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Machine<'_> {}

impl PartialEq<MachineData> for Machine<'_> {
    fn eq(&self, other: &MachineData) -> bool {
        self.id == other.id
    }
}

impl Hash for Machine<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl MachineRef for Machine<'_> {
    fn machine_id(&self) -> &str {
        &self.id
    }
}
