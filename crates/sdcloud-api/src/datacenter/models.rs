// CloudAPI / NetworkAPI response models
//
// Fields use `#[serde(default)]` liberally because the API is
// inconsistent about field presence across datacenter versions;
// undocumented fields land in `extra`.

use serde::{Deserialize, Serialize};

// ── Network ──────────────────────────────────────────────────────────

/// Network object from `GET /:login/networks/:id`.
///
/// The wire field for the lifecycle state is `status`; it is exposed as
/// `state` to match the rest of the crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkData {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub subnet: Option<String>,
    #[serde(default)]
    pub resolver_ips: Vec<String>,
    #[serde(default)]
    pub private_gw_ip: Option<String>,
    #[serde(default)]
    pub public_gw_ip: Option<String>,
    #[serde(default, rename = "status")]
    pub state: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl NetworkData {
    /// Look up a field by wire name as a string, for local search filters.
    pub(crate) fn field_str(&self, field: &str) -> Option<&str> {
        match field {
            "id" => Some(&self.id),
            "name" => self.name.as_deref(),
            "subnet" => self.subnet.as_deref(),
            "private_gw_ip" => self.private_gw_ip.as_deref(),
            "public_gw_ip" => self.public_gw_ip.as_deref(),
            "status" | "state" => self.state.as_deref(),
            other => self.extra.get(other).and_then(serde_json::Value::as_str),
        }
    }
}

// ── Machine ──────────────────────────────────────────────────────────

/// Machine object from `GET /:login/machines/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineData {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub ips: Vec<String>,
    /// Memory in MiB.
    #[serde(default)]
    pub memory: Option<u64>,
    /// Disk in MiB.
    #[serde(default)]
    pub disk: Option<u64>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub package: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MachineData {
    /// Look up a field by wire name as a string, for local search filters.
    pub(crate) fn field_str(&self, field: &str) -> Option<&str> {
        match field {
            "id" => Some(&self.id),
            "name" => self.name.as_deref(),
            "state" | "status" => self.state.as_deref(),
            "created" => self.created.as_deref(),
            "image" => self.image.as_deref(),
            "package" => self.package.as_deref(),
            other => self.extra.get(other).and_then(serde_json::Value::as_str),
        }
    }
}

// ── Identifier polymorphism ──────────────────────────────────────────

/// Anything that can stand in for a network identifier: a bare id
/// string, a raw [`NetworkData`] object, or an existing proxy.
pub trait NetworkRef {
    fn network_id(&self) -> &str;
}

impl NetworkRef for str {
    fn network_id(&self) -> &str {
        self
    }
}

impl NetworkRef for String {
    fn network_id(&self) -> &str {
        self
    }
}

impl NetworkRef for NetworkData {
    fn network_id(&self) -> &str {
        &self.id
    }
}

/// Anything that can stand in for a machine identifier.
pub trait MachineRef {
    fn machine_id(&self) -> &str;
}

impl MachineRef for str {
    fn machine_id(&self) -> &str {
        self
    }
}

impl MachineRef for String {
    fn machine_id(&self) -> &str {
        self
    }
}

impl MachineRef for MachineData {
    fn machine_id(&self) -> &str {
        &self.id
    }
}
