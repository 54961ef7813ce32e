// CloudAPI machine endpoints
//
// Machine provisioning and lookup, following the same listing/lookup
// split as the network endpoints. Lifecycle actions (stop, start,
// reboot) live on the `Machine` proxy.

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::datacenter::DataCenter;
use crate::datacenter::models::{MachineData, MachineRef};
use crate::error::Error;
use crate::machine::Machine;
use crate::validate;

/// Parameters for provisioning a machine.
///
/// Everything is optional on the wire: the datacenter fills defaults
/// (generated name, default package and image) for absent fields.
/// Provider-specific keys such as tags or metadata go in `extra`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateMachine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DataCenter {
    /// Provision a new machine and wrap the response in a proxy.
    ///
    /// `POST /:login/machines`
    ///
    /// The name, when given, follows the same 1-32 letters/digits/hyphens
    /// rule as network names and is validated before any request.
    pub async fn create_machine(&self, params: CreateMachine) -> Result<Machine<'_>, Error> {
        if let Some(name) = &params.name {
            if !validate::resource_name(name) {
                return Err(Error::invalid_argument(format!(
                    "illegal machine name {name:?} (1-32 letters, digits, hyphens)"
                )));
            }
        }

        let url = self.api_url("machines");
        debug!(name = ?params.name, "creating machine");
        let data: MachineData = self.post(url, &params).await?;
        Machine::from_data(self, data)
    }

    /// Fetch the raw object for a single machine.
    ///
    /// `GET /:login/machines/:id`
    pub async fn raw_machine_data(&self, id: &str) -> Result<MachineData, Error> {
        let url = self.api_url(&format!("machines/{id}"));
        debug!(id, "fetching machine");
        self.get(url).await
    }

    /// List machines, optionally filtered locally.
    ///
    /// `GET /:login/machines`
    ///
    /// Same local filter discipline as
    /// [`networks`](Self::networks): `search` is a regex matched against
    /// the named `fields` (default: `name`), in server order, and a
    /// malformed pattern fails before any request is issued.
    pub async fn machines(
        &self,
        search: Option<&str>,
        fields: Option<&[&str]>,
    ) -> Result<Vec<Machine<'_>>, Error> {
        let filter = search
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    Error::invalid_argument(format!("bad search pattern {pattern:?}: {e}"))
                })
            })
            .transpose()?;

        let url = self.api_url("machines");
        debug!(?search, "listing machines");
        let entries: Vec<MachineData> = self.get(url).await?;

        let surviving = match filter {
            Some(re) => {
                let fields = fields.unwrap_or(&["name"]);
                entries
                    .into_iter()
                    .filter(|entry| {
                        fields
                            .iter()
                            .any(|f| entry.field_str(f).is_some_and(|v| re.is_match(v)))
                    })
                    .collect()
            }
            None => entries,
        };

        surviving
            .into_iter()
            .map(|data| Machine::from_data(self, data))
            .collect()
    }

    /// Fetch one machine as a raw object (not a proxy).
    ///
    /// `GET /:login/machines/:id`
    pub async fn machine<R: MachineRef + ?Sized>(
        &self,
        identifier: &R,
    ) -> Result<MachineData, Error> {
        self.raw_machine_data(identifier.machine_id()).await
    }
}
