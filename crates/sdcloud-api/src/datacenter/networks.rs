// NetworkAPI endpoints
//
// Network CRUD on the datacenter, plus the local regex filter for
// listings. The single-network lookup deliberately returns the raw
// object while the listing returns proxies; that asymmetry mirrors the
// remote API's own conventions and is part of the public contract.

use regex::Regex;
use tracing::debug;

use crate::datacenter::DataCenter;
use crate::datacenter::models::{NetworkData, NetworkRef};
use crate::error::Error;
use crate::network::Network;
use crate::validate;

impl DataCenter {
    /// Provision a new network and wrap the response in a proxy.
    ///
    /// `POST /:login/networks`
    ///
    /// `name` is 1-32 letters, digits, and hyphens; `subnet` is a
    /// dotted-quad CIDR. Both are validated locally before any request
    /// is issued. `resolver_ips` falls back to the datacenter default
    /// resolvers when omitted.
    pub async fn create_network(
        &self,
        name: &str,
        subnet: &str,
        resolver_ips: Option<&[&str]>,
    ) -> Result<Network<'_>, Error> {
        let mut violations = Vec::new();
        if !validate::resource_name(name) {
            violations.push(format!(
                "illegal network name {name:?} (1-32 letters, digits, hyphens)"
            ));
        }
        if !validate::cidr(subnet) {
            violations.push(format!("illegal subnet {subnet:?} (want a.b.c.d/n)"));
        }
        if !violations.is_empty() {
            return Err(Error::invalid_argument(violations.join("; ")));
        }

        let mut body = serde_json::Map::new();
        body.insert("name".into(), serde_json::Value::String(name.to_owned()));
        body.insert("subnet".into(), serde_json::Value::String(subnet.to_owned()));
        if let Some(ips) = resolver_ips {
            body.insert(
                "resolver_ips".into(),
                serde_json::Value::from(ips.to_vec()),
            );
        }

        let url = self.api_url("networks");
        debug!(name, subnet, "creating network");
        let data: NetworkData = self.post(url, &serde_json::Value::Object(body)).await?;
        Network::from_data(self, data)
    }

    /// Fetch the raw object for a single network.
    ///
    /// `GET /:login/networks/:id`
    ///
    /// Primarily used internally by [`Network`] fetch and refresh paths.
    pub async fn raw_network_data(&self, id: &str) -> Result<NetworkData, Error> {
        let url = self.api_url(&format!("networks/{id}"));
        debug!(id, "fetching network");
        self.get(url).await
    }

    /// List networks, optionally filtered locally.
    ///
    /// `GET /:login/networks`
    ///
    /// When `search` is given, it is compiled as a regex and an entry
    /// survives if the regex matches any of the named `fields` (default:
    /// `name`). A malformed pattern fails with `InvalidArgument` before
    /// any request is issued. The filter runs client-side; server order
    /// is preserved.
    pub async fn networks(
        &self,
        search: Option<&str>,
        fields: Option<&[&str]>,
    ) -> Result<Vec<Network<'_>>, Error> {
        let filter = search
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    Error::invalid_argument(format!("bad search pattern {pattern:?}: {e}"))
                })
            })
            .transpose()?;

        let url = self.api_url("networks");
        debug!(?search, "listing networks");
        let entries: Vec<NetworkData> = self.get(url).await?;

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
            .map(|data| Network::from_data(self, data))
            .collect()
    }

    /// Fetch one network as a raw object (not a proxy).
    ///
    /// `GET /:login/networks/:id`
    ///
    /// Accepts a bare id, a [`NetworkData`], or an existing [`Network`]
    /// proxy. Unlike [`networks`](Self::networks) this returns the raw
    /// decoded body; see the module docs for why the asymmetry stays.
    pub async fn network<R: NetworkRef + ?Sized>(
        &self,
        identifier: &R,
    ) -> Result<NetworkData, Error> {
        self.raw_network_data(identifier.network_id()).await
    }
}
