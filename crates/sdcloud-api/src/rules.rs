// Inbound rule model and local validation
//
// NetworkAPI inbound rules map an external port range (optionally limited
// to a source subnet) onto an internal destination IP and base port.
// Validation runs entirely client-side before any request is issued, and
// every constraint is checked independently so a caller sees all the
// violations at once instead of fixing them one round-trip at a time.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::validate;

/// Transport protocol selectable on an inbound rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

/// Inbound rule as returned by the API.
///
/// Decoded as received -- no local validation is applied on the read path,
/// and protocols stay plain strings so an unexpected server-side value
/// doesn't fail the whole listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_port: Option<u16>,
    #[serde(default)]
    pub end_port: Option<u16>,
    #[serde(default)]
    pub protocols: Vec<String>,
    #[serde(default)]
    pub source_subnet: Option<String>,
    #[serde(default)]
    pub destination_ip: Option<String>,
    #[serde(default)]
    pub destination_base_port: Option<u16>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Parameters for creating an inbound rule.
///
/// Required fields come in through [`NewInboundRule::new`]; the optional
/// ones default per the NetworkAPI conventions when left as `None`:
/// `end_port` = `start_port`, `protocols` = both tcp and udp,
/// `source_subnet` = `"0.0.0.0/0"`, `destination_base_port` = `start_port`.
///
/// Ports are `u16`, so the 0-65535 bound holds by construction; the
/// remaining constraints (name pattern, `end_port >= start_port`, subnet
/// and destination IP patterns) are checked when the rule is submitted.
#[derive(Debug, Clone)]
pub struct NewInboundRule {
    /// Rule name: 1-32 letters, digits, hyphens, underscores.
    pub name: String,
    /// First external port of the forwarded range.
    pub start_port: u16,
    /// Internal dotted-quad IP the range forwards to.
    pub destination_ip: String,
    /// Last external port of the range; must be >= `start_port`.
    pub end_port: Option<u16>,
    /// Protocols to forward; must not be empty when given.
    pub protocols: Option<Vec<Protocol>>,
    /// External source subnet (dotted-quad CIDR) the rule applies to.
    pub source_subnet: Option<String>,
    /// Internal port the start of the range maps to.
    pub destination_base_port: Option<u16>,
}

impl NewInboundRule {
    /// A rule with the required fields set and every optional field left
    /// to its default.
    pub fn new(name: impl Into<String>, start_port: u16, destination_ip: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_port,
            destination_ip: destination_ip.into(),
            end_port: None,
            protocols: None,
            source_subnet: None,
            destination_base_port: None,
        }
    }

    /// Validate every constraint and fill defaults, producing the body
    /// submitted to the API. All violations are collected before failing.
    pub(crate) fn into_body(self) -> Result<InboundRuleBody, Error> {
        let mut violations = Vec::new();

        if !validate::rule_name(&self.name) {
            violations.push(format!(
                "illegal rule name {:?} (1-32 letters, digits, hyphens, underscores)",
                self.name
            ));
        }
        let end_port = self.end_port.unwrap_or(self.start_port);
        if end_port < self.start_port {
            violations.push(format!(
                "end_port {end_port} is below start_port {}",
                self.start_port
            ));
        }
        if let Some(protocols) = &self.protocols {
            if protocols.is_empty() {
                violations.push("protocols must not be empty".to_owned());
            }
        }
        if let Some(subnet) = &self.source_subnet {
            if !validate::cidr(subnet) {
                violations.push(format!("illegal source subnet {subnet:?} (want a.b.c.d/n)"));
            }
        }
        if !validate::ipv4(&self.destination_ip) {
            violations.push(format!(
                "illegal destination IP {:?} (want a dotted quad)",
                self.destination_ip
            ));
        }

        if !violations.is_empty() {
            return Err(Error::invalid_argument(violations.join("; ")));
        }

        Ok(InboundRuleBody {
            name: self.name,
            start_port: self.start_port,
            end_port,
            protocols: self
                .protocols
                .unwrap_or_else(|| vec![Protocol::Tcp, Protocol::Udp]),
            source_subnet: self
                .source_subnet
                .unwrap_or_else(|| "0.0.0.0/0".to_owned()),
            destination_ip: self.destination_ip,
            destination_base_port: self.destination_base_port.unwrap_or(self.start_port),
        })
    }
}

/// Fully-defaulted rule body as submitted to `POST networks/:id/inbound`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct InboundRuleBody {
    pub name: String,
    pub start_port: u16,
    pub end_port: u16,
    pub protocols: Vec<Protocol>,
    pub source_subnet: String,
    pub destination_ip: String,
    pub destination_base_port: u16,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_from_start_port() {
        let body = NewInboundRule::new("web-http", 80, "10.0.0.5")
            .into_body()
            .unwrap();

        assert_eq!(body.end_port, 80);
        assert_eq!(body.protocols, vec![Protocol::Tcp, Protocol::Udp]);
        assert_eq!(body.source_subnet, "0.0.0.0/0");
        assert_eq!(body.destination_base_port, 80);
    }

    #[test]
    fn explicit_fields_survive() {
        let rule = NewInboundRule {
            end_port: Some(90),
            protocols: Some(vec![Protocol::Tcp]),
            source_subnet: Some("192.168.0.0/16".to_owned()),
            destination_base_port: Some(8080),
            ..NewInboundRule::new("web-http", 80, "10.0.0.5")
        };
        let body = rule.into_body().unwrap();

        assert_eq!(body.end_port, 90);
        assert_eq!(body.protocols, vec![Protocol::Tcp]);
        assert_eq!(body.source_subnet, "192.168.0.0/16");
        assert_eq!(body.destination_base_port, 8080);
    }

    #[test]
    fn bad_name_is_rejected() {
        let err = NewInboundRule::new("bad name!", 80, "10.0.0.5")
            .into_body()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }), "got: {err:?}");
    }

    #[test]
    fn inverted_port_range_is_rejected() {
        let rule = NewInboundRule {
            end_port: Some(79),
            ..NewInboundRule::new("web", 80, "10.0.0.5")
        };
        let err = rule.into_body().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }), "got: {err:?}");
    }

    #[test]
    fn all_violations_are_reported_together() {
        let rule = NewInboundRule {
            end_port: Some(1),
            protocols: Some(vec![]),
            source_subnet: Some("nope".to_owned()),
            ..NewInboundRule::new("bad name!", 80, "not-an-ip")
        };
        let err = rule.into_body().unwrap_err();

        let Error::InvalidArgument { message } = err else {
            panic!("expected InvalidArgument, got: {err:?}");
        };
        assert!(message.contains("rule name"), "{message}");
        assert!(message.contains("end_port"), "{message}");
        assert!(message.contains("protocols"), "{message}");
        assert!(message.contains("source subnet"), "{message}");
        assert!(message.contains("destination IP"), "{message}");
    }

    #[test]
    fn protocol_serializes_lowercase() {
        let json = serde_json::to_string(&vec![Protocol::Tcp, Protocol::Udp]).unwrap();
        assert_eq!(json, r#"["tcp","udp"]"#);
    }
}
