// sdcloud-api: Async Rust client for SmartDataCenter-style datacenters
// (CloudAPI machines + NetworkAPI networks)

pub mod auth;
pub mod datacenter;
pub mod error;
pub mod machine;
pub mod network;
pub mod rules;
pub mod transport;

mod validate;

pub use auth::Credentials;
pub use datacenter::DataCenter;
pub use datacenter::machines::CreateMachine;
pub use datacenter::models::{MachineData, MachineRef, NetworkData, NetworkRef};
pub use error::Error;
pub use machine::Machine;
pub use network::{Network, create_in_datacenter};
pub use rules::{InboundRule, NewInboundRule, Protocol};
pub use transport::{TlsMode, TransportConfig};
