// DataCenter client modules
//
// Hand-written client for the datacenter's login-scoped REST endpoints:
// CloudAPI machines plus the regional NetworkAPI extension. Endpoint
// groups (networks, machines) are implemented as inherent methods via
// separate files to keep `client` focused on transport mechanics.

pub mod client;
pub mod machines;
pub mod models;
pub mod networks;

pub use client::DataCenter;
