//! Client side of the remote authentication service: wire types, the HTTP
//! client and the on-disk session cache.

pub mod api;
pub mod client;
pub mod session;
