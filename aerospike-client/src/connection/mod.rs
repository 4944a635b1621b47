//! Info connections and host resolution.

mod connection;
mod discovery;
mod info;

pub use connection::{Connection, ConnectionId};
pub use discovery::{DnsResolver, HostResolver, StaticResolver};
pub use info::{
    InfoCodec, InfoRequest, InfoResponse, HEADER_SIZE, INFO_MESSAGE_TYPE, INFO_PROTOCOL_VERSION,
    MAX_BODY_SIZE,
};
