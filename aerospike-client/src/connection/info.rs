//! Framing codec for the text info protocol.
//!
//! Every message starts with an 8-byte header: protocol version (`2`),
//! message type (`1` for info) and a 48-bit big-endian body length. A request
//! body lists names, each terminated by `\n`; a response body holds
//! `name\tvalue\n` lines.

use std::collections::HashMap;

use aerospike_core::{AerospikeError, Result};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Info protocol version carried in the header.
pub const INFO_PROTOCOL_VERSION: u8 = 2;
/// Message type of info requests and responses.
pub const INFO_MESSAGE_TYPE: u8 = 1;
/// Size of the message header in bytes.
pub const HEADER_SIZE: usize = 8;
/// Largest body length the codec accepts.
pub const MAX_BODY_SIZE: usize = 128 * 1024 * 1024;

/// An info request: the names whose values should be returned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InfoRequest {
    names: Vec<String>,
}

impl InfoRequest {
    /// Creates a request for the given names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the requested names.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Name/value pairs returned by an info request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InfoResponse {
    values: HashMap<String, String>,
}

impl InfoResponse {
    /// Parses a response body.
    ///
    /// A line without a tab maps its name to the empty string. Blank lines are
    /// skipped.
    pub fn parse(body: &str) -> Self {
        let values = body
            .split('\n')
            .filter(|line| !line.is_empty())
            .map(|line| match line.split_once('\t') {
                Some((name, value)) => (name.to_string(), value.to_string()),
                None => (line.to_string(), String::new()),
            })
            .collect();
        Self { values }
    }

    /// Returns the value for `name`, if the server sent one.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the response held no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Removes and returns the value for `name`.
    pub fn take(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }
}

impl<K, V> FromIterator<(K, V)> for InfoResponse
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Codec for info protocol messages.
///
/// Encodes [`InfoRequest`]s and decodes [`InfoResponse`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct InfoCodec;

impl InfoCodec {
    /// Creates a new codec.
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn write_header(dst: &mut BytesMut, body_len: usize) -> Result<()> {
    if body_len > MAX_BODY_SIZE {
        return Err(AerospikeError::Parameter(format!(
            "info body of {} bytes exceeds {} bytes",
            body_len, MAX_BODY_SIZE
        )));
    }
    let header = ((INFO_PROTOCOL_VERSION as u64) << 56)
        | ((INFO_MESSAGE_TYPE as u64) << 48)
        | body_len as u64;
    dst.put_u64(header);
    Ok(())
}

impl Encoder<InfoRequest> for InfoCodec {
    type Error = AerospikeError;

    fn encode(&mut self, item: InfoRequest, dst: &mut BytesMut) -> Result<()> {
        let body_len: usize = item.names.iter().map(|n| n.len() + 1).sum();
        dst.reserve(HEADER_SIZE + body_len);
        write_header(dst, body_len)?;
        for name in &item.names {
            dst.put_slice(name.as_bytes());
            dst.put_u8(b'\n');
        }
        Ok(())
    }
}

impl Decoder for InfoCodec {
    type Item = InfoResponse;
    type Error = AerospikeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        let header = u64::from_be_bytes([
            src[0], src[1], src[2], src[3], src[4], src[5], src[6], src[7],
        ]);
        let version = (header >> 56) as u8;
        let message_type = (header >> 48) as u8;
        let body_len = (header & 0xFFFF_FFFF_FFFF) as usize;

        if version != INFO_PROTOCOL_VERSION || message_type != INFO_MESSAGE_TYPE {
            return Err(AerospikeError::Connection(format!(
                "unexpected message header: version {} type {}",
                version, message_type
            )));
        }
        if body_len > MAX_BODY_SIZE {
            return Err(AerospikeError::Connection(format!(
                "info body of {} bytes exceeds {} bytes",
                body_len, MAX_BODY_SIZE
            )));
        }

        if src.len() < HEADER_SIZE + body_len {
            src.reserve(HEADER_SIZE + body_len - src.len());
            return Ok(None);
        }

        src.advance(HEADER_SIZE);
        let body = src.split_to(body_len);
        let text = std::str::from_utf8(&body).map_err(|e| {
            AerospikeError::Serialization(format!("info response is not valid UTF-8: {}", e))
        })?;
        Ok(Some(InfoResponse::parse(text)))
    }
}
