//! Partition identifiers and the tokenizers for partition-ownership responses.

use std::fmt;

use aerospike_core::{AerospikeError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Number of partitions each namespace is divided into.
pub const PARTITION_COUNT: usize = 4096;
/// Size of a key digest in bytes.
pub const DIGEST_SIZE: usize = 20;
/// Longest namespace name the server accepts, in bytes.
pub const MAX_NAMESPACE_LEN: usize = 31;
/// Info key answered with decimal partition ids.
pub const REPLICAS_WRITE: &str = "replicas-write";
/// Info key answered with base64 partition bitmaps.
pub const REPLICAS_MASTER: &str = "replicas-master";

const BITMAP_SIZE: usize = PARTITION_COUNT / 8;

/// One partition of a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    /// Namespace name.
    pub namespace: String,
    /// Partition id in `[0, PARTITION_COUNT)`.
    pub id: u16,
}

impl Partition {
    /// Creates a partition.
    pub fn new(namespace: impl Into<String>, id: u16) -> Self {
        Self {
            namespace: namespace.into(),
            id,
        }
    }

    /// Returns the partition that owns a key digest.
    pub fn from_digest(namespace: impl Into<String>, digest: &[u8; DIGEST_SIZE]) -> Self {
        let id = u16::from_le_bytes([digest[0], digest[1]]) & (PARTITION_COUNT as u16 - 1);
        Self::new(namespace, id)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Namespace,
    Id,
}

/// Parses a `ns:id;ns:id;...` response into partitions, in response order.
///
/// Entries end at `;`, at a newline or at the end of input. Namespaces are
/// trimmed of surrounding whitespace and must be 1 to 31 bytes long; ids must
/// be decimal and below [`PARTITION_COUNT`]. Trailing text without a `:` is
/// ignored.
pub fn parse_partitions(response: &str) -> Result<Vec<Partition>> {
    if response.is_empty() {
        return Err(AerospikeError::parse("empty partition response", response));
    }

    let mut partitions = Vec::new();
    let mut state = State::Namespace;
    let mut begin = 0;
    let mut namespace = "";

    for (offset, byte) in response.bytes().enumerate() {
        match (state, byte) {
            (State::Namespace, b':') => {
                namespace = parse_namespace(&response[begin..offset], response)?;
                state = State::Id;
                begin = offset + 1;
            }
            (State::Id, b';' | b'\n') => {
                let id = parse_id(&response[begin..offset], response)?;
                partitions.push(Partition::new(namespace, id));
                state = State::Namespace;
                begin = offset + 1;
            }
            _ => {}
        }
    }

    if state == State::Id {
        let id = parse_id(&response[begin..], response)?;
        partitions.push(Partition::new(namespace, id));
    }

    Ok(partitions)
}

/// Parses a `ns:<base64 bitmap>;...` response into the partitions it marks.
///
/// Each bitmap holds one bit per partition, most significant bit first.
pub fn parse_partition_bitmap(response: &str) -> Result<Vec<Partition>> {
    if response.is_empty() {
        return Err(AerospikeError::parse("empty partition response", response));
    }

    let mut partitions = Vec::new();
    for entry in response
        .split(|c: char| c == ';' || c == '\n')
        .filter(|e| !e.trim().is_empty())
    {
        let (namespace, encoded) = entry
            .split_once(':')
            .ok_or_else(|| AerospikeError::parse("partition entry without ':'", response))?;
        let namespace = parse_namespace(namespace, response)?;

        let bitmap = STANDARD.decode(encoded.trim()).map_err(|e| {
            AerospikeError::parse(format!("invalid partition bitmap for {}: {}", namespace, e), response)
        })?;
        if bitmap.len() != BITMAP_SIZE {
            return Err(AerospikeError::parse(
                format!(
                    "partition bitmap for {} has {} bytes, expected {}",
                    namespace,
                    bitmap.len(),
                    BITMAP_SIZE
                ),
                response,
            ));
        }

        partitions.extend(
            (0..PARTITION_COUNT)
                .filter(|&i| bitmap[i >> 3] & (0x80 >> (i & 7)) != 0)
                .map(|i| Partition::new(namespace, i as u16)),
        );
    }

    Ok(partitions)
}

fn parse_namespace<'a>(token: &'a str, response: &str) -> Result<&'a str> {
    let namespace = token.trim();
    if namespace.is_empty() || namespace.len() > MAX_NAMESPACE_LEN {
        return Err(AerospikeError::parse(
            format!("invalid partition namespace {:?}", namespace),
            response,
        ));
    }
    Ok(namespace)
}

fn parse_id(token: &str, response: &str) -> Result<u16> {
    if token.is_empty() {
        return Err(AerospikeError::parse("empty partition id", response));
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AerospikeError::parse(
            format!("invalid partition id {:?}", token),
            response,
        ));
    }
    match token.parse::<usize>() {
        Ok(id) if id < PARTITION_COUNT => Ok(id as u16),
        _ => Err(AerospikeError::parse(
            format!("partition id {} out of range", token),
            response,
        )),
    }
}
