//! Msgpack primitives used for the self-describing value encoding.

use rmp::encode;

use super::ParticleType;
use crate::error::{AerospikeError, Result};

/// Growable msgpack writer.
///
/// Text, bytes, GeoJSON and HLL payloads are written as msgpack `str` entries
/// whose first byte is the particle tag, so the particle type survives the
/// self-describing format.
#[derive(Debug, Default, Clone)]
pub struct Packer {
    buffer: Vec<u8>,
}

impl Packer {
    /// Creates an empty packer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a packer with the given initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Returns the packed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the packer and returns the packed bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Returns the number of packed bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing has been packed.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Packs a nil marker.
    pub fn pack_nil(&mut self) -> Result<()> {
        encode::write_nil(&mut self.buffer)?;
        Ok(())
    }

    /// Packs a boolean.
    pub fn pack_bool(&mut self, v: bool) -> Result<()> {
        encode::write_bool(&mut self.buffer, v)?;
        Ok(())
    }

    /// Packs a signed integer using the smallest msgpack representation.
    pub fn pack_int(&mut self, v: i64) -> Result<()> {
        encode::write_sint(&mut self.buffer, v)?;
        Ok(())
    }

    /// Packs an unsigned integer using the smallest msgpack representation.
    pub fn pack_uint(&mut self, v: u64) -> Result<()> {
        encode::write_uint(&mut self.buffer, v)?;
        Ok(())
    }

    /// Packs a binary64 float.
    pub fn pack_f64(&mut self, v: f64) -> Result<()> {
        encode::write_f64(&mut self.buffer, v)?;
        Ok(())
    }

    /// Packs an array header for `len` elements.
    pub fn pack_array_header(&mut self, len: usize) -> Result<()> {
        encode::write_array_len(&mut self.buffer, length_u32(len)?)?;
        Ok(())
    }

    /// Packs a map header for `len` entries.
    pub fn pack_map_header(&mut self, len: usize) -> Result<()> {
        encode::write_map_len(&mut self.buffer, length_u32(len)?)?;
        Ok(())
    }

    /// Packs a payload prefixed with its particle tag.
    pub fn pack_particle(&mut self, particle_type: ParticleType, payload: &[u8]) -> Result<()> {
        let len = payload
            .len()
            .checked_add(1)
            .ok_or_else(|| AerospikeError::Serialization("payload too large".to_string()))?;
        encode::write_str_len(&mut self.buffer, length_u32(len)?)?;
        self.buffer.push(particle_type.as_u8());
        self.buffer.extend_from_slice(payload);
        Ok(())
    }

    /// Packs an extension entry with the given type code.
    pub fn pack_ext(&mut self, code: i8, payload: &[u8]) -> Result<()> {
        encode::write_ext_meta(&mut self.buffer, length_u32(payload.len())?, code)?;
        self.buffer.extend_from_slice(payload);
        Ok(())
    }

    /// Appends bytes that are already msgpack-encoded.
    pub fn pack_raw(&mut self, packed: &[u8]) {
        self.buffer.extend_from_slice(packed);
    }
}

fn length_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        AerospikeError::Serialization(format!("length {} exceeds msgpack limit", len))
    })
}
