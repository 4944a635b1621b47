//! Decoding of stored particles and digest keys back into native values.

use super::{ParticleType, Unpacker, Value};
use crate::buffer::{ByteReader, DataInput};
use crate::error::{AerospikeError, Result};

/// Decodes a particle of the given type from `buffer[offset..offset + length]`.
///
/// Empty payloads of fixed-width types decode to [`Value::Nil`], and unknown
/// tags decode to [`Value::Nil`] instead of failing. Malformed payloads
/// (truncated numbers, invalid UTF-8, broken msgpack) are errors.
pub fn decode_particle(
    particle_type: u8,
    buffer: &[u8],
    offset: usize,
    length: usize,
) -> Result<Value> {
    let mut reader = ByteReader::with_range(buffer, offset, length)?;

    let Some(particle_type) = ParticleType::from_u8(particle_type) else {
        tracing::trace!(particle_type, length, "skipping unknown particle type");
        return Ok(Value::Nil);
    };

    Ok(match particle_type {
        ParticleType::Null => Value::Nil,
        ParticleType::String => Value::String(reader.read_utf8(length)?),
        ParticleType::Blob => Value::Bytes(reader.read_bytes(length)?),
        ParticleType::Hll => Value::Hll(reader.read_bytes(length)?),
        _ if length == 0 => Value::Nil,
        ParticleType::Integer => Value::Int(i128::from(reader.read_i64()?)),
        ParticleType::Float => Value::Float(reader.read_f64()?),
        ParticleType::Bool => Value::Bool(reader.read_bool()?),
        ParticleType::List | ParticleType::Map => {
            Unpacker::new(reader.read_rest()).unpack_value()?
        }
        ParticleType::GeoJson => {
            let _flags = reader.read_u8()?;
            let ncells = usize::from(reader.read_u16()?);
            reader.skip(ncells * 8)?;
            let remaining = reader.remaining();
            Value::GeoJson(reader.read_utf8(remaining)?)
        }
    })
}

/// Reconstructs a user key from the key bytes stored alongside a digest.
///
/// Only string, integer and blob keys are reconstructible; any other tag
/// returns `Ok(None)`. Integer keys are variable-length big-endian.
pub fn decode_key(
    particle_type: u8,
    buffer: &[u8],
    offset: usize,
    length: usize,
) -> Result<Option<Value>> {
    let mut reader = ByteReader::with_range(buffer, offset, length)?;

    Ok(match ParticleType::from_u8(particle_type) {
        Some(ParticleType::String) => Some(Value::String(reader.read_utf8(length)?)),
        Some(ParticleType::Integer) => Some(Value::Int(i128::from(bytes_to_number(
            reader.read_rest(),
        )?))),
        Some(ParticleType::Blob) => Some(Value::Bytes(reader.read_bytes(length)?)),
        _ => None,
    })
}

fn bytes_to_number(bytes: &[u8]) -> Result<i64> {
    if bytes.len() > 8 {
        return Err(AerospikeError::Serialization(format!(
            "integer key of {} bytes exceeds 8 bytes",
            bytes.len()
        )));
    }
    let value = bytes
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
    Ok(value as i64)
}
