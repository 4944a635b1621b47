//! Typed wire values: fixed-layout writing and self-describing packing.

use std::sync::OnceLock;

use bytes::BufMut;

use super::classify::{classify_int, validate_as_key};
use super::{Packer, ParticleType, Value, INFINITY_EXT, MAX_NESTING, WILDCARD_EXT};
use crate::error::{AerospikeError, Result};

/// Size of the GeoJSON header written before the document: flags byte plus cell count.
pub const GEOJSON_HEADER_SIZE: usize = 3;

/// Shared null value.
pub static NULL: WireValue = WireValue::Null;

/// Shared infinity query-filter sentinel.
pub static INFINITY: WireValue = WireValue::Infinity;

/// Shared wildcard query-filter sentinel.
pub static WILDCARD: WireValue = WireValue::Wildcard;

/// A value classified into one of the wire variants.
///
/// Every variant except [`Infinity`](WireValue::Infinity) and
/// [`Wildcard`](WireValue::Wildcard) has a particle type. Those two are
/// query-filter markers that can only be packed.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    /// Null value.
    Null,
    /// Upper-bound marker for range filters.
    Infinity,
    /// Match-anything marker for filters.
    Wildcard,
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// UTF-8 text.
    String(String),
    /// Signed 64-bit integer.
    Integer(i64),
    /// IEEE-754 binary64.
    Float(f64),
    /// Ordered list.
    List(ListValue),
    /// Map.
    Map(MapValue),
    /// GeoJSON document text.
    GeoJson(String),
    /// HyperLogLog sketch bytes.
    Hll(Vec<u8>),
    /// Boolean.
    Bool(bool),
}

/// List payload with its packed form computed at most once.
#[derive(Debug, Clone, Default)]
pub struct ListValue {
    items: Vec<Value>,
    packed: OnceLock<Vec<u8>>,
}

impl ListValue {
    /// Wraps the given items.
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items,
            packed: OnceLock::new(),
        }
    }

    /// Returns the items.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Consumes the list and returns the items.
    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    fn packed_bytes(&self) -> Result<&[u8]> {
        if let Some(bytes) = self.packed.get() {
            return Ok(bytes);
        }
        let mut packer = Packer::new();
        pack_list(&self.items, &mut packer, 0)?;
        Ok(self.packed.get_or_init(|| packer.into_bytes()))
    }
}

impl PartialEq for ListValue {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

/// Map payload with its packed form computed at most once.
#[derive(Debug, Clone, Default)]
pub struct MapValue {
    entries: Vec<(Value, Value)>,
    packed: OnceLock<Vec<u8>>,
}

impl MapValue {
    /// Wraps the given entries.
    pub fn new(entries: Vec<(Value, Value)>) -> Self {
        Self {
            entries,
            packed: OnceLock::new(),
        }
    }

    /// Returns the entries in insertion order.
    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    /// Consumes the map and returns the entries.
    pub fn into_entries(self) -> Vec<(Value, Value)> {
        self.entries
    }

    fn packed_bytes(&self) -> Result<&[u8]> {
        if let Some(bytes) = self.packed.get() {
            return Ok(bytes);
        }
        let mut packer = Packer::new();
        pack_map(&self.entries, &mut packer, 0)?;
        Ok(self.packed.get_or_init(|| packer.into_bytes()))
    }
}

impl PartialEq for MapValue {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl WireValue {
    /// Returns the server particle type.
    ///
    /// # Errors
    ///
    /// Returns [`AerospikeError::Parameter`] for the infinity and wildcard sentinels.
    pub fn particle_type(&self) -> Result<ParticleType> {
        Ok(match self {
            Self::Null => ParticleType::Null,
            Self::Infinity | Self::Wildcard => {
                return Err(AerospikeError::Parameter(format!(
                    "{} has no particle type",
                    self.name()
                )))
            }
            Self::Bytes(_) => ParticleType::Blob,
            Self::String(_) => ParticleType::String,
            Self::Integer(_) => ParticleType::Integer,
            Self::Float(_) => ParticleType::Float,
            Self::List(_) => ParticleType::List,
            Self::Map(_) => ParticleType::Map,
            Self::GeoJson(_) => ParticleType::GeoJson,
            Self::Hll(_) => ParticleType::Hll,
            Self::Bool(_) => ParticleType::Bool,
        })
    }

    /// Returns `true` for the infinity and wildcard markers.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Infinity | Self::Wildcard)
    }

    /// Number of bytes [`write`](Self::write) will emit.
    ///
    /// Lists and maps are packed on first call and the result is cached.
    pub fn estimate_size(&self) -> Result<usize> {
        Ok(match self {
            Self::Null | Self::Infinity | Self::Wildcard => 0,
            Self::Integer(_) | Self::Float(_) => 8,
            Self::Bool(_) => 1,
            Self::String(s) => s.len(),
            Self::Bytes(b) | Self::Hll(b) => b.len(),
            Self::GeoJson(s) => GEOJSON_HEADER_SIZE + s.len(),
            Self::List(list) => list.packed_bytes()?.len(),
            Self::Map(map) => map.packed_bytes()?.len(),
        })
    }

    /// Writes the fixed layout into `buffer` starting at `offset`.
    ///
    /// Returns the number of bytes written, which always equals
    /// [`estimate_size`](Self::estimate_size).
    pub fn write(&self, buffer: &mut [u8], offset: usize) -> Result<usize> {
        let size = self.estimate_size()?;
        let end = offset
            .checked_add(size)
            .filter(|end| *end <= buffer.len())
            .ok_or_else(|| {
                AerospikeError::Parameter(format!(
                    "buffer of {} bytes cannot hold {} bytes at offset {}",
                    buffer.len(),
                    size,
                    offset
                ))
            })?;

        let mut dst = &mut buffer[offset..end];
        match self {
            Self::Null | Self::Infinity | Self::Wildcard => {}
            Self::Integer(v) => dst.put_i64(*v),
            Self::Float(v) => dst.put_f64(*v),
            Self::Bool(v) => dst.put_u8(u8::from(*v)),
            Self::String(s) => dst.put_slice(s.as_bytes()),
            Self::Bytes(b) | Self::Hll(b) => dst.put_slice(b),
            Self::GeoJson(s) => {
                dst.put_u8(0);
                dst.put_u16(0);
                dst.put_slice(s.as_bytes());
            }
            Self::List(list) => dst.put_slice(list.packed_bytes()?),
            Self::Map(map) => dst.put_slice(map.packed_bytes()?),
        }
        Ok(size)
    }

    /// Packs the self-describing encoding.
    ///
    /// Map keys are validated one entry at a time. A bad key aborts the
    /// encode, but entries already packed into `packer` stay there. Lists and
    /// maps nested deeper than [`MAX_NESTING`] are a serialization error.
    pub fn pack(&self, packer: &mut Packer) -> Result<()> {
        self.pack_nested(packer, 0)
    }

    fn pack_nested(&self, packer: &mut Packer, depth: usize) -> Result<()> {
        match self {
            Self::Null => packer.pack_nil(),
            Self::Infinity => packer.pack_ext(INFINITY_EXT, &[]),
            Self::Wildcard => packer.pack_ext(WILDCARD_EXT, &[]),
            Self::Bytes(b) => packer.pack_particle(ParticleType::Blob, b),
            Self::String(s) => packer.pack_particle(ParticleType::String, s.as_bytes()),
            Self::Integer(v) => packer.pack_int(*v),
            Self::Float(v) => packer.pack_f64(*v),
            Self::Bool(v) => packer.pack_bool(*v),
            Self::GeoJson(s) => packer.pack_particle(ParticleType::GeoJson, s.as_bytes()),
            Self::Hll(b) => packer.pack_particle(ParticleType::Hll, b),
            Self::List(list) => match list.packed.get() {
                Some(bytes) => {
                    packer.pack_raw(bytes);
                    Ok(())
                }
                None => pack_list(&list.items, packer, depth),
            },
            Self::Map(map) => match map.packed.get() {
                Some(bytes) => {
                    packer.pack_raw(bytes);
                    Ok(())
                }
                None => pack_map(&map.entries, packer, depth),
            },
        }
    }

    /// Converts back into the native representation.
    ///
    /// The sentinels have no native form and stay wrapped.
    pub fn into_value(self) -> Value {
        match self {
            Self::Null => Value::Nil,
            Self::Infinity | Self::Wildcard => Value::Wire(self),
            Self::Bytes(b) => Value::Bytes(b),
            Self::String(s) => Value::String(s),
            Self::Integer(v) => Value::Int(i128::from(v)),
            Self::Float(v) => Value::Float(v),
            Self::List(list) => Value::List(list.items),
            Self::Map(map) => Value::Map(map.entries),
            Self::GeoJson(s) => Value::GeoJson(s),
            Self::Hll(b) => Value::Hll(b),
            Self::Bool(v) => Value::Bool(v),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Infinity => "infinity",
            Self::Wildcard => "wildcard",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::GeoJson(_) => "geojson",
            Self::Hll(_) => "hll",
            Self::Bool(_) => "bool",
        }
    }
}

/// Packs a native value, applying the same rules as `classify` with
/// narrow integers only.
fn pack_native(value: &Value, packer: &mut Packer, depth: usize) -> Result<()> {
    match value {
        Value::Nil => packer.pack_nil(),
        Value::Bool(v) => packer.pack_bool(*v),
        Value::Int(n) => packer.pack_int(classify_int(*n, false)?),
        Value::Float(v) => packer.pack_f64(*v),
        Value::String(s) => packer.pack_particle(ParticleType::String, s.as_bytes()),
        Value::Bytes(b) => packer.pack_particle(ParticleType::Blob, b),
        Value::List(items) => pack_list(items, packer, depth),
        Value::Map(entries) => pack_map(entries, packer, depth),
        Value::GeoJson(s) => packer.pack_particle(ParticleType::GeoJson, s.as_bytes()),
        Value::Hll(b) => packer.pack_particle(ParticleType::Hll, b),
        Value::Wire(wire) => wire.pack_nested(packer, depth),
    }
}

fn enter(depth: usize) -> Result<usize> {
    if depth >= MAX_NESTING {
        return Err(AerospikeError::Serialization(format!(
            "collection nesting exceeds {} levels",
            MAX_NESTING
        )));
    }
    Ok(depth + 1)
}

fn pack_list(items: &[Value], packer: &mut Packer, depth: usize) -> Result<()> {
    let depth = enter(depth)?;
    packer.pack_array_header(items.len())?;
    for item in items {
        pack_native(item, packer, depth)?;
    }
    Ok(())
}

fn pack_map(entries: &[(Value, Value)], packer: &mut Packer, depth: usize) -> Result<()> {
    let depth = enter(depth)?;
    packer.pack_map_header(entries.len())?;
    for (key, value) in entries {
        validate_as_key(key)?;
        pack_native(key, packer, depth)?;
        pack_native(value, packer, depth)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::classify;

    #[test]
    fn test_singletons_are_shared() {
        assert!(std::ptr::eq(&NULL, &NULL));
        assert_eq!(NULL, WireValue::Null);
        assert!(INFINITY.is_sentinel());
        assert!(WILDCARD.is_sentinel());
        assert!(!NULL.is_sentinel());
    }

    #[test]
    fn test_particle_types() {
        assert_eq!(NULL.particle_type().unwrap(), ParticleType::Null);
        assert_eq!(
            WireValue::Integer(1).particle_type().unwrap(),
            ParticleType::Integer
        );
        assert_eq!(
            WireValue::Bytes(vec![]).particle_type().unwrap(),
            ParticleType::Blob
        );
        assert_eq!(
            WireValue::List(ListValue::default()).particle_type().unwrap(),
            ParticleType::List
        );
    }

    #[test]
    fn test_sentinels_have_no_particle_type() {
        assert!(matches!(
            INFINITY.particle_type(),
            Err(AerospikeError::Parameter(_))
        ));
        assert!(matches!(
            WILDCARD.particle_type(),
            Err(AerospikeError::Parameter(_))
        ));
    }

    #[test]
    fn test_estimate_size_fixed_layouts() {
        assert_eq!(NULL.estimate_size().unwrap(), 0);
        assert_eq!(INFINITY.estimate_size().unwrap(), 0);
        assert_eq!(WILDCARD.estimate_size().unwrap(), 0);
        assert_eq!(WireValue::Integer(7).estimate_size().unwrap(), 8);
        assert_eq!(WireValue::Float(1.5).estimate_size().unwrap(), 8);
        assert_eq!(WireValue::Bool(true).estimate_size().unwrap(), 1);
        assert_eq!(WireValue::String("héllo".into()).estimate_size().unwrap(), 6);
        assert_eq!(WireValue::GeoJson("{}".into()).estimate_size().unwrap(), 5);
    }

    #[test]
    fn test_write_integer_big_endian() {
        let mut buf = [0u8; 10];
        let written = WireValue::Integer(0x0102030405060708).write(&mut buf, 1).unwrap();
        assert_eq!(written, 8);
        assert_eq!(buf, [0, 1, 2, 3, 4, 5, 6, 7, 8, 0]);
    }

    #[test]
    fn test_write_float() {
        let mut buf = [0u8; 8];
        WireValue::Float(1.0).write(&mut buf, 0).unwrap();
        assert_eq!(buf, [0x3f, 0xf0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_write_bool() {
        let mut buf = [9u8; 2];
        WireValue::Bool(true).write(&mut buf, 0).unwrap();
        WireValue::Bool(false).write(&mut buf, 1).unwrap();
        assert_eq!(buf, [1, 0]);
    }

    #[test]
    fn test_write_geojson_header() {
        let json = r#"{"type":"Point","coordinates":[0,0]}"#;
        let value = WireValue::GeoJson(json.to_string());
        let mut buf = vec![0xAAu8; value.estimate_size().unwrap()];
        let written = value.write(&mut buf, 0).unwrap();
        assert_eq!(written, 3 + json.len());
        assert_eq!(&buf[..3], &[0, 0, 0]);
        assert_eq!(&buf[3..], json.as_bytes());
    }

    #[test]
    fn test_write_null_writes_nothing() {
        let mut buf = [7u8; 1];
        assert_eq!(NULL.write(&mut buf, 0).unwrap(), 0);
        assert_eq!(buf, [7]);
    }

    #[test]
    fn test_write_rejects_small_buffer() {
        let mut buf = [0u8; 4];
        assert!(matches!(
            WireValue::Integer(1).write(&mut buf, 0),
            Err(AerospikeError::Parameter(_))
        ));
    }

    #[test]
    fn test_list_size_matches_written_bytes() {
        let value = classify(&Value::list([Value::from(1), Value::from("a")]), false).unwrap();
        let size = value.estimate_size().unwrap();
        let mut buf = vec![0u8; size];
        assert_eq!(value.write(&mut buf, 0).unwrap(), size);
        assert_eq!(buf, vec![0x92, 0x01, 0xa2, 0x03, b'a']);
    }

    #[test]
    fn test_list_packed_once() {
        let value = classify(&Value::list([1, 2, 3]), false).unwrap();
        let WireValue::List(list) = &value else {
            panic!("expected list");
        };
        assert!(list.packed.get().is_none());
        value.estimate_size().unwrap();
        let first = list.packed.get().unwrap().as_ptr();
        value.estimate_size().unwrap();
        assert_eq!(list.packed.get().unwrap().as_ptr(), first);
    }

    #[test]
    fn test_pack_sentinels() {
        let mut packer = Packer::new();
        WILDCARD.pack(&mut packer).unwrap();
        INFINITY.pack(&mut packer).unwrap();
        assert_eq!(packer.as_bytes(), &[0xc7, 0x00, 0x00, 0xc7, 0x00, 0x01]);
    }

    #[test]
    fn test_pack_string_has_particle_prefix() {
        let mut packer = Packer::new();
        WireValue::String("x".into()).pack(&mut packer).unwrap();
        WireValue::Hll(vec![9]).pack(&mut packer).unwrap();
        assert_eq!(packer.as_bytes(), &[0xa2, 0x03, b'x', 0xa2, 0x12, 9]);
    }

    #[test]
    fn test_pack_map_rejects_invalid_key_after_prior_entries() {
        let map = Value::Map(vec![
            (Value::from("ok"), Value::from(1)),
            (Value::list([1]), Value::from(2)),
        ]);
        let wire = classify(&map, false).unwrap();
        let mut packer = Packer::new();
        let err = wire.pack(&mut packer).unwrap_err();
        assert!(matches!(err, AerospikeError::TypeNotSupported(_)));
        // header + first entry stay in the buffer
        assert_eq!(packer.as_bytes(), &[0x82, 0xa3, 0x03, b'o', b'k', 0x01]);
    }

    #[test]
    fn test_pack_map_rejects_bool_key() {
        let wire = classify(&Value::map([(true, 1)]), false).unwrap();
        assert!(wire.estimate_size().is_err());
    }

    #[test]
    fn test_nested_wide_int_rejected() {
        let wire = classify(&Value::list([Value::Int(1i128 << 63)]), true).unwrap();
        assert!(matches!(
            wire.estimate_size(),
            Err(AerospikeError::TypeNotSupported(_))
        ));
    }

    #[test]
    fn test_pack_nesting_limit() {
        let nested = |levels: usize| {
            (0..levels).fold(Value::Nil, |inner, _| Value::List(vec![inner]))
        };

        let ok = classify(&nested(MAX_NESTING), false).unwrap();
        let mut packer = Packer::new();
        ok.pack(&mut packer).unwrap();
        assert_eq!(packer.len(), MAX_NESTING + 1);

        let too_deep = classify(&nested(MAX_NESTING + 1), false).unwrap();
        assert!(matches!(
            too_deep.pack(&mut Packer::new()),
            Err(AerospikeError::Serialization(_))
        ));
        assert!(too_deep.estimate_size().is_err());
    }

    #[test]
    fn test_pack_nesting_counts_wrapped_wire_values() {
        let mut value = Value::Nil;
        for _ in 0..MAX_NESTING {
            value = Value::Wire(WireValue::List(ListValue::new(vec![value])));
        }
        let wire = classify(&Value::List(vec![value]), false).unwrap();
        assert!(matches!(
            wire.pack(&mut Packer::new()),
            Err(AerospikeError::Serialization(_))
        ));
    }

    #[test]
    fn test_into_value() {
        assert_eq!(NULL.clone().into_value(), Value::Nil);
        assert_eq!(WireValue::Integer(-3).into_value(), Value::Int(-3));
        assert_eq!(
            INFINITY.clone().into_value(),
            Value::Wire(WireValue::Infinity)
        );
    }

    #[test]
    fn test_wire_value_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WireValue>();
    }
}
