//! Msgpack decoding of self-describing list and map particles.

use rmp::Marker;

use super::{ParticleType, Value, WireValue, INFINITY_EXT, WILDCARD_EXT};
use crate::buffer::{ByteReader, DataInput};
use crate::error::{AerospikeError, Result};

/// Deepest list/map nesting accepted when packing or unpacking.
pub const MAX_NESTING: usize = 128;

enum Item {
    Value(Value),
    Ext(i8),
}

/// Decodes msgpack bytes produced by the server or by [`Packer`](super::Packer).
#[derive(Debug)]
pub struct Unpacker<'a> {
    reader: ByteReader<'a>,
    depth: usize,
}

impl<'a> Unpacker<'a> {
    /// Creates an unpacker over the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: ByteReader::new(data),
            depth: 0,
        }
    }

    /// Returns the number of undecoded bytes.
    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    /// Decodes the next value.
    ///
    /// Lists and maps nested deeper than [`MAX_NESTING`] are a
    /// [`AerospikeError::Serialization`] error.
    pub fn unpack_value(&mut self) -> Result<Value> {
        Ok(match self.unpack_item()? {
            Item::Value(value) => value,
            Item::Ext(code) => ext_value(code),
        })
    }

    fn unpack_item(&mut self) -> Result<Item> {
        let marker = Marker::from_u8(self.reader.read_u8()?);
        let value = match marker {
            Marker::Null => Value::Nil,
            Marker::True => Value::Bool(true),
            Marker::False => Value::Bool(false),
            Marker::FixPos(v) => Value::Int(i128::from(v)),
            Marker::FixNeg(v) => Value::Int(i128::from(v)),
            Marker::U8 => Value::Int(i128::from(self.reader.read_u8()?)),
            Marker::U16 => Value::Int(i128::from(self.reader.read_u16()?)),
            Marker::U32 => Value::Int(i128::from(self.reader.read_u32()?)),
            Marker::U64 => Value::Int(i128::from(self.reader.read_u64()?)),
            Marker::I8 => Value::Int(i128::from(self.reader.read_u8()? as i8)),
            Marker::I16 => Value::Int(i128::from(self.reader.read_u16()? as i16)),
            Marker::I32 => Value::Int(i128::from(self.reader.read_u32()? as i32)),
            Marker::I64 => Value::Int(i128::from(self.reader.read_i64()?)),
            Marker::F32 => Value::Float(f64::from(self.reader.read_f32()?)),
            Marker::F64 => Value::Float(self.reader.read_f64()?),
            Marker::FixStr(len) => self.unpack_particle(usize::from(len), true)?,
            Marker::Str8 => {
                let len = usize::from(self.reader.read_u8()?);
                self.unpack_particle(len, true)?
            }
            Marker::Str16 => {
                let len = usize::from(self.reader.read_u16()?);
                self.unpack_particle(len, true)?
            }
            Marker::Str32 => {
                let len = self.reader.read_u32()? as usize;
                self.unpack_particle(len, true)?
            }
            Marker::Bin8 => {
                let len = usize::from(self.reader.read_u8()?);
                self.unpack_particle(len, false)?
            }
            Marker::Bin16 => {
                let len = usize::from(self.reader.read_u16()?);
                self.unpack_particle(len, false)?
            }
            Marker::Bin32 => {
                let len = self.reader.read_u32()? as usize;
                self.unpack_particle(len, false)?
            }
            Marker::FixArray(len) => self.unpack_list(usize::from(len))?,
            Marker::Array16 => {
                let len = usize::from(self.reader.read_u16()?);
                self.unpack_list(len)?
            }
            Marker::Array32 => {
                let len = self.reader.read_u32()? as usize;
                self.unpack_list(len)?
            }
            Marker::FixMap(len) => self.unpack_map(usize::from(len))?,
            Marker::Map16 => {
                let len = usize::from(self.reader.read_u16()?);
                self.unpack_map(len)?
            }
            Marker::Map32 => {
                let len = self.reader.read_u32()? as usize;
                self.unpack_map(len)?
            }
            Marker::FixExt1 => return self.unpack_ext(1),
            Marker::FixExt2 => return self.unpack_ext(2),
            Marker::FixExt4 => return self.unpack_ext(4),
            Marker::FixExt8 => return self.unpack_ext(8),
            Marker::FixExt16 => return self.unpack_ext(16),
            Marker::Ext8 => {
                let len = usize::from(self.reader.read_u8()?);
                return self.unpack_ext(len);
            }
            Marker::Ext16 => {
                let len = usize::from(self.reader.read_u16()?);
                return self.unpack_ext(len);
            }
            Marker::Ext32 => {
                let len = self.reader.read_u32()? as usize;
                return self.unpack_ext(len);
            }
            Marker::Reserved => {
                return Err(AerospikeError::Serialization(
                    "reserved msgpack marker 0xc1".to_string(),
                ))
            }
        };
        Ok(Item::Value(value))
    }

    fn unpack_particle(&mut self, len: usize, is_str: bool) -> Result<Value> {
        if len == 0 {
            return Ok(if is_str {
                Value::String(String::new())
            } else {
                Value::Bytes(Vec::new())
            });
        }

        let tag = self.reader.read_u8()?;
        let len = len - 1;
        Ok(match ParticleType::from_u8(tag) {
            Some(ParticleType::String) => Value::String(self.reader.read_utf8(len)?),
            Some(ParticleType::GeoJson) => Value::GeoJson(self.reader.read_utf8(len)?),
            Some(ParticleType::Hll) => Value::Hll(self.reader.read_bytes(len)?),
            _ => Value::Bytes(self.reader.read_bytes(len)?),
        })
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_NESTING {
            return Err(AerospikeError::Serialization(format!(
                "collection nesting exceeds {} levels",
                MAX_NESTING
            )));
        }
        self.depth += 1;
        Ok(())
    }

    fn unpack_list(&mut self, count: usize) -> Result<Value> {
        self.enter()?;
        let mut items = Vec::with_capacity(count.min(self.reader.remaining()));
        for _ in 0..count {
            items.push(self.unpack_value()?);
        }
        self.depth -= 1;
        Ok(Value::List(items))
    }

    fn unpack_map(&mut self, count: usize) -> Result<Value> {
        self.enter()?;
        let mut entries = Vec::with_capacity(count.min(self.reader.remaining()));
        for _ in 0..count {
            match self.unpack_item()? {
                // Ordering metadata written by the server, not user data.
                Item::Ext(code) if code != WILDCARD_EXT && code != INFINITY_EXT => {
                    self.unpack_value()?;
                }
                key => {
                    let key = match key {
                        Item::Value(value) => value,
                        Item::Ext(code) => ext_value(code),
                    };
                    let value = self.unpack_value()?;
                    entries.push((key, value));
                }
            }
        }
        self.depth -= 1;
        Ok(Value::Map(entries))
    }

    fn unpack_ext(&mut self, len: usize) -> Result<Item> {
        let code = self.reader.read_u8()? as i8;
        self.reader.skip(len)?;
        Ok(Item::Ext(code))
    }
}

fn ext_value(code: i8) -> Value {
    match code {
        WILDCARD_EXT => Value::Wire(WireValue::Wildcard),
        INFINITY_EXT => Value::Wire(WireValue::Infinity),
        _ => Value::Nil,
    }
}
