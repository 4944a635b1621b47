//! Core types for the Aerospike client: errors, byte readers and the value codec.

#![warn(missing_docs)]

pub mod buffer;
pub mod error;
pub mod value;

pub use buffer::{ByteReader, DataInput};
pub use error::{AerospikeError, Result};
pub use value::{
    classify, decode_key, decode_particle, validate_as_key, ListValue, MapValue, Packer,
    ParticleType, Unpacker, Value, WireValue,
};
