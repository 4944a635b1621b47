//! Value model and particle codec.
//!
//! Native [`Value`]s are classified into [`WireValue`]s, which know their
//! particle type, flat size and both on-wire layouts: the fixed layout written
//! by [`WireValue::write`] and the self-describing msgpack layout produced by
//! [`WireValue::pack`]. Stored particles are turned back into native values by
//! [`decode_particle`] and [`decode_key`].

mod classify;
mod decode;
mod native;
mod packer;
mod particle;
mod unpacker;
mod wire;

pub use classify::{classify, validate_as_key};
pub use decode::{decode_key, decode_particle};
pub use native::{bit_length, Value};
pub use packer::Packer;
pub use particle::{ParticleType, INFINITY_EXT, WILDCARD_EXT};
pub use unpacker::{Unpacker, MAX_NESTING};
pub use wire::{
    ListValue, MapValue, WireValue, GEOJSON_HEADER_SIZE, INFINITY, NULL, WILDCARD,
};
