//! Server particle-type tags and reserved extension codes.
//!
//! These numeric values are a fixed contract with the server and must not change.

use std::fmt;

/// Extension code packed for the wildcard query-filter sentinel.
pub const WILDCARD_EXT: i8 = 0x00;

/// Extension code packed for the infinity query-filter sentinel.
pub const INFINITY_EXT: i8 = 0x01;

/// Wire-level tag identifying a stored value's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParticleType {
    /// No value.
    Null = 0,
    /// Signed 64-bit integer.
    Integer = 1,
    /// IEEE-754 binary64.
    Float = 2,
    /// UTF-8 text.
    String = 3,
    /// Raw bytes.
    Blob = 4,
    /// Boolean.
    Bool = 17,
    /// HyperLogLog sketch.
    Hll = 18,
    /// Self-describing map.
    Map = 19,
    /// Self-describing list.
    List = 20,
    /// GeoJSON document.
    GeoJson = 23,
}

impl ParticleType {
    /// Resolves a raw tag, returning `None` for tags this client does not decode.
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Null),
            1 => Some(Self::Integer),
            2 => Some(Self::Float),
            3 => Some(Self::String),
            4 => Some(Self::Blob),
            17 => Some(Self::Bool),
            18 => Some(Self::Hll),
            19 => Some(Self::Map),
            20 => Some(Self::List),
            23 => Some(Self::GeoJson),
            _ => None,
        }
    }

    /// Returns the raw tag.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<ParticleType> for u8 {
    fn from(particle_type: ParticleType) -> Self {
        particle_type.as_u8()
    }
}

impl fmt::Display for ParticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "NULL",
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
            Self::String => "STRING",
            Self::Blob => "BLOB",
            Self::Bool => "BOOL",
            Self::Hll => "HLL",
            Self::Map => "MAP",
            Self::List => "LIST",
            Self::GeoJson => "GEOJSON",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_values_are_stable() {
        assert_eq!(ParticleType::Null.as_u8(), 0);
        assert_eq!(ParticleType::Integer.as_u8(), 1);
        assert_eq!(ParticleType::Float.as_u8(), 2);
        assert_eq!(ParticleType::String.as_u8(), 3);
        assert_eq!(ParticleType::Blob.as_u8(), 4);
        assert_eq!(ParticleType::Bool.as_u8(), 17);
        assert_eq!(ParticleType::Hll.as_u8(), 18);
        assert_eq!(ParticleType::Map.as_u8(), 19);
        assert_eq!(ParticleType::List.as_u8(), 20);
        assert_eq!(ParticleType::GeoJson.as_u8(), 23);
    }

    #[test]
    fn test_from_u8_roundtrip() {
        for tag in 0..=u8::MAX {
            if let Some(particle_type) = ParticleType::from_u8(tag) {
                assert_eq!(particle_type.as_u8(), tag);
            }
        }
    }

    #[test]
    fn test_unknown_tags() {
        assert_eq!(ParticleType::from_u8(7), None);
        assert_eq!(ParticleType::from_u8(21), None);
        assert_eq!(ParticleType::from_u8(255), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ParticleType::GeoJson.to_string(), "GEOJSON");
    }
}
