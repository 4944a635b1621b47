//! Native application values accepted by and produced from the codec.

use super::WireValue;

/// A native value, before classification or after decoding.
///
/// Integers are carried as `i128` so that width rules can be enforced by
/// [`classify`](super::classify) instead of being lost in a conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value.
    Nil,
    /// Boolean.
    Bool(bool),
    /// Integer of any width up to 128 bits.
    Int(i128),
    /// Double-precision float.
    Float(f64),
    /// UTF-8 text.
    String(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Ordered list.
    List(Vec<Value>),
    /// Map with entries kept in insertion order.
    Map(Vec<(Value, Value)>),
    /// GeoJSON document text.
    GeoJson(String),
    /// Opaque HyperLogLog sketch.
    Hll(Vec<u8>),
    /// A value that has already been classified.
    Wire(WireValue),
}

impl Value {
    /// Builds a map value from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds a list value.
    pub fn list<T, I>(items: I) -> Self
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Returns `true` for [`Value::Nil`].
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns a short name of the value's category, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::GeoJson(_) => "geojson",
            Value::Hll(_) => "hll",
            Value::Wire(_) => "wire value",
        }
    }
}

/// Number of bits needed to represent `n` in two's complement, excluding the sign bit.
///
/// Negative numbers report the bit length of their complement, so
/// `bit_length(i64::MIN as i128) == 63`.
pub fn bit_length(n: i128) -> u32 {
    let magnitude = if n < 0 { !n } else { n };
    128 - magnitude.leading_zeros()
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(v as i128)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64, isize, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<WireValue> for Value {
    fn from(v: WireValue) -> Self {
        Value::Wire(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_length() {
        assert_eq!(bit_length(0), 0);
        assert_eq!(bit_length(1), 1);
        assert_eq!(bit_length(-1), 0);
        assert_eq!(bit_length(255), 8);
        assert_eq!(bit_length(i64::MAX as i128), 63);
        assert_eq!(bit_length(i64::MIN as i128), 63);
        assert_eq!(bit_length(1i128 << 63), 64);
        assert_eq!(bit_length(u64::MAX as i128), 64);
        assert_eq!(bit_length(1i128 << 64), 65);
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from(5u8), Value::Int(5));
        assert_eq!(Value::from(u64::MAX), Value::Int(u64::MAX as i128));
        assert_eq!(Value::from("abc"), Value::String("abc".into()));
        assert_eq!(Value::from(vec![1u8, 2]), Value::Bytes(vec![1, 2]));
        assert_eq!(Value::from(None::<i64>), Value::Nil);
        assert_eq!(Value::from(Some(true)), Value::Bool(true));
    }

    #[test]
    fn test_map_builder_keeps_order() {
        let map = Value::map([("b", 2), ("a", 1)]);
        match map {
            Value::Map(entries) => {
                assert_eq!(entries[0].0, Value::from("b"));
                assert_eq!(entries[1].0, Value::from("a"));
            }
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn test_kind() {
        assert_eq!(Value::Nil.kind(), "nil");
        assert_eq!(Value::list([1, 2]).kind(), "list");
    }
}
