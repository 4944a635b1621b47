//! Classification of native values into wire variants, and key validation.

use super::native::bit_length;
use super::{ListValue, MapValue, Value, WireValue};
use crate::error::{AerospikeError, Result};

/// Classifies a native value into its wire variant.
///
/// Integers that need 64 bits are only accepted when `allow_wide_int` is set,
/// and are then stored by their low 64 bits. Integers that need more than 64
/// bits are always rejected.
///
/// # Errors
///
/// Returns [`AerospikeError::TypeNotSupported`] when the integer width is not accepted.
pub fn classify(input: &Value, allow_wide_int: bool) -> Result<WireValue> {
    Ok(match input {
        Value::Nil => WireValue::Null,
        Value::Bool(v) => WireValue::Bool(*v),
        Value::Int(n) => WireValue::Integer(classify_int(*n, allow_wide_int)?),
        Value::Float(v) => WireValue::Float(*v),
        Value::String(s) => WireValue::String(s.clone()),
        Value::Bytes(b) => WireValue::Bytes(b.clone()),
        Value::List(items) => WireValue::List(ListValue::new(items.clone())),
        Value::Map(entries) => WireValue::Map(MapValue::new(entries.clone())),
        Value::GeoJson(s) => WireValue::GeoJson(s.clone()),
        Value::Hll(b) => WireValue::Hll(b.clone()),
        Value::Wire(wire) => wire.clone(),
    })
}

impl TryFrom<Value> for WireValue {
    type Error = AerospikeError;

    /// Classifies an owned value with narrow integers only.
    fn try_from(input: Value) -> Result<Self> {
        Ok(match input {
            Value::Nil => WireValue::Null,
            Value::Bool(v) => WireValue::Bool(v),
            Value::Int(n) => WireValue::Integer(classify_int(n, false)?),
            Value::Float(v) => WireValue::Float(v),
            Value::String(s) => WireValue::String(s),
            Value::Bytes(b) => WireValue::Bytes(b),
            Value::List(items) => WireValue::List(ListValue::new(items)),
            Value::Map(entries) => WireValue::Map(MapValue::new(entries)),
            Value::GeoJson(s) => WireValue::GeoJson(s),
            Value::Hll(b) => WireValue::Hll(b),
            Value::Wire(wire) => wire,
        })
    }
}

pub(crate) fn classify_int(n: i128, allow_wide_int: bool) -> Result<i64> {
    let bits = bit_length(n);
    if bits < 64 {
        return Ok(n as i64);
    }
    if allow_wide_int && bits == 64 {
        return Ok(n as i64);
    }
    Err(AerospikeError::type_not_supported(format!(
        "integer {} requires {} bits",
        n, bits
    )))
}

/// Checks that a value may be used as a map or collection key.
///
/// Only nil, floats, strings and integers narrower than 64 bits qualify.
/// Booleans, lists, maps, bytes and the other particle types do not.
pub fn validate_as_key(input: &Value) -> Result<()> {
    let valid = match input {
        Value::Nil | Value::Float(_) | Value::String(_) => true,
        Value::Int(n) => bit_length(*n) < 64,
        Value::Wire(wire) => matches!(
            wire,
            WireValue::Null | WireValue::Float(_) | WireValue::String(_) | WireValue::Integer(_)
        ),
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AerospikeError::type_not_supported(format!(
            "{} is not supported as a key",
            input.kind()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_scalars() {
        assert_eq!(classify(&Value::Nil, false).unwrap(), WireValue::Null);
        assert_eq!(
            classify(&Value::from(42), false).unwrap(),
            WireValue::Integer(42)
        );
        assert_eq!(
            classify(&Value::from(2.5), false).unwrap(),
            WireValue::Float(2.5)
        );
        assert_eq!(
            classify(&Value::from("abc"), false).unwrap(),
            WireValue::String("abc".into())
        );
        assert_eq!(
            classify(&Value::from(true), false).unwrap(),
            WireValue::Bool(true)
        );
    }

    #[test]
    fn test_bytes_are_not_text() {
        assert_eq!(
            classify(&Value::Bytes(b"abc".to_vec()), false).unwrap(),
            WireValue::Bytes(b"abc".to_vec())
        );
    }

    #[test]
    fn test_classify_passes_wire_values_through() {
        let wire = WireValue::GeoJson("{}".into());
        assert_eq!(classify(&Value::Wire(wire.clone()), false).unwrap(), wire);
        assert_eq!(
            classify(&Value::Wire(WireValue::Infinity), false).unwrap(),
            WireValue::Infinity
        );
    }

    #[test]
    fn test_classify_int_width() {
        let max_narrow = Value::Int(i64::MAX as i128);
        assert_eq!(
            classify(&max_narrow, false).unwrap(),
            WireValue::Integer(i64::MAX)
        );

        let wide = Value::Int(1i128 << 63);
        assert!(matches!(
            classify(&wide, false),
            Err(AerospikeError::TypeNotSupported(_))
        ));
        assert_eq!(classify(&wide, true).unwrap(), WireValue::Integer(i64::MIN));

        let too_wide = Value::Int(1i128 << 64);
        assert!(classify(&too_wide, false).is_err());
        assert!(classify(&too_wide, true).is_err());
    }

    #[test]
    fn test_classify_negative_ints() {
        assert_eq!(
            classify(&Value::Int(i64::MIN as i128), false).unwrap(),
            WireValue::Integer(i64::MIN)
        );
        let below_min = Value::Int(i64::MIN as i128 - 1);
        assert!(matches!(
            classify(&below_min, false),
            Err(AerospikeError::TypeNotSupported(_))
        ));
        assert_eq!(
            classify(&below_min, true).unwrap(),
            WireValue::Integer(i64::MAX)
        );

        let min_wide = Value::Int(-(1i128 << 64));
        assert_eq!(classify(&min_wide, true).unwrap(), WireValue::Integer(0));

        let too_wide = Value::Int(-(1i128 << 64) - 1);
        assert!(classify(&too_wide, true).is_err());
    }

    #[test]
    fn test_try_from_owned() {
        let wire = WireValue::try_from(Value::list([1, 2])).unwrap();
        assert_eq!(wire.particle_type().unwrap().as_u8(), 20);
        assert!(WireValue::try_from(Value::Int(1i128 << 63)).is_err());
    }

    #[test]
    fn test_valid_keys() {
        assert!(validate_as_key(&Value::Nil).is_ok());
        assert!(validate_as_key(&Value::from(1.5)).is_ok());
        assert!(validate_as_key(&Value::from("abc")).is_ok());
        assert!(validate_as_key(&Value::from(42)).is_ok());
        assert!(validate_as_key(&Value::Wire(WireValue::Integer(1))).is_ok());
    }

    #[test]
    fn test_invalid_keys() {
        assert!(validate_as_key(&Value::list([1, 2])).is_err());
        assert!(validate_as_key(&Value::map([("a", 1)])).is_err());
        assert!(validate_as_key(&Value::from(true)).is_err());
        assert!(validate_as_key(&Value::Int(1i128 << 63)).is_err());
        assert!(validate_as_key(&Value::Bytes(vec![1])).is_err());
        assert!(validate_as_key(&Value::Wire(WireValue::Wildcard)).is_err());
    }
}
