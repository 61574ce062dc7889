//! Typed projection of a [`Value`] with the driver's defined coercion rules
//! These are total functions on the `Value` sum type —
//! no runtime type lookup beyond matching the tag.

use super::Value;
use crate::error::CoercionError;

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Node(_) => "node",
            Value::Relationship(_) => "relationship",
            Value::Path(_) => "path",
            Value::Point(_) => "point",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::LocalTime(_) => "local_time",
            Value::LocalDateTime(_) => "local_date_time",
            Value::DateTime(_) => "date_time",
            Value::Duration(_) => "duration",
            Value::Unsupported { .. } => "unsupported",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// A short diagnostic rendering for logs: scalars print as themselves,
    /// `Bytes` prints as a hex dump (truncated past 16 bytes) rather than
    /// lossily-decoded text or a raw `Vec<u8>` `Debug` dump, and composite
    /// values print just their type name and size.
    pub fn preview(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => format!("{s:?}"),
            Value::Bytes(b) if b.len() <= 16 => hex::encode(b),
            Value::Bytes(b) => format!("{}...({} bytes)", hex::encode(&b[..16]), b.len()),
            Value::List(items) => format!("list[{}]", items.len()),
            Value::Map(m) => format!("map[{}]", m.len()),
            other => other.type_name().to_string(),
        }
    }

    /// `numeric->bool: 0->false, 1->true, else Coercion; null->false`.
    /// `string->bool: "0"->false, "1"->true, else Coercion`.
    pub fn coerce_bool(&self) -> Result<bool, CoercionError> {
        match self {
            Value::Null => Ok(false),
            Value::Boolean(b) => Ok(*b),
            Value::Integer(0) => Ok(false),
            Value::Integer(1) => Ok(true),
            Value::Integer(other) => Err(CoercionError::OutOfRange {
                value: *other,
                to: "bool",
            }),
            Value::String(s) if s == "0" => Ok(false),
            Value::String(s) if s == "1" => Ok(true),
            other => Err(CoercionError::Mismatch {
                from: other.type_name(),
                to: "bool",
            }),
        }
    }

    /// `null->0`; otherwise requires an `Integer`.
    pub fn coerce_i64(&self) -> Result<i64, CoercionError> {
        match self {
            Value::Null => Ok(0),
            Value::Integer(v) => Ok(*v),
            other => Err(CoercionError::Mismatch {
                from: other.type_name(),
                to: "i64",
            }),
        }
    }

    fn coerce_narrow(&self, min: i64, max: i64, to: &'static str) -> Result<i64, CoercionError> {
        let v = self.coerce_i64().map_err(|_| CoercionError::Mismatch {
            from: self.type_name(),
            to,
        })?;
        if v < min || v > max {
            Err(CoercionError::OutOfRange { value: v, to })
        } else {
            Ok(v)
        }
    }

    pub fn coerce_i8(&self) -> Result<i8, CoercionError> {
        self.coerce_narrow(i8::MIN as i64, i8::MAX as i64, "byte")
            .map(|v| v as i8)
    }

    pub fn coerce_i16(&self) -> Result<i16, CoercionError> {
        self.coerce_narrow(i16::MIN as i64, i16::MAX as i64, "short")
            .map(|v| v as i16)
    }

    pub fn coerce_i32(&self) -> Result<i32, CoercionError> {
        self.coerce_narrow(i32::MIN as i64, i32::MAX as i64, "int")
            .map(|v| v as i32)
    }

    pub fn coerce_f64(&self) -> Result<f64, CoercionError> {
        match self {
            Value::Null => Ok(0.0),
            Value::Float(v) => Ok(*v),
            Value::Integer(v) => Ok(*v as f64),
            other => Err(CoercionError::Mismatch {
                from: other.type_name(),
                to: "f64",
            }),
        }
    }

    pub fn coerce_string(&self) -> Result<Option<String>, CoercionError> {
        match self {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            other => Err(CoercionError::Mismatch {
                from: other.type_name(),
                to: "string",
            }),
        }
    }

    /// Any temporal projection encountering [`Value::Unsupported`] propagates
    /// the underlying reason rather than a generic mismatch.
    pub fn coerce_temporal_guard(&self) -> Result<(), CoercionError> {
        if let Value::Unsupported { kind, reason } = self {
            Err(CoercionError::Unsupported {
                kind: kind.clone(),
                reason: reason.clone(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_out_of_range_fails() {
        let v = Value::Integer(128);
        assert!(matches!(
            v.coerce_i8(),
            Err(CoercionError::OutOfRange { value: 128, to: "byte" })
        ));
    }

    #[test]
    fn string_bool_rules() {
        assert_eq!(Value::String("1".into()).coerce_bool(), Ok(true));
        assert!(Value::String("2".into()).coerce_bool().is_err());
    }

    #[test]
    fn null_int_is_zero() {
        assert_eq!(Value::Null.coerce_i64(), Ok(0));
    }

    #[test]
    fn bytes_preview_hex_encodes_short_values() {
        assert_eq!(Value::Bytes(vec![0xDE, 0xAD]).preview(), "dead");
    }

    #[test]
    fn bytes_preview_truncates_long_values() {
        let preview = Value::Bytes(vec![0xAB; 32]).preview();
        assert_eq!(preview, format!("{}...(32 bytes)", "ab".repeat(16)));
    }
}
