//! The signature table that maps PackStream structure signatures to logical
//! types, and the unpacker/packer that walk it to convert between
//! raw PackStream structures and [`Value`].

use crate::error::PackStreamError;
use crate::packstream::{marker::PeekType, Reader, Writer};
use crate::value::{
    DateTimeBaseline, Duration, Node, OrderedMap, Path, Point, Relationship, UnboundRelationship,
    Value, Zone,
};

pub mod sig {
    pub const NODE: u8 = b'N';
    pub const RELATIONSHIP: u8 = b'R';
    pub const UNBOUND_RELATIONSHIP: u8 = b'r';
    pub const PATH: u8 = b'P';
    pub const DATE: u8 = b'D';
    pub const TIME: u8 = b'T';
    pub const LOCAL_TIME: u8 = b't';
    pub const LOCAL_DATE_TIME: u8 = b'd';
    pub const DATE_TIME_LEGACY_OFFSET: u8 = b'F';
    pub const DATE_TIME_LEGACY_ZONE_ID: u8 = b'f';
    pub const DATE_TIME_UTC_OFFSET: u8 = b'I';
    pub const DATE_TIME_UTC_ZONE_ID: u8 = b'i';
    pub const DURATION: u8 = b'E';
    pub const POINT_2D: u8 = b'X';
    pub const POINT_3D: u8 = b'Y';
}

/// Which UTC-patch mode (Bolt >= 5.0 vs legacy) is active on this connection.
/// Selects which pair of zoned-date-time signatures is accepted; the other
/// pair is treated as an unknown signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolMode {
    pub utc_patch_enabled: bool,
}

impl ProtocolMode {
    pub fn legacy() -> Self {
        ProtocolMode {
            utc_patch_enabled: false,
        }
    }

    pub fn utc() -> Self {
        ProtocolMode {
            utc_patch_enabled: true,
        }
    }
}

/// A short allowlist of recognised IANA zone ids. A real deployment would
/// link a full tz database (e.g. via `chrono-tz`); this driver's contract
/// only requires that *unrecognised* zones degrade to
/// [`Value::Unsupported`] rather than aborting the record, so a minimal
/// allowlist is sufficient to exercise and test that path.
const KNOWN_ZONE_IDS: &[&str] = &[
    "UTC",
    "Etc/UTC",
    "Europe/Berlin",
    "Europe/London",
    "America/New_York",
    "America/Los_Angeles",
    "Asia/Tokyo",
    "Australia/Sydney",
];

fn is_known_zone(id: &str) -> bool {
    KNOWN_ZONE_IDS.contains(&id)
}

fn field_count_error(signature: u8, expected: u8, actual: u8) -> PackStreamError {
    PackStreamError::FieldCountMismatch {
        signature,
        expected,
        actual,
    }
}

fn check_count(signature: u8, allowed: &[u8], actual: u8) -> Result<(), PackStreamError> {
    if allowed.contains(&actual) {
        Ok(())
    } else {
        Err(field_count_error(signature, allowed[0], actual))
    }
}

/// Recursively unpack the next value from `reader`.
pub fn unpack_value(reader: &mut Reader, mode: ProtocolMode) -> Result<Value, PackStreamError> {
    match reader.peek_type()? {
        PeekType::Null => {
            reader.read_null()?;
            Ok(Value::Null)
        }
        PeekType::Boolean => Ok(Value::Boolean(reader.read_bool()?)),
        PeekType::Integer => Ok(Value::Integer(reader.read_int()?)),
        PeekType::Float => Ok(Value::Float(reader.read_float()?)),
        PeekType::Bytes => Ok(Value::Bytes(reader.read_bytes()?)),
        PeekType::String => Ok(Value::String(reader.read_string()?)),
        PeekType::List => {
            let len = reader.read_list_header()?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(unpack_value(reader, mode)?);
            }
            Ok(Value::List(items))
        }
        PeekType::Map => {
            let len = reader.read_map_header()?;
            let mut map = OrderedMap::new();
            for _ in 0..len {
                let key = reader.read_string()?;
                let value = unpack_value(reader, mode)?;
                map.insert(key, value);
            }
            Ok(Value::Map(map))
        }
        PeekType::Struct => unpack_struct(reader, mode),
    }
}

fn unpack_string_list(reader: &mut Reader, mode: ProtocolMode) -> Result<Vec<String>, PackStreamError> {
    let len = reader.read_list_header()?;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(expect_string(unpack_value(reader, mode)?)?);
    }
    Ok(out)
}

fn expect_map(value: Value) -> Result<OrderedMap, PackStreamError> {
    match value {
        Value::Map(m) => Ok(m),
        other => Err(PackStreamError::InvalidUtf8(format!(
            "expected map, found {}",
            other.type_name()
        ))),
    }
}

fn expect_string(value: Value) -> Result<String, PackStreamError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(PackStreamError::InvalidUtf8(format!(
            "expected string, found {}",
            other.type_name()
        ))),
    }
}

fn unpack_node(reader: &mut Reader, mode: ProtocolMode, field_count: u8) -> Result<Node, PackStreamError> {
    let id = reader.read_int()?;
    let labels = unpack_string_list(reader, mode)?;
    let properties = expect_map(unpack_value(reader, mode)?)?;
    let element_id = if field_count == 4 {
        reader.read_string()?
    } else {
        id.to_string()
    };
    Ok(Node {
        id,
        element_id,
        labels,
        properties,
    })
}

fn unpack_unbound_relationship(
    reader: &mut Reader,
    mode: ProtocolMode,
    field_count: u8,
) -> Result<UnboundRelationship, PackStreamError> {
    let id = reader.read_int()?;
    let rel_type = reader.read_string()?;
    let properties = expect_map(unpack_value(reader, mode)?)?;
    let element_id = if field_count == 4 {
        reader.read_string()?
    } else {
        id.to_string()
    };
    Ok(UnboundRelationship {
        id,
        element_id,
        rel_type,
        properties,
    })
}

fn unpack_struct(reader: &mut Reader, mode: ProtocolMode) -> Result<Value, PackStreamError> {
    let (signature, field_count) = reader.read_struct_header()?;
    use sig::*;
    match signature {
        NODE => {
            check_count(signature, &[3, 4], field_count)?;
            Ok(Value::Node(unpack_node(reader, mode, field_count)?))
        }
        RELATIONSHIP => {
            check_count(signature, &[5, 8], field_count)?;
            let id = reader.read_int()?;
            let start_id = reader.read_int()?;
            let end_id = reader.read_int()?;
            let rel_type = reader.read_string()?;
            let properties = expect_map(unpack_value(reader, mode)?)?;
            let (element_id, start_element_id, end_element_id) = if field_count == 8 {
                (
                    reader.read_string()?,
                    reader.read_string()?,
                    reader.read_string()?,
                )
            } else {
                (id.to_string(), start_id.to_string(), end_id.to_string())
            };
            Ok(Value::Relationship(Relationship {
                id,
                element_id,
                start_id,
                start_element_id,
                end_id,
                end_element_id,
                rel_type,
                properties,
            }))
        }
        PATH => {
            check_count(signature, &[3], field_count)?;
            let node_count = reader.read_list_header()?;
            let mut nodes = Vec::with_capacity(node_count);
            for _ in 0..node_count {
                match unpack_struct(reader, mode)? {
                    Value::Node(n) => nodes.push(n),
                    other => {
                        return Err(PackStreamError::InvalidUtf8(format!(
                            "expected node in path, found {}",
                            other.type_name()
                        )))
                    }
                }
            }
            let rel_count = reader.read_list_header()?;
            let mut rels = Vec::with_capacity(rel_count);
            for _ in 0..rel_count {
                let (sig, fc) = reader.read_struct_header()?;
                if sig != UNBOUND_RELATIONSHIP {
                    return Err(PackStreamError::UnknownSignature(sig));
                }
                check_count(sig, &[3, 4], fc)?;
                rels.push(unpack_unbound_relationship(reader, mode, fc)?);
            }
            let seq_count = reader.read_list_header()?;
            let mut sequence = Vec::with_capacity(seq_count);
            for _ in 0..seq_count {
                sequence.push(reader.read_int()?);
            }
            let path = Path::assemble(nodes, rels, &sequence).map_err(|e| {
                PackStreamError::InvalidUtf8(format!("bad path sequence: {e}"))
            })?;
            Ok(Value::Path(path))
        }
        DATE => {
            check_count(signature, &[1], field_count)?;
            Ok(Value::Date(crate::value::Date {
                epoch_day: reader.read_int()?,
            }))
        }
        TIME => {
            check_count(signature, &[2], field_count)?;
            let nanos_of_day = reader.read_int()?;
            let offset_seconds = reader.read_int()? as i32;
            Ok(Value::Time(crate::value::Time {
                nanos_of_day,
                offset_seconds,
            }))
        }
        LOCAL_TIME => {
            check_count(signature, &[1], field_count)?;
            Ok(Value::LocalTime(crate::value::LocalTime {
                nanos_of_day: reader.read_int()?,
            }))
        }
        LOCAL_DATE_TIME => {
            check_count(signature, &[2], field_count)?;
            let epoch_second = reader.read_int()?;
            let nano = reader.read_int()? as i32;
            Ok(Value::LocalDateTime(crate::value::LocalDateTime {
                epoch_second,
                nano,
            }))
        }
        DATE_TIME_LEGACY_OFFSET => {
            if mode.utc_patch_enabled {
                return Err(PackStreamError::UnknownSignature(signature));
            }
            check_count(signature, &[3], field_count)?;
            let epoch_second = reader.read_int()?;
            let nano = reader.read_int()? as i32;
            let offset = reader.read_int()? as i32;
            Ok(Value::DateTime(crate::value::DateTime {
                epoch_second,
                nano,
                zone: Zone::Offset(offset),
                baseline: DateTimeBaseline::Legacy,
            }))
        }
        DATE_TIME_LEGACY_ZONE_ID => {
            if mode.utc_patch_enabled {
                return Err(PackStreamError::UnknownSignature(signature));
            }
            check_count(signature, &[3], field_count)?;
            let epoch_second = reader.read_int()?;
            let nano = reader.read_int()? as i32;
            let zone_id = reader.read_string()?;
            Ok(unsupported_if_unknown_zone(
                "date_time",
                epoch_second,
                nano,
                zone_id,
                DateTimeBaseline::Legacy,
            ))
        }
        DATE_TIME_UTC_OFFSET => {
            if !mode.utc_patch_enabled {
                return Err(PackStreamError::UnknownSignature(signature));
            }
            check_count(signature, &[3], field_count)?;
            let epoch_second = reader.read_int()?;
            let nano = reader.read_int()? as i32;
            let offset = reader.read_int()? as i32;
            Ok(Value::DateTime(crate::value::DateTime {
                epoch_second,
                nano,
                zone: Zone::Offset(offset),
                baseline: DateTimeBaseline::Utc,
            }))
        }
        DATE_TIME_UTC_ZONE_ID => {
            if !mode.utc_patch_enabled {
                return Err(PackStreamError::UnknownSignature(signature));
            }
            check_count(signature, &[3], field_count)?;
            let epoch_second = reader.read_int()?;
            let nano = reader.read_int()? as i32;
            let zone_id = reader.read_string()?;
            Ok(unsupported_if_unknown_zone(
                "date_time",
                epoch_second,
                nano,
                zone_id,
                DateTimeBaseline::Utc,
            ))
        }
        DURATION => {
            check_count(signature, &[4], field_count)?;
            let months = reader.read_int()?;
            let days = reader.read_int()?;
            let seconds = reader.read_int()?;
            let nanos = reader.read_int()? as i32;
            Ok(Value::Duration(Duration::new(months, days, seconds, nanos)))
        }
        POINT_2D => {
            check_count(signature, &[3], field_count)?;
            let srid = reader.read_int()? as i32;
            let x = reader.read_float()?;
            let y = reader.read_float()?;
            Ok(Value::Point(Point::new_2d(srid, x, y)))
        }
        POINT_3D => {
            check_count(signature, &[4], field_count)?;
            let srid = reader.read_int()? as i32;
            let x = reader.read_float()?;
            let y = reader.read_float()?;
            let z = reader.read_float()?;
            Ok(Value::Point(Point::new_3d(srid, x, y, z)))
        }
        other => Err(PackStreamError::UnknownSignature(other)),
    }
}

fn unsupported_if_unknown_zone(
    kind: &str,
    epoch_second: i64,
    nano: i32,
    zone_id: String,
    baseline: DateTimeBaseline,
) -> Value {
    if is_known_zone(&zone_id) {
        Value::DateTime(crate::value::DateTime {
            epoch_second,
            nano,
            zone: Zone::Named(zone_id),
            baseline,
        })
    } else {
        Value::Unsupported {
            kind: kind.to_string(),
            reason: format!("unrecognised time zone id '{zone_id}'"),
        }
    }
}

/// Pack a value back into its PackStream structure form, inverting
/// [`unpack_value`]. Integers use the narrowest encoding, strings are UTF-8,
/// maps preserve insertion order.
pub fn pack_value(writer: &mut Writer, value: &Value) -> Result<(), PackStreamError> {
    match value {
        Value::Null => writer.write_null(),
        Value::Boolean(b) => writer.write_bool(*b),
        Value::Integer(i) => writer.write_int(*i),
        Value::Float(f) => writer.write_float(*f),
        Value::Bytes(b) => writer.write_bytes(b)?,
        Value::String(s) => writer.write_string(s)?,
        Value::List(items) => {
            writer.write_list_header(items.len())?;
            for item in items {
                pack_value(writer, item)?;
            }
        }
        Value::Map(map) => {
            writer.write_map_header(map.len())?;
            for (k, v) in map.iter() {
                writer.write_string(k)?;
                pack_value(writer, v)?;
            }
        }
        Value::Node(node) => {
            writer.write_struct_header(sig::NODE, 4)?;
            writer.write_int(node.id);
            writer.write_list_header(node.labels.len())?;
            for label in &node.labels {
                writer.write_string(label)?;
            }
            writer.write_map_header(node.properties.len())?;
            for (k, v) in node.properties.iter() {
                writer.write_string(k)?;
                pack_value(writer, v)?;
            }
            writer.write_string(&node.element_id)?;
        }
        Value::Relationship(rel) => {
            writer.write_struct_header(sig::RELATIONSHIP, 8)?;
            writer.write_int(rel.id);
            writer.write_int(rel.start_id);
            writer.write_int(rel.end_id);
            writer.write_string(&rel.rel_type)?;
            writer.write_map_header(rel.properties.len())?;
            for (k, v) in rel.properties.iter() {
                writer.write_string(k)?;
                pack_value(writer, v)?;
            }
            writer.write_string(&rel.element_id)?;
            writer.write_string(&rel.start_element_id)?;
            writer.write_string(&rel.end_element_id)?;
        }
        Value::Path(_) => {
            return Err(PackStreamError::Overflow(
                "paths are server-origin only and are never re-packed by the client".into(),
            ))
        }
        Value::Point(p) => {
            if let Some(z) = p.z {
                writer.write_struct_header(sig::POINT_3D, 4)?;
                writer.write_int(p.srid as i64);
                writer.write_float(p.x);
                writer.write_float(p.y);
                writer.write_float(z);
            } else {
                writer.write_struct_header(sig::POINT_2D, 3)?;
                writer.write_int(p.srid as i64);
                writer.write_float(p.x);
                writer.write_float(p.y);
            }
        }
        Value::Date(d) => {
            writer.write_struct_header(sig::DATE, 1)?;
            writer.write_int(d.epoch_day);
        }
        Value::Time(t) => {
            writer.write_struct_header(sig::TIME, 2)?;
            writer.write_int(t.nanos_of_day);
            writer.write_int(t.offset_seconds as i64);
        }
        Value::LocalTime(t) => {
            writer.write_struct_header(sig::LOCAL_TIME, 1)?;
            writer.write_int(t.nanos_of_day);
        }
        Value::LocalDateTime(dt) => {
            writer.write_struct_header(sig::LOCAL_DATE_TIME, 2)?;
            writer.write_int(dt.epoch_second);
            writer.write_int(dt.nano as i64);
        }
        Value::DateTime(dt) => {
            let (offset_sig, zone_sig) = if dt.baseline == DateTimeBaseline::Utc {
                (sig::DATE_TIME_UTC_OFFSET, sig::DATE_TIME_UTC_ZONE_ID)
            } else {
                (
                    sig::DATE_TIME_LEGACY_OFFSET,
                    sig::DATE_TIME_LEGACY_ZONE_ID,
                )
            };
            match &dt.zone {
                Zone::Offset(offset) => {
                    writer.write_struct_header(offset_sig, 3)?;
                    writer.write_int(dt.epoch_second);
                    writer.write_int(dt.nano as i64);
                    writer.write_int(*offset as i64);
                }
                Zone::Named(zone_id) => {
                    writer.write_struct_header(zone_sig, 3)?;
                    writer.write_int(dt.epoch_second);
                    writer.write_int(dt.nano as i64);
                    writer.write_string(zone_id)?;
                }
            }
        }
        Value::Duration(d) => {
            writer.write_struct_header(sig::DURATION, 4)?;
            writer.write_int(d.months);
            writer.write_int(d.days);
            writer.write_int(d.seconds);
            writer.write_int(d.nanos as i64);
        }
        Value::Unsupported { kind, reason } => {
            return Err(PackStreamError::Overflow(format!(
                "cannot pack an unsupported {kind} value ({reason})"
            )))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::OrderedMap;

    fn roundtrip(value: Value) -> Value {
        let mut w = Writer::new();
        pack_value(&mut w, &value).unwrap();
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        unpack_value(&mut r, ProtocolMode::utc()).unwrap()
    }

    #[test]
    fn scalar_roundtrip() {
        assert_eq!(roundtrip(Value::Integer(-12345)), Value::Integer(-12345));
        assert_eq!(roundtrip(Value::Float(3.5)), Value::Float(3.5));
        assert_eq!(
            roundtrip(Value::String("hello bolt".into())),
            Value::String("hello bolt".into())
        );
        assert_eq!(roundtrip(Value::Boolean(true)), Value::Boolean(true));
        assert_eq!(roundtrip(Value::Null), Value::Null);
    }

    #[test]
    fn node_roundtrip() {
        let mut props = OrderedMap::new();
        props.insert("name", Value::String("Ada".into()));
        let node = Value::Node(Node {
            id: 1,
            element_id: "1".into(),
            labels: vec!["Person".into()],
            properties: props,
        });
        assert_eq!(roundtrip(node.clone()), node);
    }

    #[test]
    fn narrowest_int_encoding_roundtrips() {
        for v in [0i64, 42, -16, 127, 128, -17, 32768, i64::MAX, i64::MIN] {
            assert_eq!(roundtrip(Value::Integer(v)), Value::Integer(v));
        }
    }

    #[test]
    fn field_count_mismatch_is_protocol_violation() {
        let mut w = Writer::new();
        w.write_struct_header(sig::DATE, 2).unwrap();
        w.write_int(1);
        w.write_int(2);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let err = unpack_value(&mut r, ProtocolMode::utc()).unwrap_err();
        assert!(matches!(err, PackStreamError::FieldCountMismatch { .. }));
    }

    #[test]
    fn utc_mode_rejects_legacy_datetime_signature() {
        let mut w = Writer::new();
        w.write_struct_header(sig::DATE_TIME_LEGACY_OFFSET, 3).unwrap();
        w.write_int(1);
        w.write_int(0);
        w.write_int(0);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let err = unpack_value(&mut r, ProtocolMode::utc()).unwrap_err();
        assert!(matches!(err, PackStreamError::UnknownSignature(sig::DATE_TIME_LEGACY_OFFSET)));
    }

    #[test]
    fn legacy_mode_rejects_utc_datetime_signature() {
        let mut w = Writer::new();
        w.write_struct_header(sig::DATE_TIME_UTC_OFFSET, 3).unwrap();
        w.write_int(1);
        w.write_int(0);
        w.write_int(0);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let err = unpack_value(&mut r, ProtocolMode::legacy()).unwrap_err();
        assert!(matches!(err, PackStreamError::UnknownSignature(sig::DATE_TIME_UTC_OFFSET)));
    }

    #[test]
    fn unknown_zone_becomes_unsupported() {
        let mut w = Writer::new();
        w.write_struct_header(sig::DATE_TIME_UTC_ZONE_ID, 3).unwrap();
        w.write_int(1000);
        w.write_int(0);
        w.write_string("Mars/Cydonia").unwrap();
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let value = unpack_value(&mut r, ProtocolMode::utc()).unwrap();
        assert!(matches!(value, Value::Unsupported { .. }));
    }
}
