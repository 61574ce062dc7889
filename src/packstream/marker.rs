//! PackStream marker-byte constants and the coarse type families they select.
//! See Bolt's PackStream specification: every value begins with one marker
//! byte whose high nibble (or, for small integers, the whole byte) picks a
//! family, with the low bits or trailing bytes carrying length/value.

pub const NULL: u8 = 0xC0;
pub const FLOAT_64: u8 = 0xC1;
pub const FALSE: u8 = 0xC2;
pub const TRUE: u8 = 0xC3;

pub const INT_8: u8 = 0xC8;
pub const INT_16: u8 = 0xC9;
pub const INT_32: u8 = 0xCA;
pub const INT_64: u8 = 0xCB;

pub const BYTES_8: u8 = 0xCC;
pub const BYTES_16: u8 = 0xCD;
pub const BYTES_32: u8 = 0xCE;

pub const TINY_STRING: u8 = 0x80;
pub const STRING_8: u8 = 0xD0;
pub const STRING_16: u8 = 0xD1;
pub const STRING_32: u8 = 0xD2;

pub const TINY_LIST: u8 = 0x90;
pub const LIST_8: u8 = 0xD4;
pub const LIST_16: u8 = 0xD5;
pub const LIST_32: u8 = 0xD6;

pub const TINY_MAP: u8 = 0xA0;
pub const MAP_8: u8 = 0xD8;
pub const MAP_16: u8 = 0xD9;
pub const MAP_32: u8 = 0xDA;

pub const TINY_STRUCT: u8 = 0xB0;

/// Smallest/largest tiny-int markers: `[-16, 127]` fit directly in the marker byte.
pub const TINY_INT_NEGATIVE_BASE: u8 = 0xF0;
pub const TINY_INT_POSITIVE_MAX: u8 = 0x7F;

/// Maximum field count a tiny structure marker can carry (`0xB0 + n`, n <= 15).
pub const MAX_STRUCT_FIELDS: u8 = 15;

/// The coarse logical family a marker belongs to, exposed by a non-destructive
/// peek so callers can branch before committing to a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeekType {
    Null,
    Boolean,
    Integer,
    Float,
    Bytes,
    String,
    List,
    Map,
    Struct,
}

/// Classify a marker byte into its [`PeekType`] without consuming anything.
/// Returns `None` for a marker this codec doesn't recognise.
pub fn classify(marker: u8) -> Option<PeekType> {
    match marker {
        NULL => Some(PeekType::Null),
        FALSE | TRUE => Some(PeekType::Boolean),
        FLOAT_64 => Some(PeekType::Float),
        INT_8 | INT_16 | INT_32 | INT_64 => Some(PeekType::Integer),
        0x00..=TINY_INT_POSITIVE_MAX => Some(PeekType::Integer),
        TINY_INT_NEGATIVE_BASE..=0xFF => Some(PeekType::Integer),
        BYTES_8 | BYTES_16 | BYTES_32 => Some(PeekType::Bytes),
        STRING_8 | STRING_16 | STRING_32 => Some(PeekType::String),
        TINY_STRING..=0x8F => Some(PeekType::String),
        LIST_8 | LIST_16 | LIST_32 => Some(PeekType::List),
        TINY_LIST..=0x9F => Some(PeekType::List),
        MAP_8 | MAP_16 | MAP_32 => Some(PeekType::Map),
        TINY_MAP..=0xAF => Some(PeekType::Map),
        TINY_STRUCT..=0xBF => Some(PeekType::Struct),
        _ => None,
    }
}
