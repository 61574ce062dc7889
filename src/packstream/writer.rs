//! PackStream writer: encodes values into the narrowest marker form that
//! preserves their value, appending to an in-memory `BytesMut` buffer.

use super::marker::*;
use crate::error::PackStreamError;
use bytes::{BufMut, BytesMut};

pub struct Writer {
    buf: BytesMut,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    pub fn new() -> Self {
        Writer {
            buf: BytesMut::new(),
        }
    }

    pub fn into_bytes(self) -> BytesMut {
        self.buf
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn write_null(&mut self) {
        self.buf.put_u8(NULL);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.put_u8(if value { TRUE } else { FALSE });
    }

    /// Emit `value` in the narrowest signed-integer form that round-trips it.
    pub fn write_int(&mut self, value: i64) {
        if (-16..=127).contains(&value) {
            self.buf.put_u8(value as u8);
        } else if (i8::MIN as i64..=i8::MAX as i64).contains(&value) {
            self.buf.put_u8(INT_8);
            self.buf.put_i8(value as i8);
        } else if (i16::MIN as i64..=i16::MAX as i64).contains(&value) {
            self.buf.put_u8(INT_16);
            self.buf.put_i16(value as i16);
        } else if (i32::MIN as i64..=i32::MAX as i64).contains(&value) {
            self.buf.put_u8(INT_32);
            self.buf.put_i32(value as i32);
        } else {
            self.buf.put_u8(INT_64);
            self.buf.put_i64(value);
        }
    }

    pub fn write_float(&mut self, value: f64) {
        self.buf.put_u8(FLOAT_64);
        self.buf.put_f64(value);
    }

    pub fn write_bytes(&mut self, value: &[u8]) -> Result<(), PackStreamError> {
        let len = value.len();
        if len <= u8::MAX as usize {
            self.buf.put_u8(BYTES_8);
            self.buf.put_u8(len as u8);
        } else if len <= u16::MAX as usize {
            self.buf.put_u8(BYTES_16);
            self.buf.put_u16(len as u16);
        } else if len as u64 <= u32::MAX as u64 {
            self.buf.put_u8(BYTES_32);
            self.buf.put_u32(len as u32);
        } else {
            return Err(PackStreamError::Overflow(format!(
                "byte array of length {len} exceeds PackStream's 32-bit length prefix"
            )));
        }
        self.buf.put_slice(value);
        Ok(())
    }

    pub fn write_string(&mut self, value: &str) -> Result<(), PackStreamError> {
        let bytes = value.as_bytes();
        let len = bytes.len();
        if len <= 15 {
            self.buf.put_u8(TINY_STRING + len as u8);
        } else if len <= u8::MAX as usize {
            self.buf.put_u8(STRING_8);
            self.buf.put_u8(len as u8);
        } else if len <= u16::MAX as usize {
            self.buf.put_u8(STRING_16);
            self.buf.put_u16(len as u16);
        } else if len as u64 <= u32::MAX as u64 {
            self.buf.put_u8(STRING_32);
            self.buf.put_u32(len as u32);
        } else {
            return Err(PackStreamError::Overflow(format!(
                "string of length {len} exceeds PackStream's 32-bit length prefix"
            )));
        }
        self.buf.put_slice(bytes);
        Ok(())
    }

    pub fn write_list_header(&mut self, len: usize) -> Result<(), PackStreamError> {
        if len <= 15 {
            self.buf.put_u8(TINY_LIST + len as u8);
        } else if len <= u8::MAX as usize {
            self.buf.put_u8(LIST_8);
            self.buf.put_u8(len as u8);
        } else if len <= u16::MAX as usize {
            self.buf.put_u8(LIST_16);
            self.buf.put_u16(len as u16);
        } else if len as u64 <= u32::MAX as u64 {
            self.buf.put_u8(LIST_32);
            self.buf.put_u32(len as u32);
        } else {
            return Err(PackStreamError::Overflow(format!(
                "list of length {len} exceeds PackStream's 32-bit length prefix"
            )));
        }
        Ok(())
    }

    pub fn write_map_header(&mut self, len: usize) -> Result<(), PackStreamError> {
        if len <= 15 {
            self.buf.put_u8(TINY_MAP + len as u8);
        } else if len <= u8::MAX as usize {
            self.buf.put_u8(MAP_8);
            self.buf.put_u8(len as u8);
        } else if len <= u16::MAX as usize {
            self.buf.put_u8(MAP_16);
            self.buf.put_u16(len as u16);
        } else if len as u64 <= u32::MAX as u64 {
            self.buf.put_u8(MAP_32);
            self.buf.put_u32(len as u32);
        } else {
            return Err(PackStreamError::Overflow(format!(
                "map of length {len} exceeds PackStream's 32-bit length prefix"
            )));
        }
        Ok(())
    }

    pub fn write_struct_header(
        &mut self,
        signature: u8,
        field_count: u8,
    ) -> Result<(), PackStreamError> {
        if field_count > MAX_STRUCT_FIELDS {
            return Err(PackStreamError::Overflow(format!(
                "structure 0x{signature:02X} has {field_count} fields, max is {MAX_STRUCT_FIELDS}"
            )));
        }
        self.buf.put_u8(TINY_STRUCT + field_count);
        self.buf.put_u8(signature);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowest_int_encoding() {
        let mut w = Writer::new();
        w.write_int(42);
        assert_eq!(w.as_slice(), &[0x2A]);

        let mut w = Writer::new();
        w.write_int(1000);
        assert_eq!(w.as_slice()[0], INT_16);
    }

    #[test]
    fn tiny_string_roundtrips() {
        let mut w = Writer::new();
        w.write_string("abc").unwrap();
        let bytes = w.into_bytes();
        let mut r = super::super::reader::Reader::new(&bytes);
        assert_eq!(r.read_string().unwrap(), "abc");
    }
}
