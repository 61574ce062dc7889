//! Non-blocking reader over an in-memory PackStream buffer.
//!
//! The reader never touches I/O itself — it consumes bytes already framed
//! and assembled by the connection actor (see [`crate::bolt::framing`]) and
//! fails fast with [`PackStreamError`] on truncation or malformed markers.

use super::marker::*;
use crate::error::PackStreamError;
use bytes::Buf;

pub struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf }
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn need(&self, n: usize, what: &'static str) -> Result<(), PackStreamError> {
        if self.buf.remaining() < n {
            Err(PackStreamError::Truncated(what))
        } else {
            Ok(())
        }
    }

    fn peek_marker(&self) -> Result<u8, PackStreamError> {
        if self.buf.is_empty() {
            return Err(PackStreamError::Truncated("marker byte"));
        }
        Ok(self.buf[0])
    }

    /// Classify the next marker without consuming it.
    pub fn peek_type(&self) -> Result<PeekType, PackStreamError> {
        let marker = self.peek_marker()?;
        classify(marker).ok_or(PackStreamError::Malformed(marker))
    }

    fn read_u8(&mut self) -> Result<u8, PackStreamError> {
        self.need(1, "u8")?;
        Ok(self.buf.get_u8())
    }

    fn read_i8(&mut self) -> Result<i8, PackStreamError> {
        self.need(1, "i8")?;
        Ok(self.buf.get_i8())
    }

    fn read_u16(&mut self) -> Result<u16, PackStreamError> {
        self.need(2, "u16")?;
        Ok(self.buf.get_u16())
    }

    fn read_u32(&mut self) -> Result<u32, PackStreamError> {
        self.need(4, "u32")?;
        Ok(self.buf.get_u32())
    }

    fn read_i16(&mut self) -> Result<i16, PackStreamError> {
        self.need(2, "i16")?;
        Ok(self.buf.get_i16())
    }

    fn read_i32(&mut self) -> Result<i32, PackStreamError> {
        self.need(4, "i32")?;
        Ok(self.buf.get_i32())
    }

    fn read_i64(&mut self) -> Result<i64, PackStreamError> {
        self.need(8, "i64")?;
        Ok(self.buf.get_i64())
    }

    fn read_f64(&mut self) -> Result<f64, PackStreamError> {
        self.need(8, "f64")?;
        Ok(self.buf.get_f64())
    }

    fn read_raw(&mut self, n: usize) -> Result<&'a [u8], PackStreamError> {
        self.need(n, "raw bytes")?;
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    pub fn read_null(&mut self) -> Result<(), PackStreamError> {
        let marker = self.read_u8()?;
        if marker == NULL {
            Ok(())
        } else {
            Err(PackStreamError::Malformed(marker))
        }
    }

    pub fn read_bool(&mut self) -> Result<bool, PackStreamError> {
        let marker = self.read_u8()?;
        match marker {
            TRUE => Ok(true),
            FALSE => Ok(false),
            other => Err(PackStreamError::Malformed(other)),
        }
    }

    pub fn read_int(&mut self) -> Result<i64, PackStreamError> {
        let marker = self.peek_marker()?;
        match marker {
            0x00..=TINY_INT_POSITIVE_MAX => {
                self.read_u8()?;
                Ok(marker as i64)
            }
            TINY_INT_NEGATIVE_BASE..=0xFF => {
                self.read_u8()?;
                Ok((marker as i8) as i64)
            }
            INT_8 => {
                self.read_u8()?;
                Ok(self.read_i8()? as i64)
            }
            INT_16 => {
                self.read_u8()?;
                Ok(self.read_i16()? as i64)
            }
            INT_32 => {
                self.read_u8()?;
                Ok(self.read_i32()? as i64)
            }
            INT_64 => {
                self.read_u8()?;
                self.read_i64()
            }
            other => Err(PackStreamError::Malformed(other)),
        }
    }

    pub fn read_float(&mut self) -> Result<f64, PackStreamError> {
        let marker = self.read_u8()?;
        if marker == FLOAT_64 {
            self.read_f64()
        } else {
            Err(PackStreamError::Malformed(marker))
        }
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>, PackStreamError> {
        let marker = self.read_u8()?;
        let len = match marker {
            BYTES_8 => self.read_u8()? as usize,
            BYTES_16 => self.read_u16()? as usize,
            BYTES_32 => self.read_u32()? as usize,
            other => return Err(PackStreamError::Malformed(other)),
        };
        Ok(self.read_raw(len)?.to_vec())
    }

    pub fn read_string(&mut self) -> Result<String, PackStreamError> {
        let marker = self.read_u8()?;
        let len = match marker {
            TINY_STRING..=0x8F => (marker - TINY_STRING) as usize,
            STRING_8 => self.read_u8()? as usize,
            STRING_16 => self.read_u16()? as usize,
            STRING_32 => self.read_u32()? as usize,
            other => return Err(PackStreamError::Malformed(other)),
        };
        let raw = self.read_raw(len)?;
        String::from_utf8(raw.to_vec()).map_err(|e| PackStreamError::InvalidUtf8(e.to_string()))
    }

    /// Consume a list marker and return its declared element count.
    pub fn read_list_header(&mut self) -> Result<usize, PackStreamError> {
        let marker = self.read_u8()?;
        match marker {
            TINY_LIST..=0x9F => Ok((marker - TINY_LIST) as usize),
            LIST_8 => Ok(self.read_u8()? as usize),
            LIST_16 => Ok(self.read_u16()? as usize),
            LIST_32 => Ok(self.read_u32()? as usize),
            other => Err(PackStreamError::Malformed(other)),
        }
    }

    /// Consume a map marker and return its declared entry count.
    pub fn read_map_header(&mut self) -> Result<usize, PackStreamError> {
        let marker = self.read_u8()?;
        match marker {
            TINY_MAP..=0xAF => Ok((marker - TINY_MAP) as usize),
            MAP_8 => Ok(self.read_u8()? as usize),
            MAP_16 => Ok(self.read_u16()? as usize),
            MAP_32 => Ok(self.read_u32()? as usize),
            other => Err(PackStreamError::Malformed(other)),
        }
    }

    /// Consume a structure marker and return `(signature, field_count)`.
    pub fn read_struct_header(&mut self) -> Result<(u8, u8), PackStreamError> {
        let marker = self.read_u8()?;
        if !(TINY_STRUCT..=0xBF).contains(&marker) {
            return Err(PackStreamError::Malformed(marker));
        }
        let field_count = marker - TINY_STRUCT;
        let signature = self.read_u8()?;
        Ok((signature, field_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_tiny_int() {
        let buf = [0x2A];
        let mut r = Reader::new(&buf);
        assert_eq!(r.read_int().unwrap(), 42);
    }

    #[test]
    fn reads_negative_tiny_int() {
        let buf = [0xF6]; // -10
        let mut r = Reader::new(&buf);
        assert_eq!(r.read_int().unwrap(), -10);
    }

    #[test]
    fn truncated_input_fails() {
        let buf = [INT_64];
        let mut r = Reader::new(&buf);
        assert!(matches!(
            r.read_int(),
            Err(PackStreamError::Truncated("i64"))
        ));
    }

    #[test]
    fn unknown_marker_fails() {
        let buf = [0xC7];
        let r = Reader::new(&buf);
        assert!(matches!(r.peek_type(), Err(PackStreamError::Malformed(0xC7))));
    }
}
