//! The Bolt request/response message set: thin wrappers over PackStream
//! structures whose signature picks the message kind.

use crate::error::{BoltError, PackStreamError};
use crate::packstream::marker::PeekType;
use crate::packstream::{Reader, Writer};
use crate::signatures::{pack_value, unpack_value, ProtocolMode};
use crate::value::{OrderedMap, Value};

pub mod sig {
    pub const HELLO: u8 = 0x01;
    pub const GOODBYE: u8 = 0x02;
    pub const RESET: u8 = 0x0F;
    pub const RUN: u8 = 0x10;
    pub const BEGIN: u8 = 0x11;
    pub const COMMIT: u8 = 0x12;
    pub const ROLLBACK: u8 = 0x13;
    pub const DISCARD: u8 = 0x2F;
    pub const PULL: u8 = 0x3F;
    pub const SUCCESS: u8 = 0x70;
    pub const RECORD: u8 = 0x71;
    pub const IGNORED: u8 = 0x7E;
    pub const FAILURE: u8 = 0x7F;
}

#[derive(Debug, Clone)]
pub enum Request {
    Hello { auth: OrderedMap },
    Goodbye,
    Reset,
    Run {
        query: String,
        params: OrderedMap,
        meta: OrderedMap,
    },
    Begin { meta: OrderedMap },
    Commit,
    Rollback,
    Discard { meta: OrderedMap },
    Pull { meta: OrderedMap },
}

impl Request {
    pub fn encode(&self) -> Result<Vec<u8>, PackStreamError> {
        let mut w = Writer::new();
        match self {
            Request::Hello { auth } => {
                w.write_struct_header(sig::HELLO, 1)?;
                pack_value(&mut w, &Value::Map(auth.clone()))?;
            }
            Request::Goodbye => {
                w.write_struct_header(sig::GOODBYE, 0)?;
            }
            Request::Reset => {
                w.write_struct_header(sig::RESET, 0)?;
            }
            Request::Run {
                query,
                params,
                meta,
            } => {
                w.write_struct_header(sig::RUN, 3)?;
                w.write_string(query)?;
                pack_value(&mut w, &Value::Map(params.clone()))?;
                pack_value(&mut w, &Value::Map(meta.clone()))?;
            }
            Request::Begin { meta } => {
                w.write_struct_header(sig::BEGIN, 1)?;
                pack_value(&mut w, &Value::Map(meta.clone()))?;
            }
            Request::Commit => {
                w.write_struct_header(sig::COMMIT, 0)?;
            }
            Request::Rollback => {
                w.write_struct_header(sig::ROLLBACK, 0)?;
            }
            Request::Discard { meta } => {
                w.write_struct_header(sig::DISCARD, 1)?;
                pack_value(&mut w, &Value::Map(meta.clone()))?;
            }
            Request::Pull { meta } => {
                w.write_struct_header(sig::PULL, 1)?;
                pack_value(&mut w, &Value::Map(meta.clone()))?;
            }
        }
        Ok(w.into_bytes().to_vec())
    }
}

#[derive(Debug, Clone)]
pub enum Response {
    Success(OrderedMap),
    Record(Vec<Value>),
    Ignored,
    Failure { code: String, message: String },
}

impl Response {
    pub fn decode(bytes: &[u8], mode: ProtocolMode) -> Result<Response, PackStreamError> {
        let mut r = Reader::new(bytes);
        if r.peek_type()? != PeekType::Struct {
            return Err(PackStreamError::Malformed(0));
        }
        let (signature, field_count) = r.read_struct_header()?;
        match signature {
            sig::SUCCESS => {
                if field_count != 1 {
                    return Err(PackStreamError::FieldCountMismatch {
                        signature,
                        expected: 1,
                        actual: field_count,
                    });
                }
                match unpack_value(&mut r, mode)? {
                    Value::Map(m) => Ok(Response::Success(m)),
                    other => Err(PackStreamError::InvalidUtf8(format!(
                        "SUCCESS metadata must be a map, got {}",
                        other.type_name()
                    ))),
                }
            }
            sig::RECORD => {
                if field_count != 1 {
                    return Err(PackStreamError::FieldCountMismatch {
                        signature,
                        expected: 1,
                        actual: field_count,
                    });
                }
                match unpack_value(&mut r, mode)? {
                    Value::List(items) => Ok(Response::Record(items)),
                    other => Err(PackStreamError::InvalidUtf8(format!(
                        "RECORD fields must be a list, got {}",
                        other.type_name()
                    ))),
                }
            }
            sig::IGNORED => {
                if field_count != 0 {
                    return Err(PackStreamError::FieldCountMismatch {
                        signature,
                        expected: 0,
                        actual: field_count,
                    });
                }
                Ok(Response::Ignored)
            }
            sig::FAILURE => {
                if field_count != 1 {
                    return Err(PackStreamError::FieldCountMismatch {
                        signature,
                        expected: 1,
                        actual: field_count,
                    });
                }
                match unpack_value(&mut r, mode)? {
                    Value::Map(m) => {
                        let code = m
                            .get("code")
                            .and_then(|v| v.coerce_string().ok().flatten())
                            .unwrap_or_else(|| "Neo.DatabaseError.General.UnknownError".to_string());
                        let message = m
                            .get("message")
                            .and_then(|v| v.coerce_string().ok().flatten())
                            .unwrap_or_default();
                        Ok(Response::Failure { code, message })
                    }
                    other => Err(PackStreamError::InvalidUtf8(format!(
                        "FAILURE metadata must be a map, got {}",
                        other.type_name()
                    ))),
                }
            }
            other => Err(PackStreamError::UnknownSignature(other)),
        }
    }
}

/// Classify a `FAILURE` code's namespace prefix: `Client.*` and
/// `*.DatabaseError.*` surface immediately; `*.TransientError.*` is
/// surfaced but marked retryable.
pub fn is_retryable(code: &str) -> bool {
    code.split('.').nth(1) == Some("TransientError")
}

pub fn failure_to_error(code: String, message: String) -> BoltError {
    let retryable = is_retryable(&code);
    BoltError::ServerFailure {
        code,
        message,
        retryable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_roundtrips_through_decode_shape() {
        let req = Request::Hello {
            auth: OrderedMap::new(),
        };
        let bytes = req.encode().unwrap();
        assert_eq!(bytes[0], 0xB1); // tiny struct, 1 field
        assert_eq!(bytes[1], sig::HELLO);
    }

    #[test]
    fn success_decodes() {
        let mut meta = OrderedMap::new();
        meta.insert("server", Value::String("Neo4j/5.20".into()));
        let mut w = Writer::new();
        w.write_struct_header(sig::SUCCESS, 1).unwrap();
        pack_value(&mut w, &Value::Map(meta)).unwrap();
        let bytes = w.into_bytes();
        match Response::decode(&bytes, ProtocolMode::utc()).unwrap() {
            Response::Success(m) => assert_eq!(
                m.get("server"),
                Some(&Value::String("Neo4j/5.20".into()))
            ),
            other => panic!("expected Success, got {other:?}"),
        }
    }

    #[test]
    fn transient_failure_is_retryable() {
        assert!(is_retryable("Neo.TransientError.Transaction.DeadlockDetected"));
        assert!(!is_retryable("Neo.ClientError.Statement.SyntaxError"));
    }
}
