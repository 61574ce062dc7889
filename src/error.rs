//! Crate-wide error hierarchy. Each subsystem gets its own `thiserror` enum;
//! they bridge upward into [`DriverError`] via `#[from]`, mirroring the way
//! a larger server crate composes a handful of typed subsystem errors into
//! one top-level error its public API returns.

use thiserror::Error;

/// Errors raised by the PackStream byte-level codec.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PackStreamError {
    #[error("unexpected end of input while reading a {0}")]
    Truncated(&'static str),
    #[error("unknown or malformed marker byte 0x{0:02X}")]
    Malformed(u8),
    #[error("value too large to encode: {0}")]
    Overflow(String),
    #[error("invalid UTF-8 in packed string: {0}")]
    InvalidUtf8(String),
    #[error("structure signature 0x{signature:02X} expects {expected} fields, got {actual}")]
    FieldCountMismatch {
        signature: u8,
        expected: u8,
        actual: u8,
    },
    #[error("structure signature 0x{0:02X} is not valid in the active protocol mode")]
    UnknownSignature(u8),
}

/// Errors raised by the Bolt connection state machine and message pipeline.
#[derive(Debug, Error)]
pub enum BoltError {
    #[error(transparent)]
    PackStream(#[from] PackStreamError),
    #[error("I/O error talking to the server: {0}")]
    Io(#[from] std::io::Error),
    #[error("no common Bolt version between client and server")]
    HandshakeFailed,
    #[error("connection is closed")]
    ConnectionClosed,
    #[error("message not legal in connection state {state:?}: {message}")]
    IllegalState { state: String, message: String },
    #[error("server returned FAILURE {code}: {message}")]
    ServerFailure {
        code: String,
        message: String,
        retryable: bool,
    },
    #[error("query exceeded its deadline")]
    Timeout,
    #[error("operation was cancelled")]
    Cancelled,
    #[error("request was abandoned because an earlier pipelined request failed")]
    Ignored,
    #[error("feature not supported: {0}")]
    Unsupported(String),
}

/// Errors raised projecting a [`crate::value::Value`] through a typed getter.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoercionError {
    #[error("cannot coerce {from} to {to}")]
    Mismatch { from: &'static str, to: &'static str },
    #[error("integer {value} out of range for {to}")]
    OutOfRange { value: i64, to: &'static str },
    #[error("value carries an unsupported {kind}: {reason}")]
    Unsupported { kind: String, reason: String },
    #[error("was_null() is only valid immediately after a getter read on the current row")]
    NoPriorRead,
}

/// Errors raised by the SQL → Cypher translator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TranslateError {
    #[error("syntax error at position {position}: {message}")]
    SyntaxError { position: usize, message: String },
    #[error("construct not supported by the translator: {0}")]
    Untranslatable(String),
}

/// Top-level error returned from the public driver API.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Bolt(#[from] BoltError),
    #[error(transparent)]
    PackStream(#[from] PackStreamError),
    #[error(transparent)]
    Coercion(#[from] CoercionError),
    #[error(transparent)]
    Translate(#[from] TranslateError),
}

pub type Result<T> = std::result::Result<T, DriverError>;
