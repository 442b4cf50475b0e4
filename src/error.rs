//! Defines error types used by this library.

use crate::{Fault, Kind};

use chrono::{DateTime, Utc};
use thiserror::Error;
use xml::common::TextPosition;
use xml::reader::Error as XmlError;

use std::error::Error as StdError;
use std::io;

/// A boxed error returned by a [`Transport`](crate::Transport) implementation.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// A call could not be completed.
///
/// Every variant describes a distinct condition: the arguments could not be encoded, the request
/// never produced a usable response, the response was not valid XML-RPC, or the server answered
/// with a `<fault>`.
#[derive(Debug, Error)]
pub enum Error {
    /// An argument could not be converted into an XML-RPC value or written out.
    #[error("could not encode request: {0}")]
    Encode(#[from] EncodeError),

    /// The transport failed or the server answered with a non-success status. The response body
    /// is not looked at in this case.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response could not be parsed. This can happen when the server doesn't correctly
    /// implement the XML-RPC spec.
    #[error("malformed response: {0}")]
    MalformedResponse(#[from] ParseError),

    /// The server returned a well-formed `<fault>` response.
    #[error("server returned a fault: {0}")]
    Fault(#[from] Fault),
}

impl Error {
    /// If this error was caused by the server responding with a `<fault>` response,
    /// returns the `Fault` in question.
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            Error::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}

/// Failure reported by, or derived from, the transport collaborator.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server responded with a status code outside of `200..300`.
    #[error("server response indicates error: status {0}")]
    Status(u16),

    /// Sending the request or receiving the response failed, or the transport refused the reply
    /// (for HTTP, a success status with a `Content-Type` that is not XML).
    #[error("{0}")]
    Failed(#[source] BoxError),
}

/// A native value could not be turned into an XML-RPC request.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The integer does not fit into the signed 32-bit range of `<int>`.
    #[error("integer {0} does not fit into a 32-bit XML-RPC <int>")]
    IntOutOfRange(i128),

    /// XML-RPC has no representation for NaN or infinities.
    #[error("cannot encode non-finite double {0}")]
    NonFiniteDouble(f64),

    /// `<dateTime.iso8601>` only has room for the years 0000 to 9999.
    #[error("timestamp {0} has a year outside of 0000..=9999")]
    DateTimeOutOfRange(DateTime<Utc>),

    /// The document writer failed.
    #[error("could not write request: {0}")]
    Io(#[from] io::Error),
}

/// Describes possible errors that can occur when parsing a response.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Error while parsing (malformed?) XML.
    #[error("malformed XML: {0}")]
    Xml(#[from] XmlError),

    /// Could not parse the given character data as XML-RPC value.
    ///
    /// For example, `<value><int>AAA</int></value>` describes an invalid value.
    #[error("invalid value for type '{for_type}' at {position}: {found}")]
    InvalidValue {
        /// The type for which an invalid value was supplied (eg. `int` or `dateTime.iso8601`).
        for_type: &'static str,
        /// The value we encountered, as a string.
        found: String,
        /// The position of the invalid value inside the XML document.
        position: TextPosition,
    },

    /// Found an unexpected tag, attribute, text or end of document.
    #[error("unexpected XML at {position} (expected {expected}, found {found})")]
    UnexpectedXml {
        /// A short description of the kind of data that was expected.
        expected: String,
        /// A short description of what was found instead.
        found: String,
        /// The position of the unexpected data inside the XML document.
        position: TextPosition,
    },

    /// Arrays and structs are nested deeper than the parser follows.
    #[error("values nested deeper than {limit} levels at {position}")]
    TooDeep {
        /// The maximum number of nested arrays and structs.
        limit: usize,
        /// The position of the container that exceeded the limit.
        position: TextPosition,
    },

    /// A `<fault>` did not carry an int `faultCode` and a string `faultString` (and nothing else).
    #[error("malformed <fault> at {position}")]
    InvalidFault {
        /// The position of the `<fault>` value inside the XML document.
        position: TextPosition,
    },
}

/// A typed accessor was called on a [`Value`](crate::Value) of a different [`Kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("type mismatch: expected {expected}, found {found}")]
pub struct TypeMismatch {
    /// The kind the accessor reads.
    pub expected: Kind,
    /// The kind of the value it was called on.
    pub found: Kind,
}
