use crate::{Member, Value};

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// A `<fault>` response, indicating that a request failed.
///
/// The XML-RPC specification requires that a `<faultCode>` and `<faultString>` is returned in the
/// `<fault>` case, further describing the error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fault {
    /// `faultCode` received from the server.
    code: i32,
    /// `faultString` received from the server.
    message: String,
}

impl Fault {
    /// Creates a new `Fault` from an error code and a message.
    pub fn new<S: Into<String>>(code: i32, message: S) -> Fault {
        Fault {
            code,
            message: message.into(),
        }
    }

    /// Returns the fault code.
    ///
    /// The meaning of this code is not specified by XML-RPC and depends on the service you are
    /// using.
    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creates a `Fault` from a `Value`.
    ///
    /// The `Value` must be a `Value::Struct` with an int `faultCode` and a string `faultString`
    /// member (and no other members).
    ///
    /// Returns `None` if the value isn't a valid `Fault`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let members = value.try_members().ok()?;
        if members.len() != 2 {
            // incorrect member count
            return None;
        }

        match (value.get("faultCode"), value.get("faultString")) {
            (Some(&Value::Int(code)), Some(Value::String(message))) => {
                Some(Fault::new(code, message.as_str()))
            }
            _ => None,
        }
    }

    /// Turns this `Fault` into an equivalent `Value`.
    ///
    /// The returned value can be parsed back into a `Fault` using `Fault::from_value`.
    pub fn to_value(&self) -> Value {
        Value::Struct(vec![
            Member::new("faultCode", self.code),
            Member::new("faultString", self.message.as_str()),
        ])
    }
}

impl Display for Fault {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl Error for Fault {}
