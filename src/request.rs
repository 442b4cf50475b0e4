use crate::error::EncodeError;
use crate::utils::escape_xml;
use crate::{ToValue, Value};

use std::io::{self, Write};

/// A request to call a procedure.
#[derive(Clone, Debug, PartialEq)]
pub struct Request<'a> {
    name: &'a str,
    args: Vec<Value>,
}

impl<'a> Request<'a> {
    /// Creates a new request to call a function named `name`.
    ///
    /// By default, no arguments are passed. Use the `arg` method to append arguments.
    pub fn new(name: &'a str) -> Self {
        Request {
            name,
            args: Vec::new(),
        }
    }

    /// Creates a request with all arguments converted through [`ToValue`].
    ///
    /// # Errors
    ///
    /// Fails on the first argument that has no XML-RPC representation, such as an integer outside
    /// of the 32-bit range.
    pub fn with_args(name: &'a str, args: &[&dyn ToValue]) -> Result<Self, EncodeError> {
        let args = args
            .iter()
            .map(|arg| arg.to_value())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Request { name, args })
    }

    /// Appends an argument to be passed to the current list of arguments.
    pub fn arg<T: Into<Value>>(mut self, value: T) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Formats this `Request` as a UTF-8 encoded XML document.
    ///
    /// The document contains no whitespace between elements, so the output for a given request is
    /// byte-for-byte reproducible.
    ///
    /// # Errors
    ///
    /// Any errors reported by the writer will be propagated to the caller, as will the error for a
    /// non-finite `Double` argument (see [`Value::write_as_xml`]).
    pub fn write_as_xml<W: Write>(&self, fmt: &mut W) -> io::Result<()> {
        write!(fmt, r#"<?xml version="1.0"?>"#)?;
        write!(fmt, "<methodCall>")?;
        write!(fmt, "<methodName>{}</methodName>", escape_xml(self.name))?;
        write!(fmt, "<params>")?;
        for value in &self.args {
            write!(fmt, "<param>")?;
            value.write_as_xml(fmt)?;
            write!(fmt, "</param>")?;
        }
        write!(fmt, "</params>")?;
        write!(fmt, "</methodCall>")?;
        Ok(())
    }
}
