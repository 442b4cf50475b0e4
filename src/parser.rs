//! XML-RPC response parser.

use crate::error::ParseError;
use crate::utils::parse_datetime;
use crate::{Fault, Member, Value};

use xml::common::Position;
use xml::name::OwnedName;
use xml::reader::{EventReader, XmlEvent};
use xml::ParserConfig;

use std::io::Read;

pub type ParseResult<T> = Result<T, ParseError>;

/// The result of a method call as sent by the server: either the returned value or a `<fault>`.
pub type Response = Result<Value, Fault>;

/// How many arrays and structs may be nested inside each other.
pub const MAX_DEPTH: usize = 256;

pub struct Parser<R: Read> {
    reader: EventReader<R>,
    /// Number of arrays and structs currently open.
    depth: usize,
}

impl<R: Read> Parser<R> {
    pub fn new(reader: R) -> Self {
        Parser {
            reader: EventReader::new_with_config(
                reader,
                ParserConfig::new().cdata_to_characters(true),
            ),
            depth: 0,
        }
    }

    /// Reads an `XmlEvent` from a reader, disposing events we want to ignore.
    ///
    /// When encountering a new element, returns an `Err` if it has any attributes.
    fn pull_event(&mut self) -> ParseResult<XmlEvent> {
        loop {
            let event = self.reader.next()?;
            match event {
                XmlEvent::StartDocument { .. }
                | XmlEvent::Comment(_)
                | XmlEvent::Whitespace(_)
                | XmlEvent::ProcessingInstruction { .. } => continue, // skip these
                XmlEvent::StartElement { ref attributes, ref name, .. } => {
                    if !attributes.is_empty() {
                        return self.unexpected(
                            format!("tag <{}> without attributes", name),
                            &event,
                        );
                    }
                }
                _ => {}
            }

            return Ok(event);
        }
    }

    /// Expects an opening tag like `<tag>` without attributes (and a local name without namespaces).
    fn expect_open(&mut self, tag: &str) -> ParseResult<()> {
        match self.pull_event()? {
            XmlEvent::StartElement { ref name, .. } if name == &OwnedName::local(tag) => Ok(()),
            event => self.unexpected(format!("<{}>", tag), &event),
        }
    }

    /// Expects a closing tag like `</tag>` with a local name without namespaces.
    fn expect_close(&mut self, tag: &str) -> ParseResult<()> {
        match self.pull_event()? {
            XmlEvent::EndElement { ref name } if name == &OwnedName::local(tag) => Ok(()),
            event => self.unexpected(format!("</{}>", tag), &event),
        }
    }

    /// Reads the text content of the element `<tag>` up to and including `</tag>`.
    ///
    /// Unlike `pull_event`, this keeps whitespace, so `<string>  </string>` is not empty.
    fn read_text(&mut self, tag: &str) -> ParseResult<String> {
        let mut text = String::new();
        loop {
            match self.reader.next()? {
                XmlEvent::Characters(s) | XmlEvent::Whitespace(s) | XmlEvent::CData(s) => {
                    text.push_str(&s)
                }
                XmlEvent::Comment(_) | XmlEvent::ProcessingInstruction { .. } => {}
                XmlEvent::EndElement { ref name } if name == &OwnedName::local(tag) => {
                    return Ok(text)
                }
                event => return self.unexpected(format!("characters or </{}>", tag), &event),
            }
        }
    }

    /// Builds and returns an `Err(UnexpectedXml)`.
    fn unexpected<T, E: ToString>(&self, expected: E, found: &XmlEvent) -> ParseResult<T> {
        self.unexpected_found(expected, describe(found))
    }

    fn unexpected_found<T, E: ToString>(&self, expected: E, found: String) -> ParseResult<T> {
        Err(ParseError::UnexpectedXml {
            expected: expected.to_string(),
            found,
            position: self.reader.position(),
        })
    }

    fn invalid_value(&self, for_type: &'static str, found: String) -> ParseError {
        ParseError::InvalidValue {
            for_type,
            found,
            position: self.reader.position(),
        }
    }

    fn parse_response(&mut self) -> ParseResult<Response> {
        // <methodResponse>
        self.expect_open("methodResponse")?;

        // <fault> / <params>
        let response = match self.pull_event()? {
            XmlEvent::StartElement { ref name, .. } if name == &OwnedName::local("fault") => {
                let position = self.reader.position();
                let value = self.parse_value()?;
                let fault = Fault::from_value(&value)
                    .ok_or(ParseError::InvalidFault { position })?;
                self.expect_close("fault")?;
                Err(fault)
            }
            XmlEvent::StartElement { ref name, .. } if name == &OwnedName::local("params") => {
                // a response carries exactly one <param>
                self.expect_open("param")?;
                let value = self.parse_value()?;
                self.expect_close("param")?;
                self.expect_close("params")?;
                Ok(value)
            }
            event => return self.unexpected("<fault> or <params>", &event),
        };

        // </methodResponse>
        self.expect_close("methodResponse")?;

        Ok(response)
    }

    pub fn parse_value(&mut self) -> ParseResult<Value> {
        // <value>
        self.expect_open("value")?;

        let value = self.parse_value_inner()?;

        // </value>
        self.expect_close("value")?;

        Ok(value)
    }

    /// Parses the type element inside of a `<value>`.
    ///
    /// Untyped values (`<value>text</value>`) are rejected.
    fn parse_value_inner(&mut self) -> ParseResult<Value> {
        let name = match self.pull_event()? {
            XmlEvent::StartElement { name, .. } => name,
            event => return self.unexpected("type tag", &event),
        };

        if name.namespace.is_some() || name.prefix.is_some() {
            return self.unexpected_found("type tag without namespace", format!("<{}>", name));
        }

        let value = match name.local_name.as_str() {
            "struct" => self.nested(Self::parse_struct)?,
            "array" => self.nested(Self::parse_array)?,
            "string" => Value::String(self.read_text("string")?),
            "base64" => {
                let data = self.read_text("base64")?;
                // line breaks are common in long base64 payloads
                let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                match base64::decode(&compact) {
                    Ok(bytes) => Value::Base64(bytes),
                    Err(_) => return Err(self.invalid_value("base64", data)),
                }
            }
            tag @ ("int" | "i4") => {
                let data = self.read_text(tag)?;
                match data.trim().parse::<i32>() {
                    Ok(i) => Value::Int(i),
                    Err(_) => return Err(self.invalid_value("integer", data)),
                }
            }
            "boolean" => {
                let data = self.read_text("boolean")?;
                let parsed = match data.trim() {
                    "1" | "true" => Some(true),
                    "0" | "false" => Some(false),
                    _ => None,
                };
                match parsed {
                    Some(b) => Value::Bool(b),
                    None => return Err(self.invalid_value("boolean", data)),
                }
            }
            "double" => {
                let data = self.read_text("double")?;
                match data.trim().parse::<f64>() {
                    Ok(d) if d.is_finite() => Value::Double(d),
                    _ => return Err(self.invalid_value("double", data)),
                }
            }
            "dateTime.iso8601" => {
                let data = self.read_text("dateTime.iso8601")?;
                match parse_datetime(&data) {
                    Some(date_time) => Value::DateTime(date_time),
                    None => return Err(self.invalid_value("dateTime.iso8601", data)),
                }
            }
            _ => return self.unexpected_found("valid type tag", format!("<{}>", name)),
        };

        Ok(value)
    }

    /// Runs `parse` for a container value, failing once `MAX_DEPTH` containers are open.
    fn nested(&mut self, parse: fn(&mut Self) -> ParseResult<Value>) -> ParseResult<Value> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep {
                limit: MAX_DEPTH,
                position: self.reader.position(),
            });
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_struct(&mut self) -> ParseResult<Value> {
        let mut members = Vec::new();
        loop {
            match self.pull_event()? {
                XmlEvent::EndElement { ref name } if name == &OwnedName::local("struct") => break,
                XmlEvent::StartElement { ref name, .. } if name == &OwnedName::local("member") => {
                    // <name>NAME</name>
                    self.expect_open("name")?;
                    let name = self.read_text("name")?;

                    // Value
                    let value = self.parse_value()?;

                    // </member>
                    self.expect_close("member")?;

                    members.push(Member::new(name, value));
                }
                event => return self.unexpected("</struct> or <member>", &event),
            }
        }

        Ok(Value::Struct(members))
    }

    fn parse_array(&mut self) -> ParseResult<Value> {
        let mut elements = Vec::new();
        self.expect_open("data")?;
        loop {
            match self.pull_event()? {
                XmlEvent::EndElement { ref name } if name == &OwnedName::local("data") => break,
                XmlEvent::StartElement { ref name, .. } if name == &OwnedName::local("value") => {
                    elements.push(self.parse_value_inner()?);
                    self.expect_close("value")?;
                }
                event => return self.unexpected("</data> or <value>", &event),
            }
        }
        self.expect_close("array")?;

        Ok(Value::Array(elements))
    }
}

/// Short human-readable description of an event for error messages.
fn describe(event: &XmlEvent) -> String {
    match *event {
        XmlEvent::StartElement { ref name, .. } => format!("<{}>", name),
        XmlEvent::EndElement { ref name } => format!("</{}>", name),
        XmlEvent::Characters(ref s) | XmlEvent::CData(ref s) => format!("characters {:?}", s),
        XmlEvent::Whitespace(_) => "whitespace".to_string(),
        XmlEvent::EndDocument => "end of document".to_string(),
        ref other => format!("{:?}", other),
    }
}

/// Parses a response from an XML reader.
pub fn parse_response<R: Read>(reader: R) -> ParseResult<Response> {
    Parser::new(reader).parse_response()
}
