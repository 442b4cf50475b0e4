//! Contains the different types of values understood by XML-RPC.

use crate::error::TypeMismatch;
use crate::utils::{escape_xml, format_datetime, has_wire_year, truncate_datetime};

use chrono::{DateTime, Utc};

use std::fmt::{self, Display, Formatter};
use std::io::{self, Write};

/// The type of a [`Value`]. Fixed when the value is constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Array,
    Base64,
    Bool,
    DateTime,
    Double,
    Int,
    String,
    Struct,
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match *self {
            Kind::Array => "array",
            Kind::Base64 => "base64",
            Kind::Bool => "bool",
            Kind::DateTime => "dateTime",
            Kind::Double => "double",
            Kind::Int => "int",
            Kind::String => "string",
            Kind::Struct => "struct",
        })
    }
}

/// The possible XML-RPC values.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// `<array>`, a list of arbitrary (heterogeneous) values.
    Array(Vec<Value>),
    /// `<base64>`, base64-encoded binary data.
    Base64(Vec<u8>),
    /// `<boolean>`
    Bool(bool),
    /// `<dateTime.iso8601>`, a UTC timestamp with second precision.
    DateTime(DateTime<Utc>),
    /// `<double>`
    Double(f64),
    /// `<i4>` or `<int>`, 32-bit signed integer.
    Int(i32),
    /// `<string>`
    String(String),
    /// `<struct>`, a list of named members.
    ///
    /// Decoded structs keep the order the members had on the wire. When written out, members are
    /// always emitted sorted by name.
    Struct(Vec<Member>),
}

/// A named value inside a `<struct>`.
#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    name: String,
    value: Value,
}

impl Member {
    pub fn new<N: Into<String>, V: Into<Value>>(name: N, value: V) -> Self {
        Member {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Value {
    /// Returns the kind of this value.
    pub fn kind(&self) -> Kind {
        match *self {
            Value::Array(_) => Kind::Array,
            Value::Base64(_) => Kind::Base64,
            Value::Bool(_) => Kind::Bool,
            Value::DateTime(_) => Kind::DateTime,
            Value::Double(_) => Kind::Double,
            Value::Int(_) => Kind::Int,
            Value::String(_) => Kind::String,
            Value::Struct(_) => Kind::Struct,
        }
    }

    fn mismatch(&self, expected: Kind) -> TypeMismatch {
        TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    pub fn try_bool(&self) -> Result<bool, TypeMismatch> {
        match *self {
            Value::Bool(b) => Ok(b),
            _ => Err(self.mismatch(Kind::Bool)),
        }
    }

    pub fn try_int(&self) -> Result<i32, TypeMismatch> {
        match *self {
            Value::Int(i) => Ok(i),
            _ => Err(self.mismatch(Kind::Int)),
        }
    }

    pub fn try_double(&self) -> Result<f64, TypeMismatch> {
        match *self {
            Value::Double(d) => Ok(d),
            _ => Err(self.mismatch(Kind::Double)),
        }
    }

    /// Returns the text of a `<string>`.
    pub fn try_text(&self) -> Result<&str, TypeMismatch> {
        match *self {
            Value::String(ref s) => Ok(s),
            _ => Err(self.mismatch(Kind::String)),
        }
    }

    /// Returns the decoded payload of a `<base64>`.
    pub fn try_bytes(&self) -> Result<&[u8], TypeMismatch> {
        match *self {
            Value::Base64(ref data) => Ok(data),
            _ => Err(self.mismatch(Kind::Base64)),
        }
    }

    pub fn try_time(&self) -> Result<DateTime<Utc>, TypeMismatch> {
        match *self {
            Value::DateTime(date_time) => Ok(date_time),
            _ => Err(self.mismatch(Kind::DateTime)),
        }
    }

    /// Returns the elements of an `<array>`.
    pub fn try_values(&self) -> Result<&[Value], TypeMismatch> {
        match *self {
            Value::Array(ref values) => Ok(values),
            _ => Err(self.mismatch(Kind::Array)),
        }
    }

    /// Returns the members of a `<struct>`.
    pub fn try_members(&self) -> Result<&[Member], TypeMismatch> {
        match *self {
            Value::Struct(ref members) => Ok(members),
            _ => Err(self.mismatch(Kind::Struct)),
        }
    }

    /// Like [`try_bool`](#method.try_bool), but panics with the `TypeMismatch` if `self` is not
    /// a `Bool`.
    ///
    /// The other unchecked accessors (`int`, `double`, `text`, `bytes`, `time`, `values` and
    /// `members`) behave the same way.
    pub fn bool(&self) -> bool {
        unwrap_kind(self.try_bool())
    }

    pub fn int(&self) -> i32 {
        unwrap_kind(self.try_int())
    }

    pub fn double(&self) -> f64 {
        unwrap_kind(self.try_double())
    }

    pub fn text(&self) -> &str {
        unwrap_kind(self.try_text())
    }

    pub fn bytes(&self) -> &[u8] {
        unwrap_kind(self.try_bytes())
    }

    pub fn time(&self) -> DateTime<Utc> {
        unwrap_kind(self.try_time())
    }

    pub fn values(&self) -> &[Value] {
        unwrap_kind(self.try_values())
    }

    pub fn members(&self) -> &[Member] {
        unwrap_kind(self.try_members())
    }

    /// Returns the value of the first struct member called `name`.
    ///
    /// Returns `None` if there is no such member or `self` is not a `Struct`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match *self {
            Value::Struct(ref members) => members
                .iter()
                .find(|member| member.name == name)
                .map(Member::value),
            _ => None,
        }
    }

    /// Formats this `Value` as an XML `<value>` element.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidInput` if the tree contains a NaN or infinite `Double`, or a `DateTime`
    /// whose year does not have four digits. Propagates any error reported by the writer.
    pub fn write_as_xml<W: Write>(&self, fmt: &mut W) -> io::Result<()> {
        write!(fmt, "<value>")?;

        match *self {
            Value::Array(ref values) => {
                write!(fmt, "<array><data>")?;
                for value in values {
                    value.write_as_xml(fmt)?;
                }
                write!(fmt, "</data></array>")?;
            }
            Value::Base64(ref data) => {
                write!(fmt, "<base64>{}</base64>", base64::encode(data))?;
            }
            Value::Bool(b) => {
                write!(fmt, "<boolean>{}</boolean>", b)?;
            }
            Value::DateTime(ref date_time) => {
                if !has_wire_year(date_time) {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("cannot encode timestamp {} outside of the years 0000..=9999", date_time),
                    ));
                }
                write!(fmt, "<dateTime.iso8601>{}</dateTime.iso8601>", format_datetime(date_time))?;
            }
            Value::Double(d) => {
                if !d.is_finite() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("cannot encode non-finite double {}", d),
                    ));
                }
                // `Display` for f64 is the shortest representation that parses back to `d`
                write!(fmt, "<double>{}</double>", d)?;
            }
            Value::Int(i) => {
                write!(fmt, "<int>{}</int>", i)?;
            }
            Value::String(ref s) => {
                write!(fmt, "<string>{}</string>", escape_xml(s))?;
            }
            Value::Struct(ref members) => {
                let mut sorted: Vec<&Member> = members.iter().collect();
                sorted.sort_by(|a, b| a.name.cmp(&b.name));

                write!(fmt, "<struct>")?;
                for member in sorted {
                    write!(fmt, "<member><name>{}</name>", escape_xml(&member.name))?;
                    member.value.write_as_xml(fmt)?;
                    write!(fmt, "</member>")?;
                }
                write!(fmt, "</struct>")?;
            }
        }

        write!(fmt, "</value>")?;
        Ok(())
    }
}

fn unwrap_kind<T>(result: Result<T, TypeMismatch>) -> T {
    match result {
        Ok(t) => t,
        Err(mismatch) => panic!("{}", mismatch),
    }
}

impl From<bool> for Value {
    fn from(other: bool) -> Self {
        Value::Bool(other)
    }
}

impl From<i8> for Value {
    fn from(other: i8) -> Self {
        Value::Int(other.into())
    }
}

impl From<i16> for Value {
    fn from(other: i16) -> Self {
        Value::Int(other.into())
    }
}

impl From<i32> for Value {
    fn from(other: i32) -> Self {
        Value::Int(other)
    }
}

impl From<u16> for Value {
    fn from(other: u16) -> Self {
        Value::Int(other.into())
    }
}

impl From<f32> for Value {
    fn from(other: f32) -> Self {
        Value::Double(other.into())
    }
}

impl From<f64> for Value {
    fn from(other: f64) -> Self {
        Value::Double(other)
    }
}

impl From<String> for Value {
    fn from(other: String) -> Self {
        Value::String(other)
    }
}

impl<'a> From<&'a str> for Value {
    fn from(other: &'a str) -> Self {
        Value::String(other.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(other: Vec<u8>) -> Self {
        Value::Base64(other)
    }
}

impl<'a> From<&'a [u8]> for Value {
    fn from(other: &'a [u8]) -> Self {
        Value::Base64(other.to_vec())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(other: DateTime<Utc>) -> Self {
        Value::DateTime(truncate_datetime(other))
    }
}

impl From<Vec<Value>> for Value {
    fn from(other: Vec<Value>) -> Self {
        Value::Array(other)
    }
}

impl From<Vec<Member>> for Value {
    fn from(other: Vec<Member>) -> Self {
        Value::Struct(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn render(value: &Value) -> String {
        let mut output: Vec<u8> = Vec::new();
        value.write_as_xml(&mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn escapes_strings() {
        assert_eq!(
            render(&Value::from("<xml>&nbsp;string")),
            "<value><string>&lt;xml&gt;&amp;nbsp;string</string></value>"
        );
    }

    #[test]
    fn escapes_struct_member_names() {
        let value = Value::Struct(vec![Member::new("x&<x", true)]);
        assert_eq!(
            render(&value),
            "<value><struct><member><name>x&amp;&lt;x</name><value><boolean>true</boolean></value></member></struct></value>"
        );
    }

    #[test]
    fn renders_struct_members_sorted() {
        let value = Value::Struct(vec![
            Member::new("foo", "bar"),
            Member::new("answers", vec![Value::Int(42)]),
        ]);
        assert_eq!(
            render(&value),
            "<value><struct>\
             <member><name>answers</name><value><array><data><value><int>42</int></value></data></array></value></member>\
             <member><name>foo</name><value><string>bar</string></value></member>\
             </struct></value>"
        );
        // rendering does not reorder the value itself
        assert_eq!(value.members()[0].name(), "foo");
    }

    #[test]
    fn renders_doubles_shortest() {
        assert_eq!(render(&Value::Double(0.0)), "<value><double>0</double></value>");
        assert_eq!(render(&Value::Double(1337.42)), "<value><double>1337.42</double></value>");
        assert_eq!(render(&Value::Double(-1337.42)), "<value><double>-1337.42</double></value>");
        assert_eq!(render(&Value::Double(1e21)), "<value><double>1000000000000000000000</double></value>");
    }

    #[test]
    fn rejects_non_finite_doubles() {
        let mut output = Vec::new();
        let err = Value::Double(f64::NAN).write_as_xml(&mut output).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(Value::Array(vec![Value::Double(f64::INFINITY)])
            .write_as_xml(&mut Vec::new())
            .is_err());
    }

    #[test]
    fn rejects_years_without_four_digits() {
        for year in [10000, -1] {
            let value = Value::from(Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap());
            let err = value.write_as_xml(&mut Vec::new()).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        }
        assert_eq!(
            render(&Value::from(Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap())),
            "<value><dateTime.iso8601>9999-12-31T23:59:59Z</dateTime.iso8601></value>"
        );
    }

    #[test]
    fn renders_scalars() {
        assert_eq!(render(&Value::Bool(false)), "<value><boolean>false</boolean></value>");
        assert_eq!(render(&Value::Int(-1337)), "<value><int>-1337</int></value>");
        assert_eq!(render(&Value::Base64(Vec::new())), "<value><base64></base64></value>");
        assert_eq!(
            render(&Value::from(&b"Hello, world!"[..])),
            "<value><base64>SGVsbG8sIHdvcmxkIQ==</base64></value>"
        );
        assert_eq!(render(&Value::from("")), "<value><string></string></value>");
        assert_eq!(
            render(&Value::from(Utc.with_ymd_and_hms(1998, 7, 17, 14, 8, 55).unwrap())),
            "<value><dateTime.iso8601>1998-07-17T14:08:55Z</dateTime.iso8601></value>"
        );
    }

    #[test]
    fn kinds_are_fixed_by_variant() {
        assert_eq!(Value::from(true).kind(), Kind::Bool);
        assert_eq!(Value::from(7i16).kind(), Kind::Int);
        assert_eq!(Value::from(1.5f32).kind(), Kind::Double);
        assert_eq!(Value::from("x").kind(), Kind::String);
        assert_eq!(Value::from(vec![1u8, 2]).kind(), Kind::Base64);
        assert_eq!(Value::from(Vec::<Value>::new()).kind(), Kind::Array);
        assert_eq!(Value::from(Vec::<Member>::new()).kind(), Kind::Struct);
    }

    #[test]
    fn checked_accessors_report_mismatch() {
        let value = Value::from("42");
        assert_eq!(value.try_text(), Ok("42"));
        assert_eq!(
            value.try_int(),
            Err(TypeMismatch { expected: Kind::Int, found: Kind::String })
        );
        assert_eq!(
            Value::Int(1).try_bool(),
            Err(TypeMismatch { expected: Kind::Bool, found: Kind::Int })
        );
        assert!(Value::Bool(true).try_double().is_err());
        assert!(Value::Bool(true).try_bytes().is_err());
        assert!(Value::Bool(true).try_time().is_err());
        assert!(Value::Bool(true).try_values().is_err());
        assert!(Value::Bool(true).try_members().is_err());
    }

    #[test]
    #[should_panic(expected = "type mismatch: expected int, found string")]
    fn unchecked_accessor_panics_on_mismatch() {
        Value::from("1").int();
    }

    #[test]
    fn get_finds_members() {
        let value = Value::Struct(vec![
            Member::new("a", Value::Int(1)),
            Member::new("b", Value::Int(2)),
            Member::new("a", Value::Int(3)),
        ]);
        assert_eq!(value.get("a"), Some(&Value::Int(1)));
        assert_eq!(value.get("b").map(Value::int), Some(2));
        assert_eq!(value.get("c"), None);
        assert_eq!(Value::Int(1).get("a"), None);
    }

    #[test]
    fn datetime_conversion_drops_subseconds() {
        let date_time = Utc.with_ymd_and_hms(2016, 5, 2, 6, 1, 5).unwrap()
            + chrono::Duration::milliseconds(750);
        let value = Value::from(date_time);
        assert_eq!(value.time(), Utc.with_ymd_and_hms(2016, 5, 2, 6, 1, 5).unwrap());
        assert_eq!(
            render(&value),
            "<value><dateTime.iso8601>2016-05-02T06:01:05Z</dateTime.iso8601></value>"
        );
    }
}
