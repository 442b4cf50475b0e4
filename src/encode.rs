//! Conversion of native Rust values into XML-RPC values.

use crate::error::EncodeError;
use crate::utils::{has_wire_year, truncate_datetime};
use crate::{Member, Value};

use chrono::{DateTime, TimeZone, Utc};

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::time::SystemTime;

/// A native value that can be passed as an XML-RPC argument.
///
/// The set of implementations is closed and maps every supported type onto exactly one [`Kind`]:
///
/// | Rust | XML-RPC |
/// |---|---|
/// | `bool` | `<boolean>` |
/// | `i8`, `i16`, `i32`, `u16` | `<int>` |
/// | `i64`, `isize`, `u32`, `u64`, `usize` | `<int>`, if the value fits into 32 bits |
/// | `f32`, `f64` | `<double>` (finite values only) |
/// | `str`, `String` | `<string>` |
/// | `[u8]`, `Vec<u8>` | `<base64>` |
/// | `DateTime<Tz>`, `SystemTime` | `<dateTime.iso8601>`, in UTC, whole seconds, years 0000 to 9999 |
/// | `[T]`, `Vec<T>` | `<array>` |
/// | `HashMap<K, V>`, `BTreeMap<K, V>` | `<struct>`, members sorted by name |
///
/// Heterogeneous arrays and structs can be built from `&dyn ToValue` elements, or from
/// ready-made [`Value`]s.
///
/// [`Kind`]: crate::Kind
pub trait ToValue {
    fn to_value(&self) -> Result<Value, EncodeError>;
}

impl ToValue for Value {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(self.clone())
    }
}

impl<'a, T: ToValue + ?Sized> ToValue for &'a T {
    fn to_value(&self) -> Result<Value, EncodeError> {
        (**self).to_value()
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::Bool(*self))
    }
}

macro_rules! lossless_int {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Result<Value, EncodeError> {
                    Ok(Value::Int(i32::from(*self)))
                }
            }
        )*
    };
}

// `u8` is deliberately missing: byte slices are `<base64>`, not arrays of ints
lossless_int!(i8, i16, i32, u16);

macro_rules! checked_int {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Result<Value, EncodeError> {
                    i32::try_from(*self)
                        .map(Value::Int)
                        .map_err(|_| EncodeError::IntOutOfRange(*self as i128))
                }
            }
        )*
    };
}

checked_int!(i64, isize, u32, u64, usize);

impl ToValue for f64 {
    fn to_value(&self) -> Result<Value, EncodeError> {
        if self.is_finite() {
            Ok(Value::Double(*self))
        } else {
            Err(EncodeError::NonFiniteDouble(*self))
        }
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Result<Value, EncodeError> {
        f64::from(*self).to_value()
    }
}

impl ToValue for str {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::String(self.to_string()))
    }
}

impl ToValue for String {
    fn to_value(&self) -> Result<Value, EncodeError> {
        self.as_str().to_value()
    }
}

impl ToValue for [u8] {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::Base64(self.to_vec()))
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        self.as_slice().to_value()
    }
}

impl<Tz: TimeZone> ToValue for DateTime<Tz> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        let date_time = truncate_datetime(self.with_timezone(&Utc));
        if has_wire_year(&date_time) {
            Ok(Value::DateTime(date_time))
        } else {
            Err(EncodeError::DateTimeOutOfRange(date_time))
        }
    }
}

impl ToValue for SystemTime {
    fn to_value(&self) -> Result<Value, EncodeError> {
        DateTime::<Utc>::from(*self).to_value()
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Result<Value, EncodeError> {
        self.iter()
            .map(ToValue::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        self.as_slice().to_value()
    }
}

/// Builds a struct from unordered entries. Members end up sorted by name so the wire output does
/// not depend on the iteration order of the map.
fn struct_from_entries<'a, K, V, I>(entries: I) -> Result<Value, EncodeError>
where
    K: AsRef<str> + 'a,
    V: ToValue + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    let mut members = entries
        .map(|(name, value)| value.to_value().map(|value| Member::new(name.as_ref(), value)))
        .collect::<Result<Vec<_>, _>>()?;
    members.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(Value::Struct(members))
}

impl<K: AsRef<str>, V: ToValue, S: BuildHasher> ToValue for HashMap<K, V, S> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        struct_from_entries(self.iter())
    }
}

impl<K: AsRef<str>, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        struct_from_entries(self.iter())
    }
}
