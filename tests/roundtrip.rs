//! Values written by the encoder decode back to the same kind and payload.

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use xmlrpc_client::{parse_response, Kind, Member, ToValue, Value};

use chrono::{TimeZone, Utc};

use std::collections::HashMap;

fn roundtrip(value: &Value) -> Value {
    let mut body = br#"<?xml version="1.0"?><methodResponse><params><param>"#.to_vec();
    value.write_as_xml(&mut body).unwrap();
    body.extend_from_slice(b"</param></params></methodResponse>");

    parse_response(&body[..]).unwrap().unwrap()
}

fn encode_and_decode<T: ToValue + ?Sized>(native: &T) -> (Value, Value) {
    let value = native.to_value().unwrap();
    let decoded = roundtrip(&value);
    (value, decoded)
}

/// XML 1.0 cannot carry most control characters, and parsers normalize `\r` to `\n`.
fn is_xml_text(s: &str) -> bool {
    s.chars()
        .all(|c| c == '\t' || c == '\n' || (c >= ' ' && c != '\u{fffe}' && c != '\u{ffff}'))
}

#[quickcheck]
fn ints_roundtrip(i: i32) -> bool {
    let (value, decoded) = encode_and_decode(&i);
    decoded == value && decoded.int() == i
}

#[quickcheck]
fn bools_roundtrip(b: bool) -> bool {
    encode_and_decode(&b).1.bool() == b
}

#[quickcheck]
fn doubles_roundtrip(d: f64) -> TestResult {
    if !d.is_finite() {
        return TestResult::discard();
    }
    let (_, decoded) = encode_and_decode(&d);
    TestResult::from_bool(decoded.double().to_bits() == d.to_bits())
}

#[quickcheck]
fn strings_roundtrip(s: String) -> TestResult {
    if !is_xml_text(&s) {
        return TestResult::discard();
    }
    let (_, decoded) = encode_and_decode(&s);
    TestResult::from_bool(decoded.kind() == Kind::String && decoded.text() == s)
}

#[quickcheck]
fn bytes_roundtrip(data: Vec<u8>) -> bool {
    let (_, decoded) = encode_and_decode(&data);
    decoded.kind() == Kind::Base64 && decoded.bytes() == &data[..]
}

#[quickcheck]
fn times_roundtrip(secs: u32) -> bool {
    let time = Utc.timestamp_opt(i64::from(secs) * 7, 0).unwrap();
    encode_and_decode(&time).1.time() == time
}

#[quickcheck]
fn int_arrays_roundtrip(values: Vec<i32>) -> bool {
    let (value, decoded) = encode_and_decode(&values);
    decoded == value && decoded.values().len() == values.len()
}

#[quickcheck]
fn maps_roundtrip_sorted(map: HashMap<String, i32>) -> TestResult {
    if !map.keys().all(|key| is_xml_text(key)) {
        return TestResult::discard();
    }
    let (value, decoded) = encode_and_decode(&map);
    let names: Vec<&str> = decoded.members().iter().map(Member::name).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    TestResult::from_bool(decoded == value && names == sorted && names.len() == map.len())
}

#[test]
fn boundary_and_empty_values_roundtrip() {
    let empty_bytes: &[u8] = &[];
    let cases: [&dyn ToValue; 7] = [
        &i32::MIN,
        &i32::MAX,
        &"",
        &empty_bytes,
        &Vec::<String>::new(),
        &HashMap::<String, String>::new(),
        &"  leading and trailing  ",
    ];

    for native in cases {
        let (value, decoded) = encode_and_decode(native);
        assert_eq!(decoded, value);
        assert_eq!(decoded.kind(), value.kind());
    }
}

#[test]
fn nested_values_roundtrip() {
    let value = Value::Array(vec![
        Value::Struct(vec![
            Member::new("b", vec![Value::Bool(false), Value::Double(-0.5)]),
            Member::new("a", Value::Base64(vec![0, 1, 2])),
        ]),
        Value::from("<&>"),
    ]);
    let decoded = roundtrip(&value);

    // struct members come back in the order they were written, which is sorted by name
    assert_eq!(decoded.values()[0].members()[0].name(), "a");
    assert_eq!(decoded.values()[0].get("b"), value.values()[0].get("b"));
    assert_eq!(decoded.values()[1].text(), "<&>");
}
