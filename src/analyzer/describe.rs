//! Conversion of lopdf objects into structural descriptions
//!
//! Conventions: dictionary keys lose their leading slash, names keep it,
//! strings become lossy UTF-8 text, references become
//! `{"$Type":"Ref","num":n,"gen":g}` and streams become their dictionary plus
//! a `$StreamLength` entry.

use lopdf::{Dictionary, Object, ObjectId};
use serde_json::{json, Map, Value};

use crate::types::{REFERENCE_NUMBER_KEY, REFERENCE_TYPE_KEY};

/// Marker value stored under `$Type` for indirect references
pub const REFERENCE_TYPE_VALUE: &str = "Ref";

/// Companion key naming the first content stream of a page
pub const CONTENTS_NUMBER_KEY: &str = "$ContentsNo";

/// Companion key naming the resources object of a page
pub const RESOURCES_NUMBER_KEY: &str = "$ResourcesNo";

/// Key added to stream descriptions with the stored content length
pub const STREAM_LENGTH_KEY: &str = "$StreamLength";

pub fn describe_object(object: &Object) -> Value {
    match object {
        Object::Null => Value::Null,
        Object::Boolean(b) => Value::Bool(*b),
        Object::Integer(i) => json!(i),
        Object::Real(r) => Value::from(*r),
        Object::Name(name) => Value::String(format!("/{}", String::from_utf8_lossy(name))),
        Object::String(bytes, _) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        Object::Array(items) => Value::Array(items.iter().map(describe_object).collect()),
        Object::Dictionary(dict) => Value::Object(describe_dictionary(dict)),
        Object::Stream(stream) => {
            let mut map = describe_dictionary(&stream.dict);
            map.insert(STREAM_LENGTH_KEY.into(), json!(stream.content.len()));
            Value::Object(map)
        }
        Object::Reference(id) => describe_reference(*id),
    }
}

pub fn describe_dictionary(dict: &Dictionary) -> Map<String, Value> {
    dict.iter()
        .map(|(key, value)| (String::from_utf8_lossy(key).into_owned(), describe_object(value)))
        .collect()
}

pub fn describe_reference((num, generation): ObjectId) -> Value {
    let mut map = Map::new();
    map.insert(REFERENCE_TYPE_KEY.into(), json!(REFERENCE_TYPE_VALUE));
    map.insert(REFERENCE_NUMBER_KEY.into(), json!(num));
    map.insert("gen".into(), json!(generation));
    Value::Object(map)
}

/// Parses the textual form accepted by `update_object_value`.
///
/// `true`/`false`, integers, reals, `/Name` and `n g R` map to their PDF
/// counterparts; anything else becomes a literal string.
pub fn parse_object_text(text: &str) -> Object {
    let trimmed = text.trim();
    match trimmed {
        "true" => return Object::Boolean(true),
        "false" => return Object::Boolean(false),
        "null" => return Object::Null,
        _ => {}
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Object::Integer(i);
    }
    if let Ok(r) = trimmed.parse::<f32>() {
        if r.is_finite() {
            return Object::Real(r);
        }
    }
    if let Some(name) = trimmed.strip_prefix('/') {
        return Object::Name(name.as_bytes().to_vec());
    }
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if let [num, generation, "R"] = parts.as_slice() {
        if let (Ok(num), Ok(generation)) = (num.parse::<u32>(), generation.parse::<u16>()) {
            return Object::Reference((num, generation));
        }
    }
    Object::string_literal(trimmed)
}
