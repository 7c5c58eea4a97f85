//! Parsing from every source format into the canonical [`Value`].
//!
//! Each `parse_*` function is one row of the capability table in
//! [`crate::format`]. The serde-backed formats (JSON, JSON5, YAML,
//! MessagePack) deserialize straight into `Value` through its `Deserialize`
//! impl; the rest go through explicit bridges. All errors are normalized to
//! [`Error::Parse`] carrying the source format, so the conversion boundary
//! can render the right sentinel without inspecting the cause.

use crate::error::{Error, Result};
use crate::format::Format;
use crate::map::Map;
use crate::value::{Number, Value};
use crate::{tabular, toon, transport, xml};

/// Plain text: the whole input is one string. Never fails.
pub(crate) fn parse_text(text: &str) -> Result<Value> {
    Ok(Value::String(text.to_string()))
}

pub(crate) fn parse_json(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| Error::parse(Format::Json, e))
}

pub(crate) fn parse_json5(text: &str) -> Result<Value> {
    json5::from_str(text).map_err(|e| Error::parse(Format::Json5, e))
}

pub(crate) fn parse_xml(text: &str) -> Result<Value> {
    xml::from_xml(text).map_err(|e| Error::parse(Format::Xml, e))
}

pub(crate) fn parse_yaml(text: &str) -> Result<Value> {
    serde_yaml::from_str(text).map_err(|e| Error::parse(Format::Yaml, e))
}

pub(crate) fn parse_toml(text: &str) -> Result<Value> {
    let table: toml::Table = toml::from_str(text).map_err(|e| Error::parse(Format::Toml, e))?;
    Ok(from_toml(toml::Value::Table(table)))
}

fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(Number::Integer(i)),
        toml::Value::Float(f) => Value::Number(Number::Float(f)),
        toml::Value::Boolean(b) => Value::Bool(b),
        // The canonical model has no date type; keep the literal spelling.
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => {
            Value::Sequence(items.into_iter().map(from_toml).collect())
        }
        toml::Value::Table(table) => {
            let mut map = Map::with_capacity(table.len());
            for (key, value) in table {
                map.insert(key, from_toml(value));
            }
            Value::Mapping(map)
        }
    }
}

pub(crate) fn parse_toon(text: &str) -> Result<Value> {
    toon::from_toon(text).map_err(|e| Error::parse(Format::Toon, e))
}

/// INI sections become nested mappings; keys outside any section stay at the
/// top level. Values are kept as strings, matching the format's type system.
pub(crate) fn parse_ini(text: &str) -> Result<Value> {
    let ini = ini::Ini::load_from_str(text).map_err(|e| Error::parse(Format::Ini, e))?;
    let mut root = Map::new();
    for (section, properties) in ini.iter() {
        match section {
            None => {
                for (key, value) in properties.iter() {
                    root.insert(key.to_string(), Value::String(value.to_string()));
                }
            }
            Some(name) => {
                let mut nested = Map::new();
                for (key, value) in properties.iter() {
                    nested.insert(key.to_string(), Value::String(value.to_string()));
                }
                root.insert(name.to_string(), Value::Mapping(nested));
            }
        }
    }
    Ok(Value::Mapping(root))
}

/// dotenv is a flat string-to-string mapping. Blank lines, comments and
/// lines without `=` are skipped rather than rejected.
pub(crate) fn parse_dotenv(text: &str) -> Result<Value> {
    let mut map = Map::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().strip_prefix("export ").unwrap_or(key.trim());
        let value = line_value(value.trim());
        map.insert(key.trim().to_string(), Value::String(value));
    }
    Ok(Value::Mapping(map))
}

/// Strips one matching pair of surrounding quotes from a dotenv value.
fn line_value(raw: &str) -> String {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return raw[1..raw.len() - 1].to_string();
        }
    }
    raw.to_string()
}

pub(crate) fn parse_csv(text: &str) -> Result<Value> {
    tabular::from_delimited(text, b',').map_err(|e| Error::parse(Format::Csv, e))
}

pub(crate) fn parse_tsv(text: &str) -> Result<Value> {
    tabular::from_delimited(text, b'\t').map_err(|e| Error::parse(Format::Tsv, e))
}

/// JSON Lines: one JSON document per non-blank line, collected into a
/// Sequence.
pub(crate) fn parse_jsonl(text: &str) -> Result<Value> {
    let mut items = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let item = serde_json::from_str(line).map_err(|e| Error::parse(Format::Jsonl, e))?;
        items.push(item);
    }
    Ok(Value::Sequence(items))
}

/// MessagePack travels through the text channel as Base64-encoded bytes.
/// The payload must be exactly one document: leftover bytes after the first
/// value mean the input was not MessagePack, which matters because the
/// detector runs this parser over arbitrary base64 text.
pub(crate) fn parse_msgpack(text: &str) -> Result<Value> {
    use serde::Deserialize;

    let bytes = transport::base64_decode(text).map_err(|e| Error::parse(Format::Msgpack, e))?;
    let mut cursor = std::io::Cursor::new(bytes.as_slice());
    let value = {
        let mut deserializer = rmp_serde::Deserializer::new(&mut cursor);
        Value::deserialize(&mut deserializer).map_err(|e| Error::parse(Format::Msgpack, e))?
    };
    if cursor.position() as usize != bytes.len() {
        return Err(Error::parse(
            Format::Msgpack,
            "trailing bytes after document",
        ));
    }
    Ok(value)
}

pub(crate) fn parse_base64(text: &str) -> Result<Value> {
    let bytes = transport::base64_decode(text).map_err(|e| Error::parse(Format::Base64, e))?;
    Ok(structured(&String::from_utf8_lossy(&bytes)))
}

pub(crate) fn parse_hex(text: &str) -> Result<Value> {
    let bytes = transport::hex_decode(text).map_err(|e| Error::parse(Format::Hex, e))?;
    Ok(structured(&String::from_utf8_lossy(&bytes)))
}

pub(crate) fn parse_binary(text: &str) -> Result<Value> {
    let bytes = transport::binary_decode(text).map_err(|e| Error::parse(Format::Binary, e))?;
    Ok(structured(&String::from_utf8_lossy(&bytes)))
}

pub(crate) fn parse_uri(text: &str) -> Result<Value> {
    let decoded = transport::uri_decode(text).map_err(|e| Error::parse(Format::Uri, e))?;
    Ok(structured(&decoded))
}

/// Second phase of the byte-transport decode: if the decoded text is itself
/// a JSON document, surface the structure instead of the raw string.
fn structured(decoded: &str) -> Value {
    serde_json::from_str(decoded).unwrap_or_else(|_| Value::String(decoded.to_string()))
}

/// Query strings are flat; a key repeated across pairs promotes its value
/// to a Sequence in first-occurrence position.
pub(crate) fn parse_querystring(text: &str) -> Result<Value> {
    let mut map = Map::new();
    for (key, value) in form_urlencoded::parse(text.trim().as_bytes()) {
        let value = Value::String(value.into_owned());
        match map.get_mut(&key) {
            Some(Value::Sequence(seq)) => seq.push(value),
            Some(existing) => {
                let first = std::mem::take(existing);
                *existing = Value::Sequence(vec![first, value]);
            }
            None => {
                map.insert(key.into_owned(), value);
            }
        }
    }
    Ok(Value::Mapping(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Shape;

    #[test]
    fn test_json_mapping() {
        let value = parse_json(r#"{"a":1,"b":[1,2]}"#).unwrap();
        assert_eq!(value.shape(), Shape::Mapping);
        let map = value.as_mapping().unwrap();
        assert_eq!(map.get("a"), Some(&Value::from(1)));
        assert_eq!(
            map.get("b"),
            Some(&Value::Sequence(vec![Value::from(1), Value::from(2)]))
        );
    }

    #[test]
    fn test_json_invalid() {
        assert!(parse_json("{invalid").is_err());
    }

    #[test]
    fn test_json5_relaxed_syntax() {
        let value = parse_json5("{a: 1, /* comment */ b: 2,}").unwrap();
        assert_eq!(value.as_mapping().unwrap().get("b"), Some(&Value::from(2)));
    }

    #[test]
    fn test_yaml_mapping() {
        let value = parse_yaml("a: 1\nb: 2\n").unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map.get("a"), Some(&Value::from(1)));
        assert_eq!(map.get("b"), Some(&Value::from(2)));
    }

    #[test]
    fn test_toml_types_and_datetime() {
        let value = parse_toml("x = 1\ny = 1.5\nz = true\nwhen = 2020-01-02\n[s]\nk = \"v\"")
            .unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map.get("x"), Some(&Value::from(1i64)));
        assert_eq!(map.get("y"), Some(&Value::from(1.5)));
        assert_eq!(map.get("z"), Some(&Value::from(true)));
        assert_eq!(map.get("when"), Some(&Value::from("2020-01-02")));
        assert!(map.get("s").unwrap().is_mapping());
    }

    #[test]
    fn test_ini_sections_nest() {
        let value = parse_ini("top=1\n[db]\nhost=localhost\nport=5432").unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map.get("top"), Some(&Value::from("1")));
        let db = map.get("db").unwrap().as_mapping().unwrap();
        assert_eq!(db.get("host"), Some(&Value::from("localhost")));
        // INI has no number type.
        assert_eq!(db.get("port"), Some(&Value::from("5432")));
    }

    #[test]
    fn test_dotenv_flat_strings() {
        let value =
            parse_dotenv("# comment\nDB_HOST=localhost\nexport DB_PORT=5432\nQUOTED=\"a b\"\n")
                .unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map.get("DB_HOST"), Some(&Value::from("localhost")));
        assert_eq!(map.get("DB_PORT"), Some(&Value::from("5432")));
        assert_eq!(map.get("QUOTED"), Some(&Value::from("a b")));
    }

    #[test]
    fn test_csv_cells_stay_strings() {
        let value = parse_csv("name,age\nAlice,30\n").unwrap();
        let rows = value.as_sequence().unwrap();
        assert_eq!(rows.len(), 1);
        let row = rows[0].as_mapping().unwrap();
        assert_eq!(row.get("age"), Some(&Value::from("30")));
    }

    #[test]
    fn test_jsonl_collects_lines() {
        let value = parse_jsonl("{\"a\":1}\n\n{\"a\":2}\n").unwrap();
        assert_eq!(value.as_sequence().unwrap().len(), 2);
        assert!(parse_jsonl("{\"a\":1}\nnot json\n").is_err());
    }

    #[test]
    fn test_msgpack_from_base64() {
        // 0x81 0xa1 'a' 0x01 == {"a": 1}
        let encoded = transport::base64_encode(&[0x81, 0xa1, b'a', 0x01]);
        let value = parse_msgpack(&encoded).unwrap();
        assert_eq!(value.as_mapping().unwrap().get("a"), Some(&Value::from(1)));
    }

    #[test]
    fn test_msgpack_rejects_trailing_bytes() {
        // "hello" starts with 0x68, a complete fixint document, followed by
        // four leftover bytes; as base64 this is the classic misroute.
        assert!(parse_msgpack("aGVsbG8=").is_err());
        // A lone fixint with nothing after it is a real document.
        assert_eq!(
            parse_msgpack(&transport::base64_encode(&[0x2a])).unwrap(),
            Value::from(42)
        );
    }

    #[test]
    fn test_base64_plain_string() {
        assert_eq!(parse_base64("aGVsbG8=").unwrap(), Value::from("hello"));
    }

    #[test]
    fn test_base64_embedded_json_surfaces_structure() {
        // base64 of {"a":1}
        let encoded = transport::base64_encode(br#"{"a":1}"#);
        let value = parse_base64(&encoded).unwrap();
        assert_eq!(value.as_mapping().unwrap().get("a"), Some(&Value::from(1)));
    }

    #[test]
    fn test_uri_embedded_json() {
        let value = parse_uri("%7B%22a%22%3A1%7D").unwrap();
        assert_eq!(value.as_mapping().unwrap().get("a"), Some(&Value::from(1)));
    }

    #[test]
    fn test_hex_and_binary_decode_to_text() {
        assert_eq!(parse_hex("68656c6c6f").unwrap(), Value::from("hello"));
        assert_eq!(
            parse_binary("01101000 01101001").unwrap(),
            Value::from("hi")
        );
    }

    #[test]
    fn test_querystring_repeated_keys_promote() {
        let value = parse_querystring("a=1&b=x&a=2").unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(
            map.get("a"),
            Some(&Value::Sequence(vec![
                Value::from("1"),
                Value::from("2")
            ]))
        );
        assert_eq!(map.get("b"), Some(&Value::from("x")));
    }

    #[test]
    fn test_querystring_decodes_percent_escapes() {
        let value = parse_querystring("name=Alice%20B&tag=a%2Bb").unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map.get("name"), Some(&Value::from("Alice B")));
        assert_eq!(map.get("tag"), Some(&Value::from("a+b")));
    }
}
