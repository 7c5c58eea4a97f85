//! Serialization from the canonical [`Value`] into every target format.
//!
//! Mirror of [`crate::parse`]: one `serialize_*` function per capability
//! table row, all with the same shape so the table can hold plain function
//! pointers. Serialization is total for most targets; the structured-text
//! formats with restricted data models (TOML, INI, CSV, dotenv, query
//! string) reject values they cannot represent, and the conversion boundary
//! turns that rejection into the sentinel string.

use crate::error::{Error, Result};
use crate::format::Format;
use crate::options::ConvertOptions;
use crate::value::Value;
use crate::{tabular, toon, transport, xml};
use serde::Serialize;

/// Plain text: strings pass through verbatim, everything else renders as
/// pretty JSON.
pub(crate) fn serialize_text(value: &Value, options: &ConvertOptions) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => serialize_json(other, options),
    }
}

pub(crate) fn serialize_json(value: &Value, options: &ConvertOptions) -> Result<String> {
    let indent = vec![b' '; options.indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| Error::serialize(Format::Json, e))?;
    String::from_utf8(out).map_err(|e| Error::serialize(Format::Json, e))
}

pub(crate) fn serialize_json5(value: &Value, _options: &ConvertOptions) -> Result<String> {
    json5::to_string(value).map_err(|e| Error::serialize(Format::Json5, e))
}

pub(crate) fn serialize_xml(value: &Value, options: &ConvertOptions) -> Result<String> {
    xml::to_xml(value, options.indent).map_err(|e| Error::serialize(Format::Xml, e))
}

pub(crate) fn serialize_yaml(value: &Value, _options: &ConvertOptions) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| Error::serialize(Format::Yaml, e))
}

/// TOML requires a table at the root and has no null.
pub(crate) fn serialize_toml(value: &Value, _options: &ConvertOptions) -> Result<String> {
    if !value.is_mapping() {
        return Err(Error::serialize(Format::Toml, "root value is not a table"));
    }
    let bridged = to_toml(value)?;
    toml::to_string_pretty(&bridged).map_err(|e| Error::serialize(Format::Toml, e))
}

fn to_toml(value: &Value) -> Result<toml::Value> {
    Ok(match value {
        Value::Null => {
            return Err(Error::serialize(Format::Toml, "null is not representable"))
        }
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) if n.is_integer() => toml::Value::Integer(i),
            _ => toml::Value::Float(n.as_f64()),
        },
        Value::String(s) => toml::Value::String(s.clone()),
        Value::Sequence(seq) => {
            toml::Value::Array(seq.iter().map(to_toml).collect::<Result<_>>()?)
        }
        Value::Mapping(map) => {
            let mut table = toml::Table::new();
            for (key, entry) in map.iter() {
                table.insert(key.clone(), to_toml(entry)?);
            }
            toml::Value::Table(table)
        }
    })
}

pub(crate) fn serialize_toon(value: &Value, _options: &ConvertOptions) -> Result<String> {
    Ok(toon::to_toon(value))
}

/// INI holds one level of sections. Nested mappings become sections,
/// top-level primitives come first, and deeper nesting is unrepresentable.
pub(crate) fn serialize_ini(value: &Value, _options: &ConvertOptions) -> Result<String> {
    let map = value
        .as_mapping()
        .ok_or_else(|| Error::serialize(Format::Ini, "root value is not a mapping"))?;

    let mut globals = String::new();
    let mut sections = String::new();
    for (key, entry) in map.iter() {
        match entry {
            Value::Mapping(section) => {
                sections.push_str(&format!("[{}]\n", key));
                for (name, field) in section.iter() {
                    sections.push_str(&ini_line(name, field)?);
                }
                sections.push('\n');
            }
            other => globals.push_str(&ini_line(key, other)?),
        }
    }

    let mut out = globals;
    if !out.is_empty() && !sections.is_empty() {
        out.push('\n');
    }
    out.push_str(&sections);
    Ok(out.trim_end().to_string())
}

fn ini_line(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::Mapping(_) => Err(Error::serialize(
            Format::Ini,
            "sections cannot nest deeper than one level",
        )),
        Value::Sequence(seq) => {
            let mut out = String::new();
            for item in seq {
                let text = item.primitive_text().ok_or_else(|| {
                    Error::serialize(Format::Ini, "array entries must be primitive")
                })?;
                out.push_str(&format!("{}[]={}\n", key, text));
            }
            Ok(out)
        }
        primitive => Ok(format!(
            "{}={}\n",
            key,
            primitive.primitive_text().unwrap_or_default()
        )),
    }
}

pub(crate) fn serialize_dotenv(value: &Value, _options: &ConvertOptions) -> Result<String> {
    let map = value
        .as_mapping()
        .ok_or_else(|| Error::serialize(Format::Dotenv, "root value is not a mapping"))?;
    let mut lines = Vec::with_capacity(map.len());
    for (key, entry) in map.iter() {
        let text = flat_text(entry, Format::Dotenv)?;
        lines.push(format!("{}={}", key, dotenv_value(&text)));
    }
    Ok(lines.join("\n"))
}

/// Quotes a dotenv value when its bare spelling would not survive a reload.
fn dotenv_value(text: &str) -> String {
    let safe = !text.is_empty()
        && !text.contains([' ', '\t', '\n', '#', '"', '\'']);
    if safe || text.is_empty() {
        text.to_string()
    } else {
        format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n"))
    }
}

pub(crate) fn serialize_csv(value: &Value, options: &ConvertOptions) -> Result<String> {
    let delimiter = options.csv_delimiter.unwrap_or(b',');
    tabular::to_delimited(value, delimiter).map_err(|e| Error::serialize(Format::Csv, e))
}

pub(crate) fn serialize_tsv(value: &Value, _options: &ConvertOptions) -> Result<String> {
    tabular::to_delimited(value, b'\t').map_err(|e| Error::serialize(Format::Tsv, e))
}

/// JSON Lines: a Sequence becomes one compact document per line; any other
/// value becomes a single line.
pub(crate) fn serialize_jsonl(value: &Value, _options: &ConvertOptions) -> Result<String> {
    let err = |e| Error::serialize(Format::Jsonl, e);
    match value {
        Value::Sequence(seq) => {
            let lines: Vec<String> = seq
                .iter()
                .map(serde_json::to_string)
                .collect::<std::result::Result<_, _>>()
                .map_err(err)?;
            Ok(lines.join("\n"))
        }
        other => serde_json::to_string(other).map_err(err),
    }
}

/// MessagePack output travels through the text channel as Base64.
pub(crate) fn serialize_msgpack(value: &Value, _options: &ConvertOptions) -> Result<String> {
    let bytes = rmp_serde::to_vec(value).map_err(|e| Error::serialize(Format::Msgpack, e))?;
    Ok(transport::base64_encode(&bytes))
}

pub(crate) fn serialize_base64(value: &Value, _options: &ConvertOptions) -> Result<String> {
    let text = flat_text(value, Format::Base64)?;
    Ok(transport::base64_encode(text.as_bytes()))
}

pub(crate) fn serialize_hex(value: &Value, _options: &ConvertOptions) -> Result<String> {
    let text = flat_text(value, Format::Hex)?;
    Ok(transport::hex_encode(text.as_bytes()))
}

pub(crate) fn serialize_binary(value: &Value, _options: &ConvertOptions) -> Result<String> {
    let text = flat_text(value, Format::Binary)?;
    Ok(transport::binary_encode(text.as_bytes()))
}

pub(crate) fn serialize_uri(value: &Value, _options: &ConvertOptions) -> Result<String> {
    let text = flat_text(value, Format::Uri)?;
    Ok(transport::uri_encode(&text))
}

/// Query strings are flat pairs: Sequence values repeat their key, nested
/// structures flatten to compact JSON.
pub(crate) fn serialize_querystring(value: &Value, _options: &ConvertOptions) -> Result<String> {
    let map = value.as_mapping().ok_or_else(|| {
        Error::serialize(Format::QueryString, "root value is not a mapping")
    })?;
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, entry) in map.iter() {
        match entry {
            Value::Sequence(seq) => {
                for item in seq {
                    serializer.append_pair(key, &flat_text(item, Format::QueryString)?);
                }
            }
            other => {
                serializer.append_pair(key, &flat_text(other, Format::QueryString)?);
            }
        }
    }
    Ok(serializer.finish())
}

/// Bare text for a value headed into a byte or pair-oriented format:
/// primitives use their literal spelling, containers flatten to compact
/// JSON first.
fn flat_text(value: &Value, format: Format) -> Result<String> {
    match value.primitive_text() {
        Some(text) => Ok(text),
        None => serde_json::to_string(value).map_err(|e| Error::serialize(format, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Map;

    fn opts() -> ConvertOptions {
        ConvertOptions::default()
    }

    fn sample() -> Value {
        let mut map = Map::new();
        map.insert("a".to_string(), Value::from(1));
        map.insert(
            "b".to_string(),
            Value::Sequence(vec![Value::from(1), Value::from(2)]),
        );
        Value::Mapping(map)
    }

    #[test]
    fn test_json_pretty_with_default_indent() {
        let json = serialize_json(&sample(), &opts()).unwrap();
        assert_eq!(json, "{\n  \"a\": 1,\n  \"b\": [\n    1,\n    2\n  ]\n}");
    }

    #[test]
    fn test_json_indent_override() {
        let json = serialize_json(&sample(), &opts().with_indent(4)).unwrap();
        assert!(json.contains("\n    \"a\": 1"));
    }

    #[test]
    fn test_text_passes_strings_through() {
        assert_eq!(
            serialize_text(&Value::from("hello world"), &opts()).unwrap(),
            "hello world"
        );
        // Non-strings render as pretty JSON.
        assert!(serialize_text(&sample(), &opts()).unwrap().starts_with('{'));
    }

    #[test]
    fn test_toml_rejects_non_table_root_and_null() {
        assert!(serialize_toml(&Value::from(1), &opts()).is_err());
        let mut map = Map::new();
        map.insert("x".to_string(), Value::Null);
        assert!(serialize_toml(&Value::Mapping(map), &opts()).is_err());
    }

    #[test]
    fn test_toml_table() {
        let mut map = Map::new();
        map.insert("x".to_string(), Value::from(1));
        let out = serialize_toml(&Value::Mapping(map), &opts()).unwrap();
        assert_eq!(out.trim(), "x = 1");
    }

    #[test]
    fn test_ini_globals_before_sections() {
        let mut db = Map::new();
        db.insert("host".to_string(), Value::from("localhost"));
        let mut map = Map::new();
        map.insert("top".to_string(), Value::from(1));
        map.insert("db".to_string(), Value::Mapping(db));
        let out = serialize_ini(&Value::Mapping(map), &opts()).unwrap();
        assert_eq!(out, "top=1\n\n[db]\nhost=localhost");
    }

    #[test]
    fn test_ini_rejects_deep_nesting() {
        let mut inner = Map::new();
        inner.insert("k".to_string(), Value::Mapping(Map::new()));
        let mut map = Map::new();
        map.insert("s".to_string(), Value::Mapping(inner));
        assert!(serialize_ini(&Value::Mapping(map), &opts()).is_err());
    }

    #[test]
    fn test_dotenv_quotes_when_needed() {
        let mut map = Map::new();
        map.insert("PLAIN".to_string(), Value::from("abc"));
        map.insert("SPACED".to_string(), Value::from("a b"));
        let out = serialize_dotenv(&Value::Mapping(map), &opts()).unwrap();
        assert_eq!(out, "PLAIN=abc\nSPACED=\"a b\"");
    }

    #[test]
    fn test_jsonl_one_line_per_item() {
        let seq = Value::Sequence(vec![sample(), Value::from(2)]);
        let out = serialize_jsonl(&seq, &opts()).unwrap();
        assert_eq!(out, "{\"a\":1,\"b\":[1,2]}\n2");
    }

    #[test]
    fn test_msgpack_emits_base64() {
        let out = serialize_msgpack(&Value::from("hi"), &opts()).unwrap();
        assert!(transport::base64_decode(&out).is_ok());
    }

    #[test]
    fn test_base64_flattens_containers_to_json() {
        let out = serialize_base64(&sample(), &opts()).unwrap();
        let decoded = transport::base64_decode(&out).unwrap();
        assert_eq!(decoded, br#"{"a":1,"b":[1,2]}"#);
    }

    #[test]
    fn test_uri_encodes_component() {
        let out = serialize_uri(&sample(), &opts()).unwrap();
        assert_eq!(out, "%7B%22a%22%3A1%2C%22b%22%3A%5B1%2C2%5D%7D");
    }

    #[test]
    fn test_querystring_repeats_sequence_keys() {
        let mut map = Map::new();
        map.insert(
            "a".to_string(),
            Value::Sequence(vec![Value::from(1), Value::from(2)]),
        );
        map.insert("b".to_string(), Value::from("x y"));
        let out = serialize_querystring(&Value::Mapping(map), &opts()).unwrap();
        assert_eq!(out, "a=1&a=2&b=x+y");
    }

    #[test]
    fn test_querystring_rejects_non_mapping() {
        assert!(serialize_querystring(&Value::from(1), &opts()).is_err());
    }

    #[test]
    fn test_csv_delimiter_override() {
        let rows = Value::Sequence(vec![sample()]);
        let out = serialize_csv(&rows, &opts().with_csv_delimiter(b';')).unwrap();
        assert!(out.starts_with("a;b"));
    }
}
