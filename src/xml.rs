//! XML adapter over quick-xml events.
//!
//! XML has no native notion of "object vs array", so the adapter applies a
//! fixed normalization convention, symmetric between parse and serialize:
//!
//! - attributes are hoisted into the element's mapping under the `@_` key
//!   prefix (`<a href="x">` → `{"@_href": "x"}`)
//! - text content lives under the reserved `#text` key; an element with only
//!   text collapses to that scalar directly
//! - repeated sibling elements with the same name collapse into a Sequence
//! - serializing a top-level Sequence wraps it in a synthetic
//!   `<root><item>…</item></root>` pair, since XML requires a single root
//!
//! Numeric-looking element text parses as numbers; attribute values stay
//! strings.

use crate::map::Map;
use crate::value::{Number, Value};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

pub(crate) const ATTR_PREFIX: &str = "@_";
pub(crate) const TEXT_KEY: &str = "#text";

pub(crate) fn from_xml(text: &str) -> Result<Value, String> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut stack: Vec<(String, Map)> = Vec::new();
    let mut root = Map::new();

    loop {
        match reader.read_event() {
            Err(e) => return Err(e.to_string()),
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let map = attribute_map(&e)?;
                stack.push((name, map));
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let value = finish_element(attribute_map(&e)?);
                let target = stack.last_mut().map(|(_, m)| m).unwrap_or(&mut root);
                insert_child(target, name, value);
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|e| e.to_string())?.into_owned();
                if let Some((_, map)) = stack.last_mut() {
                    append_text(map, &text);
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                if let Some((_, map)) = stack.last_mut() {
                    append_text(map, &text);
                }
            }
            Ok(Event::End(_)) => {
                let (name, map) = stack.pop().ok_or("unexpected closing tag")?;
                let value = finish_element(map);
                let target = stack.last_mut().map(|(_, m)| m).unwrap_or(&mut root);
                insert_child(target, name, value);
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions, doctypes
            Ok(_) => {}
        }
    }

    if !stack.is_empty() {
        return Err("unclosed element".to_string());
    }
    Ok(Value::Mapping(root))
}

fn attribute_map(elem: &BytesStart<'_>) -> Result<Map, String> {
    let mut map = Map::new();
    for attr in elem.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = format!(
            "{}{}",
            ATTR_PREFIX,
            String::from_utf8_lossy(attr.key.as_ref())
        );
        let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
        map.insert(key, Value::String(value));
    }
    Ok(map)
}

fn append_text(map: &mut Map, text: &str) {
    match map.get_mut(TEXT_KEY) {
        Some(Value::String(existing)) => existing.push_str(text),
        Some(_) | None => {
            map.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
        }
    }
}

/// Collapses a finished element: attribute-less text-only elements become
/// their scalar, empty elements become the empty string.
fn finish_element(mut map: Map) -> Value {
    if let Some(Value::String(text)) = map.get(TEXT_KEY).cloned() {
        let scalar = text_scalar(&text);
        if map.len() == 1 {
            return scalar;
        }
        map.insert(TEXT_KEY.to_string(), scalar);
    }
    if map.is_empty() {
        return Value::String(String::new());
    }
    Value::Mapping(map)
}

/// Element text that spells a number parses as one; everything else stays a
/// string.
fn text_scalar(text: &str) -> Value {
    let looks_numeric = text
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+' || c == '.');
    if looks_numeric {
        if let Ok(i) = text.parse::<i64>() {
            return Value::Number(Number::Integer(i));
        }
        if let Ok(f) = text.parse::<f64>() {
            return Value::Number(Number::Float(f));
        }
    }
    Value::String(text.to_string())
}

/// Inserts a child element value, promoting repeated sibling names to a
/// Sequence.
fn insert_child(map: &mut Map, name: String, value: Value) {
    match map.get_mut(&name) {
        Some(Value::Sequence(seq)) => seq.push(value),
        Some(existing) => {
            let first = std::mem::take(existing);
            *existing = Value::Sequence(vec![first, value]);
        }
        None => {
            map.insert(name, value);
        }
    }
}

pub(crate) fn to_xml(value: &Value, indent: usize) -> Result<String, String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', indent);

    match value {
        Value::Mapping(map) => write_children(&mut writer, map)?,
        Value::Sequence(_) => {
            // XML requires a single root; wrap the sequence.
            let mut inner = Map::new();
            inner.insert("item".to_string(), value.clone());
            let mut outer = Map::new();
            outer.insert("root".to_string(), Value::Mapping(inner));
            write_children(&mut writer, &outer)?;
        }
        primitive => {
            let text = primitive.primitive_text().unwrap_or_default();
            writer
                .write_event(Event::Text(BytesText::new(&text)))
                .map_err(|e| e.to_string())?;
        }
    }

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| e.to_string())
}

fn write_children<W: std::io::Write>(writer: &mut Writer<W>, map: &Map) -> Result<(), String> {
    for (key, value) in map.iter() {
        // Attribute/text keys without a parent element have nowhere to go.
        if key.starts_with(ATTR_PREFIX) || key == TEXT_KEY {
            continue;
        }
        write_element(writer, key, value)?;
    }
    Ok(())
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &Value,
) -> Result<(), String> {
    match value {
        Value::Sequence(seq) => {
            for item in seq {
                write_element(writer, name, item)?;
            }
            Ok(())
        }
        Value::Mapping(map) => {
            let mut elem = BytesStart::new(name);
            for (key, attr) in map.iter() {
                if let Some(attr_name) = key.strip_prefix(ATTR_PREFIX) {
                    let text = attr
                        .primitive_text()
                        .unwrap_or_else(|| attr.to_string());
                    elem.push_attribute((attr_name, text.as_str()));
                }
            }

            let has_content = map
                .iter()
                .any(|(k, _)| !k.starts_with(ATTR_PREFIX));
            if !has_content {
                return writer
                    .write_event(Event::Empty(elem))
                    .map_err(|e| e.to_string());
            }

            writer
                .write_event(Event::Start(elem))
                .map_err(|e| e.to_string())?;
            for (key, child) in map.iter() {
                if key.starts_with(ATTR_PREFIX) {
                    continue;
                }
                if key == TEXT_KEY {
                    let text = child.primitive_text().unwrap_or_default();
                    writer
                        .write_event(Event::Text(BytesText::new(&text)))
                        .map_err(|e| e.to_string())?;
                } else {
                    write_element(writer, key, child)?;
                }
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(|e| e.to_string())
        }
        Value::Null => writer
            .write_event(Event::Empty(BytesStart::new(name)))
            .map_err(|e| e.to_string()),
        primitive => {
            let text = primitive.primitive_text().unwrap_or_default();
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(|e| e.to_string())?;
            writer
                .write_event(Event::Text(BytesText::new(&text)))
                .map_err(|e| e.to_string())?;
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(|e| e.to_string())
        }
    }
}
