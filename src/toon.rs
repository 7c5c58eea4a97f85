//! TOON (Token-Oriented Object Notation) codec.
//!
//! TOON is an indentation-based notation tuned for token efficiency. The
//! encoder picks the most compact of three array layouts:
//!
//! - **inline** for arrays of primitives: `tags[3]: a,b,c`
//! - **tabular** for arrays of uniform flat mappings, declaring the fields
//!   once: `users[2]{id,name}:` followed by one comma-joined row per line
//! - **list** for everything else: `items[2]:` followed by `- ` entries
//!
//! Every array header declares its length and the decoder validates the
//! declaration strictly. Indentation is two spaces per level.

use crate::map::Map;
use crate::value::{Number, Shape, Value};

const INDENT: usize = 2;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

pub(crate) fn to_toon(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Mapping(map) => write_entries(&mut out, map, 0),
        Value::Sequence(seq) => write_array(&mut out, None, seq, 0),
        primitive => out.push_str(&scalar_text(primitive)),
    }
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

fn pad(indent: usize) -> String {
    " ".repeat(indent * INDENT)
}

fn write_entries(out: &mut String, map: &Map, indent: usize) {
    for (key, value) in map.iter() {
        match value {
            Value::Sequence(seq) => write_array(out, Some(key), seq, indent),
            Value::Mapping(child) => {
                out.push_str(&format!("{}{}:\n", pad(indent), key_text(key)));
                write_entries(out, child, indent + 1);
            }
            primitive => {
                out.push_str(&format!(
                    "{}{}: {}\n",
                    pad(indent),
                    key_text(key),
                    scalar_text(primitive)
                ));
            }
        }
    }
}

fn write_array(out: &mut String, key: Option<&str>, seq: &[Value], indent: usize) {
    let head = match key {
        Some(key) => format!("{}{}[{}]", pad(indent), key_text(key), seq.len()),
        None => format!("{}[{}]", pad(indent), seq.len()),
    };

    if seq.is_empty() {
        out.push_str(&head);
        out.push_str(":\n");
        return;
    }

    if seq.iter().all(|item| item.shape() == Shape::Primitive) {
        let cells: Vec<String> = seq.iter().map(scalar_text).collect();
        out.push_str(&format!("{}: {}\n", head, cells.join(",")));
        return;
    }

    if let Some(fields) = tabular_fields(seq) {
        let header: Vec<String> = fields.iter().map(|f| key_text(f)).collect();
        out.push_str(&format!("{}{{{}}}:\n", head, header.join(",")));
        for item in seq {
            let Some(row) = item.as_mapping() else {
                continue;
            };
            let cells: Vec<String> = fields
                .iter()
                .map(|field| row.get(field).map(scalar_text).unwrap_or_default())
                .collect();
            out.push_str(&format!("{}{}\n", pad(indent + 1), cells.join(",")));
        }
        return;
    }

    out.push_str(&head);
    out.push_str(":\n");
    for item in seq {
        match item {
            Value::Mapping(map) if !map.is_empty() => {
                let mut block = String::new();
                write_entries(&mut block, map, indent + 2);
                push_dashed(out, &block, indent + 1);
            }
            Value::Sequence(inner) => {
                let mut block = String::new();
                write_array(&mut block, None, inner, indent + 2);
                push_dashed(out, &block, indent + 1);
            }
            Value::Mapping(_) => {
                // An empty mapping has no entries to hang off the dash.
                out.push_str(&format!("{}-\n", pad(indent + 1)));
            }
            primitive => {
                out.push_str(&format!(
                    "{}- {}\n",
                    pad(indent + 1),
                    scalar_text(primitive)
                ));
            }
        }
    }
}

/// Re-homes a rendered block under a list dash: the block's first line moves
/// up onto the dash line, the rest keeps its deeper indentation.
fn push_dashed(out: &mut String, block: &str, indent: usize) {
    let mut parts = block.splitn(2, '\n');
    let first = parts.next().unwrap_or_default();
    out.push_str(&format!("{}- {}\n", pad(indent), first.trim_start()));
    if let Some(rest) = parts.next() {
        out.push_str(rest);
    }
}

/// The tabular layout applies when every item is a mapping over the same
/// field set with only primitive values.
fn tabular_fields(seq: &[Value]) -> Option<Vec<String>> {
    let first = seq.first()?.as_mapping()?;
    if first.is_empty() {
        return None;
    }
    let fields: Vec<String> = first.keys().cloned().collect();
    for item in seq {
        let map = item.as_mapping()?;
        if map.len() != fields.len() {
            return None;
        }
        for field in &fields {
            if map.get(field)?.shape() != Shape::Primitive {
                return None;
            }
        }
    }
    Some(fields)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) if needs_quotes(s) => quote(s),
        other => other.primitive_text().unwrap_or_default(),
    }
}

fn key_text(key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if plain {
        key.to_string()
    } else {
        quote(key)
    }
}

/// A string needs quoting when its bare spelling would be read back as a
/// different type or would collide with the notation's structure.
fn needs_quotes(s: &str) -> bool {
    if s.is_empty() || s.trim() != s {
        return true;
    }
    if matches!(s, "true" | "false" | "null") {
        return true;
    }
    if looks_like_number(s) {
        return true;
    }
    if s.starts_with('-') || s.starts_with('#') || s.starts_with('"') {
        return true;
    }
    s.contains([':', ',', '[', ']', '{', '}', '\n', '\r', '\t'])
}

fn looks_like_number(s: &str) -> bool {
    s.chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
        && s.parse::<f64>().is_ok()
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct Line {
    spaces: usize,
    text: String,
}

pub(crate) fn from_toon(text: &str) -> Result<Value, String> {
    let lines: Vec<Line> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let trimmed = line.trim_start_matches(' ');
            Line {
                spaces: line.len() - trimmed.len(),
                text: trimmed.trim_end().to_string(),
            }
        })
        .collect();

    let Some(first) = lines.first() else {
        return Err("empty document".to_string());
    };
    if first.spaces != 0 {
        return Err("unexpected indentation on first line".to_string());
    }
    if text.lines().any(|l| l.starts_with('\t')) {
        return Err("tabs are not valid indentation".to_string());
    }

    if first.text.starts_with('[') {
        let text = first.text.clone();
        let (value, used) = parse_array(&text, &lines, 0, 0)?;
        return finish(value, used, lines.len());
    }
    if split_key(&first.text).is_ok() {
        let (value, used) = parse_block(&lines, 0, 0)?;
        return finish(value, used, lines.len());
    }
    if lines.len() == 1 {
        return parse_scalar(&first.text);
    }
    Err("not a valid document".to_string())
}

fn finish(value: Value, used: usize, total: usize) -> Result<Value, String> {
    if used == total {
        Ok(value)
    } else {
        Err("content after end of document".to_string())
    }
}

/// Parses consecutive `key: value` entries at exactly `spaces` indentation.
fn parse_block(lines: &[Line], start: usize, spaces: usize) -> Result<(Value, usize), String> {
    let mut map = Map::new();
    let mut idx = start;
    while idx < lines.len() {
        let line = &lines[idx];
        if line.spaces < spaces {
            break;
        }
        if line.spaces > spaces {
            return Err(format!("unexpected indentation at {:?}", line.text));
        }
        let (key, value, used) = parse_entry(lines, idx, spaces)?;
        map.insert(key, value);
        idx += used;
    }
    Ok((Value::Mapping(map), idx - start))
}

fn parse_entry(
    lines: &[Line],
    idx: usize,
    spaces: usize,
) -> Result<(String, Value, usize), String> {
    let line = &lines[idx];
    let (key, rest) = split_key(&line.text)?;

    if rest.starts_with('[') {
        let (value, used) = parse_array(rest, lines, idx, spaces)?;
        return Ok((key, value, used));
    }

    // rest starts with ':'
    let after = rest[1..].trim();
    if !after.is_empty() {
        return Ok((key, parse_scalar(after)?, 1));
    }

    // Nested block, or an empty mapping when nothing deeper follows.
    match lines.get(idx + 1) {
        Some(next) if next.spaces > spaces => {
            let (value, used) = parse_block(lines, idx + 1, spaces + INDENT)?;
            Ok((key, value, used + 1))
        }
        _ => Ok((key, Value::Mapping(Map::new()), 1)),
    }
}

/// Parses an array whose header text (starting at `[`) sits on `lines[idx]`
/// at `spaces` indentation. Returns the value and the line count consumed.
fn parse_array(
    header: &str,
    lines: &[Line],
    idx: usize,
    spaces: usize,
) -> Result<(Value, usize), String> {
    let close = header.find(']').ok_or("unterminated length declaration")?;
    let declared: usize = header[1..close]
        .trim()
        .parse()
        .map_err(|_| format!("invalid length declaration in {:?}", header))?;
    let mut rest = &header[close + 1..];

    let mut fields: Option<Vec<String>> = None;
    if rest.starts_with('{') {
        let close = rest.find('}').ok_or("unterminated field list")?;
        fields = Some(
            split_values(&rest[1..close])
                .iter()
                .map(|f| field_name(f))
                .collect::<Result<_, _>>()?,
        );
        rest = &rest[close + 1..];
    }
    let rest = rest
        .strip_prefix(':')
        .ok_or("expected ':' after array header")?
        .trim();

    if let Some(fields) = fields {
        if !rest.is_empty() {
            return Err("tabular arrays take rows on following lines".to_string());
        }
        return parse_rows(lines, idx, spaces, declared, &fields);
    }

    if !rest.is_empty() {
        let cells = split_values(rest);
        if cells.len() != declared {
            return Err(length_mismatch(declared, cells.len()));
        }
        let items = cells
            .iter()
            .map(|cell| parse_scalar(cell))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok((Value::Sequence(items), 1));
    }

    if declared == 0 {
        return Ok((Value::Sequence(Vec::new()), 1));
    }
    parse_list(lines, idx, spaces, declared)
}

fn parse_rows(
    lines: &[Line],
    idx: usize,
    spaces: usize,
    declared: usize,
    fields: &[String],
) -> Result<(Value, usize), String> {
    // The declared length is untrusted input; never allocate from it.
    let mut items = Vec::new();
    for offset in 1..=declared {
        let row = lines
            .get(idx + offset)
            .filter(|l| l.spaces == spaces + INDENT)
            .ok_or_else(|| length_mismatch(declared, offset - 1))?;
        let cells = split_values(&row.text);
        if cells.len() != fields.len() {
            return Err(format!(
                "row has {} values but {} fields are declared",
                cells.len(),
                fields.len()
            ));
        }
        let mut map = Map::with_capacity(fields.len());
        for (field, cell) in fields.iter().zip(&cells) {
            map.insert(field.clone(), parse_scalar(cell)?);
        }
        items.push(Value::Mapping(map));
    }
    // A further row at row indentation means more rows than declared.
    if lines
        .get(idx + declared + 1)
        .is_some_and(|l| l.spaces > spaces)
    {
        return Err(format!("more than {} rows present", declared));
    }
    Ok((Value::Sequence(items), declared + 1))
}

fn parse_list(
    lines: &[Line],
    idx: usize,
    spaces: usize,
    declared: usize,
) -> Result<(Value, usize), String> {
    let item_spaces = spaces + INDENT;
    let mut items = Vec::new();
    let mut cursor = idx + 1;
    for count in 0..declared {
        let line = lines
            .get(cursor)
            .filter(|l| l.spaces == item_spaces)
            .ok_or_else(|| length_mismatch(declared, count))?;
        if line.text != "-" && !line.text.starts_with("- ") {
            return Err(format!("expected list item, found {:?}", line.text));
        }
        let (item, used) = parse_list_item(lines, cursor, item_spaces)?;
        items.push(item);
        cursor += used;
    }
    if lines
        .get(cursor)
        .is_some_and(|l| l.spaces >= item_spaces)
    {
        return Err(format!("more than {} items present", declared));
    }
    Ok((Value::Sequence(items), cursor - idx))
}

fn parse_list_item(lines: &[Line], idx: usize, spaces: usize) -> Result<(Value, usize), String> {
    let content = lines[idx].text.trim_start_matches('-').trim_start();

    // Extent of this item: the dash line plus anything indented deeper.
    let mut end = idx + 1;
    while end < lines.len() && lines[end].spaces > spaces {
        end += 1;
    }
    let consumed = end - idx;

    if content.is_empty() {
        if consumed != 1 {
            return Err("dangling content under empty list item".to_string());
        }
        return Ok((Value::Mapping(Map::new()), 1));
    }

    // The first entry of a nested structure rides on the dash line; re-home
    // it at the item's content indentation and parse the sub-block.
    let mut virtual_lines = Vec::with_capacity(consumed);
    virtual_lines.push(Line {
        spaces: spaces + INDENT,
        text: content.to_string(),
    });
    virtual_lines.extend_from_slice(&lines[idx + 1..end]);

    if content.starts_with('[') {
        let (value, used) = parse_array(content, &virtual_lines, 0, spaces + INDENT)?;
        if used != virtual_lines.len() {
            return Err("content after end of list item".to_string());
        }
        return Ok((value, consumed));
    }
    if split_key(content).is_ok() {
        let (value, used) = parse_block(&virtual_lines, 0, spaces + INDENT)?;
        if used != virtual_lines.len() {
            return Err("content after end of list item".to_string());
        }
        return Ok((value, consumed));
    }
    if consumed != 1 {
        return Err("dangling content under scalar list item".to_string());
    }
    Ok((parse_scalar(content)?, 1))
}

fn length_mismatch(declared: usize, found: usize) -> String {
    format!("declared length {} but found {} items", declared, found)
}

/// Splits a key from its `:`/`[` delimiter, honoring quoted keys.
fn split_key(text: &str) -> Result<(String, &str), String> {
    if let Some(stripped) = text.strip_prefix('"') {
        let close = find_closing_quote(stripped).ok_or("unterminated key")?;
        let rest = &stripped[close + 1..];
        if rest.starts_with(':') || rest.starts_with('[') {
            return Ok((unescape(&stripped[..close]), rest));
        }
        return Err("expected ':' after key".to_string());
    }
    let delim = text
        .find([':', '['])
        .ok_or("expected ':' after key")?;
    let key = text[..delim].trim();
    if key.is_empty() {
        return Err("missing key".to_string());
    }
    Ok((key.to_string(), &text[delim..]))
}

fn field_name(field: &str) -> Result<String, String> {
    let field = field.trim();
    if let Some(stripped) = field.strip_prefix('"') {
        let close = find_closing_quote(stripped).ok_or("unterminated field name")?;
        return Ok(unescape(&stripped[..close]));
    }
    if field.is_empty() {
        return Err("empty field name".to_string());
    }
    Ok(field.to_string())
}

/// Splits comma-separated values, keeping commas inside quotes intact.
fn split_values(text: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;
    for c in text.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                current.push(c);
                in_quotes = !in_quotes;
            }
            ',' if !in_quotes => {
                cells.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

fn parse_scalar(text: &str) -> Result<Value, String> {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix('"') {
        let close = find_closing_quote(stripped).ok_or("unterminated string")?;
        if close + 1 != stripped.len() {
            return Err(format!("trailing characters after string in {:?}", text));
        }
        return Ok(Value::String(unescape(&stripped[..close])));
    }
    Ok(match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => {
            if looks_like_number(text) {
                if let Ok(i) = text.parse::<i64>() {
                    Value::Number(Number::Integer(i))
                } else {
                    Value::Number(Number::Float(
                        text.parse::<f64>().map_err(|e| e.to_string())?,
                    ))
                }
            } else {
                Value::String(text.to_string())
            }
        }
    })
}

/// Byte index of the closing quote in text that follows an opening quote.
fn find_closing_quote(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Some(i);
        }
    }
    None
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
