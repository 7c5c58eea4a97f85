//! Delimited tabular formats (CSV and TSV) over the `csv` crate.
//!
//! Parsing treats the first record as the header row and yields a Sequence
//! of Mappings, one per data row. Every cell stays a string: the tabular
//! formats are deliberately lossy about scalar types, and re-typing "30"
//! as a number here would invent information the source never had.
//!
//! Serialization accepts a Sequence of Mappings (or a single Mapping,
//! treated as a one-row table). The header is the union of row keys in
//! first-seen order; rows missing a field get an empty cell, and nested
//! structures are embedded as compact JSON.

use crate::map::Map;
use crate::value::Value;

pub(crate) fn from_delimited(text: &str, delimiter: u8) -> Result<Value, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() {
        return Err("no header row".to_string());
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        let mut row = Map::with_capacity(headers.len());
        // Cells beyond the header width are dropped; short rows simply
        // omit the trailing fields.
        for (header, cell) in headers.iter().zip(record.iter()) {
            row.insert(header.clone(), Value::String(cell.to_string()));
        }
        rows.push(Value::Mapping(row));
    }
    Ok(Value::Sequence(rows))
}

pub(crate) fn to_delimited(value: &Value, delimiter: u8) -> Result<String, String> {
    let rows: Vec<&Map> = match value {
        Value::Mapping(map) => vec![map],
        Value::Sequence(seq) => seq
            .iter()
            .map(|item| item.as_mapping().ok_or("sequence items must be mappings"))
            .collect::<Result<_, _>>()?,
        _ => return Err("value is not tabular".to_string()),
    };
    if rows.is_empty() {
        return Err("empty table".to_string());
    }

    let mut headers: Vec<&str> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer.write_record(&headers).map_err(|e| e.to_string())?;
    for row in &rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|header| match row.get(*header) {
                None | Some(Value::Null) => Ok(String::new()),
                Some(cell) => cell_text(cell),
            })
            .collect::<Result<_, String>>()?;
        writer.write_record(&cells).map_err(|e| e.to_string())?;
    }

    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    let mut out = String::from_utf8(bytes).map_err(|e| e.to_string())?;
    while out.ends_with('\n') || out.ends_with('\r') {
        out.pop();
    }
    Ok(out)
}

fn cell_text(value: &Value) -> Result<String, String> {
    match value.primitive_text() {
        Some(text) => Ok(text),
        // Nested structure in a cell: embed as compact JSON.
        None => serde_json::to_string(value).map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_parse_as_string_mappings() {
        let value = from_delimited("name,age\nAlice,30\nBob,25", b',').unwrap();
        let rows = value.as_sequence().unwrap();
        assert_eq!(rows.len(), 2);
        let alice = rows[0].as_mapping().unwrap();
        assert_eq!(alice.get("name"), Some(&Value::from("Alice")));
        // Cells are never re-typed.
        assert_eq!(alice.get("age"), Some(&Value::from("30")));
    }

    #[test]
    fn test_short_rows_omit_trailing_fields() {
        let value = from_delimited("a,b,c\n1,2", b',').unwrap();
        let row = value.as_sequence().unwrap()[0].as_mapping().unwrap().clone();
        assert_eq!(row.len(), 2);
        assert!(row.get("c").is_none());
    }

    #[test]
    fn test_header_is_union_of_row_keys() {
        let rows = Value::Sequence(vec![
            Value::Mapping(Map::from_iter([
                ("a".to_string(), Value::from(1)),
                ("b".to_string(), Value::from(2)),
            ])),
            Value::Mapping(Map::from_iter([
                ("a".to_string(), Value::from(3)),
                ("c".to_string(), Value::from(4)),
            ])),
        ]);
        let csv = to_delimited(&rows, b',').unwrap();
        assert_eq!(csv, "a,b,c\n1,2,\n3,,4");
    }

    #[test]
    fn test_single_mapping_is_a_one_row_table() {
        let map = Value::Mapping(Map::from_iter([
            ("x".to_string(), Value::from(true)),
            ("y".to_string(), Value::from("z")),
        ]));
        assert_eq!(to_delimited(&map, b'\t').unwrap(), "x\ty\ntrue\tz");
    }

    #[test]
    fn test_nested_cells_embed_json() {
        let rows = Value::Sequence(vec![Value::Mapping(Map::from_iter([(
            "a".to_string(),
            Value::Sequence(vec![Value::from(1), Value::from(2)]),
        )]))]);
        let csv = to_delimited(&rows, b',').unwrap();
        assert_eq!(csv, "a\n\"[1,2]\"");
    }

    #[test]
    fn test_non_tabular_values_error() {
        assert!(to_delimited(&Value::from(42), b',').is_err());
        assert!(to_delimited(&Value::Sequence(vec![Value::from(1)]), b',').is_err());
        assert!(to_delimited(&Value::Sequence(vec![]), b',').is_err());
    }

    #[test]
    fn test_quoting_round_trip() {
        let rows = Value::Sequence(vec![Value::Mapping(Map::from_iter([(
            "note".to_string(),
            Value::from("hello, \"world\""),
        )]))]);
        let csv = to_delimited(&rows, b',').unwrap();
        let back = from_delimited(&csv, b',').unwrap();
        assert_eq!(
            back.as_sequence().unwrap()[0]
                .as_mapping()
                .unwrap()
                .get("note"),
            Some(&Value::from("hello, \"world\""))
        );
    }
}
