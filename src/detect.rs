//! Format detection over raw input text.
//!
//! Detection iterates [`PROBES`], a fixed ordered list of probe descriptors,
//! and returns the first match; the list order is part of the engine's
//! contract, because several formats overlap textually (every JSON document
//! is valid YAML, base64 text can decode as MessagePack, a TOML assignment
//! looks like a dotenv line). Earlier probes are more specific, later ones
//! progressively looser, and plain text is the unconditional fallback, so
//! detection never fails.
//!
//! Each probe pairs a cheap textual heuristic with a verification parse, so
//! a format only claims input it can actually load.

use crate::format::Format;
use crate::value::Value;
use crate::{parse, tabular, transport};

/// One detection rule: a format and the predicate that claims input for it.
struct Probe {
    format: Format,
    matches: fn(&str) -> bool,
}

/// The probe chain, most constrained grammar first. Reordering entries
/// changes which format wins on ambiguous input, so the order is locked by
/// tests.
static PROBES: [Probe; 17] = [
    Probe { format: Format::Json, matches: probe_json },
    Probe { format: Format::Json5, matches: probe_json5 },
    Probe { format: Format::Xml, matches: probe_xml },
    Probe { format: Format::Toml, matches: probe_toml },
    Probe { format: Format::Yaml, matches: probe_yaml },
    Probe { format: Format::Toon, matches: probe_toon },
    Probe { format: Format::Ini, matches: probe_ini },
    Probe { format: Format::Dotenv, matches: probe_dotenv },
    Probe { format: Format::Jsonl, matches: probe_jsonl },
    Probe { format: Format::Csv, matches: probe_csv },
    Probe { format: Format::Tsv, matches: probe_tsv },
    Probe { format: Format::Msgpack, matches: probe_msgpack },
    Probe { format: Format::Base64, matches: probe_base64 },
    Probe { format: Format::Hex, matches: probe_hex },
    Probe { format: Format::Binary, matches: probe_binary },
    Probe { format: Format::Uri, matches: probe_uri },
    Probe { format: Format::QueryString, matches: probe_querystring },
];

/// Detects the format of `text`. Always returns something; [`Format::Text`]
/// is the fallback when no probe matches.
///
/// # Examples
///
/// ```rust
/// use anyform::{detect, Format};
///
/// assert_eq!(detect(r#"{"a": 1}"#), Format::Json);
/// assert_eq!(detect("a: 1\nb: 2"), Format::Yaml);
/// assert_eq!(detect("aGVsbG8="), Format::Base64);
/// assert_eq!(detect("just some words"), Format::Text);
/// ```
#[must_use]
pub fn detect(text: &str) -> Format {
    PROBES
        .iter()
        .find(|probe| (probe.matches)(text))
        .map(|probe| probe.format)
        .unwrap_or(Format::Text)
}

fn probe_json(text: &str) -> bool {
    parse::parse_json(text).is_ok()
}

/// JSON5 must show a feature plain JSON lacks, or the earlier JSON probe
/// would have claimed the input anyway.
fn probe_json5(text: &str) -> bool {
    (text.contains("//") || text.contains("/*") || has_trailing_comma(text))
        && parse::parse_json5(text).is_ok()
}

fn probe_xml(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('<') && trimmed.ends_with('>') && parse::parse_xml(text).is_ok()
}

fn probe_toml(text: &str) -> bool {
    (has_section_line(text, false) || starts_with_assignment(text, true))
        && parse::parse_toml(text).is_ok()
}

/// YAML parses almost anything, so the shape heuristic carries the weight:
/// a colon somewhere and no flow-syntax braces or brackets anywhere.
fn probe_yaml(text: &str) -> bool {
    text.contains(':')
        && !text.contains('{')
        && !text.contains('[')
        && parse::parse_yaml(text).is_ok()
}

fn probe_toon(text: &str) -> bool {
    (has_length_declaration(text) || has_field_declaration(text))
        && (has_indented_line(text) || text.contains(":\n") || text.contains(":\r\n"))
        && parse::parse_toon(text).is_ok()
}

fn probe_ini(text: &str) -> bool {
    has_section_line(text, true)
        && starts_with_assignment(text, false)
        && parse::parse_ini(text).is_ok()
}

fn probe_dotenv(text: &str) -> bool {
    starts_with_upper_assignment(text) || all_dotenv_lines(text)
}

fn probe_jsonl(text: &str) -> bool {
    let lines: Vec<&str> = text.trim().lines().collect();
    lines.len() > 1
        && lines
            .iter()
            .all(|line| serde_json::from_str::<Value>(line.trim()).is_ok())
}

fn probe_csv(text: &str) -> bool {
    looks_tabular(text, b',')
}

fn probe_tsv(text: &str) -> bool {
    text.contains('\t') && looks_tabular(text, b'\t')
}

/// Any base64 text whose bytes happen to decode as one complete MessagePack
/// document matches here, ahead of the plain base64 probe. That makes
/// legitimate base64 of arbitrary bytes a known false-positive source.
fn probe_msgpack(text: &str) -> bool {
    transport::looks_like_base64(text) && parse::parse_msgpack(text).is_ok()
}

/// Byte-exact round trip, not merely "decodes without error".
fn probe_base64(text: &str) -> bool {
    transport::base64_round_trips(text)
}

fn probe_hex(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_hexdigit() || c.is_whitespace())
}

fn probe_binary(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c == '0' || c == '1' || c.is_whitespace())
}

/// A `%` escape that actually decodes to something different.
fn probe_uri(text: &str) -> bool {
    if !text.contains('%') {
        return false;
    }
    match transport::uri_decode(text) {
        Ok(decoded) => decoded != text,
        Err(_) => false,
    }
}

fn probe_querystring(text: &str) -> bool {
    text.contains('=')
        && (text.contains('&') || !text.contains(' '))
        && parse::parse_querystring(text)
            .ok()
            .and_then(|v| v.as_mapping().map(|m| !m.is_empty()))
            .unwrap_or(false)
}

/// A `,` followed only by whitespace before a closing brace or bracket.
fn has_trailing_comma(text: &str) -> bool {
    for (i, c) in text.char_indices() {
        if c == ',' {
            let rest = text[i + 1..].trim_start();
            if rest.starts_with('}') || rest.starts_with(']') {
                return true;
            }
        }
    }
    false
}

/// A line starting with `[name]`. TOML section names allow dots; INI
/// section names allow spaces.
fn has_section_line(text: &str, allow_spaces: bool) -> bool {
    text.lines().any(|line| {
        let Some(inner) = line.strip_prefix('[') else {
            return false;
        };
        let Some(end) = inner.find(']') else {
            return false;
        };
        let name = &inner[..end];
        !name.is_empty()
            && name.chars().all(|c| {
                c.is_alphanumeric()
                    || c == '_'
                    || (allow_spaces && c == ' ')
                    || (!allow_spaces && c == '.')
            })
    })
}

/// Text beginning with `key=` (optionally `key =` when `spaced`).
fn starts_with_assignment(text: &str, spaced: bool) -> bool {
    let key_len = text
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .map(char::len_utf8)
        .sum::<usize>();
    if key_len == 0 {
        return false;
    }
    let rest = if spaced {
        text[key_len..].trim_start()
    } else {
        &text[key_len..]
    };
    rest.starts_with('=')
}

fn starts_with_upper_assignment(text: &str) -> bool {
    let key_len = text
        .bytes()
        .take_while(|b| b.is_ascii_uppercase() || *b == b'_')
        .count();
    key_len > 0 && text.as_bytes().get(key_len) == Some(&b'=')
}

/// Every line is blank, a `#` comment, or a `key=value` assignment with a
/// value that does not end in `=` (base64 text like `aGVsbG8=` would
/// otherwise read as an assignment to nothing). Vacuously true for empty
/// input, which is deliberate: detection never fails, and an empty document
/// reads as an empty environment file.
fn all_dotenv_lines(text: &str) -> bool {
    text.lines().all(|line| {
        line.trim().is_empty()
            || line.starts_with('#')
            || (starts_with_assignment(line, false) && !line.trim_end().ends_with('='))
    })
}

/// An array length declaration like `[3]:`.
fn has_length_declaration(text: &str) -> bool {
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'[' {
            continue;
        }
        let digits = bytes[i + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits > 0
            && bytes.get(i + 1 + digits) == Some(&b']')
            && bytes.get(i + 2 + digits) == Some(&b':')
        {
            return true;
        }
    }
    false
}

/// A tabular field declaration like `{id,name}:`.
fn has_field_declaration(text: &str) -> bool {
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'{' {
            continue;
        }
        let inner = bytes[i + 1..]
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_' || **b == b',')
            .count();
        if inner > 0
            && bytes.get(i + 1 + inner) == Some(&b'}')
            && bytes.get(i + 2 + inner) == Some(&b':')
        {
            return true;
        }
    }
    false
}

fn has_indented_line(text: &str) -> bool {
    text.lines()
        .any(|line| line.starts_with(' ') || line.starts_with('\t'))
}

/// At least one data row under a header of more than one column.
fn looks_tabular(text: &str, delimiter: u8) -> bool {
    match tabular::from_delimited(text, delimiter) {
        Ok(Value::Sequence(rows)) => {
            !rows.is_empty()
                && rows[0]
                    .as_mapping()
                    .is_some_and(|row| row.len() > 1)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_detected_before_yaml() {
        // Valid YAML too, but JSON wins by probe order.
        assert_eq!(detect(r#"{"a": 1}"#), Format::Json);
        assert_eq!(detect("[1, 2, 3]"), Format::Json);
        assert_eq!(detect("42"), Format::Json);
    }

    #[test]
    fn test_json5_needs_a_distinguishing_feature() {
        assert_eq!(detect("{\"a\": 1, // comment\n\"b\": 2}"), Format::Json5);
        assert_eq!(detect("{\"a\": 1,}"), Format::Json5);
    }

    #[test]
    fn test_xml() {
        assert_eq!(detect("<root><a>1</a></root>"), Format::Xml);
        assert_eq!(detect("  <a>1</a>  "), Format::Xml);
    }

    #[test]
    fn test_toml_assignment_and_sections() {
        assert_eq!(detect("a = 1\nb = 2"), Format::Toml);
        assert_eq!(detect("[server]\nhost = \"x\""), Format::Toml);
        // A lone bare assignment parses as TOML and wins over dotenv.
        assert_eq!(detect("a=1"), Format::Toml);
    }

    #[test]
    fn test_yaml() {
        assert_eq!(detect("a: 1\nb: 2\n"), Format::Yaml);
        // Flow syntax contains braces, which the YAML probe excludes.
        assert_eq!(detect(r#"{"a": 1}"#), Format::Json);
    }

    #[test]
    fn test_toon_length_declarations() {
        assert_eq!(detect("users[2]{id,name}:\n  1,Alice\n  2,Bob"), Format::Toon);
        assert_eq!(detect("items[2]:\n  - 1\n  - 2"), Format::Toon);
    }

    #[test]
    fn test_ini_needs_section_and_leading_assignment() {
        assert_eq!(detect("top=1\n[db]\nhost=localhost"), Format::Ini);
    }

    #[test]
    fn test_dotenv() {
        assert_eq!(detect("DB_HOST=localhost\nDB_PORT=5432"), Format::Dotenv);
        assert_eq!(detect("# comment\nkey=value"), Format::Dotenv);
        // Empty input reads as an empty environment file.
        assert_eq!(detect(""), Format::Dotenv);
    }

    #[test]
    fn test_jsonl_needs_multiple_lines() {
        assert_eq!(detect("{\"a\":1}\n{\"a\":2}"), Format::Jsonl);
        // One JSON line is plain JSON.
        assert_eq!(detect("{\"a\":1}"), Format::Json);
    }

    #[test]
    fn test_csv_and_tsv() {
        assert_eq!(detect("name,age\nAlice,30\n"), Format::Csv);
        assert_eq!(detect("name\tage\nAlice\t30\n"), Format::Tsv);
        // A single column is not enough evidence.
        assert_eq!(detect("words\nmore words"), Format::Text);
    }

    #[test]
    fn test_base64_round_trip_required() {
        assert_eq!(detect("aGVsbG8="), Format::Base64);
        // Valid alphabet but not a byte-exact round trip.
        assert_ne!(detect("aGVsbG8"), Format::Base64);
    }

    #[test]
    fn test_hex_and_binary() {
        assert_eq!(detect("68 65 6c 6c 6f"), Format::Hex);
        assert_eq!(detect("abc"), Format::Hex);
        // Binary digits are hex digits too, and the hex probe runs first, so
        // binary input is only reachable by naming the format explicitly.
        assert_eq!(detect("01101000 01101001"), Format::Hex);
        assert!(crate::parse::parse_binary("01101000 01101001").is_ok());
        // Hex digits in a 4-aligned run are also byte-exact base64, and the
        // base64 probe runs first.
        assert_eq!(detect("cafe"), Format::Base64);
    }

    #[test]
    fn test_uri_requires_effective_escapes() {
        assert_eq!(detect("%7B%22a%22%3A1%7D"), Format::Uri);
        // A '%' that decodes to itself is not URI encoding.
        assert_ne!(detect("100%"), Format::Uri);
    }

    #[test]
    fn test_msgpack_needs_base64_alphabet_and_full_decode() {
        // base64 of 0x81 0xa1 'a' 0x01, the msgpack encoding of {"a": 1}
        assert_eq!(detect("gaFhAQ=="), Format::Msgpack);
    }

    #[test]
    fn test_querystring() {
        assert_eq!(detect("foo.bar=1&flag=true&flag=false"), Format::QueryString);
        // Pairs whose keys are bare words read as dotenv lines first.
        assert_eq!(detect("a=1&b=2"), Format::Dotenv);
    }

    #[test]
    fn test_fallback_is_text() {
        assert_eq!(detect("just some plain words here"), Format::Text);
    }

    #[test]
    fn test_probe_list_covers_every_format_but_text() {
        let mut formats: Vec<Format> = PROBES.iter().map(|p| p.format).collect();
        formats.push(Format::Text);
        for format in crate::format::ALL_FORMATS {
            assert!(formats.contains(&format), "{format} has no probe");
        }
    }
}
