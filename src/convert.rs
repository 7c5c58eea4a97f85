//! The conversion boundary: parse, serialize, and the fail-soft `convert`.
//!
//! [`convert`] is the whole engine in one call: resolve the source format
//! (running detection when the source is [`Source::Auto`]), parse into a
//! [`Value`], serialize into the target. It never returns an error: a
//! failed parse substitutes the parse sentinel string as the value, and a
//! failed serialize substitutes the serialize sentinel as the output, so a
//! caller wiring this to a live text box always has something to show.
//!
//! The lower-level [`parse`] and [`serialize`] functions keep proper
//! `Result` returns for callers that want to handle failure themselves.

use crate::detect::detect;
use crate::error::Result;
use crate::format::{Format, Source};
use crate::options::ConvertOptions;
use crate::value::Value;

/// The outcome of one conversion request.
#[derive(Clone, Debug)]
pub struct Conversion {
    /// The rendered output, or a sentinel string if a stage failed.
    pub output: String,
    /// The concrete source format used, after any detection.
    pub resolved_source: Format,
    /// Display label for the detected format. `None` when the caller named
    /// the source format explicitly. Advisory only.
    pub detected_label: Option<&'static str>,
}

/// Parses `text` as `format` into the canonical value.
///
/// # Examples
///
/// ```rust
/// use anyform::{parse, Format, Shape};
///
/// let value = parse(r#"{"a": 1}"#, Format::Json).unwrap();
/// assert_eq!(value.shape(), Shape::Mapping);
/// ```
pub fn parse(text: &str, format: Format) -> Result<Value> {
    (format.codec().parse)(text)
}

/// Serializes `value` into `format` with default options.
///
/// # Examples
///
/// ```rust
/// use anyform::{serialize, Format, Value};
///
/// let yaml = serialize(&Value::from(true), Format::Yaml).unwrap();
/// assert_eq!(yaml.trim(), "true");
/// ```
pub fn serialize(value: &Value, format: Format) -> Result<String> {
    serialize_with_options(value, format, &ConvertOptions::default())
}

/// Serializes `value` into `format` with explicit options.
pub fn serialize_with_options(
    value: &Value,
    format: Format,
    options: &ConvertOptions,
) -> Result<String> {
    (format.codec().serialize)(value, options)
}

/// Converts `text` from `source` to `target` with default options.
///
/// This call cannot fail: parse failures surface as a sentinel value that
/// still flows through the target serializer, serialize failures surface as
/// a sentinel output.
///
/// # Examples
///
/// ```rust
/// use anyform::{convert, Format, Source};
///
/// let result = convert(r#"{"a": 1}"#, Source::Auto, Format::Yaml);
/// assert_eq!(result.resolved_source, Format::Json);
/// assert_eq!(result.detected_label, Some("JSON"));
/// assert_eq!(result.output.trim(), "a: 1");
///
/// let failed = convert("{invalid", Source::Format(Format::Json), Format::Text);
/// assert_eq!(failed.output, "Error: Could not parse json");
/// ```
#[must_use]
pub fn convert(text: &str, source: Source, target: Format) -> Conversion {
    convert_with_options(text, source, target, &ConvertOptions::default())
}

/// Converts with explicit output options. See [`convert`].
#[must_use]
pub fn convert_with_options(
    text: &str,
    source: Source,
    target: Format,
    options: &ConvertOptions,
) -> Conversion {
    let (resolved_source, detected_label) = match source {
        Source::Auto => {
            let format = detect(text);
            (format, Some(format.label()))
        }
        Source::Format(format) => (format, None),
    };

    let value = match parse(text, resolved_source) {
        Ok(value) => value,
        Err(err) => Value::String(err.sentinel()),
    };
    let output = match serialize_with_options(&value, target, options) {
        Ok(output) => output,
        Err(err) => err.sentinel(),
    };

    Conversion {
        output,
        resolved_source,
        detected_label,
    }
}

/// String-tag front door for callers holding format names rather than enum
/// values (a UI picker, a CLI flag). Unknown tags surface as an error
/// sentinel in the output, keeping this boundary fail-soft too.
///
/// # Examples
///
/// ```rust
/// use anyform::{convert_tags, Format};
///
/// let result = convert_tags(r#"{"a":1}"#, "auto", "yaml");
/// assert_eq!(result.resolved_source, Format::Json);
/// assert_eq!(result.output.trim(), "a: 1");
///
/// let unknown = convert_tags("x", "auto", "protobuf");
/// assert_eq!(unknown.output, "Error: Unknown format protobuf");
/// ```
#[must_use]
pub fn convert_tags(text: &str, source_tag: &str, target_tag: &str) -> Conversion {
    let source = match source_tag.parse::<Source>() {
        Ok(source) => source,
        Err(err) => {
            return Conversion {
                output: err.sentinel(),
                resolved_source: Format::Text,
                detected_label: None,
            }
        }
    };
    let target = match target_tag.parse::<Format>() {
        Ok(target) => target,
        Err(err) => {
            return Conversion {
                output: err.sentinel(),
                resolved_source: Format::Text,
                detected_label: None,
            }
        }
    };
    convert(text, source, target)
}

/// Renders a value as compact single-line JSON.
pub fn minify(value: &Value) -> Result<String> {
    serde_json::to_string(value).map_err(|e| crate::Error::serialize(Format::Json, e))
}

/// Renders a value as indented JSON.
pub fn beautify(value: &Value, options: &ConvertOptions) -> Result<String> {
    crate::ser::serialize_json(value, options)
}

/// Human-readable size of a rendered output, in 1024-based units with up to
/// two decimals and trailing zeros trimmed.
///
/// # Examples
///
/// ```rust
/// use anyform::byte_size_label;
///
/// assert_eq!(byte_size_label(0), "0 Bytes");
/// assert_eq!(byte_size_label(512), "512 Bytes");
/// assert_eq!(byte_size_label(1536), "1.5 KB");
/// ```
#[must_use]
pub fn byte_size_label(bytes: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    let exponent = (((bytes as f64).ln() / 1024_f64.ln()).floor() as usize).min(UNITS.len() - 1);
    let scaled = bytes as f64 / 1024_f64.powi(exponent as i32);
    let mut figure = format!("{:.2}", scaled);
    while figure.ends_with('0') {
        figure.pop();
    }
    if figure.ends_with('.') {
        figure.pop();
    }
    format!("{} {}", figure, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_json_to_yaml() {
        let result = convert(
            r#"{"name":"Alice","age":30}"#,
            Source::Format(Format::Json),
            Format::Yaml,
        );
        assert_eq!(result.output, "name: Alice\nage: 30\n");
        assert_eq!(result.resolved_source, Format::Json);
        assert_eq!(result.detected_label, None);
    }

    #[test]
    fn test_auto_source_reports_label() {
        let result = convert("a: 1\nb: 2\n", Source::Auto, Format::Json);
        assert_eq!(result.resolved_source, Format::Yaml);
        assert_eq!(result.detected_label, Some("YAML"));
    }

    #[test]
    fn test_parse_failure_becomes_sentinel_value() {
        let result = convert("{invalid", Source::Format(Format::Json), Format::Text);
        assert_eq!(result.output, "Error: Could not parse json");
    }

    #[test]
    fn test_parse_sentinel_flows_through_target_serializer() {
        // The sentinel is a Primitive string, so base64 happily encodes it.
        let result = convert("{invalid", Source::Format(Format::Json), Format::Base64);
        let decoded = crate::transport::base64_decode(&result.output).unwrap();
        assert_eq!(decoded, b"Error: Could not parse json");
    }

    #[test]
    fn test_serialize_failure_becomes_sentinel_output() {
        // A bare number has no TOML rendering.
        let result = convert("42", Source::Format(Format::Json), Format::Toml);
        assert_eq!(result.output, "Error: Could not convert to toml");
    }

    #[test]
    fn test_tag_front_door() {
        let result = convert_tags(r#"{"a":1}"#, "json", "yaml");
        assert_eq!(result.output, "a: 1\n");

        let bad_target = convert_tags("x", "text", "protobuf");
        assert_eq!(bad_target.output, "Error: Unknown format protobuf");

        let bad_source = convert_tags("x", "nope", "json");
        assert_eq!(bad_source.output, "Error: Unknown format nope");
    }

    #[test]
    fn test_minify_and_beautify() {
        let value = parse(r#"{"a": 1, "b": [1, 2]}"#, Format::Json).unwrap();
        assert_eq!(minify(&value).unwrap(), r#"{"a":1,"b":[1,2]}"#);
        let pretty = beautify(&value, &ConvertOptions::default()).unwrap();
        assert!(pretty.contains("\n  \"a\": 1"));
    }

    #[test]
    fn test_byte_size_labels() {
        assert_eq!(byte_size_label(0), "0 Bytes");
        assert_eq!(byte_size_label(1), "1 Bytes");
        assert_eq!(byte_size_label(1024), "1 KB");
        assert_eq!(byte_size_label(1536), "1.5 KB");
        assert_eq!(byte_size_label(1024 * 1024), "1 MB");
        assert_eq!(byte_size_label(2_621_440), "2.5 MB");
    }
}
