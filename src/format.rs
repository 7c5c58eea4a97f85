//! The closed set of supported formats and their capability table.
//!
//! [`Format`] enumerates every concrete format tag the engine understands.
//! Each format is bound to its parse and serialize functions through a
//! capability table built once as static data: adding a format means adding
//! one enum variant and one table row, never touching dispatch logic.
//!
//! [`Source`] is the caller-facing source selector, which additionally
//! allows `Auto` (resolve the format by detection before parsing).

use crate::error::{Error, Result};
use crate::options::ConvertOptions;
use crate::value::Value;
use crate::{parse, ser};
use std::fmt;
use std::str::FromStr;

/// A supported serialization format.
///
/// The discriminant order is the index into the capability table; the
/// detector's probe order is a separate, deliberately different list (see
/// [`crate::detect`]).
///
/// # Examples
///
/// ```rust
/// use anyform::Format;
///
/// assert_eq!(Format::Json.as_str(), "json");
/// assert_eq!(Format::Json.label(), "JSON");
/// assert_eq!("yaml".parse::<Format>().unwrap(), Format::Yaml);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    Text,
    Json,
    Json5,
    Xml,
    Yaml,
    Toml,
    Toon,
    Ini,
    Dotenv,
    Csv,
    Tsv,
    Jsonl,
    Msgpack,
    Base64,
    Hex,
    Binary,
    Uri,
    QueryString,
}

/// Every supported format, in picker order.
pub const ALL_FORMATS: [Format; 18] = [
    Format::Text,
    Format::Json,
    Format::Json5,
    Format::Xml,
    Format::Yaml,
    Format::Toml,
    Format::Toon,
    Format::Ini,
    Format::Dotenv,
    Format::Csv,
    Format::Tsv,
    Format::Jsonl,
    Format::Msgpack,
    Format::Base64,
    Format::Hex,
    Format::Binary,
    Format::Uri,
    Format::QueryString,
];

impl Format {
    /// The canonical tag string for this format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Json => "json",
            Format::Json5 => "json5",
            Format::Xml => "xml",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
            Format::Toon => "toon",
            Format::Ini => "ini",
            Format::Dotenv => "dotenv",
            Format::Csv => "csv",
            Format::Tsv => "tsv",
            Format::Jsonl => "jsonl",
            Format::Msgpack => "msgpack",
            Format::Base64 => "base64",
            Format::Hex => "hex",
            Format::Binary => "binary",
            Format::Uri => "uri",
            Format::QueryString => "querystring",
        }
    }

    /// The human-readable display label for this format.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Format::Text => "Plain Text",
            Format::Json => "JSON",
            Format::Json5 => "JSON5",
            Format::Xml => "XML",
            Format::Yaml => "YAML",
            Format::Toml => "TOML",
            Format::Toon => "TOON",
            Format::Ini => "INI",
            Format::Dotenv => "dotenv",
            Format::Csv => "CSV",
            Format::Tsv => "TSV",
            Format::Jsonl => "JSONL",
            Format::Msgpack => "MessagePack",
            Format::Base64 => "Base64",
            Format::Hex => "Hexadecimal",
            Format::Binary => "Binary",
            Format::Uri => "URI Encoded",
            Format::QueryString => "Query String",
        }
    }

    /// Resolves a tag string to a format, or `None` if the tag is unknown.
    ///
    /// `"auto"` is not a concrete format; resolve it through
    /// [`Source::from_str`] instead.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Format> {
        ALL_FORMATS.iter().copied().find(|f| f.as_str() == tag)
    }

    /// Looks up the parse/serialize capability entry for this format.
    pub(crate) fn codec(self) -> &'static Codec {
        &CODECS[self as usize]
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Format::from_tag(s).ok_or_else(|| Error::UnknownFormat(s.to_string()))
    }
}

/// The source-format selector for a conversion request.
///
/// `Auto` means "run the detector first"; anything else names a concrete
/// format directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Auto,
    Format(Format),
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "auto" {
            Ok(Source::Auto)
        } else {
            Ok(Source::Format(s.parse()?))
        }
    }
}

impl From<Format> for Source {
    fn from(format: Format) -> Self {
        Source::Format(format)
    }
}

/// One capability table row: how to parse text in a format and how to
/// serialize a value into it.
pub(crate) struct Codec {
    pub parse: fn(&str) -> Result<Value>,
    pub serialize: fn(&Value, &ConvertOptions) -> Result<String>,
}

// Rows must stay in `Format` discriminant order.
static CODECS: [Codec; 18] = [
    Codec { parse: parse::parse_text, serialize: ser::serialize_text },
    Codec { parse: parse::parse_json, serialize: ser::serialize_json },
    Codec { parse: parse::parse_json5, serialize: ser::serialize_json5 },
    Codec { parse: parse::parse_xml, serialize: ser::serialize_xml },
    Codec { parse: parse::parse_yaml, serialize: ser::serialize_yaml },
    Codec { parse: parse::parse_toml, serialize: ser::serialize_toml },
    Codec { parse: parse::parse_toon, serialize: ser::serialize_toon },
    Codec { parse: parse::parse_ini, serialize: ser::serialize_ini },
    Codec { parse: parse::parse_dotenv, serialize: ser::serialize_dotenv },
    Codec { parse: parse::parse_csv, serialize: ser::serialize_csv },
    Codec { parse: parse::parse_tsv, serialize: ser::serialize_tsv },
    Codec { parse: parse::parse_jsonl, serialize: ser::serialize_jsonl },
    Codec { parse: parse::parse_msgpack, serialize: ser::serialize_msgpack },
    Codec { parse: parse::parse_base64, serialize: ser::serialize_base64 },
    Codec { parse: parse::parse_hex, serialize: ser::serialize_hex },
    Codec { parse: parse::parse_binary, serialize: ser::serialize_binary },
    Codec { parse: parse::parse_uri, serialize: ser::serialize_uri },
    Codec { parse: parse::parse_querystring, serialize: ser::serialize_querystring },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for format in ALL_FORMATS {
            assert_eq!(Format::from_tag(format.as_str()), Some(format));
            assert_eq!(format.as_str().parse::<Format>().unwrap(), format);
        }
    }

    #[test]
    fn test_unknown_tag() {
        assert!(Format::from_tag("protobuf").is_none());
        assert!("protobuf".parse::<Format>().is_err());
    }

    #[test]
    fn test_auto_is_a_source_not_a_format() {
        assert!(Format::from_tag("auto").is_none());
        assert_eq!("auto".parse::<Source>().unwrap(), Source::Auto);
        assert_eq!(
            "toml".parse::<Source>().unwrap(),
            Source::Format(Format::Toml)
        );
    }

    #[test]
    fn test_codec_table_order_matches_discriminants() {
        // Spot checks that the table rows line up with the enum.
        let json = Format::Json.codec();
        assert!((json.parse)("{\"a\":1}").is_ok());
        assert!((json.parse)("{oops").is_err());

        let hex = Format::Hex.codec();
        assert!((hex.parse)("68 69").is_ok());
    }
}
