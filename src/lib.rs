//! # anyform
//!
//! A format conversion engine: detect the format of raw text, parse it into
//! a canonical intermediate value, and serialize that value into any of 18
//! supported formats.
//!
//! ## Supported Formats
//!
//! Structured text (JSON, JSON5, XML, YAML, TOML, TOON, INI, dotenv),
//! tabular text (CSV, TSV, JSONL), binary-over-text transports (MessagePack,
//! Base64, hex, binary digits, URI encoding), query strings, and plain text.
//!
//! ## Key Properties
//!
//! - **Canonical intermediate value**: every format parses into the same
//!   [`Value`] union and serializes from it, so any source converts to any
//!   target without per-pair glue code
//! - **Ordered detection**: [`detect`] runs a fixed probe chain from most
//!   specific grammar to most permissive, falling back to plain text;
//!   detection never fails
//! - **Fail-soft conversion**: [`convert`] never returns an error; parse and
//!   serialize failures surface as sentinel strings in the normal output
//! - **Deterministic output**: mappings preserve insertion order end to end,
//!   so converting the same input twice is byte-identical
//!
//! ## Quick Start
//!
//! ```rust
//! use anyform::{convert, Format, Source};
//!
//! // Source format detection is automatic.
//! let result = convert(r#"{"name":"Alice","age":30}"#, Source::Auto, Format::Yaml);
//! assert_eq!(result.resolved_source, Format::Json);
//! assert_eq!(result.detected_label, Some("JSON"));
//! assert_eq!(result.output, "name: Alice\nage: 30\n");
//!
//! // Failures become sentinel strings, never panics or errors.
//! let failed = convert("{not json", Source::Format(Format::Json), Format::Text);
//! assert_eq!(failed.output, "Error: Could not parse json");
//! ```
//!
//! ### Working with Values Directly
//!
//! ```rust
//! use anyform::{parse, serialize, value, Format};
//!
//! let data = value!({
//!     "users": [
//!         {"id": 1, "name": "Alice"},
//!         {"id": 2, "name": "Bob"}
//!     ]
//! });
//!
//! // Uniform arrays of flat mappings render as TOON tables.
//! let toon = serialize(&data, Format::Toon).unwrap();
//! assert_eq!(toon, "users[2]{id,name}:\n  1,Alice\n  2,Bob");
//!
//! let back = parse(&toon, Format::Toon).unwrap();
//! assert_eq!(back, data);
//! ```
//!
//! ### Detection
//!
//! ```rust
//! use anyform::{detect, Format};
//!
//! assert_eq!(detect("a: 1\nb: 2\n"), Format::Yaml);
//! assert_eq!(detect("name,age\nAlice,30\n"), Format::Csv);
//! assert_eq!(detect("aGVsbG8="), Format::Base64);
//! ```
//!
//! ## Error Handling
//!
//! The low-level [`parse`] and [`serialize`] functions return [`Result`] for
//! callers that want to branch on failure. The [`convert`] boundary consumes
//! those errors and renders them as `Error: Could not parse <format>` /
//! `Error: Could not convert to <format>` sentinels instead, which is the
//! contract a live editor surface needs: there is always output to show.

mod convert;
mod detect;
mod error;
mod format;
mod macros;
mod map;
mod options;
mod parse;
mod ser;
mod tabular;
mod toon;
mod transport;
mod value;
mod xml;

pub use convert::{
    beautify, byte_size_label, convert, convert_tags, convert_with_options, minify, parse,
    serialize, serialize_with_options, Conversion,
};
pub use detect::detect;
pub use error::{Error, Result};
pub use format::{Format, Source, ALL_FORMATS};
pub use map::Map;
pub use options::ConvertOptions;
pub use value::{Number, Shape, Value};
