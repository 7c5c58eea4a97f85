//! Configuration options for serialization output.
//!
//! [`ConvertOptions`] controls the formatting knobs the target formats
//! expose. The defaults reproduce the engine's reference output: 2-space
//! indentation for JSON and XML, comma-delimited CSV, tab-delimited TSV.
//!
//! ## Examples
//!
//! ```rust
//! use anyform::{serialize_with_options, ConvertOptions, Format, Value};
//!
//! let value = Value::from("hello");
//! let options = ConvertOptions::new().with_indent(4);
//! let json = serialize_with_options(&value, Format::Json, &options).unwrap();
//! assert_eq!(json, "\"hello\"");
//! ```

/// Output formatting options.
///
/// # Examples
///
/// ```rust
/// use anyform::ConvertOptions;
///
/// let options = ConvertOptions::new()
///     .with_indent(4)
///     .with_csv_delimiter(b';');
/// assert_eq!(options.indent, 4);
/// ```
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    /// Spaces per indentation level in pretty-printed output (JSON, XML).
    pub indent: usize,
    /// Field delimiter override for CSV output. `None` keeps the format's
    /// native delimiter (comma for CSV, tab for TSV).
    pub csv_delimiter: Option<u8>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            indent: 2,
            csv_delimiter: None,
        }
    }
}

impl ConvertOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation width for pretty-printed formats.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Overrides the CSV field delimiter.
    #[must_use]
    pub fn with_csv_delimiter(mut self, delimiter: u8) -> Self {
        self.csv_delimiter = Some(delimiter);
        self
    }
}
