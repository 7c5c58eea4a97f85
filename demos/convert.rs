//! Convert one document into every supported target format:
//!
//! ```sh
//! cargo run --example convert
//! ```

use anyform::{byte_size_label, convert, Source, ALL_FORMATS};

fn main() {
    let input = r#"{"title":"demo","tags":["a","b"],"servers":[{"host":"x","port":1},{"host":"y","port":2}]}"#;

    for target in ALL_FORMATS {
        let result = convert(input, Source::Auto, target);
        println!(
            "=== {} ({})",
            target.label(),
            byte_size_label(result.output.len())
        );
        println!("{}\n", result.output);
    }
}
