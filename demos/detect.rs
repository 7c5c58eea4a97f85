//! Run the format detector over a handful of sample inputs:
//!
//! ```sh
//! cargo run --example detect
//! ```

use anyform::detect;

fn main() {
    let samples = [
        r#"{"name": "Alice", "age": 30}"#,
        "name: Alice\nage: 30",
        "name = \"Alice\"\nage = 30",
        "name,age\nAlice,30",
        "users[2]{id,name}:\n  1,Alice\n  2,Bob",
        "DB_HOST=localhost\nDB_PORT=5432",
        "aGVsbG8gd29ybGQ=",
        "%7B%22a%22%3A1%7D",
        "just a plain sentence",
    ];

    for sample in samples {
        let format = detect(sample);
        let preview = sample.lines().next().unwrap_or_default();
        println!("{:<12} {:<14} {}", format.as_str(), format.label(), preview);
    }
}
