//! Fuzzing target for source path parsing and resolution
//!
//! Any input must either parse or return a `PathError`, and a parsed path
//! must resolve against any document without panicking.

#![no_main]

use fieldmap_core::path::{join, PathExpr};
use libfuzzer_sys::fuzz_target;
use serde_json::json;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    let docs = [
        json!(null),
        json!("string"),
        json!([1, [2, [3]]]),
        json!({"a": {"b": [{"c": 1}]}, "items": []}),
    ];

    if let Ok(path) = PathExpr::parse(&text) {
        for doc in &docs {
            let _ = path.resolve(doc);
        }
        let _ = path.last_key();
    }

    let _ = join(&text, "suffix");
    let _ = join("prefix", &text);
});
