// validators/tests/common/mod.rs
//
// Shared helpers: build small dumps and run registered rules over them.

#![allow(dead_code)]

use std::path::PathBuf;

use gwv_core::{Dump, Engine, ReferenceData};
use serde_json::Value;

/// Dump from `(name, data)` pairs with no related characters.
pub fn dump(entries: &[(&str, &str)]) -> Dump {
    Dump::from_entries(entries.iter().map(|(n, d)| (*n, "u3013", *d)), 0.0)
}

/// Dump from `(name, related, data)` triples.
pub fn dump_related(entries: &[(&str, &str, &str)]) -> Dump {
    Dump::from_entries(entries.iter().copied(), 0.0)
}

/// The reference tables shipped in `data/`.
pub fn bundled_data() -> ReferenceData {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data");
    ReferenceData::load(dir).expect("bundled reference tables load")
}

/// Result map of one registered rule, as JSON.
pub fn run_rule(name: &str, dump: &Dump, data: &ReferenceData) -> Value {
    let validators = gwv_validators::build_selected(&[name], data).unwrap();
    let output = Engine::new(validators).run(dump).unwrap();
    serde_json::to_value(&output[name].result).unwrap()
}

/// Codes a rule reported for `glyph`.
pub fn codes_for(result: &Value, glyph: &str) -> Vec<String> {
    let Some(map) = result.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter(|(_, rows)| {
            rows.as_array()
                .is_some_and(|rows| rows.iter().any(|row| row[0] == glyph))
        })
        .map(|(code, _)| code.clone())
        .collect()
}
