// validators/tests/shape_rules.rs
//
// Integration tests for the stroke-shape rules run through the engine.
//
// Tests cover:
// - illegal: alias records, column counts, sorted rows
// - skew and numexp on the same dump
// - user-owned glyphs are left alone

mod common;

use common::{codes_for, dump, run_rule};
use gwv_core::ReferenceData;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn alias_record_is_legal() {
    let dump = dump(&[
        ("u4e00", "1:0:0:10:100:190:100"),
        ("u4e00-j", "99:0:0:0:0:200:200:u4e00"),
    ]);
    let result = run_rule("illegal", &dump, &ReferenceData::default());
    assert_eq!(result, json!({}));
}

#[test]
fn too_few_columns() {
    let dump = dump(&[("u4e00", "1:0:0:10:100")]);
    let result = run_rule("illegal", &dump, &ReferenceData::default());
    assert_eq!(
        result,
        json!({"1": [["u4e00", "1:0:0", [0, "1:0:0:10:100"]]]})
    );
}

#[test]
fn illegal_rows_sorted_by_shape() {
    let dump = dump(&[
        ("u4e00", "1:0:0:10:100:190:100:5"),
        ("u4e01", "2:0:0:10:100"),
        ("u4e02", "99:0:0:0:0:200"),
        ("alice_u4e03", "1:0:0:10:100"),
    ]);
    let result = run_rule("illegal", &dump, &ReferenceData::default());
    assert_eq!(codes_for(&result, "u4e00"), vec!["2"]);
    assert_eq!(codes_for(&result, "u4e01"), vec!["1"]);
    assert_eq!(codes_for(&result, "u4e02"), vec!["4"]);
    assert!(codes_for(&result, "alice_u4e03").is_empty());
}

#[test]
fn numeric_expressions() {
    let dump = dump(&[
        ("u4e00", "1:0:0:010:100:190:100"),
        ("u4e01", "1:0:0:10:100:190:100$"),
        ("u4e02", "1:0:0:10:100:190:100"),
    ]);
    let result = run_rule("numexp", &dump, &ReferenceData::default());
    assert_eq!(codes_for(&result, "u4e00"), vec!["3"]);
    assert_eq!(codes_for(&result, "u4e01"), vec!["0"]);
    assert!(codes_for(&result, "u4e02").is_empty());
}

#[test]
fn skewed_vertical() {
    let dump = dump(&[
        ("u4e00", "1:0:0:100:20:102:180"),
        ("u4e01", "1:0:0:100:20:100:180"),
    ]);
    let result = run_rule("skew", &dump, &ReferenceData::default());
    assert_eq!(codes_for(&result, "u4e00"), vec!["11"]);
    assert!(codes_for(&result, "u4e01").is_empty());
}
