// validators/tests/part_rules.rs
//
// Integration tests for the rules that look at how strokes and parts sit
// together in one glyph.
//
// Tests cover:
// - dup: near duplicates, exact mode for non-kanji, exactness property
// - ids: first part of IDS-named glyphs
// - order: first and last parts
// - donotuse through the engine

mod common;

use common::{codes_for, dump, run_rule};
use gwv_core::{KageData, ReferenceData};
use gwv_validators::dup::find_duplicate;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

#[test]
fn near_horizontal_duplicate_row() {
    let dump = dump(&[
        ("u4e00", "1:0:0:10:50:90:50$1:0:0:10:53:90:53"),
        ("u4e01", "1:0:0:10:50:90:50$1:0:0:10:56:90:56"),
    ]);
    let result = run_rule("dup", &dump, &ReferenceData::default());
    assert_eq!(
        result,
        json!({"10": [[
            "u4e00",
            [1, "1:0:0:10:53:90:53"],
            [0, "1:0:0:10:50:90:50"],
            80
        ]]})
    );
}

#[test]
fn non_kanji_is_checked_exactly() {
    let data = "1:0:0:10:50:90:50$1:0:0:10:53:90:53";
    let dump = dump(&[("u0041", data), ("u4e00", data)]);
    let result = run_rule("dup", &dump, &ReferenceData::default());
    assert!(codes_for(&result, "u0041").is_empty());
    assert_eq!(codes_for(&result, "u4e00"), vec!["10"]);
}

fn horizontal(y: i64, x1: i64, x2: i64) -> String {
    format!("1:0:0:{x1}:{y}:{x2}:{y}")
}

proptest! {
    #[test]
    fn exact_findings_are_default_findings(
        y1 in 10i64..190,
        dy in 0i64..6,
        x1 in 0i64..100,
        len1 in 20i64..100,
        x2 in 0i64..100,
        len2 in 20i64..100,
    ) {
        let data = format!(
            "{}${}",
            horizontal(y1, x1, x1 + len1),
            horizontal(y1 + dy, x2, x2 + len2)
        );
        let kage = KageData::parse(&data);
        let exact = find_duplicate(&kage, true).unwrap();
        let default = find_duplicate(&kage, false).unwrap();
        if exact.is_some() {
            prop_assert!(default.is_some());
        }
    }
}

#[test]
fn ids_first_part_scenario() {
    let dump = dump(&[(
        "u2ff0-u4e00-u4e01",
        "99:0:0:0:0:200:200:u4e00-04$99:0:0:100:0:200:200:u4e01-02",
    )]);
    let result = run_rule("ids", &dump, &ReferenceData::default());
    assert_eq!(
        result,
        json!({"1": [["u2ff0-u4e00-u4e01", "u4e00-04"]]})
    );
}

#[test]
fn part_order() {
    let dump = dump(&[
        ("u6797", "99:0:0:0:0:200:200:u6728-02$99:0:0:0:0:200:200:u6728-01"),
        ("u6798", "99:0:0:0:0:200:200:u6728-01$99:0:0:0:0:200:200:u6728-02"),
        ("u6799", "99:0:0:0:0:200:200:u6728-01$99:0:0:0:0:200:200:u6728-01"),
    ]);
    let result = run_rule("order", &dump, &ReferenceData::default());
    assert_eq!(codes_for(&result, "u6797"), vec!["2"]);
    assert!(codes_for(&result, "u6798").is_empty());
    assert_eq!(codes_for(&result, "u6799"), vec!["11"]);
}

#[test]
fn do_not_use_quotes() {
    let dump = dump(&[
        ("u4e00", "99:0:0:0:0:200:100:old-part$1:0:0:10:150:190:150"),
        ("old-part", "99:0:0:0:0:200:200:do-not-use-old-part"),
    ]);
    let result = run_rule("donotuse", &dump, &ReferenceData::default());
    assert_eq!(result, json!({"0": [["u4e00", "old-part"]]}));
}
