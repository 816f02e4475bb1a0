// validators/tests/full_run.rs
//
// Integration tests running the whole registry over a small dump with the
// reference tables shipped in data/.
//
// Tests cover:
// - every registered rule reports, with the dump timestamp
// - output is stable across runs
// - rule selection by name

mod common;

use common::{bundled_data, codes_for};
use gwv_core::{to_json, Dump, Engine};
use gwv_validators::{build_all, build_selected, ALL_VALIDATOR_NAMES};
use pretty_assertions::assert_eq;

fn sample_dump() -> Dump {
    Dump::from_entries(
        [
            ("u4e00", "u4e00", "1:0:0:10:100:190:100"),
            ("u4e00-j", "u4e00", "99:0:0:0:0:200:200:u4e00"),
            ("u4e01", "u4e01", "1:0:0:10:50:90:50$1:0:0:10:53:90:53"),
            ("u4e02", "u3013", "1:0:0:10:100"),
            ("u4e03", "u4e03", "99:0:0:0:0:200:200:u4e01-02$99:0:0:0:0:200:200:u4e00-01"),
            ("u4e00-01", "u3013", "1:0:0:10:100:90:100"),
            ("u4e01-02", "u3013", "1:0:0:110:50:190:50"),
            ("u2ff0-u4e00-u4e01", "u3013", "99:0:0:0:0:200:200:u4e00-04$99:0:0:100:0:200:200:u4e01-02"),
            ("u0041", "u3013", "1:0:0:10:50:90:50"),
            ("alice_test", "u3013", "1:0:0:10:100"),
        ],
        1700000000.0,
    )
}

#[test]
fn every_rule_reports() {
    let data = bundled_data();
    let output = Engine::new(build_all(&data)).run(&sample_dump()).unwrap();
    let names: Vec<&str> = output.keys().map(String::as_str).collect();
    let mut expected = ALL_VALIDATOR_NAMES.to_vec();
    expected.sort_unstable();
    assert_eq!(names, expected);
    assert!(output.values().all(|o| o.timestamp == 1700000000.0));

    let illegal = serde_json::to_value(&output["illegal"].result).unwrap();
    assert_eq!(codes_for(&illegal, "u4e02"), vec!["1"]);
    assert!(codes_for(&illegal, "alice_test").is_empty());

    let dup = serde_json::to_value(&output["dup"].result).unwrap();
    assert_eq!(codes_for(&dup, "u4e01"), vec!["10"]);

    let order = serde_json::to_value(&output["order"].result).unwrap();
    assert_eq!(codes_for(&order, "u4e03"), vec!["2"]);
}

#[test]
fn runs_are_idempotent() {
    let data = bundled_data();
    let dump = sample_dump();
    let first = Engine::new(build_all(&data)).run(&dump).unwrap();
    let second = Engine::new(build_all(&data)).run(&dump).unwrap();
    assert_eq!(to_json(&first).unwrap(), to_json(&second).unwrap());
}

#[test]
fn selected_rules_only() {
    let data = bundled_data();
    let validators = build_selected(&["skew", "illegal", "skew"], &data).unwrap();
    let output = Engine::new(validators).run(&sample_dump()).unwrap();
    let names: Vec<&str> = output.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["illegal", "skew"]);

    assert!(build_selected(&["nosuchrule"], &data).is_err());
}
