// core/tests/dump_loading.rs
//
// Integration tests for snapshot loading.
//
// Tests cover:
// - CSV snapshots with a timestamp line
// - Pipe-table snapshots with two header lines
// - Malformed lines are skipped
// - Reverse alias index

use std::path::PathBuf;

use gwv_core::Dump;

fn temp_file(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gwv-dump-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn csv_snapshot() {
    let path = temp_file(
        "dump.csv",
        "1700000000.5\nu4e00,u3013,1:0:0:10:100:190:100\nbroken line\nu4e00-j,u4e00,99:0:0:0:0:200:200:u4e00\n",
    );
    let dump = Dump::open(&path).unwrap();
    assert_eq!(dump.len(), 2);
    assert_eq!(dump.timestamp(), 1700000000.5);
    assert_eq!(dump.get("u4e00-j").unwrap().related, "u4e00");
    assert!(dump.get("u4e00-j").unwrap().is_alias());
}

#[test]
fn csv_snapshot_needs_a_timestamp() {
    let path = temp_file("bad.csv", "u4e00,u3013,1:0:0:10:100:190:100\n");
    assert!(Dump::open(&path).is_err());
}

#[test]
fn table_snapshot() {
    let path = temp_file(
        "dump_newest_only.txt",
        " name | related | data\n------+---------+-----\n u4e00 | u3013 | 1:0:0:10:100:190:100\n u4e01 | u3013 \n u4e00-t | u4e00 | 99:0:0:0:0:200:200:u4e00\n(2 rows)\n",
    );
    let dump = Dump::open(&path).unwrap();
    assert_eq!(dump.sorted_names(), vec!["u4e00", "u4e00-t"]);
    assert!(dump.timestamp() > 0.0);
    assert_eq!(dump.get("u4e00").unwrap().gdata, "1:0:0:10:100:190:100");
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Dump::open("/nonexistent/gwv/dump.csv").unwrap_err();
    assert!(matches!(err, gwv_core::Error::Io { .. }));
}

#[test]
fn alias_index_groups_aliases_under_their_entity() {
    let dump = Dump::from_entries(
        [
            ("u4e00", "u3013", "1:0:0:10:100:190:100"),
            ("u4e00-t", "u3013", "99:0:0:0:0:200:200:u4e00"),
            ("u4e00-j", "u3013", "99:0:0:0:0:200:200:u4e00@2"),
            ("u4e01", "u3013", "1:0:0:10:100:190:100"),
        ],
        0.0,
    );
    assert_eq!(dump.alias_of("u4e00"), vec!["u4e00", "u4e00-j", "u4e00-t"]);
    assert_eq!(dump.alias_of("u4e01"), vec!["u4e01"]);
    assert_eq!(dump.entity_name_of("u4e00-j"), "u4e00");
    assert_eq!(dump.entity_name_of("nowhere"), "nowhere");
}
