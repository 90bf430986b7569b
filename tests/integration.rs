//! Integration tests for `dns-overrides`.
//!
//! Each test works on a tempdir copy of the override file and reloads with
//! a harmless shell command.

use dns_overrides::{ErrorKind, OverrideConfig, OverrideService, Record, RecordInput};
use std::collections::HashSet;
use std::path::PathBuf;

struct Fixture {
    _dir: tempfile::TempDir,
    records: PathBuf,
    service: OverrideService,
}

fn fixture(content: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let records = dir.path().join("custom.list");
    std::fs::write(&records, content).unwrap();
    let config = OverrideConfig::new(&records, dir.path().join("custom.list.old"))
        .with_reload_command("echo reloaded");
    let service = OverrideService::new(&config).unwrap();
    Fixture {
        _dir: dir,
        records,
        service,
    }
}

fn lines(f: &Fixture) -> Vec<String> {
    std::fs::read_to_string(&f.records)
        .unwrap()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// End-to-end
// ---------------------------------------------------------------------------

#[test]
fn add_then_delete_existing() {
    let f = fixture("192.168.1.1 existing.home.lab\n");

    let out = f
        .service
        .add(&RecordInput::new("192.168.1.2", "new.home.lab"))
        .unwrap();
    assert_eq!(out.stdout, "reloaded");
    let after_add = lines(&f);
    assert_eq!(after_add.len(), 2);
    assert!(after_add.contains(&"192.168.1.2 new.home.lab".to_string()));

    f.service
        .delete(&RecordInput::new("192.168.1.1", "existing.home.lab"))
        .unwrap();
    assert_eq!(lines(&f), vec!["192.168.1.2 new.home.lab"]);
}

#[test]
fn list_is_stable_without_mutation() {
    let f = fixture("10.0.0.3 c.lan\n10.0.0.1 a.lan\n10.0.0.2 b.lan\n");
    let first = f.service.list().unwrap();
    let second = f.service.list().unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0], Record::new("10.0.0.3", "c.lan"));
}

#[test]
fn add_delete_round_trip_restores_set() {
    let f = fixture("10.0.0.1 a.lan\n10.0.0.2 b.lan\n");
    let before: HashSet<Record> = f.service.list().unwrap().into_iter().collect();

    let input = RecordInput::new("192.168.1.50", "x.lan");
    f.service.add(&input).unwrap();
    f.service.delete(&input).unwrap();

    let after: HashSet<Record> = f.service.list().unwrap().into_iter().collect();
    assert_eq!(before, after);
}

#[test]
fn duplicate_add_conflicts_and_keeps_one_line() {
    let f = fixture("");
    let input = RecordInput::new("fe80::1", "printer.lan");

    f.service.add(&input).unwrap();
    let err = f.service.add(&input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let matching = lines(&f)
        .iter()
        .filter(|l| l.as_str() == "fe80::1 printer.lan")
        .count();
    assert_eq!(matching, 1);
}

#[test]
fn delete_never_added_is_not_found() {
    let f = fixture("10.0.0.1 a.lan\n");
    let before = std::fs::read(&f.records).unwrap();

    let err = f
        .service
        .delete(&RecordInput::new("10.0.0.9", "ghost.lan"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(std::fs::read(&f.records).unwrap(), before);
}

#[test]
fn reset_restores_snapshot_before_latest_add() {
    let f = fixture("10.0.0.1 a.lan\n");
    f.service.add(&RecordInput::new("10.0.0.2", "b.lan")).unwrap();
    let count_before_last_add = f.service.list().unwrap().len();

    f.service.add(&RecordInput::new("10.0.0.3", "c.lan")).unwrap();
    f.service.reset().unwrap();

    let records = f.service.list().unwrap();
    assert_eq!(records.len(), count_before_last_add);
    assert!(!records.contains(&Record::new("10.0.0.3", "c.lan")));
    assert!(records.contains(&Record::new("10.0.0.2", "b.lan")));
}

#[test]
fn delete_does_not_refresh_backup() {
    let f = fixture("10.0.0.1 a.lan\n");
    f.service.add(&RecordInput::new("10.0.0.2", "b.lan")).unwrap();
    f.service.delete(&RecordInput::new("10.0.0.1", "a.lan")).unwrap();

    // The slot still holds the pre-add snapshot.
    f.service.reset().unwrap();
    assert_eq!(f.service.list().unwrap(), vec![Record::new("10.0.0.1", "a.lan")]);
}

// ---------------------------------------------------------------------------
// Auth and health
// ---------------------------------------------------------------------------

#[test]
fn api_key_gates_requests() {
    let dir = tempfile::tempdir().unwrap();
    let records = dir.path().join("custom.list");
    std::fs::write(&records, "").unwrap();
    let config = OverrideConfig::new(&records, dir.path().join("custom.list.old"))
        .with_reload_command("true")
        .with_api_key("s3cret");
    let service = OverrideService::new(&config).unwrap();

    assert_eq!(
        service.authorize(None, None).unwrap_err().kind(),
        ErrorKind::Unauthorized
    );
    assert_eq!(
        service.authorize(Some("nope"), None).unwrap_err().kind(),
        ErrorKind::Unauthorized
    );
    service.authorize(Some("s3cret"), None).unwrap();
    service.authorize(None, Some("s3cret")).unwrap();

    // Health is reachable regardless of credentials.
    assert!(service.health().is_ok());
}

#[test]
fn health_degrades_when_file_disappears() {
    let f = fixture("10.0.0.1 a.lan\n");
    assert_eq!(f.service.health().records.result, Ok(1));

    std::fs::remove_file(&f.records).unwrap();
    let report = f.service.health();
    assert!(!report.is_ok());
    assert!(report.records.result.is_err());
}
