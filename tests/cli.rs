use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const RPLN_OPEN: &str = "Report generated 07/30/2021\n\
    ORD_NUM,ORD_DATE\n\
    A1,07/26/2021\n\
    A2,07/01/2021\n";

fn kpi(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kpi-relay").unwrap();
    cmd.env("HOME", home).env("RUST_LOG", "warn");
    cmd
}

#[test]
fn routes_lists_every_registered_report() {
    let home = tempfile::tempdir().unwrap();
    kpi(home.path())
        .arg("routes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Routes (18)"))
        .stdout(predicate::str::contains("06_RPLN_OPEN"))
        .stdout(predicate::str::contains("With Orders!A1:Q1"));
}

#[test]
fn transform_writes_each_slot_as_csv() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let file = work.path().join("06_RPLN_OPEN.csv");
    std::fs::write(&file, RPLN_OPEN).unwrap();
    let out = work.path().join("out");

    kpi(home.path())
        .args(["transform", file.to_str().unwrap(), "--today", "2021-07-30", "--out-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("open_order_aging"));

    let written = std::fs::read_to_string(out.join("06_RPLN_OPEN.detail.csv")).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(
        lines[0],
        "ORD_NUM,ORD_DATE,Business_Days_Aging,Aging_Category,Week_Number"
    );
    assert_eq!(lines[1], "A1,07/26/2021,4,<5,07/23/2021");
    assert_eq!(lines[2], "A2,07/01/2021,21,>=20,07/23/2021");
}

#[test]
fn transform_rejects_unrouted_file_without_override() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let file = work.path().join("mystery.csv");
    std::fs::write(&file, "meta\nA\n1\n").unwrap();

    kpi(home.path())
        .args(["transform", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No route registered"));

    kpi(home.path())
        .args(["transform", file.to_str().unwrap(), "--as", "pass_through", "--today", "2021-07-30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pass_through"));
}

#[test]
fn run_publishes_to_csv_sink_and_skips_unknown_files() {
    let home = tempfile::tempdir().unwrap();
    let inbox = home.path().join("inbox");
    let sheets = home.path().join("sheets");

    kpi(home.path())
        .args(["init", "--sink", "csv", "--source-dir"])
        .arg(&inbox)
        .arg("--output-dir")
        .arg(&sheets)
        .assert()
        .success();

    std::fs::write(inbox.join("06_RPLN_OPEN.csv"), RPLN_OPEN).unwrap();
    std::fs::write(inbox.join("Weekly_Memo.csv"), "x\ny\n").unwrap();

    kpi(home.path())
        .args(["run", "--today", "2021-07-30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 published, 1 skipped, 0 failed"));

    let appended = std::fs::read_to_string(sheets.join("rpln_open").join("Sheet1.csv")).unwrap();
    assert_eq!(appended.lines().count(), 2);

    // a second weekly run appends below the first
    kpi(home.path())
        .args(["run", "--today", "2021-08-06"])
        .assert()
        .success();
    let appended = std::fs::read_to_string(sheets.join("rpln_open").join("Sheet1.csv")).unwrap();
    assert_eq!(appended.lines().count(), 4);
    assert!(appended.contains("07/30/2021"));
}

#[test]
fn dry_run_writes_nothing() {
    let home = tempfile::tempdir().unwrap();
    let inbox = home.path().join("inbox");
    std::fs::create_dir_all(&inbox).unwrap();
    std::fs::write(inbox.join("06_RPLN_OPEN.csv"), RPLN_OPEN).unwrap();
    let sheets = home.path().join("sheets");

    kpi(home.path())
        .args(["init", "--output-dir"])
        .arg(&sheets)
        .arg("--source-dir")
        .arg(&inbox)
        .assert()
        .success();

    kpi(home.path())
        .args(["run", "--dry-run", "--today", "2021-07-30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"))
        .stdout(predicate::str::contains("rpln_open / Sheet1 (2 rows)"))
        .stdout(predicate::str::contains("07/26/2021"));
    assert!(!sheets.join("rpln_open").exists());
}

#[test]
fn bad_today_is_reported() {
    let home = tempfile::tempdir().unwrap();
    kpi(home.path())
        .args(["run", "--today", "next friday", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}
