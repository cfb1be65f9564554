use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let scratch = common::Scratch::new();
    let (config, roster, operations) =
        scratch.import_files("op,member,year,month,amount,note\nrecord,M-01,2024,1,5000,\n");

    let mut cmd = Command::new(cargo_bin!("contrib-ledger"));
    cmd.arg("--config")
        .arg(&config)
        .arg("--db-path")
        .arg(scratch.path("some_db"))
        .args(["--as-of", "2024-01-31", "import"])
        .arg(&operations)
        .arg("--members")
        .arg(&roster);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let scratch = common::Scratch::new();
    let config = scratch.write("ledger.toml", common::CONFIG);

    let mut cmd = Command::new(cargo_bin!("contrib-ledger"));
    cmd.arg("--config")
        .arg(&config)
        .arg("--db-path")
        .arg(scratch.path("test_db"))
        .arg("init");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING").not());
}
