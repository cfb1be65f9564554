use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_sub_cent_amounts_are_rejected() {
    let scratch = common::Scratch::new();
    let (config, roster, operations) = scratch.import_files(
        "op,member,year,month,amount,note\n\
         record,M-01,2024,1,4999.999,\n\
         record,M-01,2024,1,4999.99,\n",
    );

    let mut cmd = Command::new(cargo_bin!("contrib-ledger"));
    cmd.arg("--config")
        .arg(&config)
        .args(["--as-of", "2024-01-31", "import"])
        .arg(&operations)
        .arg("--members")
        .arg(&roster);

    // 4999.99 is accepted but falls short of the 5000 due
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("more than 2 decimal places"))
        .stdout(predicate::str::contains("M-01,Asha Mwita,4999.99,1,partially_paid"));
}

#[test]
fn test_distribution_across_year_boundary() {
    let scratch = common::Scratch::new();
    let config = scratch.write("ledger.toml", common::CONFIG);
    let roster = scratch.write(
        "members.csv",
        "id,name,phone,enrolled,active\n\
         M-01,Asha Mwita,,2023-11-30,true\n",
    );
    let operations = scratch.write(
        "operations.csv",
        "op,member,year,month,amount,note\n\
         distribute,M-01,,,20000,\n",
    );

    let mut cmd = Command::new(cargo_bin!("contrib-ledger"));
    cmd.arg("--config")
        .arg(&config)
        .args(["--as-of", "2024-02-01", "import"])
        .arg(&operations)
        .arg("--members")
        .arg(&roster);

    // 2023-11, 2023-12, 2024-01 and 2024-02 are all covered exactly
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("M-01,Asha Mwita,20000,0,up_to_date"));
}
