#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn cli() -> Command {
    Command::cargo_bin("escala-cli").unwrap()
}

const VOLUNTEERS: &str = "\
id,first_name,last_name,active,gender,weekend_only,handles_missal,handles_thurible,partner_id
a1,Ana,Souza,true,M,false,true,true,a2
a2,Bruno,Lima,sim,M,não,true,true,a1
a3,Caio,Reis,true,M,false,true,true,
a4,Davi,Reis,true,M,false,true,true,
a5,Edu,Melo,true,M,false,true,true,
a6,Fabio,Melo,true,M,false,true,true,
a7,Gil,Rosa,true,M,false,true,true,
a8,Hugo,Rosa,true,M,false,true,true,
a9,Igor,Paz,true,M,false,true,true,
a10,Joel,Paz,true,M,false,true,true,
";

#[test]
fn import_generate_list_and_check() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("escala.json");
    let csv = dir.path().join("volunteers.csv");
    fs::write(&csv, VOLUNTEERS).unwrap();
    let data = data.to_str().unwrap();

    cli()
        .args(["--data", data, "import-volunteers", "--csv"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("10 volunteer(s) imported"))
        .stdout(predicate::str::contains("1 pair(s) on file"));

    cli()
        .args(["--data", data, "pair", "--person", "Caio Reis", "--with", "Nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown volunteer: Nobody"));

    cli()
        .args(["--data", data, "pair", "--person", "a3", "--with", "Davi Reis"])
        .assert()
        .success();

    cli()
        .args(["--data", data, "generate", "--month", "2024-03", "--include-past"])
        .args(["--seed", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("39 generated"));

    cli()
        .args(["--data", data, "generate", "--month", "2024-03", "--include-past"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to generate"));

    let out_csv = dir.path().join("march.csv");
    cli()
        .args(["--data", data, "list", "--month", "2024-03", "--out-csv"])
        .arg(&out_csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-19 19:00 SJO"));
    let exported = fs::read_to_string(&out_csv).unwrap();
    assert!(exported.starts_with("date,time,venue,observation,seats"));
    assert!(exported.contains("Missa Votiva de São José"));

    cli()
        .args(["--data", data, "check", "--month", "2024-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no conflicts"));

    cli()
        .args(["--data", data, "clear-month", "--month", "2024-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("39 assignment(s) removed"));
}

#[test]
fn slots_preview_honours_skip_ranges() {
    cli()
        .args(["--data", "unused.json", "slots", "--month", "2024-03", "--include-past"])
        .args(["--skip", "1-14,20-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-15 19:00 NSA x2"))
        .stdout(predicate::str::contains("2024-03-08").not());
}

#[test]
fn malformed_month_is_rejected() {
    cli()
        .args(["--data", "unused.json", "slots", "--month", "March"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid month"));
}

#[test]
fn empty_roster_is_rejected() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("escala.json");
    cli()
        .arg("--data")
        .arg(&data)
        .args(["generate", "--month", "2024-03", "--include-past"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty roster"));
}
