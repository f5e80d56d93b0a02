use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::process::Command;

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn cli_lays_out_csv_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("teammates.csv");
    fs::write(
        &input,
        "driver,teammate,races\nprost,senna,32\nsenna,berger,48\nberger,alesi,29\nprost,senna,0\n",
    )
    .expect("write csv");

    let exe = assert_cmd::cargo_bin!("paddock");
    let assert = Command::new(exe)
        .args(["--seed", "5", "--steps", "40", input.to_string_lossy().as_ref()])
        .assert()
        .success();

    let out = stdout_json(assert.get_output());
    assert_eq!(
        out["nodes"],
        serde_json::json!(["alesi", "berger", "prost", "senna"])
    );
    let positions = out["positions"].as_array().expect("positions array");
    assert_eq!(positions.len(), 4);
    for (p, node) in positions.iter().zip(out["nodes"].as_array().expect("nodes")) {
        assert_eq!(&p["node"], node);
        assert!(p["x"].as_f64().is_some_and(f64::is_finite));
        assert!(p["y"].as_f64().is_some_and(f64::is_finite));
    }
}

#[test]
fn cli_keeps_integer_and_text_ids_apart() {
    let exe = assert_cmd::cargo_bin!("paddock");
    let assert = assert_cmd::Command::new(exe)
        .args(["--format", "json", "--steps", "10", "--seed", "2"])
        .write_stdin(r#"[[1, "1"]]"#)
        .assert()
        .success();

    let out = stdout_json(assert.get_output());
    assert_eq!(out["nodes"], serde_json::json!([1, "1"]));
    let positions = out["positions"].as_array().expect("positions array");
    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0]["node"], serde_json::json!(1));
    assert_eq!(positions[1]["node"], serde_json::json!("1"));
}

#[test]
fn cli_seed_makes_output_reproducible() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("links.csv");
    fs::write(&input, "1,2\n2,3\n3,1\n3,4\n").expect("write csv");

    let exe = assert_cmd::cargo_bin!("paddock");
    let run = || {
        Command::new(&exe)
            .args([
                "--no-headers",
                "--seed",
                "9",
                "--steps",
                "25",
                input.to_string_lossy().as_ref(),
            ])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };
    assert_eq!(run(), run());
}

#[test]
fn cli_traces_json_from_stdin() {
    let exe = assert_cmd::cargo_bin!("paddock");
    let assert = assert_cmd::Command::new(exe)
        .args(["--format", "json", "--trace", "--steps", "6", "--seed", "1"])
        .write_stdin(r#"[["a", "b", 1.0], ["b", "c", 2.0]]"#)
        .assert()
        .success();

    let out = stdout_json(assert.get_output());
    assert_eq!(out["nodes"], serde_json::json!(["a", "b", "c"]));
    let steps = out["steps"].as_array().expect("steps array");
    assert_eq!(steps.len(), 6);
    for s in steps {
        assert_eq!(s["x"].as_array().map(Vec::len), Some(3));
        assert_eq!(s["y"].as_array().map(Vec::len), Some(3));
    }
}

#[test]
fn cli_reports_empty_graph() {
    let exe = assert_cmd::cargo_bin!("paddock");
    assert_cmd::Command::new(exe)
        .args(["--format", "csv"])
        .write_stdin("source,target\n")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn cli_rejects_unknown_flags_with_usage() {
    let exe = assert_cmd::cargo_bin!("paddock");
    Command::new(exe)
        .args(["--frobnicate"])
        .assert()
        .failure()
        .code(2);
}
