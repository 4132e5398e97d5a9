use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

fn stuffstore_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_stuffstore"))
}

fn run(data_dir: &Path, args: &[&str]) -> Output {
    let output = Command::new(stuffstore_bin())
        .arg("--data-dir")
        .arg(data_dir)
        .arg("-q")
        .args(args)
        .env_remove("STUFFSTORE_LOG")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stuffstore {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn edit_then_search() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let dir = tmp.path();

    run(
        dir,
        &["edit", "12", "--category", "Resistor", "--value", "10k Ohm"],
    );
    run(dir, &["edit", "13", "--category", "Capacitor (C)", "--value", "0.1uF"]);

    let shown = json(&run(dir, &["show", "12", "--json"]));
    assert_eq!(shown["value"], "10k");
    assert_eq!(shown["equiv_set"], 12);

    let found = json(&run(dir, &["search", "10k ohm", "--json"]));
    assert_eq!(found["count"], 1);
    assert_eq!(found["results"][0]["id"], 12);

    let found = json(&run(dir, &["search", "0.1uF", "--json"]));
    assert_eq!(found["results"][0]["id"], 13);
    Ok(())
}

#[test]
fn no_cleanup_keeps_raw_value() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let dir = tmp.path();

    run(
        dir,
        &[
            "edit",
            "1",
            "--category",
            "Resistor",
            "--value",
            "10k Ohm",
            "--no-cleanup",
        ],
    );
    let shown = json(&run(dir, &["show", "1", "--json"]));
    assert_eq!(shown["value"], "10k Ohm");
    Ok(())
}

#[test]
fn join_and_related() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let dir = tmp.path();

    for (id, value) in [("3", "LM358"), ("7", "LM2904")] {
        run(dir, &["edit", id, "--category", "Op-Amp", "--value", value]);
    }
    run(dir, &["join", "7", "3"]);

    let related = json(&run(dir, &["related", "7", "--json"]));
    let ids: Vec<u64> = related
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 7]);

    run(dir, &["leave", "7"]);
    let listed = json(&run(dir, &["list", "--json"]));
    assert_eq!(listed[1]["equiv_set"], 7);
    Ok(())
}

#[test]
fn show_unknown_component_fails() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let output = Command::new(stuffstore_bin())
        .arg("--data-dir")
        .arg(tmp.path())
        .args(["show", "99"])
        .output()?;
    assert!(!output.status.success());
    Ok(())
}

#[test]
fn status_reports_requested_range() -> Result<(), Box<dyn std::error::Error>>
{
    let tmp = tempfile::tempdir()?;
    let dir = tmp.path();

    run(dir, &["edit", "5", "--category", "Diode"]);
    let items = json(&run(
        dir,
        &["status", "--offset", "4", "--limit", "2", "--json"],
    ));
    assert_eq!(items[0]["status"], "missing");
    assert_eq!(items[1]["number"], 5);
    assert_eq!(items[1]["status"], "poor");
    Ok(())
}

#[test]
fn unchanged_edit_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let dir = tmp.path();

    run(dir, &["edit", "7", "--category", "Diode"]);
    let output = Command::new(stuffstore_bin())
        .arg("--data-dir")
        .arg(dir)
        .args(["edit", "7", "--category", "Diode"])
        .output()?;
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Rejected"), "stderr: {stderr}");
    assert!(stderr.contains("No change"), "stderr: {stderr}");
    assert!(!stderr.contains("Config"), "stderr: {stderr}");
    Ok(())
}
