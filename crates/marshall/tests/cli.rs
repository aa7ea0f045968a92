//! Integration tests for the marshall binary.

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn marshall(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_marshall"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run marshall")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "marshall failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_new_get_and_output_name() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    stdout(&marshall(
        &[
            "new",
            "reference_date=2013041600",
            "field=T2M",
            "ensemble_member=5",
            "forecast_time=6",
            "-o",
            "query.xml",
        ],
        dir,
    ));
    assert!(dir.join("query.xml").exists());

    let values = stdout(&marshall(
        &["get", "query.xml", "field", "ensemble_member", "database"],
        dir,
    ));
    assert_eq!(values, "T2M\n5\n\n");

    let name = stdout(&marshall(&["output-name", "query.xml"], dir));
    assert_eq!(name, "2013041600/m005/T2M/lfff00060000\n");
}

#[test]
fn test_set_respects_overwrite() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    stdout(&marshall(&["new", "field=T2M", "-o", "query.xml"], dir));
    let original = fs::read_to_string(dir.join("query.xml")).unwrap();

    stdout(&marshall(&["set", "query.xml", "field=PS", "-o", "query.xml"], dir));
    assert_eq!(fs::read_to_string(dir.join("query.xml")).unwrap(), original);

    stdout(&marshall(
        &["set", "query.xml", "field=PS", "-o", "query.xml", "--overwrite"],
        dir,
    ));
    let values = stdout(&marshall(&["get", "query.xml", "field"], dir));
    assert_eq!(values, "PS\n");
}

#[test]
fn test_set_without_output_prints_document() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    stdout(&marshall(&["new", "-o", "query.xml"], dir));

    let xml = stdout(&marshall(&["set", "query.xml", "database=roma"], dir));
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
    assert!(xml.contains(r#"<read database="roma"/>"#), "{}", xml);
}

#[test]
fn test_unknown_identifier_fails() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    let output = marshall(&["new", "station=10410"], dir);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SkyQuery has no identifier 'station'"), "{}", stderr);
}

#[test]
fn test_custom_schema() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    fs::write(
        dir.join("stations.toml"),
        r#"
name = "StationRequest"
root = "request"

[tags]
station = ["root", "station"]

[attributes]
station_id = ["station", "id"]
"#,
    )
    .unwrap();

    let xml = stdout(&marshall(
        &["--schema", "stations.toml", "new", "station_id=10410"],
        dir,
    ));
    assert!(xml.contains(r#"<station id="10410"/>"#), "{}", xml);
}

#[test]
fn test_show_lists_identifiers() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    stdout(&marshall(&["new", "field=T2M", "-o", "query.xml"], dir));

    let listing = stdout(&marshall(&["show", "query.xml"], dir));
    let field = listing
        .lines()
        .find(|line| line.starts_with("field "))
        .unwrap();
    assert!(field.ends_with("T2M"), "{}", field);
    assert!(listing.lines().any(|line| line.starts_with("database ")));
}

#[cfg(unix)]
#[test]
fn test_query_pipes_document_to_program() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    stdout(&marshall(&["new", "field=T2M", "-o", "query.xml"], dir));

    stdout(&marshall(
        &[
            "query",
            "query.xml",
            "--program",
            "sh",
            "--",
            "-c",
            "cat > received.xml",
        ],
        dir,
    ));
    assert_eq!(
        fs::read_to_string(dir.join("received.xml")).unwrap(),
        fs::read_to_string(dir.join("query.xml")).unwrap()
    );

    let output = marshall(&["query", "query.xml", "--program", "false"], dir);
    assert!(!output.status.success());
}
