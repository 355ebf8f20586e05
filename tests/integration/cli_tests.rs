use clap::Parser;
use dupescan::cli::Cli;
use dupescan::error::ExitCode;
use std::fs;
use tempfile::tempdir;

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let _lock = crate::env_lock();
    dupescan::run_app(Cli::try_parse_from(args).unwrap())
}

#[test]
fn test_text_output_name_mode() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("one")).unwrap();
    fs::create_dir_all(dir.path().join("two")).unwrap();
    fs::write(dir.path().join("one/notes.md"), b"a").unwrap();
    fs::write(dir.path().join("two/notes.md"), b"b").unwrap();

    let code = run(&[
        "dupescan",
        "-q",
        "scan",
        dir.path().to_str().unwrap(),
        "--check",
        "files",
        "--show-fingerprints",
    ])
    .unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_json_and_csv_outputs() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.bin"), b"same").unwrap();
    fs::write(dir.path().join("b.bin"), b"same").unwrap();

    for format in ["json", "csv"] {
        let code = run(&[
            "dupescan",
            "-q",
            "scan",
            dir.path().to_str().unwrap(),
            "--content",
            "--check",
            "files",
            "--digest",
            "sha256",
            "--output",
            format,
        ])
        .unwrap();
        assert_eq!(code, ExitCode::Success, "{format}");
    }
}

#[test]
fn test_content_without_files_is_error() {
    let dir = tempdir().unwrap();

    let err = run(&[
        "dupescan",
        "-q",
        "scan",
        dir.path().to_str().unwrap(),
        "--check",
        "dirs",
        "--content",
    ])
    .unwrap_err();
    assert!(format!("{err:#}").contains("Content comparison requires checking files"));
}

#[test]
fn test_empty_extension_is_error() {
    let dir = tempdir().unwrap();

    let result = run(&[
        "dupescan",
        "-q",
        "scan",
        dir.path().to_str().unwrap(),
        "--exclude",
        " ",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_missing_root_is_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let err = run(&["dupescan", "-q", "scan", missing.to_str().unwrap()]).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to scan"));
}

#[test]
fn test_missing_config_file_is_error() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("absent.toml");

    let result = run(&[
        "dupescan",
        "-q",
        "--config",
        config.to_str().unwrap(),
        "scan",
        dir.path().to_str().unwrap(),
    ]);
    assert!(result.is_err());
}

#[test]
fn test_config_file_supplies_exclusions() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir_all(root.join("a")).unwrap();
    fs::create_dir_all(root.join("b")).unwrap();
    fs::write(root.join("a/x.log"), b"1").unwrap();
    fs::write(root.join("b/x.log"), b"2").unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "exclude_extensions = [\"log\"]\n").unwrap();

    let with_config = run(&[
        "dupescan",
        "-q",
        "--config",
        config.to_str().unwrap(),
        "scan",
        root.to_str().unwrap(),
        "--check",
        "files",
    ])
    .unwrap();
    assert_eq!(with_config, ExitCode::NoDuplicates);
}
