use clap::Parser;
use dupescan::cli::{Cli, Commands};
use dupescan::config::Config;
use dupescan::duplicates::KeyScope;
use dupescan::scanner::DigestAlgorithm;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
digest = "blake3"
key_scope = "shared"
io_threads = 8
exclude_extensions = ["log", "TMP"]
max_depth = 3
strict = true
log_dir = "/var/log/dupescan"
progress = false
"#;
    fs::write(&config_path, toml_content).unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.digest, DigestAlgorithm::Blake3);
    assert_eq!(config.key_scope, KeyScope::Shared);
    assert_eq!(config.io_threads, 8);
    assert_eq!(config.exclude_extensions, vec!["log", "TMP"]);
    assert_eq!(config.max_depth, Some(3));
    assert!(config.strict);
    assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/dupescan")));
    assert!(!config.progress);
}

#[test]
fn test_config_partial_toml_keeps_defaults() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = 2\n").unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.io_threads, 2);
    assert_eq!(config.digest, DigestAlgorithm::Md5);
    assert!(config.progress);
}

#[test]
fn test_config_load_from_env() {
    let _lock = crate::env_lock();
    std::env::set_var("DUPESCAN_DIGEST", "sha256");
    std::env::set_var("DUPESCAN_IO_THREADS", "16");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("DUPESCAN_"))
        .extract()
        .unwrap();

    std::env::remove_var("DUPESCAN_DIGEST");
    std::env::remove_var("DUPESCAN_IO_THREADS");

    assert_eq!(config.digest, DigestAlgorithm::Sha256);
    assert_eq!(config.io_threads, 16);
}

#[test]
fn test_config_env_overrides_file() {
    let _lock = crate::env_lock();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "max_depth = 4\nstrict = false\n").unwrap();

    std::env::set_var("DUPESCAN_MAX_DEPTH", "9");
    let config = Config::load(Some(&config_path));
    std::env::remove_var("DUPESCAN_MAX_DEPTH");

    let config = config.unwrap();
    assert_eq!(config.max_depth, Some(9));
    assert!(!config.strict);
}

#[test]
fn test_config_invalid_toml_is_error() {
    let _lock = crate::env_lock();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "invalid = toml").unwrap();

    assert!(Config::load(Some(&config_path)).is_err());
}

#[test]
fn test_config_wrong_type_is_error() {
    let _lock = crate::env_lock();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "digest = \"crc32\"\n").unwrap();

    assert!(Config::load(Some(&config_path)).is_err());
}

#[test]
fn test_config_missing_explicit_file_is_error() {
    let _lock = crate::env_lock();
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let err = Config::load(Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_cli_flags_override_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "digest = \"blake3\"\nkey_scope = \"shared\"\nexclude_extensions = [\"log\"]\n",
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();
    let cli = Cli::try_parse_from([
        "dupescan",
        "scan",
        "--digest",
        "md5",
        "--exclude",
        "bak",
    ])
    .unwrap();
    let Commands::Scan(args) = cli.command;

    let options = config.scan_options(&args);
    assert_eq!(options.exclude_extensions, vec![".bak"]);
    assert_eq!(options.key_scope, KeyScope::Shared);
    assert_eq!(config.digest_for(&args), DigestAlgorithm::Md5);
}
