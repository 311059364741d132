//! Tests for lifetime check config file loading and option resolution.

use super::{CONFIG_FILE_NAME, Config, OptionOverrides, find_config_file, read_config_file};
use crate::compiler_frontend::analysis::lifetime_check::{
    HistoryOptions, LifetimeCheckOptions, RemarkOptions,
};
use crate::compiler_frontend::compiler_errors::{ErrorMetaDataKey, ErrorType};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("should write test file");
    path
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn missing_config_file_uses_the_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let module = write_file(&dir, "module.json", "{}");

    let config = Config::load(&module, None, &OptionOverrides::default()).expect("defaults");

    assert_eq!(config.config_path, None);
    assert_eq!(config.options, LifetimeCheckOptions::default());
    assert_eq!(config.module_path, module);
}

#[test]
fn config_next_to_the_module_is_found() {
    let dir = TempDir::new().expect("temp dir");
    let module = write_file(&dir, "module.json", "{}");
    let config_file = write_file(
        &dir,
        CONFIG_FILE_NAME,
        "[lifetime_check]\nremarks = [\"pset-invalid\"]\nhistory = [\"null\"]\n",
    );

    assert_eq!(find_config_file(&module), Some(config_file.clone()));

    let config = Config::load(&module, None, &OptionOverrides::default()).expect("config");
    assert_eq!(config.config_path, Some(config_file));
    assert_eq!(
        config.options,
        LifetimeCheckOptions::new(RemarkOptions::PSET_INVALID, HistoryOptions::NULL)
    );
}

#[test]
fn omitted_axes_keep_their_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let config_file = write_file(
        &dir,
        "only_remarks.toml",
        "[lifetime_check]\nremarks = [\"all\"]\n",
    );

    let config = Config::load(
        Path::new("module.json"),
        Some(&config_file),
        &OptionOverrides::default(),
    )
    .expect("config");

    assert_eq!(
        config.options,
        LifetimeCheckOptions::new(RemarkOptions::ALL, HistoryOptions::ALL)
    );
}

#[test]
fn cli_overrides_replace_the_file_per_axis() {
    let dir = TempDir::new().expect("temp dir");
    let config_file = write_file(
        &dir,
        CONFIG_FILE_NAME,
        "[lifetime_check]\nremarks = [\"pset-always\"]\nhistory = [\"invalid\"]\n",
    );

    let overrides = OptionOverrides {
        remarks: None,
        history: Some(Vec::new()),
    };
    let config = Config::load(Path::new("module.json"), Some(&config_file), &overrides)
        .expect("config");

    assert_eq!(
        config.options,
        LifetimeCheckOptions::new(RemarkOptions::PSET_ALWAYS, HistoryOptions::NONE)
    );
}

#[test]
fn explicit_config_path_must_exist() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("nope.toml");

    let error = Config::load(
        Path::new("module.json"),
        Some(&missing),
        &OptionOverrides::default(),
    )
    .expect_err("missing config file");

    assert_eq!(error.error_type, ErrorType::File);
    assert_eq!(error.location.scope, missing);
}

#[test]
fn malformed_toml_points_at_the_bad_line() {
    let dir = TempDir::new().expect("temp dir");
    let config_file = write_file(
        &dir,
        CONFIG_FILE_NAME,
        "[lifetime_check]\nremarks = [\"pset-invalid\"]\nhistory = \"all\"\n",
    );

    let error = read_config_file(&config_file).expect_err("history must be a list");

    assert_eq!(error.error_type, ErrorType::Config);
    assert_eq!(error.location.scope, config_file);
    assert_eq!(error.location.start_pos.line_number, 3);
    assert_eq!(
        error.metadata.get(&ErrorMetaDataKey::ConfigOption),
        Some(&"lifetime_check")
    );
}

#[test]
fn unknown_config_keys_are_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let config_file = write_file(
        &dir,
        CONFIG_FILE_NAME,
        "[lifetime_check]\nremark = [\"all\"]\n",
    );

    let error = read_config_file(&config_file).expect_err("typo in key");
    assert_eq!(error.error_type, ErrorType::Config);
}

#[test]
fn unknown_keywords_in_the_file_report_the_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_file = write_file(
        &dir,
        CONFIG_FILE_NAME,
        "[lifetime_check]\nhistory = [\"everything\"]\n",
    );

    let error = Config::load(
        Path::new("module.json"),
        Some(&config_file),
        &OptionOverrides::default(),
    )
    .expect_err("bad keyword");

    assert_eq!(error.error_type, ErrorType::Config);
    assert_eq!(error.location.scope, config_file);
    assert!(error.msg.contains("everything"));
}

#[test]
fn unknown_keywords_on_the_command_line_are_rejected() {
    let overrides = OptionOverrides {
        remarks: Some(strings(&["pset-sometimes"])),
        history: None,
    };

    let error = Config::load(Path::new("module.json"), None, &overrides).expect_err("bad keyword");
    assert_eq!(
        error.metadata.get(&ErrorMetaDataKey::ConfigOption),
        Some(&"remarks")
    );
}
