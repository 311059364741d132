use crate::compiler_frontend::analysis::lifetime_check::LifetimeCheckOptions;
use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorLocation};
use crate::compiler_frontend::source_location::CharPosition;
use crate::{return_config_error, return_file_error};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "lifetime_check.toml";
pub const IR_MODULE_FILE_EXTENSION: &str = "json";

// Used when neither the config file nor the CLI names a history level
pub const DEFAULT_HISTORY: &[&str] = &["all"];

/// Everything one `check` run needs: which module to read and how to report on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub module_path: PathBuf,

    // The config file the options came from, if one was found
    pub config_path: Option<PathBuf>,
    pub options: LifetimeCheckOptions,
}

/// Option lists given on the command line. These win over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    pub remarks: Option<Vec<String>>,
    pub history: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    lifetime_check: LifetimeCheckSection,
}

/// The `[lifetime_check]` table of `lifetime_check.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LifetimeCheckSection {
    pub remarks: Option<Vec<String>>,
    pub history: Option<Vec<String>>,
}

impl Config {
    /// Resolves the options for checking `module_path`.
    ///
    /// An explicit `config_path` must exist. Without one, a `lifetime_check.toml`
    /// next to the module is used when present.
    pub fn load(
        module_path: &Path,
        config_path: Option<&Path>,
        overrides: &OptionOverrides,
    ) -> Result<Self, CompilerError> {
        let config_path = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file(module_path),
        };

        let section = match &config_path {
            Some(path) => read_config_file(path)?,
            None => LifetimeCheckSection::default(),
        };

        let options = resolve_options(&section, overrides)
            .map_err(|error| match &config_path {
                Some(path) if error.location.scope.as_os_str().is_empty() => {
                    error.with_file_path(path.to_owned())
                }
                _ => error,
            })?;

        Ok(Config {
            module_path: module_path.to_path_buf(),
            config_path,
            options,
        })
    }
}

/// The config file sitting next to the module, if there is one.
pub fn find_config_file(module_path: &Path) -> Option<PathBuf> {
    let dir = match module_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let candidate = dir.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

pub fn read_config_file(path: &Path) -> Result<LifetimeCheckSection, CompilerError> {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            return_file_error!(path, format!("Could not read config file: {e}"), {
                PrimarySuggestion => "Check the --config path or remove the flag to use the defaults",
            })
        }
    };

    match toml::from_str::<ConfigFile>(&source) {
        Ok(file) => Ok(file.lifetime_check),
        Err(e) => {
            let position = e
                .span()
                .map(|span| char_position_of(&source, span.start))
                .unwrap_or_default();

            return_config_error!(
                format!("Malformed {CONFIG_FILE_NAME}: {}", e.message()),
                ErrorLocation {
                    scope: path.to_path_buf(),
                    start_pos: position,
                    end_pos: position,
                },
                {
                    ConfigOption => "lifetime_check",
                    PrimarySuggestion => "Expected a [lifetime_check] table with 'remarks' and 'history' string lists",
                }
            )
        }
    }
}

/// CLI lists replace the file's lists axis by axis.
fn resolve_options(
    section: &LifetimeCheckSection,
    overrides: &OptionOverrides,
) -> Result<LifetimeCheckOptions, CompilerError> {
    let remarks = overrides
        .remarks
        .as_ref()
        .or(section.remarks.as_ref())
        .cloned()
        .unwrap_or_default();

    let history = overrides
        .history
        .as_ref()
        .or(section.history.as_ref())
        .cloned()
        .unwrap_or_else(|| DEFAULT_HISTORY.iter().map(|s| s.to_string()).collect());

    LifetimeCheckOptions::from_option_lists(&remarks, &history)
}

/// 1-based line and column of a byte offset, for pointing at toml errors.
fn char_position_of(source: &str, byte_offset: usize) -> CharPosition {
    let before = &source[..byte_offset.min(source.len())];
    let line_number = before.matches('\n').count() as i32 + 1;
    let line_start = before.rfind('\n').map_or(0, |index| index + 1);
    let char_column = before[line_start..].chars().count() as i32 + 1;

    CharPosition::new(line_number, char_column)
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
