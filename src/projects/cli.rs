//! Command-line entrypoints for the lifetime checker.
//!
//! This module parses CLI commands and dispatches them into the check and IR dump workflows.

use crate::compiler_frontend::analysis::lifetime_check::LifetimeCheckReport;
use crate::compiler_frontend::compiler_errors::CompilerMessages;
use crate::compiler_frontend::display_messages::print_compiler_messages;
use crate::compiler_frontend::ir::ir_display::display_module;
use crate::compiler_frontend::{CompilerFrontend, read_ir_module};
use crate::projects::settings::{Config, OptionOverrides};
use crate::timer_log;
use saying::say;
use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    // Runs the lifetime checker over a JSON serialized IR module
    Check {
        path: String,
        options: CheckOptions,
    },

    Dump(String), // Prints the readable IR of a module

    Help,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct CheckOptions {
    config_path: Option<String>,
    overrides: OptionOverrides,
    json: bool,
}

/// Warnings never fail the run. Only unreadable input or a broken IR precondition does.
pub fn start_cli() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help(false);
        return ExitCode::SUCCESS;
    }

    let command = match get_command(&args[1..]) {
        Ok(command) => command,
        Err(e) => {
            say!(Red e);
            print_help(true);
            return ExitCode::FAILURE;
        }
    };

    match command {
        Command::Help => {
            print_help(false);
            ExitCode::SUCCESS
        }

        Command::Dump(path) => match read_ir_module(Path::new(&path)) {
            Ok(module) => {
                say!(display_module(&module));
                ExitCode::SUCCESS
            }
            Err(error) => {
                print_compiler_messages(CompilerMessages::from_error(error));
                ExitCode::FAILURE
            }
        },

        Command::Check { path, options } => match run_check(&path, &options) {
            Ok(report) => {
                print_report(report, options.json);
                ExitCode::SUCCESS
            }
            Err(messages) => {
                print_compiler_messages(messages);
                ExitCode::FAILURE
            }
        },
    }
}

fn run_check(
    path: &str,
    options: &CheckOptions,
) -> Result<LifetimeCheckReport, CompilerMessages> {
    let time = Instant::now();

    let config = Config::load(
        Path::new(path),
        options.config_path.as_deref().map(Path::new),
        &options.overrides,
    )
    .map_err(CompilerMessages::from_error)?;

    let frontend = CompilerFrontend::new(&config);
    let module = frontend.load_module().map_err(CompilerMessages::from_error)?;
    timer_log!(time, "IR module loaded in: ");

    let report = frontend.check_lifetimes(&module)?;
    timer_log!(time, "Lifetime checking finished in: ");

    Ok(report)
}

fn print_report(report: LifetimeCheckReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(&report.diagnostics) {
            Ok(output) => {
                say!(output);
            }
            Err(e) => {
                say!(Red "Could not serialize diagnostics: ", e);
            }
        }
        return;
    }

    let stats = report.stats;
    print_compiler_messages(CompilerMessages {
        errors: Vec::new(),
        diagnostics: report.diagnostics,
    });

    say!(
        Green "\nChecked ",
        Green stats.functions_analyzed,
        Green " function(s): ",
        Yellow stats.warnings,
        Yellow " warning(s), ",
        Blue stats.remarks,
        Blue " remark(s)"
    );
}

fn get_command(args: &[String]) -> Result<Command, String> {
    let command = args.first().map(String::as_str);

    match command {
        Some("help") | Some("--help") => Ok(Command::Help),

        Some("check") => parse_check_command(args),

        Some("dump") => match args.get(1) {
            Some(path) if !path.starts_with("--") => Ok(Command::Dump(path.to_owned())),
            _ => Err(String::from("Dump command needs the path of an IR module")),
        },

        Some(other) => Err(format!("Invalid command: '{other}'")),

        None => Err(String::from("No command given")),
    }
}

fn parse_check_command(args: &[String]) -> Result<Command, String> {
    let mut path = String::new();
    let mut options = CheckOptions::default();
    let mut index = 1usize;

    while let Some(arg) = args.get(index) {
        match arg.as_str() {
            "--config" => {
                let value = flag_value(args, index, "--config")?;
                options.config_path = Some(value.to_owned());
                index += 2;
            }
            "--remarks" => {
                let value = flag_value(args, index, "--remarks")?;
                options.overrides.remarks = Some(split_option_list(value));
                index += 2;
            }
            "--history" => {
                let value = flag_value(args, index, "--history")?;
                options.overrides.history = Some(split_option_list(value));
                index += 2;
            }
            "--json" => {
                options.json = true;
                index += 1;
            }
            _ if arg.starts_with("--") => {
                return Err(format!(
                    "Unknown check flag: '{arg}'. Supported check flags are --config, --remarks, --history, --json."
                ));
            }
            _ => {
                if path.is_empty() {
                    path = arg.to_owned();
                    index += 1;
                } else {
                    return Err(String::from(
                        "Check command accepts exactly one module path.",
                    ));
                }
            }
        }
    }

    if path.is_empty() {
        return Err(String::from("Check command needs the path of an IR module"));
    }

    Ok(Command::Check { path, options })
}

fn flag_value<'a>(args: &'a [String], index: usize, flag: &str) -> Result<&'a str, String> {
    match args.get(index + 1) {
        Some(value) if !value.starts_with("--") => Ok(value),
        _ => Err(format!("Missing value for {flag}")),
    }
}

// "pset-invalid,pset-always" -> ["pset-invalid", "pset-always"]. An empty value is an empty list.
fn split_option_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(String::from)
        .collect()
}

fn print_help(commands_only: bool) {
    if !commands_only {
        say!(Bright Black "------------------------------------");
        say!(Green Bold "Lifetime checker for region-structured IR");
        say!("Usage: ", Bold "<command>", Italic "<args>");
    }
    say!(Green Bold "\nCommands:");
    say!("  check <module.json>   - Checks every function of a JSON IR module");
    say!("  dump <module.json>    - Prints the readable IR of a module");
    say!("  help                  - Shows this message");

    say!(Green Bold "\nCheck options:");
    say!("  --config <file>       (default: lifetime_check.toml next to the module)");
    say!("  --remarks <list>      none, pset-invalid, pset-always, all (default: none)");
    say!("  --history <list>      none, invalid, null, all (default: all)");
    say!("  --json                Prints diagnostics as a JSON array");
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
