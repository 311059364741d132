use crate::compiler_frontend::analysis::lifetime_check::{DiagnosticKind, LifetimeDiagnostic};
use crate::compiler_frontend::compiler_errors::{
    CompilerError, CompilerMessages, ErrorLocation, ErrorType,
};
use saying::say;
use std::path::{Path, PathBuf};
use std::{env, fs};

fn normalize_display_path(path: &Path) -> PathBuf {
    let path_string = path.to_string_lossy();
    if let Some(stripped) = path_string.strip_prefix(r"\\?\") {
        return PathBuf::from(stripped);
    }

    path.to_path_buf()
}

fn relative_display_path(scope: &Path) -> String {
    let normalized_scope = normalize_display_path(scope);

    match env::current_dir() {
        Ok(dir) => {
            let normalized_dir = normalize_display_path(&dir);
            normalized_scope
                .strip_prefix(&normalized_dir)
                .unwrap_or(&normalized_scope)
                .to_string_lossy()
                .to_string()
        }
        Err(err) => {
            say!(Red "Could not resolve the current directory for source snippets: ", err);
            normalized_scope.to_string_lossy().to_string()
        }
    }
}

/// The source line a location points at. Empty when the file can't be read.
fn source_line(location: &ErrorLocation) -> String {
    let line_index = (location.start_pos.line_number - 1).max(0) as usize;

    match fs::read_to_string(normalize_display_path(&location.scope)) {
        Ok(file) => file.lines().nth(line_index).unwrap_or_default().to_string(),
        Err(_) => String::new(),
    }
}

fn print_underline(location: &ErrorLocation, line: &str) {
    if line.is_empty() {
        return;
    }

    println!("\n{line}");

    // spaces before the relevant part of the line
    print!(
        "{}",
        " ".repeat((location.start_pos.char_column - 1).max(0) as usize)
    );

    let line_length = line.chars().count() as i32;
    let end_column = location.end_pos.char_column.min(line_length);
    let length_of_underline = (end_column - location.start_pos.char_column + 1).max(1) as usize;
    say!(Red { "^".repeat(length_of_underline) });
}

pub fn print_compiler_messages(messages: CompilerMessages) {
    for diagnostic in &messages.diagnostics {
        print_lifetime_diagnostic(diagnostic);
    }

    for err in messages.errors {
        print_formatted_error(err);
    }
}

pub fn print_lifetime_diagnostic(diagnostic: &LifetimeDiagnostic) {
    let relative_dir = relative_display_path(&diagnostic.location.scope);
    let line_number = diagnostic.location.start_pos.line_number;

    match diagnostic.kind {
        DiagnosticKind::Warning => {
            say!(Yellow Bold "\nWARNING: ", diagnostic.message);
        }
        DiagnosticKind::Remark => {
            say!(Blue "\nremark: ", diagnostic.message);
        }
    }

    if !relative_dir.is_empty() {
        say!(Dark Magenta relative_dir, " line ", Bright {line_number});
    }

    let line = source_line(&diagnostic.location);
    print_underline(&diagnostic.location, &line);

    for note in &diagnostic.notes {
        say!(Bright Black {
            format!(
                "  note: {} (line {})",
                note.message, note.location.start_pos.line_number
            )
        });
    }
}

pub fn print_formatted_error(e: CompilerError) {
    let relative_dir = relative_display_path(&e.location.scope);
    let line_number = e.location.start_pos.line_number;

    match e.error_type {
        ErrorType::File => {
            say!(Yellow "🏚 Can't find/read file or directory: ", relative_dir);
            say!(e.msg);
            return;
        }

        ErrorType::Compiler => {
            if !relative_dir.is_empty() {
                say!("\nヽ༼☉ ‿ ⚆༽ﾉ  🔥🔥🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥🔥🔥  ╰(° _ o╰) ");
            }
            say!(Yellow "LIFETIME CHECKER BUG - ");
            say!(Dark Yellow "the IR broke an analysis precondition (not your code's fault)");
            say!(Dark Magenta "Line ", Bright {line_number});
        }

        ErrorType::Config => {
            if !relative_dir.is_empty() {
                say!("\n (-_-)  🔥🔥🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥🔥🔥  <(^~^)/ ");
            }
            say!(Yellow "CONFIG FILE ISSUE- ");
            say!(Dark Yellow "Malformed lifetime check configuration");
        }
    }

    say!(Red e.msg);

    for (key, value) in &e.metadata {
        say!(Bright Black { format!("  {key:?}: {value}") });
    }

    let line = source_line(&e.location);
    print_underline(&e.location, &line);
}
