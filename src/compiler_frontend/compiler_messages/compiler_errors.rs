use crate::compiler_frontend::analysis::lifetime_check::LifetimeDiagnostic;
use crate::compiler_frontend::source_location::CharPosition;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

// The final set of errors and lifetime diagnostics emitted for one module
#[derive(Debug, Default)]
pub struct CompilerMessages {
    pub errors: Vec<CompilerError>,
    pub diagnostics: Vec<LifetimeDiagnostic>,
}

impl CompilerMessages {
    pub fn from_error(error: CompilerError) -> Self {
        CompilerMessages {
            errors: vec![error],
            diagnostics: Vec::new(),
        }
    }
}

/// A resolved source span: the file plus start and end positions.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize)]
pub struct ErrorLocation {
    pub scope: PathBuf,
    pub start_pos: CharPosition,
    pub end_pos: CharPosition,
}

impl ErrorLocation {
    pub fn from_path(path: &Path) -> Self {
        ErrorLocation {
            scope: path.to_path_buf(),
            start_pos: CharPosition::default(),
            end_pos: CharPosition::default(),
        }
    }
}

#[derive(Debug, Eq, Hash, PartialEq)]
pub enum ErrorMetaDataKey {
    CompilationStage,

    // One-line fix or top-level idea
    PrimarySuggestion,

    // Lifetime checking context
    ConfigOption,  // The option list a bad keyword came from
    InitStyle,     // Declaration initializer style
    OperationKind, // IR operation that broke an analysis precondition
}

#[derive(Debug)]
pub struct CompilerError {
    pub msg: String,
    pub location: ErrorLocation,
    pub error_type: ErrorType,

    // This is for creating more structured and detailed error messages
    pub metadata: HashMap<ErrorMetaDataKey, &'static str>,
}

impl CompilerError {
    pub fn with_file_path(mut self, file_path: PathBuf) -> Self {
        self.location.scope = file_path;
        self
    }

    /// Create a file system error from a Path
    pub fn file_error(path: &Path, msg: impl Into<String>) -> Self {
        CompilerError {
            msg: msg.into(),
            location: ErrorLocation::from_path(path),
            error_type: ErrorType::File,
            metadata: HashMap::new(),
        }
    }

    /// Create a file system error from Path with metadata
    pub fn new_file_error(
        path: &Path,
        msg: impl Into<String>,
        metadata: HashMap<ErrorMetaDataKey, &'static str>,
    ) -> Self {
        CompilerError {
            msg: msg.into(),
            location: ErrorLocation::from_path(path),
            error_type: ErrorType::File,
            metadata,
        }
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", error_type_to_str(&self.error_type), self.msg)
    }
}

impl std::error::Error for CompilerError {}

// Adds more information to the CompilerError
// So it knows what stage produced it and how to display it
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ErrorType {
    File,
    Config,
    Compiler,
}

pub fn error_type_to_str(e_type: &ErrorType) -> &'static str {
    match e_type {
        ErrorType::Compiler => "Compiler Bug",
        ErrorType::Config => "Malformed Config",
        ErrorType::File => "File Error",
    }
}

/// Returns a new CompilerError for internal compiler bugs.
///
/// Compiler errors indicate a malformed input IR or a bug in the pass itself,
/// not a problem with the user's code.
#[macro_export]
macro_rules! return_compiler_error {
    ($msg:expr, $location:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $location,
            error_type: $crate::compiler_frontend::compiler_errors::ErrorType::Compiler,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler_frontend::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
}

/// Returns a new CompilerError for a malformed configuration.
///
/// Usage: `return_config_error!("Unknown remark option 'x'", location, { ConfigOption => "remarks" })`;
#[macro_export]
macro_rules! return_config_error {
    ($msg:expr, $location:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $location,
            error_type: $crate::compiler_frontend::compiler_errors::ErrorType::Config,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler_frontend::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
}

/// Returns a new CompilerError
///
/// Usage: `return_file_error!(path, "message", { metadata })`;
#[macro_export]
macro_rules! return_file_error {
    ($path:expr, $msg:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {{
        return Err($crate::compiler_frontend::compiler_errors::CompilerError::new_file_error(
            $path,
            $msg,
            {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler_frontend::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        ));
    }};
    ($path:expr, $msg:expr) => {{
        return Err($crate::compiler_frontend::compiler_errors::CompilerError::file_error(
            $path, $msg,
        ));
    }};
}
