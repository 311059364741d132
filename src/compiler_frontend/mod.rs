pub mod analysis;
pub mod ir;
pub mod source_location;

pub mod compiler_messages {
    pub mod compiler_dev_logging;
    pub mod compiler_errors;
    pub mod display_messages;
}
pub use compiler_messages::compiler_errors;
pub use compiler_messages::display_messages;

use crate::compiler_frontend::analysis::lifetime_check::{
    LifetimeCheckReport, check_lifetimes as run_lifetime_checker,
};
use crate::compiler_frontend::compiler_errors::{CompilerError, CompilerMessages};
use crate::compiler_frontend::ir::ir_nodes::IrModule;
use crate::projects::settings::Config;
use crate::return_file_error;
use std::fs;
use std::path::Path;

pub struct CompilerFrontend<'a> {
    pub(crate) project_config: &'a Config,
}

impl<'a> CompilerFrontend<'a> {
    pub fn new(project_config: &'a Config) -> Self {
        Self { project_config }
    }

    /// -----------------------------
    /// IR LOADING
    /// -----------------------------
    /// Reads the serialized IR module the check runs over.
    /// A module without its own source path reports against the file it was read from.
    pub fn load_module(&self) -> Result<IrModule, CompilerError> {
        read_ir_module(&self.project_config.module_path)
    }

    // ------------------------------
    //  LIFETIME CHECKING
    // ------------------------------
    // Findings come back inside the report.
    // Only a broken analysis precondition fails the stage.
    pub fn check_lifetimes(
        &self,
        module: &IrModule,
    ) -> Result<LifetimeCheckReport, CompilerMessages> {
        match run_lifetime_checker(module, self.project_config.options) {
            Ok(report) => Ok(report),
            Err(error) => Err(CompilerMessages::from_error(error)),
        }
    }
}

pub fn read_ir_module(path: &Path) -> Result<IrModule, CompilerError> {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => return_file_error!(path, format!("Could not read IR module: {e}")),
    };

    let mut module: IrModule = match serde_json::from_str(&source) {
        Ok(module) => module,
        Err(e) => {
            return_file_error!(path, format!("Malformed IR module: {e}"), {
                PrimarySuggestion => "The module must be a JSON serialized IrModule",
            })
        }
    };

    if module.source_path.as_os_str().is_empty() {
        module.source_path = path.to_path_buf();
    }

    Ok(module)
}
