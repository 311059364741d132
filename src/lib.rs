//! Flow-sensitive pointer lifetime checking for region-structured IR.
//!
//! Build an [`IrModule`] with the IR builder (or load one from JSON), then run
//! [`check_lifetimes`] to get a report of dangling and null pointer dereferences.

pub mod compiler_frontend;
pub mod projects;

pub use compiler_frontend::analysis::lifetime_check::{
    LifetimeCheckOptions, LifetimeCheckReport, check_lifetimes,
};
pub use compiler_frontend::compiler_errors::{CompilerError, ErrorType};
pub use compiler_frontend::ir::ir_builder::IrBuilder;
pub use compiler_frontend::ir::ir_nodes::IrModule;
