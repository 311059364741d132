use crate::compiler_frontend::analysis::lifetime_check::state::PointerSet;
use crate::compiler_frontend::compiler_errors::ErrorLocation;
use crate::compiler_frontend::ir::ir_nodes::{FunctionId, ValueId};
use rustc_hash::FxHashMap;
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct LifetimeCheckReport {
    /// Every finding of the run, function by function in traversal order.
    pub diagnostics: Vec<LifetimeDiagnostic>,
    pub analysis: LifetimeAnalysis,
    pub stats: LifetimeCheckStats,
}

impl LifetimeCheckReport {
    pub fn warnings(&self) -> impl Iterator<Item = &LifetimeDiagnostic> + '_ {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.kind == DiagnosticKind::Warning)
    }

    pub fn remarks(&self) -> impl Iterator<Item = &LifetimeDiagnostic> + '_ {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.kind == DiagnosticKind::Remark)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    Warning,
    Remark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifetimeDiagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub location: ErrorLocation,
    pub notes: Vec<DiagnosticNote>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticNote {
    pub message: String,
    pub location: ErrorLocation,
}

#[derive(Debug, Clone, Default)]
pub struct LifetimeAnalysis {
    pub function_summaries: FxHashMap<FunctionId, FunctionLifetimeSummary>,
}

impl LifetimeAnalysis {
    pub fn summary(&self, function: FunctionId) -> Option<&FunctionLifetimeSummary> {
        self.function_summaries.get(&function)
    }
}

/// What is left of one function after the traversal.
#[derive(Debug, Clone, Default)]
pub struct FunctionLifetimeSummary {
    pub name: String,

    /// Function-level pmap at the end of the body, sorted by declared name.
    pub exit_pmap: Vec<LocationSnapshot>,
    pub stats: LifetimeCheckStats,
}

impl FunctionLifetimeSummary {
    pub fn location(&self, name: &str) -> Option<&LocationSnapshot> {
        self.exit_pmap.iter().find(|snapshot| snapshot.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationSnapshot {
    pub location: ValueId,
    pub name: String,
    pub pset: PointerSet,

    /// `{ invalid, x }`, members in lattice order.
    pub rendered: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifetimeCheckStats {
    pub functions_analyzed: usize,
    pub operations_analyzed: usize,
    pub scopes_opened: usize,
    pub pointers_invalidated: usize,
    pub joins: usize,
    pub loops_analyzed: usize,
    pub subsequent_iterations_run: usize,
    pub subsequent_iterations_skipped: usize,
    pub warnings: usize,
    pub remarks: usize,
}

impl LifetimeCheckStats {
    pub(crate) fn merge(&mut self, other: &Self) {
        self.functions_analyzed += other.functions_analyzed;
        self.operations_analyzed += other.operations_analyzed;
        self.scopes_opened += other.scopes_opened;
        self.pointers_invalidated += other.pointers_invalidated;
        self.joins += other.joins;
        self.loops_analyzed += other.loops_analyzed;
        self.subsequent_iterations_run += other.subsequent_iterations_run;
        self.subsequent_iterations_skipped += other.subsequent_iterations_skipped;
        self.warnings += other.warnings;
        self.remarks += other.remarks;
    }
}
