//! Lifetime checking over region-structured IR.
//!
//! A flow-sensitive, intraprocedural pass that tracks, for every local pointer,
//! the set of things it may currently point to (its pset). Sets are threaded
//! through the region tree in one recursive walk:
//!  - Declarations, stores and loads update the current pmap in place
//!  - Scope exits invalidate pointers into storage that just died (KILL)
//!  - Branches, switch cases and loop takens run on copies of the pmap and are
//!    joined back per key
//!  - Loops are approximated by at most two iterations, never iterated to a fixpoint
//!
//! Findings are report diagnostics. A `CompilerError` only means the IR broke one
//! of the pass preconditions.

mod diagnostics;
mod options;
mod scope;
mod state;
mod transfer;
mod types;
mod values;

pub use options::{HistoryOptions, LifetimeCheckOptions, RemarkOptions};
pub use state::{PointerMap, PointerSet, ValidityState};
pub use types::{
    DiagnosticKind, DiagnosticNote, FunctionLifetimeSummary, LifetimeAnalysis,
    LifetimeCheckReport, LifetimeCheckStats, LifetimeDiagnostic, LocationSnapshot,
};

use crate::compiler_frontend::analysis::lifetime_check::diagnostics::LifetimeDiagnostics;
use crate::compiler_frontend::analysis::lifetime_check::scope::{LexicalScope, kill_scope};
use crate::compiler_frontend::analysis::lifetime_check::state::PointerHistory;
use crate::compiler_frontend::analysis::lifetime_check::values::ValueDefinitions;
use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::ir::ir_nodes::{
    IrBlock, IrFunction, IrModule, IrOperation, IrOperationKind, IrRegion, LoopKind, ValueId,
    YieldKind,
};
use crate::compiler_frontend::source_location::TextLocation;
use crate::{ir_log, lifetime_log, return_compiler_error};
use rustc_hash::FxHashSet;

/// Runs the lifetime checker over every function of `module`, in order.
pub fn check_lifetimes(
    module: &IrModule,
    options: LifetimeCheckOptions,
) -> Result<LifetimeCheckReport, CompilerError> {
    LifetimeChecker::new(module, options).run()
}

struct LifetimeChecker<'a> {
    module: &'a IrModule,
    options: LifetimeCheckOptions,
}

impl<'a> LifetimeChecker<'a> {
    fn new(module: &'a IrModule, options: LifetimeCheckOptions) -> Self {
        Self { module, options }
    }

    fn run(self) -> Result<LifetimeCheckReport, CompilerError> {
        let mut report = LifetimeCheckReport::default();

        for function in &self.module.functions {
            ir_log!(crate::compiler_frontend::ir::ir_display::display_function(
                function
            ));

            // Nothing carries over between functions: every one gets a fresh checker.
            let checker = FunctionChecker::new(self.module, function, self.options);
            let (summary, diagnostics) = checker.check()?;

            report.stats.merge(&summary.stats);
            report.diagnostics.extend(diagnostics);
            report
                .analysis
                .function_summaries
                .insert(function.id, summary);
        }

        lifetime_log!(format!(
            "[Lifetime] Completed lifetime checking: functions={} operations={} scopes={} kills={} joins={} loops={} warnings={} remarks={}",
            report.stats.functions_analyzed,
            report.stats.operations_analyzed,
            report.stats.scopes_opened,
            report.stats.pointers_invalidated,
            report.stats.joins,
            report.stats.loops_analyzed,
            report.stats.warnings,
            report.stats.remarks
        ));

        Ok(report)
    }
}

struct FunctionChecker<'a> {
    function: &'a IrFunction,
    options: LifetimeCheckOptions,
    definitions: ValueDefinitions<'a>,
    diagnostics: LifetimeDiagnostics<'a>,

    // === Flow state ===
    pmap: PointerMap,
    scopes: Vec<LexicalScope>,
    pointers: FxHashSet<ValueId>,
    history: PointerHistory,

    // === Output ===
    emitted: Vec<LifetimeDiagnostic>,
    stats: LifetimeCheckStats,
}

impl<'a> FunctionChecker<'a> {
    fn new(
        module: &'a IrModule,
        function: &'a IrFunction,
        options: LifetimeCheckOptions,
    ) -> Self {
        Self {
            function,
            options,
            definitions: ValueDefinitions::collect(function),
            diagnostics: LifetimeDiagnostics::new(&module.source_path),
            pmap: PointerMap::new(),
            scopes: Vec::new(),
            pointers: FxHashSet::default(),
            history: PointerHistory::default(),
            emitted: Vec::new(),
            stats: LifetimeCheckStats::default(),
        }
    }

    fn check(
        mut self,
    ) -> Result<(FunctionLifetimeSummary, Vec<LifetimeDiagnostic>), CompilerError> {
        let function = self.function;
        self.stats.functions_analyzed = 1;

        // The function frame is never killed: analysis ends with the body.
        self.scopes.push(LexicalScope::function_level(
            function.body.location.end_location(),
        ));
        self.check_region(&function.body)?;
        self.scopes.pop();

        let summary = self.summarize();

        lifetime_log!(format!(
            "[Lifetime] '{}': tracked={} warnings={} remarks={}",
            summary.name,
            summary.exit_pmap.len(),
            summary.stats.warnings,
            summary.stats.remarks
        ));

        Ok((summary, self.emitted))
    }

    fn summarize(&self) -> FunctionLifetimeSummary {
        let mut exit_pmap = self
            .pmap
            .iter()
            .map(|(location, pset)| LocationSnapshot {
                location,
                name: self.diagnostics.location_name(&self.definitions, location),
                pset: pset.clone(),
                rendered: self.diagnostics.render_pset(&self.definitions, pset),
            })
            .collect::<Vec<_>>();

        exit_pmap.sort_by(|a, b| a.name.cmp(&b.name).then(a.location.cmp(&b.location)));

        FunctionLifetimeSummary {
            name: self.function.name.clone(),
            exit_pmap,
            stats: self.stats,
        }
    }

    // ------------------------
    // Context swapping
    // ------------------------

    /// Runs `check` with `pmap` as the current pmap and hands back the pmap it
    /// produced. The previous pmap is restored on every exit path.
    fn with_pmap(
        &mut self,
        pmap: PointerMap,
        check: impl FnOnce(&mut Self) -> Result<(), CompilerError>,
    ) -> Result<PointerMap, CompilerError> {
        let saved = std::mem::replace(&mut self.pmap, pmap);
        let result = check(self);
        let produced = std::mem::replace(&mut self.pmap, saved);

        result.map(|()| produced)
    }

    /// Runs `check` inside a new lexical frame ending at `region_location`.
    /// The frame is popped and killed exactly once, before any error is propagated.
    fn with_scope(
        &mut self,
        region_location: TextLocation,
        check: impl FnOnce(&mut Self) -> Result<(), CompilerError>,
    ) -> Result<(), CompilerError> {
        let parent_depth = self.scopes.last().map_or(0, |scope| scope.depth);
        self.scopes.push(LexicalScope::nested(
            parent_depth,
            region_location.end_location(),
        ));
        self.stats.scopes_opened += 1;

        let result = check(self);

        if let Some(scope) = self.scopes.pop() {
            let invalidated = kill_scope(&scope, &mut self.pmap, &mut self.history);
            self.stats.pointers_invalidated += invalidated;

            lifetime_log!(format!(
                "[Lifetime] closed scope depth={} declared={} invalidated={}",
                scope.depth,
                scope.declared.len(),
                invalidated
            ));
        }

        result
    }

    fn join(&mut self, paths: &[PointerMap]) {
        self.pmap.join_paths(paths);
        self.stats.joins += 1;

        lifetime_log!(format!(
            "[Lifetime] joined {} paths in '{}'",
            paths.len(),
            self.function.name
        ));
    }

    fn emit(&mut self, diagnostic: LifetimeDiagnostic) {
        match diagnostic.kind {
            DiagnosticKind::Warning => self.stats.warnings += 1,
            DiagnosticKind::Remark => self.stats.remarks += 1,
        }

        self.emitted.push(diagnostic);
    }

    // ------------------------
    // Traversal
    // ------------------------

    fn check_region(&mut self, region: &'a IrRegion) -> Result<(), CompilerError> {
        for block in &region.blocks {
            self.check_block(block)?;
        }

        Ok(())
    }

    fn check_region_with_scope(&mut self, region: &'a IrRegion) -> Result<(), CompilerError> {
        self.with_scope(region.location, |checker| checker.check_region(region))
    }

    fn check_block(&mut self, block: &'a IrBlock) -> Result<(), CompilerError> {
        for operation in &block.operations {
            self.check_operation(operation)?;
        }

        Ok(())
    }

    fn check_operation(&mut self, operation: &'a IrOperation) -> Result<(), CompilerError> {
        self.stats.operations_analyzed += 1;

        match &operation.kind {
            IrOperationKind::Declare {
                address,
                is_pointer,
                init,
                ..
            } => self.transfer_declare(*address, *is_pointer, *init, operation),

            IrOperationKind::Store { address, value } => {
                self.transfer_store(*address, *value, operation.location);
                Ok(())
            }

            IrOperationKind::Load {
                address, is_deref, ..
            } => self.transfer_load(*address, *is_deref, operation),

            IrOperationKind::Scope { body } => self.check_region_with_scope(body),

            IrOperationKind::If {
                then_region,
                else_region,
            } => self.check_if(then_region, else_region.as_ref()),

            IrOperationKind::Switch { cases } => self.check_switch(cases, operation),

            IrOperationKind::Loop {
                kind,
                condition,
                body,
                step,
            } => self.check_loop(*kind, condition, body, step.as_ref()),

            // Values and terminators the model does not follow.
            IrOperationKind::Constant { .. }
            | IrOperationKind::Cast { .. }
            | IrOperationKind::PtrStride { .. }
            | IrOperationKind::Yield { .. }
            | IrOperationKind::Return
            | IrOperationKind::Other { .. } => Ok(()),
        }
    }

    fn check_if(
        &mut self,
        then_region: &'a IrRegion,
        else_region: Option<&'a IrRegion>,
    ) -> Result<(), CompilerError> {
        let mut paths = Vec::with_capacity(2);

        let then_pmap = self.pmap.clone();
        paths.push(self.with_pmap(then_pmap, |checker| {
            checker.check_region_with_scope(then_region)
        })?);

        match else_region {
            Some(else_region) => {
                let else_pmap = self.pmap.clone();
                paths.push(self.with_pmap(else_pmap, |checker| {
                    checker.check_region_with_scope(else_region)
                })?);
            }

            // No else: the untaken path is the ambient pmap as is.
            None => paths.push(self.pmap.clone()),
        }

        self.join(&paths);
        Ok(())
    }

    fn check_switch(
        &mut self,
        cases: &'a [IrRegion],
        operation: &'a IrOperation,
    ) -> Result<(), CompilerError> {
        if cases.is_empty() {
            return Ok(());
        }

        for (index, case) in cases.iter().enumerate() {
            let well_formed = case.blocks.len() == 1 && !case.blocks[0].operations.is_empty();
            if !well_formed {
                return_compiler_error!(
                    format!(
                        "Lifetime checker expects switch case {} in function '{}' to hold exactly one non-empty block, found {} block(s)",
                        index,
                        self.function.name,
                        case.blocks.len()
                    ),
                    self.diagnostics.error_location(operation.location),
                    {
                        CompilationStage => "Lifetime Checking",
                        OperationKind => operation.kind.mnemonic(),
                    }
                );
            }
        }

        // Every case label starts one path. A case ending in fallthrough keeps
        // accumulating into the same path through the following cases.
        let mut paths = Vec::with_capacity(cases.len());
        for start in 0..cases.len() {
            let case_pmap = self.pmap.clone();
            let path = self.with_pmap(case_pmap, |checker| {
                for case in &cases[start..] {
                    checker.check_region(case)?;
                    if !ends_in_fallthrough(case) {
                        break;
                    }
                }
                Ok(())
            })?;

            paths.push(path);
        }

        self.join(&paths);
        Ok(())
    }

    /// Three paths: never taken, first taken, and subsequent taken.
    /// The subsequent path is only run when the first one changed something.
    fn check_loop(
        &mut self,
        kind: LoopKind,
        condition: &'a IrRegion,
        body: &'a IrRegion,
        step: Option<&'a IrRegion>,
    ) -> Result<(), CompilerError> {
        self.stats.loops_analyzed += 1;

        let never_taken = self.pmap.clone();
        let first_regions = iteration_regions(kind, condition, body, step, true);
        let first_taken = self.check_iteration(never_taken.clone(), &first_regions, body)?;

        let mut paths = vec![never_taken, first_taken];

        if paths[1] != paths[0] {
            // Step only runs once between the first and second iteration.
            let subsequent_regions = iteration_regions(kind, condition, body, step, false);
            let subsequent_entry = paths[1].clone();
            let subsequent_taken =
                self.check_iteration(subsequent_entry, &subsequent_regions, body)?;

            paths.push(subsequent_taken);
            self.stats.subsequent_iterations_run += 1;
        } else {
            self.stats.subsequent_iterations_skipped += 1;
            lifetime_log!(format!(
                "[Lifetime] skipped subsequent loop iteration in '{}'",
                self.function.name
            ));
        }

        self.join(&paths);
        Ok(())
    }

    /// One loop iteration is one scope, closing at the end of the body.
    fn check_iteration(
        &mut self,
        entry: PointerMap,
        regions: &[&'a IrRegion],
        body: &'a IrRegion,
    ) -> Result<PointerMap, CompilerError> {
        self.with_pmap(entry, |checker| {
            checker.with_scope(body.location, |checker| {
                for region in regions {
                    checker.check_region(region)?;
                }
                Ok(())
            })
        })
    }
}

fn iteration_regions<'a>(
    kind: LoopKind,
    condition: &'a IrRegion,
    body: &'a IrRegion,
    step: Option<&'a IrRegion>,
    include_step: bool,
) -> Vec<&'a IrRegion> {
    match kind {
        LoopKind::For => {
            let mut regions = vec![condition, body];
            if include_step {
                regions.extend(step);
            }
            regions
        }
        LoopKind::While => vec![condition, body],
        LoopKind::DoWhile => vec![body, condition],
    }
}

fn ends_in_fallthrough(case: &IrRegion) -> bool {
    let last_operation = case
        .blocks
        .last()
        .and_then(|block| block.operations.last());

    matches!(
        last_operation,
        Some(IrOperation {
            kind: IrOperationKind::Yield {
                kind: YieldKind::Fallthrough
            },
            ..
        })
    )
}

#[cfg(test)]
mod tests;
