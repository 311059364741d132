use crate::compiler_frontend::analysis::lifetime_check::state::{
    PointerHistory, PointerMap, ValidityState,
};
use crate::compiler_frontend::ir::ir_nodes::ValueId;
use crate::compiler_frontend::source_location::TextLocation;

/// One lexical frame: the storage declared directly inside it.
#[derive(Debug, Clone)]
pub(super) struct LexicalScope {
    /// 0 for the function body.
    pub(super) depth: u32,

    /// Closing delimiter of the region. Killed pointees are reported here.
    pub(super) end_location: TextLocation,
    pub(super) declared: Vec<ValueId>,
}

impl LexicalScope {
    pub(super) fn function_level(end_location: TextLocation) -> Self {
        Self {
            depth: 0,
            end_location,
            declared: Vec::new(),
        }
    }

    pub(super) fn nested(parent_depth: u32, end_location: TextLocation) -> Self {
        Self {
            depth: parent_depth + 1,
            end_location,
            declared: Vec::new(),
        }
    }

    pub(super) fn is_function_level(&self) -> bool {
        self.depth == 0
    }

    /// A switch case reached both as its own path and as a fallthrough target
    /// declares the same location twice on different pmaps.
    pub(super) fn register(&mut self, location: ValueId) {
        if !self.declared.contains(&location) {
            self.declared.push(location);
        }
    }
}

/// Scope exit (KILL).
///
/// Every location declared in `scope` leaves the pmap, and any pointer that could
/// still point at one of them becomes invalid at the end of the scope.
/// Returns how many pointers were invalidated.
pub(super) fn kill_scope(
    scope: &LexicalScope,
    pmap: &mut PointerMap,
    history: &mut PointerHistory,
) -> usize {
    if scope.is_function_level() {
        return 0;
    }

    let mut invalidated = 0;

    for &local in &scope.declared {
        pmap.remove(local);

        let dead_pointee = ValidityState::LocalValue(local);
        for (pointer, pset) in pmap.iter_mut() {
            if pset.replace(dead_pointee, ValidityState::Invalid) {
                history.record_killed(pointer, scope.end_location, local);
                invalidated += 1;
            }
        }
    }

    invalidated
}
