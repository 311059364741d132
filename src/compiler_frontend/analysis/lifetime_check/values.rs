use crate::compiler_frontend::ir::ir_nodes::{
    CastKind, ConstantValue, IrFunction, IrOperationKind, IrRegion, ValueId,
};
use rustc_hash::FxHashMap;

/// What produced a value, as far as stored-value classification cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ValueDefinition<'f> {
    Declare { name: &'f str },
    Constant(ConstantValue),
    Cast { source: ValueId, kind: CastKind },
    PtrStride { base: ValueId },
    Load,
    Other,
}

/// How a stored value relates to the lifetime model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StoredValue {
    NullConstant,
    AddressOf(ValueId),
    Other,
}

/// Defining operation of every value in one function body.
/// Built in a single walk before the flow-sensitive traversal starts.
#[derive(Debug, Default)]
pub(super) struct ValueDefinitions<'f> {
    definitions: FxHashMap<ValueId, ValueDefinition<'f>>,
}

impl<'f> ValueDefinitions<'f> {
    pub(super) fn collect(function: &'f IrFunction) -> Self {
        let mut table = ValueDefinitions::default();
        table.collect_region(&function.body);
        table
    }

    fn collect_region(&mut self, region: &'f IrRegion) {
        for block in &region.blocks {
            for operation in &block.operations {
                match &operation.kind {
                    IrOperationKind::Declare { address, name, .. } => {
                        self.definitions
                            .insert(*address, ValueDefinition::Declare { name });
                    }

                    IrOperationKind::Constant { result, value } => {
                        self.definitions
                            .insert(*result, ValueDefinition::Constant(*value));
                    }

                    IrOperationKind::Cast {
                        result,
                        source,
                        kind,
                    } => {
                        self.definitions.insert(
                            *result,
                            ValueDefinition::Cast {
                                source: *source,
                                kind: *kind,
                            },
                        );
                    }

                    IrOperationKind::PtrStride { result, base, .. } => {
                        self.definitions
                            .insert(*result, ValueDefinition::PtrStride { base: *base });
                    }

                    IrOperationKind::Load { result, .. } => {
                        self.definitions.insert(*result, ValueDefinition::Load);
                    }

                    IrOperationKind::Other { results, .. } => {
                        for result in results {
                            self.definitions.insert(*result, ValueDefinition::Other);
                        }
                    }

                    IrOperationKind::Scope { body } => self.collect_region(body),

                    IrOperationKind::If {
                        then_region,
                        else_region,
                    } => {
                        self.collect_region(then_region);
                        if let Some(else_region) = else_region {
                            self.collect_region(else_region);
                        }
                    }

                    IrOperationKind::Switch { cases } => {
                        for case in cases {
                            self.collect_region(case);
                        }
                    }

                    IrOperationKind::Loop {
                        condition,
                        body,
                        step,
                        ..
                    } => {
                        self.collect_region(condition);
                        self.collect_region(body);
                        if let Some(step) = step {
                            self.collect_region(step);
                        }
                    }

                    IrOperationKind::Store { .. }
                    | IrOperationKind::Yield { .. }
                    | IrOperationKind::Return => {}
                }
            }
        }
    }

    pub(super) fn get(&self, value: ValueId) -> Option<ValueDefinition<'f>> {
        self.definitions.get(&value).copied()
    }

    /// Declared name of a storage location, if `value` is one.
    pub(super) fn declared_name(&self, value: ValueId) -> Option<&'f str> {
        match self.get(value)? {
            ValueDefinition::Declare { name, .. } => Some(name),
            _ => None,
        }
    }

    pub(super) fn is_declared_location(&self, value: ValueId) -> bool {
        matches!(self.get(value), Some(ValueDefinition::Declare { .. }))
    }

    /// Classifies the value of a store into a pointer.
    ///
    /// `&x` is the declared address itself. `&a[i]` is recognised only as a
    /// stride over an array-to-pointer decay of a declared array, and
    /// collapses to "points into `a`".
    pub(super) fn classify_stored_value(&self, value: ValueId) -> StoredValue {
        match self.get(value) {
            Some(ValueDefinition::Constant(ConstantValue::NullPtr)) => StoredValue::NullConstant,
            Some(ValueDefinition::Declare { .. }) => StoredValue::AddressOf(value),
            Some(ValueDefinition::PtrStride { base }) => match self.decayed_array(base) {
                Some(array) => StoredValue::AddressOf(array),
                None => StoredValue::Other,
            },
            _ => StoredValue::Other,
        }
    }

    fn decayed_array(&self, base: ValueId) -> Option<ValueId> {
        let ValueDefinition::Cast {
            source,
            kind: CastKind::ArrayToPointerDecay,
        } = self.get(base)?
        else {
            return None;
        };

        self.is_declared_location(source).then_some(source)
    }
}
