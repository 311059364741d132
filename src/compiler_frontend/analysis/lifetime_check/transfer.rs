//! Per-operation transfer functions: declare, store and load.
//!
//! These mutate the current pmap in place. Everything else in a block is inert
//! to the lifetime model and never reaches this module.

use crate::compiler_frontend::analysis::lifetime_check::FunctionChecker;
use crate::compiler_frontend::analysis::lifetime_check::state::PointerSet;
use crate::compiler_frontend::analysis::lifetime_check::values::StoredValue;
use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::ir::ir_nodes::{InitStyle, IrOperation, ValueId};
use crate::compiler_frontend::source_location::TextLocation;
use crate::{lifetime_log, return_compiler_error};

impl FunctionChecker<'_> {
    pub(super) fn transfer_declare(
        &mut self,
        address: ValueId,
        is_pointer: bool,
        init: InitStyle,
        operation: &IrOperation,
    ) -> Result<(), CompilerError> {
        if self.pmap.contains(address) {
            return_compiler_error!(
                format!(
                    "Lifetime checker saw storage '{}' declared twice in function '{}'",
                    self.diagnostics.location_name(&self.definitions, address),
                    self.function.name
                ),
                self.diagnostics.error_location(operation.location),
                {
                    CompilationStage => "Lifetime Checking",
                    OperationKind => operation.kind.mnemonic(),
                }
            );
        }

        if !is_pointer {
            // A plain local is its own pointee identity.
            self.pmap.insert(address, PointerSet::local(address));
            self.register_in_current_scope(address);
            return Ok(());
        }

        if !matches!(init, InitStyle::Uninitialized | InitStyle::CInit) {
            return_compiler_error!(
                format!(
                    "Lifetime checker does not support '{}' initialization of pointer '{}'",
                    init.as_str(),
                    self.diagnostics.location_name(&self.definitions, address)
                ),
                self.diagnostics.error_location(operation.location),
                {
                    CompilationStage => "Lifetime Checking",
                    InitStyle => init.as_str(),
                    PrimarySuggestion => "Lower pointer declarations with no initializer or a C-style initializer",
                }
            );
        }

        self.pmap.insert(address, PointerSet::invalid());
        self.history.record_uninitialized(address, operation.location);
        self.pointers.insert(address);
        self.register_in_current_scope(address);

        Ok(())
    }

    pub(super) fn transfer_store(
        &mut self,
        address: ValueId,
        value: ValueId,
        location: TextLocation,
    ) {
        // Stores into plain locals and untracked storage are outside the model.
        if !self.pointers.contains(&address) || !self.pmap.contains(address) {
            return;
        }

        match self.definitions.classify_stored_value(value) {
            StoredValue::NullConstant => {
                self.pmap.insert(address, PointerSet::null());
                self.history.record_null(address, location);
            }

            StoredValue::AddressOf(pointee) => {
                self.pmap.insert(address, PointerSet::local(pointee));
            }

            // Unknown provenance leaves the pset as it was.
            StoredValue::Other => {}
        }
    }

    pub(super) fn transfer_load(
        &mut self,
        address: ValueId,
        is_deref: bool,
        operation: &IrOperation,
    ) -> Result<(), CompilerError> {
        if !is_deref || !self.pointers.contains(&address) {
            return Ok(());
        }

        let Some(pset) = self.pmap.get(address).cloned() else {
            return Ok(());
        };

        let location = operation.location;
        let mut remark_emitted = false;

        if self.options.remark_pset_always() {
            self.emit_pset_remark(&pset, location);
            remark_emitted = true;
        }

        if !pset.has_invalid() && !pset.has_null() {
            return Ok(());
        }

        let Some(pointer_name) = self.definitions.declared_name(address) else {
            return_compiler_error!(
                format!(
                    "Lifetime checker found no declaration name for dereferenced pointer '{}' in function '{}'",
                    address, self.function.name
                ),
                self.diagnostics.error_location(location),
                {
                    CompilationStage => "Lifetime Checking",
                    OperationKind => operation.kind.mnemonic(),
                }
            );
        };

        let mut notes = Vec::new();

        if pset.has_invalid() && self.options.history_invalid() {
            let Some(record) = self.history.invalidation(address) else {
                return_compiler_error!(
                    format!(
                        "Lifetime checker has no invalidation history for pointer '{}'",
                        pointer_name
                    ),
                    self.diagnostics.error_location(location),
                    {
                        CompilationStage => "Lifetime Checking",
                        OperationKind => operation.kind.mnemonic(),
                    }
                );
            };

            let note = match record.pointee {
                Some(pointee) => {
                    let pointee_name = self.diagnostics.location_name(&self.definitions, pointee);
                    self.diagnostics
                        .pointee_out_of_scope_note(&pointee_name, record.location)
                }
                None => self.diagnostics.uninitialized_note(record.location),
            };
            notes.push(note);
        }

        if pset.has_null() && self.options.history_null() {
            let Some(null_location) = self.history.null_assignment(address) else {
                return_compiler_error!(
                    format!(
                        "Lifetime checker has no null assignment history for pointer '{}'",
                        pointer_name
                    ),
                    self.diagnostics.error_location(location),
                    {
                        CompilationStage => "Lifetime Checking",
                        OperationKind => operation.kind.mnemonic(),
                    }
                );
            };

            notes.push(self.diagnostics.null_assignment_note(null_location));
        }

        lifetime_log!(format!(
            "[Lifetime] invalid dereference of '{}' at line {}",
            pointer_name, location.start_pos.line_number
        ));

        let warning = self.diagnostics.invalid_use(pointer_name, location, notes);
        self.emit(warning);

        if self.options.remark_pset_invalid() && !remark_emitted {
            self.emit_pset_remark(&pset, location);
        }

        Ok(())
    }

    fn emit_pset_remark(&mut self, pset: &PointerSet, location: TextLocation) {
        let rendered = self.diagnostics.render_pset(&self.definitions, pset);
        let remark = self.diagnostics.pset_remark(&rendered, location);
        self.emit(remark);
    }

    fn register_in_current_scope(&mut self, address: ValueId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.register(address);
        }
    }
}
