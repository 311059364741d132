use crate::compiler_frontend::analysis::lifetime_check::state::{PointerSet, ValidityState};
use crate::compiler_frontend::analysis::lifetime_check::types::{
    DiagnosticKind, DiagnosticNote, LifetimeDiagnostic,
};
use crate::compiler_frontend::analysis::lifetime_check::values::ValueDefinitions;
use crate::compiler_frontend::compiler_errors::ErrorLocation;
use crate::compiler_frontend::ir::ir_nodes::ValueId;
use crate::compiler_frontend::source_location::TextLocation;
use std::path::Path;

/// Builds the user-facing findings of one function.
pub(super) struct LifetimeDiagnostics<'a> {
    source_path: &'a Path,
}

impl<'a> LifetimeDiagnostics<'a> {
    pub(super) fn new(source_path: &'a Path) -> Self {
        Self { source_path }
    }

    pub(super) fn error_location(&self, location: TextLocation) -> ErrorLocation {
        location.to_error_location(self.source_path)
    }

    pub(super) fn location_name(
        &self,
        definitions: &ValueDefinitions<'_>,
        value: ValueId,
    ) -> String {
        definitions
            .declared_name(value)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("{}", value))
    }

    /// `{ invalid, nullptr, x }`
    pub(super) fn render_pset(
        &self,
        definitions: &ValueDefinitions<'_>,
        pset: &PointerSet,
    ) -> String {
        let members = pset
            .iter()
            .map(|state| match state {
                ValidityState::Invalid => String::from("invalid"),
                ValidityState::NullPtr => String::from("nullptr"),
                ValidityState::Global => String::from("global"),
                ValidityState::LocalValue(local) => self.location_name(definitions, local),
            })
            .collect::<Vec<_>>();

        if members.is_empty() {
            return String::from("{ }");
        }

        format!("{{ {} }}", members.join(", "))
    }

    pub(super) fn invalid_use(
        &self,
        pointer_name: &str,
        location: TextLocation,
        notes: Vec<DiagnosticNote>,
    ) -> LifetimeDiagnostic {
        LifetimeDiagnostic {
            kind: DiagnosticKind::Warning,
            message: format!("use of invalid pointer '{pointer_name}'"),
            location: self.error_location(location),
            notes,
        }
    }

    pub(super) fn pointee_out_of_scope_note(
        &self,
        pointee_name: &str,
        location: TextLocation,
    ) -> DiagnosticNote {
        DiagnosticNote {
            message: format!("pointee '{pointee_name}' invalidated at end of scope"),
            location: self.error_location(location),
        }
    }

    pub(super) fn uninitialized_note(&self, location: TextLocation) -> DiagnosticNote {
        DiagnosticNote {
            message: String::from("uninitialized here"),
            location: self.error_location(location),
        }
    }

    pub(super) fn null_assignment_note(&self, location: TextLocation) -> DiagnosticNote {
        DiagnosticNote {
            message: String::from("invalidated here"),
            location: self.error_location(location),
        }
    }

    pub(super) fn pset_remark(
        &self,
        rendered_pset: &str,
        location: TextLocation,
    ) -> LifetimeDiagnostic {
        LifetimeDiagnostic {
            kind: DiagnosticKind::Remark,
            message: format!("pset => {rendered_pset}"),
            location: self.error_location(location),
            notes: Vec::new(),
        }
    }
}
