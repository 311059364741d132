#![cfg(test)]

use crate::compiler_frontend::analysis::lifetime_check::tests::test_support::{
    exit_pset, location, note_messages, run_expecting_error, run_lifetime_check, single_function,
    warnings,
};
use crate::compiler_frontend::compiler_errors::{ErrorMetaDataKey, ErrorType};
use crate::compiler_frontend::ir::ir_builder::IrBuilder;
use crate::compiler_frontend::ir::ir_nodes::{CastKind, ConstantValue, InitStyle, ValueId};

#[test]
fn deref_of_uninitialized_pointer_warns_with_uninitialized_note() {
    let module = single_function(|body| {
        let p = body.declare_pointer("p", InitStyle::Uninitialized, location(2));
        body.deref(p, location(3));
    });

    let report = run_lifetime_check(&module);
    let warnings = warnings(&report);

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "use of invalid pointer 'p'");
    assert_eq!(warnings[0].location.start_pos.line_number, 3);
    assert_eq!(note_messages(warnings[0]), vec!["uninitialized here"]);
    assert_eq!(warnings[0].notes[0].location.start_pos.line_number, 2);
}

#[test]
fn deref_of_null_pointer_warns_with_null_history_only() {
    let module = single_function(|body| {
        let p = body.declare_pointer("p", InitStyle::CInit, location(2));
        body.store_null(p, location(3));
        body.deref(p, location(4));
    });

    let report = run_lifetime_check(&module);
    let warnings = warnings(&report);

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "use of invalid pointer 'p'");
    assert_eq!(note_messages(warnings[0]), vec!["invalidated here"]);
    assert_eq!(warnings[0].notes[0].location.start_pos.line_number, 3);
}

#[test]
fn deref_of_pointer_to_live_local_is_clean() {
    let module = single_function(|body| {
        let x = body.declare_local("x", location(1));
        let p = body.declare_pointer("p", InitStyle::CInit, location(2));
        body.store(p, x, location(2));
        body.deref(p, location(3));
    });

    let report = run_lifetime_check(&module);

    assert!(report.diagnostics.is_empty());
    assert_eq!(exit_pset(&report, "p").as_deref(), Some("{ x }"));
    assert_eq!(exit_pset(&report, "x").as_deref(), Some("{ x }"));
}

#[test]
fn loading_a_pointer_without_reading_through_it_is_not_a_use() {
    let module = single_function(|body| {
        let p = body.declare_pointer("p", InitStyle::Uninitialized, location(2));
        body.load(p, location(3));
    });

    let report = run_lifetime_check(&module);

    assert!(report.diagnostics.is_empty());
    assert_eq!(exit_pset(&report, "p").as_deref(), Some("{ invalid }"));
}

#[test]
fn address_of_array_element_points_into_the_array() {
    let module = single_function(|body| {
        let array = body.declare_local("buffer", location(1));
        let p = body.declare_pointer("p", InitStyle::Uninitialized, location(2));
        body.store_array_element(p, array, location(3));
        body.deref(p, location(4));
    });

    let report = run_lifetime_check(&module);

    assert!(report.diagnostics.is_empty());
    assert_eq!(exit_pset(&report, "p").as_deref(), Some("{ buffer }"));
}

#[test]
fn stride_over_a_non_decay_cast_is_not_tracked() {
    let module = single_function(|body| {
        let array = body.declare_local("buffer", location(1));
        let p = body.declare_pointer("p", InitStyle::Uninitialized, location(2));
        let cast = body.cast(array, CastKind::Bitcast, location(3));
        let index = body.constant(ConstantValue::Int(1), location(3));
        let element = body.ptr_stride(cast, index, location(3));
        body.store(p, element, location(3));
    });

    let report = run_lifetime_check(&module);

    assert_eq!(exit_pset(&report, "p").as_deref(), Some("{ invalid }"));
}

#[test]
fn stores_with_unknown_provenance_leave_the_pset_alone() {
    let module = single_function(|body| {
        let x = body.declare_local("x", location(1));
        let p = body.declare_pointer("p", InitStyle::CInit, location(2));
        body.store(p, x, location(2));

        let call_result = body.other("make_pointer", location(3));
        body.store(p, call_result, location(3));

        let int_constant = body.constant(ConstantValue::Int(4), location(4));
        body.store(p, int_constant, location(4));
    });

    let report = run_lifetime_check(&module);

    assert_eq!(exit_pset(&report, "p").as_deref(), Some("{ x }"));
}

#[test]
fn stores_into_plain_locals_are_ignored() {
    let module = single_function(|body| {
        let x = body.declare_local("x", location(1));
        let y = body.declare_local("y", location(2));
        body.store(x, y, location(3));
    });

    let report = run_lifetime_check(&module);

    assert_eq!(exit_pset(&report, "x").as_deref(), Some("{ x }"));
}

#[test]
fn deref_of_untracked_value_is_skipped() {
    let module = single_function(|body| {
        // A parameter: never declared in the body, so never tracked.
        body.deref(ValueId(900), location(2));
        body.store_null(ValueId(900), location(3));
    });

    let report = run_lifetime_check(&module);

    assert!(report.diagnostics.is_empty());
}

#[test]
fn unsupported_pointer_initializer_is_a_contract_violation() {
    let module = single_function(|body| {
        body.declare_pointer("p", InitStyle::CallInit, location(2));
    });

    let error = run_expecting_error(&module);

    assert_eq!(error.error_type, ErrorType::Compiler);
    assert_eq!(error.location.start_pos.line_number, 2);
    assert_eq!(
        error.metadata.get(&ErrorMetaDataKey::InitStyle),
        Some(&"callinit")
    );
    assert_eq!(
        error.metadata.get(&ErrorMetaDataKey::CompilationStage),
        Some(&"Lifetime Checking")
    );
}

#[test]
fn list_initialized_plain_locals_are_accepted() {
    let module = single_function(|body| {
        body.declare("values", false, InitStyle::ListInit, location(2));
    });

    let report = run_lifetime_check(&module);

    assert_eq!(exit_pset(&report, "values").as_deref(), Some("{ values }"));
}

#[test]
fn declaring_the_same_location_twice_is_a_contract_violation() {
    let mut module = single_function(|body| {
        body.declare_local("x", location(2));
    });

    let operations = &mut module.functions[0].body.blocks[0].operations;
    let duplicate = operations[0].clone();
    operations.push(duplicate);

    let error = run_expecting_error(&module);

    assert_eq!(error.error_type, ErrorType::Compiler);
    assert!(error.msg.contains("declared twice"));
}

#[test]
fn each_function_starts_from_a_clean_state() {
    let mut builder = IrBuilder::new("test.c");
    builder.function("first", location(1), |body| {
        let p = body.declare_pointer("p", InitStyle::CInit, location(2));
        body.store_null(p, location(3));
    });
    builder.function("second", location(10), |body| {
        let q = body.declare_pointer("q", InitStyle::Uninitialized, location(11));
        body.deref(q, location(12));
    });
    let module = builder.finish();

    let report = run_lifetime_check(&module);
    let warnings = warnings(&report);

    assert_eq!(report.stats.functions_analyzed, 2);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "use of invalid pointer 'q'");
    assert_eq!(note_messages(warnings[0]), vec!["uninitialized here"]);
    assert_eq!(report.analysis.function_summaries.len(), 2);
}
