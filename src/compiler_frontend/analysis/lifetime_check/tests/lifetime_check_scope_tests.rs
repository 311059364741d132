#![cfg(test)]

use crate::compiler_frontend::analysis::lifetime_check::tests::test_support::{
    diagnostic_kinds, exit_pset, location, note_messages, run_lifetime_check, single_function,
    warnings,
};
use crate::compiler_frontend::analysis::lifetime_check::DiagnosticKind;
use crate::compiler_frontend::ir::ir_nodes::InitStyle;

#[test]
fn pointer_to_inner_local_dangles_after_scope_exit() {
    // int x; int* p = &x; { int y; p = &y; } *p;
    let module = single_function(|body| {
        let x = body.declare_local("x", location(1));
        let p = body.declare_pointer("p", InitStyle::CInit, location(2));
        body.store(p, x, location(2));
        body.scope(location(3), |inner| {
            let y = inner.declare_local("y", location(4));
            inner.store(p, y, location(5));
            inner.closes_at(location(6));
        });
        body.deref(p, location(7));
    });

    let report = run_lifetime_check(&module);
    let warnings = warnings(&report);

    assert_eq!(diagnostic_kinds(&report), vec![DiagnosticKind::Warning]);
    assert_eq!(warnings[0].message, "use of invalid pointer 'p'");
    assert_eq!(warnings[0].location.start_pos.line_number, 7);
    assert_eq!(
        note_messages(warnings[0]),
        vec!["pointee 'y' invalidated at end of scope"]
    );
    assert_eq!(warnings[0].notes[0].location.start_pos.line_number, 6);

    assert_eq!(report.stats.scopes_opened, 1);
    assert_eq!(report.stats.pointers_invalidated, 1);
    assert_eq!(exit_pset(&report, "p").as_deref(), Some("{ invalid }"));
    assert_eq!(exit_pset(&report, "y"), None);
}

#[test]
fn pointer_to_outer_local_survives_inner_scope() {
    let module = single_function(|body| {
        let x = body.declare_local("x", location(1));
        let p = body.declare_pointer("p", InitStyle::Uninitialized, location(2));
        body.scope(location(3), |inner| {
            inner.declare_local("y", location(4));
            inner.store(p, x, location(5));
        });
        body.deref(p, location(7));
    });

    let report = run_lifetime_check(&module);

    assert!(report.diagnostics.is_empty());
    assert_eq!(report.stats.pointers_invalidated, 0);
    assert_eq!(exit_pset(&report, "p").as_deref(), Some("{ x }"));
}

#[test]
fn deref_inside_the_scope_that_owns_the_pointee_is_clean() {
    let module = single_function(|body| {
        let p = body.declare_pointer("p", InitStyle::Uninitialized, location(1));
        body.scope(location(2), |inner| {
            let y = inner.declare_local("y", location(3));
            inner.store(p, y, location(4));
            inner.deref(p, location(5));
        });
    });

    let report = run_lifetime_check(&module);

    assert!(report.diagnostics.is_empty());
    assert_eq!(report.stats.pointers_invalidated, 1);
}

#[test]
fn pointers_declared_in_a_scope_leave_the_pmap_with_it() {
    let module = single_function(|body| {
        let x = body.declare_local("x", location(1));
        body.scope(location(2), |inner| {
            let q = inner.declare_pointer("q", InitStyle::CInit, location(3));
            inner.store(q, x, location(3));
        });
    });

    let report = run_lifetime_check(&module);

    assert_eq!(exit_pset(&report, "q"), None);
    assert_eq!(exit_pset(&report, "x").as_deref(), Some("{ x }"));
}

#[test]
fn nested_scopes_kill_at_their_own_end() {
    let module = single_function(|body| {
        let p = body.declare_pointer("p", InitStyle::Uninitialized, location(1));
        let q = body.declare_pointer("q", InitStyle::Uninitialized, location(2));
        body.scope(location(3), |outer| {
            let a = outer.declare_local("a", location(4));
            outer.store(q, a, location(4));
            outer.scope(location(5), |inner| {
                let b = inner.declare_local("b", location(6));
                inner.store(p, b, location(6));
                inner.closes_at(location(7));
            });
            // p already dangles here, q is still fine.
            outer.deref(p, location(8));
            outer.deref(q, location(9));
            outer.closes_at(location(10));
        });
        body.deref(q, location(11));
    });

    let report = run_lifetime_check(&module);
    let warnings = warnings(&report);

    assert_eq!(warnings.len(), 2);
    assert_eq!(warnings[0].message, "use of invalid pointer 'p'");
    assert_eq!(
        note_messages(warnings[0]),
        vec!["pointee 'b' invalidated at end of scope"]
    );
    assert_eq!(warnings[0].notes[0].location.start_pos.line_number, 7);

    assert_eq!(warnings[1].message, "use of invalid pointer 'q'");
    assert_eq!(warnings[1].location.start_pos.line_number, 11);
    assert_eq!(
        note_messages(warnings[1]),
        vec!["pointee 'a' invalidated at end of scope"]
    );
    assert_eq!(warnings[1].notes[0].location.start_pos.line_number, 10);

    assert_eq!(report.stats.scopes_opened, 2);
    assert_eq!(report.stats.pointers_invalidated, 2);
}

#[test]
fn function_level_locals_are_not_killed_at_the_end_of_the_body() {
    let module = single_function(|body| {
        let x = body.declare_local("x", location(1));
        let p = body.declare_pointer("p", InitStyle::CInit, location(2));
        body.store(p, x, location(2));
        body.return_(location(3));
    });

    let report = run_lifetime_check(&module);
    let summary = report
        .analysis
        .summary(module.functions[0].id)
        .expect("summary for f");

    assert_eq!(summary.name, "f");
    assert_eq!(report.stats.pointers_invalidated, 0);
    assert_eq!(
        summary
            .exit_pmap
            .iter()
            .map(|snapshot| snapshot.name.as_str())
            .collect::<Vec<_>>(),
        vec!["p", "x"]
    );
}
