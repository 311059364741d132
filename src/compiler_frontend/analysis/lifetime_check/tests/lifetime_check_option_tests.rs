#![cfg(test)]

use crate::compiler_frontend::analysis::lifetime_check::tests::test_support::{
    diagnostic_kinds, location, note_messages, remark_messages, run_with_options,
    single_function, warnings,
};
use crate::compiler_frontend::analysis::lifetime_check::{
    DiagnosticKind, HistoryOptions, LifetimeCheckOptions, RemarkOptions,
};
use crate::compiler_frontend::compiler_errors::{ErrorMetaDataKey, ErrorType};
use crate::compiler_frontend::ir::ir_nodes::{InitStyle, IrModule};

/// `p` is `{ invalid, nullptr }` at the second deref, `{ x }` at the first.
fn mixed_module() -> IrModule {
    single_function(|body| {
        let x = body.declare_local("x", location(1));
        let p = body.declare_pointer("p", InitStyle::Uninitialized, location(2));
        body.if_then(location(3), |then_arm| then_arm.store_null(p, location(4)));
        let q = body.declare_pointer("q", InitStyle::CInit, location(6));
        body.store(q, x, location(6));
        body.deref(q, location(7));
        body.deref(p, location(8));
    })
}

fn options(remarks: &[&str], history: &[&str]) -> LifetimeCheckOptions {
    LifetimeCheckOptions::from_option_lists(remarks, history).expect("valid option keywords")
}

#[test]
fn default_options_attach_all_history_and_no_remarks() {
    let report = run_with_options(&mixed_module(), LifetimeCheckOptions::default());
    let warnings = warnings(&report);

    assert_eq!(diagnostic_kinds(&report), vec![DiagnosticKind::Warning]);
    assert_eq!(
        note_messages(warnings[0]),
        vec!["uninitialized here", "invalidated here"]
    );
}

#[test]
fn history_axis_filters_notes() {
    let null_only = run_with_options(&mixed_module(), options(&[], &["null"]));
    assert_eq!(
        note_messages(warnings(&null_only)[0]),
        vec!["invalidated here"]
    );

    let invalid_only = run_with_options(&mixed_module(), options(&[], &["invalid"]));
    assert_eq!(
        note_messages(warnings(&invalid_only)[0]),
        vec!["uninitialized here"]
    );

    let no_history = run_with_options(&mixed_module(), options(&[], &[]));
    assert!(warnings(&no_history)[0].notes.is_empty());
}

#[test]
fn pset_invalid_remarks_follow_their_warning() {
    let report = run_with_options(&mixed_module(), options(&["pset-invalid"], &["all"]));

    assert_eq!(
        diagnostic_kinds(&report),
        vec![DiagnosticKind::Warning, DiagnosticKind::Remark]
    );
    assert_eq!(remark_messages(&report), vec!["pset => { invalid, nullptr }"]);
    assert_eq!(report.stats.remarks, 1);
}

#[test]
fn pset_always_remarks_every_dereference_once() {
    let report = run_with_options(&mixed_module(), options(&["pset-always"], &["all"]));

    assert_eq!(
        remark_messages(&report),
        vec!["pset => { x }", "pset => { invalid, nullptr }"]
    );
    assert_eq!(
        diagnostic_kinds(&report),
        vec![
            DiagnosticKind::Remark,
            DiagnosticKind::Remark,
            DiagnosticKind::Warning
        ]
    );
}

#[test]
fn all_remarks_do_not_duplicate_the_invalid_remark() {
    let all = run_with_options(&mixed_module(), options(&["all"], &["all"]));
    let always = run_with_options(&mixed_module(), options(&["pset-always"], &["all"]));

    assert_eq!(all.diagnostics, always.diagnostics);
}

#[test]
fn all_keyword_enables_every_finer_option() {
    let combined = options(&["pset-invalid", "all"], &["null", "all"]);

    assert_eq!(combined.remarks, RemarkOptions::ALL);
    assert_eq!(combined.history, HistoryOptions::ALL);
    assert!(combined.remark_pset_always());
    assert!(combined.remark_pset_invalid());
    assert!(combined.history_invalid());
    assert!(combined.history_null());
}

#[test]
fn none_keyword_and_empty_lists_turn_an_axis_off() {
    let silent = options(&["none"], &[]);

    assert_eq!(
        silent,
        LifetimeCheckOptions::new(RemarkOptions::NONE, HistoryOptions::NONE)
    );
}

#[test]
fn unknown_keywords_are_config_errors() {
    let Err(error) = LifetimeCheckOptions::from_option_lists(&["pset-sometimes"], &["all"]) else {
        panic!("unknown remark keyword should be rejected");
    };
    assert_eq!(error.error_type, ErrorType::Config);
    assert!(error.msg.contains("pset-sometimes"));
    assert_eq!(
        error.metadata.get(&ErrorMetaDataKey::ConfigOption),
        Some(&"remarks")
    );

    let Err(error) = LifetimeCheckOptions::from_option_lists(&["all"], &["everything"]) else {
        panic!("unknown history keyword should be rejected");
    };
    assert_eq!(
        error.metadata.get(&ErrorMetaDataKey::ConfigOption),
        Some(&"history")
    );
}
