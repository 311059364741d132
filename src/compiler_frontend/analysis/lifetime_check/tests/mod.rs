mod lifetime_check_option_tests;
mod lifetime_check_scope_tests;
mod lifetime_check_transfer_tests;
