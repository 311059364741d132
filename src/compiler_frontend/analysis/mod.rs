pub mod lifetime_check;
