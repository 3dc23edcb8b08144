//! Common utilities and helpers for integration tests

pub mod ledger;
pub mod logging;
