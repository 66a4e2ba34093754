//! In-crate test suites for tessel-engine.

mod unit;
