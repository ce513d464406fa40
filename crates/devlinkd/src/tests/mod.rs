//! Test suites for the device bridge.

pub(crate) mod support;
