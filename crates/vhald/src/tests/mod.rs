//! Test suites for the vehicle property service.

mod support;
