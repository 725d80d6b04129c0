//! Test suites for the agent bridge.

mod support;
