//! Shared test helpers for `profitgate-core` integration tests.
//!
//! A recording transport factory stands in for the HTTP transport so tests
//! can assert on the exact sequence of creations, retargets and invocations.

pub mod transport;
