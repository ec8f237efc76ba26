//! # profitgate Domain
//!
//! Domain types for the Profit SOAP gateway.
//!
//! This crate contains:
//! - Error taxonomy and the `Result` alias
//! - Client configuration (credentials, environment, transport options)
//! - Connector types, call arguments and response shapes
//! - Wire constants
//!
//! ## Architecture
//! - No dependencies on other profitgate crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
