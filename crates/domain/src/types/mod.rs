//! Domain types and models

pub mod arguments;
pub mod connector;
pub mod response;

pub use arguments::{ArgValue, Arguments};
pub use connector::ConnectorType;
pub use response::SoapValue;
