//! Infrastructure layer: I/O implementations and DI context
//!
//! This layer implements I/O boundary traits, serves HTTP and wires up services.

pub mod di;
pub mod error;
pub mod http;
pub mod links;
pub mod store;
pub mod traits;

pub use error::{InfraError, InfraResult};
