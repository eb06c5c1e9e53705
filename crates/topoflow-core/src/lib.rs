//! topoflow core
//!
//! Data model of a deployment request and the graph interpreter that turns a
//! diagram export into services.

pub mod error;
pub mod interpreter;
pub mod model;

pub use error::{FlowError, Result};
pub use interpreter::{interpret, parse_request};
pub use model::*;
