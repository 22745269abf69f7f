//! HTTP request handlers, one module per tus operation.

pub mod append;
pub mod common;
pub mod creation;
pub mod discovery;
pub mod status;
pub mod termination;

pub use append::*;
pub use common::*;
pub use creation::*;
pub use discovery::*;
pub use status::*;
pub use termination::*;
