//! # About
//!
//! `dbexchange` is a driver-agnostic core for preparing, binding, executing and fetching SQL
//! statements: a statement lifecycle state machine, a scalar/bulk `Into`/`Use` exchange
//! layer, named-parameter rewriting, and dynamic row description, all generic over a small
//! [`backend`] trait family. It ships no driver of its own -- `dbexchange-odbc` implements
//! [`backend::SessionBackend`] on top of the `odbc-api` crate as the representative backend.
//!
//! See the [`statement`] module for the state machine and [`exchange`] for the adapter
//! types most applications construct through [`builder::OnceBuilder`]/[`builder::PrepareBuilder`].

pub mod backend;
pub mod blob;
pub mod builder;
pub mod connection_string;
mod conversion;
mod error;
mod indicator;
pub mod registry;
pub mod rewrite;
pub mod row;
pub mod rowid;
pub mod session;
pub mod statement;
#[cfg(test)]
pub(crate) mod testing;
pub mod types;
pub mod values;

mod exchange;

pub use conversion::TypeConversion;
pub use error::{Error, NativeDiagnostic};
pub use indicator::Indicator;
pub use registry::BackendRegistry;
pub use session::Session;
pub use statement::{Statement, StatementState};
pub use values::{FromRowPosition, FromValues, ToValues, Values};
