//! ODBC backend for `dbexchange`, built on the safe `odbc-api` crate.
//!
//! ```no_run
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use dbexchange::row::Row;
//! use dbexchange_odbc::connect;
//!
//! # fn main() -> Result<(), dbexchange::Error> {
//! let mut session = connect("DSN=MyDatabase;UID=user;PWD=pass")?;
//! let row = Rc::new(RefCell::new(Row::new()));
//! let mut statement = session
//!     .prepare()
//!     .sql("SELECT id, name FROM users WHERE id = ?")
//!     .use_value(Some(1i32))
//!     .into_row(row.clone())
//!     .finish()?;
//! statement.execute(1)?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod error;

pub use backend::{
    connect, OdbcInto, OdbcRowId, OdbcSessionBackend, OdbcStatementBackend, OdbcUse,
    OdbcVectorInto, OdbcVectorUse,
};
