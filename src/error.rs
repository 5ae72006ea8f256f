use thiserror::Error as ThisError;

/// Diagnostic information a backend attaches to an error, when its native client library
/// provides one. Mirrors the "native code + short category" surface required by §6 of the
/// exchange contract: the core never defines its own numbered error codes, it only carries
/// whatever the driver reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeDiagnostic {
    /// Human readable message as reported by the driver.
    pub message: String,
    /// Native error code, if the driver exposes one (e.g. an Oracle ORA- number, a
    /// PostgreSQL SQLSTATE, an ODBC native error).
    pub native_code: Option<i64>,
    /// Short driver category, e.g. "23505" for a PostgreSQL unique violation, or the ODBC
    /// five character SQLSTATE.
    pub category: Option<String>,
}

impl std::fmt::Display for NativeDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(category) = &self.category {
            write!(f, " (category: {category})")?;
        }
        if let Some(code) = self.native_code {
            write!(f, " (native code: {code})")?;
        }
        Ok(())
    }
}

/// Error type returned by every fallible operation in this crate.
///
/// Every variant corresponds to one of the error kinds described in the design's error
/// handling section. Backends never construct a bare `io::Error` or `String` error -- they
/// fill one of these variants so callers can match on the kind without inspecting text.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Session construction or reconnection failed.
    #[error("Failed to connect using backend '{backend}': {diagnostic}")]
    Connection {
        backend: &'static str,
        diagnostic: NativeDiagnostic,
    },

    /// The driver rejected the SQL text at prepare time.
    #[error("Failed to prepare statement: {diagnostic}\nquery: {query}")]
    Preparation {
        query: String,
        diagnostic: NativeDiagnostic,
    },

    /// A runtime error during `execute`/`fetch`, including constraint violations.
    #[error("Execution failed: {diagnostic}")]
    Execution { diagnostic: NativeDiagnostic },

    /// Bind-by-name referenced a name absent from the rewritten query, bind-by-name and
    /// bind-by-position were mixed on the same statement, or the adapter count does not
    /// match the number of placeholders the query text contains.
    #[error("Binding error: {0}")]
    Binding(String),

    /// Into adapters disagree on vector size, Use adapters disagree, or a bound vector has
    /// size zero.
    #[error("Size mismatch: {0}")]
    SizeMismatch(String),

    /// The caller requested a target type that is not representable from the column's
    /// logical type.
    #[error("Type mismatch: column is {column_type:?}, requested {requested:?}")]
    TypeMismatch {
        column_type: crate::types::LogicalType,
        requested: crate::types::LogicalType,
    },

    /// A NULL (or absent) value was fetched into a destination with no indicator pointer.
    #[error("{0}")]
    IndicatorMissing(String),

    /// The Into vector was resized upward between binding and the next fetch.
    #[error(
        "Into vector for position {position} grew from {bound} to {requested} between bind \
         and fetch; growing a bound vector is not supported, only shrinking is"
    )]
    Growth {
        position: usize,
        bound: usize,
        requested: usize,
    },

    /// The textual representation of a numeric or date value could not be parsed.
    #[error("Failed converting value at position {position}: {message}")]
    Conversion { position: usize, message: String },

    /// A public method was called while the statement was not in the state it requires.
    /// This is a programming error: see the statement state machine in the `statement`
    /// module documentation.
    #[error("Statement is in state {actual:?}, but this operation requires {expected}")]
    InvalidState {
        expected: &'static str,
        actual: crate::statement::StatementState,
    },

    /// No backend is registered under the requested name.
    #[error("No backend registered under the name '{0}'")]
    UnknownBackend(String),

    /// The connection string could not be parsed by the requested grammar.
    #[error("Failed parsing connection string: {0}")]
    ConnectionString(String),
}

impl Error {
    /// Construct a [`Error::Binding`] variant from a formatted message. Convenience used
    /// pervasively by the statement core and exchange adapters, the way `odbc-api`'s
    /// `Error::Diagnostics` is built from a bare string plus the function name.
    pub fn binding(message: impl Into<String>) -> Self {
        Error::Binding(message.into())
    }

    pub fn size_mismatch(message: impl Into<String>) -> Self {
        Error::SizeMismatch(message.into())
    }
}
