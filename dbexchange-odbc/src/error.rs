//! Converts `odbc_api::Error` into `dbexchange::Error`, carrying the driver's own message
//! forward as a `NativeDiagnostic` rather than inventing a parallel error taxonomy.

use dbexchange::NativeDiagnostic;

pub(crate) fn to_diagnostic(error: &odbc_api::Error) -> NativeDiagnostic {
    NativeDiagnostic {
        message: error.to_string(),
        native_code: None,
        category: None,
    }
}

pub(crate) fn connection_error(error: odbc_api::Error) -> dbexchange::Error {
    dbexchange::Error::Connection {
        backend: "odbc",
        diagnostic: to_diagnostic(&error),
    }
}

pub(crate) fn preparation_error(query: &str, error: odbc_api::Error) -> dbexchange::Error {
    dbexchange::Error::Preparation {
        query: query.to_string(),
        diagnostic: to_diagnostic(&error),
    }
}

pub(crate) fn execution_error(error: odbc_api::Error) -> dbexchange::Error {
    dbexchange::Error::Execution {
        diagnostic: to_diagnostic(&error),
    }
}
