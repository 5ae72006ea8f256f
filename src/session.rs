use crate::backend::SessionBackend;
use crate::builder::{OnceBuilder, PrepareBuilder};
use crate::statement::Statement;
use crate::Error;

/// A live connection to one database: the scope of transactions and statement
/// preparation.
///
/// `Session` owns no statements; statements hold the data they need to talk to the
/// backend but do not keep a reference back to the `Session` (unlike some native client
/// libraries, there is no parent/child handle relationship the core must track), so a
/// `Statement` may outlive the call that created it for as long as its backend handle
/// stays valid.
pub struct Session<B: SessionBackend> {
    backend: B,
    log_level: Option<log::Level>,
    last_query: String,
}

impl<B: SessionBackend> Session<B> {
    /// Wrap an already-connected backend. Backends expose their own `connect` function
    /// (e.g. `dbexchange_odbc::connect`) that performs the actual handshake and returns a
    /// `Session` via this constructor.
    pub fn new(backend: B) -> Self {
        Session {
            backend,
            log_level: None,
            last_query: String::new(),
        }
    }

    /// Enable logging of every query this session prepares or executes once-shot, at
    /// `level`. Mirrors `odbc-api`'s use of the `log` crate for diagnostics -- there is no
    /// bespoke log sink type, just a level threshold plus the `log` facade.
    pub fn set_log_level(&mut self, level: Option<log::Level>) {
        self.log_level = level;
    }

    pub fn last_query(&self) -> &str {
        &self.last_query
    }

    pub(crate) fn log_query(&mut self, query: &str) {
        self.last_query = query.to_string();
        if let Some(level) = self.log_level {
            log::log!(level, "dbexchange: executing query: {query}");
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Begin a unit of work. No-op for backends without explicit transaction handles.
    pub fn begin(&mut self) -> Result<(), Error> {
        self.backend.begin()
    }

    pub fn commit(&mut self) -> Result<(), Error> {
        self.backend.commit()
    }

    pub fn rollback(&mut self) -> Result<(), Error> {
        self.backend.rollback()
    }

    /// Allocate a fresh, empty statement against this session's backend.
    pub fn alloc_statement(&mut self) -> Result<Statement<B::Statement>, Error> {
        let backend_statement = self.backend.make_statement_backend()?;
        Ok(Statement::new(backend_statement, self.backend.placeholder_style()))
    }

    /// Begin a one-shot expression: text and adapters accumulate on the returned builder
    /// and the assembled query executes when the last clone of the builder is dropped.
    /// See the `builder` module documentation.
    pub fn once(&mut self) -> OnceBuilder<'_, B> {
        OnceBuilder::new(self)
    }

    /// Begin a expression whose assembled query and adapters are captured for reuse: its
    /// final action transfers ownership into a [`crate::statement::Statement`] instead of
    /// executing immediately.
    pub fn prepare(&mut self) -> PrepareBuilder<'_, B> {
        PrepareBuilder::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;

    #[test]
    fn log_query_emits_at_the_configured_level() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut session = Session::new(FakeBackend::new(vec![], vec![]));
        session.set_log_level(Some(log::Level::Debug));
        session.log_query("select 1");
        assert_eq!(session.last_query(), "select 1");
    }
}
