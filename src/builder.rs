//! Query builders: the fluent `.sql(...)` / bind / `.into_row(...)` surface used to assemble
//! a statement one piece at a time.
//!
//! The system this core is modeled on builds a query by streaming text and adapters into a
//! long-lived object and lets the query run as a side effect of the builder going out of
//! scope. That relies on a destructor that can fail silently; Rust's `Drop` cannot return a
//! `Result`, so instead of reproducing the run-on-drop behavior this recasts the same
//! fluent surface as an ordinary consuming builder with an explicit terminal call --
//! [`OnceBuilder::run`] and [`PrepareBuilder::finish`] -- which is the idiom `odbc-api`
//! itself uses for its own `Preallocated`/`Prepared` builders. See `DESIGN.md`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::SessionBackend;
use crate::conversion::TypeConversion;
use crate::exchange::{NestedAdapters, ScalarInto, ScalarUse, StatementInto, VectorInto, VectorUse};
use crate::indicator::Indicator;
use crate::row::Row;
use crate::session::Session;
use crate::statement::{IntoAdapter, Statement, UseAdapter};
use crate::values::ToValues;
use crate::Error;

type IntoBox<B> = Box<dyn IntoAdapter<<B as SessionBackend>::Statement>>;
type UseBox<B> = Box<dyn UseAdapter<<B as SessionBackend>::Statement>>;

/// Shared state assembled by either builder before it is consumed.
struct Assembly<B: SessionBackend> {
    query: String,
    intos: Vec<IntoBox<B>>,
    uses: Vec<UseBox<B>>,
    row: Option<Rc<RefCell<Row>>>,
}

impl<B: SessionBackend> Assembly<B> {
    fn new() -> Self {
        Assembly {
            query: String::new(),
            intos: Vec::new(),
            uses: Vec::new(),
            row: None,
        }
    }

    fn into_statement(self, session: &mut Session<B>) -> Result<Statement<B::Statement>, Error> {
        let mut statement = session.alloc_statement()?;
        session.log_query(&self.query);
        statement.prepare(&self.query)?;
        for into in self.intos {
            statement.exchange_into(into);
        }
        for use_ in self.uses {
            statement.exchange_use(use_);
        }
        if let Some(row) = self.row {
            statement.exchange_row(row);
        }
        statement.define_and_bind()?;
        Ok(statement)
    }
}

/// A one-shot query: prepares, binds and runs in a single call to [`OnceBuilder::run`].
pub struct OnceBuilder<'a, B: SessionBackend> {
    session: &'a mut Session<B>,
    assembly: Assembly<B>,
}

impl<'a, B: SessionBackend> OnceBuilder<'a, B> {
    pub(crate) fn new(session: &'a mut Session<B>) -> Self {
        OnceBuilder {
            session,
            assembly: Assembly::new(),
        }
    }

    pub fn sql(mut self, text: &str) -> Self {
        self.assembly.query.push_str(text);
        self
    }

    /// Bind a scalar input by position, in the order placeholders appear.
    pub fn use_value<T: TypeConversion + 'static>(mut self, value: Option<T>) -> Self {
        self.assembly
            .uses
            .push(Box::new(ScalarUse::<B::Statement, T>::by_position(value)));
        self
    }

    /// Bind a scalar input by name, matching a `:name` placeholder.
    pub fn use_named<T: TypeConversion + 'static>(
        mut self,
        name: impl Into<String>,
        value: Option<T>,
    ) -> Self {
        self.assembly
            .uses
            .push(Box::new(ScalarUse::<B::Statement, T>::by_name(name, value)));
        self
    }

    /// Bind a bulk input: one row per element of `values`.
    pub fn use_vector<T: TypeConversion + 'static>(mut self, values: Vec<Option<T>>) -> Self {
        self.assembly
            .uses
            .push(Box::new(VectorUse::<B::Statement, T>::by_position(values)));
        self
    }

    /// Bind `value`'s by-Values `TypeConversion` shape: `to_values()` is exploded into one
    /// named `Use` adapter per entry.
    pub fn use_values<T: ToValues>(mut self, value: &T) -> Self {
        self.assembly
            .uses
            .extend(value.to_values().into_use_adapters());
        self
    }

    /// Bind a scalar output; `slot` receives the fetched value (or stays `None` on a row
    /// with no more data).
    pub fn into_value<T: TypeConversion + 'static>(
        mut self,
        slot: Rc<RefCell<Option<T>>>,
        indicator: Option<Rc<RefCell<Indicator>>>,
    ) -> Self {
        self.assembly
            .intos
            .push(Box::new(ScalarInto::<B::Statement, T>::new(slot, indicator)));
        self
    }

    /// Bind a bulk output of up to `capacity` rows.
    pub fn into_vector<T: TypeConversion + 'static>(
        mut self,
        capacity: usize,
        slots: Rc<RefCell<Vec<Option<T>>>>,
        indicators: Option<Rc<RefCell<Vec<Indicator>>>>,
    ) -> Self {
        self.assembly
            .intos
            .push(Box::new(VectorInto::<B::Statement, T>::new(
                capacity, slots, indicators,
            )));
        self
    }

    /// Bind a dynamically described row: every result column is described and exposed
    /// through `row` on the first `execute`.
    pub fn into_row(mut self, row: Rc<RefCell<Row>>) -> Self {
        self.assembly.row = Some(row);
        self
    }

    /// Prepare, bind and execute with a requested row count of `1` (or `0` for statements
    /// with no result, e.g. DDL/DML). Returns whether data was exchanged.
    pub fn run(self) -> Result<bool, Error> {
        let mut statement = self.assembly.into_statement(self.session)?;
        statement.execute(1)
    }

    /// Like [`Self::run`], but drives a bulk exchange of exactly `rows` (matching the size
    /// every bound vector adapter must already report).
    pub fn run_bulk(self, rows: usize) -> Result<bool, Error> {
        let mut statement = self.assembly.into_statement(self.session)?;
        statement.execute(rows)
    }
}

/// A query meant to be reused: its terminal action transfers ownership into a
/// [`Statement`] instead of executing it.
pub struct PrepareBuilder<'a, B: SessionBackend> {
    session: &'a mut Session<B>,
    assembly: Assembly<B>,
}

impl<'a, B: SessionBackend> PrepareBuilder<'a, B> {
    pub(crate) fn new(session: &'a mut Session<B>) -> Self {
        PrepareBuilder {
            session,
            assembly: Assembly::new(),
        }
    }

    pub fn sql(mut self, text: &str) -> Self {
        self.assembly.query.push_str(text);
        self
    }

    pub fn use_value<T: TypeConversion + 'static>(mut self, value: Option<T>) -> Self {
        self.assembly
            .uses
            .push(Box::new(ScalarUse::<B::Statement, T>::by_position(value)));
        self
    }

    pub fn use_named<T: TypeConversion + 'static>(
        mut self,
        name: impl Into<String>,
        value: Option<T>,
    ) -> Self {
        self.assembly
            .uses
            .push(Box::new(ScalarUse::<B::Statement, T>::by_name(name, value)));
        self
    }

    /// Bind `value`'s by-Values `TypeConversion` shape: `to_values()` is exploded into one
    /// named `Use` adapter per entry.
    pub fn use_values<T: ToValues>(mut self, value: &T) -> Self {
        self.assembly
            .uses
            .extend(value.to_values().into_use_adapters());
        self
    }

    pub fn into_value<T: TypeConversion + 'static>(
        mut self,
        slot: Rc<RefCell<Option<T>>>,
        indicator: Option<Rc<RefCell<Indicator>>>,
    ) -> Self {
        self.assembly
            .intos
            .push(Box::new(ScalarInto::<B::Statement, T>::new(slot, indicator)));
        self
    }

    pub fn into_row(mut self, row: Rc<RefCell<Row>>) -> Self {
        self.assembly.row = Some(row);
        self
    }

    /// Bind an output-cursor column (Oracle's `REF CURSOR` idiom, generalized): `inner`
    /// receives the nested, independently fetchable [`Statement`] produced each time a row
    /// carrying this column is fetched. `make_intos` builds that nested statement's own
    /// `Into` adapters; it is called again for every row, since each row's cursor is a
    /// distinct backend handle even though the column shape never changes.
    pub fn into_nested(
        mut self,
        inner: Rc<RefCell<Option<Statement<B::Statement>>>>,
        make_intos: NestedAdapters<B::Statement>,
    ) -> Self {
        let placeholder_style = self.session.backend().placeholder_style();
        self.assembly
            .intos
            .push(Box::new(StatementInto::new(
                placeholder_style,
                make_intos,
                inner,
            )));
        self
    }

    /// Prepare and bind, returning the live [`Statement`] for the caller to `execute`/
    /// `fetch` as many times as needed.
    pub fn finish(self) -> Result<Statement<B::Statement>, Error> {
        self.assembly.into_statement(self.session)
    }
}
