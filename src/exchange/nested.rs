//! The "output cursor" idiom generalized to any backend that can return a
//! statement-shaped column: Oracle's `REF CURSOR` out parameter, and whatever analogous
//! handle another backend's [`StatementBackend::take_nested_statement`] produces.
//!
//! Unlike every other exchange-only type, the fetched value here is not a [`StockValue`]
//! at all -- it is a second, independently drivable [`Statement`]. `preFetch` unbinds the
//! previous row's nested statement (tearing down its adapters without releasing the
//! handle) and `postFetch` asks the backend for the new row's nested handle and defines
//! the same column shape against it, leaving it `Bound` -- the caller drives `execute`/
//! `fetch` on it exactly as it would any other statement.

use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::{IntoTypeBackend, StatementBackend};
use crate::rewrite::PlaceholderStyle;
use crate::statement::{IntoAdapter, Statement};
use crate::types::LogicalType;
use crate::Error;

/// Builds the fixed set of `Into` adapters for one nested cursor's columns. Called again
/// for every row of the outer statement, since each row's cursor is a distinct backend
/// handle even though its column shape never changes.
pub type NestedAdapters<S> = Box<dyn Fn() -> Vec<Box<dyn IntoAdapter<S>>>>;

/// Binds one output position whose value is itself a nested, independently fetchable
/// statement.
pub struct StatementInto<S: StatementBackend> {
    backend: Option<S::Into>,
    position: usize,
    placeholder_style: PlaceholderStyle,
    make_intos: NestedAdapters<S>,
    inner: Rc<RefCell<Option<Statement<S>>>>,
}

impl<S: StatementBackend> StatementInto<S> {
    /// `inner` is shared with the caller: once a row carrying this column has been
    /// fetched, `inner.borrow_mut()` holds the nested `Statement`, `Bound` and ready for
    /// the caller to `execute`/`fetch` directly.
    pub fn new(
        placeholder_style: PlaceholderStyle,
        make_intos: NestedAdapters<S>,
        inner: Rc<RefCell<Option<Statement<S>>>>,
    ) -> Self {
        StatementInto {
            backend: None,
            position: 0,
            placeholder_style,
            make_intos,
            inner,
        }
    }
}

impl<S: StatementBackend> IntoAdapter<S> for StatementInto<S> {
    fn define(&mut self, backend: &mut S, position: &mut usize) -> Result<(), Error> {
        let mut into = backend.make_into_backend(LogicalType::Statement)?;
        into.define_by_pos(position, LogicalType::Statement)?;
        self.position = *position - 1;
        self.backend = Some(into);
        Ok(())
    }

    fn size(&self) -> usize {
        1
    }

    fn pre_fetch(&mut self, backend: &mut S) -> Result<(), Error> {
        if let Some(inner) = self.inner.borrow_mut().as_mut() {
            inner.unbind();
        }
        if let Some(into) = &mut self.backend {
            into.pre_fetch()?;
        }
        let _ = backend;
        Ok(())
    }

    fn post_fetch(
        &mut self,
        backend: &mut S,
        got_data: bool,
        _called_from_fetch: bool,
    ) -> Result<(), Error> {
        if !got_data {
            *self.inner.borrow_mut() = None;
            return Ok(());
        }
        let nested_backend = backend.take_nested_statement(self.position)?;
        let mut nested = Statement::new(nested_backend, self.placeholder_style);
        for into in (self.make_intos)() {
            nested.exchange_into(into);
        }
        nested.bind_nested()?;
        *self.inner.borrow_mut() = Some(nested);
        Ok(())
    }

    fn clean_up(&mut self, _backend: &mut S) {
        if let Some(into) = &mut self.backend {
            into.clean_up();
        }
        *self.inner.borrow_mut() = None;
    }
}
