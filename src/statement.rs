//! The driver-agnostic statement state machine: holds the lists of `Into`/`Use` adapters,
//! orchestrates prepare/bind/define/execute/fetch, reconciles sizes, drives dynamic row
//! description. See §4.2.

use std::rc::Rc;
use std::cell::RefCell;

use crate::backend::{ExecuteOutcome, PrepareHint, StatementBackend};
use crate::error::Error;
use crate::rewrite::{rewrite_named_params, PlaceholderStyle};
use crate::row::Row;
use crate::types::ColumnProperties;

/// One output position (or input position for `Use`): binds a user destination to one
/// column. Implemented by every shape in `crate::exchange` (scalar, vector, nested
/// statement, dynamic row).
pub trait IntoAdapter<S: StatementBackend> {
    /// `define` on the backend, assigning `*position` and incrementing it.
    fn define(&mut self, backend: &mut S, position: &mut usize) -> Result<(), Error>;
    /// Logical size: `1` for a scalar adapter, the bound vector's length for a vector
    /// adapter.
    fn size(&self) -> usize;
    fn resize(&mut self, _backend: &mut S, _size: usize) -> Result<(), Error> {
        Ok(())
    }
    fn pre_fetch(&mut self, backend: &mut S) -> Result<(), Error> {
        let _ = backend;
        Ok(())
    }
    fn post_fetch(
        &mut self,
        backend: &mut S,
        got_data: bool,
        called_from_fetch: bool,
    ) -> Result<(), Error>;
    fn clean_up(&mut self, backend: &mut S) {
        let _ = backend;
    }
}

/// The input-parameter side of exchange; symmetric to [`IntoAdapter`].
pub trait UseAdapter<S: StatementBackend> {
    fn bind(&mut self, backend: &mut S, position: &mut usize) -> Result<(), Error>;
    fn size(&self) -> usize;
    fn pre_use(&mut self, backend: &mut S) -> Result<(), Error>;
    fn post_use(&mut self, backend: &mut S, got_data: bool) -> Result<(), Error> {
        let _ = (backend, got_data);
        Ok(())
    }
    fn clean_up(&mut self, backend: &mut S) {
        let _ = backend;
    }
}

/// The lifecycle states of a [`Statement`], per §4.2's state table. Transitions outside
/// this table are programming errors, surfaced as [`Error::InvalidState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementState {
    Unprepared,
    Prepared,
    Bound,
    Executed,
    Fetching,
    Exhausted,
    Cleaned,
}

/// One prepared (or about-to-execute) SQL unit, generic over its backend.
pub struct Statement<S: StatementBackend> {
    backend: S,
    placeholder_style: PlaceholderStyle,
    query: String,
    intos: Vec<Box<dyn IntoAdapter<S>>>,
    uses: Vec<Box<dyn UseAdapter<S>>>,
    row_intos: Vec<Box<dyn IntoAdapter<S>>>,
    row: Option<Rc<RefCell<Row>>>,
    described: bool,
    fetch_batch_size: usize,
    initial_fetch_batch_size: Option<usize>,
    state: StatementState,
}

impl<S: StatementBackend> Statement<S> {
    pub fn new(backend: S, placeholder_style: PlaceholderStyle) -> Self {
        Statement {
            backend,
            placeholder_style,
            query: String::new(),
            intos: Vec::new(),
            uses: Vec::new(),
            row_intos: Vec::new(),
            row: None,
            described: false,
            fetch_batch_size: 1,
            initial_fetch_batch_size: None,
            state: StatementState::Unprepared,
        }
    }

    pub fn state(&self) -> StatementState {
        self.state
    }

    fn require_state(&self, expected: &'static str, ok: bool) -> Result<(), Error> {
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }

    /// Rewrite named parameters (if the backend's placeholder style needs it) and hand the
    /// result to the backend.
    pub fn prepare(&mut self, query: &str) -> Result<(), Error> {
        self.require_state(
            "Unprepared",
            self.state == StatementState::Unprepared,
        )?;
        let (rewritten, _names) = rewrite_named_params(query, self.placeholder_style);
        self.backend
            .prepare(&rewritten, PrepareHint::PreparedReusable)
            .map_err(|e| match e {
                Error::Preparation { diagnostic, .. } => Error::Preparation {
                    query: rewritten.clone(),
                    diagnostic,
                },
                other => other,
            })?;
        self.query = rewritten;
        self.state = StatementState::Prepared;
        Ok(())
    }

    /// Append an `Into` adapter; ownership transfers.
    pub fn exchange_into(&mut self, adapter: Box<dyn IntoAdapter<S>>) {
        self.intos.push(adapter);
    }

    /// Append a `Use` adapter; ownership transfers.
    pub fn exchange_use(&mut self, adapter: Box<dyn UseAdapter<S>>) {
        self.uses.push(adapter);
    }

    /// Bind a dynamic [`Row`] to this statement: on the first `execute`, every result
    /// column is described and an `Into` adapter of the corresponding stock type is
    /// injected automatically. See `execute`, step 4.
    pub fn exchange_row(&mut self, row: Rc<RefCell<Row>>) {
        self.row = Some(row);
    }

    /// Call `define` on each `Into` in order (positions `1..N`), then `bind` on each `Use`
    /// (positions `1..M`).
    pub fn define_and_bind(&mut self) -> Result<(), Error> {
        self.require_state(
            "Prepared",
            self.state == StatementState::Prepared,
        )?;
        let mut position = 1usize;
        for into in self.intos.iter_mut() {
            into.define(&mut self.backend, &mut position)?;
        }
        let mut position = 1usize;
        for use_ in self.uses.iter_mut() {
            use_.bind(&mut self.backend, &mut position)?;
        }
        self.state = StatementState::Bound;
        Ok(())
    }

    fn common_size<T>(adapters: &[T], get_size: impl Fn(&T) -> usize, kind: &str) -> Result<usize, Error> {
        if adapters.is_empty() {
            return Ok(0);
        }
        let first = get_size(&adapters[0]);
        for (index, adapter) in adapters.iter().enumerate().skip(1) {
            let size = get_size(adapter);
            if size != first {
                return Err(Error::size_mismatch(format!(
                    "{kind} adapter at index {index} has size {size}, but adapter 0 has size {first}"
                )));
            }
        }
        if first == 0 {
            return Err(Error::size_mismatch(format!(
                "{kind} adapter list has size 0; a zero-size vector is a fatal error"
            )));
        }
        Ok(first)
    }

    /// Execute the statement. `requested` is the caller-requested row count (`0` for "no
    /// data exchange"). See §4.2 for the eleven-step algorithm this implements.
    pub fn execute(&mut self, requested: usize) -> Result<bool, Error> {
        self.require_state(
            "Bound, Executed or Exhausted",
            matches!(
                self.state,
                StatementState::Bound | StatementState::Executed | StatementState::Exhausted
            ),
        )?;

        // Step 1: common sizes, size-mismatch is fatal.
        let intos_size = if self.intos.is_empty() {
            1
        } else {
            Self::common_size(&self.intos, |i| i.size(), "Into")?
        };
        let uses_size = if self.uses.is_empty() {
            1
        } else {
            Self::common_size(&self.uses, |u| u.size(), "Use")?
        };

        // Step 2: bulk-in and bulk-out cannot coexist.
        if intos_size > 1 && uses_size > 1 {
            return Err(Error::size_mismatch(
                "Bulk insert/update and bulk select not allowed in same query.".to_string(),
            ));
        }

        // Step 3: preUse on every Use.
        for use_ in self.uses.iter_mut() {
            use_.pre_use(&mut self.backend)?;
        }

        // Step 4: dynamic row description.
        if self.row.is_some() && !self.described {
            self.describe_row()?;
        }

        // Step 5: batch count.
        let num = if requested == 0 {
            0
        } else {
            requested.max(intos_size).max(uses_size)
        };

        // preFetch on every Into before the backend runs, mirroring `fetch`.
        for into in self.intos.iter_mut() {
            into.pre_fetch(&mut self.backend)?;
        }
        for into in self.row_intos.iter_mut() {
            into.pre_fetch(&mut self.backend)?;
        }

        // Step 6: backend execute.
        let outcome = self.backend.execute(num)?;

        // Step 7/8: resize vector Intos to actual row count.
        let mut got_data = false;
        if outcome == ExecuteOutcome::Success && num > 0 {
            got_data = true;
            let actual = self.backend.number_of_rows().min(num);
            self.resize_vector_intos(actual)?;
        } else if outcome == ExecuteOutcome::NoData && num > 1 {
            // A bulk fetch whose last partial batch may still have arrived.
            let actual = self.backend.number_of_rows().min(num);
            self.resize_vector_intos(actual)?;
            got_data = actual > 0;
        }

        // Steps 9/10: postFetch/postUse only fire when there was anything to exchange.
        if num > 0 {
            // Step 9: postFetch on every Into (in order).
            for into in self.intos.iter_mut() {
                into.post_fetch(&mut self.backend, got_data, false)?;
            }
            for into in self.row_intos.iter_mut() {
                into.post_fetch(&mut self.backend, got_data, false)?;
            }

            // Step 10: postUse on every Use.
            for use_ in self.uses.iter_mut() {
                use_.post_use(&mut self.backend, got_data)?;
            }
        }

        if self.initial_fetch_batch_size.is_none() {
            self.initial_fetch_batch_size = Some(intos_size.max(1));
        }
        self.fetch_batch_size = intos_size.max(1);

        self.state = if got_data {
            StatementState::Executed
        } else {
            StatementState::Exhausted
        };
        Ok(got_data)
    }

    fn describe_row(&mut self) -> Result<(), Error> {
        let row = self
            .row
            .clone()
            .expect("describe_row is only called when a row is bound");
        let column_count = self.backend.prepare_for_describe()?;
        let mut position = self.intos.len() + 1;
        let mut properties = Vec::with_capacity(column_count);
        for index in 0..column_count {
            let column = self.backend.describe_column(index)?;
            properties.push(column.clone());
            let mut into = crate::exchange::stock_into_for_column(&column, row.clone(), index);
            into.define(&mut self.backend, &mut position)?;
            self.row_intos.push(into);
        }
        row.borrow_mut().describe(properties);
        self.described = true;
        Ok(())
    }

    fn resize_vector_intos(&mut self, actual: usize) -> Result<(), Error> {
        for into in self.intos.iter_mut() {
            into.resize(&mut self.backend, actual)?;
        }
        Ok(())
    }

    /// Only valid after an executed SELECT. See §4.2.
    pub fn fetch(&mut self) -> Result<bool, Error> {
        self.require_state(
            "Executed or Fetching",
            matches!(
                self.state,
                StatementState::Executed | StatementState::Fetching
            ),
        )?;

        let current_size = if self.intos.is_empty() {
            1
        } else {
            Self::common_size(&self.intos, |i| i.size(), "Into")?
        };
        let initial = self.initial_fetch_batch_size.unwrap_or(current_size);
        if current_size > initial {
            return Err(Error::Growth {
                position: 0,
                bound: initial,
                requested: current_size,
            });
        }

        for into in self.intos.iter_mut() {
            into.pre_fetch(&mut self.backend)?;
        }

        let outcome = self.backend.fetch(current_size)?;
        let actual = self.backend.number_of_rows().min(current_size);
        let got_data = match outcome {
            ExecuteOutcome::Success => {
                self.resize_vector_intos(actual)?;
                true
            }
            ExecuteOutcome::NoData => {
                self.resize_vector_intos(actual)?;
                actual > 0
            }
        };

        for into in self.intos.iter_mut() {
            into.post_fetch(&mut self.backend, got_data, true)?;
        }
        for into in self.row_intos.iter_mut() {
            into.post_fetch(&mut self.backend, got_data, true)?;
        }

        self.state = if got_data {
            StatementState::Fetching
        } else {
            StatementState::Exhausted
        };
        Ok(got_data)
    }

    /// Release backend resources. Adapters are cleaned up in reverse order of
    /// registration.
    pub fn cleanup(&mut self) {
        for into in self.intos.iter_mut().rev() {
            into.clean_up(&mut self.backend);
        }
        for into in self.row_intos.iter_mut().rev() {
            into.clean_up(&mut self.backend);
        }
        for use_ in self.uses.iter_mut().rev() {
            use_.clean_up(&mut self.backend);
        }
        self.state = StatementState::Cleaned;
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Tear down this statement's adapters without releasing the backend handle: used by
    /// `exchange::nested::StatementInto` between two output-cursor rows, where the same
    /// backend-native statement handle is about to be re-described and re-bound for a
    /// fresh cursor rather than dropped.
    pub(crate) fn unbind(&mut self) {
        for into in self.intos.iter_mut().rev() {
            into.clean_up(&mut self.backend);
        }
        for into in self.row_intos.iter_mut().rev() {
            into.clean_up(&mut self.backend);
        }
        for use_ in self.uses.iter_mut().rev() {
            use_.clean_up(&mut self.backend);
        }
        self.intos.clear();
        self.row_intos.clear();
        self.uses.clear();
        self.row = None;
        self.described = false;
        self.initial_fetch_batch_size = None;
        self.state = StatementState::Prepared;
    }

    /// Bind this statement's `Into` adapters against a backend handle that is already an
    /// open, server-side cursor (an output-cursor column's nested statement) -- there is no
    /// query text to `prepare`, so this forces the `Prepared` precondition `define_and_bind`
    /// normally gets from `prepare()` and then re-invokes it unchanged. The caller drives
    /// `execute`/`fetch` on the result exactly as it would any other bound statement.
    pub(crate) fn bind_nested(&mut self) -> Result<(), Error> {
        self.state = StatementState::Prepared;
        self.define_and_bind()
    }
}

impl<S: StatementBackend> Drop for Statement<S> {
    fn drop(&mut self) {
        if self.state != StatementState::Cleaned {
            self.cleanup();
        }
    }
}

/// Used by `exchange::stock_into_for_column`; re-exported here since `ColumnProperties`
/// naturally lives alongside the state machine that consumes it.
pub type DescribedColumn = ColumnProperties;
