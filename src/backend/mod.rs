//! The backend contract: the fixed set of abstract operations a driver must implement.
//! The core never inspects driver state directly -- every effect flows through these
//! traits. See §4.6 of the design.
//!
//! Two responsibilities are deliberately split across the `Backend` traits and the
//! `exchange` module rather than folded into one giant `postFetch`: a backend's
//! [`IntoTypeBackend::read_cell`] only answers "what raw value (if any) sits in the
//! driver's scratch buffer for this column of the row just fetched", while the
//! indicator-missing / truncation / NULL decision tree described in §4.3 is implemented
//! once, generically, in `exchange::scalar_into` and `exchange::vector_into`. This keeps
//! every backend implementation free of copy-pasted indicator policy.

use crate::indicator::Indicator;
use crate::rewrite::PlaceholderStyle;
use crate::types::{ColumnProperties, LogicalType, StockValue};
use crate::Error;

/// Distinguishes a one-shot query (the *once* builder's final action) from a query meant
/// to be prepared once and executed many times, for backends that treat the two
/// differently (e.g. skip planning overhead for a query that will run exactly once).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareHint {
    OneTimeQuery,
    PreparedReusable,
}

/// The result of `execute`/`fetch`: either rows were retrieved or the command completed
/// (`Success`), or there is nothing more (`NoData`), mirroring the Oracle/PostgreSQL/MySQL/
/// SQLite behaviors described in §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    Success,
    NoData,
}

/// What a backend found in its scratch buffer for one column of the row just fetched.
#[derive(Debug, Clone, PartialEq)]
pub enum CellState {
    Null,
    /// The value is present but wider than the destination buffer's capacity. Carries the
    /// value truncated to that capacity, already converted to a `StockValue`.
    Truncated(StockValue),
    Present(StockValue),
}

/// Per-connection backend state. Owns whatever native handle the driver needs to delimit
/// transactions and allocate statements.
pub trait SessionBackend {
    type Statement: StatementBackend;

    /// Delimit a transaction. A no-op is an acceptable implementation for drivers that
    /// have no explicit transaction handle -- the contract is "whatever the driver
    /// requires to delimit a unit of work", not a literal SQL keyword.
    fn begin(&mut self) -> Result<(), Error>;
    fn commit(&mut self) -> Result<(), Error>;
    fn rollback(&mut self) -> Result<(), Error>;

    /// Acquire driver resources for a new statement.
    fn make_statement_backend(&mut self) -> Result<Self::Statement, Error>;

    /// The placeholder style this backend's driver expects rewritten queries to use.
    fn placeholder_style(&self) -> PlaceholderStyle;

    /// Short, stable name used for diagnostics and backend registry lookups, e.g. `"odbc"`.
    fn name(&self) -> &'static str;
}

/// Per-statement backend state: the driver-native handle plus the operations the
/// statement core (`crate::statement::Statement`) drives it through.
pub trait StatementBackend: Sized {
    type Into: IntoTypeBackend;
    type Use: UseTypeBackend;
    type VectorInto: VectorIntoBackend;
    type VectorUse: VectorUseBackend;

    /// Prepare (or parse) the already-rewritten query text.
    fn prepare(&mut self, query: &str, hint: PrepareHint) -> Result<(), Error>;

    /// Run the statement with `num` requested rows (`0` means no data exchange at all).
    fn execute(&mut self, num: usize) -> Result<ExecuteOutcome, Error>;

    /// Fetch up to `num` additional rows into already-bound buffers.
    fn fetch(&mut self, num: usize) -> Result<ExecuteOutcome, Error>;

    /// Rows materialized by the last `execute`/`fetch` call.
    fn number_of_rows(&self) -> usize;

    /// Wrap `query` as a stored-procedure invocation in driver syntax (e.g. Oracle's
    /// `begin ... end;`, PostgreSQL/MySQL's `select ...`).
    fn rewrite_for_procedure_call(&self, query: &str) -> String;

    /// Prepare the statement for metadata retrieval and return the column count.
    fn prepare_for_describe(&mut self) -> Result<usize, Error>;

    /// Return the column's logical type and server-reported name. `index` is 0-based.
    fn describe_column(&mut self, index: usize) -> Result<ColumnProperties, Error>;

    fn make_into_backend(&mut self, logical_type: LogicalType) -> Result<Self::Into, Error>;
    fn make_use_backend(&mut self, logical_type: LogicalType) -> Result<Self::Use, Error>;
    fn make_vector_into_backend(
        &mut self,
        logical_type: LogicalType,
    ) -> Result<Self::VectorInto, Error>;
    fn make_vector_use_backend(
        &mut self,
        logical_type: LogicalType,
    ) -> Result<Self::VectorUse, Error>;

    /// Hand back the nested backend-native statement handle bound at output position
    /// `position` -- Oracle's `REF CURSOR` idiom generalized to any backend that can
    /// return a statement-shaped column. Backends that never bind a `Statement`-typed
    /// column inherit the default, which errors.
    fn take_nested_statement(&mut self, position: usize) -> Result<Self, Error> {
        let _ = position;
        Err(Error::binding(
            "backend does not support nested statement (output cursor) columns",
        ))
    }
}

/// Backend-side state for a single scalar output position.
pub trait IntoTypeBackend {
    /// Allocate any scratch buffer, inform the driver of the target position and logical
    /// type, advance `*position` and record it.
    fn define_by_pos(&mut self, position: &mut usize, logical_type: LogicalType)
        -> Result<(), Error>;

    /// Hook used by nested-statement support: pre-emptively unbind an inner statement's
    /// adapters before re-describing it. No-op for every other logical type.
    fn pre_fetch(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Inspect the scratch buffer for the row just fetched. Only called when the core
    /// knows a row was actually delivered.
    fn read_cell(&mut self) -> Result<CellState, Error>;

    /// Release the scratch buffer and any driver state. Called exactly once, even on the
    /// error path.
    fn clean_up(&mut self) {}
}

/// Backend-side state for a single scalar input position.
pub trait UseTypeBackend {
    fn bind_by_pos(&mut self, position: &mut usize, logical_type: LogicalType)
        -> Result<(), Error>;
    fn bind_by_name(&mut self, name: &str, logical_type: LogicalType) -> Result<(), Error>;

    /// Convert the user value to wire form (e.g. format a date into text) and set the
    /// driver's indicator field to NULL if `value` is `None`.
    fn pre_use(&mut self, value: Option<&StockValue>) -> Result<(), Error>;

    /// Symmetric conversion for INOUT parameters: read back whatever the driver wrote into
    /// the parameter buffer after execution.
    fn post_use(&mut self, got_data: bool) -> Result<Option<StockValue>, Error> {
        let _ = got_data;
        Ok(None)
    }

    fn clean_up(&mut self) {}
}

/// Backend-side state for a vector (bulk) output position.
pub trait VectorIntoBackend {
    fn define_by_pos(&mut self, position: &mut usize, logical_type: LogicalType)
        -> Result<(), Error>;
    fn pre_fetch(&mut self) -> Result<(), Error> {
        Ok(())
    }
    /// Report and mutate the bound vector's logical size.
    fn size(&self) -> usize;
    fn resize(&mut self, size: usize) -> Result<(), Error>;
    /// Inspect the scratch row `row_index` (0-based, `< size()`).
    fn read_cell(&mut self, row_index: usize) -> Result<CellState, Error>;
    fn clean_up(&mut self) {}
}

/// Backend-side state for a vector (bulk) input position.
pub trait VectorUseBackend {
    fn bind_by_pos(&mut self, position: &mut usize, logical_type: LogicalType)
        -> Result<(), Error>;
    fn bind_by_name(&mut self, name: &str, logical_type: LogicalType) -> Result<(), Error>;
    fn size(&self) -> usize;
    /// Convert row `row_index`'s user value to wire form ahead of `execute`.
    fn pre_use(&mut self, row_index: usize, value: Option<&StockValue>) -> Result<(), Error>;
    fn clean_up(&mut self) {}
}

/// Opaque driver row identifier, usable as a `Use` or `Into` value.
pub trait RowIdBackend {
    fn as_stock_value(&self) -> StockValue;
}

/// Handle to a large binary object.
pub trait BlobBackend {
    fn len(&mut self) -> Result<u64, Error>;
    fn is_empty(&mut self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, Error>;
    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<usize, Error>;
    fn append(&mut self, buf: &[u8]) -> Result<usize, Error>;
    fn trim(&mut self, new_len: u64) -> Result<(), Error>;
}

/// Translates a raw 4-valued `read_cell`/size-aware fetch outcome into the core's
/// [`Indicator`] without performing the indicator-missing decision (callers do that).
pub(crate) fn cell_state_to_indicator(state: &CellState) -> Indicator {
    match state {
        CellState::Null => Indicator::Null,
        CellState::Truncated(_) => Indicator::Truncated,
        CellState::Present(_) => Indicator::Ok,
    }
}
