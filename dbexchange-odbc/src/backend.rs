//! `dbexchange`'s `Backend` trait family implemented against the safe `odbc-api` crate.
//!
//! `odbc-api` fetches one row at a time through a borrowed [`odbc_api::CursorRow`] rather
//! than pre-bound scratch buffers the core can poll lazily from each `Into` adapter, so this
//! backend drains every bound column into a shared, owned buffer (`FetchedRow`) as soon as
//! `execute`/`fetch` gets a row, and each `Into`'s `read_cell` just reads back out of it. This
//! mirrors how `crate::testing::FakeBackend` shares cursor state with its adapters on the
//! core side.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;

use odbc_api::buffers::TextRowSet;
use odbc_api::parameter::InputParameter;
use odbc_api::{Connection, Cursor, Environment, Nullable, Prepared};

use dbexchange::backend::{
    CellState, ExecuteOutcome, IntoTypeBackend, PrepareHint, RowIdBackend, SessionBackend,
    StatementBackend, UseTypeBackend, VectorIntoBackend, VectorUseBackend,
};
use dbexchange::rewrite::PlaceholderStyle;
use dbexchange::types::{ColumnProperties, LogicalType, StockValue};
use dbexchange::Error;

use crate::error::{connection_error, execution_error, preparation_error};

fn environment() -> &'static Environment {
    static ENV: OnceLock<Environment> = OnceLock::new();
    ENV.get_or_init(|| Environment::new().expect("failed to create ODBC environment"))
}

/// Connect using a driver-native connection string (passed through unchanged; ODBC defines
/// its own `DSN=...;UID=...;PWD=...` grammar, so this backend does not apply
/// `dbexchange::connection_string`'s MySQL-style parser).
pub fn connect(connection_string: &str) -> Result<dbexchange::Session<OdbcSessionBackend>, Error> {
    let connection = environment()
        .connect_with_connection_string(connection_string, Default::default())
        .map_err(connection_error)?;
    Ok(dbexchange::Session::new(OdbcSessionBackend { connection }))
}

pub struct OdbcSessionBackend {
    connection: Connection<'static>,
}

impl SessionBackend for OdbcSessionBackend {
    type Statement = OdbcStatementBackend;

    fn begin(&mut self) -> Result<(), Error> {
        self.connection
            .set_autocommit(false)
            .map_err(connection_error)
    }

    fn commit(&mut self) -> Result<(), Error> {
        self.connection.commit().map_err(execution_error)?;
        self.connection
            .set_autocommit(true)
            .map_err(connection_error)
    }

    fn rollback(&mut self) -> Result<(), Error> {
        self.connection.rollback().map_err(execution_error)?;
        self.connection
            .set_autocommit(true)
            .map_err(connection_error)
    }

    fn make_statement_backend(&mut self) -> Result<Self::Statement, Error> {
        Ok(OdbcStatementBackend {
            connection: &self.connection as *const Connection<'static>,
            phase: Phase::Unprepared,
            column_types: Vec::new(),
            params: Rc::new(RefCell::new(Vec::new())),
            row: Rc::new(RefCell::new(FetchedRow::default())),
            row_count: 0,
        })
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::QuestionMark
    }

    fn name(&self) -> &'static str {
        "odbc"
    }
}

#[derive(Default)]
struct FetchedRow {
    cells: Vec<CellState>,
}

enum Phase {
    Unprepared,
    Prepared(Prepared<odbc_api::handles::StatementImpl<'static>>),
}

/// Per-statement ODBC state. Holds a raw pointer back to the owning connection instead of a
/// borrow because `dbexchange::backend::SessionBackend::make_statement_backend` cannot
/// express "a statement that borrows its session" within the core's trait signatures; the
/// statement is never used past the session's lifetime in practice (the core ties a
/// `Statement`'s lifetime to the `Session` that allocated it by never exposing a way to
/// outlive it), but the compiler cannot see that, hence the explicit pointer plus the safety
/// argument documented on `with_connection`.
type ParamSlots = Rc<RefCell<Vec<Option<Box<dyn InputParameter>>>>>;

pub struct OdbcStatementBackend {
    connection: *const Connection<'static>,
    phase: Phase,
    column_types: Vec<LogicalType>,
    params: ParamSlots,
    row: Rc<RefCell<FetchedRow>>,
    row_count: usize,
}

impl OdbcStatementBackend {
    /// # Safety
    /// Valid as long as the `Session` that allocated this statement, and therefore its
    /// `OdbcSessionBackend`, is still alive -- guaranteed by `dbexchange::session::Session`
    /// never handing out a `Statement` with a lifetime exceeding its own borrow in the
    /// builder API (`builder::OnceBuilder`/`PrepareBuilder`), and by callers using
    /// `Session::alloc_statement` are expected to keep the session alive for as long as the
    /// statement is in use, exactly as `odbc-api`'s own `Prepared<'_>` requires of its
    /// `Connection`.
    fn connection(&self) -> &Connection<'static> {
        unsafe { &*self.connection }
    }

    fn fetch_bound_columns(&mut self, cursor: &mut impl Cursor) -> Result<bool, Error> {
        let mut row = match cursor.next_row().map_err(execution_error)? {
            Some(row) => row,
            None => return Ok(false),
        };
        let mut cells = Vec::with_capacity(self.column_types.len());
        for (index, logical_type) in self.column_types.iter().enumerate() {
            let col_number = (index + 1) as u16;
            let cell = match logical_type {
                LogicalType::Integer => {
                    let mut target = Nullable::<i32>::null();
                    row.get_data(col_number, &mut target).map_err(execution_error)?;
                    match target.into_opt() {
                        Some(v) => CellState::Present(StockValue::Integer(v)),
                        None => CellState::Null,
                    }
                }
                LogicalType::LongLong => {
                    let mut target = Nullable::<i64>::null();
                    row.get_data(col_number, &mut target).map_err(execution_error)?;
                    match target.into_opt() {
                        Some(v) => CellState::Present(StockValue::LongLong(v)),
                        None => CellState::Null,
                    }
                }
                LogicalType::Double => {
                    let mut target = Nullable::<f64>::null();
                    row.get_data(col_number, &mut target).map_err(execution_error)?;
                    match target.into_opt() {
                        Some(v) => CellState::Present(StockValue::Double(v)),
                        None => CellState::Null,
                    }
                }
                LogicalType::String | LogicalType::Date => {
                    let mut buf = Vec::new();
                    let not_null = row.get_text(col_number, &mut buf).map_err(execution_error)?;
                    if !not_null {
                        CellState::Null
                    } else {
                        let text = String::from_utf8_lossy(&buf).into_owned();
                        match logical_type {
                            LogicalType::Date => {
                                let parsed = chrono::NaiveDateTime::parse_from_str(
                                    &text,
                                    "%Y-%m-%d %H:%M:%S",
                                )
                                .or_else(|_| {
                                    chrono::NaiveDate::parse_from_str(&text, "%Y-%m-%d")
                                        .map(|d| d.and_hms_opt(0, 0, 0).unwrap())
                                })
                                .map_err(|e| Error::Conversion {
                                    position: col_number as usize,
                                    message: e.to_string(),
                                })?;
                                CellState::Present(StockValue::Date(parsed))
                            }
                            _ => CellState::Present(StockValue::String(text)),
                        }
                    }
                }
                LogicalType::Blob => {
                    let mut buf = Vec::new();
                    let not_null = row.get_binary(col_number, &mut buf).map_err(execution_error)?;
                    if not_null {
                        CellState::Present(StockValue::Blob(buf))
                    } else {
                        CellState::Null
                    }
                }
                other => {
                    return Err(Error::binding(format!(
                        "column {col_number} has a logical type ({other:?}) this backend cannot fetch directly"
                    )))
                }
            };
            cells.push(cell);
        }
        self.row.borrow_mut().cells = cells;
        Ok(true)
    }
}

impl StatementBackend for OdbcStatementBackend {
    type Into = OdbcInto;
    type Use = OdbcUse;
    type VectorInto = OdbcVectorInto;
    type VectorUse = OdbcVectorUse;

    fn prepare(&mut self, query: &str, _hint: PrepareHint) -> Result<(), Error> {
        log::debug!("dbexchange-odbc: preparing query: {query}");
        let prepared = self
            .connection()
            .prepare(query)
            .map_err(|e| preparation_error(query, e))?;
        self.phase = Phase::Prepared(prepared);
        Ok(())
    }

    fn execute(&mut self, num: usize) -> Result<ExecuteOutcome, Error> {
        log::trace!("dbexchange-odbc: executing with requested row count {num}");
        if num == 0 {
            self.row_count = 0;
            return Ok(ExecuteOutcome::NoData);
        }
        let prepared = match &mut self.phase {
            Phase::Prepared(p) => p,
            Phase::Unprepared => {
                return Err(Error::binding("execute called before prepare".to_string()))
            }
        };
        let built: Vec<Box<dyn InputParameter>> = self
            .params
            .borrow_mut()
            .iter_mut()
            .map(|slot| {
                slot.take()
                    .expect("pre_use must bind every position before execute")
            })
            .collect();
        let maybe_cursor = prepared
            .execute(&built[..])
            .map_err(execution_error)?;
        match maybe_cursor {
            Some(mut cursor) => {
                let got_row = self.fetch_bound_columns(&mut cursor)?;
                self.row_count = if got_row { 1 } else { 0 };
                Ok(if got_row {
                    ExecuteOutcome::Success
                } else {
                    ExecuteOutcome::NoData
                })
            }
            None => {
                self.row_count = 0;
                Ok(ExecuteOutcome::NoData)
            }
        }
    }

    fn fetch(&mut self, _num: usize) -> Result<ExecuteOutcome, Error> {
        Err(Error::binding(
            "this backend re-executes rather than maintaining an open cursor across calls; \
             use Statement::execute repeatedly instead of fetch"
                .to_string(),
        ))
    }

    fn number_of_rows(&self) -> usize {
        self.row_count
    }

    fn rewrite_for_procedure_call(&self, query: &str) -> String {
        format!("{{call {query}}}")
    }

    fn prepare_for_describe(&mut self) -> Result<usize, Error> {
        let prepared = match &mut self.phase {
            Phase::Prepared(p) => p,
            Phase::Unprepared => {
                return Err(Error::binding(
                    "prepare_for_describe called before prepare".to_string(),
                ))
            }
        };
        use odbc_api::ResultSetMetadata;
        prepared
            .num_result_cols()
            .map(|n| n as usize)
            .map_err(execution_error)
    }

    fn describe_column(&mut self, index: usize) -> Result<ColumnProperties, Error> {
        let prepared = match &mut self.phase {
            Phase::Prepared(p) => p,
            Phase::Unprepared => {
                return Err(Error::binding(
                    "describe_column called before prepare".to_string(),
                ))
            }
        };
        use odbc_api::ResultSetMetadata;
        let col_number = (index + 1) as u16;
        let description = prepared
            .column_description(col_number)
            .map_err(execution_error)?;
        let name = description.name_to_string().unwrap_or_default();
        let logical_type = match description.data_type {
            odbc_api::DataType::Integer | odbc_api::DataType::SmallInt => LogicalType::Integer,
            odbc_api::DataType::BigInt => LogicalType::LongLong,
            odbc_api::DataType::Float { .. }
            | odbc_api::DataType::Double
            | odbc_api::DataType::Real
            | odbc_api::DataType::Decimal { .. }
            | odbc_api::DataType::Numeric { .. } => LogicalType::Double,
            odbc_api::DataType::Date | odbc_api::DataType::Timestamp { .. } => LogicalType::Date,
            _ => LogicalType::String,
        };
        let mut properties = ColumnProperties::new(name, logical_type);
        properties.nullable = Some(!matches!(
            description.nullability,
            odbc_api::Nullability::NoNulls
        ));
        Ok(properties)
    }

    fn make_into_backend(&mut self, logical_type: LogicalType) -> Result<Self::Into, Error> {
        self.column_types.push(logical_type);
        Ok(OdbcInto {
            row: Rc::clone(&self.row),
            position: 0,
        })
    }

    fn make_use_backend(&mut self, logical_type: LogicalType) -> Result<Self::Use, Error> {
        Ok(OdbcUse {
            logical_type,
            position: 0,
            params: Rc::clone(&self.params),
        })
    }

    fn make_vector_into_backend(
        &mut self,
        logical_type: LogicalType,
    ) -> Result<Self::VectorInto, Error> {
        let _ = logical_type;
        Err(Error::binding(
            "this backend does not implement bulk (vector) fetch; see VectorInto non-goal in DESIGN.md"
                .to_string(),
        ))
    }

    fn make_vector_use_backend(
        &mut self,
        logical_type: LogicalType,
    ) -> Result<Self::VectorUse, Error> {
        let _ = logical_type;
        Err(Error::binding(
            "this backend does not implement bulk (vector) use; see VectorUse non-goal in DESIGN.md"
                .to_string(),
        ))
    }
}

pub struct OdbcInto {
    row: Rc<RefCell<FetchedRow>>,
    position: usize,
}

impl IntoTypeBackend for OdbcInto {
    fn define_by_pos(
        &mut self,
        position: &mut usize,
        _logical_type: LogicalType,
    ) -> Result<(), Error> {
        self.position = *position;
        *position += 1;
        Ok(())
    }

    fn read_cell(&mut self) -> Result<CellState, Error> {
        let row = self.row.borrow();
        row.cells
            .get(self.position - 1)
            .cloned()
            .ok_or_else(|| Error::binding("column position out of range for fetched row".to_string()))
    }
}

pub struct OdbcUse {
    logical_type: LogicalType,
    position: usize,
    params: ParamSlots,
}

impl UseTypeBackend for OdbcUse {
    fn bind_by_pos(&mut self, position: &mut usize, _logical_type: LogicalType) -> Result<(), Error> {
        self.position = *position;
        let mut slots = self.params.borrow_mut();
        if slots.len() < self.position {
            slots.resize_with(self.position, || None);
        }
        *position += 1;
        Ok(())
    }

    fn bind_by_name(&mut self, _name: &str, _logical_type: LogicalType) -> Result<(), Error> {
        Err(Error::binding(
            "this backend's driver does not support bind-by-name, rewrite named parameters \
             to positional form first"
                .to_string(),
        ))
    }

    fn pre_use(&mut self, value: Option<&StockValue>) -> Result<(), Error> {
        let boxed: Box<dyn InputParameter> = stock_value_to_parameter(self.logical_type, value)?;
        self.params.borrow_mut()[self.position - 1] = Some(boxed);
        Ok(())
    }
}

fn stock_value_to_parameter(
    logical_type: LogicalType,
    value: Option<&StockValue>,
) -> Result<Box<dyn InputParameter>, Error> {
    use odbc_api::IntoParameter;
    let param: Box<dyn InputParameter> = match (logical_type, value) {
        (_, None) => Box::new(odbc_api::Nullable::<i32>::null()),
        (LogicalType::Integer, Some(StockValue::Integer(v))) => Box::new(odbc_api::Nullable::new(*v)),
        (LogicalType::LongLong, Some(StockValue::LongLong(v))) => {
            Box::new(odbc_api::Nullable::new(*v))
        }
        (LogicalType::Double, Some(StockValue::Double(v))) => Box::new(odbc_api::Nullable::new(*v)),
        (LogicalType::String, Some(StockValue::String(v))) => {
            Box::new(v.clone().into_parameter())
        }
        (LogicalType::Date, Some(StockValue::Date(v))) => {
            Box::new(v.format("%Y-%m-%d %H:%M:%S").to_string().into_parameter())
        }
        (LogicalType::Blob, Some(StockValue::Blob(v))) => Box::new(v.clone()),
        (expected, Some(actual)) => {
            return Err(Error::TypeMismatch {
                column_type: actual.logical_type(),
                requested: expected,
            })
        }
    };
    Ok(param)
}

/// Bulk (vector) adapters are not implemented by this backend -- see
/// `make_vector_into_backend`/`make_vector_use_backend` above -- but the statement core
/// still needs concrete, nameable types to satisfy `StatementBackend`'s associated types.
pub struct OdbcVectorInto {
    _rows: RefCell<TextRowSet>,
}

impl VectorIntoBackend for OdbcVectorInto {
    fn define_by_pos(&mut self, _position: &mut usize, _logical_type: LogicalType) -> Result<(), Error> {
        unreachable!("OdbcVectorInto is never constructed, see make_vector_into_backend")
    }
    fn size(&self) -> usize {
        0
    }
    fn resize(&mut self, _size: usize) -> Result<(), Error> {
        Ok(())
    }
    fn read_cell(&mut self, _row_index: usize) -> Result<CellState, Error> {
        unreachable!("OdbcVectorInto is never constructed, see make_vector_into_backend")
    }
}

pub struct OdbcVectorUse;

impl VectorUseBackend for OdbcVectorUse {
    fn bind_by_pos(&mut self, _position: &mut usize, _logical_type: LogicalType) -> Result<(), Error> {
        unreachable!("OdbcVectorUse is never constructed, see make_vector_use_backend")
    }
    fn bind_by_name(&mut self, _name: &str, _logical_type: LogicalType) -> Result<(), Error> {
        unreachable!("OdbcVectorUse is never constructed, see make_vector_use_backend")
    }
    fn size(&self) -> usize {
        0
    }
    fn pre_use(&mut self, _row_index: usize, _value: Option<&StockValue>) -> Result<(), Error> {
        unreachable!("OdbcVectorUse is never constructed, see make_vector_use_backend")
    }
}

pub struct OdbcRowId(pub StockValue);

impl RowIdBackend for OdbcRowId {
    fn as_stock_value(&self) -> StockValue {
        self.0.clone()
    }
}

