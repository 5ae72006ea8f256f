//! `FakeBackend`: an in-memory [`crate::backend::SessionBackend`] implementation used by
//! this crate's own unit tests to drive [`crate::statement::Statement`] without a live
//! database. Not part of the public driver contract; exported only under `#[cfg(test)]`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::{
    CellState, ExecuteOutcome, IntoTypeBackend, PrepareHint, RowIdBackend, SessionBackend,
    StatementBackend, UseTypeBackend, VectorIntoBackend, VectorUseBackend,
};
use crate::rewrite::PlaceholderStyle;
use crate::types::{ColumnProperties, LogicalType, StockValue};
use crate::Error;

/// One canned cell of a [`FakeBackend`] table: present, NULL, or present-but-truncated
/// (mirrors the three outcomes `read_cell` can report, see `backend::CellState`).
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Value(StockValue),
    Truncated(StockValue),
}

impl Cell {
    pub fn some(value: StockValue) -> Self {
        Cell::Value(value)
    }
}

impl From<Option<StockValue>> for Cell {
    fn from(value: Option<StockValue>) -> Self {
        match value {
            Some(v) => Cell::Value(v),
            None => Cell::Null,
        }
    }
}

#[derive(Default)]
struct FakeCursor {
    rows: Vec<Vec<Cell>>,
    next_row: usize,
    delivered: Vec<usize>,
}

/// A canned table: `rows[i][j]` is column `j` (0-based) of row `i`.
pub struct FakeBackend {
    columns: Vec<ColumnProperties>,
    cursor: Rc<RefCell<FakeCursor>>,
    last_query: String,
    pub recorded_uses: Rc<RefCell<Vec<Option<StockValue>>>>,
    /// One canned nested cursor table, handed out by `take_nested_statement` regardless of
    /// which output position asked for it -- enough to exercise the output-cursor
    /// mechanism without modeling more than one nested shape per test.
    nested: Option<(Vec<ColumnProperties>, Vec<Vec<Cell>>)>,
    /// What every bound `Use`'s `post_use` echoes back, simulating a driver that writes a
    /// modified value into an INOUT stored-procedure parameter after execution.
    post_use_value: Rc<RefCell<Option<StockValue>>>,
}

impl FakeBackend {
    pub fn new(columns: Vec<ColumnProperties>, rows: Vec<Vec<Cell>>) -> Self {
        FakeBackend {
            columns,
            cursor: Rc::new(RefCell::new(FakeCursor {
                rows,
                next_row: 0,
                delivered: Vec::new(),
            })),
            last_query: String::new(),
            recorded_uses: Rc::new(RefCell::new(Vec::new())),
            nested: None,
            post_use_value: Rc::new(RefCell::new(None)),
        }
    }

    /// Arm this backend to hand back `columns`/`rows` as a nested statement from any
    /// output-cursor column a bound statement defines.
    pub fn with_nested(mut self, columns: Vec<ColumnProperties>, rows: Vec<Vec<Cell>>) -> Self {
        self.nested = Some((columns, rows));
        self
    }

    /// Arm this backend so every bound `Use`'s `post_use` reports `value` as written back
    /// by the driver, simulating an INOUT stored-procedure parameter.
    pub fn with_post_use_value(self, value: StockValue) -> Self {
        *self.post_use_value.borrow_mut() = Some(value);
        self
    }
}

impl SessionBackend for FakeBackend {
    type Statement = FakeStatement;

    fn begin(&mut self) -> Result<(), Error> {
        Ok(())
    }
    fn commit(&mut self) -> Result<(), Error> {
        Ok(())
    }
    fn rollback(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn make_statement_backend(&mut self) -> Result<Self::Statement, Error> {
        Ok(FakeStatement {
            columns: self.columns.clone(),
            cursor: Rc::clone(&self.cursor),
            recorded_uses: Rc::clone(&self.recorded_uses),
            nested: self.nested.clone(),
            post_use_value: Rc::clone(&self.post_use_value),
        })
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::QuestionMark
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

pub struct FakeStatement {
    columns: Vec<ColumnProperties>,
    cursor: Rc<RefCell<FakeCursor>>,
    recorded_uses: Rc<RefCell<Vec<Option<StockValue>>>>,
    nested: Option<(Vec<ColumnProperties>, Vec<Vec<Cell>>)>,
    post_use_value: Rc<RefCell<Option<StockValue>>>,
}

impl FakeStatement {
    fn deliver(&mut self, num: usize) -> ExecuteOutcome {
        let mut cursor = self.cursor.borrow_mut();
        cursor.delivered.clear();
        let remaining = cursor.rows.len().saturating_sub(cursor.next_row);
        let take = remaining.min(num.max(1));
        for _ in 0..take {
            cursor.delivered.push(cursor.next_row);
            cursor.next_row += 1;
        }
        if cursor.delivered.is_empty() {
            ExecuteOutcome::NoData
        } else {
            ExecuteOutcome::Success
        }
    }
}

impl StatementBackend for FakeStatement {
    type Into = FakeInto;
    type Use = FakeUse;
    type VectorInto = FakeVectorInto;
    type VectorUse = FakeVectorUse;

    fn prepare(&mut self, _query: &str, _hint: PrepareHint) -> Result<(), Error> {
        Ok(())
    }

    fn execute(&mut self, num: usize) -> Result<ExecuteOutcome, Error> {
        if num == 0 {
            self.cursor.borrow_mut().delivered.clear();
            return Ok(ExecuteOutcome::NoData);
        }
        Ok(self.deliver(num))
    }

    fn fetch(&mut self, num: usize) -> Result<ExecuteOutcome, Error> {
        Ok(self.deliver(num))
    }

    fn number_of_rows(&self) -> usize {
        self.cursor.borrow().delivered.len()
    }

    fn rewrite_for_procedure_call(&self, query: &str) -> String {
        query.to_string()
    }

    fn prepare_for_describe(&mut self) -> Result<usize, Error> {
        Ok(self.columns.len())
    }

    fn describe_column(&mut self, index: usize) -> Result<ColumnProperties, Error> {
        self.columns
            .get(index)
            .cloned()
            .ok_or_else(|| Error::binding(format!("no column at index {index}")))
    }

    fn make_into_backend(&mut self, logical_type: LogicalType) -> Result<Self::Into, Error> {
        Ok(FakeInto {
            cursor: Rc::clone(&self.cursor),
            position: 0,
            logical_type,
        })
    }

    fn make_use_backend(&mut self, logical_type: LogicalType) -> Result<Self::Use, Error> {
        Ok(FakeUse {
            recorded: Rc::clone(&self.recorded_uses),
            logical_type,
            post_use_value: Rc::clone(&self.post_use_value),
        })
    }

    fn make_vector_into_backend(
        &mut self,
        logical_type: LogicalType,
    ) -> Result<Self::VectorInto, Error> {
        Ok(FakeVectorInto {
            cursor: Rc::clone(&self.cursor),
            position: 0,
            logical_type,
            size: 0,
        })
    }

    fn make_vector_use_backend(
        &mut self,
        logical_type: LogicalType,
    ) -> Result<Self::VectorUse, Error> {
        Ok(FakeVectorUse {
            recorded: Rc::clone(&self.recorded_uses),
            logical_type,
            size: 0,
        })
    }

    fn take_nested_statement(&mut self, _position: usize) -> Result<Self, Error> {
        let (columns, rows) = self
            .nested
            .clone()
            .ok_or_else(|| Error::binding("this FakeBackend was not armed with a nested table"))?;
        Ok(FakeStatement {
            columns,
            cursor: Rc::new(RefCell::new(FakeCursor {
                rows,
                next_row: 0,
                delivered: Vec::new(),
            })),
            recorded_uses: Rc::new(RefCell::new(Vec::new())),
            nested: None,
            post_use_value: Rc::new(RefCell::new(None)),
        })
    }
}

pub struct FakeInto {
    cursor: Rc<RefCell<FakeCursor>>,
    position: usize,
    #[allow(dead_code)]
    logical_type: LogicalType,
}

impl IntoTypeBackend for FakeInto {
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
        let cursor = self.cursor.borrow();
        let row_index = cursor.delivered[0];
        let cell = cursor.rows[row_index][self.position - 1].clone();
        Ok(match cell {
            Cell::Value(value) => CellState::Present(value),
            Cell::Null => CellState::Null,
            Cell::Truncated(value) => CellState::Truncated(value),
        })
    }
}

pub struct FakeUse {
    recorded: Rc<RefCell<Vec<Option<StockValue>>>>,
    #[allow(dead_code)]
    logical_type: LogicalType,
    post_use_value: Rc<RefCell<Option<StockValue>>>,
}

impl UseTypeBackend for FakeUse {
    fn bind_by_pos(
        &mut self,
        position: &mut usize,
        _logical_type: LogicalType,
    ) -> Result<(), Error> {
        *position += 1;
        Ok(())
    }

    fn bind_by_name(&mut self, _name: &str, _logical_type: LogicalType) -> Result<(), Error> {
        Ok(())
    }

    fn pre_use(&mut self, value: Option<&StockValue>) -> Result<(), Error> {
        self.recorded.borrow_mut().push(value.cloned());
        Ok(())
    }

    fn post_use(&mut self, got_data: bool) -> Result<Option<StockValue>, Error> {
        if !got_data {
            return Ok(None);
        }
        Ok(self.post_use_value.borrow().clone())
    }
}

pub struct FakeVectorInto {
    cursor: Rc<RefCell<FakeCursor>>,
    position: usize,
    #[allow(dead_code)]
    logical_type: LogicalType,
    size: usize,
}

impl VectorIntoBackend for FakeVectorInto {
    fn define_by_pos(
        &mut self,
        position: &mut usize,
        _logical_type: LogicalType,
    ) -> Result<(), Error> {
        self.position = *position;
        *position += 1;
        Ok(())
    }

    fn size(&self) -> usize {
        self.size
    }

    fn resize(&mut self, size: usize) -> Result<(), Error> {
        self.size = size;
        Ok(())
    }

    fn read_cell(&mut self, row_index: usize) -> Result<CellState, Error> {
        let cursor = self.cursor.borrow();
        let absolute = cursor.delivered[row_index];
        let cell = cursor.rows[absolute][self.position - 1].clone();
        Ok(match cell {
            Cell::Value(value) => CellState::Present(value),
            Cell::Null => CellState::Null,
            Cell::Truncated(value) => CellState::Truncated(value),
        })
    }
}

pub struct FakeVectorUse {
    recorded: Rc<RefCell<Vec<Option<StockValue>>>>,
    #[allow(dead_code)]
    logical_type: LogicalType,
    size: usize,
}

impl VectorUseBackend for FakeVectorUse {
    fn bind_by_pos(
        &mut self,
        position: &mut usize,
        _logical_type: LogicalType,
    ) -> Result<(), Error> {
        *position += 1;
        Ok(())
    }

    fn bind_by_name(&mut self, _name: &str, _logical_type: LogicalType) -> Result<(), Error> {
        Ok(())
    }

    fn size(&self) -> usize {
        self.size
    }

    fn pre_use(&mut self, row_index: usize, value: Option<&StockValue>) -> Result<(), Error> {
        if row_index >= self.size {
            self.size = row_index + 1;
        }
        self.recorded.borrow_mut().push(value.cloned());
        Ok(())
    }
}

pub struct FakeRowId(pub StockValue);

impl RowIdBackend for FakeRowId {
    fn as_stock_value(&self) -> StockValue {
        self.0.clone()
    }
}
