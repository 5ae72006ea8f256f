use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::{CellState, IntoTypeBackend, StatementBackend};
use crate::row::{Row, Value};
use crate::statement::IntoAdapter;
use crate::types::ColumnProperties;
use crate::Error;

/// One column of a dynamically described [`Row`]: writes the fetched cell straight into the
/// row at `column_index` as a tagged [`crate::types::StockValue`], skipping the
/// indicator-missing check that scalar/vector adapters apply -- an absent value in a
/// dynamic row is simply a NULL [`Value`], there is no caller-declared destination type to
/// mismatch.
struct RowColumnInto<S: StatementBackend> {
    backend: Option<S::Into>,
    logical_type: crate::types::LogicalType,
    row: Rc<RefCell<Row>>,
    column_index: usize,
}

impl<S: StatementBackend> IntoAdapter<S> for RowColumnInto<S> {
    fn define(&mut self, backend: &mut S, position: &mut usize) -> Result<(), Error> {
        let mut into = backend.make_into_backend(self.logical_type)?;
        into.define_by_pos(position, self.logical_type)?;
        self.backend = Some(into);
        Ok(())
    }

    fn size(&self) -> usize {
        1
    }

    fn post_fetch(
        &mut self,
        _backend: &mut S,
        got_data: bool,
        _called_from_fetch: bool,
    ) -> Result<(), Error> {
        if !got_data {
            return Ok(());
        }
        let into = self
            .backend
            .as_mut()
            .expect("define must run before post_fetch");
        let cell = into.read_cell()?;
        let value = match cell {
            CellState::Null => Value::null(),
            CellState::Truncated(v) => Value::truncated(v),
            CellState::Present(v) => Value::present(v),
        };
        self.row.borrow_mut().set(self.column_index, value);
        Ok(())
    }

    fn clean_up(&mut self, _backend: &mut S) {
        if let Some(into) = &mut self.backend {
            into.clean_up();
        }
    }
}

/// Construct the `Into` adapter for one described column of a dynamic row. Only logical
/// types for which [`ColumnProperties::logical_type`]'s
/// [`is_describable_column_type`](crate::types::LogicalType::is_describable_column_type) is
/// `true` reach here; the statement core already validated that before calling in.
pub(crate) fn stock_into_for_column<S: StatementBackend>(
    column: &ColumnProperties,
    row: Rc<RefCell<Row>>,
    column_index: usize,
) -> Box<dyn IntoAdapter<S>> {
    Box::new(RowColumnInto {
        backend: None,
        logical_type: column.logical_type,
        row,
        column_index,
    })
}
