use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::backend::{CellState, StatementBackend, VectorIntoBackend};
use crate::conversion::TypeConversion;
use crate::indicator::Indicator;
use crate::statement::IntoAdapter;
use crate::Error;

/// Binds a bulk (vector) output position: one driver-side buffer shared across up to
/// `capacity` rows, exposed to the caller as `Rc<RefCell<Vec<Option<T>>>>`.
pub struct VectorInto<S: StatementBackend, T> {
    backend: Option<S::VectorInto>,
    slots: Rc<RefCell<Vec<Option<T>>>>,
    indicators: Option<Rc<RefCell<Vec<Indicator>>>>,
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<S: StatementBackend, T: TypeConversion> VectorInto<S, T> {
    pub fn new(
        capacity: usize,
        slots: Rc<RefCell<Vec<Option<T>>>>,
        indicators: Option<Rc<RefCell<Vec<Indicator>>>>,
    ) -> Self {
        VectorInto {
            backend: None,
            slots,
            indicators,
            capacity,
            _marker: PhantomData,
        }
    }
}

impl<S: StatementBackend, T: TypeConversion> IntoAdapter<S> for VectorInto<S, T> {
    fn define(&mut self, backend: &mut S, position: &mut usize) -> Result<(), Error> {
        let logical_type = T::stock_type();
        let mut into = backend.make_vector_into_backend(logical_type)?;
        into.define_by_pos(position, logical_type)?;
        into.resize(self.capacity)?;
        self.backend = Some(into);
        Ok(())
    }

    fn size(&self) -> usize {
        self.backend.as_ref().map_or(self.capacity, |b| b.size())
    }

    fn resize(&mut self, _backend: &mut S, size: usize) -> Result<(), Error> {
        if let Some(into) = &mut self.backend {
            into.resize(size)?;
        }
        self.slots.borrow_mut().resize_with(size, || None);
        if let Some(indicators) = &self.indicators {
            indicators.borrow_mut().resize(size, Indicator::Null);
        }
        Ok(())
    }

    fn pre_fetch(&mut self, _backend: &mut S) -> Result<(), Error> {
        if let Some(into) = &mut self.backend {
            into.pre_fetch()?;
        }
        Ok(())
    }

    fn post_fetch(
        &mut self,
        _backend: &mut S,
        got_data: bool,
        _called_from_fetch: bool,
    ) -> Result<(), Error> {
        if !got_data {
            self.slots.borrow_mut().clear();
            if let Some(indicators) = &self.indicators {
                indicators.borrow_mut().clear();
            }
            return Ok(());
        }
        let into = self
            .backend
            .as_mut()
            .expect("define must run before post_fetch");
        let rows = into.size();
        let mut slots = self.slots.borrow_mut();
        slots.resize_with(rows, || None);
        let mut indicator_buf = self.indicators.as_ref().map(|i| i.borrow_mut());
        if let Some(indicators) = &mut indicator_buf {
            indicators.resize(rows, Indicator::Null);
        }
        for row_index in 0..rows {
            let cell = into.read_cell(row_index)?;
            let indicator = crate::backend::cell_state_to_indicator(&cell);
            if let Some(indicators) = &mut indicator_buf {
                indicators[row_index] = indicator;
            }
            match cell {
                CellState::Null => {
                    if self.indicators.is_none() {
                        return Err(Error::IndicatorMissing(format!(
                            "NULL fetched into row {row_index} of a vector destination with no indicator"
                        )));
                    }
                    slots[row_index] = None;
                }
                CellState::Truncated(value) | CellState::Present(value) => {
                    slots[row_index] = Some(T::from_stock(&value)?);
                }
            }
        }
        Ok(())
    }

    fn clean_up(&mut self, _backend: &mut S) {
        if let Some(into) = &mut self.backend {
            into.clean_up();
        }
    }
}
