use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::backend::{CellState, IntoTypeBackend, StatementBackend};
use crate::conversion::TypeConversion;
use crate::indicator::Indicator;
use crate::statement::IntoAdapter;
use crate::Error;

/// Binds a single output position to `Rc<RefCell<Option<T>>>`, shared with the caller so the
/// value survives after the statement core has moved on to the next row. `indicator`, when
/// supplied, receives the raw fetch outcome; its absence is what turns an unexpected NULL
/// into [`Error::IndicatorMissing`] instead of silently succeeding.
pub struct ScalarInto<S: StatementBackend, T> {
    backend: Option<S::Into>,
    slot: Rc<RefCell<Option<T>>>,
    indicator: Option<Rc<RefCell<Indicator>>>,
    _marker: PhantomData<T>,
}

impl<S: StatementBackend, T: TypeConversion> ScalarInto<S, T> {
    pub fn new(slot: Rc<RefCell<Option<T>>>, indicator: Option<Rc<RefCell<Indicator>>>) -> Self {
        ScalarInto {
            backend: None,
            slot,
            indicator,
            _marker: PhantomData,
        }
    }
}

impl<S: StatementBackend, T: TypeConversion> IntoAdapter<S> for ScalarInto<S, T> {
    fn define(&mut self, backend: &mut S, position: &mut usize) -> Result<(), Error> {
        let logical_type = T::stock_type();
        let mut into = backend.make_into_backend(logical_type)?;
        into.define_by_pos(position, logical_type)?;
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
        called_from_fetch: bool,
    ) -> Result<(), Error> {
        if called_from_fetch && !got_data {
            // Normal EOF: a subsequent fetch just ran out of rows.
            *self.slot.borrow_mut() = None;
            return Ok(());
        }
        if !got_data {
            // No data on the very first fetch (from execute): a destination with no
            // indicator has no way to represent this, which is a programming error.
            *self.slot.borrow_mut() = None;
            return match &self.indicator {
                Some(slot) => {
                    *slot.borrow_mut() = Indicator::NoData;
                    Ok(())
                }
                None => Err(Error::IndicatorMissing(
                    "no data fetched and no indicator defined".to_string(),
                )),
            };
        }
        let into = self
            .backend
            .as_mut()
            .expect("define must run before post_fetch");
        let cell = into.read_cell()?;
        match cell {
            CellState::Null => {
                match &self.indicator {
                    Some(slot) => *slot.borrow_mut() = Indicator::Null,
                    None => {
                        return Err(Error::IndicatorMissing(
                            "Null value fetched and no indicator defined".to_string(),
                        ))
                    }
                }
                *self.slot.borrow_mut() = None;
            }
            CellState::Truncated(value) => {
                match &self.indicator {
                    Some(slot) => *slot.borrow_mut() = Indicator::Truncated,
                    None => {
                        return Err(Error::IndicatorMissing(
                            "Truncated value fetched and no indicator defined".to_string(),
                        ))
                    }
                }
                *self.slot.borrow_mut() = Some(T::from_stock(&value)?);
            }
            CellState::Present(value) => {
                *self.slot.borrow_mut() = Some(T::from_stock(&value)?);
                if let Some(slot) = &self.indicator {
                    *slot.borrow_mut() = Indicator::Ok;
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
