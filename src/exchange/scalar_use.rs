use crate::backend::{StatementBackend, UseTypeBackend};
use crate::conversion::TypeConversion;
use crate::statement::UseAdapter;
use crate::Error;

/// Binds a single input position. `value` is `None` for a NULL parameter.
pub struct ScalarUse<S: StatementBackend, T> {
    backend: Option<S::Use>,
    name: Option<String>,
    value: Option<T>,
}

impl<S: StatementBackend, T: TypeConversion> ScalarUse<S, T> {
    pub fn by_position(value: Option<T>) -> Self {
        ScalarUse {
            backend: None,
            name: None,
            value,
        }
    }

    pub fn by_name(name: impl Into<String>, value: Option<T>) -> Self {
        ScalarUse {
            backend: None,
            name: Some(name.into()),
            value,
        }
    }

    pub fn set(&mut self, value: Option<T>) {
        self.value = value;
    }

    /// The current value: the one bound by `by_position`/`by_name`/`set` until `execute`
    /// runs, then whatever the driver wrote back for an INOUT parameter (see `post_use`).
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

impl<S: StatementBackend, T: TypeConversion> UseAdapter<S> for ScalarUse<S, T> {
    fn bind(&mut self, backend: &mut S, position: &mut usize) -> Result<(), Error> {
        let logical_type = T::stock_type();
        let mut use_backend = backend.make_use_backend(logical_type)?;
        match &self.name {
            Some(name) => use_backend.bind_by_name(name, logical_type)?,
            None => use_backend.bind_by_pos(position, logical_type)?,
        }
        self.backend = Some(use_backend);
        Ok(())
    }

    fn size(&self) -> usize {
        1
    }

    fn pre_use(&mut self, _backend: &mut S) -> Result<(), Error> {
        let stock = self.value.as_ref().map(|v| v.to_stock());
        self.backend
            .as_mut()
            .expect("bind must run before pre_use")
            .pre_use(stock.as_ref())
    }

    fn post_use(&mut self, _backend: &mut S, got_data: bool) -> Result<(), Error> {
        if let Some(use_backend) = &mut self.backend {
            if let Some(value) = use_backend.post_use(got_data)? {
                self.value = Some(T::from_stock(&value)?);
            }
        }
        Ok(())
    }

    fn clean_up(&mut self, _backend: &mut S) {
        if let Some(use_backend) = &mut self.backend {
            use_backend.clean_up();
        }
    }
}
