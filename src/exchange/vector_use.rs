use crate::backend::{StatementBackend, VectorUseBackend};
use crate::conversion::TypeConversion;
use crate::statement::UseAdapter;
use crate::Error;

/// Binds a bulk (vector) input position: one row per element of `values`.
pub struct VectorUse<S: StatementBackend, T> {
    backend: Option<S::VectorUse>,
    name: Option<String>,
    values: Vec<Option<T>>,
}

impl<S: StatementBackend, T: TypeConversion> VectorUse<S, T> {
    pub fn by_position(values: Vec<Option<T>>) -> Self {
        VectorUse {
            backend: None,
            name: None,
            values,
        }
    }

    pub fn by_name(name: impl Into<String>, values: Vec<Option<T>>) -> Self {
        VectorUse {
            backend: None,
            name: Some(name.into()),
            values,
        }
    }
}

impl<S: StatementBackend, T: TypeConversion> UseAdapter<S> for VectorUse<S, T> {
    fn bind(&mut self, backend: &mut S, position: &mut usize) -> Result<(), Error> {
        let logical_type = T::stock_type();
        let mut use_backend = backend.make_vector_use_backend(logical_type)?;
        match &self.name {
            Some(name) => use_backend.bind_by_name(name, logical_type)?,
            None => use_backend.bind_by_pos(position, logical_type)?,
        }
        self.backend = Some(use_backend);
        Ok(())
    }

    fn size(&self) -> usize {
        self.values.len()
    }

    fn pre_use(&mut self, _backend: &mut S) -> Result<(), Error> {
        let use_backend = self
            .backend
            .as_mut()
            .expect("bind must run before pre_use");
        for (row_index, value) in self.values.iter().enumerate() {
            let stock = value.as_ref().map(|v| v.to_stock());
            use_backend.pre_use(row_index, stock.as_ref())?;
        }
        Ok(())
    }

    fn clean_up(&mut self, _backend: &mut S) {
        if let Some(use_backend) = &mut self.backend {
            use_backend.clean_up();
        }
    }
}
