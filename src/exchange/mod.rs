//! Stock `Into`/`Use` adapters: the generic glue between [`crate::statement::Statement`]'s
//! adapter lists and a backend's [`crate::backend`] traits. Every adapter here performs the
//! indicator-missing / truncation / NULL decision tree exactly once, so backend
//! implementations stay limited to reporting a raw [`crate::backend::CellState`].

mod nested;
mod scalar_into;
mod scalar_use;
mod vector_into;
mod vector_use;
mod row_into;

pub use nested::{NestedAdapters, StatementInto};
pub use scalar_into::ScalarInto;
pub use scalar_use::ScalarUse;
pub use vector_into::VectorInto;
pub use vector_use::VectorUse;
pub(crate) use row_into::stock_into_for_column;
