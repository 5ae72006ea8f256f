//! Opaque driver row identifiers (Oracle ROWID, PostgreSQL OID, ...), usable wherever a
//! [`crate::conversion::TypeConversion`] is accepted even though their wire representation
//! is driver-specific.

use crate::types::{LogicalType, StockValue};
use crate::Error;
use crate::conversion::TypeConversion;

/// A driver row identifier, carried verbatim as whichever [`StockValue`] variant the
/// backend's [`crate::backend::RowIdBackend::as_stock_value`] produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RowId(StockValue);

impl RowId {
    pub fn from_backend(value: StockValue) -> Self {
        RowId(value)
    }

    pub fn as_stock_value(&self) -> &StockValue {
        &self.0
    }
}

impl TypeConversion for RowId {
    fn stock_type() -> LogicalType {
        LogicalType::RowId
    }

    fn from_stock(value: &StockValue) -> Result<Self, Error> {
        Ok(RowId(value.clone()))
    }

    fn to_stock(&self) -> StockValue {
        self.0.clone()
    }
}
