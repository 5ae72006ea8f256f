//! The dynamic row: a name-indexed, heterogeneous record populated by the describe step of
//! `Statement::execute` (§4.2, step 4) for queries whose result shape is not known at
//! compile time.

use std::collections::HashMap;

use crate::indicator::Indicator;
use crate::types::{ColumnProperties, LogicalType, StockValue};
use crate::conversion::TypeConversion;
use crate::Error;

/// One fetched cell: either the driver's value, or a reason there isn't one.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    raw: Option<StockValue>,
    indicator: Indicator,
}

impl Value {
    pub fn present(value: StockValue) -> Self {
        Value {
            raw: Some(value),
            indicator: Indicator::Ok,
        }
    }

    pub fn truncated(value: StockValue) -> Self {
        Value {
            raw: Some(value),
            indicator: Indicator::Truncated,
        }
    }

    pub fn null() -> Self {
        Value {
            raw: None,
            indicator: Indicator::Null,
        }
    }

    pub fn indicator(&self) -> Indicator {
        self.indicator
    }

    pub fn is_null(&self) -> bool {
        self.raw.is_none()
    }

    /// Narrow to `T`. `None` for a NULL cell, `Some(Err(..))` if the stored `StockValue`
    /// cannot convert to `T`.
    pub fn get<T: TypeConversion>(&self) -> Option<Result<T, Error>> {
        self.raw.as_ref().map(|v| T::from_stock(v))
    }

    /// The untyped stock payload, or `None` for a NULL cell.
    pub fn raw(&self) -> Option<&StockValue> {
        self.raw.as_ref()
    }
}

/// A fetched row: ordered columns, addressable by position or by name.
#[derive(Debug, Clone, Default)]
pub struct Row {
    columns: Vec<ColumnProperties>,
    name_to_index: HashMap<String, usize>,
    values: Vec<Value>,
}

impl Row {
    pub fn new() -> Self {
        Row::default()
    }

    /// Called once, by `Statement::execute`, after the driver has described the result set.
    pub(crate) fn describe(&mut self, columns: Vec<ColumnProperties>) {
        self.name_to_index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        self.values = vec![Value::null(); columns.len()];
        self.columns = columns;
    }

    pub(crate) fn set(&mut self, index: usize, value: Value) {
        self.values[index] = value;
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_properties(&self, index: usize) -> Option<&ColumnProperties> {
        self.columns.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    pub fn at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn by_name(&self, name: &str) -> Option<&Value> {
        self.index_of(name).and_then(|i| self.at(i))
    }

    pub fn logical_type_at(&self, index: usize) -> Option<LogicalType> {
        self.columns.get(index).map(|c| c.logical_type)
    }

    /// A get with no default against a NULL (or missing) column fails, naming the column.
    pub fn get<T: TypeConversion>(&self, name: &str) -> Result<T, Error> {
        let value = self
            .by_name(name)
            .ok_or_else(|| Error::binding(format!("no column named '{name}'")))?;
        match value.get::<T>() {
            Some(result) => result,
            None => Err(Error::binding(format!("column '{name}' is NULL"))),
        }
    }

    /// A get with a default returns the default for a NULL column and does not fail; a
    /// missing column name is still an error.
    pub fn get_opt<T: TypeConversion>(&self, name: &str, default: T) -> Result<T, Error> {
        let value = self
            .by_name(name)
            .ok_or_else(|| Error::binding(format!("no column named '{name}'")))?;
        match value.get::<T>() {
            Some(result) => result,
            None => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogicalType;

    #[test]
    fn describe_then_set_then_lookup_by_name() {
        let mut row = Row::new();
        row.describe(vec![
            ColumnProperties::new("id", LogicalType::Integer),
            ColumnProperties::new("name", LogicalType::String),
        ]);
        row.set(0, Value::present(StockValue::Integer(7)));
        row.set(1, Value::null());

        assert_eq!(row.by_name("id").unwrap().get::<i32>().unwrap().unwrap(), 7);
        assert!(row.by_name("name").unwrap().is_null());
        assert_eq!(row.index_of("nope"), None);
    }

    #[test]
    fn get_fails_naming_the_column_get_opt_falls_back() {
        let mut row = Row::new();
        row.describe(vec![
            ColumnProperties::new("id", LogicalType::Integer),
            ColumnProperties::new("name", LogicalType::String),
        ]);
        row.set(0, Value::present(StockValue::Integer(7)));
        row.set(1, Value::null());

        assert_eq!(row.get::<i32>("id").unwrap(), 7);
        let err = row.get::<String>("name").unwrap_err();
        assert!(matches!(err, Error::Binding(message) if message.contains("name")));
        assert_eq!(
            row.get_opt::<String>("name", "anonymous".to_string()).unwrap(),
            "anonymous"
        );
        assert!(row.get::<i32>("nope").is_err());
    }
}
