//! `Values`: the name-indexed conversion surface behind `TypeConversion`'s by-Values shape,
//! plus the by-position/stream-like shape that reads the same [`Row`] by integer index.
//!
//! A `Values` is built two ways: `Values::from_row` wraps a fetched `Row`'s columns by name
//! for the `from` direction of a by-Values conversion; `Values::new` plus `insert`/
//! `insert_null` builds one by hand for the `to` direction, which the core explodes into a
//! named list of `Use` adapters (see [`Values::into_use_adapters`]).

use std::collections::HashMap;

use crate::backend::{StatementBackend, UseTypeBackend};
use crate::conversion::TypeConversion;
use crate::row::Row;
use crate::statement::UseAdapter;
use crate::types::StockValue;
use crate::Error;

/// A named, fetched-or-hand-built record: the `Values` entity `TypeConversion`'s by-Values
/// shape reads from and builds for binding.
#[derive(Debug, Clone, Default)]
pub struct Values {
    order: Vec<String>,
    entries: HashMap<String, Option<StockValue>>,
}

impl Values {
    pub fn new() -> Self {
        Values::default()
    }

    /// Wraps a fetched `Row`'s columns by name, for the by-Values `from` direction.
    pub fn from_row(row: &Row) -> Self {
        let mut values = Values::new();
        for index in 0..row.column_count() {
            let name = row
                .column_properties(index)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            let raw = row.at(index).and_then(|v| v.raw().cloned());
            values.set_entry(name, raw);
        }
        values
    }

    fn set_entry(&mut self, name: String, value: Option<StockValue>) {
        if !self.entries.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.entries.insert(name, value);
    }

    pub fn insert<T: TypeConversion>(&mut self, name: impl Into<String>, value: T) {
        self.set_entry(name.into(), Some(value.to_stock()));
    }

    pub fn insert_null(&mut self, name: impl Into<String>) {
        self.set_entry(name.into(), None);
    }

    /// A get with no default against a NULL (or missing) column fails, naming the column.
    pub fn get<T: TypeConversion>(&self, name: &str) -> Result<T, Error> {
        match self.entries.get(name) {
            Some(Some(value)) => T::from_stock(value),
            Some(None) => Err(Error::binding(format!("column '{name}' is NULL"))),
            None => Err(Error::binding(format!("no column named '{name}'"))),
        }
    }

    /// A get with a default returns the default for a NULL column and does not fail; a
    /// missing column name is still an error.
    pub fn get_opt<T: TypeConversion>(&self, name: &str, default: T) -> Result<T, Error> {
        match self.entries.get(name) {
            Some(Some(value)) => T::from_stock(value),
            Some(None) => Ok(default),
            None => Err(Error::binding(format!("no column named '{name}'"))),
        }
    }

    /// Explode into one `Use` adapter per entry, bound by name in insertion order -- how the
    /// by-Values `to` direction feeds a statement's parameter list.
    pub(crate) fn into_use_adapters<S: StatementBackend>(self) -> Vec<Box<dyn UseAdapter<S>>> {
        let Values { order, mut entries } = self;
        order
            .into_iter()
            .map(|name| {
                let value = entries.remove(&name).flatten();
                Box::new(StockUse::<S>::by_name(name, value)) as Box<dyn UseAdapter<S>>
            })
            .collect()
    }
}

/// Reads `T` from `row` at `*index`, then advances `*index` by one -- the by-position /
/// stream-like `TypeConversion` shape, letting values be chained out of a `Row` without
/// naming columns. Blanket-implemented for every by-stock-type `TypeConversion`.
pub trait FromRowPosition: Sized {
    fn from_position(row: &Row, index: &mut usize) -> Result<Self, Error>;
}

impl<T: TypeConversion> FromRowPosition for T {
    fn from_position(row: &Row, index: &mut usize) -> Result<Self, Error> {
        let value = row
            .at(*index)
            .ok_or_else(|| Error::binding(format!("no column at position {index}")))?;
        let result = match value.raw() {
            Some(stock) => T::from_stock(stock),
            None => Err(Error::binding(format!(
                "column at position {index} is NULL"
            ))),
        };
        *index += 1;
        result
    }
}

/// By-Values (name-based) `TypeConversion` shape: reads named columns out of a fetched
/// [`Values`], including default-if-null behavior via [`Values::get_opt`].
pub trait FromValues: Sized {
    fn from_values(values: &Values) -> Result<Self, Error>;
}

/// The symmetric `to` direction: explodes `Self` into a named [`Values`] record, bound by
/// name as `Use` adapters.
pub trait ToValues {
    fn to_values(&self) -> Values;
}

/// Binds a single named input position from an already-tagged [`StockValue`], bypassing
/// `TypeConversion<T>` -- this is how [`Values::into_use_adapters`] explodes a record whose
/// entries do not all share a single Rust type.
struct StockUse<S: StatementBackend> {
    backend: Option<S::Use>,
    name: String,
    value: Option<StockValue>,
}

impl<S: StatementBackend> StockUse<S> {
    fn by_name(name: impl Into<String>, value: Option<StockValue>) -> Self {
        StockUse {
            backend: None,
            name: name.into(),
            value,
        }
    }
}

impl<S: StatementBackend> UseAdapter<S> for StockUse<S> {
    fn bind(&mut self, backend: &mut S, _position: &mut usize) -> Result<(), Error> {
        let logical_type = self
            .value
            .as_ref()
            .map(StockValue::logical_type)
            .unwrap_or(crate::types::LogicalType::String);
        let mut use_backend = backend.make_use_backend(logical_type)?;
        use_backend.bind_by_name(&self.name, logical_type)?;
        self.backend = Some(use_backend);
        Ok(())
    }

    fn size(&self) -> usize {
        1
    }

    fn pre_use(&mut self, _backend: &mut S) -> Result<(), Error> {
        self.backend
            .as_mut()
            .expect("bind must run before pre_use")
            .pre_use(self.value.as_ref())
    }

    fn post_use(&mut self, _backend: &mut S, got_data: bool) -> Result<(), Error> {
        if let Some(use_backend) = &mut self.backend {
            if let Some(value) = use_backend.post_use(got_data)? {
                self.value = Some(value);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnProperties, LogicalType};

    #[test]
    fn from_row_get_returns_error_naming_null_column() {
        let mut row = Row::new();
        row.describe(vec![
            ColumnProperties::new("id", LogicalType::Integer),
            ColumnProperties::new("nickname", LogicalType::String),
        ]);
        row.set(0, crate::row::Value::present(StockValue::Integer(7)));
        row.set(1, crate::row::Value::null());

        let values = Values::from_row(&row);
        assert_eq!(values.get::<i32>("id").unwrap(), 7);
        let err = values.get::<String>("nickname").unwrap_err();
        assert!(matches!(err, Error::Binding(message) if message.contains("nickname")));
    }

    #[test]
    fn get_opt_returns_default_for_null_without_failing() {
        let mut row = Row::new();
        row.describe(vec![ColumnProperties::new("nickname", LogicalType::String)]);
        row.set(0, crate::row::Value::null());

        let values = Values::from_row(&row);
        let nickname = values
            .get_opt::<String>("nickname", "anonymous".to_string())
            .unwrap();
        assert_eq!(nickname, "anonymous");
    }

    #[test]
    fn missing_column_name_is_always_an_error() {
        let values = Values::new();
        assert!(values.get::<i32>("nope").is_err());
        assert!(values.get_opt::<i32>("nope", 0).is_err());
    }

    #[test]
    fn from_position_advances_the_cursor() {
        let mut row = Row::new();
        row.describe(vec![
            ColumnProperties::new("a", LogicalType::Integer),
            ColumnProperties::new("b", LogicalType::String),
        ]);
        row.set(0, crate::row::Value::present(StockValue::Integer(1)));
        row.set(1, crate::row::Value::present(StockValue::String("x".to_string())));

        let mut index = 0;
        let a = i32::from_position(&row, &mut index).unwrap();
        let b = String::from_position(&row, &mut index).unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, "x");
        assert_eq!(index, 2);
    }

    struct Customer {
        id: i32,
        nickname: String,
    }

    impl FromValues for Customer {
        fn from_values(values: &Values) -> Result<Self, Error> {
            Ok(Customer {
                id: values.get("id")?,
                nickname: values.get_opt("nickname", "anonymous".to_string())?,
            })
        }
    }

    impl ToValues for Customer {
        fn to_values(&self) -> Values {
            let mut values = Values::new();
            values.insert("id", self.id);
            values.insert("nickname", self.nickname.clone());
            values
        }
    }

    #[test]
    fn from_values_and_to_values_round_trip_through_a_row() {
        let mut row = Row::new();
        row.describe(vec![
            ColumnProperties::new("id", LogicalType::Integer),
            ColumnProperties::new("nickname", LogicalType::String),
        ]);
        row.set(0, crate::row::Value::present(StockValue::Integer(3)));
        row.set(1, crate::row::Value::null());

        let fetched = Customer::from_values(&Values::from_row(&row)).unwrap();
        assert_eq!(fetched.id, 3);
        assert_eq!(fetched.nickname, "anonymous");

        let adapters = fetched.to_values().into_use_adapters::<crate::testing::FakeStatement>();
        assert_eq!(adapters.len(), 2);
    }
}
