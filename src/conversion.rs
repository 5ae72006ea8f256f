//! `TypeConversion<T>`: the mapping between a [`crate::types::StockValue`] and a concrete
//! Rust type a caller binds into an adapter. Every stock scalar/vector adapter is generic
//! over `T: TypeConversion`; a new logical type only needs one impl here to become usable
//! everywhere adapters are constructed.

use crate::types::{LogicalType, StockValue};
use crate::Error;

/// Converts between a native Rust type and the wire-level [`StockValue`] tagged union.
///
/// `stock_type` names which `StockValue` variant a driver should produce; `from_stock`
/// narrows that variant (or any variant convertible to it) down to `Self`; `to_stock` widens
/// `Self` back up for binding as a `Use` parameter.
pub trait TypeConversion: Sized {
    fn stock_type() -> LogicalType;
    fn from_stock(value: &StockValue) -> Result<Self, Error>;
    fn to_stock(&self) -> StockValue;
}

macro_rules! exact_conversion {
    ($ty:ty, $variant:ident, $logical:ident) => {
        impl TypeConversion for $ty {
            fn stock_type() -> LogicalType {
                LogicalType::$logical
            }
            fn from_stock(value: &StockValue) -> Result<Self, Error> {
                match value {
                    StockValue::$variant(v) => Ok(v.clone()),
                    other => Err(Error::Conversion {
                        position: 0,
                        message: format!(
                            "cannot convert {:?} into {}",
                            other.logical_type(),
                            stringify!($ty)
                        ),
                    }),
                }
            }
            fn to_stock(&self) -> StockValue {
                StockValue::$variant(self.clone())
            }
        }
    };
}

exact_conversion!(u8, Char, Char);
exact_conversion!(String, String, String);
exact_conversion!(i16, Short, Short);
exact_conversion!(i32, Integer, Integer);
exact_conversion!(u64, UnsignedLong, UnsignedLong);
exact_conversion!(i64, LongLong, LongLong);
exact_conversion!(f64, Double, Double);
exact_conversion!(chrono::NaiveDateTime, Date, Date);
exact_conversion!(Vec<u8>, Blob, Blob);

impl TypeConversion for i8 {
    fn stock_type() -> LogicalType {
        LogicalType::Short
    }
    fn from_stock(value: &StockValue) -> Result<Self, Error> {
        let short = i16::from_stock(value)?;
        i8::try_from(short).map_err(|_| Error::Conversion {
            position: 0,
            message: format!("value {short} does not fit in i8"),
        })
    }
    fn to_stock(&self) -> StockValue {
        StockValue::Short(*self as i16)
    }
}

impl TypeConversion for i128 {
    fn stock_type() -> LogicalType {
        LogicalType::LongLong
    }
    fn from_stock(value: &StockValue) -> Result<Self, Error> {
        Ok(i64::from_stock(value)? as i128)
    }
    fn to_stock(&self) -> StockValue {
        StockValue::LongLong(*self as i64)
    }
}
