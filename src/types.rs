use chrono::NaiveDateTime;

/// The closed set of user-observable logical column types, plus the exchange-only types
/// (`Blob`, `RowId`, `Statement`) that can appear as an `Into`/`Use` adapter but never as a
/// dynamically described `Row` column. See the Logical Type Surface table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Char,
    String,
    Short,
    Integer,
    UnsignedLong,
    LongLong,
    Double,
    Date,
    Blob,
    RowId,
    Statement,
}

impl LogicalType {
    /// `true` for the subset of logical types a dynamically described `Row` column may
    /// carry (see §3, entity "Column properties"). Nested statements, blobs and row ids are
    /// exchange-only types: they always arrive through an explicitly bound `Into`, never
    /// through dynamic description.
    pub fn is_describable_column_type(self) -> bool {
        matches!(
            self,
            LogicalType::String
                | LogicalType::Date
                | LogicalType::Double
                | LogicalType::Integer
                | LogicalType::UnsignedLong
        )
    }
}

/// The closed tagged union of scalar payloads that stock `Into`/`Use` adapters convert to
/// and from user types. Grounded on the teacher's `AnyColumnBuffer` tagged union, but
/// holding a single scalar rather than a column of them -- `StockValue` is the per-cell
/// payload, vector adapters hold a `Vec` of these (or, for performance, a columnar
/// `Vec<u8>`/`Vec<i64>`/... keyed by the same `LogicalType` tag).
#[derive(Debug, Clone, PartialEq)]
pub enum StockValue {
    Char(u8),
    String(String),
    Short(i16),
    Integer(i32),
    UnsignedLong(u64),
    LongLong(i64),
    Double(f64),
    Date(NaiveDateTime),
    Blob(Vec<u8>),
}

impl StockValue {
    pub fn logical_type(&self) -> LogicalType {
        match self {
            StockValue::Char(_) => LogicalType::Char,
            StockValue::String(_) => LogicalType::String,
            StockValue::Short(_) => LogicalType::Short,
            StockValue::Integer(_) => LogicalType::Integer,
            StockValue::UnsignedLong(_) => LogicalType::UnsignedLong,
            StockValue::LongLong(_) => LogicalType::LongLong,
            StockValue::Double(_) => LogicalType::Double,
            StockValue::Date(_) => LogicalType::Date,
            StockValue::Blob(_) => LogicalType::Blob,
        }
    }
}

/// Column name, logical data type, and optional size/precision/scale/nullability,
/// populated by dynamic row description (see `Statement::execute`, step 4).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProperties {
    pub name: String,
    pub logical_type: LogicalType,
    pub size: Option<usize>,
    pub precision: Option<u16>,
    pub scale: Option<u16>,
    pub nullable: Option<bool>,
}

impl ColumnProperties {
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        ColumnProperties {
            name: name.into(),
            logical_type,
            size: None,
            precision: None,
            scale: None,
            nullable: None,
        }
    }
}
