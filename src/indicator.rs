/// Four-valued tag signaling the outcome of a single scalar or vector-cell fetch.
///
/// This is the exchange-level indicator described by the data model: it is what a caller
/// observes through a supplied indicator pointer, and is entirely distinct from any
/// backend-internal length/null encoding (e.g. a raw ODBC length indicator). Backends
/// translate their own representation into this one at the `Backend` trait boundary; the
/// core never leaks a backend-internal indicator type across that boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// A value is present and was copied into the user's destination without truncation.
    Ok,
    /// The driver reported the column value absent (SQL NULL) for this row.
    Null,
    /// The value is present but longer than the destination buffer; the destination holds
    /// a prefix of it. Scalar string destinations only -- truncation of fixed width numeric
    /// or date values is always a conversion error instead.
    Truncated,
    /// No row (or no cell within a row) was available to fetch at all. This is distinct
    /// from `Null`: it is a property of the fetch operation, not of a fetched value.
    NoData,
}

impl Indicator {
    /// `true` for every indicator value other than `Ok`.
    pub fn is_exceptional(self) -> bool {
        !matches!(self, Indicator::Ok)
    }
}
