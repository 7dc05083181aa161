//! Filter conditions and the bounded search-query batcher.
//!
//! # Design
//! The search endpoint takes a single `query` parameter that is capped
//! server-side (512 bytes for Freshservice). `QueryBatcher` packs an ordered
//! list of `FilterCondition`s into OR-joined, double-quoted query strings,
//! greedily and in input order, never reordering or dropping a condition.
//!
//! # Contract
//! The batcher *drains a queue*: `batch` closes a batch as soon as the next
//! condition does not fit and hands back the unconsumed suffix, which the
//! caller feeds back in (or lets `batches` do it). There is no
//! "append one condition and report whether it fit" variant.
//!
//! # Known limitation
//! Text values are wrapped in single quotes verbatim. A value that itself
//! contains `'` or `"` produces a query the server will misparse; nothing
//! is escaped.

use std::fmt;

use tracing::debug;

/// Server-side cap on the length of the search `query` parameter.
pub const DEFAULT_BATCH_LIMIT: usize = 512;

/// Quote pair wrapped around every non-empty batch.
const WRAP_LEN: usize = 2;

/// The right-hand side of a filter condition.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

/// Numbers and booleans render unquoted, text in single quotes. Floats never
/// use exponent notation: `1e21` renders as `1000000000000000000000`.
impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Integer(n) => write!(f, "{n}"),
            FilterValue::Float(x) => write!(f, "{x}"),
            FilterValue::Boolean(b) => write!(f, "{b}"),
            FilterValue::Text(s) => write!(f, "'{s}'"),
        }
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FilterValue {
                fn from(n: $t) -> Self {
                    FilterValue::Integer(i64::from(n))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for FilterValue {
    fn from(x: f32) -> Self {
        FilterValue::Float(f64::from(x))
    }
}

impl From<f64> for FilterValue {
    fn from(x: f64) -> Self {
        FilterValue::Float(x)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Boolean(b)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

/// A single `field: value` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    field: String,
    value: FilterValue,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    /// Render as `<field>: <formatted-value>`.
    pub fn clause(&self) -> String {
        format!("{}: {}", self.field, self.value)
    }
}

/// One server-ready search query: OR-joined clauses wrapped in double quotes.
///
/// The empty batch is the empty string and is only produced for empty input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBatch(String);

impl QueryBatch {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for QueryBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Greedy in-order packer of filter conditions into bounded query strings.
///
/// Lengths are UTF-8 byte lengths, which also bounds the character count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryBatcher {
    limit: usize,
}

impl Default for QueryBatcher {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_LIMIT)
    }
}

impl QueryBatcher {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Pack as many leading conditions as fit into one batch.
    ///
    /// The first condition is always accepted, even when it alone exceeds
    /// the limit; every later one is appended only while the quoted result
    /// stays within the limit. Scanning stops at the first condition that
    /// does not fit. Returns the batch and the unconsumed suffix.
    pub fn batch<'a>(
        &self,
        conditions: &'a [FilterCondition],
    ) -> (QueryBatch, &'a [FilterCondition]) {
        let Some((first, rest)) = conditions.split_first() else {
            return (QueryBatch::default(), conditions);
        };

        let budget = self.limit.saturating_sub(WRAP_LEN);
        let mut acc = first.clause();
        let mut consumed = 1;

        for condition in rest {
            let clause = format!(" OR {}", condition.clause());
            if acc.len() + clause.len() > budget {
                break;
            }
            acc.push_str(&clause);
            consumed += 1;
        }

        let batch = QueryBatch(format!("\"{acc}\""));
        debug!(
            conditions = consumed,
            len = batch.len(),
            limit = self.limit,
            "closed query batch"
        );
        (batch, &conditions[consumed..])
    }

    /// Iterate over the batches covering all of `conditions`, in order.
    pub fn batches<'a>(&self, conditions: &'a [FilterCondition]) -> Batches<'a> {
        Batches {
            batcher: *self,
            remaining: conditions,
        }
    }
}

/// Iterator returned by [`QueryBatcher::batches`].
#[derive(Debug, Clone)]
pub struct Batches<'a> {
    batcher: QueryBatcher,
    remaining: &'a [FilterCondition],
}

impl Iterator for Batches<'_> {
    type Item = QueryBatch;

    fn next(&mut self) -> Option<QueryBatch> {
        if self.remaining.is_empty() {
            return None;
        }
        let (batch, rest) = self.batcher.batch(self.remaining);
        self.remaining = rest;
        Some(batch)
    }
}
