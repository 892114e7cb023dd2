//! Store query abstraction.
//!
//! The server never talks to a concrete store. It composes predicates
//! through the [`SyncQuery`] trait and lets the store adapter translate
//! them. [`MemoryQuery`] is the reference implementation, used by the
//! test suites and usable as a small in-process store.

use incsync_protocol::Record;
use serde_json::Value;
use std::cmp::Ordering;

/// Comparison operator of a single predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Strictly less than.
    Lt,
    /// Equal to.
    Eq,
    /// Greater than or equal to.
    Ge,
    /// Strictly greater than.
    Gt,
}

/// A single field comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Field the predicate applies to.
    pub field: String,
    /// Comparison operator.
    pub comparison: Comparison,
    /// Value to compare against, in the store's native representation.
    pub value: Value,
}

impl Condition {
    /// Creates a condition.
    pub fn new(field: impl Into<String>, comparison: Comparison, value: Value) -> Self {
        Self {
            field: field.into(),
            comparison,
            value,
        }
    }
}

/// A query under construction against the record store.
///
/// Constraints AND-compose; `constrain_any` adds one AND-composed
/// disjunction whose branches are conjunctions of conditions. The
/// match count must be taken on a clone before ordering or limiting,
/// since aggregation may invalidate builder state in real stores.
pub trait SyncQuery {
    /// AND-composes a single condition onto the query.
    fn constrain(&mut self, condition: Condition);

    /// AND-composes a disjunction of condition groups onto the query.
    ///
    /// A row matches the disjunction when all conditions of at least
    /// one branch hold.
    fn constrain_any(&mut self, branches: Vec<Vec<Condition>>);

    /// Appends an ascending ordering key.
    fn order_by(&mut self, field: &str);

    /// Caps the number of rows returned by `rows`.
    fn take(&mut self, limit: u64);

    /// Counts all rows matching the current constraints, ignoring any
    /// ordering or limit.
    fn count(&mut self) -> u64;

    /// Executes the query and returns the matching rows.
    fn rows(&mut self) -> Vec<Record>;

    /// Clones the query in its current state.
    fn clone_query(&self) -> Box<dyn SyncQuery>;
}

/// In-memory [`SyncQuery`] over a snapshot of records.
#[derive(Debug, Clone, Default)]
pub struct MemoryQuery {
    records: Vec<Record>,
    filters: Vec<Vec<Vec<Condition>>>,
    order: Vec<String>,
    limit: Option<u64>,
}

impl MemoryQuery {
    /// Creates a query over the given records.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|disjunction| {
            disjunction.iter().any(|branch| {
                branch
                    .iter()
                    .all(|condition| condition_holds(record, condition))
            })
        })
    }
}

fn condition_holds(record: &Record, condition: &Condition) -> bool {
    let Some(actual) = record.get(&condition.field) else {
        return false;
    };
    let Some(ordering) = compare_values(actual, &condition.value) else {
        return false;
    };
    match condition.comparison {
        Comparison::Lt => ordering == Ordering::Less,
        Comparison::Eq => ordering == Ordering::Equal,
        Comparison::Ge => ordering != Ordering::Less,
        Comparison::Gt => ordering == Ordering::Greater,
    }
}

/// Compares two JSON values of the same kind.
///
/// Numbers compare numerically; strings lexicographically, which is
/// correct for `YYYY-MM-DD HH:MM:SS` datetime columns. Mixed or
/// non-scalar kinds are incomparable.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => {
            let (x, y) = (a.as_f64()?, b.as_f64()?);
            x.partial_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

impl SyncQuery for MemoryQuery {
    fn constrain(&mut self, condition: Condition) {
        self.filters.push(vec![vec![condition]]);
    }

    fn constrain_any(&mut self, branches: Vec<Vec<Condition>>) {
        self.filters.push(branches);
    }

    fn order_by(&mut self, field: &str) {
        self.order.push(field.to_string());
    }

    fn take(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    fn count(&mut self) -> u64 {
        self.records.iter().filter(|r| self.matches(r)).count() as u64
    }

    fn rows(&mut self) -> Vec<Record> {
        let mut rows: Vec<Record> = self
            .records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();

        if !self.order.is_empty() {
            rows.sort_by(|a, b| {
                for key in &self.order {
                    let ordering = match (a.get(key), b.get(key)) {
                        (Some(x), Some(y)) => {
                            compare_values(x, y).unwrap_or(Ordering::Equal)
                        }
                        (Some(_), None) => Ordering::Greater,
                        (None, Some(_)) => Ordering::Less,
                        (None, None) => Ordering::Equal,
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        if let Some(limit) = self.limit {
            rows.truncate(limit as usize);
        }
        rows
    }

    fn clone_query(&self) -> Box<dyn SyncQuery> {
        Box::new(self.clone())
    }
}
