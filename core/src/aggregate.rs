//! Aggregation engine: group rows by a dimension tuple and derive metrics.
//!
//! Buckets come back in first-seen order of their key in the input.
//! Consumers that care about ordering (extrema, ranking) re-sort with a
//! stable sort, so ties resolve by that first-seen order.

use crate::{
    store::SalesFact,
    types::{Dimension, SalesMetric},
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Round to 2 decimal places for currency and percentage output.
/// Exact halves go to the even neighbour (248.125 -> 248.12).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// `numerator / denominator` as a percentage; 0.0 on a zero denominator.
pub fn pct(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    round2(numerator / denominator * 100.0)
}

/// Revenue per unit. Zero units count as one so the result stays finite.
pub fn avg_price(revenue: i64, units: i64) -> f64 {
    round2(revenue as f64 / units.max(1) as f64)
}

/// A metric value in its natural numeric type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
}

/// Summed/derived result for one unique combination of dimension values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub key: BTreeMap<Dimension, String>,
    pub revenue: i64,
    pub units: i64,
    pub avg_price: f64,
}

impl Bucket {
    pub fn label(&self, dimension: Dimension) -> Option<&str> {
        self.key.get(&dimension).map(String::as_str)
    }

    /// Metric as f64, for ordering.
    pub fn metric(&self, metric: SalesMetric) -> f64 {
        match metric {
            SalesMetric::Revenue => self.revenue as f64,
            SalesMetric::Units => self.units as f64,
            SalesMetric::AvgPrice => self.avg_price,
        }
    }

    pub fn metric_value(&self, metric: SalesMetric) -> MetricValue {
        match metric {
            SalesMetric::Revenue => MetricValue::Int(self.revenue),
            SalesMetric::Units => MetricValue::Int(self.units),
            SalesMetric::AvgPrice => MetricValue::Float(self.avg_price),
        }
    }
}

/// Group `rows` by `dims` and sum revenue/units per key.
/// Empty input gives an empty list.
pub fn aggregate<'a, I>(rows: I, dims: &[Dimension]) -> Vec<Bucket>
where
    I: IntoIterator<Item = &'a SalesFact>,
{
    let mut index: HashMap<Vec<&'a str>, usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for row in rows {
        let tuple: Vec<&'a str> = dims.iter().map(|d| row.label(*d)).collect();
        let slot = *index.entry(tuple).or_insert_with(|| {
            buckets.push(Bucket {
                key: dims.iter().map(|d| (*d, row.label(*d).to_string())).collect(),
                revenue: 0,
                units: 0,
                avg_price: 0.0,
            });
            buckets.len() - 1
        });
        buckets[slot].revenue += row.revenue;
        buckets[slot].units += row.units;
    }

    for bucket in &mut buckets {
        bucket.avg_price = avg_price(bucket.revenue, bucket.units);
    }
    buckets
}

/// Whole-scope totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub rows: usize,
    pub revenue: i64,
    pub units: i64,
    pub avg_price: f64,
}

pub fn summarize<'a, I>(rows: I) -> Summary
where
    I: IntoIterator<Item = &'a SalesFact>,
{
    let (count, revenue, units) = rows
        .into_iter()
        .fold((0usize, 0i64, 0i64), |(n, rev, u), r| (n + 1, rev + r.revenue, u + r.units));
    Summary {
        rows: count,
        revenue,
        units,
        avg_price: avg_price(revenue, units),
    }
}
