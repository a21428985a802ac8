//! Extrema and ranking over aggregation buckets.
//!
//! All orderings use a stable sort, so equal keys keep their input
//! order. Fixtures depend on this; do not swap in `sort_unstable`.

use crate::{
    aggregate::Bucket,
    config::RankingConfig,
    types::{RankOrder, SalesMetric},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Minimum and maximum bucket by revenue.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extrema {
    pub min: Option<Bucket>,
    pub max: Option<Bucket>,
}

/// Same selection as [`Extrema`], named for driver/laggard analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopBottom {
    pub top: Option<Bucket>,
    pub bottom: Option<Bucket>,
}

fn compare(a: &Bucket, b: &Bucket, metric: SalesMetric) -> Ordering {
    a.metric(metric).total_cmp(&b.metric(metric))
}

/// Stable in-place sort by `metric`.
pub fn sort_by_metric(entries: &mut [Bucket], metric: SalesMetric, order: RankOrder) {
    match order {
        RankOrder::Asc => entries.sort_by(|a, b| compare(a, b, metric)),
        RankOrder::Desc => entries.sort_by(|a, b| compare(b, a, metric)),
    }
}

/// First and last element of the ascending revenue ordering.
fn ends(entries: &[Bucket]) -> (Option<Bucket>, Option<Bucket>) {
    let mut ordered = entries.to_vec();
    sort_by_metric(&mut ordered, SalesMetric::Revenue, RankOrder::Asc);
    let low = ordered.first().cloned();
    let high = ordered.pop();
    (low, high)
}

pub fn min_max(entries: &[Bucket]) -> Extrema {
    let (min, max) = ends(entries);
    Extrema { min, max }
}

pub fn top_bottom(entries: &[Bucket]) -> TopBottom {
    let (bottom, top) = ends(entries);
    TopBottom { top, bottom }
}

/// Caller-supplied limit: a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LimitInput {
    Number(i64),
    Text(String),
}

/// Validated ranking instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub metric: SalesMetric,
    pub order: RankOrder,
    pub limit: usize,
}

impl Ranking {
    /// Clamp `raw` into the configured range. Missing or non-numeric
    /// input falls back to the default limit.
    pub fn clamp_limit(raw: Option<&LimitInput>, config: &RankingConfig) -> usize {
        let requested = match raw {
            None => None,
            Some(LimitInput::Number(n)) => Some(*n),
            Some(LimitInput::Text(text)) if text.trim().is_empty() => None,
            Some(LimitInput::Text(text)) => match text.trim().parse::<i64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    log::warn!("non-numeric limit '{text}'; using {}", config.default_limit);
                    None
                }
            },
        };
        match requested {
            None => config.default_limit,
            Some(n) => {
                let (lo, hi) = (config.min_limit as i64, config.max_limit as i64);
                n.clamp(lo, hi) as usize
            }
        }
    }

    /// Sorted copy of `entries`, truncated to `limit`.
    pub fn apply(&self, entries: &[Bucket]) -> Vec<Bucket> {
        let mut ranked = entries.to_vec();
        sort_by_metric(&mut ranked, self.metric, self.order);
        ranked.truncate(self.limit);
        ranked
    }
}
