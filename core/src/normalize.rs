//! Input normalization: loosely typed caller strings to canonical tokens.
//!
//! RULE: Every public query entry point runs its inputs through here
//! before touching the store. Three outcomes are kept distinct:
//!   - absent (None / blank)   → `Ok(None)`, i.e. unconstrained
//!   - valid                   → `Ok(Some(token))`
//!   - supplied but invalid    → `Err(QueryError)` listing valid choices
//!
//! List-valued inputs (dimensions, metrics, comparison modes) never fail:
//! unknown tokens are dropped and an empty result falls back to a
//! documented default list.

use crate::{
    error::{QueryError, QueryResult},
    store::{FactStore, SalesFact},
    types::{
        CompareTo, Dimension, KpiComparison, KpiMetric, Quarter, RankOrder, Region, SalesMetric,
        Subclass,
    },
};
use serde::Serialize;

pub const DEFAULT_DIMENSIONS: [Dimension; 1] = [Dimension::Subclass];
pub const DEFAULT_SALES_METRICS: [SalesMetric; 3] = SalesMetric::ALL;
/// Used when a KPI metric list was supplied but nothing in it was valid.
pub const FALLBACK_KPI_METRICS: [KpiMetric; 4] = [
    KpiMetric::Revenue,
    KpiMetric::GrossMarginPct,
    KpiMetric::OperatingMarginPct,
    KpiMetric::Fcf,
];
pub const DEFAULT_KPI_COMPARISONS: [KpiComparison; 2] = [KpiComparison::Qoq, KpiComparison::Peer];

/// Trimmed input, or None when absent or blank.
fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Split a comma-separated list, dropping blank entries.
pub fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Scalar filters ────────────────────────────────────────────────

/// Canonicalize a quarter token: `Q1`..`Q4` plus the `1`, `QTR1`,
/// `QUARTER1` alias family. Case and inner spaces are ignored.
pub fn quarter_token(raw: &str) -> Option<Quarter> {
    let cleaned: String = raw
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| *c != ' ')
        .collect();
    let digit = cleaned
        .strip_prefix("QUARTER")
        .or_else(|| cleaned.strip_prefix("QTR"))
        .or_else(|| cleaned.strip_prefix('Q'))
        .unwrap_or(&cleaned);
    match digit {
        "1" => Some(Quarter::Q1),
        "2" => Some(Quarter::Q2),
        "3" => Some(Quarter::Q3),
        "4" => Some(Quarter::Q4),
        _ => None,
    }
}

pub fn normalize_quarter(raw: Option<&str>) -> QueryResult<Option<Quarter>> {
    let Some(value) = present(raw) else {
        return Ok(None);
    };
    quarter_token(value)
        .map(Some)
        .ok_or_else(|| QueryError::UnsupportedQuarter {
            value: value.to_string(),
            available: Quarter::ALL.iter().map(|q| q.as_str().to_string()).collect(),
        })
}

pub fn normalize_subclass(raw: Option<&str>) -> QueryResult<Option<Subclass>> {
    let Some(value) = present(raw) else {
        return Ok(None);
    };
    Subclass::ALL
        .into_iter()
        .find(|s| s.as_str().eq_ignore_ascii_case(value))
        .map(Some)
        .ok_or_else(|| unsupported_filter(Dimension::Subclass, value, Subclass::ALL.map(|s| s.as_str())))
}

pub fn normalize_region(raw: Option<&str>) -> QueryResult<Option<Region>> {
    let Some(value) = present(raw) else {
        return Ok(None);
    };
    let upper = value.to_uppercase();
    Region::ALL
        .into_iter()
        .find(|r| r.as_str() == upper)
        .map(Some)
        .ok_or_else(|| unsupported_filter(Dimension::Region, value, Region::ALL.map(|r| r.as_str())))
}

pub fn normalize_sku(store: &FactStore, raw: Option<&str>) -> QueryResult<Option<String>> {
    let Some(value) = present(raw) else {
        return Ok(None);
    };
    let upper = value.to_uppercase();
    if store.has_sku(&upper) {
        Ok(Some(upper))
    } else {
        Err(QueryError::UnsupportedFilter {
            dimension: Dimension::Sku,
            value: value.to_string(),
            available: store.distinct_values(Dimension::Sku),
        })
    }
}

fn unsupported_filter<const N: usize>(
    dimension: Dimension,
    value: &str,
    choices: [&str; N],
) -> QueryError {
    let mut available: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
    available.sort();
    QueryError::UnsupportedFilter {
        dimension,
        value: value.to_string(),
        available,
    }
}

/// Trim/uppercase a ticker; valid only if the store knows it.
pub fn normalize_ticker(store: &FactStore, raw: &str) -> QueryResult<String> {
    let cleaned = raw.trim().to_uppercase();
    let tickers = store.tickers();
    if tickers.contains(&cleaned) {
        Ok(cleaned)
    } else {
        Err(QueryError::UnsupportedTicker {
            value: raw.to_string(),
            available: tickers,
        })
    }
}

/// Canonical `YYYYQn` period from the store's fixed period set.
pub fn normalize_period(store: &FactStore, raw: &str) -> QueryResult<String> {
    let cleaned: String = raw
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| *c != ' ')
        .collect();
    if store.periods().contains(&cleaned) {
        Ok(cleaned)
    } else {
        let mut available = store.periods().to_vec();
        available.sort();
        Err(QueryError::UnsupportedPeriod {
            value: raw.to_string(),
            available,
        })
    }
}

// ── Sales filter set ──────────────────────────────────────────────

/// Canonical, validated sales filters. `None` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesFilters {
    pub quarter: Option<Quarter>,
    pub subclass: Option<Subclass>,
    pub sku: Option<String>,
    pub region: Option<Region>,
}

impl SalesFilters {
    pub fn normalize(
        store: &FactStore,
        quarter: Option<&str>,
        subclass: Option<&str>,
        sku: Option<&str>,
        region: Option<&str>,
    ) -> QueryResult<Self> {
        Ok(Self {
            quarter: normalize_quarter(quarter)?,
            subclass: normalize_subclass(subclass)?,
            sku: normalize_sku(store, sku)?,
            region: normalize_region(region)?,
        })
    }

    pub fn matches(&self, row: &SalesFact) -> bool {
        row.in_quarter(self.quarter)
            && row.in_subclass(self.subclass)
            && row.in_region(self.region)
            && self.sku.as_deref().is_none_or(|sku| row.sku == sku)
    }

    /// The same filters with the quarter swapped out.
    pub fn with_quarter(&self, quarter: Quarter) -> Self {
        Self {
            quarter: Some(quarter),
            ..self.clone()
        }
    }
}

// ── List-valued inputs ────────────────────────────────────────────

fn tokens<T: PartialEq>(raw: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Vec<T> {
    let mut out = Vec::new();
    for token in present(raw).map(parse_csv).unwrap_or_default() {
        if let Some(parsed) = parse(&token.to_lowercase()) {
            if !out.contains(&parsed) {
                out.push(parsed);
            }
        }
    }
    out
}

/// Group-by dimensions in caller order; never empty.
pub fn normalize_dimensions(raw: Option<&str>) -> Vec<Dimension> {
    let dims = tokens(raw, Dimension::from_token);
    if dims.is_empty() {
        DEFAULT_DIMENSIONS.to_vec()
    } else {
        dims
    }
}

/// Projected sales metrics in caller order; never empty.
pub fn normalize_sales_metrics(raw: Option<&str>) -> Vec<SalesMetric> {
    let metrics = tokens(raw, SalesMetric::from_token);
    if metrics.is_empty() {
        DEFAULT_SALES_METRICS.to_vec()
    } else {
        metrics
    }
}

/// KPI metrics. Absent means all of them; a supplied list with no
/// valid token falls back to [`FALLBACK_KPI_METRICS`].
pub fn normalize_kpi_metrics(raw: Option<&str>) -> Vec<KpiMetric> {
    if present(raw).is_none() {
        return KpiMetric::ALL.to_vec();
    }
    let metrics = tokens(raw, KpiMetric::from_token);
    if metrics.is_empty() {
        log::warn!("no valid KPI metric in {raw:?}; using fallback list");
        FALLBACK_KPI_METRICS.to_vec()
    } else {
        metrics
    }
}

pub fn normalize_kpi_comparisons(raw: Option<&str>) -> Vec<KpiComparison> {
    let modes = tokens(raw, KpiComparison::from_token);
    if modes.is_empty() {
        DEFAULT_KPI_COMPARISONS.to_vec()
    } else {
        modes
    }
}

// ── Permissive enums ──────────────────────────────────────────────

/// Unrecognized comparison modes map to `CompareTo::None`.
pub fn normalize_compare_to(raw: Option<&str>) -> CompareTo {
    let Some(value) = present(raw) else {
        return CompareTo::None;
    };
    match value.to_lowercase().as_str() {
        "previous_period" | "previous" | "prev" | "pop" | "qoq" => CompareTo::PreviousPeriod,
        "none" => CompareTo::None,
        other => {
            log::warn!("unknown compare_to '{other}'; running without comparison");
            CompareTo::None
        }
    }
}

/// Unrecognized orders map to descending (top-N).
pub fn normalize_rank_order(raw: Option<&str>) -> RankOrder {
    let Some(value) = present(raw) else {
        return RankOrder::Desc;
    };
    match value.to_lowercase().as_str() {
        "asc" | "ascending" | "bottom" => RankOrder::Asc,
        "desc" | "descending" | "top" => RankOrder::Desc,
        other => {
            log::warn!("unknown rank order '{other}'; using desc");
            RankOrder::Desc
        }
    }
}

/// Unrecognized ranking metrics map to revenue.
pub fn normalize_rank_metric(raw: Option<&str>) -> SalesMetric {
    let Some(value) = present(raw) else {
        return SalesMetric::Revenue;
    };
    SalesMetric::from_token(&value.to_lowercase()).unwrap_or_else(|| {
        log::warn!("unknown ranking metric '{value}'; using revenue");
        SalesMetric::Revenue
    })
}
