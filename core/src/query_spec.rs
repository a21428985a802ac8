//! Query spec builder and executor.
//!
//! `build` validates loosely specified parameters into an immutable
//! [`QuerySpec`]; `execute` runs a spec against the store. Both are
//! pure: re-executing a spec reproduces the same report.
//!
//! Permissive fallbacks (each logged at warn level):
//!   - unknown compare_to      → none
//!   - unknown rank_by         → revenue
//!   - unknown rank_order      → desc
//!   - missing/garbage limit   → default limit

use crate::{
    aggregate::{aggregate, summarize, Bucket, MetricValue, Summary},
    config::{AnomalyConfig, EngineConfig},
    error::{NoData, Outcome, QueryResult},
    normalize::{
        normalize_compare_to, normalize_dimensions, normalize_rank_metric, normalize_rank_order,
        normalize_sales_metrics, SalesFilters,
    },
    ranking::{min_max, Extrema, LimitInput, Ranking},
    store::{FactStore, SalesFact},
    types::{CompareTo, Dimension, Quarter, SalesMetric},
    variance::{anomaly_signal, period_delta, AnomalySignal, PeriodDelta},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    pub quarter: Option<String>,
    pub subclass: Option<String>,
    pub region: Option<String>,
    pub sku: Option<String>,
    /// Comma-separated group-by dimensions.
    pub dimensions: Option<String>,
    /// Comma-separated projected metrics.
    pub metrics: Option<String>,
    pub compare_to: Option<String>,
    pub rank_by: Option<String>,
    pub rank_order: Option<String>,
    pub limit: Option<LimitInput>,
}

/// Canonical, validated request. Never mutated after `build`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerySpec {
    pub filters: SalesFilters,
    pub dimensions: Vec<Dimension>,
    pub metrics: Vec<SalesMetric>,
    pub compare_to: CompareTo,
    pub ranking: Ranking,
}

pub fn build(store: &FactStore, config: &EngineConfig, params: &QueryParams) -> QueryResult<QuerySpec> {
    let filters = SalesFilters::normalize(
        store,
        params.quarter.as_deref(),
        params.subclass.as_deref(),
        params.sku.as_deref(),
        params.region.as_deref(),
    )?;

    Ok(QuerySpec {
        filters,
        dimensions: normalize_dimensions(params.dimensions.as_deref()),
        metrics: normalize_sales_metrics(params.metrics.as_deref()),
        compare_to: normalize_compare_to(params.compare_to.as_deref()),
        ranking: Ranking {
            metric: normalize_rank_metric(params.rank_by.as_deref()),
            order: normalize_rank_order(params.rank_order.as_deref()),
            limit: Ranking::clamp_limit(params.limit.as_ref(), &config.ranking),
        },
    })
}

/// One ranked bucket, projected to the requested metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedRow {
    pub key: BTreeMap<Dimension, String>,
    #[serde(flatten)]
    pub values: BTreeMap<SalesMetric, MetricValue>,
}

impl GroupedRow {
    fn project(bucket: &Bucket, metrics: &[SalesMetric]) -> Self {
        Self {
            key: bucket.key.clone(),
            values: metrics.iter().map(|m| (*m, bucket.metric_value(*m))).collect(),
        }
    }

    pub fn value(&self, metric: SalesMetric) -> Option<MetricValue> {
        self.values.get(&metric).copied()
    }
}

/// Scope totals against the same filters one quarter earlier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub previous_quarter: Quarter,
    pub previous_summary: Summary,
    pub revenue: PeriodDelta,
    pub units: PeriodDelta,
    pub avg_price: PeriodDelta,
    pub revenue_signal: AnomalySignal,
}

impl Comparison {
    pub fn between(
        previous_quarter: Quarter,
        current: &Summary,
        previous: Summary,
        config: &AnomalyConfig,
    ) -> Self {
        let revenue = period_delta(current.revenue as f64, previous.revenue as f64);
        Self {
            previous_quarter,
            units: period_delta(current.units as f64, previous.units as f64),
            avg_price: period_delta(current.avg_price, previous.avg_price),
            revenue_signal: anomaly_signal(revenue.delta_pct, config),
            revenue,
            previous_summary: previous,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryReport {
    pub query_spec: QuerySpec,
    pub summary: Summary,
    pub grouped_rows: Vec<GroupedRow>,
    pub global_min_max_revenue: Extrema,
    pub local_min_max_revenue: Extrema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
}

pub fn execute(store: &FactStore, config: &EngineConfig, spec: &QuerySpec) -> Outcome<QueryReport> {
    let filtered: Vec<&SalesFact> = store
        .sales()
        .iter()
        .filter(|r| spec.filters.matches(r))
        .collect();

    log::debug!(
        "execute_query_spec dims={:?} matched={}",
        spec.dimensions,
        filtered.len()
    );

    if filtered.is_empty() {
        return Outcome::NoData(
            NoData::new("No matching sales rows found for this query spec.")
                .with_query_spec(spec.clone()),
        );
    }

    let summary = summarize(filtered.iter().copied());
    let buckets = aggregate(filtered.iter().copied(), &spec.dimensions);
    let grouped_rows = spec
        .ranking
        .apply(&buckets)
        .iter()
        .map(|b| GroupedRow::project(b, &spec.metrics))
        .collect();

    let scope = store
        .sales()
        .iter()
        .filter(|r| r.in_quarter(spec.filters.quarter));
    let global = min_max(&aggregate(scope, &[Dimension::Subclass, Dimension::Sku]));

    let comparison = match (spec.compare_to, spec.filters.quarter.and_then(|q| q.previous())) {
        (CompareTo::PreviousPeriod, Some(previous_quarter)) => {
            let previous_filters = spec.filters.with_quarter(previous_quarter);
            let previous = summarize(store.sales().iter().filter(|r| previous_filters.matches(r)));
            Some(Comparison::between(previous_quarter, &summary, previous, &config.anomaly))
        }
        (CompareTo::PreviousPeriod, None) => {
            log::debug!("previous_period comparison skipped: no earlier quarter in scope");
            None
        }
        (CompareTo::None, _) => None,
    };

    Outcome::Data(QueryReport {
        query_spec: spec.clone(),
        summary,
        grouped_rows,
        global_min_max_revenue: global,
        local_min_max_revenue: min_max(&buckets),
        comparison,
    })
}
