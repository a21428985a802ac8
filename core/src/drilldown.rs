//! Analyst-style drilldown over the sales facts.
//!
//! Sequence, in one deterministic call:
//!   1. Baseline totals for the requested scope
//!   2. Top and bottom subclass by revenue (driver / laggard)
//!   3. Drill inside the driver by SKU and by region
//!   4. Pivot to the laggard and find its weakest region
//! plus concentration, gap, and anomaly-candidate signals.

use crate::{
    aggregate::{aggregate, pct, summarize, Bucket},
    config::{AnomalyConfig, EngineConfig},
    error::{NoData, Outcome, QueryResult},
    normalize::{normalize_quarter, normalize_region, normalize_subclass},
    query_spec::Comparison,
    ranking::{sort_by_metric, top_bottom},
    store::{FactStore, SalesFact},
    types::{Dimension, Quarter, RankOrder, Region, SalesMetric},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrilldownParams {
    pub quarter: Option<String>,
    /// Overrides the driver subclass used for the step-3 drill.
    pub subclass: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrilldownScope {
    pub quarter: Option<Quarter>,
    pub region: Option<Region>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Baseline {
    pub revenue: i64,
    pub units: i64,
    pub avg_price: f64,
    pub subclass_count: usize,
    pub region_count: usize,
    pub top_subclass: Option<Bucket>,
    pub bottom_subclass: Option<Bucket>,
    pub top_region: Option<Bucket>,
    pub bottom_region: Option<Bucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverInsight {
    pub statement: String,
    pub driver_subclass: Option<String>,
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverDrill {
    pub subclass: Option<String>,
    pub sku_top: Option<Bucket>,
    pub sku_bottom: Option<Bucket>,
    pub region_top: Option<Bucket>,
    pub region_bottom: Option<Bucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContrastInsight {
    pub statement: String,
    pub contrast_subclass: Option<String>,
    pub share_pct: f64,
    pub region_top: Option<Bucket>,
    pub region_bottom: Option<Bucket>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySide {
    Low,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyCandidate {
    pub signal: AnomalySide,
    #[serde(flatten)]
    pub bucket: Bucket,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessSignals {
    pub concentration_top_2_subclass_pct: f64,
    pub driver_vs_laggard_revenue_gap: i64,
    pub best_vs_worst_region_revenue_gap: i64,
    pub anomaly_candidates: Vec<AnomalyCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrilldownReport {
    pub scope: DrilldownScope,
    pub baseline: Baseline,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_variance_vs_previous: Option<Comparison>,
    pub primary_driver_insight: DriverInsight,
    pub within_driver_drill: DriverDrill,
    pub contrast_area_insight: ContrastInsight,
    pub business_signals: BusinessSignals,
    pub recommended_next_questions: Vec<String>,
}

fn revenue_of(bucket: &Option<Bucket>) -> i64 {
    bucket.as_ref().map_or(0, |b| b.revenue)
}

fn subclass_of(bucket: &Option<Bucket>) -> Option<String> {
    bucket
        .as_ref()
        .and_then(|b| b.label(Dimension::Subclass))
        .map(str::to_string)
}

fn rows_for_subclass<'a>(rows: &[&'a SalesFact], subclass: Option<&str>) -> Vec<&'a SalesFact> {
    match subclass {
        Some(name) => rows
            .iter()
            .copied()
            .filter(|r| r.subclass.as_str().eq_ignore_ascii_case(name))
            .collect(),
        None => Vec::new(),
    }
}

/// Share of total revenue held by the two largest buckets.
pub fn top_two_concentration(buckets: &[Bucket], total_revenue: i64) -> f64 {
    let mut ordered = buckets.to_vec();
    sort_by_metric(&mut ordered, SalesMetric::Revenue, RankOrder::Desc);
    let top_two: i64 = ordered.iter().take(2).map(|b| b.revenue).sum();
    pct(top_two as f64, total_revenue as f64)
}

/// Finest-grain cells far below or above the median cell.
///
/// Cells are aggregated by (subclass, sku, region) and sorted by
/// revenue; the pivot is the element at index `len / 2`. Up to
/// `max_hits_per_side` cells at or below `low_cut_ratio × median`
/// (lowest first) and at or above `high_cut_ratio × median` (highest
/// first) are returned, low side first.
pub fn anomaly_candidates(rows: &[&SalesFact], config: &AnomalyConfig) -> Vec<AnomalyCandidate> {
    let mut cells = aggregate(
        rows.iter().copied(),
        &[Dimension::Subclass, Dimension::Sku, Dimension::Region],
    );
    if cells.is_empty() {
        return Vec::new();
    }
    sort_by_metric(&mut cells, SalesMetric::Revenue, RankOrder::Asc);

    let median = cells[cells.len() / 2].revenue as f64;
    let low_cut = median * config.low_cut_ratio;
    let high_cut = median * config.high_cut_ratio;

    let low = cells
        .iter()
        .filter(|c| c.revenue as f64 <= low_cut)
        .take(config.max_hits_per_side)
        .map(|c| AnomalyCandidate { signal: AnomalySide::Low, bucket: c.clone() });
    let high = cells
        .iter()
        .rev()
        .filter(|c| c.revenue as f64 >= high_cut)
        .take(config.max_hits_per_side)
        .map(|c| AnomalyCandidate { signal: AnomalySide::High, bucket: c.clone() });
    low.chain(high).collect()
}

pub fn investigate(
    store: &FactStore,
    config: &EngineConfig,
    params: &DrilldownParams,
) -> QueryResult<Outcome<DrilldownReport>> {
    let quarter = normalize_quarter(params.quarter.as_deref())?;
    let region = normalize_region(params.region.as_deref())?;
    let drill_override = normalize_subclass(params.subclass.as_deref())?;

    let base_rows: Vec<&SalesFact> = store
        .sales()
        .iter()
        .filter(|r| r.in_quarter(quarter) && r.in_region(region))
        .collect();
    log::debug!(
        "investigate_drilldown quarter={quarter:?} region={region:?} rows={}",
        base_rows.len()
    );
    if base_rows.is_empty() {
        return Ok(Outcome::NoData(NoData::new("No matching data for requested scope.")));
    }

    // 1. Baseline
    let totals = summarize(base_rows.iter().copied());
    let by_subclass = aggregate(base_rows.iter().copied(), &[Dimension::Subclass]);
    let by_region = aggregate(base_rows.iter().copied(), &[Dimension::Region]);
    let subclass_extrema = top_bottom(&by_subclass);
    let region_extrema = top_bottom(&by_region);

    // 2. Driver and laggard
    let top_subclass = subclass_of(&subclass_extrema.top);
    let bottom_subclass = subclass_of(&subclass_extrema.bottom);
    let top_revenue = revenue_of(&subclass_extrema.top);
    let bottom_revenue = revenue_of(&subclass_extrema.bottom);

    // 3. Drill inside the driver
    let drill_subclass = drill_override
        .map(|s| s.as_str().to_string())
        .or_else(|| top_subclass.clone());
    let drill_rows = rows_for_subclass(&base_rows, drill_subclass.as_deref());
    let sku_in_drill = top_bottom(&aggregate(drill_rows.iter().copied(), &[Dimension::Sku]));
    let region_in_drill = top_bottom(&aggregate(drill_rows.iter().copied(), &[Dimension::Region]));

    // 4. Contrast with the laggard
    let contrast_rows = rows_for_subclass(&base_rows, bottom_subclass.as_deref());
    let contrast_regions = top_bottom(&aggregate(contrast_rows.iter().copied(), &[Dimension::Region]));

    let total = totals.revenue as f64;
    let driver_share = pct(top_revenue as f64, total);
    let laggard_share = pct(bottom_revenue as f64, total);

    let period_variance_vs_previous = quarter.and_then(|q| q.previous()).map(|previous_quarter| {
        let previous = summarize(
            store
                .sales()
                .iter()
                .filter(|r| r.quarter == previous_quarter && r.in_region(region)),
        );
        Comparison::between(previous_quarter, &totals, previous, &config.anomaly)
    });

    let signals = BusinessSignals {
        concentration_top_2_subclass_pct: top_two_concentration(&by_subclass, totals.revenue),
        driver_vs_laggard_revenue_gap: top_revenue - bottom_revenue,
        best_vs_worst_region_revenue_gap: revenue_of(&region_extrema.top)
            - revenue_of(&region_extrema.bottom),
        anomaly_candidates: anomaly_candidates(&base_rows, &config.anomaly),
    };

    let primary_driver_insight = DriverInsight {
        statement: match &top_subclass {
            Some(name) => format!("{name} is the primary revenue driver with {driver_share:?}% share."),
            None => "No primary driver available.".to_string(),
        },
        driver_subclass: top_subclass.clone(),
        share_pct: driver_share,
    };
    let contrast_area_insight = ContrastInsight {
        statement: match &bottom_subclass {
            Some(name) => format!(
                "{name} underperforms at {laggard_share:?}% share; investigate weakest region for recovery."
            ),
            None => "No contrast area available.".to_string(),
        },
        contrast_subclass: bottom_subclass.clone(),
        share_pct: laggard_share,
        region_top: contrast_regions.top,
        region_bottom: contrast_regions.bottom,
    };

    let recommended_next_questions = next_questions(
        top_subclass.as_deref(),
        drill_subclass.as_deref(),
        bottom_subclass.as_deref(),
    );

    Ok(Outcome::Data(DrilldownReport {
        scope: DrilldownScope { quarter, region },
        baseline: Baseline {
            revenue: totals.revenue,
            units: totals.units,
            avg_price: totals.avg_price,
            subclass_count: by_subclass.len(),
            region_count: by_region.len(),
            top_subclass: subclass_extrema.top,
            bottom_subclass: subclass_extrema.bottom,
            top_region: region_extrema.top,
            bottom_region: region_extrema.bottom,
        },
        period_variance_vs_previous,
        primary_driver_insight,
        within_driver_drill: DriverDrill {
            subclass: drill_subclass,
            sku_top: sku_in_drill.top,
            sku_bottom: sku_in_drill.bottom,
            region_top: region_in_drill.top,
            region_bottom: region_in_drill.bottom,
        },
        contrast_area_insight,
        business_signals: signals,
        recommended_next_questions,
    }))
}

fn next_questions(driver: Option<&str>, drill: Option<&str>, laggard: Option<&str>) -> Vec<String> {
    let name = |s: Option<&str>| s.unwrap_or("n/a").to_string();
    vec![
        format!(
            "Drill from subclass '{}' to SKU margin/price mix analysis.",
            name(driver)
        ),
        format!(
            "Investigate region gap inside '{}' and test if pricing or volume drives variance.",
            name(drill)
        ),
        format!(
            "Create turnaround plan for '{}' in its weakest region.",
            name(laggard)
        ),
    ]
}
