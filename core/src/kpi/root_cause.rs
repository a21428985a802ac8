//! Segment-level root-cause ranking and action playbooks.

use super::{or_default, KpiFilters, DEFAULT_PERIOD, DEFAULT_TICKER};
use crate::{
    config::RootCauseConfig,
    error::{NoData, Outcome, QueryResult},
    normalize::{normalize_period, normalize_ticker},
    store::FactStore,
    types::KpiMetric,
    variance::period_delta,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootCauseParams {
    pub ticker: Option<String>,
    pub period: Option<String>,
    pub focus_metric: Option<String>,
}

impl RootCauseParams {
    pub fn new(ticker: &str, period: &str) -> Self {
        Self {
            ticker: Some(ticker.to_string()),
            period: Some(period.to_string()),
            focus_metric: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootCauseFinding {
    pub dimension: String,
    pub key: String,
    pub revenue: f64,
    pub qoq_delta: f64,
    pub qoq_delta_pct: f64,
    pub op_margin_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootCauseRanking {
    pub query_id: String,
    pub filters: KpiFilters,
    /// Echoed and used to word the playbook impact text. Drivers are
    /// always ranked by revenue delta.
    pub focus_metric: KpiMetric,
    pub top_drivers: Vec<RootCauseFinding>,
    pub bottom_drivers: Vec<RootCauseFinding>,
}

fn focus_metric(raw: Option<&str>) -> KpiMetric {
    let token = or_default(raw, "revenue").trim().to_lowercase();
    KpiMetric::from_token(&token).unwrap_or_else(|| {
        log::warn!("unknown focus metric '{token}'; using revenue");
        KpiMetric::Revenue
    })
}

/// Rank current-period segments by their own revenue change.
///
/// A segment missing from the previous period has a zero baseline.
/// Top drivers: largest delta first. Bottom drivers: only segments
/// that shrank, most negative first. Both truncated to
/// `driver_count`. A period without segment rows yields `NoData`.
pub fn rank_root_causes(
    store: &FactStore,
    config: &RootCauseConfig,
    params: &RootCauseParams,
) -> QueryResult<Outcome<RootCauseRanking>> {
    let ticker = normalize_ticker(store, or_default(params.ticker.as_deref(), DEFAULT_TICKER))?;
    let period = normalize_period(store, or_default(params.period.as_deref(), DEFAULT_PERIOD))?;
    let focus = focus_metric(params.focus_metric.as_deref());

    let previous_revenue: HashMap<&str, f64> = match store.previous_period(&period) {
        Some(previous) => store
            .segment_rows(&ticker, previous)
            .map(|row| (row.key.as_str(), row.revenue))
            .collect(),
        None => HashMap::new(),
    };

    let findings: Vec<RootCauseFinding> = store
        .segment_rows(&ticker, &period)
        .map(|row| {
            let delta = period_delta(
                row.revenue,
                previous_revenue.get(row.key.as_str()).copied().unwrap_or(0.0),
            );
            RootCauseFinding {
                dimension: row.dimension.clone(),
                key: row.key.clone(),
                revenue: row.revenue,
                qoq_delta: delta.delta,
                qoq_delta_pct: delta.delta_pct,
                op_margin_pct: row.op_margin_pct,
            }
        })
        .collect();

    if findings.is_empty() {
        return Ok(Outcome::NoData(NoData::new("No segment rows found.")));
    }

    let mut top_drivers = findings.clone();
    top_drivers.sort_by(|a, b| b.qoq_delta.total_cmp(&a.qoq_delta));
    top_drivers.truncate(config.driver_count);

    let mut bottom_drivers: Vec<RootCauseFinding> =
        findings.into_iter().filter(|f| f.qoq_delta < 0.0).collect();
    bottom_drivers.sort_by(|a, b| a.qoq_delta.total_cmp(&b.qoq_delta));
    bottom_drivers.truncate(config.driver_count);

    log::debug!(
        "root causes {ticker}/{period}: top={} bottom={}",
        top_drivers.len(),
        bottom_drivers.len()
    );

    Ok(Outcome::Data(RootCauseRanking {
        query_id: format!("root_cause_{ticker}_{period}"),
        filters: KpiFilters { ticker, period },
        focus_metric: focus,
        top_drivers,
        bottom_drivers,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    ScaleWinner,
    RecoverLaggard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybookAction {
    pub action_type: ActionType,
    pub target: String,
    pub owner: &'static str,
    pub expected_impact: String,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybookMap {
    pub query_id: String,
    pub actions: Vec<PlaybookAction>,
    pub source_query_id: String,
}

/// One growth action per top driver, one recovery action per laggard.
pub fn map_causes_to_playbooks(
    store: &FactStore,
    config: &RootCauseConfig,
    params: &RootCauseParams,
) -> QueryResult<Outcome<PlaybookMap>> {
    let causes = match rank_root_causes(store, config, params)? {
        Outcome::Data(causes) => causes,
        Outcome::NoData(empty) => return Ok(Outcome::NoData(empty)),
    };
    let focus = causes.focus_metric;

    let winners = causes.top_drivers.iter().map(|driver| PlaybookAction {
        action_type: ActionType::ScaleWinner,
        target: driver.key.clone(),
        owner: "Segment GM",
        expected_impact: format!("Protect +2% to +4% {focus} contribution next quarter"),
        rationale: format!("{} contributed {:?} QoQ change.", driver.key, driver.qoq_delta),
    });
    let laggards = causes.bottom_drivers.iter().map(|laggard| PlaybookAction {
        action_type: ActionType::RecoverLaggard,
        target: laggard.key.clone(),
        owner: "Finance BP + Ops",
        expected_impact: format!("Recover 1% to 2% {focus} drag within 2 quarters"),
        rationale: format!("{} posted {:?} QoQ change.", laggard.key, laggard.qoq_delta),
    });
    let actions = winners.chain(laggards).collect();

    let KpiFilters { ticker, period } = &causes.filters;
    Ok(Outcome::Data(PlaybookMap {
        query_id: format!("playbook_{ticker}_{period}"),
        actions,
        source_query_id: causes.query_id.clone(),
    }))
}
