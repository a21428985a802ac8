//! SEC-style KPI investigation over the governed KPI and segment tables.
//!
//! Every operation re-validates its inputs through
//! [`build_investigation_request`] and tags its result with a
//! deterministic `query_id` evidence token, so downstream reports can
//! cite exactly which computation produced a number.

mod queries;
mod root_cause;

pub use queries::{
    detect_anomalies, execute_baseline, execute_peer, execute_variance, KpiAnomalies,
    KpiBaseline, KpiFilters, KpiPeerComparison, KpiVariance, PeerFilters, PeerRow,
    VarianceFilters, VarianceRow,
};
pub use root_cause::{
    map_causes_to_playbooks, rank_root_causes, ActionType, PlaybookAction, PlaybookMap,
    RootCauseFinding, RootCauseParams, RootCauseRanking,
};

use crate::{
    error::QueryResult,
    normalize::{normalize_kpi_comparisons, normalize_kpi_metrics, normalize_period, normalize_ticker},
    plan::PlanStep,
    store::FactStore,
    types::{KpiComparison, KpiMetric},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TICKER: &str = "MSFT";
pub const DEFAULT_PERIOD: &str = "2025Q4";

/// Loosely specified investigation input. Absent or blank ticker and
/// period fall back to [`DEFAULT_TICKER`] / [`DEFAULT_PERIOD`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestigationParams {
    pub ticker: Option<String>,
    pub period: Option<String>,
    /// Comma-separated KPI metrics.
    pub metrics: Option<String>,
    /// Comma-separated comparison modes (`qoq`, `yoy`, `peer`).
    pub compare_to: Option<String>,
}

impl InvestigationParams {
    pub fn new(ticker: &str, period: &str) -> Self {
        Self {
            ticker: Some(ticker.to_string()),
            period: Some(period.to_string()),
            ..Self::default()
        }
    }

    pub fn with_metrics(mut self, metrics: &str) -> Self {
        self.metrics = Some(metrics.to_string());
        self
    }

    pub fn with_compare_to(mut self, compare_to: &str) -> Self {
        self.compare_to = Some(compare_to.to_string());
        self
    }
}

pub(crate) fn or_default<'a>(raw: Option<&'a str>, default: &'a str) -> &'a str {
    raw.filter(|s| !s.trim().is_empty()).unwrap_or(default)
}

/// Validated investigation contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestigationRequest {
    pub ticker: String,
    pub period: String,
    pub metrics: Vec<KpiMetric>,
    pub compare_to: Vec<KpiComparison>,
}

pub fn build_investigation_request(
    store: &FactStore,
    params: &InvestigationParams,
) -> QueryResult<InvestigationRequest> {
    let ticker = normalize_ticker(store, or_default(params.ticker.as_deref(), DEFAULT_TICKER))?;
    let period = normalize_period(store, or_default(params.period.as_deref(), DEFAULT_PERIOD))?;
    Ok(InvestigationRequest {
        ticker,
        period,
        metrics: normalize_kpi_metrics(params.metrics.as_deref()),
        compare_to: normalize_kpi_comparisons(params.compare_to.as_deref()),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinanceAnalysisPlan {
    pub objective: &'static str,
    pub request: InvestigationRequest,
    pub steps: Vec<PlanStep>,
    pub stop_rules: Vec<String>,
}

pub fn build_finance_analysis_plan(
    store: &FactStore,
    params: &InvestigationParams,
) -> QueryResult<FinanceAnalysisPlan> {
    let request = build_investigation_request(store, params)?;
    Ok(FinanceAnalysisPlan {
        objective: "detect_kpi_change_diagnose_root_causes_recommend_actions",
        request,
        steps: vec![
            PlanStep::new(
                "baseline",
                "Fetch KPI baseline for requested period.",
                "execute_kpi_baseline_query",
            ),
            PlanStep::new(
                "variance",
                "Compute QoQ and YoY variance for selected KPIs.",
                "execute_kpi_variance_query",
            ),
            PlanStep::new(
                "peer",
                "Benchmark KPIs versus peer set medians.",
                "execute_kpi_peer_query",
            ),
            PlanStep::new(
                "root_cause",
                "Rank segment drivers and weak spots.",
                "rank_root_causes",
            ),
        ],
        stop_rules: vec![
            "At least 3 quantified findings with evidence refs.".to_string(),
            "At least 2 concrete actions (one growth, one risk mitigation).".to_string(),
        ],
    })
}
