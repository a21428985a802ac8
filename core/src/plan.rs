//! Deterministic analysis plans: which operations to call, in what
//! order, and when to pivot or stop. External orchestrators walk the
//! steps; the engine only describes them.

use crate::{
    config::EngineConfig,
    error::QueryResult,
    normalize::SalesFilters,
    store::FactStore,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GOAL: &str = "explain_revenue_performance";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanParams {
    pub goal: Option<String>,
    pub quarter: Option<String>,
    pub subclass: Option<String>,
    pub sku: Option<String>,
    pub region: Option<String>,
}

/// One evidence-gathering step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanStep {
    pub step_id: &'static str,
    pub objective: String,
    /// Engine operation the step calls.
    pub operation: &'static str,
}

impl PlanStep {
    pub fn new(step_id: &'static str, objective: impl Into<String>, operation: &'static str) -> Self {
        Self {
            step_id,
            objective: objective.into(),
            operation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisPlan {
    pub goal: String,
    pub scope_filters: SalesFilters,
    pub steps: Vec<PlanStep>,
    pub pivot_rules: Vec<String>,
    pub stop_rules: Vec<String>,
}

pub fn build_analysis_plan(
    store: &FactStore,
    config: &EngineConfig,
    params: &PlanParams,
) -> QueryResult<AnalysisPlan> {
    let scope_filters = SalesFilters::normalize(
        store,
        params.quarter.as_deref(),
        params.subclass.as_deref(),
        params.sku.as_deref(),
        params.region.as_deref(),
    )?;
    let goal = params
        .goal
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or(DEFAULT_GOAL)
        .to_string();

    let mut steps = vec![
        PlanStep::new(
            "baseline",
            "Snapshot revenue, units and average price for the scope.",
            "fetch_facts",
        ),
        PlanStep::new(
            "driver",
            "Identify the strongest and weakest subclass and the anomaly candidates.",
            "investigate_drilldown",
        ),
        PlanStep::new(
            "drill",
            "Rank SKUs inside the driver subclass by revenue.",
            "execute_query_spec",
        ),
        PlanStep::new(
            "contrast",
            "Rank regions of the laggard subclass in ascending revenue order.",
            "execute_query_spec",
        ),
    ];
    if scope_filters.quarter.is_some_and(|q| q.previous().is_some()) {
        steps.push(PlanStep::new(
            "variance",
            "Compare the scope against the previous quarter.",
            "execute_query_spec",
        ));
    }

    let anomaly = &config.anomaly;
    let pivot_rules = vec![
        "If an explicit subclass is in scope, drill into it instead of the top driver.".to_string(),
        format!(
            "If a cell sits at or below {}x the median cell revenue, pivot to that cell's region.",
            anomaly.low_cut_ratio
        ),
        format!(
            "If a cell sits at or above {}x the median cell revenue, check it for a one-off surge.",
            anomaly.high_cut_ratio
        ),
        format!(
            "If the previous-quarter anomaly score reaches {:.1}, explain the period change first.",
            anomaly.flag_threshold
        ),
    ];
    let stop_rules = vec![
        "At least 3 quantified findings with the operation that produced each.".to_string(),
        "Driver, laggard and at least one anomaly candidate explained or ruled out.".to_string(),
    ];

    log::debug!("analysis plan goal={goal} steps={}", steps.len());

    Ok(AnalysisPlan {
        goal,
        scope_filters,
        steps,
        pivot_rules,
        stop_rules,
    })
}
