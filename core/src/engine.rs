//! The query engine: the single entry point external callers use.
//!
//! RULES:
//!   - The engine owns one immutable FactStore and one EngineConfig.
//!   - Every method takes &self; nothing is cached between calls.
//!   - Every method normalizes its inputs before touching the store.
//!   - Invalid explicit input is an Err(QueryError); valid input that
//!     matches nothing is Ok(Outcome::NoData).

use crate::{
    config::EngineConfig,
    drilldown::{self, DrilldownParams, DrilldownReport},
    error::{Outcome, QueryResult},
    facts::{self, FactsReport, FetchParams},
    kpi::{
        self, FinanceAnalysisPlan, InvestigationParams, InvestigationRequest, KpiAnomalies,
        KpiBaseline, KpiPeerComparison, KpiVariance, PlaybookMap, RootCauseParams,
        RootCauseRanking,
    },
    plan::{self, AnalysisPlan, PlanParams},
    query_spec::{self, QueryParams, QueryReport, QuerySpec},
    store::FactStore,
};

#[derive(Debug, Clone)]
pub struct QueryEngine {
    store: FactStore,
    config: EngineConfig,
}

impl QueryEngine {
    pub fn new(store: FactStore, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Engine over the fixed synthetic tables with default calibration.
    pub fn build() -> Self {
        Self::new(FactStore::build(), EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::new(FactStore::build(), config)
    }

    pub fn store(&self) -> &FactStore {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Sales ──────────────────────────────────────────────────

    pub fn fetch_facts(&self, params: &FetchParams) -> QueryResult<Outcome<FactsReport>> {
        facts::fetch_facts(&self.store, params)
    }

    pub fn investigate_drilldown(
        &self,
        params: &DrilldownParams,
    ) -> QueryResult<Outcome<DrilldownReport>> {
        drilldown::investigate(&self.store, &self.config, params)
    }

    pub fn build_query_spec(&self, params: &QueryParams) -> QueryResult<QuerySpec> {
        let spec = query_spec::build(&self.store, &self.config, params)?;
        log::debug!("built query spec {spec:?}");
        Ok(spec)
    }

    pub fn execute_query_spec(&self, spec: &QuerySpec) -> Outcome<QueryReport> {
        query_spec::execute(&self.store, &self.config, spec)
    }

    /// Build and execute in one call.
    pub fn run_query(&self, params: &QueryParams) -> QueryResult<Outcome<QueryReport>> {
        let spec = self.build_query_spec(params)?;
        Ok(self.execute_query_spec(&spec))
    }

    pub fn build_analysis_plan(&self, params: &PlanParams) -> QueryResult<AnalysisPlan> {
        plan::build_analysis_plan(&self.store, &self.config, params)
    }

    // ── KPI ────────────────────────────────────────────────────

    pub fn build_investigation_request(
        &self,
        params: &InvestigationParams,
    ) -> QueryResult<InvestigationRequest> {
        kpi::build_investigation_request(&self.store, params)
    }

    pub fn build_finance_analysis_plan(
        &self,
        params: &InvestigationParams,
    ) -> QueryResult<FinanceAnalysisPlan> {
        kpi::build_finance_analysis_plan(&self.store, params)
    }

    pub fn execute_kpi_baseline_query(
        &self,
        params: &InvestigationParams,
    ) -> QueryResult<Outcome<KpiBaseline>> {
        kpi::execute_baseline(&self.store, params)
    }

    pub fn execute_kpi_variance_query(
        &self,
        params: &InvestigationParams,
    ) -> QueryResult<Outcome<KpiVariance>> {
        kpi::execute_variance(&self.store, &self.config.anomaly, params)
    }

    pub fn execute_kpi_peer_query(
        &self,
        params: &InvestigationParams,
    ) -> QueryResult<Outcome<KpiPeerComparison>> {
        kpi::execute_peer(&self.store, params)
    }

    pub fn detect_kpi_anomalies(
        &self,
        params: &InvestigationParams,
    ) -> QueryResult<Outcome<KpiAnomalies>> {
        kpi::detect_anomalies(&self.store, &self.config.anomaly, params)
    }

    pub fn rank_root_causes(
        &self,
        params: &RootCauseParams,
    ) -> QueryResult<Outcome<RootCauseRanking>> {
        kpi::rank_root_causes(&self.store, &self.config.root_cause, params)
    }

    pub fn map_causes_to_playbooks(
        &self,
        params: &RootCauseParams,
    ) -> QueryResult<Outcome<PlaybookMap>> {
        kpi::map_causes_to_playbooks(&self.store, &self.config.root_cause, params)
    }
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::build()
    }
}
