//! olap-runner: headless front end for the OLAP/KPI query engine.
//!
//! Usage:
//!   olap-runner --quarter Q3
//!   olap-runner --config engine.json --ipc-mode

use anyhow::Result;
use olap_core::{
    config::EngineConfig,
    drilldown::DrilldownParams,
    facts::FetchParams,
    kpi::{InvestigationParams, RootCauseParams},
    plan::PlanParams,
    query_spec::QueryParams,
    types::Dimension,
    Outcome, QueryEngine, QueryResult,
};
use serde::Serialize;
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    FetchFacts(FetchParams),
    InvestigateDrilldown(DrilldownParams),
    BuildQuerySpec(QueryParams),
    RunQuery(QueryParams),
    BuildAnalysisPlan(PlanParams),
    BuildInvestigationRequest(InvestigationParams),
    BuildFinanceAnalysisPlan(InvestigationParams),
    ExecuteKpiBaselineQuery(InvestigationParams),
    ExecuteKpiVarianceQuery(InvestigationParams),
    ExecuteKpiPeerQuery(InvestigationParams),
    DetectKpiAnomalies(InvestigationParams),
    RankRootCauses(RootCauseParams),
    MapCausesToPlaybooks(RootCauseParams),
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let quarter = parse_arg(&args, "--quarter").unwrap_or("Q4");

    let config = match parse_arg(&args, "--config") {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let engine = QueryEngine::with_config(config);

    if ipc_mode {
        run_ipc_loop(&engine)
    } else {
        print_summary(&engine, quarter)
    }
}

fn run_ipc_loop(engine: &QueryEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        if handle.read_line(&mut buffer)? == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };

        let response = match request {
            IpcRequest::Quit => break,
            IpcRequest::FetchFacts(p) => to_line(engine.fetch_facts(&p))?,
            IpcRequest::InvestigateDrilldown(p) => to_line(engine.investigate_drilldown(&p))?,
            IpcRequest::BuildQuerySpec(p) => to_line(
                engine
                    .build_query_spec(&p)
                    .map(|spec| serde_json::json!({ "query_spec": spec })),
            )?,
            IpcRequest::RunQuery(p) => to_line(engine.run_query(&p))?,
            IpcRequest::BuildAnalysisPlan(p) => to_line(
                engine
                    .build_analysis_plan(&p)
                    .map(|plan| serde_json::json!({ "analysis_plan": plan })),
            )?,
            IpcRequest::BuildInvestigationRequest(p) => to_line(
                engine
                    .build_investigation_request(&p)
                    .map(|request| serde_json::json!({ "request": request })),
            )?,
            IpcRequest::BuildFinanceAnalysisPlan(p) => to_line(
                engine
                    .build_finance_analysis_plan(&p)
                    .map(|plan| serde_json::json!({ "analysis_plan": plan })),
            )?,
            IpcRequest::ExecuteKpiBaselineQuery(p) => to_line(engine.execute_kpi_baseline_query(&p))?,
            IpcRequest::ExecuteKpiVarianceQuery(p) => to_line(engine.execute_kpi_variance_query(&p))?,
            IpcRequest::ExecuteKpiPeerQuery(p) => to_line(engine.execute_kpi_peer_query(&p))?,
            IpcRequest::DetectKpiAnomalies(p) => to_line(engine.detect_kpi_anomalies(&p))?,
            IpcRequest::RankRootCauses(p) => to_line(engine.rank_root_causes(&p))?,
            IpcRequest::MapCausesToPlaybooks(p) => to_line(engine.map_causes_to_playbooks(&p))?,
        };
        writeln!(stdout, "{response}")?;
        stdout.flush()?;
    }
    Ok(())
}

/// Success payloads and structured query errors share one line format.
fn to_line<T: Serialize>(result: QueryResult<T>) -> Result<String> {
    let line = match result {
        Ok(value) => serde_json::to_string(&value)?,
        Err(e) => {
            log::warn!("request rejected: {e}");
            serde_json::to_string(&e)?
        }
    };
    Ok(line)
}

fn print_summary(engine: &QueryEngine, quarter: &str) -> Result<()> {
    let store = engine.store();
    println!("OLAP/KPI query engine: olap-runner");
    println!("  sales facts:   {}", store.sales().len());
    println!("  kpi facts:     {}", store.kpis().len());
    println!("  segment facts: {}", store.segments().len());
    println!("  periods:       {}", store.periods().join(", "));
    println!();

    let params = DrilldownParams {
        quarter: Some(quarter.to_string()),
        ..DrilldownParams::default()
    };
    match engine.investigate_drilldown(&params) {
        Err(e) => println!("  {e}"),
        Ok(Outcome::NoData(empty)) => println!("  {}", empty.message),
        Ok(Outcome::Data(report)) => {
            println!("=== SALES DRILLDOWN ({quarter}) ===");
            println!("  revenue:        {}", report.baseline.revenue);
            println!("  units:          {}", report.baseline.units);
            println!("  avg price:      {:.2}", report.baseline.avg_price);
            println!("  driver:         {}", report.primary_driver_insight.statement);
            println!("  laggard:        {}", report.contrast_area_insight.statement);
            println!(
                "  top-2 share:    {:.2}%",
                report.business_signals.concentration_top_2_subclass_pct
            );
            if let Some(variance) = &report.period_variance_vs_previous {
                println!(
                    "  vs {}:        {:+.2}% revenue",
                    variance.previous_quarter, variance.revenue.delta_pct
                );
            }
            for candidate in &report.business_signals.anomaly_candidates {
                println!(
                    "  anomaly ({:?}): {} / {} / {} revenue {}",
                    candidate.signal,
                    candidate.bucket.label(Dimension::Region).unwrap_or("-"),
                    candidate.bucket.label(Dimension::Subclass).unwrap_or("-"),
                    candidate.bucket.label(Dimension::Sku).unwrap_or("-"),
                    candidate.bucket.revenue
                );
            }
        }
    }

    println!();
    println!("=== KPI ANOMALIES ===");
    for ticker in store.tickers() {
        let params = InvestigationParams {
            ticker: Some(ticker.clone()),
            ..InvestigationParams::default()
        };
        match engine.detect_kpi_anomalies(&params)? {
            Outcome::NoData(empty) => println!("  {ticker}: {}", empty.message),
            Outcome::Data(found) if found.anomaly_rows.is_empty() => {
                println!("  {ticker}: none flagged")
            }
            Outcome::Data(found) => {
                for row in &found.anomaly_rows {
                    println!(
                        "  {ticker} {} | QoQ {:+.2}% | z {:.2}",
                        row.metric, row.qoq_delta_pct, row.zscore
                    );
                }
            }
        }
    }
    Ok(())
}

fn parse_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
