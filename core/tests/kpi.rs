use olap_core::{
    kpi::{ActionType, InvestigationParams, RootCauseParams},
    types::{Directionality, KpiComparison, KpiMetric},
    Outcome, QueryEngine, QueryError,
};

fn msft_q4() -> InvestigationParams {
    InvestigationParams::new("MSFT", "2025Q4")
}

#[test]
fn request_defaults() {
    let engine = QueryEngine::build();
    let request = engine
        .build_investigation_request(&InvestigationParams::default())
        .expect("defaults are valid");
    assert_eq!(request.ticker, "MSFT");
    assert_eq!(request.period, "2025Q4");
    assert_eq!(request.metrics, KpiMetric::ALL.to_vec());
    assert_eq!(request.compare_to, vec![KpiComparison::Qoq, KpiComparison::Peer]);

    let request = engine
        .build_investigation_request(&InvestigationParams {
            ticker: Some("  ".into()),
            period: Some("".into()),
            ..InvestigationParams::default()
        })
        .expect("blank falls back");
    assert_eq!((request.ticker.as_str(), request.period.as_str()), ("MSFT", "2025Q4"));
}

#[test]
fn unknown_ticker_and_period_are_errors() {
    let engine = QueryEngine::build();
    let err = engine
        .execute_kpi_baseline_query(&InvestigationParams::new("TSLA", "2025Q4"))
        .expect_err("unknown ticker");
    assert!(matches!(err, QueryError::UnsupportedTicker { .. }));

    let err = engine
        .execute_kpi_variance_query(&InvestigationParams::new("MSFT", "2024Q4"))
        .expect_err("unknown period");
    assert_eq!(err.to_string(), "Unsupported period '2024Q4'.");
}

#[test]
fn baseline_reports_requested_metrics() {
    let engine = QueryEngine::build();
    let baseline = engine
        .execute_kpi_baseline_query(&InvestigationParams::new("msft ", " 2025q3"))
        .expect("valid")
        .data()
        .expect("row exists");

    assert_eq!(baseline.query_id, "baseline_MSFT_2025Q3");
    assert_eq!(baseline.peer_set, "mega_cap_software");
    assert_eq!(baseline.kpis[&KpiMetric::Revenue], 70_200.0);
    assert_eq!(baseline.kpis[&KpiMetric::NetDebt], -56_000.0);

    let narrowed = engine
        .execute_kpi_baseline_query(&msft_q4().with_metrics("fcf,net_debt"))
        .expect("valid")
        .data()
        .expect("row exists");
    assert_eq!(narrowed.kpis.len(), 2);

    let json = serde_json::to_value(&narrowed).expect("serialize");
    assert_eq!(json["kpis"]["fcf"], 24_100.0);
    assert_eq!(json["filters"]["period"], "2025Q4");
}

#[test]
fn variance_flags_msft_free_cash_flow() {
    let engine = QueryEngine::build();
    let variance = engine
        .execute_kpi_variance_query(&msft_q4())
        .expect("valid")
        .data()
        .expect("rows");

    assert_eq!(variance.query_id, "variance_MSFT_2025Q4");
    assert_eq!(variance.filters.previous_period.as_deref(), Some("2025Q3"));
    assert_eq!(variance.variance_rows.len(), 5);

    let revenue = &variance.variance_rows[0];
    assert_eq!(revenue.metric, KpiMetric::Revenue);
    assert_eq!(revenue.qoq_delta, 3_650.0);
    assert_eq!(revenue.qoq_delta_pct, 5.2);
    assert_eq!(revenue.zscore, 0.43);
    assert!(!revenue.anomaly_flag);

    let fcf = variance
        .variance_rows
        .iter()
        .find(|r| r.metric == KpiMetric::Fcf)
        .expect("fcf row");
    assert_eq!(fcf.qoq_delta_pct, 13.68);
    assert_eq!(fcf.zscore, 1.14);
    assert!(fcf.anomaly_flag);

    let net_debt = variance.variance_rows.last().expect("net debt row");
    assert_eq!(net_debt.directionality, Directionality::LowerIsBetter);
    assert_eq!(net_debt.qoq_delta, -3_000.0);
    assert_eq!(net_debt.qoq_delta_pct, -5.36);
}

#[test]
fn earliest_period_uses_zero_baseline() {
    let engine = QueryEngine::build();
    let variance = engine
        .execute_kpi_variance_query(&InvestigationParams::new("MSFT", "2025Q2"))
        .expect("valid")
        .data()
        .expect("rows");

    assert_eq!(variance.filters.previous_period, None);
    for row in &variance.variance_rows {
        assert_eq!(row.previous, 0.0);
        assert_eq!(row.qoq_delta, row.current);
        assert_eq!(row.qoq_delta_pct, 0.0);
        assert!(!row.anomaly_flag);
    }
}

#[test]
fn anomalies_are_the_flagged_variance_rows() {
    let engine = QueryEngine::build();
    let anomalies = engine
        .detect_kpi_anomalies(&msft_q4())
        .expect("valid")
        .data()
        .expect("rows");
    assert_eq!(anomalies.query_id, "anomaly_MSFT_2025Q4");
    assert_eq!(anomalies.source_query_id, "variance_MSFT_2025Q4");
    let metrics: Vec<KpiMetric> = anomalies.anomaly_rows.iter().map(|r| r.metric).collect();
    assert_eq!(metrics, [KpiMetric::Fcf]);

    let aapl = engine
        .detect_kpi_anomalies(&InvestigationParams::new("AAPL", "2025Q4"))
        .expect("valid")
        .data()
        .expect("rows");
    let flagged: Vec<(KpiMetric, f64)> = aapl
        .anomaly_rows
        .iter()
        .map(|r| (r.metric, r.zscore))
        .collect();
    assert_eq!(flagged, [(KpiMetric::Revenue, 1.11), (KpiMetric::Fcf, 2.48)]);
}

#[test]
fn peer_comparison_is_direction_aware() {
    let engine = QueryEngine::build();
    let peer = engine
        .execute_kpi_peer_query(&msft_q4())
        .expect("valid")
        .data()
        .expect("rows");
    assert_eq!(peer.query_id, "peer_MSFT_2025Q4");
    assert_eq!(peer.filters.peer_set, "mega_cap_software");

    let revenue = &peer.peer_rows[0];
    assert_eq!(revenue.peer_median, 66_500.0);
    assert_eq!(revenue.peer_delta, 7_350.0);
    assert_eq!(revenue.peer_delta_pct, 11.05);

    // Less debt than peers: raw delta negative, relative score positive.
    let net_debt = peer.peer_rows.last().expect("net debt");
    assert_eq!(net_debt.metric, KpiMetric::NetDebt);
    assert_eq!(net_debt.peer_delta, -44_500.0);
    assert_eq!(net_debt.peer_delta_pct, 306.9);

    let aapl = engine
        .execute_kpi_peer_query(&InvestigationParams::new("AAPL", "2025Q4").with_metrics("net_debt"))
        .expect("valid")
        .data()
        .expect("rows");
    assert_eq!(aapl.peer_rows.len(), 1);
    assert_eq!(aapl.peer_rows[0].peer_delta_pct, -88.1);
}

#[test]
fn root_causes_rank_segments_by_delta() {
    let engine = QueryEngine::build();
    let ranking = engine
        .rank_root_causes(&RootCauseParams::new("MSFT", "2025Q4"))
        .expect("valid")
        .data()
        .expect("segment rows");

    assert_eq!(ranking.query_id, "root_cause_MSFT_2025Q4");
    assert_eq!(ranking.focus_metric, KpiMetric::Revenue);

    let top: Vec<(&str, f64)> = ranking
        .top_drivers
        .iter()
        .map(|d| (d.key.as_str(), d.qoq_delta))
        .collect();
    assert_eq!(top, [("Cloud", 2_650.0), ("Productivity", 1_300.0)]);
    assert_eq!(ranking.top_drivers[0].qoq_delta_pct, 8.49);

    assert_eq!(ranking.bottom_drivers.len(), 1);
    let laggard = &ranking.bottom_drivers[0];
    assert_eq!(laggard.key, "Personal Computing");
    assert_eq!(laggard.qoq_delta, -300.0);
    assert_eq!(laggard.qoq_delta_pct, -2.27);
}

#[test]
fn growing_company_has_no_bottom_drivers() {
    let engine = QueryEngine::build();
    let ranking = engine
        .rank_root_causes(&RootCauseParams::new("AAPL", "2025Q4"))
        .expect("valid")
        .data()
        .expect("segment rows");
    assert_eq!(ranking.top_drivers[0].key, "iPhone");
    assert_eq!(ranking.top_drivers[1].key, "Wearables");
    assert!(ranking.bottom_drivers.is_empty());
}

#[test]
fn missing_previous_segments_count_from_zero() {
    let engine = QueryEngine::build();
    let ranking = engine
        .rank_root_causes(&RootCauseParams::new("GOOGL", "2025Q3"))
        .expect("valid")
        .data()
        .expect("segment rows");
    let ads = &ranking.top_drivers[0];
    assert_eq!(ads.key, "Ads");
    assert_eq!(ads.qoq_delta, ads.revenue);
    assert_eq!(ads.qoq_delta_pct, 0.0);
}

#[test]
fn playbooks_follow_the_ranking() {
    let engine = QueryEngine::build();
    let playbook = engine
        .map_causes_to_playbooks(&RootCauseParams::new("MSFT", "2025Q4"))
        .expect("valid")
        .data()
        .expect("segment rows");

    assert_eq!(playbook.query_id, "playbook_MSFT_2025Q4");
    assert_eq!(playbook.source_query_id, "root_cause_MSFT_2025Q4");
    assert_eq!(playbook.actions.len(), 3);

    let first = &playbook.actions[0];
    assert_eq!(first.action_type, ActionType::ScaleWinner);
    assert_eq!(first.target, "Cloud");
    assert_eq!(first.owner, "Segment GM");
    assert_eq!(
        first.expected_impact,
        "Protect +2% to +4% revenue contribution next quarter"
    );
    assert_eq!(first.rationale, "Cloud contributed 2650.0 QoQ change.");

    let last = playbook.actions.last().expect("recovery action");
    assert_eq!(last.action_type, ActionType::RecoverLaggard);
    assert_eq!(last.target, "Personal Computing");
    assert_eq!(last.rationale, "Personal Computing posted -300.0 QoQ change.");

    let json = serde_json::to_value(&playbook).expect("serialize");
    assert_eq!(json["actions"][2]["action_type"], "recover_laggard");
}

#[test]
fn period_without_segments_is_no_data() {
    let engine = QueryEngine::build();
    let params = RootCauseParams::new("MSFT", "2025Q2");

    let Outcome::NoData(empty) = engine.rank_root_causes(&params).expect("valid period") else {
        panic!("2025Q2 has no segment rows");
    };
    assert_eq!(empty.message, "No segment rows found.");

    let playbook = engine.map_causes_to_playbooks(&params).expect("valid period");
    assert!(playbook.is_no_data());
    let json = serde_json::to_value(&playbook).expect("serialize");
    assert_eq!(json["message"], "No segment rows found.");
    assert!(json.get("actions").is_none());
}

#[test]
fn finance_plan_embeds_the_request() {
    let engine = QueryEngine::build();
    let plan = engine
        .build_finance_analysis_plan(&msft_q4().with_compare_to("qoq"))
        .expect("valid");
    assert_eq!(plan.request.compare_to, vec![KpiComparison::Qoq]);
    let steps: Vec<&str> = plan.steps.iter().map(|s| s.step_id).collect();
    assert_eq!(steps, ["baseline", "variance", "peer", "root_cause"]);
    assert_eq!(plan.stop_rules.len(), 2);
}
