use olap_core::{
    drilldown::{AnomalySide, DrilldownParams, DrilldownReport},
    types::{Dimension, Quarter, Region},
    Outcome, QueryEngine, QueryError,
};

fn investigate(quarter: &str, region: Option<&str>) -> DrilldownReport {
    let _ = env_logger::builder().is_test(true).try_init();
    QueryEngine::build()
        .investigate_drilldown(&DrilldownParams {
            quarter: Some(quarter.into()),
            region: region.map(str::to_string),
            ..DrilldownParams::default()
        })
        .expect("valid scope")
        .data()
        .expect("rows in scope")
}

fn cell(report: &DrilldownReport, i: usize) -> (AnomalySide, &str, &str, i64) {
    let c = &report.business_signals.anomaly_candidates[i];
    (
        c.signal,
        c.bucket.label(Dimension::Region).unwrap_or_default(),
        c.bucket.label(Dimension::Sku).unwrap_or_default(),
        c.bucket.revenue,
    )
}

#[test]
fn baseline_for_quarter() {
    let report = investigate("Q3", None);
    assert_eq!(report.scope.quarter, Some(Quarter::Q3));
    assert_eq!(report.scope.region, None);

    let baseline = &report.baseline;
    assert_eq!(baseline.revenue, 1_253_974);
    assert_eq!(baseline.units, 7_385);
    assert_eq!(baseline.subclass_count, 4);
    assert_eq!(baseline.region_count, 4);
    let top_region = baseline.top_region.as_ref().expect("top region");
    assert_eq!(top_region.label(Dimension::Region), Some("NA"));
    assert_eq!(top_region.revenue, 361_830);
    let bottom_region = baseline.bottom_region.as_ref().expect("bottom region");
    assert_eq!(bottom_region.label(Dimension::Region), Some("LATAM"));
}

#[test]
fn driver_and_laggard_statements() {
    let report = investigate("Q3", None);
    assert_eq!(
        report.primary_driver_insight.statement,
        "Electronics is the primary revenue driver with 36.31% share."
    );
    assert_eq!(
        report.primary_driver_insight.driver_subclass.as_deref(),
        Some("Electronics")
    );
    assert_eq!(
        report.contrast_area_insight.statement,
        "Beauty underperforms at 14.86% share; investigate weakest region for recovery."
    );

    let contrast_bottom = report
        .contrast_area_insight
        .region_bottom
        .as_ref()
        .expect("laggard weakest region");
    assert_eq!(contrast_bottom.revenue, 37_018);
}

#[test]
fn drill_inside_driver() {
    let report = investigate("Q3", None);
    let drill = &report.within_driver_drill;
    assert_eq!(drill.subclass.as_deref(), Some("Electronics"));
    assert_eq!(drill.sku_top.as_ref().map(|b| b.revenue), Some(174_385));
    assert_eq!(drill.sku_bottom.as_ref().map(|b| b.revenue), Some(136_998));
    assert_eq!(drill.region_top.as_ref().map(|b| b.revenue), Some(131_602));
    assert_eq!(drill.region_bottom.as_ref().map(|b| b.revenue), Some(93_900));
}

#[test]
fn business_signals() {
    let report = investigate("Q3", None);
    let signals = &report.business_signals;
    assert_eq!(signals.concentration_top_2_subclass_pct, 63.53);
    assert_eq!(signals.driver_vs_laggard_revenue_gap, 269_044);
    assert_eq!(signals.best_vs_worst_region_revenue_gap, 111_119);
}

#[test]
fn injected_latam_outdoors_pocket_is_a_low_candidate() {
    let report = investigate("Q3", None);
    let candidates = &report.business_signals.anomaly_candidates;
    assert_eq!(candidates.len(), 4);

    assert_eq!(cell(&report, 0), (AnomalySide::Low, "LATAM", "BEAU-001", 11_479));
    assert_eq!(cell(&report, 1), (AnomalySide::Low, "LATAM", "OUT-003", 12_241));
    assert_eq!(cell(&report, 2), (AnomalySide::High, "NA", "ELEC-001", 51_016));
    assert_eq!(cell(&report, 3), (AnomalySide::High, "EU", "ELEC-001", 45_263));
}

#[test]
fn region_scope_narrows_everything() {
    let report = investigate("Q3", Some("latam"));
    assert_eq!(report.scope.region, Some(Region::Latam));
    assert_eq!(report.baseline.revenue, 250_711);
    assert_eq!(report.baseline.region_count, 1);
    assert_eq!(
        report.primary_driver_insight.statement,
        "Electronics is the primary revenue driver with 37.45% share."
    );
    assert_eq!(report.business_signals.concentration_top_2_subclass_pct, 65.25);
    assert_eq!(report.business_signals.driver_vs_laggard_revenue_gap, 56_882);
    assert_eq!(report.business_signals.best_vs_worst_region_revenue_gap, 0);

    assert_eq!(report.business_signals.anomaly_candidates.len(), 3);
    assert_eq!(cell(&report, 1), (AnomalySide::Low, "LATAM", "OUT-003", 12_241));
    assert_eq!(cell(&report, 2), (AnomalySide::High, "LATAM", "ELEC-001", 34_527));
}

#[test]
fn explicit_subclass_overrides_drill_target() {
    let report = QueryEngine::build()
        .investigate_drilldown(&DrilldownParams {
            quarter: Some("Q3".into()),
            subclass: Some("outdoors".into()),
            region: None,
        })
        .expect("valid")
        .data()
        .expect("rows");

    assert_eq!(report.within_driver_drill.subclass.as_deref(), Some("Outdoors"));
    assert_eq!(
        report.primary_driver_insight.driver_subclass.as_deref(),
        Some("Electronics"),
        "driver is still computed over the whole scope"
    );
    assert_eq!(
        report.recommended_next_questions[1],
        "Investigate region gap inside 'Outdoors' and test if pricing or volume drives variance."
    );
}

#[test]
fn period_variance_present_after_first_quarter() {
    let report = investigate("Q3", None);
    let variance = report
        .period_variance_vs_previous
        .as_ref()
        .expect("Q2 exists");
    assert_eq!(variance.previous_quarter, Quarter::Q2);
    assert_eq!(variance.revenue.delta_pct, 7.91);

    assert!(investigate("Q1", None).period_variance_vs_previous.is_none());
}

#[test]
fn next_questions_name_driver_and_laggard() {
    let report = investigate("Q3", None);
    assert_eq!(
        report.recommended_next_questions,
        vec![
            "Drill from subclass 'Electronics' to SKU margin/price mix analysis.",
            "Investigate region gap inside 'Electronics' and test if pricing or volume drives variance.",
            "Create turnaround plan for 'Beauty' in its weakest region.",
        ]
    );
}

#[test]
fn bad_region_is_an_error_not_no_data() {
    let result = QueryEngine::build().investigate_drilldown(&DrilldownParams {
        region: Some("MARS".into()),
        ..DrilldownParams::default()
    });
    assert!(matches!(result, Err(QueryError::UnsupportedFilter { .. })));
}

#[test]
fn whole_table_drilldown_has_no_period_variance() {
    let outcome = QueryEngine::build()
        .investigate_drilldown(&DrilldownParams::default())
        .expect("valid");
    let Outcome::Data(report) = outcome else {
        panic!("whole table is never empty");
    };
    assert_eq!(report.baseline.revenue, 4_904_093);
    assert!(report.period_variance_vs_previous.is_none());
}
