use olap_core::{
    normalize::{
        normalize_compare_to, normalize_dimensions, normalize_kpi_comparisons,
        normalize_kpi_metrics, normalize_period, normalize_quarter, normalize_rank_metric,
        normalize_rank_order, normalize_region, normalize_sales_metrics, normalize_sku,
        normalize_subclass, normalize_ticker, SalesFilters,
    },
    store::FactStore,
    types::{
        CompareTo, Dimension, KpiComparison, KpiMetric, Quarter, RankOrder, Region, SalesMetric,
        Subclass,
    },
    QueryError,
};

#[test]
fn quarter_aliases_resolve() {
    for raw in ["Q3", "q3", " 3 ", "qtr3", "QTR 3", "quarter3", "Quarter 3"] {
        assert_eq!(
            normalize_quarter(Some(raw)).expect("valid alias"),
            Some(Quarter::Q3),
            "alias {raw:?}"
        );
    }
}

#[test]
fn blank_quarter_means_unconstrained() {
    assert_eq!(normalize_quarter(None).expect("ok"), None);
    assert_eq!(normalize_quarter(Some("   ")).expect("ok"), None);
}

#[test]
fn bad_quarter_is_structured_error() {
    let err = normalize_quarter(Some("q9")).expect_err("q9 is not a quarter");
    assert!(matches!(err, QueryError::UnsupportedQuarter { .. }));
    assert_eq!(err.to_string(), "Unsupported quarter 'q9'. Use Q1, Q2, Q3, or Q4.");

    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["error"], "Unsupported quarter 'q9'. Use Q1, Q2, Q3, or Q4.");
    assert_eq!(json["available_quarters"], serde_json::json!(["Q1", "Q2", "Q3", "Q4"]));
}

#[test]
fn subclass_and_region_are_case_insensitive() {
    assert_eq!(
        normalize_subclass(Some("outdoors")).expect("ok"),
        Some(Subclass::Outdoors)
    );
    assert_eq!(normalize_region(Some(" latam ")).expect("ok"), Some(Region::Latam));
}

#[test]
fn unknown_filter_value_lists_alternatives() {
    let err = normalize_region(Some("MARS")).expect_err("unknown region");
    match &err {
        QueryError::UnsupportedFilter { dimension, available, .. } => {
            assert_eq!(*dimension, Dimension::Region);
            assert_eq!(available, &["APAC", "EU", "LATAM", "NA"]);
        }
        other => panic!("unexpected error {other:?}"),
    }
    let json = serde_json::to_value(&err).expect("serialize");
    assert!(json.get("available_values").is_some());
}

#[test]
fn sku_is_checked_against_the_store() {
    let store = FactStore::build();
    assert_eq!(
        normalize_sku(&store, Some("out-003")).expect("ok"),
        Some("OUT-003".to_string())
    );
    let err = normalize_sku(&store, Some("OUT-999")).expect_err("unknown sku");
    assert_eq!(err.available().len(), 12);
}

#[test]
fn filters_canonicalize_together() {
    let store = FactStore::build();
    let filters =
        SalesFilters::normalize(&store, Some("qtr 3"), Some("outdoors"), None, Some("latam"))
            .expect("valid");
    assert_eq!(filters.quarter, Some(Quarter::Q3));
    assert_eq!(filters.subclass, Some(Subclass::Outdoors));
    assert_eq!(filters.region, Some(Region::Latam));
    assert_eq!(filters.sku, None);
}

#[test]
fn list_defaults_apply_when_absent_or_empty() {
    assert_eq!(normalize_dimensions(None), vec![Dimension::Subclass]);
    assert_eq!(normalize_dimensions(Some("bogus,,")), vec![Dimension::Subclass]);
    assert_eq!(
        normalize_dimensions(Some("region, sku")),
        vec![Dimension::Region, Dimension::Sku]
    );
    assert_eq!(normalize_sales_metrics(None), SalesMetric::ALL.to_vec());
    assert_eq!(normalize_sales_metrics(Some("units")), vec![SalesMetric::Units]);
}

#[test]
fn kpi_lists_fall_back() {
    assert_eq!(normalize_kpi_metrics(None).len(), 5);
    assert_eq!(
        normalize_kpi_metrics(Some("nonsense")),
        vec![
            KpiMetric::Revenue,
            KpiMetric::GrossMarginPct,
            KpiMetric::OperatingMarginPct,
            KpiMetric::Fcf,
        ]
    );
    assert_eq!(normalize_kpi_metrics(Some("FCF")), vec![KpiMetric::Fcf]);
    assert_eq!(
        normalize_kpi_comparisons(Some("later")),
        vec![KpiComparison::Qoq, KpiComparison::Peer]
    );
    assert_eq!(normalize_kpi_comparisons(Some("yoy")), vec![KpiComparison::Yoy]);
}

#[test]
fn permissive_fields_fall_back_instead_of_failing() {
    assert_eq!(normalize_compare_to(Some("prev")), CompareTo::PreviousPeriod);
    assert_eq!(normalize_compare_to(Some("last year")), CompareTo::None);
    assert_eq!(normalize_rank_order(Some("bottom")), RankOrder::Asc);
    assert_eq!(normalize_rank_order(Some("sideways")), RankOrder::Desc);
    assert_eq!(normalize_rank_metric(Some("margin")), SalesMetric::Revenue);
    assert_eq!(normalize_rank_metric(Some("avg_price")), SalesMetric::AvgPrice);
}

#[test]
fn ticker_and_period_validation() {
    let store = FactStore::build();
    assert_eq!(normalize_ticker(&store, " msft ").expect("ok"), "MSFT");
    assert_eq!(normalize_period(&store, " 2025q3").expect("ok"), "2025Q3");

    let err = normalize_ticker(&store, "TSLA").expect_err("unknown ticker");
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["error"], "Unsupported ticker 'TSLA'.");
    assert_eq!(json["available_tickers"], serde_json::json!(["AAPL", "GOOGL", "MSFT"]));

    let err = normalize_period(&store, "2024Q4").expect_err("unknown period");
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(
        json["available_periods"],
        serde_json::json!(["2025Q2", "2025Q3", "2025Q4"])
    );
}
