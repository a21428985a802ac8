//! Governed KPI, segment, and peer benchmark tables.

use crate::types::KpiMetric;
use serde::Serialize;
use std::collections::BTreeMap;

/// Reporting periods in chronological order.
pub const KPI_PERIODS: [&str; 3] = ["2025Q2", "2025Q3", "2025Q4"];

/// Company-period grain. Exactly one row per (ticker, period).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiFact {
    pub ticker: String,
    pub period: String,
    pub sector: String,
    pub peer_set: String,
    pub revenue: f64,
    pub gross_margin_pct: f64,
    pub operating_margin_pct: f64,
    pub fcf: f64,
    pub net_debt: f64,
}

impl KpiFact {
    pub fn value(&self, metric: KpiMetric) -> f64 {
        match metric {
            KpiMetric::Revenue => self.revenue,
            KpiMetric::GrossMarginPct => self.gross_margin_pct,
            KpiMetric::OperatingMarginPct => self.operating_margin_pct,
            KpiMetric::Fcf => self.fcf,
            KpiMetric::NetDebt => self.net_debt,
        }
    }
}

/// One segment of one company in one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentFact {
    pub ticker: String,
    pub period: String,
    pub dimension: String,
    pub key: String,
    pub revenue: f64,
    pub op_margin_pct: f64,
}

/// Static peer-set medians, keyed by metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeerBenchmark {
    values: BTreeMap<KpiMetric, f64>,
}

impl PeerBenchmark {
    pub fn new(values: impl IntoIterator<Item = (KpiMetric, f64)>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn get(&self, metric: KpiMetric) -> Option<f64> {
        self.values.get(&metric).copied()
    }
}

#[allow(clippy::too_many_arguments)]
fn kpi(
    ticker: &str,
    period: &str,
    sector: &str,
    peer_set: &str,
    revenue: f64,
    gross_margin_pct: f64,
    operating_margin_pct: f64,
    fcf: f64,
    net_debt: f64,
) -> KpiFact {
    KpiFact {
        ticker: ticker.into(),
        period: period.into(),
        sector: sector.into(),
        peer_set: peer_set.into(),
        revenue,
        gross_margin_pct,
        operating_margin_pct,
        fcf,
        net_debt,
    }
}

fn segment(ticker: &str, period: &str, key: &str, revenue: f64, op_margin_pct: f64) -> SegmentFact {
    SegmentFact {
        ticker: ticker.into(),
        period: period.into(),
        dimension: "segment".into(),
        key: key.into(),
        revenue,
        op_margin_pct,
    }
}

pub fn build_kpi_facts() -> Vec<KpiFact> {
    const SW: (&str, &str) = ("Software", "mega_cap_software");
    const HW: (&str, &str) = ("Hardware", "mega_cap_hardware");
    const NET: (&str, &str) = ("Internet", "mega_cap_internet");
    vec![
        kpi("MSFT", "2025Q2", SW.0, SW.1, 67800.0, 68.5, 43.7, 21800.0, -54000.0),
        kpi("MSFT", "2025Q3", SW.0, SW.1, 70200.0, 67.9, 42.9, 21200.0, -56000.0),
        kpi("MSFT", "2025Q4", SW.0, SW.1, 73850.0, 68.2, 43.2, 24100.0, -59000.0),
        kpi("AAPL", "2025Q2", HW.0, HW.1, 90750.0, 45.9, 30.2, 23100.0, 81000.0),
        kpi("AAPL", "2025Q3", HW.0, HW.1, 85400.0, 44.8, 29.1, 19800.0, 84500.0),
        kpi("AAPL", "2025Q4", HW.0, HW.1, 96800.0, 46.2, 31.0, 25700.0, 79000.0),
        kpi("GOOGL", "2025Q2", NET.0, NET.1, 84200.0, 57.8, 32.7, 18900.0, -98000.0),
        kpi("GOOGL", "2025Q3", NET.0, NET.1, 86550.0, 57.1, 31.8, 17600.0, -100500.0),
        kpi("GOOGL", "2025Q4", NET.0, NET.1, 90200.0, 57.9, 32.5, 20400.0, -103500.0),
    ]
}

pub fn build_segment_facts() -> Vec<SegmentFact> {
    vec![
        segment("MSFT", "2025Q3", "Productivity", 25800.0, 48.0),
        segment("MSFT", "2025Q3", "Cloud", 31200.0, 46.4),
        segment("MSFT", "2025Q3", "Personal Computing", 13200.0, 23.1),
        segment("MSFT", "2025Q4", "Productivity", 27100.0, 48.3),
        segment("MSFT", "2025Q4", "Cloud", 33850.0, 46.1),
        segment("MSFT", "2025Q4", "Personal Computing", 12900.0, 21.6),
        segment("AAPL", "2025Q3", "iPhone", 43500.0, 34.0),
        segment("AAPL", "2025Q3", "Services", 24200.0, 41.5),
        segment("AAPL", "2025Q3", "Wearables", 17700.0, 20.3),
        segment("AAPL", "2025Q4", "iPhone", 51100.0, 35.2),
        segment("AAPL", "2025Q4", "Services", 25800.0, 42.4),
        segment("AAPL", "2025Q4", "Wearables", 19900.0, 20.8),
        segment("GOOGL", "2025Q3", "Ads", 64400.0, 38.8),
        segment("GOOGL", "2025Q3", "Cloud", 10950.0, 13.4),
        segment("GOOGL", "2025Q3", "Other Bets", 1200.0, -58.0),
        segment("GOOGL", "2025Q4", "Ads", 66600.0, 39.2),
        segment("GOOGL", "2025Q4", "Cloud", 12200.0, 15.0),
        segment("GOOGL", "2025Q4", "Other Bets", 1400.0, -51.5),
    ]
}

pub fn build_peer_benchmarks() -> BTreeMap<String, PeerBenchmark> {
    use KpiMetric::*;
    let mut peers = BTreeMap::new();
    peers.insert(
        "mega_cap_software".to_string(),
        PeerBenchmark::new([
            (Revenue, 66500.0),
            (GrossMarginPct, 65.4),
            (OperatingMarginPct, 35.8),
            (Fcf, 17500.0),
            (NetDebt, -14500.0),
        ]),
    );
    peers.insert(
        "mega_cap_hardware".to_string(),
        PeerBenchmark::new([
            (Revenue, 84200.0),
            (GrossMarginPct, 40.5),
            (OperatingMarginPct, 24.2),
            (Fcf, 18600.0),
            (NetDebt, 42000.0),
        ]),
    );
    peers.insert(
        "mega_cap_internet".to_string(),
        PeerBenchmark::new([
            (Revenue, 70400.0),
            (GrossMarginPct, 52.0),
            (OperatingMarginPct, 27.0),
            (Fcf, 14900.0),
            (NetDebt, -35000.0),
        ]),
    );
    peers
}
