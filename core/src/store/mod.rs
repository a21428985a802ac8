//! In-memory fact store.
//!
//! RULE: The store is built once and never mutated afterwards.
//! Query modules borrow it immutably; nothing in the engine caches
//! derived state on it.

mod kpi;
mod sales;

pub use kpi::{KpiFact, PeerBenchmark, SegmentFact, KPI_PERIODS};
pub use sales::{SalesFact, MIN_UNITS};

use crate::types::{Dimension, Quarter, Region, Subclass};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq)]
pub struct FactStore {
    sales: Vec<SalesFact>,
    kpis: Vec<KpiFact>,
    segments: Vec<SegmentFact>,
    peers: BTreeMap<String, PeerBenchmark>,
    periods: Vec<String>,
}

impl FactStore {
    /// Materialize the fixed synthetic tables.
    pub fn build() -> Self {
        Self {
            sales: sales::build_sales_facts(),
            kpis: kpi::build_kpi_facts(),
            segments: kpi::build_segment_facts(),
            peers: kpi::build_peer_benchmarks(),
            periods: KPI_PERIODS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Assemble a store from caller-supplied tables (alternate fixtures).
    /// `periods` must be in chronological order.
    pub fn from_parts(
        sales: Vec<SalesFact>,
        kpis: Vec<KpiFact>,
        segments: Vec<SegmentFact>,
        peers: BTreeMap<String, PeerBenchmark>,
        periods: Vec<String>,
    ) -> Self {
        Self { sales, kpis, segments, peers, periods }
    }

    // ── Sales ──────────────────────────────────────────────────

    pub fn sales(&self) -> &[SalesFact] {
        &self.sales
    }

    /// Sorted distinct values of a sales dimension.
    pub fn distinct_values(&self, dimension: Dimension) -> Vec<String> {
        let values: BTreeSet<&str> = self.sales.iter().map(|r| r.label(dimension)).collect();
        values.into_iter().map(str::to_string).collect()
    }

    pub fn has_sku(&self, sku: &str) -> bool {
        self.sales.iter().any(|r| r.sku == sku)
    }

    // ── KPI ────────────────────────────────────────────────────

    pub fn kpis(&self) -> &[KpiFact] {
        &self.kpis
    }

    pub fn segments(&self) -> &[SegmentFact] {
        &self.segments
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    /// Sorted distinct tickers.
    pub fn tickers(&self) -> Vec<String> {
        let tickers: BTreeSet<&str> = self.kpis.iter().map(|r| r.ticker.as_str()).collect();
        tickers.into_iter().map(str::to_string).collect()
    }

    pub fn kpi_row(&self, ticker: &str, period: &str) -> Option<&KpiFact> {
        self.kpis
            .iter()
            .find(|r| r.ticker == ticker && r.period == period)
    }

    pub fn segment_rows<'a>(
        &'a self,
        ticker: &'a str,
        period: &'a str,
    ) -> impl Iterator<Item = &'a SegmentFact> + 'a {
        self.segments
            .iter()
            .filter(move |r| r.ticker == ticker && r.period == period)
    }

    pub fn peer_benchmark(&self, peer_set: &str) -> Option<&PeerBenchmark> {
        self.peers.get(peer_set)
    }

    /// The period immediately before `period`, or None at the start.
    pub fn previous_period(&self, period: &str) -> Option<&str> {
        let idx = self.periods.iter().position(|p| p == period)?;
        idx.checked_sub(1).map(|i| self.periods[i].as_str())
    }
}

impl Default for FactStore {
    fn default() -> Self {
        Self::build()
    }
}

impl SalesFact {
    /// Categorical value of this row for a dimension.
    pub fn label(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Quarter => self.quarter.as_str(),
            Dimension::Region => self.region.as_str(),
            Dimension::Subclass => self.subclass.as_str(),
            Dimension::Sku => &self.sku,
        }
    }

    pub fn in_quarter(&self, quarter: Option<Quarter>) -> bool {
        quarter.is_none_or(|q| self.quarter == q)
    }

    pub fn in_region(&self, region: Option<Region>) -> bool {
        region.is_none_or(|r| self.region == r)
    }

    pub fn in_subclass(&self, subclass: Option<Subclass>) -> bool {
        subclass.is_none_or(|s| self.subclass == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_period_walks_the_fixed_ordering() {
        let store = FactStore::build();
        assert_eq!(store.previous_period("2025Q4"), Some("2025Q3"));
        assert_eq!(store.previous_period("2025Q3"), Some("2025Q2"));
        assert_eq!(store.previous_period("2025Q2"), None);
        assert_eq!(store.previous_period("2024Q4"), None);
    }

    #[test]
    fn one_kpi_row_per_ticker_period() {
        let store = FactStore::build();
        for ticker in store.tickers() {
            for period in store.periods() {
                let count = store
                    .kpis()
                    .iter()
                    .filter(|r| r.ticker == ticker && r.period == *period)
                    .count();
                assert_eq!(count, 1, "{ticker}/{period} should have exactly one row");
            }
        }
    }
}
