//! Sales fact lookup: summary, extrema and breakdowns for a filter scope.
//!
//! Two comparison scopes are reported:
//!   - global: subclass+SKU revenue across the quarter scope only
//!   - local:  depends on drill depth (SKU → subclass → top level)

use crate::{
    aggregate::{aggregate, summarize, Bucket, Summary},
    error::{NoData, Outcome, QueryResult},
    normalize::SalesFilters,
    ranking::{min_max, Extrema},
    store::{FactStore, SalesFact},
    types::Dimension,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchParams {
    pub quarter: Option<String>,
    pub subclass: Option<String>,
    pub sku: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalLevel {
    RegionForSku,
    SkuWithinSubclass,
    Subclass,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalExtrema {
    pub level: LocalLevel,
    #[serde(flatten)]
    pub extrema: Extrema,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub by_region: Vec<Bucket>,
    pub by_subclass: Vec<Bucket>,
    pub by_sku: Vec<Bucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailableDimensions {
    pub quarter: Vec<String>,
    pub subclass: Vec<String>,
    pub sku: Vec<String>,
    pub region: Vec<String>,
}

impl AvailableDimensions {
    pub fn from_store(store: &FactStore) -> Self {
        Self {
            quarter: store.distinct_values(Dimension::Quarter),
            subclass: store.distinct_values(Dimension::Subclass),
            sku: store.distinct_values(Dimension::Sku),
            region: store.distinct_values(Dimension::Region),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactsReport {
    pub filters: SalesFilters,
    pub summary: Summary,
    pub global_min_max_revenue: Extrema,
    pub local_min_max_revenue: LocalExtrema,
    pub breakdown: Breakdown,
    pub available_dimensions: AvailableDimensions,
}

pub fn fetch_facts(store: &FactStore, params: &FetchParams) -> QueryResult<Outcome<FactsReport>> {
    let filters = SalesFilters::normalize(
        store,
        params.quarter.as_deref(),
        params.subclass.as_deref(),
        params.sku.as_deref(),
        params.region.as_deref(),
    )?;

    let scope_rows: Vec<&SalesFact> = store
        .sales()
        .iter()
        .filter(|r| r.in_quarter(filters.quarter))
        .collect();
    let filtered_rows: Vec<&SalesFact> = scope_rows
        .iter()
        .copied()
        .filter(|r| filters.matches(r))
        .collect();

    log::debug!(
        "fetch_facts filters={filters:?} scope_rows={} matched={}",
        scope_rows.len(),
        filtered_rows.len()
    );

    if filtered_rows.is_empty() {
        return Ok(Outcome::NoData(
            NoData::new("No matching sales rows found for these filters.").with_filters(filters),
        ));
    }

    let global = min_max(&aggregate(
        scope_rows.iter().copied(),
        &[Dimension::Subclass, Dimension::Sku],
    ));

    let (level, local_entries) = if filters.sku.is_some() {
        (
            LocalLevel::RegionForSku,
            aggregate(filtered_rows.iter().copied(), &[Dimension::Region]),
        )
    } else if filters.subclass.is_some() {
        let subclass_rows = scope_rows.iter().copied().filter(|r| r.in_subclass(filters.subclass));
        (LocalLevel::SkuWithinSubclass, aggregate(subclass_rows, &[Dimension::Sku]))
    } else {
        (
            LocalLevel::Subclass,
            aggregate(scope_rows.iter().copied(), &[Dimension::Subclass]),
        )
    };

    let breakdown = Breakdown {
        by_region: aggregate(filtered_rows.iter().copied(), &[Dimension::Region]),
        by_subclass: aggregate(filtered_rows.iter().copied(), &[Dimension::Subclass]),
        by_sku: aggregate(filtered_rows.iter().copied(), &[Dimension::Sku]),
    };

    Ok(Outcome::Data(FactsReport {
        summary: summarize(filtered_rows.iter().copied()),
        global_min_max_revenue: global,
        local_min_max_revenue: LocalExtrema {
            level,
            extrema: min_max(&local_entries),
        },
        breakdown,
        available_dimensions: AvailableDimensions::from_store(store),
        filters,
    }))
}
