//! Synthetic sales fact generation.
//!
//! Every row is a pure function of the constants below and the
//! positional indices of its (quarter, region, subclass, sku) cell.
//! No randomness: two builds are bit-identical.

use crate::types::{Quarter, Region, Subclass};
use serde::Serialize;

/// Degenerate cells are floored to this many units.
pub const MIN_UNITS: i64 = 28;

/// One quarter × region × subclass × SKU observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesFact {
    pub quarter: Quarter,
    pub region: Region,
    pub subclass: Subclass,
    pub sku: String,
    pub units: i64,
    pub revenue: i64,
}

struct SkuSpec {
    sku: &'static str,
    base_units: f64,
    base_price: f64,
}

const fn spec(sku: &'static str, base_units: f64, base_price: f64) -> SkuSpec {
    SkuSpec { sku, base_units, base_price }
}

fn quarter_factor(quarter: Quarter) -> f64 {
    match quarter {
        Quarter::Q1 => 0.94,
        Quarter::Q2 => 1.00,
        Quarter::Q3 => 1.07,
        Quarter::Q4 => 1.17,
    }
}

fn region_factor(region: Region) -> f64 {
    match region {
        Region::Na => 1.18,
        Region::Eu => 1.0,
        Region::Apac => 1.08,
        Region::Latam => 0.82,
    }
}

fn sku_specs(subclass: Subclass) -> &'static [SkuSpec] {
    const ELECTRONICS: [SkuSpec; 3] = [
        spec("ELEC-001", 165.0, 235.0),
        spec("ELEC-002", 145.0, 208.0),
        spec("ELEC-003", 112.0, 282.0),
    ];
    const HOME: [SkuSpec; 3] = [
        spec("HOME-001", 198.0, 152.0),
        spec("HOME-002", 172.0, 134.0),
        spec("HOME-003", 126.0, 176.0),
    ];
    const OUTDOORS: [SkuSpec; 3] = [
        spec("OUT-001", 118.0, 184.0),
        spec("OUT-002", 96.0, 204.0),
        spec("OUT-003", 88.0, 226.0),
    ];
    const BEAUTY: [SkuSpec; 3] = [
        spec("BEAU-001", 186.0, 72.0),
        spec("BEAU-002", 164.0, 86.0),
        spec("BEAU-003", 132.0, 102.0),
    ];
    match subclass {
        Subclass::Electronics => &ELECTRONICS,
        Subclass::Home => &HOME,
        Subclass::Outdoors => &OUTDOORS,
        Subclass::Beauty => &BEAUTY,
    }
}

/// A hard-coded problem or opportunity cell for the anomaly detector.
struct Pocket {
    quarter: Quarter,
    region: Region,
    sku: &'static str,
    units_multiplier: Option<f64>,
    price_multiplier: Option<f64>,
}

const POCKETS: [Pocket; 3] = [
    // Outdoors demand collapse in LATAM.
    Pocket {
        quarter: Quarter::Q3,
        region: Region::Latam,
        sku: "OUT-003",
        units_multiplier: Some(0.68),
        price_multiplier: None,
    },
    // Premium electronics surge in APAC.
    Pocket {
        quarter: Quarter::Q4,
        region: Region::Apac,
        sku: "ELEC-003",
        units_multiplier: Some(1.22),
        price_multiplier: Some(1.05),
    },
    // Home markdown in EU.
    Pocket {
        quarter: Quarter::Q2,
        region: Region::Eu,
        sku: "HOME-002",
        units_multiplier: None,
        price_multiplier: Some(0.93),
    },
];

/// Build the full sales fact table in (quarter, region, subclass, sku) order.
pub fn build_sales_facts() -> Vec<SalesFact> {
    let mut rows = Vec::with_capacity(Quarter::ALL.len() * Region::ALL.len() * 12);
    for quarter in Quarter::ALL {
        for region in Region::ALL {
            for subclass in Subclass::ALL {
                for (sku_idx, spec) in sku_specs(subclass).iter().enumerate() {
                    rows.push(build_cell(quarter, region, subclass, sku_idx, spec));
                }
            }
        }
    }
    rows
}

fn build_cell(
    quarter: Quarter,
    region: Region,
    subclass: Subclass,
    sku_idx: usize,
    spec: &SkuSpec,
) -> SalesFact {
    let (qi, ri, si) = (quarter.index(), region.index(), subclass.index());

    // Oscillates over {0.94, 0.98, 1.02, 1.06} with the cell position.
    let phase = ((qi + ri + si + sku_idx) % 4) as f64;
    let mix_adjust = 1.0 + (phase - 1.5) * 0.04;
    let raw_units =
        spec.base_units * quarter_factor(quarter) * region_factor(region) * mix_adjust;
    let mut units = (raw_units as i64).max(MIN_UNITS);

    let price_adjust =
        1.0 + (qi as f64 * 0.012) + (ri as f64 * 0.006) + (sku_idx as f64 * 0.01);
    let mut price = spec.base_price * price_adjust;

    for pocket in POCKETS
        .iter()
        .filter(|p| p.quarter == quarter && p.region == region && p.sku == spec.sku)
    {
        if let Some(m) = pocket.units_multiplier {
            units = (units as f64 * m) as i64;
        }
        if let Some(m) = pocket.price_multiplier {
            price *= m;
        }
    }

    SalesFact {
        quarter,
        region,
        subclass,
        sku: spec.sku.to_string(),
        units,
        revenue: (units as f64 * price).round_ties_even() as i64,
    }
}
