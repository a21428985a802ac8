//! Shared vocabulary types used across the engine.
//!
//! RULE: Every categorical token that crosses the query boundary is a
//! closed enum here. Raw strings are parsed once, in normalize.rs,
//! and never compared ad hoc anywhere else.

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Sales dimensions ──────────────────────────────────────────────

/// Fiscal quarter of the sales fact table. Declaration order is the
/// period ordering used for previous-period lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
        }
    }

    /// Zero-based position in the period ordering.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The immediately preceding quarter, or None for the first one.
    pub fn previous(&self) -> Option<Quarter> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "NA")]
    Na,
    #[serde(rename = "EU")]
    Eu,
    #[serde(rename = "APAC")]
    Apac,
    #[serde(rename = "LATAM")]
    Latam,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Na, Region::Eu, Region::Apac, Region::Latam];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Na => "NA",
            Self::Eu => "EU",
            Self::Apac => "APAC",
            Self::Latam => "LATAM",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Subclass {
    Electronics,
    Home,
    Outdoors,
    Beauty,
}

impl Subclass {
    pub const ALL: [Subclass; 4] = [
        Subclass::Electronics,
        Subclass::Home,
        Subclass::Outdoors,
        Subclass::Beauty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::Home => "Home",
            Self::Outdoors => "Outdoors",
            Self::Beauty => "Beauty",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// A groupable attribute of a sales fact row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Quarter,
    Region,
    Subclass,
    Sku,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Quarter,
        Dimension::Region,
        Dimension::Subclass,
        Dimension::Sku,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quarter => "quarter",
            Self::Region => "region",
            Self::Subclass => "subclass",
            Self::Sku => "sku",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == token)
    }
}

/// A numeric quantity available on an aggregation bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesMetric {
    Revenue,
    Units,
    AvgPrice,
}

impl SalesMetric {
    pub const ALL: [SalesMetric; 3] = [SalesMetric::Revenue, SalesMetric::Units, SalesMetric::AvgPrice];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Units => "units",
            Self::AvgPrice => "avg_price",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == token)
    }
}

// ── Query shaping ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankOrder {
    Asc,
    Desc,
}

impl RankOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Comparison attached to an executed query spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareTo {
    None,
    PreviousPeriod,
}

impl CompareTo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::PreviousPeriod => "previous_period",
        }
    }
}

// ── KPI vocabulary ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiMetric {
    Revenue,
    GrossMarginPct,
    OperatingMarginPct,
    Fcf,
    NetDebt,
}

impl KpiMetric {
    pub const ALL: [KpiMetric; 5] = [
        KpiMetric::Revenue,
        KpiMetric::GrossMarginPct,
        KpiMetric::OperatingMarginPct,
        KpiMetric::Fcf,
        KpiMetric::NetDebt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::GrossMarginPct => "gross_margin_pct",
            Self::OperatingMarginPct => "operating_margin_pct",
            Self::Fcf => "fcf",
            Self::NetDebt => "net_debt",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == token)
    }

    /// Net debt is the only metric where a smaller value is an improvement.
    pub fn directionality(&self) -> Directionality {
        match self {
            Self::NetDebt => Directionality::LowerIsBetter,
            _ => Directionality::HigherIsBetter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directionality {
    HigherIsBetter,
    LowerIsBetter,
}

/// Comparison modes an investigation request may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiComparison {
    Qoq,
    Yoy,
    Peer,
}

impl KpiComparison {
    pub const ALL: [KpiComparison; 3] = [KpiComparison::Qoq, KpiComparison::Yoy, KpiComparison::Peer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qoq => "qoq",
            Self::Yoy => "yoy",
            Self::Peer => "peer",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == token)
    }
}

macro_rules! display_as_str {
    ($($ty:ty),+) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })+
    };
}

display_as_str!(
    Quarter,
    Region,
    Subclass,
    Dimension,
    SalesMetric,
    RankOrder,
    CompareTo,
    KpiMetric,
    KpiComparison
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_quarter_follows_declaration_order() {
        assert_eq!(Quarter::Q1.previous(), None);
        assert_eq!(Quarter::Q2.previous(), Some(Quarter::Q1));
        assert_eq!(Quarter::Q4.previous(), Some(Quarter::Q3));
    }

    #[test]
    fn only_net_debt_is_lower_is_better() {
        for metric in KpiMetric::ALL {
            let expected = if metric == KpiMetric::NetDebt {
                Directionality::LowerIsBetter
            } else {
                Directionality::HigherIsBetter
            };
            assert_eq!(metric.directionality(), expected, "wrong direction for {metric}");
        }
    }

    #[test]
    fn region_serializes_as_upper_case_label() {
        let json = serde_json::to_string(&Region::Latam).unwrap();
        assert_eq!(json, "\"LATAM\"");
    }
}
