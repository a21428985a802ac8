use crate::{normalize::SalesFilters, query_spec::QuerySpec, types::Dimension};
use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

/// Invalid explicit input. Every variant names the offending value and
/// the valid alternatives so callers can self-correct.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Unsupported quarter '{value}'. Use Q1, Q2, Q3, or Q4.")]
    UnsupportedQuarter { value: String, available: Vec<String> },

    #[error("Unsupported {dimension} '{value}'.")]
    UnsupportedFilter {
        dimension: Dimension,
        value: String,
        available: Vec<String>,
    },

    #[error("Unsupported ticker '{value}'.")]
    UnsupportedTicker { value: String, available: Vec<String> },

    #[error("Unsupported period '{value}'.")]
    UnsupportedPeriod { value: String, available: Vec<String> },
}

impl QueryError {
    /// The valid choices for the rejected field.
    pub fn available(&self) -> &[String] {
        match self {
            Self::UnsupportedQuarter { available, .. }
            | Self::UnsupportedFilter { available, .. }
            | Self::UnsupportedTicker { available, .. }
            | Self::UnsupportedPeriod { available, .. } => available,
        }
    }

    fn available_key(&self) -> &'static str {
        match self {
            Self::UnsupportedQuarter { .. } => "available_quarters",
            Self::UnsupportedFilter { .. } => "available_values",
            Self::UnsupportedTicker { .. } => "available_tickers",
            Self::UnsupportedPeriod { .. } => "available_periods",
        }
    }
}

/// Boundary form: `{ "error": <message>, "available_<field>": [...] }`.
impl Serialize for QueryError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("error", &self.to_string())?;
        map.serialize_entry(self.available_key(), self.available())?;
        map.end()
    }
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Valid input that matched nothing. Not an error: callers branch on it.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct NoData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<SalesFilters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_spec: Option<QuerySpec>,
    pub message: String,
}

impl NoData {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            filters: None,
            query_spec: None,
            message: message.into(),
        }
    }

    pub fn with_filters(mut self, filters: SalesFilters) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_query_spec(mut self, spec: QuerySpec) -> Self {
        self.query_spec = Some(spec);
        self
    }
}

/// Result of a query that validated cleanly.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Data(T),
    NoData(NoData),
}

impl<T> Outcome<T> {
    pub fn data(self) -> Option<T> {
        match self {
            Self::Data(value) => Some(value),
            Self::NoData(_) => None,
        }
    }

    pub fn as_data(&self) -> Option<&T> {
        match self {
            Self::Data(value) => Some(value),
            Self::NoData(_) => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData(_))
    }
}
