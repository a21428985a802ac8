use super::{build_investigation_request, InvestigationParams};
use crate::{
    config::AnomalyConfig,
    error::{NoData, Outcome, QueryResult},
    store::FactStore,
    types::{Directionality, KpiMetric},
    variance::{anomaly_signal, peer_delta_pct, period_delta},
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiFilters {
    pub ticker: String,
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiBaseline {
    pub query_id: String,
    pub filters: KpiFilters,
    pub kpis: BTreeMap<KpiMetric, f64>,
    pub peer_set: String,
}

pub fn execute_baseline(
    store: &FactStore,
    params: &InvestigationParams,
) -> QueryResult<Outcome<KpiBaseline>> {
    let request = build_investigation_request(store, params)?;
    let Some(row) = store.kpi_row(&request.ticker, &request.period) else {
        return Ok(Outcome::NoData(NoData::new("No baseline rows found.")));
    };

    Ok(Outcome::Data(KpiBaseline {
        query_id: format!("baseline_{}_{}", request.ticker, request.period),
        kpis: request.metrics.iter().map(|m| (*m, row.value(*m))).collect(),
        peer_set: row.peer_set.clone(),
        filters: KpiFilters {
            ticker: request.ticker,
            period: request.period,
        },
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceRow {
    pub metric: KpiMetric,
    pub current: f64,
    pub previous: f64,
    pub qoq_delta: f64,
    pub qoq_delta_pct: f64,
    pub zscore: f64,
    pub directionality: Directionality,
    pub anomaly_flag: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceFilters {
    pub ticker: String,
    pub period: String,
    pub previous_period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiVariance {
    pub query_id: String,
    pub filters: VarianceFilters,
    pub variance_rows: Vec<VarianceRow>,
}

/// Period-over-period variance per metric. With no previous period the
/// baseline is zero: the delta equals the current value and the
/// percentage is 0.
pub fn execute_variance(
    store: &FactStore,
    config: &AnomalyConfig,
    params: &InvestigationParams,
) -> QueryResult<Outcome<KpiVariance>> {
    let request = build_investigation_request(store, params)?;
    let Some(current) = store.kpi_row(&request.ticker, &request.period) else {
        return Ok(Outcome::NoData(NoData::new("No current rows found.")));
    };
    let previous_period = store.previous_period(&request.period).map(str::to_string);
    let previous = previous_period
        .as_deref()
        .and_then(|p| store.kpi_row(&request.ticker, p));

    let variance_rows = request
        .metrics
        .iter()
        .map(|&metric| {
            let delta = period_delta(
                current.value(metric),
                previous.map_or(0.0, |row| row.value(metric)),
            );
            let signal = anomaly_signal(delta.delta_pct, config);
            VarianceRow {
                metric,
                current: delta.current,
                previous: delta.previous,
                qoq_delta: delta.delta,
                qoq_delta_pct: delta.delta_pct,
                zscore: signal.zscore,
                directionality: metric.directionality(),
                anomaly_flag: signal.anomaly_flag,
            }
        })
        .collect();

    Ok(Outcome::Data(KpiVariance {
        query_id: format!("variance_{}_{}", request.ticker, request.period),
        filters: VarianceFilters {
            ticker: request.ticker,
            period: request.period,
            previous_period,
        },
        variance_rows,
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerRow {
    pub metric: KpiMetric,
    pub company: f64,
    pub peer_median: f64,
    pub peer_delta: f64,
    pub peer_delta_pct: f64,
    pub directionality: Directionality,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerFilters {
    pub ticker: String,
    pub period: String,
    pub peer_set: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiPeerComparison {
    pub query_id: String,
    pub filters: PeerFilters,
    pub peer_rows: Vec<PeerRow>,
}

/// Company vs. peer-set median. `peer_delta` is the raw difference;
/// `peer_delta_pct` is positive when the company is better.
pub fn execute_peer(
    store: &FactStore,
    params: &InvestigationParams,
) -> QueryResult<Outcome<KpiPeerComparison>> {
    let request = build_investigation_request(store, params)?;
    let Some(current) = store.kpi_row(&request.ticker, &request.period) else {
        return Ok(Outcome::NoData(NoData::new("No current rows found.")));
    };
    let benchmark = store.peer_benchmark(&current.peer_set);
    if benchmark.is_none() {
        log::warn!("no benchmark for peer set '{}'; comparing to 0", current.peer_set);
    }

    let peer_rows = request
        .metrics
        .iter()
        .map(|&metric| {
            let company = current.value(metric);
            let peer = benchmark.and_then(|b| b.get(metric)).unwrap_or(0.0);
            let directionality = metric.directionality();
            PeerRow {
                metric,
                company,
                peer_median: peer,
                peer_delta: period_delta(company, peer).delta,
                peer_delta_pct: peer_delta_pct(company, peer, directionality),
                directionality,
            }
        })
        .collect();

    Ok(Outcome::Data(KpiPeerComparison {
        query_id: format!("peer_{}_{}", request.ticker, request.period),
        filters: PeerFilters {
            ticker: request.ticker,
            period: request.period,
            peer_set: current.peer_set.clone(),
        },
        peer_rows,
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiAnomalies {
    pub query_id: String,
    pub anomaly_rows: Vec<VarianceRow>,
    pub source_query_id: String,
}

/// Variance rows whose anomaly flag fired.
pub fn detect_anomalies(
    store: &FactStore,
    config: &AnomalyConfig,
    params: &InvestigationParams,
) -> QueryResult<Outcome<KpiAnomalies>> {
    let variance = match execute_variance(store, config, params)? {
        Outcome::Data(variance) => variance,
        Outcome::NoData(empty) => return Ok(Outcome::NoData(empty)),
    };

    Ok(Outcome::Data(KpiAnomalies {
        query_id: format!(
            "anomaly_{}_{}",
            variance.filters.ticker, variance.filters.period
        ),
        anomaly_rows: variance
            .variance_rows
            .into_iter()
            .filter(|row| row.anomaly_flag)
            .collect(),
        source_query_id: variance.query_id,
    }))
}
