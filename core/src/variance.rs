//! Variance engine: period-over-period and peer-relative deltas.
//!
//! Sign convention for peer output: a positive percentage is always
//! good for the company, whatever the metric's direction.

use crate::{aggregate::round2, config::AnomalyConfig, types::Directionality};
use serde::Serialize;

/// Percentage change from `previous` to `current` against |previous|.
/// 0.0 when there is no baseline.
pub fn pct_delta(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    round2((current - previous) / previous.abs() * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodDelta {
    pub current: f64,
    pub previous: f64,
    pub delta: f64,
    pub delta_pct: f64,
}

pub fn period_delta(current: f64, previous: f64) -> PeriodDelta {
    PeriodDelta {
        current,
        previous,
        delta: round2(current - previous),
        delta_pct: pct_delta(current, previous),
    }
}

/// Peer-relative percentage, flipped for lower-is-better metrics so
/// that beating the peer is positive. Denominator is |peer|.
pub fn peer_delta_pct(company: f64, peer: f64, direction: Directionality) -> f64 {
    match direction {
        Directionality::HigherIsBetter => pct_delta(company, peer),
        Directionality::LowerIsBetter => {
            if peer == 0.0 {
                return 0.0;
            }
            round2((peer - company) / peer.abs() * 100.0)
        }
    }
}

/// Heuristic anomaly score: delta percentage over a fixed calibration
/// divisor. Not a statistical z-score; there is no variance estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalySignal {
    pub zscore: f64,
    pub anomaly_flag: bool,
}

pub fn anomaly_signal(delta_pct: f64, config: &AnomalyConfig) -> AnomalySignal {
    let zscore = round2(delta_pct / config.zscore_divisor);
    AnomalySignal {
        zscore,
        anomaly_flag: zscore.abs() >= config.flag_threshold,
    }
}
