//! Series preprocessor.
//!
//! Turns ordered raw odds rows into typed `OddsPoint`s: forward-difference
//! lifetimes, EV from the raw quotes, and gap masking of the plotted
//! copies. Rendering gates look only at the plotted copies; EV arithmetic
//! never does. That asymmetry is intentional: a suspended quote hides the
//! fill for its interval without rewriting the recorded price history.

use chrono::Duration;
use tracing::debug;

use crate::types::{
    ChartError, GapMask, Interval, OddsPoint, OddsRow, ProfitableInterval, Timestamp,
};

/// Span synthesized for the final point, which has no successor.
pub const LAST_INTERVAL_SECS: i64 = 1;

/// Largest EV accepted for a point, in percent. Each percent is one band.
pub const MAX_EV_PERCENT: f64 = 100_000.0;

/// EV of a quote pair: fraction by which soft exceeds the fair baseline.
pub fn expected_value(soft_odds: f64, fair_odds: f64) -> f64 {
    (1.0 / fair_odds) * soft_odds - 1.0
}

/// An ordered, validated odds series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    points: Vec<OddsPoint>,
}

impl Series {
    /// Validate rows and build the point sequence.
    ///
    /// Fails with `MalformedSeries` on non-positive or non-finite fair odds,
    /// non-finite soft odds, EV above `MAX_EV_PERCENT`, decreasing time, or a
    /// gap index past the end.
    /// No rows is an empty series whatever the mask says.
    pub fn build(rows: &[OddsRow], gaps: &GapMask) -> Result<Self, ChartError> {
        if rows.is_empty() {
            return Ok(Self::default());
        }

        if let Some(max) = gaps.max_index() {
            if max >= rows.len() {
                return Err(ChartError::MalformedSeries(format!(
                    "gap mask references point {max} but series has {} points",
                    rows.len()
                )));
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if !row.fair_odds.is_finite() || row.fair_odds <= 0.0 {
                return Err(ChartError::MalformedSeries(format!(
                    "fair odds must be positive, got {} at point {i}",
                    row.fair_odds
                )));
            }
            if !row.soft_odds.is_finite() {
                return Err(ChartError::MalformedSeries(format!(
                    "soft odds must be finite, got {} at point {i}",
                    row.soft_odds
                )));
            }
            let ev_percent = expected_value(row.soft_odds, row.fair_odds) * 100.0;
            if ev_percent > MAX_EV_PERCENT {
                return Err(ChartError::MalformedSeries(format!(
                    "EV of {ev_percent:.0}% at point {i} exceeds {MAX_EV_PERCENT:.0}% \
                     (soft {} over fair {})",
                    row.soft_odds, row.fair_odds
                )));
            }
            if i > 0 && row.time < rows[i - 1].time {
                return Err(ChartError::MalformedSeries(format!(
                    "time goes backwards at point {i}: {} < {}",
                    row.time,
                    rows[i - 1].time
                )));
            }
        }

        let points: Vec<OddsPoint> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let soft_gapped = row.soft_suspended || gaps.soft.contains(&i);
                let fair_gapped = row.fair_suspended || gaps.fair.contains(&i);
                let lifetime_secs = rows
                    .get(i + 1)
                    .map(|next| duration_secs(next.time - row.time));

                OddsPoint {
                    time: row.time,
                    soft_odds: (!soft_gapped).then_some(row.soft_odds),
                    fair_odds: (!fair_gapped).then_some(row.fair_odds),
                    raw_soft_odds: row.soft_odds,
                    raw_fair_odds: row.fair_odds,
                    lifetime_secs,
                    ev_value: expected_value(row.soft_odds, row.fair_odds),
                }
            })
            .collect();

        debug!(
            points = points.len(),
            soft_gaps = points.iter().filter(|p| p.soft_odds.is_none()).count(),
            fair_gaps = points.iter().filter(|p| p.fair_odds.is_none()).count(),
            "Series preprocessed"
        );

        Ok(Self { points })
    }

    pub fn points(&self) -> &[OddsPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// One interval per point; the last one spans a synthetic second.
    pub fn intervals(&self) -> Vec<Interval> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let end = match self.points.get(i + 1) {
                    Some(next) => next.time,
                    None => point.time + Duration::seconds(LAST_INTERVAL_SECS),
                };
                Interval {
                    index: i,
                    start: point.time,
                    end,
                    soft_odds: point.soft_odds,
                    fair_odds: point.fair_odds,
                    ev_value: point.ev_value,
                    lifetime_label: point.lifetime_label(),
                }
            })
            .collect()
    }

    /// Profitable intervals in time order, each tagged with its ordinal.
    pub fn profitable_intervals(&self) -> Vec<ProfitableInterval> {
        self.intervals()
            .into_iter()
            .filter(Interval::is_profitable)
            .filter_map(|iv| match (iv.soft_odds, iv.fair_odds) {
                (Some(soft), Some(fair)) => Some((iv, soft, fair)),
                _ => None,
            })
            .enumerate()
            .map(|(ordinal, (iv, soft_odds, fair_odds))| ProfitableInterval {
                ordinal,
                index: iv.index,
                start: iv.start,
                end: iv.end,
                soft_odds,
                fair_odds,
                ev_value: iv.ev_value,
                lifetime_label: iv.lifetime_label,
            })
            .collect()
    }

    /// First point time to the end of the last interval.
    pub fn time_span(&self) -> Result<(Timestamp, Timestamp), ChartError> {
        let first = self.points.first().ok_or(ChartError::EmptySeries)?;
        let last = self.points.last().ok_or(ChartError::EmptySeries)?;
        Ok((first.time, last.time + Duration::seconds(LAST_INTERVAL_SECS)))
    }
}

fn duration_secs(d: Duration) -> f64 {
    match d.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => d.num_milliseconds() as f64 / 1_000.0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
