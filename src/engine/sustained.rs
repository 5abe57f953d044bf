//! Sustained-EV segments.
//!
//! A run starts at a point whose EV reaches the threshold and extends
//! while the next point arrives within `max_gap_secs` of the run's current
//! end with soft odds that have not dropped. Runs covering a single point
//! are discarded; scanning resumes after each run.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::{OddsPoint, Rgb, SustainedSegment, secs_to_duration};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SustainedConfig {
    pub enabled: bool,
    pub min_ev_percent: f64,
    pub max_gap_secs: f64,
    pub color: Rgb,
    pub alpha: f64,
    pub width: f64,
}

impl Default for SustainedConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_ev_percent: 5.0,
            max_gap_secs: 4.0,
            color: Rgb(0xef, 0x44, 0x44),
            alpha: 0.7,
            width: 1.5,
        }
    }
}

pub fn detect(points: &[OddsPoint], config: &SustainedConfig) -> Vec<SustainedSegment> {
    let max_gap: Duration = secs_to_duration(config.max_gap_secs);
    let mut segments = Vec::new();
    let mut i = 0;

    while i < points.len() {
        let start = &points[i];
        let ev_percent = start.ev_value * 100.0;
        if ev_percent < config.min_ev_percent {
            i += 1;
            continue;
        }

        let mut end = i;
        let mut prev_soft = start.soft_odds;
        for (j, next) in points.iter().enumerate().skip(i + 1) {
            let within_gap = next.time - points[end].time <= max_gap;
            let rising = match (prev_soft, next.soft_odds) {
                (Some(prev), Some(cur)) => cur >= prev,
                _ => false,
            };
            if !(within_gap && rising) {
                break;
            }
            end = j;
            prev_soft = next.soft_odds;
        }

        if end > i {
            if let Some(y) = start.soft_odds {
                segments.push(SustainedSegment {
                    start: start.time,
                    end: points[end].time,
                    y,
                    ev_percent,
                    color: config.color,
                    alpha: config.alpha,
                    width: config.width,
                });
            }
        }

        i = end + 1;
    }

    segments
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
