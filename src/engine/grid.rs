//! Grid overlay generator.
//!
//! Faint reference lines at each whole-percent EV level inside a
//! profitable interval, capped at `grid_cap_percent`. Lines that would sit
//! above the soft odds are dropped, not clipped.

use super::{GridStyle, Palette, PERCENT_EPSILON};
use crate::types::{GridLine, ProfitableInterval};

/// Highest whole percent walked for an interval: `min(ev, cap)` in whole
/// percent steps.
pub fn grid_steps(ev_value: f64, cap_percent: u32) -> u32 {
    if !(ev_value > 0.0) {
        return 0;
    }
    let floor = (ev_value * 100.0 + PERCENT_EPSILON).floor();
    if floor <= 0.0 {
        0
    } else {
        (floor as u32).min(cap_percent)
    }
}

/// Grid lines for one interval.
pub fn generate(
    interval: &ProfitableInterval,
    cap_percent: u32,
    style: &GridStyle,
    palette: &Palette,
) -> Vec<GridLine> {
    if interval.is_zero_length() {
        return Vec::new();
    }

    (1..=grid_steps(interval.ev_value, cap_percent))
        .filter_map(|percent| {
            let y = interval.fair_odds * (1.0 + f64::from(percent) / 100.0);
            (y <= interval.soft_odds).then(|| GridLine {
                interval_start: interval.start,
                interval_end: interval.end,
                percent,
                y,
                color: palette.positive_ev,
                alpha: style.alpha,
                width: style.width,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
