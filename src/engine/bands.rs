//! Gradient band decomposer.
//!
//! Each profitable interval is filled with a stack of 1%-EV slices from
//! the fair-odds baseline upward. Slice tops are clipped to the soft odds;
//! bottoms never are. Opacity ramps with depth and saturates at 10% EV.

use super::{AlphaRamp, Palette, PERCENT_EPSILON};
use crate::types::{GradientBand, ProfitableInterval};

/// Number of whole-percent slices an EV value spans: `ceil(ev * 100)`.
///
/// Float noise just above an integer percent (e.g. `2.1 / 2.0 - 1`) does
/// not produce an extra empty slice.
pub fn band_count(ev_value: f64) -> u32 {
    if !(ev_value > 0.0) {
        return 0;
    }
    let ceil = (ev_value * 100.0 - PERCENT_EPSILON).ceil();
    if ceil <= 0.0 {
        0
    } else {
        ceil as u32
    }
}

/// Build the band stack for one interval.
pub fn decompose(
    interval: &ProfitableInterval,
    ramp: &AlphaRamp,
    palette: &Palette,
) -> Vec<GradientBand> {
    if interval.is_zero_length() {
        return Vec::new();
    }

    let fair = interval.fair_odds;
    let soft = interval.soft_odds;

    (1..=band_count(interval.ev_value))
        .filter_map(|percent| {
            let threshold = f64::from(percent) / 100.0;
            let bottom = fair * (1.0 + threshold - 0.01);
            let top = (fair * (1.0 + threshold)).min(soft);

            // Degenerate slice: the soft odds sit on the slice's floor.
            if bottom >= top {
                return None;
            }

            Some(GradientBand {
                interval_start: interval.start,
                interval_end: interval.end,
                percent,
                bottom,
                top,
                alpha: ramp.alpha_for(threshold),
                color: palette.positive_ev,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
