//! Annotation layout.
//!
//! Interval labels cycle through a fixed offset sequence by ordinal
//! position among profitable intervals. This is a deterministic counter,
//! not collision detection, so labels far apart in time still consume
//! consecutive offsets. Bet labels use one fixed offset of their own.

use super::bets::outcome_color;
use super::Palette;
use crate::types::{Annotation, AnnotationKind, AnnotationStyle, BetAttempt, ProfitableInterval};

/// Offset for the interval at `ordinal`. An empty cycle yields 0.
pub fn cycled_offset(offsets: &[i32], ordinal: usize) -> i32 {
    if offsets.is_empty() {
        return 0;
    }
    offsets[ordinal % offsets.len()]
}

pub fn interval_text(interval: &ProfitableInterval) -> String {
    format!(
        "S:{:.2}\nF:{:.2}\nEV:+{:.1}%\nLife:{}",
        interval.soft_odds,
        interval.fair_odds,
        interval.ev_percent(),
        interval.lifetime_label,
    )
}

pub fn bet_text(attempt: &BetAttempt) -> String {
    format!(
        "{}\nS:{:.2} F:{:.2}\nEV:{:+.1}%\nAccept:{:.1}s",
        attempt.status.label(),
        attempt.soft_odds,
        attempt.fair_odds,
        attempt.ev_percent,
        attempt.acceptance_secs,
    )
}

pub fn interval_annotation(
    interval: &ProfitableInterval,
    offsets: &[i32],
    palette: &Palette,
) -> Annotation {
    Annotation {
        kind: AnnotationKind::Interval,
        anchor_time: interval.start,
        anchor_y: interval.soft_odds,
        text: interval_text(interval),
        offset_px: cycled_offset(offsets, interval.ordinal),
        style: AnnotationStyle {
            text_color: palette.positive_ev,
            fill: palette.panel,
            border: palette.positive_ev,
            border_width: 0.5,
            alpha: 0.9,
            leadline_color: palette.leadline,
            leadline_width: 0.5,
        },
    }
}

pub fn bet_annotation(attempt: &BetAttempt, offset_px: i32, palette: &Palette) -> Annotation {
    let color = outcome_color(attempt.status, palette);
    Annotation {
        kind: AnnotationKind::Bet,
        anchor_time: attempt.center(),
        anchor_y: attempt.soft_odds,
        text: bet_text(attempt),
        offset_px,
        style: AnnotationStyle {
            text_color: color,
            fill: palette.panel,
            border: color,
            border_width: 1.5,
            alpha: 0.95,
            leadline_color: color,
            leadline_width: 1.0,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
