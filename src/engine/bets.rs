//! Bet overlay builder.
//!
//! Each attempt becomes a thick "barrel" at its recorded soft odds spanning
//! the acceptance window, plus dashed boundary lines at both ends. Color is
//! chosen from the outcome alone; no EV is recomputed here.

use super::Palette;
use crate::types::{Barrel, BetAttempt, BetRow, BetStatus, BoundaryLine, ChartError, Rgb};

pub const BARREL_WIDTH: f64 = 15.0;
pub const BARREL_ALPHA: f64 = 0.8;
pub const BOUNDARY_WIDTH: f64 = 1.5;
pub const BOUNDARY_ALPHA: f64 = 0.5;

/// Overlay primitives for one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct BetOverlay {
    pub barrel: Barrel,
    pub start_line: BoundaryLine,
    pub end_line: BoundaryLine,
}

/// Validate raw rows into attempts, failing on the first bad record.
pub fn parse_attempts(rows: &[BetRow]) -> Result<Vec<BetAttempt>, ChartError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            BetAttempt::try_from(row).map_err(|e| match e {
                ChartError::InvalidBetRecord(msg) => {
                    ChartError::InvalidBetRecord(format!("bet {i}: {msg}"))
                }
                other => other,
            })
        })
        .collect()
}

pub fn outcome_color(status: BetStatus, palette: &Palette) -> Rgb {
    match status {
        BetStatus::Accepted => palette.accepted,
        BetStatus::Rejected => palette.rejected,
    }
}

pub fn build(attempt: &BetAttempt, palette: &Palette) -> BetOverlay {
    let color = outcome_color(attempt.status, palette);
    let end = attempt.end();
    let boundary = |x| BoundaryLine {
        x,
        status: attempt.status,
        color,
        alpha: BOUNDARY_ALPHA,
        width: BOUNDARY_WIDTH,
        dashed: true,
    };

    BetOverlay {
        barrel: Barrel {
            start: attempt.timestamp,
            end,
            y: attempt.soft_odds,
            status: attempt.status,
            color,
            alpha: BARREL_ALPHA,
            width: BARREL_WIDTH,
        },
        start_line: boundary(attempt.timestamp),
        end_line: boundary(end),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
