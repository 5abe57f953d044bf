//! Primary odds lines and point markers.
//!
//! Each quote is drawn as step-post polylines broken at gapped points,
//! with a marker on every present value.

use super::Palette;
use crate::types::{OddsPoint, PointMarker, Quote, Rgb, StepLine, Vertex};

pub const FAIR_LINE_WIDTH: f64 = 2.5;
pub const SOFT_LINE_WIDTH: f64 = 2.0;
pub const MARKER_SIZE: f64 = 25.0;

fn plotted(point: &OddsPoint, quote: Quote) -> Option<f64> {
    match quote {
        Quote::Soft => point.soft_odds,
        Quote::Fair => point.fair_odds,
    }
}

fn style(quote: Quote, palette: &Palette) -> (Rgb, f64) {
    match quote {
        Quote::Soft => (palette.soft, SOFT_LINE_WIDTH),
        Quote::Fair => (palette.fair, FAIR_LINE_WIDTH),
    }
}

/// Step lines over contiguous runs of present values. Runs of a single
/// point draw nothing and are left to their marker.
pub fn step_lines(points: &[OddsPoint], quote: Quote, palette: &Palette) -> Vec<StepLine> {
    let (color, width) = style(quote, palette);
    let mut lines = Vec::new();
    let mut run: Vec<Vertex> = Vec::new();

    let mut flush = |run: &mut Vec<Vertex>| {
        if run.len() >= 2 {
            lines.push(StepLine {
                quote,
                vertices: std::mem::take(run),
                color,
                width,
            });
        } else {
            run.clear();
        }
    };

    for point in points {
        match plotted(point, quote) {
            Some(value) => run.push(Vertex {
                time: point.time,
                value,
            }),
            None => flush(&mut run),
        }
    }
    flush(&mut run);

    lines
}

pub fn markers(points: &[OddsPoint], quote: Quote, palette: &Palette) -> Vec<PointMarker> {
    let (color, _) = style(quote, palette);
    points
        .iter()
        .filter_map(|point| {
            plotted(point, quote).map(|y| PointMarker {
                quote,
                time: point.time,
                y,
                color,
                size: MARKER_SIZE,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
