//! Composition order.
//!
//! Shapes are collected per layer and emitted back to front, so later
//! primitives visually dominate earlier ones: grid, gradient, fair then
//! soft odds, sustained segments, bet boundaries and barrels, interval
//! labels, and bet labels on top.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::series::Series;
use crate::types::{BetAttempt, Layer, Primitive, Shape, Timestamp};

pub const CHART_TITLE: &str = "Odds History Analysis: Profit Gradient & Lifetime";
pub const Y_LABEL: &str = "Odds";
pub const TICK_FORMAT: &str = "%H:%M:%S";

/// Shapes bucketed by layer. Insertion order is kept within a layer.
#[derive(Debug, Default)]
pub struct LayerStack {
    layers: BTreeMap<Layer, Vec<Shape>>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: Layer, shape: Shape) {
        self.layers.entry(layer).or_default().push(shape);
    }

    pub fn extend(&mut self, layer: Layer, shapes: impl IntoIterator<Item = Shape>) {
        self.layers.entry(layer).or_default().extend(shapes);
    }

    pub fn count(&self, layer: Layer) -> usize {
        self.layers.get(&layer).map_or(0, Vec::len)
    }

    /// Flatten into the final draw list, back to front.
    pub fn into_primitives(self) -> Vec<Primitive> {
        self.layers
            .into_iter()
            .flat_map(|(layer, shapes)| {
                shapes.into_iter().map(move |shape| Primitive::new(layer, shape))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XTick {
    pub time: Timestamp,
    pub label: String,
}

/// Axis and title metadata for the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartFrame {
    pub title: String,
    pub y_label: String,
    pub x_ticks: Vec<XTick>,
    pub x_range: Option<(Timestamp, Timestamp)>,
    pub y_range: Option<(f64, f64)>,
}

impl ChartFrame {
    pub fn empty() -> Self {
        Self {
            title: CHART_TITLE.to_string(),
            y_label: Y_LABEL.to_string(),
            x_ticks: Vec::new(),
            x_range: None,
            y_range: None,
        }
    }

    /// Ticks at every point; ranges cover the series and all bet windows.
    pub fn build(series: &Series, attempts: &[BetAttempt]) -> Self {
        let x_ticks = series
            .points()
            .iter()
            .map(|p| XTick {
                time: p.time,
                label: p.time.format(TICK_FORMAT).to_string(),
            })
            .collect();

        let x_range = series.time_span().ok().map(|(lo, hi)| {
            attempts.iter().fold((lo, hi), |(lo, hi), a| {
                (lo.min(a.timestamp), hi.max(a.end()))
            })
        });

        let values = series
            .points()
            .iter()
            .flat_map(|p| [p.soft_odds, p.fair_odds])
            .flatten()
            .chain(attempts.iter().map(|a| a.soft_odds));
        let y_range = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });

        Self {
            title: CHART_TITLE.to_string(),
            y_label: Y_LABEL.to_string(),
            x_ticks,
            x_range,
            y_range,
        }
    }

    /// Width of the x range, if any.
    pub fn x_extent(&self) -> Option<Duration> {
        self.x_range.map(|(lo, hi)| hi - lo)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
