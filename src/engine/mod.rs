//! Gradient rendering engine.
//!
//! A pure, single-pass computation: odds rows plus a bet log in, an
//! ordered list of drawable primitives out. No state survives a call, so
//! interactive callers re-render wholesale instead of patching.

pub mod series;
pub mod bands;
pub mod grid;
pub mod lines;
pub mod sustained;
pub mod bets;
pub mod annotations;
pub mod compose;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{ChartData, ChartError, Layer, Primitive, Quote, Rgb, Shape};
use compose::{ChartFrame, LayerStack};
use series::Series;
use sustained::SustainedConfig;

/// Tolerance when turning an EV fraction into whole percent steps.
pub const PERCENT_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Configuration (defaults; overridden by config.toml at runtime)
// ---------------------------------------------------------------------------

/// Fixed colors of the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Gradient bands, grid lines and interval labels.
    pub positive_ev: Rgb,
    pub soft: Rgb,
    pub fair: Rgb,
    pub accepted: Rgb,
    pub rejected: Rgb,
    /// Annotation box fill.
    pub panel: Rgb,
    /// Interval annotation leadline.
    pub leadline: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            positive_ev: Rgb(0x00, 0xff, 0x00),
            soft: Rgb(0x00, 0xff, 0x00),
            fair: Rgb(0xff, 0x33, 0x33),
            accepted: Rgb(0x00, 0xbf, 0xff),
            rejected: Rgb(0xff, 0xd7, 0x00),
            panel: Rgb(0x1a, 0x1a, 0x1a),
            leadline: Rgb(0x80, 0x80, 0x80),
        }
    }
}

/// Band opacity as a function of the slice's EV threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaRamp {
    pub base: f64,
    pub slope: f64,
    /// Thresholds above this get `saturated`.
    pub saturation_threshold: f64,
    pub saturated: f64,
}

impl Default for AlphaRamp {
    fn default() -> Self {
        Self {
            base: 0.1,
            slope: 7.0,
            saturation_threshold: 0.10,
            saturated: 0.80,
        }
    }
}

impl AlphaRamp {
    /// `base + threshold * slope` up to the saturation threshold, then
    /// `saturated`. The ramp never exceeds `saturated`.
    pub fn alpha_for(&self, threshold: f64) -> f64 {
        if threshold <= self.saturation_threshold {
            (self.base + threshold * self.slope).min(self.saturated)
        } else {
            self.saturated
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridStyle {
    pub alpha: f64,
    pub width: f64,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            width: 0.3,
        }
    }
}

/// Tunables of a render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Vertical offsets cycled over profitable intervals, in pixels.
    pub annotation_offsets: Vec<i32>,
    pub bet_annotation_offset: i32,
    pub grid_cap_percent: u32,
    pub alpha: AlphaRamp,
    pub grid: GridStyle,
    pub sustained: SustainedConfig,
    pub palette: Palette,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            annotation_offsets: vec![35, 80, 125],
            bet_annotation_offset: 20,
            grid_cap_percent: 25,
            alpha: AlphaRamp::default(),
            grid: GridStyle::default(),
            sustained: SustainedConfig::default(),
            palette: Palette::default(),
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ChartError> {
        if self.annotation_offsets.is_empty() {
            return Err(ChartError::Config(
                "annotation_offsets must not be empty".into(),
            ));
        }
        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(ChartError::Config(format!("{name} must be within [0, 1], got {v}")))
            }
        };
        unit("alpha.base", self.alpha.base)?;
        unit("alpha.saturated", self.alpha.saturated)?;
        unit("grid.alpha", self.grid.alpha)?;
        unit("sustained.alpha", self.sustained.alpha)?;
        if self.grid_cap_percent > 100 {
            return Err(ChartError::Config(format!(
                "grid_cap_percent must be at most 100, got {}",
                self.grid_cap_percent
            )));
        }
        if !(self.sustained.max_gap_secs >= 0.0) {
            return Err(ChartError::Config(
                "sustained.max_gap_secs must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Per-render counts, for logging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderSummary {
    pub points: usize,
    pub profitable_intervals: usize,
    pub bands: usize,
    pub grid_lines: usize,
    pub bets: usize,
    pub sustained_segments: usize,
    pub primitives: usize,
}

/// Result of one render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOutput {
    pub frame: ChartFrame,
    pub primitives: Vec<Primitive>,
    pub summary: RenderSummary,
}

impl RenderOutput {
    pub fn empty() -> Self {
        Self {
            frame: ChartFrame::empty(),
            primitives: Vec::new(),
            summary: RenderSummary::default(),
        }
    }

    /// Primitives on one layer, in draw order.
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter().filter(move |p| p.layer == layer)
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

pub struct ChartRenderer {
    config: RenderConfig,
}

impl ChartRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a chart. Input validation errors are returned as-is; an
    /// empty series renders to an empty primitive list.
    pub fn render(&self, data: &ChartData) -> Result<RenderOutput, ChartError> {
        let cfg = &self.config;
        cfg.validate()?;

        let attempts = bets::parse_attempts(&data.bets)?;
        let series = Series::build(&data.rows, &data.gaps)?;

        if series.is_empty() {
            debug!(bets = attempts.len(), "Empty series, nothing to draw");
            return Ok(RenderOutput::empty());
        }

        let profitable = series.profitable_intervals();
        let mut stack = LayerStack::new();

        for interval in &profitable {
            stack.extend(
                Layer::Grid,
                grid::generate(interval, cfg.grid_cap_percent, &cfg.grid, &cfg.palette)
                    .into_iter()
                    .map(Shape::GridLine),
            );
            stack.extend(
                Layer::Gradient,
                bands::decompose(interval, &cfg.alpha, &cfg.palette)
                    .into_iter()
                    .map(Shape::Band),
            );
            stack.push(
                Layer::IntervalAnnotations,
                Shape::Annotation(annotations::interval_annotation(
                    interval,
                    &cfg.annotation_offsets,
                    &cfg.palette,
                )),
            );
        }

        for (quote, layer) in [
            (Quote::Fair, Layer::FairOdds),
            (Quote::Soft, Layer::SoftOdds),
        ] {
            stack.extend(
                layer,
                lines::step_lines(series.points(), quote, &cfg.palette)
                    .into_iter()
                    .map(Shape::StepLine),
            );
            stack.extend(
                layer,
                lines::markers(series.points(), quote, &cfg.palette)
                    .into_iter()
                    .map(Shape::PointMarker),
            );
        }

        if cfg.sustained.enabled {
            stack.extend(
                Layer::Sustained,
                sustained::detect(series.points(), &cfg.sustained)
                    .into_iter()
                    .map(Shape::Sustained),
            );
        }

        for attempt in &attempts {
            let overlay = bets::build(attempt, &cfg.palette);
            stack.extend(
                Layer::BetBoundaries,
                [Shape::Boundary(overlay.start_line), Shape::Boundary(overlay.end_line)],
            );
            stack.push(Layer::BetBarrels, Shape::Barrel(overlay.barrel));
            stack.push(
                Layer::BetAnnotations,
                Shape::Annotation(annotations::bet_annotation(
                    attempt,
                    cfg.bet_annotation_offset,
                    &cfg.palette,
                )),
            );
        }

        let bands = stack.count(Layer::Gradient);
        let grid_lines = stack.count(Layer::Grid);
        let sustained_segments = stack.count(Layer::Sustained);
        let primitives = stack.into_primitives();

        let summary = RenderSummary {
            points: series.len(),
            profitable_intervals: profitable.len(),
            bands,
            grid_lines,
            bets: attempts.len(),
            sustained_segments,
            primitives: primitives.len(),
        };

        debug!(
            points = summary.points,
            profitable = summary.profitable_intervals,
            bands = summary.bands,
            grid_lines = summary.grid_lines,
            bets = summary.bets,
            primitives = summary.primitives,
            "Render pass complete"
        );

        Ok(RenderOutput {
            frame: ChartFrame::build(&series, &attempts),
            primitives,
            summary,
        })
    }
}

/// Render with the given configuration.
pub fn render(data: &ChartData, config: &RenderConfig) -> Result<RenderOutput, ChartError> {
    ChartRenderer::new(config.clone()).render(data)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
