//! Shared types for the EVCHART renderer.
//!
//! These types form the data model used across all modules: raw input
//! rows, the preprocessed odds points, bet attempts, and the drawable
//! primitives handed to a rendering backend. Everything here is a plain
//! value; nothing is mutated after a render pass produces it.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Timestamps are wall-clock times without a zone, as the odds feeds
/// record them.
pub type Timestamp = NaiveDateTime;

// ---------------------------------------------------------------------------
// Input rows
// ---------------------------------------------------------------------------

/// One raw observation of the two competing quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsRow {
    pub time: Timestamp,
    pub soft_odds: f64,
    pub fair_odds: f64,
    /// Soft bookmaker was suspended at this point (plotted value absent).
    #[serde(default)]
    pub soft_suspended: bool,
    /// Fair-value source was suspended at this point (plotted value absent).
    #[serde(default)]
    pub fair_suspended: bool,
}

impl OddsRow {
    pub fn new(time: Timestamp, soft_odds: f64, fair_odds: f64) -> Self {
        Self {
            time,
            soft_odds,
            fair_odds,
            soft_suspended: false,
            fair_suspended: false,
        }
    }
}

/// One raw bet-attempt record, status still unparsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetRow {
    pub timestamp: Timestamp,
    pub soft_odds: f64,
    pub fair_odds: f64,
    pub ev_percent: f64,
    pub acceptance_secs: f64,
    pub status: String,
}

/// Point indices whose plotted soft/fair value is suppressed.
///
/// Gaps only affect rendering; EV is always computed from the raw odds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapMask {
    #[serde(default)]
    pub soft: BTreeSet<usize>,
    #[serde(default)]
    pub fair: BTreeSet<usize>,
}

impl GapMask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_soft(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.soft.extend(indices);
        self
    }

    pub fn with_fair(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.fair.extend(indices);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.soft.is_empty() && self.fair.is_empty()
    }

    /// Largest index referenced by either mask.
    pub fn max_index(&self) -> Option<usize> {
        self.soft.iter().chain(self.fair.iter()).copied().max()
    }
}

/// Everything a data source yields for one chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub rows: Vec<OddsRow>,
    pub bets: Vec<BetRow>,
    #[serde(default)]
    pub gaps: GapMask,
}

// ---------------------------------------------------------------------------
// Preprocessed series
// ---------------------------------------------------------------------------

/// A typed point of the odds series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsPoint {
    pub time: Timestamp,
    /// Plotted soft odds; `None` when gapped.
    pub soft_odds: Option<f64>,
    /// Plotted fair odds; `None` when gapped.
    pub fair_odds: Option<f64>,
    pub raw_soft_odds: f64,
    pub raw_fair_odds: f64,
    /// Seconds until the next point; `None` for the last point.
    pub lifetime_secs: Option<f64>,
    /// `(1 / fair) * soft - 1`, from the raw odds.
    pub ev_value: f64,
}

impl OddsPoint {
    /// Lifetime label used in annotations: whole seconds or "Last".
    pub fn lifetime_label(&self) -> String {
        match self.lifetime_secs {
            Some(secs) => format!("{}s", secs.trunc() as i64),
            None => "Last".to_string(),
        }
    }
}

/// Half-open span between a point and its successor.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    /// Index of the start point.
    pub index: usize,
    pub start: Timestamp,
    pub end: Timestamp,
    pub soft_odds: Option<f64>,
    pub fair_odds: Option<f64>,
    pub ev_value: f64,
    pub lifetime_label: String,
}

impl Interval {
    /// Both plotted values present and EV strictly positive.
    pub fn is_profitable(&self) -> bool {
        self.soft_odds.is_some() && self.fair_odds.is_some() && self.ev_value > 0.0
    }

    pub fn is_zero_length(&self) -> bool {
        self.end <= self.start
    }
}

/// A profitable interval with its plotted odds unwrapped and its position
/// among all profitable intervals of the series.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitableInterval {
    pub ordinal: usize,
    pub index: usize,
    pub start: Timestamp,
    pub end: Timestamp,
    pub soft_odds: f64,
    pub fair_odds: f64,
    pub ev_value: f64,
    pub lifetime_label: String,
}

impl ProfitableInterval {
    pub fn ev_percent(&self) -> f64 {
        self.ev_value * 100.0
    }

    pub fn is_zero_length(&self) -> bool {
        self.end <= self.start
    }
}

// ---------------------------------------------------------------------------
// Bets
// ---------------------------------------------------------------------------

/// Outcome of a bet attempt. Exactly two classes are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetStatus {
    Accepted,
    Rejected,
}

impl BetStatus {
    /// Upper-case label shown in bet annotations.
    pub fn label(&self) -> &'static str {
        match self {
            BetStatus::Accepted => "ACCEPTED",
            BetStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetStatus::Accepted => write!(f, "Accepted"),
            BetStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

/// Parse a status string (case-insensitive).
impl std::str::FromStr for BetStatus {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accepted" => Ok(BetStatus::Accepted),
            "rejected" => Ok(BetStatus::Rejected),
            other => Err(ChartError::InvalidBetRecord(format!(
                "unknown status '{other}'"
            ))),
        }
    }
}

/// A validated bet attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetAttempt {
    pub timestamp: Timestamp,
    pub soft_odds: f64,
    pub fair_odds: f64,
    /// EV as recorded at attempt time, displayed verbatim.
    pub ev_percent: f64,
    pub acceptance_secs: f64,
    pub status: BetStatus,
}

impl BetAttempt {
    /// End of the acceptance window. Saturates at the latest representable
    /// time for hand-built attempts; validated ones always fit.
    pub fn end(&self) -> Timestamp {
        offset_by_secs(self.timestamp, self.acceptance_secs).unwrap_or(NaiveDateTime::MAX)
    }

    /// Midpoint of the acceptance window.
    pub fn center(&self) -> Timestamp {
        offset_by_secs(self.timestamp, self.acceptance_secs / 2.0).unwrap_or(NaiveDateTime::MAX)
    }
}

impl TryFrom<&BetRow> for BetAttempt {
    type Error = ChartError;

    fn try_from(row: &BetRow) -> Result<Self, Self::Error> {
        let status: BetStatus = row.status.parse()?;

        if !row.acceptance_secs.is_finite() || row.acceptance_secs < 0.0 {
            return Err(ChartError::InvalidBetRecord(format!(
                "acceptance time must be a non-negative number, got {} at {}",
                row.acceptance_secs, row.timestamp
            )));
        }
        if !row.soft_odds.is_finite() || !row.fair_odds.is_finite() || !row.ev_percent.is_finite() {
            return Err(ChartError::InvalidBetRecord(format!(
                "non-finite odds or EV at {}",
                row.timestamp
            )));
        }
        if offset_by_secs(row.timestamp, row.acceptance_secs).is_none() {
            return Err(ChartError::InvalidBetRecord(format!(
                "acceptance window out of range: {}s after {}",
                row.acceptance_secs, row.timestamp
            )));
        }

        Ok(BetAttempt {
            timestamp: row.timestamp,
            soft_odds: row.soft_odds,
            fair_odds: row.fair_odds,
            ev_percent: row.ev_percent,
            acceptance_secs: row.acceptance_secs,
            status,
        })
    }
}

/// Convert fractional seconds to a duration at microsecond resolution.
pub fn secs_to_duration(secs: f64) -> Duration {
    Duration::microseconds((secs * 1_000_000.0).round() as i64)
}

/// `time + secs`, or `None` past the representable calendar.
fn offset_by_secs(time: Timestamp, secs: f64) -> Option<Timestamp> {
    time.checked_add_signed(secs_to_duration(secs))
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// An sRGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl std::str::FromStr for Rgb {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ChartError::Config(format!("invalid color '{s}'")));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| ChartError::Config(format!("invalid color '{s}'")))
        };
        Ok(Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ChartError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Drawable primitives
// ---------------------------------------------------------------------------

/// One 1%-EV slice of the gradient fill for an interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBand {
    pub interval_start: Timestamp,
    pub interval_end: Timestamp,
    pub percent: u32,
    pub bottom: f64,
    pub top: f64,
    pub alpha: f64,
    pub color: Rgb,
}

/// Faint reference line at a whole-percent EV level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub interval_start: Timestamp,
    pub interval_end: Timestamp,
    pub percent: u32,
    pub y: f64,
    pub color: Rgb,
    pub alpha: f64,
    pub width: f64,
}

/// Which quote a primary line or marker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quote {
    Soft,
    Fair,
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quote::Soft => write!(f, "Soft Odds"),
            Quote::Fair => write!(f, "Fair Odds"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub time: Timestamp,
    pub value: f64,
}

/// A step-post polyline over one contiguous run of present values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepLine {
    pub quote: Quote,
    pub vertices: Vec<Vertex>,
    pub color: Rgb,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointMarker {
    pub quote: Quote,
    pub time: Timestamp,
    pub y: f64,
    pub color: Rgb,
    pub size: f64,
}

/// Thick horizontal marker spanning a bet attempt's acceptance window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Barrel {
    pub start: Timestamp,
    pub end: Timestamp,
    pub y: f64,
    pub status: BetStatus,
    pub color: Rgb,
    pub alpha: f64,
    pub width: f64,
}

/// Vertical dashed line at a bet window boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryLine {
    pub x: Timestamp,
    pub status: BetStatus,
    pub color: Rgb,
    pub alpha: f64,
    pub width: f64,
    pub dashed: bool,
}

/// Reference segment over a run of sustained high EV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SustainedSegment {
    pub start: Timestamp,
    pub end: Timestamp,
    pub y: f64,
    pub ev_percent: f64,
    pub color: Rgb,
    pub alpha: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Interval,
    Bet,
}

/// Box and connector styling for an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationStyle {
    pub text_color: Rgb,
    pub fill: Rgb,
    pub border: Rgb,
    pub border_width: f64,
    pub alpha: f64,
    pub leadline_color: Rgb,
    pub leadline_width: f64,
}

/// A multi-line label placed `offset_px` above its anchor, joined to the
/// anchor by a leadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub kind: AnnotationKind,
    pub anchor_time: Timestamp,
    pub anchor_y: f64,
    pub text: String,
    pub offset_px: i32,
    pub style: AnnotationStyle,
}

/// Draw layers, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Grid,
    Gradient,
    FairOdds,
    SoftOdds,
    Sustained,
    BetBoundaries,
    BetBarrels,
    IntervalAnnotations,
    BetAnnotations,
}

impl Layer {
    /// All layers in draw order.
    pub const ALL: &'static [Layer] = &[
        Layer::Grid,
        Layer::Gradient,
        Layer::FairOdds,
        Layer::SoftOdds,
        Layer::Sustained,
        Layer::BetBoundaries,
        Layer::BetBarrels,
        Layer::IntervalAnnotations,
        Layer::BetAnnotations,
    ];

    pub fn z_order(&self) -> u8 {
        match self {
            Layer::Grid => 1,
            Layer::Gradient => 2,
            Layer::FairOdds => 3,
            Layer::SoftOdds => 4,
            Layer::Sustained => 5,
            Layer::BetBoundaries => 6,
            Layer::BetBarrels => 7,
            Layer::IntervalAnnotations => 10,
            Layer::BetAnnotations => 11,
        }
    }
}

/// Geometry of a drawable primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    GridLine(GridLine),
    Band(GradientBand),
    StepLine(StepLine),
    PointMarker(PointMarker),
    Sustained(SustainedSegment),
    Boundary(BoundaryLine),
    Barrel(Barrel),
    Annotation(Annotation),
}

/// A shape tagged with its layer and z-order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub layer: Layer,
    pub z_order: u8,
    pub shape: Shape,
}

impl Primitive {
    pub fn new(layer: Layer, shape: Shape) -> Self {
        Self {
            layer,
            z_order: layer.z_order(),
            shape,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for EVCHART.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("Malformed series: {0}")]
    MalformedSeries(String),

    #[error("Series has no points")]
    EmptySeries,

    #[error("Invalid bet record: {0}")]
    InvalidBetRecord(String),

    #[error("Data source error ({data_source}): {message}")]
    DataSource { data_source: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
