//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::engine::series::Series;
use crate::engine::{ChartRenderer, RenderOutput, RenderSummary};
use crate::types::{ChartData, ChartError, Layer, OddsPoint, Primitive};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub chart: RwLock<RenderOutput>,
    pub points: RwLock<Vec<OddsPoint>>,
    /// Source name and time of the last successful render.
    pub last_update: RwLock<UpdateInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateInfo {
    pub source: String,
    pub rendered_at: String,
}

impl DashboardState {
    pub fn new(chart: RenderOutput, points: Vec<OddsPoint>, source: &str) -> Self {
        Self {
            chart: RwLock::new(chart),
            points: RwLock::new(points),
            last_update: RwLock::new(UpdateInfo::now(source)),
        }
    }

    /// Render `data` and build the initial state from it.
    pub fn from_data(
        renderer: &ChartRenderer,
        data: &ChartData,
        source: &str,
    ) -> Result<Self, ChartError> {
        let (chart, points) = render_with_points(renderer, data)?;
        Ok(Self::new(chart, points, source))
    }

    /// Re-render `data` and swap it in. On error the previous chart stays.
    pub async fn refresh(
        &self,
        renderer: &ChartRenderer,
        data: &ChartData,
        source: &str,
    ) -> Result<RenderSummary, ChartError> {
        let (chart, points) = render_with_points(renderer, data)?;
        let summary = chart.summary.clone();
        *self.chart.write().await = chart;
        *self.points.write().await = points;
        *self.last_update.write().await = UpdateInfo::now(source);
        Ok(summary)
    }
}

impl UpdateInfo {
    fn now(source: &str) -> Self {
        Self {
            source: source.to_string(),
            rendered_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn render_with_points(
    renderer: &ChartRenderer,
    data: &ChartData,
) -> Result<(RenderOutput, Vec<OddsPoint>), ChartError> {
    let chart = renderer.render(data)?;
    let points = Series::build(&data.rows, &data.gaps)?.points().to_vec();
    Ok((chart, points))
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub source: String,
    pub rendered_at: String,
    pub primitives: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BetsResponse {
    pub count: usize,
    pub primitives: Vec<Primitive>,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

pub type AppState = Arc<DashboardState>;

/// GET /api/chart
pub async fn get_chart(State(state): State<AppState>) -> Json<RenderOutput> {
    let chart = state.chart.read().await;
    Json(chart.clone())
}

/// GET /api/series
pub async fn get_series(State(state): State<AppState>) -> Json<Vec<OddsPoint>> {
    let points = state.points.read().await;
    Json(points.clone())
}

/// GET /api/bets
pub async fn get_bets(State(state): State<AppState>) -> Json<BetsResponse> {
    let chart = state.chart.read().await;
    let primitives: Vec<Primitive> = chart
        .primitives
        .iter()
        .filter(|p| {
            matches!(
                p.layer,
                Layer::BetBoundaries | Layer::BetBarrels | Layer::BetAnnotations
            )
        })
        .cloned()
        .collect();

    Json(BetsResponse {
        count: chart.summary.bets,
        primitives,
    })
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let update = state.last_update.read().await.clone();
    let primitives = state.chart.read().await.primitives.len();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
            source: update.source,
            rendered_at: update.rendered_at,
            primitives,
        }),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
