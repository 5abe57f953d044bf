//! EVCHART: Soft/Fair Odds Profit Gradient Renderer
//!
//! Entry point. Loads configuration, initialises structured logging,
//! loads the configured chart data, renders it, writes the primitive list
//! to disk, and optionally serves the dashboard until Ctrl+C.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use evchart::config;
use evchart::dashboard::{self, DashboardState};
use evchart::data::{self, ChartDataSource};
use evchart::engine::{ChartRenderer, RenderOutput};
use evchart::storage;

const BANNER: &str = r#"
 _____ __     __ ____ _   _    _    ____ _____
| ____|\ \   / // ___| | | |  / \  |  _ \_   _|
|  _|   \ \ / /| |   | |_| | / _ \ | |_) || |
| |___   \ V / | |___|  _  |/ ___ \|  _ < | |
|_____|   \_/   \____|_| |_/_/   \_\_| \_\|_|

  Soft/Fair Odds Profit Gradient Renderer
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = config::AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    println!("{BANNER}");

    let source = data::from_config(&cfg.source)?;
    let renderer = ChartRenderer::new(cfg.render.clone());
    info!(
        source = source.name(),
        output = %cfg.output.path,
        dashboard = cfg.dashboard.enabled,
        "EVCHART starting up"
    );

    // -- Initial render --------------------------------------------------

    let chart_data = source
        .load()
        .await
        .with_context(|| format!("Failed to load chart data from {}", source.name()))?;
    let state = DashboardState::from_data(&renderer, &chart_data, source.name())
        .context("Failed to render chart")?;

    {
        let output = state.chart.read().await;
        log_render_summary(&output);
        storage::save_render(&output, Some(&cfg.output.path))?;
        info!(path = %cfg.output.path, "Chart written");
    }

    if !cfg.dashboard.enabled {
        return Ok(());
    }

    // -- Dashboard -------------------------------------------------------

    let state = Arc::new(state);
    dashboard::spawn_dashboard(state.clone(), cfg.dashboard.port).await?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    if cfg.dashboard.refresh_secs == 0 {
        info!("Serving dashboard. Press Ctrl+C to stop.");
        shutdown.await.context("Failed to listen for shutdown signal")?;
        info!("Shutdown signal received.");
        return Ok(());
    }

    let mut interval = tokio::time::interval(Duration::from_secs(cfg.dashboard.refresh_secs));
    // The first tick fires immediately; the initial render already happened.
    interval.tick().await;

    info!(
        refresh_secs = cfg.dashboard.refresh_secs,
        "Serving dashboard with periodic reload. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = reload(&*source, &renderer, &state, &cfg.output.path).await {
                    error!(error = %e, "Reload failed, keeping previous chart");
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!("EVCHART shut down cleanly.");
    Ok(())
}

/// Reload the source, re-render, and persist the new chart.
async fn reload(
    source: &dyn ChartDataSource,
    renderer: &ChartRenderer,
    state: &DashboardState,
    output_path: &str,
) -> Result<()> {
    let chart_data = source.load().await?;
    let summary = state
        .refresh(renderer, &chart_data, source.name())
        .await
        .context("Failed to render chart")?;

    if summary.points == 0 {
        warn!(source = source.name(), "Source returned an empty series");
    }

    let output = state.chart.read().await;
    log_render_summary(&output);
    storage::save_render(&output, Some(output_path))?;
    Ok(())
}

/// Log a human-readable render summary.
fn log_render_summary(output: &RenderOutput) {
    let s = &output.summary;
    info!(
        points = s.points,
        profitable = s.profitable_intervals,
        bands = s.bands,
        grid_lines = s.grid_lines,
        bets = s.bets,
        sustained = s.sustained_segments,
        primitives = s.primitives,
        "Render complete"
    );
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("evchart=info"));

    let json_logging = std::env::var("EVCHART_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
