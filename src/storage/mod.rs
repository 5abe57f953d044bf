//! Persistence layer.
//!
//! Writes a rendered chart (frame, primitives and summary) to a JSON file
//! so external drawing front-ends can pick it up, and reads it back.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::engine::RenderOutput;

/// Default output file path.
const DEFAULT_RENDER_FILE: &str = "odds_history_gradient.json";

/// Save a rendered chart to a JSON file.
pub fn save_render(output: &RenderOutput, path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_RENDER_FILE);
    let json = serde_json::to_string_pretty(output)
        .context("Failed to serialise rendered chart")?;

    std::fs::write(path, &json)
        .context(format!("Failed to write chart to {path}"))?;

    debug!(path, primitives = output.primitives.len(), "Chart saved");
    Ok(())
}

/// Load a rendered chart from a JSON file.
/// Returns None if the file doesn't exist.
pub fn load_render(path: Option<&str>) -> Result<Option<RenderOutput>> {
    let path = path.unwrap_or(DEFAULT_RENDER_FILE);

    if !Path::new(path).exists() {
        info!(path, "No saved chart found");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .context(format!("Failed to read chart from {path}"))?;

    let output: RenderOutput = serde_json::from_str(&json)
        .context(format!("Failed to parse chart from {path}"))?;

    info!(
        path,
        primitives = output.primitives.len(),
        intervals = output.summary.profitable_intervals,
        "Chart loaded from disk"
    );

    Ok(Some(output))
}

/// Delete the output file.
pub fn delete_render(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_RENDER_FILE);
    if Path::new(path).exists() {
        std::fs::remove_file(path)
            .context(format!("Failed to delete chart file {path}"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
