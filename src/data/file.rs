//! CSV files on disk.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use super::delimited::{parse_bets, parse_series};
use super::ChartDataSource;
use crate::types::{ChartData, GapMask};

const SOURCE_NAME: &str = "csv";

pub struct CsvFileSource {
    series_path: PathBuf,
    /// Optional; a missing bet log means no overlays.
    bets_path: Option<PathBuf>,
    gaps: GapMask,
}

impl CsvFileSource {
    pub fn new(series_path: impl Into<PathBuf>, bets_path: Option<&str>) -> Self {
        Self {
            series_path: series_path.into(),
            bets_path: bets_path.map(PathBuf::from),
            gaps: GapMask::default(),
        }
    }

    pub fn with_gaps(mut self, gaps: GapMask) -> Self {
        self.gaps = gaps;
        self
    }
}

#[async_trait]
impl ChartDataSource for CsvFileSource {
    async fn load(&self) -> Result<ChartData> {
        let series_text = tokio::fs::read_to_string(&self.series_path)
            .await
            .with_context(|| format!("Failed to read series file {}", self.series_path.display()))?;
        let rows = parse_series(SOURCE_NAME, series_text.as_bytes())
            .with_context(|| format!("Failed to parse {}", self.series_path.display()))?;

        let bets = match &self.bets_path {
            Some(path) => {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read bets file {}", path.display()))?;
                parse_bets(SOURCE_NAME, text.as_bytes())
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            None => Vec::new(),
        };

        info!(
            series = %self.series_path.display(),
            points = rows.len(),
            bets = bets.len(),
            "Loaded chart data from CSV"
        );

        Ok(ChartData {
            rows,
            bets,
            gaps: self.gaps.clone(),
        })
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
