//! JSON endpoint of the surrounding application.
//!
//! Expects a GET endpoint returning `{ "series": [...], "bets": [...] }`
//! with records in the same shapes (and aliases) as the CSV exports.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::delimited::{BetRecord, OddsRecord};
use super::ChartDataSource;
use crate::types::{ChartData, ChartError, GapMask};

const SOURCE_NAME: &str = "http";

/// Response body of the chart-data endpoint.
#[derive(Debug, Deserialize)]
pub struct ChartPayload {
    pub series: Vec<OddsRecord>,
    #[serde(default)]
    pub bets: Vec<BetRecord>,
}

impl ChartPayload {
    /// Convert records into typed rows, failing on the first bad one.
    pub fn into_chart_data(self, gaps: GapMask) -> Result<ChartData, ChartError> {
        let err = |kind: &str, i: usize, message: String| ChartError::DataSource {
            data_source: SOURCE_NAME.to_string(),
            message: format!("{kind} {i}: {message}"),
        };

        let rows = self
            .series
            .into_iter()
            .enumerate()
            .map(|(i, r)| r.into_row().map_err(|e| err("series record", i, e)))
            .collect::<Result<Vec<_>, _>>()?;
        let bets = self
            .bets
            .into_iter()
            .enumerate()
            .map(|(i, r)| r.into_row().map_err(|e| err("bet record", i, e)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ChartData { rows, bets, gaps })
    }
}

pub struct HttpSource {
    http: Client,
    url: String,
    gaps: GapMask,
}

impl HttpSource {
    pub fn new(url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("EVCHART/0.1.0 (odds-chart-renderer)")
            .build()
            .context("Failed to build HTTP client for chart data")?;

        Ok(Self {
            http,
            url: url.to_string(),
            gaps: GapMask::default(),
        })
    }

    pub fn with_gaps(mut self, gaps: GapMask) -> Self {
        self.gaps = gaps;
        self
    }
}

#[async_trait]
impl ChartDataSource for HttpSource {
    async fn load(&self) -> Result<ChartData> {
        debug!(url = %self.url, "Fetching chart data");

        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("Chart data request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Chart data endpoint error {status}: {body}");
        }

        let payload: ChartPayload = resp
            .json()
            .await
            .context("Failed to parse chart data response")?;

        let data = payload.into_chart_data(self.gaps.clone())?;
        info!(url = %self.url, points = data.rows.len(), bets = data.bets.len(), "Loaded chart data over HTTP");
        Ok(data)
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_conversion() {
        let json = r#"{
            "series": [
                {"time": "2026-02-21T12:00:00Z", "soft_odds": 2.10, "fair_odds": 2.00},
                {"time": "2026-02-21T12:00:07Z", "SoftOdds": 2.20, "FairOdds": 2.00, "soft_suspended": true}
            ],
            "bets": [
                {"timestamp": "2026-02-21T12:00:01Z", "soft_odds": 2.10, "fair_odds": 2.00,
                 "ev": 5.0, "acceptance_secs": 4.5, "status": "Accepted"}
            ]
        }"#;
        let payload: ChartPayload = serde_json::from_str(json).unwrap();
        let data = payload.into_chart_data(GapMask::new().with_fair([0])).unwrap();
        assert_eq!(data.rows.len(), 2);
        assert!(data.rows[1].soft_suspended);
        assert_eq!(data.bets[0].acceptance_secs, 4.5);
        assert!(data.gaps.fair.contains(&0));
    }

    #[test]
    fn test_payload_without_bets() {
        let payload: ChartPayload = serde_json::from_str(r#"{"series": []}"#).unwrap();
        let data = payload.into_chart_data(GapMask::default()).unwrap();
        assert!(data.rows.is_empty());
        assert!(data.bets.is_empty());
    }

    #[test]
    fn test_payload_bad_time() {
        let json = r#"{"series": [{"time": "soon", "soft_odds": 2.1, "fair_odds": 2.0}]}"#;
        let payload: ChartPayload = serde_json::from_str(json).unwrap();
        let err = payload.into_chart_data(GapMask::default()).unwrap_err();
        assert!(err.to_string().contains("series record 0"));
    }

    #[test]
    fn test_client_builds() {
        let source = HttpSource::new("http://localhost:8000/api/chart-data").unwrap();
        assert_eq!(source.name(), "http");
    }
}
