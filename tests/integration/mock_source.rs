//! Mock data source for integration testing.
//!
//! Provides a deterministic `ChartDataSource` that returns controllable
//! in-memory tables and counts how often it was loaded, with no files or
//! network involved.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::{Arc, Mutex};

use evchart::data::ChartDataSource;
use evchart::types::*;

/// A mock chart-data source.
///
/// All state is in-memory; the data can be swapped between loads to
/// simulate a live feed.
pub struct MockSource {
    name: String,
    data: Arc<Mutex<ChartData>>,
    loads: Arc<Mutex<usize>>,
    /// If set, `load` returns this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockSource {
    pub fn new(name: &str, data: ChartData) -> Self {
        Self {
            name: name.to_string(),
            data: Arc::new(Mutex::new(data)),
            loads: Arc::new(Mutex::new(0)),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the data returned by subsequent loads.
    pub fn set_data(&self, data: ChartData) {
        *self.data.lock().unwrap() = data;
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    pub fn load_count(&self) -> usize {
        *self.loads.lock().unwrap()
    }
}

#[async_trait]
impl ChartDataSource for MockSource {
    async fn load(&self) -> Result<ChartData> {
        *self.loads.lock().unwrap() += 1;
        if let Some(msg) = self.force_error.lock().unwrap().clone() {
            return Err(anyhow!(msg));
        }
        Ok(self.data.lock().unwrap().clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// 22:00:00 plus `secs` on the bare-time date.
pub fn at(secs: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .unwrap()
        .and_hms_opt(22, 0, 0)
        .unwrap()
        + chrono::Duration::seconds(secs)
}

pub fn rows(quotes: &[(i64, f64, f64)]) -> Vec<OddsRow> {
    quotes
        .iter()
        .map(|&(secs, soft, fair)| OddsRow::new(at(secs), soft, fair))
        .collect()
}

pub fn bet(secs: i64, soft: f64, fair: f64, ev: f64, accept: f64, status: &str) -> BetRow {
    BetRow {
        timestamp: at(secs),
        soft_odds: soft,
        fair_odds: fair,
        ev_percent: ev,
        acceptance_secs: accept,
        status: status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_load_returns_data() {
        let source = MockSource::new(
            "mock",
            ChartData {
                rows: rows(&[(0, 2.1, 2.0)]),
                ..Default::default()
            },
        );
        let data = source.load().await.unwrap();
        assert_eq!(data.rows.len(), 1);
        assert_eq!(source.load_count(), 1);
        assert_eq!(source.name(), "mock");
    }

    #[tokio::test]
    async fn test_mock_forced_error() {
        let source = MockSource::new("mock", ChartData::default());
        source.set_error("feed down");
        let err = source.load().await.unwrap_err();
        assert!(err.to_string().contains("feed down"));

        source.clear_error();
        assert!(source.load().await.is_ok());
        assert_eq!(source.load_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_swapped_data() {
        let source = MockSource::new("mock", ChartData::default());
        source.set_data(ChartData {
            rows: rows(&[(0, 2.1, 2.0), (5, 2.2, 2.0)]),
            ..Default::default()
        });
        assert_eq!(source.load().await.unwrap().rows.len(), 2);
    }
}
