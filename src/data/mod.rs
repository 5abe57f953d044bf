//! Chart data sources.
//!
//! Defines the `ChartDataSource` trait and the providers that yield the
//! two input tables (odds series and bet log): embedded CSV text, CSV
//! files on disk, and the JSON endpoint of the surrounding application.

pub mod delimited;
pub mod inline;
pub mod file;
pub mod http;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::config::{SourceConfig, SourceKind};
use crate::types::{ChartData, Timestamp};

/// Abstraction over wherever the chart's tables come from.
#[async_trait]
pub trait ChartDataSource: Send + Sync {
    /// Fetch the odds series, bet log, and gap mask.
    async fn load(&self) -> Result<ChartData>;

    /// Source name for logging and identification.
    fn name(&self) -> &str;
}

/// Build the source selected in `[source]`.
pub fn from_config(cfg: &SourceConfig) -> Result<Box<dyn ChartDataSource>> {
    let source: Box<dyn ChartDataSource> = match cfg.kind {
        SourceKind::Inline => Box::new(
            inline::InlineSource::demo()
                .with_gaps(cfg.gaps.clone().unwrap_or_else(inline::InlineSource::demo_gaps)),
        ),
        SourceKind::Csv => {
            let Some(series_path) = cfg.series_path.as_deref() else {
                bail!("source.series_path is required for csv sources");
            };
            Box::new(
                file::CsvFileSource::new(series_path, cfg.bets_path.as_deref())
                    .with_gaps(cfg.gaps.clone().unwrap_or_default()),
            )
        }
        SourceKind::Http => {
            let Some(url) = cfg.url.as_deref() else {
                bail!("source.url is required for http sources");
            };
            Box::new(http::HttpSource::new(url)?.with_gaps(cfg.gaps.clone().unwrap_or_default()))
        }
    };
    Ok(source)
}

/// Default date for bare `HH:MM:SS` times.
fn bare_time_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default()
}

/// Parse a time cell.
///
/// Accepts `HH:MM:SS[.f]` (dated 1900-01-01), `YYYY-MM-DD HH:MM:SS[.f]`,
/// `YYYY-MM-DDTHH:MM:SS[.f]`, and RFC 3339 (converted to UTC).
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, String> {
    let s = raw.trim();

    if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M:%S%.f") {
        return Ok(NaiveDateTime::new(bare_time_date(), t));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(t);
        }
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.naive_utc());
    }

    Err(format!("unrecognised time '{s}'"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
