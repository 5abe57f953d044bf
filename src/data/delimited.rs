//! Delimited-text and JSON record shapes for the two input tables.
//!
//! Header names vary between exports (`Soft_Odds_Green` vs `SoftOdds`,
//! `Fair_Odds_Red` vs `FairOdds`), so every field accepts the known
//! aliases. Times are kept as text until `parse_timestamp` sees them.

use serde::{Deserialize, Serialize};
use std::io::Read;

use super::parse_timestamp;
use crate::types::{BetRow, ChartError, OddsRow};

/// One odds-series record as exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsRecord {
    #[serde(alias = "Time", alias = "timestamp", alias = "Timestamp")]
    pub time: String,
    #[serde(alias = "Soft_Odds_Green", alias = "SoftOdds", alias = "Soft_Odds", alias = "koef")]
    pub soft_odds: f64,
    #[serde(alias = "Fair_Odds_Red", alias = "FairOdds", alias = "Fair_Odds", alias = "avg_koef")]
    pub fair_odds: f64,
    #[serde(default, alias = "bookmaker_suspended")]
    pub soft_suspended: Option<bool>,
    #[serde(default, alias = "pinnacle_suspended")]
    pub fair_suspended: Option<bool>,
}

impl OddsRecord {
    pub fn into_row(self) -> Result<OddsRow, String> {
        Ok(OddsRow {
            time: parse_timestamp(&self.time)?,
            soft_odds: self.soft_odds,
            fair_odds: self.fair_odds,
            soft_suspended: self.soft_suspended.unwrap_or(false),
            fair_suspended: self.fair_suspended.unwrap_or(false),
        })
    }
}

/// One bet-attempt record as exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetRecord {
    #[serde(alias = "Timestamp", alias = "time")]
    pub timestamp: String,
    #[serde(alias = "Soft_Odds", alias = "SoftOdds")]
    pub soft_odds: f64,
    #[serde(alias = "Fair_Odds", alias = "FairOdds")]
    pub fair_odds: f64,
    #[serde(alias = "EV", alias = "ev")]
    pub ev_percent: f64,
    #[serde(alias = "Acceptance_Time", alias = "AcceptanceTime")]
    pub acceptance_secs: f64,
    #[serde(alias = "Status")]
    pub status: String,
}

impl BetRecord {
    pub fn into_row(self) -> Result<BetRow, String> {
        Ok(BetRow {
            timestamp: parse_timestamp(&self.timestamp)?,
            soft_odds: self.soft_odds,
            fair_odds: self.fair_odds,
            ev_percent: self.ev_percent,
            acceptance_secs: self.acceptance_secs,
            status: self.status,
        })
    }
}

fn source_error(data_source: &str, message: String) -> ChartError {
    ChartError::DataSource {
        data_source: data_source.to_string(),
        message,
    }
}

/// Read CSV records of type `R` and convert each with `convert`.
/// Row numbers in errors are 1-based data rows (header excluded).
fn read_table<R, T>(
    data_source: &str,
    input: impl Read,
    convert: impl Fn(R) -> Result<T, String>,
) -> Result<Vec<T>, ChartError>
where
    R: for<'de> Deserialize<'de>,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    reader
        .deserialize::<R>()
        .enumerate()
        .map(|(i, record)| {
            let record =
                record.map_err(|e| source_error(data_source, format!("row {}: {e}", i + 1)))?;
            convert(record).map_err(|e| source_error(data_source, format!("row {}: {e}", i + 1)))
        })
        .collect()
}

pub fn parse_series(data_source: &str, input: impl Read) -> Result<Vec<OddsRow>, ChartError> {
    read_table(data_source, input, OddsRecord::into_row)
}

pub fn parse_bets(data_source: &str, input: impl Read) -> Result<Vec<BetRow>, ChartError> {
    read_table(data_source, input, BetRecord::into_row)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
