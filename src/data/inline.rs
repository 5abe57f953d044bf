//! Embedded CSV source.
//!
//! Holds both tables as CSV text. `InlineSource::demo()` ships the sample
//! session used for the reference chart: twenty odds changes between
//! 21:59:55 and 22:19:31 and three bet attempts.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::delimited::{parse_bets, parse_series};
use super::ChartDataSource;
use crate::types::{ChartData, GapMask};

const SOURCE_NAME: &str = "inline";

const DEMO_SERIES: &str = "\
Time,Soft_Odds_Green,Fair_Odds_Red
21:59:55,1.90,1.70
22:01:53,2.00,1.72
22:03:51,2.00,1.85
22:05:49,2.15,2.10
22:07:47,2.20,2.28
22:09:45,2.40,2.45
22:11:43,2.50,2.58
22:13:41,2.60,2.70
22:14:37,2.75,2.78
22:15:30,2.75,2.80
22:15:36,3.00,2.82
22:15:57,3.00,2.85
22:16:01,2.75,2.86
22:16:18,2.75,2.88
22:16:23,3.00,2.90
22:17:30,3.00,3.00
22:17:35,3.25,3.05
22:18:21,3.25,3.20
22:18:25,3.40,3.30
22:19:31,3.40,3.50
";

const DEMO_BETS: &str = "\
Timestamp,Soft_Odds,Fair_Odds,EV,Acceptance_Time,Status
22:01:55,2.00,1.72,16.3,20.0,Accepted
22:15:38,3.00,2.82,6.4,25.0,Rejected
22:16:25,3.00,2.90,3.4,5.0,Rejected
";

pub struct InlineSource {
    series_csv: String,
    bets_csv: String,
    gaps: GapMask,
}

impl InlineSource {
    pub fn new(series_csv: impl Into<String>, bets_csv: impl Into<String>) -> Self {
        Self {
            series_csv: series_csv.into(),
            bets_csv: bets_csv.into(),
            gaps: GapMask::default(),
        }
    }

    /// The sample session, with no gaps.
    pub fn demo() -> Self {
        Self::new(DEMO_SERIES, DEMO_BETS)
    }

    /// Gap mask of the sample session: soft odds hidden at points 4-5,
    /// fair odds at 12-13.
    pub fn demo_gaps() -> GapMask {
        GapMask::new().with_soft([4, 5]).with_fair([12, 13])
    }

    pub fn with_gaps(mut self, gaps: GapMask) -> Self {
        self.gaps = gaps;
        self
    }
}

#[async_trait]
impl ChartDataSource for InlineSource {
    async fn load(&self) -> Result<ChartData> {
        let rows = parse_series(SOURCE_NAME, self.series_csv.as_bytes())?;
        let bets = parse_bets(SOURCE_NAME, self.bets_csv.as_bytes())?;
        info!(points = rows.len(), bets = bets.len(), "Loaded inline chart data");
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
