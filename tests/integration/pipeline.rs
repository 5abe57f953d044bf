//! End-to-end pipeline tests.
//!
//! Replays the sample session and hand-built series through data source,
//! renderer, storage and dashboard state, checking the chart contract at
//! each stage.

use chrono::Duration;
use std::sync::Arc;

use evchart::dashboard::DashboardState;
use evchart::data::inline::InlineSource;
use evchart::data::ChartDataSource;
use evchart::engine::{render, ChartRenderer, RenderConfig, RenderOutput};
use evchart::storage;
use evchart::types::*;

use crate::mock_source::{at, bet, rows, MockSource};

async fn demo_output() -> RenderOutput {
    let data = InlineSource::demo()
        .with_gaps(InlineSource::demo_gaps())
        .load()
        .await
        .unwrap();
    render(&data, &RenderConfig::default()).unwrap()
}

fn shapes<'a>(output: &'a RenderOutput, layer: Layer) -> Vec<&'a Shape> {
    output.layer(layer).map(|p| &p.shape).collect()
}

// ---------------------------------------------------------------------------
// Sample session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_demo_summary() {
    let output = demo_output().await;
    let s = &output.summary;
    assert_eq!(s.points, 20);
    assert_eq!(s.profitable_intervals, 10);
    assert_eq!(s.bands, 71);
    assert_eq!(s.grid_lines, 61);
    assert_eq!(s.bets, 3);
    assert_eq!(s.sustained_segments, 0);
    // grid + bands + (2 lines + 18 markers) per quote + 4 shapes per bet
    // + one label per profitable interval
    assert_eq!(s.primitives, 61 + 71 + 20 + 20 + 12 + 10);
    assert_eq!(s.primitives, output.primitives.len());
}

#[tokio::test]
async fn test_demo_draw_order() {
    let output = demo_output().await;
    let layers: Vec<Layer> = output.primitives.iter().map(|p| p.layer).collect();
    assert!(layers.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(layers.first(), Some(&Layer::Grid));
    assert_eq!(layers.last(), Some(&Layer::BetAnnotations));

    // Every bet overlay sits above every band.
    let last_band = output
        .primitives
        .iter()
        .rposition(|p| p.layer == Layer::Gradient)
        .unwrap();
    let first_bet = output
        .primitives
        .iter()
        .position(|p| matches!(p.shape, Shape::Barrel(_) | Shape::Boundary(_)))
        .unwrap();
    assert!(first_bet > last_band);
}

#[tokio::test]
async fn test_demo_annotation_offsets_cycle() {
    let output = demo_output().await;
    let offsets: Vec<i32> = shapes(&output, Layer::IntervalAnnotations)
        .into_iter()
        .map(|s| match s {
            Shape::Annotation(a) => a.offset_px,
            other => panic!("unexpected shape {other:?}"),
        })
        .collect();
    assert_eq!(offsets, vec![35, 80, 125, 35, 80, 125, 35, 80, 125, 35]);
}

#[tokio::test]
async fn test_demo_gaps_break_lines_only() {
    let output = demo_output().await;
    let soft_lines: Vec<&StepLine> = shapes(&output, Layer::SoftOdds)
        .into_iter()
        .filter_map(|s| match s {
            Shape::StepLine(l) => Some(l),
            _ => None,
        })
        .collect();
    assert_eq!(soft_lines.len(), 2);
    assert_eq!(soft_lines[0].vertices.len(), 4);
    assert_eq!(soft_lines[1].vertices.len(), 14);

    let fair_markers = shapes(&output, Layer::FairOdds)
        .into_iter()
        .filter(|s| matches!(s, Shape::PointMarker(_)))
        .count();
    assert_eq!(fair_markers, 18);
}

#[tokio::test]
async fn test_demo_bet_overlays() {
    let output = demo_output().await;
    let barrels: Vec<&Barrel> = shapes(&output, Layer::BetBarrels)
        .into_iter()
        .filter_map(|s| match s {
            Shape::Barrel(b) => Some(b),
            _ => None,
        })
        .collect();
    assert_eq!(barrels.len(), 3);
    assert_eq!(barrels[0].status, BetStatus::Accepted);
    assert_eq!(barrels[0].color.to_string(), "#00bfff");
    assert_eq!(barrels[1].color.to_string(), "#ffd700");

    let texts: Vec<&str> = shapes(&output, Layer::BetAnnotations)
        .into_iter()
        .filter_map(|s| match s {
            Shape::Annotation(a) => Some(a.text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(texts[0], "ACCEPTED\nS:2.00 F:1.72\nEV:+16.3%\nAccept:20.0s");
    assert!(texts[2].starts_with("REJECTED"));
}

#[tokio::test]
async fn test_demo_frame() {
    let output = demo_output().await;
    assert_eq!(output.frame.y_label, "Odds");
    assert_eq!(output.frame.x_ticks.len(), 20);
    assert_eq!(output.frame.x_ticks[0].label, "21:59:55");
    let (lo, hi) = output.frame.y_range.unwrap();
    assert!(lo <= 1.70 && hi >= 3.50);
}

#[tokio::test]
async fn test_render_is_idempotent() {
    let a = demo_output().await;
    let b = demo_output().await;
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

// ---------------------------------------------------------------------------
// Reference scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_single_point_series() {
    let source = MockSource::new(
        "mock",
        ChartData {
            rows: rows(&[(0, 2.00, 1.72)]),
            ..Default::default()
        },
    );
    let data = source.load().await.unwrap();
    let output = render(&data, &RenderConfig::default()).unwrap();

    let bands: Vec<&GradientBand> = shapes(&output, Layer::Gradient)
        .into_iter()
        .filter_map(|s| match s {
            Shape::Band(b) => Some(b),
            _ => None,
        })
        .collect();
    assert_eq!(bands.len(), 17);
    assert_eq!(bands[0].interval_end - bands[0].interval_start, Duration::seconds(1));
    assert!((bands[16].top - 2.00).abs() < 1e-9);
    assert!(bands.iter().all(|b| b.bottom < b.top && b.top <= 2.00 + 1e-9));
    assert!(bands.windows(2).all(|w| w[0].alpha <= w[1].alpha));
    assert!(bands[10..].iter().all(|b| (b.alpha - 0.80).abs() < 1e-9));

    assert_eq!(output.summary.grid_lines, 16);

    match shapes(&output, Layer::IntervalAnnotations)[0] {
        Shape::Annotation(a) => {
            assert_eq!(a.text, "S:2.00\nF:1.72\nEV:+16.3%\nLife:Last");
            assert_eq!(a.offset_px, 35);
        }
        other => panic!("unexpected shape {other:?}"),
    }
}

#[tokio::test]
async fn test_non_positive_fair_odds_rejected() {
    let data = ChartData {
        rows: rows(&[(0, 2.1, 2.0), (5, 2.1, 0.0)]),
        ..Default::default()
    };
    let err = render(&data, &RenderConfig::default()).unwrap_err();
    assert!(matches!(err, ChartError::MalformedSeries(_)));

    let data = ChartData {
        rows: rows(&[(0, 2.1, -1.5)]),
        ..Default::default()
    };
    assert!(matches!(
        render(&data, &RenderConfig::default()),
        Err(ChartError::MalformedSeries(_))
    ));
}

#[tokio::test]
async fn test_rejected_bet_window() {
    let data = ChartData {
        rows: rows(&[(0, 3.00, 2.82)]),
        bets: vec![bet(938, 3.00, 2.82, 6.4, 25.0, "Rejected")],
        ..Default::default()
    };
    let output = render(&data, &RenderConfig::default()).unwrap();

    let barrel = shapes(&output, Layer::BetBarrels)
        .into_iter()
        .find_map(|s| match s {
            Shape::Barrel(b) => Some(b.clone()),
            _ => None,
        })
        .unwrap();
    // 22:15:38 + 25 s
    assert_eq!(barrel.start, at(938));
    assert_eq!(barrel.end, at(963));
    assert_eq!(barrel.color, RenderConfig::default().palette.rejected);

    match shapes(&output, Layer::BetAnnotations)[0] {
        Shape::Annotation(a) => {
            assert_eq!(a.anchor_time, at(950) + Duration::milliseconds(500));
            assert_eq!(a.offset_px, 20);
        }
        other => panic!("unexpected shape {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_series_renders_nothing() {
    let output = render(&ChartData::default(), &RenderConfig::default()).unwrap();
    assert!(output.primitives.is_empty());
    assert!(output.frame.x_range.is_none());
}

#[tokio::test]
async fn test_empty_series_with_gap_mask_renders_nothing() {
    let source = MockSource::new(
        "mock",
        ChartData {
            gaps: InlineSource::demo_gaps(),
            ..Default::default()
        },
    );
    let data = source.load().await.unwrap();
    let output = render(&data, &RenderConfig::default()).unwrap();
    assert!(output.primitives.is_empty());
    assert_eq!(output.summary.points, 0);
}

#[tokio::test]
async fn test_empty_series_still_validates_bets() {
    let data = ChartData {
        bets: vec![bet(0, 2.0, 1.9, 5.0, -1.0, "Accepted")],
        ..Default::default()
    };
    assert!(matches!(
        render(&data, &RenderConfig::default()),
        Err(ChartError::InvalidBetRecord(_))
    ));
}

#[tokio::test]
async fn test_zero_ev_point_is_not_profitable() {
    let data = ChartData {
        rows: rows(&[(0, 2.00, 2.00), (10, 1.90, 2.00)]),
        ..Default::default()
    };
    let output = render(&data, &RenderConfig::default()).unwrap();
    assert_eq!(output.summary.profitable_intervals, 0);
    assert_eq!(output.layer(Layer::Gradient).count(), 0);
    assert_eq!(output.layer(Layer::Grid).count(), 0);
    assert_eq!(output.layer(Layer::IntervalAnnotations).count(), 0);
    // Lines and markers are still drawn.
    assert!(output.layer(Layer::SoftOdds).count() > 0);
}

#[tokio::test]
async fn test_unknown_bet_status_rejected() {
    let data = ChartData {
        rows: rows(&[(0, 2.1, 2.0)]),
        bets: vec![bet(0, 2.1, 2.0, 5.0, 3.0, "Pending")],
        ..Default::default()
    };
    let err = render(&data, &RenderConfig::default()).unwrap_err();
    assert!(matches!(err, ChartError::InvalidBetRecord(_)));
    assert!(err.to_string().contains("unknown status 'pending'"));
}

#[tokio::test]
async fn test_acceptance_window_past_calendar_rejected() {
    let data = ChartData {
        rows: rows(&[(0, 2.1, 2.0)]),
        bets: vec![bet(0, 2.1, 2.0, 5.0, 1e13, "Accepted")],
        ..Default::default()
    };
    let err = render(&data, &RenderConfig::default()).unwrap_err();
    assert!(matches!(err, ChartError::InvalidBetRecord(_)));
    assert!(err.to_string().contains("bet 0"));
}

#[tokio::test]
async fn test_absurd_odds_rejected_before_band_decomposition() {
    let data = ChartData {
        rows: rows(&[(0, 2.1, 2.0), (5, 1e10, 1.0)]),
        ..Default::default()
    };
    assert!(matches!(
        render(&data, &RenderConfig::default()),
        Err(ChartError::MalformedSeries(_))
    ));
}

// ---------------------------------------------------------------------------
// Gaps and suspension
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_suspended_point_hides_fill_but_keeps_ev() {
    let mut series = rows(&[(0, 2.10, 2.00), (10, 2.20, 2.00)]);
    series[0].fair_suspended = true;
    let data = ChartData {
        rows: series,
        ..Default::default()
    };

    let output = render(&data, &RenderConfig::default()).unwrap();
    // Only the second point (10% EV, synthetic 1 s interval) is filled.
    assert_eq!(output.summary.profitable_intervals, 1);
    assert_eq!(output.summary.bands, 10);

    let renderer = ChartRenderer::new(RenderConfig::default());
    let state = DashboardState::from_data(&renderer, &data, "mock").unwrap();
    let points = state.points.read().await;
    assert!(points[0].fair_odds.is_none());
    assert!((points[0].ev_value - 0.05).abs() < 1e-9);
}

#[tokio::test]
async fn test_gap_index_out_of_range() {
    let data = ChartData {
        rows: rows(&[(0, 2.1, 2.0)]),
        bets: Vec::new(),
        gaps: GapMask::new().with_soft([3]),
    };
    assert!(matches!(
        render(&data, &RenderConfig::default()),
        Err(ChartError::MalformedSeries(_))
    ));
}

// ---------------------------------------------------------------------------
// Storage and dashboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_render_save_load_roundtrip() {
    let mut path = std::env::temp_dir();
    path.push(format!("evchart_it_{}.json", uuid::Uuid::new_v4()));
    let path = path.to_string_lossy().to_string();

    let output = demo_output().await;
    storage::save_render(&output, Some(&path)).unwrap();
    let loaded = storage::load_render(Some(&path)).unwrap().unwrap();
    assert_eq!(loaded.summary, output.summary);
    assert_eq!(loaded.primitives.len(), output.primitives.len());
    assert_eq!(loaded.frame.x_ticks, output.frame.x_ticks);

    storage::delete_render(Some(&path)).unwrap();
    assert!(storage::load_render(Some(&path)).unwrap().is_none());
}

#[tokio::test]
async fn test_dashboard_refresh_from_live_source() {
    let source = MockSource::new(
        "mock",
        ChartData {
            rows: rows(&[(0, 2.10, 2.00)]),
            ..Default::default()
        },
    );
    let renderer = ChartRenderer::new(RenderConfig::default());
    let data = source.load().await.unwrap();
    let state = Arc::new(DashboardState::from_data(&renderer, &data, source.name()).unwrap());
    assert_eq!(state.chart.read().await.summary.bands, 5);

    source.set_data(ChartData {
        rows: rows(&[(0, 2.10, 2.00), (4, 2.20, 2.00)]),
        ..Default::default()
    });
    let data = source.load().await.unwrap();
    let summary = state.refresh(&renderer, &data, source.name()).await.unwrap();
    assert_eq!(summary.profitable_intervals, 2);
    assert_eq!(summary.bands, 15);
    assert_eq!(source.load_count(), 2);

    source.set_error("feed down");
    assert!(source.load().await.is_err());
    assert_eq!(state.chart.read().await.summary.bands, 15);
}
