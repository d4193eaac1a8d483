mod common;

use std::time::Duration;

use chrono::NaiveDate;
use common::{intraday, settle, watchlist, RecordingRenderer, ScriptedGateway};
use stock_viewer::models::{Period, Stock, Surface};
use stock_viewer::{MockGateway, Viewer, ViewerError, ViewerHandle};

const REFRESH: Duration = Duration::from_secs(60);

async fn scripted() -> (ViewerHandle, ScriptedGateway, RecordingRenderer) {
    let gateway = ScriptedGateway::new(watchlist());
    let renderer = RecordingRenderer::new();
    let (handle, _task) = Viewer::new(gateway.clone(), renderer.clone(), REFRESH).spawn();
    handle.wait_for_watchlist().await.unwrap();
    (handle, gateway, renderer)
}

#[tokio::test(start_paused = true)]
async fn test_watchlist_loads_on_start_and_every_interval() {
    let (handle, gateway, _renderer) = scripted().await;
    assert_eq!(gateway.stock_calls(), 1);
    assert_eq!(handle.watchlist().stocks, watchlist());

    let mut updates = handle.watchlist_updates();
    updates.borrow_and_update();
    gateway.set_stocks(Ok(vec![Stock::new("AAPL", 155.0, 3.2)]));

    let started = tokio::time::Instant::now();
    tokio::time::sleep(Duration::from_secs(59)).await;
    assert!(!updates.has_changed().unwrap());

    updates.changed().await.unwrap();
    assert_eq!(started.elapsed(), REFRESH);
    assert_eq!(gateway.stock_calls(), 2);
    assert_eq!(handle.watchlist().stocks[0].price, 155.0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_refresh_keeps_list_and_reports() {
    let (handle, gateway, _renderer) = scripted().await;
    gateway.set_stocks(Err(ViewerError::stocks("upstream down")));

    handle.refresh_now().await.unwrap();
    settle().await;

    let state = handle.watchlist();
    assert_eq!(state.stocks.len(), 3);
    assert_eq!(state.error.as_deref(), Some("Failed to fetch stock data: upstream down"));
}

#[tokio::test(start_paused = true)]
async fn test_select_and_draw_with_mock_gateway() {
    let gateway = MockGateway::new().with_anchor(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    let renderer = RecordingRenderer::new();
    let (handle, _task) = Viewer::new(gateway, renderer.clone(), REFRESH).spawn();
    handle.wait_for_watchlist().await.unwrap();

    assert_eq!(handle.show_panel(Surface::new(800, 400)).await, Ok(None));

    let generation = handle.select(Some("aapl"), None).await.unwrap().expect("redraw started");
    let panel = handle.wait_for_panel(generation).await.unwrap();
    let chart = panel.chart.expect("chart drawn");
    assert_eq!(chart.symbol, "AAPL");
    assert_eq!(chart.period, Period::Today);
    assert_eq!(chart.series.labels[..2], ["9:30".to_string(), "10:00".to_string()]);
    assert_eq!(chart.series.prices[..2], [150.25, 151.30]);

    assert_eq!(handle.select(Some("AAPL"), Some(Period::Today)).await, Ok(None));
    assert_eq!(renderer.creates(), 1);

    let generation = handle.set_period(Period::Year).await.unwrap().unwrap();
    let panel = handle.wait_for_panel(generation).await.unwrap();
    assert_eq!(panel.chart.unwrap().series.len(), 12);
    assert_eq!(renderer.creates(), 2);
    assert_eq!(renderer.max_live(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_stock_changes_nothing() {
    let (handle, _gateway, _renderer) = scripted().await;

    let result = handle.select(Some("tsla"), Some(Period::Year)).await;
    assert_eq!(result, Err(ViewerError::UnknownStock("TSLA".to_string())));
    assert_eq!(handle.selection().period, Period::Today);
    assert!(handle.selection().stock.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_dropped() {
    let (handle, gateway, renderer) = scripted().await;
    handle.show_panel(Surface::new(800, 400)).await.unwrap();

    handle.select(Some("AAPL"), None).await.unwrap();
    let latest = handle.select(Some("GOOGL"), None).await.unwrap().unwrap();
    gateway.wait_for_pending(2).await;

    assert!(gateway.resolve("GOOGL", Period::Today, Ok(intraday())));
    let panel = handle.wait_for_panel(latest).await.unwrap();
    assert_eq!(panel.chart.as_ref().unwrap().symbol, "GOOGL");

    assert!(gateway.resolve("AAPL", Period::Today, Ok(intraday())));
    settle().await;

    assert_eq!(handle.panel().chart.unwrap().symbol, "GOOGL");
    assert_eq!(renderer.creates(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_returning_to_shown_chart_clears_fetch_error() {
    let (handle, gateway, renderer) = scripted().await;
    handle.show_panel(Surface::new(800, 400)).await.unwrap();

    let generation = handle.select(Some("AAPL"), None).await.unwrap().unwrap();
    gateway.wait_for_pending(1).await;
    gateway.resolve("AAPL", Period::Today, Ok(intraday()));
    handle.wait_for_panel(generation).await.unwrap();

    let generation = handle.select(Some("MSFT"), None).await.unwrap().unwrap();
    gateway.wait_for_pending(1).await;
    gateway.resolve("MSFT", Period::Today, Err(ViewerError::historical("MSFT", "offline")));
    let panel = handle.wait_for_panel(generation).await.unwrap();
    assert!(panel.error.is_some());

    assert_eq!(handle.select(Some("AAPL"), None).await, Ok(None));
    let panel = handle.panel();
    assert!(panel.error.is_none());
    assert_eq!(panel.chart.unwrap().symbol, "AAPL");
    assert_eq!(renderer.creates(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_panicked_fetch_settles_panel_and_allows_retry() {
    let (handle, gateway, renderer) = scripted().await;
    handle.show_panel(Surface::new(800, 400)).await.unwrap();

    let generation = handle.select(Some("AAPL"), None).await.unwrap().unwrap();
    gateway.wait_for_pending(1).await;
    assert!(gateway.panic("AAPL", Period::Today));

    let panel = handle.wait_for_panel(generation).await.unwrap();
    assert!(!panel.loading);
    assert_eq!(
        panel.error.as_deref(),
        Some("Failed to fetch historical data for AAPL: fetch task panicked")
    );
    assert!(handle.watchlist().error.is_none());

    // the failed key is no longer in flight, so asking again fetches again
    let retry = handle.select(Some("AAPL"), None).await.unwrap().unwrap();
    assert!(retry > generation);
    gateway.wait_for_pending(1).await;
    gateway.resolve("AAPL", Period::Today, Ok(intraday()));
    handle.wait_for_panel(retry).await.unwrap();
    assert_eq!(renderer.creates(), 1);
    assert_eq!(gateway.historical_calls(), 2);

    handle.refresh_now().await.unwrap();
    settle().await;
    assert_eq!(gateway.stock_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_clearing_selection_releases_chart() {
    let (handle, gateway, renderer) = scripted().await;
    handle.show_panel(Surface::new(800, 400)).await.unwrap();

    let generation = handle.select(Some("GOOGL"), None).await.unwrap().unwrap();
    gateway.wait_for_pending(1).await;
    gateway.resolve("GOOGL", Period::Today, Ok(intraday()));
    handle.wait_for_panel(generation).await.unwrap();

    handle.clear_selection().await.unwrap();
    assert!(handle.selection().stock.is_none());
    assert!(handle.panel().chart.is_none());
    assert_eq!(renderer.live(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_hiding_panel_during_fetch_discards_result() {
    let (handle, gateway, renderer) = scripted().await;
    handle.show_panel(Surface::new(800, 400)).await.unwrap();

    handle.select(Some("MSFT"), Some(Period::Year)).await.unwrap();
    gateway.wait_for_pending(1).await;
    handle.hide_panel().await.unwrap();

    gateway.resolve("MSFT", Period::Year, Err(ViewerError::historical("MSFT", "late")));
    settle().await;

    let panel = handle.panel();
    assert!(panel.error.is_none());
    assert!(panel.chart.is_none());
    assert!(!panel.loading);
    assert_eq!(renderer.creates(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_selection_while_hidden_draws_on_show() {
    let (handle, gateway, renderer) = scripted().await;

    assert_eq!(handle.select(Some("GOOGL"), Some(Period::ThirtyDays)).await, Ok(None));
    assert_eq!(gateway.historical_calls(), 0);

    let generation = handle.show_panel(Surface::new(800, 400)).await.unwrap().unwrap();
    gateway.wait_for_pending(1).await;
    assert_eq!(gateway.pending(), vec![("GOOGL".to_string(), Period::ThirtyDays)]);

    gateway.resolve("GOOGL", Period::ThirtyDays, Ok(intraday()));
    let panel = handle.wait_for_panel(generation).await.unwrap();
    assert_eq!(panel.chart.unwrap().period, Period::ThirtyDays);
    assert_eq!(renderer.live(), 1);

    handle.hide_panel().await.unwrap();
    assert_eq!(renderer.live(), 0);
    assert_eq!(handle.selection().symbol(), Some("GOOGL"));
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_panel_times_out() {
    let (handle, _gateway, _renderer) = scripted().await;
    handle.show_panel(Surface::new(800, 400)).await.unwrap();

    let generation = handle.select(Some("AAPL"), None).await.unwrap().unwrap();
    let result = handle.wait_for_panel_timeout(generation, Duration::from_secs(15)).await;

    match result {
        Err(ViewerError::FetchFailed { symbol, reason, .. }) => {
            assert_eq!(symbol.as_deref(), Some("AAPL"));
            assert_eq!(reason, "no response after 15 s");
        }
        other => panic!("expected a timeout, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_releases_chart_and_closes_handle() {
    let gateway = ScriptedGateway::new(watchlist());
    let renderer = RecordingRenderer::new();
    let (handle, task) = Viewer::new(gateway.clone(), renderer.clone(), REFRESH).spawn();
    handle.wait_for_watchlist().await.unwrap();

    handle.show_panel(Surface::new(800, 400)).await.unwrap();
    let generation = handle.select(Some("AAPL"), None).await.unwrap().unwrap();
    gateway.wait_for_pending(1).await;
    gateway.resolve("AAPL", Period::Today, Ok(intraday()));
    handle.wait_for_panel(generation).await.unwrap();
    assert_eq!(renderer.live(), 1);

    handle.shutdown().await;
    task.await.unwrap();

    assert_eq!(renderer.live(), 0);
    assert_eq!(handle.select(Some("AAPL"), None).await, Err(ViewerError::ViewerClosed));

    // no more refresh ticks once stopped
    tokio::time::sleep(REFRESH * 3).await;
    assert_eq!(gateway.stock_calls(), 1);
}
