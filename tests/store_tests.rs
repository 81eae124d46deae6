// Integration tests for the market data store fan-out

mod common;

use common::ticker_frame;
use robot_console::{decode_frame, fallback_snapshot, MarketDataStore, MarketSnapshot};
use std::sync::{Arc, Mutex};

fn snapshot(price: &str) -> MarketSnapshot {
    decode_frame(&ticker_frame("btcusdt", price, "-2.89")).unwrap()
}

#[test]
fn test_every_listener_sees_the_same_snapshot_identity() {
    // One inbound frame produces exactly one snapshot object; all views get
    // the same reference, never a copy
    let store = MarketDataStore::new();
    let seen: Arc<Mutex<Vec<Arc<MarketSnapshot>>>> = Arc::new(Mutex::new(Vec::new()));

    for _ in 0..3 {
        let seen = Arc::clone(&seen);
        store.subscribe(move |snap| seen.lock().unwrap().push(Arc::clone(snap)));
    }

    store.publish(snapshot("100.0"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(Arc::ptr_eq(&seen[0], &seen[1]));
    assert!(Arc::ptr_eq(&seen[1], &seen[2]));
}

#[test]
fn test_independent_views_derive_their_own_projections() {
    let store = MarketDataStore::new();

    let gainers = Arc::new(Mutex::new(Vec::new()));
    let losers = Arc::new(Mutex::new(Vec::new()));

    {
        let gainers = Arc::clone(&gainers);
        store.subscribe(move |snap| {
            let mut view = gainers.lock().unwrap();
            view.clear();
            view.extend(
                snap.tickers
                    .values()
                    .filter(|t| t.change_24h > 0.0)
                    .map(|t| t.symbol.clone()),
            );
        });
    }
    {
        let losers = Arc::clone(&losers);
        store.subscribe(move |snap| {
            let mut view = losers.lock().unwrap();
            view.clear();
            view.extend(
                snap.tickers
                    .values()
                    .filter(|t| t.change_24h < 0.0)
                    .map(|t| t.symbol.clone()),
            );
        });
    }

    let frame = r#"{
        "btcusdt": {"price":"83738.10","change24h":"-2.89"},
        "xrpusdt": {"price":"2.17","change24h":"0.65"}
    }"#;
    store.publish(decode_frame(frame).unwrap());

    assert_eq!(*gainers.lock().unwrap(), vec!["xrpusdt".to_string()]);
    assert_eq!(*losers.lock().unwrap(), vec!["btcusdt".to_string()]);
}

#[test]
fn test_loading_state_uses_fallback_not_empty_ui() {
    let store = MarketDataStore::new();

    // Before the first frame the consumer renders the built-in list
    let rendered = match store.snapshot() {
        Some(live) => live,
        None => Arc::new(fallback_snapshot()),
    };
    assert!(rendered.stale);
    assert!(!rendered.tickers.is_empty());

    // After the first frame the live snapshot wins
    store.publish(snapshot("100.0"));
    let rendered = store.snapshot().expect("live snapshot");
    assert!(!rendered.stale);
}

#[test]
fn test_later_frames_never_mutate_earlier_snapshots() {
    let store = MarketDataStore::new();

    store.publish(snapshot("100.0"));
    let held = store.snapshot().unwrap();

    for price in ["101.0", "102.0", "103.0"] {
        store.publish(snapshot(price));
    }

    assert_eq!(held.ticker("btcusdt").unwrap().price, 100.0);
    assert_eq!(
        store.snapshot().unwrap().ticker("btcusdt").unwrap().price,
        103.0
    );
}
