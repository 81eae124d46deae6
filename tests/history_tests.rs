// Integration tests for trade history pagination
//
// The interesting behavior is asynchronous: a page that arrives after the
// user already changed what they were looking at must never be rendered.

use mockito::{Matcher, Server, ServerGuard};
use robot_console::{AccountContext, ConsoleError, ControlApiClient, TradeHistoryPager};
use serde_json::json;
use std::io::Write;
use std::time::Duration;

fn pager_for(server: &ServerGuard) -> TradeHistoryPager {
    let api = ControlApiClient::new(server.url(), "test-session-token");
    TradeHistoryPager::new(api, AccountContext::Demo)
}

fn trades_body(ids: &[i64], pages: u32) -> String {
    let trades: Vec<_> = ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "status": "win",
                "investment": 50.0,
                "profit": 4.2,
                "startDate": "2026-02-11T09:30:00Z",
                "endDate": "2026-02-11T09:45:00Z",
            })
        })
        .collect();
    json!({ "status": "ok", "trades": trades, "pages": pages }).to_string()
}

#[tokio::test]
async fn test_fetch_current_page() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/robot/history")
        .match_body(Matcher::PartialJson(json!({
            "robot_type": "demo",
            "page": 1,
            "max_on_page": 10,
        })))
        .with_status(200)
        .with_body(trades_body(&[101, 102, 103], 7))
        .create_async()
        .await;

    let pager = pager_for(&server);
    let page = pager.fetch_current().await.unwrap().unwrap();

    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 10);
    assert_eq!(page.total_pages, 7);
    assert_eq!(page.records.len(), 3);
    assert_eq!(page.records[0].id, 101);
}

#[tokio::test]
async fn test_superseded_response_is_discarded() {
    let mut server = Server::new_async().await;

    // First request (10 per page) answers slowly; by the time it lands the
    // user has switched to 20 per page.
    let slow_body = trades_body(&[1, 2], 9);
    server
        .mock("POST", "/robot/history")
        .match_body(Matcher::PartialJson(json!({ "max_on_page": 10 })))
        .with_status(200)
        .with_chunked_body(move |writer| {
            std::thread::sleep(Duration::from_millis(400));
            writer.write_all(slow_body.as_bytes())
        })
        .create_async()
        .await;
    server
        .mock("POST", "/robot/history")
        .match_body(Matcher::PartialJson(json!({ "max_on_page": 20 })))
        .with_status(200)
        .with_body(trades_body(&[1, 2, 3, 4], 5))
        .create_async()
        .await;

    let pager = pager_for(&server);

    let stale = pager.fetch_current();
    let fresh = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        pager.set_page_size(20).unwrap();
        pager.fetch_current().await
    };

    let (stale, fresh) = tokio::join!(stale, fresh);

    // The slow response is dropped, not rendered
    assert_eq!(stale.unwrap(), None);

    let fresh = fresh.unwrap().unwrap();
    assert_eq!(fresh.page, 1);
    assert_eq!(fresh.page_size, 20);
    assert_eq!(fresh.records.len(), 4);
}

#[tokio::test]
async fn test_context_switch_invalidates_inflight_fetch() {
    let mut server = Server::new_async().await;

    let demo_body = trades_body(&[10], 2);
    server
        .mock("POST", "/robot/history")
        .match_body(Matcher::PartialJson(json!({ "robot_type": "demo" })))
        .with_status(200)
        .with_chunked_body(move |writer| {
            std::thread::sleep(Duration::from_millis(300));
            writer.write_all(demo_body.as_bytes())
        })
        .create_async()
        .await;

    let pager = pager_for(&server);

    let stale = pager.fetch_current();
    let switch = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        pager.set_context(AccountContext::Real);
    };

    let (stale, ()) = tokio::join!(stale, switch);

    assert_eq!(stale.unwrap(), None);
    assert_eq!(pager.context(), AccountContext::Real);
    assert_eq!(pager.page(), 1);
}

#[tokio::test]
async fn test_history_errors_propagate() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/robot/history")
        .with_status(200)
        .with_body(r#"{"status":"err","msg":"Session expired"}"#)
        .create_async()
        .await;

    let pager = pager_for(&server);
    let result = pager.fetch_current().await;

    match result {
        Err(ConsoleError::Api(msg)) => assert_eq!(msg, "Session expired"),
        other => panic!("expected server error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_navigation_requests_the_chosen_page() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/robot/history")
        .match_body(Matcher::PartialJson(json!({ "page": 3, "max_on_page": 5 })))
        .with_status(200)
        .with_body(trades_body(&[301, 302], 6))
        .create_async()
        .await;

    let pager = pager_for(&server);
    pager.set_page_size(5).unwrap();
    pager.goto_page(3).unwrap();

    let page = pager.fetch_current().await.unwrap().unwrap();
    assert_eq!(page.page, 3);
    assert_eq!(page.page_size, 5);
    assert_eq!(page.total_pages, 6);
}
