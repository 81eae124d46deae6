// Paginated trade history retrieval
//
// Stateless per request on the wire; the pager only tracks which page the
// view is looking at and which request is the latest. Responses are keyed by
// a monotonic sequence number so a superseded request can never overwrite the
// page the user most recently asked for.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Mutex;
use tracing::debug;

use crate::clients::rest::ControlApiClient;
use crate::core::types::{AccountContext, HISTORY_PAGE_SIZES};
use crate::error::{ConsoleError, ConsoleResult};

/// One closed robot trade, created server-side; the client only reads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub id: i64,
    /// "win", "loss" or any future status; passed through unmapped.
    pub status: String,
    pub investment: f64,
    pub profit: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub records: Vec<TradeRecord>,
}

#[derive(Debug, Clone, Copy)]
struct PagerState {
    context: AccountContext,
    page: u32,
    page_size: u32,
    /// Sequence number of the most recently issued request.
    latest_seq: u64,
}

pub struct TradeHistoryPager {
    api: ControlApiClient,
    state: Mutex<PagerState>,
}

impl TradeHistoryPager {
    pub fn new(api: ControlApiClient, context: AccountContext) -> Self {
        Self {
            api,
            state: Mutex::new(PagerState {
                context,
                page: 1,
                page_size: 10,
                latest_seq: 0,
            }),
        }
    }

    pub fn context(&self) -> AccountContext {
        self.state.lock().unwrap().context
    }

    pub fn page(&self) -> u32 {
        self.state.lock().unwrap().page
    }

    pub fn page_size(&self) -> u32 {
        self.state.lock().unwrap().page_size
    }

    /// Switch account context. Resets to page 1 and invalidates any in-flight
    /// request.
    pub fn set_context(&self, context: AccountContext) {
        let mut state = self.state.lock().unwrap();
        if state.context != context {
            state.context = context;
            state.page = 1;
            state.latest_seq += 1;
        }
    }

    /// Change the page size. Resets to page 1 and invalidates any in-flight
    /// request. Only the sizes the history view offers are accepted.
    pub fn set_page_size(&self, page_size: u32) -> ConsoleResult<()> {
        if !HISTORY_PAGE_SIZES.contains(&page_size) {
            return Err(ConsoleError::Validation(format!(
                "page size {} is not one of {:?}",
                page_size, HISTORY_PAGE_SIZES
            )));
        }

        let mut state = self.state.lock().unwrap();
        if state.page_size != page_size {
            state.page_size = page_size;
            state.page = 1;
            state.latest_seq += 1;
        }
        Ok(())
    }

    /// Navigate to a page. Page position is preserved across plain navigation
    /// (no reset), but a stale in-flight response is still invalidated.
    pub fn goto_page(&self, page: u32) -> ConsoleResult<()> {
        if page == 0 {
            return Err(ConsoleError::Validation(
                "page numbers start at 1".to_string(),
            ));
        }

        let mut state = self.state.lock().unwrap();
        if state.page != page {
            state.page = page;
            state.latest_seq += 1;
        }
        Ok(())
    }

    /// Fetch the currently selected page. Returns Ok(None) when the response
    /// arrived after a newer request was issued; the caller must simply drop
    /// it and keep waiting for the latest one.
    pub async fn fetch_current(&self) -> ConsoleResult<Option<HistoryPage>> {
        let (context, page, page_size, my_seq) = {
            let mut state = self.state.lock().unwrap();
            state.latest_seq += 1;
            (state.context, state.page, state.page_size, state.latest_seq)
        };

        let result = self.api.fetch_history(context, page, page_size).await;

        {
            let state = self.state.lock().unwrap();
            if state.latest_seq != my_seq {
                debug!(
                    "discarding superseded history response (seq {} < {})",
                    my_seq, state.latest_seq
                );
                return Ok(None);
            }
        }

        let (records, total_pages) = result?;
        Ok(Some(HistoryPage {
            page,
            page_size,
            total_pages,
            records,
        }))
    }
}
