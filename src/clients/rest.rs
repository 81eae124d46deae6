// Control-plane REST client
//
// All control endpoints are POST with a JSON body and a bearer session token.
// Failure convention: a body carrying `status: "err"` is an error whose `msg`
// is surfaced verbatim; any other 2xx body is success.

use serde_json::{json, Value};
use tracing::debug;

use crate::core::history::TradeRecord;
use crate::core::robot::{CurrencySelection, Leverage, RobotSettings};
use crate::core::types::AccountContext;
use crate::error::{ConsoleError, ConsoleResult};

pub const STATUS_PATH: &str = "/robot/status";
pub const TOGGLE_PATH: &str = "/robot/toggle";
pub const SETTINGS_GET_PATH: &str = "/robot/settings/get";
pub const SETTINGS_SET_PATH: &str = "/robot/settings/set";
pub const HISTORY_PATH: &str = "/robot/history";
pub const KEY_ACTIVATE_PATH: &str = "/key/activate";
pub const KEY_PURCHASE_PATH: &str = "/key/purchase";

#[derive(Debug, Clone)]
pub struct ControlApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ControlApiClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Swap the session token (credential provider refreshed it).
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    async fn post(&self, path: &str, body: Value) -> ConsoleResult<Value> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConsoleError::Transport(format!(
                "{} answered HTTP {}",
                path, status
            )));
        }

        let value: Value = response.json().await?;

        if value.get("status").and_then(Value::as_str) == Some("err") {
            let msg = value
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("Unknown server error")
                .to_string();
            return Err(ConsoleError::Api(msg));
        }

        Ok(value)
    }

    /// Authoritative robot run state for a context.
    pub async fn fetch_status(&self, context: AccountContext) -> ConsoleResult<bool> {
        let body = json!({ "account_type": context.as_str() });
        let value = self.post(STATUS_PATH, body).await?;

        value
            .get("robot_status")
            .and_then(Value::as_bool)
            .ok_or_else(|| ConsoleError::Parse("status response missing robot_status".to_string()))
    }

    /// Issue a start or stop command for a context.
    pub async fn toggle(&self, context: AccountContext, start: bool) -> ConsoleResult<()> {
        let body = json!({
            "robot": if start { "start" } else { "stop" },
            "account_type": context.as_str(),
        });
        self.post(TOGGLE_PATH, body).await?;
        Ok(())
    }

    pub async fn fetch_settings(&self, context: AccountContext) -> ConsoleResult<RobotSettings> {
        let body = json!({ "robot_type": context.as_str() });
        let value = self.post(SETTINGS_GET_PATH, body).await?;

        let settings = value
            .get("settings")
            .ok_or_else(|| ConsoleError::Parse("settings response missing settings".to_string()))?;

        parse_settings(settings)
    }

    pub async fn save_settings(
        &self,
        context: AccountContext,
        settings: &RobotSettings,
    ) -> ConsoleResult<()> {
        let pairs = match &settings.selected {
            CurrencySelection::All => json!("all"),
            CurrencySelection::Chosen(list) => json!(list),
        };

        let body = json!({
            "robot_type": context.as_str(),
            "leverage": settings.leverage.as_u32(),
            "minTradeAmount": settings.min_trade_amount,
            "maxTradeAmount": settings.max_trade_amount,
            "pairs": pairs,
        });
        self.post(SETTINGS_SET_PATH, body).await?;
        Ok(())
    }

    /// One page of trade history: (records, total pages).
    pub async fn fetch_history(
        &self,
        context: AccountContext,
        page: u32,
        page_size: u32,
    ) -> ConsoleResult<(Vec<TradeRecord>, u32)> {
        let body = json!({
            "robot_type": context.as_str(),
            "page": page,
            "max_on_page": page_size,
        });
        let value = self.post(HISTORY_PATH, body).await?;

        let trades = value
            .get("trades")
            .cloned()
            .ok_or_else(|| ConsoleError::Parse("history response missing trades".to_string()))?;
        let records: Vec<TradeRecord> = serde_json::from_value(trades)?;

        let pages = value
            .get("pages")
            .and_then(Value::as_u64)
            .ok_or_else(|| ConsoleError::Parse("history response missing pages".to_string()))?
            as u32;

        Ok((records, pages))
    }

    /// Activate a license key. Not idempotent: a used key cannot be
    /// reactivated. Returns the server message.
    pub async fn activate_key(&self, key: &str) -> ConsoleResult<String> {
        let body = json!({ "key": key });
        let value = self.post(KEY_ACTIVATE_PATH, body).await?;
        Ok(server_message(&value))
    }

    /// Purchase a key of the given type. Returns (message, issued key).
    pub async fn purchase_key(&self, key_type: &str) -> ConsoleResult<(String, Option<String>)> {
        let body = json!({ "key_type": key_type });
        let value = self.post(KEY_PURCHASE_PATH, body).await?;

        let key = value
            .get("key")
            .and_then(Value::as_str)
            .map(|k| k.to_string());
        Ok((server_message(&value), key))
    }
}

fn server_message(value: &Value) -> String {
    value
        .get("msg")
        .and_then(Value::as_str)
        .unwrap_or("ok")
        .to_string()
}

fn parse_settings(settings: &Value) -> ConsoleResult<RobotSettings> {
    // Wire field is spelled "avaliable_currencies" by the server
    let available = settings
        .get("avaliable_currencies")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let selected = match settings.get("trade_currencies") {
        Some(Value::String(s)) if s == "all" => CurrencySelection::All,
        Some(Value::Array(list)) => CurrencySelection::Chosen(
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        None => CurrencySelection::All,
        Some(other) => {
            return Err(ConsoleError::Parse(format!(
                "unexpected trade_currencies value: {}",
                other
            )))
        }
    };

    let leverage = settings
        .get("leverage")
        .and_then(Value::as_u64)
        .map(|raw| {
            Leverage::from_u32(raw as u32).ok_or_else(|| {
                ConsoleError::Parse(format!("unsupported leverage value: {}", raw))
            })
        })
        .transpose()?
        .unwrap_or(Leverage::X3);

    let min_trade_amount = settings
        .get("minTradeAmount")
        .and_then(Value::as_f64)
        .unwrap_or(RobotSettings::MIN_TRADE_FLOOR);

    let max_trade_amount = settings
        .get("maxTradeAmount")
        .and_then(Value::as_f64)
        .unwrap_or(RobotSettings::MAX_TRADE_FLOOR);

    Ok(RobotSettings {
        available_currencies: available,
        selected,
        leverage,
        min_trade_amount,
        max_trade_amount,
    })
}
