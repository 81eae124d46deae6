// Trading robot control: per-context state machine and settings validation
//
// One AutomationController serves both account contexts; state is strictly
// partitioned by AccountContext and never conflated. The TogglePending state
// guarantees at most one start/stop command in flight per context.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};

use crate::clients::rest::ControlApiClient;
use crate::core::types::{AccountContext, RobotState};
use crate::error::{ConsoleError, ConsoleResult};

/// Leverage levels the robot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leverage {
    X3,
    X5,
    X20,
    X50,
    X100,
}

impl Leverage {
    pub fn as_u32(&self) -> u32 {
        match self {
            Leverage::X3 => 3,
            Leverage::X5 => 5,
            Leverage::X20 => 20,
            Leverage::X50 => 50,
            Leverage::X100 => 100,
        }
    }

    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            3 => Some(Leverage::X3),
            5 => Some(Leverage::X5),
            20 => Some(Leverage::X20),
            50 => Some(Leverage::X50),
            100 => Some(Leverage::X100),
            _ => None,
        }
    }
}

/// Which of the available currencies the robot trades.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrencySelection {
    All,
    Chosen(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RobotSettings {
    pub available_currencies: Vec<String>,
    pub selected: CurrencySelection,
    pub leverage: Leverage,
    pub min_trade_amount: f64,
    pub max_trade_amount: f64,
}

impl RobotSettings {
    pub const MIN_TRADE_FLOOR: f64 = 5.0;
    pub const MIN_TRADE_CEIL: f64 = 10_000.0;
    pub const MAX_TRADE_FLOOR: f64 = 25.0;
    pub const MAX_TRADE_CEIL: f64 = 10_000.0;

    /// Client-side invariant check, run before any network dispatch.
    pub fn validate(&self) -> ConsoleResult<()> {
        if self.min_trade_amount < Self::MIN_TRADE_FLOOR
            || self.min_trade_amount > Self::MIN_TRADE_CEIL
        {
            return Err(ConsoleError::Validation(format!(
                "minimum trade amount must be between {} and {}",
                Self::MIN_TRADE_FLOOR,
                Self::MIN_TRADE_CEIL
            )));
        }

        if self.max_trade_amount < Self::MAX_TRADE_FLOOR
            || self.max_trade_amount > Self::MAX_TRADE_CEIL
        {
            return Err(ConsoleError::Validation(format!(
                "maximum trade amount must be between {} and {}",
                Self::MAX_TRADE_FLOOR,
                Self::MAX_TRADE_CEIL
            )));
        }

        if self.min_trade_amount >= self.max_trade_amount {
            return Err(ConsoleError::Validation(
                "minimum trade amount must be less than the maximum".to_string(),
            ));
        }

        if let CurrencySelection::Chosen(selected) = &self.selected {
            if selected.is_empty() {
                return Err(ConsoleError::Validation(
                    "select at least one currency or choose all".to_string(),
                ));
            }
            for currency in selected {
                if !self.available_currencies.contains(currency) {
                    return Err(ConsoleError::Validation(format!(
                        "currency {} is not available for this account",
                        currency
                    )));
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct ContextState {
    state: RobotState,
    /// Whether the server has been asked for the authoritative state yet.
    initialized: bool,
}

impl Default for ContextState {
    fn default() -> Self {
        Self {
            state: RobotState::Stopped,
            initialized: false,
        }
    }
}

pub struct AutomationController {
    api: ControlApiClient,
    control_timeout: Duration,
    inner: Mutex<ControllerInner>,
}

struct ControllerInner {
    active: AccountContext,
    contexts: HashMap<AccountContext, ContextState>,
}

impl AutomationController {
    pub fn new(api: ControlApiClient, control_timeout: Duration) -> Self {
        Self {
            api,
            control_timeout,
            inner: Mutex::new(ControllerInner {
                active: AccountContext::Demo,
                contexts: HashMap::new(),
            }),
        }
    }

    pub fn active_context(&self) -> AccountContext {
        self.inner.lock().unwrap().active
    }

    /// Client-observed robot state for a context. Stopped until the first
    /// server confirmation.
    pub fn state(&self, context: AccountContext) -> RobotState {
        self.inner
            .lock()
            .unwrap()
            .contexts
            .get(&context)
            .copied()
            .unwrap_or_default()
            .state
    }

    /// Query the server for the authoritative run state on first access.
    /// A failed query defaults to Stopped: never assume a bot is running
    /// without confirmation.
    pub async fn ensure_status(&self, context: AccountContext) -> RobotState {
        {
            let inner = self.inner.lock().unwrap();
            if let Some(ctx) = inner.contexts.get(&context) {
                if ctx.initialized {
                    return ctx.state;
                }
            }
        }

        let state = match self.api.fetch_status(context).await {
            Ok(true) => RobotState::Running,
            Ok(false) => RobotState::Stopped,
            Err(e) => {
                warn!(
                    "status query for {} failed ({}), defaulting to stopped",
                    context, e
                );
                RobotState::Stopped
            }
        };

        let mut inner = self.inner.lock().unwrap();
        let ctx = inner.contexts.entry(context).or_default();
        // A toggle may have raced the status query; its confirmation wins.
        if !ctx.initialized && ctx.state.is_settled() {
            ctx.state = state;
        }
        ctx.initialized = true;
        ctx.state
    }

    /// Flip the robot between stopped and running for one context.
    ///
    /// Rejected while a toggle is already pending (never queued). On server
    /// error or timeout the prior confirmed state is restored and the error
    /// surfaced for the inline banner.
    pub async fn toggle(&self, context: AccountContext) -> ConsoleResult<RobotState> {
        let prior = self.ensure_status(context).await;

        {
            let mut inner = self.inner.lock().unwrap();
            let ctx = inner.contexts.entry(context).or_default();
            if ctx.state == RobotState::TogglePending {
                return Err(ConsoleError::Precondition(
                    "a start/stop command is already in progress for this account".to_string(),
                ));
            }
            ctx.state = RobotState::TogglePending;
        }

        let start = prior == RobotState::Stopped;
        let outcome =
            tokio::time::timeout(self.control_timeout, self.api.toggle(context, start)).await;

        let mut inner = self.inner.lock().unwrap();
        let ctx = inner.contexts.entry(context).or_default();

        match outcome {
            Ok(Ok(())) => {
                let confirmed = if start {
                    RobotState::Running
                } else {
                    RobotState::Stopped
                };
                ctx.state = confirmed;
                info!("robot on {} is now {:?}", context, confirmed);
                Ok(confirmed)
            }
            Ok(Err(e)) => {
                ctx.state = prior;
                Err(e)
            }
            Err(_elapsed) => {
                ctx.state = prior;
                Err(ConsoleError::Timeout(format!(
                    "no response to the {} command within {}s",
                    if start { "start" } else { "stop" },
                    self.control_timeout.as_secs()
                )))
            }
        }
    }

    /// Switch the active account context. Hard precondition: the robot on the
    /// current context must be stopped.
    pub async fn switch_context(&self, to: AccountContext) -> ConsoleResult<()> {
        let from = self.active_context();
        if from == to {
            return Ok(());
        }

        match self.state(from) {
            RobotState::Running => {
                return Err(ConsoleError::Precondition(format!(
                    "stop the robot on the {} account before switching",
                    from
                )))
            }
            RobotState::TogglePending => {
                return Err(ConsoleError::Precondition(format!(
                    "wait for the pending {} command to finish before switching",
                    from
                )))
            }
            RobotState::Stopped => {}
        }

        self.inner.lock().unwrap().active = to;
        info!("switched account context {} -> {}", from, to);
        self.ensure_status(to).await;
        Ok(())
    }

    pub async fn fetch_settings(&self, context: AccountContext) -> ConsoleResult<RobotSettings> {
        self.api.fetch_settings(context).await
    }

    /// Save settings for a context. Validated client-side first; server
    /// validation errors are passed through unmodified. Independent of run
    /// state: no requirement that the robot be stopped.
    pub async fn save_settings(
        &self,
        context: AccountContext,
        settings: &RobotSettings,
    ) -> ConsoleResult<()> {
        settings.validate()?;
        self.api.save_settings(context, settings).await
    }

    pub async fn activate_key(&self, key: &str) -> ConsoleResult<String> {
        self.api.activate_key(key).await
    }

    pub async fn purchase_key(&self, key_type: &str) -> ConsoleResult<(String, Option<String>)> {
        self.api.purchase_key(key_type).await
    }
}
