// Common types used across the console core

use std::fmt;

/// Isolation boundary between demo and real trading. Robot state, settings
/// and trade history are all partitioned by this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountContext {
    Demo,
    Real,
}

impl AccountContext {
    /// Wire value used by the control endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountContext::Demo => "demo",
            AccountContext::Real => "real",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "demo" => Some(AccountContext::Demo),
            "real" => Some(AccountContext::Real),
            _ => None,
        }
    }
}

impl fmt::Display for AccountContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Robot run state per account context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotState {
    Stopped,
    Running,
    /// A start/stop command is in flight. At most one per context.
    TogglePending,
}

impl RobotState {
    /// True once the state is confirmed by the server (no command in flight).
    pub fn is_settled(&self) -> bool {
        !matches!(self, RobotState::TogglePending)
    }
}

/// Page sizes the history view offers.
pub const HISTORY_PAGE_SIZES: [u32; 4] = [5, 10, 20, 50];
