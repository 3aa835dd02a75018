//! Escalation Handler
//!
//! After a mismatch the operator chooses: retry entry, reboot or power off.
//! Power commands are issued by the caller without waiting for completion.

use super::event::OperatorIntent;
use crate::config::EscalationConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerAction {
    Reboot,
    Shutdown,
}

impl PowerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerAction::Reboot => "reboot",
            PowerAction::Shutdown => "shutdown",
        }
    }

    /// Configured command line for this action
    pub fn command<'a>(&self, config: &'a EscalationConfig) -> &'a [String] {
        match self {
            PowerAction::Reboot => &config.reboot_command,
            PowerAction::Shutdown => &config.shutdown_command,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationDecision {
    Retry,
    Power(PowerAction),
}

/// Map an operator intent on the mismatch screen to a decision
pub fn escalate(intent: &OperatorIntent) -> Option<EscalationDecision> {
    match intent {
        OperatorIntent::Retry => Some(EscalationDecision::Retry),
        OperatorIntent::Reboot => Some(EscalationDecision::Power(PowerAction::Reboot)),
        OperatorIntent::Shutdown => Some(EscalationDecision::Power(PowerAction::Shutdown)),
        _ => None,
    }
}
