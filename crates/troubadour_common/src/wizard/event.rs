//! Events consumed and effects produced by the state machine

use super::escalation::PowerAction;
use crate::inventory::ProbeReport;
use std::path::PathBuf;

/// Operator intents forwarded by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorIntent {
    Confirm,
    Reject,
    SubmitText(String),
    Retry,
    Reboot,
    Shutdown,
    Quit,
    /// Start a fresh session after Done; acted on by the runtime
    Rescan,
    /// Terminal geometry changed; redraw only
    Resize,
}

/// One unit of input to `WizardSession::handle`
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    /// Start of the session; requests inventory collection
    Begin,
    InventoryCollected(Box<ProbeReport>),
    InventoryFailed(String),
    Operator(OperatorIntent),
    /// Periodic wall-clock tick driving the sequencer
    Tick,
    /// Follow-up to `Effect::VerifySerial`
    Verify,
    LogWritten(PathBuf),
    LogFailed(String),
}

impl WizardEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            WizardEvent::Begin => "begin",
            WizardEvent::InventoryCollected(_) => "inventory_collected",
            WizardEvent::InventoryFailed(_) => "inventory_failed",
            WizardEvent::Operator(_) => "operator",
            WizardEvent::Tick => "tick",
            WizardEvent::Verify => "verify",
            WizardEvent::LogWritten(_) => "log_written",
            WizardEvent::LogFailed(_) => "log_failed",
        }
    }
}

/// Work the caller must perform after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Run the inventory probe detached; answer with InventoryCollected/Failed
    CollectInventory,
    /// Answer with `WizardEvent::Verify` before any other event
    VerifySerial,
    /// Emit the qualification record detached; answer with LogWritten/Failed
    WriteLog,
    /// Issue the OS power command without waiting, then exit
    Power(PowerAction),
    /// End the process
    Exit,
}
