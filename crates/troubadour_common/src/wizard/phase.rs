//! Wizard phases and the four operator-facing progress stages

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current position of the single wizard session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Init,
    CollectingInventory,
    ReviewInventory,
    DisplayTest,
    ConfirmDisplay,
    EnterSerial,
    VerifyingSerial,
    SerialConfirmed,
    SerialMismatch,
    WritingLog,
    Done,
    /// Collaborator failure; the cause is kept on the session
    FatalError,
    /// Reboot or power-off handed to the OS; terminal, not Done
    Escalated,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::CollectingInventory => "collecting_inventory",
            Phase::ReviewInventory => "review_inventory",
            Phase::DisplayTest => "display_test",
            Phase::ConfirmDisplay => "confirm_display",
            Phase::EnterSerial => "enter_serial",
            Phase::VerifyingSerial => "verifying_serial",
            Phase::SerialConfirmed => "serial_confirmed",
            Phase::SerialMismatch => "serial_mismatch",
            Phase::WritingLog => "writing_log",
            Phase::Done => "done",
            Phase::FatalError => "fatal_error",
            Phase::Escalated => "escalated",
        }
    }

    /// No further transitions except quitting
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::FatalError | Phase::Escalated)
    }

    /// The progress stage this phase belongs to
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Phase::Init | Phase::CollectingInventory | Phase::ReviewInventory => {
                Some(Stage::Inventory)
            }
            Phase::DisplayTest | Phase::ConfirmDisplay => Some(Stage::DisplayTest),
            Phase::EnterSerial
            | Phase::VerifyingSerial
            | Phase::SerialConfirmed
            | Phase::SerialMismatch
            | Phase::Escalated => Some(Stage::SerialCheck),
            Phase::WritingLog | Phase::Done => Some(Stage::Log),
            Phase::FatalError => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator-facing stages shown in the progress panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Inventory,
    DisplayTest,
    SerialCheck,
    Log,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Inventory,
        Stage::DisplayTest,
        Stage::SerialCheck,
        Stage::Log,
    ];

    pub fn number(&self) -> usize {
        match self {
            Stage::Inventory => 1,
            Stage::DisplayTest => 2,
            Stage::SerialCheck => 3,
            Stage::Log => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Inventory => "Inventory collection",
            Stage::DisplayTest => "Display test",
            Stage::SerialCheck => "Serial number check",
            Stage::Log => "Log creation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    InProgress,
    Complete,
    Failed,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::InProgress => "in progress",
            StageStatus::Complete => "complete",
            StageStatus::Failed => "failed",
        }
    }
}
