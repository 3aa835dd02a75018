//! Exit codes for troubadourctl
//!
//! Codes above 64 follow sysexits(3) where a matching one exists.

use crate::runtime::{Disposition, RunOutcome};
use troubadour_common::wizard::FailureKind;
use troubadour_common::Phase;

/// Exit code for success, including an operator quit
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors (bad config, terminal setup failure)
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when the inventory probe failed
pub const EXIT_INVENTORY_FAILED: i32 = 70;

/// Exit code when the reboot/power-off command could not be issued
pub const EXIT_POWER_COMMAND_FAILED: i32 = 71;

/// Exit code when the qualification record could not be written
pub const EXIT_LOG_WRITE_FAILED: i32 = 74;

/// Exit code when not running with elevated privileges
pub const EXIT_NOT_PRIVILEGED: i32 = 77;

/// Map how the wizard ended to the process exit status
pub fn exit_code(outcome: &RunOutcome) -> i32 {
    match outcome.disposition {
        Disposition::PowerFailed(_) => return EXIT_POWER_COMMAND_FAILED,
        Disposition::Escalated(_) => return EXIT_SUCCESS,
        Disposition::Quit => {}
    }

    match (outcome.session.phase(), outcome.session.failure()) {
        (Phase::FatalError, Some(f)) if f.kind == FailureKind::Inventory => EXIT_INVENTORY_FAILED,
        (Phase::FatalError, Some(f)) if f.kind == FailureKind::LogWrite => EXIT_LOG_WRITE_FAILED,
        (Phase::FatalError, _) => EXIT_GENERAL_ERROR,
        _ => EXIT_SUCCESS,
    }
}
