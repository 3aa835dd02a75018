//! Privilege precondition
//!
//! The probe reads DMI tables and the escalation path powers the machine
//! off, so the wizard only starts for an effective UID of root. Checked once
//! before the wizard starts; not part of the state machine.

/// Check if running as root
pub fn is_root() -> bool {
    #[cfg(unix)]
    {
        use nix::unistd::Uid;
        Uid::effective().is_root()
    }
    #[cfg(not(unix))]
    {
        false
    }
}
