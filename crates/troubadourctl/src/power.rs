//! OS power commands offered after a serial mismatch
//!
//! The command is spawned and never waited on: the wizard exits right after
//! handing it to the OS. Only a failure to spawn is reported.

use std::process::{Command, Stdio};
use tracing::{error, info};
use troubadour_common::config::EscalationConfig;
use troubadour_common::{PowerAction, PowerError};

pub trait PowerControl: Send + Sync {
    fn issue(&self, action: PowerAction) -> Result<(), PowerError>;
}

/// Runs the configured reboot/power-off command
#[derive(Debug, Clone)]
pub struct SystemPower {
    commands: EscalationConfig,
}

impl SystemPower {
    pub fn new(commands: EscalationConfig) -> Self {
        Self { commands }
    }
}

impl PowerControl for SystemPower {
    fn issue(&self, action: PowerAction) -> Result<(), PowerError> {
        let argv = action.command(&self.commands);
        let (program, args) = argv.split_first().ok_or(PowerError::EmptyCommand)?;

        let spawned = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => {
                info!(action = action.as_str(), pid = child.id(), "power command issued");
                Ok(())
            }
            Err(source) => {
                let command = argv.join(" ");
                error!(action = action.as_str(), %command, error = %source, "power command failed");
                Err(PowerError::Spawn { command, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn power(reboot: &[&str]) -> SystemPower {
        SystemPower::new(EscalationConfig {
            reboot_command: reboot.iter().map(|s| s.to_string()).collect(),
            shutdown_command: vec!["true".to_string()],
        })
    }

    #[test]
    fn test_issue_does_not_wait() {
        let start = std::time::Instant::now();
        power(&["sleep", "5"]).issue(PowerAction::Reboot).unwrap();
        assert!(start.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let result = power(&["/nonexistent/troubadour-reboot"]).issue(PowerAction::Reboot);
        assert!(matches!(result, Err(PowerError::Spawn { .. })));
    }

    #[test]
    fn test_empty_command() {
        let result = power(&[]).issue(PowerAction::Reboot);
        assert!(matches!(result, Err(PowerError::EmptyCommand)));
    }
}
