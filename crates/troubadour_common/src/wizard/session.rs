//! WizardSession - the single mutable entity of a qualification pass
//!
//! All transition logic is `handle(event, now)`. The session is passed
//! explicitly; there is no global state. Invariants kept here:
//! - `log_path` is set if and only if the phase is `Done`, and only once
//! - `entered_serial` is empty whenever `EnterSerial` is (re)entered
//! - the log write is requested at most once per session

use super::escalation::{escalate, EscalationDecision, PowerAction};
use super::event::{Effect, OperatorIntent, WizardEvent};
use super::phase::{Phase, Stage, StageStatus};
use super::sequencer::{DisplaySequencer, SequenceStep};
use super::verifier::{verify, Verification};
use crate::inventory::{InventorySnapshot, ProbeReport, SerialEvidence};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Which collaborator ended the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Inventory,
    LogWrite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct WizardSession {
    phase: Phase,
    snapshot: Option<InventorySnapshot>,
    serial_evidence: Option<SerialEvidence>,
    dmi_sections: BTreeMap<String, Vec<String>>,
    entered_serial: String,
    display_test_passed: bool,
    serial_verified: bool,
    failed_serial_attempts: u32,
    log_requested: bool,
    log_path: Option<PathBuf>,
    sequencer: DisplaySequencer,
    sequence_started_at: Option<Instant>,
    sequence_step: Option<SequenceStep>,
    failure: Option<SessionFailure>,
    escalation: Option<PowerAction>,
}

impl WizardSession {
    pub fn new(sequencer: DisplaySequencer) -> Self {
        Self {
            phase: Phase::Init,
            snapshot: None,
            serial_evidence: None,
            dmi_sections: BTreeMap::new(),
            entered_serial: String::new(),
            display_test_passed: false,
            serial_verified: false,
            failed_serial_attempts: 0,
            log_requested: false,
            log_path: None,
            sequencer,
            sequence_started_at: None,
            sequence_step: None,
            failure: None,
            escalation: None,
        }
    }

    /// Apply one event. Inputs not valid for the current phase are ignored
    /// and leave the session unchanged. Quit is accepted in every phase.
    pub fn handle(&mut self, event: WizardEvent, now: Instant) -> Vec<Effect> {
        let from = self.phase;
        let kind = event.kind();

        let effects = match (self.phase, event) {
            (_, WizardEvent::Operator(OperatorIntent::Quit)) => {
                info!(phase = %from, "operator quit");
                vec![Effect::Exit]
            }

            (Phase::Init, WizardEvent::Begin) => {
                self.phase = Phase::CollectingInventory;
                vec![Effect::CollectInventory]
            }
            (Phase::Init | Phase::CollectingInventory, WizardEvent::InventoryCollected(report)) => {
                self.store_report(*report);
                self.phase = Phase::ReviewInventory;
                Vec::new()
            }
            (Phase::Init | Phase::CollectingInventory, WizardEvent::InventoryFailed(message)) => {
                self.fail(FailureKind::Inventory, message);
                Vec::new()
            }

            (Phase::ReviewInventory, WizardEvent::Operator(OperatorIntent::Confirm)) => {
                self.start_sequence(now);
                Vec::new()
            }

            (Phase::DisplayTest, WizardEvent::Tick) => {
                self.advance_sequence(now);
                Vec::new()
            }
            (Phase::DisplayTest, WizardEvent::Operator(OperatorIntent::Confirm)) => {
                // Only the held final pattern accepts an acknowledgment
                if self.advance_sequence(now).held {
                    self.phase = Phase::ConfirmDisplay;
                }
                Vec::new()
            }

            (Phase::ConfirmDisplay, WizardEvent::Operator(OperatorIntent::Confirm)) => {
                self.display_test_passed = true;
                self.enter_serial_entry();
                Vec::new()
            }
            (Phase::ConfirmDisplay, WizardEvent::Operator(OperatorIntent::Reject)) => {
                self.display_test_passed = false;
                self.start_sequence(now);
                Vec::new()
            }

            (Phase::EnterSerial, WizardEvent::Operator(OperatorIntent::SubmitText(text))) => {
                self.entered_serial = text;
                self.phase = Phase::VerifyingSerial;
                vec![Effect::VerifySerial]
            }

            (Phase::VerifyingSerial, WizardEvent::Verify) => {
                self.verify_entered();
                Vec::new()
            }

            (Phase::SerialConfirmed, WizardEvent::Operator(OperatorIntent::Confirm)) => {
                if self.log_requested {
                    Vec::new()
                } else {
                    self.log_requested = true;
                    self.phase = Phase::WritingLog;
                    vec![Effect::WriteLog]
                }
            }

            (Phase::SerialMismatch, WizardEvent::Operator(intent)) => match escalate(&intent) {
                Some(EscalationDecision::Retry) => {
                    self.enter_serial_entry();
                    Vec::new()
                }
                Some(EscalationDecision::Power(action)) => {
                    warn!(action = action.as_str(), "operator escalated after serial mismatch");
                    self.escalation = Some(action);
                    self.phase = Phase::Escalated;
                    vec![Effect::Power(action)]
                }
                None => Vec::new(),
            },

            (Phase::WritingLog, WizardEvent::LogWritten(path)) => {
                if path.as_os_str().is_empty() {
                    self.fail(FailureKind::LogWrite, "log emitter returned an empty path".into());
                } else {
                    info!(path = %path.display(), "qualification record written");
                    self.log_path = Some(path);
                    self.phase = Phase::Done;
                }
                Vec::new()
            }
            (Phase::WritingLog, WizardEvent::LogFailed(message)) => {
                self.fail(FailureKind::LogWrite, message);
                Vec::new()
            }

            _ => Vec::new(),
        };

        if from != self.phase {
            debug!(from = %from, to = %self.phase, event = kind, "phase transition");
        }
        effects
    }

    fn store_report(&mut self, report: ProbeReport) {
        info!(serial = %report.snapshot.serial_number, "inventory snapshot stored");
        self.snapshot = Some(report.snapshot);
        self.serial_evidence = Some(report.serial_evidence);
        self.dmi_sections = report.dmi_sections;
    }

    fn fail(&mut self, kind: FailureKind, message: String) {
        warn!(?kind, %message, "session failed");
        self.failure = Some(SessionFailure { kind, message });
        self.phase = Phase::FatalError;
    }

    fn start_sequence(&mut self, now: Instant) {
        self.sequence_started_at = Some(now);
        self.sequence_step = Some(self.sequencer.step_at(std::time::Duration::ZERO));
        self.phase = Phase::DisplayTest;
    }

    fn advance_sequence(&mut self, now: Instant) -> SequenceStep {
        let started = *self.sequence_started_at.get_or_insert(now);
        let step = self
            .sequencer
            .step_at(now.saturating_duration_since(started));
        self.sequence_step = Some(step);
        step
    }

    fn enter_serial_entry(&mut self) {
        self.entered_serial.clear();
        self.phase = Phase::EnterSerial;
    }

    fn verify_entered(&mut self) {
        let system = self
            .snapshot
            .as_ref()
            .map(|s| s.serial_number.as_str())
            .unwrap_or_default();

        match verify(&self.entered_serial, system) {
            Verification::Match => {
                info!("serial number verified");
                self.serial_verified = true;
                self.phase = Phase::SerialConfirmed;
            }
            Verification::Mismatch => {
                self.failed_serial_attempts += 1;
                warn!(
                    entered = %self.entered_serial,
                    system,
                    attempts = self.failed_serial_attempts,
                    "serial number mismatch"
                );
                self.serial_verified = false;
                self.phase = Phase::SerialMismatch;
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn snapshot(&self) -> Option<&InventorySnapshot> {
        self.snapshot.as_ref()
    }

    pub fn serial_evidence(&self) -> Option<&SerialEvidence> {
        self.serial_evidence.as_ref()
    }

    pub fn dmi_sections(&self) -> &BTreeMap<String, Vec<String>> {
        &self.dmi_sections
    }

    pub fn entered_serial(&self) -> &str {
        &self.entered_serial
    }

    pub fn display_test_passed(&self) -> bool {
        self.display_test_passed
    }

    pub fn serial_verified(&self) -> bool {
        self.serial_verified
    }

    /// Mismatches reported before the current verification
    pub fn failed_serial_attempts(&self) -> u32 {
        self.failed_serial_attempts
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn sequencer(&self) -> &DisplaySequencer {
        &self.sequencer
    }

    /// Current display-test step, as of the last tick or acknowledgment
    pub fn sequence_step(&self) -> Option<SequenceStep> {
        self.sequence_step
    }

    pub fn failure(&self) -> Option<&SessionFailure> {
        self.failure.as_ref()
    }

    pub fn escalation(&self) -> Option<PowerAction> {
        self.escalation
    }

    /// Progress of one operator-facing stage
    pub fn stage_status(&self, stage: Stage) -> StageStatus {
        if let Some(failure) = &self.failure {
            let failed_stage = match failure.kind {
                FailureKind::Inventory => Stage::Inventory,
                FailureKind::LogWrite => Stage::Log,
            };
            return match stage.cmp(&failed_stage) {
                std::cmp::Ordering::Less => StageStatus::Complete,
                std::cmp::Ordering::Equal => StageStatus::Failed,
                std::cmp::Ordering::Greater => StageStatus::Pending,
            };
        }

        let current = match self.phase.stage() {
            Some(current) => current,
            None => return StageStatus::Pending,
        };

        if stage < current {
            return StageStatus::Complete;
        }
        if stage > current {
            return StageStatus::Pending;
        }

        match self.phase {
            Phase::ReviewInventory | Phase::Done => StageStatus::Complete,
            Phase::SerialMismatch | Phase::Escalated => StageStatus::Failed,
            _ => StageStatus::InProgress,
        }
    }
}
