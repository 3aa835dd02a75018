//! Wizard core - the qualification state machine and its delegates
//!
//! - phase: the Phase enum and progress stages
//! - event: events in, effects out
//! - session: WizardSession and the transition function
//! - sequencer: time-driven display-test pattern advance
//! - verifier: exact serial comparison
//! - escalation: retry / reboot / shutdown policy after a mismatch
//!
//! The core never renders and never touches the OS. Every transition is
//! `session.handle(event, now) -> Vec<Effect>`; the caller executes effects
//! and feeds completions back in as events.

mod escalation;
mod event;
mod phase;
mod sequencer;
mod session;
mod verifier;

pub use escalation::{escalate, EscalationDecision, PowerAction};
pub use event::{Effect, OperatorIntent, WizardEvent};
pub use phase::{Phase, Stage, StageStatus};
pub use sequencer::{DisplaySequencer, SequenceStep, TestPattern};
pub use session::{FailureKind, SessionFailure, WizardSession};
pub use verifier::{verify, Verification};
