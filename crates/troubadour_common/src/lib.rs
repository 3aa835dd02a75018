//! Troubadour Common - Shared core for the hardware qualification wizard
//!
//! The wizard core (phase state machine, display-test sequencer, identity
//! verifier, escalation policy) lives in `wizard`. Everything it consumes or
//! produces at its edges lives beside it: the inventory model and probe, the
//! qualification record, configuration and the privilege precondition.

pub mod config;
pub mod error;
pub mod inventory;
pub mod privilege;
pub mod probe;
pub mod record;
pub mod wizard;

pub use config::TroubadourConfig;
pub use error::{ConfigError, PowerError, ProbeError, RecordError};
pub use inventory::{InventorySnapshot, ProbeReport, SerialEvidence, UNKNOWN_SERIAL};
pub use record::{LogEmitter, QualificationRecord, RecordSink};
pub use wizard::{
    verify, DisplaySequencer, Effect, OperatorIntent, Phase, PowerAction, TestPattern,
    Verification, WizardEvent, WizardSession,
};
