//! Wizard runtime - the cooperative event loop around `WizardSession`
//!
//! One event at a time: operator input, a tick, or a worker completion.
//! Inventory collection and record emission run on the blocking pool and
//! report back over an mpsc channel, so the presenter keeps redrawing and a
//! quit is honoured while they run.

use anyhow::Result;
use chrono::Local;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use troubadour_common::probe::InventoryProbe;
use troubadour_common::{
    DisplaySequencer, Effect, LogEmitter, OperatorIntent, Phase, PowerAction,
    QualificationRecord, RecordSink, TroubadourConfig, WizardEvent, WizardSession,
};

use crate::power::PowerControl;

/// Capability interface for a front end
pub trait Presenter {
    /// Redraw for the current session state
    fn render(&mut self, session: &WizardSession) -> Result<()>;

    /// Wait up to `timeout` for one operator intent
    fn poll_input(&mut self, timeout: Duration) -> Result<Option<OperatorIntent>>;
}

/// How the event loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Quit input or end of session
    Quit,
    /// Power command handed to the OS
    Escalated(PowerAction),
    /// Power command could not be spawned
    PowerFailed(PowerAction),
}

#[derive(Debug)]
pub struct RunOutcome {
    /// The session active when the loop ended
    pub session: WizardSession,
    pub disposition: Disposition,
    /// 1 plus the number of rescans
    pub sessions_run: u32,
}

pub struct Wizard {
    probe: Arc<dyn InventoryProbe>,
    power: Arc<dyn PowerControl>,
    records: Arc<dyn RecordSink>,
    sequencer: DisplaySequencer,
    tick: Duration,
}

impl Wizard {
    pub fn new(
        config: &TroubadourConfig,
        probe: Arc<dyn InventoryProbe>,
        power: Arc<dyn PowerControl>,
    ) -> Self {
        Self {
            probe,
            power,
            records: Arc::new(LogEmitter::new(&config.record)),
            sequencer: DisplaySequencer::from_config(&config.display_test),
            tick: config.ui.effective_tick(),
        }
    }

    /// Replace the configured record directory with another sink
    pub fn with_record_sink(mut self, records: Arc<dyn RecordSink>) -> Self {
        self.records = records;
        self
    }

    fn new_session(&self) -> WizardSession {
        WizardSession::new(self.sequencer.clone())
    }

    /// Drive sessions until quit, escalation or a fatal error is dismissed
    pub async fn run<P: Presenter>(&self, presenter: &mut P) -> Result<RunOutcome> {
        let (tx, mut rx) = mpsc::channel::<WizardEvent>(8);
        let mut session = self.new_session();
        let mut sessions_run = 1;
        let mut pending = VecDeque::from([WizardEvent::Begin]);

        info!("wizard started");

        loop {
            while let Some(event) = pending.pop_front() {
                for effect in session.handle(event, Instant::now()) {
                    match effect {
                        Effect::CollectInventory => self.spawn_collect(tx.clone()),
                        Effect::VerifySerial => pending.push_front(WizardEvent::Verify),
                        Effect::WriteLog => match self.spawn_emit(&session, tx.clone()) {
                            Ok(()) => {}
                            Err(event) => pending.push_front(event),
                        },
                        Effect::Power(action) => {
                            presenter.render(&session)?;
                            let disposition = match self.power.issue(action) {
                                Ok(()) => Disposition::Escalated(action),
                                Err(e) => {
                                    warn!(error = %e, "escalation could not be issued");
                                    Disposition::PowerFailed(action)
                                }
                            };
                            return Ok(RunOutcome {
                                session,
                                disposition,
                                sessions_run,
                            });
                        }
                        Effect::Exit => {
                            info!(phase = %session.phase(), "wizard exiting");
                            return Ok(RunOutcome {
                                session,
                                disposition: Disposition::Quit,
                                sessions_run,
                            });
                        }
                    }
                }
            }

            presenter.render(&session)?;

            while let Ok(event) = rx.try_recv() {
                debug!(event = event.kind(), "worker completion");
                pending.push_back(event);
            }
            if !pending.is_empty() {
                continue;
            }

            match presenter.poll_input(self.tick)? {
                Some(OperatorIntent::Rescan) if session.phase() == Phase::Done => {
                    info!("rescan requested, starting a new session");
                    session = self.new_session();
                    sessions_run += 1;
                    pending.push_back(WizardEvent::Begin);
                }
                Some(OperatorIntent::Resize) => {}
                Some(intent) => pending.push_back(WizardEvent::Operator(intent)),
                None => tokio::task::yield_now().await,
            }
            pending.push_back(WizardEvent::Tick);
        }
    }

    fn spawn_collect(&self, tx: mpsc::Sender<WizardEvent>) {
        let probe = Arc::clone(&self.probe);
        info!("inventory collection started");

        tokio::spawn(async move {
            let started = Instant::now();
            let event = match tokio::task::spawn_blocking(move || probe.collect()).await {
                Ok(Ok(report)) => WizardEvent::InventoryCollected(Box::new(report)),
                Ok(Err(e)) => WizardEvent::InventoryFailed(e.to_string()),
                Err(join) => WizardEvent::InventoryFailed(
                    troubadour_common::ProbeError::Worker(join.to_string()).to_string(),
                ),
            };
            info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                event = event.kind(),
                "inventory collection finished"
            );
            let _ = tx.send(event).await;
        });
    }

    /// Start the emitter, or hand back the failure event when the record
    /// cannot even be assembled
    fn spawn_emit(
        &self,
        session: &WizardSession,
        tx: mpsc::Sender<WizardEvent>,
    ) -> std::result::Result<(), WizardEvent> {
        let record = QualificationRecord::from_session(session, Local::now())
            .map_err(|e| WizardEvent::LogFailed(e.operator_message()))?;
        let records = Arc::clone(&self.records);
        info!(dir = %records.location().display(), "record emission started");

        tokio::spawn(async move {
            let event = match tokio::task::spawn_blocking(move || records.emit(&record)).await {
                Ok(Ok(path)) => WizardEvent::LogWritten(path),
                Ok(Err(e)) => WizardEvent::LogFailed(e.operator_message()),
                Err(join) => WizardEvent::LogFailed(format!("log worker failed: {}", join)),
            };
            let _ = tx.send(event).await;
        });
        Ok(())
    }
}
