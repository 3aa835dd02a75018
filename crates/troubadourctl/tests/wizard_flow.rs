//! End-to-end wizard runs: real event loop and record emitter, scripted
//! operator, fixture inventory and a recording power collaborator.

use anyhow::Result;
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use troubadour_common::inventory::{
    GpuInfo, InventorySnapshot, MemoryInfo, ProcessorInfo, SerialEvidence,
};
use troubadour_common::probe::InventoryProbe;
use troubadour_common::{
    OperatorIntent, Phase, PowerAction, PowerError, ProbeError, ProbeReport, QualificationRecord,
    RecordError, RecordSink, TroubadourConfig, WizardSession,
};
use troubadourctl::errors::{
    exit_code, EXIT_INVENTORY_FAILED, EXIT_LOG_WRITE_FAILED, EXIT_POWER_COMMAND_FAILED,
    EXIT_SUCCESS,
};
use troubadourctl::power::PowerControl;
use troubadourctl::runtime::{Disposition, Presenter, RunOutcome, Wizard};

/// Give up instead of hanging when a script step never matches
const MAX_IDLE_POLLS: u32 = 20_000;

/// Answers each scripted step once the session reaches its phase. A
/// display-test step also waits for the held final pattern.
struct ScriptedPresenter {
    steps: VecDeque<(Phase, OperatorIntent)>,
    phase: Phase,
    held: bool,
    idle_polls: u32,
    visited: Vec<Phase>,
}

impl ScriptedPresenter {
    fn new(steps: Vec<(Phase, OperatorIntent)>) -> Self {
        Self {
            steps: steps.into(),
            phase: Phase::Init,
            held: false,
            idle_polls: 0,
            visited: Vec::new(),
        }
    }
}

impl Presenter for ScriptedPresenter {
    fn render(&mut self, session: &WizardSession) -> Result<()> {
        self.phase = session.phase();
        self.held = session.sequence_step().map(|s| s.held).unwrap_or(false);
        if self.visited.last() != Some(&self.phase) {
            self.visited.push(self.phase);
        }
        Ok(())
    }

    fn poll_input(&mut self, _timeout: Duration) -> Result<Option<OperatorIntent>> {
        let ready = match self.steps.front() {
            Some((Phase::DisplayTest, _)) => self.phase == Phase::DisplayTest && self.held,
            Some((phase, _)) => *phase == self.phase,
            None => false,
        };
        if ready {
            self.idle_polls = 0;
            return Ok(self.steps.pop_front().map(|(_, intent)| intent));
        }

        self.idle_polls += 1;
        if self.idle_polls > MAX_IDLE_POLLS {
            return Ok(Some(OperatorIntent::Quit));
        }
        std::thread::sleep(Duration::from_millis(1));
        Ok(None)
    }
}

struct FixtureProbe {
    serial: String,
}

impl InventoryProbe for FixtureProbe {
    fn collect(&self) -> Result<ProbeReport, ProbeError> {
        let mut dmi = BTreeMap::new();
        dmi.insert(
            "Handle 0x0001, DMI type 1, 27 bytes".to_string(),
            vec![
                "System Information".to_string(),
                format!("Serial Number: {}", self.serial),
            ],
        );
        Ok(ProbeReport {
            snapshot: InventorySnapshot {
                processor: ProcessorInfo {
                    model: "Fixture CPU".to_string(),
                    cores: 4,
                    threads: 8,
                    ..Default::default()
                },
                memory: MemoryInfo {
                    total_bytes: 8 * 1024 * 1024 * 1024,
                    ..Default::default()
                },
                network_cards: Vec::new(),
                gpu: GpuInfo::default(),
                storage_devices: Vec::new(),
                serial_number: self.serial.clone(),
            },
            serial_evidence: SerialEvidence {
                command: "dmidecode -s system-serial-number".to_string(),
                raw_output: format!("{}\n", self.serial),
            },
            dmi_sections: dmi,
        })
    }
}

/// Collaborator delay well beyond any reasonable event-loop latency
const SLOW_WORKER: Duration = Duration::from_secs(3);
const QUIT_BUDGET: Duration = Duration::from_millis(1500);

struct SlowProbe {
    inner: FixtureProbe,
    finished: AtomicUsize,
}

impl InventoryProbe for SlowProbe {
    fn collect(&self) -> Result<ProbeReport, ProbeError> {
        std::thread::sleep(SLOW_WORKER);
        self.finished.fetch_add(1, Ordering::SeqCst);
        self.inner.collect()
    }
}

struct SlowSink {
    dir: PathBuf,
    finished: AtomicUsize,
}

impl RecordSink for SlowSink {
    fn emit(&self, _record: &QualificationRecord) -> Result<PathBuf, RecordError> {
        std::thread::sleep(SLOW_WORKER);
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(self.dir.join("late.json"))
    }

    fn location(&self) -> &Path {
        &self.dir
    }
}

struct FailingProbe;

impl InventoryProbe for FailingProbe {
    fn collect(&self) -> Result<ProbeReport, ProbeError> {
        Err(ProbeError::Empty)
    }
}

#[derive(Default)]
struct RecordingPower {
    issued: Mutex<Vec<PowerAction>>,
    fail: bool,
}

impl PowerControl for RecordingPower {
    fn issue(&self, action: PowerAction) -> Result<(), PowerError> {
        self.issued.lock().unwrap().push(action);
        if self.fail {
            Err(PowerError::EmptyCommand)
        } else {
            Ok(())
        }
    }
}

fn config(log_dir: &Path) -> TroubadourConfig {
    let mut config = TroubadourConfig::default();
    config.record.dir = log_dir.to_path_buf();
    config.display_test.interval_ms = 1;
    config.ui.tick_ms = 10;
    config
}

fn log_files(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

async fn run(
    config: &TroubadourConfig,
    probe: Arc<dyn InventoryProbe>,
    power: Arc<RecordingPower>,
    presenter: &mut ScriptedPresenter,
) -> RunOutcome {
    let wizard = Wizard::new(config, probe, power);
    tokio::time::timeout(Duration::from_secs(30), wizard.run(presenter))
        .await
        .expect("wizard run timed out")
        .expect("wizard run failed")
}

fn fixture(serial: &str) -> Arc<dyn InventoryProbe> {
    Arc::new(FixtureProbe {
        serial: serial.to_string(),
    })
}

/// Steps from inventory review up to the serial prompt
fn through_display_test() -> Vec<(Phase, OperatorIntent)> {
    vec![
        (Phase::ReviewInventory, OperatorIntent::Confirm),
        (Phase::DisplayTest, OperatorIntent::Confirm),
        (Phase::ConfirmDisplay, OperatorIntent::Confirm),
    ]
}

#[tokio::test(flavor = "multi_thread")]
async fn test_matching_serial_writes_exactly_one_record() {
    let tmp = tempfile::tempdir().unwrap();
    let log_dir = tmp.path().join("logs");
    let power = Arc::new(RecordingPower::default());

    let mut steps = through_display_test();
    steps.extend([
        (Phase::EnterSerial, OperatorIntent::SubmitText("SN-42".to_string())),
        (Phase::SerialConfirmed, OperatorIntent::Confirm),
        (Phase::Done, OperatorIntent::Quit),
    ]);
    let mut presenter = ScriptedPresenter::new(steps);

    let outcome = run(&config(&log_dir), fixture("SN-42"), power.clone(), &mut presenter).await;

    let session = &outcome.session;
    assert_eq!(session.phase(), Phase::Done);
    assert!(session.serial_verified());
    assert!(session.display_test_passed());
    assert_eq!(outcome.disposition, Disposition::Quit);
    assert_eq!(exit_code(&outcome), EXIT_SUCCESS);
    assert!(power.issued.lock().unwrap().is_empty());

    let files = log_files(&log_dir);
    assert_eq!(files.len(), 1);
    assert_eq!(session.log_path(), Some(files[0].as_path()));

    let content = fs::read_to_string(&files[0]).unwrap();
    let record: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(record["system_info"]["serial_number"], "SN-42");
    assert_eq!(record["test_results"]["user_entered_sn"], "SN-42");
    assert_eq!(record["test_results"]["display_test_passed"], true);
    assert_eq!(record["test_results"]["serial_number_verified"], true);
    assert_eq!(record["serial_evidence"]["raw_output"], "SN-42\n");

    assert_eq!(
        presenter.visited,
        vec![
            Phase::CollectingInventory,
            Phase::ReviewInventory,
            Phase::DisplayTest,
            Phase::ConfirmDisplay,
            Phase::EnterSerial,
            Phase::SerialConfirmed,
            Phase::WritingLog,
            Phase::Done,
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wrong_serial_then_retry_clears_entry_and_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let log_dir = tmp.path().join("logs");
    let power = Arc::new(RecordingPower::default());

    let mut steps = through_display_test();
    steps.extend([
        (Phase::EnterSerial, OperatorIntent::SubmitText("WRONG".to_string())),
        (Phase::SerialMismatch, OperatorIntent::Retry),
        (Phase::EnterSerial, OperatorIntent::Quit),
    ]);
    let mut presenter = ScriptedPresenter::new(steps);

    let outcome = run(&config(&log_dir), fixture("SN-42"), power.clone(), &mut presenter).await;

    let session = &outcome.session;
    assert_eq!(session.phase(), Phase::EnterSerial);
    assert_eq!(session.entered_serial(), "");
    assert!(!session.serial_verified());
    assert_eq!(session.failed_serial_attempts(), 1);
    assert!(session.log_path().is_none());
    assert!(log_files(&log_dir).is_empty());
    assert!(presenter.visited.contains(&Phase::SerialMismatch));
    assert_eq!(exit_code(&outcome), EXIT_SUCCESS);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_retry_after_mismatch_can_still_verify() {
    let tmp = tempfile::tempdir().unwrap();
    let log_dir = tmp.path().join("logs");

    let mut steps = through_display_test();
    steps.extend([
        (Phase::EnterSerial, OperatorIntent::SubmitText("sn-42".to_string())),
        (Phase::SerialMismatch, OperatorIntent::Retry),
        (Phase::EnterSerial, OperatorIntent::SubmitText("SN-42".to_string())),
        (Phase::SerialConfirmed, OperatorIntent::Confirm),
        (Phase::Done, OperatorIntent::Quit),
    ]);
    let mut presenter = ScriptedPresenter::new(steps);

    let outcome = run(
        &config(&log_dir),
        fixture("SN-42"),
        Arc::new(RecordingPower::default()),
        &mut presenter,
    )
    .await;

    assert_eq!(outcome.session.phase(), Phase::Done);
    let files = log_files(&log_dir);
    assert_eq!(files.len(), 1);
    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(record["test_results"]["failed_serial_attempts"], 1);
    assert_eq!(record["test_results"]["serial_number_verified"], true);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_display_test_restarts_sequence() {
    let tmp = tempfile::tempdir().unwrap();
    let log_dir = tmp.path().join("logs");

    let steps = vec![
        (Phase::ReviewInventory, OperatorIntent::Confirm),
        (Phase::DisplayTest, OperatorIntent::Confirm),
        (Phase::ConfirmDisplay, OperatorIntent::Reject),
        (Phase::DisplayTest, OperatorIntent::Confirm),
        (Phase::ConfirmDisplay, OperatorIntent::Confirm),
        (Phase::EnterSerial, OperatorIntent::Quit),
    ];
    let mut presenter = ScriptedPresenter::new(steps);

    let outcome = run(
        &config(&log_dir),
        fixture("SN-42"),
        Arc::new(RecordingPower::default()),
        &mut presenter,
    )
    .await;

    assert_eq!(outcome.session.phase(), Phase::EnterSerial);
    assert!(outcome.session.display_test_passed());
    let display_visits = presenter
        .visited
        .iter()
        .filter(|p| **p == Phase::DisplayTest)
        .count();
    assert_eq!(display_visits, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reboot_after_mismatch_issues_command_without_record() {
    let tmp = tempfile::tempdir().unwrap();
    let log_dir = tmp.path().join("logs");
    let power = Arc::new(RecordingPower::default());

    let mut steps = through_display_test();
    steps.extend([
        (Phase::EnterSerial, OperatorIntent::SubmitText("WRONG".to_string())),
        (Phase::SerialMismatch, OperatorIntent::Reboot),
    ]);
    let mut presenter = ScriptedPresenter::new(steps);

    let outcome = run(&config(&log_dir), fixture("SN-42"), power.clone(), &mut presenter).await;

    assert_eq!(outcome.session.phase(), Phase::Escalated);
    assert_eq!(outcome.disposition, Disposition::Escalated(PowerAction::Reboot));
    assert_eq!(*power.issued.lock().unwrap(), vec![PowerAction::Reboot]);
    assert_eq!(exit_code(&outcome), EXIT_SUCCESS);
    assert!(log_files(&log_dir).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_shutdown_command_sets_exit_code() {
    let tmp = tempfile::tempdir().unwrap();
    let power = Arc::new(RecordingPower {
        fail: true,
        ..Default::default()
    });

    let mut steps = through_display_test();
    steps.extend([
        (Phase::EnterSerial, OperatorIntent::SubmitText("WRONG".to_string())),
        (Phase::SerialMismatch, OperatorIntent::Shutdown),
    ]);
    let mut presenter = ScriptedPresenter::new(steps);

    let outcome = run(&config(tmp.path()), fixture("SN-42"), power.clone(), &mut presenter).await;

    assert_eq!(outcome.disposition, Disposition::PowerFailed(PowerAction::Shutdown));
    assert_eq!(exit_code(&outcome), EXIT_POWER_COMMAND_FAILED);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_inventory_failure_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let mut presenter = ScriptedPresenter::new(vec![(Phase::FatalError, OperatorIntent::Quit)]);

    let outcome = run(
        &config(tmp.path()),
        Arc::new(FailingProbe),
        Arc::new(RecordingPower::default()),
        &mut presenter,
    )
    .await;

    assert_eq!(outcome.session.phase(), Phase::FatalError);
    assert!(outcome.session.snapshot().is_none());
    let failure = outcome.session.failure().unwrap();
    assert_eq!(failure.message, ProbeError::Empty.to_string());
    assert_eq!(exit_code(&outcome), EXIT_INVENTORY_FAILED);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unwritable_log_dir_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("not-a-dir");
    fs::write(&blocker, b"file").unwrap();

    let mut steps = through_display_test();
    steps.extend([
        (Phase::EnterSerial, OperatorIntent::SubmitText("SN-42".to_string())),
        (Phase::SerialConfirmed, OperatorIntent::Confirm),
        (Phase::FatalError, OperatorIntent::Quit),
    ]);
    let mut presenter = ScriptedPresenter::new(steps);

    let outcome = run(
        &config(&blocker.join("logs")),
        fixture("SN-42"),
        Arc::new(RecordingPower::default()),
        &mut presenter,
    )
    .await;

    assert_eq!(outcome.session.phase(), Phase::FatalError);
    assert!(outcome.session.log_path().is_none());
    assert!(outcome.session.failure().unwrap().message.contains("log directory"));
    assert_eq!(exit_code(&outcome), EXIT_LOG_WRITE_FAILED);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rescan_starts_a_fresh_session() {
    let tmp = tempfile::tempdir().unwrap();
    let log_dir = tmp.path().join("logs");

    let mut steps = through_display_test();
    steps.extend([
        (Phase::EnterSerial, OperatorIntent::SubmitText("SN-42".to_string())),
        (Phase::SerialConfirmed, OperatorIntent::Confirm),
        (Phase::Done, OperatorIntent::Rescan),
        (Phase::ReviewInventory, OperatorIntent::Quit),
    ]);
    let mut presenter = ScriptedPresenter::new(steps);

    let outcome = run(
        &config(&log_dir),
        fixture("SN-42"),
        Arc::new(RecordingPower::default()),
        &mut presenter,
    )
    .await;

    assert_eq!(outcome.sessions_run, 2);
    assert_eq!(outcome.session.phase(), Phase::ReviewInventory);
    assert!(!outcome.session.display_test_passed());
    assert!(outcome.session.log_path().is_none());
    assert_eq!(log_files(&log_dir).len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_quit_while_collecting_returns_immediately() {
    let tmp = tempfile::tempdir().unwrap();
    let log_dir = tmp.path().join("logs");
    let probe = Arc::new(SlowProbe {
        inner: FixtureProbe {
            serial: "SN-42".to_string(),
        },
        finished: AtomicUsize::new(0),
    });
    let mut presenter =
        ScriptedPresenter::new(vec![(Phase::CollectingInventory, OperatorIntent::Quit)]);

    let started = Instant::now();
    let outcome = run(
        &config(&log_dir),
        probe.clone(),
        Arc::new(RecordingPower::default()),
        &mut presenter,
    )
    .await;

    assert!(started.elapsed() < QUIT_BUDGET, "quit waited for the probe");
    assert_eq!(probe.finished.load(Ordering::SeqCst), 0);
    assert_eq!(outcome.disposition, Disposition::Quit);
    assert_eq!(outcome.session.phase(), Phase::CollectingInventory);
    assert!(outcome.session.snapshot().is_none());
    assert_eq!(exit_code(&outcome), EXIT_SUCCESS);
    assert!(log_files(&log_dir).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_quit_while_writing_log_returns_immediately() {
    let tmp = tempfile::tempdir().unwrap();
    let log_dir = tmp.path().join("logs");
    let sink = Arc::new(SlowSink {
        dir: log_dir.clone(),
        finished: AtomicUsize::new(0),
    });

    let mut steps = through_display_test();
    steps.extend([
        (Phase::EnterSerial, OperatorIntent::SubmitText("SN-42".to_string())),
        (Phase::SerialConfirmed, OperatorIntent::Confirm),
        (Phase::WritingLog, OperatorIntent::Quit),
    ]);
    let mut presenter = ScriptedPresenter::new(steps);

    let config = config(&log_dir);
    let wizard = Wizard::new(&config, fixture("SN-42"), Arc::new(RecordingPower::default()))
        .with_record_sink(sink.clone());

    let started = Instant::now();
    let outcome = tokio::time::timeout(Duration::from_secs(30), wizard.run(&mut presenter))
        .await
        .expect("wizard run timed out")
        .expect("wizard run failed");

    assert!(started.elapsed() < QUIT_BUDGET, "quit waited for the record write");
    assert_eq!(sink.finished.load(Ordering::SeqCst), 0);
    assert_eq!(outcome.disposition, Disposition::Quit);
    assert_eq!(outcome.session.phase(), Phase::WritingLog);
    assert!(outcome.session.log_path().is_none());
    assert!(log_files(&log_dir).is_empty());
}
