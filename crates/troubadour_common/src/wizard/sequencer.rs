//! Display-Test Sequencer
//!
//! Advances a fixed, ordered pattern list purely from elapsed wall-clock
//! time. With `N` patterns and interval `I`, the active index is
//! `floor(elapsed / I) mod (N - 1)` while `elapsed < (N - 1) * I`; after that
//! the final pattern is held until the operator acknowledges it. The held
//! pattern never auto-advances.

use crate::config::DisplayTestConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One full-screen test pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestPattern {
    Red,
    Green,
    Blue,
    White,
    Black,
    /// Grey ramp, geometry grid and colour blocks for close inspection
    Calibration,
}

impl TestPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestPattern::Red => "red",
            TestPattern::Green => "green",
            TestPattern::Blue => "blue",
            TestPattern::White => "white",
            TestPattern::Black => "black",
            TestPattern::Calibration => "calibration",
        }
    }
}

/// Position within the pattern list at some instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceStep {
    pub index: usize,
    pub pattern: TestPattern,
    /// Final pattern, waiting for operator acknowledgment
    pub held: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySequencer {
    interval: Duration,
    patterns: Vec<TestPattern>,
}

impl DisplaySequencer {
    /// An empty pattern list degrades to a single held calibration pattern.
    pub fn new(interval: Duration, patterns: Vec<TestPattern>) -> Self {
        let patterns = if patterns.is_empty() {
            vec![TestPattern::Calibration]
        } else {
            patterns
        };
        Self { interval, patterns }
    }

    pub fn from_config(config: &DisplayTestConfig) -> Self {
        Self::new(config.interval(), config.patterns.clone())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn patterns(&self) -> &[TestPattern] {
        &self.patterns
    }

    /// Pattern count `N`
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Index of the held final pattern
    pub fn held_index(&self) -> usize {
        self.patterns.len() - 1
    }

    /// Time after which the final pattern is held
    pub fn timed_span(&self) -> Duration {
        self.interval
            .checked_mul(self.held_index() as u32)
            .unwrap_or(Duration::MAX)
    }

    /// Active step for the given time since the sequence (re)started
    pub fn step_at(&self, elapsed: Duration) -> SequenceStep {
        let timed = self.held_index();
        let interval_ns = self.interval.as_nanos().max(1);
        let slot = elapsed.as_nanos() / interval_ns;

        if timed == 0 || slot >= timed as u128 {
            return self.held();
        }

        let index = slot as usize % timed;
        SequenceStep {
            index,
            pattern: self.patterns[index],
            held: false,
        }
    }

    fn held(&self) -> SequenceStep {
        let index = self.held_index();
        SequenceStep {
            index,
            pattern: self.patterns[index],
            held: true,
        }
    }
}
