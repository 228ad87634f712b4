use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};

use crate::anticheat::{BurstPolicy, CheatSignal, Verdict};
use crate::score::Summary;

/// Closed set of countdown budgets a session may run with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum TimeLimit {
    Sprint,
    Standard,
    Extended,
    Marathon,
}

impl TimeLimit {
    pub const ALL: [TimeLimit; 4] = [
        TimeLimit::Sprint,
        TimeLimit::Standard,
        TimeLimit::Extended,
        TimeLimit::Marathon,
    ];

    pub fn as_secs(self) -> u32 {
        match self {
            TimeLimit::Sprint => 30,
            TimeLimit::Standard => 60,
            TimeLimit::Extended => 120,
            TimeLimit::Marathon => 300,
        }
    }

    pub fn from_secs(secs: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|limit| limit.as_secs() == secs)
    }
}

impl From<TimeLimit> for u32 {
    fn from(limit: TimeLimit) -> u32 {
        limit.as_secs()
    }
}

impl TryFrom<u32> for TimeLimit {
    type Error = String;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        TimeLimit::from_secs(secs).ok_or_else(|| format!("unsupported time limit: {secs}s"))
    }
}

impl fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.as_secs())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Idle,
    Active,
    Completed,
    Flagged,
}

/// Why a session refused to start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartError {
    EmptyName,
    AlreadyActive,
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartError::EmptyName => write!(f, "a name is required before starting a session"),
            StartError::AlreadyActive => write!(f, "a session is already running"),
        }
    }
}

impl Error for StartError {}

/// Result of delivering a countdown tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale epoch or inactive session; nothing changed.
    Ignored,
    /// Seconds left after the decrement.
    Running(u32),
    /// The countdown hit zero and the session completed.
    Expired,
}

/// Result of delivering an edit event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// Session not active; the edit was dropped.
    Ignored,
    Accepted,
    /// Typed text matched the target exactly.
    Completed,
    /// The burst policy flagged the session.
    Flagged,
}

/// One timed attempt at reproducing a target snippet. All lifecycle
/// mutations go through the transition methods; `epoch` ties scheduled
/// ticks to the session generation they were armed for, so a tick
/// raised before a reset or restart can never touch the successor.
#[derive(Clone, Debug)]
pub struct Session {
    pub user_name: String,
    target_text: String,
    typed_text: String,
    limit: TimeLimit,
    remaining: Option<u32>,
    started_at: Option<Instant>,
    ended_at: Option<Instant>,
    status: Status,
    epoch: u64,
    signal: CheatSignal,
    summary: Option<Summary>,
}

impl Session {
    pub fn new(
        user_name: impl Into<String>,
        target_text: impl Into<String>,
        limit: TimeLimit,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            target_text: target_text.into(),
            typed_text: String::new(),
            limit,
            remaining: None,
            started_at: None,
            ended_at: None,
            status: Status::Idle,
            epoch: 0,
            signal: CheatSignal::idle(),
            summary: None,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn target_text(&self) -> &str {
        &self.target_text
    }

    pub fn typed_text(&self) -> &str {
        &self.typed_text
    }

    pub fn limit(&self) -> TimeLimit {
        self.limit
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn signal(&self) -> &CheatSignal {
        &self.signal
    }

    /// Set once the session completes unflagged; never for flagged runs.
    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn elapsed(&self) -> Option<Duration> {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => Some(end.saturating_duration_since(start)),
            _ => None,
        }
    }

    /// Swap the target snippet. Refused mid-session.
    pub fn set_target(&mut self, target_text: impl Into<String>) -> Result<(), StartError> {
        if self.is_active() {
            return Err(StartError::AlreadyActive);
        }
        self.target_text = target_text.into();
        self.reset();
        Ok(())
    }

    /// Change the countdown budget. Refused mid-session.
    pub fn set_limit(&mut self, limit: TimeLimit) -> Result<(), StartError> {
        if self.is_active() {
            return Err(StartError::AlreadyActive);
        }
        self.limit = limit;
        self.reset();
        Ok(())
    }

    /// Begin a fresh attempt. Clears everything the previous attempt
    /// accumulated, including the cheat signal.
    pub fn start(&mut self, now: Instant) -> Result<(), StartError> {
        if self.user_name.trim().is_empty() {
            return Err(StartError::EmptyName);
        }
        if self.is_active() {
            return Err(StartError::AlreadyActive);
        }

        self.typed_text.clear();
        self.summary = None;
        self.started_at = Some(now);
        self.ended_at = None;
        self.remaining = Some(self.limit.as_secs());
        self.signal = CheatSignal::armed(now);
        self.status = Status::Active;
        self.epoch += 1;
        Ok(())
    }

    /// Deliver one whole-second countdown tick armed for `epoch`.
    pub fn tick(&mut self, epoch: u64, now: Instant) -> TickOutcome {
        if epoch != self.epoch || !self.is_active() {
            return TickOutcome::Ignored;
        }

        let remaining = self.remaining.unwrap_or(0).saturating_sub(1);
        self.remaining = Some(remaining);

        if remaining == 0 {
            self.complete(now);
            TickOutcome::Expired
        } else {
            TickOutcome::Running(remaining)
        }
    }

    /// Deliver the full current input text for one edit event. The burst
    /// policy sees the edit first; completion is only checked if the
    /// policy did not flag, so a paste of the entire target still counts
    /// as cheating rather than a finish.
    pub fn edit(&mut self, policy: &dyn BurstPolicy, text: &str, now: Instant) -> EditOutcome {
        if !self.is_active() {
            return EditOutcome::Ignored;
        }

        let verdict = policy.observe(&mut self.signal, text.chars().count(), now);
        self.typed_text.clear();
        self.typed_text.push_str(text);

        if verdict == Verdict::Flagged {
            self.status = Status::Flagged;
            self.ended_at = Some(now);
            self.epoch += 1;
            return EditOutcome::Flagged;
        }

        // Exact equality only; a correct prefix is still an open session.
        if !self.typed_text.is_empty() && self.typed_text == self.target_text {
            self.complete(now);
            return EditOutcome::Completed;
        }

        EditOutcome::Accepted
    }

    /// End the attempt early (operator action). Scores whatever was typed.
    pub fn finish(&mut self, now: Instant) {
        if self.is_active() {
            self.complete(now);
        }
    }

    /// Back to Idle; discards the attempt and its suspicion history.
    pub fn reset(&mut self) {
        self.typed_text.clear();
        self.started_at = None;
        self.ended_at = None;
        self.remaining = None;
        self.summary = None;
        self.signal = CheatSignal::idle();
        self.status = Status::Idle;
        self.epoch += 1;
    }

    fn complete(&mut self, now: Instant) {
        self.status = Status::Completed;
        self.ended_at = Some(now);
        self.epoch += 1;

        let elapsed = self.elapsed().unwrap_or(Duration::ZERO);
        self.summary = Some(Summary::compute(&self.typed_text, &self.target_text, elapsed));
    }
}
