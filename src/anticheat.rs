use std::time::{Duration, Instant};

/// Per-session paste-detection bookkeeping. Recreated on every session
/// (re)start so suspicion never leaks across sessions.
#[derive(Clone, Debug)]
pub struct CheatSignal {
    pub last_input_len: usize,
    pub last_input_at: Option<Instant>,
    pub suspicion_count: u32,
}

impl CheatSignal {
    /// Signal for a session that has not started; the first edit can
    /// never qualify as a burst because there is no reference instant.
    pub fn idle() -> Self {
        Self {
            last_input_len: 0,
            last_input_at: None,
            suspicion_count: 0,
        }
    }

    /// Signal armed at session start. The start instant is the reference
    /// for the first edit, so pasting immediately after start counts.
    pub fn armed(now: Instant) -> Self {
        Self {
            last_input_len: 0,
            last_input_at: Some(now),
            suspicion_count: 0,
        }
    }
}

impl Default for CheatSignal {
    fn default() -> Self {
        Self::idle()
    }
}

/// Outcome of running a burst policy against one edit event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Clean,
    Suspicious,
    Flagged,
}

/// Strategy seam for paste detection. Policies only see the signal and
/// the new input length, never the session, so swapping heuristics does
/// not touch lifecycle code.
pub trait BurstPolicy {
    fn observe(&self, signal: &mut CheatSignal, input_len: usize, now: Instant) -> Verdict;
}

/// Default burst heuristic: an edit that grows the input by more than
/// `burst_chars` characters within `burst_window` of the previous edit
/// is a suspected paste. The session is flagged once more than
/// `tolerated_bursts` such edits accumulate, i.e. on the fourth burst
/// with the default tolerance of three.
///
/// This is a heuristic, not a guarantee: a very fast accurate typist can
/// trip it and a slow manual paste can slip past it. Both are accepted
/// tradeoffs of the approach.
#[derive(Clone, Copy, Debug)]
pub struct PasteHeuristic {
    pub burst_chars: usize,
    pub burst_window: Duration,
    pub tolerated_bursts: u32,
}

impl Default for PasteHeuristic {
    fn default() -> Self {
        Self {
            burst_chars: 5,
            burst_window: Duration::from_millis(100),
            tolerated_bursts: 3,
        }
    }
}

impl BurstPolicy for PasteHeuristic {
    fn observe(&self, signal: &mut CheatSignal, input_len: usize, now: Instant) -> Verdict {
        let grew_by = input_len.saturating_sub(signal.last_input_len);
        let within_window = signal
            .last_input_at
            .map(|at| now.saturating_duration_since(at) < self.burst_window)
            .unwrap_or(false);

        let verdict = if grew_by > self.burst_chars && within_window {
            signal.suspicion_count += 1;
            if signal.suspicion_count > self.tolerated_bursts {
                Verdict::Flagged
            } else {
                Verdict::Suspicious
            }
        } else {
            Verdict::Clean
        };

        // Bookkeeping happens on every edit, suspicious or not.
        signal.last_input_len = input_len;
        signal.last_input_at = Some(now);

        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burst_sequence(policy: &PasteHeuristic, count: usize) -> Vec<Verdict> {
        let t0 = Instant::now();
        let mut signal = CheatSignal::armed(t0);
        (0..count)
            .map(|i| {
                // each edit adds 10 chars, 10ms apart: always a qualifying burst
                policy.observe(&mut signal, (i + 1) * 10, t0 + Duration::from_millis(i as u64 * 10))
            })
            .collect()
    }

    #[test]
    fn three_bursts_do_not_flag() {
        let verdicts = burst_sequence(&PasteHeuristic::default(), 3);
        assert_eq!(
            verdicts,
            vec![Verdict::Suspicious, Verdict::Suspicious, Verdict::Suspicious]
        );
    }

    #[test]
    fn fourth_burst_flags() {
        let verdicts = burst_sequence(&PasteHeuristic::default(), 4);
        assert_eq!(verdicts[3], Verdict::Flagged);
    }

    #[test]
    fn small_additions_are_clean() {
        let policy = PasteHeuristic::default();
        let t0 = Instant::now();
        let mut signal = CheatSignal::armed(t0);
        for i in 0..20usize {
            let verdict =
                policy.observe(&mut signal, i + 1, t0 + Duration::from_millis(i as u64 * 10));
            assert_eq!(verdict, Verdict::Clean);
        }
        assert_eq!(signal.suspicion_count, 0);
    }

    #[test]
    fn slow_large_additions_are_clean() {
        let policy = PasteHeuristic::default();
        let t0 = Instant::now();
        let mut signal = CheatSignal::armed(t0);
        for i in 0..5usize {
            let verdict =
                policy.observe(&mut signal, (i + 1) * 50, t0 + Duration::from_millis(i as u64 * 500));
            assert_eq!(verdict, Verdict::Clean);
        }
    }

    #[test]
    fn idle_signal_never_qualifies_on_first_edit() {
        let policy = PasteHeuristic::default();
        let mut signal = CheatSignal::idle();
        let verdict = policy.observe(&mut signal, 100, Instant::now());
        assert_eq!(verdict, Verdict::Clean);
    }

    #[test]
    fn bookkeeping_updates_regardless_of_verdict() {
        let policy = PasteHeuristic::default();
        let t0 = Instant::now();
        let mut signal = CheatSignal::armed(t0);

        policy.observe(&mut signal, 3, t0 + Duration::from_millis(10));
        assert_eq!(signal.last_input_len, 3);

        policy.observe(&mut signal, 50, t0 + Duration::from_millis(20));
        assert_eq!(signal.last_input_len, 50);
        assert_eq!(signal.suspicion_count, 1);
    }

    #[test]
    fn shrinking_input_is_clean() {
        // backspacing after a long input must not underflow the diff
        let policy = PasteHeuristic::default();
        let t0 = Instant::now();
        let mut signal = CheatSignal::armed(t0);
        policy.observe(&mut signal, 30, t0 + Duration::from_millis(500));
        let verdict = policy.observe(&mut signal, 10, t0 + Duration::from_millis(510));
        assert_eq!(verdict, Verdict::Clean);
    }

    #[test]
    fn custom_thresholds_are_honored() {
        let strict = PasteHeuristic {
            burst_chars: 1,
            burst_window: Duration::from_secs(10),
            tolerated_bursts: 0,
        };
        let t0 = Instant::now();
        let mut signal = CheatSignal::armed(t0);
        let verdict = strict.observe(&mut signal, 2, t0 + Duration::from_secs(1));
        assert_eq!(verdict, Verdict::Flagged);
    }
}
