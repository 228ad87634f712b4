use std::time::Duration;
use strum_macros::Display;

/// Standard typing convention: five characters count as one word.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Skill band assigned to a finished session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    /// Band lookup, first match wins. The accuracy bar rises with the
    /// speed bar, so a fast-but-sloppy run falls through to a lower band.
    pub fn from_metrics(wpm: u32, accuracy: u32) -> Self {
        if wpm >= 60 && accuracy >= 95 {
            SkillLevel::Expert
        } else if wpm >= 40 && accuracy >= 90 {
            SkillLevel::Advanced
        } else if wpm >= 25 && accuracy >= 80 {
            SkillLevel::Intermediate
        } else {
            SkillLevel::Beginner
        }
    }
}

/// Immutable scoring result of a completed, unflagged session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub wpm: u32,
    pub accuracy: u32,
    pub level: SkillLevel,
}

impl Summary {
    pub fn compute(typed: &str, target: &str, elapsed: Duration) -> Self {
        let wpm = words_per_minute(typed.chars().count(), elapsed);
        let accuracy = accuracy(typed, target);
        Self {
            wpm,
            accuracy,
            level: SkillLevel::from_metrics(wpm, accuracy),
        }
    }
}

/// Rounded words per minute. A zero-length session yields 0 rather than
/// letting a division by zero escape into the summary.
pub fn words_per_minute(typed_chars: usize, elapsed: Duration) -> u32 {
    let minutes = elapsed.as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        return 0;
    }
    ((typed_chars as f64 / CHARS_PER_WORD) / minutes).round() as u32
}

/// Positionwise accuracy over the compared prefix,
/// `min(typed.len(), target.len())` characters long. An empty comparison
/// window scores 0.
pub fn accuracy(typed: &str, target: &str) -> u32 {
    let compared = typed.chars().count().min(target.chars().count());
    if compared == 0 {
        return 0;
    }
    let correct = typed
        .chars()
        .zip(target.chars())
        .filter(|(typed_char, target_char)| typed_char == target_char)
        .count();
    ((correct as f64 / compared as f64) * 100.0).round() as u32
}
