use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use rand::Rng;

use crate::catalog::Difficulty;
use crate::score::Summary;
use crate::session::{Session, Status};

/// Minimum accuracy a completed session needs before a certificate is
/// issued.
pub const COMPLETION_THRESHOLD: u32 = 80;

/// Why no certificate was issued. Rendered to the user instead of a
/// partial or degraded certificate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ineligible {
    /// Session never completed, was flagged, or has no computed summary.
    NotScored,
    BelowThreshold { accuracy: u32 },
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligible::NotScored => {
                write!(f, "finish a session cleanly before requesting a certificate")
            }
            Ineligible::BelowThreshold { accuracy } => write!(
                f,
                "accuracy {accuracy}% is below the {COMPLETION_THRESHOLD}% required for a certificate"
            ),
        }
    }
}

/// Rendering-only view over a scored session; nothing here is persisted
/// unless the user explicitly saves the artifact.
#[derive(Clone, Debug)]
pub struct Certificate<'a> {
    pub user_name: &'a str,
    pub summary: Summary,
    pub difficulty: Difficulty,
    pub language: &'a str,
}

impl<'a> Certificate<'a> {
    /// Gate and build in one step. Only a completed, unflagged session
    /// with a summary at or above the accuracy threshold passes.
    pub fn issue(
        session: &'a Session,
        difficulty: Difficulty,
        language: &'a str,
    ) -> Result<Self, Ineligible> {
        if session.status() != Status::Completed {
            return Err(Ineligible::NotScored);
        }
        let summary = *session.summary().ok_or(Ineligible::NotScored)?;
        if summary.accuracy < COMPLETION_THRESHOLD {
            return Err(Ineligible::BelowThreshold {
                accuracy: summary.accuracy,
            });
        }

        Ok(Self {
            user_name: &session.user_name,
            summary,
            difficulty,
            language,
        })
    }

    /// Render the achievement artifact as plain text.
    pub fn render(&self) -> String {
        let serial: u32 = rand::thread_rng().gen_range(0..10_000);
        let date = Local::now().format("%B %e, %Y");
        let width = 62;
        let rule = "=".repeat(width);
        let thin = "-".repeat(width);

        let mut lines = vec![
            rule.clone(),
            center("CERTIFICATE OF ACHIEVEMENT", width),
            center("Coding Speed Proficiency", width),
            thin.clone(),
            String::new(),
            center("This certifies that", width),
            center(self.user_name.trim(), width),
            center(
                &format!(
                    "has demonstrated coding proficiency at the {} level ({})",
                    self.difficulty, self.language
                ),
                width,
            ),
            String::new(),
        ];
        lines.push(center(
            &format!(
                "Typing speed: {} WPM   Accuracy: {}%   Level: {}",
                self.summary.wpm, self.summary.accuracy, self.summary.level
            ),
            width,
        ));
        lines.push(String::new());
        lines.push(center(&format!("Serial: CD-{serial:04}   Date: {date}"), width));
        lines.push(rule);
        lines.join("\n")
    }

    /// Output filename with whitespace runs in the name collapsed to
    /// single underscores.
    pub fn file_name(&self) -> String {
        let name = self
            .user_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        format!("codedrill_certificate_{name}.txt")
    }

    /// Write the rendered artifact into `dir` and return its path.
    pub fn save_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(self.file_name());
        fs::write(&path, self.render())?;
        Ok(path)
    }
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let pad = (width - len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anticheat::PasteHeuristic;
    use crate::session::TimeLimit;
    use std::time::{Duration, Instant};

    fn scored_session(typed: &str, target: &str) -> Session {
        let mut session = Session::new("Grace Hopper", target, TimeLimit::Standard);
        let t0 = Instant::now();
        session.start(t0).unwrap();
        session.edit(
            &PasteHeuristic::default(),
            typed,
            t0 + Duration::from_secs(30),
        );
        session.finish(t0 + Duration::from_secs(30));
        session
    }

    #[test]
    fn accuracy_at_threshold_is_eligible() {
        // 8 of 10 compared chars correct = 80%
        let session = scored_session("abcdefghxx", "abcdefghij");
        assert_eq!(session.summary().unwrap().accuracy, 80);
        assert!(Certificate::issue(&session, Difficulty::Beginner, "Rust").is_ok());
    }

    #[test]
    fn accuracy_below_threshold_is_rejected() {
        // 79 of 100 compared chars correct = 79%
        let typed = format!("{}{}", "a".repeat(79), "x".repeat(21));
        let session = scored_session(&typed, &"a".repeat(100));
        assert_eq!(session.summary().unwrap().accuracy, 79);
        let rejection = Certificate::issue(&session, Difficulty::Beginner, "Rust").unwrap_err();
        assert_eq!(rejection, Ineligible::BelowThreshold { accuracy: 79 });
        assert!(rejection.to_string().contains("80%"));
    }

    #[test]
    fn unscored_session_is_rejected() {
        let session = Session::new("Grace", "abc", TimeLimit::Standard);
        let rejection = Certificate::issue(&session, Difficulty::Beginner, "Rust").unwrap_err();
        assert_eq!(rejection, Ineligible::NotScored);
    }

    #[test]
    fn render_mentions_the_holder_and_metrics() {
        let session = scored_session("abcdefghij", "abcdefghij");
        let certificate = Certificate::issue(&session, Difficulty::Advanced, "Rust").unwrap();
        let rendered = certificate.render();

        assert!(rendered.contains("Grace Hopper"));
        assert!(rendered.contains("advanced"));
        assert!(rendered.contains("Rust"));
        assert!(rendered.contains("Accuracy: 100%"));
    }

    #[test]
    fn file_name_collapses_whitespace_runs() {
        let mut session = scored_session("abcdefghij", "abcdefghij");
        session.user_name = "Grace  Brewster \t Hopper".to_string();
        let certificate = Certificate::issue(&session, Difficulty::Beginner, "Rust").unwrap();
        assert_eq!(
            certificate.file_name(),
            "codedrill_certificate_Grace_Brewster_Hopper.txt"
        );
    }

    #[test]
    fn save_writes_the_rendered_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let session = scored_session("abcdefghij", "abcdefghij");
        let certificate = Certificate::issue(&session, Difficulty::Beginner, "Rust").unwrap();

        let path = certificate.save_to(dir.path()).unwrap();
        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.contains("CERTIFICATE OF ACHIEVEMENT"));
    }
}
