use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::format::{format_review, FormattedReview};

/// Failure at the review boundary. Everything here is surfaced to the
/// caller after a single attempt; there is no retry policy.
#[derive(Debug)]
pub enum ReviewError {
    /// The submission was blank; nothing was dispatched upstream.
    EmptySubmission,
    /// The collaborator answered with an error of its own.
    Upstream(String),
    Io(io::Error),
}

impl fmt::Display for ReviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewError::EmptySubmission => write!(f, "nothing to review: the submission is empty"),
            ReviewError::Upstream(message) => write!(f, "review service failed: {message}"),
            ReviewError::Io(err) => write!(f, "could not read review input: {err}"),
        }
    }
}

impl Error for ReviewError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReviewError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ReviewError {
    fn from(err: io::Error) -> Self {
        ReviewError::Io(err)
    }
}

/// Boundary to the external reviewer. Implementations hand back the raw
/// response blob for the submitted code; transport is their business.
pub trait ReviewSource {
    fn fetch(&self, code: &str) -> Result<String, ReviewError>;
}

/// A response that was obtained out of band (or canned for tests).
#[derive(Clone, Debug)]
pub struct StaticSource {
    response: String,
}

impl StaticSource {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

impl ReviewSource for StaticSource {
    fn fetch(&self, _code: &str) -> Result<String, ReviewError> {
        Ok(self.response.clone())
    }
}

/// Reads the collaborator's response from a file on each request.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ReviewSource for FileSource {
    fn fetch(&self, _code: &str) -> Result<String, ReviewError> {
        Ok(fs::read_to_string(&self.path)?)
    }
}

/// Validate the submission, fetch the response once, and format it.
/// A blank submission is rejected before anything reaches the source.
pub fn request_review(
    source: &dyn ReviewSource,
    code: &str,
) -> Result<FormattedReview, ReviewError> {
    if code.trim().is_empty() {
        return Err(ReviewError::EmptySubmission);
    }
    let raw = source.fetch(code)?;
    Ok(format_review(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct FailingSource;

    impl ReviewSource for FailingSource {
        fn fetch(&self, _code: &str) -> Result<String, ReviewError> {
            Err(ReviewError::Upstream("model unavailable".into()))
        }
    }

    /// Source that records whether it was ever consulted.
    struct TattlingSource(std::cell::Cell<bool>);

    impl ReviewSource for TattlingSource {
        fn fetch(&self, _code: &str) -> Result<String, ReviewError> {
            self.0.set(true);
            Ok(String::new())
        }
    }

    #[test]
    fn blank_submission_never_reaches_the_source() {
        let source = TattlingSource(std::cell::Cell::new(false));
        let result = request_review(&source, "   \n\t");
        assert_matches!(result, Err(ReviewError::EmptySubmission));
        assert!(!source.0.get(), "source must not be consulted");
    }

    #[test]
    fn upstream_failure_is_surfaced() {
        let result = request_review(&FailingSource, "fn main() {}");
        assert_matches!(result, Err(ReviewError::Upstream(_)));
    }

    #[test]
    fn static_source_round_trips_through_the_formatter() {
        let source = StaticSource::new("## Verdict\n- looks fine\n```ok()```");
        let formatted = request_review(&source, "fn main() {}").unwrap();
        assert_eq!(formatted.code_blocks, vec!["ok()".to_string()]);
        assert!(formatted.prose.contains("Verdict"));
    }

    #[test]
    fn file_source_reads_the_response() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response.md");
        fs::write(&path, "- tighten error handling").unwrap();

        let formatted = request_review(&FileSource::new(&path), "fn main() {}").unwrap();
        assert!(formatted.prose.contains("tighten error handling"));
    }

    #[test]
    fn missing_response_file_is_an_io_error() {
        let result = request_review(&FileSource::new("/no/such/file.md"), "code");
        assert_matches!(result, Err(ReviewError::Io(_)));
    }
}
