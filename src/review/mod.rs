//! Formatting of AI code-review responses for terminal display, plus the
//! collaborator seam the response arrives through.

pub mod format;
pub mod source;

pub use format::{extract_code_blocks, format_prose, format_review, FormattedReview};
pub use source::{request_review, FileSource, ReviewError, ReviewSource, StaticSource};
