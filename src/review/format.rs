//! Markdown-ish review text to styled terminal output.
//!
//! The reviewer model answers with loose markdown: fenced code regions,
//! `##`/`###` headings, list items, and inline emphasis. Code fences are
//! pulled out first and exposed separately; the remaining prose goes
//! through an ordered pipeline of pure regex substitutions, each one a
//! documented pattern/replacement pair, so the chain stays auditable and
//! testable in isolation.

use std::sync::LazyLock;

use regex::Regex;

const BOLD_YELLOW: &str = "\u{1b}[1;33m";
const BOLD_CYAN: &str = "\u{1b}[1;36m";
const CYAN: &str = "\u{1b}[36m";
const YELLOW: &str = "\u{1b}[33m";
const BOLD: &str = "\u{1b}[1m";
const ITALIC: &str = "\u{1b}[3m";
const RED: &str = "\u{1b}[31m";
const RESET: &str = "\u{1b}[0m";

/// Fenced code region, including its delimiters. `(?s)` so a fence body
/// may span lines; lazy so back-to-back fences stay separate.
static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(.*?)```").expect("code fence pattern"));

struct Transform {
    pattern: Regex,
    replacement: String,
}

/// The substitution pipeline, applied top to bottom. Patterns are
/// non-overlapping: heading markers differ by their literal prefix, the
/// list patterns are anchored to line starts, and the emphasis patterns
/// consume their delimiters so later passes cannot re-match inside an
/// earlier replacement.
static TRANSFORMS: LazyLock<Vec<Transform>> = LazyLock::new(|| {
    let rule = |pattern: &str, replacement: String| Transform {
        pattern: Regex::new(pattern).expect("prose transform pattern"),
        replacement,
    };

    vec![
        // level-2 heading: `## title`
        rule(r"(?m)^## (.*)$", format!("{BOLD_YELLOW}$1{RESET}")),
        // level-3 heading: `### title`
        rule(r"(?m)^### (.*)$", format!("{BOLD_CYAN}$1{RESET}")),
        // numbered list item: `1. text`
        rule(r"(?m)^(\d+)\. (.*)$", format!("  {CYAN}$1.{RESET} $2")),
        // bullet item: `- text`
        rule(r"(?m)^- (.*)$", format!("  {YELLOW}*{RESET} $1")),
        // bold span: `**text**`
        rule(r"\*\*(.*?)\*\*", format!("{BOLD}$1{RESET}")),
        // italic span: `*text*`
        rule(r"\*(.*?)\*", format!("{ITALIC}$1{RESET}")),
        // inline code span: `code`
        rule(r"`(.*?)`", format!("{RED}$1{RESET}")),
        // literal newlines: normalize carriage returns away
        rule(r"\r\n", "\n".to_string()),
    ]
});

/// Formatter output: styled prose plus the code blocks lifted out of the
/// response, in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormattedReview {
    pub prose: String,
    pub code_blocks: Vec<String>,
}

/// Split a raw review response into styled prose and extracted code.
pub fn format_review(raw: &str) -> FormattedReview {
    FormattedReview {
        prose: format_prose(&strip_code_blocks(raw)),
        code_blocks: extract_code_blocks(raw),
    }
}

/// All fenced code regions in document order, delimiters stripped and
/// surrounding whitespace trimmed.
pub fn extract_code_blocks(text: &str) -> Vec<String> {
    CODE_FENCE
        .captures_iter(text)
        .map(|captures| captures[1].trim().to_string())
        .collect()
}

/// The prose remainder once fenced regions are removed.
pub fn strip_code_blocks(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").into_owned()
}

/// Run the substitution pipeline over prose. Pure; ordering of the
/// surviving text is untouched.
pub fn format_prose(text: &str) -> String {
    TRANSFORMS.iter().fold(text.to_string(), |acc, transform| {
        transform
            .pattern
            .replace_all(&acc, transform.replacement.as_str())
            .into_owned()
    })
}
