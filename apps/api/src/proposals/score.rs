//! Score parsing: splits the leading `Match Score:` line from the proposal body.
//!
//! Purely textual: the score line is never validated. A score line with no line
//! break after it is treated as if there were no score at all.

use serde::Serialize;

pub const SCORE_PREFIX: &str = "Match Score:";
/// Separates the percentage from the rationale on a score line.
const RATIONALE_SEPARATOR: char = '\u{2014}';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedProposal {
    pub score: Option<String>,
    pub body: String,
}

pub fn parse_score(generated: &str) -> ParsedProposal {
    let unscored = || ParsedProposal {
        score: None,
        body: generated.to_string(),
    };

    if !generated.starts_with(SCORE_PREFIX) {
        return unscored();
    }
    let Some((score_line, rest)) = generated.split_once('\n') else {
        return unscored();
    };

    ParsedProposal {
        score: Some(score_line.trim().to_string()),
        body: skip_blank_lines(rest).to_string(),
    }
}

fn skip_blank_lines(mut text: &str) -> &str {
    while let Some((line, rest)) = text.split_once('\n') {
        if !line.trim().is_empty() {
            return text;
        }
        text = rest;
    }
    if text.trim().is_empty() {
        ""
    } else {
        text
    }
}

/// The part of a score line before the rationale, e.g. `"Match Score: 85%"`.
pub fn score_headline(score: &str) -> &str {
    score
        .split(RATIONALE_SEPARATOR)
        .next()
        .unwrap_or(score)
        .trim()
}

/// Leading integer percentage of a score line, when one is present.
pub fn score_percent(score: &str) -> Option<u8> {
    let rest = score.strip_prefix(SCORE_PREFIX)?.trim_start();
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<u8>().ok().filter(|p| *p <= 100)
}
