//! Shape checks applied before any score or title is stored.

use crate::QuinielaError;

/// Check that a score has the exact form `<digits>-<digits>`.
/// Only ASCII digits are accepted and nothing may surround the two numbers.
#[must_use]
pub fn is_valid_score(score: &str) -> bool {
    let Some((home, away)) = score.split_once('-') else {
        return false;
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(home) && all_digits(away)
}

/// Trim a user-entered score and check its shape.
///
/// # Errors
/// Returns `InvalidScoreFormat` with the trimmed value if it is not a valid score.
pub fn validate_score(raw: &str) -> Result<String, QuinielaError> {
    let value = raw.trim();
    if is_valid_score(value) {
        Ok(value.to_string())
    } else {
        Err(QuinielaError::InvalidScoreFormat {
            value: value.to_string(),
        })
    }
}

/// Validate every score in a batch. Nothing is returned unless all of them pass.
///
/// # Errors
/// Returns `InvalidScoreFormat` for the first value that fails.
pub fn validate_scores(raw: &[String]) -> Result<Vec<String>, QuinielaError> {
    raw.iter().map(|s| validate_score(s)).collect()
}

/// Validate a batch of fixture titles, where `first_slot` is the slot of the first title.
///
/// # Errors
/// Returns `EmptyFixtureTitle` for the first title that is blank after trimming.
pub fn validate_titles(raw: &[String], first_slot: usize) -> Result<Vec<String>, QuinielaError> {
    raw.iter()
        .enumerate()
        .map(|(i, title)| {
            let title = title.trim();
            if title.is_empty() {
                Err(QuinielaError::EmptyFixtureTitle {
                    slot: first_slot + i,
                })
            } else {
                Ok(title.to_string())
            }
        })
        .collect()
}
