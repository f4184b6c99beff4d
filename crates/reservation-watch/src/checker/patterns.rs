use regex::{Regex, RegexBuilder};
use tracing::{info, warn};

use super::Availability;

/// Vocabulary that must appear somewhere on the page before date mentions are
/// treated as reservation requirements.
pub const RESERVATION_KEYWORDS: [&str; 6] = [
    "reservation",
    "require",
    "entry",
    "timed",
    "permit",
    "advance",
];

/// The three passes run over the page for one month name.
struct DatePatterns {
    /// `February 8` or `February 8–9`
    range: Regex,
    /// `February 8–9, February 15–17, and February 22–23`
    list: Regex,
    /// `February 8–9, 2025`
    with_year: Regex,
}

impl DatePatterns {
    fn for_month(month: &str) -> Result<Self, regex::Error> {
        let month = regex::escape(month);
        let range = format!(r"{month}\s+\d+(?:[–-]\d+)?");

        Ok(Self {
            range: case_insensitive(&range)?,
            list: case_insensitive(&format!(
                r"{range}(?:,\s+{range})*(?:,?\s+and\s+{range})?"
            ))?,
            with_year: case_insensitive(&format!(r"{range},?\s+\d{{4}}"))?,
        })
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Finds reservation date ranges for `month` in already-extracted page text.
///
/// Matches from all passes are trimmed and deduplicated in first-seen order. A
/// list match contributes its individual ranges rather than the joined text.
/// When no [`RESERVATION_KEYWORDS`] entry occurs in the content, every match is
/// discarded and the result is [`Availability::NotFound`].
pub fn extract_reservation_dates(content: &str, month: &str) -> Availability {
    let month = month.trim();
    if month.is_empty() {
        return Availability::NotFound;
    }

    let patterns = match DatePatterns::for_month(month) {
        Ok(patterns) => patterns,
        Err(err) => {
            warn!(month, error = %err, "unable to build date patterns");
            return Availability::NotFound;
        }
    };

    let mut dates = Vec::new();
    for found in patterns.range.find_iter(content) {
        push_unique(&mut dates, found.as_str());
    }
    // Every range inside a list was already found by the first pass. This pass
    // only makes the list shape explicit alongside the other two.
    for list in patterns.list.find_iter(content) {
        for found in patterns.range.find_iter(list.as_str()) {
            push_unique(&mut dates, found.as_str());
        }
    }
    for found in patterns.with_year.find_iter(content) {
        push_unique(&mut dates, found.as_str());
    }

    if dates.is_empty() {
        info!(month, "no specific reservation dates found");
        return Availability::NotFound;
    }

    let lowered = content.to_lowercase();
    if !RESERVATION_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
    {
        warn!(
            month,
            "found dates but no reservation context detected, skipping notification"
        );
        return Availability::NotFound;
    }

    info!(month, ?dates, "found specific reservation dates");
    Availability::Found(dates)
}

fn push_unique(dates: &mut Vec<String>, candidate: &str) {
    let candidate = candidate.trim();
    if candidate.is_empty() || dates.iter().any(|existing| existing == candidate) {
        return;
    }
    info!(date_range = candidate, "found date range requiring reservation");
    dates.push(candidate.to_string());
}
