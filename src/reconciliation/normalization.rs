//! Time normalization.
//!
//! Turns heterogeneous raw cell values into canonical [`TimeToken`]s and
//! merges token lists. Nothing here fails: content that cannot be read as a
//! clock time simply yields no tokens.

use std::collections::BTreeSet;

use chrono::Timelike;
use chrono_tz::Tz;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{MINUTES_PER_DAY, RawCell, TimeToken};

/// Hour 0–23 with an optional leading digit, then a two-digit minute.
const PUNCH_PATTERN: &str = r"\b([01]?\d|2[0-3]):([0-5]\d)\b";

/// Converts raw cells into time tokens.
///
/// # Example
///
/// ```
/// use attendance_engine::models::RawCell;
/// use attendance_engine::reconciliation::TimeNormalizer;
///
/// let normalizer = TimeNormalizer::new(chrono_tz::Tz::UTC);
/// let tokens = normalizer.normalize(&RawCell::Text("7:58\n17:02 (late)".to_string()));
/// let rendered: Vec<String> = tokens.iter().map(ToString::to_string).collect();
/// assert_eq!(rendered, vec!["07:58", "17:02"]);
/// ```
#[derive(Debug, Clone)]
pub struct TimeNormalizer {
    pattern: Regex,
    zone: Tz,
}

impl TimeNormalizer {
    /// Creates a normalizer rendering concrete instants in `zone`.
    pub fn new(zone: Tz) -> Self {
        Self {
            pattern: Regex::new(PUNCH_PATTERN).expect("punch pattern is valid"),
            zone,
        }
    }

    /// Extracts every punch from a raw cell, in the order found.
    pub fn normalize(&self, cell: &RawCell) -> Vec<TimeToken> {
        match cell {
            RawCell::Empty => Vec::new(),
            RawCell::Text(text) => self.extract(text),
            RawCell::Serial(value) => serial_to_token(*value).into_iter().collect(),
            RawCell::DateTime(instant) => {
                let local = instant.with_timezone(&self.zone);
                TimeToken::from_hm(local.hour(), local.minute())
                    .into_iter()
                    .collect()
            }
        }
    }

    /// Extracts every `H:MM` / `HH:MM` substring from free text.
    pub fn extract(&self, text: &str) -> Vec<TimeToken> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let hour = caps.get(1)?.as_str().parse().ok()?;
                let minute = caps.get(2)?.as_str().parse().ok()?;
                TimeToken::from_hm(hour, minute)
            })
            .collect()
    }
}

/// Reads the fractional part of a spreadsheet serial as a time of day.
///
/// The fraction is taken as a literal clock face: `round(f * 1440)` minutes,
/// half away from zero, clamped to `23:59`. Negative serials yield `None`.
pub fn serial_to_token(value: Decimal) -> Option<TimeToken> {
    if value.is_sign_negative() {
        return None;
    }
    let fraction = value.fract();
    let minutes = (fraction * Decimal::from(MINUTES_PER_DAY))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i32()?;
    Some(TimeToken::saturating(minutes))
}

/// Merges two lists of time strings into one sorted, duplicate-free list.
///
/// Short components are padded (`8:5` and `08:05` are the same punch);
/// entries that are not clock times are dropped.
///
/// # Example
///
/// ```
/// use attendance_engine::reconciliation::merge_tokens;
///
/// let merged = merge_tokens(["8:5", "13:20"], ["08:05", "garbage"]);
/// let rendered: Vec<String> = merged.iter().map(ToString::to_string).collect();
/// assert_eq!(rendered, vec!["08:05", "13:20"]);
/// ```
pub fn merge_tokens<A, B>(first: A, second: B) -> Vec<TimeToken>
where
    A: IntoIterator,
    A::Item: AsRef<str>,
    B: IntoIterator,
    B::Item: AsRef<str>,
{
    let merged: BTreeSet<TimeToken> = first
        .into_iter()
        .filter_map(|raw| raw.as_ref().parse().ok())
        .chain(
            second
                .into_iter()
                .filter_map(|raw| raw.as_ref().parse().ok()),
        )
        .collect();
    merged.into_iter().collect()
}

/// Renders tokens as ledger cell text, one punch per line.
pub fn format_cell(tokens: &[TimeToken]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
