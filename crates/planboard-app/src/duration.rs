// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Estimate labels and `H.MM` durations for timed rows.
//!
//! A timed row carries a human label in [`ESTIMATE_COL`] and a canonical
//! duration in [`DURATION_COL`]. The duration is derived from the label
//! unless the label is [`CUSTOM`], in which case it is entered by hand.

use crate::model::{DURATION_COL, ESTIMATE_COL, Row};

pub const NO_ESTIMATE: &str = "-";
pub const CUSTOM: &str = "Custom";

const ESTIMATE_VOCABULARY: [(&str, u32); 21] = [
    (NO_ESTIMATE, 0),
    ("1 Minute", 1),
    ("5 Minutes", 5),
    ("10 Minutes", 10),
    ("15 Minutes", 15),
    ("20 Minutes", 20),
    ("25 Minutes", 25),
    ("30 Minutes", 30),
    ("35 Minutes", 35),
    ("40 Minutes", 40),
    ("45 Minutes", 45),
    ("50 Minutes", 50),
    ("55 Minutes", 55),
    ("1 Hour", 60),
    ("2 Hours", 120),
    ("3 Hours", 180),
    ("4 Hours", 240),
    ("5 Hours", 300),
    ("6 Hours", 360),
    ("7 Hours", 420),
    ("8 Hours", 480),
];

/// Every selectable label in display order, ending with [`CUSTOM`].
pub fn estimate_labels() -> impl Iterator<Item = &'static str> {
    ESTIMATE_VOCABULARY
        .iter()
        .map(|(label, _)| *label)
        .chain(std::iter::once(CUSTOM))
}

/// Minutes for a vocabulary label. `Custom` and unknown text have none.
pub fn label_to_minutes(label: &str) -> Option<u32> {
    canonical_label(label).and_then(|(_, minutes)| minutes)
}

pub fn minutes_to_label(minutes: u32) -> &'static str {
    ESTIMATE_VOCABULARY
        .iter()
        .find(|(_, value)| *value == minutes)
        .map_or(CUSTOM, |(label, _)| *label)
}

pub fn format_duration(minutes: u64) -> String {
    format!("{}.{:02}", minutes / 60, minutes % 60)
}

/// Parses `H.MM`, `H`, or `.MM`. The minute part is exactly two digits
/// below 60.
pub fn parse_duration(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (hours, minutes) = match trimmed.split_once('.') {
        Some((hours, minutes)) => (hours, Some(minutes)),
        None => (trimmed, None),
    };

    let hours: u32 = if hours.is_empty() {
        0
    } else if hours.bytes().all(|byte| byte.is_ascii_digit()) {
        hours.parse().ok()?
    } else {
        return None;
    };

    let minutes: u32 = match minutes {
        None => 0,
        Some(raw) if raw.len() == 2 && raw.bytes().all(|byte| byte.is_ascii_digit()) => {
            raw.parse().ok()?
        }
        Some(_) => return None,
    };
    if minutes >= 60 {
        return None;
    }

    hours.checked_mul(60)?.checked_add(minutes)
}

pub fn is_custom(label: &str) -> bool {
    label.trim().eq_ignore_ascii_case(CUSTOM)
}

/// Applies a label edit to a timed row and re-derives its duration.
///
/// Returns whether any cell changed.
pub fn apply_label(row: &mut Row, raw: &str) -> bool {
    let trimmed = raw.trim();
    let (label, duration) = if trimmed.is_empty() {
        (String::new(), Some(String::new()))
    } else {
        match canonical_label(trimmed) {
            Some((label, Some(0))) => (label.to_owned(), Some(String::new())),
            Some((label, Some(minutes))) => (
                label.to_owned(),
                Some(format_duration(u64::from(minutes))),
            ),
            Some((label, None)) => (label.to_owned(), None),
            None => (CUSTOM.to_owned(), None),
        }
    };

    let mut changed = replace_cell(row, ESTIMATE_COL, label);
    if let Some(duration) = duration {
        changed |= replace_cell(row, DURATION_COL, duration);
    }
    changed
}

/// Applies a hand-entered duration. Only `Custom` rows accept one; the
/// duration of every other row is derived from its label.
pub fn apply_duration(row: &mut Row, raw: &str) -> bool {
    if !is_custom(&row.cells[ESTIMATE_COL]) {
        return false;
    }
    let value = match parse_duration(raw) {
        Some(minutes) => format_duration(u64::from(minutes)),
        None => raw.trim().to_owned(),
    };
    replace_cell(row, DURATION_COL, value)
}

/// Minutes a timed row contributes to its section total.
pub fn row_minutes(row: &Row) -> u32 {
    parse_duration(&row.cells[DURATION_COL])
        .or_else(|| label_to_minutes(&row.cells[ESTIMATE_COL]))
        .unwrap_or(0)
}

/// Sums in `u64` so a handful of very long custom durations cannot
/// overflow; saturates rather than wrapping past that.
pub fn total_minutes<'a>(rows: impl IntoIterator<Item = &'a Row>) -> u64 {
    rows.into_iter()
        .map(|row| u64::from(row_minutes(row)))
        .fold(0, u64::saturating_add)
}

fn canonical_label(label: &str) -> Option<(&'static str, Option<u32>)> {
    let trimmed = label.trim();
    if is_custom(trimmed) {
        return Some((CUSTOM, None));
    }
    ESTIMATE_VOCABULARY
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(trimmed))
        .map(|(label, minutes)| (*label, Some(*minutes)))
}

fn replace_cell(row: &mut Row, col: usize, value: String) -> bool {
    if row.cells[col] == value {
        return false;
    }
    row.cells[col] = value;
    true
}
