// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Prompt/response row pairing.
//!
//! A prompt row (a question) and its response rows (outcomes) share a
//! [`PairId`]. Pairing is positional by default, but an id that a user
//! edit already put in place is never overwritten.

use std::collections::{BTreeMap, VecDeque};
use std::ops::Range;

use crate::ids::PairId;
use crate::model::Row;

pub trait PairKeyed {
    fn pair_key(&self) -> Option<&PairId>;
}

impl PairKeyed for Row {
    fn pair_key(&self) -> Option<&PairId> {
        self.pair_id.as_ref()
    }
}

impl<T: PairKeyed + ?Sized> PairKeyed for &T {
    fn pair_key(&self) -> Option<&PairId> {
        (**self).pair_key()
    }
}

/// Links index-aligned rows of two sections, then fills unset rows down
/// from the last id seen in their own section. Returns how many rows
/// received an id; running it twice changes nothing the second time.
pub fn ensure_pairing(rows: &mut [Row], primary: Range<usize>, secondary: Range<usize>) -> usize {
    ensure_pairing_with(rows, primary, secondary, PairId::generate)
}

pub fn ensure_pairing_with<F>(
    rows: &mut [Row],
    primary: Range<usize>,
    secondary: Range<usize>,
    mut next_id: F,
) -> usize
where
    F: FnMut() -> PairId,
{
    let primary = clamp_range(primary, rows.len());
    let secondary = clamp_range(secondary, rows.len());
    let overlap = primary.len().min(secondary.len());
    let mut assigned = 0;

    for offset in 0..overlap {
        let p = primary.start + offset;
        let s = secondary.start + offset;
        match (rows[p].pair_id.clone(), rows[s].pair_id.clone()) {
            (None, None) => {
                let id = next_id();
                rows[p].pair_id = Some(id.clone());
                rows[s].pair_id = Some(id);
                assigned += 2;
            }
            (Some(id), None) => {
                rows[s].pair_id = Some(id);
                assigned += 1;
            }
            (None, Some(id)) => {
                rows[p].pair_id = Some(id);
                assigned += 1;
            }
            // Both set: equal ids are already linked, different ids are a
            // user customization.
            (Some(_), Some(_)) => {}
        }
    }

    assigned += fill_down(rows, primary);
    assigned += fill_down(rows, secondary);
    assigned
}

fn fill_down(rows: &mut [Row], range: Range<usize>) -> usize {
    let mut last_seen: Option<PairId> = None;
    let mut assigned = 0;
    for row in &mut rows[range] {
        match (&row.pair_id, &last_seen) {
            (Some(id), _) => last_seen = Some(id.clone()),
            (None, Some(id)) => {
                row.pair_id = Some(id.clone());
                assigned += 1;
            }
            (None, None) => {}
        }
    }
    assigned
}

fn clamp_range(range: Range<usize>, len: usize) -> Range<usize> {
    let end = range.end.min(len);
    range.start.min(end)..end
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedGroup {
    /// Index into the primary entries.
    pub primary: usize,
    /// Indices into the secondary entries, in original order.
    pub secondary: Vec<usize>,
}

/// Result of [`build_paired_groups`]. Every secondary index appears in
/// exactly one group or in `leftover_secondary`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PairedGroups {
    pub groups: Vec<PairedGroup>,
    pub leftover_primary: Vec<usize>,
    pub leftover_secondary: Vec<usize>,
}

pub fn build_paired_groups<P, S>(primary: &[P], secondary: &[S]) -> PairedGroups
where
    P: PairKeyed,
    S: PairKeyed,
{
    let mut by_pair: BTreeMap<&PairId, Vec<usize>> = BTreeMap::new();
    let mut fallback: VecDeque<usize> = VecDeque::new();
    for (index, entry) in secondary.iter().enumerate() {
        match entry.pair_key() {
            Some(id) => by_pair.entry(id).or_default().push(index),
            None => fallback.push_back(index),
        }
    }

    let mut consumed = vec![false; secondary.len()];
    let mut result = PairedGroups::default();

    for (index, entry) in primary.iter().enumerate() {
        let matched = entry
            .pair_key()
            .and_then(|id| by_pair.get_mut(id))
            .filter(|group| !group.is_empty())
            .map(std::mem::take);

        let attached = match matched {
            Some(group) => Some(group),
            None => fallback.pop_front().map(|head| vec![head]),
        };

        match attached {
            Some(group) => {
                for secondary_index in &group {
                    consumed[*secondary_index] = true;
                }
                result.groups.push(PairedGroup {
                    primary: index,
                    secondary: group,
                });
            }
            None => result.leftover_primary.push(index),
        }
    }

    result.leftover_secondary = consumed
        .iter()
        .enumerate()
        .filter(|(_, used)| !**used)
        .map(|(index, _)| index)
        .collect();
    result
}
