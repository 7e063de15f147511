// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! The plan table: fixed-width rows partitioned into sections by count.
//!
//! Row 0 is the title. Each [`SectionGroup`] is introduced by one heading
//! row followed by the rows of its sections, in [`Section::ALL`] order.
//! Nothing in the rows marks a boundary; [`SectionBounds`] is derived from
//! [`SectionCounts`] alone.

use std::ops::Range;

use crate::duration;
use crate::ids::PairId;
use crate::model::{
    DURATION_COL, ESTIMATE_COL, ROW_WIDTH, Row, RowKind, Section, SectionCounts, SectionGroup,
    SectionPair, TEXT_COL,
};
use crate::pairing::{self, PairedGroups};

pub const TITLE_ROW: usize = 0;

/// Absolute row ranges computed from section counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBounds {
    headers: [usize; 5],
    sections: [Range<usize>; 7],
    total: usize,
}

impl SectionBounds {
    pub fn range(&self, section: Section) -> Range<usize> {
        self.sections[section.index()].clone()
    }

    pub fn header_row(&self, group: SectionGroup) -> usize {
        self.headers[group.index()]
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn section_at(&self, row: usize) -> Option<Section> {
        Section::ALL
            .into_iter()
            .find(|section| self.sections[section.index()].contains(&row))
    }

    pub fn is_header(&self, row: usize) -> bool {
        row == TITLE_ROW || self.headers.contains(&row)
    }

    pub fn kind_at(&self, row: usize) -> RowKind {
        self.section_at(row).map_or(RowKind::Header, Section::row_kind)
    }
}

/// Lays the sections out top to bottom. Ranges are contiguous,
/// non-overlapping, and increasing.
pub fn compute_section_bounds(counts: &SectionCounts) -> SectionBounds {
    let mut headers = [0; 5];
    let mut sections: [Range<usize>; 7] = std::array::from_fn(|_| 0..0);
    let mut cursor = TITLE_ROW + 1;

    for group in SectionGroup::ALL {
        headers[group.index()] = cursor;
        cursor += 1;
        for section in group.sections() {
            let len = counts.get(*section);
            sections[section.index()] = cursor..cursor + len;
            cursor += len;
        }
    }

    SectionBounds {
        headers,
        sections,
        total: cursor,
    }
}

/// Total rows `counts` lays out, or `None` when the sum does not fit in
/// `usize`. Check untrusted counts with this before laying them out.
pub fn layout_rows(counts: &SectionCounts) -> Option<usize> {
    Section::ALL
        .into_iter()
        .try_fold(TITLE_ROW + 1 + SectionGroup::ALL.len(), |total, section| {
            total.checked_add(counts.get(section))
        })
}

/// Pads raw persisted entries into rows of the fixed width and pads the
/// list with blank data rows up to `min_rows`.
pub fn normalize_entries(entries: &[Vec<String>], min_rows: usize) -> Vec<Row> {
    let rows = entries
        .iter()
        .map(|entry| Row::from_cells(entry.iter().cloned(), RowKind::Data))
        .collect();
    normalize_rows(rows, min_rows)
}

/// Pads `rows` up to `min_rows`, leaving existing rows (with their kind and
/// pair id) untouched.
pub fn normalize_rows(mut rows: Vec<Row>, min_rows: usize) -> Vec<Row> {
    while rows.len() < min_rows {
        rows.push(Row::blank(RowKind::Data));
    }
    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// The section's only row was blanked instead of removed.
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Row>,
    counts: SectionCounts,
}

impl Table {
    /// A fresh table: one row per section, prompt/response rows linked.
    pub fn new_seeded(title: &str) -> Self {
        let counts = SectionCounts::default();
        let bounds = compute_section_bounds(&counts);
        let mut rows: Vec<Row> = (0..bounds.total())
            .map(|index| Row::blank(bounds.kind_at(index)))
            .collect();
        rows[TITLE_ROW].cells[TEXT_COL] = title.to_owned();
        for group in SectionGroup::ALL {
            rows[bounds.header_row(group)].cells[TEXT_COL] = group.label().to_owned();
        }

        let mut table = Self { rows, counts };
        table.ensure_pairing();
        table
    }

    /// Rebuilds a table from persisted cell text. Kinds come from the
    /// layout and pairing is re-derived positionally; pair ids chosen by
    /// earlier edits are not recoverable from this shape.
    pub fn from_entries(entries: &[Vec<String>], counts: SectionCounts) -> Self {
        let mut counts = counts.clamped();
        let laid_out = compute_section_bounds(&counts).total();
        if entries.len() > laid_out {
            *counts.get_mut(Section::Subprojects) += entries.len() - laid_out;
        }
        let bounds = compute_section_bounds(&counts);

        let mut rows = normalize_entries(entries, bounds.total());
        for (index, row) in rows.iter_mut().enumerate() {
            row.kind = bounds.kind_at(index);
            row.pair_id = None;
        }
        for group in SectionGroup::ALL {
            let header = &mut rows[bounds.header_row(group)];
            if header.is_blank() {
                header.cells[TEXT_COL] = group.label().to_owned();
            }
        }

        let mut table = Self { rows, counts };
        table.ensure_pairing();
        table
    }

    /// Builds a table from already-typed rows. Returns `None` unless the
    /// row count matches the layout of `counts`.
    pub fn from_rows(rows: Vec<Row>, counts: SectionCounts) -> Option<Self> {
        if counts.clamped() != counts || compute_section_bounds(&counts).total() != rows.len() {
            return None;
        }
        Some(Self { rows, counts })
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn counts(&self) -> SectionCounts {
        self.counts
    }

    pub fn bounds(&self) -> SectionBounds {
        compute_section_bounds(&self.counts)
    }

    pub fn section_rows(&self, section: Section) -> &[Row] {
        &self.rows[self.bounds().range(section)]
    }

    pub fn section_of(&self, row: usize) -> Option<Section> {
        self.bounds().section_at(row)
    }

    pub fn title(&self) -> &str {
        self.rows[TITLE_ROW].text()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|row| row.cell(col))
    }

    pub fn entries(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(Row::to_entries).collect()
    }

    /// Writes one cell. Estimate and duration cells of timed sections go
    /// through the duration normalizer. Returns whether anything changed.
    pub fn set_cell(&mut self, row: usize, col: usize, value: &str) -> bool {
        if row >= self.rows.len() || col >= ROW_WIDTH {
            return false;
        }
        let timed = self.section_of(row).is_some_and(Section::is_timed);
        let target = &mut self.rows[row];
        match col {
            ESTIMATE_COL if timed => duration::apply_label(target, value),
            DURATION_COL if timed => duration::apply_duration(target, value),
            _ => {
                if target.cells[col] == value {
                    return false;
                }
                target.cells[col] = value.to_owned();
                true
            }
        }
    }

    /// Inserts a blank row at `offset` within `section` (`0..=count`).
    pub fn insert_row(&mut self, section: Section, offset: usize) -> Option<usize> {
        let before = self.bounds().range(section);
        if offset > before.len() {
            return None;
        }
        let index = before.start + offset;
        self.rows.insert(index, Row::blank(section.row_kind()));
        *self.counts.get_mut(section) += 1;
        debug_assert_eq!(self.bounds().total(), self.rows.len());
        debug_assert_eq!(self.bounds().range(section).end, before.end + 1);
        Some(index)
    }

    /// Inserts a blank row directly below `row`, which must belong to
    /// `section`.
    pub fn insert_row_after(&mut self, section: Section, row: usize) -> Option<usize> {
        let range = self.bounds().range(section);
        if !range.contains(&row) {
            return None;
        }
        self.insert_row(section, row - range.start + 1)
    }

    pub fn remove_row(&mut self, section: Section, row: usize) -> Option<RemoveOutcome> {
        let range = self.bounds().range(section);
        if !range.contains(&row) {
            return None;
        }
        if range.len() == 1 {
            self.rows[row].clear_cells();
            return Some(RemoveOutcome::Cleared);
        }
        self.rows.remove(row);
        *self.counts.get_mut(section) -= 1;
        debug_assert_eq!(self.bounds().total(), self.rows.len());
        Some(RemoveOutcome::Removed)
    }

    /// Appends one row to each side of `pair`, both carrying `pair_id`.
    /// Returns the final `(primary_row, secondary_row)`.
    pub fn add_paired_rows(&mut self, pair: SectionPair, pair_id: PairId) -> (usize, usize) {
        for section in [pair.secondary, pair.primary] {
            let count = self.counts.get(section);
            if let Some(index) = self.insert_row(section, count) {
                self.rows[index].pair_id = Some(pair_id.clone());
            }
        }
        let bounds = self.bounds();
        (
            bounds.range(pair.primary).end - 1,
            bounds.range(pair.secondary).end - 1,
        )
    }

    /// Adds a response row for the prompt at `prompt_row`, placed after the
    /// prompt's last existing response. A prompt without a pair id adopts
    /// `fallback`.
    pub fn add_response_row(&mut self, prompt_row: usize, fallback: PairId) -> Option<usize> {
        let bounds = self.bounds();
        let pair = SectionPair::ALL
            .into_iter()
            .find(|pair| bounds.range(pair.primary).contains(&prompt_row))?;

        let pair_id = match &self.rows[prompt_row].pair_id {
            Some(id) => id.clone(),
            None => {
                self.rows[prompt_row].pair_id = Some(fallback.clone());
                fallback
            }
        };

        let secondary = bounds.range(pair.secondary);
        let offset = self.rows[secondary.clone()]
            .iter()
            .rposition(|row| row.pair_id.as_ref() == Some(&pair_id))
            .map_or(secondary.len(), |last| last + 1);
        let index = self.insert_row(pair.secondary, offset)?;
        self.rows[index].pair_id = Some(pair_id);
        Some(index)
    }

    /// Moves `indices` (all in one section) as a contiguous block so that
    /// it lands before `target`; `target` may equal the section end to
    /// move to the bottom. Returns the moved rows' new indices.
    pub fn move_rows(&mut self, indices: &[usize], target: usize) -> Option<Vec<usize>> {
        let first = *indices.first()?;
        let section = self.section_of(first)?;
        let range = self.bounds().range(section);
        if indices.iter().any(|index| !range.contains(index))
            || target < range.start
            || target > range.end
        {
            return None;
        }
        Some(crate::dragdrop::reorder_rows(&mut self.rows, indices, target))
    }

    /// Overwrites a block of cells starting at `(row, col)`, dropping
    /// anything past the table edge. Returns the number of cells changed;
    /// read-only and unchanged cells are not counted.
    pub fn paste_block(&mut self, row: usize, col: usize, block: &[Vec<String>]) -> usize {
        let mut changed = 0;
        for (row_offset, values) in block.iter().enumerate() {
            let target_row = row + row_offset;
            if target_row >= self.rows.len() {
                break;
            }
            for (col_offset, value) in values.iter().enumerate() {
                let target_col = col + col_offset;
                if target_col >= ROW_WIDTH {
                    break;
                }
                if self.set_cell(target_row, target_col, value) {
                    changed += 1;
                }
            }
        }
        changed
    }

    pub fn set_title(&mut self, title: &str) -> bool {
        self.set_cell(TITLE_ROW, TEXT_COL, title)
    }

    /// Re-derives pair ids for both prompt/response pairings.
    pub fn ensure_pairing(&mut self) -> usize {
        self.ensure_pairing_with(PairId::generate)
    }

    pub fn ensure_pairing_with<F>(&mut self, mut next_id: F) -> usize
    where
        F: FnMut() -> PairId,
    {
        let bounds = self.bounds();
        SectionPair::ALL
            .into_iter()
            .map(|pair| {
                pairing::ensure_pairing_with(
                    &mut self.rows,
                    bounds.range(pair.primary),
                    bounds.range(pair.secondary),
                    &mut next_id,
                )
            })
            .sum()
    }

    /// Groups response rows under their prompts. Indices are relative to
    /// the two sections.
    pub fn paired_groups(&self, pair: SectionPair) -> PairedGroups {
        pairing::build_paired_groups(
            self.section_rows(pair.primary),
            self.section_rows(pair.secondary),
        )
    }

    pub fn section_minutes(&self, section: Section) -> u64 {
        if !section.is_timed() {
            return 0;
        }
        duration::total_minutes(self.section_rows(section))
    }

    /// `H.MM` totals for each timed section.
    pub fn section_totals(&self) -> Vec<(Section, String)> {
        Section::TIMED
            .into_iter()
            .map(|section| {
                (
                    section,
                    duration::format_duration(self.section_minutes(section)),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        RemoveOutcome, TITLE_ROW, Table, compute_section_bounds, layout_rows, normalize_entries,
        normalize_rows,
    };
    use crate::duration::CUSTOM;
    use crate::ids::PairId;
    use crate::model::{
        DURATION_COL, ESTIMATE_COL, Row, RowKind, Section, SectionCounts, SectionGroup,
        SectionPair,
    };

    fn entries(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| (*cell).to_owned()).collect())
            .collect()
    }

    #[test]
    fn default_bounds_place_reasons_after_title_and_heading() {
        let bounds = compute_section_bounds(&SectionCounts::default());
        assert_eq!(bounds.header_row(SectionGroup::Reasons), 1);
        assert_eq!(bounds.range(Section::Reasons), 2..3);
        assert_eq!(bounds.header_row(SectionGroup::OutcomesAndQuestions), 3);
        assert_eq!(bounds.range(Section::Outcomes), 4..5);
        assert_eq!(bounds.range(Section::Questions), 5..6);
        assert_eq!(bounds.total(), 13);
    }

    #[test]
    fn bounds_are_contiguous_and_increasing() {
        let mut counts = SectionCounts::default();
        counts.set(Section::Outcomes, 3);
        counts.set(Section::Schedule, 4);
        let bounds = compute_section_bounds(&counts);

        let mut previous_end = 0;
        for section in Section::ALL {
            let range = bounds.range(section);
            assert!(range.start >= previous_end);
            assert_eq!(range.len(), counts.get(section));
            previous_end = range.end;
        }
        assert_eq!(bounds.total(), 6 + counts.data_rows());
        assert!(bounds.is_header(TITLE_ROW));
        assert_eq!(bounds.section_at(bounds.header_row(SectionGroup::Needs)), None);
    }

    #[test]
    fn seeded_table_pairs_prompts_with_responses() {
        let table = Table::new_seeded("Launch garden");
        assert_eq!(table.title(), "Launch garden");
        assert_eq!(table.len(), 13);

        let bounds = table.bounds();
        let question = &table.rows()[bounds.range(Section::Questions).start];
        let outcome = &table.rows()[bounds.range(Section::Outcomes).start];
        assert_eq!(question.kind, RowKind::Prompt);
        assert_eq!(outcome.kind, RowKind::Response);
        assert!(question.pair_id.is_some());
        assert_eq!(question.pair_id, outcome.pair_id);
    }

    #[test]
    fn insert_reason_row_shifts_later_sections_by_one() {
        let mut table = Table::new_seeded("Plan");
        let before = table.bounds();

        let inserted = table.insert_row_after(Section::Reasons, 2);
        assert_eq!(inserted, Some(3));
        assert_eq!(table.counts().reason_row_count, 2);

        let after = table.bounds();
        for section in Section::ALL.into_iter().skip(1) {
            assert_eq!(after.range(section).start, before.range(section).start + 1);
        }
    }

    #[test]
    fn insert_outside_section_is_rejected() {
        let mut table = Table::new_seeded("Plan");
        assert_eq!(table.insert_row_after(Section::Reasons, 5), None);
        assert_eq!(table.insert_row(Section::Reasons, 3), None);
        assert_eq!(table.len(), 13);
    }

    #[test]
    fn removing_only_row_clears_it() {
        let mut table = Table::new_seeded("Plan");
        let row = table.bounds().range(Section::Schedule).start;
        table.set_cell(row, 0, "Dig beds");

        assert_eq!(
            table.remove_row(Section::Schedule, row),
            Some(RemoveOutcome::Cleared)
        );
        assert_eq!(table.counts().schedule_row_count, 1);
        assert!(table.rows()[row].cells.iter().all(String::is_empty));
        assert_eq!(table.len(), 13);
    }

    #[test]
    fn removing_one_of_many_rows_shrinks_section() {
        let mut table = Table::new_seeded("Plan");
        table.insert_row(Section::Reasons, 1);
        assert_eq!(
            table.remove_row(Section::Reasons, 2),
            Some(RemoveOutcome::Removed)
        );
        assert_eq!(table.counts().reason_row_count, 1);
        assert_eq!(table.remove_row(Section::Reasons, 9), None);
    }

    #[test]
    fn paired_rows_share_the_given_id() {
        let mut table = Table::new_seeded("Plan");
        let id = PairId::new("p-new");
        let (question, outcome) = table.add_paired_rows(SectionPair::QUESTIONS, id.clone());

        assert_eq!(table.counts().question_row_count, 2);
        assert_eq!(table.counts().outcome_row_count, 2);
        assert_eq!(table.rows()[question].pair_id, Some(id.clone()));
        assert_eq!(table.rows()[outcome].pair_id, Some(id));
        assert_eq!(table.section_of(question), Some(Section::Questions));
        assert_eq!(table.section_of(outcome), Some(Section::Outcomes));
    }

    #[test]
    fn response_row_lands_after_prompts_existing_responses() {
        let mut table = Table::new_seeded("Plan");
        let question = table.bounds().range(Section::Questions).start;
        let pair = table.rows()[question].pair_id.clone();

        let added = table
            .add_response_row(question, PairId::new("unused"))
            .expect("question row accepts a response");
        assert_eq!(table.section_of(added), Some(Section::Outcomes));
        assert_eq!(table.rows()[added].pair_id, pair);
        assert_eq!(added, table.bounds().range(Section::Outcomes).start + 1);

        let groups = table.paired_groups(SectionPair::QUESTIONS);
        assert_eq!(groups.groups.len(), 1);
        assert_eq!(groups.groups[0].secondary, vec![0, 1]);
    }

    #[test]
    fn response_row_requires_a_prompt() {
        let mut table = Table::new_seeded("Plan");
        assert_eq!(table.add_response_row(2, PairId::new("x")), None);
    }

    #[test]
    fn from_entries_pads_rows_and_rederives_pairing() {
        let raw = entries(&[&["Title"], &["Reasons"], &["Because", "extra"]]);
        let table = Table::from_entries(&raw, SectionCounts::default());

        assert_eq!(table.len(), 13);
        assert_eq!(table.rows()[2].cells[0], "Because");
        assert_eq!(table.rows()[2].cells[1], "extra");
        assert_eq!(table.rows()[2].cells.len(), 6);
        let bounds = table.bounds();
        assert_eq!(table.rows()[bounds.header_row(SectionGroup::Schedule)].cells[0], "Schedule");
        assert!(table.rows()[bounds.range(Section::Questions).start].pair_id.is_some());
    }

    #[test]
    fn from_entries_absorbs_surplus_rows_into_subprojects() {
        let raw: Vec<Vec<String>> = (0..15).map(|n| vec![format!("r{n}")]).collect();
        let table = Table::from_entries(&raw, SectionCounts::default());
        assert_eq!(table.len(), 15);
        assert_eq!(table.counts().subproject_row_count, 3);
        assert_eq!(table.rows()[14].cells[0], "r14");
    }

    #[test]
    fn from_rows_rejects_mismatched_layout() {
        let rows = vec![Row::blank(RowKind::Data); 4];
        assert!(Table::from_rows(rows, SectionCounts::default()).is_none());
    }

    #[test]
    fn normalize_keeps_metadata_and_pads() {
        let rows = vec![Row::blank(RowKind::Prompt).with_pair(Some(PairId::new("p1")))];
        let padded = normalize_rows(rows, 3);
        assert_eq!(padded.len(), 3);
        assert_eq!(padded[0].pair_id, Some(PairId::new("p1")));
        assert_eq!(padded[0].kind, RowKind::Prompt);

        let from_raw = normalize_entries(&entries(&[&["a", "b", "c", "d", "e", "f", "g"]]), 1);
        assert_eq!(from_raw[0].cells, ["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn timed_cells_route_through_normalizer() {
        let mut table = Table::new_seeded("Plan");
        let row = table.bounds().range(Section::Schedule).start;
        assert!(table.set_cell(row, ESTIMATE_COL, "30 Minutes"));
        assert_eq!(table.cell(row, DURATION_COL), Some("0.30"));
        assert!(!table.set_cell(row, DURATION_COL, "4.00"));

        let reason = table.bounds().range(Section::Reasons).start;
        assert!(table.set_cell(reason, DURATION_COL, "anything"));
    }

    #[test]
    fn section_totals_cover_timed_sections() {
        let mut table = Table::new_seeded("Plan");
        let first = table.bounds().range(Section::Schedule).start;
        table.set_cell(first, ESTIMATE_COL, "45 Minutes");
        let second = table
            .insert_row_after(Section::Schedule, first)
            .expect("insert schedule row");
        table.set_cell(second, ESTIMATE_COL, "2 Hours");

        let totals = table.section_totals();
        assert_eq!(
            totals,
            vec![
                (Section::Schedule, "2.45".to_owned()),
                (Section::Subprojects, "0.00".to_owned()),
            ]
        );
        assert_eq!(table.section_minutes(Section::Reasons), 0);
    }

    #[test]
    fn paste_block_clips_at_edges() {
        let mut table = Table::new_seeded("Plan");
        let last = table.len() - 1;
        let written = table.paste_block(last, 4, &entries(&[&["a", "b", "c"], &["d"]]));
        assert_eq!(written, 2);
        assert_eq!(table.cell(last, 4), Some("a"));
        assert_eq!(table.cell(last, 5), Some("b"));
    }

    #[test]
    fn paste_block_counts_only_cells_that_changed() {
        let mut table = Table::new_seeded("Plan");
        let row = table.bounds().range(Section::Schedule).start;
        table.set_cell(row, ESTIMATE_COL, "1 Hour");

        let unchanged = table.paste_block(row, DURATION_COL, &entries(&[&["9.00", ""]]));
        assert_eq!(unchanged, 0);
        assert_eq!(table.cell(row, DURATION_COL), Some("1.00"));

        let changed = table.paste_block(row, ESTIMATE_COL, &entries(&[&["1 Hour", "", "x"]]));
        assert_eq!(changed, 1);
        assert_eq!(table.cell(row, 3), Some("x"));
    }

    #[test]
    fn section_totals_survive_huge_custom_durations() {
        let mut table = Table::new_seeded("Plan");
        let first = table.bounds().range(Section::Schedule).start;
        let second = table
            .insert_row_after(Section::Schedule, first)
            .expect("insert schedule row");
        for row in [first, second] {
            table.set_cell(row, ESTIMATE_COL, CUSTOM);
            table.set_cell(row, DURATION_COL, "70000000");
        }

        assert_eq!(table.section_minutes(Section::Schedule), 8_400_000_000);
        assert_eq!(
            table.section_totals()[0],
            (Section::Schedule, "140000000.00".to_owned())
        );
    }

    #[test]
    fn layout_rows_rejects_overflowing_counts() {
        assert_eq!(layout_rows(&SectionCounts::default()), Some(13));
        let counts = SectionCounts {
            reason_row_count: usize::MAX,
            ..SectionCounts::default()
        };
        assert_eq!(layout_rows(&counts), None);
    }
}
