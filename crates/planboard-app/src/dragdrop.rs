// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::debug;

use crate::ids::ItemId;
use crate::model::Section;
use crate::selection::{RowCoord, Selection};
use crate::table::Table;

/// A row drag in progress. Dragged rows share one item and one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    item: ItemId,
    section: Section,
    rows: Vec<usize>,
    target: Option<RowCoord>,
}

/// The move a drop would perform right now. Not part of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPreview {
    pub item: ItemId,
    pub rows: Vec<usize>,
    pub target: usize,
    pub insert_at: usize,
}

/// A committed drop: move `rows` so the block lands before `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMove {
    pub item: ItemId,
    pub rows: Vec<usize>,
    pub target: usize,
}

impl DragState {
    /// Starts a drag on `pointer`. A pointer row inside the row selection
    /// drags every selected row of the same item and section; any other
    /// row drags alone. Heading rows cannot be dragged.
    pub fn begin(pointer: RowCoord, selection: &Selection, table: &Table) -> Option<Self> {
        let section = table.section_of(pointer.row)?;
        let range = table.bounds().range(section);

        let rows = if selection.is_row_selected(pointer) {
            let mut rows: Vec<usize> = selection
                .rows()
                .filter(|row| row.item == pointer.item && range.contains(&row.row))
                .map(|row| row.row)
                .collect();
            rows.sort_unstable();
            rows
        } else {
            vec![pointer.row]
        };

        Some(Self {
            item: pointer.item,
            section,
            rows,
            target: None,
        })
    }

    pub fn item(&self) -> ItemId {
        self.item
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn target(&self) -> Option<RowCoord> {
        self.target
    }

    /// Pointer entered a row. Same-item rows outside the dragged section
    /// (other than the slot just past its end) are ignored, as are the
    /// dragged rows themselves. Returns whether the target changed.
    pub fn enter(&mut self, pointer: RowCoord, table: &Table) -> bool {
        if pointer.item == self.item {
            if self.rows.contains(&pointer.row) {
                return false;
            }
            let range = table.bounds().range(self.section);
            if pointer.row < range.start || pointer.row > range.end {
                return false;
            }
        }
        if self.target == Some(pointer) {
            return false;
        }
        self.target = Some(pointer);
        true
    }

    pub fn preview(&self) -> Option<DragPreview> {
        let target = self.target.filter(|target| target.item == self.item)?;
        Some(DragPreview {
            item: self.item,
            rows: self.rows.clone(),
            target: target.row,
            insert_at: adjusted_insert_index(&self.rows, target.row),
        })
    }

    /// Ends the drag. Yields a move unless the target is missing, belongs
    /// to another item, or would leave the order unchanged.
    pub fn drop(self) -> Option<RowMove> {
        let target = self.target?;
        if target.item != self.item {
            debug!(
                from = %self.item,
                to = %target.item,
                "cross-item row move abandoned"
            );
            return None;
        }
        if is_noop_move(&self.rows, target.row) {
            return None;
        }
        Some(RowMove {
            item: self.item,
            rows: self.rows,
            target: target.row,
        })
    }
}

/// Where the block starts once the dragged rows above `target` are gone.
pub fn adjusted_insert_index(sorted_rows: &[usize], target: usize) -> usize {
    target - sorted_rows.iter().filter(|row| **row < target).count()
}

fn is_noop_move(sorted_rows: &[usize], target: usize) -> bool {
    let contiguous = sorted_rows.windows(2).all(|pair| pair[1] == pair[0] + 1);
    contiguous && sorted_rows.first() == Some(&adjusted_insert_index(sorted_rows, target))
}

/// Removes `indices` (highest first, so earlier removals don't shift later
/// ones) and re-inserts them as one block before `target`, keeping their
/// relative order. Returns the block's new indices.
pub fn reorder_rows<T>(rows: &mut Vec<T>, indices: &[usize], target: usize) -> Vec<usize> {
    let mut sorted: Vec<usize> = indices
        .iter()
        .copied()
        .filter(|index| *index < rows.len())
        .collect();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.is_empty() {
        return Vec::new();
    }

    let insert_at = adjusted_insert_index(&sorted, target.min(rows.len()));
    let mut moved: Vec<T> = sorted.iter().rev().map(|index| rows.remove(*index)).collect();
    moved.reverse();

    let count = moved.len();
    rows.splice(insert_at..insert_at, moved);
    (insert_at..insert_at + count).collect()
}

#[cfg(test)]
mod tests {
    use super::{DragState, adjusted_insert_index, reorder_rows};
    use crate::ids::ItemId;
    use crate::model::Section;
    use crate::selection::{RowCoord, Selection};
    use crate::table::Table;

    const A: ItemId = ItemId::new(1);
    const B: ItemId = ItemId::new(2);

    fn table_with_reasons(count: usize) -> Table {
        let mut table = Table::new_seeded("Plan");
        for offset in 1..count {
            table.insert_row(Section::Reasons, offset);
        }
        let range = table.bounds().range(Section::Reasons);
        for (n, row) in range.enumerate() {
            table.set_cell(row, 0, &format!("reason {n}"));
        }
        table
    }

    #[test]
    fn reorder_moves_block_before_target() {
        let mut rows = vec!["a", "b", "c", "d", "e"];
        let moved = reorder_rows(&mut rows, &[1], 3);
        assert_eq!(rows, vec!["a", "c", "b", "d", "e"]);
        assert_eq!(moved, vec![2]);

        let mut rows = vec!["a", "b", "c", "d", "e"];
        let moved = reorder_rows(&mut rows, &[3, 1], 0);
        assert_eq!(rows, vec!["b", "d", "a", "c", "e"]);
        assert_eq!(moved, vec![0, 1]);
    }

    #[test]
    fn reorder_to_end_appends_block() {
        let mut rows = vec!["a", "b", "c", "d"];
        reorder_rows(&mut rows, &[0, 2], 4);
        assert_eq!(rows, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn adjusted_index_discounts_rows_above_target() {
        assert_eq!(adjusted_insert_index(&[1, 2, 6], 5), 3);
        assert_eq!(adjusted_insert_index(&[7], 5), 5);
    }

    #[test]
    fn begin_on_selected_row_drags_selection_in_same_item_and_section() {
        let table = table_with_reasons(4);
        let mut selection = Selection::new();
        selection.select_row(RowCoord::new(A, 4), false);
        selection.select_row(RowCoord::new(A, 2), true);
        selection.select_row(RowCoord::new(B, 3), true);
        // heading row of the next group, outside the section
        selection.select_row(RowCoord::new(A, 6), true);

        let drag = DragState::begin(RowCoord::new(A, 4), &selection, &table).expect("drag starts");
        assert_eq!(drag.rows(), &[2, 4]);
    }

    #[test]
    fn begin_on_unselected_row_drags_it_alone() {
        let table = table_with_reasons(3);
        let mut selection = Selection::new();
        selection.select_row(RowCoord::new(A, 2), false);
        let drag = DragState::begin(RowCoord::new(A, 3), &selection, &table).expect("drag starts");
        assert_eq!(drag.rows(), &[3]);
    }

    #[test]
    fn heading_rows_are_not_draggable() {
        let table = Table::new_seeded("Plan");
        assert!(DragState::begin(RowCoord::new(A, 1), &Selection::new(), &table).is_none());
    }

    #[test]
    fn enter_ignores_dragged_rows_and_other_sections() {
        let table = table_with_reasons(3);
        let mut drag =
            DragState::begin(RowCoord::new(A, 2), &Selection::new(), &table).expect("drag starts");

        assert!(!drag.enter(RowCoord::new(A, 2), &table));
        assert!(!drag.enter(RowCoord::new(A, 9), &table));
        assert!(drag.enter(RowCoord::new(A, 4), &table));
        // one past the section end means "after the last reason"
        assert!(drag.enter(RowCoord::new(A, 5), &table));
        let preview = drag.preview().expect("same-item preview");
        assert_eq!(preview.insert_at, 4);
    }

    #[test]
    fn drop_on_other_item_is_abandoned() {
        let table = table_with_reasons(3);
        let mut drag =
            DragState::begin(RowCoord::new(A, 2), &Selection::new(), &table).expect("drag starts");
        drag.enter(RowCoord::new(B, 3), &table);
        assert!(drag.preview().is_none());
        assert!(drag.drop().is_none());
    }

    #[test]
    fn drop_that_keeps_order_yields_nothing() {
        let table = table_with_reasons(3);
        let mut drag =
            DragState::begin(RowCoord::new(A, 2), &Selection::new(), &table).expect("drag starts");
        drag.enter(RowCoord::new(A, 3), &table);
        assert!(drag.drop().is_none());
    }

    #[test]
    fn drop_yields_move_for_table() {
        let mut table = table_with_reasons(3);
        let mut drag =
            DragState::begin(RowCoord::new(A, 2), &Selection::new(), &table).expect("drag starts");
        drag.enter(RowCoord::new(A, 5), &table);
        let row_move = drag.drop().expect("move");

        let moved = table
            .move_rows(&row_move.rows, row_move.target)
            .expect("move within section");
        assert_eq!(moved, vec![4]);
        let texts: Vec<_> = table.section_rows(Section::Reasons).iter().map(|r| r.text()).collect();
        assert_eq!(texts, vec!["reason 1", "reason 2", "reason 0"]);
    }
}
