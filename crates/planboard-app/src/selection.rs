// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::ids::ItemId;
use crate::model::ROW_WIDTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellCoord {
    pub item: ItemId,
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub const fn new(item: ItemId, row: usize, col: usize) -> Self {
        Self { item, row, col }
    }

    pub const fn row_coord(self) -> RowCoord {
        RowCoord {
            item: self.item,
            row: self.row,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowCoord {
    pub item: ItemId,
    pub row: usize,
}

impl RowCoord {
    pub const fn new(item: ItemId, row: usize) -> Self {
        Self { item, row }
    }

    pub const fn cell(self, col: usize) -> CellCoord {
        CellCoord {
            item: self.item,
            row: self.row,
            col,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl on most platforms, Cmd on macOS.
    pub toggle: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        toggle: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        toggle: false,
    };
    pub const TOGGLE: Self = Self {
        shift: false,
        toggle: true,
    };
}

/// Selected cells and rows, independent of table content.
///
/// Cell-level actions clear the row set. Row-level actions rebuild the
/// cell set from the selected rows' full width.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    cells: BTreeSet<CellCoord>,
    rows: BTreeSet<RowCoord>,
    anchor: Option<CellCoord>,
    focus: Option<CellCoord>,
    dragging: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn click(&mut self, cell: CellCoord) {
        self.rows.clear();
        self.cells.clear();
        self.cells.insert(cell);
        self.anchor = Some(cell);
        self.focus = Some(cell);
    }

    /// Extends from the anchor to `cell` as a rectangle. Across items this
    /// degrades to a plain click.
    pub fn shift_click(&mut self, cell: CellCoord) {
        match self.anchor {
            Some(anchor) if anchor.item == cell.item => {
                self.rows.clear();
                self.focus = Some(cell);
                self.cells = rectangle(anchor, cell);
            }
            _ => self.click(cell),
        }
    }

    pub fn toggle_click(&mut self, cell: CellCoord) {
        self.rows.clear();
        if !self.cells.remove(&cell) {
            self.cells.insert(cell);
        }
        self.anchor = Some(cell);
        self.focus = Some(cell);
    }

    pub fn mouse_down(&mut self, cell: CellCoord, modifiers: Modifiers) {
        if modifiers.toggle {
            self.toggle_click(cell);
        } else if modifiers.shift {
            self.shift_click(cell);
        } else {
            self.click(cell);
        }
        self.dragging = true;
    }

    /// While the button is held, re-extends the rectangle to the live
    /// pointer. Cells of another item are ignored.
    pub fn mouse_enter(&mut self, cell: CellCoord) -> bool {
        if !self.dragging {
            return false;
        }
        match self.anchor {
            Some(anchor) if anchor.item == cell.item => {
                if self.focus == Some(cell) {
                    return false;
                }
                self.rows.clear();
                self.focus = Some(cell);
                self.cells = rectangle(anchor, cell);
                true
            }
            _ => false,
        }
    }

    pub fn mouse_up(&mut self) {
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Selects a whole row. With `additive` the row is toggled into the
    /// existing row selection instead of replacing it.
    pub fn select_row(&mut self, row: RowCoord, additive: bool) {
        if additive {
            if !self.rows.remove(&row) {
                self.rows.insert(row);
            }
        } else {
            self.rows.clear();
            self.rows.insert(row);
        }
        self.anchor = Some(row.cell(0));
        self.focus = Some(row.cell(ROW_WIDTH - 1));
        self.sync_cells_from_rows();
    }

    /// Selects every row between the anchor row and `row`, inclusive.
    pub fn extend_row_selection(&mut self, row: RowCoord) {
        let Some(anchor) = self.anchor.filter(|anchor| anchor.item == row.item) else {
            self.select_row(row, false);
            return;
        };
        let (low, high) = ordered(anchor.row, row.row);
        self.rows = (low..=high)
            .map(|index| RowCoord::new(row.item, index))
            .collect();
        self.focus = Some(row.cell(ROW_WIDTH - 1));
        self.sync_cells_from_rows();
    }

    /// Replaces the row selection wholesale, e.g. after rows were moved.
    pub fn select_rows(&mut self, rows: impl IntoIterator<Item = RowCoord>) {
        self.rows = rows.into_iter().collect();
        let first = self.rows.first().copied();
        let last = self.rows.last().copied();
        self.anchor = first.map(|row| row.cell(0));
        self.focus = last.map(|row| row.cell(ROW_WIDTH - 1));
        self.sync_cells_from_rows();
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.rows.clear();
        self.anchor = None;
        self.focus = None;
        self.dragging = false;
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.rows.is_empty()
    }

    pub fn is_cell_selected(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    pub fn is_row_selected(&self, row: RowCoord) -> bool {
        self.rows.contains(&row)
    }

    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = RowCoord> + '_ {
        self.rows.iter().copied()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn anchor(&self) -> Option<CellCoord> {
        self.anchor
    }

    pub fn focus(&self) -> Option<CellCoord> {
        self.focus
    }

    /// Top-left-most selected cell; paste anchors here.
    pub fn first_cell(&self) -> Option<CellCoord> {
        self.cells.first().copied()
    }

    fn sync_cells_from_rows(&mut self) {
        self.cells = self
            .rows
            .iter()
            .flat_map(|row| (0..ROW_WIDTH).map(move |col| row.cell(col)))
            .collect();
    }
}

fn rectangle(anchor: CellCoord, focus: CellCoord) -> BTreeSet<CellCoord> {
    let (top, bottom) = ordered(anchor.row, focus.row);
    let (left, right) = ordered(anchor.col, focus.col);
    (top..=bottom)
        .flat_map(|row| (left..=right).map(move |col| CellCoord::new(anchor.item, row, col)))
        .collect()
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}
