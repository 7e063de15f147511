// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::debug;

use crate::clipboard;
use crate::dragdrop::{DragPreview, DragState};
use crate::focus::{DEFAULT_FOCUS_ATTEMPTS, FocusRequest, FocusTracker};
use crate::history::{
    Command, DEFAULT_HISTORY_LIMIT, EditOutcome, History, TableCommand, TableEdit,
};
use crate::ids::{ItemId, PairId};
use crate::model::{Item, PlanDocument, ROW_WIDTH, SectionPair, TEXT_COL};
use crate::selection::{CellCoord, Modifiers, RowCoord, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub history_limit: usize,
    pub focus_retry_attempts: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            focus_retry_attempts: DEFAULT_FOCUS_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    Changed(ItemId),
    Focus(FocusRequest),
    SelectionCleared,
}

/// One editing session over a document: selection, undo history, the
/// drag in progress, and pending focus. Every gesture goes through here;
/// invalid coordinates and missing items are silently ignored.
#[derive(Debug)]
pub struct EditorSession {
    document: PlanDocument,
    selection: Selection,
    history: History,
    drag: Option<DragState>,
    focus: FocusTracker,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(PlanDocument::default())
    }
}

impl EditorSession {
    pub fn new(document: PlanDocument) -> Self {
        Self::with_settings(document, SessionSettings::default())
    }

    pub fn with_settings(document: PlanDocument, settings: SessionSettings) -> Self {
        Self {
            document,
            selection: Selection::new(),
            history: History::new(settings.history_limit),
            drag: None,
            focus: FocusTracker::new(settings.focus_retry_attempts),
        }
    }

    pub fn document(&self) -> &PlanDocument {
        &self.document
    }

    pub fn into_document(self) -> PlanDocument {
        self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn focus_tracker(&mut self) -> &mut FocusTracker {
        &mut self.focus
    }

    // Items

    pub fn add_item(&mut self, text: &str, color: &str) -> (ItemId, Vec<EditorEvent>) {
        let id = self.document.next_item_id();
        self.document.shortlist.push(Item::new(id, text, color));
        debug!(item = %id, "item added");
        (id, vec![EditorEvent::Changed(id)])
    }

    pub fn remove_item(&mut self, id: ItemId) -> Vec<EditorEvent> {
        let before = self.document.shortlist.len() + self.document.archived.len();
        self.document.shortlist.retain(|item| item.id != id);
        self.document.archived.retain(|item| item.id != id);
        if self.document.shortlist.len() + self.document.archived.len() == before {
            return Vec::new();
        }

        self.history.forget_item(id);
        if self.drag.as_ref().is_some_and(|drag| drag.item() == id) {
            self.drag = None;
        }
        let mut events = vec![EditorEvent::Changed(id)];
        if self.selection.cells().any(|cell| cell.item == id)
            || self.selection.rows().any(|row| row.item == id)
        {
            events.extend(self.clear_selection());
        }
        debug!(item = %id, "item removed");
        events
    }

    pub fn archive_item(&mut self, id: ItemId) -> Vec<EditorEvent> {
        move_item(&mut self.document.shortlist, &mut self.document.archived, id)
            .then(|| vec![EditorEvent::Changed(id)])
            .unwrap_or_default()
    }

    pub fn restore_item(&mut self, id: ItemId) -> Vec<EditorEvent> {
        move_item(&mut self.document.archived, &mut self.document.shortlist, id)
            .then(|| vec![EditorEvent::Changed(id)])
            .unwrap_or_default()
    }

    // Editing

    pub fn edit_cell(&mut self, cell: CellCoord, value: &str) -> Vec<EditorEvent> {
        self.apply(
            cell.item,
            TableEdit::SetCell {
                row: cell.row,
                col: cell.col,
                value: value.to_owned(),
            },
        )
    }

    pub fn set_title(&mut self, item: ItemId, title: &str) -> Vec<EditorEvent> {
        self.apply(
            item,
            TableEdit::SetTitle {
                title: title.to_owned(),
            },
        )
    }

    pub fn insert_row_after(&mut self, row: RowCoord) -> Vec<EditorEvent> {
        let Some(table) = self.document.table(row.item) else {
            return Vec::new();
        };
        let Some(section) = table.section_of(row.row) else {
            return Vec::new();
        };
        let offset = row.row - table.bounds().range(section).start + 1;
        self.apply(row.item, TableEdit::InsertRow { section, offset })
    }

    pub fn remove_row(&mut self, row: RowCoord) -> Vec<EditorEvent> {
        let Some(section) = self
            .document
            .table(row.item)
            .and_then(|table| table.section_of(row.row))
        else {
            return Vec::new();
        };
        self.apply(
            row.item,
            TableEdit::RemoveRow {
                section,
                row: row.row,
            },
        )
    }

    /// Appends a question and an outcome linked by a fresh pair id.
    pub fn add_question_with_outcome(&mut self, item: ItemId) -> Vec<EditorEvent> {
        self.add_paired_rows(item, SectionPair::QUESTIONS)
    }

    pub fn add_needs_question_with_plan(&mut self, item: ItemId) -> Vec<EditorEvent> {
        self.add_paired_rows(item, SectionPair::NEEDS)
    }

    fn add_paired_rows(&mut self, item: ItemId, pair: SectionPair) -> Vec<EditorEvent> {
        self.apply(
            item,
            TableEdit::AddPairedRows {
                pair,
                pair_id: PairId::generate(),
            },
        )
    }

    /// Adds another response below the existing responses of `prompt`.
    pub fn add_response_for_prompt(&mut self, prompt: RowCoord) -> Vec<EditorEvent> {
        self.apply(
            prompt.item,
            TableEdit::AddResponseRow {
                prompt_row: prompt.row,
                fallback: PairId::generate(),
            },
        )
    }

    // Selection

    pub fn click(&mut self, cell: CellCoord) {
        if self.has_cell(cell) {
            self.selection.click(cell);
        }
    }

    pub fn shift_click(&mut self, cell: CellCoord) {
        if self.has_cell(cell) {
            self.selection.shift_click(cell);
        }
    }

    pub fn ctrl_click(&mut self, cell: CellCoord) {
        if self.has_cell(cell) {
            self.selection.toggle_click(cell);
        }
    }

    pub fn mouse_down(&mut self, cell: CellCoord, modifiers: Modifiers) {
        if self.has_cell(cell) {
            self.selection.mouse_down(cell, modifiers);
        }
    }

    pub fn mouse_enter(&mut self, cell: CellCoord) -> bool {
        self.has_cell(cell) && self.selection.mouse_enter(cell)
    }

    pub fn mouse_up(&mut self) {
        self.selection.mouse_up();
    }

    pub fn select_row(&mut self, row: RowCoord, additive: bool) {
        if self.has_row(row) {
            self.selection.select_row(row, additive);
        }
    }

    pub fn extend_row_selection(&mut self, row: RowCoord) {
        if self.has_row(row) {
            self.selection.extend_row_selection(row);
        }
    }

    pub fn clear_selection(&mut self) -> Vec<EditorEvent> {
        if self.selection.is_empty() {
            return Vec::new();
        }
        self.selection.clear();
        vec![EditorEvent::SelectionCleared]
    }

    // Drag and drop

    pub fn begin_drag(&mut self, pointer: RowCoord) -> bool {
        let Some(table) = self.document.table(pointer.item) else {
            return false;
        };
        self.drag = DragState::begin(pointer, &self.selection, table);
        self.drag.is_some()
    }

    pub fn drag_enter(&mut self, pointer: RowCoord) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        let Some(table) = self.document.table(drag.item()) else {
            return false;
        };
        drag.enter(pointer, table)
    }

    pub fn drag_preview(&self) -> Option<DragPreview> {
        self.drag.as_ref().and_then(DragState::preview)
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    pub fn drop_drag(&mut self) -> Vec<EditorEvent> {
        let Some(row_move) = self.drag.take().and_then(DragState::drop) else {
            return Vec::new();
        };
        self.apply(
            row_move.item,
            TableEdit::MoveRows {
                rows: row_move.rows,
                target: row_move.target,
            },
        )
    }

    // Clipboard

    pub fn copy(&self) -> Option<String> {
        clipboard::copy_text(&self.selection, &self.document)
    }

    pub fn paste(&mut self, text: &str) -> Vec<EditorEvent> {
        match clipboard::paste_edit(&self.selection, text) {
            Some((item, edit)) => self.apply(item, edit),
            None => Vec::new(),
        }
    }

    // History

    pub fn undo(&mut self) -> Vec<EditorEvent> {
        let Some(item) = self.history.undo(&mut self.document) else {
            return Vec::new();
        };
        self.after_replay(item)
    }

    pub fn redo(&mut self) -> Vec<EditorEvent> {
        let Some(item) = self.history.redo(&mut self.document) else {
            return Vec::new();
        };
        self.after_replay(item)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn after_replay(&mut self, item: ItemId) -> Vec<EditorEvent> {
        self.drag = None;
        let mut events = vec![EditorEvent::Changed(item)];
        if self.selection.cells().any(|cell| !self.has_cell(cell)) {
            events.extend(self.clear_selection());
        }
        events
    }

    /// Runs `edit` as a command. Edits that change nothing are not recorded.
    fn apply(&mut self, item: ItemId, edit: TableEdit) -> Vec<EditorEvent> {
        let mut command = TableCommand::new(item, edit);
        command.execute(&mut self.document);
        let Some(outcome) = command.outcome().cloned() else {
            debug!(command = command.label(), item = %item, "edit rejected");
            return Vec::new();
        };
        self.history.push_executed(Box::new(command));
        self.drag = None;

        let mut events = vec![EditorEvent::Changed(item)];
        match outcome {
            EditOutcome::Updated => {}
            EditOutcome::Inserted { row } | EditOutcome::Paired { primary: row, .. } => {
                events.extend(self.clear_selection());
                let request = self.focus.request(CellCoord::new(item, row, TEXT_COL));
                events.push(EditorEvent::Focus(request));
            }
            EditOutcome::Removed(_) => events.extend(self.clear_selection()),
            EditOutcome::Moved(rows) => {
                self.selection
                    .select_rows(rows.into_iter().map(|row| RowCoord::new(item, row)));
            }
        }
        events
    }

    fn has_row(&self, row: RowCoord) -> bool {
        self.document
            .table(row.item)
            .is_some_and(|table| row.row < table.len())
    }

    fn has_cell(&self, cell: CellCoord) -> bool {
        cell.col < ROW_WIDTH && self.has_row(cell.row_coord())
    }
}

fn move_item(from: &mut Vec<Item>, to: &mut Vec<Item>, id: ItemId) -> bool {
    let Some(position) = from.iter().position(|item| item.id == id) else {
        return false;
    };
    to.push(from.remove(position));
    true
}
