// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Undoable table edits and the undo/redo stacks that apply them.

use std::collections::VecDeque;
use std::fmt;

use tracing::debug;

use crate::ids::{ItemId, PairId};
use crate::model::{PlanDocument, Section, SectionPair};
use crate::table::{RemoveOutcome, Table};

pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// One undoable edit against a single item's table.
///
/// `execute` captures the table exactly once, on its first call; `undo`
/// always restores that capture. Redo calls `execute` again.
pub trait Command: fmt::Debug {
    fn label(&self) -> &'static str;
    fn item(&self) -> ItemId;
    fn execute(&mut self, doc: &mut PlanDocument);
    fn undo(&mut self, doc: &mut PlanDocument);
}

/// A deterministic table mutation. Anything random (pair ids) is decided
/// when the edit is built so replaying it reproduces the same table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEdit {
    SetCell {
        row: usize,
        col: usize,
        value: String,
    },
    InsertRow {
        section: Section,
        offset: usize,
    },
    RemoveRow {
        section: Section,
        row: usize,
    },
    AddPairedRows {
        pair: SectionPair,
        pair_id: PairId,
    },
    AddResponseRow {
        prompt_row: usize,
        fallback: PairId,
    },
    MoveRows {
        rows: Vec<usize>,
        target: usize,
    },
    Paste {
        row: usize,
        col: usize,
        block: Vec<Vec<String>>,
    },
    SetTitle {
        title: String,
    },
}

/// What an applied edit did, for focus and selection follow-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Updated,
    Inserted { row: usize },
    Paired { primary: usize, secondary: usize },
    Removed(RemoveOutcome),
    Moved(Vec<usize>),
}

impl TableEdit {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SetCell { .. } => "edit cell",
            Self::InsertRow { .. } => "insert row",
            Self::RemoveRow { .. } => "remove row",
            Self::AddPairedRows { .. } => "add paired rows",
            Self::AddResponseRow { .. } => "add response row",
            Self::MoveRows { .. } => "move rows",
            Self::Paste { .. } => "paste",
            Self::SetTitle { .. } => "set title",
        }
    }

    /// Applies the edit. `None` means the table was left as it was.
    pub fn apply(&self, table: &mut Table) -> Option<EditOutcome> {
        match self {
            Self::SetCell { row, col, value } => table
                .set_cell(*row, *col, value)
                .then_some(EditOutcome::Updated),
            Self::InsertRow { section, offset } => table
                .insert_row(*section, *offset)
                .map(|row| EditOutcome::Inserted { row }),
            Self::RemoveRow { section, row } => {
                table.remove_row(*section, *row).map(EditOutcome::Removed)
            }
            Self::AddPairedRows { pair, pair_id } => {
                let (primary, secondary) = table.add_paired_rows(*pair, pair_id.clone());
                Some(EditOutcome::Paired { primary, secondary })
            }
            Self::AddResponseRow {
                prompt_row,
                fallback,
            } => table
                .add_response_row(*prompt_row, fallback.clone())
                .map(|row| EditOutcome::Inserted { row }),
            Self::MoveRows { rows, target } => {
                table.move_rows(rows, *target).map(EditOutcome::Moved)
            }
            Self::Paste { row, col, block } => {
                (table.paste_block(*row, *col, block) > 0).then_some(EditOutcome::Updated)
            }
            Self::SetTitle { title } => table.set_title(title).then_some(EditOutcome::Updated),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableCommand {
    item: ItemId,
    edit: TableEdit,
    snapshot: Option<Table>,
    outcome: Option<EditOutcome>,
}

impl TableCommand {
    pub fn new(item: ItemId, edit: TableEdit) -> Self {
        Self {
            item,
            edit,
            snapshot: None,
            outcome: None,
        }
    }

    pub fn edit(&self) -> &TableEdit {
        &self.edit
    }

    /// Result of the most recent `execute`.
    pub fn outcome(&self) -> Option<&EditOutcome> {
        self.outcome.as_ref()
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }
}

impl Command for TableCommand {
    fn label(&self) -> &'static str {
        self.edit.label()
    }

    fn item(&self) -> ItemId {
        self.item
    }

    fn execute(&mut self, doc: &mut PlanDocument) {
        let Some(table) = doc.table_mut(self.item) else {
            self.outcome = None;
            return;
        };
        if self.snapshot.is_none() {
            self.snapshot = Some(table.clone());
        }
        self.outcome = self.edit.apply(table);
    }

    fn undo(&mut self, doc: &mut PlanDocument) {
        if let Some(snapshot) = &self.snapshot
            && let Some(table) = doc.table_mut(self.item)
        {
            *table = snapshot.clone();
        }
    }
}

/// Undo and redo stacks. The oldest undo entries fall off past `limit`.
#[derive(Debug)]
pub struct History {
    undo: VecDeque<Box<dyn Command>>,
    redo: Vec<Box<dyn Command>>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn execute(&mut self, mut command: Box<dyn Command>, doc: &mut PlanDocument) {
        command.execute(doc);
        self.push_executed(command);
    }

    /// Records a command the caller already executed once.
    pub fn push_executed(&mut self, command: Box<dyn Command>) {
        debug!(
            command = command.label(),
            item = %command.item(),
            "command executed"
        );
        self.undo.push_back(command);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Returns the undone command's item.
    pub fn undo(&mut self, doc: &mut PlanDocument) -> Option<ItemId> {
        let mut command = self.undo.pop_back()?;
        command.undo(doc);
        debug!(command = command.label(), item = %command.item(), "command undone");
        let item = command.item();
        self.redo.push(command);
        Some(item)
    }

    /// Returns the redone command's item.
    pub fn redo(&mut self, doc: &mut PlanDocument) -> Option<ItemId> {
        let mut command = self.redo.pop()?;
        command.execute(doc);
        debug!(command = command.label(), item = %command.item(), "command redone");
        let item = command.item();
        self.undo.push_back(command);
        Some(item)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Drops every entry touching `item`, e.g. after the item is deleted.
    pub fn forget_item(&mut self, item: ItemId) {
        self.undo.retain(|command| command.item() != item);
        self.redo.retain(|command| command.item() != item);
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
