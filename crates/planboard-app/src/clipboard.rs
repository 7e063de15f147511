// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Tab-separated clipboard text. Cells are joined with `\t` and rows with
//! `\n`; embedded tabs and newlines are not escaped.

use std::collections::BTreeMap;

use crate::history::TableEdit;
use crate::ids::ItemId;
use crate::model::PlanDocument;
use crate::selection::Selection;

/// Copy text for the selected cells. Rows are ordered by index and cells by
/// column; a selection spanning several items emits each item's block one
/// after another, in item order, with no alignment between them.
pub fn copy_text(selection: &Selection, doc: &PlanDocument) -> Option<String> {
    let mut rows: BTreeMap<(ItemId, usize), Vec<usize>> = BTreeMap::new();
    for cell in selection.cells() {
        rows.entry((cell.item, cell.row)).or_default().push(cell.col);
    }
    if rows.is_empty() {
        return None;
    }

    let lines: Vec<String> = rows
        .into_iter()
        .map(|((item, row), cols)| {
            let table = doc.table(item);
            cols.into_iter()
                .map(|col| table.and_then(|table| table.cell(row, col)).unwrap_or(""))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect();
    Some(lines.join("\n"))
}

/// Splits clipboard text into rows of cells. CRLF line endings and one
/// trailing newline are tolerated. Blank input yields `None`.
pub fn parse_clipboard(text: &str) -> Option<Vec<Vec<String>>> {
    let normalized = text.replace("\r\n", "\n");
    let trimmed = normalized.strip_suffix('\n').unwrap_or(&normalized);
    if trimmed.is_empty() {
        return None;
    }
    Some(
        trimmed
            .split('\n')
            .map(|line| line.split('\t').map(str::to_owned).collect())
            .collect(),
    )
}

/// Builds the paste edit anchored at the selection's first cell. Only the
/// anchor's item is written.
pub fn paste_edit(selection: &Selection, text: &str) -> Option<(ItemId, TableEdit)> {
    let anchor = selection.first_cell()?;
    let block = parse_clipboard(text)?;
    Some((
        anchor.item,
        TableEdit::Paste {
            row: anchor.row,
            col: anchor.col,
            block,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::{copy_text, parse_clipboard, paste_edit};
    use crate::history::{Command, TableCommand, TableEdit};
    use crate::ids::ItemId;
    use crate::model::{Item, PlanDocument, Section};
    use crate::selection::{CellCoord, Selection};

    const A: ItemId = ItemId::new(1);
    const B: ItemId = ItemId::new(2);

    fn document() -> PlanDocument {
        let mut doc = PlanDocument {
            shortlist: vec![Item::new(A, "Alpha", "#111111"), Item::new(B, "Beta", "#222222")],
            archived: Vec::new(),
        };
        if let Some(table) = doc.table_mut(A) {
            table.set_cell(2, 0, "r2c0");
            table.set_cell(2, 1, "r2c1");
            table.set_cell(4, 0, "r4c0");
            table.set_cell(4, 1, "r4c1");
        }
        if let Some(table) = doc.table_mut(B) {
            table.set_cell(2, 3, "beta");
        }
        doc
    }

    #[test]
    fn copy_two_by_two_block() {
        let doc = document();
        let mut selection = Selection::new();
        selection.click(CellCoord::new(A, 4, 1));
        selection.toggle_click(CellCoord::new(A, 2, 0));
        selection.toggle_click(CellCoord::new(A, 2, 1));
        selection.toggle_click(CellCoord::new(A, 4, 0));

        let text = copy_text(&selection, &doc).expect("selection is not empty");
        assert_eq!(text, "r2c0\tr2c1\nr4c0\tr4c1");
        assert_eq!(text.matches('\n').count(), 1);
        assert!(text.lines().all(|line| line.matches('\t').count() == 1));
    }

    #[test]
    fn copy_across_items_concatenates_blocks() {
        let doc = document();
        let mut selection = Selection::new();
        selection.click(CellCoord::new(B, 2, 3));
        selection.toggle_click(CellCoord::new(A, 2, 0));
        assert_eq!(
            copy_text(&selection, &doc).as_deref(),
            Some("r2c0\nbeta")
        );
    }

    #[test]
    fn copy_of_empty_selection_is_none() {
        assert_eq!(copy_text(&Selection::new(), &document()), None);
    }

    #[test]
    fn parse_handles_crlf_and_trailing_newline() {
        let block = parse_clipboard("a\tb\r\nc\td\r\n").expect("two rows");
        assert_eq!(block, vec![vec!["a", "b"], vec!["c", "d"]]);
        assert_eq!(parse_clipboard(""), None);
        assert_eq!(parse_clipboard("\n"), None);
        assert_eq!(parse_clipboard("\t"), Some(vec![vec![String::new(), String::new()]]));
    }

    #[test]
    fn paste_overwrites_block_at_anchor() {
        let mut doc = document();
        let mut selection = Selection::new();
        selection.click(CellCoord::new(A, 5, 0));
        let (item, edit) = paste_edit(&selection, "x\ty\nz\tw").expect("paste edit");
        assert_eq!(item, A);

        let mut command = TableCommand::new(item, edit);
        command.execute(&mut doc);
        let table = doc.table(A).expect("item A");
        assert_eq!(table.cell(5, 0), Some("x"));
        assert_eq!(table.cell(5, 1), Some("y"));
        assert_eq!(table.cell(6, 0), Some("z"));
        assert_eq!(table.cell(6, 1), Some("w"));
        assert_eq!(table.cell(7, 0), Some(""));
    }

    #[test]
    fn paste_near_bottom_clips_silently() {
        let mut doc = document();
        let last = doc.table(A).expect("item A").len() - 1;
        let mut selection = Selection::new();
        selection.click(CellCoord::new(A, last, 0));
        let (item, edit) = paste_edit(&selection, "x\ny").expect("paste edit");

        let mut command = TableCommand::new(item, edit);
        command.execute(&mut doc);
        let table = doc.table(A).expect("item A");
        assert_eq!(table.len(), last + 1);
        assert_eq!(table.cell(last, 0), Some("x"));
    }

    #[test]
    fn paste_without_anchor_or_text_builds_nothing() {
        assert!(paste_edit(&Selection::new(), "x").is_none());
        let mut selection = Selection::new();
        selection.click(CellCoord::new(A, 2, 0));
        assert!(paste_edit(&selection, "").is_none());
    }

    #[test]
    fn paste_targets_timed_cells_through_normalizer() {
        let mut doc = document();
        let row = doc
            .table(A)
            .expect("item A")
            .bounds()
            .range(Section::Schedule)
            .start;
        let mut selection = Selection::new();
        selection.click(CellCoord::new(A, row, 0));
        let (item, edit) = paste_edit(&selection, "Water\t15 Minutes").expect("paste edit");
        assert!(matches!(edit, TableEdit::Paste { .. }));

        TableCommand::new(item, edit).execute(&mut doc);
        let table = doc.table(A).expect("item A");
        assert_eq!(table.cell(row, 2), Some("0.15"));
    }
}
