// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use planboard_app::{
    CellCoord, EditorEvent, EditorSession, Item, ItemId, PlanDocument, Row, RowKind,
    SectionGroup, SectionPair, SessionSettings, TEXT_COL, schedule_names,
};
use planboard_db::{Store, StoreEvent};
use std::sync::mpsc::Receiver;
use tracing::info;

pub const DEFAULT_ITEM_COLOR: &str = "#7986cb";

/// Batch front end over one scope of the store: loads the document into an
/// editing session and saves it back after every change.
pub struct PlanRuntime<'a> {
    store: &'a Store,
    scope_key: String,
    session: EditorSession,
    saved: Receiver<StoreEvent>,
}

impl<'a> PlanRuntime<'a> {
    pub fn load(store: &'a Store, scope_key: &str, settings: SessionSettings) -> Self {
        let document = store.load(scope_key);
        Self {
            store,
            scope_key: scope_key.to_owned(),
            session: EditorSession::with_settings(document, settings),
            saved: store.subscribe(),
        }
    }

    pub fn document(&self) -> &PlanDocument {
        self.session.document()
    }

    pub fn list(&self) -> Vec<String> {
        let document = self.document();
        let active = document.shortlist.iter().map(|item| (item, ""));
        let archived = document.archived.iter().map(|item| (item, " (archived)"));
        active
            .chain(archived)
            .map(|(item, suffix)| {
                format!(
                    "{:>4}  {}  {} rows{}",
                    item.id.get(),
                    display_text(&item.text),
                    item.table.len(),
                    suffix
                )
            })
            .collect()
    }

    /// Every table row with its absolute index, headings marked, and the
    /// total under each timed section.
    pub fn show(&self, id: ItemId) -> Result<String> {
        let item = self.item(id)?;
        let table = &item.table;
        let bounds = table.bounds();
        let totals = table.section_totals();

        let mut lines = vec![format!("#{} {}", item.id, display_text(&item.text))];
        for (index, row) in table.rows().iter().enumerate() {
            let line = match row.kind {
                RowKind::Header if index == 0 => format!("[title] {}", format_cells(row)),
                RowKind::Header => {
                    let heading = SectionGroup::ALL
                        .into_iter()
                        .find(|group| bounds.header_row(*group) == index)
                        .map_or("", SectionGroup::label);
                    format!("== {heading} == {}", format_cells(row))
                }
                _ => format_cells(row),
            };
            lines.push(format!("{index:>4}  {}", line.trim_end()));

            if let Some((section, total)) = totals
                .iter()
                .find(|(section, _)| bounds.range(*section).end == index + 1)
            {
                lines.push(format!("      total {}: {total}", section.label()));
            }
        }
        Ok(lines.join("\n"))
    }

    /// Questions with their outcomes and needs with their plans, grouped by
    /// pair token.
    pub fn outline(&self, id: ItemId) -> Result<String> {
        let item = self.item(id)?;
        let table = &item.table;
        let mut lines = vec![format!("#{} {}", item.id, display_text(&item.text))];

        for pair in SectionPair::ALL {
            let prompts = table.section_rows(pair.primary);
            let responses = table.section_rows(pair.secondary);
            let grouped = table.paired_groups(pair);

            lines.push(format!("{}:", pair.primary.label()));
            for group in &grouped.groups {
                lines.push(format!("  - {}", display_text(prompts[group.primary].text())));
                for index in &group.secondary {
                    lines.push(format!("      > {}", display_text(responses[*index].text())));
                }
            }
            for index in &grouped.leftover_secondary {
                lines.push(format!("  ? {}", display_text(responses[*index].text())));
            }
        }
        Ok(lines.join("\n"))
    }

    pub fn add(&mut self, title: &str) -> Result<ItemId> {
        let title = title.trim();
        if title.is_empty() {
            bail!("item title must not be empty");
        }
        let (id, events) = self.session.add_item(title, DEFAULT_ITEM_COLOR);
        self.commit(&events)?;
        Ok(id)
    }

    /// Pastes tab-separated `text` with its top-left cell at `row`/`col`.
    /// Returns whether any cell changed.
    pub fn paste(&mut self, id: ItemId, row: usize, col: usize, text: &str) -> Result<bool> {
        let table = &self.item(id)?.table;
        if table.cell(row, col).is_none() {
            bail!(
                "cell {row}/{col} is outside item {id}; it has {} rows, run `planboard --show {id}` to see them",
                table.len()
            );
        }

        self.session.click(CellCoord::new(id, row, col));
        let events = self.session.paste(text);
        self.commit(&events)?;
        Ok(!events.is_empty())
    }

    fn item(&self, id: ItemId) -> Result<&Item> {
        self.document().item(id).ok_or_else(|| {
            anyhow!("no item with id {id} in scope {:?}; run `planboard --list`", self.scope_key)
        })
    }

    fn commit(&self, events: &[EditorEvent]) -> Result<()> {
        if !events
            .iter()
            .any(|event| matches!(event, EditorEvent::Changed(_)))
        {
            return Ok(());
        }

        self.store.try_save(self.document(), &self.scope_key)?;
        while let Ok(StoreEvent::Saved {
            scope_key,
            shortlist,
        }) = self.saved.try_recv()
        {
            info!(
                scope_key = %scope_key,
                schedule = ?schedule_names(&shortlist),
                "plan saved"
            );
        }
        Ok(())
    }
}

fn format_cells(row: &Row) -> String {
    let last = row
        .cells
        .iter()
        .rposition(|cell| !cell.trim().is_empty())
        .map_or(0, |index| index + 1);
    row.cells[..last.max(TEXT_COL + 1)].join(" | ")
}

fn display_text(text: &str) -> &str {
    if text.trim().is_empty() {
        "(untitled)"
    } else {
        text
    }
}
