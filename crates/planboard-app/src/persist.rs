// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! The stored document shape.
//!
//! Rows are saved as bare cell text. Row kinds and pair ids are not part
//! of this shape: kinds come back from the section layout on load, and
//! pairing is re-derived positionally, so a pairing that differed from
//! the positional default does not survive a save.

use serde::{Deserialize, Serialize};

use crate::ids::ItemId;
use crate::model::{Item, PlanDocument, Section, SectionCounts};
use crate::table::{Table, layout_rows};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDocument {
    #[serde(default)]
    pub shortlist: Vec<PersistedItem>,
    #[serde(default)]
    pub archived: Vec<PersistedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedItem {
    pub id: ItemId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub plan_table_entries: Vec<Vec<String>>,
    #[serde(flatten)]
    pub counts: SectionCounts,
}

impl From<&Item> for PersistedItem {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            text: item.text.clone(),
            color: item.color.clone(),
            // Cell text only; `kind` and `pair_id` are dropped here.
            plan_table_entries: item.table.entries(),
            counts: item.table.counts(),
        }
    }
}

/// A stored item whose section counts cannot describe its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    CountOverflow { id: ItemId },
    TooManyRows { id: ItemId, rows: usize, entries: usize },
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CountOverflow { id } => write!(f, "item {id}: section counts overflow"),
            Self::TooManyRows { id, rows, entries } => write!(
                f,
                "item {id}: section counts lay out {rows} rows for {entries} stored entries"
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Checks stored counts against the stored entries. Counts may pad a short
/// entry list by at most one seeded table's worth of rows.
fn check_layout(stored: &PersistedItem) -> Result<SectionCounts, LayoutError> {
    let counts = stored.counts.clamped();
    let rows = layout_rows(&counts).ok_or(LayoutError::CountOverflow { id: stored.id })?;
    let entries = stored.plan_table_entries.len();
    let seeded = layout_rows(&SectionCounts::default()).unwrap_or_default();
    if rows > entries.saturating_add(seeded) {
        return Err(LayoutError::TooManyRows {
            id: stored.id,
            rows,
            entries,
        });
    }
    Ok(counts)
}

impl TryFrom<PersistedItem> for Item {
    type Error = LayoutError;

    fn try_from(stored: PersistedItem) -> Result<Self, Self::Error> {
        let table = if stored.plan_table_entries.is_empty() {
            Table::new_seeded(&stored.text)
        } else {
            Table::from_entries(&stored.plan_table_entries, check_layout(&stored)?)
        };
        Ok(Self {
            id: stored.id,
            text: stored.text,
            color: stored.color,
            table,
        })
    }
}

impl From<&PlanDocument> for PersistedDocument {
    fn from(doc: &PlanDocument) -> Self {
        Self {
            shortlist: doc.shortlist.iter().map(PersistedItem::from).collect(),
            archived: doc.archived.iter().map(PersistedItem::from).collect(),
        }
    }
}

impl TryFrom<PersistedDocument> for PlanDocument {
    type Error = LayoutError;

    fn try_from(stored: PersistedDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            shortlist: convert_items(stored.shortlist)?,
            archived: convert_items(stored.archived)?,
        })
    }
}

fn convert_items(stored: Vec<PersistedItem>) -> Result<Vec<Item>, LayoutError> {
    stored.into_iter().map(Item::try_from).collect()
}

/// Project and subproject names a scheduling view offers, in shortlist
/// order. Subprojects read `"<project> / <subproject>"`; blank names are
/// skipped.
pub fn schedule_names(shortlist: &[Item]) -> Vec<String> {
    let mut names = Vec::new();
    for item in shortlist {
        let project = item.text.trim();
        if project.is_empty() {
            continue;
        }
        names.push(project.to_owned());
        for row in item.table.section_rows(Section::Subprojects) {
            let subproject = row.text().trim();
            if !subproject.is_empty() {
                names.push(format!("{project} / {subproject}"));
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::{LayoutError, PersistedDocument, PersistedItem, schedule_names};
    use crate::ids::{ItemId, PairId};
    use crate::model::{Item, PlanDocument, Section, SectionCounts, SectionPair};

    fn document() -> PlanDocument {
        let mut garden = Item::new(ItemId::new(1), "Garden", "#88aa44");
        let sub = garden.table.bounds().range(Section::Subprojects).start;
        garden.table.set_cell(sub, 0, "Raised beds");
        PlanDocument {
            shortlist: vec![garden, Item::new(ItemId::new(2), "  ", "#000000")],
            archived: vec![Item::new(ItemId::new(3), "Old", "#ffffff")],
        }
    }

    #[test]
    fn persisted_shape_uses_camel_case_fields() {
        let stored = PersistedDocument::from(&document());
        let json = serde_json::to_value(&stored).expect("serialize");
        let item = &json["shortlist"][0];
        assert_eq!(item["id"], 1);
        assert_eq!(item["text"], "Garden");
        assert_eq!(item["reasonRowCount"], 1);
        assert_eq!(item["subprojectRowCount"], 1);
        assert_eq!(item["planTableEntries"].as_array().map(Vec::len), Some(13));
        assert!(item.get("kind").is_none());
        assert_eq!(json["archived"][0]["text"], "Old");
    }

    #[test]
    fn positional_pairing_survives_reload() {
        let doc = document();
        let reloaded =
            PlanDocument::try_from(PersistedDocument::from(&doc)).expect("valid layout");

        assert_eq!(reloaded.shortlist.len(), 2);
        let table = &reloaded.shortlist[0].table;
        assert_eq!(table.entries(), doc.shortlist[0].table.entries());
        let groups = table.paired_groups(SectionPair::QUESTIONS);
        assert_eq!(groups.groups.len(), 1);
        assert!(groups.leftover_secondary.is_empty());
    }

    #[test]
    fn custom_pairing_is_not_recoverable_after_reload() {
        let mut doc = document();
        let table = &mut doc.shortlist[0].table;
        table.add_paired_rows(SectionPair::QUESTIONS, PairId::new("custom"));
        let question = table.bounds().range(Section::Questions).start + 1;
        assert_eq!(table.rows()[question].pair_id, Some(PairId::new("custom")));

        let reloaded =
            PlanDocument::try_from(PersistedDocument::from(&doc)).expect("valid layout");
        let row = &reloaded.shortlist[0].table.rows()[question];
        assert!(row.pair_id.is_some());
        assert_ne!(row.pair_id, Some(PairId::new("custom")));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let stored: PersistedDocument =
            serde_json::from_str(r#"{"shortlist":[{"id":4,"text":"Bare"}]}"#).expect("parse");
        assert!(stored.archived.is_empty());
        assert_eq!(stored.shortlist[0].counts, SectionCounts::default());

        let doc = PlanDocument::try_from(stored).expect("valid layout");
        assert_eq!(doc.shortlist[0].table.title(), "Bare");
        assert_eq!(doc.shortlist[0].table.len(), 13);
    }

    #[test]
    fn stored_counts_below_one_are_clamped() {
        let stored = PersistedItem {
            id: ItemId::new(5),
            text: "Clamp".to_owned(),
            color: String::new(),
            plan_table_entries: vec![vec!["Clamp".to_owned()]],
            counts: SectionCounts {
                reason_row_count: 0,
                ..SectionCounts::default()
            },
        };
        let item = Item::try_from(stored).expect("valid layout");
        assert_eq!(item.table.counts().reason_row_count, 1);
    }

    fn item_with_counts(counts: SectionCounts) -> PersistedItem {
        PersistedItem {
            id: ItemId::new(6),
            text: "Layout".to_owned(),
            color: String::new(),
            plan_table_entries: vec![vec!["Layout".to_owned()]; 13],
            counts,
        }
    }

    #[test]
    fn overflowing_counts_are_rejected() {
        let stored = item_with_counts(SectionCounts {
            reason_row_count: usize::MAX,
            ..SectionCounts::default()
        });
        assert_eq!(
            Item::try_from(stored),
            Err(LayoutError::CountOverflow { id: ItemId::new(6) })
        );
    }

    #[test]
    fn counts_far_past_the_entries_are_rejected() {
        let stored = item_with_counts(SectionCounts {
            schedule_row_count: 1_000_000_000,
            ..SectionCounts::default()
        });
        let error = Item::try_from(stored).expect_err("layout too large");
        assert!(matches!(error, LayoutError::TooManyRows { entries: 13, .. }));
        assert!(error.to_string().contains("13 stored entries"));

        let padded = item_with_counts(SectionCounts {
            schedule_row_count: 14,
            ..SectionCounts::default()
        });
        let item = Item::try_from(padded).expect("short entry lists are padded");
        assert_eq!(item.table.len(), 26);
    }

    #[test]
    fn huge_counts_without_entries_reseed() {
        let mut stored = item_with_counts(SectionCounts {
            reason_row_count: usize::MAX,
            ..SectionCounts::default()
        });
        stored.plan_table_entries.clear();
        let item = Item::try_from(stored).expect("counts unused without entries");
        assert_eq!(item.table.counts(), SectionCounts::default());
    }

    #[test]
    fn schedule_names_list_projects_then_subprojects() {
        let doc = document();
        assert_eq!(
            schedule_names(&doc.shortlist),
            vec!["Garden".to_owned(), "Garden / Raised beds".to_owned()]
        );
    }
}
