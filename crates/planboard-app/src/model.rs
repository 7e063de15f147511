// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::{ItemId, PairId};
use crate::table::Table;

pub const ROW_WIDTH: usize = 6;

/// Column holding the row text in every section.
pub const TEXT_COL: usize = 0;
/// Estimate label column of timed sections.
pub const ESTIMATE_COL: usize = 1;
/// Canonical `H.MM` duration column of timed sections.
pub const DURATION_COL: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowKind {
    Header,
    Prompt,
    Response,
    Data,
}

impl RowKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Prompt => "prompt",
            Self::Response => "response",
            Self::Data => "data",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "header" => Some(Self::Header),
            "prompt" => Some(Self::Prompt),
            "response" => Some(Self::Response),
            "data" => Some(Self::Data),
            _ => None,
        }
    }
}

/// One fixed-width record of a plan table.
///
/// `kind` and `pair_id` are ordinary fields, so every clone carries them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    pub cells: [String; ROW_WIDTH],
    pub kind: RowKind,
    pub pair_id: Option<PairId>,
}

impl Row {
    pub fn blank(kind: RowKind) -> Self {
        Self {
            cells: std::array::from_fn(|_| String::new()),
            kind,
            pair_id: None,
        }
    }

    /// Builds a row from any number of values, padding missing cells with
    /// empty strings and dropping anything past the fixed width.
    pub fn from_cells<I, S>(values: I, kind: RowKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row = Self::blank(kind);
        for (slot, value) in row.cells.iter_mut().zip(values) {
            *slot = value.into();
        }
        row
    }

    pub fn with_pair(mut self, pair_id: Option<PairId>) -> Self {
        self.pair_id = pair_id;
        self
    }

    pub fn cell(&self, col: usize) -> Option<&str> {
        self.cells.get(col).map(String::as_str)
    }

    pub fn text(&self) -> &str {
        &self.cells[TEXT_COL]
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| cell.trim().is_empty())
    }

    pub fn clear_cells(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    pub fn to_entries(&self) -> Vec<String> {
        self.cells.to_vec()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Section {
    Reasons,
    Outcomes,
    Questions,
    NeedsQuestions,
    NeedsPlans,
    Schedule,
    Subprojects,
}

impl Section {
    /// Layout order, top to bottom.
    pub const ALL: [Self; 7] = [
        Self::Reasons,
        Self::Outcomes,
        Self::Questions,
        Self::NeedsQuestions,
        Self::NeedsPlans,
        Self::Schedule,
        Self::Subprojects,
    ];

    pub const TIMED: [Self; 2] = [Self::Schedule, Self::Subprojects];

    /// Position in [`Section::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reasons => "reasons",
            Self::Outcomes => "outcomes",
            Self::Questions => "questions",
            Self::NeedsQuestions => "needs_questions",
            Self::NeedsPlans => "needs_plans",
            Self::Schedule => "schedule",
            Self::Subprojects => "subprojects",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "reasons" => Some(Self::Reasons),
            "outcomes" => Some(Self::Outcomes),
            "questions" => Some(Self::Questions),
            "needs_questions" => Some(Self::NeedsQuestions),
            "needs_plans" => Some(Self::NeedsPlans),
            "schedule" => Some(Self::Schedule),
            "subprojects" => Some(Self::Subprojects),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Reasons => "Reasons",
            Self::Outcomes => "Outcomes",
            Self::Questions => "Questions",
            Self::NeedsQuestions => "Needs questions",
            Self::NeedsPlans => "Needs plans",
            Self::Schedule => "Schedule",
            Self::Subprojects => "Subprojects",
        }
    }

    pub const fn row_kind(self) -> RowKind {
        match self {
            Self::Questions | Self::NeedsQuestions => RowKind::Prompt,
            Self::Outcomes | Self::NeedsPlans => RowKind::Response,
            Self::Reasons | Self::Schedule | Self::Subprojects => RowKind::Data,
        }
    }

    pub const fn group(self) -> SectionGroup {
        match self {
            Self::Reasons => SectionGroup::Reasons,
            Self::Outcomes | Self::Questions => SectionGroup::OutcomesAndQuestions,
            Self::NeedsQuestions | Self::NeedsPlans => SectionGroup::Needs,
            Self::Schedule => SectionGroup::Schedule,
            Self::Subprojects => SectionGroup::Subprojects,
        }
    }

    pub const fn is_timed(self) -> bool {
        matches!(self, Self::Schedule | Self::Subprojects)
    }

    /// The prompt/response pairing this section takes part in, if any.
    pub const fn pairing(self) -> Option<SectionPair> {
        match self {
            Self::Questions | Self::Outcomes => Some(SectionPair::QUESTIONS),
            Self::NeedsQuestions | Self::NeedsPlans => Some(SectionPair::NEEDS),
            _ => None,
        }
    }
}

/// A primary (prompt) section linked to a secondary (response) section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionPair {
    pub primary: Section,
    pub secondary: Section,
}

impl SectionPair {
    pub const QUESTIONS: Self = Self {
        primary: Section::Questions,
        secondary: Section::Outcomes,
    };
    pub const NEEDS: Self = Self {
        primary: Section::NeedsQuestions,
        secondary: Section::NeedsPlans,
    };
    pub const ALL: [Self; 2] = [Self::QUESTIONS, Self::NEEDS];
}

/// A heading row in the table; each group is preceded by exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionGroup {
    Reasons,
    OutcomesAndQuestions,
    Needs,
    Schedule,
    Subprojects,
}

impl SectionGroup {
    pub const ALL: [Self; 5] = [
        Self::Reasons,
        Self::OutcomesAndQuestions,
        Self::Needs,
        Self::Schedule,
        Self::Subprojects,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Reasons => "Reasons",
            Self::OutcomesAndQuestions => "Outcomes & Questions",
            Self::Needs => "Needs",
            Self::Schedule => "Schedule",
            Self::Subprojects => "Subprojects",
        }
    }

    pub const fn sections(self) -> &'static [Section] {
        match self {
            Self::Reasons => &[Section::Reasons],
            Self::OutcomesAndQuestions => &[Section::Outcomes, Section::Questions],
            Self::Needs => &[Section::NeedsQuestions, Section::NeedsPlans],
            Self::Schedule => &[Section::Schedule],
            Self::Subprojects => &[Section::Subprojects],
        }
    }
}

/// Rows per section. Section boundaries are derived from these alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionCounts {
    pub reason_row_count: usize,
    pub outcome_row_count: usize,
    pub question_row_count: usize,
    pub needs_question_row_count: usize,
    pub needs_plan_row_count: usize,
    pub schedule_row_count: usize,
    pub subproject_row_count: usize,
}

impl Default for SectionCounts {
    fn default() -> Self {
        Self {
            reason_row_count: 1,
            outcome_row_count: 1,
            question_row_count: 1,
            needs_question_row_count: 1,
            needs_plan_row_count: 1,
            schedule_row_count: 1,
            subproject_row_count: 1,
        }
    }
}

impl SectionCounts {
    pub const fn get(&self, section: Section) -> usize {
        match section {
            Section::Reasons => self.reason_row_count,
            Section::Outcomes => self.outcome_row_count,
            Section::Questions => self.question_row_count,
            Section::NeedsQuestions => self.needs_question_row_count,
            Section::NeedsPlans => self.needs_plan_row_count,
            Section::Schedule => self.schedule_row_count,
            Section::Subprojects => self.subproject_row_count,
        }
    }

    pub fn get_mut(&mut self, section: Section) -> &mut usize {
        match section {
            Section::Reasons => &mut self.reason_row_count,
            Section::Outcomes => &mut self.outcome_row_count,
            Section::Questions => &mut self.question_row_count,
            Section::NeedsQuestions => &mut self.needs_question_row_count,
            Section::NeedsPlans => &mut self.needs_plan_row_count,
            Section::Schedule => &mut self.schedule_row_count,
            Section::Subprojects => &mut self.subproject_row_count,
        }
    }

    pub fn set(&mut self, section: Section, count: usize) {
        *self.get_mut(section) = count;
    }

    /// Every section holds at least one row.
    pub fn clamped(mut self) -> Self {
        for section in Section::ALL {
            let count = self.get_mut(section);
            *count = (*count).max(1);
        }
        self
    }

    pub fn data_rows(&self) -> usize {
        Section::ALL.iter().map(|section| self.get(*section)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub text: String,
    pub color: String,
    pub table: Table,
}

impl Item {
    pub fn new(id: ItemId, text: impl Into<String>, color: impl Into<String>) -> Self {
        let text = text.into();
        let table = Table::new_seeded(&text);
        Self {
            id,
            text,
            color: color.into(),
            table,
        }
    }
}

/// The whole editable state: active projects plus archived ones.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlanDocument {
    pub shortlist: Vec<Item>,
    pub archived: Vec<Item>,
}

impl PlanDocument {
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.shortlist
            .iter()
            .chain(self.archived.iter())
            .find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.shortlist
            .iter_mut()
            .chain(self.archived.iter_mut())
            .find(|item| item.id == id)
    }

    pub fn table(&self, id: ItemId) -> Option<&Table> {
        self.item(id).map(|item| &item.table)
    }

    pub fn table_mut(&mut self, id: ItemId) -> Option<&mut Table> {
        self.item_mut(id).map(|item| &mut item.table)
    }

    pub fn next_item_id(&self) -> ItemId {
        let max = self
            .shortlist
            .iter()
            .chain(self.archived.iter())
            .map(|item| item.id.get())
            .max()
            .unwrap_or(0);
        ItemId::new(max + 1)
    }

    /// Position of an item among all items, shortlist first.
    pub fn item_position(&self, id: ItemId) -> Option<usize> {
        self.shortlist
            .iter()
            .chain(self.archived.iter())
            .position(|item| item.id == id)
    }
}
