// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use planboard_app::duration::estimate_labels;
use planboard_app::{
    DURATION_COL, ESTIMATE_COL, Item, ItemId, PairId, PlanDocument, Section, SectionPair,
    TEXT_COL, Table,
};
use std::path::PathBuf;

const PROJECT_TITLES: [&str; 14] = [
    "Plant a vegetable garden",
    "Learn conversational Spanish",
    "Refinish the deck",
    "Run a half marathon",
    "Digitize family photos",
    "Build a bookshelf",
    "Start a podcast",
    "Organize the garage",
    "Bake sourdough weekly",
    "Plan a family reunion",
    "Write a short story",
    "Repaint the bedroom",
    "Set up home backups",
    "Volunteer at the shelter",
];

const REASONS: [&str; 10] = [
    "Save money",
    "Spend more time outside",
    "Feel less stressed",
    "Learn something new",
    "Help the family",
    "Stay healthy",
    "Be more organized",
    "Keep a promise",
    "Have fun",
    "Finish what I started",
];

const QUESTIONS: [&str; 8] = [
    "What does done look like?",
    "Who else is involved?",
    "What could go wrong?",
    "How much will it cost?",
    "When is the deadline?",
    "What do I already have?",
    "Where do I start?",
    "How will I track progress?",
];

const OUTCOMES: [&str; 8] = [
    "A finished result I can show",
    "Two friends helping on weekends",
    "Weather delays",
    "Under two hundred dollars",
    "Before the end of summer",
    "Most of the tools",
    "A short list of first steps",
    "A weekly checklist",
];

const TASKS: [&str; 12] = [
    "Buy supplies",
    "Clear the space",
    "Sketch a plan",
    "Call for quotes",
    "Watch a tutorial",
    "Block out a weekend",
    "Ask for advice",
    "Order parts",
    "Measure twice",
    "Clean up",
    "Review progress",
    "Celebrate",
];

const COLORS: [&str; 8] = [
    "#e57373", "#f06292", "#ba68c8", "#7986cb", "#4fc3f7", "#4db6ac", "#aed581", "#ffb74d",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of plausible plan documents. The same seed always
/// produces the same cell text.
#[derive(Debug, Clone)]
pub struct PlanFaker {
    rng: DeterministicRng,
    pair_counter: u64,
}

impl PlanFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            pair_counter: 0,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn project_title(&mut self) -> &'static str {
        self.pick(&PROJECT_TITLES)
    }

    pub fn color(&mut self) -> &'static str {
        self.pick(&COLORS)
    }

    pub fn pair_id(&mut self) -> PairId {
        self.pair_counter += 1;
        PairId::new(format!("fake-{:016x}-{}", self.rng.next_u64(), self.pair_counter))
    }

    pub fn item(&mut self, id: ItemId) -> Item {
        let title = self.project_title();
        let color = self.color();
        Item {
            id,
            text: title.to_owned(),
            color: color.to_owned(),
            table: self.table(title),
        }
    }

    /// A filled table: a few reasons, linked question/outcome and need/plan
    /// pairs, estimated schedule tasks, and subprojects.
    pub fn table(&mut self, title: &str) -> Table {
        let mut table = Table::new_seeded(title);
        let reasons = 1 + self.int_n(3);
        self.fill_section(&mut table, Section::Reasons, &REASONS, reasons);

        let questions = table.bounds().range(Section::Questions).start;
        let outcomes = table.bounds().range(Section::Outcomes).start;
        let first = self.int_n(QUESTIONS.len());
        table.set_cell(questions, TEXT_COL, QUESTIONS[first]);
        table.set_cell(outcomes, TEXT_COL, OUTCOMES[first]);
        for _ in 0..self.int_n(3) {
            let index = self.int_n(QUESTIONS.len());
            let pair_id = self.pair_id();
            let (question, outcome) = table.add_paired_rows(SectionPair::QUESTIONS, pair_id);
            table.set_cell(question, TEXT_COL, QUESTIONS[index]);
            table.set_cell(outcome, TEXT_COL, OUTCOMES[index]);
        }

        let needs = table.bounds().range(Section::NeedsQuestions).start;
        let plans = table.bounds().range(Section::NeedsPlans).start;
        table.set_cell(needs, TEXT_COL, "What do I need?");
        table.set_cell(plans, TEXT_COL, self.pick(&TASKS));

        let tasks = 1 + self.int_n(4);
        self.fill_section(&mut table, Section::Schedule, &TASKS, tasks);
        let labels: Vec<&str> = estimate_labels().collect();
        let schedule = table.bounds().range(Section::Schedule);
        for row in schedule {
            let label = labels[1 + self.int_n(labels.len() - 2)];
            table.set_cell(row, ESTIMATE_COL, label);
        }

        let subprojects = 1 + self.int_n(2);
        self.fill_section(&mut table, Section::Subprojects, &PROJECT_TITLES, subprojects);
        if let Some(row) = table.bounds().range(Section::Subprojects).last() {
            table.set_cell(row, ESTIMATE_COL, "Custom");
            table.set_cell(row, DURATION_COL, "1.30");
        }
        table
    }

    pub fn document(&mut self, shortlist: usize, archived: usize) -> PlanDocument {
        let mut document = PlanDocument::default();
        for index in 0..shortlist + archived {
            let item = self.item(ItemId::new(index as i64 + 1));
            if index < shortlist {
                document.shortlist.push(item);
            } else {
                document.archived.push(item);
            }
        }
        document
    }

    /// Tab-separated text of `rows` lines with `cols` cells each.
    pub fn clipboard_block(&mut self, rows: usize, cols: usize) -> String {
        (0..rows)
            .map(|_| {
                (0..cols)
                    .map(|_| self.pick(&TASKS))
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn fill_section(
        &mut self,
        table: &mut Table,
        section: Section,
        options: &[&'static str],
        rows: usize,
    ) {
        while table.counts().get(section) < rows {
            table.insert_row(section, table.counts().get(section));
        }
        for row in table.bounds().range(section) {
            let text = self.pick(options);
            table.set_cell(row, TEXT_COL, text);
        }
    }

    fn pick(&mut self, options: &[&'static str]) -> &'static str {
        options[self.rng.int_n(options.len())]
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("planboard.db");
    Ok((dir, db_path))
}

pub fn fixture_scope_key() -> &'static str {
    "fixture"
}

pub fn project_titles() -> &'static [&'static str] {
    &PROJECT_TITLES
}
