// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod clipboard;
pub mod dragdrop;
pub mod duration;
pub mod focus;
pub mod history;
pub mod ids;
pub mod model;
pub mod pairing;
pub mod persist;
pub mod selection;
pub mod session;
pub mod table;

pub use dragdrop::{DragPreview, DragState, RowMove};
pub use focus::{FocusAttempt, FocusRequest, FocusTracker};
pub use history::{Command, EditOutcome, History, TableCommand, TableEdit};
pub use ids::*;
pub use model::*;
pub use persist::{LayoutError, PersistedDocument, PersistedItem, schedule_names};
pub use selection::{CellCoord, Modifiers, RowCoord, Selection};
pub use session::{EditorEvent, EditorSession, SessionSettings};
pub use table::{RemoveOutcome, SectionBounds, Table};
