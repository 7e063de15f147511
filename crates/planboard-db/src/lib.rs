// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use planboard_app::{Item, PersistedDocument, PlanDocument};
use rusqlite::{Connection, OptionalExtension, params};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

pub const APP_NAME: &str = "planboard";
pub const DEFAULT_SCOPE_KEY: &str = "default";
pub const MAX_PAYLOAD_SIZE: usize = 16 << 20;

const REQUIRED_SCHEMA: &[(&str, &[&str])] =
    &[("documents", &["scope_key", "payload", "updated_at"])];

/// Broadcast after every successful save so other views can re-derive
/// what they show without polling the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Saved {
        scope_key: String,
        shortlist: Vec<Item>,
    },
}

/// One JSON plan document per scope key.
pub struct Store {
    conn: Connection,
    max_payload_size: usize,
    subscribers: RefCell<Vec<Sender<StoreEvent>>>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self::with_connection(conn))
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            max_payload_size: MAX_PAYLOAD_SIZE,
            subscribers: RefCell::new(Vec::new()),
        }
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
        }
        Ok(())
    }

    pub fn set_max_payload_size(&mut self, value: usize) -> Result<()> {
        if value == 0 {
            bail!("max payload size must be positive, got {value}");
        }
        self.max_payload_size = value;
        Ok(())
    }

    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }

    /// Reads the document stored under `scope_key`. `Ok(None)` when nothing
    /// was saved there yet.
    pub fn try_load(&self, scope_key: &str) -> Result<Option<PlanDocument>> {
        validate_scope_key(scope_key)?;
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM documents WHERE scope_key = ?",
                params![scope_key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("read document for scope {scope_key:?}"))?;

        let Some(payload) = payload else {
            return Ok(None);
        };
        let stored: PersistedDocument = serde_json::from_str(&payload)
            .with_context(|| format!("decode stored document for scope {scope_key:?}"))?;
        let document = PlanDocument::try_from(stored)
            .with_context(|| format!("lay out stored document for scope {scope_key:?}"))?;
        Ok(Some(document))
    }

    /// Like [`Store::try_load`], but any failure or a missing document
    /// yields an empty one.
    pub fn load(&self, scope_key: &str) -> PlanDocument {
        match self.try_load(scope_key) {
            Ok(Some(document)) => {
                debug!(scope_key, items = document.shortlist.len(), "document loaded");
                document
            }
            Ok(None) => {
                debug!(scope_key, "no stored document; starting empty");
                PlanDocument::default()
            }
            Err(error) => {
                warn!(scope_key, error = %format!("{error:#}"), "load failed; starting empty");
                PlanDocument::default()
            }
        }
    }

    pub fn try_save(&self, document: &PlanDocument, scope_key: &str) -> Result<()> {
        validate_scope_key(scope_key)?;
        let payload = serde_json::to_string(&PersistedDocument::from(document))
            .context("encode document")?;
        if payload.len() > self.max_payload_size {
            bail!(
                "document is {} bytes, over the {} byte limit; archive or remove items",
                payload.len(),
                self.max_payload_size
            );
        }

        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO documents (scope_key, payload, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(scope_key) DO UPDATE SET
                  payload = excluded.payload,
                  updated_at = excluded.updated_at
                ",
                params![scope_key, payload, now],
            )
            .with_context(|| format!("write document for scope {scope_key:?}"))?;

        self.broadcast(StoreEvent::Saved {
            scope_key: scope_key.to_owned(),
            shortlist: document.shortlist.clone(),
        });
        Ok(())
    }

    /// Fire-and-forget save; a failed write is logged and dropped.
    pub fn save(&self, document: &PlanDocument, scope_key: &str) {
        if let Err(error) = self.try_save(document, scope_key) {
            warn!(scope_key, error = %format!("{error:#}"), "save failed; change not stored");
        } else {
            debug!(scope_key, "document saved");
        }
    }

    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.borrow_mut().push(sender);
        receiver
    }

    pub fn scope_keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT scope_key FROM documents ORDER BY scope_key ASC")
            .context("prepare scope key query")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("query scope keys")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect scope keys")
    }

    pub fn updated_at(&self, scope_key: &str) -> Result<Option<OffsetDateTime>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM documents WHERE scope_key = ?",
                params![scope_key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("read updated_at for scope {scope_key:?}"))?;
        raw.map(|value| {
            OffsetDateTime::parse(&value, &Rfc3339)
                .with_context(|| format!("parse updated_at {value:?} for scope {scope_key:?}"))
        })
        .transpose()
    }

    pub fn delete_scope(&self, scope_key: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM documents WHERE scope_key = ?",
                params![scope_key],
            )
            .with_context(|| format!("delete document for scope {scope_key:?}"))?;
        Ok(removed > 0)
    }

    fn broadcast(&self, event: StoreEvent) {
        self.subscribers
            .borrow_mut()
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("PLANBOARD_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set PLANBOARD_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("planboard.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

pub fn validate_scope_key(scope_key: &str) -> Result<()> {
    if scope_key.trim().is_empty() {
        bail!("scope key must not be empty");
    }
    Ok(())
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; point PLANBOARD_DB_PATH at a planboard database"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; the database was not created by planboard",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    let names = rows
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))?;
    Ok(names)
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}
