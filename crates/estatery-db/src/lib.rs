// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod demo;

use anyhow::{Context, Result, anyhow, bail};
use estatery_app::{EntityKind, Label, Persistence, Record, RowId};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub use demo::{
    demo_agents, demo_clients, demo_discounts, demo_installments, demo_leads, demo_payments,
    demo_transactions,
};

pub const APP_NAME: &str = "estatery";
pub const DB_PATH_ENV: &str = "ESTATERY_DB_PATH";

const SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS records (
      entity TEXT NOT NULL,
      id TEXT NOT NULL,
      position INTEGER NOT NULL,
      body TEXT NOT NULL,
      created_at TEXT NOT NULL,
      updated_at TEXT NOT NULL,
      PRIMARY KEY (entity, id)
    );
    CREATE INDEX IF NOT EXISTS idx_records_entity_position
      ON records (entity, position);
";

const REQUIRED_COLUMNS: &[&str] = &["entity", "id", "position", "body", "created_at", "updated_at"];

/// SQLite file holding every entity's dataset as ordered JSON rows.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if table_exists(&self.conn, "records")? {
            validate_schema(&self.conn)?;
        }
        self.conn
            .execute_batch(SCHEMA_SQL)
            .context("create schema")?;
        Ok(())
    }

    /// Rows for `R`'s entity in dataset order.
    pub fn load_rows<R>(&self) -> Result<Vec<R>>
    where
        R: Record + DeserializeOwned,
    {
        let entity = R::KIND.as_str();
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT id, body
                FROM records
                WHERE entity = ?
                ORDER BY position ASC, id ASC
                ",
            )
            .with_context(|| format!("prepare load for {entity}"))?;
        let rows = stmt
            .query_map(params![entity], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .with_context(|| format!("query {entity}"))?;

        let mut loaded = Vec::new();
        for row in rows {
            let (id, body) = row.with_context(|| format!("read {entity} row"))?;
            let record: R = serde_json::from_str(&body)
                .with_context(|| format!("decode {} {id}; the stored row is corrupt", R::KIND.singular()))?;
            if record.id().as_str() != id {
                bail!(
                    "{} row keyed {id} carries id {}; repair the database before continuing",
                    R::KIND.singular(),
                    record.id()
                );
            }
            loaded.push(record);
        }
        Ok(loaded)
    }

    /// Writes `row`, keeping its position when it exists and placing it
    /// before every other row of its entity when it is new.
    pub fn upsert_row<R>(&self, row: &R) -> Result<()>
    where
        R: Record + Serialize,
    {
        let entity = R::KIND.as_str();
        let body = serde_json::to_string(row)
            .with_context(|| format!("encode {} {}", R::KIND.singular(), row.id()))?;
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO records (entity, id, position, body, created_at, updated_at)
                VALUES (
                  ?1,
                  ?2,
                  (SELECT COALESCE(MIN(position), 0) - 1 FROM records WHERE entity = ?1),
                  ?3,
                  ?4,
                  ?4
                )
                ON CONFLICT (entity, id) DO UPDATE SET
                  body = excluded.body,
                  updated_at = excluded.updated_at
                ",
                params![entity, row.id().as_str(), body, now],
            )
            .with_context(|| format!("save {} {}", R::KIND.singular(), row.id()))?;
        Ok(())
    }

    /// Replaces the whole dataset for `R`'s entity, positions following slice order.
    pub fn replace_rows<R>(&mut self, rows: &[R]) -> Result<()>
    where
        R: Record + Serialize,
    {
        let entity = R::KIND.as_str();
        let now = now_rfc3339()?;
        let tx = self
            .conn
            .transaction()
            .with_context(|| format!("begin replacing {entity}"))?;
        tx.execute("DELETE FROM records WHERE entity = ?", params![entity])
            .with_context(|| format!("clear {entity}"))?;
        for (position, row) in rows.iter().enumerate() {
            let body = serde_json::to_string(row)
                .with_context(|| format!("encode {} {}", R::KIND.singular(), row.id()))?;
            tx.execute(
                "
                INSERT INTO records (entity, id, position, body, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)
                ",
                params![entity, row.id().as_str(), position as i64, body, now, now],
            )
            .with_context(|| format!("insert {} {}", R::KIND.singular(), row.id()))?;
        }
        tx.commit()
            .with_context(|| format!("commit {entity} dataset"))?;
        tracing::debug!(entity, rows = rows.len(), "replaced dataset");
        Ok(())
    }

    pub fn row_exists(&self, entity: EntityKind, id: &RowId) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM records WHERE entity = ? AND id = ?",
                params![entity.as_str(), id.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .with_context(|| format!("look up {} {id}", entity.singular()))?;
        Ok(found.is_some())
    }

    /// Row count per entity, including entities with no rows.
    pub fn entity_counts(&self) -> Result<BTreeMap<EntityKind, usize>> {
        let mut counts: BTreeMap<EntityKind, usize> =
            EntityKind::ALL.iter().map(|kind| (*kind, 0)).collect();
        let mut stmt = self
            .conn
            .prepare("SELECT entity, COUNT(*) FROM records GROUP BY entity")
            .context("prepare entity counts")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .context("query entity counts")?;
        for row in rows {
            let (entity, count) = row.context("read entity count")?;
            let Some(kind) = EntityKind::parse_label(&entity) else {
                tracing::warn!(entity = %entity, "ignoring rows for unknown entity");
                continue;
            };
            counts.insert(kind, usize::try_from(count).unwrap_or_default());
        }
        Ok(counts)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.entity_counts()?.values().all(|count| *count == 0))
    }

    /// Persistence collaborator for one record store.
    pub fn persistence(&self) -> SqlitePersistence<'_> {
        SqlitePersistence { store: self }
    }
}

/// Adapts [`Store`] to the record-store persistence contract.
#[derive(Clone, Copy)]
pub struct SqlitePersistence<'a> {
    store: &'a Store,
}

impl<R> Persistence<R> for SqlitePersistence<'_>
where
    R: Record + Serialize + DeserializeOwned,
{
    fn load(&self) -> Result<Vec<R>> {
        self.store.load_rows()
    }

    fn on_mutation(&self, row: &R) -> Result<()> {
        self.store.upsert_row(row)
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os(DB_PATH_ENV) {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set {DB_PATH_ENV} to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("estatery.db"))
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

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format timestamp")
}

fn validate_schema(conn: &Connection) -> Result<()> {
    let columns = table_columns(conn, "records")?;
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !columns.contains(*column))
        .collect();
    if !missing.is_empty() {
        bail!(
            "table `records` is missing required columns: {}; point --db at an estatery database or delete it",
            missing.join(", ")
        );
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

    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))
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
