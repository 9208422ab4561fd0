// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::ids::RowId;
use crate::model::EntityKind;
use crate::record::Record;

const FIRST_ID_SUFFIX: u64 = 1001;
/// Loaded suffixes above this do not move the high-water mark.
const MAX_TRACKED_SUFFIX: u64 = u64::MAX / 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{} {id} no longer exists", .entity.singular())]
    NotFound { entity: EntityKind, id: RowId },
    #[error("duplicate {} id {id}", .entity.singular())]
    DuplicateId { entity: EntityKind, id: RowId },
}

/// Collaborator that owns durable storage for one entity.
pub trait Persistence<R> {
    fn load(&self) -> anyhow::Result<Vec<R>>;

    /// Called after every successful update or insert; failures are logged, not propagated.
    fn on_mutation(&self, row: &R) -> anyhow::Result<()>;
}

/// In-memory only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl<R> Persistence<R> for Detached {
    fn load(&self) -> anyhow::Result<Vec<R>> {
        Ok(Vec::new())
    }

    fn on_mutation(&self, _row: &R) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Authoritative dataset for one entity; the only write path is
/// [`RecordStore::update_one`] and the insert methods.
#[derive(Debug)]
pub struct RecordStore<R, P = Detached> {
    rows: Vec<R>,
    high_water: u64,
    persistence: P,
}

impl<R: Record> RecordStore<R, Detached> {
    pub fn from_rows(rows: Vec<R>) -> Result<Self, StoreError> {
        Self::with_persistence(rows, Detached)
    }

    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            high_water: FIRST_ID_SUFFIX - 1,
            persistence: Detached,
        }
    }
}

impl<R: Record, P: Persistence<R>> RecordStore<R, P> {
    /// Loads the dataset once from `persistence` and keeps it for mutation callbacks.
    pub fn open(persistence: P) -> anyhow::Result<Self> {
        let rows = persistence.load()?;
        tracing::debug!(entity = R::KIND.as_str(), rows = rows.len(), "loaded dataset");
        Ok(Self::with_persistence(rows, persistence)?)
    }

    pub fn with_persistence(rows: Vec<R>, persistence: P) -> Result<Self, StoreError> {
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            if !seen.insert(row.id()) {
                return Err(StoreError::DuplicateId {
                    entity: R::KIND,
                    id: row.id().clone(),
                });
            }
        }
        let high_water = rows
            .iter()
            .filter_map(|row| row.id().numeric_suffix())
            .filter(|suffix| *suffix <= MAX_TRACKED_SUFFIX)
            .max()
            .unwrap_or(FIRST_ID_SUFFIX - 1);
        Ok(Self {
            rows,
            high_water,
            persistence,
        })
    }

    pub fn list(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &RowId) -> Option<&R> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Shallow-merges `patch` into the row with `id`.
    pub fn update_one(&mut self, id: &RowId, patch: R::Patch) -> Result<R, StoreError> {
        let Some(row) = self.rows.iter_mut().find(|row| row.id() == id) else {
            return Err(StoreError::NotFound {
                entity: R::KIND,
                id: id.clone(),
            });
        };
        row.apply(patch);
        let updated = row.clone();
        tracing::debug!(entity = R::KIND.as_str(), id = %id, "updated row");
        self.notify(&updated);
        Ok(updated)
    }

    /// One `update_one` per id, in order. Rows updated before a failing id stay updated.
    pub fn update_many<'a, I>(&mut self, ids: I, patch: &R::Patch) -> Vec<Result<R, StoreError>>
    where
        I: IntoIterator<Item = &'a RowId>,
    {
        ids.into_iter()
            .map(|id| self.update_one(id, patch.clone()))
            .collect()
    }

    /// Assigns a fresh id and prepends the row.
    pub fn insert_one(&mut self, new: R::New) -> R {
        let row = R::create(self.next_id(), new);
        self.rows.insert(0, row.clone());
        tracing::debug!(entity = R::KIND.as_str(), id = %row.id(), "inserted row");
        self.notify(&row);
        row
    }

    /// Assigns ids in input order and places the batch, in input order, before existing rows.
    pub fn insert_batch(&mut self, batch: Vec<R::New>) -> Vec<R> {
        let inserted: Vec<R> = batch
            .into_iter()
            .map(|new| R::create(self.next_id(), new))
            .collect();
        let existing = std::mem::take(&mut self.rows);
        self.rows = inserted.iter().cloned().chain(existing).collect();
        // Back to front, so a collaborator that prepends each row ends up in dataset order.
        for row in inserted.iter().rev() {
            self.notify(row);
        }
        tracing::debug!(
            entity = R::KIND.as_str(),
            rows = inserted.len(),
            "inserted batch"
        );
        inserted
    }

    pub fn status_counts(&self) -> BTreeMap<R::Status, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.status()).or_insert(0) += 1;
        }
        counts
    }

    /// Skips any candidate already present, so untracked suffixes are never reused.
    fn next_id(&mut self) -> RowId {
        loop {
            self.high_water = self
                .high_water
                .checked_add(1)
                .unwrap_or(FIRST_ID_SUFFIX);
            let id = RowId::new(format!("{}-{}", R::KIND.id_prefix(), self.high_water));
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn notify(&self, row: &R) {
        if let Err(error) = self.persistence.on_mutation(row) {
            tracing::warn!(
                entity = R::KIND.as_str(),
                id = %row.id(),
                error = %format!("{error:#}"),
                "persisting mutation failed"
            );
        }
    }
}
