// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::model::Record;

/// Transport for one record type.
///
/// `create` may hand back the stored row when the server echoes it; the
/// collection adopts the server key from it.
pub trait Proxy<R: Record> {
    fn read_all(&self) -> Result<Vec<R>>;
    fn find_by(&self, column: &str, value: &str) -> Result<Vec<R>>;
    fn create(&self, record: &R) -> Result<Option<R>>;
    fn update(&self, key: R::Key, record: &R) -> Result<()>;
    fn destroy(&self, key: R::Key) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Clean,
    Phantom,
    Modified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingCounts {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl PendingCounts {
    pub const fn total(self) -> usize {
        self.creates + self.updates + self.deletes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub destroyed: usize,
}

impl SyncReport {
    pub const fn total(self) -> usize {
        self.created + self.updated + self.destroyed
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Entry<R> {
    record: R,
    state: RowState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCollection<R: Record> {
    entries: Vec<Entry<R>>,
    removed: Vec<R>,
    loaded_at: Option<OffsetDateTime>,
}

impl<R: Record> Default for RemoteCollection<R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            removed: Vec::new(),
            loaded_at: None,
        }
    }
}

impl<R: Record> RemoteCollection<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection that mirrors already-fetched server rows.
    pub fn from_records(records: Vec<R>) -> Self {
        let mut collection = Self::default();
        collection.replace(records);
        collection
    }

    pub fn load<P>(&mut self, proxy: &P) -> Result<()>
    where
        P: Proxy<R> + ?Sized,
    {
        let records = proxy
            .read_all()
            .with_context(|| format!("load {}", R::TABLE))?;
        info!(table = R::TABLE, rows = records.len(), "collection loaded");
        self.replace(records);
        Ok(())
    }

    /// Drops every local change and adopts `records` as the server baseline.
    pub fn replace(&mut self, records: Vec<R>) {
        self.entries = records
            .into_iter()
            .map(|record| Entry {
                record,
                state: RowState::Clean,
            })
            .collect();
        self.removed.clear();
        self.loaded_at = Some(OffsetDateTime::now_utc());
    }

    pub fn insert(&mut self, index: usize, mut record: R) -> usize {
        let index = index.min(self.entries.len());
        if record.key().is_some() {
            debug!(table = R::TABLE, "inserted record carried a key; dropping it");
            record.clear_key();
        }
        self.entries.insert(
            index,
            Entry {
                record,
                state: RowState::Phantom,
            },
        );
        index
    }

    /// Replaces the record at `index`, keeping its server key.
    pub fn update(&mut self, index: usize, mut record: R) -> Result<()> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or_else(|| anyhow!("no {} row at index {index}", R::TABLE))?;
        if let Some(key) = entry.record.key() {
            record.set_key(key);
        }
        if entry.record == record {
            return Ok(());
        }
        entry.record = record;
        if entry.state == RowState::Clean {
            entry.state = RowState::Modified;
        }
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Option<R> {
        if index >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(index);
        if entry.state != RowState::Phantom && entry.record.key().is_some() {
            self.removed.push(entry.record.clone());
        }
        Some(entry.record)
    }

    pub fn remove(&mut self, record: &R) -> bool {
        let position = match record.key() {
            Some(key) => self.position_by_key(key),
            None => self
                .entries
                .iter()
                .position(|entry| entry.record.key().is_none() && &entry.record == record),
        };
        position.and_then(|index| self.remove_at(index)).is_some()
    }

    /// Sends pending deletes, updates and creates, in that order.
    ///
    /// The batch stops at the first failure. Operations that already went
    /// through are marked clean, everything else stays pending.
    pub fn sync<P>(&mut self, proxy: &P) -> Result<SyncReport>
    where
        P: Proxy<R> + ?Sized,
    {
        let mut report = SyncReport::default();
        let pending = self.pending();

        while let Some(record) = self.removed.first() {
            let Some(key) = record.key() else {
                self.removed.remove(0);
                continue;
            };
            if let Err(error) = proxy.destroy(key) {
                warn!(table = R::TABLE, %key, "delete failed during sync");
                return Err(error).with_context(|| {
                    sync_failure_message::<R>("delete", &key.to_string(), report, pending)
                });
            }
            self.removed.remove(0);
            report.destroyed += 1;
        }

        for index in 0..self.entries.len() {
            let entry = &self.entries[index];
            if entry.state != RowState::Modified {
                continue;
            }
            let Some(key) = entry.record.key() else {
                return Err(anyhow!(
                    "{} row {} has no server key -- reload before editing it",
                    R::TABLE,
                    index + 1
                ))
                .with_context(|| sync_failure_message::<R>("update", "?", report, pending));
            };
            if let Err(error) = proxy.update(key, &entry.record) {
                warn!(table = R::TABLE, %key, "update failed during sync");
                return Err(error).with_context(|| {
                    sync_failure_message::<R>("update", &key.to_string(), report, pending)
                });
            }
            self.entries[index].state = RowState::Clean;
            report.updated += 1;
        }

        for index in 0..self.entries.len() {
            let entry = &self.entries[index];
            if entry.state != RowState::Phantom {
                continue;
            }
            let created = match proxy.create(&entry.record) {
                Ok(created) => created,
                Err(error) => {
                    warn!(table = R::TABLE, row = index, "create failed during sync");
                    return Err(error).with_context(|| {
                        sync_failure_message::<R>("create", "new", report, pending)
                    });
                }
            };
            let entry = &mut self.entries[index];
            if let Some(key) = created.and_then(|row| row.key()) {
                entry.record.set_key(key);
            }
            entry.state = RowState::Clean;
            report.created += 1;
        }

        info!(
            table = R::TABLE,
            created = report.created,
            updated = report.updated,
            destroyed = report.destroyed,
            "collection synced"
        );
        Ok(report)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&R> {
        self.entries.get(index).map(|entry| &entry.record)
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.entries.iter().map(|entry| &entry.record)
    }

    pub fn records(&self) -> Vec<R> {
        self.iter().cloned().collect()
    }

    pub fn row_state(&self, index: usize) -> Option<RowState> {
        self.entries.get(index).map(|entry| entry.state)
    }

    pub fn position_by_key(&self, key: R::Key) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.record.key() == Some(key))
    }

    pub fn find_by_key(&self, key: R::Key) -> Option<&R> {
        self.position_by_key(key).and_then(|index| self.get(index))
    }

    pub fn removed(&self) -> &[R] {
        &self.removed
    }

    pub fn pending(&self) -> PendingCounts {
        let mut counts = PendingCounts {
            deletes: self.removed.len(),
            ..PendingCounts::default()
        };
        for entry in &self.entries {
            match entry.state {
                RowState::Clean => {}
                RowState::Phantom => counts.creates += 1,
                RowState::Modified => counts.updates += 1,
            }
        }
        counts
    }

    pub fn is_dirty(&self) -> bool {
        self.pending().total() > 0
    }

    pub fn loaded_at(&self) -> Option<OffsetDateTime> {
        self.loaded_at
    }
}

fn sync_failure_message<R: Record>(
    operation: &str,
    key: &str,
    done: SyncReport,
    pending: PendingCounts,
) -> String {
    format!(
        "sync {}: {operation} {key} failed after {} of {} changes",
        R::TABLE,
        done.total(),
        pending.total()
    )
}
