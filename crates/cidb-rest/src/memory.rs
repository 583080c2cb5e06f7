// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use cidb_app::{Proxy, Record};
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::error::RestError;

/// In-process table with server-like behavior: keys are assigned in
/// sequence starting at 0 and unknown keys answer 404.
#[derive(Debug)]
pub struct MemoryBackend<R> {
    table: Mutex<Table<R>>,
}

#[derive(Debug)]
struct Table<R> {
    rows: Vec<R>,
    next_key: i64,
}

impl<R> Default for MemoryBackend<R> {
    fn default() -> Self {
        Self {
            table: Mutex::new(Table {
                rows: Vec::new(),
                next_key: 0,
            }),
        }
    }
}

impl<R> MemoryBackend<R>
where
    R: Record,
    R::Key: From<i64> + Into<i64>,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the table; rows without a key get the next free one.
    pub fn with_rows(rows: Vec<R>) -> Self {
        let mut next_key = rows
            .iter()
            .filter_map(Record::key)
            .map(Into::into)
            .max()
            .map_or(0, |max: i64| max + 1);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.key().is_none() {
                    row.set_key(R::Key::from(next_key));
                    next_key += 1;
                }
                row
            })
            .collect();
        Self {
            table: Mutex::new(Table { rows, next_key }),
        }
    }

    pub fn rows(&self) -> Result<Vec<R>> {
        Ok(self.lock()?.rows.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Table<R>>> {
        self.table
            .lock()
            .map_err(|_| anyhow!("{} table lock poisoned", R::TABLE))
    }

    fn not_found(key: R::Key) -> anyhow::Error {
        RestError::Status {
            status: 404,
            message: format!("{} {key} not found", R::TABLE),
        }
        .into()
    }
}

impl<R> Proxy<R> for MemoryBackend<R>
where
    R: Record,
    R::Key: From<i64> + Into<i64>,
{
    fn read_all(&self) -> Result<Vec<R>> {
        self.rows()
    }

    fn find_by(&self, column: &str, value: &str) -> Result<Vec<R>> {
        let table = self.lock()?;
        let mut found = Vec::new();
        for row in &table.rows {
            let matches = if column == R::PRIMARY_KEY {
                row.key().is_some_and(|key| key.to_string() == value)
            } else {
                let encoded = serde_json::to_value(row)?;
                encoded.get(column).is_some_and(|cell| cell_text(cell) == value)
            };
            if matches {
                found.push(row.clone());
            }
        }
        debug!(table = R::TABLE, column, value, rows = found.len(), "memory find");
        Ok(found)
    }

    fn create(&self, record: &R) -> Result<Option<R>> {
        let mut table = self.lock()?;
        let mut stored = record.clone();
        stored.set_key(R::Key::from(table.next_key));
        table.next_key += 1;
        table.rows.push(stored.clone());
        Ok(Some(stored))
    }

    /// Only the columns present in the body are written, the rest of the
    /// stored row is left as it was.
    fn update(&self, key: R::Key, record: &R) -> Result<()> {
        let mut table = self.lock()?;
        let row = table
            .rows
            .iter_mut()
            .find(|row| row.key() == Some(key))
            .ok_or_else(|| Self::not_found(key))?;
        let mut stored = serde_json::to_value(&*row)?;
        if let (Value::Object(columns), Value::Object(body)) =
            (&mut stored, serde_json::to_value(record)?)
        {
            columns.extend(body);
        }
        let mut updated: R = serde_json::from_value(stored)?;
        updated.set_key(key);
        *row = updated;
        Ok(())
    }

    fn destroy(&self, key: R::Key) -> Result<()> {
        let mut table = self.lock()?;
        let index = table
            .rows
            .iter()
            .position(|row| row.key() == Some(key))
            .ok_or_else(|| Self::not_found(key))?;
        table.rows.remove(index);
        Ok(())
    }
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_owned(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryBackend;
    use crate::RestError;
    use anyhow::Result;
    use cidb_app::{Car, CarId, Comment, CommentId, Proxy, Record};
    use cidb_testkit::{comment, sample_cars, sample_comments};
    use serde::{Deserialize, Serialize};

    #[test]
    fn keys_continue_after_seeded_rows() -> Result<()> {
        let backend = MemoryBackend::with_rows(sample_cars());
        let created = backend.create(&Car::phantom())?.expect("created row");
        assert_eq!(created.key(), Some(CarId::new(3)));

        let empty = MemoryBackend::<Car>::new();
        let first = empty.create(&Car::phantom())?.expect("created row");
        assert_eq!(first.key(), Some(CarId::new(0)));
        Ok(())
    }

    #[test]
    fn keyless_seed_rows_are_numbered_from_zero() -> Result<()> {
        let mut loose = comment(0, 1, "first");
        loose.clear_key();
        let backend = MemoryBackend::with_rows(vec![loose.clone(), loose]);
        let keys = backend
            .rows()?
            .iter()
            .filter_map(Record::key)
            .collect::<Vec<_>>();
        assert_eq!(keys, vec![CommentId::new(0), CommentId::new(1)]);
        Ok(())
    }

    #[test]
    fn find_matches_foreign_key_text() -> Result<()> {
        let backend = MemoryBackend::with_rows(sample_comments());
        let rows = backend.find_by("car_id", "0")?;
        assert_eq!(rows.len(), 2);
        assert!(backend.find_by("car_id", "9")?.is_empty());
        assert_eq!(backend.find_by("id", "2")?.len(), 1);
        Ok(())
    }

    #[test]
    fn unknown_keys_answer_not_found() {
        let backend = MemoryBackend::with_rows(sample_cars());
        let error = backend
            .destroy(CarId::new(42))
            .expect_err("missing car");
        assert!(RestError::find(&error).is_some_and(RestError::is_not_found));

        let error = backend
            .update(CarId::new(42), &Car::phantom())
            .expect_err("missing car");
        assert!(error.to_string().contains("car 42 not found"));
    }

    #[test]
    fn update_keeps_the_addressed_key() -> Result<()> {
        let backend = MemoryBackend::with_rows(sample_cars());
        let mut edited = Car::phantom();
        edited.model = "C3".to_owned();
        backend.update(CarId::new(0), &edited)?;
        let rows = backend.rows()?;
        assert_eq!(rows[0].cid, Some(CarId::new(0)));
        assert_eq!(rows[0].model, "C3");
        Ok(())
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Tag {
        #[serde(default, skip_serializing)]
        id: Option<CommentId>,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    }

    impl Record for Tag {
        type Key = CommentId;

        const TABLE: &'static str = "tag";
        const PRIMARY_KEY: &'static str = "id";

        fn key(&self) -> Option<CommentId> {
            self.id
        }

        fn set_key(&mut self, key: CommentId) {
            self.id = Some(key);
        }

        fn clear_key(&mut self) {
            self.id = None;
        }
    }

    #[test]
    fn update_writes_only_columns_in_the_body() -> Result<()> {
        let backend = MemoryBackend::with_rows(vec![Tag {
            id: None,
            label: "old".to_owned(),
            color: Some("red".to_owned()),
        }]);
        backend.update(
            CommentId::new(0),
            &Tag {
                id: None,
                label: "new".to_owned(),
                color: None,
            },
        )?;
        let rows = backend.rows()?;
        assert_eq!(rows[0].label, "new");
        assert_eq!(rows[0].color.as_deref(), Some("red"));
        assert_eq!(rows[0].id, Some(CommentId::new(0)));
        Ok(())
    }

    #[test]
    fn cleared_car_column_is_cleared_in_storage() -> Result<()> {
        let backend = MemoryBackend::with_rows(sample_cars());
        let mut edited = sample_cars()[0].clone();
        edited.fuel = None;
        backend.update(CarId::new(0), &edited)?;
        assert_eq!(backend.rows()?[0].fuel, None);
        Ok(())
    }

    #[test]
    fn comment_lookup_by_text_column() -> Result<()> {
        let backend = MemoryBackend::<Comment>::with_rows(sample_comments());
        assert_eq!(backend.find_by("car_comment", "I Love my C2")?.len(), 1);
        Ok(())
    }
}
