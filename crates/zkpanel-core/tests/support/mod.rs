// In-memory gateway double: stores rows per table, serves scripted
// unread-event batches, counts every call, and can be told to fail.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use zkpanel_core::{RawRow, TableFilters, TableGateway, TransportError};

/// Arguments of the most recent `read_table` call.
#[derive(Debug, Clone)]
pub struct ReadRequest {
    pub table: String,
    pub filters: TableFilters,
    pub fields: Vec<String>,
    pub unread: bool,
}

#[derive(Default)]
pub struct MockGateway {
    tables: Mutex<HashMap<String, Vec<RawRow>>>,
    unread_batches: Mutex<VecDeque<Vec<RawRow>>>,

    pub read_calls: AtomicUsize,
    pub count_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub unread_calls: AtomicUsize,

    fail_reads: AtomicBool,
    fail_unread: AtomicBool,
    /// Fail the Nth write call (0-based), counted across the gateway's
    /// lifetime.
    fail_write_at: Mutex<Option<usize>>,

    last_read: Mutex<Option<ReadRequest>>,
    written: Mutex<Vec<RawRow>>,
    deleted: Mutex<Vec<RawRow>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = RawRow>) {
        self.tables
            .lock()
            .expect("mock lock")
            .entry(table.to_owned())
            .or_default()
            .extend(rows);
    }

    pub fn push_unread_batch(&self, rows: Vec<RawRow>) {
        self.unread_batches.lock().expect("mock lock").push_back(rows);
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_unread(&self) {
        self.fail_unread.store(true, Ordering::SeqCst);
    }

    pub fn fail_write_at(&self, call_index: usize) {
        *self.fail_write_at.lock().expect("mock lock") = Some(call_index);
    }

    pub fn last_read(&self) -> Option<ReadRequest> {
        self.last_read.lock().expect("mock lock").clone()
    }

    pub fn written(&self) -> Vec<RawRow> {
        self.written.lock().expect("mock lock").clone()
    }

    pub fn deleted(&self) -> Vec<RawRow> {
        self.deleted.lock().expect("mock lock").clone()
    }
}

#[async_trait]
impl TableGateway for MockGateway {
    async fn read_table(
        &self,
        table: &str,
        filters: &TableFilters,
        fields: &[String],
        unread: bool,
    ) -> Result<Vec<RawRow>, TransportError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_read.lock().expect("mock lock") = Some(ReadRequest {
            table: table.to_owned(),
            filters: filters.clone(),
            fields: fields.to_vec(),
            unread,
        });

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(TransportError::new(-2, "GetDeviceData failed"));
        }

        let tables = self.tables.lock().expect("mock lock");
        let rows = tables.get(table).cloned().unwrap_or_default();
        let matching = rows.into_iter().filter(|row| {
            filters.iter().all(|(field, accepted)| {
                row.get(field).is_some_and(|value| accepted.contains(value))
            })
        });

        let projected = matching.map(|row| {
            if fields.is_empty() {
                row
            } else {
                row.into_iter()
                    .filter(|(key, _)| fields.iter().any(|f| f == key))
                    .collect()
            }
        });
        Ok(projected.collect())
    }

    async fn write_table(&self, _table: &str, rows: Vec<RawRow>) -> Result<(), TransportError> {
        let call = self.write_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_write_at.lock().expect("mock lock") == Some(call) {
            return Err(TransportError::new(-12, "SetDeviceData failed"));
        }
        self.written.lock().expect("mock lock").extend(rows);
        Ok(())
    }

    async fn delete_table(&self, _table: &str, rows: Vec<RawRow>) -> Result<(), TransportError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.deleted.lock().expect("mock lock").extend(rows);
        Ok(())
    }

    async fn count_table(&self, table: &str) -> Result<u64, TransportError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().expect("mock lock");
        Ok(tables.get(table).map_or(0, |rows| rows.len() as u64))
    }

    async fn read_unread_events(&self, _table: &str) -> Result<Vec<RawRow>, TransportError> {
        self.unread_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_unread.load(Ordering::SeqCst) {
            return Err(TransportError::new(-104, "GetRTLog failed"));
        }
        Ok(self
            .unread_batches
            .lock()
            .expect("mock lock")
            .pop_front()
            .unwrap_or_default())
    }
}

/// Build a raw row from `(column, value)` pairs.
pub fn row(pairs: &[(&str, &str)]) -> RawRow {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

/// A realtime event row in the shape the gateway delivers.
pub fn event_row(
    time: &str,
    pin: &str,
    card: &str,
    door: u32,
    event_type: u16,
    entry_exit: u8,
    verify_mode: u8,
) -> RawRow {
    row(&[
        ("Time_second", time),
        ("Pin", pin),
        ("Cardno", card),
        ("DoorID", &door.to_string()),
        ("EventType", &event_type.to_string()),
        ("InOutState", &entry_exit.to_string()),
        ("Verified", &verify_mode.to_string()),
    ])
}
