//! In-memory source and target stores.
//!
//! Both stores are cheap to clone; clones share state, so a caller can hand
//! one clone to the orchestrator and inspect the other afterwards. Failures
//! can be injected per operation to exercise the retry paths:
//!
//! ```rust
//! use cassandra_dynamo_migrate::drivers::{MemorySource, MemoryTarget};
//! use cassandra_dynamo_migrate::Record;
//!
//! let source = MemorySource::new(vec![Record::new("1", "Ada", "ada@example.com")])
//!     .fail_connect(2);
//! let target = MemoryTarget::new().fail_writes_permanently("1");
//! ```

use async_trait::async_trait;
use futures::stream;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::{Record, RecordStream, SourceReader, SourceSeeder, TargetWriter};
use crate::error::{MigrateError, Result};

/// Failure count meaning "fail every time".
const PERMANENT: u32 = u32::MAX;

/// Consume one injected failure, if any remain.
fn take_failure(remaining: &AtomicU32) -> bool {
    remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
            0 => None,
            PERMANENT => Some(PERMANENT),
            n => Some(n - 1),
        })
        .is_ok()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Open handle to a [`MemorySource`].
#[derive(Debug)]
pub struct MemorySourceSession {
    _private: (),
}

#[derive(Default)]
struct SourceInner {
    records: Mutex<Vec<Record>>,
    connect_failures: AtomicU32,
    read_failures: AtomicU32,
    close_failures: AtomicU32,
    connects: AtomicU32,
    reads: AtomicU32,
}

/// Source store backed by a vector, yielded in insertion order.
#[derive(Clone, Default)]
pub struct MemorySource {
    inner: Arc<SourceInner>,
}

impl MemorySource {
    pub fn new(records: Vec<Record>) -> Self {
        let source = Self::default();
        *lock(&source.inner.records) = records;
        source
    }

    /// Fail the next `times` connects.
    pub fn fail_connect(self, times: u32) -> Self {
        self.inner.connect_failures.store(times, Ordering::SeqCst);
        self
    }

    /// Fail the next `times` scans before yielding any record.
    pub fn fail_reads(self, times: u32) -> Self {
        self.inner.read_failures.store(times, Ordering::SeqCst);
        self
    }

    /// Fail the cursor close of the next `times` scans, after every record.
    pub fn fail_cursor_close(self, times: u32) -> Self {
        self.inner.close_failures.store(times, Ordering::SeqCst);
        self
    }

    /// Connect attempts made so far, failed ones included.
    pub fn connect_attempts(&self) -> u32 {
        self.inner.connects.load(Ordering::SeqCst)
    }

    /// Scans started so far, failed ones included.
    pub fn read_attempts(&self) -> u32 {
        self.inner.reads.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> Vec<Record> {
        lock(&self.inner.records).clone()
    }
}

#[async_trait]
impl SourceReader for MemorySource {
    type Session = MemorySourceSession;

    async fn connect(&self) -> Result<Self::Session> {
        self.inner.connects.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.inner.connect_failures) {
            return Err(MigrateError::connection("memory", "connection refused"));
        }
        Ok(MemorySourceSession { _private: () })
    }

    fn scan<'a>(&'a self, _session: &'a Self::Session) -> RecordStream<'a> {
        self.inner.reads.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.inner.read_failures) {
            return Box::pin(stream::once(async {
                Err::<Record, _>(MigrateError::Query("read timed out".into()))
            }));
        }

        let mut items: Vec<Result<Record>> = self.records().into_iter().map(Ok).collect();
        if take_failure(&self.inner.close_failures) {
            items.push(Err(MigrateError::Query("cursor close failed".into())));
        }
        Box::pin(stream::iter(items))
    }

    fn db_type(&self) -> &str {
        "memory"
    }

    fn describe(&self) -> String {
        "memory source".to_string()
    }
}

#[async_trait]
impl SourceSeeder for MemorySource {
    async fn insert(&self, _session: &Self::Session, record: &Record) -> Result<()> {
        lock(&self.inner.records).push(record.clone());
        Ok(())
    }
}

/// Open handle to a [`MemoryTarget`].
#[derive(Debug)]
pub struct MemoryTargetSession {
    _private: (),
}

#[derive(Default)]
struct TargetInner {
    items: Mutex<BTreeMap<String, Record>>,
    write_failures: Mutex<HashMap<String, u32>>,
    connect_failures: AtomicU32,
    connects: AtomicU32,
    writes: AtomicU32,
}

/// Target store backed by a map keyed by record id.
#[derive(Clone, Default)]
pub struct MemoryTarget {
    inner: Arc<TargetInner>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `records` already stored, as after an earlier partial run.
    pub fn with_records(records: Vec<Record>) -> Self {
        let target = Self::default();
        {
            let mut items = lock(&target.inner.items);
            for record in records {
                items.insert(record.id().to_string(), record);
            }
        }
        target
    }

    /// Fail the next `times` connects.
    pub fn fail_connect(self, times: u32) -> Self {
        self.inner.connect_failures.store(times, Ordering::SeqCst);
        self
    }

    /// Fail the next `times` writes of the record with `id`.
    pub fn fail_writes(self, id: &str, times: u32) -> Self {
        lock(&self.inner.write_failures).insert(id.to_string(), times);
        self
    }

    /// Fail every write of the record with `id`.
    pub fn fail_writes_permanently(self, id: &str) -> Self {
        self.fail_writes(id, PERMANENT)
    }

    pub fn connect_attempts(&self) -> u32 {
        self.inner.connects.load(Ordering::SeqCst)
    }

    /// Write calls made so far, failed ones included.
    pub fn write_attempts(&self) -> u32 {
        self.inner.writes.load(Ordering::SeqCst)
    }

    pub fn get(&self, id: &str) -> Option<Record> {
        lock(&self.inner.items).get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        lock(&self.inner.items).contains_key(id)
    }

    pub fn len(&self) -> usize {
        lock(&self.inner.items).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored items ordered by id.
    pub fn snapshot(&self) -> BTreeMap<String, Record> {
        lock(&self.inner.items).clone()
    }
}

#[async_trait]
impl TargetWriter for MemoryTarget {
    type Session = MemoryTargetSession;

    async fn connect(&self) -> Result<Self::Session> {
        self.inner.connects.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.inner.connect_failures) {
            return Err(MigrateError::connection("memory", "endpoint unreachable"));
        }
        Ok(MemoryTargetSession { _private: () })
    }

    async fn write_one(&self, _session: &Self::Session, record: &Record) -> Result<()> {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);

        let failing = {
            let mut failures = lock(&self.inner.write_failures);
            match failures.get_mut(record.id()) {
                Some(n) if *n == PERMANENT => true,
                Some(n) if *n > 0 => {
                    *n -= 1;
                    true
                }
                _ => false,
            }
        };
        if failing {
            return Err(MigrateError::write(
                record.id(),
                "provisioned throughput exceeded",
            ));
        }

        lock(&self.inner.items).insert(record.id().to_string(), record.clone());
        Ok(())
    }

    fn db_type(&self) -> &str {
        "memory"
    }

    fn describe(&self) -> String {
        "memory target".to_string()
    }
}
