// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use async_trait::async_trait;
use cg_adapters::{
    EventLogError, FakeBinaryStore, FakeEventLogStore, FakeStorageAccessor, StorageCall,
    StorageError,
};
use cg_core::{
    Access, BackendError, CellStatus, CoordinationConfig, CoordinationError, CoordinationService,
    FullKey, InMemoryBackend, LockToken, SequentialIdGen,
};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

type TestDeletion = BulkDeletion<
    FakeStorageAccessor,
    FakeBinaryStore,
    FakeEventLogStore,
    InMemoryBackend,
    SequentialIdGen,
>;

struct Harness {
    storage: FakeStorageAccessor,
    binaries: FakeBinaryStore,
    event_logs: FakeEventLogStore,
    deletion: TestDeletion,
}

impl Harness {
    async fn status(&self, cell: &str) -> CellStatus {
        self.deletion
            .gate()
            .service()
            .cell_status(&CellId::new(cell))
            .await
            .unwrap()
    }

    fn list_offsets(&self) -> Vec<u64> {
        self.storage
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                StorageCall::List { offset, .. } => Some(offset),
                _ => None,
            })
            .collect()
    }

    fn bulk_removed(&self) -> bool {
        self.storage
            .calls()
            .iter()
            .any(|call| matches!(call, StorageCall::BulkRemove { .. }))
    }
}

fn gate<B: CoordinationBackend>(backend: B) -> CellGate<B, SequentialIdGen> {
    let config = CoordinationConfig::default().with_lock_retry(Duration::from_millis(1), 3);
    CellGate::new(CoordinationService::with_id_gen(
        backend,
        config,
        SequentialIdGen::new("test"),
    ))
}

fn harness(files: usize, config: DeletionConfig) -> Harness {
    let storage = FakeStorageAccessor::new().with_cell("c1", files, 7);
    let binaries =
        FakeBinaryStore::new().with_objects((0..files).map(|n| format!("c1-file-{n}")));
    let event_logs = FakeEventLogStore::new();
    let deletion = BulkDeletion::new(
        DeletionDeps {
            storage: storage.clone(),
            binaries: binaries.clone(),
            event_logs: event_logs.clone(),
        },
        gate(InMemoryBackend::new()),
        config,
    )
    .unwrap();
    Harness {
        storage,
        binaries,
        event_logs,
        deletion,
    }
}

fn cell() -> Cell {
    Cell::new("c1", "unit-a").with_owner("owner-1")
}

// =============================================================================
// Binary purge pagination
// =============================================================================

#[tokio::test]
async fn pages_cover_every_record_exactly_once() {
    let h = harness(2500, DeletionConfig::default());

    let report = h.deletion.run(&cell()).await.unwrap();

    assert_eq!(h.list_offsets(), vec![0, 1000, 2000]);
    let removals = h.binaries.removals();
    let unique: HashSet<_> = removals.iter().collect();
    assert_eq!(removals.len(), 2500);
    assert_eq!(unique.len(), 2500);
    assert!(h.binaries.objects().is_empty());
    assert_eq!(report.total, 2500);
    assert_eq!(report.removed, 2500);
    assert_eq!(report.pages, 3);
    assert!(report.is_clean());
}

#[yare::parameterized(
    empty = { 0, 10, 0 },
    single_partial = { 3, 10, 1 },
    exact_multiple = { 20, 10, 2 },
    one_past = { 21, 10, 3 },
    batch_of_one = { 4, 1, 4 },
)]
fn page_count_is_ceiling_of_total_over_batch(files: usize, batch: u64, pages: u64) {
    let h = harness(files, DeletionConfig::default().with_batch_size(batch));
    let report = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(h.deletion.run(&cell()))
        .unwrap();

    assert_eq!(report.pages, pages);
    assert_eq!(report.removed, files as u64);
    assert_eq!(h.list_offsets().len() as u64, pages);
}

#[tokio::test]
async fn concurrent_purge_removes_every_record() {
    let h = harness(
        25,
        DeletionConfig::default()
            .with_batch_size(10)
            .with_purge_concurrency(4),
    );
    h.binaries.fail_on("c1-file-13");

    let report = h.deletion.run(&cell()).await.unwrap();

    let unique: HashSet<_> = h.binaries.removals().into_iter().collect();
    assert_eq!(unique.len(), 25);
    assert_eq!(report.removed, 24);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].object_id, "c1-file-13");
    assert_eq!(h.binaries.objects(), vec!["c1-file-13"]);
}

/// Binary store that panics on one object id
#[derive(Clone)]
struct PanickingBinaries {
    inner: FakeBinaryStore,
    poison: &'static str,
}

#[async_trait]
impl BinaryStore for PanickingBinaries {
    async fn remove(&self, object_id: &str) -> Result<(), BinaryStoreError> {
        if object_id == self.poison {
            panic!("store client crashed on {object_id}");
        }
        self.inner.remove(object_id).await
    }
}

#[tokio::test]
async fn panicked_removal_is_recorded_against_its_object() {
    let storage = FakeStorageAccessor::new().with_cell("c1", 12, 1);
    let binaries = FakeBinaryStore::new();
    let deletion = BulkDeletion::new(
        DeletionDeps {
            storage: storage.clone(),
            binaries: PanickingBinaries {
                inner: binaries.clone(),
                poison: "c1-file-6",
            },
            event_logs: FakeEventLogStore::new(),
        },
        gate(InMemoryBackend::new()),
        DeletionConfig::default()
            .with_batch_size(5)
            .with_purge_concurrency(4),
    )
    .unwrap();

    let report = deletion.run(&cell()).await.unwrap();

    assert_eq!(report.removed, 11);
    assert_eq!(binaries.removals().len(), 11);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].object_id, "c1-file-6");
    assert!(report.failed[0].error.contains("panicked"));
    assert!(!storage.has_cell("c1"));
}

// =============================================================================
// Failure handling
// =============================================================================

#[yare::parameterized(
    zero_batch = { DeletionConfig::default().with_batch_size(0), "batch_size" },
    zero_concurrency = { DeletionConfig::default().with_purge_concurrency(0), "purge_concurrency" },
)]
fn construction_rejects_unusable_config(config: DeletionConfig, rejected: &str) {
    let result = BulkDeletion::new(
        DeletionDeps {
            storage: FakeStorageAccessor::new(),
            binaries: FakeBinaryStore::new(),
            event_logs: FakeEventLogStore::new(),
        },
        gate(InMemoryBackend::new()),
        config,
    );

    match result {
        Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, rejected),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("config with {rejected} = 0 was accepted"),
    }
}

#[tokio::test]
async fn failed_removal_is_recorded_and_run_continues() {
    let h = harness(5, DeletionConfig::default().with_batch_size(2));
    h.binaries.fail_on("c1-file-1");

    let report = h.deletion.run(&cell()).await.unwrap();

    assert_eq!(h.binaries.removals().len(), 5);
    assert_eq!(report.removed, 4);
    assert_eq!(
        report.failed,
        vec![FailedRemoval {
            object_id: "c1-file-1".to_string(),
            error: "object c1-file-1 could not be removed: injected failure".to_string(),
        }]
    );
    assert!(!report.is_clean());
    assert!(h.bulk_removed());
    assert_eq!(h.status("c1").await, CellStatus::Normal);
}

#[tokio::test]
async fn event_log_failure_is_not_fatal() {
    let h = harness(2, DeletionConfig::default());
    h.event_logs.set_failing(true);

    let report = h.deletion.run(&cell()).await.unwrap();

    assert!(matches!(report.event_log, EventLogOutcome::Failed(_)));
    assert!(h.bulk_removed());
    assert_eq!(h.status("c1").await, CellStatus::Normal);
}

#[tokio::test]
async fn event_log_removal_gets_cell_owner() {
    let h = harness(0, DeletionConfig::default());

    h.deletion.run(&cell()).await.unwrap();

    let calls = h.event_logs.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].cell, "c1");
    assert_eq!(calls[0].owner.as_deref(), Some("owner-1"));
}

#[tokio::test]
async fn entity_purge_failure_leaves_cell_gated() {
    let h = harness(3, DeletionConfig::default());
    h.storage.fail_bulk_remove();

    let err = h.deletion.run(&cell()).await.unwrap_err();

    assert!(matches!(err, DeletionError::EntityPurge { .. }));
    assert!(err.leaves_cell_gated());
    assert_eq!(h.status("c1").await, CellStatus::BulkDeletion);
    let check = h
        .deletion
        .gate()
        .check(&CellId::new("c1"), Access::Read)
        .await;
    assert!(matches!(check, Err(CoordinationError::CellBeingDeleted(_))));
}

/// Backend whose status entries can be written but never removed
#[derive(Clone)]
struct StickyStatusBackend(InMemoryBackend);

#[async_trait]
impl CoordinationBackend for StickyStatusBackend {
    async fn get_lock(&self, key: &FullKey) -> Result<Option<LockToken>, BackendError> {
        self.0.get_lock(key).await
    }

    async fn put_lock_if_absent(
        &self,
        key: &FullKey,
        token: LockToken,
    ) -> Result<bool, BackendError> {
        self.0.put_lock_if_absent(key, token).await
    }

    async fn release_lock(&self, key: &FullKey) -> Result<(), BackendError> {
        self.0.release_lock(key).await
    }

    async fn delete_all(&self) -> Result<(), BackendError> {
        self.0.delete_all().await
    }

    async fn get_reference_token(&self, key: &FullKey) -> Result<Option<String>, BackendError> {
        self.0.get_reference_token(key).await
    }

    async fn put_reference_token_if_absent(
        &self,
        key: &FullKey,
        value: &str,
    ) -> Result<bool, BackendError> {
        self.0.put_reference_token_if_absent(key, value).await
    }

    async fn get_account_lockout(&self, key: &FullKey) -> Result<Option<String>, BackendError> {
        self.0.get_account_lockout(key).await
    }

    async fn set_account_lockout(
        &self,
        key: &FullKey,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, BackendError> {
        self.0.set_account_lockout(key, value, ttl).await
    }

    async fn get_unit_user_lock(&self, key: &FullKey) -> Result<Option<String>, BackendError> {
        self.0.get_unit_user_lock(key).await
    }

    async fn put_unit_user_lock_if_absent(
        &self,
        key: &FullKey,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, BackendError> {
        self.0.put_unit_user_lock_if_absent(key, value, ttl).await
    }

    async fn get_count(&self, key: &FullKey) -> Result<Option<u64>, BackendError> {
        self.0.get_count(key).await
    }

    async fn increment_count(&self, key: &FullKey) -> Result<u64, BackendError> {
        self.0.increment_count(key).await
    }

    async fn decrement_count(&self, key: &FullKey) -> Result<Option<u64>, BackendError> {
        self.0.decrement_count(key).await
    }

    async fn get_status(&self, key: &FullKey) -> Result<Option<i64>, BackendError> {
        self.0.get_status(key).await
    }

    async fn set_status(&self, key: &FullKey, value: i64) -> Result<bool, BackendError> {
        self.0.set_status(key, value).await
    }

    async fn delete_status(&self, _key: &FullKey) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("status delete refused".to_string()))
    }

    async fn get_degraded_mode(&self, key: &FullKey) -> Result<Option<String>, BackendError> {
        self.0.get_degraded_mode(key).await
    }
}

#[tokio::test]
async fn status_clear_failure_after_purge_leaves_cell_gated() {
    let storage = FakeStorageAccessor::new().with_cell("c1", 3, 2);
    let deletion = BulkDeletion::new(
        DeletionDeps {
            storage: storage.clone(),
            binaries: FakeBinaryStore::new(),
            event_logs: FakeEventLogStore::new(),
        },
        gate(StickyStatusBackend(InMemoryBackend::new())),
        DeletionConfig::default(),
    )
    .unwrap();

    let err = deletion.run(&cell()).await.unwrap_err();

    assert!(matches!(
        &err,
        DeletionError::ClearStatus { cell: id, source: CoordinationError::Backend(_) }
            if id.as_str() == "c1"
    ));
    assert!(err.leaves_cell_gated());
    assert!(!storage.has_cell("c1"));
    let check = deletion
        .gate()
        .check(&CellId::new("c1"), Access::Read)
        .await;
    assert!(matches!(check, Err(CoordinationError::CellBeingDeleted(_))));
}

#[tokio::test]
async fn count_failure_is_fatal_before_any_removal() {
    let h = harness(3, DeletionConfig::default());
    h.storage.fail_count();

    let err = h.deletion.run(&cell()).await.unwrap_err();

    assert!(matches!(err, DeletionError::Count { .. }));
    assert!(h.binaries.removals().is_empty());
    assert!(h.event_logs.calls().is_empty());
    assert!(!h.bulk_removed());
    assert_eq!(h.status("c1").await, CellStatus::BulkDeletion);
}

#[tokio::test]
async fn list_failure_stops_the_run() {
    let h = harness(25, DeletionConfig::default().with_batch_size(10));
    h.storage.fail_list_at(10);

    let err = h.deletion.run(&cell()).await.unwrap_err();

    assert!(matches!(err, DeletionError::List { offset: 10, .. }));
    assert_eq!(h.binaries.removals().len(), 10);
    assert!(!h.bulk_removed());
    assert_eq!(h.status("c1").await, CellStatus::BulkDeletion);
}

#[tokio::test]
async fn busy_cell_is_refused_without_touching_stores() {
    let h = harness(3, DeletionConfig::default());
    h.deletion
        .gate()
        .service()
        .set_cell_status(&CellId::new("c1"), CellStatus::Exporting)
        .await
        .unwrap();

    let err = h.deletion.run(&cell()).await.unwrap_err();

    assert!(matches!(
        err,
        DeletionError::Coordination(CoordinationError::CellBusy {
            status: CellStatus::Exporting,
            ..
        })
    ));
    assert!(!err.leaves_cell_gated());
    assert!(h.storage.calls().is_empty());
    assert_eq!(h.status("c1").await, CellStatus::Exporting);
}

#[tokio::test]
async fn second_run_on_deleted_cell_is_refused() {
    let h = harness(1, DeletionConfig::default());
    h.storage.fail_bulk_remove();
    let _ = h.deletion.run(&cell()).await;

    let err = h.deletion.run(&cell()).await.unwrap_err();

    assert!(matches!(
        err,
        DeletionError::Coordination(CoordinationError::CellBusy {
            status: CellStatus::BulkDeletion,
            ..
        })
    ));
}

#[tokio::test]
async fn report_serializes_for_operators() {
    let h = harness(1, DeletionConfig::default());
    h.event_logs.set_failing(true);

    let report = h.deletion.run(&cell()).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["cell"], "c1");
    assert_eq!(json["total"], 1);
    assert_eq!(json["event_log"]["status"], "failed");
}

// =============================================================================
// Phase ordering
// =============================================================================

#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<&'static str>>>);

impl Journal {
    fn push(&self, entry: &'static str) {
        self.0.lock().unwrap().push(entry);
    }

    fn entries(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct JournaledStorage(FakeStorageAccessor, Journal);

#[async_trait]
impl StorageAccessor for JournaledStorage {
    async fn count_binary_records(&self, cell: &CellId, scope: &str) -> Result<u64, StorageError> {
        self.1.push("count");
        self.0.count_binary_records(cell, scope).await
    }

    async fn list_binary_record_ids(
        &self,
        cell: &CellId,
        scope: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<String>, StorageError> {
        self.1.push("list");
        self.0.list_binary_record_ids(cell, scope, limit, offset).await
    }

    async fn bulk_remove_entities(&self, cell: &CellId, scope: &str) -> Result<(), StorageError> {
        self.1.push("entities");
        self.0.bulk_remove_entities(cell, scope).await
    }
}

#[derive(Clone)]
struct JournaledBinaries(Journal);

#[async_trait]
impl BinaryStore for JournaledBinaries {
    async fn remove(&self, _object_id: &str) -> Result<(), BinaryStoreError> {
        self.0.push("binary");
        Ok(())
    }
}

#[derive(Clone)]
struct JournaledEventLogs(Journal);

#[async_trait]
impl EventLogStore for JournaledEventLogs {
    async fn remove_log(&self, _cell: &CellId, _owner: Option<&str>) -> Result<(), EventLogError> {
        self.0.push("event-log");
        Ok(())
    }
}

#[tokio::test]
async fn entity_purge_runs_after_binaries_and_event_log() {
    let journal = Journal::default();
    let deletion = BulkDeletion::new(
        DeletionDeps {
            storage: JournaledStorage(
                FakeStorageAccessor::new().with_cell("c1", 3, 1),
                journal.clone(),
            ),
            binaries: JournaledBinaries(journal.clone()),
            event_logs: JournaledEventLogs(journal.clone()),
        },
        gate(InMemoryBackend::new()),
        DeletionConfig::default().with_batch_size(2),
    )
    .unwrap();

    deletion.run(&cell()).await.unwrap();

    assert_eq!(
        journal.entries(),
        vec![
            "count",
            "list",
            "binary",
            "binary",
            "list",
            "binary",
            "event-log",
            "entities"
        ]
    );
}

// =============================================================================
// Logging
// =============================================================================

#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn run_with_logs(h: &Harness) -> (String, Result<DeletionReport, DeletionError>) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(h.deletion.run(&cell()))
    });
    (logs.contents(), result)
}

#[test]
fn failed_removal_logs_cell_and_object() {
    let h = harness(3, DeletionConfig::default());
    h.binaries.fail_on("c1-file-2");

    let (logs, result) = run_with_logs(&h);

    assert!(result.is_ok());
    assert!(logs.contains("binary removal failed"), "Logs:\n{}", logs);
    assert!(logs.contains("cell=c1"), "Should log cell. Logs:\n{}", logs);
    assert!(
        logs.contains("object_id=c1-file-2"),
        "Should log object id. Logs:\n{}",
        logs
    );
    assert!(logs.contains("cell deleted"), "Logs:\n{}", logs);
}

#[test]
fn entity_purge_failure_is_logged_as_error() {
    let h = harness(0, DeletionConfig::default());
    h.storage.fail_bulk_remove();

    let (logs, result) = run_with_logs(&h);

    assert!(result.is_err());
    assert!(logs.contains("ERROR"), "Logs:\n{}", logs);
    assert!(
        logs.contains("entity purge failed, cell left in bulk deletion"),
        "Logs:\n{}",
        logs
    );
}
