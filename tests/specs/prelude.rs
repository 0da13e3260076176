//! Shared setup for the behavioral specs

pub use cg_adapters::{FakeBinaryStore, FakeEventLogStore, FakeStorageAccessor};
pub use cg_core::{
    Access, Cell, CellGate, CellId, CellStatus, CoordinationConfig, CoordinationError,
    CoordinationService, CounterValue, InMemoryBackend, ResourcePath, SequentialIdGen,
    TracedBackend,
};
pub use cg_engine::{
    BulkDeletion, DeletionConfig, DeletionDeps, DeletionError, DeletionRunner, EventLogOutcome,
    Settings,
};
pub use std::time::Duration;

pub type Backend = TracedBackend<InMemoryBackend>;
pub type Service = CoordinationService<Backend, SequentialIdGen>;

/// One deployment: shared coordination plus a cell's worth of stores
pub struct Deployment {
    pub backend: InMemoryBackend,
    pub service: Service,
    pub gate: CellGate<Backend, SequentialIdGen>,
    pub storage: FakeStorageAccessor,
    pub binaries: FakeBinaryStore,
    pub event_logs: FakeEventLogStore,
    pub runner: DeletionRunner<
        FakeStorageAccessor,
        FakeBinaryStore,
        FakeEventLogStore,
        Backend,
        SequentialIdGen,
    >,
}

impl Deployment {
    /// A deployment holding `cell` with `files` binary records
    pub fn with_cell(cell: &str, files: usize) -> Self {
        Self::from_settings(Settings::default(), cell, files)
    }

    pub fn from_settings(settings: Settings, cell: &str, files: usize) -> Self {
        let backend = InMemoryBackend::from_config(&settings.coordination);
        let service = CoordinationService::with_id_gen(
            TracedBackend::new(backend.clone()),
            settings.coordination.clone(),
            SequentialIdGen::new("spec"),
        );
        let gate = CellGate::new(service.clone());
        let storage = FakeStorageAccessor::new().with_cell(cell, files, 3);
        let binaries = FakeBinaryStore::new()
            .with_objects((0..files).map(|n| format!("{cell}-file-{n}")));
        let event_logs = FakeEventLogStore::new();
        let runner = DeletionRunner::new(BulkDeletion::new(
            DeletionDeps {
                storage: storage.clone(),
                binaries: binaries.clone(),
                event_logs: event_logs.clone(),
            },
            gate.clone(),
            settings.deletion,
        )
        .unwrap());
        Self {
            backend,
            service,
            gate,
            storage,
            binaries,
            event_logs,
            runner,
        }
    }
}

/// Settings with a short lock wait so contention specs finish quickly
pub fn quick_settings() -> Settings {
    Settings::from_toml_str(
        r#"
        [coordination]
        lock_retry_interval = "2ms"
        lock_retry_times = 5
        "#,
    )
    .unwrap()
}
