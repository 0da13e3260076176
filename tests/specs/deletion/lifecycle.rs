//! Bulk deletion lifecycle specs
//!
//! Verify a cell goes Normal → BulkDeletion → Normal and its stores end
//! up empty.

use crate::prelude::*;

#[tokio::test]
async fn deleting_a_cell_empties_every_store() {
    let d = Deployment::with_cell("c1", 2500);

    let report = d
        .runner
        .spawn(Cell::new("c1", "unit-a").with_owner("owner-1"))
        .wait()
        .await
        .unwrap();

    assert_eq!(report.total, 2500);
    assert_eq!(report.removed, 2500);
    assert_eq!(report.pages, 3);
    assert_eq!(report.event_log, EventLogOutcome::Removed);
    assert!(d.binaries.objects().is_empty());
    assert!(!d.storage.has_cell("c1"));
    assert_eq!(d.event_logs.calls().len(), 1);
    assert_eq!(
        d.service.cell_status(&CellId::new("c1")).await.unwrap(),
        CellStatus::Normal
    );
}

#[tokio::test]
async fn partial_failures_are_reported_not_fatal() {
    let d = Deployment::with_cell("c1", 10);
    d.binaries.fail_on("c1-file-4");
    d.binaries.fail_on("c1-file-9");
    d.event_logs.set_failing(true);

    let report = d
        .runner
        .spawn(Cell::new("c1", "unit-a"))
        .wait()
        .await
        .unwrap();

    let failed: Vec<_> = report.failed.iter().map(|f| f.object_id.as_str()).collect();
    assert_eq!(failed, vec!["c1-file-4", "c1-file-9"]);
    assert_eq!(report.removed, 8);
    assert!(matches!(report.event_log, EventLogOutcome::Failed(_)));
    assert!(!d.storage.has_cell("c1"));
}

#[tokio::test]
async fn deletion_waits_for_in_flight_cell_lock() {
    let settings = Settings::from_toml_str(
        r#"
        [coordination]
        lock_retry_interval = "5ms"
        lock_retry_times = 200

        [deletion]
        batch_size = 4
        purge_concurrency = 2
        "#,
    )
    .unwrap();
    let d = Deployment::from_settings(settings, "c1", 9);
    let cell = CellId::new("c1");
    let held = d
        .service
        .lock(&cell, &ResourcePath::cell(), "export")
        .await
        .unwrap();

    let handle = d.runner.spawn(Cell::new("c1", "unit-a"));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!handle.is_finished());
    d.service.release(held).await.unwrap();

    let report = handle.wait().await.unwrap();
    assert_eq!(report.removed, 9);
    assert_eq!(report.pages, 3);
}
