//! Coordination primitive specs
//!
//! Verify lock exclusion, usage counting, and administrative reset through
//! the service shared by a whole deployment.

use crate::prelude::*;

fn box_path() -> ResourcePath {
    ResourcePath::new(["box-1", "dav"])
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_writer_holds_a_resource_at_a_time() {
    let d = Deployment::from_settings(quick_settings(), "c1", 0);
    let cell = CellId::new("c1");

    let first = d
        .service
        .lock(&cell, &box_path(), "write")
        .await
        .unwrap();
    let contender = d.service.lock(&cell, &box_path(), "write").await;
    assert!(matches!(
        contender,
        Err(CoordinationError::LockTimeout { .. })
    ));

    d.service.release(first).await.unwrap();
    let second = d.service.lock(&cell, &box_path(), "write").await.unwrap();
    let holder = d.service.lock_holder(&cell, &box_path()).await.unwrap();
    assert_eq!(holder.as_ref(), Some(second.token()));
}

#[tokio::test]
async fn locks_on_different_cells_do_not_contend() {
    let d = Deployment::with_cell("c1", 0);

    let a = d
        .service
        .try_lock(&CellId::new("c1"), &box_path(), "write")
        .await
        .unwrap();
    let b = d
        .service
        .try_lock(&CellId::new("c2"), &box_path(), "write")
        .await
        .unwrap();

    assert!(a.is_some());
    assert!(b.is_some());
}

#[tokio::test]
async fn usage_counter_returns_to_absent() {
    let d = Deployment::with_cell("c1", 0);
    let cell = CellId::new("c1");
    let path = box_path().child("file.txt");

    let acquire = || d.service.acquire_usage(&cell, &path);
    assert_eq!(acquire().await.unwrap(), CounterValue::Positive(1));
    assert_eq!(acquire().await.unwrap(), CounterValue::Positive(2));

    let release = || d.service.release_usage(&cell, &path);
    assert_eq!(release().await.unwrap(), CounterValue::Positive(1));
    assert_eq!(release().await.unwrap(), CounterValue::Zero);
    assert_eq!(
        d.service.usage(&cell, &path).await.unwrap(),
        CounterValue::Absent
    );
    assert!(d.backend.is_empty());
}

#[tokio::test]
async fn reset_clears_every_category() {
    let d = Deployment::with_cell("c1", 0);
    let cell = CellId::new("c1");
    let _held = d.service.try_lock(&cell, &box_path(), "write").await.unwrap();
    d.service.acquire_usage(&cell, &box_path()).await.unwrap();
    d.service
        .set_cell_status(&cell, CellStatus::Importing)
        .await
        .unwrap();
    d.service.lock_account("alice").await.unwrap();
    d.service
        .claim_unit_user("owner-1", "node-a", Duration::from_secs(60))
        .await
        .unwrap();
    assert!(!d.backend.is_empty());

    d.service.reset().await.unwrap();

    assert!(d.backend.is_empty());
    assert_eq!(d.service.cell_status(&cell).await.unwrap(), CellStatus::Normal);
    assert!(!d.service.is_account_locked("alice").await.unwrap());
    assert!(d
        .service
        .try_lock(&cell, &box_path(), "write")
        .await
        .unwrap()
        .is_some());
}
