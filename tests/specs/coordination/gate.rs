//! Cell gate specs
//!
//! Verify which requests a cell admits in each status.

use crate::prelude::*;

#[tokio::test]
async fn normal_cell_admits_everything() {
    let d = Deployment::with_cell("c1", 0);
    let cell = CellId::new("c1");

    for access in [Access::Read, Access::Write, Access::Delete] {
        d.gate.check(&cell, access).await.unwrap();
    }
}

#[tokio::test]
async fn exporting_cell_admits_reads_only() {
    let d = Deployment::with_cell("c1", 0);
    let cell = CellId::new("c1");
    d.service
        .set_cell_status(&cell, CellStatus::Exporting)
        .await
        .unwrap();

    d.gate.check(&cell, Access::Read).await.unwrap();
    assert!(matches!(
        d.gate.check(&cell, Access::Write).await,
        Err(CoordinationError::CellBusy { .. })
    ));
}

#[tokio::test]
async fn writes_are_refused_while_a_deletion_is_stuck() {
    let d = Deployment::with_cell("c1", 2);
    d.storage.fail_bulk_remove();
    let cell = CellId::new("c1");

    let err = d
        .runner
        .spawn(Cell::new("c1", "unit-a"))
        .wait()
        .await
        .unwrap_err();
    assert!(matches!(err, DeletionError::EntityPurge { .. }));

    for access in [Access::Read, Access::Write, Access::Delete] {
        assert!(matches!(
            d.gate.check(&cell, access).await,
            Err(CoordinationError::CellBeingDeleted(_))
        ));
    }
    assert!(matches!(
        d.service
            .lock_cell_resource(&cell, &ResourcePath::new(["box-1"]), "write")
            .await,
        Err(CoordinationError::CellBeingDeleted(_))
    ));
}
