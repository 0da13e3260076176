// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn fake_binary_remove_is_idempotent() {
    let store = FakeBinaryStore::new().with_objects(["a", "b"]);

    store.remove("a").await.unwrap();
    store.remove("a").await.unwrap();

    assert_eq!(store.objects(), vec!["b"]);
    assert_eq!(store.removals(), vec!["a", "a"]);
}

#[tokio::test]
async fn fake_binary_injected_failure_keeps_object() {
    let store = FakeBinaryStore::new().with_objects(["a"]);
    store.fail_on("a");

    let err = store.remove("a").await.unwrap_err();

    assert!(err.to_string().contains("object a"));
    assert_eq!(store.objects(), vec!["a"]);
}
