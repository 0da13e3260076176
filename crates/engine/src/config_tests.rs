// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cg_core::ExpiryPolicy;
use std::io::Write;
use std::time::Duration;

#[test]
fn empty_document_uses_defaults() {
    let settings = Settings::from_toml_str("").unwrap();

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.deletion.batch_size, 1000);
    assert_eq!(settings.deletion.purge_concurrency, 1);
}

#[test]
fn sections_override_defaults() {
    let settings = Settings::from_toml_str(
        r#"
        [coordination]
        lock_retry_interval = "10ms"
        expiry = "lazy"

        [deletion]
        batch_size = 250
        purge_concurrency = 8
        "#,
    )
    .unwrap();

    assert_eq!(
        settings.coordination.lock_retry_interval,
        Duration::from_millis(10)
    );
    assert_eq!(settings.coordination.expiry, ExpiryPolicy::Lazy);
    assert_eq!(
        settings.deletion,
        DeletionConfig::default()
            .with_batch_size(250)
            .with_purge_concurrency(8)
    );
}

#[yare::parameterized(
    zero_batch = { "[deletion]\nbatch_size = 0", "batch_size" },
    zero_concurrency = { "[deletion]\npurge_concurrency = 0", "purge_concurrency" },
    zero_retries = { "[coordination]\nlock_retry_times = 0", "lock_retry_times" },
)]
fn zero_values_are_rejected(text: &str, field: &str) {
    match Settings::from_toml_str(text) {
        Err(ConfigError::Invalid { field: got, .. }) => assert_eq!(got, field),
        other => panic!("expected invalid {field}, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let err = Settings::from_toml_str("[deletoin]\nbatch_size = 5").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[deletion]\nbatch_size = 42").unwrap();

    let settings = Settings::load(file.path()).unwrap();

    assert_eq!(settings.deletion.batch_size, 42);
}

#[test]
fn load_reports_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");

    let err = Settings::load(&path).unwrap_err();

    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("missing.toml"));
}
