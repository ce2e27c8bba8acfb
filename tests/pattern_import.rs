use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::TempDir;

use cms_provision::api::{ImportRecord, MockAccountApi, UploadTicket};
use cms_provision::config::PollPolicy;
use cms_provision::error::ProvisionError;
use cms_provision::pattern::upload_pattern;

fn fast_poll() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(1),
        max_attempts: 10,
    }
}

fn pattern_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("shapes.json"), b"{\"post\":{}}").unwrap();
    fs::write(dir.path().join("content.json"), b"[]").unwrap();
    dir
}

fn record(status: &str, message: Option<&str>) -> ImportRecord {
    ImportRecord {
        status: status.to_string(),
        message: message.map(str::to_string),
    }
}

/// Sets up the ticket request and archive transfer shared by every polling
/// scenario. The transferred bytes must be a zip archive.
fn expect_transfer(account: &mut MockAccountApi) {
    account
        .expect_begin_pattern_import()
        .times(1)
        .returning(|_| {
            Ok(UploadTicket {
                uri: "https://uploads.example.test/one-time".to_string(),
                import_id: "imp-1".to_string(),
            })
        });
    account
        .expect_upload_archive()
        .withf(|uri, bytes| {
            uri == "https://uploads.example.test/one-time" && bytes.starts_with(b"PK")
        })
        .times(1)
        .returning(|_, _| Ok(()));
}

#[tokio::test]
async fn polling_stops_at_completed_after_exactly_three_checks() {
    let dir = pattern_dir();
    let mut account = MockAccountApi::new();
    expect_transfer(&mut account);

    // The times(3) bound holds both ways: a fourth poll panics, and stopping
    // early fails verification.
    let checks = AtomicUsize::new(0);
    account.expect_fetch_import().times(3).returning(move |_| {
        let status = match checks.fetch_add(1, Ordering::SeqCst) {
            0 | 1 => "running",
            _ => "completed",
        };
        Ok(Some(record(status, None)))
    });

    upload_pattern(&account, "proj-1", dir.path(), &fast_poll())
        .await
        .expect("Import should complete");
}

#[tokio::test]
async fn missing_job_record_counts_as_still_running() {
    let dir = pattern_dir();
    let mut account = MockAccountApi::new();
    expect_transfer(&mut account);

    let checks = AtomicUsize::new(0);
    account.expect_fetch_import().times(2).returning(move |_| {
        if checks.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(None)
        } else {
            Ok(Some(record("completed", None)))
        }
    });

    upload_pattern(&account, "proj-1", dir.path(), &fast_poll())
        .await
        .expect("Import should complete after the record shows up");
}

#[tokio::test]
async fn error_status_carries_the_server_message() {
    let dir = pattern_dir();
    let mut account = MockAccountApi::new();
    expect_transfer(&mut account);
    account
        .expect_fetch_import()
        .times(1)
        .returning(|_| Ok(Some(record("error", Some("bad zip")))));

    let err = upload_pattern(&account, "proj-1", dir.path(), &fast_poll())
        .await
        .expect_err("Import should fail");

    assert!(matches!(&err, ProvisionError::ImportFailed(m) if m == "bad zip"));
}

#[tokio::test]
async fn error_status_without_message_uses_fixed_fallback() {
    let dir = pattern_dir();
    let mut account = MockAccountApi::new();
    expect_transfer(&mut account);
    account
        .expect_fetch_import()
        .times(1)
        .returning(|_| Ok(Some(record("error", None))));

    let err = upload_pattern(&account, "proj-1", dir.path(), &fast_poll())
        .await
        .expect_err("Import should fail");

    assert_eq!(err.to_string(), "Pattern import failed");
}

#[tokio::test]
async fn timeout_status_fails_with_fixed_message() {
    let dir = pattern_dir();
    let mut account = MockAccountApi::new();
    expect_transfer(&mut account);
    account
        .expect_fetch_import()
        .times(1)
        .returning(|_| Ok(Some(record("timeout", None))));

    let err = upload_pattern(&account, "proj-1", dir.path(), &fast_poll())
        .await
        .expect_err("Import should fail");

    assert!(matches!(err, ProvisionError::ImportTimedOut));
    assert_eq!(err.to_string(), "Pattern import timed out");
}

#[tokio::test]
async fn unrecognized_status_fails_naming_the_value() {
    let dir = pattern_dir();
    let mut account = MockAccountApi::new();
    expect_transfer(&mut account);
    account
        .expect_fetch_import()
        .times(1)
        .returning(|_| Ok(Some(record("frozen", None))));

    let err = upload_pattern(&account, "proj-1", dir.path(), &fast_poll())
        .await
        .expect_err("Import should fail");

    assert_eq!(err.to_string(), "Unexpected pattern import status: frozen");
}

#[tokio::test]
async fn exhausted_polling_budget_is_a_distinct_error() {
    let dir = pattern_dir();
    let mut account = MockAccountApi::new();
    expect_transfer(&mut account);
    // Always running: the local budget, not the server, ends the wait.
    account
        .expect_fetch_import()
        .times(10)
        .returning(|_| Ok(Some(record("running", None))));

    let err = upload_pattern(&account, "proj-1", dir.path(), &fast_poll())
        .await
        .expect_err("Import should fail once the budget is spent");

    assert!(matches!(
        err,
        ProvisionError::ImportBudgetExhausted { attempts: 10 }
    ));
}
