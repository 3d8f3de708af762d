mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::TempDir;

use common::{FakeRemote, FlakyStore, ReadOnlyStore};
use loanapp::cache::{CacheError, FileStore, KeyValueStore, MemoryStore, LOANS_CACHE_KEY};
use loanapp::models::sample_loans;
use loanapp::remote::{RemoteError, TimestampField};
use loanapp::{Connectivity, LoanInput, LoanStatus, OfflineLoanCache, Session};

fn session() -> Session {
    Session::new("user-1")
}

async fn cache_with(loans: &[(f64, &str)]) -> OfflineLoanCache {
    let cache = OfflineLoanCache::new(MemoryStore::new());
    for (amount, purpose) in loans {
        cache
            .add_loan_offline(&LoanInput::new(*amount, *purpose))
            .await
            .unwrap();
    }
    cache
}

#[tokio::test]
async fn test_offline_loan_is_synced_once_online() {
    let cache = cache_with(&[(250.0, "repair")]).await;

    let cached = cache.get_cached_loans().await.unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].amount, 250.0);
    assert_eq!(cached[0].purpose, "repair");
    assert_eq!(cached[0].status, LoanStatus::Pending);
    assert!(cached[0].offline);

    let remote = FakeRemote::new();
    let report = cache
        .sync_loans(&session(), Connectivity::Online, &remote)
        .await
        .unwrap();
    assert_eq!(report.pending, 1);
    assert_eq!(report.synced, 1);
    assert_eq!(report.remaining(), 0);

    let docs = remote.accepted();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].user_id, "user-1");
    assert_eq!(docs[0].amount, 250.0);
    assert_eq!(docs[0].purpose, "repair");
    assert_eq!(docs[0].status, LoanStatus::Pending);
    assert_eq!(docs[0].created_at, TimestampField::ServerTimestamp);

    let cached = cache.get_cached_loans().await.unwrap();
    assert_eq!(cached.len(), 1);
    assert!(!cached[0].offline);
    assert_eq!(cached[0].id.as_deref(), Some("remote-1"));
}

#[tokio::test]
async fn test_second_pass_writes_nothing() {
    let cache = cache_with(&[(100.0, "rent"), (200.0, "tuition")]).await;
    let remote = FakeRemote::new();

    cache
        .sync_loans(&session(), Connectivity::Online, &remote)
        .await
        .unwrap();
    let after_first = cache.get_cached_loans().await.unwrap();

    let report = cache
        .sync_loans(&session(), Connectivity::Online, &remote)
        .await
        .unwrap();

    assert!(report.ran);
    assert_eq!(report.pending, 0);
    assert_eq!(remote.calls(), 2);
    assert_eq!(cache.get_cached_loans().await.unwrap(), after_first);
}

#[tokio::test]
async fn test_failure_on_first_record_keeps_all_offline() {
    let cache = cache_with(&[(1.0, "a"), (2.0, "b"), (3.0, "c")]).await;
    let remote = FakeRemote::failing_on([0]);

    let result = cache
        .sync_loans(&session(), Connectivity::Online, &remote)
        .await;
    assert!(matches!(
        result,
        Err(CacheError::Remote(RemoteError::Status { status: 503, .. }))
    ));
    assert_eq!(remote.calls(), 1);
    assert!(remote.accepted().is_empty());
    assert!(cache
        .get_cached_loans()
        .await
        .unwrap()
        .iter()
        .all(|l| l.offline));

    // The next pass succeeds and submits each record exactly once.
    let report = cache
        .sync_loans(&session(), Connectivity::Online, &remote)
        .await
        .unwrap();
    assert_eq!(report.synced, 3);

    let purposes: Vec<_> = remote.accepted().into_iter().map(|d| d.purpose).collect();
    assert_eq!(purposes, vec!["a", "b", "c"]);
    assert!(cache
        .get_cached_loans()
        .await
        .unwrap()
        .iter()
        .all(|l| !l.offline));
}

#[tokio::test]
async fn test_failure_mid_pass_keeps_earlier_successes() {
    let cache = cache_with(&[(1.0, "a"), (2.0, "b"), (3.0, "c")]).await;
    let remote = FakeRemote::failing_on([1]);

    let result = cache
        .sync_loans(&session(), Connectivity::Online, &remote)
        .await;
    assert!(matches!(result, Err(CacheError::Remote(_))));

    let cached = cache.get_cached_loans().await.unwrap();
    let flags: Vec<_> = cached.iter().map(|l| l.offline).collect();
    assert_eq!(flags, vec![false, true, true]);
    assert_eq!(remote.accepted().len(), 1);

    remote.clear_failures();
    let report = cache
        .sync_loans(&session(), Connectivity::Online, &remote)
        .await
        .unwrap();
    assert_eq!(report.pending, 2);
    assert_eq!(report.synced, 2);

    let purposes: Vec<_> = remote.accepted().into_iter().map(|d| d.purpose).collect();
    assert_eq!(purposes, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_synced_and_sample_records_are_untouched() {
    let cache = OfflineLoanCache::new(MemoryStore::new());
    let mut synced = loanapp::LoanRecord::new_offline(&LoanInput::new(40.0, "bike"));
    synced.offline = false;
    synced.id = Some("remote-old".to_string());

    let mut contents = vec![synced];
    contents.extend(sample_loans());
    cache.cache_loans(contents.clone()).await.unwrap();

    let remote = FakeRemote::new();
    let report = cache
        .sync_loans(&session(), Connectivity::Online, &remote)
        .await
        .unwrap();

    assert_eq!(report.pending, 0);
    assert_eq!(remote.calls(), 0);
    assert_eq!(cache.get_cached_loans().await.unwrap(), contents);
}

#[tokio::test]
async fn test_offline_pass_does_nothing() {
    let cache = cache_with(&[(250.0, "repair")]).await;
    let remote = FakeRemote::new();

    let report = cache
        .sync_loans(&session(), Connectivity::Offline, &remote)
        .await
        .unwrap();

    assert!(!report.ran);
    assert_eq!(remote.calls(), 0);
    assert!(cache.get_cached_loans().await.unwrap()[0].offline);
}

#[tokio::test]
async fn test_loan_added_during_sync_survives() {
    let cache = cache_with(&[(10.0, "first")]).await;
    let (remote, entered, release) = FakeRemote::gated();
    let remote = Arc::new(remote);

    let pass = {
        let cache = cache.clone();
        let remote = remote.clone();
        tokio::spawn(async move {
            cache
                .sync_loans(&session(), Connectivity::Online, remote.as_ref())
                .await
        })
    };

    entered.notified().await;
    cache
        .add_loan_offline(&LoanInput::new(20.0, "second"))
        .await
        .unwrap();
    release.add_permits(1);

    let report = pass.await.unwrap().unwrap();
    assert_eq!(report.synced, 1);

    let cached = cache.get_cached_loans().await.unwrap();
    assert_eq!(cached.len(), 2);
    assert_eq!(cached[0].purpose, "first");
    assert!(!cached[0].offline);
    assert_eq!(cached[1].purpose, "second");
    assert!(cached[1].offline);

    release.add_permits(1);
    let report = cache
        .sync_loans(&session(), Connectivity::Online, remote.as_ref())
        .await
        .unwrap();
    assert_eq!(report.synced, 1);
    assert_eq!(remote.accepted().len(), 2);
}

#[tokio::test]
async fn test_concurrent_passes_submit_each_record_once() {
    let cache = cache_with(&[(1.0, "a"), (2.0, "b"), (3.0, "c")]).await;
    let remote = Arc::new(FakeRemote::new());

    let passes: Vec<_> = (0..4)
        .map(|_| {
            let cache = cache.clone();
            let remote = remote.clone();
            tokio::spawn(async move {
                cache
                    .sync_loans(&session(), Connectivity::Online, remote.as_ref())
                    .await
            })
        })
        .collect();

    let mut synced = 0;
    for pass in passes {
        synced += pass.await.unwrap().unwrap().synced;
    }

    assert_eq!(synced, 3);
    assert_eq!(remote.accepted().len(), 3);
}

#[tokio::test]
async fn test_legacy_record_without_local_id_is_synced() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(temp_dir.path());
    store
        .set(
            LOANS_CACHE_KEY,
            r#"[{"amount":500,"purpose":"laptop","status":"pending","createdAt":"2025-03-01T09:30:00Z","offline":true}]"#,
        )
        .await
        .unwrap();

    let cache = OfflineLoanCache::new(store);
    let remote = FakeRemote::new();
    let report = cache
        .sync_loans(&session(), Connectivity::Online, &remote)
        .await
        .unwrap();

    assert_eq!(report.synced, 1);
    assert_eq!(remote.accepted()[0].purpose, "laptop");

    let cached = cache.get_cached_loans().await.unwrap();
    assert!(!cached[0].offline);
    assert!(cached[0].local_id.is_some());
}

#[tokio::test]
async fn test_storage_failure_is_reported() {
    let cache = OfflineLoanCache::new(ReadOnlyStore);

    let result = cache
        .add_loan_offline(&LoanInput::new(250.0, "repair"))
        .await;
    assert!(matches!(result, Err(CacheError::Storage(_))));

    let result = cache.cache_loans(sample_loans()).await;
    assert!(matches!(result, Err(CacheError::Storage(_))));
}

#[tokio::test]
async fn test_unreadable_entry_does_not_destroy_offline_loans() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(temp_dir.path());
    let raw = r#"[{"amount":250,"purpose":"repair","status":"pending","createdAt":"2025-03-01T09:30:00Z","offline":true},{"amount":10,"purpose":"odd","status":"cancelled","createdAt":"2025-03-01T09:30:00Z","offline":true}]"#;
    store.set(LOANS_CACHE_KEY, raw).await.unwrap();
    let backup_path = store.path(&format!("{}.corrupt", LOANS_CACHE_KEY));

    let cache = OfflineLoanCache::new(store);
    cache
        .add_loan_offline(&LoanInput::new(90.0, "new"))
        .await
        .unwrap();

    let cached = cache.get_cached_loans().await.unwrap();
    let purposes: Vec<_> = cached.iter().map(|l| l.purpose.as_str()).collect();
    assert_eq!(purposes, vec!["repair", "new"]);
    assert!(cached.iter().all(|l| l.offline));
    assert_eq!(std::fs::read_to_string(backup_path).unwrap(), raw);

    let remote = FakeRemote::new();
    let report = cache
        .sync_loans(&session(), Connectivity::Online, &remote)
        .await
        .unwrap();
    assert_eq!(report.synced, 2);
}

#[tokio::test]
async fn test_storage_failure_after_remote_failure_is_returned() {
    let (store, fail_writes) = FlakyStore::new();
    let cache = OfflineLoanCache::new(store);
    for purpose in ["a", "b"] {
        cache
            .add_loan_offline(&LoanInput::new(5.0, purpose))
            .await
            .unwrap();
    }

    fail_writes.store(true, Ordering::SeqCst);
    let remote = FakeRemote::failing_on([1]);
    let result = cache
        .sync_loans(&session(), Connectivity::Online, &remote)
        .await;

    assert!(matches!(result, Err(CacheError::Storage(_))));
    assert_eq!(remote.accepted().len(), 1);
    assert!(cache
        .get_cached_loans()
        .await
        .unwrap()
        .iter()
        .all(|l| l.offline));
}
