//! Integration tests for the CryptHub session and entry store.

use crypthub::crypto::Argon2Params;
use crypthub::errors::CryptHubError;
use crypthub::vault::{AuthSession, EntryFields, VaultStore, DEFAULT_CATEGORY};
use tempfile::TempDir;

const PASSWORD: &[u8] = b"correct-horse-42";

fn fast() -> Argon2Params {
    Argon2Params {
        memory_kib: 8192,
        iterations: 1,
        parallelism: 1,
    }
}

fn fields(label: &str, secret: &str) -> EntryFields {
    EntryFields {
        label: label.to_string(),
        secret: secret.to_string(),
        ..EntryFields::default()
    }
}

/// Helper: an in-memory store with an initialized, unlocked session.
fn unlocked() -> (VaultStore, AuthSession) {
    let store = VaultStore::open_in_memory().unwrap();
    let mut session = AuthSession::new(fast());
    session.initialize(store.db(), PASSWORD).unwrap();
    (store, session)
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[test]
fn initialize_unlocks_and_stores_credential() {
    let (store, session) = unlocked();
    assert!(session.is_unlocked());
    assert!(session.has_master_credential(store.db()).unwrap());

    let credential = store.db().load_master().unwrap().unwrap();
    assert_eq!(credential.verification_hash.len(), 64);
    assert_eq!(credential.salt.len(), 32);
}

#[test]
fn second_initialize_is_rejected() {
    let (store, mut session) = unlocked();
    let before = store.db().load_master().unwrap();

    let err = session.initialize(store.db(), b"another-password").unwrap_err();
    assert!(matches!(err, CryptHubError::AlreadyInitialized));
    assert_eq!(store.db().load_master().unwrap(), before);
}

#[test]
fn unlock_without_credential_fails() {
    let store = VaultStore::open_in_memory().unwrap();
    let mut session = AuthSession::new(fast());
    let err = session.unlock(store.db(), PASSWORD).unwrap_err();
    assert!(matches!(err, CryptHubError::NoCredential));
    assert!(!session.is_unlocked());
}

#[test]
fn wrong_password_leaves_session_locked() {
    let (store, mut session) = unlocked();
    session.lock();

    let err = session.unlock(store.db(), b"wrong-password").unwrap_err();
    assert!(matches!(err, CryptHubError::WrongPassword));
    assert!(!session.is_unlocked());

    session.unlock(store.db(), PASSWORD).unwrap();
    assert!(session.is_unlocked());
}

#[test]
fn lock_is_idempotent() {
    let (_store, mut session) = unlocked();
    session.lock();
    session.lock();
    assert!(!session.is_unlocked());
    assert!(matches!(session.key(), Err(CryptHubError::VaultLocked)));
}

#[test]
fn reopened_file_vault_unlocks_with_same_password() {
    let dir = TempDir::new().unwrap();
    {
        let store = VaultStore::open(dir.path()).unwrap();
        let mut session = AuthSession::new(fast());
        session.initialize(store.db(), PASSWORD).unwrap();
        store.add(&session, &fields("Mail", "hunter2")).unwrap();
    }

    let store = VaultStore::open(dir.path()).unwrap();
    let mut session = AuthSession::new(fast());
    session.unlock(store.db(), PASSWORD).unwrap();

    let entries = store.list(&session).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].as_ref().unwrap().secret, "hunter2");
}

// ---------------------------------------------------------------------------
// Entry CRUD
// ---------------------------------------------------------------------------

#[test]
fn locked_session_refuses_every_operation() {
    let (store, mut session) = unlocked();
    let id = store.add(&session, &fields("Mail", "hunter2")).unwrap();
    session.lock();

    assert!(matches!(store.list(&session), Err(CryptHubError::VaultLocked)));
    assert!(matches!(store.get(&session, id), Err(CryptHubError::VaultLocked)));
    assert!(matches!(
        store.add(&session, &fields("Bank", "x")),
        Err(CryptHubError::VaultLocked)
    ));
    assert!(matches!(
        store.update(&session, id, &fields("Mail", "y")),
        Err(CryptHubError::VaultLocked)
    ));
    assert!(matches!(store.delete(&session, id), Err(CryptHubError::VaultLocked)));
}

#[test]
fn add_applies_defaults() {
    let (store, session) = unlocked();
    let id = store.add(&session, &fields("Mail", "hunter2")).unwrap();

    let entry = store.get(&session, id).unwrap();
    assert_eq!(entry.label, "Mail");
    assert_eq!(entry.username, "");
    assert_eq!(entry.category, DEFAULT_CATEGORY);
    assert_eq!(entry.notes, "");
    assert_eq!(entry.created_at, entry.updated_at);
}

#[test]
fn secrets_are_not_stored_in_plaintext() {
    let (store, session) = unlocked();
    store.add(&session, &fields("Mail", "plain-secret-value")).unwrap();

    let rows = store.db().select_entries().unwrap();
    assert_eq!(rows.len(), 1);
    assert_ne!(rows[0].secret_data, b"plain-secret-value".to_vec());
    assert_eq!(rows[0].secret_iv.len(), 12);
    assert_eq!(rows[0].secret_tag.len(), 16);
}

#[test]
fn list_is_sorted_by_category_then_label() {
    let (store, session) = unlocked();
    for (label, category) in [("Zeta", "Work"), ("Alpha", "Work"), ("Bank", "Finance")] {
        let mut f = fields(label, "s");
        f.category = Some(category.to_string());
        store.add(&session, &f).unwrap();
    }

    let labels: Vec<String> = store
        .list(&session)
        .unwrap()
        .into_iter()
        .map(|e| e.unwrap().label)
        .collect();
    assert_eq!(labels, ["Bank", "Alpha", "Zeta"]);
}

#[test]
fn update_reencrypts_with_fresh_nonce() {
    let (store, session) = unlocked();
    let id = store.add(&session, &fields("Mail", "old")).unwrap();
    let before = store.db().select_entry(id).unwrap().unwrap();

    let mut f = fields("Mail", "new");
    f.username = Some("me@example.com".into());
    store.update(&session, id, &f).unwrap();

    let after = store.db().select_entry(id).unwrap().unwrap();
    assert_ne!(before.secret_iv, after.secret_iv);

    let entry = store.get(&session, id).unwrap();
    assert_eq!(entry.secret, "new");
    assert_eq!(entry.username, "me@example.com");
    assert!(entry.updated_at >= entry.created_at);
}

#[test]
fn update_and_delete_missing_entry_fail() {
    let (store, session) = unlocked();
    assert!(matches!(
        store.update(&session, 999, &fields("X", "y")),
        Err(CryptHubError::EntryNotFound(999))
    ));
    assert!(matches!(
        store.delete(&session, 999),
        Err(CryptHubError::EntryNotFound(999))
    ));
}

#[test]
fn delete_removes_entry() {
    let (store, session) = unlocked();
    let id = store.add(&session, &fields("Mail", "hunter2")).unwrap();
    store.delete(&session, id).unwrap();
    assert_eq!(store.db().entry_count().unwrap(), 0);
    assert!(matches!(
        store.get(&session, id),
        Err(CryptHubError::EntryNotFound(_))
    ));
}

#[test]
fn empty_label_is_rejected() {
    let (store, session) = unlocked();
    assert!(store.add(&session, &fields("", "x")).is_err());
    assert_eq!(store.db().entry_count().unwrap(), 0);
}

#[test]
fn corrupted_record_is_reported_without_hiding_others() {
    let (store, session) = unlocked();
    let good = store.add(&session, &fields("Alpha", "one")).unwrap();
    let bad = store.add(&session, &fields("Beta", "two")).unwrap();

    store
        .db()
        .connection()
        .execute(
            "UPDATE entries SET secret_data = X'00112233' WHERE id = ?1",
            [bad],
        )
        .unwrap();

    let entries = store.list(&session).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].as_ref().unwrap().id, good);
    assert!(matches!(entries[1], Err(CryptHubError::DataCorruption(id)) if id == bad));
}

#[test]
fn unreadable_timestamp_is_reported_per_record() {
    let (store, session) = unlocked();
    let good = store.add(&session, &fields("Alpha", "one")).unwrap();
    let bad = store.add(&session, &fields("Beta", "two")).unwrap();

    store
        .db()
        .connection()
        .execute(
            "UPDATE entries SET updated_at = 'not a timestamp' WHERE id = ?1",
            [bad],
        )
        .unwrap();

    let entries = store.list(&session).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].as_ref().unwrap().id, good);
    assert!(matches!(entries[1], Err(CryptHubError::DataCorruption(id)) if id == bad));
    assert!(matches!(
        store.get(&session, bad),
        Err(CryptHubError::DataCorruption(_))
    ));
}
