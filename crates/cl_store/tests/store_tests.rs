//! Integration tests for the owner-scoped encrypted record store.
//!
//! Tests cover:
//!  1. Round-trip save/load with owner isolation
//!  2. Wrong-key loads failing loudly
//!  3. Uniqueness tuple enforcement on insert and edit
//!  4. Update-in-place and cross-owner update refusal
//!  5. Owner-constrained delete
//!  6. Structural setting keys and upsert
//!  7. Register/login key re-derivation end to end
//!  8. Pepper mismatch making ciphertext unreadable
//!  9. reset_all

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use tempfile::TempDir;

use cl_crypto::{CryptoError, Pepper, RecordKey};
use cl_proto::record::{Payload, RecordType};
use cl_proto::SettingKey;
use cl_store::{records, session, settings, Session, Store, StoreError};

async fn open_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("test.db")).await.unwrap();
    (dir, store)
}

fn test_session(owner: &str, key_byte: u8) -> Session {
    Session::new(owner, RecordKey([key_byte; 32]))
}

fn glucose_payload(value: f64) -> Payload {
    match json!({ "value_mg_dl": value, "context": "fasting", "notes": "" }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
}

// ─── Round-trip and owner isolation ─────────────────────────────────────────

#[tokio::test]
async fn save_load_roundtrip_is_owner_scoped() {
    let (_dir, store) = open_store().await;
    let alice = test_session("P1", 1);
    let bob = test_session("P2", 2);

    records::save(&store, &alice, &RecordType::Glucose, at(8), &glucose_payload(90.0), None)
        .await
        .unwrap();
    records::save(&store, &alice, &RecordType::Glucose, at(12), &glucose_payload(140.0), None)
        .await
        .unwrap();
    // Same triple as alice's first record — different owner, so allowed.
    records::save(&store, &bob, &RecordType::Glucose, at(8), &glucose_payload(200.0), None)
        .await
        .unwrap();

    let loaded = records::load(&store, &alice, Some(&RecordType::Glucose)).await.unwrap();
    assert_eq!(loaded.len(), 2);
    // Newest recorded_at first.
    assert_eq!(loaded[0].recorded_at, at(12));
    assert_eq!(loaded[0].number("value_mg_dl"), Some(140.0));
    assert!(loaded.iter().all(|r| r.owner == "P1"));

    let bobs = records::load(&store, &bob, None).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].number("value_mg_dl"), Some(200.0));
}

#[tokio::test]
async fn load_with_wrong_key_fails_loudly() {
    let (_dir, store) = open_store().await;
    let alice = test_session("P1", 1);
    records::save(&store, &alice, &RecordType::Glucose, at(8), &glucose_payload(90.0), None)
        .await
        .unwrap();

    // Same owner, different key: must be an authentication error, never an
    // empty result.
    let wrong = test_session("P1", 9);
    assert!(matches!(
        records::load(&store, &wrong, Some(&RecordType::Glucose)).await,
        Err(StoreError::Crypto(CryptoError::Authentication))
    ));
}

// ─── Uniqueness tuple ───────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_triple_is_rejected_on_insert_and_edit() {
    let (_dir, store) = open_store().await;
    let alice = test_session("P1", 1);

    let first = records::save(&store, &alice, &RecordType::Glucose, at(8), &glucose_payload(90.0), None)
        .await
        .unwrap();
    let second = records::save(&store, &alice, &RecordType::Glucose, at(9), &glucose_payload(95.0), None)
        .await
        .unwrap();

    // Second insert at an occupied triple.
    assert!(matches!(
        records::save(&store, &alice, &RecordType::Glucose, at(8), &glucose_payload(91.0), None).await,
        Err(StoreError::Duplicate { .. })
    ));

    // Editing a record onto another record's triple.
    assert!(matches!(
        records::save(&store, &alice, &RecordType::Glucose, at(8), &glucose_payload(95.0), Some(second)).await,
        Err(StoreError::Duplicate { .. })
    ));

    // Editing a record that keeps its own triple succeeds.
    records::save(&store, &alice, &RecordType::Glucose, at(8), &glucose_payload(88.0), Some(first))
        .await
        .unwrap();

    assert!(records::has_duplicate(&store, "P1", &RecordType::Glucose, at(8), None).await.unwrap());
    assert!(!records::has_duplicate(&store, "P1", &RecordType::Glucose, at(8), Some(first)).await.unwrap());
    // Different type at the same timestamp is a different identity.
    assert!(!records::has_duplicate(&store, "P1", &RecordType::Hba1c, at(8), None).await.unwrap());
}

#[tokio::test]
async fn update_in_place_and_cross_owner_refusal() {
    let (_dir, store) = open_store().await;
    let alice = test_session("P1", 1);
    let bob = test_session("P2", 2);

    let id = records::save(&store, &alice, &RecordType::Glucose, at(8), &glucose_payload(90.0), None)
        .await
        .unwrap();

    // Payload and timestamp may change atomically; the id stays.
    let same_id =
        records::save(&store, &alice, &RecordType::Glucose, at(10), &glucose_payload(120.0), Some(id))
            .await
            .unwrap();
    assert_eq!(same_id, id);

    let loaded = records::load(&store, &alice, None).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].recorded_at, at(10));
    assert_eq!(loaded[0].number("value_mg_dl"), Some(120.0));

    // Bob cannot re-save alice's record id.
    assert!(matches!(
        records::save(&store, &bob, &RecordType::Glucose, at(11), &glucose_payload(1.0), Some(id)).await,
        Err(StoreError::NotFound(_))
    ));

    // Updating a missing id is NotFound, not an insert.
    assert!(matches!(
        records::save(&store, &alice, &RecordType::Glucose, at(12), &glucose_payload(90.0), Some(999)).await,
        Err(StoreError::NotFound(_))
    ));
}

// ─── Delete scoping ─────────────────────────────────────────────────────────

#[tokio::test]
async fn owner_constrained_delete_refuses_foreign_rows() {
    let (_dir, store) = open_store().await;
    let alice = test_session("P1", 1);

    let id = records::save(&store, &alice, &RecordType::Event, at(8), &glucose_payload(0.0), None)
        .await
        .unwrap();

    // Wrong owner: no-op, record survives.
    assert!(!records::delete(&store, id, Some("P2")).await.unwrap());
    assert_eq!(records::load(&store, &alice, None).await.unwrap().len(), 1);

    // Right owner: removed.
    assert!(records::delete(&store, id, Some("P1")).await.unwrap());
    assert!(records::load(&store, &alice, None).await.unwrap().is_empty());

    // Deleting an id that is already gone reports false.
    assert!(!records::delete(&store, id, None).await.unwrap());
}

// ─── Settings ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn setting_keys_are_structural_and_upsert() {
    let (_dir, store) = open_store().await;

    let global_age = SettingKey::global("age");
    let p1_age = SettingKey::owned("P1", "age");
    let p2_age = SettingKey::owned("P2", "age");

    settings::set_setting(&store, &global_age, "0").await.unwrap();
    settings::set_setting(&store, &p1_age, "34").await.unwrap();
    settings::set_setting(&store, &p2_age, "61").await.unwrap();

    assert_eq!(settings::get_setting(&store, &global_age).await.unwrap().as_deref(), Some("0"));
    assert_eq!(settings::get_setting(&store, &p1_age).await.unwrap().as_deref(), Some("34"));
    assert_eq!(settings::get_setting(&store, &p2_age).await.unwrap().as_deref(), Some("61"));

    // Overwrite keeps no history.
    settings::set_setting(&store, &p1_age, "35").await.unwrap();
    assert_eq!(settings::get_setting(&store, &p1_age).await.unwrap().as_deref(), Some("35"));

    assert_eq!(
        settings::get_setting(&store, &SettingKey::owned("P3", "age")).await.unwrap(),
        None
    );
}

// ─── Sessions end to end ────────────────────────────────────────────────────

#[tokio::test]
async fn register_then_login_rederives_the_same_key() {
    let (_dir, store) = open_store().await;
    let pepper = Pepper::new("integration-pepper");

    let sess = session::register(&store, "p1", "Pat One", "4321", true, &pepper)
        .await
        .unwrap();
    assert_eq!(sess.owner(), "P1");

    records::save(&store, &sess, &RecordType::Glucose, at(8), &glucose_payload(90.0), None)
        .await
        .unwrap();
    drop(sess); // logout discards the key

    // Case-insensitive owner code, same PIN, fresh derivation.
    let again = session::login(&store, " p1 ", "4321", &pepper).await.unwrap();
    let loaded = records::load(&store, &again, Some(&RecordType::Glucose)).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].number("value_mg_dl"), Some(90.0));

    assert!(matches!(
        session::login(&store, "p1", "0000", &pepper).await,
        Err(StoreError::IncorrectPin)
    ));
    assert!(matches!(
        session::login(&store, "nobody", "4321", &pepper).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        session::register(&store, "P1", "Dup", "4321", true, &pepper).await,
        Err(StoreError::DuplicateOwner(_))
    ));
    // PIN shape is validated before any account state is touched.
    assert!(matches!(
        session::register(&store, "P9", "Bad Pin", "12a", true, &pepper).await,
        Err(StoreError::Proto(_))
    ));
}

#[tokio::test]
async fn records_are_unreadable_without_the_server_pepper() {
    let (_dir, store) = open_store().await;

    let sess = session::register(&store, "P1", "", "4321", true, &Pepper::new("real-pepper"))
        .await
        .unwrap();
    records::save(&store, &sess, &RecordType::Glucose, at(8), &glucose_payload(90.0), None)
        .await
        .unwrap();
    drop(sess);

    // The verification hash is pepper-independent, so login succeeds even
    // with the wrong pepper — but the derived key cannot open the records.
    // This is the "database leak alone is not enough" property.
    let wrong_env = session::login(&store, "P1", "4321", &Pepper::new("attacker-guess"))
        .await
        .unwrap();
    assert!(matches!(
        records::load(&store, &wrong_env, None).await,
        Err(StoreError::Crypto(CryptoError::Authentication))
    ));
}

// ─── reset_all ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn reset_all_wipes_records_settings_and_users() {
    let (_dir, store) = open_store().await;
    let alice = test_session("P1", 1);

    records::save(&store, &alice, &RecordType::Glucose, at(8), &glucose_payload(90.0), None)
        .await
        .unwrap();
    settings::set_setting(&store, &SettingKey::owned("P1", "age"), "34").await.unwrap();

    store.reset_all().await.unwrap();

    assert!(records::load(&store, &alice, None).await.unwrap().is_empty());
    assert_eq!(
        settings::get_setting(&store, &SettingKey::owned("P1", "age")).await.unwrap(),
        None
    );
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&store.pool)
        .await
        .unwrap();
    assert_eq!(users, 0);
}

// Isolation between owners is structural (owner-scoped queries), not lock
// based; concurrent writers for different owners must never collide.
#[tokio::test]
async fn concurrent_sessions_for_different_owners_do_not_interfere() {
    let (_dir, store) = open_store().await;
    let alice = test_session("P1", 1);
    let bob = test_session("P2", 2);

    let mut hour = 0u32;
    for _ in 0..5 {
        let payload_a = glucose_payload(90.0);
        let payload_b = glucose_payload(110.0);
        let a = records::save(&store, &alice, &RecordType::Glucose, at(hour), &payload_a, None);
        let b = records::save(&store, &bob, &RecordType::Glucose, at(hour), &payload_b, None);
        let (ra, rb) = tokio::join!(a, b);
        ra.unwrap();
        rb.unwrap();
        hour += 1;
    }

    assert_eq!(records::load(&store, &alice, None).await.unwrap().len(), 5);
    assert_eq!(records::load(&store, &bob, None).await.unwrap().len(), 5);
}

// Time math sanity for ordering: an extra record far in the past stays last.
#[tokio::test]
async fn load_orders_by_recorded_at_descending_across_days() {
    let (_dir, store) = open_store().await;
    let alice = test_session("P1", 1);

    let old = at(8) - Duration::days(30);
    records::save(&store, &alice, &RecordType::Glucose, old, &glucose_payload(80.0), None)
        .await
        .unwrap();
    records::save(&store, &alice, &RecordType::Glucose, at(8), &glucose_payload(90.0), None)
        .await
        .unwrap();

    let loaded = records::load(&store, &alice, None).await.unwrap();
    assert_eq!(loaded[0].recorded_at, at(8));
    assert_eq!(loaded[1].recorded_at, old);
}
