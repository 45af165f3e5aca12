//! Integration tests for Admin repository using in-memory SurrealDB.

use chrono::{Duration, Utc};
use perkdesk_core::error::PerkdeskError;
use perkdesk_core::lockout::AccountStatus;
use perkdesk_core::models::admin::{CreateAdmin, UpdateAdmin};
use perkdesk_core::repository::{AdminRepository, Pagination};
use perkdesk_db::repository::SurrealAdminRepository;
use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn setup() -> SurrealAdminRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    perkdesk_db::run_migrations(&db).await.unwrap();
    SurrealAdminRepository::new(db)
}

fn new_admin(name: &str) -> CreateAdmin {
    CreateAdmin {
        name: name.into(),
        email: format!("{name}@example.com"),
        password: "correct-horse-battery".into(),
        meta: None,
    }
}

#[tokio::test]
async fn create_and_get_admin() {
    let repo = setup().await;

    let admin = repo.create(new_admin("alice")).await.unwrap();

    assert_eq!(admin.name, "alice");
    assert_eq!(admin.email, "alice@example.com");
    assert_eq!(admin.lock.status, AccountStatus::Active);
    assert_eq!(admin.lock.failed_login_attempts, 0);
    assert_eq!(admin.lock.account_locked_until, None);
    assert_eq!(admin.lock.account_lock_reason, "");
    assert!(admin.last_login.is_none());
    assert!(admin.meta.is_empty());

    // Password should be hashed, not stored in plaintext.
    assert!(admin.password_hash.starts_with("$argon2id$"));

    let fetched = repo.get_by_id(admin.id).await.unwrap();
    assert_eq!(fetched.id, admin.id);

    let by_email = repo.get_by_email("alice@example.com").await.unwrap();
    assert_eq!(by_email.id, admin.id);
}

#[tokio::test]
async fn get_missing_admin_is_not_found() {
    let repo = setup().await;

    let err = repo.get_by_id(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, PerkdeskError::NotFound { .. }));

    let err = repo.get_by_email("nobody@example.com").await.unwrap_err();
    assert!(matches!(err, PerkdeskError::NotFound { .. }));
}

#[tokio::test]
async fn duplicate_email_rejected() {
    let repo = setup().await;

    repo.create(new_admin("bob")).await.unwrap();
    let err = repo.create(new_admin("bob")).await.unwrap_err();

    assert!(
        matches!(err, PerkdeskError::AlreadyExists { .. }),
        "expected AlreadyExists, got {err:?}"
    );
}

#[tokio::test]
async fn update_admin_fields_and_meta() {
    let repo = setup().await;
    let admin = repo.create(new_admin("carol")).await.unwrap();

    let meta = json!({ "department": "ops", "dashboards": [1, 2] });
    let updated = repo
        .update(
            admin.id,
            UpdateAdmin {
                name: Some("Carol Ops".into()),
                meta: meta.as_object().cloned(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Carol Ops");
    assert_eq!(updated.email, "carol@example.com");
    assert_eq!(updated.meta.get("department"), Some(&json!("ops")));
}

#[tokio::test]
async fn save_lock_state_round_trips_lock_fields() {
    let repo = setup().await;
    let admin = repo.create(new_admin("dave")).await.unwrap();

    let until = Utc::now() + Duration::hours(2);
    let mut lock = admin.lock.clone();
    lock.record_failed_login();
    lock.lock("manual review", Some(until));

    let saved = repo.save_lock_state(admin.id, &lock).await.unwrap();
    assert_eq!(saved.lock.status, AccountStatus::Inactive);
    assert_eq!(saved.lock.account_lock_reason, "manual review");
    assert_eq!(saved.lock.failed_login_attempts, 1);
    assert_eq!(
        saved.lock.account_locked_until.map(|t| t.timestamp()),
        Some(until.timestamp())
    );

    lock.unlock();
    let saved = repo.save_lock_state(admin.id, &lock).await.unwrap();
    assert_eq!(saved.lock.status, AccountStatus::Active);
    assert_eq!(saved.lock.account_locked_until, None);
    assert_eq!(saved.lock.account_lock_reason, "");
}

#[tokio::test]
async fn record_login_keeps_failed_attempts() {
    let repo = setup().await;
    let admin = repo.create(new_admin("erin")).await.unwrap();

    let mut lock = admin.lock.clone();
    lock.record_failed_login();
    lock.record_failed_login();
    repo.save_lock_state(admin.id, &lock).await.unwrap();

    let at = Utc::now();
    let logged_in = repo
        .record_login(admin.id, at, Some("10.0.0.7".into()))
        .await
        .unwrap();

    assert_eq!(
        logged_in.last_login.map(|t| t.timestamp()),
        Some(at.timestamp())
    );
    assert_eq!(logged_in.last_login_ip.as_deref(), Some("10.0.0.7"));
    assert_eq!(logged_in.lock.failed_login_attempts, 2);
}

#[tokio::test]
async fn record_login_for_missing_admin_is_not_found() {
    let repo = setup().await;

    let err = repo
        .record_login(uuid::Uuid::new_v4(), Utc::now(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, PerkdeskError::NotFound { .. }));
}

#[tokio::test]
async fn list_lock_expired_returns_only_expired_time_locks() {
    let repo = setup().await;
    let now = Utc::now();

    let expired = repo.create(new_admin("expired")).await.unwrap();
    let future = repo.create(new_admin("future")).await.unwrap();
    let indefinite = repo.create(new_admin("indefinite")).await.unwrap();
    repo.create(new_admin("active")).await.unwrap();

    let mut lock = expired.lock.clone();
    lock.lock("cool-off", Some(now - Duration::days(1)));
    repo.save_lock_state(expired.id, &lock).await.unwrap();

    let mut lock = future.lock.clone();
    lock.lock("cool-off", Some(now + Duration::days(1)));
    repo.save_lock_state(future.id, &lock).await.unwrap();

    let mut lock = indefinite.lock.clone();
    lock.lock("suspended", None);
    repo.save_lock_state(indefinite.id, &lock).await.unwrap();

    let found = repo.list_lock_expired(now).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, expired.id);
}

#[tokio::test]
async fn list_admins_with_pagination() {
    let repo = setup().await;

    for i in 0..5 {
        repo.create(new_admin(&format!("admin-{i}"))).await.unwrap();
    }

    let page1 = repo
        .list(Pagination {
            offset: 0,
            limit: 3,
        })
        .await
        .unwrap();
    assert_eq!(page1.items.len(), 3);
    assert_eq!(page1.total, 5);

    let page2 = repo
        .list(Pagination {
            offset: 3,
            limit: 3,
        })
        .await
        .unwrap();
    assert_eq!(page2.items.len(), 2);
}

#[tokio::test]
async fn delete_admin() {
    let repo = setup().await;
    let admin = repo.create(new_admin("frank")).await.unwrap();

    repo.delete(admin.id).await.unwrap();

    let err = repo.get_by_id(admin.id).await.unwrap_err();
    assert!(matches!(err, PerkdeskError::NotFound { .. }));
}
