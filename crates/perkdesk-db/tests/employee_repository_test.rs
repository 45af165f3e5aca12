//! Integration tests for Employee repository using in-memory SurrealDB.

use chrono::{TimeZone, Utc};
use perkdesk_core::error::PerkdeskError;
use perkdesk_core::incentive::{BonusRule, IncentiveLedger, NewMerchant, TierMap};
use perkdesk_core::models::employee::{CreateEmployee, EmployeeStatus, UpdateEmployee};
use perkdesk_core::repository::{EmployeeRepository, Pagination};
use perkdesk_db::repository::SurrealEmployeeRepository;
use rust_decimal_macros::dec;
use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn setup() -> SurrealEmployeeRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    perkdesk_db::run_migrations(&db).await.unwrap();
    SurrealEmployeeRepository::new(db)
}

fn new_employee(name: &str) -> CreateEmployee {
    let mut ledger = IncentiveLedger {
        default_monthly_revenue_target: dec!(10000),
        default_bonus_rule: BonusRule::PerRevenue {
            amount_per_revenue: Some(dec!(0.1)),
        },
        ..Default::default()
    };
    ledger.set_package_price("Launch Pad", dec!(5000)).unwrap();

    CreateEmployee {
        name: name.into(),
        email: format!("{name}@example.com"),
        phone: Some("+1-555-0100".into()),
        designation: Some("Field Sales".into()),
        ledger,
        additional_fields: None,
    }
}

#[tokio::test]
async fn create_and_get_employee() {
    let repo = setup().await;

    let employee = repo.create(new_employee("asha")).await.unwrap();
    assert_eq!(employee.status, EmployeeStatus::Active);
    assert_eq!(employee.ledger.package_prices["Launch Pad"], dec!(5000));
    assert_eq!(employee.ledger.default_monthly_revenue_target, dec!(10000));

    let fetched = repo.get_by_id(employee.id).await.unwrap();
    assert_eq!(fetched.name, "asha");
    assert_eq!(fetched.ledger, employee.ledger);

    let by_email = repo.get_by_email("asha@example.com").await.unwrap();
    assert_eq!(by_email.id, employee.id);
}

#[tokio::test]
async fn duplicate_email_rejected() {
    let repo = setup().await;

    repo.create(new_employee("ben")).await.unwrap();
    let err = repo.create(new_employee("ben")).await.unwrap_err();
    assert!(matches!(err, PerkdeskError::AlreadyExists { .. }));
}

#[tokio::test]
async fn save_ledger_persists_onboarding_and_bonus() {
    let repo = setup().await;
    let employee = repo.create(new_employee("chen")).await.unwrap();

    let now = Utc.with_ymd_and_hms(2024, 3, 20, 9, 30, 0).unwrap();
    let mut ledger = employee.ledger.clone();
    ledger
        .set_incentive_percentages(TierMap::from([("Launch Pad".into(), dec!(5))]), now, now)
        .unwrap();
    for id in ["m1", "m2", "m3"] {
        ledger
            .register_onboarding(
                NewMerchant {
                    merchant_id: id.into(),
                    name: format!("Shop {id}"),
                    email: format!("{id}@shop.example"),
                    package: "Launch Pad".into(),
                    revenue: None,
                },
                Some(2024),
                Some(3),
                now,
            )
            .unwrap();
    }
    ledger.compute_monthly_bonus(2024, 3, now).unwrap();

    repo.save_ledger(employee.id, &ledger).await.unwrap();
    let fetched = repo.get_by_id(employee.id).await.unwrap();

    assert_eq!(fetched.ledger, ledger);
    let record = fetched.ledger.monthly_record(2024, 3).unwrap();
    assert_eq!(record.onboarded_count, 3);
    assert_eq!(record.bonus_amount, dec!(500));
    assert_eq!(fetched.ledger.total_onboarded, 3);
    assert_eq!(fetched.ledger.onboarding_incentive_earned, dec!(750));
}

#[tokio::test]
async fn out_of_range_percentage_rejected_on_create() {
    let repo = setup().await;

    let mut input = new_employee("ola");
    input
        .ledger
        .incentive_percentages
        .insert("Launch Pad".into(), dec!(250));
    let err = repo.create(input).await.unwrap_err();
    assert!(
        matches!(err, PerkdeskError::Validation { .. }),
        "expected Validation, got {err:?}"
    );

    let err = repo.get_by_email("ola@example.com").await.unwrap_err();
    assert!(matches!(err, PerkdeskError::NotFound { .. }));
}

#[tokio::test]
async fn negative_price_rejected_on_save_ledger() {
    let repo = setup().await;
    let employee = repo.create(new_employee("pia")).await.unwrap();

    let mut ledger = employee.ledger.clone();
    ledger.package_prices.insert("Launch Pad".into(), dec!(-1));
    let err = repo.save_ledger(employee.id, &ledger).await.unwrap_err();
    assert!(matches!(err, PerkdeskError::Validation { .. }));

    let fetched = repo.get_by_id(employee.id).await.unwrap();
    assert_eq!(fetched.ledger, employee.ledger);
}

#[tokio::test]
async fn save_ledger_for_missing_employee_is_not_found() {
    let repo = setup().await;
    let err = repo
        .save_ledger(uuid::Uuid::new_v4(), &IncentiveLedger::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PerkdeskError::NotFound { .. }));
}

#[tokio::test]
async fn update_employee_partial_fields() {
    let repo = setup().await;
    let employee = repo.create(new_employee("dina")).await.unwrap();

    let extra = json!({ "region": "north", "badge": 42 });
    let updated = repo
        .update(
            employee.id,
            UpdateEmployee {
                phone: Some(None),
                status: Some(EmployeeStatus::Inactive),
                additional_fields: extra.as_object().cloned(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.phone, None);
    assert_eq!(updated.designation.as_deref(), Some("Field Sales"));
    assert_eq!(updated.status, EmployeeStatus::Inactive);
    assert_eq!(updated.additional_fields.get("badge"), Some(&json!(42)));
    // Ledger is untouched by profile updates.
    assert_eq!(updated.ledger, employee.ledger);
}

#[tokio::test]
async fn list_and_delete_employees() {
    let repo = setup().await;

    let mut ids = Vec::new();
    for i in 0..4 {
        ids.push(repo.create(new_employee(&format!("emp-{i}"))).await.unwrap().id);
    }

    let page = repo
        .list(Pagination {
            offset: 0,
            limit: 10,
        })
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 4);

    repo.delete(ids[0]).await.unwrap();
    let page = repo.list(Pagination::default()).await.unwrap();
    assert_eq!(page.total, 3);
}
