//! Integration tests for the repository layer against a real database.

use chrono::{TimeZone, Utc};
use fleetops_db::models::import_run::{CompleteImportRun, CreateImportRun};
use fleetops_db::models::passenger::CreatePassenger;
use fleetops_db::models::user::CreateUser;
use fleetops_db::models::vehicle::CreateVehicle;
use fleetops_db::repositories::{ImportRunRepo, PassengerRepo, UserRepo, VehicleRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(email: &str) -> CreateUser {
    CreateUser {
        email: email.to_string(),
        password_hash: "$argon2id$fake".to_string(),
        full_name: "Ana Ruiz".to_string(),
        phone: Some("555-0101".to_string()),
        role: "passenger".to_string(),
        avatar_url: Some(format!("https://i.pravatar.cc/150?u={email}")),
    }
}

fn new_profile(user_id: i64, employee_id: &str) -> CreatePassenger {
    CreatePassenger {
        user_id,
        department: "Logística".to_string(),
        employee_id: employee_id.to_string(),
        home_address: "Calle 1".to_string(),
    }
}

fn constraint_of(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint().map(str::to_string),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Users and passengers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn bootstrap_health_check(pool: PgPool) {
    fleetops_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_violates_unique_constraint(pool: PgPool) {
    UserRepo::create(&pool, &new_user("ana@corp.com")).await.unwrap();
    let err = UserRepo::create(&pool, &new_user("ana@corp.com"))
        .await
        .unwrap_err();

    assert_eq!(constraint_of(&err).as_deref(), Some("uq_users_email"));
    assert!(UserRepo::exists_by_email(&pool, "ana@corp.com").await.unwrap());
    assert!(!UserRepo::exists_by_email(&pool, "bo@corp.com").await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_user_cascades_to_profile(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("ana@corp.com")).await.unwrap();
    PassengerRepo::create(&pool, &new_profile(user.id, "E-1"))
        .await
        .unwrap();

    assert!(UserRepo::delete(&pool, user.id).await.unwrap());
    assert!(PassengerRepo::find_by_id(&pool, user.id).await.unwrap().is_none());
    assert!(!UserRepo::delete(&pool, user.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reused_employee_id_is_rejected(pool: PgPool) {
    let a = UserRepo::create(&pool, &new_user("a@corp.com")).await.unwrap();
    let b = UserRepo::create(&pool, &new_user("b@corp.com")).await.unwrap();
    PassengerRepo::create(&pool, &new_profile(a.id, "E-1")).await.unwrap();

    let err = PassengerRepo::create(&pool, &new_profile(b.id, "E-1"))
        .await
        .unwrap_err();
    assert_eq!(constraint_of(&err).as_deref(), Some("uq_passengers_employee_id"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_without_user_is_rejected(pool: PgPool) {
    let result = PassengerRepo::create(&pool, &new_profile(9999, "E-1")).await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn vehicle_plate_is_unique(pool: PgPool) {
    let input = CreateVehicle {
        plate_number: "ABC-123".to_string(),
        brand: "Mercedes".to_string(),
        model: "Sprinter".to_string(),
        year: 2022,
        capacity: 18,
        fuel_type: "Diesel".to_string(),
        status: "active".to_string(),
        last_maintenance: None,
        next_maintenance: None,
    };
    let created = VehicleRepo::create(&pool, &input).await.unwrap();
    assert_eq!(created.capacity, 18);
    assert!(created.last_maintenance.is_none());

    let err = VehicleRepo::create(&pool, &input).await.unwrap_err();
    assert_eq!(constraint_of(&err).as_deref(), Some("uq_vehicles_plate_number"));

    let found = VehicleRepo::find_by_plate(&pool, "ABC-123").await.unwrap();
    assert_eq!(found.map(|v| v.id), Some(created.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn vehicle_maintenance_dates_round_trip(pool: PgPool) {
    let last = Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap();
    let next = Utc.with_ymd_and_hms(2025, 7, 15, 0, 0, 0).unwrap();
    let input = CreateVehicle {
        plate_number: "MNT-001".to_string(),
        brand: "Toyota".to_string(),
        model: "Hiace".to_string(),
        year: 2020,
        capacity: 12,
        fuel_type: "Gasolina".to_string(),
        status: "maintenance".to_string(),
        last_maintenance: Some(last),
        next_maintenance: Some(next),
    };
    VehicleRepo::create(&pool, &input).await.unwrap();

    let found = VehicleRepo::find_by_plate(&pool, "MNT-001").await.unwrap().unwrap();
    assert_eq!(found.last_maintenance, Some(last));
    assert_eq!(found.next_maintenance, Some(next));
}

// ---------------------------------------------------------------------------
// Import runs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn import_run_lifecycle(pool: PgPool) {
    let run = ImportRunRepo::create(
        &pool,
        &CreateImportRun {
            entity_kind: "passenger".to_string(),
            file_name: Some("pasajeros.csv".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(run.status, "processing");
    assert!(run.completed_at.is_none());

    let done = ImportRunRepo::complete(
        &pool,
        run.id,
        &CompleteImportRun {
            status: "partial".to_string(),
            classification: "partial_success".to_string(),
            total_rows: 3,
            success_count: 2,
            failure_count: 1,
            skipped_count: 1,
            failed_count: 0,
            orphaned_count: 0,
            report: serde_json::json!({"details": ["Fila 3: Faltan los campos: email"]}),
            session_closed: false,
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(done.status, "partial");
    assert_eq!(done.classification.as_deref(), Some("partial_success"));
    assert!(done.completed_at.is_some());
    assert_eq!(done.report["details"][0], "Fila 3: Faltan los campos: email");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn import_runs_list_newest_first(pool: PgPool) {
    for name in ["a.csv", "b.csv", "c.csv"] {
        ImportRunRepo::create(
            &pool,
            &CreateImportRun {
                entity_kind: "vehicle".to_string(),
                file_name: Some(name.to_string()),
            },
        )
        .await
        .unwrap();
    }

    let page = ImportRunRepo::list(&pool, Some(2), None).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].file_name.as_deref(), Some("c.csv"));

    let rest = ImportRunRepo::list(&pool, Some(2), Some(2)).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].file_name.as_deref(), Some("a.csv"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completing_missing_run_returns_none(pool: PgPool) {
    let result = ImportRunRepo::complete(
        &pool,
        404,
        &CompleteImportRun {
            status: "failed".to_string(),
            classification: "all_failed".to_string(),
            total_rows: 1,
            success_count: 0,
            failure_count: 1,
            skipped_count: 0,
            failed_count: 1,
            orphaned_count: 0,
            report: serde_json::json!({}),
            session_closed: false,
        },
    )
    .await
    .unwrap();
    assert!(result.is_none());
}
