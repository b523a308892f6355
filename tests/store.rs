//! Handler tests against a real MySQL schema.
//!
//! Run with `DATABASE_URL=mysql://... cargo test -- --ignored`; each test gets
//! a fresh database with the migrations applied.

use actix_web::{HttpResponse, body::to_bytes, web};
use chrono::NaiveTime;
use erms::api::{attendance, employee, leave_request};
use erms::auth::handlers::login;
use erms::error::ApiError;
use erms::utils::db_utils::{PageQuery, TOTAL_COUNT_HEADER};
use erms::utils::usernames::UsernameRegistry;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use sqlx::MySqlPool;

fn body<T: DeserializeOwned>(value: Value) -> web::Json<T> {
    web::Json(serde_json::from_value(value).unwrap())
}

async fn json_body(resp: HttpResponse) -> Value {
    let bytes = to_bytes(resp.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create(pool: &MySqlPool, usernames: &web::Data<UsernameRegistry>, value: Value) -> Value {
    let resp = employee::create_employee(web::Data::new(pool.clone()), usernames.clone(), body(value))
        .await
        .unwrap();
    json_body(resp).await
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn second_clock_in_overwrites_the_same_row(pool: MySqlPool) {
    let data = web::Data::new(pool.clone());

    attendance::clock_in(data.clone(), body(json!({ "employeeId": 7 })))
        .await
        .unwrap();
    let second = json_body(
        attendance::clock_in(data.clone(), body(json!({ "employeeId": "7" })))
            .await
            .unwrap(),
    )
    .await;

    let rows: Vec<(NaiveTime, String)> =
        sqlx::query_as("SELECT clock_in, status FROM attendance WHERE employee_id = 7")
            .fetch_all(&pool)
            .await
            .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0.format("%H:%M:%S").to_string(), second["clockIn"]);
    assert_eq!(rows[0].1, "Present");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn clock_out_without_clock_in_writes_nothing(pool: MySqlPool) {
    let resp = attendance::clock_out(web::Data::new(pool.clone()), body(json!({ "employeeId": 9 })))
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendance")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn deleting_a_missing_employee_still_confirms(pool: MySqlPool) {
    let resp = employee::delete_employee(web::Data::new(pool), web::Path::from(4242))
        .await
        .unwrap();

    assert_eq!(
        json_body(resp).await,
        json!({ "message": "Employee deleted", "id": 4242 })
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn provisioned_login_stores_a_hash_and_accepts_the_plaintext(pool: MySqlPool) {
    let usernames = web::Data::new(UsernameRegistry::default());
    let created = create(
        &pool,
        &usernames,
        json!({
            "name": "John Doe",
            "email": "john@company.com",
            "username": "jdoe",
            "password": "s3cret!",
            "role": "hr"
        }),
    )
    .await;
    assert_eq!(created["username"], "jdoe");

    let stored: String = sqlx::query_scalar("SELECT password FROM users WHERE username = 'jdoe'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(stored.starts_with("$argon2"), "stored {stored:?}");
    assert_ne!(stored, "s3cret!");

    let profile = json_body(
        login(
            web::Data::new(pool.clone()),
            body(json!({ "username": "jdoe", "password": "s3cret!" })),
        )
        .await
        .unwrap(),
    )
    .await;
    assert_eq!(profile["username"], "jdoe");
    assert_eq!(profile["role"], "hr");
    assert_eq!(profile["employeeId"], created["id"]);

    let wrong = login(
        web::Data::new(pool.clone()),
        body(json!({ "username": "jdoe", "password": "guess" })),
    )
    .await
    .unwrap_err();
    assert!(matches!(wrong, ApiError::Unauthorized(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn username_taken_before_the_registry_saw_it_is_a_conflict(pool: MySqlPool) {
    let usernames = web::Data::new(UsernameRegistry::default());
    create(
        &pool,
        &usernames,
        json!({ "name": "A", "email": "a@company.com", "username": "shared", "password": "x" }),
    )
    .await;

    // a cold registry misses in the filter, so only the UNIQUE key catches it
    let cold = web::Data::new(UsernameRegistry::default());
    let err = employee::create_employee(
        web::Data::new(pool.clone()),
        cold,
        body(json!({ "name": "B", "email": "b@company.com", "username": "shared", "password": "y" })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)), "got {err:?}");

    // the employee insert was rolled back with the user row
    let employees: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(employees, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn form_body_stores_hire_date_and_salary(pool: MySqlPool) {
    let usernames = web::Data::new(UsernameRegistry::default());
    let created = create(
        &pool,
        &usernames,
        json!({
            "name": "Jane Roe",
            "email": "jane@company.com",
            "department": "Engineering",
            "salary": "85000",
            "hireDate": "2024-03-01",
            "date_hired": "2024-03-01",
            "status": "Active"
        }),
    )
    .await;

    let id = created["id"].as_u64().unwrap();
    let fetched = json_body(
        employee::get_employee(web::Data::new(pool), web::Path::from(id))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(fetched["dateHired"], "2024-03-01");
    assert_eq!(fetched["salary"], 85000.0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn employee_list_is_an_array_with_the_total_in_a_header(pool: MySqlPool) {
    let usernames = web::Data::new(UsernameRegistry::default());
    for n in 0..3 {
        create(
            &pool,
            &usernames,
            json!({ "name": format!("E{n}"), "email": format!("e{n}@company.com") }),
        )
        .await;
    }

    let resp = employee::list_employees(
        web::Data::new(pool),
        web::Query(PageQuery { page: Some(1), limit: Some(2) }),
    )
    .await
    .unwrap();

    assert_eq!(resp.headers().get(TOTAL_COUNT_HEADER).unwrap(), "3");
    let list = json_body(resp).await;
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn leave_can_only_be_decided_once(pool: MySqlPool) {
    let data = web::Data::new(pool);
    let created = json_body(
        leave_request::create_leave(
            data.clone(),
            body(json!({
                "employeeId": "7",
                "type": "Vacation",
                "startDate": "2024-06-01",
                "endDate": "2024-06-05"
            })),
        )
        .await
        .unwrap(),
    )
    .await;
    let id = created["id"].as_u64().unwrap();

    leave_request::set_leave_status(
        data.clone(),
        web::Path::from(id),
        body(json!({ "status": "Approved" })),
    )
    .await
    .unwrap();

    let again = leave_request::set_leave_status(
        data,
        web::Path::from(id),
        body(json!({ "status": "Denied" })),
    )
    .await
    .unwrap_err();
    assert!(matches!(again, ApiError::BadRequest(_)));
}
