//! Wire-level tests for [`AttendanceApi`] against an in-process fake of
//! the attendance API.
//!
//! The fake records what it receives so tests can assert on multipart
//! field names, content types, query strings and JSON bodies.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use rollcall_client::{ApiError, AttendanceApi, PhotoUpload};
use rollcall_core::attendance::Coordinates;
use rollcall_core::employee::CreateEmployee;
use rollcall_core::pagination::ListQuery;

// ---------------------------------------------------------------------------
// Fake server
// ---------------------------------------------------------------------------

/// One multipart field as seen by the fake server.
#[derive(Debug, Clone)]
struct SeenField {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct Recorded {
    checked_in: bool,
    reject_uploads_with: Option<(StatusCode, Value)>,
    uploads: Vec<Vec<SeenField>>,
    queries: Vec<HashMap<String, String>>,
    bodies: Vec<Value>,
    deleted: Vec<String>,
    authorization: Vec<Option<String>>,
}

type Shared = Arc<Mutex<Recorded>>;

async fn check_login_status(
    State(state): State<Shared>,
    headers: axum::http::HeaderMap,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.authorization.push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );
    if state.checked_in {
        Json(json!({
            "success": true,
            "hasLoggedInToday": true,
            "loginRecord": { "_id": "rec-1", "loginDate": "2026-10-16T08:30:00Z" }
        }))
    } else {
        Json(json!({ "success": true, "hasLoggedInToday": false }))
    }
}

async fn login_with_photo(
    State(state): State<Shared>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.unwrap().to_vec();
        fields.push(SeenField {
            name,
            file_name,
            content_type,
            bytes,
        });
    }

    let mut state = state.lock().unwrap();
    state.uploads.push(fields);
    if let Some((status, body)) = state.reject_uploads_with.clone() {
        return (status, Json(body));
    }
    state.checked_in = true;
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Login recorded",
            "loginRecord": { "_id": "rec-1", "loginDate": "2026-10-16T08:30:00Z" }
        })),
    )
}

async fn login_history(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.lock().unwrap().queries.push(query);
    Json(json!({
        "success": true,
        "loginRecords": [
            { "_id": "rec-2", "loginDate": "2026-10-15T08:00:00Z", "photoUrl": "https://cdn/2.jpg" },
            { "_id": "rec-1", "loginDate": "2026-10-14T08:00:00Z", "isPhotoDeleted": true }
        ],
        "pagination": {
            "currentPage": 2, "totalPages": 3, "totalRecords": 23,
            "hasNextPage": true, "hasPrevPage": true
        }
    }))
}

async fn employees(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.lock().unwrap().queries.push(query);
    Json(json!({
        "success": true,
        "employees": [{
            "_id": "e1", "name": "Ada", "email": "ada@example.com",
            "employeeId": "EMP-001", "department": "Engineering", "isActive": true
        }]
    }))
}

async fn stats() -> Json<Value> {
    Json(json!({ "success": false, "message": "Admin access required" }))
}

async fn create_employee(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    state.lock().unwrap().bodies.push(body);
    Json(json!({ "success": true }))
}

async fn delete_employee(State(state): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    state.lock().unwrap().deleted.push(id);
    Json(json!({ "success": true }))
}

async fn employee_status(
    State(state): State<Shared>,
    Path(_id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, &'static str) {
    state.lock().unwrap().bodies.push(body);
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

async fn spawn_fake(state: Shared) -> String {
    let app = Router::new()
        .route("/api/employee/check-login-status", get(check_login_status))
        .route("/api/employee/login-with-photo", post(login_with_photo))
        .route("/api/employee/login-history", get(login_history))
        .route("/api/admin/employees", get(employees))
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/create-employee", post(create_employee))
        .route("/api/admin/employee/{id}", delete(delete_employee))
        .route("/api/admin/employee/{id}/status", patch(employee_status))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

async fn setup() -> (AttendanceApi, Shared) {
    let state: Shared = Arc::new(Mutex::new(Recorded::default()));
    let url = spawn_fake(state.clone()).await;
    let api = AttendanceApi::with_client(reqwest_client(), &url, Some("t0ken".into())).unwrap();
    (api, state)
}

fn reqwest_client() -> reqwest::Client {
    reqwest::Client::new()
}

// ---------------------------------------------------------------------------
// Check-in status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_reflects_server_and_sends_bearer_token() {
    let (api, state) = setup().await;

    let status = api.check_login_status().await.unwrap();
    assert!(!status.has_logged_in_today);
    assert!(status.login_record.is_none());

    state.lock().unwrap().checked_in = true;
    let status = api.check_login_status().await.unwrap();
    assert!(status.has_logged_in_today);
    assert_eq!(status.login_record.unwrap().id, "rec-1");

    let auth = state.lock().unwrap().authorization.clone();
    assert_eq!(auth, vec![Some("Bearer t0ken".to_string()); 2]);
}

// ---------------------------------------------------------------------------
// Photo upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_sends_photo_part_and_coordinates() {
    let (api, state) = setup().await;
    let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02];

    let record = api
        .login_with_photo(PhotoUpload::new(
            jpeg.clone(),
            Some(Coordinates::new(52.5, 13.4, 15.0)),
        ))
        .await
        .unwrap();
    assert_eq!(record.unwrap().id, "rec-1");

    let uploads = state.lock().unwrap().uploads.clone();
    assert_eq!(uploads.len(), 1);
    let fields = &uploads[0];
    let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["photo", "latitude", "longitude", "accuracy"]);

    let photo = &fields[0];
    assert_eq!(photo.file_name.as_deref(), Some("photo.jpg"));
    assert_eq!(photo.content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(photo.bytes, jpeg);
    assert_eq!(fields[1].bytes, b"52.5");
    assert_eq!(fields[3].bytes, b"15");
}

#[tokio::test]
async fn upload_without_coordinates_sends_only_photo() {
    let (api, state) = setup().await;

    api.login_with_photo(PhotoUpload::new(vec![1, 2, 3], None))
        .await
        .unwrap();

    let uploads = state.lock().unwrap().uploads.clone();
    let names: Vec<_> = uploads[0].iter().map(|f| f.name.clone()).collect();
    assert_eq!(names, ["photo"]);
}

#[tokio::test]
async fn upload_error_status_carries_server_message() {
    let (api, state) = setup().await;
    state.lock().unwrap().reject_uploads_with = Some((
        StatusCode::CONFLICT,
        json!({ "success": false, "message": "Already logged in today" }),
    ));

    let err = api
        .login_with_photo(PhotoUpload::new(vec![1], None))
        .await
        .unwrap_err();
    assert_matches!(err, ApiError::Status { status: 409, .. });
    assert_eq!(
        err.user_message("Failed to record login"),
        "Already logged in today"
    );
}

#[tokio::test]
async fn upload_success_false_is_rejected() {
    let (api, state) = setup().await;
    state.lock().unwrap().reject_uploads_with =
        Some((StatusCode::OK, json!({ "success": false })));

    let err = api
        .login_with_photo(PhotoUpload::new(vec![1], None))
        .await
        .unwrap_err();
    assert_matches!(err, ApiError::Rejected { message: None });
    assert_eq!(err.user_message("Failed to record login"), "Failed to record login");
}

// ---------------------------------------------------------------------------
// History and admin endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn history_sends_page_and_limit() {
    let (api, state) = setup().await;

    let page = api.login_history(&ListQuery::page(2)).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].viewable_photo(), Some("https://cdn/2.jpg"));
    assert_eq!(page.items[1].viewable_photo(), None);
    assert_eq!(page.pagination.shown_range(10), Some((11, 20)));

    let query = state.lock().unwrap().queries[0].clone();
    assert_eq!(query.get("page").map(String::as_str), Some("2"));
    assert_eq!(query.get("limit").map(String::as_str), Some("10"));
}

#[tokio::test]
async fn employee_search_omits_blank_term() {
    let (api, state) = setup().await;

    api.list_employees(&ListQuery::page(1).with_search("  "))
        .await
        .unwrap();
    let page = api
        .list_employees(&ListQuery::page(1).with_search("ada"))
        .await
        .unwrap();
    assert_eq!(page.items[0].employee_id, "EMP-001");
    assert!(page.items[0].is_active);

    let queries = state.lock().unwrap().queries.clone();
    assert!(!queries[0].contains_key("search"));
    assert_eq!(queries[1].get("search").map(String::as_str), Some("ada"));
}

#[tokio::test]
async fn stats_success_false_is_rejected_with_message() {
    let (api, _state) = setup().await;
    let err = api.admin_stats().await.unwrap_err();
    assert_matches!(err, ApiError::Rejected { message: Some(ref m) } if m == "Admin access required");
}

#[tokio::test]
async fn invalid_employee_form_is_not_sent() {
    let (api, state) = setup().await;
    let form = CreateEmployee {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        password: "123".into(),
        employee_id: "EMP-001".into(),
        department: "Engineering".into(),
    };

    let err = api.create_employee(&form).await.unwrap_err();
    assert_matches!(err, ApiError::Core(_));
    assert!(state.lock().unwrap().bodies.is_empty());
}

#[tokio::test]
async fn valid_employee_form_is_sent_camel_case() {
    let (api, state) = setup().await;
    let form = CreateEmployee {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        password: "analytical".into(),
        employee_id: "EMP-001".into(),
        department: "Engineering".into(),
    };

    api.create_employee(&form).await.unwrap();
    let body = state.lock().unwrap().bodies[0].clone();
    assert_eq!(body["employeeId"], "EMP-001");
    assert_eq!(body["password"], "analytical");
}

#[tokio::test]
async fn delete_encodes_id_into_path() {
    let (api, state) = setup().await;
    api.delete_employee("66f1 c0").await.unwrap();
    assert_eq!(state.lock().unwrap().deleted, vec!["66f1 c0".to_string()]);
}

#[tokio::test]
async fn status_toggle_non_json_error_uses_fallback() {
    let (api, state) = setup().await;

    let err = api.set_employee_active("e1", false).await.unwrap_err();
    assert_matches!(err, ApiError::Status { status: 500, message: None });
    assert_eq!(
        err.user_message("Failed to update employee status"),
        "Failed to update employee status"
    );
    assert_eq!(state.lock().unwrap().bodies[0], json!({ "isActive": false }));
}
