use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use care_link_api::api::routes::{create_router, RouterConfig};
use care_link_api::api::state::AppState;
use care_link_data::database::DatabasePool;
use care_link_domain::auth::password::PasswordHasher;
use care_link_domain::storage::StorageConfig;
use care_link_domain::testing::{test_token_config, TEST_HASH_ITERATIONS};

const BOUNDARY: &str = "care-link-test-boundary";

struct TestApp {
    router: Router,
    _uploads: TempDir,
}

impl TestApp {
    fn new() -> Self {
        let uploads = tempfile::tempdir().expect("upload dir");
        let storage = StorageConfig {
            upload_dir: uploads.path().to_path_buf(),
            max_file_size: 1024,
        };
        let state = AppState::new(
            DatabasePool::in_memory().expect("database"),
            test_token_config(),
            PasswordHasher::new(TEST_HASH_ITERATIONS),
            storage,
            "test",
        );
        let origins = vec!["http://localhost:8080".to_string()];
        let router = create_router(
            state,
            RouterConfig {
                upload_dir: uploads.path(),
                cors_origins: &origins,
            },
        );
        Self { router, _uploads: uploads }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, body)
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send(request).await
    }

    /// Register a user and return (token, id)
    async fn register(&self, name: &str, email: &str, role: &str) -> (String, i64) {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "name": name, "email": email, "password": "password123", "role": role })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        (
            body["access_token"].as_str().expect("token").to_string(),
            body["user"]["id"].as_i64().expect("id"),
        )
    }

    async fn upload(&self, token: &str, filename: &str, content: &[u8]) -> (StatusCode, Value) {
        let mut form = Vec::new();
        form.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"type\"\r\n\r\nlab_report\r\n\
                 --{b}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nBlood count\r\n\
                 --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                b = BOUNDARY,
                f = filename
            )
            .as_bytes(),
        );
        form.extend_from_slice(content);
        form.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/health-records")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(form))
            .expect("request");
        self.send(request).await
    }
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = TestApp::new();
    let (token, id) = app.register("Alex", "alex@example.com", "patient").await;

    let (status, me) = app.call(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], id);
    assert_eq!(me["role"], "patient");
    assert!(me.get("password_hash").is_none());

    let (status, login) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "alex@example.com", "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["token_type"], "bearer");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "alex@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authentication_error");
}

#[tokio::test]
async fn test_duplicate_email_and_invalid_role() {
    let app = TestApp::new();
    app.register("Alex", "dup@example.com", "patient").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": "Alex", "email": "dup@example.com", "password": "password123", "role": "patient" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": "Root", "email": "root@example.com", "password": "password123", "role": "admin" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new();

    let (status, body) = app.call(Method::GET, "/api/appointments", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authentication_error");

    let (status, _) = app.call(Method::GET, "/api/appointments", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_appointment_approval_flow() {
    let app = TestApp::new();
    let (patient, _) = app.register("Pat", "pat@example.com", "patient").await;
    let (doctor, doctor_id) = app.register("Dr. Dee", "dee@example.com", "doctor").await;
    let (other_doctor, _) = app.register("Dr. Eve", "eve@example.com", "doctor").await;

    let date = (Utc::now() + Duration::days(3)).to_rfc3339();
    let (status, created) = app
        .call(
            Method::POST,
            "/api/appointments",
            Some(&patient),
            Some(json!({ "doctor_id": doctor_id, "date": date, "reason": "Checkup" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["status"], "pending");
    let uri = format!("/api/appointments/{}", created["id"]);

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&doctor), Some(json!({ "status": "approved" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(Method::PUT, &uri, Some(&other_doctor), Some(json!({ "status": "rejected" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, body) = app
        .call(Method::PUT, &uri, Some(&patient), Some(json!({ "status": "approved" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);

    let (status, listed) = app.call(Method::GET, "/api/appointments", Some(&patient), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["status"], "approved");
    assert_eq!(listed[0]["doctor_name"], "Dr. Dee");

    let (status, dashboard) = app.call(Method::GET, "/api/patients/dashboard", Some(&patient), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["upcoming_appointments"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_doctor_cannot_book() {
    let app = TestApp::new();
    let (doctor, doctor_id) = app.register("Dr. Dee", "dee@example.com", "doctor").await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/appointments",
            Some(&doctor),
            Some(json!({ "doctor_id": doctor_id, "date": Utc::now().to_rfc3339() })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_medication_partial_update_and_stock_level() {
    let app = TestApp::new();
    let (patient, _) = app.register("Pat", "pat@example.com", "patient").await;
    let (stranger, _) = app.register("Sam", "sam@example.com", "patient").await;

    let (status, created) = app
        .call(
            Method::POST,
            "/api/medications",
            Some(&patient),
            Some(json!({
                "name": "Metformin",
                "dosage": "500mg",
                "time": "08:00",
                "total_tablets": 60,
                "remaining_tablets": 30
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["stock_level"], "high");
    let uri = format!("/api/medications/{}", created["id"]);

    let (status, updated) = app
        .call(Method::PUT, &uri, Some(&patient), Some(json!({ "remaining_tablets": 4 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["remaining_tablets"], 4);
    assert_eq!(updated["stock_level"], "critical");
    assert_eq!(updated["name"], "Metformin");
    assert_eq!(updated["time"], "08:00");

    let (status, _) = app.call(Method::GET, &uri, Some(&stranger), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.call(Method::DELETE, &uri, Some(&patient), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call(Method::GET, &uri, Some(&patient), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_record_upload_and_doctor_access() {
    let app = TestApp::new();
    let (patient, patient_id) = app.register("Pat", "pat@example.com", "patient").await;
    let (doctor, doctor_id) = app.register("Dr. Dee", "dee@example.com", "doctor").await;

    let (status, record) = app.upload(&patient, "cbc results.pdf", b"%PDF-1.4 test").await;
    assert_eq!(status, StatusCode::CREATED, "{}", record);
    assert_eq!(record["type"], "lab_report");
    assert_eq!(record["title"], "Blood count");
    let file_url = record["file_url"].as_str().expect("file_url").to_string();
    assert!(file_url.starts_with("/uploads/lab_reports/"));

    let served = app
        .router
        .clone()
        .oneshot(Request::builder().uri(&file_url).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(served.status(), StatusCode::OK);
    let bytes = to_bytes(served.into_body(), usize::MAX).await.expect("body");
    assert_eq!(&bytes[..], b"%PDF-1.4 test");

    let records_uri = format!("/api/doctors/patient/{}/records", patient_id);
    let (status, _) = app.call(Method::GET, &records_uri, Some(&doctor), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/appointments",
            Some(&patient),
            Some(json!({ "doctor_id": doctor_id, "date": (Utc::now() + Duration::days(1)).to_rfc3339() })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, records) = app.call(Method::GET, &records_uri, Some(&doctor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records["patient"]["id"], patient_id);
    assert_eq!(records["health_records"].as_array().map(Vec::len), Some(1));

    let (status, patients) = app.call(Method::GET, "/api/doctors/patients", Some(&doctor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patients[0]["name"], "Pat");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let app = TestApp::new();
    let (patient, _) = app.register("Pat", "pat@example.com", "patient").await;

    let (status, body) = app.upload(&patient, "big.bin", &vec![7u8; 2048]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
}

#[tokio::test]
async fn test_doctor_upload_denied_before_body_is_read() {
    let app = TestApp::new();
    let (doctor, _) = app.register("Dr. Dee", "dee@example.com", "doctor").await;

    // Larger than the route body limit, so reading it would fail with 413
    let (status, body) = app.upload(&doctor, "huge.bin", &vec![7u8; 2 * 1024 * 1024 + 1]).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn test_messages_between_users() {
    let app = TestApp::new();
    let (patient, patient_id) = app.register("Pat", "pat@example.com", "patient").await;
    let (doctor, doctor_id) = app.register("Dr. Dee", "dee@example.com", "doctor").await;

    let (status, sent) = app
        .call(
            Method::POST,
            "/api/messages",
            Some(&patient),
            Some(json!({ "receiver_id": doctor_id, "message": "Hello doctor" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sent["is_read"], false);

    let (status, chat) = app
        .call(Method::GET, &format!("/api/messages/chat/{}", patient_id), Some(&doctor), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chat[0]["message"], "Hello doctor");

    let read_uri = format!("/api/messages/{}/read", sent["id"]);
    let (status, _) = app.call(Method::PUT, &read_uri, Some(&patient), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, read) = app.call(Method::PUT, &read_uri, Some(&doctor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["is_read"], true);
}

#[tokio::test]
async fn test_health_and_docs() {
    let app = TestApp::new();

    let (status, health) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["components"]["database"]["status"], "ok");
    assert_eq!(health["environment"], "test");

    let (status, doc) = app.call(Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["info"]["title"], "CareLink API");

    let (status, banner) = app.call(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(banner["docs"], "/swagger-ui");
}
