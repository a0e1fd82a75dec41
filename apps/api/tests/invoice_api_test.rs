use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use medbill_api::{build_router, ApiConfig, AppState};
use medbill_core::NegativeTotalPolicy;
use medbill_db::{Database, DbConfig};
use serde_json::{json, Value};
use tower::util::ServiceExt;

async fn setup_with(config: ApiConfig) -> Router {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("Failed to open in-memory database");
    build_router(AppState::new(db, config))
}

async fn setup() -> Router {
    setup_with(ApiConfig {
        clinic_name: "City Care Clinic".to_string(),
        ..ApiConfig::default()
    })
    .await
}

fn asha_draft() -> Value {
    json!({
        "patientId": "UHID-0001",
        "patientName": "Asha Rao",
        "address": "12 MG Road",
        "phone": "9876543210",
        "email": "a@x.com",
        "date": "2026-03-01",
        "lineItems": [
            { "description": "Consultation", "quantity": 1, "unitPrice": 500 },
            { "description": "Lab test", "quantity": 2, "unitPrice": 150 }
        ],
        "discount": 50,
        "tax": 20,
        "remarks": "Review in two weeks"
    })
}

fn ravi_draft() -> Value {
    json!({
        "patientId": "UHID-0002",
        "patientName": "Ravi Kumar",
        "email": "ravi@clinic.org",
        "lineItems": [
            { "description": "ECG", "quantity": 1, "unitPrice": "300.00" }
        ]
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_create_invoice_computes_total() {
    let app = setup().await;

    let (status, body) = post_json(&app, "/api/invoices", &asha_draft()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["invoice"]["invoiceNo"], 1);
    assert_eq!(body["invoice"]["patientName"], "Asha Rao");
    assert_eq!(body["invoice"]["subtotal"], "800");
    assert_eq!(body["invoice"]["total"], "770");
    assert_eq!(body["invoice"]["lineItems"].as_array().unwrap().len(), 2);
    assert_eq!(body["warnings"], json!([]));
}

#[tokio::test]
async fn test_numbers_increase_and_list_is_ordered() {
    let app = setup().await;

    for _ in 0..3 {
        let (status, _) = post_json(&app, "/api/invoices", &asha_draft()).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = get_json(&app, "/api/invoices").await;
    assert_eq!(status, StatusCode::OK);

    let numbers: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|invoice| invoice["invoiceNo"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_client_total_is_replaced_and_reported() {
    let app = setup().await;

    let mut draft = asha_draft();
    draft["total"] = json!("1.00");

    let (status, body) = post_json(&app, "/api/invoices", &draft).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["invoice"]["total"], "770");
    assert_eq!(body["warnings"][0]["kind"], "clientTotalIgnored");
    assert!(body["warnings"][0]["message"]
        .as_str()
        .unwrap()
        .contains("770.00"));
}

#[tokio::test]
async fn test_negative_quantity_is_rejected_without_using_a_number() {
    let app = setup().await;

    let mut draft = asha_draft();
    draft["lineItems"][0]["quantity"] = json!(-1);

    let (status, body) = post_json(&app, "/api/invoices", &draft).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field"], "lineItems[0].quantity");

    let (status, body) = post_json(&app, "/api/invoices", &asha_draft()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["invoice"]["invoiceNo"], 1);
}

#[tokio::test]
async fn test_missing_patient_name_is_rejected() {
    let app = setup().await;

    let mut draft = asha_draft();
    draft["patientName"] = json!("");

    let (status, body) = post_json(&app, "/api/invoices", &draft).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "patientName");
}

#[tokio::test]
async fn test_malformed_body_is_a_validation_error() {
    let app = setup().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/invoices")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, bytes) = send(&app, request).await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_negative_total_follows_configured_policy() {
    let mut draft = asha_draft();
    draft["discount"] = json!(1000);

    let reject = setup_with(ApiConfig {
        negative_total_policy: NegativeTotalPolicy::Reject,
        ..ApiConfig::default()
    })
    .await;
    let (status, body) = post_json(&reject, "/api/invoices", &draft).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "BUSINESS_RULE");

    let clamp = setup_with(ApiConfig {
        negative_total_policy: NegativeTotalPolicy::Clamp,
        ..ApiConfig::default()
    })
    .await;
    let (status, body) = post_json(&clamp, "/api/invoices", &draft).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["invoice"]["total"], "0");
    assert_eq!(body["warnings"][0]["kind"], "totalClamped");

    let allow = setup().await;
    let (status, body) = post_json(&allow, "/api/invoices", &draft).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["invoice"]["total"], "-180");
    assert_eq!(body["warnings"][0]["kind"], "negativeTotal");
}

#[tokio::test]
async fn test_search() {
    let app = setup().await;
    post_json(&app, "/api/invoices", &asha_draft()).await;
    post_json(&app, "/api/invoices", &ravi_draft()).await;

    let (status, body) = get_json(&app, "/api/invoices/search?term=asha").await;
    assert_eq!(status, StatusCode::OK);
    let hits = body.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["invoiceNo"], 1);

    let (_, body) = get_json(&app, "/api/invoices/search?term=CLINIC.ORG").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["patientName"], "Ravi Kumar");

    let (status, body) = get_json(&app, "/api/invoices/search?term=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (_, body) = get_json(&app, "/api/invoices/search").await;
    assert_eq!(body, json!([]));

    let long_term = "x".repeat(300);
    let (status, body) = get_json(&app, &format!("/api/invoices/search?term={}", long_term)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_get_invoice_by_number() {
    let app = setup().await;
    post_json(&app, "/api/invoices", &asha_draft()).await;

    let (status, body) = get_json(&app, "/api/invoices/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["patientId"], "UHID-0001");
    assert_eq!(body["date"], "2026-03-01");

    let (status, body) = get_json(&app, "/api/invoices/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = get_json(&app, "/api/invoices/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_print_view() {
    let app = setup().await;
    post_json(&app, "/api/invoices", &asha_draft()).await;

    let request = Request::builder()
        .uri("/api/invoices/1/print")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("City Care Clinic"));
    assert!(text.contains("Invoice No: 1"));
    assert!(text.contains("Asha Rao (UHID-0001)"));
    assert!(text.contains("770.00"));

    let (status, _) = send(
        &app,
        Request::builder()
            .uri("/api/invoices/2/print")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = setup().await;

    let (status, bytes) = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"OK");
}
