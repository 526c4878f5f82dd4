use actix_web::{http::StatusCode, test::TestRequest};
use mockall::predicate::eq;
use payhere_tools::{signature::generate_notification_hash, PayHereApiError, RemoteStatus};
use payment_common::Secret;
use payment_engine::{
    db_types::{PaymentStatus, StatusUpdate},
    payment_objects::WebhookPayload,
    traits::PaymentStoreError,
};
use serde_json::Value;

use super::{
    helpers::{payhere_config, send_request},
    mocks::{payment_record, MockStatusProvider, MockStore},
};

fn notification(order_id: &str, status_code: &str) -> WebhookPayload {
    let md5sig = generate_notification_hash(
        "M001",
        order_id,
        "1000.50".parse().unwrap(),
        "LKR",
        status_code,
        &Secret::new("S3cr3t".to_string()),
    )
    .unwrap();
    WebhookPayload {
        merchant_id: "M001".into(),
        order_id: order_id.into(),
        payhere_amount: "1000.50".into(),
        payhere_currency: "LKR".into(),
        status_code: status_code.into(),
        md5sig,
        method: Some("VISA".into()),
        status_message: Some("Successfully completed the payment.".into()),
        payment_id: Some("320025071278".into()),
        ..Default::default()
    }
}

fn no_gateway() -> MockStatusProvider {
    let mut remote = MockStatusProvider::new();
    remote.expect_get_remote_status().never();
    remote
}

#[actix_web::test]
async fn health_check() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/health");
    let (status, body) = send_request(req, MockStore::new(), no_gateway(), payhere_config()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

//----------------------------------------------   Initiate  ----------------------------------------------------
#[actix_web::test]
async fn initiate_payment() {
    let _ = env_logger::try_init().ok();
    let mut db = MockStore::new();
    db.expect_create_payment().times(1).returning(|p| {
        assert_eq!(p.first_name, "Jane");
        assert_eq!(p.amount.cents(), 100050);
        Ok(payment_record(42, PaymentStatus::Pending))
    });
    let req = TestRequest::post()
        .uri("/payments/initiate")
        .set_json(serde_json::json!({ "first_name": "Jane", "last_name": "Doe", "amount": 1000.5 }));
    let (status, body) = send_request(req, db, no_gateway(), payhere_config()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["order_id"], 42);
    assert_eq!(json["merchant_id"], "M001");
    assert_eq!(json["amount"], "1000.50");
    assert_eq!(json["currency"], "LKR");
    assert_eq!(json["items"], "Payment for Order 42");
    assert_eq!(json["hash"], "8744FF928A4157E6D86F0B952DE47BE9");
    assert_eq!(json["return_url"], "https://shop.example.com/return");
    assert!(!body.contains("S3cr3t"));
}

#[actix_web::test]
async fn initiate_payment_rejects_bad_amounts() {
    let mut db = MockStore::new();
    db.expect_create_payment().never();
    let req = TestRequest::post().uri("/payments/initiate").set_json(serde_json::json!({ "amount": -5 }));
    let (status, _) = send_request(req, db, no_gateway(), payhere_config()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn initiate_payment_without_merchant_secret() {
    let mut db = MockStore::new();
    db.expect_create_payment().never();
    let config = payhere_config();
    let config = payhere_tools::PayHereConfig { merchant_secret: Secret::default(), ..config };
    let req = TestRequest::post().uri("/payments/initiate").set_json(serde_json::json!({ "amount": 10 }));
    let (status, body) = send_request(req, db, no_gateway(), config).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("Missing merchant secret"), "{body}");
}

#[actix_web::test]
async fn initiate_payment_storage_failure() {
    let mut db = MockStore::new();
    db.expect_create_payment().returning(|_| Err(PaymentStoreError::InsertError("disk full".into())));
    let req = TestRequest::post().uri("/payments/initiate").set_json(serde_json::json!({ "amount": 10 }));
    let (status, _) = send_request(req, db, no_gateway(), payhere_config()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

//----------------------------------------------   Webhook  ----------------------------------------------------
#[actix_web::test]
async fn webhook_accepts_signed_notifications() {
    let _ = env_logger::try_init().ok();
    let mut db = MockStore::new();
    db.expect_update_payment_status()
        .with(eq(42), eq(PaymentStatus::Success))
        .times(1)
        .returning(|id, s| Ok(StatusUpdate::Updated(payment_record(id, s))));
    let req = TestRequest::post().uri("/payments/payhere-webhook").set_form(notification("42", "2"));
    let (status, body) = send_request(req, db, no_gateway(), payhere_config()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "true");
}

#[actix_web::test]
async fn webhook_rejects_forged_notifications() {
    let _ = env_logger::try_init().ok();
    let mut db = MockStore::new();
    db.expect_update_payment_status().never();
    let mut payload = notification("42", "-2");
    payload.status_code = "2".into();
    let req = TestRequest::post().uri("/payments/payhere-webhook").set_form(payload);
    let (status, body) = send_request(req, db, no_gateway(), payhere_config()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Payment notification signature is invalid"}"#);
}

#[actix_web::test]
async fn webhook_rejects_malformed_notifications() {
    let mut db = MockStore::new();
    db.expect_update_payment_status().never();
    let req = TestRequest::post()
        .uri("/payments/payhere-webhook")
        .set_form([("merchant_id", "M001"), ("order_id", "42"), ("payhere_amount", "lots")]);
    let (status, body) = send_request(req, db, no_gateway(), payhere_config()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Malformed payment notification"), "{body}");
}

#[actix_web::test]
async fn webhook_for_unknown_order() {
    let mut db = MockStore::new();
    db.expect_update_payment_status().times(1).returning(|_, _| Ok(StatusUpdate::NotFound));
    let req = TestRequest::post().uri("/payments/payhere-webhook").set_form(notification("99", "2"));
    let (status, body) = send_request(req, db, no_gateway(), payhere_config()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("unknown order 99"), "{body}");
}

#[actix_web::test]
async fn conflicting_webhook_is_acknowledged() {
    let mut db = MockStore::new();
    db.expect_update_payment_status()
        .with(eq(42), eq(PaymentStatus::Failed))
        .times(1)
        .returning(|id, _| Ok(StatusUpdate::Rejected(payment_record(id, PaymentStatus::Success))));
    let req = TestRequest::post().uri("/payments/payhere-webhook").set_form(notification("42", "-2"));
    let (status, body) = send_request(req, db, no_gateway(), payhere_config()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "true");
}

//----------------------------------------------   Payment status  ----------------------------------------------
#[actix_web::test]
async fn final_payment_is_served_from_storage() {
    let mut db = MockStore::new();
    db.expect_fetch_payment().with(eq(42)).returning(|id| Ok(Some(payment_record(id, PaymentStatus::Success))));
    let req = TestRequest::get().uri("/payments/42");
    let (status, body) = send_request(req, db, no_gateway(), payhere_config()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["order_id"], 42);
    assert_eq!(json["status"], 2);
}

#[actix_web::test]
async fn pending_payment_is_reconciled() {
    let mut db = MockStore::new();
    db.expect_fetch_payment().returning(|id| Ok(Some(payment_record(id, PaymentStatus::Pending))));
    db.expect_update_payment_status()
        .with(eq(42), eq(PaymentStatus::Chargedback))
        .times(1)
        .returning(|id, s| Ok(StatusUpdate::Updated(payment_record(id, s))));
    let mut remote = MockStatusProvider::new();
    remote.expect_get_remote_status().times(1).returning(|_| Ok(RemoteStatus::Found("CHARGEBACKED".into())));
    let req = TestRequest::get().uri("/payments/42");
    let (status, body) = send_request(req, db, remote, payhere_config()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], -3);
}

#[actix_web::test]
async fn missing_payment() {
    let mut db = MockStore::new();
    db.expect_fetch_payment().returning(|_| Ok(None));
    let req = TestRequest::get().uri("/payments/42");
    let (status, _) = send_request(req, db, no_gateway(), payhere_config()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unverifiable_pending_payment() {
    let mut db = MockStore::new();
    db.expect_fetch_payment().returning(|id| Ok(Some(payment_record(id, PaymentStatus::Pending))));
    db.expect_update_payment_status().never();
    let mut remote = MockStatusProvider::new();
    remote
        .expect_get_remote_status()
        .returning(|_| Err(PayHereApiError::UpstreamUnavailable("connection timed out".into())));
    let req = TestRequest::get().uri("/payments/42");
    let (status, body) = send_request(req, db, remote, payhere_config()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("could not be verified"), "{body}");
}

#[actix_web::test]
async fn invalid_order_id() {
    let mut db = MockStore::new();
    db.expect_fetch_payment().never();
    let req = TestRequest::get().uri("/payments/not-a-number");
    let (status, _) = send_request(req, db, no_gateway(), payhere_config()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
