use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use log::debug;
use payhere_tools::PayHereConfig;
use payment_common::Secret;
use payment_engine::PaymentFlowApi;

use super::mocks::{MockStatusProvider, MockStore};
use crate::{config::ProxyConfig, server::configure_app};

pub fn payhere_config() -> PayHereConfig {
    PayHereConfig {
        merchant_id: "M001".into(),
        merchant_secret: Secret::new("S3cr3t".into()),
        app_id: "app".into(),
        app_secret: Secret::new("secret".into()),
        return_url: "https://shop.example.com/return".into(),
        cancel_url: "https://shop.example.com/cancel".into(),
        notify_url: "https://api.example.com/payments/payhere-webhook".into(),
        ..Default::default()
    }
}

/// Sends `req` to an app backed by the given mocks and returns the status and body.
pub async fn send_request(
    req: TestRequest,
    db: MockStore,
    remote: MockStatusProvider,
    config: PayHereConfig,
) -> (StatusCode, String) {
    let api = web::Data::new(PaymentFlowApi::new(db, remote, config));
    let proxy = web::Data::new(ProxyConfig::default());
    let app = App::new().configure(configure_app(api, proxy));
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
    (status, body)
}
