use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, web::ServiceConfig, App, HttpServer};
use log::*;
use payhere_tools::{RemoteStatusProvider, RetrievalClient};
use payment_engine::{traits::PaymentStore, PaymentFlowApi, SqliteDatabase};

use crate::{
    config::{ProxyConfig, ServerConfig},
    errors::ServerError,
    routes::{health, InitiatePaymentRoute, PaymentByOrderIdRoute, PayhereWebhookRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    config.validate().map_err(|e| {
        error!("🚀️ Refusing to start. {e}");
        e
    })?;
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let remote = RetrievalClient::new(&config.payhere).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db, remote)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Builds the server. Every worker shares a single [`PaymentFlowApi`], so the PayHere access token and the database
/// pool are shared too.
pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    remote: RetrievalClient,
) -> Result<Server, ServerError> {
    let api = web::Data::new(PaymentFlowApi::new(db, remote, config.payhere.clone()));
    let proxy = web::Data::new(config.proxy_config());
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("pgv::access_log"))
            .configure(configure_app::<SqliteDatabase, RetrievalClient>(api.clone(), proxy.clone()))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Registers the shared state and every route of the server.
pub fn configure_app<B, R>(
    api: web::Data<PaymentFlowApi<B, R>>,
    proxy: web::Data<ProxyConfig>,
) -> impl FnOnce(&mut ServiceConfig)
where
    B: PaymentStore + 'static,
    R: RemoteStatusProvider + 'static,
{
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(api)
            .app_data(proxy)
            .service(health)
            .service(InitiatePaymentRoute::<B, R>::new())
            .service(PayhereWebhookRoute::<B, R>::new())
            .service(PaymentByOrderIdRoute::<B, R>::new());
    }
}
