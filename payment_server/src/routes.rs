//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Database calls and calls to PayHere are all expressed as futures,
//! so that a slow gateway never ties up a worker.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use payhere_tools::RemoteStatusProvider;
use payment_engine::{
    payment_objects::{PaymentRequest, WebhookPayload},
    traits::PaymentStore,
    PaymentFlowApi,
    ReconciliationOutcome,
};

use crate::{config::ProxyConfig, errors::ServerError, helpers::get_remote_ip};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(initiate_payment => Post "/payments/initiate" impl PaymentStore, RemoteStatusProvider);
/// Creates a pending payment and returns everything the storefront needs to post the PayHere checkout form,
/// including the signed `hash`.
pub async fn initiate_payment<B, R>(
    api: web::Data<PaymentFlowApi<B, R>>,
    body: web::Json<PaymentRequest>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentStore,
    R: RemoteStatusProvider,
{
    let request = body.into_inner();
    debug!("💻️ Received payment initiation request for {} {}", request.amount, request.currency);
    let initiation = api.initiate_payment(request).await.map_err(|e| {
        error!("💻️ Could not initiate payment. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(initiation))
}

route!(payhere_webhook => Post "/payments/payhere-webhook" impl PaymentStore, RemoteStatusProvider);
/// The notify URL for PayHere.
///
/// A notification that is authentic and well-formed is acknowledged with `true`, even if the payment was already final
/// with a different status. Anything else is a 400, so that PayHere retries it.
pub async fn payhere_webhook<B, R>(
    req: HttpRequest,
    proxy: web::Data<ProxyConfig>,
    api: web::Data<PaymentFlowApi<B, R>>,
    body: web::Form<WebhookPayload>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentStore,
    R: RemoteStatusProvider,
{
    let payload = body.into_inner();
    let peer_addr = get_remote_ip(&req, **proxy);
    info!(
        "💻️ PayHere notification received from {peer_addr:?} for order '{}' with status '{}'",
        payload.order_id, payload.status_code
    );
    let record = api.verify_webhook(&payload).await.map_err(|e| {
        warn!("💻️ PayHere notification from {peer_addr:?} was not accepted. {e}");
        ServerError::from(e)
    })?;
    debug!("💻️ Notification for payment #{} processed. Status is {}", record.order_id, record.status);
    Ok(HttpResponse::Ok().json(true))
}

route!(payment_by_order_id => Get "/payments/{order_id}" impl PaymentStore, RemoteStatusProvider);
/// Returns a payment, after checking a pending payment's status with PayHere.
///
/// If PayHere cannot be asked, the pending status is not reported at all (503), since it cannot be trusted.
pub async fn payment_by_order_id<B, R>(
    path: web::Path<String>,
    api: web::Data<PaymentFlowApi<B, R>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentStore,
    R: RemoteStatusProvider,
{
    let raw = path.into_inner();
    let order_id = raw.parse::<i64>().map_err(|e| {
        debug!("💻️ Invalid order id in request path: '{raw}'. {e}");
        ServerError::InvalidRequestPath(format!("'{raw}' is not a valid order id"))
    })?;
    trace!("💻️ GET payment for order {order_id}");
    match api.reconcile(order_id).await? {
        ReconciliationOutcome::Verified(record) => Ok(HttpResponse::Ok().json(record)),
        ReconciliationOutcome::Missing => Err(ServerError::NoRecordFound(format!("No payment for order {order_id}"))),
        ReconciliationOutcome::Unverified(e) => {
            Err(ServerError::GatewayUnavailable(format!("Payment {order_id} could not be verified. {e}")))
        },
    }
}
