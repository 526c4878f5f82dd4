//! Reconciles locally stored payments with PayHere's view of them.
//!
//! Notifications can be lost or delayed, so a pending payment is double-checked against the retrieval API whenever it
//! is read. Terminal payments are final and are returned straight from storage.
use std::fmt::Debug;

use log::*;
use payhere_tools::{PayHereApiError, RemoteStatus, RemoteStatusProvider};

use crate::{
    db_types::{PaymentRecord, StatusUpdate},
    pe_api::errors::PaymentFlowError,
    status_mapper::map_remote_status,
    traits::PaymentStore,
};

/// The result of reading a payment through reconciliation.
#[derive(Debug, Clone)]
pub enum ReconciliationOutcome {
    /// There is no local payment for the order id.
    Missing,
    /// The stored payment, after applying anything PayHere had to tell us about it.
    Verified(PaymentRecord),
    /// The payment is pending and PayHere could not be asked about it.
    Unverified(PayHereApiError),
}

impl ReconciliationOutcome {
    /// Fails closed: only a verified record is returned.
    pub fn into_record(self) -> Option<PaymentRecord> {
        match self {
            ReconciliationOutcome::Verified(record) => Some(record),
            _ => None,
        }
    }
}

pub struct ReconciliationService<'a, B, R> {
    db: &'a B,
    remote: &'a R,
}

impl<'a, B, R> Debug for ReconciliationService<'a, B, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationService")
    }
}

impl<'a, B, R> ReconciliationService<'a, B, R>
where
    B: PaymentStore,
    R: RemoteStatusProvider,
{
    pub fn new(db: &'a B, remote: &'a R) -> Self {
        Self { db, remote }
    }

    /// Returns the current status of the payment for `order_id`, or `None` if there is no such payment or if a pending
    /// payment could not be checked with PayHere.
    ///
    /// Storage failures are errors.
    pub async fn get_current_status(&self, order_id: i64) -> Result<Option<PaymentRecord>, PaymentFlowError> {
        let outcome = self.reconcile(order_id).await?;
        Ok(outcome.into_record())
    }

    pub async fn reconcile(&self, order_id: i64) -> Result<ReconciliationOutcome, PaymentFlowError> {
        let Some(record) = self.db.fetch_payment(order_id).await? else {
            debug!("🔄️ No payment for order {order_id}");
            return Ok(ReconciliationOutcome::Missing);
        };
        if record.status.is_terminal() {
            trace!("🔄️ Payment #{order_id} is final ({}). No need to ask PayHere.", record.status);
            return Ok(ReconciliationOutcome::Verified(record));
        }
        let remote = match self.remote.get_remote_status(order_id).await {
            Ok(remote) => remote,
            Err(e) => {
                warn!("🔄️ Could not verify pending payment #{order_id} with PayHere. {e}");
                return Ok(ReconciliationOutcome::Unverified(e));
            },
        };
        let label = match remote {
            RemoteStatus::NotFound => {
                debug!("🔄️ PayHere does not know about order {order_id} yet. It stays pending.");
                return Ok(ReconciliationOutcome::Verified(record));
            },
            RemoteStatus::Found(label) => label,
        };
        let mapped = map_remote_status(&label);
        if mapped == record.status {
            trace!("🔄️ Payment #{order_id} is still {mapped}");
            return Ok(ReconciliationOutcome::Verified(record));
        }
        let outcome = match self.db.update_payment_status(order_id, mapped).await? {
            StatusUpdate::Updated(record) => {
                info!("🔄️ Payment #{order_id} reconciled to {mapped}. PayHere reports it as {label}.");
                ReconciliationOutcome::Verified(record)
            },
            StatusUpdate::Unchanged(record) => ReconciliationOutcome::Verified(record),
            StatusUpdate::Rejected(record) => {
                debug!("🔄️ Payment #{order_id} became {} before it could be reconciled", record.status);
                ReconciliationOutcome::Verified(record)
            },
            StatusUpdate::NotFound => {
                warn!("🔄️ Payment #{order_id} disappeared during reconciliation");
                ReconciliationOutcome::Missing
            },
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod test {
    use mockall::predicate::eq;
    use payhere_tools::{PayHereApiError, RemoteStatus};

    use super::*;
    use crate::{
        db_types::PaymentStatus,
        pe_api::mocks::{payment_record, with_status, MockStatusProvider, MockStore},
        traits::PaymentStoreError,
    };

    fn store_with(record: PaymentRecord) -> MockStore {
        let mut db = MockStore::new();
        let order_id = record.order_id;
        db.expect_fetch_payment().with(eq(order_id)).times(1).returning(move |_| Ok(Some(record.clone())));
        db
    }

    #[tokio::test]
    async fn missing_payment() {
        let _ = env_logger::try_init();
        let mut db = MockStore::new();
        db.expect_fetch_payment().returning(|_| Ok(None));
        let mut remote = MockStatusProvider::new();
        remote.expect_get_remote_status().never();
        let service = ReconciliationService::new(&db, &remote);
        assert!(matches!(service.reconcile(7).await.unwrap(), ReconciliationOutcome::Missing));
        assert!(service.get_current_status(7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn terminal_payments_never_hit_the_gateway() {
        let _ = env_logger::try_init();
        for status in [PaymentStatus::Success, PaymentStatus::Cancelled, PaymentStatus::Failed, PaymentStatus::Chargedback]
        {
            let stored = payment_record(42, status);
            let mut db = store_with(stored.clone());
            db.expect_update_payment_status().never();
            let mut remote = MockStatusProvider::new();
            remote.expect_get_remote_status().never();
            let service = ReconciliationService::new(&db, &remote);
            let record = service.get_current_status(42).await.unwrap().unwrap();
            assert_eq!(record, stored);
        }
    }

    #[tokio::test]
    async fn pending_payment_is_updated_from_the_gateway() {
        let _ = env_logger::try_init();
        let stored = payment_record(42, PaymentStatus::Pending);
        let updated = with_status(&stored, PaymentStatus::Success);
        let mut db = store_with(stored);
        let result = updated.clone();
        db.expect_update_payment_status()
            .with(eq(42), eq(PaymentStatus::Success))
            .times(1)
            .returning(move |_, _| Ok(StatusUpdate::Updated(result.clone())));
        let mut remote = MockStatusProvider::new();
        remote.expect_get_remote_status().with(eq(42)).times(1).returning(|_| Ok(RemoteStatus::Found("RECEIVED".into())));
        let service = ReconciliationService::new(&db, &remote);
        let record = service.get_current_status(42).await.unwrap().unwrap();
        assert_eq!(record, updated);
    }

    #[tokio::test]
    async fn refunds_and_chargebacks() {
        for (label, expected) in [("REFUNDED", PaymentStatus::Cancelled), ("CHARGEBACKED", PaymentStatus::Chargedback)] {
            let stored = payment_record(42, PaymentStatus::Pending);
            let updated = with_status(&stored, expected);
            let mut db = store_with(stored);
            db.expect_update_payment_status()
                .with(eq(42), eq(expected))
                .times(1)
                .returning(move |_, _| Ok(StatusUpdate::Updated(updated.clone())));
            let mut remote = MockStatusProvider::new();
            remote.expect_get_remote_status().returning(move |_| Ok(RemoteStatus::Found(label.to_string())));
            let service = ReconciliationService::new(&db, &remote);
            let record = service.get_current_status(42).await.unwrap().unwrap();
            assert_eq!(record.status, expected);
        }
    }

    #[tokio::test]
    async fn remote_not_found_leaves_the_record_alone() {
        let _ = env_logger::try_init();
        let stored = payment_record(42, PaymentStatus::Pending);
        let mut db = store_with(stored.clone());
        db.expect_update_payment_status().never();
        let mut remote = MockStatusProvider::new();
        remote.expect_get_remote_status().times(1).returning(|_| Ok(RemoteStatus::NotFound));
        let service = ReconciliationService::new(&db, &remote);
        let record = service.get_current_status(42).await.unwrap().unwrap();
        assert_eq!(record, stored);
    }

    #[tokio::test]
    async fn unknown_remote_status_stays_pending() {
        let stored = payment_record(42, PaymentStatus::Pending);
        let mut db = store_with(stored.clone());
        db.expect_update_payment_status().never();
        let mut remote = MockStatusProvider::new();
        remote.expect_get_remote_status().returning(|_| Ok(RemoteStatus::Found("NEW_UNKNOWN".into())));
        let service = ReconciliationService::new(&db, &remote);
        let record = service.get_current_status(42).await.unwrap().unwrap();
        assert_eq!(record, stored);
    }

    #[tokio::test]
    async fn gateway_failures_fail_closed() {
        let _ = env_logger::try_init();
        let errors = [
            PayHereApiError::UpstreamAuth { status: 401, message: "invalid_token".into() },
            PayHereApiError::UpstreamUnavailable("timed out".into()),
            PayHereApiError::ServerError("Error 500".into()),
            PayHereApiError::Configuration("Missing app id".into()),
        ];
        for err in errors {
            let mut db = store_with(payment_record(42, PaymentStatus::Pending));
            db.expect_update_payment_status().never();
            let mut remote = MockStatusProvider::new();
            let e = err.clone();
            remote.expect_get_remote_status().times(1).returning(move |_| Err(e.clone()));
            let service = ReconciliationService::new(&db, &remote);
            match service.reconcile(42).await.unwrap() {
                ReconciliationOutcome::Unverified(e) => assert_eq!(e.to_string(), err.to_string()),
                other => panic!("Expected an unverified outcome, got {other:?}"),
            }
        }
        let db = store_with(payment_record(42, PaymentStatus::Pending));
        let mut remote = MockStatusProvider::new();
        remote.expect_get_remote_status().returning(|_| Err(PayHereApiError::UpstreamUnavailable("down".into())));
        let service = ReconciliationService::new(&db, &remote);
        assert!(service.get_current_status(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_terminal_write_wins() {
        let stored = payment_record(42, PaymentStatus::Pending);
        let raced = with_status(&stored, PaymentStatus::Failed);
        let mut db = store_with(stored);
        let result = raced.clone();
        db.expect_update_payment_status().times(1).returning(move |_, _| Ok(StatusUpdate::Rejected(result.clone())));
        let mut remote = MockStatusProvider::new();
        remote.expect_get_remote_status().returning(|_| Ok(RemoteStatus::Found("RECEIVED".into())));
        let service = ReconciliationService::new(&db, &remote);
        let record = service.get_current_status(42).await.unwrap().unwrap();
        assert_eq!(record, raced);
    }

    #[tokio::test]
    async fn storage_errors_are_surfaced() {
        let mut db = MockStore::new();
        db.expect_fetch_payment().returning(|_| Err(PaymentStoreError::DatabaseError("disk I/O error".into())));
        let mut remote = MockStatusProvider::new();
        remote.expect_get_remote_status().never();
        let service = ReconciliationService::new(&db, &remote);
        let err = service.get_current_status(42).await.unwrap_err();
        assert!(matches!(err, PaymentFlowError::Storage(_)), "{err:?}");
    }

    #[tokio::test]
    async fn failed_status_writes_are_surfaced() {
        let _ = env_logger::try_init();
        let mut db = store_with(payment_record(42, PaymentStatus::Pending));
        db.expect_update_payment_status()
            .with(eq(42), eq(PaymentStatus::Success))
            .times(1)
            .returning(|_, _| Err(PaymentStoreError::DatabaseError("database is locked".into())));
        let mut remote = MockStatusProvider::new();
        remote.expect_get_remote_status().times(1).returning(|_| Ok(RemoteStatus::Found("RECEIVED".into())));
        let service = ReconciliationService::new(&db, &remote);
        let err = service.get_current_status(42).await.unwrap_err();
        assert!(matches!(err, PaymentFlowError::Storage(_)), "{err:?}");
    }
}
