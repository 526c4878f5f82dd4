use chrono::{TimeZone, Utc};
use mockall::mock;
use payhere_tools::{PayHereApiError, RemoteStatus, RemoteStatusProvider};
use payment_common::Amount;
use payment_engine::{
    db_types::{Currency, NewPayment, PaymentRecord, PaymentStatus, StatusUpdate},
    traits::{PaymentStore, PaymentStoreError},
};

mock! {
    pub Store {}
    impl PaymentStore for Store {
        async fn create_payment(&self, payment: NewPayment) -> Result<PaymentRecord, PaymentStoreError>;
        async fn fetch_payment(&self, order_id: i64) -> Result<Option<PaymentRecord>, PaymentStoreError>;
        async fn update_payment_status(&self, order_id: i64, status: PaymentStatus) -> Result<StatusUpdate, PaymentStoreError>;
    }
}

mock! {
    pub StatusProvider {}
    impl RemoteStatusProvider for StatusProvider {
        async fn get_remote_status(&self, order_id: i64) -> Result<RemoteStatus, PayHereApiError>;
    }
}

pub fn payment_record(order_id: i64, status: PaymentStatus) -> PaymentRecord {
    let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    PaymentRecord {
        order_id,
        merchant_id: "M001".into(),
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        email: "jane@example.com".into(),
        phone: "0771234567".into(),
        address: "1 Galle Road".into(),
        city: "Colombo".into(),
        country: "Sri Lanka".into(),
        items: format!("Payment for Order {order_id}"),
        amount: Amount::from_cents(100050).unwrap(),
        currency: Currency::Lkr,
        status,
        created_at,
        updated_at: created_at,
    }
}
