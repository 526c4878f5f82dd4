use chrono::Utc;
use log::*;
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewPayment, PaymentRecord, PaymentStatus},
};

const PAYMENT_COLUMNS: &str = "order_id, merchant_id, first_name, last_name, email, phone, address, city, country, \
                               items, amount, currency, status, created_at, updated_at";

/// Inserts a new pending payment and returns the order id the database assigned to it. This is not atomic. You can
/// embed this call inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection
/// argument.
pub async fn insert_payment(payment: NewPayment, conn: &mut SqliteConnection) -> Result<i64, SqliteDatabaseError> {
    let now = Utc::now();
    let order_id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO payments (
                merchant_id,
                first_name,
                last_name,
                email,
                phone,
                address,
                city,
                country,
                amount,
                currency,
                status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING order_id;
        "#,
    )
    .bind(payment.merchant_id)
    .bind(payment.first_name)
    .bind(payment.last_name)
    .bind(payment.email)
    .bind(payment.phone)
    .bind(payment.address)
    .bind(payment.city)
    .bind(payment.country)
    .bind(payment.amount)
    .bind(payment.currency)
    .bind(PaymentStatus::Pending)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    sqlx::query("UPDATE payments SET items = $1 WHERE order_id = $2")
        .bind(format!("Payment for Order {order_id}"))
        .bind(order_id)
        .execute(conn)
        .await?;
    trace!("🗃️ Inserted payment #{order_id}");
    Ok(order_id)
}

pub async fn fetch_payment(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentRecord>, SqliteDatabaseError> {
    let payment = sqlx::query_as::<_, PaymentRecord>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE order_id = $1"
    ))
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}

/// Sets the status of a payment, but only if it is currently pending. Returns true if a row was written.
///
/// Setting a payment to `Pending` is never a transition, so it always returns false.
pub async fn update_status_if_pending(
    order_id: i64,
    status: PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    if status == PaymentStatus::Pending {
        return Ok(false);
    }
    let result = sqlx::query("UPDATE payments SET status = $1, updated_at = $2 WHERE order_id = $3 AND status = $4")
        .bind(status)
        .bind(Utc::now())
        .bind(order_id)
        .bind(PaymentStatus::Pending)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() == 1)
}

