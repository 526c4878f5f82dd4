//! # Payment gateway server
//! This crate hosts the HTTP front end of the payment engine. It is responsible for:
//! * Starting PayHere checkouts, by storing a pending payment and signing it.
//! * Receiving PayHere payment notifications, and applying them once their signature has been checked.
//! * Reporting payment statuses, double-checking pending payments with PayHere first.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /payments/initiate`: Creates a payment and returns the signed checkout fields.
//! * `POST /payments/payhere-webhook`: The notify URL for PayHere payment notifications.
//! * `GET /payments/{order_id}`: The verified status of a payment.
pub mod cli;
pub mod config;
pub mod errors;

pub mod helpers;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
