//! Wire types shared between the Rantang order service and its clients.
//!
//! - [`objects`] holds the request/response bodies of every endpoint.
//! - [`signature`] verifies payment gateway notifications.

pub mod objects;
pub mod signature;
