//! Seat inventory and booking transactions.
//!
//! Handlers call into these modules; nothing here knows about HTTP.

pub mod booking;
pub mod capacity;
pub mod pricing;
pub mod read_model;
pub mod reference;
pub mod search;
pub mod stations;
