//! Record store for accounts and message listings.
//!
//! The auth core and resource routes only see the `UserStore` trait; the
//! Postgres implementation is the production backend and the in-memory one
//! backs the test suites.

pub mod memory;
pub mod models;
pub mod store;

pub use memory::MemoryUserStore;
pub use models::{Account, Contact, InboundMessage, NewAccount, OutboundMessage};
pub use store::{PgUserStore, UserStore};

#[cfg(test)]
pub use store::MockUserStore;
