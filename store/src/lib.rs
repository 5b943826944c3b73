//! TokenLedger PostgreSQL Store
//!
//! Implements the engine's balance lookup and persistence sink over the
//! `account` and `transfer` tables. The schema itself is managed by the
//! indexing framework's migrations.

pub mod config;
pub mod postgres;

pub use config::StoreConfig;
pub use postgres::PgLedgerStore;
