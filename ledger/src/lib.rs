//! TokenLedger Reconciliation Engine
//!
//! Folds ordered batches of token transfer events into account balance
//! updates and transfer records, ready to be committed atomically.

pub mod engine;
pub mod account;
pub mod transfer;
pub mod balance;
pub mod batch;
pub mod store;
pub mod memory;

pub use engine::{reconcile, LedgerEngine};
pub use account::{Account, AccountOrigin, AccountSlot};
pub use transfer::{RawTransferEvent, Transfer};
pub use balance::{BalanceChange, BalanceSheet};
pub use batch::ReconciledBatch;
pub use store::{BalanceLookup, LedgerSink};
pub use memory::MemoryLedgerStore;
