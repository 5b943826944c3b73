//! Ports between the engine and the backing store.

use std::collections::BTreeSet;

use async_trait::async_trait;

use tokenledger_common::{AccountId, Result};

use crate::account::Account;
use crate::batch::ReconciledBatch;

/// Bulk read of stored account balances.
#[async_trait]
pub trait BalanceLookup: Send + Sync {
    /// Fetch the stored accounts among `ids`.
    ///
    /// Ids with no stored record are absent from the result; they are never
    /// returned as zero-balance accounts.
    async fn find_accounts(&self, ids: &BTreeSet<AccountId>) -> Result<Vec<Account>>;
}

/// Destination for reconciled batches.
#[async_trait]
pub trait LedgerSink: Send + Sync {
    /// Persist a batch atomically.
    ///
    /// Transfers are inserted once by id and left untouched if already
    /// present. Accounts are upserted by id, overwriting the balance.
    async fn commit(&self, batch: &ReconciledBatch) -> Result<()>;
}
