//! Output of a reconciliation.

use num_traits::Zero;
use serde::{Deserialize, Serialize};

use tokenledger_common::{AccountId, Balance};

use crate::account::{Account, AccountOrigin};
use crate::balance::{BalanceChange, BalanceSheet};
use crate::transfer::Transfer;

/// Entities computed for one batch, ready to be committed atomically.
///
/// `accounts` carry the full post-batch balance, so persisting them is an
/// overwrite, not an increment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledBatch {
    /// One record per input event, in input order.
    pub transfers: Vec<Transfer>,
    /// One snapshot per account touched by the batch, in id order.
    pub accounts: Vec<Account>,
    /// Per-account movement, aligned index-for-index with `accounts`.
    pub changes: Vec<BalanceChange>,
}

impl ReconciledBatch {
    pub fn new(transfers: Vec<Transfer>, sheet: BalanceSheet) -> Self {
        let (accounts, changes) = sheet.into_parts();
        Self {
            transfers,
            accounts,
            changes,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Find the post-batch snapshot of an account.
    pub fn account(&self, id: &AccountId) -> Option<&Account> {
        self.accounts
            .binary_search_by(|a| a.id.cmp(id))
            .ok()
            .map(|i| &self.accounts[i])
    }

    /// Sum of balance deltas over every account in the batch.
    pub fn net_delta(&self) -> Balance {
        self.changes
            .iter()
            .fold(Balance::zero(), |acc, change| acc + change.delta())
    }

    /// Every debit has a matching credit.
    pub fn is_conserved(&self) -> bool {
        self.net_delta().is_zero()
    }

    /// Accounts the store did not know before this batch.
    pub fn created_accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts
            .iter()
            .zip(&self.changes)
            .filter(|(_, change)| change.origin == AccountOrigin::Created)
            .map(|(account, _)| account)
    }
}
