//! In-memory ledger store.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use tokenledger_common::{AccountId, Balance, Result, TransferId};

use crate::account::Account;
use crate::batch::ReconciledBatch;
use crate::store::{BalanceLookup, LedgerSink};
use crate::transfer::Transfer;

#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<AccountId, Account>,
    transfers: HashMap<TransferId, Transfer>,
}

/// Ledger store backed by process memory.
///
/// Both maps sit behind one lock, so a commit is observed all at once.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    state: RwLock<MemoryState>,
    lookup_calls: AtomicUsize,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with accounts.
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.write();
            for account in accounts {
                state.accounts.insert(account.id.clone(), account);
            }
        }
        store
    }

    pub fn balance_of(&self, id: &AccountId) -> Option<Balance> {
        self.state.read().accounts.get(id).map(|a| a.balance.clone())
    }

    pub fn transfer(&self, id: &TransferId) -> Option<Transfer> {
        self.state.read().transfers.get(id).cloned()
    }

    pub fn account_count(&self) -> usize {
        self.state.read().accounts.len()
    }

    pub fn transfer_count(&self) -> usize {
        self.state.read().transfers.len()
    }

    /// Number of `find_accounts` calls served so far.
    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BalanceLookup for MemoryLedgerStore {
    async fn find_accounts(&self, ids: &BTreeSet<AccountId>) -> Result<Vec<Account>> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);

        let state = self.state.read();
        let found: Vec<Account> = ids
            .iter()
            .filter_map(|id| state.accounts.get(id).cloned())
            .collect();

        debug!(requested = ids.len(), found = found.len(), "Memory lookup");
        Ok(found)
    }
}

#[async_trait]
impl LedgerSink for MemoryLedgerStore {
    async fn commit(&self, batch: &ReconciledBatch) -> Result<()> {
        let mut state = self.state.write();

        for transfer in &batch.transfers {
            state
                .transfers
                .entry(transfer.id.clone())
                .or_insert_with(|| transfer.clone());
        }

        for account in &batch.accounts {
            state.accounts.insert(account.id.clone(), account.clone());
        }

        debug!(
            transfers = batch.transfers.len(),
            accounts = batch.accounts.len(),
            "Memory commit"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenledger_common::{Amount, TxHash};

    fn ids(list: &[&str]) -> BTreeSet<AccountId> {
        list.iter().map(|s| AccountId::new(*s)).collect()
    }

    #[tokio::test]
    async fn test_lookup_returns_only_existing() {
        let store = MemoryLedgerStore::with_accounts(vec![Account::new("0xa", 1000)]);

        let found = store.find_accounts(&ids(&["0xa", "0xb"])).await.unwrap();

        assert_eq!(found, vec![Account::new("0xa", 1000)]);
        assert_eq!(store.lookup_calls(), 1);
    }

    #[tokio::test]
    async fn test_commit_overwrites_balances_and_keeps_transfers() {
        let store = MemoryLedgerStore::with_accounts(vec![Account::new("0xa", 1000)]);
        let original = Transfer {
            id: TransferId::new("t1"),
            block: 1,
            from: AccountId::new("0xa"),
            to: AccountId::new("0xb"),
            value: Amount::from(250u32),
            txn_hash: TxHash::new("0xh"),
        };

        let batch = ReconciledBatch {
            transfers: vec![original.clone()],
            accounts: vec![Account::new("0xa", 750), Account::new("0xb", 250)],
            changes: Vec::new(),
        };
        store.commit(&batch).await.unwrap();

        let mut replay = batch.clone();
        replay.transfers[0].block = 99;
        store.commit(&replay).await.unwrap();

        assert_eq!(store.balance_of(&AccountId::new("0xa")), Some(Balance::from(750)));
        assert_eq!(store.balance_of(&AccountId::new("0xb")), Some(Balance::from(250)));
        assert_eq!(store.transfer(&TransferId::new("t1")), Some(original));
        assert_eq!(store.transfer_count(), 1);
        assert_eq!(store.account_count(), 2);
    }
}
