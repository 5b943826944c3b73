//! Working balances for one batch.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use tokenledger_common::{decimal, AccountId, Balance};

use crate::account::{Account, AccountOrigin, AccountSlot};
use crate::transfer::Transfer;

/// Balance movement of a single account across one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
    /// Account affected.
    pub account_id: AccountId,
    /// Whether the account existed before the batch.
    pub origin: AccountOrigin,
    /// Balance before the batch (zero for created accounts).
    #[serde(with = "decimal")]
    pub balance_before: Balance,
    /// Balance after the batch.
    #[serde(with = "decimal")]
    pub balance_after: Balance,
}

impl BalanceChange {
    /// Signed change over the batch.
    pub fn delta(&self) -> Balance {
        &self.balance_after - &self.balance_before
    }
}

#[derive(Debug)]
struct SheetEntry {
    origin: AccountOrigin,
    opening: Balance,
    account: Account,
}

/// Exclusive in-memory balance map for a single reconciliation.
///
/// Keyed by account id in a `BTreeMap` so that the emitted accounts come out
/// in id order regardless of lookup order.
#[derive(Debug, Default)]
pub struct BalanceSheet {
    entries: BTreeMap<AccountId, SheetEntry>,
}

impl BalanceSheet {
    /// Seed the sheet with every id in `ids`.
    ///
    /// Ids present in `found` open at their stored balance, the rest at zero.
    /// Records in `found` whose id is not in `ids` are ignored.
    pub fn open(ids: BTreeSet<AccountId>, found: Vec<Account>) -> Self {
        let mut found: HashMap<AccountId, Account> =
            found.into_iter().map(|a| (a.id.clone(), a)).collect();

        let entries = ids
            .into_iter()
            .map(|id| {
                let slot = match found.remove(&id) {
                    Some(account) => AccountSlot::Found(account),
                    None => AccountSlot::Missing(id.clone()),
                };
                let origin = slot.origin();
                let account = slot.into_opening();
                let entry = SheetEntry {
                    origin,
                    opening: account.balance.clone(),
                    account,
                };
                (id, entry)
            })
            .collect();

        Self { entries }
    }

    /// Apply one transfer: debit the sender, credit the recipient.
    ///
    /// Accounts not seeded by [`BalanceSheet::open`] are opened at zero.
    pub fn apply(&mut self, transfer: &Transfer) {
        self.entry(&transfer.from).account.debit(&transfer.value);
        self.entry(&transfer.to).account.credit(&transfer.value);
    }

    fn entry(&mut self, id: &AccountId) -> &mut SheetEntry {
        self.entries
            .entry(id.clone())
            .or_insert_with(|| SheetEntry {
                origin: AccountOrigin::Created,
                opening: Balance::default(),
                account: Account::zero(id.clone()),
            })
    }

    pub fn balance_of(&self, id: &AccountId) -> Option<&Balance> {
        self.entries.get(id).map(|e| &e.account.balance)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Final account snapshots and their changes, both in id order.
    pub fn into_parts(self) -> (Vec<Account>, Vec<BalanceChange>) {
        self.entries
            .into_values()
            .map(|entry| {
                let change = BalanceChange {
                    account_id: entry.account.id.clone(),
                    origin: entry.origin,
                    balance_before: entry.opening,
                    balance_after: entry.account.balance.clone(),
                };
                (entry.account, change)
            })
            .unzip()
    }
}
