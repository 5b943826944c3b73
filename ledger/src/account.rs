//! Account definitions for ledger.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use tokenledger_common::{decimal, AccountId, Amount, Balance};

/// A ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier.
    pub id: AccountId,
    /// Current balance. May be negative.
    #[serde(with = "decimal")]
    pub balance: Balance,
}

impl Account {
    /// Create an account with a known balance.
    pub fn new(id: impl Into<AccountId>, balance: impl Into<Balance>) -> Self {
        Self {
            id: id.into(),
            balance: balance.into(),
        }
    }

    /// Create an account with a zero balance.
    pub fn zero(id: AccountId) -> Self {
        Self {
            id,
            balance: BigInt::default(),
        }
    }

    /// Credit the account (increase balance).
    pub fn credit(&mut self, amount: &Amount) {
        self.balance += BigInt::from(amount.clone());
    }

    /// Debit the account (decrease balance). No sufficiency check.
    pub fn debit(&mut self, amount: &Amount) {
        self.balance -= BigInt::from(amount.clone());
    }
}

/// Where an account's opening balance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountOrigin {
    /// Returned by the balance lookup.
    Found,
    /// Unknown to the store; opened at zero in this batch.
    Created,
}

/// Result of resolving one account id against the lookup results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountSlot {
    /// The store already holds this account.
    Found(Account),
    /// The store has no record; the account starts at zero.
    Missing(AccountId),
}

impl AccountSlot {
    pub fn origin(&self) -> AccountOrigin {
        match self {
            AccountSlot::Found(_) => AccountOrigin::Found,
            AccountSlot::Missing(_) => AccountOrigin::Created,
        }
    }

    /// The account to start folding from.
    pub fn into_opening(self) -> Account {
        match self {
            AccountSlot::Found(account) => account,
            AccountSlot::Missing(id) => Account::zero(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_slot_opens_at_zero() {
        let slot = AccountSlot::Missing(AccountId::new("0xnew"));
        assert_eq!(slot.origin(), AccountOrigin::Created);
        assert_eq!(slot.into_opening(), Account::new("0xnew", 0));
    }

    #[test]
    fn test_debit_can_go_negative() {
        let mut account = Account::new("0xa", 100);
        account.debit(&Amount::from(250u32));
        assert_eq!(account.balance, BigInt::from(-150));
        account.credit(&Amount::from(150u32));
        assert_eq!(account.balance, BigInt::from(0));
    }

    #[test]
    fn test_account_json_shape() {
        let account = Account::new("0xa", -100);
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json, serde_json::json!({"id": "0xa", "balance": "-100"}));
    }
}
