//! Transfer events and the records derived from them.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use tokenledger_common::{decimal, AccountId, Amount, LedgerError, Result, TransferId, TxHash};

/// A decoded transfer event as delivered by the indexing framework.
///
/// `value` is signed so that malformed input can be represented and
/// rejected; see [`RawTransferEvent::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransferEvent {
    /// Event-log identifier.
    pub id: TransferId,
    /// Height of the originating block.
    pub block: u64,
    /// Sender account.
    pub from: AccountId,
    /// Recipient account.
    pub to: AccountId,
    /// Amount moved.
    #[serde(with = "decimal")]
    pub value: BigInt,
    /// Originating transaction.
    #[serde(alias = "txnHash")]
    pub txn_hash: TxHash,
}

impl RawTransferEvent {
    pub fn new(
        id: impl Into<TransferId>,
        block: u64,
        from: impl Into<AccountId>,
        to: impl Into<AccountId>,
        value: impl Into<BigInt>,
        txn_hash: impl Into<TxHash>,
    ) -> Self {
        Self {
            id: id.into(),
            block,
            from: from.into(),
            to: to.into(),
            value: value.into(),
            txn_hash: txn_hash.into(),
        }
    }

    /// Check the event's own fields and return its value as an unsigned amount.
    ///
    /// `index` is the event's position in its batch, used when the id itself
    /// is missing.
    pub fn validate(&self, index: usize) -> Result<Amount> {
        if !self.id.is_valid() {
            return Err(LedgerError::EmptyTransferId { index });
        }
        if !self.from.is_valid() {
            return Err(LedgerError::EmptyAccountId {
                transfer_id: self.id.clone(),
                field: "from",
            });
        }
        if !self.to.is_valid() {
            return Err(LedgerError::EmptyAccountId {
                transfer_id: self.id.clone(),
                field: "to",
            });
        }
        self.value
            .to_biguint()
            .ok_or_else(|| LedgerError::NegativeValue {
                transfer_id: self.id.clone(),
                value: self.value.to_string(),
            })
    }

    pub fn is_self_transfer(&self) -> bool {
        self.from == self.to
    }
}

/// An immutable record of value moved between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    pub block: u64,
    pub from: AccountId,
    pub to: AccountId,
    #[serde(with = "decimal")]
    pub value: Amount,
    pub txn_hash: TxHash,
}

impl Transfer {
    /// Build the record for an already validated event.
    pub fn from_raw(raw: &RawTransferEvent, value: Amount) -> Self {
        Self {
            id: raw.id.clone(),
            block: raw.block,
            from: raw.from.clone(),
            to: raw.to.clone(),
            value,
            txn_hash: raw.txn_hash.clone(),
        }
    }
}
