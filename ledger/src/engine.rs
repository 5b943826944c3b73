//! Core reconciliation engine.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use tokenledger_common::{AccountId, Amount, LedgerError, Result};

use crate::balance::BalanceSheet;
use crate::batch::ReconciledBatch;
use crate::store::{BalanceLookup, LedgerSink};
use crate::transfer::{RawTransferEvent, Transfer};

/// Folds batches of transfer events into balance updates.
///
/// Holds no state between calls: reconciling the same batch against the same
/// stored balances always yields the same output, so a batch whose commit
/// failed can simply be reconciled again.
pub struct LedgerEngine {
    lookup: Arc<dyn BalanceLookup>,
}

impl LedgerEngine {
    /// Create a new ledger engine.
    pub fn new(lookup: Arc<dyn BalanceLookup>) -> Self {
        Self { lookup }
    }

    /// Compute the transfers and account snapshots for `batch`.
    pub async fn reconcile(&self, batch: &[RawTransferEvent]) -> Result<ReconciledBatch> {
        reconcile(batch, &*self.lookup).await
    }

    /// Reconcile `batch` and commit the result to `sink`.
    ///
    /// Nothing is committed if reconciliation fails.
    #[instrument(skip_all, fields(events = batch.len()))]
    pub async fn process(
        &self,
        batch: &[RawTransferEvent],
        sink: &dyn LedgerSink,
    ) -> Result<ReconciledBatch> {
        let reconciled = self.reconcile(batch).await?;

        if let Err(e) = sink.commit(&reconciled).await {
            warn!(error = %e, "Failed to commit batch");
            return Err(e);
        }

        Ok(reconciled)
    }
}

/// Compute the transfers and account snapshots for `batch`.
///
/// The whole batch is validated before anything else happens. Then the
/// distinct accounts are read with a single `find_accounts` call and every
/// event is folded into the working balances in input order. An empty batch
/// makes no lookup call.
#[instrument(skip_all, fields(events = batch.len()))]
pub async fn reconcile<L>(batch: &[RawTransferEvent], lookup: &L) -> Result<ReconciledBatch>
where
    L: BalanceLookup + ?Sized,
{
    let values = validate_batch(batch).map_err(|e| {
        warn!(error = %e, code = e.error_code(), "Rejected batch");
        e
    })?;

    if batch.is_empty() {
        return Ok(ReconciledBatch::empty());
    }

    let ids = involved_accounts(batch);
    let found = lookup.find_accounts(&ids).await.map_err(|e| {
        warn!(error = %e, accounts = ids.len(), "Balance lookup failed");
        e
    })?;
    debug!(requested = ids.len(), found = found.len(), "Loaded stored accounts");

    let mut sheet = BalanceSheet::open(ids, found);
    let mut transfers = Vec::with_capacity(batch.len());

    for (raw, value) in batch.iter().zip(values) {
        let transfer = Transfer::from_raw(raw, value);
        sheet.apply(&transfer);
        transfers.push(transfer);
    }

    let reconciled = ReconciledBatch::new(transfers, sheet);

    info!(
        transfers = reconciled.transfers.len(),
        accounts = reconciled.accounts.len(),
        created = reconciled.created_accounts().count(),
        "Batch reconciled"
    );

    Ok(reconciled)
}

/// Validate every event, returning their values in batch order.
///
/// Fails on the first malformed event or repeated id.
pub fn validate_batch(batch: &[RawTransferEvent]) -> Result<Vec<Amount>> {
    let mut seen = HashSet::with_capacity(batch.len());

    batch
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let value = raw.validate(index)?;
            if !seen.insert(&raw.id) {
                return Err(LedgerError::DuplicateTransferId(raw.id.clone()));
            }
            Ok(value)
        })
        .collect()
}

/// Distinct account ids referenced as sender or recipient.
pub fn involved_accounts(batch: &[RawTransferEvent]) -> BTreeSet<AccountId> {
    batch
        .iter()
        .flat_map(|raw| [raw.from.clone(), raw.to.clone()])
        .collect()
}
