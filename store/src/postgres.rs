//! PostgreSQL implementation of the ledger ports.
//!
//! NUMERIC columns cross the driver as text (`$n::NUMERIC` on the way in,
//! `col::TEXT` on the way out) so no precision is lost for 256-bit amounts.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, instrument, warn};

use tokenledger_common::{parse_amount, parse_balance, AccountId, LedgerError, Result, TransferId, TxHash};
use tokenledger_ledger::{Account, BalanceLookup, LedgerSink, ReconciledBatch, Transfer};

use crate::config::StoreConfig;

/// Ledger store over the `account` and `transfer` tables.
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool described by `config`.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        config.validate()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await
            .map_err(|e| LedgerError::DatabaseError(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Connected to ledger database"
        );

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get a single stored account.
    pub async fn get_account(&self, id: &AccountId) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, balance::TEXT AS balance
            FROM account
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LedgerError::DatabaseError(e.to_string()))?;

        row.map(AccountRow::into_account).transpose()
    }

    /// Get a single stored transfer.
    pub async fn get_transfer(&self, id: &TransferId) -> Result<Option<Transfer>> {
        let row = sqlx::query_as::<_, TransferRow>(
            r#"
            SELECT id, block, "from", "to", value::TEXT AS value, txn_hash
            FROM transfer
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LedgerError::DatabaseError(e.to_string()))?;

        row.map(TransferRow::into_transfer).transpose()
    }
}

#[async_trait]
impl BalanceLookup for PgLedgerStore {
    #[instrument(skip_all, fields(accounts = ids.len()))]
    async fn find_accounts(&self, ids: &BTreeSet<AccountId>) -> Result<Vec<Account>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| id.as_str().to_owned()).collect();

        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, balance::TEXT AS balance
            FROM account
            WHERE id = ANY($1)
            "#,
        )
        .bind(keys)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Account lookup failed");
            LedgerError::LookupFailed(e.to_string())
        })?;

        debug!(found = rows.len(), "Loaded accounts");

        rows.into_iter().map(AccountRow::into_account).collect()
    }
}

#[async_trait]
impl LedgerSink for PgLedgerStore {
    #[instrument(
        skip_all,
        fields(transfers = batch.transfers.len(), accounts = batch.accounts.len())
    )]
    async fn commit(&self, batch: &ReconciledBatch) -> Result<()> {
        if batch.transfers.is_empty() && batch.accounts.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| LedgerError::DatabaseError(e.to_string()))?;

        for transfer in &batch.transfers {
            sqlx::query(
                r#"
                INSERT INTO transfer (id, block, "from", "to", value, txn_hash)
                VALUES ($1, $2, $3, $4, $5::NUMERIC, $6)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(transfer.id.as_str())
            .bind(block_to_column(transfer)?)
            .bind(transfer.from.as_str())
            .bind(transfer.to.as_str())
            .bind(transfer.value.to_string())
            .bind(transfer.txn_hash.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| LedgerError::DatabaseError(e.to_string()))?;
        }

        for account in &batch.accounts {
            sqlx::query(
                r#"
                INSERT INTO account (id, balance)
                VALUES ($1, $2::NUMERIC)
                ON CONFLICT (id) DO UPDATE SET balance = EXCLUDED.balance
                "#,
            )
            .bind(account.id.as_str())
            .bind(account.balance.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| LedgerError::DatabaseError(e.to_string()))?;
        }

        tx.commit().await.map_err(|e| {
            warn!(error = %e, "Batch commit failed");
            LedgerError::DatabaseError(e.to_string())
        })?;

        debug!("Batch committed");
        Ok(())
    }
}

// =============================================================================
// Row types
// =============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: String,
    balance: String,
}

impl AccountRow {
    fn into_account(self) -> Result<Account> {
        Ok(Account {
            balance: parse_balance(&self.balance)?,
            id: AccountId::new(self.id),
        })
    }
}

#[derive(sqlx::FromRow)]
struct TransferRow {
    id: String,
    block: i32,
    from: String,
    to: String,
    value: String,
    txn_hash: String,
}

impl TransferRow {
    fn into_transfer(self) -> Result<Transfer> {
        let block = u64::try_from(self.block).map_err(|_| {
            LedgerError::InvalidRecord(format!("transfer.block is negative: {}", self.block))
        })?;

        Ok(Transfer {
            id: TransferId::new(self.id),
            block,
            from: AccountId::new(self.from),
            to: AccountId::new(self.to),
            value: parse_amount(&self.value)?,
            txn_hash: TxHash::new(self.txn_hash),
        })
    }
}

/// The `block` column is a 32-bit INTEGER.
fn block_to_column(transfer: &Transfer) -> Result<i32> {
    i32::try_from(transfer.block).map_err(|_| {
        LedgerError::InvalidRecord(format!(
            "block {} of transfer {} exceeds the INTEGER column range",
            transfer.block, transfer.id
        ))
    })
}
