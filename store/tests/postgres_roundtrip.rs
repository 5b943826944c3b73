//! Round trips against a live PostgreSQL instance.
//!
//! Run with `DATABASE_URL=postgres://... cargo test -p tokenledger-store -- --ignored`.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokenledger_common::{AccountId, Balance, TransferId};
use tokenledger_ledger::{Account, LedgerEngine, LedgerSink, RawTransferEvent};
use tokenledger_store::{PgLedgerStore, StoreConfig};

// Mirrors the framework's migration for the two tables.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS transfer (
        id character varying PRIMARY KEY,
        block integer NOT NULL,
        "from" text NOT NULL,
        "to" text NOT NULL,
        value numeric NOT NULL,
        txn_hash text NOT NULL
    )
    "#,
    r#"CREATE INDEX IF NOT EXISTS idx_transfer_from ON transfer ("from")"#,
    r#"CREATE INDEX IF NOT EXISTS idx_transfer_to ON transfer ("to")"#,
    r#"CREATE INDEX IF NOT EXISTS idx_transfer_txn_hash ON transfer (txn_hash)"#,
    r#"
    CREATE TABLE IF NOT EXISTS account (
        id character varying PRIMARY KEY,
        balance numeric NOT NULL
    )
    "#,
];

async fn connect() -> PgLedgerStore {
    let store = PgLedgerStore::connect(&StoreConfig::from_env()).await.unwrap();
    for statement in SCHEMA {
        sqlx::query(statement).execute(store.pool()).await.unwrap();
    }
    store
}

/// Prefix keeping rows of concurrent runs apart.
fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    format!("{}-{}", prefix, nanos)
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_process_transfer_updates_accounts() {
    let store = Arc::new(connect().await);
    let run = unique("roundtrip");
    let from = AccountId::new(format!("{}-0xfrom", run));
    let to = AccountId::new(format!("{}-0xto", run));

    sqlx::query("INSERT INTO account (id, balance) VALUES ($1, 1000), ($2, 0)")
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(store.pool())
        .await
        .unwrap();

    let engine = LedgerEngine::new(store.clone());
    let batch = vec![RawTransferEvent::new(
        format!("{}-tx1", run),
        1,
        from.clone(),
        to.clone(),
        250,
        "hash1",
    )];

    let result = engine.process(&batch, &*store).await.unwrap();

    assert_eq!(result.transfers.len(), 1);
    assert_eq!(result.accounts.len(), 2);
    assert_eq!(
        store.get_account(&from).await.unwrap(),
        Some(Account::new(from.clone(), 750))
    );
    assert_eq!(
        store.get_account(&to).await.unwrap(),
        Some(Account::new(to.clone(), 250))
    );
    assert_eq!(
        store.get_transfer(&TransferId::new(format!("{}-tx1", run))).await.unwrap(),
        Some(result.transfers[0].clone())
    );
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_recommit_is_idempotent_and_keeps_large_values() {
    let store = Arc::new(connect().await);
    let run = unique("idempotent");
    let whale = AccountId::new(format!("{}-0xwhale", run));
    let sink = AccountId::new(format!("{}-0xsink", run));
    let huge: Balance = "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        .parse()
        .unwrap();

    let engine = LedgerEngine::new(store.clone());
    let batch = vec![RawTransferEvent::new(
        format!("{}-tx1", run),
        6082465,
        whale.clone(),
        sink.clone(),
        huge.clone(),
        "0xhash",
    )];

    let reconciled = engine.reconcile(&batch).await.unwrap();
    store.commit(&reconciled).await.unwrap();
    store.commit(&reconciled).await.unwrap();

    assert_eq!(store.get_account(&whale).await.unwrap().unwrap().balance, -huge.clone());
    assert_eq!(store.get_account(&sink).await.unwrap().unwrap().balance, huge);
}
