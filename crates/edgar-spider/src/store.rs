mod sql;

use crate::{InsiderTransaction, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, trace};

/// How long a writer waits on SQLite's lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the `insider_trades` table.
///
/// Opened once at start-up and shared by reference; cloning is cheap and shares the pool.
#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if missing) the SQLite database at `url`, e.g. `sqlite://insider_trades.db`.
    ///
    /// In-memory URLs get the single-connection store of [`Store::open_in_memory`].
    pub async fn open(url: &str) -> Result<Self> {
        if is_in_memory(url) {
            debug!("{url} is in-memory, opening a single-connection store");
            return Self::open_in_memory().await;
        }

        trace!("opening insider store at {url}");
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|err| {
                error!("failed to open insider store at {url}, error({err})");
                err
            })?;
        debug!("insider store opened at {url}");

        Ok(Self { pool })
    }

    /// A private in-memory database; it lives as long as the store does.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // every connection to `:memory:` is its own database, so keep exactly one alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the table and its index if they are absent. Safe on every start.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(sql::CREATE_INSIDER_TRADES)
            .execute(&self.pool)
            .await?;
        sqlx::query(sql::CREATE_INSIDER_TRADES_CIK_INDEX)
            .execute(&self.pool)
            .await?;
        debug!("insider_trades schema ready");

        Ok(())
    }

    /// Append every transaction as a new row, in one database transaction.
    ///
    /// Rows are never deduplicated: storing the same filings twice keeps both copies.
    pub async fn insert_many(&self, transactions: &[InsiderTransaction]) -> Result<u64> {
        let time = std::time::Instant::now();
        let mut tx = self.pool.begin().await?;

        let mut inserted = 0;
        for transaction in transactions {
            inserted += sqlx::query(sql::INSERT_INSIDER_TRADE)
                .bind(&transaction.cik)
                .bind(&transaction.transaction_date)
                .bind(&transaction.form_type)
                .bind(&transaction.filing_url)
                .execute(&mut *tx)
                .await
                .map_err(|err| {
                    error!("failed to insert insider trade, error({err})");
                    err
                })?
                .rows_affected();
        }

        tx.commit().await.map_err(|err| {
            error!("failed to commit insider trades");
            err
        })?;
        debug!("{inserted} insider trades inserted in {:?}", time.elapsed());

        Ok(inserted)
    }

    /// All rows for `cik`, newest `transaction_date` first (text ordering).
    pub async fn select_by_entity(&self, cik: &str) -> Result<Vec<InsiderTransaction>> {
        let rows = sqlx::query_as::<_, InsiderTransaction>(sql::SELECT_INSIDER_TRADES_BY_CIK)
            .bind(cik)
            .fetch_all(&self.pool)
            .await?;
        trace!("{} insider trades selected for {cik}", rows.len());

        Ok(rows)
    }

    /// Delete every row. Irreversible.
    pub async fn clear_all(&self) -> Result<u64> {
        let deleted = sqlx::query(sql::DELETE_INSIDER_TRADES)
            .execute(&self.pool)
            .await?
            .rows_affected();
        debug!("{deleted} insider trades deleted");

        Ok(deleted)
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(sqlx::query_scalar::<_, i64>(sql::COUNT_INSIDER_TRADES)
            .fetch_one(&self.pool)
            .await?)
    }
}

/// `sqlite::memory:`, `sqlite://:memory:` and `?mode=memory` all name a per-connection database.
fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
