//! SQLite implementation of the request ledger.

use std::path::Path;

use async_trait::async_trait;
use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use synth_bridge_primitives::types::{ChainId, RequestId};
use tracing::{debug, trace};

use super::{
    constants::{DB_FILE_NAME, DEFAULT_BUSY_TIMEOUT},
    errors::StorageError,
    types::{decode_state, encode_state, DbEnvelope, DbRequestId, SETTLED},
};
use crate::{
    errors::{DbError, DbResult},
    ledger::{RequestEnvelope, RequestLedgerDb, RequestRecord, RequestState},
};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// A row of the `requests` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct RequestRow {
    /// The bincode-serialized envelope.
    envelope: DbEnvelope,

    /// `sent`, `settled` or `failed`.
    state: String,

    /// Why the last attempt failed, for `failed` requests.
    failure: Option<String>,

    attempts: i64,

    ignored: i64,
}

impl TryFrom<RequestRow> for RequestRecord {
    type Error = StorageError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let count =
            |value: i64| u32::try_from(value).map_err(|_| StorageError::CounterOutOfRange(value));

        Ok(Self {
            state: decode_state(&row.state, row.failure)?,
            attempts: count(row.attempts)?,
            ignored: count(row.ignored)?,
            envelope: row.envelope.into_inner(),
        })
    }
}

/// [`RequestLedgerDb`] backed by SQLite.
#[derive(Debug, Clone)]
pub struct SqliteRequestLedger {
    pool: SqlitePool,
}

impl SqliteRequestLedger {
    /// Wraps a pool whose schema is already migrated.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the ledger file in `datadir` and migrates it.
    pub async fn open(datadir: impl AsRef<Path>) -> DbResult<Self> {
        let path = datadir.as_ref().join(DB_FILE_NAME);
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(DEFAULT_BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(StorageError::from)?;
        debug!(path = %path.display(), "opened request ledger");

        let ledger = Self::new(pool);
        ledger.migrate().await?;
        Ok(ledger)
    }

    /// A migrated ledger living in memory.
    ///
    /// The pool holds a single connection that is never recycled, since the database disappears
    /// with it.
    pub async fn in_memory() -> DbResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(StorageError::from)?;

        let ledger = Self::new(pool);
        ledger.migrate().await?;
        Ok(ledger)
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> DbResult<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }

    async fn increment(&self, request_id: RequestId, column: Counter) -> DbResult<u32> {
        let query = match column {
            Counter::Attempts => {
                "UPDATE requests SET attempts = attempts + 1 WHERE request_id = $1 RETURNING attempts"
            }
            Counter::Ignored => {
                "UPDATE requests SET ignored = ignored + 1 WHERE request_id = $1 RETURNING ignored"
            }
        };

        let value: i64 = sqlx::query_scalar(query)
            .bind(DbRequestId::from(request_id))
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?
            .ok_or(DbError::NotFound(request_id))?;

        let value = u32::try_from(value).map_err(|_| StorageError::CounterOutOfRange(value))?;
        Ok(value)
    }
}

fn chain_column(chain_id: ChainId) -> Result<i64, StorageError> {
    i64::try_from(chain_id.value()).map_err(|_| StorageError::ChainIdOutOfRange(chain_id))
}

#[derive(Debug, Clone, Copy)]
enum Counter {
    Attempts,
    Ignored,
}

#[async_trait]
impl RequestLedgerDb for SqliteRequestLedger {
    async fn record_sent(&self, envelope: RequestEnvelope) -> DbResult<bool> {
        let request_id = envelope.request_id;
        let source_chain = chain_column(envelope.source_chain)?;
        let (state, _) = encode_state(&RequestState::Sent);

        let result = sqlx::query(
            "INSERT INTO requests (request_id, source_chain, envelope, state)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (request_id) DO NOTHING",
        )
        .bind(DbRequestId::from(request_id))
        .bind(source_chain)
        .bind(DbEnvelope::from(envelope))
        .bind(state)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        let inserted = result.rows_affected() == 1;
        trace!(%request_id, inserted, "request recorded");
        Ok(inserted)
    }

    async fn get_request(&self, request_id: RequestId) -> DbResult<Option<RequestRecord>> {
        let row = sqlx::query_as::<_, RequestRow>(
            "SELECT envelope, state, failure, attempts, ignored
                FROM requests
                WHERE request_id = $1",
        )
        .bind(DbRequestId::from(request_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(row.map(RequestRecord::try_from).transpose()?)
    }

    async fn record_attempt(&self, request_id: RequestId) -> DbResult<u32> {
        self.increment(request_id, Counter::Attempts).await
    }

    async fn set_state(&self, request_id: RequestId, state: RequestState) -> DbResult<()> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        let current: Option<String> =
            sqlx::query_scalar("SELECT state FROM requests WHERE request_id = $1")
                .bind(DbRequestId::from(request_id))
                .fetch_optional(&mut *tx)
                .await
                .map_err(StorageError::from)?;

        match current.as_deref() {
            None => return Err(DbError::NotFound(request_id)),
            Some(SETTLED) => return Err(DbError::AlreadySettled(request_id)),
            Some(_) => {}
        }

        let (state, failure) = encode_state(&state);
        sqlx::query("UPDATE requests SET state = $1, failure = $2 WHERE request_id = $3")
            .bind(state)
            .bind(failure)
            .bind(DbRequestId::from(request_id))
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        tx.commit().await.map_err(StorageError::from)?;

        Ok(())
    }

    async fn record_ignored(&self, request_id: RequestId) -> DbResult<u32> {
        self.increment(request_id, Counter::Ignored).await
    }

    async fn pending(&self) -> DbResult<Vec<RequestRecord>> {
        let rows = sqlx::query_as::<_, RequestRow>(
            "SELECT envelope, state, failure, attempts, ignored
                FROM requests
                WHERE state != $1
                ORDER BY seq",
        )
        .bind(SETTLED)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;

        let records = rows
            .into_iter()
            .map(RequestRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    async fn sent_count(&self, source_chain: ChainId) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM requests WHERE source_chain = $1")
            .bind(chain_column(source_chain)?)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;

        let count = u64::try_from(count).map_err(|_| StorageError::CounterOutOfRange(count))?;
        Ok(count)
    }
}
