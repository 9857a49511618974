//! Column-level types mapping ledger values to SQLite.

use sqlx::{sqlite::SqliteValueRef, Sqlite};
use synth_bridge_primitives::types::RequestId;

use super::errors::StorageError;
use crate::ledger::{RequestEnvelope, RequestState};

/// A request id stored as hex `TEXT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct DbRequestId(RequestId);

impl From<RequestId> for DbRequestId {
    fn from(value: RequestId) -> Self {
        Self(value)
    }
}

impl sqlx::Type<Sqlite> for DbRequestId {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<Sqlite>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, Sqlite> for DbRequestId {
    fn encode_by_ref(
        &self,
        buf: &mut <Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        sqlx::Encode::<'q, Sqlite>::encode_by_ref(&self.0.to_string(), buf)
    }
}

/// A request envelope stored as a bincode `BLOB`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct DbEnvelope(RequestEnvelope);

impl DbEnvelope {
    pub(super) fn into_inner(self) -> RequestEnvelope {
        self.0
    }
}

impl From<RequestEnvelope> for DbEnvelope {
    fn from(value: RequestEnvelope) -> Self {
        Self(value)
    }
}

impl sqlx::Type<Sqlite> for DbEnvelope {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <Vec<u8> as sqlx::Type<Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, Sqlite> for DbEnvelope {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let bytes: Vec<u8> = sqlx::decode::Decode::<'r, Sqlite>::decode(value)?;
        let envelope = bincode::deserialize(&bytes)
            .map_err(|_| sqlx::Error::Decode("Failed to decode RequestEnvelope".into()))?;

        Ok(Self(envelope))
    }
}

impl<'q> sqlx::Encode<'q, Sqlite> for DbEnvelope {
    fn encode_by_ref(
        &self,
        buf: &mut <Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let bytes = bincode::serialize(&self.0)
            .map_err(|_| sqlx::Error::Encode("Failed to serialize RequestEnvelope".into()))?;

        sqlx::Encode::<'q, Sqlite>::encode_by_ref(&bytes, buf)
    }
}

const SENT: &str = "sent";
pub(super) const SETTLED: &str = "settled";
const FAILED: &str = "failed";

/// Splits a state into its `state` and `failure` columns.
pub(super) fn encode_state(state: &RequestState) -> (&'static str, Option<&str>) {
    match state {
        RequestState::Sent => (SENT, None),
        RequestState::Settled => (SETTLED, None),
        RequestState::Failed { reason } => (FAILED, Some(reason.as_str())),
    }
}

pub(super) fn decode_state(
    state: &str,
    failure: Option<String>,
) -> Result<RequestState, StorageError> {
    match (state, failure) {
        (SENT, _) => Ok(RequestState::Sent),
        (SETTLED, _) => Ok(RequestState::Settled),
        (FAILED, reason) => Ok(RequestState::Failed {
            reason: reason.unwrap_or_default(),
        }),
        (other, _) => Err(StorageError::UnknownState(other.to_owned())),
    }
}
