//! JSON codec for the persisted running order.
//!
//! The sidecar format is `{ "isConfirmed": bool, "order": [int], "timestamp": string }`.
//! Unknown fields are ignored and `null`/missing values fall back to their
//! defaults, so hand-edited or older files still decode.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::errors::OrderError;
use crate::state::OrderState;
use crate::store::RecordStore;
use crate::types::StableId;

/// Durable snapshot of an order decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Whether the order was confirmed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_confirmed: bool,
    /// Stable ids in presentation order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub order: Vec<i64>,
    /// RFC 3339 time of export.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
}

/// How strictly a confirmed snapshot must match the current record store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RestorePolicy {
    /// Reject a confirmed order whose length differs from the store.
    Strict,
    /// Skip unknown ids and append unreferenced records in store order.
    #[default]
    Reconcile,
}

/// Snapshot `state` with the current time.
pub fn export(state: &OrderState) -> PersistedState {
    export_at(state, Utc::now())
}

/// Snapshot `state` stamped with `now`.
pub fn export_at(state: &OrderState, now: DateTime<Utc>) -> PersistedState {
    PersistedState {
        is_confirmed: state.confirmed,
        order: state.order.iter().map(|id| *id as i64).collect(),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Rebuild an `OrderState` from a snapshot against `store`.
///
/// An unconfirmed snapshot always yields an unconfirmed state; its `order`
/// is ignored. A confirmed snapshot is reconciled: listed ids keep their
/// listed order, unknown or repeated ids are skipped, and records the
/// snapshot never mentions are appended in store order.
pub fn restore(
    persisted: &PersistedState,
    store: &RecordStore,
    policy: RestorePolicy,
) -> Result<OrderState, OrderError> {
    if !persisted.is_confirmed {
        return Ok(OrderState::unconfirmed());
    }
    if persisted.order.is_empty() {
        return Err(OrderError::MalformedPersistedState(
            "confirmed state carries an empty order".to_string(),
        ));
    }
    if policy == RestorePolicy::Strict && persisted.order.len() != store.len() {
        return Err(OrderError::MalformedPersistedState(format!(
            "confirmed order lists {} ids but the store holds {} records",
            persisted.order.len(),
            store.len()
        )));
    }
    Ok(OrderState::confirmed(reconcile_order(&persisted.order, store)))
}

/// Map listed ids onto `store`, producing a full permutation of its stable ids.
pub fn reconcile_order(listed: &[i64], store: &RecordStore) -> Vec<StableId> {
    let mut placed = vec![false; store.len()];
    let mut order = Vec::with_capacity(store.len());
    let mut skipped = 0usize;
    for raw in listed {
        match usize::try_from(*raw).ok().filter(|id| *id < store.len()) {
            Some(id) if !placed[id] => {
                placed[id] = true;
                order.push(id);
            }
            _ => skipped += 1,
        }
    }
    let listed_len = order.len();
    for id in store.identity_order().filter(|id| !placed[*id]) {
        if let Some(record) = store.get(id) {
            debug!(
                "[running_order:persistence] appending unlisted record {} (CSV line {})",
                id, record.source_row
            );
        }
        order.push(id);
    }
    let appended = order.len() - listed_len;
    if skipped > 0 || appended > 0 {
        warn!(
            "[running_order:persistence] reconciled persisted order: {} ids skipped, {} records appended",
            skipped, appended
        );
    }
    order
}

/// Decode a sidecar blob.
pub fn decode(blob: &str) -> Result<PersistedState, OrderError> {
    serde_json::from_str(blob)
        .map_err(|err| OrderError::MalformedPersistedState(format!("invalid order JSON: {err}")))
}

/// Encode a snapshot as two-space indented JSON.
pub fn encode_pretty(persisted: &PersistedState) -> Result<String, OrderError> {
    serde_json::to_string_pretty(persisted).map_err(|err| {
        OrderError::MalformedPersistedState(format!("failed encoding order JSON: {err}"))
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
