use std::ops::Range;

use tracing::{debug, info};

use crate::data::Record;
use crate::errors::OrderError;
use crate::source::{RawRow, RowSource};
use crate::types::{SourceId, StableId};

/// Immutable, load-ordered set of records.
///
/// `stable_id` of each record equals its index here, so lookup by id is a
/// slice index.
#[derive(Clone, Debug)]
pub struct RecordStore {
    source_id: SourceId,
    records: Vec<Record>,
}

impl RecordStore {
    /// Build records from raw rows, dropping rows with fewer than `min_fields`.
    pub fn load(
        source_id: impl Into<SourceId>,
        rows: Vec<RawRow>,
        min_fields: usize,
    ) -> Result<Self, OrderError> {
        let source_id = source_id.into();
        let total_rows = rows.len();
        let mut records = Vec::with_capacity(total_rows);
        for row in rows {
            if row.fields.len() < min_fields {
                debug!(
                    "[running_order:store] dropping line {} of '{}' ({} fields)",
                    row.line,
                    source_id,
                    row.fields.len()
                );
                continue;
            }
            let mut fields = row.fields.into_iter();
            let mut next = || fields.next().unwrap_or_default();
            let category = next();
            let group = next();
            let theme = next();
            let materials_url = next();
            records.push(Record {
                category,
                group,
                theme,
                materials_url,
                stable_id: records.len(),
                source_row: row.line,
            });
        }
        if records.is_empty() {
            return Err(OrderError::EmptyInput { source_id });
        }
        info!(
            "[running_order:store] loaded {} records from '{}' ({} rows dropped)",
            records.len(),
            source_id,
            total_rows - records.len()
        );
        Ok(Self { source_id, records })
    }

    /// Read rows from `source` and load them.
    pub fn from_source(source: &dyn RowSource, min_fields: usize) -> Result<Self, OrderError> {
        let rows = source.read_rows()?;
        Self::load(source.id(), rows, min_fields)
    }

    /// Id of the source the records came from.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Record with `stable_id`, if it exists.
    pub fn get(&self, stable_id: StableId) -> Option<&Record> {
        self.records.get(stable_id)
    }

    /// Records in load order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of kept records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records were kept (never true after `load`).
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stable ids in load order (`0..len`).
    pub fn identity_order(&self) -> Range<StableId> {
        0..self.records.len()
    }

    /// Whether `order` is exactly the load order.
    pub fn is_identity_order(&self, order: &[StableId]) -> bool {
        order.len() == self.records.len() && order.iter().enumerate().all(|(idx, id)| idx == *id)
    }

    /// Resolve ids to records, skipping ids the store does not hold.
    pub fn resolve<'a>(&'a self, order: &[StableId]) -> Vec<&'a Record> {
        order.iter().filter_map(|id| self.get(*id)).collect()
    }
}
