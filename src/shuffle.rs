//! Stratified block shuffle.
//!
//! Output is built from `block_count` blocks. Block `k` holds the `k`-th record
//! of every category after each category has been shuffled, so every block
//! (and therefore every consecutive `categories`-sized slice of the output)
//! carries exactly one record per category. Randomness comes from three
//! places: the per-category shuffles, the shuffle inside each block, and the
//! shuffle of block order.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::data::{CategoryScheme, Record};
use crate::errors::OrderError;

/// Block shuffle over a fixed category scheme.
#[derive(Clone, Debug)]
pub struct BlockShuffler {
    scheme: CategoryScheme,
    block_count: usize,
}

impl BlockShuffler {
    /// Create a shuffler producing `block_count` blocks over `scheme`.
    pub fn new(scheme: CategoryScheme, block_count: usize) -> Self {
        Self {
            scheme,
            block_count,
        }
    }

    /// Categories the shuffle partitions by.
    pub fn scheme(&self) -> &CategoryScheme {
        &self.scheme
    }

    /// Number of blocks per shuffle.
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Number of records every valid input must contain.
    pub fn expected_len(&self) -> usize {
        self.scheme.len() * self.block_count
    }

    /// Return a stratified permutation of `records`.
    ///
    /// Fails with `UnknownCategory` when a record's label is outside the
    /// scheme and with `CategoryImbalance` when a category does not hold
    /// exactly `block_count` records.
    pub fn shuffle<'a, R>(
        &self,
        records: &'a [Record],
        rng: &mut R,
    ) -> Result<Vec<&'a Record>, OrderError>
    where
        R: Rng + ?Sized,
    {
        let mut groups = self.partition(records)?;
        for group in &mut groups {
            group.shuffle(rng);
        }

        let mut blocks: Vec<Vec<&'a Record>> = (0..self.block_count)
            .map(|slot| groups.iter().map(|group| group[slot]).collect())
            .collect();
        for block in &mut blocks {
            block.shuffle(rng);
        }
        blocks.shuffle(rng);

        let order: Vec<&'a Record> = blocks.into_iter().flatten().collect();
        debug!(
            "[running_order:shuffle] shuffled {} records into {} blocks",
            order.len(),
            self.block_count
        );
        Ok(order)
    }

    fn partition<'a>(&self, records: &'a [Record]) -> Result<Vec<Vec<&'a Record>>, OrderError> {
        let mut groups: Vec<Vec<&'a Record>> = vec![Vec::new(); self.scheme.len()];
        for record in records {
            let slot = self.scheme.position(&record.category).ok_or_else(|| {
                OrderError::UnknownCategory {
                    label: record.category.clone(),
                }
            })?;
            groups[slot].push(record);
        }
        for (entry, group) in self.scheme.entries().iter().zip(&groups) {
            if group.len() != self.block_count {
                return Err(OrderError::CategoryImbalance {
                    category: entry.label.clone(),
                    expected: self.block_count,
                    found: group.len(),
                });
            }
        }
        Ok(groups)
    }
}
