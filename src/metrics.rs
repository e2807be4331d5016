use crate::data::{CategoryScheme, Record};
use crate::types::CategoryLabel;

/// Category make-up of one block of an ordering.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockComposition {
    /// 0-based block index.
    pub block: usize,
    /// Per-category counts in scheme order.
    pub counts: Vec<CategoryCount>,
    /// Records whose label is outside the scheme.
    pub unknown: usize,
}

/// Count of one category inside a block.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryCount {
    /// Scheme label.
    pub category: CategoryLabel,
    /// Occurrences in the block.
    pub count: usize,
}

impl BlockComposition {
    /// True when every scheme category appears exactly once and nothing else does.
    pub fn is_balanced(&self) -> bool {
        self.unknown == 0 && self.counts.iter().all(|entry| entry.count == 1)
    }
}

/// Split `order` into `block_count` equal consecutive slices and count categories in each.
///
/// Returns `None` when `order` cannot be cut into `block_count` equal slices.
pub fn block_composition(
    order: &[&Record],
    scheme: &CategoryScheme,
    block_count: usize,
) -> Option<Vec<BlockComposition>> {
    if block_count == 0 || order.is_empty() || order.len() % block_count != 0 {
        return None;
    }
    let block_len = order.len() / block_count;
    let blocks = order
        .chunks(block_len)
        .enumerate()
        .map(|(block, records)| {
            let mut counts: Vec<CategoryCount> = scheme
                .entries()
                .iter()
                .map(|entry| CategoryCount {
                    category: entry.label.clone(),
                    count: 0,
                })
                .collect();
            let mut unknown = 0;
            for record in records {
                match scheme.position(&record.category) {
                    Some(slot) => counts[slot].count += 1,
                    None => unknown += 1,
                }
            }
            BlockComposition {
                block,
                counts,
                unknown,
            }
        })
        .collect();
    Some(blocks)
}

/// True when each of the `block_count` consecutive slices of `order` holds one record per category.
pub fn is_stratified(order: &[&Record], scheme: &CategoryScheme, block_count: usize) -> bool {
    block_composition(order, scheme, block_count)
        .is_some_and(|blocks| blocks.iter().all(BlockComposition::is_balanced))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: &str, stable_id: usize) -> Record {
        Record {
            category: category.to_string(),
            group: String::new(),
            theme: String::new(),
            materials_url: String::new(),
            stable_id,
            source_row: stable_id + 2,
        }
    }

    fn scheme() -> CategoryScheme {
        CategoryScheme::new([("a", "a"), ("b", "b"), ("c", "c")])
    }

    #[test]
    fn balanced_blocks_are_stratified() {
        let records: Vec<Record> = ["b", "a", "c", "c", "b", "a", "a", "c", "b"]
            .iter()
            .enumerate()
            .map(|(idx, category)| record(category, idx))
            .collect();
        let order: Vec<&Record> = records.iter().collect();
        assert!(is_stratified(&order, &scheme(), 3));

        let blocks = block_composition(&order, &scheme(), 3).unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[2].block, 2);
        assert!(blocks.iter().all(BlockComposition::is_balanced));
    }

    #[test]
    fn source_order_is_not_stratified() {
        let records: Vec<Record> = ["a", "a", "a", "b", "b", "b", "c", "c", "c"]
            .iter()
            .enumerate()
            .map(|(idx, category)| record(category, idx))
            .collect();
        let order: Vec<&Record> = records.iter().collect();
        assert!(!is_stratified(&order, &scheme(), 3));

        let blocks = block_composition(&order, &scheme(), 3).unwrap();
        assert_eq!(blocks[0].counts[0].count, 3);
        assert_eq!(blocks[0].counts[1].count, 0);
    }

    #[test]
    fn unknown_labels_and_uneven_lengths_fail() {
        let records: Vec<Record> = ["a", "b", "z"]
            .iter()
            .enumerate()
            .map(|(idx, category)| record(category, idx))
            .collect();
        let order: Vec<&Record> = records.iter().collect();
        let blocks = block_composition(&order, &scheme(), 1).unwrap();
        assert_eq!(blocks[0].unknown, 1);
        assert!(!is_stratified(&order, &scheme(), 1));

        assert!(block_composition(&order, &scheme(), 2).is_none());
        assert!(block_composition(&order, &scheme(), 0).is_none());
        assert!(block_composition(&[], &scheme(), 3).is_none());
    }
}
