use crate::constants::categories::DEFAULT_CATEGORIES;

pub use crate::types::{CategoryLabel, CategorySlug, GroupName, MaterialsUrl, StableId, Theme};

/// One presentation card parsed from the CSV source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// Category label from the first column (shuffle partition key).
    pub category: CategoryLabel,
    /// Group name inside the category.
    pub group: GroupName,
    /// Presentation theme.
    pub theme: Theme,
    /// Link opened when the card is selected.
    pub materials_url: MaterialsUrl,
    /// Load-time identity; the only identity used by shuffles and persistence.
    pub stable_id: StableId,
    /// 1-based CSV line the record came from (diagnostics only).
    pub source_row: usize,
}

/// One category of the shuffle domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryEntry {
    /// Label as written in the CSV.
    pub label: CategoryLabel,
    /// Short handle used by renderers.
    pub slug: CategorySlug,
}

/// Ordered set of categories that a block shuffle partitions by.
///
/// Scheme order decides the partition order; it has no effect on the
/// distribution of shuffled output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryScheme {
    entries: Vec<CategoryEntry>,
}

impl CategoryScheme {
    /// Build a scheme from `(label, slug)` pairs.
    pub fn new<L, S>(entries: impl IntoIterator<Item = (L, S)>) -> Self
    where
        L: Into<CategoryLabel>,
        S: Into<CategorySlug>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(label, slug)| CategoryEntry {
                    label: label.into(),
                    slug: slug.into(),
                })
                .collect(),
        }
    }

    /// Categories in scheme order.
    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the scheme has no categories.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scheme slot for `label`, if the label belongs to the scheme.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.label == label)
    }

    /// Renderer slug for `label`.
    pub fn slug_for(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.slug.as_str())
    }
}

impl Default for CategoryScheme {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scheme_has_three_categories_with_slugs() {
        let scheme = CategoryScheme::default();
        assert_eq!(scheme.len(), 3);
        assert_eq!(scheme.position("八尾クラス"), Some(1));
        assert_eq!(scheme.slug_for("山下クラス"), Some("yamashita"));
        assert_eq!(scheme.slug_for("unknown"), None);
    }

    #[test]
    fn custom_scheme_keeps_given_order() {
        let scheme = CategoryScheme::new([("b", "bee"), ("a", "ay")]);
        assert_eq!(scheme.position("a"), Some(1));
        assert_eq!(scheme.entries()[0].slug, "bee");
        assert!(!scheme.is_empty());
    }
}
