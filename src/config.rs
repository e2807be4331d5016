use crate::constants::shuffle::DEFAULT_BLOCK_COUNT;
use crate::constants::source::MIN_FIELDS;
use crate::data::CategoryScheme;
use crate::errors::OrderError;
use crate::persistence::RestorePolicy;
use crate::schedule::ScheduleConfig;

/// Top-level configuration for loading, shuffling, and restoring a running order.
#[derive(Clone, Debug)]
pub struct OrderConfig {
    /// RNG seed; `None` seeds from the operating system.
    pub seed: Option<u64>,
    /// Number of blocks, which is also the number of records every category must have.
    pub block_count: usize,
    /// Minimum CSV fields for a row to be kept.
    pub min_fields: usize,
    /// Categories the shuffle partitions by.
    pub categories: CategoryScheme,
    /// Policy applied to the sidecar found at startup.
    ///
    /// Defaults to `Strict`: a confirmed order whose length does not match the
    /// current CSV is reported instead of silently reconciled.
    pub cold_start_policy: RestorePolicy,
    /// Policy applied to blobs imported by hand.
    pub import_policy: RestorePolicy,
    /// Session layout used when rendering a confirmed order.
    pub schedule: ScheduleConfig,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            seed: None,
            block_count: DEFAULT_BLOCK_COUNT,
            min_fields: MIN_FIELDS,
            categories: CategoryScheme::default(),
            cold_start_policy: RestorePolicy::Strict,
            import_policy: RestorePolicy::Reconcile,
            schedule: ScheduleConfig::default(),
        }
    }
}

impl OrderConfig {
    /// Validate field ranges, returning the config unchanged when usable.
    pub fn validated(self) -> Result<Self, OrderError> {
        if self.block_count == 0 {
            return Err(OrderError::Configuration(
                "block_count must be greater than zero".to_string(),
            ));
        }
        if self.min_fields < MIN_FIELDS {
            return Err(OrderError::Configuration(format!(
                "min_fields must be at least {MIN_FIELDS}"
            )));
        }
        if self.categories.is_empty() {
            return Err(OrderError::Configuration(
                "category scheme must not be empty".to_string(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = OrderConfig::default().validated().unwrap();
        assert_eq!(config.block_count, 3);
        assert_eq!(config.min_fields, 4);
        assert_eq!(config.cold_start_policy, RestorePolicy::Strict);
        assert_eq!(config.import_policy, RestorePolicy::Reconcile);
    }

    #[test]
    fn validated_rejects_out_of_range_fields() {
        let err = OrderConfig {
            block_count: 0,
            ..OrderConfig::default()
        }
        .validated()
        .unwrap_err();
        assert!(matches!(err, OrderError::Configuration(ref msg) if msg.contains("block_count")));

        let err = OrderConfig {
            min_fields: 2,
            ..OrderConfig::default()
        }
        .validated()
        .unwrap_err();
        assert!(matches!(err, OrderError::Configuration(ref msg) if msg.contains("min_fields")));

        let err = OrderConfig {
            categories: CategoryScheme::new(Vec::<(String, String)>::new()),
            ..OrderConfig::default()
        }
        .validated()
        .unwrap_err();
        assert!(matches!(err, OrderError::Configuration(ref msg) if msg.contains("scheme")));
    }
}
