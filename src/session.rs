//! I/O boundary around an `OrderController`.
//!
//! A session loads records from a `RowSource`, looks for a persisted
//! snapshot in an `OrderStore`, boots the controller, and writes a snapshot
//! whenever the order is confirmed or imported. Sidecar problems never stop a
//! session from opening: a missing or unreadable sidecar means "no persisted
//! state", and a present-but-broken one is kept as `restore_warning`.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::OrderConfig;
use crate::errors::OrderError;
use crate::sidecar::OrderStore;
use crate::source::RowSource;
use crate::state::{Confirmation, OrderController, OrderState};
use crate::store::RecordStore;

/// A loaded running order plus the store it persists to.
pub struct Session {
    controller: OrderController,
    order_store: Arc<dyn OrderStore>,
    restore_warning: Option<OrderError>,
}

impl Session {
    /// Load records and any persisted snapshot.
    ///
    /// Fails only when the records themselves cannot be loaded.
    pub fn open(
        config: OrderConfig,
        source: &dyn RowSource,
        order_store: Arc<dyn OrderStore>,
    ) -> Result<Self, OrderError> {
        let config = config.validated()?;
        let store = RecordStore::from_source(source, config.min_fields)?;
        let mut controller = OrderController::new(store, &config);

        let mut restore_warning = None;
        let persisted = match order_store.load() {
            Ok(persisted) => persisted,
            Err(OrderError::SourceUnavailable { source_id, reason }) => {
                debug!(
                    "[running_order:session] sidecar '{}' unavailable ({}); treating as absent",
                    source_id, reason
                );
                None
            }
            Err(err) => {
                warn!(
                    "[running_order:session] sidecar '{}' is unusable: {}",
                    order_store.id(),
                    err
                );
                restore_warning = Some(err);
                None
            }
        };
        if let Err(err) = controller.boot(persisted) {
            restore_warning = Some(err);
        }

        Ok(Self {
            controller,
            order_store,
            restore_warning,
        })
    }

    /// Confirm the order and write the snapshot.
    ///
    /// If writing fails the order stays confirmed in memory and the write
    /// error is returned; `save` can be retried.
    pub fn confirm(&mut self) -> Result<Confirmation, OrderError> {
        let confirmation = self.controller.confirm()?;
        if let Confirmation::Confirmed(snapshot) = &confirmation {
            self.order_store.save(snapshot)?;
        }
        Ok(confirmation)
    }

    /// Import an uploaded blob and persist the resulting state.
    pub fn restore_from_json(&mut self, blob: &str) -> Result<&OrderState, OrderError> {
        self.controller.restore_from_json(blob)?;
        self.save()?;
        self.restore_warning = None;
        Ok(self.controller.state())
    }

    /// Write the current state to the order store.
    pub fn save(&self) -> Result<(), OrderError> {
        self.order_store.save(&self.controller.export())
    }

    /// Underlying state machine.
    pub fn controller(&self) -> &OrderController {
        &self.controller
    }

    /// Why the persisted snapshot found at startup was not used, if it wasn't.
    pub fn restore_warning(&self) -> Option<&OrderError> {
        self.restore_warning.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::PersistedState;
    use crate::sidecar::InMemoryOrderStore;
    use crate::source::InMemoryCsvSource;
    use crate::state::DisplayMode;

    struct UnreadableStore;

    impl OrderStore for UnreadableStore {
        fn id(&self) -> &str {
            "unreadable"
        }

        fn load(&self) -> Result<Option<PersistedState>, OrderError> {
            Err(OrderError::SourceUnavailable {
                source_id: "unreadable".to_string(),
                reason: "permission denied".to_string(),
            })
        }

        fn save(&self, _state: &PersistedState) -> Result<(), OrderError> {
            Err(OrderError::SourceUnavailable {
                source_id: "unreadable".to_string(),
                reason: "read-only".to_string(),
            })
        }
    }

    fn csv() -> InMemoryCsvSource {
        let mut text = String::from("class,group,theme,url\n");
        for class in ["高尾クラス", "八尾クラス", "山下クラス"] {
            for group in ["A", "B", "C"] {
                text.push_str(&format!("{class},{group},theme,https://example.org\n"));
            }
        }
        InMemoryCsvSource::new(text)
    }

    fn config() -> OrderConfig {
        OrderConfig {
            seed: Some(11),
            ..OrderConfig::default()
        }
    }

    #[test]
    fn confirm_writes_snapshot_once() {
        let order_store = Arc::new(InMemoryOrderStore::new());
        let mut session = Session::open(config(), &csv(), order_store.clone()).unwrap();
        assert!(session.restore_warning().is_none());

        let Confirmation::Confirmed(snapshot) = session.confirm().unwrap() else {
            panic!("expected confirmation");
        };
        assert_eq!(order_store.load().unwrap(), Some(snapshot.clone()));

        assert_eq!(session.confirm().unwrap(), Confirmation::AlreadyConfirmed);
        assert_eq!(order_store.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn save_writes_the_controller_snapshot() {
        let order_store = Arc::new(InMemoryOrderStore::new());
        let mut session = Session::open(config(), &csv(), order_store.clone()).unwrap();
        session.save().unwrap();
        let saved = order_store.load().unwrap().unwrap();
        assert!(!saved.is_confirmed);
        assert!(saved.order.is_empty());

        session.confirm().unwrap();
        session.save().unwrap();
        let saved = order_store.load().unwrap().unwrap();
        assert_eq!(saved.order, session.controller().export().order);
        assert!(saved.is_confirmed);
    }

    #[test]
    fn unreadable_sidecar_is_treated_as_absent() {
        let session = Session::open(config(), &csv(), Arc::new(UnreadableStore)).unwrap();
        assert!(session.restore_warning().is_none());
        assert_eq!(session.controller().mode(), DisplayMode::SourceOrder);
    }

    #[test]
    fn failed_write_keeps_confirmation_in_memory() {
        let mut session = Session::open(config(), &csv(), Arc::new(UnreadableStore)).unwrap();
        let err = session.confirm().unwrap_err();
        assert!(matches!(err, OrderError::SourceUnavailable { .. }));
        assert!(session.controller().is_confirmed());
    }

    #[test]
    fn broken_persisted_state_is_surfaced_as_warning() {
        let order_store = Arc::new(InMemoryOrderStore::with_state(PersistedState {
            is_confirmed: true,
            order: vec![0, 1],
            timestamp: String::new(),
        }));
        let session = Session::open(config(), &csv(), order_store).unwrap();
        assert!(matches!(
            session.restore_warning(),
            Some(OrderError::MalformedPersistedState(_))
        ));
        assert!(!session.controller().is_confirmed());
        assert_eq!(session.controller().mode(), DisplayMode::Shuffled);
    }

    #[test]
    fn import_persists_and_clears_warning() {
        let order_store = Arc::new(InMemoryOrderStore::with_state(PersistedState {
            is_confirmed: true,
            order: vec![0],
            timestamp: String::new(),
        }));
        let mut session = Session::open(config(), &csv(), order_store.clone()).unwrap();
        assert!(session.restore_warning().is_some());

        let state = session
            .restore_from_json(r#"{"isConfirmed": true, "order": [8, 7, 6, 5, 4, 3, 2, 1, 0]}"#)
            .unwrap();
        assert_eq!(state.order, vec![8, 7, 6, 5, 4, 3, 2, 1, 0]);
        assert!(session.restore_warning().is_none());
        assert_eq!(
            order_store.load().unwrap().unwrap().order,
            vec![8, 7, 6, 5, 4, 3, 2, 1, 0]
        );
    }

    #[test]
    fn empty_csv_fails_to_open() {
        let err = Session::open(
            config(),
            &InMemoryCsvSource::new("class,group,theme,url\n"),
            Arc::new(InMemoryOrderStore::new()),
        )
        .err()
        .unwrap();
        assert!(matches!(err, OrderError::EmptyInput { .. }));
    }
}
