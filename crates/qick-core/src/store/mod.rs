//! Application state tree and the single handle through which it changes.
//!
//! Each slice exposes a pure `reduce(state, &action) -> state`. The root
//! reducer routes an [`Action`] to its slice, except for the reserved
//! `user/logout` action which rebuilds every slice from its default.

pub mod booking;
pub mod facility;
pub mod home;
pub mod persist;
pub mod session;

use crate::storage::state::StateStorage;
use booking::{BookingAction, BookingState};
use facility::{FacilityAction, FacilityState};
use home::{HomeAction, HomeState};
use log::{debug, info, warn};
use persist::PersistConfig;
use serde::{Deserialize, Serialize};
use session::{SessionAction, SessionState};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub const LOGOUT_ACTION: &str = "user/logout";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct RootState {
    pub session: SessionState,
    pub home: HomeState,
    pub facility: FacilityState,
    pub booking: BookingState,
}

/// Every state transition in the application.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Session(SessionAction),
    Home(HomeAction),
    Facility(FacilityAction),
    Booking(BookingAction),
}

impl Action {
    /// `slice/action` name, e.g. `user/logout`.
    pub fn type_name(&self) -> String {
        match self {
            Action::Session(a) => format!("user/{}", a.name()),
            Action::Home(a) => format!("home/{}", a.name()),
            Action::Facility(a) => format!("facility/{}", a.name()),
            Action::Booking(a) => format!("booking/{}", a.name()),
        }
    }

    pub fn is_logout(&self) -> bool {
        matches!(self, Action::Session(SessionAction::Logout))
    }
}

impl From<SessionAction> for Action {
    fn from(action: SessionAction) -> Self {
        Action::Session(action)
    }
}

impl From<HomeAction> for Action {
    fn from(action: HomeAction) -> Self {
        Action::Home(action)
    }
}

impl From<FacilityAction> for Action {
    fn from(action: FacilityAction) -> Self {
        Action::Facility(action)
    }
}

impl From<BookingAction> for Action {
    fn from(action: BookingAction) -> Self {
        Action::Booking(action)
    }
}

pub fn root_reduce(state: RootState, action: &Action) -> RootState {
    if action.is_logout() {
        return RootState::default();
    }
    let RootState {
        session,
        home,
        facility,
        booking,
    } = state;
    match action {
        Action::Session(a) => RootState {
            session: session::reduce(session, a),
            home,
            facility,
            booking,
        },
        Action::Home(a) => RootState {
            session,
            home: home::reduce(home, a),
            facility,
            booking,
        },
        Action::Facility(a) => RootState {
            session,
            home,
            facility: facility::reduce(facility, a),
            booking,
        },
        Action::Booking(a) => RootState {
            session,
            home,
            facility,
            booking: booking::reduce(booking, a),
        },
    }
}

struct Persistence {
    storage: Box<dyn StateStorage>,
    config: PersistConfig,
}

impl Persistence {
    fn write(&self, state: &RootState) {
        let snapshot = persist::snapshot(state, &self.config);
        if let Err(e) = self.storage.write(&self.config.key, &snapshot.to_string()) {
            warn!("failed to persist state under '{}': {}", self.config.key, e);
        }
    }
}

/// Cloneable handle to the one state tree of the process.
///
/// Locks are held only for a reducer application and the snapshot write
/// that follows it, never across a network call.
#[derive(Clone)]
pub struct Store {
    state: Arc<RwLock<RootState>>,
    persistence: Option<Arc<Persistence>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(RootState::default())
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.read())
            .field("persistent", &self.persistence.is_some())
            .finish()
    }
}

impl Store {
    pub fn new(initial: RootState) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial)),
            persistence: None,
        }
    }

    /// Build a store from whatever `storage` holds under the configured key.
    ///
    /// Missing, unreadable or corrupt snapshots start from defaults.
    pub fn rehydrate(storage: impl StateStorage + 'static, config: PersistConfig) -> Self {
        let initial = match storage.read(&config.key) {
            Ok(Some(raw)) => match persist::restore_str(&raw, &config) {
                Ok(state) => {
                    info!(
                        "rehydrated '{}' (authenticated: {})",
                        config.key, state.session.is_authenticated
                    );
                    state
                }
                Err(e) => {
                    warn!("discarding persisted '{}': {}", config.key, e);
                    RootState::default()
                }
            },
            Ok(None) => {
                debug!("nothing persisted under '{}'", config.key);
                RootState::default()
            }
            Err(e) => {
                warn!("could not read persisted '{}': {}", config.key, e);
                RootState::default()
            }
        };

        Self {
            state: Arc::new(RwLock::new(initial)),
            persistence: Some(Arc::new(Persistence {
                storage: Box::new(storage),
                config,
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RootState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RootState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply `action` and persist the allowed slices if they changed.
    ///
    /// The write lock is held until the snapshot is stored, so storage sees
    /// snapshots in the order the reducer produced them.
    pub fn dispatch(&self, action: impl Into<Action>) {
        let action = action.into();
        debug!("dispatch {}", action.type_name());

        let mut guard = self.write();
        let next = root_reduce(guard.clone(), &action);
        let changed = self.persistence.as_ref().filter(|p| {
            persist::snapshot(&guard, &p.config) != persist::snapshot(&next, &p.config)
        });
        *guard = next;
        if let Some(persistence) = changed {
            persistence.write(&guard);
        }
    }

    /// Snapshot of the whole tree.
    pub fn state(&self) -> RootState {
        self.read().clone()
    }

    pub fn select<T>(&self, selector: impl FnOnce(&RootState) -> T) -> T {
        selector(&self.read())
    }

    pub fn session(&self) -> SessionState {
        self.select(|s| s.session.clone())
    }

    pub fn bearer_token(&self) -> Option<String> {
        self.select(|s| s.session.bearer_token().map(str::to_string))
    }

    /// Write the persisted slices now regardless of change.
    pub fn flush(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.write(&self.read());
        }
    }

    /// Remove the persisted snapshot without touching in-memory state.
    pub fn purge(&self) -> crate::Result<()> {
        if let Some(persistence) = &self.persistence {
            persistence.storage.remove(&persistence.config.key)?;
        }
        Ok(())
    }

    pub fn is_persistent(&self) -> bool {
        self.persistence.is_some()
    }
}
