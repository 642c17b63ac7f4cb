//! Capture store: the persisted set of captured Pokémon and the simulated
//! session that owns it.
//!
//! Mutations never fail. Each one is written through to the state file (when
//! the store has one); write errors are logged and otherwise ignored.

pub mod session;

use crate::error::{CatalogError, LoginError};
use crate::model::{CapturedEntity, User};
use crate::storage::{self, PersistedState};
use session::SessionState;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

pub struct CaptureStore {
    session: SessionState,
    captured: Vec<CapturedEntity>,
    path: Option<PathBuf>,
    login_delay: Duration,
}

impl CaptureStore {
    /// Load from `path`, degrading to an empty store on any read problem.
    pub fn open(path: PathBuf, login_delay: Duration) -> Self {
        let state = storage::load_state(&path);
        let mut store = Self::from_state(state, login_delay);
        store.path = Some(path);
        store
    }

    /// A store that is never written to disk.
    #[cfg(test)]
    pub fn in_memory(login_delay: Duration) -> Self {
        Self::from_state(PersistedState::default(), login_delay)
    }

    fn from_state(state: PersistedState, login_delay: Duration) -> Self {
        let session = match (state.is_authenticated, state.user) {
            (true, Some(user)) => SessionState::Authenticated(user),
            _ => SessionState::Anonymous,
        };
        let mut captured: Vec<CapturedEntity> = Vec::with_capacity(state.captured_pokemon.len());
        for p in state.captured_pokemon {
            if !captured.iter().any(|c| c.id == p.id) {
                captured.push(p);
            }
        }
        Self {
            session,
            captured,
            path: None,
            login_delay,
        }
    }

    pub fn snapshot(&self) -> PersistedState {
        let user = self.session.user().cloned();
        PersistedState {
            is_authenticated: user.is_some(),
            user,
            captured_pokemon: self.captured.clone(),
        }
    }

    fn persist(&self) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        if let Err(e) = storage::save_state(path, &self.snapshot()) {
            warn!(error = %format!("{e:#}"), "failed to persist capture store");
        }
    }

    /// Insert unless an entry with the same id exists. Returns whether it was inserted.
    pub fn capture(&mut self, entity: CapturedEntity) -> bool {
        if self.is_captured(entity.id) {
            return false;
        }
        info!(id = entity.id, name = %entity.name, "captured");
        self.captured.push(entity);
        self.persist();
        true
    }

    /// Remove the entry with `id`. Returns whether anything was removed.
    pub fn release(&mut self, id: u32) -> bool {
        let before = self.captured.len();
        self.captured.retain(|c| c.id != id);
        let removed = self.captured.len() != before;
        if removed {
            info!(id, "released");
            self.persist();
        }
        removed
    }

    /// Capture when absent, release when present. Returns the new membership.
    pub fn toggle(&mut self, entity: CapturedEntity) -> bool {
        if self.is_captured(entity.id) {
            self.release(entity.id);
            false
        } else {
            self.capture(entity);
            true
        }
    }

    pub fn is_captured(&self, id: u32) -> bool {
        self.captured.iter().any(|c| c.id == id)
    }

    /// Captured entities in capture order.
    pub fn captured(&self) -> &[CapturedEntity] {
        &self.captured
    }

    /// End-of-session cleanup: the collection belongs to the session.
    pub fn on_logout(&mut self) {
        self.captured.clear();
        self.persist();
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user()
    }

    /// Gate for UI actions that only make sense with a session.
    pub fn require_user(&self, action: &str) -> Result<&User, CatalogError> {
        self.session.user().ok_or_else(|| CatalogError::Unauthenticated {
            action: action.to_string(),
        })
    }

    /// `anonymous → authenticating → authenticated | anonymous`.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<User, LoginError> {
        if let Some(u) = self.session.user() {
            return Err(LoginError::AlreadyAuthenticated {
                email: u.email.clone(),
            });
        }
        self.session = SessionState::Authenticating {
            email: email.trim().to_string(),
        };
        tokio::time::sleep(self.login_delay).await;

        match session::verify(email, password) {
            Some(user) => {
                info!(email = %user.email, "logged in");
                self.session = SessionState::Authenticated(user.clone());
                self.persist();
                Ok(user)
            }
            None => {
                self.session = SessionState::Anonymous;
                Err(LoginError::InvalidCredentials)
            }
        }
    }

    /// `authenticated → anonymous`, clearing the collection. No-op when anonymous.
    pub fn logout(&mut self) {
        if !self.session.is_authenticated() {
            return;
        }
        self.session = SessionState::Anonymous;
        self.on_logout();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::image_url;
    use std::collections::BTreeSet;

    fn mon(id: u32) -> CapturedEntity {
        CapturedEntity {
            id,
            name: format!("mon-{id}"),
            image_url: image_url(id),
            types: vec![],
        }
    }

    fn ids(store: &CaptureStore) -> BTreeSet<u32> {
        store.captured().iter().map(|c| c.id).collect()
    }

    #[test]
    fn capture_is_idempotent_and_release_of_absent_is_noop() {
        let mut s = CaptureStore::in_memory(Duration::ZERO);
        assert!(s.capture(mon(1)));
        assert!(!s.capture(mon(1)));
        assert!(!s.release(99));
        assert_eq!(s.captured().len(), 1);
        assert!(s.is_captured(1));
        assert!(s.release(1));
        assert!(!s.is_captured(1));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Membership is decided by the last capture or release of each id.
            #[test]
            fn membership_follows_last_operation(
                ops in prop::collection::vec((1u32..12, any::<bool>()), 0..64)
            ) {
                let mut s = CaptureStore::in_memory(Duration::ZERO);
                let mut expected = BTreeSet::new();
                for (id, capture) in ops {
                    if capture {
                        prop_assert_eq!(s.capture(mon(id)), expected.insert(id));
                    } else {
                        prop_assert_eq!(s.release(id), expected.remove(&id));
                    }
                    prop_assert_eq!(ids(&s), expected.clone());
                    prop_assert_eq!(s.captured().len(), expected.len());
                }
            }
        }
    }

    #[test]
    fn toggle_flips_membership() {
        let mut s = CaptureStore::in_memory(Duration::ZERO);
        assert!(s.toggle(mon(7)));
        assert!(!s.toggle(mon(7)));
        assert!(s.captured().is_empty());
    }

    #[test]
    fn on_logout_empties_any_collection() {
        let mut s = CaptureStore::in_memory(Duration::ZERO);
        for id in 1..=40 {
            s.capture(mon(id));
        }
        s.on_logout();
        assert!(s.captured().is_empty());
    }

    #[test]
    fn reload_keeps_exactly_the_captured_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        {
            let mut s = CaptureStore::open(path.clone(), Duration::ZERO);
            for id in [1, 25, 150, 7] {
                s.capture(mon(id));
            }
            s.release(7);
        }
        let reopened = CaptureStore::open(path, Duration::ZERO);
        assert_eq!(ids(&reopened), BTreeSet::from([1, 25, 150]));
    }

    #[test]
    fn duplicate_ids_in_payload_are_collapsed() {
        let state = PersistedState {
            captured_pokemon: vec![mon(1), mon(1), mon(2)],
            ..Default::default()
        };
        let s = CaptureStore::from_state(state, Duration::ZERO);
        assert_eq!(s.captured().len(), 2);
    }

    #[test]
    fn incompatible_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let s = CaptureStore::open(path, Duration::ZERO);
        assert!(s.captured().is_empty());
        assert_eq!(s.session(), &SessionState::Anonymous);
    }

    #[tokio::test(start_paused = true)]
    async fn login_waits_then_authenticates() {
        let mut s = CaptureStore::in_memory(Duration::from_secs(1));
        let start = tokio::time::Instant::now();
        let user = s.login("ash@pokemon.com", "pokemon123").await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert_eq!(user.name, "Ash Ketchum");
        assert!(s.session().is_authenticated());
        assert!(s.require_user("capture").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn bad_credentials_return_to_anonymous() {
        let mut s = CaptureStore::in_memory(Duration::from_secs(1));
        let err = s.login("ash@pokemon.com", "pikachu").await.unwrap_err();
        assert_eq!(err, LoginError::InvalidCredentials);
        assert_eq!(s.session(), &SessionState::Anonymous);
        assert!(matches!(
            s.require_user("capture"),
            Err(CatalogError::Unauthenticated { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn logout_clears_session_and_collection_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut s = CaptureStore::open(path.clone(), Duration::ZERO);
        s.login("brock@pokemon.com", "pokemon123").await.unwrap();
        s.capture(mon(74));
        assert!(CaptureStore::open(path.clone(), Duration::ZERO).user().is_some());

        s.logout();
        let reopened = CaptureStore::open(path, Duration::ZERO);
        assert!(reopened.user().is_none());
        assert!(reopened.captured().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn second_login_is_rejected() {
        let mut s = CaptureStore::in_memory(Duration::ZERO);
        s.login("misty@pokemon.com", "pokemon123").await.unwrap();
        let err = s.login("brock@pokemon.com", "pokemon123").await.unwrap_err();
        assert!(matches!(err, LoginError::AlreadyAuthenticated { .. }));
        assert_eq!(s.user().unwrap().name, "Misty");
    }
}
