//! Reactive in-memory session snapshot shared by the UI tree.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use thiserror::Error;

use gatehouse_auth::{guard, AuthUpdate, GuardDecision, LoginResponse, SessionSnapshot, UserProfile};
use gatehouse_core::{LoginPaths, SessionFault};
use gatehouse_vault::StorageBackend;

use crate::lifecycle::SessionStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("session context is not attached to a durable store")]
    Detached,
}

/// Handle returned by [`SessionContext::subscribe`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Rc<dyn Fn(&SessionSnapshot)>;

struct Inner<B> {
    snapshot: RefCell<SessionSnapshot>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
    next_id: Cell<u64>,
    store: Option<SessionStore<B>>,
}

/// Shared, mutable session cell.
///
/// Clones are handles onto the same cell. The snapshot is seeded from the
/// durable store once, at construction; later reads never touch storage.
///
/// A context built with [`mount`](Self::mount) is detached:
/// [`set_current_user`](Self::set_current_user) changes memory only and the
/// caller must also write the store. A context built with
/// [`attached`](Self::attached) additionally offers [`login`](Self::login),
/// [`update_profile`](Self::update_profile) and [`logout`](Self::logout),
/// which write both.
pub struct SessionContext<B> {
    inner: Rc<Inner<B>>,
}

impl<B> Clone for SessionContext<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<B> core::fmt::Debug for SessionContext<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.inner.snapshot.borrow().is_authenticated())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .field("attached", &self.inner.store.is_some())
            .finish()
    }
}

impl<B: StorageBackend> SessionContext<B> {
    /// Seed from `store` without keeping it.
    pub fn mount(store: &SessionStore<B>) -> Self {
        Self::build(store.get_auth_data(), None)
    }

    /// Seed from `store` and keep it for write-through mutations.
    pub fn attached(store: SessionStore<B>) -> Self {
        let seed = store.get_auth_data();
        Self::build(seed, Some(store))
    }

    fn build(seed: SessionSnapshot, store: Option<SessionStore<B>>) -> Self {
        tracing::debug!(authenticated = seed.is_authenticated(), "session context mounted");
        Self {
            inner: Rc::new(Inner {
                snapshot: RefCell::new(seed),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                store,
            }),
        }
    }

    pub fn current_user(&self) -> SessionSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    pub fn with_current<R>(&self, f: impl FnOnce(&SessionSnapshot) -> R) -> R {
        f(&self.inner.snapshot.borrow())
    }

    /// Replace the in-memory snapshot. Does not persist.
    pub fn set_current_user(&self, snapshot: SessionSnapshot) {
        *self.inner.snapshot.borrow_mut() = snapshot;
        self.notify();
    }

    /// Call `f` with the new snapshot after every change.
    pub fn subscribe(&self, f: impl Fn(&SessionSnapshot) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.subscribers.borrow_mut().push((id, Rc::new(f)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    pub fn store(&self) -> Option<&SessionStore<B>> {
        self.inner.store.as_ref()
    }

    /// Establish a new session in both the store and memory.
    pub fn login(&self, login: LoginResponse) -> Result<(), ContextError> {
        let store = self.attached_store()?;
        let user_id = login.user.id.clone();

        store.remove_auth_data();
        let update = AuthUpdate::from(login);
        store.set_auth_user(&update);

        let mut next = SessionSnapshot::empty();
        update.apply_to(&mut next);
        self.commit(store, next);

        tracing::info!(user_id = %user_id, "session established");
        Ok(())
    }

    /// Replace the cached profile, keeping token and permissions.
    pub fn update_profile(&self, user: UserProfile) -> Result<(), ContextError> {
        self.apply(AuthUpdate::new().user(user))
    }

    /// Partial update written to both the store and memory.
    pub fn apply(&self, update: AuthUpdate) -> Result<(), ContextError> {
        let store = self.attached_store()?;
        store.set_auth_user(&update);

        let mut next = self.current_user();
        update.apply_to(&mut next);
        self.commit(store, next);
        Ok(())
    }

    /// Clear the session in both the store and memory.
    pub fn logout(&self) -> Result<(), ContextError> {
        let store = self.attached_store()?;
        store.remove_auth_data();
        self.set_current_user(SessionSnapshot::empty());

        tracing::info!("session cleared");
        Ok(())
    }

    /// Recover after the remote service rejects the token: clear the session
    /// and return where to send the user.
    pub fn handle_rejected_credential(
        &self,
        requested: &str,
        paths: &LoginPaths,
    ) -> Result<GuardDecision, ContextError> {
        tracing::warn!(fault = %SessionFault::StaleOrRevokedCredential, "forcing re-login");
        self.logout()?;
        Ok(self.with_current(|snapshot| guard(snapshot, false, requested, paths)))
    }

    /// Whether memory matches a fresh read of `store`.
    pub fn is_consistent_with(&self, store: &SessionStore<B>) -> bool {
        *self.inner.snapshot.borrow() == store.get_auth_data()
    }

    fn attached_store(&self) -> Result<&SessionStore<B>, ContextError> {
        self.inner.store.as_ref().ok_or(ContextError::Detached)
    }

    fn commit(&self, store: &SessionStore<B>, next: SessionSnapshot) {
        if store.get_auth_data() != next {
            tracing::warn!(
                fault = %SessionFault::InconsistentDualWrite,
                "durable write did not take effect; in-memory session kept for this tab"
            );
        }
        self.set_current_user(next);
    }

    fn notify(&self) {
        // Subscribers may read or mutate the context, so no borrow is held
        // while they run.
        let snapshot = self.current_user();
        let subscribers: Vec<Subscriber> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, f)| Rc::clone(f))
            .collect();

        for subscriber in subscribers {
            subscriber(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_auth::{Operation, PermissionSet};
    use gatehouse_core::GateConfig;
    use gatehouse_vault::MemoryBackend;

    fn store(backend: MemoryBackend) -> SessionStore<MemoryBackend> {
        SessionStore::from_config(backend, &GateConfig::default())
    }

    fn login_response() -> LoginResponse {
        LoginResponse {
            token: "tok1".to_string(),
            user: UserProfile::new("u1"),
            permissions: PermissionSet::new().grant("posts", [Operation::Read]),
        }
    }

    #[test]
    fn mount_seeds_from_store_once() {
        let backend = MemoryBackend::new();
        let durable = store(backend.clone());
        durable.set_auth_user(&AuthUpdate::from(login_response()));

        let context = SessionContext::mount(&durable);
        assert!(context.current_user().is_authenticated());

        // Later durable changes are not picked up without a remount.
        durable.remove_auth_data();
        assert!(context.current_user().is_authenticated());
        assert!(!context.is_consistent_with(&durable));
    }

    #[test]
    fn setter_does_not_persist() {
        let durable = store(MemoryBackend::new());
        let context = SessionContext::mount(&durable);

        context.set_current_user(SessionSnapshot::from(login_response()));

        assert!(context.current_user().is_authenticated());
        assert_eq!(durable.get_auth_data(), SessionSnapshot::empty());
    }

    #[test]
    fn detached_context_refuses_write_through() {
        let durable = store(MemoryBackend::new());
        let context = SessionContext::mount(&durable);

        assert_eq!(context.login(login_response()), Err(ContextError::Detached));
        assert_eq!(context.logout(), Err(ContextError::Detached));
    }

    #[test]
    fn subscribers_see_every_change_until_unsubscribed() {
        let context = SessionContext::attached(store(MemoryBackend::new()));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let id = context.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.is_authenticated()));

        context.login(login_response()).unwrap();
        context.logout().unwrap();
        assert!(context.unsubscribe(id));
        context.login(login_response()).unwrap();

        assert_eq!(*seen.borrow(), vec![true, false]);
        assert!(!context.unsubscribe(id));
    }

    #[test]
    fn subscriber_may_read_context_reentrantly() {
        let context = SessionContext::attached(store(MemoryBackend::new()));
        let observed = Rc::new(Cell::new(false));

        let handle = context.clone();
        let flag = Rc::clone(&observed);
        context.subscribe(move |_| flag.set(handle.current_user().has_token()));

        context.login(login_response()).unwrap();
        assert!(observed.get());
    }

    #[test]
    fn rejected_credential_logs_out_and_redirects() {
        let context = SessionContext::attached(store(MemoryBackend::new()));
        context.login(login_response()).unwrap();

        let decision = context
            .handle_rejected_credential("/posts", &LoginPaths::default())
            .unwrap();

        assert_eq!(decision.redirect_target(), Some("/login"));
        assert!(!context.current_user().is_authenticated());
        assert_eq!(context.store().unwrap().get_auth_data(), SessionSnapshot::empty());
    }

    #[test]
    fn failed_durable_write_keeps_memory_session() {
        let context = SessionContext::attached(SessionStore::from_config(
            MemoryBackend::with_quota(16),
            &GateConfig::default(),
        ));

        context.login(login_response()).unwrap();

        assert!(context.current_user().is_authenticated());
        assert!(!context.is_consistent_with(context.store().unwrap()));
    }
}
