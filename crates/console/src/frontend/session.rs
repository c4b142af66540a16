//! Session provider: mounts the session context and mirrors it into a signal.

use std::rc::Rc;

use leptos::*;
use wasm_bindgen::JsValue;

use gatehouse_auth::{Gate, GuardDecision, LoginResponse, RouteTable, SessionSnapshot, UserProfile};
use gatehouse_core::{GateConfig, LoginPaths};
use gatehouse_session::{SessionContext, SessionStore};
use gatehouse_vault::{MemoryBackend, SessionStorageBackend, StorageBackend};

use crate::routes::console_routes;

/// Storage behind the session: `sessionStorage`, or memory when the browser
/// refuses it.
pub type TabBackend = Rc<dyn StorageBackend>;

/// What every component below [`SessionProvider`] sees.
#[derive(Clone)]
pub struct ConsoleSession {
    pub context: SessionContext<TabBackend>,
    /// Reactive mirror of `context`, updated on every change.
    pub snapshot: RwSignal<SessionSnapshot>,
    pub login_paths: LoginPaths,
    pub routes: Rc<RouteTable>,
}

impl ConsoleSession {
    /// Reactive: re-evaluates when the session changes.
    pub fn passes(&self, gate: &Gate) -> bool {
        self.snapshot.with(|s| s.passes(gate))
    }

    pub fn is_admin(&self) -> bool {
        self.snapshot.with(|s| s.is_admin())
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.snapshot.with(|s| s.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.snapshot.with(|s| s.token.clone())
    }

    pub fn login(&self, response: LoginResponse) {
        if let Err(err) = self.context.login(response) {
            tracing::error!(%err, "failed to establish session");
        }
    }

    pub fn update_profile(&self, user: UserProfile) {
        if let Err(err) = self.context.update_profile(user) {
            tracing::error!(%err, "failed to update cached profile");
        }
    }

    pub fn logout(&self) {
        if let Err(err) = self.context.logout() {
            tracing::error!(%err, "failed to clear session");
        }
    }

    /// Clear the session after the API rejected the token and return the
    /// login URL to navigate to.
    pub fn on_unauthorized(&self, requested: &str) -> String {
        match self.context.handle_rejected_credential(requested, &self.login_paths) {
            Ok(GuardDecision::Redirect { to, return_to }) => super::guard::login_url(&to, &return_to),
            Ok(GuardDecision::Render) | Err(_) => self.login_paths.standard.clone(),
        }
    }
}

/// Global the hosting page may set to a JSON object (or string) overriding the
/// build-time configuration.
const INJECTED_CONFIG: &str = "__GATEHOUSE_CONFIG__";

fn injected_config() -> Option<String> {
    let window = web_sys::window()?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str(INJECTED_CONFIG)).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }

    value
        .as_string()
        .or_else(|| js_sys::JSON::stringify(&value).ok().and_then(|json| json.as_string()))
}

fn gate_config() -> GateConfig {
    let Some(raw) = injected_config() else {
        return GateConfig::from_build_env();
    };

    match GateConfig::from_json(&raw) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(%err, "ignoring injected gate configuration");
            GateConfig::from_build_env()
        }
    }
}

fn tab_backend() -> TabBackend {
    match SessionStorageBackend::new() {
        Ok(backend) => Rc::new(backend),
        Err(err) => {
            tracing::warn!(error = %err, "sessionStorage unavailable; session will not survive reloads");
            Rc::new(MemoryBackend::new())
        }
    }
}

/// Seeds the session from tab storage once and provides it to `children`.
#[component]
pub fn SessionProvider(children: Children) -> impl IntoView {
    let config = gate_config();
    let context = SessionContext::attached(SessionStore::from_config(tab_backend(), &config));

    let snapshot = create_rw_signal(context.current_user());
    let subscription = context.subscribe(move |next| snapshot.set(next.clone()));

    let handle = context.clone();
    on_cleanup(move || {
        handle.unsubscribe(subscription);
    });

    provide_context(ConsoleSession {
        context,
        snapshot,
        routes: Rc::new(console_routes(&config.login_paths)),
        login_paths: config.login_paths.clone(),
    });

    children()
}

/// The session provided by the nearest [`SessionProvider`].
pub fn use_session() -> ConsoleSession {
    expect_context::<ConsoleSession>()
}
