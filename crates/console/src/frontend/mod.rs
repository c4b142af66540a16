//! Leptos frontend for the admin console.

pub mod api;
pub mod app;
pub mod can;
pub mod guard;
pub mod session;

pub use can::Can;
pub use guard::ProtectedRoute;
pub use session::{use_session, ConsoleSession, SessionProvider};

use wasm_bindgen::prelude::*;

/// WASM entry point for the frontend.
/// This is called automatically when the WASM module loads.
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    gatehouse_observability::init();

    leptos::mount_to_body(app::App);
}
