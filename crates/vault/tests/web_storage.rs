#![cfg(target_arch = "wasm32")]

use gatehouse_core::CredentialSecret;
use gatehouse_vault::{Cipher, EphemeralStore, SessionStorageBackend, StorageBackend};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn store() -> EphemeralStore<SessionStorageBackend> {
    EphemeralStore::new(
        SessionStorageBackend::new().unwrap(),
        Cipher::new(&CredentialSecret::new("browser-secret")),
        "gh-test.",
    )
}

#[wasm_bindgen_test]
fn session_storage_round_trip() {
    let store = store();
    store.set_item("token", "tok1");

    assert_eq!(store.get_item("token"), "tok1");
    assert_ne!(store.backend().get("gh-test.token").as_deref(), Some("tok1"));

    store.clear_all();
    assert_eq!(store.get_item("token"), "");
}

#[wasm_bindgen_test]
fn clear_all_leaves_foreign_keys() {
    let store = store();
    store.backend().set("unrelated", "keep").unwrap();
    store.set_item("user", "{}");

    store.clear_all();

    assert_eq!(store.backend().get("unrelated").as_deref(), Some("keep"));
    store.backend().remove("unrelated");
}
