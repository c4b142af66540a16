//! Permission gate for menus, buttons and page sections.

use leptos::*;

use gatehouse_auth::Gate;

use super::session::use_session;

/// Render `children` when the session passes `gate`, else `fallback`.
///
/// Elements that are always visible use `Gate::Ungated` explicitly.
#[component]
pub fn Can(
    #[prop(into)] gate: Gate,
    children: ChildrenFn,
    #[prop(optional, into)] fallback: ViewFn,
) -> impl IntoView {
    let session = use_session();

    move || {
        if session.passes(&gate) {
            children().into_view()
        } else {
            fallback.run()
        }
    }
}
