//! Route guard component.

use leptos::*;
use leptos_router::*;

use gatehouse_auth::{guard_route, GuardDecision, ReturnTo, RouteRequirement};

use super::session::use_session;

/// `to?redirect=<return_to>`, with the return location URI-encoded.
pub fn login_url(to: &str, return_to: &ReturnTo) -> String {
    let encoded = String::from(js_sys::encode_uri_component(return_to.as_str()));
    format!("{to}?redirect={encoded}")
}

fn requested_location(pathname: &str, search: &str) -> String {
    match search {
        "" | "?" => pathname.to_string(),
        s if s.starts_with('?') => format!("{pathname}{s}"),
        s => format!("{pathname}?{s}"),
    }
}

/// Render `children` only when the session satisfies the route's requirement;
/// otherwise redirect to the matching login page.
///
/// Without an explicit `requirement`, the console route table decides.
#[component]
pub fn ProtectedRoute(
    #[prop(optional)] requirement: Option<RouteRequirement>,
    children: ChildrenFn,
) -> impl IntoView {
    let session = use_session();
    let location = use_location();

    move || {
        let requested = requested_location(&location.pathname.get(), &location.search.get());
        let requirement = requirement.unwrap_or_else(|| session.routes.requirement_for(&requested));

        let decision = session
            .snapshot
            .with(|snapshot| guard_route(snapshot, requirement, &requested, &session.login_paths));

        match decision {
            GuardDecision::Render => children().into_view(),
            GuardDecision::Redirect { to, return_to } => {
                let target = login_url(&to, &return_to);
                view! { <Redirect path=target/> }.into_view()
            }
        }
    }
}
