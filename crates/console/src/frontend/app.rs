//! Leptos application with routing.

use leptos::*;
use leptos_router::*;

use gatehouse_auth::{Gate, Operation, PermissionCheck, ReturnTo, RouteRequirement};

use crate::frontend::api::{self, ApiError};
use crate::frontend::{use_session, Can, ProtectedRoute, SessionProvider};
use crate::routes::{explain_nav, nav_items, HOME, POSTS, REPORTS, USERS};

/// Main application component.
#[component]
pub fn App() -> impl IntoView {
    view! {
        <SessionProvider>
            <Router>
                <div class="app">
                    <Header/>
                    <main>
                        <ConsoleRoutes/>
                    </main>
                </div>
            </Router>
        </SessionProvider>
    }
}

/// Route tree; login pages live at the configured paths the guard redirects to.
#[component]
fn ConsoleRoutes() -> impl IntoView {
    let paths = use_session().login_paths;

    view! {
        <Routes>
            <Route path=paths.standard.clone() view=|| view! { <LoginPage privileged=false/> }/>
            <Route path=paths.privileged.clone() view=|| view! { <LoginPage privileged=true/> }/>
            <Route path=HOME view=|| view! { <ProtectedRoute><DashboardPage/></ProtectedRoute> }/>
            <Route path=POSTS view=|| view! { <ProtectedRoute><PostsPage/></ProtectedRoute> }/>
            <Route path=REPORTS view=|| view! { <ProtectedRoute><ReportsPage/></ProtectedRoute> }/>
            <Route
                path=USERS
                view=|| view! {
                    <ProtectedRoute requirement=RouteRequirement::AuthenticatedPrivileged>
                        <UsersPage/>
                    </ProtectedRoute>
                }
            />
        </Routes>
    }
}

/// Menu and user box; menu entries follow the session's permissions.
#[component]
fn Header() -> impl IntoView {
    let session = use_session();
    let logout_session = session.clone();
    let navigate = use_navigate();
    let login_href = session.login_paths.standard.clone();

    let logout = move |_: ev::MouseEvent| {
        logout_session.logout();
        navigate(&logout_session.login_paths.standard, Default::default());
    };

    view! {
        <header>
            <h1>"Admin Console"</h1>
            <nav>
                {nav_items()
                    .into_iter()
                    .map(|item| {
                        view! {
                            <Can gate=item.gate>
                                <A href=item.href>{item.label}</A>
                            </Can>
                        }
                    })
                    .collect_view()}
            </nav>
            <div class="user">
                {move || match session.user() {
                    Some(user) => view! {
                        <span class="display-name">{user.display_name}</span>
                        {session.is_admin().then(|| view! { <span class="badge">"Admin"</span> })}
                        <button on:click=logout.clone()>"Log out"</button>
                    }
                    .into_view(),
                    None => view! { <A href=login_href.clone()>"Log in"</A> }.into_view(),
                }}
            </div>
        </header>
    }
}

/// Standard or privileged login form.
#[component]
fn LoginPage(privileged: bool) -> impl IntoView {
    let session = use_session();
    let query = use_query_map();
    let navigate = use_navigate();

    let username = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let error = create_rw_signal(None::<String>);
    let is_submitting = create_rw_signal(false);

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get() {
            return;
        }
        is_submitting.set(true);
        error.set(None);

        let session = session.clone();
        let navigate = navigate.clone();
        let return_to = ReturnTo::sanitize(
            &query.with(|q| q.get("redirect").cloned().unwrap_or_else(|| HOME.to_string())),
        );

        spawn_local(async move {
            match api::login(&username.get_untracked(), &password.get_untracked(), privileged).await {
                Ok(response) => {
                    session.login(response);
                    password.set(String::new());
                    navigate(return_to.as_str(), Default::default());
                }
                Err(e) => {
                    tracing::info!(error = %e, "login failed");
                    error.set(Some(e.to_string()));
                }
            }
            is_submitting.set(false);
        });
    };

    view! {
        <div class="login">
            <h2>{if privileged { "Administrator sign-in" } else { "Sign in" }}</h2>
            <form on:submit=submit>
                <div class="form-group">
                    <label for="username">"Username"</label>
                    <input
                        type="text"
                        id="username"
                        prop:value=move || username.get()
                        on:input=move |ev| username.set(event_target_value(&ev))
                    />
                </div>
                <div class="form-group">
                    <label for="password">"Password"</label>
                    <input
                        type="password"
                        id="password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                </div>
                {move || error.get().map(|message| view! { <p class="error">{message}</p> })}
                <button type="submit" disabled=move || is_submitting.get()>
                    {move || if is_submitting.get() { "Signing in..." } else { "Sign in" }}
                </button>
            </form>
        </div>
    }
}

#[component]
fn DashboardPage() -> impl IntoView {
    let session = use_session();
    let refreshing = create_rw_signal(false);
    let navigate = use_navigate();

    // Re-reads the profile; a rejected token clears the session.
    let refresh = move |_: ev::MouseEvent| {
        let Some(token) = session.token() else {
            return;
        };
        let session = session.clone();
        let navigate = navigate.clone();
        refreshing.set(true);

        spawn_local(async move {
            match api::fetch_profile(&token).await {
                Ok(profile) => session.update_profile(profile),
                Err(ApiError::Unauthorized) => {
                    let target = session.on_unauthorized(HOME);
                    navigate(&target, Default::default());
                }
                Err(e) => tracing::warn!(error = %e, "profile refresh failed"),
            }
            refreshing.set(false);
        });
    };

    view! {
        <section class="dashboard">
            <h2>"Dashboard"</h2>
            <button on:click=refresh disabled=move || refreshing.get()>"Refresh profile"</button>
        </section>
    }
}

#[component]
fn PostsPage() -> impl IntoView {
    view! {
        <section class="posts">
            <h2>"Posts"</h2>
            <div class="actions">
                <Can gate=Gate::requires("posts", Operation::Create)>
                    <button>"New post"</button>
                </Can>
                <Can gate=Gate::requires("posts", Operation::Export)>
                    <button>"Export"</button>
                </Can>
                <Can
                    gate=Gate::requires("posts", Operation::Delete)
                    fallback=|| view! { <span class="hint">"Deleting posts requires additional permissions."</span> }
                >
                    <button class="danger">"Delete selected"</button>
                </Can>
            </div>
        </section>
    }
}

#[component]
fn ReportsPage() -> impl IntoView {
    view! {
        <section class="reports">
            <h2>"Reports"</h2>
            <Can
                gate=Gate::AllOf(vec![
                    PermissionCheck::new("reports", Operation::Read),
                    PermissionCheck::new("reports", Operation::Export),
                ])
            >
                <button>"Download CSV"</button>
            </Can>
        </section>
    }
}

#[component]
fn UsersPage() -> impl IntoView {
    view! {
        <section class="users">
            <h2>"Users"</h2>
            <Can gate=Gate::requires("users", Operation::Update)>
                <button>"Edit roles"</button>
            </Can>
            <PermissionInspector/>
        </section>
    }
}

/// Why each menu entry is shown or hidden for the current session.
#[component]
fn PermissionInspector() -> impl IntoView {
    let session = use_session();

    move || {
        let rows = session.snapshot.with(explain_nav);
        view! {
            <details class="permission-inspector">
                <summary>"Menu permissions"</summary>
                <table>
                    <tbody>
                        {rows
                            .into_iter()
                            .map(|(label, explanation)| {
                                view! {
                                    <tr class:denied=!explanation.granted>
                                        <td>{label}</td>
                                        <td>{format!("{}:{}", explanation.resource_key, explanation.operation)}</td>
                                        <td>{explanation.reason}</td>
                                    </tr>
                                }
                            })
                            .collect_view()}
                    </tbody>
                </table>
            </details>
        }
    }
}
