//! Route requirements and navigation gates of the console.
//!
//! Declared once here so the router, the guard and the menu agree.

use gatehouse_auth::{
    explain_permission, Gate, Operation, PermissionCheck, PermissionExplanation, RouteRequirement,
    RouteTable, SessionSnapshot,
};
use gatehouse_core::LoginPaths;

pub const HOME: &str = "/";
pub const POSTS: &str = "/posts";
pub const USERS: &str = "/admin/users";
pub const REPORTS: &str = "/reports";

/// Requirement table for every console route.
///
/// Everything is authenticated by default, `/admin` is privileged, and both
/// login pages are public.
pub fn console_routes(paths: &LoginPaths) -> RouteTable {
    RouteTable::new()
        .route(HOME, RouteRequirement::Authenticated)
        .route("/admin", RouteRequirement::AuthenticatedPrivileged)
        .route(paths.standard.clone(), RouteRequirement::None)
        .route(paths.privileged.clone(), RouteRequirement::None)
}

/// One entry of the side menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
    pub gate: Gate,
}

pub fn nav_items() -> Vec<NavItem> {
    vec![
        NavItem {
            label: "Dashboard",
            href: HOME,
            gate: Gate::Ungated,
        },
        NavItem {
            label: "Posts",
            href: POSTS,
            gate: Gate::requires("posts", Operation::Read),
        },
        NavItem {
            label: "Reports",
            href: REPORTS,
            gate: Gate::AnyOf(vec![
                PermissionCheck::new("reports", Operation::Read),
                PermissionCheck::new("reports", Operation::Export),
            ]),
        },
        NavItem {
            label: "Users",
            href: USERS,
            gate: Gate::requires("users", Operation::Read),
        },
    ]
}

/// Every permission check behind the menu, explained against `session`.
///
/// Feeds the administrators' permission inspector.
pub fn explain_nav(session: &SessionSnapshot) -> Vec<(&'static str, PermissionExplanation)> {
    nav_items()
        .into_iter()
        .flat_map(|item| {
            item.gate
                .checks()
                .iter()
                .map(|check| {
                    (
                        item.label,
                        explain_permission(
                            session.permissions.as_ref(),
                            &check.resource_key,
                            check.operation,
                        ),
                    )
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_auth::{DenialKind, PermissionSet, UserProfile};

    #[test]
    fn login_pages_are_public_and_admin_is_privileged() {
        let paths = LoginPaths::default();
        let routes = console_routes(&paths);

        assert_eq!(routes.requirement_for("/login"), RouteRequirement::None);
        assert_eq!(routes.requirement_for("/admin/login"), RouteRequirement::None);
        assert_eq!(routes.requirement_for(USERS), RouteRequirement::AuthenticatedPrivileged);
        assert_eq!(routes.requirement_for(POSTS), RouteRequirement::Authenticated);
        assert_eq!(routes.requirement_for(HOME), RouteRequirement::Authenticated);
    }

    #[test]
    fn configured_login_paths_are_the_public_routes() {
        let paths = LoginPaths {
            standard: "/sign-in".to_string(),
            privileged: "/admin/sign-in".to_string(),
        };
        let routes = console_routes(&paths);

        assert_eq!(routes.requirement_for("/sign-in"), RouteRequirement::None);
        assert_eq!(routes.requirement_for("/admin/sign-in"), RouteRequirement::None);
        assert_eq!(routes.requirement_for("/login"), RouteRequirement::Authenticated);
        assert_eq!(
            routes
                .decide(&SessionSnapshot::empty(), USERS, &paths)
                .redirect_target(),
            Some("/admin/sign-in")
        );
    }

    #[test]
    fn menu_follows_permissions() {
        let session = SessionSnapshot {
            token: Some("tok1".into()),
            user: Some(UserProfile::new("u1")),
            permissions: Some(
                PermissionSet::new()
                    .grant("posts", [Operation::Read])
                    .grant("reports", [Operation::Export]),
            ),
        };

        let visible: Vec<&str> = nav_items()
            .into_iter()
            .filter(|item| session.passes(&item.gate))
            .map(|item| item.label)
            .collect();

        assert_eq!(visible, vec!["Dashboard", "Posts", "Reports"]);
    }

    #[test]
    fn logged_out_menu_shows_only_ungated_items() {
        let session = SessionSnapshot::empty();
        let visible: Vec<&str> = nav_items()
            .into_iter()
            .filter(|item| session.passes(&item.gate))
            .map(|item| item.label)
            .collect();

        assert_eq!(visible, vec!["Dashboard"]);
    }

    #[test]
    fn nav_explanations_cover_every_gated_item() {
        let session = SessionSnapshot {
            token: Some("tok1".into()),
            user: Some(UserProfile::new("u1").admin()),
            permissions: Some(PermissionSet::new().grant("reports", [Operation::Export])),
        };

        let explained = explain_nav(&session);
        let labels: Vec<&str> = explained.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, vec!["Posts", "Reports", "Reports", "Users"]);

        let (_, posts) = &explained[0];
        assert!(!posts.granted);
        assert_eq!(posts.denial, Some(DenialKind::UnknownResource));

        let granted: Vec<bool> = explained.iter().map(|(_, e)| e.granted).collect();
        assert_eq!(granted, vec![false, false, true, false]);
    }

    #[test]
    fn nav_explanations_without_session_report_no_session() {
        assert!(explain_nav(&SessionSnapshot::empty())
            .iter()
            .all(|(_, e)| e.denial == Some(DenialKind::NoSession)));
    }
}
