//! Route guard: decide whether a protected route renders or redirects.
//!
//! The decision is pure. Navigation is performed by the UI layer.

use gatehouse_core::LoginPaths;

use crate::snapshot::SessionSnapshot;

/// Minimum authentication level a route declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteRequirement {
    #[default]
    None,
    Authenticated,
    AuthenticatedPrivileged,
}

impl RouteRequirement {
    /// The guard's `require_admin` flag, or `None` for public routes.
    pub fn require_admin(self) -> Option<bool> {
        match self {
            RouteRequirement::None => None,
            RouteRequirement::Authenticated => Some(false),
            RouteRequirement::AuthenticatedPrivileged => Some(true),
        }
    }
}

/// Location to restore after login.
///
/// Only same-origin absolute paths survive; anything else collapses to `/`
/// so a crafted link cannot bounce the user off-site after authenticating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnTo(String);

impl ReturnTo {
    pub fn sanitize(requested: &str) -> Self {
        let requested = requested.trim();
        let safe = requested.starts_with('/')
            && !requested.starts_with("//")
            && !requested.starts_with("/\\")
            && !requested.chars().any(|c| c.is_control());

        if safe {
            Self(requested.to_string())
        } else {
            Self("/".to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    Redirect { to: String, return_to: ReturnTo },
}

impl GuardDecision {
    pub fn is_render(&self) -> bool {
        matches!(self, GuardDecision::Render)
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            GuardDecision::Render => None,
            GuardDecision::Redirect { to, .. } => Some(to),
        }
    }
}

/// Decide for a route guarded with `require_admin`.
///
/// 1. No user: redirect to the login variant for the requirement.
/// 2. Privileged route and no token: redirect to the privileged login.
/// 3. Otherwise render.
pub fn guard(
    snapshot: &SessionSnapshot,
    require_admin: bool,
    requested: &str,
    paths: &LoginPaths,
) -> GuardDecision {
    let redirect = |to: &str| GuardDecision::Redirect {
        to: to.to_string(),
        return_to: ReturnTo::sanitize(requested),
    };

    if !snapshot.is_authenticated() {
        tracing::debug!(require_admin, "no active session; redirecting to login");
        return redirect(paths.for_requirement(require_admin));
    }

    if require_admin && !snapshot.has_token() {
        tracing::debug!("profile cached without credential; privileged login required");
        return redirect(&paths.privileged);
    }

    GuardDecision::Render
}

/// [`guard`] driven by a declared [`RouteRequirement`].
pub fn guard_route(
    snapshot: &SessionSnapshot,
    requirement: RouteRequirement,
    requested: &str,
    paths: &LoginPaths,
) -> GuardDecision {
    match requirement.require_admin() {
        None => GuardDecision::Render,
        Some(require_admin) => guard(snapshot, require_admin, requested, paths),
    }
}

/// Static table of route requirements.
///
/// Lookup picks the longest pattern that is a segment prefix of the path
/// (`/admin` matches `/admin` and `/admin/users`, not `/administrator`).
/// Unlisted paths are public.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<(String, RouteRequirement)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: impl Into<String>, requirement: RouteRequirement) -> Self {
        let pattern = pattern.into();
        let pattern = match pattern.trim_end_matches('/') {
            "" => "/".to_string(),
            trimmed => trimmed.to_string(),
        };
        self.routes.push((pattern, requirement));
        self
    }

    pub fn requirement_for(&self, path: &str) -> RouteRequirement {
        let path = path.split(['?', '#']).next().unwrap_or_default();

        self.routes
            .iter()
            .filter(|(pattern, _)| segment_prefix(pattern, path))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, requirement)| *requirement)
            .unwrap_or_default()
    }

    pub fn decide(&self, snapshot: &SessionSnapshot, path: &str, paths: &LoginPaths) -> GuardDecision {
        guard_route(snapshot, self.requirement_for(path), path, paths)
    }
}

fn segment_prefix(pattern: &str, path: &str) -> bool {
    if pattern == "/" {
        return true;
    }
    match path.strip_prefix(pattern) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
