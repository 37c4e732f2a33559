//! services/client/src/app/router.rs
//!
//! Route table and the authentication guard.

use readr_core::domain::FileId;

/// Every navigable view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Dashboard,
    ReadingArena(FileId),
}

impl Route {
    /// Parses a path into a route. Unknown paths fall back to the landing
    /// view.
    pub fn parse(path: &str) -> Route {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::Home,
            "/login" => Route::Login,
            "/dashboard" => Route::Dashboard,
            _ => match trimmed.strip_prefix("/reading-arena/") {
                Some(file_id) if !file_id.is_empty() && !file_id.contains('/') => {
                    Route::ReadingArena(FileId::from(file_id))
                }
                _ => Route::Home,
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::ReadingArena(id) => format!("/reading-arena/{id}"),
        }
    }

    fn requires_auth(&self) -> bool {
        matches!(self, Route::Dashboard | Route::ReadingArena(_))
    }
}

/// What the guard decided for a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Render(Route),
    RedirectTo(Route),
}

/// Applies the auth guard: protected views bounce unauthenticated visitors
/// to the login view, and an authenticated visitor landing on the login
/// view is forwarded straight to the dashboard.
pub fn resolve(route: Route, is_authenticated: bool) -> RouteOutcome {
    if route.requires_auth() && !is_authenticated {
        return RouteOutcome::RedirectTo(Route::Login);
    }
    if route == Route::Login && is_authenticated {
        return RouteOutcome::RedirectTo(Route::Dashboard);
    }
    RouteOutcome::Render(route)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_parse_to_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("/dashboard"), Route::Dashboard);
        assert_eq!(
            Route::parse("/reading-arena/abc123"),
            Route::ReadingArena(FileId::from("abc123"))
        );
        assert_eq!(Route::parse("/reading-arena/"), Route::Home);
        assert_eq!(Route::parse("/nope"), Route::Home);
    }

    #[test]
    fn protected_routes_bounce_to_login() {
        assert_eq!(
            resolve(Route::Dashboard, false),
            RouteOutcome::RedirectTo(Route::Login)
        );
        assert_eq!(
            resolve(Route::ReadingArena(FileId::from("f1")), false),
            RouteOutcome::RedirectTo(Route::Login)
        );
        assert_eq!(resolve(Route::Home, false), RouteOutcome::Render(Route::Home));
    }

    #[test]
    fn authenticated_login_forwards_to_dashboard() {
        assert_eq!(
            resolve(Route::Login, true),
            RouteOutcome::RedirectTo(Route::Dashboard)
        );
        assert_eq!(
            resolve(Route::Dashboard, true),
            RouteOutcome::Render(Route::Dashboard)
        );
    }
}
