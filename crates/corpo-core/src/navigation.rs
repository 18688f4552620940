//! Navigation between top-level views.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Chat,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Chat => "/chat",
        };
        f.write_str(path)
    }
}

/// Moves the front end to another view.
///
/// The auth session manager calls this on logout; the front end decides what
/// "navigating" means (a router, a prompt, nothing).
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// A navigator that ignores every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _route: Route) {}
}
