//! Dashboard route table and authentication guard
//!
//! Protected routes need a stored access token; the login and registration
//! pages are only for anonymous visitors.

use std::fmt;

/// Named dashboard routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Home,
    Dashboard,
    Settings,
}

/// Outcome of the navigation guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Continue to the requested route
    Proceed(Route),
    /// Go somewhere else instead
    Redirect(Route),
}

impl Navigation {
    /// The route that ends up displayed
    pub fn destination(self) -> Route {
        match self {
            Self::Proceed(route) | Self::Redirect(route) => route,
        }
    }
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Login,
        Route::Register,
        Route::Home,
        Route::Dashboard,
        Route::Settings,
    ];

    /// URL path of the route
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Home => "/home",
            Self::Dashboard => "/dashboard",
            Self::Settings => "/settings",
        }
    }

    /// Whether the route needs a logged-in user
    pub fn requires_auth(self) -> bool {
        !matches!(self, Self::Login | Self::Register)
    }

    /// Resolve a path, ignoring any query string or fragment.
    ///
    /// The root path resolves to [`Route::Home`].
    ///
    /// # Examples
    ///
    /// ```
    /// use voxdash::routes::Route;
    ///
    /// assert_eq!(Route::from_path("/"), Some(Route::Home));
    /// assert_eq!(Route::from_path("/dashboard?fromUpload=1"), Some(Route::Dashboard));
    /// assert_eq!(Route::from_path("/admin"), None);
    /// ```
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return Some(Self::Home);
        }
        Self::ALL.into_iter().find(|route| route.path() == path)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Decide where a navigation to `target` lands.
///
/// # Examples
///
/// ```
/// use voxdash::routes::{guard, Navigation, Route};
///
/// assert_eq!(guard(Route::Dashboard, false), Navigation::Redirect(Route::Login));
/// assert_eq!(guard(Route::Login, true), Navigation::Redirect(Route::Home));
/// assert_eq!(guard(Route::Settings, true), Navigation::Proceed(Route::Settings));
/// ```
pub fn guard(target: Route, logged_in: bool) -> Navigation {
    if target.requires_auth() && !logged_in {
        tracing::debug!("Redirecting anonymous visitor from {} to login", target);
        Navigation::Redirect(Route::Login)
    } else if !target.requires_auth() && logged_in {
        tracing::debug!("Redirecting logged-in user from {} to home", target);
        Navigation::Redirect(Route::Home)
    } else {
        Navigation::Proceed(target)
    }
}
