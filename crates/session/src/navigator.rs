//! Navigation capability used when a session expires.
//!
//! In a browser the session layer would assign `window.location`. Here the
//! host supplies a [`Navigator`]: a headless host reports no location and is
//! never navigated, a terminal host can print a hint, and tests can record
//! the requests.

/// Host navigation capability.
pub trait Navigator: Send + Sync {
    /// Current location path, or `None` outside a browser-like context.
    fn current_location(&self) -> Option<String>;

    /// Request navigation to `path`.
    fn navigate(&self, path: &str);
}

/// Navigator for hosts with no notion of location. Never navigates.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessNavigator;

impl Navigator for HeadlessNavigator {
    fn current_location(&self) -> Option<String> {
        None
    }

    fn navigate(&self, path: &str) {
        tracing::debug!(path, "Headless navigator ignoring navigation request");
    }
}

/// Returns `true` if `location` is already the login entry point (or below it).
pub(crate) fn is_login_location(location: &str, login_path: &str) -> bool {
    let location = location.split(['?', '#']).next().unwrap_or(location);
    let login_path = login_path.trim_end_matches('/');
    if login_path.is_empty() {
        return location == "/";
    }
    location == login_path
        || location
            .strip_prefix(login_path)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_login_location() {
        assert!(is_login_location("/login", "/login"));
        assert!(is_login_location("/login?next=/admin", "/login"));
        assert!(is_login_location("/login/admin", "/login/"));
        assert!(!is_login_location("/loginhelp", "/login"));
        assert!(!is_login_location("/admin/products", "/login"));
    }

    #[test]
    fn test_root_login_path_matches_only_root() {
        assert!(is_login_location("/", "/"));
        assert!(is_login_location("/?expired=1", "/"));
        assert!(!is_login_location("/products", "/"));
        assert!(!is_login_location("/admin/orders", "/"));
    }

    #[test]
    fn test_headless_navigator_has_no_location() {
        assert_eq!(HeadlessNavigator.current_location(), None);
    }
}
