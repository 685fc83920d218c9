// SPDX-License-Identifier: GPL-3.0-only

//! Screen stack with named routes
//!
//! Screens are looked up by route name in a [`RouteTable`]. The
//! [`Navigator`] keeps a stack rooted at the landing screen; the route `..`
//! pops one level.

use crate::constants::routes;
use crate::errors::{AppError, AppResult};
use crate::fl;
use std::collections::HashMap;
use tracing::debug;

/// Screens the application can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Landing screen
    Main,
    /// Viewfinder with live detection
    QrScanner,
}

impl Screen {
    pub const ALL: [Screen; 2] = [Screen::Main, Screen::QrScanner];

    /// Route name the screen is registered under
    pub fn route(&self) -> &'static str {
        match self {
            Screen::Main => routes::MAIN,
            Screen::QrScanner => routes::QR_SCANNER,
        }
    }

    /// Localized screen title
    pub fn title(&self) -> String {
        match self {
            Screen::Main => fl!("app-title"),
            Screen::QrScanner => fl!("scanner-title"),
        }
    }
}

/// Route name to screen lookup
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<&'static str, Screen>,
}

impl RouteTable {
    /// Table with every screen registered under its own route
    pub fn with_all_screens() -> Self {
        let mut table = Self::default();
        for screen in Screen::ALL {
            table.register(screen.route(), screen);
        }
        table
    }

    pub fn register(&mut self, route: &'static str, screen: Screen) {
        self.routes.insert(route, screen);
    }

    pub fn resolve(&self, route: &str) -> Option<Screen> {
        self.routes.get(route).copied()
    }
}

/// Navigation stack, never empty
#[derive(Debug, Clone)]
pub struct Navigator {
    routes: RouteTable,
    stack: Vec<Screen>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(RouteTable::with_all_screens())
    }
}

impl Navigator {
    /// Start on the landing screen
    pub fn new(routes: RouteTable) -> Self {
        Self {
            routes,
            stack: vec![Screen::Main],
        }
    }

    pub fn current(&self) -> Screen {
        self.stack.last().copied().unwrap_or(Screen::Main)
    }

    /// Number of screens on the stack (1 at the root)
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Navigate to a named route and return the new current screen
    pub fn go_to(&mut self, route: &str) -> AppResult<Screen> {
        if route == routes::BACK {
            self.go_back();
            return Ok(self.current());
        }

        let screen = self
            .routes
            .resolve(route)
            .ok_or_else(|| AppError::Navigation(format!("unknown route '{}'", route)))?;

        debug!(route, depth = self.stack.len() + 1, "Navigating");
        self.stack.push(screen);
        Ok(screen)
    }

    /// Pop the current screen. Returns the screen that was left, or `None`
    /// at the root.
    pub fn go_back(&mut self) -> Option<Screen> {
        if self.stack.len() <= 1 {
            return None;
        }
        let left = self.stack.pop();
        debug!(?left, depth = self.stack.len(), "Navigated back");
        left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_main() {
        let nav = Navigator::default();
        assert_eq!(nav.current(), Screen::Main);
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn test_go_to_scanner_and_back() {
        let mut nav = Navigator::default();
        assert_eq!(nav.go_to(routes::QR_SCANNER).unwrap(), Screen::QrScanner);
        assert_eq!(nav.current(), Screen::QrScanner);

        assert_eq!(nav.go_to(routes::BACK).unwrap(), Screen::Main);
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn test_unknown_route() {
        let mut nav = Navigator::default();
        let err = nav.go_to("SettingsPage").unwrap_err();
        assert!(matches!(err, AppError::Navigation(_)));
        assert_eq!(nav.current(), Screen::Main);
    }

    #[test]
    fn test_go_back_at_root() {
        let mut nav = Navigator::default();
        assert_eq!(nav.go_back(), None);
        assert_eq!(nav.go_to(routes::BACK).unwrap(), Screen::Main);
    }

    #[test]
    fn test_unregistered_screen_is_unknown() {
        let mut table = RouteTable::default();
        table.register(routes::MAIN, Screen::Main);
        let mut nav = Navigator::new(table);
        assert!(nav.go_to(routes::QR_SCANNER).is_err());
    }

    #[test]
    fn test_routes_round_trip() {
        let table = RouteTable::with_all_screens();
        for screen in Screen::ALL {
            assert_eq!(table.resolve(screen.route()), Some(screen));
        }
    }
}
