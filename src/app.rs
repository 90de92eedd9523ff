//! Root router: picks the screen for the current session state.
//!
//! ARCHITECTURE
//! ============
//! `Loading` until the startup restore completes, then `Welcome` without a
//! user or the dashboard for the user's role. Operations running after the
//! restore keep the settled screen instead of flashing back to `Loading`.
//! There is no terminal route.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use tokio::sync::watch;

use crate::net::types::Role;
use crate::state::session::SessionState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Loading,
    Welcome,
    CustomerDashboard,
    OwnerDashboard,
    BarberDashboard,
}

impl Route {
    #[must_use]
    pub fn for_state(state: &SessionState) -> Self {
        if !state.restored {
            return Self::Loading;
        }
        match &state.user {
            None => Self::Welcome,
            Some(user) => Self::dashboard_for(user.role),
        }
    }

    #[must_use]
    pub fn dashboard_for(role: Role) -> Self {
        match role {
            Role::Customer => Self::CustomerDashboard,
            Role::Shop => Self::OwnerDashboard,
            Role::Barber => Self::BarberDashboard,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Loading => "Loading",
            Self::Welcome => "Welcome to Join Barber",
            Self::CustomerDashboard => "Dashboard",
            Self::OwnerDashboard => "Shop Management",
            Self::BarberDashboard => "Barber",
        }
    }

    #[must_use]
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::CustomerDashboard | Self::OwnerDashboard | Self::BarberDashboard)
    }
}

/// Tracks the current route from a session state receiver.
pub struct Router {
    current: Route,
    state: watch::Receiver<SessionState>,
}

impl Router {
    #[must_use]
    pub fn new(mut state: watch::Receiver<SessionState>) -> Self {
        let current = Route::for_state(&state.borrow_and_update());
        Self { current, state }
    }

    #[must_use]
    pub fn current(&self) -> Route {
        self.current
    }

    /// Re-evaluate against the latest state. Returns the new route if it moved.
    pub fn refresh(&mut self) -> Option<Route> {
        let next = Route::for_state(&self.state.borrow_and_update());
        if next == self.current {
            return None;
        }
        tracing::debug!(from = ?self.current, to = ?next, "route transition");
        self.current = next;
        Some(next)
    }

    /// Wait for the next route transition. `None` once the session is gone.
    pub async fn next_transition(&mut self) -> Option<Route> {
        loop {
            self.state.changed().await.ok()?;
            if let Some(route) = self.refresh() {
                return Some(route);
            }
        }
    }
}
