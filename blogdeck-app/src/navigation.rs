use blogdeck_common::route::Route;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Imperative, fire-and-forget navigation.
pub trait Navigator {
    fn navigate_to(&self, route: Route);
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn navigate_to(&self, route: Route) {
        (**self).navigate_to(route);
    }
}

/// Navigator that keeps every visited route, most recent last.
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<Route>>,
}

impl History {
    #[must_use]
    pub fn starting_at(route: Route) -> Self {
        Self {
            entries: Mutex::new(vec![route]),
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.lock().last().copied()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<Route> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Route>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for History {
    fn navigate_to(&self, route: Route) {
        debug!(%route, "Navigating");
        self.lock().push(route);
    }
}
