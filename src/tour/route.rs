//! Route sync — sends the router to the page a step lives on.
//!
//! One-directional: the tour drives navigation, never the reverse.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::TourError;

use super::step::Step;

/// Host router capability.
pub trait Router: Send + Sync {
    /// Current location, e.g. `/records?page=2`.
    fn current_location(&self) -> String;

    /// Navigate to `path`.
    fn navigate(&self, path: &str) -> Result<(), TourError>;
}

/// What route sync did for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The step has no route.
    NoRoute,
    /// Already on the step's route.
    AlreadyThere,
    /// One navigation call was issued.
    Navigated,
    /// The router rejected the navigation; the tour carries on.
    Failed,
}

impl RouteOutcome {
    /// Whether a navigation was attempted, i.e. the page may still be rendering.
    pub fn navigation_attempted(&self) -> bool {
        matches!(self, Self::Navigated | Self::Failed)
    }
}

/// Translates step changes into navigation calls.
pub struct RouteSync {
    router: Arc<dyn Router>,
}

impl RouteSync {
    pub fn new(router: Arc<dyn Router>) -> Self {
        Self { router }
    }

    /// Navigate to `step`'s route if it has one and we are elsewhere.
    pub fn sync(&self, step: &Step) -> RouteOutcome {
        let Some(path) = step.route_path.as_deref() else {
            return RouteOutcome::NoRoute;
        };

        let location = self.router.current_location();
        if same_route(&location, path) {
            debug!(step = %step.id, path = %path, "Already on step route");
            return RouteOutcome::AlreadyThere;
        }

        match self.router.navigate(path) {
            Ok(()) => {
                debug!(step = %step.id, from = %location, to = %path, "Navigated for tour step");
                RouteOutcome::Navigated
            }
            Err(e) => {
                warn!(step = %step.id, path = %path, "Tour navigation failed: {}", e);
                RouteOutcome::Failed
            }
        }
    }
}

/// Compare paths ignoring query, fragment and a trailing slash.
fn same_route(location: &str, path: &str) -> bool {
    fn normalize(p: &str) -> &str {
        let end = p.find(['?', '#']).unwrap_or(p.len());
        let trimmed = p[..end].trim_end_matches('/');
        if trimmed.is_empty() { "/" } else { trimmed }
    }
    normalize(location) == normalize(path)
}
