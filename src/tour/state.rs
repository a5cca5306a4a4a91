//! Tour state machine — which step is showing and what has been seen.
//!
//! Two states: idle (`current == None`) and active on one registry step.
//! Fields are private; every mutation goes through one of the six
//! transitions so the registry invariants hold at the boundary.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::registry::StepRegistry;
use super::step::StepId;

/// Outcome of a transition: the active step before and after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Option<StepId>,
    pub to: Option<StepId>,
}

impl Transition {
    fn between(from: Option<StepId>, to: Option<StepId>) -> Self {
        Self { from, to }
    }

    /// Whether the active step changed (including activation and ending).
    pub fn step_changed(&self) -> bool {
        self.from != self.to
    }

    /// Whether this transition ended the tour.
    pub fn ended(&self) -> bool {
        self.from.is_some() && self.to.is_none()
    }
}

/// Read-only view of the tour, published to observers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TourSnapshot {
    pub active_step_id: Option<StepId>,
    pub is_active: bool,
    pub completed_step_ids: BTreeSet<StepId>,
    pub has_completed_tour: bool,
    /// Zero-based index of the active step and the total step count.
    pub progress: Option<(usize, usize)>,
}

/// The step state machine.
#[derive(Debug, Clone)]
pub struct TourState {
    registry: Arc<StepRegistry>,
    current: Option<StepId>,
    completed: BTreeSet<StepId>,
    has_completed_tour: bool,
}

impl TourState {
    /// Create an idle tour seeded from the durable completion flag.
    pub fn new(registry: Arc<StepRegistry>, has_completed_tour: bool) -> Self {
        Self {
            registry,
            current: None,
            completed: BTreeSet::new(),
            has_completed_tour,
        }
    }

    pub fn registry(&self) -> &Arc<StepRegistry> {
        &self.registry
    }

    pub fn current_step_id(&self) -> Option<&StepId> {
        self.current.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn completed_step_ids(&self) -> &BTreeSet<StepId> {
        &self.completed
    }

    pub fn has_completed_tour(&self) -> bool {
        self.has_completed_tour
    }

    /// Activate the first step, from any state.
    pub fn start(&mut self) -> Transition {
        let first = self.registry.first().id.clone();
        info!(step = %first, "Tour started");
        self.move_to(Some(first))
    }

    /// Complete the current step and advance; ends the tour after the last step.
    pub fn next(&mut self) -> Transition {
        let Some(current) = self.current.clone() else {
            debug!("next() ignored: tour is idle");
            return self.unchanged();
        };

        self.completed.insert(current.clone());
        match self.registry.next_after(&current) {
            Some(step) => {
                let next = step.id.clone();
                debug!(from = %current, to = %next, "Tour advanced");
                self.move_to(Some(next))
            }
            None => {
                info!(step = %current, "Last step completed");
                self.dismiss()
            }
        }
    }

    /// Step back one; a no-op on the first step or while idle.
    pub fn previous(&mut self) -> Transition {
        let previous = self
            .current
            .as_ref()
            .and_then(|current| self.registry.previous_before(current))
            .map(|step| step.id.clone());

        match previous {
            Some(id) => self.move_to(Some(id)),
            None => self.unchanged(),
        }
    }

    /// Jump straight to `id`; unknown ids leave the state untouched.
    pub fn go_to(&mut self, id: &StepId) -> Transition {
        if !self.registry.contains(id) {
            warn!(step = %id, "go_to() ignored: unknown step");
            return self.unchanged();
        }
        self.move_to(Some(id.clone()))
    }

    /// End the tour and mark it completed.
    pub fn dismiss(&mut self) -> Transition {
        if self.current.is_some() {
            info!("Tour dismissed");
        }
        self.has_completed_tour = true;
        self.move_to(None)
    }

    /// Forget all progress and begin again at the first step.
    pub fn restart(&mut self) -> Transition {
        self.has_completed_tour = false;
        self.completed.clear();
        info!("Tour restarted");
        let first = self.registry.first().id.clone();
        self.move_to(Some(first))
    }

    pub fn snapshot(&self) -> TourSnapshot {
        let progress = self
            .current
            .as_ref()
            .and_then(|id| self.registry.position_of(id))
            .map(|index| (index, self.registry.len()));

        TourSnapshot {
            active_step_id: self.current.clone(),
            is_active: self.is_active(),
            completed_step_ids: self.completed.clone(),
            has_completed_tour: self.has_completed_tour,
            progress,
        }
    }

    fn move_to(&mut self, to: Option<StepId>) -> Transition {
        let from = std::mem::replace(&mut self.current, to);
        Transition::between(from, self.current.clone())
    }

    fn unchanged(&self) -> Transition {
        Transition::between(self.current.clone(), self.current.clone())
    }
}
