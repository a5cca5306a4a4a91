//! Tour controller — the single app-lifetime owner of tour state.
//!
//! Wires the state machine to route sync and the observer loop, persists the
//! durable flags, and publishes a [`TourSnapshot`] after every change. The
//! host calls the six operations directly and feeds loop signals back in,
//! either through [`TourController::run`] or by polling
//! [`TourController::process_next_signal`] from its own event loop.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::{SettlePolicy, TourConfig};
use crate::store::{Flag, FlagStore};

use super::locator::Document;
use super::observer::{LoopPhase, LoopSignal, ObserverLoop};
use super::registry::StepRegistry;
use super::route::{RouteSync, Router};
use super::state::{TourSnapshot, TourState, Transition};
use super::step::StepId;
use super::tooltip::{TooltipRenderer, TooltipView};

/// Host collaborators the controller drives.
///
/// Bundles the shared components to reduce argument count.
pub struct TourDeps {
    pub router: Arc<dyn Router>,
    pub document: Arc<dyn Document>,
    pub renderer: Arc<dyn TooltipRenderer>,
    pub store: Arc<dyn FlagStore>,
}

/// Operations a host can queue for [`TourController::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourCommand {
    Start,
    Next,
    Previous,
    GoTo(StepId),
    Dismiss,
    Restart,
    AcknowledgeWelcome { start_tour: bool },
}

pub struct TourController {
    config: TourConfig,
    state: TourState,
    routes: RouteSync,
    observer: ObserverLoop,
    store: Arc<dyn FlagStore>,
    signals: mpsc::UnboundedReceiver<LoopSignal>,
    snapshot: watch::Sender<TourSnapshot>,
    has_seen_welcome: bool,
}

impl TourController {
    /// Create an idle controller, seeding state from the durable flags.
    ///
    /// Must be called inside a tokio runtime for the settle timer to work;
    /// without one, steps are positioned immediately.
    pub fn new(config: TourConfig, registry: Arc<StepRegistry>, deps: TourDeps) -> Self {
        let has_completed_tour = read_flag(deps.store.as_ref(), Flag::OnboardingCompleted);
        let has_seen_welcome = read_flag(deps.store.as_ref(), Flag::HasSeenWelcome);

        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let observer = ObserverLoop::new(
            deps.document,
            deps.renderer,
            config.geometry,
            config.settle_delay,
            config.highlight_class.clone(),
            signal_tx,
        );
        let state = TourState::new(registry, has_completed_tour);
        let (snapshot, _) = watch::channel(state.snapshot());

        info!(
            steps = state.registry().len(),
            has_completed_tour, has_seen_welcome, "Tour controller mounted"
        );

        Self {
            config,
            state,
            routes: RouteSync::new(deps.router),
            observer,
            store: deps.store,
            signals: signal_rx,
            snapshot,
            has_seen_welcome,
        }
    }

    /// Auto-start for returning users who saw the welcome but never finished.
    /// Returns whether the tour was started.
    pub fn mount(&mut self) -> bool {
        if !self.config.auto_start
            || !self.has_seen_welcome
            || self.state.has_completed_tour()
            || self.state.is_active()
        {
            return false;
        }
        self.start();
        true
    }

    pub fn start(&mut self) {
        let before = self.state.has_completed_tour();
        let transition = self.state.start();
        self.apply(transition, before);
    }

    pub fn next(&mut self) {
        let before = self.state.has_completed_tour();
        let transition = self.state.next();
        self.apply(transition, before);
    }

    pub fn previous(&mut self) {
        let before = self.state.has_completed_tour();
        let transition = self.state.previous();
        self.apply(transition, before);
    }

    pub fn go_to(&mut self, id: &StepId) {
        let before = self.state.has_completed_tour();
        let transition = self.state.go_to(id);
        self.apply(transition, before);
    }

    pub fn dismiss(&mut self) {
        let before = self.state.has_completed_tour();
        let transition = self.state.dismiss();
        self.apply(transition, before);
    }

    pub fn restart(&mut self) {
        let before = self.state.has_completed_tour();
        let transition = self.state.restart();
        self.apply(transition, before);
    }

    /// Whether the host should show the welcome dialog.
    pub fn should_show_welcome(&self) -> bool {
        !self.has_seen_welcome && !self.state.has_completed_tour()
    }

    /// Record that the welcome was seen, then start the tour or, when the
    /// user skipped it, mark it completed so it never auto-starts again.
    pub fn acknowledge_welcome(&mut self, start_tour: bool) {
        if !self.has_seen_welcome {
            self.has_seen_welcome = true;
            self.persist(Flag::HasSeenWelcome, true);
        }
        if start_tour {
            self.start();
        } else {
            info!("Tour skipped from welcome");
            self.dismiss();
        }
    }

    pub fn dispatch(&mut self, command: TourCommand) {
        debug!(?command, "Tour command");
        match command {
            TourCommand::Start => self.start(),
            TourCommand::Next => self.next(),
            TourCommand::Previous => self.previous(),
            TourCommand::GoTo(id) => self.go_to(&id),
            TourCommand::Dismiss => self.dismiss(),
            TourCommand::Restart => self.restart(),
            TourCommand::AcknowledgeWelcome { start_tour } => self.acknowledge_welcome(start_tour),
        }
    }

    pub fn active_step_id(&self) -> Option<&StepId> {
        self.state.current_step_id()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn completed_step_ids(&self) -> &BTreeSet<StepId> {
        self.state.completed_step_ids()
    }

    pub fn has_completed_tour(&self) -> bool {
        self.state.has_completed_tour()
    }

    pub fn registry(&self) -> &Arc<StepRegistry> {
        self.state.registry()
    }

    pub fn observer_phase(&self) -> LoopPhase {
        self.observer.phase()
    }

    /// The tooltip currently on screen, if any.
    pub fn tooltip(&self) -> Option<&TooltipView> {
        self.observer.last_view()
    }

    /// Observe snapshots; the receiver only wakes on actual changes.
    pub fn subscribe(&self) -> watch::Receiver<TourSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> TourSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Wait for the next loop signal and handle it.
    /// Returns whether it triggered a positioning pass.
    pub async fn process_next_signal(&mut self) -> bool {
        match self.signals.recv().await {
            Some(signal) => self.observer.handle_signal(signal),
            None => false,
        }
    }

    /// Handle every signal already queued; returns how many triggered a pass.
    pub fn process_pending(&mut self) -> usize {
        let mut passes = 0;
        while let Ok(signal) = self.signals.try_recv() {
            if self.observer.handle_signal(signal) {
                passes += 1;
            }
        }
        passes
    }

    /// Drive the tour from a command channel until it closes.
    pub async fn run(&mut self, mut commands: mpsc::UnboundedReceiver<TourCommand>) {
        loop {
            let wake = tokio::select! {
                command = commands.recv() => Wake::Command(command),
                Some(signal) = self.signals.recv() => Wake::Signal(signal),
            };
            match wake {
                Wake::Command(Some(command)) => self.dispatch(command),
                Wake::Command(None) => break,
                Wake::Signal(signal) => {
                    self.observer.handle_signal(signal);
                }
            }
        }
        debug!("Tour command channel closed");
        self.shutdown();
    }

    /// Release observers and hide the tooltip without touching persisted state.
    pub fn shutdown(&mut self) {
        self.observer.deactivate();
    }

    fn apply(&mut self, transition: Transition, completed_before: bool) {
        let completed = self.state.has_completed_tour();
        if completed != completed_before {
            self.persist(Flag::OnboardingCompleted, completed);
        }

        if transition.step_changed() {
            match transition.to.as_ref() {
                Some(id) => self.activate(id),
                None => self.observer.deactivate(),
            }
        }

        let next = self.state.snapshot();
        self.snapshot.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    fn activate(&mut self, id: &StepId) {
        let registry = Arc::clone(self.state.registry());
        let step = match registry.get(id) {
            Ok(step) => step,
            Err(e) => {
                warn!("Cannot activate tour step: {}", e);
                return;
            }
        };
        let index = registry.position_of(id).unwrap_or(0);

        let route = self.routes.sync(step);
        let settle = match self.config.settle_policy {
            SettlePolicy::Always => true,
            SettlePolicy::NavigatingStepsOnly => route.navigation_attempted(),
        };
        debug!(step = %id, ?route, settle, "Activating tour step");

        self.observer.activate(step.clone(), index, registry.len(), settle);
    }

    fn persist(&self, flag: Flag, value: bool) {
        if let Err(e) = self.store.set(flag, value) {
            warn!(flag = %flag, value, "Failed to persist tour flag: {}", e);
        }
    }
}

enum Wake {
    Command(Option<TourCommand>),
    Signal(LoopSignal),
}

fn read_flag(store: &dyn FlagStore, flag: Flag) -> bool {
    store.get(flag).unwrap_or_else(|e| {
        warn!(flag = %flag, "Failed to read tour flag, assuming false: {}", e);
        false
    })
}
