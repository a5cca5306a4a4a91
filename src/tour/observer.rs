//! Observer loop — keeps the tooltip attached while a step is showing.
//!
//! Per step: a cancellable settle timer, then one locate/position pass, then
//! one mutation observer and one resize listener that re-run the pass on
//! every signal. The timer and the observer pair are single-slot resources:
//! the previous one is always released before a new one is acquired.
//!
//! Callbacks never touch tour state directly. They push a [`LoopSignal`]
//! tagged with the activation generation into a channel that the owner
//! drains; signals from an older generation are dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::locator::{Document, TargetLocator};
use super::position::{Side, TooltipGeometry, compute_position};
use super::step::{Step, StepId};
use super::tooltip::{TooltipRenderer, TooltipView};

/// Callback invoked by the host on a DOM mutation or resize.
pub type SignalCallback = Box<dyn Fn() + Send + Sync>;

/// Handle that releases a subscription exactly once.
///
/// Released explicitly with [`Unsubscribe::unsubscribe`], or on drop.
pub struct Unsubscribe {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Unsubscribe {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A handle with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }

    pub fn unsubscribe(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Unsubscribe {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("live", &self.release.is_some())
            .finish()
    }
}

/// What the mutation observer watches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationFilter {
    pub subtree: bool,
    pub child_list: bool,
    pub attribute_filter: Vec<String>,
}

impl Default for MutationFilter {
    fn default() -> Self {
        Self {
            subtree: true,
            child_list: true,
            attribute_filter: vec!["class".to_string(), "style".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// The settle timer fired.
    Settled,
    Mutation,
    Resize,
}

/// Event delivered back to the loop owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSignal {
    pub generation: u64,
    pub kind: SignalKind,
}

/// Per-step lifecycle of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Idle,
    /// Settle timer pending.
    Initializing,
    Locating,
    /// Observer pair live.
    Positioned,
    TearingDown,
}

struct DebounceTimer {
    handle: JoinHandle<()>,
}

impl DebounceTimer {
    fn spawn(delay: Duration, signals: mpsc::UnboundedSender<LoopSignal>, generation: u64) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = signals.send(LoopSignal {
                generation,
                kind: SignalKind::Settled,
            });
        });
        Self { handle }
    }

    fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct ObserverPair {
    mutations: Unsubscribe,
    resize: Unsubscribe,
}

impl ObserverPair {
    fn release(self) {
        self.mutations.unsubscribe();
        self.resize.unsubscribe();
    }
}

struct ActiveStep {
    step: Step,
    index: usize,
    total: usize,
}

/// Owner of the settle timer, the observer pair and the highlight.
pub struct ObserverLoop {
    document: Arc<dyn Document>,
    renderer: Arc<dyn TooltipRenderer>,
    geometry: TooltipGeometry,
    settle_delay: Duration,
    locator: TargetLocator,
    signals: mpsc::UnboundedSender<LoopSignal>,
    phase: LoopPhase,
    generation: u64,
    active: Option<ActiveStep>,
    debounce: Option<DebounceTimer>,
    observers: Option<ObserverPair>,
    last_view: Option<TooltipView>,
}

impl ObserverLoop {
    pub fn new(
        document: Arc<dyn Document>,
        renderer: Arc<dyn TooltipRenderer>,
        geometry: TooltipGeometry,
        settle_delay: Duration,
        highlight_class: impl Into<String>,
        signals: mpsc::UnboundedSender<LoopSignal>,
    ) -> Self {
        Self {
            document,
            renderer,
            geometry,
            settle_delay,
            locator: TargetLocator::new(highlight_class),
            signals,
            phase: LoopPhase::Idle,
            generation: 0,
            active: None,
            debounce: None,
            observers: None,
            last_view: None,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn active_step_id(&self) -> Option<&StepId> {
        self.active.as_ref().map(|a| &a.step.id)
    }

    pub fn has_pending_timer(&self) -> bool {
        self.debounce.is_some()
    }

    pub fn has_live_observers(&self) -> bool {
        self.observers.is_some()
    }

    /// The view rendered by the most recent pass.
    pub fn last_view(&self) -> Option<&TooltipView> {
        self.last_view.as_ref()
    }

    /// Begin tracking `step`, releasing whatever the previous step held.
    ///
    /// With `settle` the first pass waits for the settle delay; otherwise it
    /// runs immediately.
    pub fn activate(&mut self, step: Step, index: usize, total: usize, settle: bool) {
        self.teardown();
        self.withdraw();
        self.generation += 1;
        debug!(step = %step.id, generation = self.generation, settle, "Observer loop activated");
        self.active = Some(ActiveStep { step, index, total });

        if !settle {
            self.settle();
            return;
        }

        if tokio::runtime::Handle::try_current().is_err() {
            warn!("No async runtime for the settle timer; positioning immediately");
            self.settle();
            return;
        }

        self.phase = LoopPhase::Initializing;
        self.debounce = Some(DebounceTimer::spawn(
            self.settle_delay,
            self.signals.clone(),
            self.generation,
        ));
    }

    /// Stop tracking: release resources, clear the highlight, hide the tooltip.
    pub fn deactivate(&mut self) {
        if self.active.is_none() && self.phase == LoopPhase::Idle {
            return;
        }
        self.teardown();
        self.withdraw();
        self.generation += 1;
        self.active = None;
        self.phase = LoopPhase::Idle;
        debug!(generation = self.generation, "Observer loop idle");
    }

    /// Handle a signal; returns whether it triggered a pass.
    pub fn handle_signal(&mut self, signal: LoopSignal) -> bool {
        if signal.generation != self.generation {
            trace!(
                signal = ?signal.kind,
                generation = signal.generation,
                current = self.generation,
                "Dropping stale tour signal"
            );
            return false;
        }

        match (signal.kind, self.phase) {
            (SignalKind::Settled, LoopPhase::Initializing) => {
                // The timer task has finished; just forget the handle.
                self.debounce = None;
                self.settle();
                true
            }
            (SignalKind::Mutation | SignalKind::Resize, LoopPhase::Positioned) => {
                self.pass();
                self.phase = LoopPhase::Positioned;
                true
            }
            (kind, phase) => {
                trace!(signal = ?kind, ?phase, "Ignoring tour signal in current phase");
                false
            }
        }
    }

    fn settle(&mut self) {
        self.pass();
        self.install_observers();
        self.phase = LoopPhase::Positioned;
    }

    /// One locate + position + render pass for the active step.
    fn pass(&mut self) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        self.phase = LoopPhase::Locating;

        let rect = match self.locator.locate(self.document.as_ref(), &active.step) {
            Ok(rect) => rect,
            Err(err) => {
                trace!(step = %active.step.id, error = %err, "Falling back to centered tooltip");
                None
            }
        };
        let side = if rect.is_some() {
            active.step.side
        } else {
            Side::Center
        };
        let position = compute_position(rect, side, self.document.viewport(), &self.geometry);

        let view = TooltipView {
            step_id: active.step.id.clone(),
            title: active.step.title.clone(),
            message: active.step.message.clone(),
            side,
            position,
            anchored: rect.is_some() && side != Side::Center,
            index: active.index,
            total: active.total,
        };
        trace!(step = %view.step_id, top = position.top, left = position.left, anchored = view.anchored, "Tour tooltip positioned");

        if self.last_view.as_ref() != Some(&view) {
            self.renderer.show(&view);
            self.last_view = Some(view);
        }
    }

    fn install_observers(&mut self) {
        if let Some(stale) = self.observers.take() {
            warn!("Releasing leftover tour observers before installing new ones");
            stale.release();
        }

        let generation = self.generation;
        let mutation_tx = self.signals.clone();
        let resize_tx = self.signals.clone();

        let mutations = self.document.observe_mutations(
            MutationFilter::default(),
            Box::new(move || {
                let _ = mutation_tx.send(LoopSignal {
                    generation,
                    kind: SignalKind::Mutation,
                });
            }),
        );
        let resize = self.document.on_resize(Box::new(move || {
            let _ = resize_tx.send(LoopSignal {
                generation,
                kind: SignalKind::Resize,
            });
        }));

        self.observers = Some(ObserverPair { mutations, resize });
        debug!(generation, "Tour observers installed");
    }

    /// Take the previous step's visuals off screen: strip the highlight and
    /// hide the tooltip if one is showing.
    fn withdraw(&mut self) {
        self.locator.clear(self.document.as_ref());
        if self.last_view.take().is_some() {
            self.renderer.hide();
        }
    }

    fn teardown(&mut self) {
        if let Some(timer) = self.debounce.take() {
            debug!(generation = self.generation, "Cancelling pending settle timer");
            timer.cancel();
        }
        if let Some(pair) = self.observers.take() {
            self.phase = LoopPhase::TearingDown;
            pair.release();
            debug!(generation = self.generation, "Tour observers released");
        }
    }
}

impl Drop for ObserverLoop {
    fn drop(&mut self) {
        self.teardown();
        self.locator.clear(self.document.as_ref());
    }
}
