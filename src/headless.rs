//! Headless host collaborators — an in-memory document, router and tooltip.
//!
//! Used by the `tour-preview` binary to lay out a tour without a browser, and
//! by tests to drive the engine deterministically. Mutations (mount, unmount,
//! move, class changes) notify mutation observers synchronously; `resize`
//! notifies resize listeners.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::error::TourError;
use crate::tour::locator::Document;
use crate::tour::observer::{MutationFilter, SignalCallback, Unsubscribe};
use crate::tour::position::{Rect, Viewport};
use crate::tour::route::Router;
use crate::tour::tooltip::{TooltipRenderer, TooltipView};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Subscription lifecycle events, in the order they happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionEvent {
    MutationObserved,
    MutationReleased,
    ResizeObserved,
    ResizeReleased,
}

type SharedCallback = Arc<dyn Fn() + Send + Sync>;

struct DocumentState {
    viewport: Viewport,
    elements: HashMap<String, Rect>,
    classes: HashMap<String, BTreeSet<String>>,
    class_changes: usize,
    scrolled: Vec<String>,
    next_subscription: u64,
    mutation_observers: HashMap<u64, SharedCallback>,
    resize_listeners: HashMap<u64, SharedCallback>,
    log: Vec<SubscriptionEvent>,
    max_live_observers: usize,
}

/// In-memory document with settable element rects.
pub struct HeadlessDocument {
    state: Arc<Mutex<DocumentState>>,
}

impl HeadlessDocument {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            state: Arc::new(Mutex::new(DocumentState {
                viewport,
                elements: HashMap::new(),
                classes: HashMap::new(),
                class_changes: 0,
                scrolled: Vec::new(),
                next_subscription: 0,
                mutation_observers: HashMap::new(),
                resize_listeners: HashMap::new(),
                log: Vec::new(),
                max_live_observers: 0,
            })),
        }
    }

    /// Document pre-populated with element rects, e.g. from a layout file.
    pub fn with_layout(viewport: Viewport, elements: HashMap<String, Rect>) -> Self {
        let document = Self::new(viewport);
        lock(&document.state).elements = elements;
        document
    }

    /// Add (or replace) an element and notify mutation observers.
    pub fn mount(&self, id: &str, rect: Rect) {
        lock(&self.state).elements.insert(id.to_string(), rect);
        self.notify_mutation();
    }

    pub fn unmount(&self, id: &str) {
        let removed = {
            let mut state = lock(&self.state);
            state.classes.remove(id);
            state.elements.remove(id).is_some()
        };
        if removed {
            self.notify_mutation();
        }
    }

    /// Change the viewport and notify resize listeners.
    pub fn resize(&self, viewport: Viewport) {
        let listeners: Vec<SharedCallback> = {
            let mut state = lock(&self.state);
            state.viewport = viewport;
            state.resize_listeners.values().cloned().collect()
        };
        for listener in listeners {
            listener();
        }
    }

    pub fn has_class(&self, id: &str, class: &str) -> bool {
        lock(&self.state)
            .classes
            .get(id)
            .is_some_and(|classes| classes.contains(class))
    }

    /// Number of class additions/removals that actually changed an element.
    pub fn class_changes(&self) -> usize {
        lock(&self.state).class_changes
    }

    /// Ids passed to `scroll_into_view`, in order.
    pub fn scrolled_to(&self) -> Vec<String> {
        lock(&self.state).scrolled.clone()
    }

    pub fn live_mutation_observers(&self) -> usize {
        lock(&self.state).mutation_observers.len()
    }

    pub fn live_resize_listeners(&self) -> usize {
        lock(&self.state).resize_listeners.len()
    }

    /// Highest number of simultaneously live subscriptions of either kind.
    pub fn max_live_observers(&self) -> usize {
        lock(&self.state).max_live_observers
    }

    pub fn subscription_log(&self) -> Vec<SubscriptionEvent> {
        lock(&self.state).log.clone()
    }

    fn notify_mutation(&self) {
        let observers: Vec<SharedCallback> =
            lock(&self.state).mutation_observers.values().cloned().collect();
        for observer in observers {
            observer();
        }
    }

    fn set_class(&self, id: &str, class: &str, present: bool) {
        let changed = {
            let mut state = lock(&self.state);
            if !state.elements.contains_key(id) {
                return;
            }
            let classes = state.classes.entry(id.to_string()).or_default();
            let changed = if present {
                classes.insert(class.to_string())
            } else {
                classes.remove(class)
            };
            if changed {
                state.class_changes += 1;
            }
            changed
        };
        if changed {
            self.notify_mutation();
        }
    }

    fn subscribe(&self, callback: SignalCallback, resize: bool) -> Unsubscribe {
        let id = {
            let mut state = lock(&self.state);
            let id = state.next_subscription;
            state.next_subscription += 1;
            if resize {
                state.resize_listeners.insert(id, Arc::from(callback));
                state.log.push(SubscriptionEvent::ResizeObserved);
            } else {
                state.mutation_observers.insert(id, Arc::from(callback));
                state.log.push(SubscriptionEvent::MutationObserved);
            }
            let live = state.mutation_observers.len().max(state.resize_listeners.len());
            state.max_live_observers = state.max_live_observers.max(live);
            id
        };

        let weak: Weak<Mutex<DocumentState>> = Arc::downgrade(&self.state);
        Unsubscribe::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let mut state = lock(&state);
            if resize {
                if state.resize_listeners.remove(&id).is_some() {
                    state.log.push(SubscriptionEvent::ResizeReleased);
                }
            } else if state.mutation_observers.remove(&id).is_some() {
                state.log.push(SubscriptionEvent::MutationReleased);
            }
        })
    }
}

impl Document for HeadlessDocument {
    fn element_rect(&self, id: &str) -> Option<Rect> {
        lock(&self.state).elements.get(id).copied()
    }

    fn viewport(&self) -> Viewport {
        lock(&self.state).viewport
    }

    fn add_class(&self, id: &str, class: &str) {
        self.set_class(id, class, true);
    }

    fn remove_class(&self, id: &str, class: &str) {
        self.set_class(id, class, false);
    }

    /// Scrolls the whole page so the element lands mid-viewport.
    fn scroll_into_view(&self, id: &str) {
        let mut state = lock(&self.state);
        let Some(rect) = state.elements.get(id).copied() else {
            return;
        };
        let viewport = state.viewport;

        let dy = rect.top - ((viewport.height - rect.height) / 2.0).max(0.0);
        let dx = if rect.left < 0.0 || rect.right() > viewport.width {
            rect.left - ((viewport.width - rect.width) / 2.0).max(0.0)
        } else {
            0.0
        };
        for element in state.elements.values_mut() {
            element.top -= dy;
            element.left -= dx;
        }
        state.scrolled.push(id.to_string());
    }

    fn observe_mutations(&self, _filter: MutationFilter, callback: SignalCallback) -> Unsubscribe {
        self.subscribe(callback, false)
    }

    fn on_resize(&self, callback: SignalCallback) -> Unsubscribe {
        self.subscribe(callback, true)
    }
}

struct RouterState {
    location: String,
    navigations: Vec<String>,
    fail: bool,
}

/// Router that records navigations and can be told to reject them.
pub struct HeadlessRouter {
    state: Mutex<RouterState>,
}

impl HeadlessRouter {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(RouterState {
                location: location.into(),
                navigations: Vec::new(),
                fail: false,
            }),
        }
    }

    /// Make subsequent navigations fail.
    pub fn fail_navigation(&self, fail: bool) {
        lock(&self.state).fail = fail;
    }

    /// Successful navigations, in order.
    pub fn navigations(&self) -> Vec<String> {
        lock(&self.state).navigations.clone()
    }

    /// Simulate the user navigating on their own.
    pub fn set_location(&self, location: impl Into<String>) {
        lock(&self.state).location = location.into();
    }
}

impl Router for HeadlessRouter {
    fn current_location(&self) -> String {
        lock(&self.state).location.clone()
    }

    fn navigate(&self, path: &str) -> Result<(), TourError> {
        let mut state = lock(&self.state);
        if state.fail {
            return Err(TourError::Navigation {
                path: path.to_string(),
                reason: "router rejected navigation".to_string(),
            });
        }
        state.location = path.to_string();
        state.navigations.push(path.to_string());
        Ok(())
    }
}

struct TooltipState {
    views: Vec<TooltipView>,
    hidden: bool,
}

impl Default for TooltipState {
    fn default() -> Self {
        Self {
            views: Vec::new(),
            hidden: true,
        }
    }
}

/// Renderer that keeps every view it was asked to show.
#[derive(Default)]
pub struct RecordingTooltip {
    state: Mutex<TooltipState>,
}

impl RecordingTooltip {
    pub fn views(&self) -> Vec<TooltipView> {
        lock(&self.state).views.clone()
    }

    pub fn last(&self) -> Option<TooltipView> {
        lock(&self.state).views.last().cloned()
    }

    /// Whether no tooltip is on screen: nothing shown yet, or `hide` was
    /// called after the most recent `show`.
    pub fn is_hidden(&self) -> bool {
        lock(&self.state).hidden
    }
}

impl TooltipRenderer for RecordingTooltip {
    fn show(&self, view: &TooltipView) {
        let mut state = lock(&self.state);
        state.views.push(view.clone());
        state.hidden = false;
    }

    fn hide(&self) {
        lock(&self.state).hidden = true;
    }
}
