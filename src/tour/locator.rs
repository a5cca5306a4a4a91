//! Target locator — finds, highlights and reveals the active step's element.

use tracing::{debug, trace};

use crate::error::TourError;

use super::observer::{MutationFilter, SignalCallback, Unsubscribe};
use super::position::{Rect, Viewport};
use super::step::Step;

/// Host document capability.
///
/// Implementations wrap the live DOM; every method must be cheap and must not
/// panic when `id` is absent.
pub trait Document: Send + Sync {
    /// Viewport-relative bounding rect of the element with `id`, if mounted.
    fn element_rect(&self, id: &str) -> Option<Rect>;

    fn viewport(&self) -> Viewport;

    fn add_class(&self, id: &str, class: &str);

    fn remove_class(&self, id: &str, class: &str);

    /// Smooth-scroll the element towards the middle of the viewport.
    fn scroll_into_view(&self, id: &str);

    /// Watch the document for mutations matching `filter`.
    fn observe_mutations(&self, filter: MutationFilter, callback: SignalCallback) -> Unsubscribe;

    /// Listen for window resizes.
    fn on_resize(&self, callback: SignalCallback) -> Unsubscribe;
}

/// Tracks the single highlighted element across passes and steps.
#[derive(Debug)]
pub struct TargetLocator {
    highlight_class: String,
    highlighted: Option<String>,
    /// Target already scrolled for during the current activation.
    scrolled: Option<String>,
}

impl TargetLocator {
    pub fn new(highlight_class: impl Into<String>) -> Self {
        Self {
            highlight_class: highlight_class.into(),
            highlighted: None,
            scrolled: None,
        }
    }

    /// Id of the element currently carrying the highlight.
    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    /// Resolve `step`'s target, moving the highlight onto it.
    ///
    /// `Ok(None)` for a step without a target. A configured target that is
    /// not mounted is [`TourError::TargetNotFound`]; the highlight is dropped
    /// and the caller falls back to centered placement until a later pass
    /// finds it.
    pub fn locate(&mut self, document: &dyn Document, step: &Step) -> Result<Option<Rect>, TourError> {
        let Some(target_id) = step.target_id.as_deref() else {
            self.clear_highlight(document);
            return Ok(None);
        };

        let Some(rect) = document.element_rect(target_id) else {
            self.clear_highlight(document);
            return Err(TourError::TargetNotFound {
                id: target_id.to_string(),
            });
        };

        if self.highlighted.as_deref() != Some(target_id) {
            self.clear_highlight(document);
            document.add_class(target_id, &self.highlight_class);
            self.highlighted = Some(target_id.to_string());
            debug!(step = %step.id, target = %target_id, "Tour target highlighted");
        }

        // Scroll at most once per activation; an element larger than the
        // viewport always exceeds it.
        if rect.exceeds(document.viewport()) && self.scrolled.as_deref() != Some(target_id) {
            debug!(step = %step.id, target = %target_id, "Scrolling tour target into view");
            document.scroll_into_view(target_id);
            self.scrolled = Some(target_id.to_string());
            // The rect moves with the scroll; re-read it if still mounted.
            return Ok(Some(document.element_rect(target_id).unwrap_or(rect)));
        }

        Ok(Some(rect))
    }

    /// Strip the highlight and forget scroll history; called when the
    /// active step changes or the tour ends.
    pub fn clear(&mut self, document: &dyn Document) {
        self.clear_highlight(document);
        self.scrolled = None;
    }

    fn clear_highlight(&mut self, document: &dyn Document) {
        if let Some(previous) = self.highlighted.take() {
            trace!(target = %previous, "Tour highlight removed");
            document.remove_class(&previous, &self.highlight_class);
        }
    }
}
