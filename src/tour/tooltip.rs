//! Tooltip view model and the renderer capability that draws it.

use serde::Serialize;

use super::position::{Position, Side};
use super::step::StepId;

/// Everything a renderer needs to draw the tooltip for one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipView {
    pub step_id: StepId,
    pub title: String,
    pub message: String,
    /// Side actually used; `Center` when falling back for a missing target.
    pub side: Side,
    pub position: Position,
    /// Whether the tooltip points at a located target.
    pub anchored: bool,
    pub index: usize,
    pub total: usize,
}

impl TooltipView {
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }

    /// "Step 2 of 9" style label.
    pub fn progress_label(&self) -> String {
        format!("Step {} of {}", self.index + 1, self.total)
    }
}

/// Host capability that draws or removes the floating tooltip.
pub trait TooltipRenderer: Send + Sync {
    fn show(&self, view: &TooltipView);

    fn hide(&self);
}
