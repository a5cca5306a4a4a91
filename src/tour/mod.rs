//! Guided product tour — a step-sequenced walkthrough over the dashboard.
//!
//! The controller owns a state machine over a fixed step order. Each step
//! change may navigate, then (after a settle delay) locates the step's target
//! element, positions a tooltip next to it, and keeps it attached while the
//! page mutates or resizes.

pub mod content;
pub mod controller;
pub mod locator;
pub mod observer;
pub mod position;
pub mod registry;
pub mod route;
pub mod state;
pub mod step;
pub mod tooltip;

pub use controller::{TourCommand, TourController, TourDeps};
pub use locator::{Document, TargetLocator};
pub use observer::{LoopPhase, LoopSignal, MutationFilter, ObserverLoop, SignalCallback, SignalKind, Unsubscribe};
pub use position::{Position, Rect, Side, TooltipGeometry, Viewport, compute_position};
pub use registry::StepRegistry;
pub use route::{RouteOutcome, RouteSync, Router};
pub use state::{TourSnapshot, TourState, Transition};
pub use step::{Step, StepId};
pub use tooltip::{TooltipRenderer, TooltipView};
