//! Step identifiers and content descriptors.

use serde::{Deserialize, Serialize};

use super::position::Side;

/// Stable identifier of a tour step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for StepId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for StepId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Content descriptor for one stage of the walkthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub title: String,
    pub message: String,
    /// DOM id of the element the tooltip points to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default)]
    pub side: Side,
    /// Page the step lives on; the router is sent here on activation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_path: Option<String>,
}

impl Step {
    pub fn new(id: impl Into<StepId>, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            message: message.into(),
            target_id: None,
            side: Side::default(),
            route_path: None,
        }
    }

    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn with_route(mut self, route_path: impl Into<String>) -> Self {
        self.route_path = Some(route_path.into());
        self
    }

    /// Treat blank optional strings as absent.
    pub(crate) fn normalized(mut self) -> Self {
        self.target_id = self.target_id.filter(|t| !t.trim().is_empty());
        self.route_path = self.route_path.filter(|r| !r.trim().is_empty());
        self
    }
}
