//! Step registry — ordered, immutable lookup of step content.
//!
//! The registry is injected into the state machine at construction, so the
//! step order is fixed for the lifetime of the tour.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{ContentError, TourError};

use super::content;
use super::step::{Step, StepId};

/// Ordered collection of tour steps.
#[derive(Debug, Clone)]
pub struct StepRegistry {
    steps: Vec<Step>,
    index: HashMap<StepId, usize>,
}

impl StepRegistry {
    /// Build a registry from steps in tour order.
    pub fn new(steps: Vec<Step>) -> Result<Self, ContentError> {
        if steps.is_empty() {
            return Err(ContentError::Empty);
        }

        let steps: Vec<Step> = steps.into_iter().map(Step::normalized).collect();
        let mut index = HashMap::with_capacity(steps.len());
        for (position, step) in steps.iter().enumerate() {
            if index.insert(step.id.clone(), position).is_some() {
                return Err(ContentError::DuplicateStep {
                    id: step.id.to_string(),
                });
            }
        }

        Ok(Self { steps, index })
    }

    /// Parse a JSON array of steps.
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let steps: Vec<Step> = serde_json::from_str(json)?;
        Self::new(steps)
    }

    /// Load a JSON content file.
    pub fn from_path(path: &Path) -> Result<Self, ContentError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The built-in dashboard walkthrough.
    pub fn dashboard() -> Self {
        let steps = content::dashboard_steps();
        let index = steps
            .iter()
            .enumerate()
            .map(|(position, step)| (step.id.clone(), position))
            .collect();
        Self { steps, index }
    }

    /// Look up a step's descriptor.
    pub fn get(&self, id: &StepId) -> Result<&Step, TourError> {
        self.index
            .get(id)
            .map(|&position| &self.steps[position])
            .ok_or_else(|| TourError::UnknownStep { id: id.to_string() })
    }

    pub fn contains(&self, id: &StepId) -> bool {
        self.index.contains_key(id)
    }

    /// Zero-based position of a step in tour order.
    pub fn position_of(&self, id: &StepId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn first(&self) -> &Step {
        &self.steps[0]
    }

    pub fn last(&self) -> &Step {
        &self.steps[self.steps.len() - 1]
    }

    /// The step after `id`, or `None` if `id` is last or unknown.
    pub fn next_after(&self, id: &StepId) -> Option<&Step> {
        let position = self.position_of(id)?;
        self.steps.get(position + 1)
    }

    /// The step before `id`, or `None` if `id` is first or unknown.
    pub fn previous_before(&self, id: &StepId) -> Option<&Step> {
        let position = self.position_of(id)?;
        position.checked_sub(1).map(|p| &self.steps[p])
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &StepId> {
        self.steps.iter().map(|s| &s.id)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> StepRegistry {
        StepRegistry::new(vec![
            Step::new("a", "A", "first"),
            Step::new("b", "B", "second"),
            Step::new("c", "C", "third"),
        ])
        .unwrap()
    }

    #[test]
    fn order_defines_next_and_previous() {
        let registry = three();
        assert_eq!(registry.first().id, StepId::from("a"));
        assert_eq!(registry.last().id, StepId::from("c"));
        assert_eq!(registry.next_after(&"a".into()).unwrap().id, StepId::from("b"));
        assert!(registry.next_after(&"c".into()).is_none());
        assert_eq!(registry.previous_before(&"c".into()).unwrap().id, StepId::from("b"));
        assert!(registry.previous_before(&"a".into()).is_none());
    }

    #[test]
    fn unknown_id_is_configuration_error() {
        let registry = three();
        let err = registry.get(&"missing".into()).unwrap_err();
        assert!(matches!(err, TourError::UnknownStep { ref id } if id == "missing"));
        assert!(registry.next_after(&"missing".into()).is_none());
    }

    #[test]
    fn rejects_duplicates_and_empty() {
        let dup = StepRegistry::new(vec![Step::new("a", "A", ""), Step::new("a", "A2", "")]);
        assert!(matches!(dup, Err(ContentError::DuplicateStep { .. })));
        assert!(matches!(StepRegistry::new(Vec::new()), Err(ContentError::Empty)));
    }

    #[test]
    fn loads_json_content() {
        let registry = StepRegistry::from_json(
            r#"[
                {"id": "welcome", "title": "Hi", "message": "Welcome", "side": "center"},
                {"id": "nav", "title": "Nav", "message": "Menu", "target_id": "sidebar", "side": "right", "route_path": "/"}
            ]"#,
        )
        .unwrap();
        assert_eq!(registry.len(), 2);
        let nav = registry.get(&"nav".into()).unwrap();
        assert_eq!(nav.target_id.as_deref(), Some("sidebar"));
        assert_eq!(nav.route_path.as_deref(), Some("/"));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            StepRegistry::from_json("{not json"),
            Err(ContentError::Parse(_))
        ));
    }
}
