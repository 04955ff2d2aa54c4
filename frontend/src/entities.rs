//! Read-mostly cache of external light entity states.

use std::collections::HashMap;

use lightmapper_types::{EntityId, LightState};

/// Cache keyed by entity id. Refreshed in bulk from the REST API and
/// patched by realtime pushes; each incoming state is authoritative at
/// time of receipt (no sequencing assumptions).
#[derive(Default)]
pub struct EntityCache {
    states: HashMap<EntityId, LightState>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, states: Vec<LightState>) {
        self.states = states
            .into_iter()
            .map(|s| (s.entity_id.clone(), s))
            .collect();
    }

    pub fn update(&mut self, state: LightState) {
        self.states.insert(state.entity_id.clone(), state);
    }

    pub fn get(&self, entity_id: &str) -> Option<&LightState> {
        self.states.get(entity_id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All cached states sorted by display name, for list views.
    pub fn sorted(&self) -> Vec<&LightState> {
        let mut all: Vec<&LightState> = self.states.values().collect();
        all.sort_by(|a, b| a.display_name().cmp(b.display_name()));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(entity_id: &str, state: &str) -> LightState {
        LightState {
            entity_id: entity_id.to_string(),
            state: state.to_string(),
            attributes: Default::default(),
            last_changed: None,
            last_updated: None,
        }
    }

    #[test]
    fn test_update_overwrites_by_entity_id() {
        let mut cache = EntityCache::new();
        cache.replace_all(vec![state("light.a", "off"), state("light.b", "on")]);
        assert_eq!(cache.len(), 2);

        cache.update(state("light.a", "on"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("light.a").unwrap().is_on());
    }

    #[test]
    fn test_sorted_is_stable_by_name() {
        let mut cache = EntityCache::new();
        cache.replace_all(vec![state("light.z", "on"), state("light.a", "off")]);
        let names: Vec<&str> = cache.sorted().iter().map(|s| s.display_name()).collect();
        assert_eq!(names, vec!["light.a", "light.z"]);
    }
}
